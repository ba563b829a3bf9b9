//! Inline identity annotations: `<!-- id:XXXXXXXX -->`.
//!
//! The annotation rides along in the internal outline form as an HTML-style
//! comment after the node content. Matching is byte-level, no regex: an
//! opener, optional whitespace, the `id:` tag, one or more ASCII
//! alphanumerics, optional whitespace, and the closer. Ordinary comments
//! without the `id:` tag are left alone.

/// Span and id of the first annotation in `text`, if any.
fn find_annotation(text: &str) -> Option<(usize, usize, std::ops::Range<usize>)> {
    let mut from = 0;
    while let Some(rel) = text[from..].find("<!--") {
        let start = from + rel;
        if let Some((end, id_range)) = match_annotation_at(text, start) {
            return Some((start, end, id_range));
        }
        from = start + 4;
    }
    None
}

/// Try to match an annotation starting exactly at `start` (which must point
/// at `<!--`). Returns the end offset past `-->` and the id's byte range.
fn match_annotation_at(text: &str, start: usize) -> Option<(usize, std::ops::Range<usize>)> {
    let bytes = text.as_bytes();
    let mut i = start + 4;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if !text[i..].starts_with("id:") {
        return None;
    }
    i += 3;
    let id_start = i;
    while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
        i += 1;
    }
    if i == id_start {
        return None;
    }
    let id_end = i;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if !text[i..].starts_with("-->") {
        return None;
    }
    Some((i + 3, id_start..id_end))
}

/// Extract the id carried by the first annotation in `text`, if any.
#[must_use]
pub fn extract_id(text: &str) -> Option<&str> {
    find_annotation(text).map(|(_, _, range)| &text[range])
}

/// Remove the first annotation from `text` and trim the result.
#[must_use]
pub fn strip_annotation(text: &str) -> String {
    match find_annotation(text) {
        Some((start, end, _)) => {
            let mut out = String::with_capacity(text.len());
            out.push_str(&text[..start]);
            out.push_str(&text[end..]);
            out.trim().to_owned()
        }
        None => text.trim().to_owned(),
    }
}

/// Embed `id` into `text`: replace an existing annotation or append one.
#[must_use]
pub fn embed_id(text: &str, id: &str) -> String {
    match find_annotation(text) {
        Some((start, end, _)) => {
            format!("{}<!-- id:{id} -->{}", &text[..start], &text[end..])
        }
        None => format!("{text} <!-- id:{id} -->"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_annotation() {
        assert_eq!(extract_id("Task <!-- id:abc12345 -->"), Some("abc12345"));
    }

    #[test]
    fn extracts_regardless_of_inner_spacing() {
        assert_eq!(extract_id("Task <!--id:abc12345-->"), Some("abc12345"));
        assert_eq!(extract_id("Task <!--  id:abc12345  -->"), Some("abc12345"));
    }

    #[test]
    fn returns_none_without_annotation() {
        assert_eq!(extract_id("Task"), None);
        assert_eq!(extract_id(""), None);
    }

    #[test]
    fn plain_comments_are_not_annotations() {
        assert_eq!(extract_id("Task <!-- remember this -->"), None);
        assert_eq!(extract_id("Task <!-- id: -->"), None);
    }

    #[test]
    fn annotation_after_plain_comment_is_found() {
        assert_eq!(
            extract_id("Task <!-- note --> <!-- id:abc12345 -->"),
            Some("abc12345")
        );
    }

    #[test]
    fn strip_removes_annotation_and_trims() {
        assert_eq!(strip_annotation("Task <!-- id:abc12345 -->"), "Task");
        assert_eq!(strip_annotation("  Task <!-- id:abc12345 -->  "), "Task");
        assert_eq!(strip_annotation("Task"), "Task");
    }

    #[test]
    fn embed_appends_annotation() {
        assert_eq!(embed_id("Task", "abc12345"), "Task <!-- id:abc12345 -->");
    }

    #[test]
    fn embed_replaces_existing_annotation() {
        assert_eq!(
            embed_id("Task <!-- id:old00000 -->", "new11111"),
            "Task <!-- id:new11111 -->"
        );
    }
}
