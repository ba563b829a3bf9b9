//! Content-aware node height estimation.

use crate::LayoutConfig;
use mindfold_core::NodeId;
use rustc_hash::FxHashMap;
use unicode_width::UnicodeWidthChar;

/// Estimated advance of a double-width character (CJK and friends).
const WIDE_CHAR_PX: f64 = 14.0;
/// Estimated advance of everything else.
const NARROW_CHAR_PX: f64 = 8.0;
/// Height of one wrapped text line.
const LINE_HEIGHT_PX: f64 = 24.0;
/// Vertical padding inside the node box.
const VERTICAL_PADDING_PX: f64 = 16.0;
/// Horizontal chrome (padding, expand toggle, child button) subtracted from
/// the node width before wrapping text into it.
const TEXT_CHROME_PX: f64 = 100.0;

/// Node display text keyed by id, the sizing input for overlap resolution.
pub type ContentMap = FxHashMap<NodeId, String>;

/// Estimate the rendered height of a node from its text.
///
/// A crude wrap model, not a text shaper: each char advances a flat 14px if
/// its Unicode display width is 2, otherwise 8px, and the total wraps into
/// the width left after chrome. Never returns less than
/// `config.node_height`.
#[must_use]
pub fn estimate_node_height(text: &str, config: &LayoutConfig) -> f64 {
    let effective_width = config.node_width - TEXT_CHROME_PX;
    let total: f64 = text
        .chars()
        .map(|ch| {
            if UnicodeWidthChar::width(ch).unwrap_or(1) >= 2 {
                WIDE_CHAR_PX
            } else {
                NARROW_CHAR_PX
            }
        })
        .sum();
    let lines = (total / effective_width).ceil();
    (lines * LINE_HEIGHT_PX + VERTICAL_PADDING_PX).max(config.node_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_gets_the_minimum_height() {
        let config = LayoutConfig::default();
        assert_eq!(estimate_node_height("Task", &config), 40.0);
        assert_eq!(estimate_node_height("", &config), 40.0);
    }

    #[test]
    fn long_text_wraps_and_grows() {
        let config = LayoutConfig::default();
        // 40 narrow chars * 8px = 320px over a 150px effective width: 3 lines
        let text = "a".repeat(40);
        assert_eq!(estimate_node_height(&text, &config), 3.0 * 24.0 + 16.0);
    }

    #[test]
    fn wide_characters_advance_further_than_narrow() {
        let config = LayoutConfig::default();
        let narrow = "a".repeat(12);
        let wide = "あ".repeat(12);
        assert!(estimate_node_height(&wide, &config) >= estimate_node_height(&narrow, &config));
        // 12 wide chars * 14px = 168px > 150px: wraps to 2 lines
        assert_eq!(estimate_node_height(&wide, &config), 2.0 * 24.0 + 16.0);
    }

    #[test]
    fn height_never_goes_below_the_configured_minimum() {
        let config = LayoutConfig {
            node_height: 64.0,
            ..LayoutConfig::default()
        };
        assert_eq!(estimate_node_height("x", &config), 64.0);
    }
}
