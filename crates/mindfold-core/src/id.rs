//! Stable node identities.
//!
//! Ids are short opaque strings (8 lowercase alphanumeric characters) that
//! survive re-parsing via inline annotations in the internal outline text.
//! Generation mixes the wall clock with a process-wide counter through a
//! small LCG, so ids are unique within a process run without pulling in an
//! RNG dependency.

use std::borrow::Borrow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Length of a generated node id.
pub const ID_LEN: usize = 8;

const ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Opaque stable identity of an [`OutlineNode`](crate::OutlineNode).
///
/// Compares, hashes, and borrows as its string form, so id-keyed maps can be
/// queried with a plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "persistence",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct NodeId(String);

impl NodeId {
    /// Generate a fresh id, unique within this process run.
    #[must_use]
    pub fn generate() -> Self {
        Self(generate_raw())
    }

    /// The id's string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Simple LCG PRNG; enough entropy for short collision-free ids.
#[derive(Debug, Clone)]
struct IdRng {
    state: u64,
}

impl IdRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        // LCG parameters from Numerical Recipes
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }
}

static NEXT_NONCE: AtomicU64 = AtomicU64::new(0);

fn generate_raw() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    // The counter keeps seeds distinct even when the clock does not advance
    // between calls.
    let nonce = NEXT_NONCE.fetch_add(1, Ordering::Relaxed);
    let mut rng = IdRng::new(nanos ^ nonce.wrapping_mul(0x9E37_79B9_7F4A_7C15));

    let mut out = String::with_capacity(ID_LEN);
    for _ in 0..ID_LEN {
        let idx = (rng.next_u64() >> 33) as usize % ALPHABET.len();
        out.push(ALPHABET[idx] as char);
    }
    out
}
