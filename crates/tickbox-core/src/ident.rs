//! Collision-resistant short identifiers.
//!
//! Identifiers tag regions, checkboxes, placeholder tokens and rendered
//! control elements. Uniqueness is probabilistic: 48 random bits are plenty
//! for the number of ids one browser tab generates in a session.

use rand::Rng;
use smol_str::{SmolStr, format_smolstr};

/// Number of hex characters in an identifier.
pub const ID_LEN: usize = 12;

/// Generate a fresh 12-hex-character identifier.
pub fn unique_id() -> SmolStr {
    let bits = rand::rng().random::<u64>() & 0xffff_ffff_ffff;
    format_smolstr!("{:012x}", bits)
}

/// Check that a string has the shape of an identifier.
///
/// Placeholder parsing uses this to reject tokens with a malformed id part.
pub fn is_id(s: &str) -> bool {
    s.len() == ID_LEN && s.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
}
