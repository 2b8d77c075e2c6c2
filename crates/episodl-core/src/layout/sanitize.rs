//! Filesystem-safe name segments.

/// Characters that are never allowed in a generated path segment.
pub const RESERVED_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Removes every character in [`RESERVED_CHARS`] from `name`.
///
/// Only the listed characters are touched; whitespace and dots are kept so the
/// result stays recognizable (`"Show: Part 2?"` → `"Show Part 2"`).
/// Applying it twice yields the same string as applying it once.
pub fn strip_reserved(name: &str) -> String {
    name.chars().filter(|c| !RESERVED_CHARS.contains(c)).collect()
}
