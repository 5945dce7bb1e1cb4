//! IMAP command tag generator.
//!
//! Tags are used to match commands with their responses, so no two
//! commands in flight on one connection may share one.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::types::Tag;

/// Tag generator for IMAP commands.
///
/// Generates sequential tags in the format "A0000", "A0001", etc. The
/// counter wraps around after `u32::MAX`; by then the early tags have long
/// completed.
#[derive(Debug)]
pub struct TagGenerator {
    counter: AtomicU32,
    prefix: char,
}

impl TagGenerator {
    /// Creates a new tag generator with the given prefix.
    #[must_use]
    pub const fn new(prefix: char) -> Self {
        Self {
            counter: AtomicU32::new(0),
            prefix,
        }
    }

    /// Generates the next tag.
    #[must_use]
    pub fn next(&self) -> Tag {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        Tag::new(format!("{}{:04}", self.prefix, n))
    }
}

impl Default for TagGenerator {
    fn default() -> Self {
        Self::new('A')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_generation() {
        let generator = TagGenerator::default();
        assert_eq!(generator.next().as_str(), "A0000");
        assert_eq!(generator.next().as_str(), "A0001");
    }

    #[test]
    fn test_custom_prefix_and_padding() {
        let generator = TagGenerator::new('S');
        for _ in 0..100 {
            let _ = generator.next();
        }
        assert_eq!(generator.next().as_str(), "S0100");
    }

    #[test]
    fn test_uniqueness() {
        let generator = TagGenerator::default();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(generator.next()), "duplicate tag generated");
        }
    }

    #[test]
    fn test_wraps_instead_of_panicking() {
        let generator = TagGenerator::default();
        generator.counter.store(u32::MAX, Ordering::Relaxed);

        assert_eq!(generator.next().as_str(), "A4294967295");
        assert_eq!(generator.next().as_str(), "A0000");
    }
}
