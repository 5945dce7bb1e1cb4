//! Sequence sets for message ranges.
//!
//! The same type carries both message sequence numbers and UIDs; which one
//! a set holds is decided by the context it is used in (`UID` search key,
//! `UID SEARCH` results, ...).

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Internal marker for `*` (the largest number in use). Zero is never a
/// valid message number, so it cannot collide with a real value.
const STAR: u32 = 0;

/// A single `start:stop` range (or a lone number when `start == stop`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqRange {
    start: u32,
    stop: u32,
}

impl SeqRange {
    fn new(start: u32, stop: u32) -> Self {
        match (start, stop) {
            (STAR, n) | (n, STAR) => Self { start: n, stop: STAR },
            (a, b) if a > b => Self { start: b, stop: a },
            (a, b) => Self { start: a, stop: b },
        }
    }

    /// Returns the first number of the range, or `None` for `*`.
    #[must_use]
    pub const fn start(self) -> Option<u32> {
        if self.start == STAR { None } else { Some(self.start) }
    }

    /// Returns the last number of the range, or `None` for `*`.
    #[must_use]
    pub const fn stop(self) -> Option<u32> {
        if self.stop == STAR { None } else { Some(self.stop) }
    }

    /// Returns `true` if the range refers to `*`.
    #[must_use]
    pub const fn is_dynamic(self) -> bool {
        self.start == STAR || self.stop == STAR
    }

    const fn bound(n: u32) -> u32 {
        if n == STAR { u32::MAX } else { n }
    }

    fn contains(self, n: u32) -> bool {
        n != 0 && Self::bound(self.start) <= n && n <= Self::bound(self.stop)
    }
}

impl fmt::Display for SeqRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn bound(f: &mut fmt::Formatter<'_>, n: u32) -> fmt::Result {
            if n == STAR { f.write_str("*") } else { write!(f, "{n}") }
        }

        bound(f, self.start)?;
        if self.start != self.stop {
            f.write_str(":")?;
            bound(f, self.stop)?;
        }
        Ok(())
    }
}

/// Set of message sequence numbers or UIDs, e.g. `1:3,7,10:*`.
///
/// Static ranges are kept sorted and merged, so two sets holding the same
/// numbers compare equal and print the same way. Ranges involving `*` are
/// kept after the static ones, unmerged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceSet {
    ranges: Vec<SeqRange>,
}

impl SequenceSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Creates a sequence set from a single number.
    ///
    /// Returns `None` for 0, which is not a valid message number.
    #[must_use]
    pub fn single(n: u32) -> Option<Self> {
        Self::range(n, n)
    }

    /// Creates a range sequence set.
    #[must_use]
    pub fn range(start: u32, end: u32) -> Option<Self> {
        if start == 0 || end == 0 {
            return None;
        }
        let mut set = Self::new();
        set.add_range(start, end);
        Some(set)
    }

    /// Creates the set `start:*`.
    #[must_use]
    pub fn range_from(start: u32) -> Option<Self> {
        if start == 0 {
            return None;
        }
        let mut set = Self::new();
        set.insert(SeqRange::new(start, STAR));
        Some(set)
    }

    /// Creates the set `1:*`, i.e. every message.
    #[must_use]
    pub fn all() -> Self {
        let mut set = Self::new();
        set.insert(SeqRange::new(1, STAR));
        set
    }

    /// Builds a set from individual numbers. Zeros are ignored.
    #[must_use]
    pub fn from_nums(nums: impl IntoIterator<Item = u32>) -> Self {
        let mut set = Self::new();
        for n in nums {
            set.add_num(n);
        }
        set
    }

    /// Adds a single number. Zero is ignored.
    pub fn add_num(&mut self, n: u32) {
        if n != 0 {
            self.insert(SeqRange::new(n, n));
        }
    }

    /// Adds the inclusive range `start:stop`. Zero bounds are ignored.
    pub fn add_range(&mut self, start: u32, stop: u32) {
        if start != 0 && stop != 0 {
            self.insert(SeqRange::new(start, stop));
        }
    }

    /// Adds every range of `other`.
    pub fn extend(&mut self, other: &Self) {
        for range in &other.ranges {
            self.insert(*range);
        }
    }

    fn insert(&mut self, range: SeqRange) {
        if range.is_dynamic() {
            if !self.ranges.contains(&range) {
                self.ranges.push(range);
            }
            return;
        }

        let split = self
            .ranges
            .iter()
            .position(|r| r.is_dynamic())
            .unwrap_or(self.ranges.len());
        let dynamic = self.ranges.split_off(split);

        let mut out = Vec::with_capacity(split + 1 + dynamic.len());
        let mut pending = Some(range);
        for r in std::mem::take(&mut self.ranges) {
            match pending {
                Some(p) if r.stop.saturating_add(1) < p.start => out.push(r),
                Some(p) if p.stop.saturating_add(1) < r.start => {
                    out.push(p);
                    out.push(r);
                    pending = None;
                }
                Some(p) => {
                    pending = Some(SeqRange {
                        start: p.start.min(r.start),
                        stop: p.stop.max(r.stop),
                    });
                }
                None => out.push(r),
            }
        }
        if let Some(p) = pending {
            out.push(p);
        }
        out.extend(dynamic);
        self.ranges = out;
    }

    /// Returns `true` if the set holds no ranges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns `true` if the set refers to `*`.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.ranges.iter().any(|r| r.is_dynamic())
    }

    /// Returns `true` if `n` is in the set. `*` is treated as `u32::MAX`.
    #[must_use]
    pub fn contains(&self, n: u32) -> bool {
        self.ranges.iter().any(|r| r.contains(n))
    }

    /// Returns the ranges making up the set.
    #[must_use]
    pub fn ranges(&self) -> &[SeqRange] {
        &self.ranges
    }

    /// Expands the set into individual numbers, in ascending order.
    ///
    /// Returns `None` if the set contains `*`, whose value depends on the
    /// mailbox.
    #[must_use]
    pub fn nums(&self) -> Option<Vec<u32>> {
        if self.is_dynamic() {
            return None;
        }
        Some(self.ranges.iter().flat_map(|r| r.start..=r.stop).collect())
    }
}

impl fmt::Display for SequenceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{range}")?;
        }
        Ok(())
    }
}

impl FromStr for SequenceSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        fn bound(s: &str, whole: &str) -> Result<u32> {
            if s == "*" {
                return Ok(STAR);
            }
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::InvalidSequenceSet(whole.to_string()));
            }
            match s.parse::<u32>() {
                Ok(0) | Err(_) => Err(Error::InvalidSequenceSet(whole.to_string())),
                Ok(n) => Ok(n),
            }
        }

        if s.is_empty() {
            return Err(Error::InvalidSequenceSet(s.to_string()));
        }

        let mut set = Self::new();
        for part in s.split(',') {
            let range = match part.split_once(':') {
                Some((start, stop)) => SeqRange::new(bound(start, s)?, bound(stop, s)?),
                None => {
                    let n = bound(part, s)?;
                    SeqRange::new(n, n)
                }
            };
            set.insert(range);
        }
        Ok(set)
    }
}
