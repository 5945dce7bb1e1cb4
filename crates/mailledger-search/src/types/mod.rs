//! Core IMAP types used by the search client.

#![allow(clippy::missing_const_for_fn)]

mod capability;
mod flags;
mod identifiers;
mod sequence;

pub use capability::{Capability, Status};
pub use flags::Flag;
pub use identifiers::Tag;
pub use sequence::{SeqRange, SequenceSet};
