//! Connection driver.
//!
//! This module runs the search protocol over a byte stream:
//! - Configuration (tag prefix, framing limits)
//! - Framed reading of responses, literals included
//! - A client that pipelines searches over one connection

mod client;
mod config;
mod framed;

pub use client::Client;
pub use config::{Config, ConfigBuilder, DEFAULT_MAX_LINE_LENGTH, DEFAULT_MAX_LITERAL_SIZE};
pub use framed::FramedStream;
