//! Configuration types
//!
//! Board-agnostic sensor configuration and the TOML-subset parser used to
//! load it from the text embedded in the firmware.

pub mod toml;
pub mod types;

pub use self::toml::{parse_config, ParseError, ParseErrorKind};
pub use types::*;
