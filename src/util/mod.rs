//! Small shared utilities.
//!
//! Currently just the interval-string parser used by the `agg` command.

mod duration;

pub use duration::{parse_duration, DurationError};
