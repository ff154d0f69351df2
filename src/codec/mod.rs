//! Stateless conversions between wire encodings and capability values.

pub mod enums;
pub mod illuminance;
pub mod time;

use thiserror::Error as ThisError;

pub use enums::{LabelCodec, LedMode, TargetType};
pub use illuminance::raw_to_lux;
pub use time::{Clock, LocalClock, hhmm_to_seconds, seconds_to_hhmm};

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("expected HH:MM, got {0:?}")]
    TimeFormat(String),

    #[error("time {0:?} is outside 00:00..=23:59")]
    TimeRange(String),

    #[error("{0:?} is not one of the allowed labels")]
    UnknownLabel(String),
}
