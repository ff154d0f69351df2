//! Time-of-day codec.
//!
//! The device keeps day boundaries and its clock as seconds since local
//! midnight. Capabilities show them as `HH:MM`.

use super::CodecError;
use chrono::{Local, NaiveTime, Timelike};

pub const SECONDS_PER_DAY: u64 = 86_400;

/// Render seconds as zero-padded `HH:MM`, dropping seconds and wrapping at 24h.
pub fn seconds_to_hhmm(seconds: u64) -> String {
    let of_day = seconds % SECONDS_PER_DAY;
    format!("{:02}:{:02}", of_day / 3600, (of_day % 3600) / 60)
}

/// Parse `HH:MM` into seconds since midnight.
pub fn hhmm_to_seconds(text: &str) -> Result<u32, CodecError> {
    let (hours, minutes) = text
        .split_once(':')
        .filter(|(h, m)| is_two_digits(h) && is_two_digits(m))
        .ok_or_else(|| CodecError::TimeFormat(text.to_string()))?;

    let hours: u32 = hours
        .parse()
        .map_err(|_| CodecError::TimeFormat(text.to_string()))?;
    let minutes: u32 = minutes
        .parse()
        .map_err(|_| CodecError::TimeFormat(text.to_string()))?;

    if hours > 23 || minutes > 59 {
        return Err(CodecError::TimeRange(text.to_string()));
    }

    Ok(hours * 3600 + minutes * 60)
}

fn is_two_digits(part: &str) -> bool {
    part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit())
}

/// Seconds elapsed since midnight, rounded to the nearest second.
pub fn seconds_since_midnight(time: NaiveTime) -> u32 {
    let seconds = time.num_seconds_from_midnight();
    let rounded = if time.nanosecond() % 1_000_000_000 >= 500_000_000 {
        seconds + 1
    } else {
        seconds
    };
    rounded % SECONDS_PER_DAY as u32
}

/// Source of the current local time of day.
pub trait Clock: Send + Sync {
    fn seconds_since_midnight(&self) -> u32;
}

/// Wall clock in the host's local timezone.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn seconds_since_midnight(&self) -> u32 {
        seconds_since_midnight(Local::now().time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pads_and_truncates() {
        assert_eq!(seconds_to_hhmm(0), "00:00");
        assert_eq!(seconds_to_hhmm(28800), "08:00");
        assert_eq!(seconds_to_hhmm(28859), "08:00");
        assert_eq!(seconds_to_hhmm(86340), "23:59");
    }

    #[test]
    fn test_decode_wraps_past_midnight() {
        assert_eq!(seconds_to_hhmm(SECONDS_PER_DAY), "00:00");
        assert_eq!(seconds_to_hhmm(SECONDS_PER_DAY + 3660), "01:01");
    }

    #[test]
    fn test_round_trip_every_minute() {
        for seconds in (0..=86340u32).step_by(60) {
            let text = seconds_to_hhmm(u64::from(seconds));
            assert_eq!(hhmm_to_seconds(&text), Ok(seconds), "{}", text);
        }
    }

    #[test]
    fn test_encode_rejects_bad_syntax() {
        for input in ["8:00", "08-00", "0800", "08:0", "ab:cd", "08:00:00", "", " 8:00"] {
            assert!(
                matches!(hhmm_to_seconds(input), Err(CodecError::TimeFormat(_))),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_encode_rejects_out_of_range() {
        assert_eq!(
            hhmm_to_seconds("24:00"),
            Err(CodecError::TimeRange("24:00".to_string()))
        );
        assert!(matches!(hhmm_to_seconds("12:60"), Err(CodecError::TimeRange(_))));
        assert_eq!(hhmm_to_seconds("23:59"), Ok(86340));
    }

    #[test]
    fn test_seconds_since_midnight_rounds() {
        let t = NaiveTime::from_hms_milli_opt(8, 30, 15, 499).unwrap();
        assert_eq!(seconds_since_midnight(t), 8 * 3600 + 30 * 60 + 15);

        let t = NaiveTime::from_hms_milli_opt(8, 30, 15, 500).unwrap();
        assert_eq!(seconds_since_midnight(t), 8 * 3600 + 30 * 60 + 16);

        let t = NaiveTime::from_hms_milli_opt(23, 59, 59, 900).unwrap();
        assert_eq!(seconds_since_midnight(t), 0);
    }
}
