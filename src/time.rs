// Time utility functions

use crate::error::{self, SWError};
use crate::Error;
use crate::Result;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::time::Duration;

enum Time {
    Second,
    Minute,
    Hour,
}

impl Time {
    fn to_seconds(&self) -> u64 {
        match self {
            Time::Second => 1,
            Time::Minute => 60,
            Time::Hour => 3600,
        }
    }
}

impl TryFrom<char> for Time {
    type Error = Error;

    fn try_from(time: char) -> std::result::Result<Self, Self::Error> {
        match time {
            's' => Ok(Time::Second),
            'm' => Ok(Time::Minute),
            'h' => Ok(Time::Hour),
            _ => Err(error::gen(format!(
                "Unknown char time format: {time} - valid types are s, m, h"
            ))),
        }
    }
}

/// Milliseconds since the Unix epoch. Stamped on notifications as their
/// arrival time.
pub fn now_epoch_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Seconds(u64);

impl Seconds {
    pub fn new(seconds: u64) -> Self {
        Seconds(seconds)
    }

    /// A zero timeout means "wait for the platform", i.e. no timeout.
    pub fn as_timeout(&self) -> Option<Duration> {
        if self.0 == 0 {
            return None;
        }
        Some(Duration::from_secs(self.0))
    }
}

impl Deref for Seconds {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Seconds {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Convert a string with time format to seconds.
/// A string with time format can be anything like:
/// 1s, 2s, 2 seconds, 2 second, 2seconds, 2second, 2 s
/// The same would apply for minutes and hours.
/// Processing stops at the first non-digit character
fn string_to_seconds(str_fmt: &str) -> Result<Seconds> {
    let too_large = || error::gen(format!("{str_fmt} is too large"));
    let mut seconds: u64 = 0;
    for c in str_fmt.chars() {
        if let Some(digit) = c.to_digit(10) {
            seconds = seconds
                .checked_mul(10)
                .and_then(|s| s.checked_add(digit as u64))
                .ok_or_else(too_large)?;
        } else {
            if c.is_whitespace() {
                continue;
            }
            seconds = seconds
                .checked_mul(Time::try_from(c)?.to_seconds())
                .ok_or_else(too_large)?;
            break;
        }
    }
    Ok(Seconds(seconds))
}

impl TryFrom<&str> for Seconds {
    type Error = SWError;

    fn try_from(str_fmt: &str) -> std::result::Result<Self, Self::Error> {
        match string_to_seconds(str_fmt) {
            Ok(seconds) => Ok(seconds),
            Err(err) => Err(SWError::TimeConversionError(format!(
                "Could not convert {str_fmt} to time format: {err}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_formatted_string_to_seconds() {
        let test_table = vec![
            ("1s", Seconds(1)),
            ("2 seconds", Seconds(2)),
            ("2seconds", Seconds(2)),
            ("2 s", Seconds(2)),
            ("1m", Seconds(60)),
            ("2 minutes", Seconds(120)),
            ("1h", Seconds(3600)),
            ("2 hours", Seconds(7200)),
            // If no time format is specified, it defaults to seconds
            ("300", Seconds(300)),
            // empty string is zero
            ("", Seconds(0)),
        ];
        for (input, expected) in test_table {
            let actual = string_to_seconds(input).unwrap();
            assert_eq!(expected.0, actual.0);
        }
    }

    #[test]
    fn test_cannot_convert_time_formatted_string_to_seconds() {
        let test_table = vec![
            "2x",
            // u64 overflow while reading digits
            "99999999999999999999s",
            // u64 overflow when applying the unit
            "9999999999999999h",
        ];
        for input_err in test_table {
            match Seconds::try_from(input_err) {
                Err(SWError::TimeConversionError(_)) => (),
                _ => panic!("Expected TimeConversionError for {input_err}"),
            }
        }
    }

    #[test]
    fn test_zero_seconds_is_no_timeout() {
        assert_eq!(None, Seconds::new(0).as_timeout());
        assert_eq!(Some(Duration::from_secs(10)), Seconds::new(10).as_timeout());
    }
}
