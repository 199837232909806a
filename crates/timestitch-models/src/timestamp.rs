//! Timestamp token parsing and formatting.
//!
//! Comment timestamps come in the colon forms viewers actually type:
//! `M:SS`, `MM:SS`, or `H:MM:SS`. Parsing is strict about component
//! ranges so that malformed tokens can be skipped line-by-line instead
//! of poisoning a whole comment.

use thiserror::Error;

/// Errors produced when a timestamp token cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("timestamp token is empty")]
    Empty,

    #[error("invalid timestamp format '{0}': expected M:SS, MM:SS, or H:MM:SS")]
    InvalidFormat(String),

    #[error("invalid {component} value '{value}'")]
    InvalidValue {
        component: &'static str,
        value: String,
    },

    #[error("{component} component {value} is out of range (must be < 60)")]
    OutOfRange { component: &'static str, value: u32 },
}

fn parse_component(component: &'static str, raw: &str) -> Result<u32, TimestampError> {
    if raw.is_empty() || raw.len() > 3 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimestampError::InvalidValue {
            component,
            value: raw.to_string(),
        });
    }
    raw.parse().map_err(|_| TimestampError::InvalidValue {
        component,
        value: raw.to_string(),
    })
}

fn checked_sexagesimal(component: &'static str, raw: &str) -> Result<u32, TimestampError> {
    let value = parse_component(component, raw)?;
    if value >= 60 {
        return Err(TimestampError::OutOfRange { component, value });
    }
    Ok(value)
}

/// Parse a single timestamp token into whole seconds.
///
/// Accepts `M:SS`, `MM:SS`, and `H:MM:SS`. Minutes and seconds must be
/// below 60; hours are unbounded. Anything else is an error.
pub fn parse_token(token: &str) -> Result<u32, TimestampError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = token.split(':').collect();
    match parts.len() {
        2 => {
            let minutes = checked_sexagesimal("minutes", parts[0])?;
            let seconds = checked_sexagesimal("seconds", parts[1])?;
            Ok(minutes * 60 + seconds)
        }
        3 => {
            let hours = parse_component("hours", parts[0])?;
            let minutes = checked_sexagesimal("minutes", parts[1])?;
            let seconds = checked_sexagesimal("seconds", parts[2])?;
            Ok(hours * 3600 + minutes * 60 + seconds)
        }
        _ => Err(TimestampError::InvalidFormat(token.to_string())),
    }
}

/// Format seconds as `HH:MM:SS` for logs and upload descriptions.
pub fn format_seconds(total_secs: f64) -> String {
    let total = total_secs.max(0.0).round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Format seconds as a filename-safe `MMmSSs` marker, e.g. `02m45s`.
///
/// Minutes roll past 59 rather than spilling into an hour field so the
/// marker stays fixed-width for typical video lengths.
pub fn format_compact(total_secs: f64) -> String {
    let total = total_secs.max(0.0).round() as u64;
    format!("{:02}m{:02}s", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minute_second_tokens() {
        assert_eq!(parse_token("2:00").unwrap(), 120);
        assert_eq!(parse_token("2:45").unwrap(), 165);
        assert_eq!(parse_token("12:05").unwrap(), 725);
        assert_eq!(parse_token("0:59").unwrap(), 59);
    }

    #[test]
    fn parses_hour_tokens() {
        assert_eq!(parse_token("1:00:00").unwrap(), 3600);
        assert_eq!(parse_token("1:02:03").unwrap(), 3723);
        assert_eq!(parse_token("10:59:59").unwrap(), 39599);
    }

    #[test]
    fn rejects_out_of_range_components() {
        assert!(matches!(
            parse_token("2:60"),
            Err(TimestampError::OutOfRange {
                component: "seconds",
                value: 60
            })
        ));
        assert!(matches!(
            parse_token("61:30"),
            Err(TimestampError::OutOfRange {
                component: "minutes",
                ..
            })
        ));
        assert!(matches!(
            parse_token("1:61:00"),
            Err(TimestampError::OutOfRange {
                component: "minutes",
                ..
            })
        ));
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(matches!(parse_token(""), Err(TimestampError::Empty)));
        assert!(matches!(
            parse_token("90"),
            Err(TimestampError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_token("1:2:3:4"),
            Err(TimestampError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_token("ab:cd"),
            Err(TimestampError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse_token("1:-5"),
            Err(TimestampError::InvalidValue { .. })
        ));
    }

    #[test]
    fn formats_seconds() {
        assert_eq!(format_seconds(0.0), "00:00:00");
        assert_eq!(format_seconds(165.0), "00:02:45");
        assert_eq!(format_seconds(3723.0), "01:02:03");
    }

    #[test]
    fn formats_compact_markers() {
        assert_eq!(format_compact(0.0), "00m00s");
        assert_eq!(format_compact(165.0), "02m45s");
        assert_eq!(format_compact(3700.0), "61m40s");
    }
}
