use crate::error::MalformedTimeError;

use super::types::Minutes;

/// Parses a wall-clock time (HH:MM) to minutes since midnight.
///
/// Both parts must be exactly two digits, hours `00..=23` and minutes
/// `00..=59`. Surrounding whitespace is ignored.
pub fn parse_time_to_minutes(time_str: &str) -> Result<Minutes, MalformedTimeError> {
    let malformed = || MalformedTimeError {
        input: time_str.to_string(),
    };

    let (hours, minutes) = time_str.trim().split_once(':').ok_or_else(malformed)?;
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return Err(malformed());
    }

    let hours: Minutes = hours.parse().map_err(|_| malformed())?;
    let minutes: Minutes = minutes.parse().map_err(|_| malformed())?;
    if hours >= 24 || minutes >= 60 {
        return Err(malformed());
    }
    Ok(hours * 60 + minutes)
}

/// Formats minutes since midnight to time string (HH:MM)
pub fn minutes_to_time_string(minutes: Minutes) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    format!("{:02}:{:02}", hours % 24, mins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_boundaries() {
        assert_eq!(parse_time_to_minutes("00:00"), Ok(0));
        assert_eq!(parse_time_to_minutes("23:59"), Ok(1439));
        assert_eq!(parse_time_to_minutes(" 09:30 "), Ok(570));
    }

    #[test]
    fn rejects_malformed_input() {
        for input in ["", "9:00", "24:00", "12:60", "12-30", "ab:cd", "12:30:00", "+1:30", "10:5"] {
            let err = parse_time_to_minutes(input).unwrap_err();
            assert_eq!(err.input, input);
        }
    }

    #[test]
    fn formats_with_padding() {
        assert_eq!(minutes_to_time_string(0), "00:00");
        assert_eq!(minutes_to_time_string(605), "10:05");
    }

    proptest! {
        #[test]
        fn prop_parse_format_round_trip(h in 0u16..24, m in 0u16..60) {
            let text = format!("{:02}:{:02}", h, m);
            prop_assert_eq!(parse_time_to_minutes(&text), Ok(h * 60 + m));
            prop_assert_eq!(minutes_to_time_string(h * 60 + m), text);
        }
    }
}
