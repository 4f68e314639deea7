//! Runner pace parsing and formatting.
//!
//! Paces are entered as `"MM:SS"` per kilometre and used internally as
//! seconds per metre.

use crate::error::{PlannerError, Result};

/// Parse a `"MM:SS"` per-kilometre pace into seconds per metre.
///
/// Both parts must be unsigned integers and the total must be positive. The
/// seconds part is not limited to 0-59 (`"4:75"` is 5:15).
///
/// # Example
///
/// ```rust
/// use cheer_planner::parse_pace;
///
/// assert_eq!(parse_pace("5:00").unwrap(), 0.3);
/// assert!(parse_pace("abc").is_err());
/// ```
pub fn parse_pace(input: &str) -> Result<f64> {
    let parts: Vec<&str> = input.trim().split(':').map(str::trim).collect();
    if parts.len() != 2 {
        return Err(PlannerError::invalid_pace(input, "expected MM:SS per km"));
    }

    let minutes: u32 = parts[0]
        .parse()
        .map_err(|_| PlannerError::invalid_pace(input, "minutes are not a number"))?;
    let seconds: u32 = parts[1]
        .parse()
        .map_err(|_| PlannerError::invalid_pace(input, "seconds are not a number"))?;

    let total = minutes as f64 * 60.0 + seconds as f64;
    if total <= 0.0 {
        return Err(PlannerError::invalid_pace(input, "pace must be longer than zero"));
    }

    Ok(total / 1000.0)
}

/// Format seconds per metre as `"M:SS"` per kilometre.
pub fn format_pace(seconds_per_meter: f64) -> String {
    let total = (seconds_per_meter * 1000.0).round().max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pace_valid() {
        assert_eq!(parse_pace("5:00").unwrap(), 0.3);
        assert_eq!(parse_pace(" 4:30 ").unwrap(), 0.27);
        assert_eq!(parse_pace("0:01").unwrap(), 0.001);
        assert_eq!(parse_pace("4:75").unwrap(), 0.315);
    }

    #[test]
    fn test_parse_pace_invalid() {
        for input in ["abc", "", "5", "5:00:00", "5:xx", "-5:00", "5.5:00", "0:00"] {
            let err = parse_pace(input).unwrap_err();
            assert!(
                matches!(err, PlannerError::InvalidPace { .. }),
                "{:?} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_format_pace() {
        assert_eq!(format_pace(0.3), "5:00");
        assert_eq!(format_pace(0.2675), "4:28");
        assert_eq!(format_pace(0.35999), "6:00");
    }
}
