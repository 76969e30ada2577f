pub mod markup;
pub mod meta;
pub mod structured;

use crate::error::StepError;

/// Parse a follower/connection count like `1,234` or `12.500`, stripping
/// thousands separators.
pub fn parse_count(raw: &str) -> Result<u64, StepError> {
    let digits: String = raw.chars().filter(|c| *c != ',' && *c != '.').collect();
    digits.parse::<u64>().map_err(|_| StepError::BadCount {
        raw: raw.to_string(),
    })
}
