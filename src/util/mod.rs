//! Parsing of user-typed fields
//!
//! Every parser validates the whole input before returning, so a rejected
//! field never causes a partial model change.

use crate::StepError;

/// Parse one integer field, surrounding whitespace allowed
pub fn parse_int(text: &str) -> Result<i64, StepError> {
    let trimmed = text.trim();
    trimmed
        .parse()
        .map_err(|_| StepError::InvalidInput(format!("'{trimmed}' is not an integer")))
}

/// Parse a non-negative index field
pub fn parse_index(text: &str) -> Result<usize, StepError> {
    let trimmed = text.trim();
    trimmed
        .parse()
        .map_err(|_| StepError::InvalidInput(format!("'{trimmed}' is not an index")))
}

/// Parse comma separated integers; empty fields are skipped
pub fn parse_csv(text: &str) -> Result<Vec<i64>, StepError> {
    text.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(parse_int)
        .collect()
}

/// Parse an edge written `u-v`
pub fn parse_edge(text: &str) -> Result<(usize, usize), StepError> {
    let invalid = || StepError::InvalidInput(format!("'{}' is not an edge like 0-1", text.trim()));
    let (u, v) = text.split_once('-').ok_or_else(invalid)?;
    let u = parse_index(u).map_err(|_| invalid())?;
    let v = parse_index(v).map_err(|_| invalid())?;
    Ok((u, v))
}

/// Parse comma separated edges, `0-1, 1-2`
pub fn parse_edges(text: &str) -> Result<Vec<(usize, usize)>, StepError> {
    text.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(parse_edge)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(" 42 ", 42 ; "padded")]
    #[test_case("-7", -7 ; "negative")]
    fn test_parse_int_accepts(input: &str, expected: i64) {
        assert_eq!(parse_int(input), Ok(expected));
    }

    #[test_case("" ; "empty")]
    #[test_case("4x" ; "trailing garbage")]
    #[test_case("1.5" ; "decimal")]
    fn test_parse_int_rejects(input: &str) {
        assert!(matches!(parse_int(input), Err(StepError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_csv_is_strict() {
        assert_eq!(parse_csv("5, 3,,8 ,1"), Ok(vec![5, 3, 8, 1]));
        assert_eq!(parse_csv(""), Ok(vec![]));
        assert!(parse_csv("1, two, 3").is_err());
    }

    #[test]
    fn test_parse_edges() {
        assert_eq!(parse_edge(" 2 - 3 "), Ok((2, 3)));
        assert_eq!(parse_edges("0-1, 1-2"), Ok(vec![(0, 1), (1, 2)]));
        assert!(parse_edge("0-").is_err());
        assert!(parse_edge("0_1").is_err());
        assert!(parse_edges("0-1, -1-2").is_err());
    }
}
