//! Textual score tokens for after-the-fact corrections: an optional single
//! leading multiplier letter (`D` double, `T` triple) followed by the base
//! value, e.g. `"D20"`, `"T19"`, `"5"`, `"0"` for a miss.

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CorrectionError {
    #[error("empty score token")]
    Empty,
    #[error("unknown multiplier prefix '{0}'")]
    UnknownPrefix(char),
    #[error("invalid score number in '{0}'")]
    InvalidNumber(String),
}

/// Parse a score token into `(base, multiplier)`. Bare digits imply
/// multiplier 1, except a bare `0` which is a miss (multiplier 0).
pub fn parse_score_token(token: &str) -> Result<(i32, u8), CorrectionError> {
    let token = token.trim();
    let Some(first) = token.chars().next() else {
        return Err(CorrectionError::Empty);
    };

    let (multiplier, digits) = match first {
        'D' => (2, &token[1..]),
        'T' => (3, &token[1..]),
        c if c.is_ascii_digit() => (1, token),
        c => return Err(CorrectionError::UnknownPrefix(c)),
    };

    let base: i32 = digits
        .parse()
        .map_err(|_| CorrectionError::InvalidNumber(token.to_string()))?;

    let multiplier = if base == 0 { 0 } else { multiplier };
    Ok((base, multiplier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_number_is_a_single() {
        assert_eq!(parse_score_token("5"), Ok((5, 1)));
        assert_eq!(parse_score_token("20"), Ok((20, 1)));
    }

    #[test]
    fn prefixes_set_the_multiplier() {
        assert_eq!(parse_score_token("D20"), Ok((20, 2)));
        assert_eq!(parse_score_token("T19"), Ok((19, 3)));
        assert_eq!(parse_score_token("D25"), Ok((25, 2)));
    }

    #[test]
    fn zero_is_a_miss() {
        assert_eq!(parse_score_token("0"), Ok((0, 0)));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(parse_score_token(" T20 "), Ok((20, 3)));
    }

    #[test]
    fn bad_tokens_are_rejected() {
        assert_eq!(parse_score_token(""), Err(CorrectionError::Empty));
        assert_eq!(
            parse_score_token("X20"),
            Err(CorrectionError::UnknownPrefix('X'))
        );
        assert_eq!(
            parse_score_token("D"),
            Err(CorrectionError::InvalidNumber("D".to_string()))
        );
        assert_eq!(
            parse_score_token("Dtwenty"),
            Err(CorrectionError::InvalidNumber("Dtwenty".to_string()))
        );
    }
}
