//! Trade Condition Filtering
//!
//! Polygon annotates trades with integer condition codes. Code 51 marks an
//! exchange summary message, which is not a real trade and must not be
//! recorded.

/// Condition code for exchange summary messages.
pub const CONDITION_EXCHANGE_SUMMARY: i64 = 51;

/// Decide whether a trade must be suppressed based on its condition codes.
///
/// Returns true iff the exchange summary code appears anywhere in the list.
/// An empty list never suppresses.
#[must_use]
pub fn is_exchange_summary(codes: &[i64]) -> bool {
    codes.contains(&CONDITION_EXCHANGE_SUMMARY)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(&[], false; "empty list")]
    #[test_case(&[51], true; "only summary code")]
    #[test_case(&[12, 37], false; "other codes")]
    #[test_case(&[12, 51, 37], true; "summary mid list")]
    #[test_case(&[12, 37, 51], true; "summary last")]
    #[test_case(&[51, 51], true; "repeated")]
    #[test_case(&[0], false; "zero from unparsable code")]
    #[test_case(&[-51], false; "sign matters")]
    fn suppression_decision(codes: &[i64], expected: bool) {
        assert_eq!(is_exchange_summary(codes), expected);
    }
}
