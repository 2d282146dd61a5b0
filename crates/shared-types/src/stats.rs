//! Small numeric helpers shared by the ledger and the aggregation layer.

/// `part / whole` as a percentage rounded to two decimals. Zero when `whole` is zero.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let raw = part as f64 * 100.0 / whole as f64;
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(5, 5), 100.0);
    }

    #[test]
    fn test_percentage_zero_whole() {
        assert_eq!(percentage(10, 0), 0.0);
    }
}
