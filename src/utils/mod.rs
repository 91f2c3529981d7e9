// Decimal helpers shared by the price feed and the conversion service

pub mod money {
    use rust_decimal::{Decimal, RoundingStrategy};
    use rust_decimal_macros::dec;

    /// Fractional digits kept for prices and converted amounts (NUMERIC(12, 2))
    pub const MONEY_SCALE: u32 = 2;

    /// Smallest value that no longer fits in NUMERIC(12, 2)
    pub const MAX_STORABLE: Decimal = dec!(10000000000);

    /// Round to two fractional digits, ties away from zero (2.345 -> 2.35).
    /// The result always carries exactly two fractional digits.
    pub fn round_money(value: Decimal) -> Decimal {
        let mut rounded =
            value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(MONEY_SCALE);
        rounded
    }

    /// A price is storable when it is positive and fits the column
    pub fn is_valid_price(price: Decimal) -> bool {
        price > Decimal::ZERO && price < MAX_STORABLE
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_round_money_ties_away_from_zero() {
            assert_eq!(round_money(dec!(2.345)), dec!(2.35));
            assert_eq!(round_money(dec!(2.355)), dec!(2.36));
            assert_eq!(round_money(dec!(-2.345)), dec!(-2.35));
            assert_eq!(round_money(dec!(2.344)), dec!(2.34));
        }

        #[test]
        fn test_round_money_keeps_scale() {
            assert_eq!(round_money(dec!(500)).to_string(), "500.00");
            assert_eq!(round_money(dec!(500.000)).to_string(), "500.00");
        }

        #[test]
        fn test_is_valid_price() {
            assert!(is_valid_price(dec!(0.01)));
            assert!(is_valid_price(dec!(9999999999.99)));
            assert!(!is_valid_price(dec!(0)));
            assert!(!is_valid_price(dec!(-1)));
            assert!(!is_valid_price(dec!(10000000000)));
        }
    }
}
