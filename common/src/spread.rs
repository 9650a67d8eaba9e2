//! USD buy-spread calculation for IDR quotes.

use rust_decimal::Decimal;

/// Derive a spread factor from a username.
///
/// The factor is the sum of the lowercase username's code points modulo 1000,
/// scaled down by 100000, so it always lies in `[0, 0.00999]`.
pub fn spread_factor(username: &str) -> Decimal {
    if username.is_empty() {
        return Decimal::ZERO;
    }

    let sum: u64 = username
        .to_lowercase()
        .chars()
        .map(|c| u64::from(u32::from(c)))
        .sum();

    Decimal::from(sum % 1000) / Decimal::from(100_000)
}

/// IDR needed to buy one USD, given the IDR→USD rate and a spread factor.
///
/// Returns zero for a zero rate rather than dividing by it.
pub fn usd_buy_spread_idr(usd_rate: Decimal, factor: Decimal) -> Decimal {
    if usd_rate.is_zero() {
        return Decimal::ZERO;
    }
    (Decimal::ONE / usd_rate) * (Decimal::ONE + factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_username() {
        assert_eq!(spread_factor(""), Decimal::ZERO);
    }

    #[test]
    fn test_known_username() {
        // 'a' + 'b' + 'c' = 97 + 98 + 99 = 294
        assert_eq!(spread_factor("abc"), dec!(0.00294));
        assert_eq!(spread_factor("ABC"), dec!(0.00294));
    }

    #[test]
    fn test_wraps_modulo_thousand() {
        // 11 * 'z' = 11 * 122 = 1342 -> 342
        assert_eq!(spread_factor("zzzzzzzzzzz"), dec!(0.00342));
    }

    #[test]
    fn test_buy_spread() {
        assert_eq!(usd_buy_spread_idr(dec!(0.0001), Decimal::ZERO), dec!(10000));
        assert_eq!(usd_buy_spread_idr(dec!(0.0001), dec!(0.005)), dec!(10050));
    }

    #[test]
    fn test_buy_spread_zero_rate() {
        assert_eq!(usd_buy_spread_idr(Decimal::ZERO, dec!(0.005)), Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn prop_factor_bounded(name in "\\PC{0,40}") {
            let factor = spread_factor(&name);
            prop_assert!(factor >= Decimal::ZERO);
            prop_assert!(factor <= dec!(0.00999));
        }

        #[test]
        fn prop_spread_never_below_inverse_rate(micros in 1u32..1_000_000, name in "[a-z]{0,16}") {
            let rate = Decimal::new(i64::from(micros), 6);
            let inverse = Decimal::ONE / rate;
            prop_assert!(usd_buy_spread_idr(rate, spread_factor(&name)) >= inverse);
        }
    }
}
