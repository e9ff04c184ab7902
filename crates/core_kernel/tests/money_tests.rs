//! Integration tests for the Money module
//!
//! Covers creation, rounding, the helpers used by reserve calculation,
//! and currency handling.

use core_kernel::{Money, Currency, MoneyError};
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_creates_money_with_correct_amount() {
        let m = Money::new(dec!(100.50), Currency::USD);
        assert_eq!(m.amount(), dec!(100.50));
        assert_eq!(m.currency(), Currency::USD);
    }

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = Money::new(dec!(100.123456789), Currency::USD);
        assert_eq!(m.amount(), dec!(100.1235));
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        let m = Money::zero(Currency::EUR);
        assert!(m.is_zero());
        assert_eq!(m.currency(), Currency::EUR);
    }

    #[test]
    fn test_negative_amount_is_detected() {
        assert!(Money::usd(dec!(-0.01)).is_negative());
        assert!(!Money::usd(dec!(0)).is_negative());
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_add_and_sub() {
        let a = Money::usd(dec!(100.00));
        let b = Money::usd(dec!(40.00));
        assert_eq!(a.checked_add(&b).unwrap().amount(), dec!(140.00));
        assert_eq!(a.checked_sub(&b).unwrap().amount(), dec!(60.00));
    }

    #[test]
    fn test_multiply_by_risk_multiplier() {
        let reserve = Money::usd(dec!(75000)).multiply(dec!(1.2)).unwrap();
        assert_eq!(reserve.amount(), dec!(90000));
    }

    #[test]
    fn test_sum_overflow_is_reported() {
        let huge = Money::usd(rust_decimal::Decimal::MAX / dec!(2));
        let amounts = vec![huge, huge, huge];
        assert!(matches!(
            Money::sum(Currency::USD, &amounts),
            Err(MoneyError::Overflow(_))
        ));
    }

    #[test]
    fn test_divide_by_zero_is_error() {
        let result = Money::usd(dec!(10)).divide(dec!(0));
        assert_eq!(result, Err(MoneyError::DivisionByZero));
    }

    #[test]
    fn test_sum_of_empty_is_zero() {
        let total = Money::sum(Currency::GBP, std::iter::empty()).unwrap();
        assert!(total.is_zero());
        assert_eq!(total.currency(), Currency::GBP);
    }

    #[test]
    fn test_sum_rejects_mixed_currencies() {
        let amounts = vec![Money::usd(dec!(1)), Money::new(dec!(1), Currency::CAD)];
        assert!(Money::sum(Currency::USD, &amounts).is_err());
    }
}

mod display {
    use super::*;

    #[test]
    fn test_display_uses_symbol_and_minor_units() {
        assert_eq!(Money::usd(dec!(1234.5)).to_string(), "$1234.50");
        assert_eq!(Money::new(dec!(1500), Currency::JPY).to_string(), "¥1500");
    }

    #[test]
    fn test_currency_serializes_uppercase() {
        let json = serde_json::to_string(&Currency::EUR).unwrap();
        assert_eq!(json, "\"EUR\"");
    }
}
