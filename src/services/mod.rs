pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

use rust_decimal::{Decimal, RoundingStrategy};

/// Normalises a currency amount to exactly two fraction digits.
pub fn money(value: Decimal) -> Decimal {
    let mut value = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    value.rescale(2);
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_keeps_two_fraction_digits() {
        assert_eq!(money(Decimal::new(25, 0)).to_string(), "25.00");
        assert_eq!(money(Decimal::new(1999, 2)).to_string(), "19.99");
        assert_eq!(money(Decimal::new(10005, 3)).to_string(), "10.01");
        assert_eq!(money(Decimal::new(101, 1)).to_string(), "10.10");
    }
}
