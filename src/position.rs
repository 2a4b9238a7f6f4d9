// 7.0: net exposure of one account in one asset. entry price is tracked per side.
// 7.1 apply_long / apply_short at the bottom: averaging, netting, flipping.

use crate::math::MathError;
use crate::types::PositionType;
use primitive_types::{U256, U512};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub entry_long_price: U256,
    pub acc_long_amount: U256,
    pub entry_short_price: U256,
    pub acc_short_amount: U256,
    pub position_type: PositionType,
    // mirror the pool's scaled balances, not the classification
    pub has_collateral: bool,
    pub has_debt: bool,
}

impl Position {
    pub fn is_flat(&self) -> bool {
        self.position_type == PositionType::Flat
    }

    /// Neither collateral nor debt left: the position can be dropped.
    pub fn is_empty(&self) -> bool {
        !self.has_collateral && !self.has_debt
    }

    /// Open amount and entry price of the current side. zero when flat.
    pub fn exposure(&self) -> (U256, U256) {
        match self.position_type {
            PositionType::Long => (self.acc_long_amount, self.entry_long_price),
            PositionType::Short => (self.acc_short_amount, self.entry_short_price),
            PositionType::Flat => (U256::zero(), U256::zero()),
        }
    }

    fn leg(&self, side: PositionType) -> (U256, U256) {
        match side {
            PositionType::Short => (self.entry_short_price, self.acc_short_amount),
            _ => (self.entry_long_price, self.acc_long_amount),
        }
    }

    fn set_leg(&mut self, side: PositionType, entry: U256, acc: U256) {
        match side {
            PositionType::Short => {
                self.entry_short_price = entry;
                self.acc_short_amount = acc;
            }
            _ => {
                self.entry_long_price = entry;
                self.acc_long_amount = acc;
            }
        }
    }

    fn clear_legs(&mut self) {
        self.entry_long_price = U256::zero();
        self.acc_long_amount = U256::zero();
        self.entry_short_price = U256::zero();
        self.acc_short_amount = U256::zero();
        self.position_type = PositionType::Flat;
    }
}

pub fn apply_long(position: Position, price: U256, amount: U256, accumulate_price: bool) -> Result<Position, MathError> {
    apply(position, PositionType::Long, price, amount, accumulate_price)
}

pub fn apply_short(position: Position, price: U256, amount: U256, accumulate_price: bool) -> Result<Position, MathError> {
    apply(position, PositionType::Short, price, amount, accumulate_price)
}

// 7.1: one transition for both sides. `side` is Long or Short.
fn apply(
    mut position: Position,
    side: PositionType,
    price: U256,
    amount: U256,
    accumulate_price: bool,
) -> Result<Position, MathError> {
    if amount.is_zero() {
        return Ok(position);
    }

    if position.position_type == PositionType::Flat {
        position.clear_legs();
        position.set_leg(side, price, amount);
        position.position_type = side;
        return Ok(position);
    }

    if position.position_type == side {
        let (entry, acc) = position.leg(side);
        let next_acc = acc.checked_add(amount).ok_or(MathError::Overflow)?;
        let next_entry = if accumulate_price {
            weighted_average(entry, acc, price, amount)?
        } else {
            entry
        };
        position.set_leg(side, next_entry, next_acc);
        return Ok(position);
    }

    // opposite side: net against the open amount
    let opposite = side.opposite();
    let (entry, acc) = position.leg(opposite);
    if amount < acc {
        position.set_leg(opposite, entry, acc - amount);
        return Ok(position);
    }

    let residual = amount - acc;
    position.clear_legs();
    if !residual.is_zero() {
        position.set_leg(side, price, residual);
        position.position_type = side;
    }
    Ok(position)
}

/// `(p1 * a1 + p2 * a2) / (a1 + a2)`, truncating.
fn weighted_average(p1: U256, a1: U256, p2: U256, a2: U256) -> Result<U256, MathError> {
    let total = U512::from(a1) + U512::from(a2);
    if total.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let weighted = p1.full_mul(a1) + p2.full_mul(a2);
    U256::try_from(weighted / total).map_err(|_| MathError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::RAY;

    fn units(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    #[test]
    fn flat_to_long() {
        let p = apply_long(Position::default(), RAY * 8, units(100_000), true).unwrap();
        assert_eq!(p.position_type, PositionType::Long);
        assert_eq!(p.entry_long_price, RAY * 8);
        assert_eq!(p.acc_long_amount, units(100_000));
        assert!(p.acc_short_amount.is_zero());
    }

    #[test]
    fn accumulating_averages_entry() {
        let p = apply_long(Position::default(), RAY * 8, units(100), true).unwrap();
        let p = apply_long(p, RAY * 10, units(100), true).unwrap();
        assert_eq!(p.entry_long_price, RAY * 9);
        assert_eq!(p.acc_long_amount, units(200));
    }

    #[test]
    fn averaging_truncates() {
        // (1 * 1 + 2 * 2) / 3 = 1.66 -> 1
        let p = apply_long(Position::default(), U256::from(1), U256::from(1), true).unwrap();
        let p = apply_long(p, U256::from(2), U256::from(2), true).unwrap();
        assert_eq!(p.entry_long_price, U256::from(1));
    }

    #[test]
    fn non_accumulating_keeps_entry() {
        let p = apply_long(Position::default(), RAY * 8, units(100), true).unwrap();
        let p = apply_long(p, RAY * 20, units(50), false).unwrap();
        assert_eq!(p.entry_long_price, RAY * 8);
        assert_eq!(p.acc_long_amount, units(150));
    }

    #[test]
    fn partial_netting_keeps_side() {
        let p = apply_short(Position::default(), RAY * 8, units(100), true).unwrap();
        let p = apply_long(p, RAY * 9, units(40), true).unwrap();
        assert_eq!(p.position_type, PositionType::Short);
        assert_eq!(p.acc_short_amount, units(60));
        assert_eq!(p.entry_short_price, RAY * 8);
    }

    #[test]
    fn exact_netting_goes_flat() {
        let p = apply_long(Position::default(), RAY * 8, units(100), true).unwrap();
        let p = apply_short(p, RAY * 9, units(100), true).unwrap();
        assert_eq!(p.position_type, PositionType::Flat);
        assert_eq!(p.exposure(), (U256::zero(), U256::zero()));
        assert!(p.entry_long_price.is_zero());
    }

    #[test]
    fn overshoot_flips_with_residual() {
        let p = apply_long(Position::default(), RAY * 8, units(100), true).unwrap();
        let p = apply_short(p, RAY * 9, units(150), true).unwrap();
        assert_eq!(p.position_type, PositionType::Short);
        assert_eq!(p.acc_short_amount, units(50));
        assert_eq!(p.entry_short_price, RAY * 9);
        assert!(p.acc_long_amount.is_zero());
        assert!(p.entry_long_price.is_zero());
    }

    #[test]
    fn zero_amount_is_noop() {
        let p = apply_long(Position::default(), RAY, units(1), true).unwrap();
        assert_eq!(apply_short(p, RAY * 2, U256::zero(), true).unwrap(), p);
        assert_eq!(apply_long(Position::default(), RAY, U256::zero(), true).unwrap(), Position::default());
    }

    #[test]
    fn flags_survive_transitions() {
        let mut p = Position::default();
        p.has_collateral = true;
        let p = apply_long(p, RAY, units(1), true).unwrap();
        let p = apply_short(p, RAY, units(1), true).unwrap();
        assert!(p.is_flat());
        assert!(p.has_collateral);
        assert!(!p.is_empty());
    }
}
