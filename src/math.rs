// 2.0: fixed point math. ray = 1e27, percentages in bps (1e4 = 100%).
// products are widened to 512 bits before dividing; only a final result above 2^256 fails.

use primitive_types::{U256, U512};
use rust_decimal::Decimal;

pub const RAY: U256 = U256([0x9fd0_803c_e800_0000, 0x033b_2e3c, 0, 0]);
pub const HALF_RAY: U256 = U256([0x4fe8_401e_7400_0000, 0x019d_971e, 0, 0]);

pub const PERCENTAGE_FACTOR: u64 = 10_000;
pub const HALF_PERCENTAGE_FACTOR: u64 = 5_000;

pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

// ray has 27 fractional digits
pub const RAY_DECIMALS: u8 = 27;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Arithmetic underflow")]
    Underflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Negative value {0} has no unsigned fixed point form")]
    Negative(Decimal),
}

fn narrow(value: U512) -> Result<U256, MathError> {
    U256::try_from(value).map_err(|_| MathError::Overflow)
}

/// `a * b / denominator`, truncating.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    narrow(a.full_mul(b) / U512::from(denominator))
}

/// `a * b / denominator`, rounding up.
pub fn mul_div_up(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let denominator = U512::from(denominator);
    let product = a.full_mul(b);
    let quotient = product / denominator;
    if (product % denominator).is_zero() {
        narrow(quotient)
    } else {
        narrow(quotient + U512::one())
    }
}

/// `(a * b + HALF_RAY) / RAY`
pub fn ray_mul(a: U256, b: U256) -> Result<U256, MathError> {
    narrow((a.full_mul(b) + U512::from(HALF_RAY)) / U512::from(RAY))
}

/// `(a * RAY + b / 2) / b`
pub fn ray_div(a: U256, b: U256) -> Result<U256, MathError> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    narrow((a.full_mul(RAY) + U512::from(b / 2)) / U512::from(b))
}

/// `(value * percentage + HALF_PERCENTAGE_FACTOR) / PERCENTAGE_FACTOR`, percentage in bps.
pub fn percent_mul(value: U256, percentage: u64) -> Result<U256, MathError> {
    let product = value.full_mul(U256::from(percentage)) + U512::from(HALF_PERCENTAGE_FACTOR);
    narrow(product / U512::from(PERCENTAGE_FACTOR))
}

pub fn checked_sub(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_sub(b).ok_or(MathError::Underflow)
}

pub fn pow10(exp: u8) -> U256 {
    U256::exp10(exp as usize)
}

/// Rescales an oracle answer with `decimals` fractional digits to ray.
pub fn to_ray(value: U256, decimals: u8) -> Result<U256, MathError> {
    if decimals <= RAY_DECIMALS {
        value
            .checked_mul(pow10(RAY_DECIMALS - decimals))
            .ok_or(MathError::Overflow)
    } else {
        Ok(value / pow10(decimals - RAY_DECIMALS))
    }
}

/// USD value (ray) of `amount` token units with `decimals`, priced at `price` (ray).
pub fn asset_value(amount: U256, price: U256, decimals: u8) -> Result<U256, MathError> {
    mul_div(amount, price, pow10(decimals))
}

/// Converts a human decimal (0.8, 1.1, ...) to ray. digits past the 27th are truncated.
pub fn decimal_to_ray(value: Decimal) -> Result<U256, MathError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(MathError::Negative(value));
    }
    let mantissa = U256::from(value.mantissa().unsigned_abs());
    let scale = value.scale() as u8;
    if scale <= RAY_DECIMALS {
        Ok(mantissa * pow10(RAY_DECIMALS - scale))
    } else {
        Ok(mantissa / pow10(scale - RAY_DECIMALS))
    }
}

/// Ray to decimal with 18 fractional digits. None when the value does not fit a Decimal.
pub fn ray_to_decimal(value: U256) -> Option<Decimal> {
    let scaled = value / pow10(RAY_DECIMALS - 18);
    if scaled > U256::from(u128::MAX) {
        return None;
    }
    let mantissa = i128::try_from(scaled.low_u128()).ok()?;
    Decimal::try_from_i128_with_scale(mantissa, 18).ok()
}
