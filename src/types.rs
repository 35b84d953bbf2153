// 1.0: all the primitives live here. identities, timestamps, fixed-point amounts and ratios.
// amounts are u128 base units with 18 implied decimals. no floats anywhere in the engine.

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DECIMALS: u32 = 18;

// 1.0 == 10^18. shared base for amounts and ratios.
pub const WAD: u128 = 1_000_000_000_000_000_000;

// 360-day accounting year.
pub const SECONDS_PER_YEAR: u64 = 360 * 24 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub u64);

impl Address {
    pub const ZERO: Address = Address(0);
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionId(pub u64);

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pos-{}", self.0)
    }
}

// 1.1: unix timestamp in whole seconds. epochs are configured in seconds too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp().max(0) as u64)
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn plus(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    // zero when `earlier` is actually later
    pub fn seconds_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = i64::try_from(self.0).unwrap_or(i64::MAX);
        match chrono::DateTime::<chrono::Utc>::from_timestamp(secs, 0) {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S UTC")),
            None => write!(f, "{}s", self.0),
        }
    }
}

/// Exact `floor(product(factors) / denominator)`.
///
/// The product is formed in arbitrary precision, so chained truncating
/// divisions `((a * b) / c) / d` can be expressed as one call with `c * d`
/// as the denominator and give the same bits. `None` on a zero denominator
/// or when the quotient does not fit in a `u128`.
pub fn mul_div_floor(factors: &[u128], denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let product = factors
        .iter()
        .fold(BigUint::from(1u32), |acc, factor| acc * BigUint::from(*factor));
    (product / BigUint::from(denominator)).to_u128()
}

fn fmt_fixed(raw: u128, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let whole = raw / WAD;
    let frac = raw % WAD;
    if frac == 0 {
        return write!(f, "{}", whole);
    }
    let digits = format!("{:018}", frac);
    write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
}

fn raw_from_decimal(value: Decimal) -> Option<u128> {
    if value.is_sign_negative() && !value.is_zero() {
        return None;
    }
    let truncated = value.round_dp_with_strategy(DECIMALS, RoundingStrategy::ToZero);
    let mantissa = u128::try_from(truncated.mantissa()).ok()?;
    let pad = 10u128.checked_pow(DECIMALS - truncated.scale())?;
    mantissa.checked_mul(pad)
}

fn raw_to_decimal(raw: u128) -> Option<Decimal> {
    let mantissa = i128::try_from(raw).ok()?;
    Decimal::try_from_i128_with_scale(mantissa, DECIMALS)
        .ok()
        .map(|d| d.normalize())
}

// 1.2: quantity of the underlying asset. liquidity, fees, principal all use this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    // whole tokens, e.g. from_units(200) == 200.0
    pub fn from_units(units: u64) -> Self {
        Self(units as u128 * WAD)
    }

    /// Truncates toward zero past 18 places. Negative values are rejected.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        raw_from_decimal(value).map(Self)
    }

    pub fn to_decimal(&self) -> Option<Decimal> {
        raw_to_decimal(self.0)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(&self, other: Amount) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(&self, other: Amount) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(&self, other: Amount) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    // floor(self * ratio)
    pub fn mul_ratio(&self, ratio: Ratio) -> Option<Self> {
        mul_div_floor(&[self.0, ratio.0], WAD).map(Self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_fixed(self.0, f)
    }
}

// 1.3: fixed-point ratio. fee rates, benchmark profit, utilization. ONE == 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Ratio(u128);

impl Ratio {
    pub const ZERO: Ratio = Ratio(0);
    pub const ONE: Ratio = Ratio(WAD);

    pub fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    pub fn from_decimal(value: Decimal) -> Option<Self> {
        raw_from_decimal(value).map(Self)
    }

    pub fn to_decimal(&self) -> Option<Decimal> {
        raw_to_decimal(self.0)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    // floor(numerator / denominator) in the ratio base. zero when denominator is zero.
    pub fn of(numerator: Amount, denominator: Amount) -> Option<Self> {
        if denominator.is_zero() {
            return Some(Self::ZERO);
        }
        mul_div_floor(&[numerator.0, WAD], denominator.0).map(Self)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_fixed(self.0, f)
    }
}

// 1.4: signed difference of two amounts. positive = the vault gained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignedAmount(i128);

impl SignedAmount {
    pub const ZERO: SignedAmount = SignedAmount(0);

    // minuend - subtrahend
    pub fn diff(minuend: Amount, subtrahend: Amount) -> Option<Self> {
        let a = i128::try_from(minuend.0).ok()?;
        let b = i128::try_from(subtrahend.0).ok()?;
        a.checked_sub(b).map(Self)
    }

    pub fn raw(&self) -> i128 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn gain(&self) -> Amount {
        if self.0 > 0 {
            Amount(self.0.unsigned_abs())
        } else {
            Amount::ZERO
        }
    }

    pub fn loss(&self) -> Amount {
        if self.0 < 0 {
            Amount(self.0.unsigned_abs())
        } else {
            Amount::ZERO
        }
    }
}

impl fmt::Display for SignedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-")?;
        }
        fmt_fixed(self.0.unsigned_abs(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amount_from_decimal_truncates() {
        let a = Amount::from_decimal(dec!(1.0000000000000000019)).unwrap();
        assert_eq!(a.raw(), WAD + 1);

        assert_eq!(Amount::from_decimal(dec!(200)).unwrap(), Amount::from_units(200));
        assert!(Amount::from_decimal(dec!(-1)).is_none());
    }

    #[test]
    fn amount_display_trims_zeros() {
        assert_eq!(Amount::from_units(100).to_string(), "100");
        assert_eq!(Amount::from_raw(1_038_888_888_888_888_888).to_string(), "1.038888888888888888");
        assert_eq!(Amount::from_decimal(dec!(0.5)).unwrap().to_string(), "0.5");
    }

    #[test]
    fn amount_decimal_round_trip_is_normalized() {
        let a = Amount::from_raw(108_961_111_111_111_111_112);
        assert_eq!(a.to_decimal().unwrap(), dec!(108.961111111111111112));
        assert_eq!(Amount::from_units(3).to_decimal().unwrap().to_string(), "3");
    }

    #[test]
    fn mul_div_matches_nested_floors() {
        // ((100e18 * 0.02e18 * 604800) / 31104000) / 1e18
        let total = 100 * WAD;
        let rate = 2 * WAD / 100;
        let nested = total * rate / WAD * 604_800 / SECONDS_PER_YEAR as u128;
        let flat = mul_div_floor(&[total, rate, 604_800], SECONDS_PER_YEAR as u128 * WAD).unwrap();
        assert_eq!(flat, 38_888_888_888_888_888);
        assert_eq!(flat, nested);
    }

    #[test]
    fn mul_div_survives_wide_intermediates() {
        // product is ~1e66, quotient fits
        let big = 1_000_000_000_000 * WAD;
        let q = mul_div_floor(&[big, WAD, 31_104_000], 31_104_000 * WAD).unwrap();
        assert_eq!(q, big);
        assert!(mul_div_floor(&[1, 2], 0).is_none());
        assert!(mul_div_floor(&[u128::MAX, u128::MAX], 1).is_none());
    }

    #[test]
    fn ratio_of_zero_denominator() {
        assert_eq!(Ratio::of(Amount::from_units(5), Amount::ZERO), Some(Ratio::ZERO));
        let r = Ratio::of(Amount::from_units(10), Amount::from_units(100)).unwrap();
        assert_eq!(r.to_decimal().unwrap(), dec!(0.1));
    }

    #[test]
    fn signed_amount_parts() {
        let up = SignedAmount::diff(Amount::from_units(110), Amount::from_units(100)).unwrap();
        assert_eq!(up.gain(), Amount::from_units(10));
        assert_eq!(up.loss(), Amount::ZERO);

        let down = SignedAmount::diff(Amount::from_units(90), Amount::from_units(100)).unwrap();
        assert!(down.is_negative());
        assert_eq!(down.gain(), Amount::ZERO);
        assert_eq!(down.loss(), Amount::from_units(10));
        assert_eq!(down.to_string(), "-10");
    }

    #[test]
    fn timestamp_arithmetic() {
        let t = Timestamp::from_secs(1_000);
        assert_eq!(t.plus(500).as_secs(), 1_500);
        assert_eq!(t.seconds_since(Timestamp::from_secs(400)), 600);
        assert_eq!(t.seconds_since(Timestamp::from_secs(4_000)), 0);
    }
}
