//! Fixed-point weight values.
//!
//! Both emulated indicators resolve 0.1 kg, so weights are held as tenths of
//! a kilogram in `i32`. Operator input is quantized once at the float
//! boundary; everything downstream is integral and deterministic.

use std::fmt;

/// Indicator resolution in kilograms per unit.
pub const RESOLUTION_KG: f32 = 0.1;

/// A weight in tenths of a kilogram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Weight(i32);

impl Weight {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub const fn from_tenths(tenths: i32) -> Self {
        Self(tenths)
    }

    /// Quantize a kilograms value to the indicator resolution.
    #[inline]
    pub fn from_kg(kg: f32) -> Self {
        Self(quantize_to_tenths_i32(kg))
    }

    #[inline]
    pub const fn tenths(self) -> i32 {
        self.0
    }

    #[inline]
    pub fn as_kg(self) -> f32 {
        self.0 as f32 * RESOLUTION_KG
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Render from integer parts; i64 magnitude so i32::MIN cannot overflow.
        let t = i64::from(self.0);
        let sign = if t < 0 { "-" } else { "" };
        let mag = t.unsigned_abs();
        write!(f, "{sign}{}.{}", mag / 10, mag % 10)
    }
}

/// Quantize a floating-point kilograms value to integer tenths, rounding to
/// nearest and clamping to the i32 range. Non-finite values (NaN/±Inf) map to 0.
#[inline]
pub fn quantize_to_tenths_i32(x_kg: f32) -> i32 {
    if !x_kg.is_finite() {
        return 0;
    }
    let scaled = (x_kg * 10.0).round();
    if scaled >= i32::MAX as f32 {
        i32::MAX
    } else if scaled <= i32::MIN as f32 {
        i32::MIN
    } else {
        scaled as i32
    }
}
