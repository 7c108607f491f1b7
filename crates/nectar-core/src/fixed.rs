use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// Used for every honey quantity (blob amount, ant payload, pot fill) so that
/// transfers between entities are exactly conserved.
pub type Fixed64 = I32F32;

/// Convert an f32 to Fixed64. Non-finite inputs map to zero.
#[inline]
pub fn f32_to_fixed64(v: f32) -> Fixed64 {
    if v.is_finite() {
        Fixed64::saturating_from_num(v)
    } else {
        Fixed64::ZERO
    }
}

/// Convert an f64 (config values) to Fixed64. Non-finite inputs map to zero.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    if v.is_finite() {
        Fixed64::saturating_from_num(v)
    } else {
        Fixed64::ZERO
    }
}

/// Convert Fixed64 to f32. Use only for display, ratios and color weights.
#[inline]
pub fn fixed64_to_f32(v: Fixed64) -> f32 {
    v.to_num::<f32>()
}

/// `part / whole` as an f32 in [0, 1]. Zero when `whole` is not positive.
#[inline]
pub fn ratio(part: Fixed64, whole: Fixed64) -> f32 {
    if whole <= Fixed64::ZERO {
        return 0.0;
    }
    (fixed64_to_f32(part) / fixed64_to_f32(whole)).clamp(0.0, 1.0)
}
