//! Honey blobs: depletable colored food placed by the player.

use crate::color::Rgb;
use crate::config::HoneyConfig;
use crate::fixed::{Fixed64, f64_to_fixed64, ratio};

/// Per-tick decay of the placement wobble.
const WOBBLE_DECAY: f32 = 0.92;
/// Wobble oscillation speed, radians per second.
const WOBBLE_SPEED: f32 = 18.0;

/// A depletable blob of colored honey.
///
/// `amount` only ever decreases after creation. The visual radius is derived
/// from it on demand and is zero exactly when the blob is empty.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Honey {
    pub x: f32,
    pub y: f32,
    color: Rgb,
    amount: Fixed64,
    max_amount: Fixed64,
    radius_base: f32,
    radius_span: f32,
    /// Render-only jelly wobble.
    pub wobble_time: f32,
    pub wobble_intensity: f32,
}

impl Honey {
    /// A full blob at `(x, y)`.
    pub fn new(x: f32, y: f32, color: Rgb, config: &HoneyConfig) -> Self {
        let max_amount = f64_to_fixed64(config.max_amount).max(Fixed64::ZERO);
        Self {
            x,
            y,
            color,
            amount: max_amount,
            max_amount,
            radius_base: config.radius_base.max(0.0),
            radius_span: config.radius_span.max(0.0),
            wobble_time: 0.0,
            wobble_intensity: 1.0,
        }
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn amount(&self) -> Fixed64 {
        self.amount
    }

    pub fn max_amount(&self) -> Fixed64 {
        self.max_amount
    }

    pub fn is_empty(&self) -> bool {
        self.amount <= Fixed64::ZERO
    }

    /// Visual radius: grows with the remaining amount, zero when empty.
    pub fn radius(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        self.radius_base + ratio(self.amount, self.max_amount) * self.radius_span
    }

    /// Remove up to `want` units and return how much was actually removed.
    pub fn take(&mut self, want: Fixed64) -> Fixed64 {
        let taken = want.clamp(Fixed64::ZERO, self.amount);
        self.amount -= taken;
        taken
    }

    /// Decrement by `rate`, flooring at zero. Returns whether any honey is left.
    pub fn consume(&mut self, rate: Fixed64) -> bool {
        self.take(rate);
        !self.is_empty()
    }

    /// Advance render-only animation.
    pub fn update(&mut self, dt: f32) {
        self.wobble_time += dt * WOBBLE_SPEED;
        self.wobble_intensity *= WOBBLE_DECAY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob() -> Honey {
        Honey::new(100.0, 100.0, Rgb::new(255.0, 51.0, 51.0), &HoneyConfig::default())
    }

    #[test]
    fn starts_full_at_max_radius() {
        let honey = blob();
        assert_eq!(honey.amount(), Fixed64::from_num(50));
        assert_eq!(honey.radius(), 17.0);
    }

    #[test]
    fn consume_floors_at_zero() {
        let mut honey = blob();
        assert!(honey.consume(Fixed64::from_num(20)));
        assert_eq!(honey.amount(), Fixed64::from_num(30));
        assert!(!honey.consume(Fixed64::from_num(40)));
        assert_eq!(honey.amount(), Fixed64::ZERO);
        assert!(!honey.consume(Fixed64::from_num(1)));
        assert_eq!(honey.amount(), Fixed64::ZERO);
    }

    #[test]
    fn take_returns_what_was_removed() {
        let mut honey = blob();
        assert_eq!(honey.take(Fixed64::from_num(45)), Fixed64::from_num(45));
        assert_eq!(honey.take(Fixed64::from_num(10)), Fixed64::from_num(5));
        assert_eq!(honey.take(Fixed64::from_num(10)), Fixed64::ZERO);
    }

    #[test]
    fn negative_take_is_ignored() {
        let mut honey = blob();
        assert_eq!(honey.take(Fixed64::from_num(-3)), Fixed64::ZERO);
        assert_eq!(honey.amount(), honey.max_amount());
    }

    #[test]
    fn radius_is_zero_iff_empty() {
        let mut honey = blob();
        honey.take(Fixed64::from_num(49.9));
        assert!(honey.radius() > 0.0);
        honey.take(Fixed64::from_num(1));
        assert_eq!(honey.radius(), 0.0);
    }

    #[test]
    fn radius_shrinks_monotonically() {
        let mut honey = blob();
        let mut last = honey.radius();
        for _ in 0..50 {
            honey.take(Fixed64::from_num(1));
            let r = honey.radius();
            assert!(r <= last);
            last = r;
        }
    }

    #[test]
    fn wobble_decays() {
        let mut honey = blob();
        honey.update(1.0 / 60.0);
        honey.update(1.0 / 60.0);
        assert!(honey.wobble_intensity < 0.85);
        assert!(honey.wobble_time > 0.0);
    }
}
