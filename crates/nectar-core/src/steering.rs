//! Heading math shared by every mobile ant state: rate-limited turning and
//! steering around the pot.

use crate::config::PotConfig;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Base turn multiplier applied at the outer edge of the avoidance ring.
const AVOID_BASE_URGENCY: f32 = 2.0;
/// Extra turn multiplier gained at the solid edge.
const AVOID_EXTRA_URGENCY: f32 = 4.0;

/// Normalize an angle into (-π, π]. Non-finite input yields 0.
pub fn wrap_signed_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let a = angle.rem_euclid(TAU);
    if a > PI { a - TAU } else { a }
}

pub fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    (x1 - x2).hypot(y1 - y2)
}

/// Heading that points from `(x, y)` at `(tx, ty)`.
pub fn bearing(x: f32, y: f32, tx: f32, ty: f32) -> f32 {
    (ty - y).atan2(tx - x)
}

/// Rotate `heading` toward `target` along the shorter arc by at most
/// `turn_rate * dt` radians.
pub fn smooth_turn(heading: f32, target: f32, turn_rate: f32, dt: f32) -> f32 {
    let diff = wrap_signed_angle(target - heading);
    let max_step = (turn_rate * dt).max(0.0);
    heading + diff.signum() * diff.abs().min(max_step)
}

/// Steering correction for an ant inside the pot's avoidance ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Avoidance {
    /// Tangent heading, tilted outward, on the side needing less turning.
    pub heading: f32,
    /// Multiplier on `dt` for the turn toward `heading`; larger when closer.
    pub urgency: f32,
    /// Radial push-out velocity while inside the solid body.
    pub push: Option<(f32, f32)>,
}

/// Compute the avoidance correction for an ant at `(x, y)` facing `heading`
/// around a body centered at `center`. `None` outside the avoidance ring.
pub fn pot_avoidance(
    x: f32,
    y: f32,
    heading: f32,
    center: (f32, f32),
    config: &PotConfig,
) -> Option<Avoidance> {
    let dx = x - center.0;
    let dy = y - center.1;
    let dist = dx.hypot(dy);
    if dist >= config.avoidance_radius {
        return None;
    }

    let away = dy.atan2(dx);
    let left = away + FRAC_PI_2 - config.spiral_bias;
    let right = away - FRAC_PI_2 + config.spiral_bias;
    let left_turn = wrap_signed_angle(left - heading).abs();
    let right_turn = wrap_signed_angle(right - heading).abs();
    let tangent = if left_turn < right_turn { left } else { right };

    let band = config.avoidance_radius - config.solid_radius;
    let intensity = (1.0 - (dist - config.solid_radius) / band).clamp(0.0, 1.0);

    let push = (dist < config.solid_radius).then(|| {
        let speed = (config.solid_radius - dist) * config.push_strength;
        (away.cos() * speed, away.sin() * speed)
    });

    Some(Avoidance {
        heading: tangent,
        urgency: AVOID_BASE_URGENCY + intensity * AVOID_EXTRA_URGENCY,
        push,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn wrap_maps_into_half_open_range() {
        assert!((wrap_signed_angle(PI) - PI).abs() < EPS);
        assert!((wrap_signed_angle(-PI) - PI).abs() < EPS);
        assert!((wrap_signed_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < EPS);
        assert!((wrap_signed_angle(10.0 * TAU + 0.5) - 0.5).abs() < 1e-3);
        assert_eq!(wrap_signed_angle(f32::NAN), 0.0);
    }

    #[test]
    fn smooth_turn_is_clamped() {
        let heading = smooth_turn(0.0, PI, 2.0, 0.1);
        assert!((heading - 0.2).abs() < EPS, "got {heading}");
    }

    #[test]
    fn smooth_turn_reaches_close_targets_exactly() {
        let heading = smooth_turn(1.0, 1.05, 3.0, 0.1);
        assert!((heading - 1.05).abs() < EPS);
    }

    #[test]
    fn smooth_turn_takes_shorter_arc_across_the_seam() {
        // From just below π to just above -π is a short positive turn.
        let heading = smooth_turn(PI - 0.1, -PI + 0.1, 1.0, 0.05);
        assert!(heading > PI - 0.1);
    }

    #[test]
    fn smooth_turn_negative_dt_does_nothing() {
        assert_eq!(smooth_turn(0.3, 2.0, 3.0, -1.0), 0.3);
    }

    #[test]
    fn bearing_and_distance() {
        assert!((bearing(0.0, 0.0, 0.0, 10.0) - FRAC_PI_2).abs() < EPS);
        assert_eq!(distance(0.0, 0.0, 3.0, 4.0), 5.0);
    }

    #[test]
    fn no_avoidance_outside_ring() {
        let config = PotConfig::default();
        assert!(pot_avoidance(500.0, 0.0, 0.0, (0.0, 0.0), &config).is_none());
        assert!(pot_avoidance(100.0, 0.0, 0.0, (0.0, 0.0), &config).is_none());
    }

    #[test]
    fn avoidance_urgency_grows_toward_body() {
        let config = PotConfig::default();
        let outer = pot_avoidance(95.0, 0.0, PI, (0.0, 0.0), &config).unwrap();
        let inner = pot_avoidance(65.0, 0.0, PI, (0.0, 0.0), &config).unwrap();
        assert!(inner.urgency > outer.urgency);
        assert!(outer.push.is_none());
        assert!(inner.push.is_none());
    }

    #[test]
    fn avoidance_picks_nearer_tangent_with_outward_tilt() {
        let config = PotConfig::default();
        // Ant east of the body heading north: the left tangent (north-ish,
        // tilted east) is the smaller turn.
        let a = pot_avoidance(80.0, 0.0, FRAC_PI_2, (0.0, 0.0), &config).unwrap();
        assert!((a.heading - (FRAC_PI_2 - config.spiral_bias)).abs() < EPS);
        // Heading south picks the other side.
        let b = pot_avoidance(80.0, 0.0, -FRAC_PI_2, (0.0, 0.0), &config).unwrap();
        assert!((b.heading - (-FRAC_PI_2 + config.spiral_bias)).abs() < EPS);
    }

    #[test]
    fn push_out_inside_solid_body() {
        let config = PotConfig::default();
        let a = pot_avoidance(40.0, 0.0, 0.0, (0.0, 0.0), &config).unwrap();
        let (px, py) = a.push.unwrap();
        assert!((px - 20.0 * config.push_strength).abs() < 1e-3);
        assert!(py.abs() < 1e-3);
        assert_eq!(a.urgency, AVOID_BASE_URGENCY + AVOID_EXTRA_URGENCY);
    }
}
