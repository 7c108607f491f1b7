//! The honey pot: accumulates deposits, mixes their colors and locks while a
//! full pot is being collected.

use crate::color::{Rgb, mix};
use crate::config::PotConfig;
use crate::fixed::{Fixed64, f64_to_fixed64, fixed64_to_f32, ratio};

/// What happened to a deposit offered to the pot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DepositOutcome {
    /// Honey was added; the pot is not yet full.
    Accepted { accepted: Fixed64 },
    /// Honey was added and the pot reached capacity. The pot is now locked
    /// until [`Pot::reset`]; `color` is the mix at the moment it filled.
    Filled { accepted: Fixed64, color: Rgb },
    /// The pot is locked for collection; the honey is dropped.
    Rejected,
}

impl DepositOutcome {
    /// Amount that actually entered the pot.
    pub fn accepted(&self) -> Fixed64 {
        match self {
            DepositOutcome::Accepted { accepted } | DepositOutcome::Filled { accepted, .. } => {
                *accepted
            }
            DepositOutcome::Rejected => Fixed64::ZERO,
        }
    }
}

/// The central container ants pour honey into.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pot {
    pub x: f32,
    pub y: f32,
    color: Rgb,
    fill: Fixed64,
    max_fill: Fixed64,
    locked: bool,
    baseline: Rgb,
    /// Render-only liquid wave phase.
    pub liquid_phase: f32,
}

impl Pot {
    pub fn new(x: f32, y: f32, config: &PotConfig) -> Self {
        Self {
            x,
            y,
            color: config.baseline_color,
            fill: Fixed64::ZERO,
            max_fill: f64_to_fixed64(config.max_fill),
            locked: false,
            baseline: config.baseline_color,
            liquid_phase: 0.0,
        }
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn fill(&self) -> Fixed64 {
        self.fill
    }

    pub fn max_fill(&self) -> Fixed64 {
        self.max_fill
    }

    /// Fill as a fraction of capacity.
    pub fn fill_ratio(&self) -> f32 {
        ratio(self.fill, self.max_fill)
    }

    /// True between a collection trigger and the following reset.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Offer `amount` of `color` honey.
    ///
    /// Dropped entirely while locked. Otherwise at most the remaining room is
    /// accepted and the rest is dropped; the color is mixed by (current fill,
    /// accepted amount). Reaching capacity locks the pot.
    pub fn add_honey(&mut self, color: Rgb, amount: Fixed64) -> DepositOutcome {
        if self.locked {
            return DepositOutcome::Rejected;
        }
        let room = (self.max_fill - self.fill).max(Fixed64::ZERO);
        let accepted = amount.clamp(Fixed64::ZERO, room);

        self.color = mix(
            self.color,
            fixed64_to_f32(self.fill),
            color,
            fixed64_to_f32(accepted),
        );
        self.fill += accepted;

        if self.fill >= self.max_fill {
            self.locked = true;
            DepositOutcome::Filled {
                accepted,
                color: self.color,
            }
        } else {
            DepositOutcome::Accepted { accepted }
        }
    }

    /// Empty the pot, restore the baseline color and unlock.
    pub fn reset(&mut self) {
        self.fill = Fixed64::ZERO;
        self.color = self.baseline;
        self.locked = false;
    }

    /// Advance render-only animation.
    pub fn update(&mut self, dt: f32) {
        self.liquid_phase += dt;
    }

    /// Point returning ants aim for.
    pub fn entrance(&self, config: &PotConfig) -> (f32, f32) {
        (
            self.x + config.entrance_offset.0,
            self.y + config.entrance_offset.1,
        )
    }

    /// Center of the solid body ants steer around.
    pub fn body_center(&self, config: &PotConfig) -> (f32, f32) {
        (self.x + config.body_offset.0, self.y + config.body_offset.1)
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn set_fill_for_test(&mut self, fill: Fixed64) {
        self.fill = fill;
    }
}
