//! Typed simulation configuration.
//!
//! Every section and field has a default matching the shipped game, so a
//! config file only needs to name what it overrides. Files are loaded by the
//! `nectar-data` crate; this module owns the types and validation.

use crate::color::Rgb;
use serde::{Deserialize, Serialize};

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A value that must be strictly positive was not.
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    /// A value that must not be negative was.
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    /// Two related values are in the wrong order.
    #[error("{field}: {detail}")]
    Inconsistent {
        field: &'static str,
        detail: String,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub world: WorldConfig,
    pub ant: AntConfig,
    pub honey: HoneyConfig,
    pub pot: PotConfig,
    pub nest: NestConfig,
    pub audio: AudioConfig,
    pub collection: CollectionConfig,
}

/// Where new ants appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpawnMode {
    /// Just outside a random canvas edge; ants idle after depositing.
    Edges,
    /// Inside the nest; ants cycle between field and nest.
    #[default]
    Nest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub seed: u64,
    /// Upper clamp applied to every `tick(dt)`, in seconds.
    pub max_dt: f32,
    pub initial_ants: usize,
    pub spawn_mode: SpawnMode,
    /// How far outside the canvas edge-spawned ants start.
    pub edge_spawn_margin: f32,
    /// Idle ants further than this outside the canvas head back to center.
    pub bounds_margin: f32,
    /// Destination of collection flights, relative to the bottom-right corner.
    pub score_target_inset: (f32, f32),
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            seed: 0x5EED,
            max_dt: 0.1,
            initial_ants: 20,
            spawn_mode: SpawnMode::Nest,
            edge_spawn_margin: 20.0,
            bounds_margin: 50.0,
            score_target_inset: (50.0, 50.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntConfig {
    /// Unloaded speed, pixels per second.
    pub speed: f32,
    /// Maximum heading change, radians per second.
    pub turn_rate: f32,
    pub capacity: f64,
    /// Honey eaten per second.
    pub eat_rate: f64,
    /// Honey poured into the pot per second.
    pub deposit_rate: f64,
    pub sensing_radius: f32,
    /// Added to the honey radius to decide when a seeking ant starts eating.
    pub eat_contact_margin: f32,
    /// Distance to the pot entrance at which a returning ant starts pouring.
    pub deposit_contact_radius: f32,
    /// Fraction of speed lost when fully loaded.
    pub load_derate: f32,
}

impl Default for AntConfig {
    fn default() -> Self {
        Self {
            speed: 70.0,
            turn_rate: 3.0,
            capacity: 10.0,
            eat_rate: 7.5,
            deposit_rate: 10.0,
            sensing_radius: 250.0,
            eat_contact_margin: 8.0,
            deposit_contact_radius: 15.0,
            load_derate: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoneyConfig {
    pub max_amount: f64,
    /// Radius of a nearly empty blob.
    pub radius_base: f32,
    /// Extra radius of a full blob over `radius_base`.
    pub radius_span: f32,
}

impl Default for HoneyConfig {
    fn default() -> Self {
        Self {
            max_amount: 50.0,
            radius_base: 5.0,
            radius_span: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PotConfig {
    pub max_fill: f64,
    pub baseline_color: Rgb,
    /// Seconds of clock time between a collection trigger and the reset.
    pub reset_delay: f32,
    /// Pour point relative to the pot center.
    pub entrance_offset: (f32, f32),
    /// Center of the solid body relative to the pot center.
    pub body_offset: (f32, f32),
    pub solid_radius: f32,
    pub avoidance_radius: f32,
    /// Outward tilt of the avoidance tangents, radians.
    pub spiral_bias: f32,
    /// Honey cannot be placed closer than this to the body center.
    pub no_spawn_radius: f32,
    /// Radial push-out speed factor while inside the solid body.
    pub push_strength: f32,
}

impl Default for PotConfig {
    fn default() -> Self {
        Self {
            max_fill: 1000.0,
            baseline_color: Rgb::new(50.0, 50.0, 60.0),
            reset_delay: 1.0,
            entrance_offset: (45.0, -85.0),
            body_offset: (0.0, 50.0),
            solid_radius: 60.0,
            avoidance_radius: 100.0,
            spiral_bias: std::f32::consts::FRAC_PI_6,
            no_spawn_radius: 65.0,
            push_strength: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NestConfig {
    /// Vertical position; the nest is always horizontally centered.
    pub y: f32,
    /// Initial wait of freshly spawned ants, seconds.
    pub spawn_wait: (f32, f32),
    /// Wait after an ant comes home, seconds.
    pub rest_wait: (f32, f32),
    pub exit_distance: f32,
    pub arrival_radius: f32,
}

impl Default for NestConfig {
    fn default() -> Self {
        Self {
            y: 70.0,
            spawn_wait: (1.0, 3.0),
            rest_wait: (2.0, 5.0),
            exit_distance: 50.0,
            arrival_radius: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Master volume in [0, 1].
    pub volume: f32,
    /// Length of the pour clip, seconds.
    pub pour_duration: f32,
    pub drop_gain: f32,
    pub bottle_gain: f32,
    pub pour_gain: f32,
    pub select_gain: f32,
    pub splash_gain: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pour_duration: 1.2,
            drop_gain: 0.3,
            bottle_gain: 1.0,
            pour_gain: 0.5,
            select_gain: 0.2,
            splash_gain: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Progress gained per second; 1.5 completes a flight in 2/3 s.
    pub flight_speed: f32,
    pub end_scale: f32,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            flight_speed: 1.5,
            end_scale: 0.2,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn ordered(field: &'static str, (lo, hi): (f32, f32)) -> Result<(), ConfigError> {
    non_negative(field, f64::from(lo))?;
    if lo <= hi {
        Ok(())
    } else {
        Err(ConfigError::Inconsistent {
            field,
            detail: format!("lower bound {lo} exceeds upper bound {hi}"),
        })
    }
}

impl SimConfig {
    /// Check that every value the simulation divides by or integrates with
    /// is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.world;
        positive("world.width", f64::from(w.width))?;
        positive("world.height", f64::from(w.height))?;
        positive("world.max_dt", f64::from(w.max_dt))?;

        let a = &self.ant;
        positive("ant.speed", f64::from(a.speed))?;
        positive("ant.turn_rate", f64::from(a.turn_rate))?;
        positive("ant.capacity", a.capacity)?;
        positive("ant.eat_rate", a.eat_rate)?;
        positive("ant.deposit_rate", a.deposit_rate)?;
        non_negative("ant.sensing_radius", f64::from(a.sensing_radius))?;
        if !(0.0..1.0).contains(&a.load_derate) {
            return Err(ConfigError::Inconsistent {
                field: "ant.load_derate",
                detail: format!("must be in [0, 1), got {}", a.load_derate),
            });
        }

        positive("honey.max_amount", self.honey.max_amount)?;
        non_negative("honey.radius_base", f64::from(self.honey.radius_base))?;

        let p = &self.pot;
        positive("pot.max_fill", p.max_fill)?;
        non_negative("pot.reset_delay", f64::from(p.reset_delay))?;
        positive("pot.solid_radius", f64::from(p.solid_radius))?;
        if p.avoidance_radius <= p.solid_radius {
            return Err(ConfigError::Inconsistent {
                field: "pot.avoidance_radius",
                detail: format!(
                    "must exceed solid_radius ({} <= {})",
                    p.avoidance_radius, p.solid_radius
                ),
            });
        }

        ordered("nest.spawn_wait", self.nest.spawn_wait)?;
        ordered("nest.rest_wait", self.nest.rest_wait)?;

        positive("audio.pour_duration", f64::from(self.audio.pour_duration))?;
        positive("collection.flight_speed", f64::from(self.collection.flight_speed))?;
        Ok(())
    }
}
