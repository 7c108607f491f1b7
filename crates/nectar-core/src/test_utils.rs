//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use std::sync::{Arc, Mutex};

use crate::ant::AntState;
use crate::audio::{AudioError, AudioSink, Cue};
use crate::color::Rgb;
use crate::config::{SimConfig, SpawnMode};
use crate::fixed::Fixed64;
use crate::id::AntId;
use crate::sim::ManualClock;
use crate::world::World;

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ===========================================================================
// Audio
// ===========================================================================

/// An audio sink that records every cue it is asked to play. Clones share
/// the same log, so keep one and hand the other to the world.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    log: Arc<Mutex<Vec<(Cue, f32)>>>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(cue, gain)` played so far.
    pub fn played(&self) -> Vec<(Cue, f32)> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn cues(&self) -> Vec<Cue> {
        self.played().into_iter().map(|(cue, _)| cue).collect()
    }

    pub fn count(&self, cue: Cue) -> usize {
        self.played().iter().filter(|(c, _)| *c == cue).count()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: Cue, gain: f32) -> Result<(), AudioError> {
        self.log
            .lock()
            .map_err(|_| AudioError::Backend("recording log poisoned".into()))?
            .push((cue, gain));
        Ok(())
    }
}

// ===========================================================================
// World builders
// ===========================================================================

/// Default config with no initial ants and edge spawning, for tests that
/// place every entity themselves.
pub fn quiet_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.world.initial_ants = 0;
    config.world.spawn_mode = SpawnMode::Edges;
    config
}

/// Build a world on a manual clock with a recording audio sink.
///
/// Panics if `config` is invalid.
pub fn test_world(config: SimConfig) -> (World, ManualClock, RecordingAudio) {
    let clock = ManualClock::new();
    let audio = RecordingAudio::new();
    let world = World::new(config, Box::new(clock.clone()), Box::new(audio.clone()))
        .expect("test config should be valid");
    (world, clock, audio)
}

/// Tick `n` times without moving the clock.
pub fn run_ticks(world: &mut World, n: usize, dt: f32) {
    for _ in 0..n {
        world.tick(dt);
    }
}

/// Tick `n` times, advancing the clock by `dt` before each tick.
pub fn run_realtime(world: &mut World, clock: &ManualClock, n: usize, dt: f32) {
    for _ in 0..n {
        clock.advance_secs(dt);
        world.tick(dt);
    }
}

/// Spawn an ant standing at the pot entrance, loaded and about to pour.
pub fn spawn_loaded_ant(world: &mut World, payload: Fixed64, color: Rgb) -> AntId {
    let (ex, ey) = world.pot().entrance(&world.config().pot);
    let id = world.spawn_ant_at(ex, ey);
    if let Some(ant) = world.ant_mut(id) {
        ant.set_payload_for_test(payload, color);
        ant.set_state_for_test(AntState::Return);
    }
    id
}
