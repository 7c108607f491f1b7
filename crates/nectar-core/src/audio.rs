//! Sound-effect contract between the simulation and an audio backend.
//!
//! The simulation never waits on or fails because of audio: every cue is
//! fire-and-forget, backend errors are logged and swallowed, and the pour cue
//! is rate-limited by [`PourGate`] before it reaches the backend.

use crate::config::AudioConfig;
use crate::sim::saturating_secs;
use std::time::Duration;
use tracing::warn;

/// Maximum overlapping pour instances.
const MAX_POURS: usize = 2;

/// A sound effect the simulation can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Cue {
    /// Honey placed on the canvas.
    Drop,
    /// A collected potion arrived at the score counter.
    Bottle,
    /// An ant started pouring into the pot.
    Pour,
    /// A palette color was picked.
    Select,
    /// The pot filled up.
    Splash,
}

/// Errors an audio backend may report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioError {
    /// The clip for this cue has not finished loading (or failed to).
    #[error("clip for {0:?} is not loaded")]
    NotLoaded(Cue),
    /// Any other backend failure.
    #[error("audio backend: {0}")]
    Backend(String),
}

/// An audio backend. `gain` already includes the master volume.
pub trait AudioSink: std::fmt::Debug {
    fn play(&mut self, cue: Cue, gain: f32) -> Result<(), AudioError>;
}

/// Backend that plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: Cue, _gain: f32) -> Result<(), AudioError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pour gate
// ---------------------------------------------------------------------------

/// Admission control for overlapping pour sounds.
///
/// At most two instances play at once. While exactly one is playing, a
/// second is admitted only once the first is at least halfway through.
#[derive(Debug, Clone)]
pub struct PourGate {
    clip: Duration,
    started: Vec<Duration>,
}

impl PourGate {
    pub fn new(clip: Duration) -> Self {
        Self {
            clip,
            started: Vec::new(),
        }
    }

    fn expire(&mut self, now: Duration) {
        let clip = self.clip;
        self.started.retain(|&start| now.saturating_sub(start) < clip);
    }

    /// Instances still playing at `now`.
    pub fn active(&mut self, now: Duration) -> usize {
        self.expire(now);
        self.started.len()
    }

    /// Whether a new instance may start at `now`. Does not record it.
    pub fn admits(&mut self, now: Duration) -> bool {
        self.expire(now);
        match self.started.as_slice() {
            [] => true,
            [only] => now.saturating_sub(*only) >= self.clip / 2,
            _ => self.started.len() < MAX_POURS,
        }
    }

    /// Record an instance that started at `now`.
    pub fn record(&mut self, now: Duration) {
        self.started.push(now);
    }

    pub fn clear(&mut self) {
        self.started.clear();
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Owns the backend, the master volume and the pour gate.
#[derive(Debug)]
pub struct AudioDispatcher {
    sink: Box<dyn AudioSink>,
    volume: f32,
    config: AudioConfig,
    pour_gate: PourGate,
}

impl AudioDispatcher {
    pub fn new(sink: Box<dyn AudioSink>, config: &AudioConfig) -> Self {
        Self {
            sink,
            volume: config.volume.clamp(0.0, 1.0),
            config: config.clone(),
            pour_gate: PourGate::new(saturating_secs(config.pour_duration)),
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Set the master volume, clamped to [0, 1]. NaN mutes.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
    }

    pub fn is_muted(&self) -> bool {
        self.volume <= 0.0
    }

    fn gain(&self, cue: Cue) -> f32 {
        let base = match cue {
            Cue::Drop => self.config.drop_gain,
            Cue::Bottle => self.config.bottle_gain,
            Cue::Pour => self.config.pour_gain,
            Cue::Select => self.config.select_gain,
            Cue::Splash => self.config.splash_gain,
        };
        base * self.volume
    }

    /// Send a cue to the backend. Returns whether the backend accepted it.
    fn emit(&mut self, cue: Cue) -> bool {
        if self.is_muted() {
            return false;
        }
        let gain = self.gain(cue);
        match self.sink.play(cue, gain) {
            Ok(()) => true,
            Err(err) => {
                warn!(?cue, %err, "sound effect dropped");
                false
            }
        }
    }

    pub fn play_drop(&mut self) {
        self.emit(Cue::Drop);
    }

    pub fn play_bottle(&mut self) {
        self.emit(Cue::Bottle);
    }

    pub fn play_select(&mut self) {
        self.emit(Cue::Select);
    }

    pub fn play_splash(&mut self) {
        self.emit(Cue::Splash);
    }

    /// Play the pour cue if the gate admits it at `now`. Returns whether it
    /// started.
    pub fn play_pour(&mut self, now: Duration) -> bool {
        if self.is_muted() || !self.pour_gate.admits(now) {
            return false;
        }
        let started = self.emit(Cue::Pour);
        if started {
            self.pour_gate.record(now);
        }
        started
    }

    /// Pour instances the gate considers playing at `now`.
    pub fn active_pours(&mut self, now: Duration) -> usize {
        self.pour_gate.active(now)
    }

    /// Forget all playing pour instances.
    pub fn reset(&mut self) {
        self.pour_gate.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Default)]
    struct Log(Arc<Mutex<Vec<(Cue, f32)>>>);

    impl AudioSink for Log {
        fn play(&mut self, cue: Cue, gain: f32) -> Result<(), AudioError> {
            self.0.lock().unwrap().push((cue, gain));
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl AudioSink for Broken {
        fn play(&mut self, cue: Cue, _gain: f32) -> Result<(), AudioError> {
            Err(AudioError::NotLoaded(cue))
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn gate_admits_first_pour() {
        let mut gate = PourGate::new(ms(1000));
        assert!(gate.admits(ms(0)));
    }

    #[test]
    fn gate_rejects_second_pour_before_halfway() {
        let mut gate = PourGate::new(ms(1000));
        gate.record(ms(0));
        assert!(!gate.admits(ms(499)));
        assert!(gate.admits(ms(500)));
    }

    #[test]
    fn gate_caps_at_two() {
        let mut gate = PourGate::new(ms(1000));
        gate.record(ms(0));
        gate.record(ms(600));
        assert_eq!(gate.active(ms(700)), 2);
        assert!(!gate.admits(ms(900)));
        // The first finishes at 1000; one playing, past halfway at 1100.
        assert!(gate.admits(ms(1100)));
    }

    #[test]
    fn gate_expires_finished_instances() {
        let mut gate = PourGate::new(ms(1000));
        gate.record(ms(0));
        assert_eq!(gate.active(ms(999)), 1);
        assert_eq!(gate.active(ms(1000)), 0);
    }

    #[test]
    fn dispatcher_scales_gain_by_volume() {
        let log = Log::default();
        let mut audio = AudioDispatcher::new(Box::new(log.clone()), &AudioConfig::default());
        audio.set_volume(0.5);
        audio.play_drop();
        audio.play_splash();
        let played = log.0.lock().unwrap().clone();
        assert_eq!(played, vec![(Cue::Drop, 0.15), (Cue::Splash, 0.5)]);
    }

    #[test]
    fn muted_dispatcher_plays_nothing() {
        let log = Log::default();
        let mut audio = AudioDispatcher::new(Box::new(log.clone()), &AudioConfig::default());
        audio.set_volume(-3.0);
        assert!(audio.is_muted());
        audio.play_bottle();
        assert!(!audio.play_pour(ms(0)));
        assert!(log.0.lock().unwrap().is_empty());
    }

    #[test]
    fn volume_is_clamped() {
        let mut audio = AudioDispatcher::new(Box::new(NullAudio), &AudioConfig::default());
        audio.set_volume(4.0);
        assert_eq!(audio.volume(), 1.0);
        audio.set_volume(f32::NAN);
        assert_eq!(audio.volume(), 0.0);
    }

    #[test]
    fn pour_goes_through_gate() {
        let log = Log::default();
        let config = AudioConfig {
            pour_duration: 1.0,
            ..AudioConfig::default()
        };
        let mut audio = AudioDispatcher::new(Box::new(log.clone()), &config);
        assert!(audio.play_pour(ms(0)));
        assert!(!audio.play_pour(ms(100)));
        assert!(audio.play_pour(ms(600)));
        assert!(!audio.play_pour(ms(800)));
        assert_eq!(audio.active_pours(ms(800)), 2);
        assert_eq!(log.0.lock().unwrap().len(), 2);
    }

    #[test]
    fn backend_errors_are_swallowed_and_not_counted() {
        let mut audio = AudioDispatcher::new(Box::new(Broken), &AudioConfig::default());
        audio.play_select();
        assert!(!audio.play_pour(ms(0)));
        assert_eq!(audio.active_pours(ms(0)), 0);
    }
}
