//! The world: owns every entity and orchestrates the per-tick pipeline.
//!
//! # Tick Pipeline
//!
//! Each unpaused [`World::tick`] runs:
//! 1. **Timers** -- fire due clock timers (pot unlock after a collection)
//! 2. **Ants** -- update every ant in spawn order, collecting effects
//! 3. **Effects** -- dispatch cues, schedule timers, launch collection flights
//! 4. **Animate** -- advance the pot and honey render state
//! 5. **Flights** -- move collection flights; landed flights score
//! 6. **Cleanup** -- remove honey that ran out this tick
//! 7. **Post-tick** -- deliver buffered events to listeners
//! 8. **Bookkeeping** -- advance the tick counter and elapsed time

use std::time::Duration;

use slotmap::SlotMap;
use tracing::{debug, info, warn};

use crate::ant::{Ant, AntContext, AntEffect};
use crate::audio::{AudioDispatcher, AudioSink};
use crate::collection::CollectionFlight;
use crate::color::{PaletteColor, Rgb};
use crate::config::{ConfigError, SimConfig, SpawnMode};
use crate::event::{Event, EventBus, EventKind, EventListener};
use crate::fixed::Fixed64;
use crate::honey::Honey;
use crate::id::{AntId, HoneyId};
use crate::pot::{DepositOutcome, Pot};
use crate::query::{AntSnapshot, CollectionSnapshot, HoneySnapshot, PotSnapshot, WorldSnapshot};
use crate::rng::SimRng;
use crate::sim::{Clock, SimState, StateHash, TimerQueue, saturating_secs};
use crate::steering::distance;

/// Why a honey placement was refused.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PlaceError {
    /// The point lies in the pot's no-spawn zone.
    #[error("({x}, {y}) is inside the pot")]
    InsidePot { x: f32, y: f32 },
    #[error("({x}, {y}) is not a finite position")]
    InvalidPosition { x: f32, y: f32 },
    #[error("the world is paused")]
    Paused,
}

/// Work scheduled against the clock rather than the tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Empty and unlock the pot after a collection.
    ResetPot,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// The simulation. Hosts call [`World::tick`] once per frame and render from
/// [`World::snapshot`].
#[derive(Debug)]
pub struct World {
    config: SimConfig,
    width: f32,
    height: f32,
    ants: SlotMap<AntId, Ant>,
    honeys: SlotMap<HoneyId, Honey>,
    pot: Pot,
    collections: Vec<CollectionFlight>,
    rng: SimRng,
    clock: Box<dyn Clock>,
    timers: TimerQueue<TimerAction>,
    audio: AudioDispatcher,
    /// Typed event bus for world events.
    pub event_bus: EventBus,
    sim_state: SimState,
    score: u32,
    selected: PaletteColor,
    paused: bool,
}

impl World {
    /// Build a world and spawn its initial population.
    ///
    /// The clock drives the pot-unlock timer and the pour gate; the sink
    /// receives every sound cue.
    pub fn new(
        config: SimConfig,
        clock: Box<dyn Clock>,
        audio: Box<dyn AudioSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (width, height) = (config.world.width, config.world.height);
        let mut world = Self {
            pot: Pot::new(width / 2.0, height / 2.0, &config.pot),
            audio: AudioDispatcher::new(audio, &config.audio),
            rng: SimRng::new(config.world.seed),
            width,
            height,
            ants: SlotMap::with_key(),
            honeys: SlotMap::with_key(),
            collections: Vec::new(),
            clock,
            timers: TimerQueue::new(),
            event_bus: EventBus::default(),
            sim_state: SimState::default(),
            score: 0,
            selected: PaletteColor::default(),
            paused: false,
            config,
        };
        world.spawn_initial_population();
        Ok(world)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Nest entrance: horizontally centered at the configured height.
    pub fn nest(&self) -> (f32, f32) {
        (self.width / 2.0, self.config.nest.y)
    }

    /// Where collection flights land.
    pub fn score_target(&self) -> (f32, f32) {
        let (ix, iy) = self.config.world.score_target_inset;
        (self.width - ix, self.height - iy)
    }

    pub fn sim_state(&self) -> &SimState {
        &self.sim_state
    }

    pub fn tick_count(&self) -> u64 {
        self.sim_state.tick
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn ants(&self) -> impl Iterator<Item = (AntId, &Ant)> {
        self.ants.iter()
    }

    pub fn ant(&self, id: AntId) -> Option<&Ant> {
        self.ants.get(id)
    }

    pub fn ant_count(&self) -> usize {
        self.ants.len()
    }

    pub fn honeys(&self) -> impl Iterator<Item = (HoneyId, &Honey)> {
        self.honeys.iter()
    }

    pub fn honey(&self, id: HoneyId) -> Option<&Honey> {
        self.honeys.get(id)
    }

    pub fn honey_count(&self) -> usize {
        self.honeys.len()
    }

    pub fn pot(&self) -> &Pot {
        &self.pot
    }

    pub fn collections(&self) -> &[CollectionFlight] {
        &self.collections
    }

    /// Clock timers not yet fired.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn selected_color(&self) -> PaletteColor {
        self.selected
    }

    pub fn volume(&self) -> f32 {
        self.audio.volume()
    }

    /// Pour cues the gate considers still playing.
    pub fn active_pours(&mut self) -> usize {
        let now = self.clock.now();
        self.audio.active_pours(now)
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn ant_mut(&mut self, id: AntId) -> Option<&mut Ant> {
        self.ants.get_mut(id)
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn honey_mut(&mut self, id: HoneyId) -> Option<&mut Honey> {
        self.honeys.get_mut(id)
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn pot_mut(&mut self) -> &mut Pot {
        &mut self.pot
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Pause the world. While paused, `tick()` is a no-op and placements are
    /// refused. Clock timers keep their deadlines and fire on the first tick
    /// after resuming.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // -----------------------------------------------------------------------
    // Event system
    // -----------------------------------------------------------------------

    /// Suppress an event kind. Suppressed events are never allocated or buffered.
    pub fn suppress_event(&mut self, kind: EventKind) {
        self.event_bus.suppress(kind);
    }

    /// Register a passive listener for an event kind.
    pub fn on_event(&mut self, kind: EventKind, listener: EventListener) {
        self.event_bus.on(kind, listener);
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Place a full blob of the selected color at `(x, y)`.
    pub fn place_honey(&mut self, x: f32, y: f32) -> Result<HoneyId, PlaceError> {
        self.place_honey_colored(x, y, self.selected.rgb())
    }

    /// Place a full blob of an arbitrary color at `(x, y)`.
    pub fn place_honey_colored(
        &mut self,
        x: f32,
        y: f32,
        color: Rgb,
    ) -> Result<HoneyId, PlaceError> {
        if self.paused {
            debug!(x, y, "placement refused while paused");
            return Err(PlaceError::Paused);
        }
        if !x.is_finite() || !y.is_finite() {
            return Err(PlaceError::InvalidPosition { x, y });
        }
        let (cx, cy) = self.pot.body_center(&self.config.pot);
        if distance(x, y, cx, cy) < self.config.pot.no_spawn_radius {
            debug!(x, y, "placement refused inside the pot");
            return Err(PlaceError::InsidePot { x, y });
        }

        let honey = self.honeys.insert(Honey::new(x, y, color, &self.config.honey));
        self.audio.play_drop();
        self.event_bus.emit(Event::HoneyPlaced {
            honey,
            x,
            y,
            color,
            tick: self.sim_state.tick,
        });
        Ok(honey)
    }

    /// Pick the color used by subsequent placements.
    pub fn select_color(&mut self, color: PaletteColor) {
        self.selected = color;
        self.audio.play_select();
    }

    /// Set the master volume, clamped to [0, 1].
    pub fn set_volume(&mut self, volume: f32) {
        self.audio.set_volume(volume);
    }

    pub fn mute(&mut self) {
        self.audio.set_volume(0.0);
    }

    /// Offer honey to the pot as if an ant had poured it. A pour that fills
    /// the pot starts a collection exactly like an ant's would.
    pub fn pour(&mut self, color: Rgb, amount: Fixed64) -> DepositOutcome {
        let outcome = self.pot.add_honey(color, amount);
        if let DepositOutcome::Filled { color, .. } = outcome {
            let now = self.clock.now();
            self.begin_collection(color, now);
        }
        outcome
    }

    /// Clear every entity, timer and flight, replace the pot, zero the score
    /// and respawn the initial population. The RNG stream continues.
    pub fn reset(&mut self) {
        self.ants.clear();
        self.honeys.clear();
        self.collections.clear();
        self.timers.clear();
        self.audio.reset();
        self.event_bus.clear_all();
        self.pot = Pot::new(self.width / 2.0, self.height / 2.0, &self.config.pot);
        self.score = 0;
        self.spawn_initial_population();
        info!(ants = self.ants.len(), "world reset");
    }

    /// Change the canvas size. The pot and nest follow the new center.
    pub fn resize(&mut self, width: f32, height: f32) {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            warn!(width, height, "ignoring invalid canvas size");
            return;
        }
        self.width = width;
        self.height = height;
        self.pot.x = width / 2.0;
        self.pot.y = height / 2.0;
    }

    // -----------------------------------------------------------------------
    // Spawning
    // -----------------------------------------------------------------------

    fn spawn_initial_population(&mut self) {
        for _ in 0..self.config.world.initial_ants {
            self.spawn_ant();
        }
    }

    /// Spawn one ant according to the configured spawn mode.
    pub fn spawn_ant(&mut self) -> AntId {
        let ant = match self.config.world.spawn_mode {
            SpawnMode::Nest => Ant::in_nest(self.nest(), &mut self.rng, &self.config),
            SpawnMode::Edges => {
                let (x, y) = self.edge_spawn_point();
                Ant::new(x, y, &mut self.rng, &self.config)
            }
        };
        self.ants.insert(ant)
    }

    /// Spawn an idle ant at an exact position.
    pub fn spawn_ant_at(&mut self, x: f32, y: f32) -> AntId {
        let ant = Ant::new(x, y, &mut self.rng, &self.config);
        self.ants.insert(ant)
    }

    /// A point just outside a random canvas edge.
    fn edge_spawn_point(&mut self) -> (f32, f32) {
        let m = self.config.world.edge_spawn_margin;
        let (w, h) = (self.width, self.height);
        if self.rng.coin() {
            let x = if self.rng.coin() { -m } else { w + m };
            (x, self.rng.range(0.0, h))
        } else {
            let x = self.rng.range(0.0, w);
            let y = if self.rng.coin() { -m } else { h + m };
            (x, y)
        }
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Clamp a host-supplied frame delta into `[0, max_dt]`.
    fn clamp_dt(&self, dt: f32) -> f32 {
        if dt.is_nan() {
            return 0.0;
        }
        dt.clamp(0.0, self.config.world.max_dt)
    }

    /// Advance the world by `dt` seconds (clamped). No-op while paused.
    pub fn tick(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        let dt = self.clamp_dt(dt);
        let now = self.clock.now();

        self.phase_timers(now);
        let effects = self.phase_ants(dt);
        self.phase_effects(effects, now);
        self.pot.update(dt);
        for honey in self.honeys.values_mut() {
            honey.update(dt);
        }
        self.phase_flights(dt);
        self.phase_cleanup();
        self.event_bus.deliver();

        self.sim_state.tick += 1;
        self.sim_state.elapsed += f64::from(dt);
    }

    fn phase_timers(&mut self, now: Duration) {
        for action in self.timers.drain_due(now) {
            match action {
                TimerAction::ResetPot => {
                    self.pot.reset();
                    debug!(tick = self.sim_state.tick, "pot emptied and unlocked");
                    self.event_bus.emit(Event::PotReset {
                        tick: self.sim_state.tick,
                    });
                }
            }
        }
    }

    fn phase_ants(&mut self, dt: f32) -> Vec<(AntId, AntEffect)> {
        let nest = self.nest();
        let mut ctx = AntContext {
            honeys: &mut self.honeys,
            pot: &mut self.pot,
            rng: &mut self.rng,
            config: &self.config,
            nest,
            bounds: (self.width, self.height),
        };

        let mut effects = Vec::new();
        let mut scratch = Vec::new();
        for (id, ant) in self.ants.iter_mut() {
            ant.update(dt, &mut ctx, &mut scratch);
            effects.extend(scratch.drain(..).map(|effect| (id, effect)));
        }
        effects
    }

    fn phase_effects(&mut self, effects: Vec<(AntId, AntEffect)>, now: Duration) {
        let tick = self.sim_state.tick;
        for (ant, effect) in effects {
            match effect {
                AntEffect::StateChanged { from, to } => {
                    self.event_bus.emit(Event::AntStateChanged { ant, from, to, tick });
                }
                AntEffect::DepositStarted => {
                    self.audio.play_pour(now);
                    self.event_bus.emit(Event::DepositStarted { ant, tick });
                }
                AntEffect::DepositRejected { amount } => {
                    self.event_bus.emit(Event::DepositRejected { ant, amount, tick });
                }
                AntEffect::CollectionTriggered { color } => {
                    self.begin_collection(color, now);
                }
            }
        }
    }

    /// React to the pot filling: schedule the unlock, splash and launch the
    /// potion toward the score counter.
    fn begin_collection(&mut self, color: Rgb, now: Duration) {
        let delay = saturating_secs(self.config.pot.reset_delay);
        self.timers.schedule(now.saturating_add(delay), TimerAction::ResetPot);
        self.audio.play_splash();
        self.collections.push(CollectionFlight::new(
            (self.pot.x, self.pot.y),
            self.score_target(),
            color,
            &self.config.collection,
        ));
        info!(tick = self.sim_state.tick, score = self.score, "pot full, collecting");
        self.event_bus.emit(Event::CollectionTriggered {
            color,
            tick: self.sim_state.tick,
        });
    }

    fn phase_flights(&mut self, dt: f32) {
        let mut landed = 0;
        self.collections.retain_mut(|flight| {
            if flight.advance(dt) {
                landed += 1;
                false
            } else {
                true
            }
        });
        for _ in 0..landed {
            self.score += 1;
            self.audio.play_bottle();
            self.event_bus.emit(Event::PotionCollected {
                score: self.score,
                tick: self.sim_state.tick,
            });
        }
    }

    fn phase_cleanup(&mut self) {
        let tick = self.sim_state.tick;
        let bus = &mut self.event_bus;
        self.honeys.retain(|honey, blob| {
            if blob.is_empty() {
                bus.emit(Event::HoneyDepleted { honey, tick });
                false
            } else {
                true
            }
        });
    }

    // -----------------------------------------------------------------------
    // Query / hash
    // -----------------------------------------------------------------------

    /// Owned copy of everything a renderer reads.
    pub fn snapshot(&self) -> WorldSnapshot {
        let ants = self
            .ants
            .iter()
            .map(|(id, ant)| AntSnapshot {
                id,
                x: ant.x,
                y: ant.y,
                heading: ant.heading,
                state: ant.state().kind(),
                target: ant.state().target(),
                payload: ant.payload(),
                load_ratio: ant.load_ratio(),
                carried_color: ant.carried_color(),
                hidden: ant.is_hidden(),
                wobble_phase: ant.wobble_phase,
                leg_cycle: ant.leg_cycle,
            })
            .collect();

        let honeys = self
            .honeys
            .iter()
            .map(|(id, honey)| HoneySnapshot {
                id,
                x: honey.x,
                y: honey.y,
                color: honey.color(),
                amount: honey.amount(),
                max_amount: honey.max_amount(),
                radius: honey.radius(),
                wobble_time: honey.wobble_time,
                wobble_intensity: honey.wobble_intensity,
            })
            .collect();

        let collections = self
            .collections
            .iter()
            .map(|flight| CollectionSnapshot {
                x: flight.x,
                y: flight.y,
                color: flight.color(),
                progress: flight.progress(),
                scale: flight.scale,
            })
            .collect();

        WorldSnapshot {
            tick: self.sim_state.tick,
            width: self.width,
            height: self.height,
            nest: self.nest(),
            score: self.score,
            paused: self.paused,
            selected_color: self.selected,
            volume: self.audio.volume(),
            ants,
            honeys,
            pot: PotSnapshot {
                x: self.pot.x,
                y: self.pot.y,
                fill: self.pot.fill(),
                max_fill: self.pot.max_fill(),
                fill_ratio: self.pot.fill_ratio(),
                color: self.pot.color(),
                locked: self.pot.is_locked(),
                liquid_phase: self.pot.liquid_phase,
            },
            collections,
        }
    }

    /// Deterministic hash of logic-relevant state, for divergence checks.
    pub fn state_hash(&self) -> u64 {
        let mut hasher = StateHash::new();
        hasher.write_u64(self.sim_state.tick);
        hasher.write_u32(self.score);
        hasher.write_u64(self.rng.state());

        for ant in self.ants.values() {
            hasher.write_f32(ant.x);
            hasher.write_f32(ant.y);
            hasher.write_f32(ant.heading);
            hasher.write_u32(ant.state().kind().ordinal());
            hasher.write_fixed64(ant.payload());
        }
        for honey in self.honeys.values() {
            hasher.write_f32(honey.x);
            hasher.write_f32(honey.y);
            hasher.write_fixed64(honey.amount());
        }

        hasher.write_fixed64(self.pot.fill());
        hasher.write_u32(u32::from(self.pot.is_locked()));
        let color = self.pot.color();
        hasher.write_f32(color.r);
        hasher.write_f32(color.g);
        hasher.write_f32(color.b);

        for flight in &self.collections {
            hasher.write_f32(flight.progress());
        }
        hasher.finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ant::{AntState, AntStateKind};
    use crate::audio::Cue;
    use crate::test_utils::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn default_world_spawns_twenty_ants_in_the_nest() {
        let (world, _clock, _audio) = test_world(SimConfig::default());
        assert_eq!(world.ant_count(), 20);
        assert!(world.ants().all(|(_, ant)| ant.is_hidden()));
        assert!(world.ants().all(|(_, ant)| (ant.x, ant.y) == (400.0, 70.0)));
    }

    #[test]
    fn edge_spawns_start_outside_the_canvas() {
        let mut config = quiet_config();
        config.world.initial_ants = 50;
        let (world, _clock, _audio) = test_world(config);
        for (_, ant) in world.ants() {
            let outside = ant.x == -20.0 || ant.x == 820.0 || ant.y == -20.0 || ant.y == 620.0;
            assert!(outside, "ant at ({}, {})", ant.x, ant.y);
            assert_eq!(ant.state(), AntState::Idle);
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = SimConfig::default();
        config.ant.capacity = 0.0;
        let err = World::new(
            config,
            Box::new(crate::sim::ManualClock::new()),
            Box::new(crate::audio::NullAudio),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive { field: "ant.capacity", .. }));
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    #[test]
    fn placement_uses_selected_color_and_plays_drop() {
        let (mut world, _clock, audio) = test_world(quiet_config());
        world.select_color(PaletteColor::Sapphire);
        let id = world.place_honey(100.0, 100.0).unwrap();

        assert_eq!(world.honey(id).unwrap().color(), PaletteColor::Sapphire.rgb());
        assert_eq!(audio.cues(), vec![Cue::Select, Cue::Drop]);
    }

    #[test]
    fn placement_inside_pot_is_refused() {
        let (mut world, _clock, audio) = test_world(quiet_config());
        // Body center is (400, 350).
        let err = world.place_honey(410.0, 360.0).unwrap_err();
        assert!(matches!(err, PlaceError::InsidePot { .. }));
        assert_eq!(world.honey_count(), 0);
        assert!(audio.cues().is_empty());

        // The entrance area above the body is allowed.
        assert!(world.place_honey(400.0, 280.0).is_ok());
    }

    #[test]
    fn placement_refused_while_paused() {
        let (mut world, _clock, _audio) = test_world(quiet_config());
        world.pause();
        assert_eq!(world.place_honey(100.0, 100.0), Err(PlaceError::Paused));
        world.resume();
        assert!(world.place_honey(100.0, 100.0).is_ok());
    }

    #[test]
    fn placement_rejects_nan() {
        let (mut world, _clock, _audio) = test_world(quiet_config());
        let err = world.place_honey(f32::NAN, 5.0).unwrap_err();
        assert!(matches!(err, PlaceError::InvalidPosition { .. }));
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    #[test]
    fn tick_clamps_dt() {
        let (mut world, _clock, _audio) = test_world(quiet_config());
        world.tick(5.0);
        world.tick(-1.0);
        world.tick(f32::NAN);
        assert_eq!(world.tick_count(), 3);
        assert!((world.sim_state().elapsed - 0.1).abs() < 1e-6);
    }

    #[test]
    fn paused_tick_is_a_no_op() {
        let (mut world, _clock, _audio) = test_world(SimConfig::default());
        let before = world.state_hash();
        world.pause();
        for _ in 0..10 {
            world.tick(0.1);
        }
        assert_eq!(world.tick_count(), 0);
        assert_eq!(world.state_hash(), before);
    }

    #[test]
    fn exhausted_honey_is_removed_at_end_of_tick() {
        let (mut world, _clock, _audio) = test_world(quiet_config());
        let id = world.place_honey(100.0, 100.0).unwrap();
        let max = world.honey(id).unwrap().max_amount();
        world.honey_mut(id).unwrap().take(max);

        let depleted = Rc::new(RefCell::new(Vec::new()));
        let d = depleted.clone();
        world.on_event(
            EventKind::HoneyDepleted,
            Box::new(move |e| d.borrow_mut().push(e.clone())),
        );
        world.tick(0.016);

        assert!(world.honey(id).is_none());
        assert_eq!(*depleted.borrow(), vec![Event::HoneyDepleted { honey: id, tick: 0 }]);
    }

    #[test]
    fn ant_forages_honey_to_capacity() {
        let (mut world, _clock, _audio) = test_world(quiet_config());
        let honey = world.place_honey(100.0, 100.0).unwrap();
        let ant = world.spawn_ant_at(100.0, 150.0);
        world.ant_mut(ant).unwrap().heading = -std::f32::consts::FRAC_PI_2;

        run_ticks(&mut world, 200, 0.05);

        let ant = world.ant(ant).unwrap();
        assert!(matches!(
            ant.state().kind(),
            AntStateKind::Return | AntStateKind::Deposit | AntStateKind::Idle
        ));
        let remaining = world.honey(honey).map_or(Fixed64::ZERO, |h| h.amount());
        assert_eq!(remaining, fixed(40.0));
    }

    // -----------------------------------------------------------------------
    // Collection lifecycle
    // -----------------------------------------------------------------------

    #[test]
    fn filling_the_pot_locks_resets_after_delay_and_scores_once() {
        let (mut world, clock, audio) = test_world(quiet_config());
        world.pot_mut().set_fill_for_test(fixed(990.0));

        let outcome = world.pour(PaletteColor::Ruby.rgb(), fixed(20.0));
        assert!(
            matches!(outcome, DepositOutcome::Filled { accepted, .. } if accepted == fixed(10.0))
        );
        assert!(world.pot().is_locked());
        assert_eq!(world.pot().fill(), fixed(1000.0));
        assert_eq!(world.pending_timers(), 1);
        assert_eq!(audio.cues(), vec![Cue::Splash]);

        // 0.9 s of clock time: still locked, potion landed (2/3 s flight).
        run_realtime(&mut world, &clock, 9, 0.1);
        assert!(world.pot().is_locked());
        assert_eq!(world.score(), 1);
        assert!(world.collections().is_empty());
        assert_eq!(audio.cues(), vec![Cue::Splash, Cue::Bottle]);

        // Past one second the timer fires on the next tick.
        clock.advance_secs(0.2);
        world.tick(0.1);
        assert!(!world.pot().is_locked());
        assert_eq!(world.pot().fill(), Fixed64::ZERO);
        assert_eq!(world.pot().color(), world.config().pot.baseline_color);
        assert_eq!(world.score(), 1);
        assert_eq!(world.pending_timers(), 0);
    }

    #[test]
    fn pot_unlocks_on_clock_time_not_tick_count() {
        let (mut world, clock, _audio) = test_world(quiet_config());
        let max = world.pot().max_fill();
        world.pour(PaletteColor::Ruby.rgb(), max);

        // Many ticks with no clock movement do not unlock.
        run_ticks(&mut world, 100, 0.1);
        assert!(world.pot().is_locked());

        // Paused across the deadline: fires on the first tick after resuming.
        world.pause();
        clock.advance_secs(5.0);
        world.tick(0.1);
        assert!(world.pot().is_locked());
        world.resume();
        world.tick(0.1);
        assert!(!world.pot().is_locked());
    }

    #[test]
    fn locked_pour_is_dropped() {
        let (mut world, _clock, _audio) = test_world(quiet_config());
        let max = world.pot().max_fill();
        world.pour(PaletteColor::Ruby.rgb(), max);
        let color = world.pot().color();

        assert_eq!(world.pour(PaletteColor::Sapphire.rgb(), fixed(5.0)), DepositOutcome::Rejected);
        assert_eq!(world.pot().fill(), max);
        assert_eq!(world.pot().color(), color);
        assert_eq!(world.pending_timers(), 1);
    }

    #[test]
    fn depositing_ants_trigger_gated_pour_cues() {
        let (mut world, _clock, audio) = test_world(quiet_config());
        let ants: Vec<AntId> = (0..3)
            .map(|_| spawn_loaded_ant(&mut world, fixed(10.0), PaletteColor::Amber.rgb()))
            .collect();

        world.tick(0.0);
        for id in &ants {
            assert_eq!(world.ant(*id).unwrap().state(), AntState::Deposit);
        }
        // Three ants arrive at once; only the first pour is admitted.
        assert_eq!(audio.count(Cue::Pour), 1);
        assert_eq!(world.active_pours(), 1);
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    #[test]
    fn muted_world_plays_nothing() {
        let (mut world, _clock, audio) = test_world(quiet_config());
        world.mute();
        world.select_color(PaletteColor::Citrine);
        world.place_honey(100.0, 100.0).unwrap();
        assert!(audio.cues().is_empty());
        assert_eq!(world.volume(), 0.0);
    }

    #[test]
    fn volume_scales_cue_gain() {
        let (mut world, _clock, audio) = test_world(quiet_config());
        world.set_volume(0.5);
        world.place_honey(100.0, 100.0).unwrap();
        let played = audio.played();
        assert_eq!(played.len(), 1);
        assert!((played[0].1 - 0.15).abs() < 1e-6);
    }

    #[test]
    fn reset_restores_initial_conditions() {
        let mut config = SimConfig::default();
        config.world.initial_ants = 5;
        let (mut world, _clock, _audio) = test_world(config);
        world.place_honey(100.0, 100.0).unwrap();
        let max = world.pot().max_fill();
        world.pour(PaletteColor::Ruby.rgb(), max);
        run_ticks(&mut world, 20, 0.1);
        assert_eq!(world.score(), 1);

        world.reset();
        assert_eq!(world.ant_count(), 5);
        assert_eq!(world.honey_count(), 0);
        assert_eq!(world.score(), 0);
        assert_eq!(world.pot().fill(), Fixed64::ZERO);
        assert!(!world.pot().is_locked());
        assert!(world.collections().is_empty());
        assert_eq!(world.pending_timers(), 0);
    }

    #[test]
    fn resize_recenters_pot_and_nest() {
        let (mut world, _clock, _audio) = test_world(quiet_config());
        world.resize(1000.0, 800.0);
        assert_eq!((world.pot().x, world.pot().y), (500.0, 400.0));
        assert_eq!(world.nest(), (500.0, 70.0));
        assert_eq!(world.score_target(), (950.0, 750.0));

        world.resize(-1.0, f32::INFINITY);
        assert_eq!(world.size(), (1000.0, 800.0));
    }

    // -----------------------------------------------------------------------
    // Determinism
    // -----------------------------------------------------------------------

    #[test]
    fn same_seed_same_hash() {
        let run = || {
            let (mut world, clock, _audio) = test_world(SimConfig::default());
            world.place_honey(150.0, 400.0).unwrap();
            world.place_honey(650.0, 200.0).unwrap();
            for _ in 0..300 {
                clock.advance_secs(1.0 / 60.0);
                world.tick(1.0 / 60.0);
            }
            world.state_hash()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn different_seed_diverges() {
        let hash = |seed| {
            let mut config = SimConfig::default();
            config.world.seed = seed;
            let (mut world, _clock, _audio) = test_world(config);
            run_ticks(&mut world, 120, 1.0 / 60.0);
            world.state_hash()
        };
        assert_ne!(hash(1), hash(2));
    }

    #[test]
    fn snapshot_reflects_state() {
        let (mut world, _clock, _audio) = test_world(SimConfig::default());
        let id = world.place_honey(100.0, 100.0).unwrap();
        world.tick(0.016);

        let snap = world.snapshot();
        assert_eq!(snap.tick, 1);
        assert_eq!(snap.ants.len(), 20);
        assert_eq!(snap.visible_ants().count(), 0);
        assert_eq!(snap.honeys[0].id, id);
        assert!(snap.honeys[0].radius > 0.0);
        assert_eq!(snap.pot.fill, Fixed64::ZERO);
        assert_eq!(snap.selected_color, PaletteColor::Ruby);
    }
}
