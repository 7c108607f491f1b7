//! The ant: a per-agent finite-state forager.
//!
//! Each tick an ant senses its surroundings, runs one state handler, then
//! integrates its position if the resulting state is mobile. Cross-entity
//! side effects (pour cue, collection trigger) are reported as [`AntEffect`]s
//! for the world to dispatch once every ant has moved.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, PI, TAU};

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::color::{Rgb, mix};
use crate::config::{SimConfig, SpawnMode};
use crate::fixed::{Fixed64, f32_to_fixed64, f64_to_fixed64, fixed64_to_f32, ratio};
use crate::honey::Honey;
use crate::id::HoneyId;
use crate::pot::{DepositOutcome, Pot};
use crate::rng::SimRng;
use crate::steering::{bearing, distance, pot_avoidance, smooth_turn, wrap_signed_angle};

/// Jitter applied to the pour point so returning ants do not stack.
const ENTRANCE_JITTER: (f32, f32) = (10.0, 5.0);
/// Render-only animation speeds, per second.
const WOBBLE_SPEED: f32 = 5.0;
const LEG_SPEED: f32 = 15.0;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Behavior state. Targets are carried inline by the states that use them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AntState {
    /// Hidden inside the nest, waiting `timer` more seconds.
    InNest { timer: f32 },
    /// Walking away from the nest entrance.
    ExitingNest,
    /// Wandering and sensing for honey.
    Idle,
    Seek { target: HoneyId },
    /// Stationary, drinking from `target`.
    Eat { target: HoneyId },
    /// Carrying honey to the pot entrance.
    Return,
    /// Stationary, pouring into the pot.
    Deposit,
    ToNest,
}

/// Payload-free discriminant of [`AntState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AntStateKind {
    InNest,
    ExitingNest,
    Idle,
    Seek,
    Eat,
    Return,
    Deposit,
    ToNest,
}

impl AntState {
    pub fn kind(&self) -> AntStateKind {
        match self {
            AntState::InNest { .. } => AntStateKind::InNest,
            AntState::ExitingNest => AntStateKind::ExitingNest,
            AntState::Idle => AntStateKind::Idle,
            AntState::Seek { .. } => AntStateKind::Seek,
            AntState::Eat { .. } => AntStateKind::Eat,
            AntState::Return => AntStateKind::Return,
            AntState::Deposit => AntStateKind::Deposit,
            AntState::ToNest => AntStateKind::ToNest,
        }
    }

    /// Whether the ant integrates its position in this state.
    pub fn is_mobile(&self) -> bool {
        !matches!(
            self,
            AntState::InNest { .. } | AntState::Eat { .. } | AntState::Deposit
        )
    }

    /// The honey this state is bound to, if any.
    pub fn target(&self) -> Option<HoneyId> {
        match self {
            AntState::Seek { target } | AntState::Eat { target } => Some(*target),
            _ => None,
        }
    }
}

impl AntStateKind {
    /// Stable ordinal used when hashing world state.
    pub fn ordinal(self) -> u32 {
        self as u32
    }
}

// ---------------------------------------------------------------------------
// Update context and effects
// ---------------------------------------------------------------------------

/// Borrowed world state an ant reads and mutates during its update.
#[derive(Debug)]
pub struct AntContext<'a> {
    pub honeys: &'a mut SlotMap<HoneyId, Honey>,
    pub pot: &'a mut Pot,
    pub rng: &'a mut SimRng,
    pub config: &'a SimConfig,
    pub nest: (f32, f32),
    /// Canvas width and height.
    pub bounds: (f32, f32),
}

/// Side effect of an ant update that the world must act on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AntEffect {
    StateChanged {
        from: AntStateKind,
        to: AntStateKind,
    },
    /// The ant reached the pot entrance and started pouring.
    DepositStarted,
    /// Honey was poured while the pot was locked and is lost.
    DepositRejected { amount: Fixed64 },
    /// This ant's pour filled the pot.
    CollectionTriggered { color: Rgb },
}

// ---------------------------------------------------------------------------
// Ant
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Ant {
    pub x: f32,
    pub y: f32,
    /// Facing in radians, kept in (-π, π].
    pub heading: f32,
    state: AntState,
    payload: Fixed64,
    capacity: Fixed64,
    carried_color: Rgb,
    /// Render-only; also drives the entrance jitter.
    pub wobble_phase: f32,
    /// Render-only leg animation, advanced while walking.
    pub leg_cycle: f32,
}

impl Ant {
    /// An idle ant at `(x, y)` with a random heading.
    pub fn new(x: f32, y: f32, rng: &mut SimRng, config: &SimConfig) -> Self {
        Self::spawn(x, y, AntState::Idle, rng, config)
    }

    /// An ant waiting inside the nest for its first outing.
    pub fn in_nest(nest: (f32, f32), rng: &mut SimRng, config: &SimConfig) -> Self {
        let (lo, hi) = config.nest.spawn_wait;
        let timer = rng.range(lo, hi);
        Self::spawn(nest.0, nest.1, AntState::InNest { timer }, rng, config)
    }

    fn spawn(x: f32, y: f32, state: AntState, rng: &mut SimRng, config: &SimConfig) -> Self {
        let heading = wrap_signed_angle(rng.next_f32() * TAU);
        let wobble_phase = rng.next_f32() * 10.0;
        Self {
            x,
            y,
            heading,
            state,
            payload: Fixed64::ZERO,
            capacity: f64_to_fixed64(config.ant.capacity).max(Fixed64::ZERO),
            carried_color: Rgb::WHITE,
            wobble_phase,
            leg_cycle: 0.0,
        }
    }

    pub fn state(&self) -> AntState {
        self.state
    }

    pub fn payload(&self) -> Fixed64 {
        self.payload
    }

    pub fn capacity(&self) -> Fixed64 {
        self.capacity
    }

    /// Color of the carried honey. White while empty.
    pub fn carried_color(&self) -> Rgb {
        self.carried_color
    }

    /// Carried amount as a fraction of capacity.
    pub fn load_ratio(&self) -> f32 {
        ratio(self.payload, self.capacity)
    }

    /// Whether the ant is hidden inside the nest.
    pub fn is_hidden(&self) -> bool {
        matches!(self.state, AntState::InNest { .. })
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn set_state_for_test(&mut self, state: AntState) {
        self.state = state;
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn set_payload_for_test(&mut self, payload: Fixed64, color: Rgb) {
        self.payload = payload.clamp(Fixed64::ZERO, self.capacity);
        self.carried_color = color;
    }

    /// Advance this ant by `dt` seconds, pushing any cross-entity effects.
    pub fn update(&mut self, dt: f32, ctx: &mut AntContext<'_>, effects: &mut Vec<AntEffect>) {
        let before = self.state.kind();

        self.wobble_phase += dt * WOBBLE_SPEED;
        if !matches!(self.state, AntState::Eat { .. } | AntState::Deposit) {
            self.leg_cycle += dt * LEG_SPEED;
        }

        match self.state {
            AntState::InNest { timer } => self.update_in_nest(timer, dt, ctx),
            AntState::ExitingNest => self.update_exiting_nest(dt, ctx),
            AntState::Idle => self.update_idle(dt, ctx),
            AntState::Seek { target } => self.update_seek(target, dt, ctx),
            AntState::Eat { target } => self.update_eat(target, dt, ctx),
            AntState::Return => self.update_return(dt, ctx, effects),
            AntState::Deposit => self.update_deposit(dt, ctx, effects),
            AntState::ToNest => self.update_to_nest(dt, ctx),
        }

        if self.state.is_mobile() {
            let derate = self.load_ratio() * ctx.config.ant.load_derate;
            let speed = ctx.config.ant.speed * (1.0 - derate);
            self.x += self.heading.cos() * speed * dt;
            self.y += self.heading.sin() * speed * dt;
        }
        self.heading = wrap_signed_angle(self.heading);

        let after = self.state.kind();
        if before != after {
            effects.push(AntEffect::StateChanged {
                from: before,
                to: after,
            });
        }
    }

    // -----------------------------------------------------------------------
    // State handlers
    // -----------------------------------------------------------------------

    fn update_in_nest(&mut self, timer: f32, dt: f32, ctx: &mut AntContext<'_>) {
        let timer = timer - dt;
        if timer <= 0.0 {
            self.heading = FRAC_PI_2 + (ctx.rng.next_f32() - 0.5) * FRAC_PI_3;
            self.state = AntState::ExitingNest;
        } else {
            self.state = AntState::InNest { timer };
        }
    }

    fn update_exiting_nest(&mut self, dt: f32, ctx: &mut AntContext<'_>) {
        let from_nest = distance(self.x, self.y, ctx.nest.0, ctx.nest.1);
        self.avoid_pot(dt, ctx);
        if from_nest > ctx.config.nest.exit_distance {
            self.state = AntState::Idle;
        }
    }

    fn update_idle(&mut self, dt: f32, ctx: &mut AntContext<'_>) {
        self.heading += (ctx.rng.next_f32() - 0.5) * ctx.config.ant.turn_rate * dt;
        if let Some(target) = self.nearest_honey(ctx) {
            self.state = AntState::Seek { target };
        }
        self.avoid_pot(dt, ctx);
        self.keep_in_bounds(ctx);
    }

    fn update_seek(&mut self, target: HoneyId, dt: f32, ctx: &mut AntContext<'_>) {
        let Some(honey) = ctx.honeys.get(target).filter(|h| !h.is_empty()) else {
            self.abandon_target();
            return;
        };
        let (hx, hy) = (honey.x, honey.y);
        let contact = honey.radius() + ctx.config.ant.eat_contact_margin;

        self.turn_toward(hx, hy, dt, ctx);
        self.avoid_pot(dt, ctx);
        if distance(self.x, self.y, hx, hy) < contact {
            self.state = AntState::Eat { target };
        }
    }

    fn update_eat(&mut self, target: HoneyId, dt: f32, ctx: &mut AntContext<'_>) {
        let Some(honey) = ctx.honeys.get_mut(target).filter(|h| !h.is_empty()) else {
            self.abandon_target();
            return;
        };

        let room = (self.capacity - self.payload).max(Fixed64::ZERO);
        let want = f32_to_fixed64(dt * ctx.config.ant.eat_rate as f32);
        let taken = honey.take(want.min(room));
        if taken > Fixed64::ZERO {
            self.carried_color = mix(
                self.carried_color,
                fixed64_to_f32(self.payload),
                honey.color(),
                fixed64_to_f32(taken),
            );
            self.payload += taken;
        }

        if self.payload >= self.capacity {
            self.payload = self.capacity;
            self.state = AntState::Return;
        }
    }

    fn update_return(&mut self, dt: f32, ctx: &mut AntContext<'_>, effects: &mut Vec<AntEffect>) {
        let (ex, ey) = ctx.pot.entrance(&ctx.config.pot);
        let tx = ex + self.wobble_phase.sin() * ENTRANCE_JITTER.0;
        let ty = ey + self.wobble_phase.cos() * ENTRANCE_JITTER.1;

        self.turn_toward(tx, ty, dt, ctx);
        self.avoid_pot(dt, ctx);
        if distance(self.x, self.y, tx, ty) < ctx.config.ant.deposit_contact_radius {
            self.state = AntState::Deposit;
            effects.push(AntEffect::DepositStarted);
        }
    }

    fn update_deposit(&mut self, dt: f32, ctx: &mut AntContext<'_>, effects: &mut Vec<AntEffect>) {
        let rate = f32_to_fixed64(dt * ctx.config.ant.deposit_rate as f32);
        let poured = rate.clamp(Fixed64::ZERO, self.payload);

        if poured > Fixed64::ZERO {
            match ctx.pot.add_honey(self.carried_color, poured) {
                DepositOutcome::Accepted { .. } => {}
                DepositOutcome::Filled { accepted, color } => {
                    effects.push(AntEffect::CollectionTriggered { color });
                    if accepted < poured {
                        effects.push(AntEffect::DepositRejected {
                            amount: poured - accepted,
                        });
                    }
                }
                DepositOutcome::Rejected => {
                    effects.push(AntEffect::DepositRejected { amount: poured });
                }
            }
            self.payload -= poured;
        }

        if self.payload <= Fixed64::ZERO {
            self.payload = Fixed64::ZERO;
            self.carried_color = Rgb::WHITE;
            self.heading += PI;
            self.state = match ctx.config.world.spawn_mode {
                SpawnMode::Nest => AntState::ToNest,
                SpawnMode::Edges => AntState::Idle,
            };
        }
    }

    fn update_to_nest(&mut self, dt: f32, ctx: &mut AntContext<'_>) {
        let (nx, ny) = ctx.nest;
        self.turn_toward(nx, ny, dt, ctx);
        self.avoid_pot(dt, ctx);
        if distance(self.x, self.y, nx, ny) < ctx.config.nest.arrival_radius {
            self.x = nx;
            self.y = ny;
            let (lo, hi) = ctx.config.nest.rest_wait;
            self.state = AntState::InNest {
                timer: ctx.rng.range(lo, hi),
            };
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Drop a stale or exhausted target.
    fn abandon_target(&mut self) {
        self.state = if self.payload > Fixed64::ZERO {
            AntState::Return
        } else {
            AntState::Idle
        };
    }

    fn turn_toward(&mut self, tx: f32, ty: f32, dt: f32, ctx: &AntContext<'_>) {
        let target = bearing(self.x, self.y, tx, ty);
        self.heading = smooth_turn(self.heading, target, ctx.config.ant.turn_rate, dt);
    }

    fn avoid_pot(&mut self, dt: f32, ctx: &AntContext<'_>) {
        let center = ctx.pot.body_center(&ctx.config.pot);
        let Some(avoid) = pot_avoidance(self.x, self.y, self.heading, center, &ctx.config.pot)
        else {
            return;
        };
        self.heading = smooth_turn(
            self.heading,
            avoid.heading,
            ctx.config.ant.turn_rate,
            dt * avoid.urgency,
        );
        if let Some((px, py)) = avoid.push {
            self.x += px * dt;
            self.y += py * dt;
        }
    }

    /// Nearest non-empty honey strictly inside the sensing radius. Ties go to
    /// the earlier registry entry.
    fn nearest_honey(&self, ctx: &AntContext<'_>) -> Option<HoneyId> {
        let radius = ctx.config.ant.sensing_radius;
        let mut best: Option<(HoneyId, f32)> = None;
        for (id, honey) in ctx.honeys.iter() {
            if honey.is_empty() {
                continue;
            }
            let d = distance(self.x, self.y, honey.x, honey.y);
            if d < radius && best.is_none_or(|(_, bd)| d < bd) {
                best = Some((id, d));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Redirect toward the canvas center when far outside it.
    fn keep_in_bounds(&mut self, ctx: &AntContext<'_>) {
        let (w, h) = ctx.bounds;
        let m = ctx.config.world.bounds_margin;
        if self.x < -m || self.x > w + m || self.y < -m || self.y > h + m {
            self.heading = bearing(self.x, self.y, w / 2.0, h / 2.0);
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
