//! Nectar Core -- the simulation behind the honey-foraging ant game.
//!
//! Ants wander a canvas, find player-placed honey, drink it, and pour it
//! into a central pot. A full pot locks, flies off as a potion to the score
//! counter, and empties after a short real-time delay.
//!
//! # Tick Pipeline
//!
//! Each call to [`world::World::tick`] advances the simulation by one frame:
//!
//! 1. **Timers** -- Fire clock timers that have come due (pot unlock).
//! 2. **Ants** -- Every ant senses, runs its state handler and moves.
//! 3. **Effects** -- Ant side effects become sound cues, timers and flights.
//! 4. **Animate** -- Pot and honey render state advance.
//! 5. **Flights** -- Collection flights move; landed flights score.
//! 6. **Cleanup** -- Exhausted honey is removed.
//! 7. **Post-tick** -- Buffered events are delivered to listeners.
//! 8. **Bookkeeping** -- The tick counter and elapsed time advance.
//!
//! Rendering reads [`world::World::snapshot`] after a tick and never feeds
//! back into the simulation.
//!
//! # Key Types
//!
//! - [`world::World`] -- Owns all entities; commands and the tick pipeline.
//! - [`ant::Ant`] -- The forager state machine ([`ant::AntState`]).
//! - [`honey::Honey`] -- Depletable colored food.
//! - [`pot::Pot`] -- Fill, color mixing and the collection lock.
//! - [`audio::AudioDispatcher`] -- Volume, pour rate-limiting and the
//!   [`audio::AudioSink`] backend seam.
//! - [`sim::Clock`] / [`sim::TimerQueue`] -- Real-time side effects that are
//!   still deterministic under test.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for honey quantities.
//! - [`event::EventBus`] -- Typed events with buffered delivery.

pub mod ant;
pub mod audio;
pub mod collection;
pub mod color;
pub mod config;
pub mod event;
pub mod fixed;
pub mod honey;
pub mod id;
pub mod pot;
pub mod query;
pub mod rng;
pub mod sim;
pub mod steering;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
