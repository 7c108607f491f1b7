//! Read-only query API for inspecting world state.
//!
//! Provides snapshot types that aggregate world state into convenient views
//! for rendering and UI consumers. All types are owned copies -- no
//! references into internal world storage.

use serde::Serialize;

use crate::ant::AntStateKind;
use crate::color::{PaletteColor, Rgb};
use crate::fixed::Fixed64;
use crate::id::{AntId, HoneyId};

// ---------------------------------------------------------------------------
// Entity snapshots
// ---------------------------------------------------------------------------

/// A read-only view of one ant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AntSnapshot {
    pub id: AntId,
    pub x: f32,
    pub y: f32,
    pub heading: f32,
    pub state: AntStateKind,
    /// Honey the ant is seeking or eating.
    pub target: Option<HoneyId>,
    pub payload: Fixed64,
    /// Payload as a 0..1 fraction of capacity.
    pub load_ratio: f32,
    pub carried_color: Rgb,
    /// True while inside the nest; renderers skip hidden ants.
    pub hidden: bool,
    pub wobble_phase: f32,
    pub leg_cycle: f32,
}

/// A read-only view of one honey blob.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoneySnapshot {
    pub id: HoneyId,
    pub x: f32,
    pub y: f32,
    pub color: Rgb,
    pub amount: Fixed64,
    pub max_amount: Fixed64,
    pub radius: f32,
    pub wobble_time: f32,
    pub wobble_intensity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PotSnapshot {
    pub x: f32,
    pub y: f32,
    pub fill: Fixed64,
    pub max_fill: Fixed64,
    pub fill_ratio: f32,
    pub color: Rgb,
    pub locked: bool,
    pub liquid_phase: f32,
}

/// A collection flight in progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionSnapshot {
    pub x: f32,
    pub y: f32,
    pub color: Rgb,
    /// Linear progress in [0, 1).
    pub progress: f32,
    pub scale: f32,
}

// ---------------------------------------------------------------------------
// World snapshot
// ---------------------------------------------------------------------------

/// Everything a renderer needs for one frame, read after a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub width: f32,
    pub height: f32,
    pub nest: (f32, f32),
    pub score: u32,
    pub paused: bool,
    pub selected_color: PaletteColor,
    pub volume: f32,
    pub ants: Vec<AntSnapshot>,
    pub honeys: Vec<HoneySnapshot>,
    pub pot: PotSnapshot,
    pub collections: Vec<CollectionSnapshot>,
}

impl WorldSnapshot {
    /// Ants currently visible on the field.
    pub fn visible_ants(&self) -> impl Iterator<Item = &AntSnapshot> {
        self.ants.iter().filter(|ant| !ant.hidden)
    }
}
