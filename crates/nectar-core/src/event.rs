//! World events and the bus that batches them.
//!
//! The world emits events while a tick runs; [`EventBus::deliver`] hands them
//! to listeners once the tick is done. Each kind has its own bounded
//! [`EventBuffer`]. Listeners only observe (score display, analytics); they
//! cannot reach back into the world.
//!
//! A suppressed kind is never buffered, so hosts that don't care about a
//! chatty kind such as [`EventKind::AntStateChanged`] pay nothing for it.

use std::collections::VecDeque;

use crate::ant::AntStateKind;
use crate::color::Rgb;
use crate::fixed::Fixed64;
use crate::id::{AntId, HoneyId};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A world event. All events carry the tick at which they occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    HoneyPlaced {
        honey: HoneyId,
        x: f32,
        y: f32,
        color: Rgb,
        tick: u64,
    },
    /// An empty blob was removed at the end of a tick.
    HoneyDepleted {
        honey: HoneyId,
        tick: u64,
    },
    AntStateChanged {
        ant: AntId,
        from: AntStateKind,
        to: AntStateKind,
        tick: u64,
    },
    /// An ant reached the pot entrance and began pouring.
    DepositStarted {
        ant: AntId,
        tick: u64,
    },
    /// Honey poured while the pot was locked, or past capacity on the
    /// filling pour; it is lost.
    DepositRejected {
        ant: AntId,
        amount: Fixed64,
        tick: u64,
    },
    CollectionTriggered {
        color: Rgb,
        tick: u64,
    },
    /// The pot emptied after a collection.
    PotReset {
        tick: u64,
    },
    /// A collection flight landed; `score` is the new total.
    PotionCollected {
        score: u32,
        tick: u64,
    },
}

/// Which variant an [`Event`] is; the key for suppression and listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    HoneyPlaced,
    HoneyDepleted,
    AntStateChanged,
    DepositStarted,
    DepositRejected,
    CollectionTriggered,
    PotReset,
    PotionCollected,
}

const EVENT_KIND_COUNT: usize = 8;

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::HoneyPlaced { .. } => EventKind::HoneyPlaced,
            Event::HoneyDepleted { .. } => EventKind::HoneyDepleted,
            Event::AntStateChanged { .. } => EventKind::AntStateChanged,
            Event::DepositStarted { .. } => EventKind::DepositStarted,
            Event::DepositRejected { .. } => EventKind::DepositRejected,
            Event::CollectionTriggered { .. } => EventKind::CollectionTriggered,
            Event::PotReset { .. } => EventKind::PotReset,
            Event::PotionCollected { .. } => EventKind::PotionCollected,
        }
    }

    pub fn tick(&self) -> u64 {
        match self {
            Event::HoneyPlaced { tick, .. }
            | Event::HoneyDepleted { tick, .. }
            | Event::AntStateChanged { tick, .. }
            | Event::DepositStarted { tick, .. }
            | Event::DepositRejected { tick, .. }
            | Event::CollectionTriggered { tick, .. }
            | Event::PotReset { tick }
            | Event::PotionCollected { tick, .. } => *tick,
        }
    }
}

impl EventKind {
    pub const ALL: [EventKind; EVENT_KIND_COUNT] = [
        EventKind::HoneyPlaced,
        EventKind::HoneyDepleted,
        EventKind::AntStateChanged,
        EventKind::DepositStarted,
        EventKind::DepositRejected,
        EventKind::CollectionTriggered,
        EventKind::PotReset,
        EventKind::PotionCollected,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer
// ---------------------------------------------------------------------------

/// Bounded FIFO of pending events. Allocated once at its capacity; pushing
/// into a full buffer evicts the oldest event.
#[derive(Debug)]
pub struct EventBuffer {
    queue: VecDeque<Event>,
    capacity: usize,
    /// Pushes over the buffer's lifetime, evicted ones included.
    pushed: u64,
}

impl EventBuffer {
    /// Capacity 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity,
            pushed: 0,
        }
    }

    pub fn push(&mut self, event: Event) {
        if self.queue.len() == self.capacity {
            self.queue.pop_front();
        }
        self.queue.push_back(event);
        self.pushed += 1;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn total_written(&self) -> u64 {
        self.pushed
    }

    /// Oldest first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Event> + '_ {
        self.queue.iter()
    }

    fn drain(&mut self) -> Vec<Event> {
        self.queue.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

/// A passive listener receives events read-only.
pub type EventListener = Box<dyn FnMut(&Event)>;

/// Predicate deciding which events of its kind a listener sees.
pub type EventFilter = Box<dyn Fn(&Event) -> bool>;

/// Delivery order within a kind. Lower runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListenerPriority {
    Pre,
    Normal,
    Post,
}

struct Subscriber {
    priority: ListenerPriority,
    seq: u64,
    filter: Option<EventFilter>,
    callback: EventListener,
}

impl Subscriber {
    fn notify(&mut self, event: &Event) {
        if self.filter.as_ref().is_none_or(|accept| accept(event)) {
            (self.callback)(event);
        }
    }
}

/// Everything the bus tracks for one event kind.
#[derive(Default)]
struct Channel {
    suppressed: bool,
    /// Created on first emit.
    pending: Option<EventBuffer>,
    subscribers: Vec<Subscriber>,
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Per-kind buffers, subscribers and suppression flags.
pub struct EventBus {
    channels: [Channel; EVENT_KIND_COUNT],
    buffer_capacity: usize,
    next_seq: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for kind in EventKind::ALL {
            let channel = &self.channels[kind.slot()];
            map.entry(
                &kind,
                &(
                    channel.suppressed,
                    channel.pending.as_ref().map_or(0, EventBuffer::len),
                    channel.subscribers.len(),
                ),
            );
        }
        map.finish()
    }
}

impl EventBus {
    /// `buffer_capacity` bounds how many events of one kind a single tick
    /// can hold before the oldest are evicted.
    pub fn new(buffer_capacity: usize) -> Self {
        Self {
            channels: Default::default(),
            buffer_capacity,
            next_seq: 0,
        }
    }

    /// Stop recording a kind. Its buffer is freed and later emits are no-ops.
    pub fn suppress(&mut self, kind: EventKind) {
        let channel = &mut self.channels[kind.slot()];
        channel.suppressed = true;
        channel.pending = None;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.channels[kind.slot()].suppressed
    }

    /// Queue an event for the next [`deliver`](Self::deliver).
    pub fn emit(&mut self, event: Event) {
        let channel = &mut self.channels[event.kind().slot()];
        if channel.suppressed {
            return;
        }
        let capacity = self.buffer_capacity;
        channel
            .pending
            .get_or_insert_with(|| EventBuffer::new(capacity))
            .push(event);
    }

    pub fn on(&mut self, kind: EventKind, listener: EventListener) {
        self.on_filtered(kind, ListenerPriority::Normal, None, listener);
    }

    pub fn on_filtered(
        &mut self,
        kind: EventKind,
        priority: ListenerPriority,
        filter: Option<EventFilter>,
        listener: EventListener,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let subscribers = &mut self.channels[kind.slot()].subscribers;
        let at = subscribers.partition_point(|s| (s.priority, s.seq) < (priority, seq));
        subscribers.insert(
            at,
            Subscriber {
                priority,
                seq,
                filter,
                callback: listener,
            },
        );
    }

    /// Hand every pending event to its kind's subscribers and empty the
    /// buffers.
    ///
    /// Kinds go in declaration order. Within a kind each subscriber, by
    /// priority then registration, sees the events oldest first.
    pub fn deliver(&mut self) {
        for channel in &mut self.channels {
            let Some(pending) = channel.pending.as_mut().filter(|b| !b.is_empty()) else {
                continue;
            };
            let events = pending.drain();
            for subscriber in &mut channel.subscribers {
                for event in &events {
                    subscriber.notify(event);
                }
            }
        }
    }

    /// `None` until the kind is first emitted, or while suppressed.
    pub fn buffer(&self, kind: EventKind) -> Option<&EventBuffer> {
        self.channels[kind.slot()].pending.as_ref()
    }

    pub fn buffered_count(&self, kind: EventKind) -> usize {
        self.buffer(kind).map_or(0, EventBuffer::len)
    }

    /// Events ever emitted for a kind, evicted ones included.
    pub fn total_emitted(&self, kind: EventKind) -> u64 {
        self.buffer(kind).map_or(0, EventBuffer::total_written)
    }

    /// Drop pending events. Subscribers and suppression stay.
    pub fn clear_all(&mut self) {
        for pending in self.channels.iter_mut().filter_map(|c| c.pending.as_mut()) {
            pending.clear();
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
