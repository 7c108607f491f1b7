//! Events and queries example: passive event listeners and the snapshot API.
//!
//! Places honey next to a small colony, registers passive event listeners,
//! runs a simulated minute and prints what happened.
//!
//! Run with: `cargo run -p nectar-core --example events_and_queries`

use std::cell::RefCell;
use std::rc::Rc;

use nectar_core::ant::AntStateKind;
use nectar_core::audio::NullAudio;
use nectar_core::color::PaletteColor;
use nectar_core::config::SimConfig;
use nectar_core::event::{Event, EventKind};
use nectar_core::sim::ManualClock;
use nectar_core::world::World;

fn main() {
    let mut config = SimConfig::default();
    config.world.initial_ants = 8;
    config.pot.max_fill = 40.0;

    let clock = ManualClock::new();
    let Ok(mut world) = World::new(config, Box::new(clock.clone()), Box::new(NullAudio)) else {
        eprintln!("default config rejected");
        return;
    };

    // --- Place honey in two colors ---

    world.select_color(PaletteColor::Amber);
    for (x, y) in [(250.0, 160.0), (550.0, 160.0)] {
        let _ = world.place_honey(x, y);
    }
    world.select_color(PaletteColor::Sapphire);
    for (x, y) in [(200.0, 320.0), (600.0, 320.0)] {
        let _ = world.place_honey(x, y);
    }

    // --- Register passive event listeners ---

    let eaters = Rc::new(RefCell::new(0u32));
    let e = eaters.clone();
    world.on_event(
        EventKind::AntStateChanged,
        Box::new(move |event| {
            if let Event::AntStateChanged {
                to: AntStateKind::Eat,
                ..
            } = event
            {
                *e.borrow_mut() += 1;
            }
        }),
    );

    let potions = Rc::new(RefCell::new(Vec::new()));
    let p = potions.clone();
    world.on_event(
        EventKind::CollectionTriggered,
        Box::new(move |event| {
            if let Event::CollectionTriggered { color, tick } = event {
                p.borrow_mut().push((*tick, color.to_rgb8()));
            }
        }),
    );

    world.on_event(
        EventKind::HoneyDepleted,
        Box::new(|event| println!("  honey used up at tick {}", event.tick())),
    );

    // --- Run one simulated minute at 60 FPS ---

    for _ in 0..3600 {
        clock.advance_secs(1.0 / 60.0);
        world.tick(1.0 / 60.0);
    }

    // --- Query ---

    let snapshot = world.snapshot();
    println!("after {} ticks:", snapshot.tick);
    println!("  ants started eating {} times", eaters.borrow());
    for (tick, [r, g, b]) in potions.borrow().iter() {
        println!("  potion #{r:02X}{g:02X}{b:02X} collected at tick {tick}");
    }
    println!("  score: {}", snapshot.score);
    println!(
        "  pot: {:.1}/{:.1} (locked: {})",
        snapshot.pot.fill.to_num::<f64>(),
        snapshot.pot.max_fill.to_num::<f64>(),
        snapshot.pot.locked
    );
    println!("  visible ants: {}", snapshot.visible_ants().count());
    for honey in &snapshot.honeys {
        println!(
            "  honey at ({:.0}, {:.0}): {:.1} left",
            honey.x,
            honey.y,
            honey.amount.to_num::<f64>()
        );
    }
}
