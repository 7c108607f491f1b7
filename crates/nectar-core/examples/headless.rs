//! Headless host: drives the simulation on the wall clock with structured
//! logging and prints a JSON snapshot at the end.
//!
//! Run with: `RUST_LOG=nectar_core=debug cargo run -p nectar-core --example headless`

use nectar_core::audio::NullAudio;
use nectar_core::config::SimConfig;
use nectar_core::sim::SystemClock;
use nectar_core::world::World;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const FRAMES: u32 = 600;
const DT: f32 = 1.0 / 60.0;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = SimConfig::default();
    config.pot.max_fill = 60.0;
    let mut world = match World::new(config, Box::new(SystemClock::new()), Box::new(NullAudio)) {
        Ok(world) => world,
        Err(err) => {
            warn!(%err, "invalid config");
            return;
        }
    };

    for (x, y) in [(250.0, 160.0), (550.0, 160.0), (200.0, 300.0), (600.0, 300.0)] {
        if let Err(err) = world.place_honey(x, y) {
            warn!(%err, x, y, "placement refused");
        }
    }

    for frame in 0..FRAMES {
        world.tick(DT);
        if frame % 120 == 0 {
            info!(
                frame,
                score = world.score(),
                honey = world.honey_count(),
                fill = world.pot().fill_ratio(),
                "progress"
            );
        }
        std::thread::sleep(std::time::Duration::from_secs_f32(DT / 4.0));
    }

    match serde_json::to_string_pretty(&world.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(err) => warn!(%err, "snapshot serialization failed"),
    }
}
