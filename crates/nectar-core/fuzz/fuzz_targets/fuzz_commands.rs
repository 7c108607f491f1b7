#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nectar_core::color::{PaletteColor, Rgb};
use nectar_core::config::SimConfig;
use nectar_core::test_utils::*;

/// A structured player or host command for fuzzing.
#[derive(Arbitrary, Debug)]
enum FuzzOp {
    Place { x: f32, y: f32 },
    Select { index: u8 },
    Pour { r: u8, g: u8, b: u8, amount: u16 },
    Volume { volume: f32 },
    Resize { width: f32, height: f32 },
    Pause,
    Resume,
    Reset,
    Tick { dt: f32 },
    Advance { millis: u16 },
}

/// Top-level fuzz input: a sequence of operations.
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    ops: Vec<FuzzOp>,
}

fuzz_target!(|input: FuzzInput| {
    let mut config = SimConfig::default();
    config.world.initial_ants = 6;
    config.pot.max_fill = 50.0;
    let (mut world, clock, _audio) = test_world(config);

    // Limit operations to prevent timeouts.
    let max_ops = input.ops.len().min(400);

    for op in &input.ops[..max_ops] {
        match *op {
            FuzzOp::Place { x, y } => {
                let _ = world.place_honey(x, y);
            }
            FuzzOp::Select { index } => {
                let palette = PaletteColor::ALL;
                world.select_color(palette[index as usize % palette.len()]);
            }
            FuzzOp::Pour { r, g, b, amount } => {
                let color = Rgb::new(f32::from(r), f32::from(g), f32::from(b));
                world.pour(color, fixed(f64::from(amount)));
            }
            FuzzOp::Volume { volume } => world.set_volume(volume),
            FuzzOp::Resize { width, height } => world.resize(width, height),
            FuzzOp::Pause => world.pause(),
            FuzzOp::Resume => world.resume(),
            FuzzOp::Reset => world.reset(),
            FuzzOp::Tick { dt } => world.tick(dt),
            FuzzOp::Advance { millis } => {
                clock.advance(std::time::Duration::from_millis(u64::from(millis)));
            }
        }

        let pot = world.pot();
        assert!(pot.fill() <= pot.max_fill());
        for (_, ant) in world.ants() {
            assert!(ant.payload() <= ant.capacity());
        }
    }
});
