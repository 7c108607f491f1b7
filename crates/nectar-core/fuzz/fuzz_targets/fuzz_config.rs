#![no_main]
use libfuzzer_sys::fuzz_target;
use nectar_data::{Format, load_config_str};

fuzz_target!(|data: &[u8]| {
    // Arbitrary text in every supported format. Must not panic -- returning
    // Err is fine; an accepted config must build a world.
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    for format in Format::ALL {
        if let Ok(config) = load_config_str(text, format) {
            let (mut world, _clock, _audio) = nectar_core::test_utils::test_world(config);
            world.tick(0.016);
        }
    }
});
