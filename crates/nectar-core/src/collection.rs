//! Collection flights: a filled pot's potion flying to the score counter.

use crate::color::Rgb;
use crate::config::CollectionConfig;

/// `1 - (1 - t)^3`: fast start, gentle landing.
pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// One potion in flight. Owned by the world, removed once it lands.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionFlight {
    origin: (f32, f32),
    target: (f32, f32),
    color: Rgb,
    progress: f32,
    speed: f32,
    end_scale: f32,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl CollectionFlight {
    pub fn new(
        origin: (f32, f32),
        target: (f32, f32),
        color: Rgb,
        config: &CollectionConfig,
    ) -> Self {
        Self {
            origin,
            target,
            color,
            progress: 0.0,
            speed: config.flight_speed,
            end_scale: config.end_scale,
            x: origin.0,
            y: origin.1,
            scale: 1.0,
        }
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Linear progress; the flight lands at 1.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn target(&self) -> (f32, f32) {
        self.target
    }

    /// Advance by `dt` seconds. Returns true once the flight has landed; the
    /// caller removes it and scores.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.progress += dt * self.speed;
        if self.progress >= 1.0 {
            self.x = self.target.0;
            self.y = self.target.1;
            self.scale = self.end_scale;
            return true;
        }
        let t = ease_out_cubic(self.progress);
        self.x = lerp(self.origin.0, self.target.0, t);
        self.y = lerp(self.origin.1, self.target.1, t);
        self.scale = lerp(1.0, self.end_scale, t);
        false
    }
}
