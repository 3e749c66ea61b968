//! Endless background scrolling for trees, flags and snow banks.

/// Offset into a repeating decor strip. The host draws the strip shifted by
/// [`DecorScroller::offset`] and lets the tiles repeat.
#[derive(Debug, Clone, PartialEq)]
pub struct DecorScroller {
    speed: f32,
    tile_length: f32,
    offset: f32,
}

impl DecorScroller {
    pub fn new(speed: f32, tile_length: f32) -> Self {
        Self {
            speed,
            tile_length,
            offset: 0.0,
        }
    }

    pub fn from_config(config: &crate::config::DecorConfig) -> Self {
        Self::new(config.scroll_speed, config.tile_length)
    }

    /// Advance by `dt` seconds of (already time-scaled) game time.
    pub fn tick(&mut self, dt: f32) {
        if !(self.tile_length > 0.0) || !dt.is_finite() {
            self.offset = 0.0;
            return;
        }
        // rem_euclid keeps the result in [0, tile_length) for negative speeds too
        self.offset = (self.offset + self.speed * dt).rem_euclid(self.tile_length);
        if self.offset >= self.tile_length {
            self.offset = 0.0;
        }
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Offset as a fraction of one tile, handy for UV scrolling.
    pub fn phase(&self) -> f32 {
        if self.tile_length > 0.0 {
            self.offset / self.tile_length
        } else {
            0.0
        }
    }
}
