//! Threat gauge: maps a threat percentage onto a colour band and blinks while
//! the threat is critical.
//!
//! Blinking is a timed toggle driven by the host tick. [`ThreatGauge::tick`]
//! accumulates elapsed time and flips visibility once per whole interval,
//! resolving any number of elapsed intervals in constant time.

use log::debug;
use serde::Serialize;
use std::time::Duration;

use crate::config::ThreatConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatBand {
    Calm,
    Elevated,
    Danger,
    Critical,
}

/// A band with the colour it is drawn in, as reported by `status --json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BandLegend {
    pub band: ThreatBand,
    pub color: BandColor,
}

/// 8-bit RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BandColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl BandColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl ThreatBand {
    pub const ALL: [ThreatBand; 4] = [
        ThreatBand::Calm,
        ThreatBand::Elevated,
        ThreatBand::Danger,
        ThreatBand::Critical,
    ];

    pub fn legend() -> Vec<BandLegend> {
        Self::ALL
            .iter()
            .map(|&band| BandLegend {
                band,
                color: band.color(),
            })
            .collect()
    }

    pub fn color(&self) -> BandColor {
        match self {
            ThreatBand::Calm => BandColor::rgb(76, 175, 80),
            ThreatBand::Elevated => BandColor::rgb(255, 235, 59),
            ThreatBand::Danger => BandColor::rgb(255, 152, 0),
            ThreatBand::Critical => BandColor::rgb(244, 67, 54),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThreatGauge {
    thresholds: ThreatConfig,
    interval: Duration,
    percent: f32,
    band: ThreatBand,
    visible: bool,
    accumulated: Duration,
}

impl ThreatGauge {
    pub fn new(thresholds: ThreatConfig) -> Self {
        let interval = Duration::from_millis(thresholds.blink_interval_ms.max(1));
        Self {
            thresholds,
            interval,
            percent: 0.0,
            band: ThreatBand::Calm,
            visible: true,
            accumulated: Duration::ZERO,
        }
    }

    /// Band for a percentage under these thresholds. Input is clamped to
    /// `[0, 100]`; NaN counts as zero.
    pub fn classify(&self, percent: f32) -> ThreatBand {
        let p = clamp_percent(percent);
        let t = &self.thresholds;
        if p >= t.critical {
            ThreatBand::Critical
        } else if p >= t.danger {
            ThreatBand::Danger
        } else if p >= t.elevated {
            ThreatBand::Elevated
        } else {
            ThreatBand::Calm
        }
    }

    pub fn set_threat(&mut self, percent: f32) {
        self.percent = clamp_percent(percent);
        let band = self.classify(self.percent);
        if band == self.band {
            return;
        }
        debug!("Threat band {:?} -> {:?} at {:.1}%", self.band, band, self.percent);
        // Entering or leaving critical restarts the blink cycle fully visible.
        if band == ThreatBand::Critical || self.band == ThreatBand::Critical {
            self.visible = true;
            self.accumulated = Duration::ZERO;
        }
        self.band = band;
    }

    /// Advance the blink timer by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if self.band != ThreatBand::Critical || !(dt > 0.0) {
            return;
        }
        let Ok(step) = Duration::try_from_secs_f32(dt) else {
            return;
        };
        let interval = self.interval.as_nanos();
        let elapsed = self.accumulated.as_nanos() + step.as_nanos();
        // One flip per whole interval; only the parity matters.
        if (elapsed / interval) % 2 == 1 {
            self.visible = !self.visible;
        }
        let rest = elapsed % interval;
        self.accumulated =
            Duration::new((rest / 1_000_000_000) as u64, (rest % 1_000_000_000) as u32);
    }

    pub fn band(&self) -> ThreatBand {
        self.band
    }

    pub fn is_blinking(&self) -> bool {
        self.band == ThreatBand::Critical
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn percent(&self) -> f32 {
        self.percent
    }

    /// Bar fill in `[0, 1]`.
    pub fn fill(&self) -> f32 {
        self.percent / 100.0
    }

    /// Colour to draw this frame, fully transparent during the off phase of a blink.
    pub fn color(&self) -> BandColor {
        let mut color = self.band.color();
        if !self.visible {
            color.a = 0;
        }
        color
    }
}

fn clamp_percent(percent: f32) -> f32 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}
