//! Per-tick HUD helpers that carry logic but no drawing.

pub mod threat;

pub use threat::{BandColor, BandLegend, ThreatBand, ThreatGauge};
