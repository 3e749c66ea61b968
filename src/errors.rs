use thiserror::Error;

/// Errors raised while validating a loaded [`crate::config::Config`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Threat thresholds must satisfy `0 < elevated < danger < critical <= 100`.
    #[error("threat thresholds out of order: elevated={elevated} danger={danger} critical={critical}")]
    ThresholdOrder {
        elevated: f32,
        danger: f32,
        critical: f32,
    },

    #[error("blink interval must be greater than zero")]
    BlinkInterval,

    #[error("decor tile length must be greater than zero (got {0})")]
    TileLength(f32),

    #[error("simulation frame rate must be greater than zero")]
    FrameRate,

    /// One of the `[scenes]` entries is blank.
    #[error("scene name for {0} is empty")]
    EmptySceneName(&'static str),

    #[error("high score capacity must be at least 1")]
    HighScoreCapacity,
}
