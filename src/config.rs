/// Game and scene configuration.
///
/// One `GameConfig` covers every rule variant of the page (hazard odds, win
/// target, how a session is lost, whether the trust scene is shown, poem
/// timing). It is validated once, when a session or scene machine is built.

use thiserror::Error;

use crate::entities::Field;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LossMode {
    /// Only catching a hazard loses.
    InstantHazard,
    /// Catching a hazard loses, and every missed item costs one of `n` lives.
    Lives(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryMode {
    /// Restart the session automatically after a short game-over display.
    Auto { delay_ms: u64 },
    /// Show a retry control and wait for the player to confirm.
    OnConfirm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoemFinish {
    /// Move to the final scene once the reveal and trailing delay are over.
    Auto,
    /// Offer a "next" control once the reveal and trailing delay are over.
    OnConfirm,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("hazard probability must be within 0..=1, got {0}")]
    HazardProbability(f64),
    #[error("win threshold must be at least 1")]
    ZeroWinThreshold,
    #[error("lives mode needs at least one life")]
    ZeroLives,
    #[error("at most {max} lives are supported, got {0}", max = MAX_LIVES)]
    TooManyLives(u32),
    #[error("item speed range {min}..{max} is not a valid positive range")]
    SpeedRange { min: f32, max: f32 },
    #[error("{0} interval must be greater than zero")]
    ZeroInterval(&'static str),
    #[error("play field {width}x{height} is not positive")]
    Field { width: f32, height: f32 },
    #[error("{what} is {size} wide but the field is only {field}")]
    TooWide {
        what: &'static str,
        size: f32,
        field: f32,
    },
    #[error("{what} delay of {ms} ms exceeds the {max} ms limit", max = MAX_DELAY_MS)]
    DelayTooLong { what: &'static str, ms: u64 },
    #[error("poem has no lines")]
    EmptyPoem,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub field: Field,
    pub hazard_probability: f64,
    pub win_threshold: u32,
    pub loss_mode: LossMode,
    pub retry: RetryMode,
    pub include_trust_scene: bool,
    /// Milliseconds between spawns.
    pub spawn_interval_ms: u64,
    /// Milliseconds between frames (≈60 FPS by default).
    pub frame_interval_ms: u64,
    pub item_speed_min: f32,
    pub item_speed_max: f32,
    /// Pause between the winning catch and leaving the game scene.
    pub win_transition_delay_ms: u64,
    /// Advance from the trust scene on its own after this long.
    pub trust_auto_advance_ms: Option<u64>,
    pub poem_line_delay_ms: u64,
    pub poem_trailing_delay_ms: u64,
    pub poem_finish: PoemFinish,
    pub poem: Vec<String>,
    /// Seed for the spawner's RNG; entropy when `None`.
    pub seed: Option<u64>,
}

impl GameConfig {
    /// Hazard items, fifteen catches to win, explicit retry.
    pub fn classic() -> Self {
        Self {
            field: Field {
                width: 400.0,
                height: 500.0,
            },
            hazard_probability: 0.2,
            win_threshold: 15,
            loss_mode: LossMode::InstantHazard,
            retry: RetryMode::OnConfirm,
            include_trust_scene: true,
            spawn_interval_ms: 800,
            frame_interval_ms: 16,
            item_speed_min: 3.0,
            item_speed_max: 5.0,
            win_transition_delay_ms: 1000,
            trust_auto_advance_ms: None,
            poem_line_delay_ms: 1000,
            poem_trailing_delay_ms: 500,
            poem_finish: PoemFinish::OnConfirm,
            poem: crate::poem::default_poem(),
            seed: None,
        }
    }

    /// No hazards, three lives lost to misses, ten catches to win, and an
    /// automatic restart after a loss.
    pub fn hard() -> Self {
        Self {
            hazard_probability: 0.0,
            win_threshold: 10,
            loss_mode: LossMode::Lives(3),
            retry: RetryMode::Auto { delay_ms: 1500 },
            include_trust_scene: false,
            spawn_interval_ms: 600,
            ..Self::classic()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Field { width, height } = self.field;
        if !(width > 0.0 && height > 0.0) {
            return Err(ConfigError::Field { width, height });
        }
        if !(0.0..=1.0).contains(&self.hazard_probability) {
            return Err(ConfigError::HazardProbability(self.hazard_probability));
        }
        if self.win_threshold == 0 {
            return Err(ConfigError::ZeroWinThreshold);
        }
        match self.loss_mode {
            LossMode::Lives(0) => return Err(ConfigError::ZeroLives),
            LossMode::Lives(n) if n > MAX_LIVES => return Err(ConfigError::TooManyLives(n)),
            _ => {}
        }
        let (min, max) = (self.item_speed_min, self.item_speed_max);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min < max) {
            return Err(ConfigError::SpeedRange { min, max });
        }
        if self.spawn_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("spawn"));
        }
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("frame"));
        }
        if self.poem_line_delay_ms == 0 {
            return Err(ConfigError::ZeroInterval("poem line"));
        }
        let retry_ms = match self.retry {
            RetryMode::Auto { delay_ms } => Some(delay_ms),
            RetryMode::OnConfirm => None,
        };
        let delays = [
            ("spawn", Some(self.spawn_interval_ms)),
            ("frame", Some(self.frame_interval_ms)),
            ("win transition", Some(self.win_transition_delay_ms)),
            ("trust auto-advance", self.trust_auto_advance_ms),
            ("retry", retry_ms),
            ("poem line", Some(self.poem_line_delay_ms)),
            ("poem trailing", Some(self.poem_trailing_delay_ms)),
        ];
        for (what, ms) in delays {
            if let Some(ms) = ms.filter(|&ms| ms > MAX_DELAY_MS) {
                return Err(ConfigError::DelayTooLong { what, ms });
            }
        }
        for (what, size) in [("catcher", CATCHER_SIZE), ("emitter", EMITTER_SIZE)] {
            if size > width {
                return Err(ConfigError::TooWide {
                    what,
                    size,
                    field: width,
                });
            }
        }
        if self.poem.is_empty() {
            return Err(ConfigError::EmptyPoem);
        }
        Ok(())
    }

    pub fn initial_lives(&self) -> Option<u32> {
        match self.loss_mode {
            LossMode::InstantHazard => None,
            LossMode::Lives(n) => Some(n),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::classic()
    }
}

/// Upper bound for every configured delay or interval.
pub const MAX_DELAY_MS: u64 = 60_000;
pub const MAX_LIVES: u32 = 99;

// ── Entity dimensions ─────────────────────────────────────────────────────────

pub const CATCHER_SIZE: f32 = 60.0;
/// Distance from the catcher's top edge to the bottom of the field.
pub const CATCHER_BOTTOM_OFFSET: f32 = 80.0;
pub const EMITTER_SIZE: f32 = 70.0;
pub const EMITTER_TOP: f32 = 10.0;
pub const EMITTER_SPEED: f32 = 3.0;
pub const ITEM_SIZE: f32 = 40.0;
