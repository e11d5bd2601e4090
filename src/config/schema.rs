//! Configuration schema types for `heartfelt.toml`
//!
//! Every field has a default matching the shipped greeting page, so an empty
//! file (or no file at all) is a valid configuration.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Which keyboard map the page uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// `L`, `M` and space are bound
    #[default]
    Full,
    /// `L` and space only
    Simplified,
}

/// Page-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PageConfig {
    /// Keyboard map variant
    pub variant: Variant,
    /// Seed for decoration randomness (random when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Background heart settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartsConfig {
    /// Hearts created when the page starts
    pub initial: usize,
    /// The spawner only adds a heart while the page has fewer than this many
    pub cap: usize,
    /// Spawner period
    pub interval_ms: u64,
    pub palette: Vec<String>,
    /// Size range in pixels
    pub size: [f64; 2],
    /// Float duration range in seconds
    pub duration: [f64; 2],
    /// Start delay range in seconds
    pub delay: [f64; 2],
    pub animation: String,
}

impl Default for HeartsConfig {
    fn default() -> Self {
        Self {
            initial: 20,
            cap: 30,
            interval_ms: 3000,
            palette: ["#ff6b93", "#ff8fab", "#ffb3c6", "#ffcad4", "#ff4d7d"]
                .map(String::from)
                .to_vec(),
            size: [8.0, 28.0],
            duration: [15.0, 30.0],
            delay: [0.0, 10.0],
            animation: "float".to_string(),
        }
    }
}

/// Confetti burst settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfettiConfig {
    /// Pieces per burst
    pub count: usize,
    pub palette: Vec<String>,
    /// Size range in pixels
    pub size: [f64; 2],
    /// Rise duration range in seconds
    pub duration: [f64; 2],
    pub animation: String,
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            count: 50,
            palette: ["#ff6b93", "#ff8fab", "#ffb3c6", "#d23669", "#ff4d7d"]
                .map(String::from)
                .to_vec(),
            size: [5.0, 15.0],
            duration: [2.0, 5.0],
            animation: "floatUp".to_string(),
        }
    }
}

/// Secret modal heart set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalConfig {
    /// Hearts rebuilt every time the modal opens
    pub hearts: usize,
    pub size: f64,
    pub color: String,
    /// Left offset of the first heart, in percent
    pub start: f64,
    /// Distance between hearts, in percent
    pub spacing: f64,
    /// Float duration in seconds
    pub duration: f64,
    /// Delay added per heart, in seconds
    pub stagger: f64,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            hearts: 8,
            size: 12.0,
            color: "#ff6b93".to_string(),
            start: 10.0,
            spacing: 12.0,
            duration: 6.0,
            stagger: 0.3,
        }
    }
}

/// Scroll reveal settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Delay before the message group is revealed regardless of scroll
    pub entrance_delay_ms: u64,
    /// Members reveal once their top is above `viewport_height - threshold`
    pub threshold: f64,
    /// Cascade step between timeline entries
    pub timeline_step_ms: u64,
    /// Cascade step between quality cards
    pub quality_step_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self { entrance_delay_ms: 500, threshold: 100.0, timeline_step_ms: 200, quality_step_ms: 150 }
    }
}

/// Music player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Video embedded as background music
    pub video_id: String,
    /// Volume applied once the player is ready
    pub default_volume: u8,
    /// Progress bar refresh period
    pub progress_interval_ms: u64,
    /// Song title replacement shown after a player error
    pub error_label: String,
    /// Track name logged at startup
    pub track: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            video_id: "OPFmjthC8LY".to_string(),
            default_volume: 50,
            progress_interval_ms: 1000,
            error_label: "Music unavailable - YouTube error".to_string(),
            track: "Blue - Over October".to_string(),
        }
    }
}

/// Input-independent cosmetic cycles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub title_interval_ms: u64,
    /// Gap between clearing and restoring the title animation
    pub title_restart_ms: u64,
    pub title_animation: String,
    pub hue_interval_ms: u64,
    /// Degrees added per hue step
    pub hue_step: f64,
    /// Hue offset of the gradient's second stop
    pub hue_offset: f64,
    /// Delay between lyric lines
    pub lyric_step_ms: u64,
    /// Period after which all lyrics hide and the cascade restarts
    pub lyric_cycle_ms: u64,
    /// Pause between hiding the lyrics and restarting the cascade
    pub lyric_restart_ms: u64,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            title_interval_ms: 8000,
            title_restart_ms: 10,
            title_animation: "gentlePulse 4s infinite".to_string(),
            hue_interval_ms: 5000,
            hue_step: 0.1,
            hue_offset: 30.0,
            lyric_step_ms: 1500,
            lyric_cycle_ms: 15000,
            lyric_restart_ms: 500,
        }
    }
}

/// Transient click pulses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub photo_transform: String,
    pub photo_rest: String,
    pub photo_hold_ms: u64,
    pub social_transform: String,
    pub social_rest: String,
    pub social_hold_ms: u64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            photo_transform: "rotateY(20deg) scale(1.1)".to_string(),
            photo_rest: "rotateY(0deg) scale(1)".to_string(),
            photo_hold_ms: 600,
            social_transform: "scale(1.3)".to_string(),
            social_rest: "scale(1)".to_string(),
            social_hold_ms: 300,
        }
    }
}

/// Root of `heartfelt.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GreetingConfig {
    pub page: PageConfig,
    pub hearts: HeartsConfig,
    pub confetti: ConfettiConfig,
    pub modal: ModalConfig,
    pub reveal: RevealConfig,
    pub media: MediaConfig,
    pub ambient: AmbientConfig,
    pub pulse: PulseConfig,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "hearts.size")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "heartfelt.toml: '{}' {}", self.field, self.message)
    }
}

fn hex_color() -> &'static Regex {
    static HEX: OnceLock<Regex> = OnceLock::new();
    HEX.get_or_init(|| {
        Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").expect("valid regex")
    })
}

impl GreetingConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: &str| {
            errors.push(ConfigValidationError {
                field: field.to_string(),
                message: message.to_string(),
            })
        };

        // Hearts
        if self.hearts.cap == 0 {
            push("hearts.cap", "must be a positive integer");
        }
        if self.hearts.initial > self.hearts.cap {
            push("hearts.initial", "must not exceed hearts.cap");
        }
        if self.hearts.interval_ms == 0 {
            push("hearts.interval_ms", "must be a positive integer");
        }
        check_palette(&mut push, "hearts.palette", &self.hearts.palette);
        check_range(&mut push, "hearts.size", self.hearts.size);
        check_range(&mut push, "hearts.duration", self.hearts.duration);
        check_range(&mut push, "hearts.delay", self.hearts.delay);

        // Confetti
        if self.confetti.count == 0 {
            push("confetti.count", "must be a positive integer");
        }
        check_palette(&mut push, "confetti.palette", &self.confetti.palette);
        check_range(&mut push, "confetti.size", self.confetti.size);
        check_range(&mut push, "confetti.duration", self.confetti.duration);

        // Modal
        if !hex_color().is_match(&self.modal.color) {
            push("modal.color", "must be a hex color (#rgb, #rrggbb or #rrggbbaa)");
        }
        if !(self.modal.duration > 0.0) {
            push("modal.duration", "must be positive");
        }

        // Reveal
        if !self.reveal.threshold.is_finite() {
            push("reveal.threshold", "must be a finite number");
        }

        // Media
        if self.media.default_volume > 100 {
            push("media.default_volume", "must be between 0 and 100");
        }
        if self.media.progress_interval_ms == 0 {
            push("media.progress_interval_ms", "must be a positive integer");
        }

        // Ambient
        for (field, value) in [
            ("ambient.title_interval_ms", self.ambient.title_interval_ms),
            ("ambient.hue_interval_ms", self.ambient.hue_interval_ms),
            ("ambient.lyric_cycle_ms", self.ambient.lyric_cycle_ms),
        ] {
            if value == 0 {
                push(field, "must be a positive integer");
            }
        }
        if !self.ambient.hue_step.is_finite() || self.ambient.hue_step < 0.0 {
            push("ambient.hue_step", "must be a non-negative number");
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

fn check_palette(push: &mut impl FnMut(&str, &str), field: &str, palette: &[String]) {
    if palette.is_empty() {
        push(field, "must contain at least one color");
    } else if palette.iter().any(|c| !hex_color().is_match(c)) {
        push(field, "must contain only hex colors (#rgb, #rrggbb or #rrggbbaa)");
    }
}

fn check_range(push: &mut impl FnMut(&str, &str), field: &str, range: [f64; 2]) {
    if !range[0].is_finite() || !range[1].is_finite() {
        push(field, "bounds must be finite numbers");
    } else if range[0] < 0.0 || range[0] > range[1] {
        push(field, "must be [min, max] with 0 <= min <= max");
    }
}
