//! Player settings and preferences
//!
//! Persisted in LocalStorage on the web build.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// Vertical taps per pixel for the reel motion blur
    pub fn blur_samples(&self) -> u32 {
        match self {
            QualityPreset::Low => 4,
            QualityPreset::Medium => 8,
            QualityPreset::High => 16,
        }
    }
}

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Blur reels while they scroll
    pub motion_blur: bool,
    /// Reduced motion (no blur)
    pub reduced_motion: bool,
    /// Fixed RNG seed; `None` seeds from the clock
    pub seed: Option<u64>,
    /// Spin and lever feel
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            motion_blur: true,
            reduced_motion: false,
            seed: None,
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "lever_reels_settings";

    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.tuning = settings.tuning.sanitized();
        Ok(settings)
    }

    /// Blur taps the renderer should use (0 disables blur)
    pub fn effective_blur_samples(&self) -> u32 {
        if !self.motion_blur || self.reduced_motion {
            0
        } else {
            self.quality.blur_samples()
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blur_respects_toggles() {
        let mut settings = Settings {
            quality: QualityPreset::High,
            ..Settings::default()
        };
        assert_eq!(settings.effective_blur_samples(), 16);

        settings.reduced_motion = true;
        assert_eq!(settings.effective_blur_samples(), 0);

        settings.reduced_motion = false;
        settings.motion_blur = false;
        assert_eq!(settings.effective_blur_samples(), 0);
    }

    #[test]
    fn test_json_round_trip_keeps_fields() {
        let mut settings = Settings {
            quality: QualityPreset::Low,
            seed: Some(77),
            ..Settings::default()
        };
        settings.tuning.blur_scale = 4.0;

        let json = serde_json::to_string(&settings).expect("serialize");
        assert_eq!(Settings::from_json(&json).expect("parse"), settings);
    }

    #[test]
    fn test_partial_json_fills_defaults_and_sanitizes() {
        let settings = Settings::from_json(r#"{"seed": 5, "tuning": {"reel_count": 0}}"#)
            .expect("parse");
        assert_eq!(settings.seed, Some(5));
        assert_eq!(settings.quality, QualityPreset::Medium);
        assert!(settings.motion_blur);
        assert_eq!(settings.tuning.reel_count, 1);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Settings::from_json("{not json").is_err());
        assert!(Settings::from_json(r#"{"quality": "Ultra"}"#).is_err());
    }
}
