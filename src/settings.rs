//! Game settings and preferences
//!
//! Owned by the shell, read by the presentation layer; the simulation only
//! cares about the particle budget. Serialized as JSON wherever the host
//! keeps preferences.

use serde::{Deserialize, Serialize};

/// Effects quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Particle budget for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 128,
            QualityPreset::Medium => 512,
            QualityPreset::High => 2048,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub quality: QualityPreset,

    /// Screen shake on explosions/impacts
    pub screen_shake: bool,
    /// Particle effects
    pub particles: bool,
    /// Floating damage numbers
    pub damage_numbers: bool,

    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,

    /// Reduced motion (minimize shake and flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            screen_shake: true,
            particles: true,
            damage_numbers: true,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse stored settings, falling back to defaults on any corruption
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|e| {
            log::warn!("settings corrupted ({e}), using defaults");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduced_motion_overrides_shake() {
        let mut settings = Settings::default();
        assert!(settings.effective_screen_shake());
        settings.reduced_motion = true;
        assert!(!settings.effective_screen_shake());
    }

    #[test]
    fn disabled_particles_zero_the_cap() {
        let mut settings = Settings::default();
        assert!(settings.max_particles() > 0);
        settings.particles = false;
        assert_eq!(settings.max_particles(), 0);
    }

    #[test]
    fn json_round_trip_and_corruption_fallback() {
        let mut settings = Settings::default();
        settings.quality = QualityPreset::High;
        settings.music_volume = 0.25;
        let json = settings.to_json().unwrap();
        let back = Settings::from_json(&json);
        assert_eq!(back.quality, QualityPreset::High);
        assert_eq!(back.music_volume, 0.25);

        let fallback = Settings::from_json("{not json");
        assert_eq!(fallback.quality, QualityPreset::Medium);
    }
}
