use crate::core::clock::PlaybackSpeed;
use crate::game::judgment::HitWindows;
use configparser::ini::Ini;
use log::{info, warn};
use once_cell::sync::Lazy;
use std::path::Path;
use std::sync::Mutex;

// Presentation timing shared with the projector.
pub const NOTE_TRAVEL_TIME: f32 = 3.0;
/// How long a resolved note lingers before expiring, so an exit animation
/// can finish. No scoring semantics.
pub const EXIT_GRACE: f32 = 0.8;

const SETTINGS_PATH: &str = "hablabeat.ini";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub playback_speed: PlaybackSpeed,
    pub perfect_window_ms: f32,
    pub good_window_ms: f32,
    pub miss_window_ms: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            playback_speed: PlaybackSpeed::Normal,
            perfect_window_ms: 80.0,
            good_window_ms: 150.0,
            miss_window_ms: 250.0,
        }
    }
}

impl Settings {
    pub fn hit_windows(&self) -> HitWindows {
        HitWindows {
            perfect: self.perfect_window_ms / 1000.0,
            good: self.good_window_ms / 1000.0,
            miss: self.miss_window_ms / 1000.0,
        }
    }
}

static SETTINGS: Lazy<Mutex<Settings>> = Lazy::new(|| Mutex::new(Settings::default()));

fn read_settings(conf: &Ini) -> Settings {
    let defaults = Settings::default();

    let playback_speed = conf
        .get("gameplay", "PlaybackSpeed")
        .and_then(|v| v.parse().ok())
        .unwrap_or(defaults.playback_speed);

    let window = |key: &str, fallback: f32| -> f32 {
        conf.get("timing", key)
            .and_then(|v| v.parse::<f32>().ok())
            .filter(|v| *v > 0.0)
            .unwrap_or(fallback)
    };

    let mut settings = Settings {
        playback_speed,
        perfect_window_ms: window("PerfectWindowMs", defaults.perfect_window_ms),
        good_window_ms: window("GoodWindowMs", defaults.good_window_ms),
        miss_window_ms: window("MissWindowMs", defaults.miss_window_ms),
    };

    // The windows must stay nested or judging tiers lose meaning.
    if settings.perfect_window_ms > settings.good_window_ms
        || settings.good_window_ms > settings.miss_window_ms
    {
        warn!("Hit windows in settings are not nested; falling back to defaults.");
        settings.perfect_window_ms = defaults.perfect_window_ms;
        settings.good_window_ms = defaults.good_window_ms;
        settings.miss_window_ms = defaults.miss_window_ms;
    }

    settings
}

fn create_default_file() -> Result<(), std::io::Error> {
    info!("Settings file not found, creating defaults at '{SETTINGS_PATH}'.");
    let defaults = Settings::default();
    let mut conf = Ini::new();
    conf.set(
        "gameplay",
        "PlaybackSpeed",
        Some(defaults.playback_speed.as_str().to_string()),
    );
    conf.set("timing", "PerfectWindowMs", Some(defaults.perfect_window_ms.to_string()));
    conf.set("timing", "GoodWindowMs", Some(defaults.good_window_ms.to_string()));
    conf.set("timing", "MissWindowMs", Some(defaults.miss_window_ms.to_string()));
    conf.write(SETTINGS_PATH)
}

/// Loads `hablabeat.ini`, creating it with defaults on first run. Safe to
/// skip entirely; `get()` then serves defaults.
pub fn load() {
    if !Path::new(SETTINGS_PATH).exists() {
        if let Err(e) = create_default_file() {
            warn!("Failed to create default settings file: {e}");
            return;
        }
    }

    let mut conf = Ini::new();
    if conf.load(SETTINGS_PATH).is_ok() {
        *SETTINGS.lock().unwrap() = read_settings(&conf);
    } else {
        warn!("Failed to load '{SETTINGS_PATH}', using default settings.");
    }
}

/// Returns a copy of the currently loaded settings.
pub fn get() -> Settings {
    SETTINGS.lock().unwrap().clone()
}
