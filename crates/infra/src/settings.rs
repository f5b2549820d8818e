//! Shared effect settings store with TOML persistence
//!
//! This module provides:
//! - `EffectsConfig`: the serialized form of the effect parameters
//! - `SharedSettingsStore`: a lock-free store implementing the core
//!   `SettingsProvider` trait, safe to read from the audio thread while
//!   other threads write
//! - `SettingsWatcher`: hot-reload of the TOML file into the store

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam::atomic::AtomicCell;
use serde::{Deserialize, Serialize};
use squelch_core::domain::settings::{BoolSetting, FloatSetting, SettingsProvider};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, error, info, instrument};

pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during settings persistence
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("File watch error: {0}")]
    WatchError(#[from] notify::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Serialized effect parameters
///
/// Unknown fields in the file are ignored and missing fields fall back
/// to the defaults, so old config files keep loading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub radio_effects: bool,
    pub clipping: bool,
    pub nato_tone: bool,
    pub have_quick_tone: bool,
    pub background_noise: bool,
    pub nato_tone_volume: f32,
    pub have_quick_tone_volume: f32,
    pub fm_noise_volume: f32,
    pub hf_noise_volume: f32,
    pub vhf_noise_volume: f32,
    pub uhf_noise_volume: f32,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            radio_effects: true,
            clipping: false,
            nato_tone: true,
            have_quick_tone: true,
            background_noise: true,
            nato_tone_volume: 1.0,
            have_quick_tone_volume: 1.0,
            fm_noise_volume: 0.4,
            hf_noise_volume: 0.4,
            vhf_noise_volume: 0.4,
            uhf_noise_volume: 0.4,
        }
    }
}

impl EffectsConfig {
    /// Load configuration from a TOML file
    #[instrument(skip(path))]
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading effect settings");

        let contents = fs::read_to_string(path).await?;
        let config: Self = toml::from_str(&contents)?;

        debug!("Effect settings loaded successfully");
        Ok(config)
    }

    /// Save configuration to a TOML file
    #[instrument(skip(self, path))]
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!(path = %path.display(), "Saving effect settings");

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        fs::write(path, toml_str).await?;

        Ok(())
    }

    /// Default settings file location (`~/.config/squelch/effects.toml`
    /// on Linux/macOS, `%APPDATA%\squelch\effects.toml` on Windows).
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("squelch").join("effects.toml"))
            .ok_or(StoreError::NoConfigDir)
    }
}

/// Lock-free settings store shared between the audio thread and writers
///
/// Each parameter lives in its own `AtomicCell`, so the pipeline's
/// throttled refresh reads are wait-free while a UI or reload thread
/// updates values concurrently. Readers may observe a half-applied bulk
/// update for one refresh interval; the pipeline tolerates that by
/// contract.
#[derive(Debug)]
pub struct SharedSettingsStore {
    radio_effects: AtomicCell<bool>,
    clipping: AtomicCell<bool>,
    nato_tone: AtomicCell<bool>,
    have_quick_tone: AtomicCell<bool>,
    background_noise: AtomicCell<bool>,
    nato_tone_volume: AtomicCell<f32>,
    have_quick_tone_volume: AtomicCell<f32>,
    fm_noise_volume: AtomicCell<f32>,
    hf_noise_volume: AtomicCell<f32>,
    vhf_noise_volume: AtomicCell<f32>,
    uhf_noise_volume: AtomicCell<f32>,
}

impl SharedSettingsStore {
    pub fn new(config: EffectsConfig) -> Self {
        Self {
            radio_effects: AtomicCell::new(config.radio_effects),
            clipping: AtomicCell::new(config.clipping),
            nato_tone: AtomicCell::new(config.nato_tone),
            have_quick_tone: AtomicCell::new(config.have_quick_tone),
            background_noise: AtomicCell::new(config.background_noise),
            nato_tone_volume: AtomicCell::new(config.nato_tone_volume),
            have_quick_tone_volume: AtomicCell::new(config.have_quick_tone_volume),
            fm_noise_volume: AtomicCell::new(config.fm_noise_volume),
            hf_noise_volume: AtomicCell::new(config.hf_noise_volume),
            vhf_noise_volume: AtomicCell::new(config.vhf_noise_volume),
            uhf_noise_volume: AtomicCell::new(config.uhf_noise_volume),
        }
    }

    /// Apply a full configuration, field by field.
    pub fn apply(&self, config: EffectsConfig) {
        self.radio_effects.store(config.radio_effects);
        self.clipping.store(config.clipping);
        self.nato_tone.store(config.nato_tone);
        self.have_quick_tone.store(config.have_quick_tone);
        self.background_noise.store(config.background_noise);
        self.nato_tone_volume.store(config.nato_tone_volume);
        self.have_quick_tone_volume.store(config.have_quick_tone_volume);
        self.fm_noise_volume.store(config.fm_noise_volume);
        self.hf_noise_volume.store(config.hf_noise_volume);
        self.vhf_noise_volume.store(config.vhf_noise_volume);
        self.uhf_noise_volume.store(config.uhf_noise_volume);
        debug!("effect settings store updated");
    }

    /// Snapshot the store back into its serialized form.
    pub fn to_config(&self) -> EffectsConfig {
        EffectsConfig {
            radio_effects: self.radio_effects.load(),
            clipping: self.clipping.load(),
            nato_tone: self.nato_tone.load(),
            have_quick_tone: self.have_quick_tone.load(),
            background_noise: self.background_noise.load(),
            nato_tone_volume: self.nato_tone_volume.load(),
            have_quick_tone_volume: self.have_quick_tone_volume.load(),
            fm_noise_volume: self.fm_noise_volume.load(),
            hf_noise_volume: self.hf_noise_volume.load(),
            vhf_noise_volume: self.vhf_noise_volume.load(),
            uhf_noise_volume: self.uhf_noise_volume.load(),
        }
    }

    pub fn set_bool(&self, key: BoolSetting, value: bool) {
        self.bool_cell(key).store(value);
    }

    pub fn set_float(&self, key: FloatSetting, value: f32) {
        self.float_cell(key).store(value);
    }

    fn bool_cell(&self, key: BoolSetting) -> &AtomicCell<bool> {
        match key {
            BoolSetting::RadioEffects => &self.radio_effects,
            BoolSetting::RadioEffectsClipping => &self.clipping,
            BoolSetting::NatoTone => &self.nato_tone,
            BoolSetting::HaveQuickTone => &self.have_quick_tone,
            BoolSetting::BackgroundNoise => &self.background_noise,
        }
    }

    fn float_cell(&self, key: FloatSetting) -> &AtomicCell<f32> {
        match key {
            FloatSetting::NatoToneVolume => &self.nato_tone_volume,
            FloatSetting::HaveQuickToneVolume => &self.have_quick_tone_volume,
            FloatSetting::FmNoiseVolume => &self.fm_noise_volume,
            FloatSetting::HfNoiseVolume => &self.hf_noise_volume,
            FloatSetting::VhfNoiseVolume => &self.vhf_noise_volume,
            FloatSetting::UhfNoiseVolume => &self.uhf_noise_volume,
        }
    }
}

impl Default for SharedSettingsStore {
    fn default() -> Self {
        Self::new(EffectsConfig::default())
    }
}

impl SettingsProvider for SharedSettingsStore {
    fn bool_setting(&self, key: BoolSetting) -> bool {
        self.bool_cell(key).load()
    }

    fn float_setting(&self, key: FloatSetting) -> f32 {
        self.float_cell(key).load()
    }
}

/// File system watcher that reloads the settings file into the store
pub struct SettingsWatcher {
    _watcher: notify::RecommendedWatcher,
}

impl SettingsWatcher {
    /// Watch `path` and apply every successful re-parse to `store`.
    ///
    /// Parse failures leave the store untouched; the previous values
    /// keep serving until the file is valid again.
    pub fn new(path: PathBuf, store: Arc<SharedSettingsStore>) -> Result<Self> {
        use notify::Watcher;

        let watch_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let watched = path.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let Ok(event) = res else { return };
            if !matches!(
                event.kind,
                notify::EventKind::Create(_) | notify::EventKind::Modify(_)
            ) {
                return;
            }
            if !event.paths.iter().any(|p| p.ends_with(
                watched.file_name().unwrap_or_default(),
            )) {
                return;
            }

            match std::fs::read_to_string(&watched)
                .map_err(StoreError::from)
                .and_then(|text| toml::from_str::<EffectsConfig>(&text).map_err(StoreError::from))
            {
                Ok(config) => {
                    store.apply(config);
                    info!(path = %watched.display(), "effect settings reloaded");
                }
                Err(e) => {
                    error!(path = %watched.display(), error = %e, "failed to reload effect settings");
                }
            }
        })?;

        watcher.watch(&watch_dir, notify::RecursiveMode::NonRecursive)?;

        info!(path = %path.display(), "settings watcher started");

        Ok(Self { _watcher: watcher })
    }
}
