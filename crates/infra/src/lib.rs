//! Squelch infrastructure: collaborators of the core pipeline
//!
//! Everything that touches the file system or an async runtime lives
//! here: the shared settings store with TOML persistence and
//! hot-reload, and the WAV-backed effect track loader. The core
//! pipeline only ever sees the `SettingsProvider` trait and the
//! `TrackLibrary` slots these modules populate.

pub mod settings;
pub mod tracks;

pub use settings::{EffectsConfig, SettingsWatcher, SharedSettingsStore, StoreError};
pub use tracks::{load_into, track_file_name, TrackError};
