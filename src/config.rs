//! Beam configuration: parsing, validation and the live, swappable store.
//!
//! The configuration document is a flat YAML mapping with kebab-case keys.
//! Every key is optional; missing keys fall back to the defaults in
//! [`crate::constants`]. Marker and cue identifiers are resolved into closed
//! enums here, once, so a tick never has to look a name up again.

use crate::constants::*;
use crate::geometry::section_len;
use glam::DVec2;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("unknown particle type `{0}`")]
    UnknownMarker(String),
    #[error("unknown ambient sound `{0}`")]
    UnknownCue(String),
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Visual marker kinds the host knows how to render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    EndRod,
    Flame,
    SoulFireFlame,
    Glow,
    ElectricSpark,
    FireworksSpark,
    Portal,
    Cloud,
    Note,
    Heart,
    Crit,
    EnchantmentTable,
}

impl MarkerKind {
    pub const ALL: &'static [MarkerKind] = &[
        MarkerKind::EndRod,
        MarkerKind::Flame,
        MarkerKind::SoulFireFlame,
        MarkerKind::Glow,
        MarkerKind::ElectricSpark,
        MarkerKind::FireworksSpark,
        MarkerKind::Portal,
        MarkerKind::Cloud,
        MarkerKind::Note,
        MarkerKind::Heart,
        MarkerKind::Crit,
        MarkerKind::EnchantmentTable,
    ];

    /// Host-facing identifier, as written in the configuration document.
    pub fn name(self) -> &'static str {
        match self {
            MarkerKind::EndRod => "END_ROD",
            MarkerKind::Flame => "FLAME",
            MarkerKind::SoulFireFlame => "SOUL_FIRE_FLAME",
            MarkerKind::Glow => "GLOW",
            MarkerKind::ElectricSpark => "ELECTRIC_SPARK",
            MarkerKind::FireworksSpark => "FIREWORKS_SPARK",
            MarkerKind::Portal => "PORTAL",
            MarkerKind::Cloud => "CLOUD",
            MarkerKind::Note => "NOTE",
            MarkerKind::Heart => "HEART",
            MarkerKind::Crit => "CRIT",
            MarkerKind::EnchantmentTable => "ENCHANTMENT_TABLE",
        }
    }
}

impl FromStr for MarkerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ConfigError::UnknownMarker(s.to_string()))
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ambient sounds the host knows how to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CueKind {
    ConduitAmbient,
    ConduitAmbientShort,
    BeaconAmbient,
    BeaconActivate,
    PortalAmbient,
    AmethystChime,
    UnderwaterLoop,
    CaveAmbient,
    EndPortalSpawn,
}

impl CueKind {
    pub const ALL: &'static [CueKind] = &[
        CueKind::ConduitAmbient,
        CueKind::ConduitAmbientShort,
        CueKind::BeaconAmbient,
        CueKind::BeaconActivate,
        CueKind::PortalAmbient,
        CueKind::AmethystChime,
        CueKind::UnderwaterLoop,
        CueKind::CaveAmbient,
        CueKind::EndPortalSpawn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CueKind::ConduitAmbient => "BLOCK_CONDUIT_AMBIENT",
            CueKind::ConduitAmbientShort => "BLOCK_CONDUIT_AMBIENT_SHORT",
            CueKind::BeaconAmbient => "BLOCK_BEACON_AMBIENT",
            CueKind::BeaconActivate => "BLOCK_BEACON_ACTIVATE",
            CueKind::PortalAmbient => "BLOCK_PORTAL_AMBIENT",
            CueKind::AmethystChime => "BLOCK_AMETHYST_BLOCK_CHIME",
            CueKind::UnderwaterLoop => "AMBIENT_UNDERWATER_LOOP",
            CueKind::CaveAmbient => "AMBIENT_CAVE",
            CueKind::EndPortalSpawn => "BLOCK_END_PORTAL_SPAWN",
        }
    }
}

impl FromStr for CueKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|cue| cue.name() == s)
            .ok_or_else(|| ConfigError::UnknownCue(s.to_string()))
    }
}

impl fmt::Display for CueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Who shares an ambient-cue debounce record.
///
/// `Global` keeps a single record for every observer, so one observer's cue
/// can suppress another's. `PerObserver` gives each observer its own record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThrottleScope {
    #[default]
    PerObserver,
    Global,
}

/// Validated, immutable beam parameters. Replaced wholesale on reload.
///
/// Fields:
/// - `beam_size`: edge length of the square cross-section; the grid spans
///   `[-beam_size / 2, beam_size / 2]` on both horizontal axes
/// - `rotation_speed`: radians added to the rotation angle every tick
/// - `particle_count`: number of stacked cross-sections
/// - `particle_spacing`: grid step inside a cross-section and vertical step between them
/// - `center_distance`: proximity threshold around the target; the beam starts on it
/// - `target`: horizontal target coordinates, `x` is world X and `y` is world Z
#[derive(Clone, Debug, PartialEq)]
pub struct BeamConfig {
    pub beam_size: f64,
    pub rotation_speed: f64,
    pub particle_count: u32,
    pub particle_spacing: f64,
    pub center_distance: f64,
    pub target: DVec2,
    pub marker: MarkerKind,
    pub cue: CueKind,
    pub cue_volume: f32,
    pub cue_pitch: f32,
    pub ambient_delay: Duration,
    pub ambient_scope: ThrottleScope,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            beam_size: DEFAULT_BEAM_SIZE,
            rotation_speed: DEFAULT_ROTATION_SPEED,
            particle_count: DEFAULT_PARTICLE_COUNT,
            particle_spacing: DEFAULT_PARTICLE_SPACING,
            center_distance: DEFAULT_CENTER_DISTANCE,
            target: DVec2::new(DEFAULT_BEAM_X, DEFAULT_BEAM_Z),
            marker: MarkerKind::EndRod,
            cue: CueKind::ConduitAmbient,
            cue_volume: DEFAULT_AMBIENT_VOLUME,
            cue_pitch: DEFAULT_AMBIENT_PITCH,
            ambient_delay: Duration::from_millis(DEFAULT_AMBIENT_DELAY_MS),
            ambient_scope: ThrottleScope::PerObserver,
        }
    }
}

// Mirror of the document before validation. Counts stay signed so a negative
// value is reported as invalid rather than as a type error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct RawConfig {
    beam_size: f64,
    rotation_speed: f64,
    particle_count: i64,
    particle_spacing: f64,
    center_distance: f64,
    beam_x: f64,
    beam_z: f64,
    particle_type: String,
    ambient_sound: String,
    ambient_volume: f32,
    ambient_pitch: f32,
    ambient_delay_ms: u64,
    ambient_scope: ThrottleScope,
}

// Missing keys take their value from `BeamConfig::default`.
impl Default for RawConfig {
    fn default() -> Self {
        let defaults = BeamConfig::default();
        Self {
            beam_size: defaults.beam_size,
            rotation_speed: defaults.rotation_speed,
            particle_count: i64::from(defaults.particle_count),
            particle_spacing: defaults.particle_spacing,
            center_distance: defaults.center_distance,
            beam_x: defaults.target.x,
            beam_z: defaults.target.y,
            particle_type: defaults.marker.name().to_string(),
            ambient_sound: defaults.cue.name().to_string(),
            ambient_volume: defaults.cue_volume,
            ambient_pitch: defaults.cue_pitch,
            ambient_delay_ms: u64::try_from(defaults.ambient_delay.as_millis())
                .unwrap_or(u64::MAX),
            ambient_scope: defaults.ambient_scope,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn finite(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(field, format!("{value} is not a finite number")))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    let value = finite(field, value)?;
    if value < 0.0 {
        return Err(invalid(field, format!("{value} must not be negative")));
    }
    Ok(value)
}

// True when the document holds nothing but blank lines and comments.
fn is_blank_document(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#') || line == "---")
}

impl BeamConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let raw = if is_blank_document(text) {
            RawConfig::default()
        } else {
            match serde_yaml::from_str::<serde_yaml::Value>(text)? {
                serde_yaml::Value::Null => RawConfig::default(),
                value => serde_yaml::from_value(value)?,
            }
        };
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let marker = raw.particle_type.trim().parse::<MarkerKind>()?;
        let cue = raw.ambient_sound.trim().parse::<CueKind>()?;

        let beam_size = non_negative("beam-size", raw.beam_size)?;
        let rotation_speed = finite("rotation-speed", raw.rotation_speed)?;
        let particle_spacing = finite("particle-spacing", raw.particle_spacing)?;
        if particle_spacing <= 0.0 {
            return Err(invalid(
                "particle-spacing",
                format!("{particle_spacing} must be greater than zero"),
            ));
        }
        let particle_count = u32::try_from(raw.particle_count).map_err(|_| {
            invalid(
                "particle-count",
                format!("{} is outside 0..={}", raw.particle_count, u32::MAX),
            )
        })?;
        let section = section_len(beam_size, particle_spacing)
            .filter(|&len| len <= MAX_BEAM_MARKERS)
            .ok_or_else(|| {
                invalid(
                    "beam-size",
                    format!(
                        "{beam_size} at spacing {particle_spacing} gives more than \
                         {MAX_BEAM_MARKERS} markers per layer"
                    ),
                )
            })?;
        if section
            .checked_mul(particle_count as usize)
            .map_or(true, |total| total > MAX_BEAM_MARKERS)
        {
            return Err(invalid(
                "particle-count",
                format!(
                    "{particle_count} layers of {section} markers exceed {MAX_BEAM_MARKERS}"
                ),
            ));
        }
        let center_distance = non_negative("center-distance", raw.center_distance)?;
        let beam_x = finite("beam-x", raw.beam_x)?;
        let beam_z = finite("beam-z", raw.beam_z)?;
        let cue_volume = non_negative("ambient-volume", f64::from(raw.ambient_volume))? as f32;
        let cue_pitch = non_negative("ambient-pitch", f64::from(raw.ambient_pitch))? as f32;

        Ok(Self {
            beam_size,
            rotation_speed,
            particle_count,
            particle_spacing,
            center_distance,
            target: DVec2::new(beam_x, beam_z),
            marker,
            cue,
            cue_volume,
            cue_pitch,
            ambient_delay: Duration::from_millis(raw.ambient_delay_ms),
            ambient_scope: raw.ambient_scope,
        })
    }
}

/// Somewhere a configuration document can be read from.
pub trait ConfigSource {
    fn read(&self) -> Result<String, ConfigError>;

    /// Read and validate the document.
    fn load(&self) -> Result<BeamConfig, ConfigError> {
        BeamConfig::from_yaml(&self.read()?)
    }
}

/// A configuration document on disk.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the default document if no file exists yet. Returns whether a file was written.
    pub fn ensure_default(&self) -> Result<bool, ConfigError> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, DEFAULT_CONFIG_YAML).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })?;
        log::info!("wrote default configuration to {}", self.path.display());
        Ok(true)
    }
}

impl ConfigSource for FileSource {
    fn read(&self) -> Result<String, ConfigError> {
        std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })
    }
}

/// An in-memory document, swappable so callers can stage an edit before reloading.
#[derive(Debug, Default)]
pub struct InlineSource {
    text: RwLock<String>,
}

impl InlineSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: RwLock::new(text.into()),
        }
    }

    pub fn set(&self, text: impl Into<String>) {
        *self.text.write().unwrap_or_else(PoisonError::into_inner) = text.into();
    }
}

impl ConfigSource for InlineSource {
    fn read(&self) -> Result<String, ConfigError> {
        Ok(self
            .text
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

/// Holder of the live configuration.
///
/// Readers take an `Arc` snapshot and keep it for as long as they need a
/// consistent view; a reload swaps the whole `Arc` and never touches a value
/// a reader already holds.
#[derive(Debug)]
pub struct ConfigStore {
    live: RwLock<Arc<BeamConfig>>,
}

impl ConfigStore {
    pub fn new(config: BeamConfig) -> Self {
        Self {
            live: RwLock::new(Arc::new(config)),
        }
    }

    pub fn load<S: ConfigSource + ?Sized>(source: &S) -> Result<Self, ConfigError> {
        Ok(Self::new(source.load()?))
    }

    pub fn current(&self) -> Arc<BeamConfig> {
        Arc::clone(&self.live.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Load from `source` and swap it in. On failure the previous configuration stays live.
    pub fn reload<S: ConfigSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<Arc<BeamConfig>, ConfigError> {
        match source.load() {
            Ok(config) => {
                let config = Arc::new(config);
                *self.live.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&config);
                log::info!(
                    "configuration reloaded: target=({}, {}) marker={} cue={}",
                    config.target.x,
                    config.target.y,
                    config.marker,
                    config.cue
                );
                Ok(config)
            }
            Err(e) => {
                log::error!("configuration reload failed: {e}");
                Err(e)
            }
        }
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(BeamConfig::default())
    }
}
