use std::f64::consts::PI;
use std::time::Duration;

// Defaults applied when a key is missing from the configuration document.

// Beam shape
pub const DEFAULT_BEAM_SIZE: f64 = 1.0; // edge length of the square cross-section
pub const DEFAULT_ROTATION_SPEED: f64 = PI / 60.0; // radians per tick
pub const DEFAULT_PARTICLE_COUNT: u32 = 300; // stacked cross-sections
pub const DEFAULT_PARTICLE_SPACING: f64 = 0.5; // grid and layer step

// Target
pub const DEFAULT_CENTER_DISTANCE: f64 = 100.0; // proximity threshold around the target
pub const DEFAULT_BEAM_X: f64 = 0.0;
pub const DEFAULT_BEAM_Z: f64 = 0.0;

// Host identifiers
pub const DEFAULT_PARTICLE_TYPE: &str = "END_ROD";
pub const DEFAULT_AMBIENT_SOUND: &str = "BLOCK_CONDUIT_AMBIENT";
pub const DEFAULT_AMBIENT_VOLUME: f32 = 1.0;
pub const DEFAULT_AMBIENT_PITCH: f32 = 1.0;

// Ambient cue debounce
pub const DEFAULT_AMBIENT_DELAY_MS: u64 = 1000;

// Host tick length used by the native driver (20 ticks per second)
pub const HOST_TICK: Duration = Duration::from_millis(50);

// Tolerance for floating-point step counting in the cross-section grid
pub const GRID_STEP_EPSILON: f64 = 1e-9;

// Upper bound on markers in one observer's beam per tick (cross-section points
// times layers). Configurations above it are rejected at load time.
pub const MAX_BEAM_MARKERS: usize = 1_000_000;

// Prefix used on every administrative reply
pub const MESSAGE_PREFIX: &str = "[DistanceBeam]";

// Command label and the only accepted subcommand
pub const COMMAND_LABEL: &str = "distb";
pub const RELOAD_SUBCOMMAND: &str = "reload";

/// Document written by `FileSource::ensure_default` when no configuration exists yet.
pub const DEFAULT_CONFIG_YAML: &str = "\
# Edge length of the rotating square beam.
beam-size: 1.0
# Rotation added every tick, in radians.
rotation-speed: 0.05235987755982988
# Number of stacked cross-sections.
particle-count: 300
# Distance between markers, both in the grid and between layers.
particle-spacing: 0.5
# Radius around the target inside which the ambient sound replaces the beam.
center-distance: 100.0
beam-x: 0.0
beam-z: 0.0
particle-type: END_ROD
ambient-sound: BLOCK_CONDUIT_AMBIENT
ambient-volume: 1.0
ambient-pitch: 1.0
# Minimum time between two plays of the same ambient sound.
ambient-delay-ms: 1000
# per-observer or global
ambient-scope: per-observer
";
