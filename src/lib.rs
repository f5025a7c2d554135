//! Rotating directional beam toward a fixed target, with a debounced ambient
//! cue for observers who have arrived.
//!
//! The host calls [`BeamScheduler::tick`] once per world tick and supplies
//! observers, terrain and output through the traits in [`host`].

pub mod command;
pub mod config;
pub mod constants;
pub mod eligibility;
pub mod geometry;
pub mod host;
pub mod scheduler;
pub mod throttle;

pub use command::{handle_command, handle_line, CommandOutcome};
pub use config::{
    BeamConfig, ConfigError, ConfigSource, ConfigStore, CueKind, FileSource, InlineSource,
    MarkerKind, ThrottleScope,
};
pub use eligibility::{classify, Classification, ObserverSnapshot, SkipReason};
pub use geometry::{generate_beam, generate_beam_into, GeometryError};
pub use host::{
    is_outside_by_height, BeamHost, CueSink, Environment, MarkerSink, ObserverId, ObserverSource,
    ObserverState, SinkError, WorldId,
};
pub use scheduler::{BeamScheduler, ObserverError, RotationState, TickReport};
pub use throttle::{AmbientThrottle, ThrottleEntry, ThrottleKey};
