//! Interfaces to the hosting world. The engine never renders, plays audio or
//! inspects terrain itself; it asks the host through these traits.

use crate::config::{CueKind, MarkerKind};
use glam::DVec3;
use std::fmt;
use thiserror::Error;

/// Opaque handle for a connected observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer#{}", self.0)
    }
}

/// Opaque handle for a world or region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldId(pub u64);

/// Environment classification of a world. Only `Normal` shows the beam.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Environment {
    Normal,
    Nether,
    TheEnd,
}

/// Where an observer is right now, as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverState {
    pub position: DVec3,
    pub world: WorldId,
    pub environment: Environment,
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct SinkError(pub String);

pub trait ObserverSource {
    /// Observers connected at the start of this tick.
    fn active_observers(&self) -> Vec<ObserverId>;

    /// `None` when the observer left between enumeration and lookup.
    fn observer_state(&self, id: ObserverId) -> Option<ObserverState>;

    /// Whether `position` has open sky above it (no roof, not underground).
    fn is_outside(&self, world: WorldId, position: DVec3) -> bool;
}

pub trait MarkerSink {
    /// Render one marker, visible to `observer` only.
    fn spawn_marker(
        &mut self,
        observer: ObserverId,
        kind: MarkerKind,
        point: DVec3,
    ) -> Result<(), SinkError>;
}

pub trait CueSink {
    /// Play a positional sound, audible to `observer` only.
    fn play_cue(
        &mut self,
        observer: ObserverId,
        cue: CueKind,
        position: DVec3,
        volume: f32,
        pitch: f32,
    ) -> Result<(), SinkError>;
}

/// Everything a tick needs from the host.
pub trait BeamHost: ObserverSource + MarkerSink + CueSink {}

impl<T: ObserverSource + MarkerSink + CueSink> BeamHost for T {}

/// Outside test used by hosts that expose a height map: a position is outside
/// when it is at or above the highest solid block of its column.
#[inline]
pub fn is_outside_by_height(position: DVec3, highest_solid_y: i32) -> bool {
    position.y >= f64::from(highest_solid_y)
}
