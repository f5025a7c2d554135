use crate::config::BeamConfig;
use crate::host::{Environment, ObserverId, ObserverSource, WorldId};
use glam::{DVec2, DVec3};

/// What one observer sees during one tick.
///
/// `outside` is only queried from the host for observers in a `Normal`
/// world; anywhere else it is reported as `false`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverSnapshot {
    pub id: ObserverId,
    pub position: DVec3,
    pub world: WorldId,
    pub environment: Environment,
    pub outside: bool,
}

impl ObserverSnapshot {
    /// Query the host for `id`. `None` when the observer is gone.
    pub fn capture<H: ObserverSource + ?Sized>(host: &H, id: ObserverId) -> Option<Self> {
        let state = host.observer_state(id)?;
        let outside = state.environment == Environment::Normal
            && host.is_outside(state.world, state.position);
        Some(Self {
            id,
            position: state.position,
            world: state.world,
            environment: state.environment,
            outside,
        })
    }

    /// Distance to the target column at height zero.
    #[inline]
    pub fn distance_to_target(&self, target: DVec2) -> f64 {
        self.position.distance(DVec3::new(target.x, 0.0, target.y))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    NotOverworld,
    Sheltered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Classification {
    Skip(SkipReason),
    AmbientCue,
    DrawBeam,
}

/// Decide what to do for one observer. First match wins:
/// wrong environment, then no open sky, then inside the proximity threshold.
pub fn classify(snapshot: &ObserverSnapshot, config: &BeamConfig) -> Classification {
    if snapshot.environment != Environment::Normal {
        return Classification::Skip(SkipReason::NotOverworld);
    }
    if !snapshot.outside {
        return Classification::Skip(SkipReason::Sheltered);
    }
    // Inclusive: standing exactly on the threshold counts as arrived.
    if snapshot.distance_to_target(config.target) <= config.center_distance {
        return Classification::AmbientCue;
    }
    Classification::DrawBeam
}
