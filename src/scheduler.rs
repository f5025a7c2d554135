use crate::config::{BeamConfig, ConfigStore};
use crate::eligibility::{classify, Classification, ObserverSnapshot};
use crate::geometry::{generate_beam_into, GeometryError};
use crate::host::{BeamHost, ObserverId, SinkError};
use crate::throttle::{AmbientThrottle, ThrottleKey};
use fnv::FnvHashSet;
use glam::DVec3;
use std::f64::consts::TAU;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Process-wide beam rotation, kept in `[0, 2π)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotationState {
    angle: f64,
}

impl RotationState {
    pub fn new(angle: f64) -> Self {
        Self {
            angle: angle.rem_euclid(TAU),
        }
    }

    #[inline]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Advance by `increment` radians and return the new angle.
    pub fn advance(&mut self, increment: f64) -> f64 {
        self.angle = (self.angle + increment).rem_euclid(TAU);
        self.angle
    }
}

/// Counters for one tick.
///
/// - `observers`: observers enumerated by the host
/// - `skipped`: wrong environment, sheltered, or gone before lookup
/// - `cues_played` / `cues_throttled`: observers near the target, split by the debounce
/// - `beams_drawn` / `markers_emitted`: observers that received a full beam
/// - `failures`: observers whose processing failed and was abandoned for this tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub observers: usize,
    pub skipped: usize,
    pub cues_played: usize,
    pub cues_throttled: usize,
    pub beams_drawn: usize,
    pub markers_emitted: usize,
    pub failures: usize,
}

#[derive(Debug, Error)]
pub enum ObserverError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("host sink failed: {0}")]
    Sink(#[from] SinkError),
}

/// Drives one pass over every active observer per host tick.
///
/// Owns the rotation angle and the cue debounce records. The configuration is
/// shared with whoever handles reloads; each tick works from one snapshot.
pub struct BeamScheduler {
    store: Arc<ConfigStore>,
    rotation: RotationState,
    throttle: AmbientThrottle,
    points: Vec<DVec3>,
    active: FnvHashSet<ObserverId>,
}

impl BeamScheduler {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        let delay = store.current().ambient_delay;
        Self {
            store,
            rotation: RotationState::default(),
            throttle: AmbientThrottle::new(delay),
            points: Vec::new(),
            active: FnvHashSet::default(),
        }
    }

    pub fn angle(&self) -> f64 {
        self.rotation.angle()
    }

    pub fn throttle(&self) -> &AmbientThrottle {
        &self.throttle
    }

    /// Run one tick at host time `now`.
    ///
    /// A failure for one observer is logged and counted; the remaining
    /// observers are still processed.
    pub fn tick<H: BeamHost + ?Sized>(&mut self, now: Duration, host: &mut H) -> TickReport {
        let config = self.store.current();
        let angle = self.rotation.advance(config.rotation_speed);
        self.throttle.set_delay(config.ambient_delay);

        let mut report = TickReport::default();
        self.active.clear();
        for id in host.active_observers() {
            report.observers += 1;
            self.active.insert(id);

            let Some(snapshot) = ObserverSnapshot::capture(&*host, id) else {
                log::debug!("{id} left before it could be processed");
                report.skipped += 1;
                continue;
            };

            match classify(&snapshot, &config) {
                Classification::Skip(reason) => {
                    log::trace!("{id} skipped: {reason:?}");
                    report.skipped += 1;
                }
                Classification::AmbientCue => {
                    match self.play_cue(&snapshot, &config, now, host) {
                        Ok(true) => report.cues_played += 1,
                        Ok(false) => report.cues_throttled += 1,
                        Err(e) => {
                            log::warn!("{id}: ambient cue failed: {e}");
                            report.failures += 1;
                        }
                    }
                }
                Classification::DrawBeam => match self.draw_beam(&snapshot, &config, angle, host) {
                    Ok(count) => {
                        report.beams_drawn += 1;
                        report.markers_emitted += count;
                    }
                    Err(e) => {
                        log::warn!("{id}: beam skipped: {e}");
                        report.failures += 1;
                    }
                },
            }
        }
        self.throttle.retain_active(&self.active);

        log::trace!("tick angle={angle:.4} {report:?}");
        report
    }

    fn play_cue<H: BeamHost + ?Sized>(
        &mut self,
        snapshot: &ObserverSnapshot,
        config: &BeamConfig,
        now: Duration,
        host: &mut H,
    ) -> Result<bool, ObserverError> {
        let key = ThrottleKey::for_observer(config.ambient_scope, snapshot.id);
        if !self.throttle.is_due(key, config.cue, now) {
            return Ok(false);
        }
        host.play_cue(
            snapshot.id,
            config.cue,
            snapshot.position,
            config.cue_volume,
            config.cue_pitch,
        )?;
        // only a delivered cue starts the delay
        self.throttle.record(key, config.cue, now);
        Ok(true)
    }

    fn draw_beam<H: BeamHost + ?Sized>(
        &mut self,
        snapshot: &ObserverSnapshot,
        config: &BeamConfig,
        angle: f64,
        host: &mut H,
    ) -> Result<usize, ObserverError> {
        self.points.clear();
        let count = generate_beam_into(
            config.target,
            snapshot.position,
            angle,
            config,
            &mut self.points,
        )?;
        for point in &self.points {
            host.spawn_marker(snapshot.id, config.marker, *point)?;
        }
        Ok(count)
    }
}
