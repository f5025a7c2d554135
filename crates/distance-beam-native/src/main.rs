use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use distance_beam::constants::HOST_TICK;
use distance_beam::{
    handle_line, is_outside_by_height, BeamScheduler, CommandOutcome, ConfigStore, CueKind,
    CueSink, Environment, FileSource, MarkerKind, MarkerSink, ObserverId, ObserverSource,
    ObserverState, SinkError, TickReport, WorldId,
};
use glam::DVec3;
use rand::prelude::*;

const OVERWORLD: WorldId = WorldId(0);
const NETHER: WorldId = WorldId(1);

// Flat terrain at this height, with a roofed hall near (40, 40)
const GROUND_Y: i32 = 64;
const HALL_ROOF_Y: i32 = 80;
const HALL_MIN: f64 = 30.0;
const HALL_MAX: f64 = 50.0;

const WALK_SPEED: f64 = 0.25; // blocks per tick
const REPORT_EVERY_TICKS: u64 = 20;

struct Wanderer {
    id: ObserverId,
    world: WorldId,
    environment: Environment,
    position: DVec3,
    heading: f64,
}

/// Stand-in world: a handful of observers wandering over flat ground.
struct SimHost {
    rng: StdRng,
    observers: Vec<Wanderer>,
    markers: usize,
    cues: usize,
}

impl SimHost {
    fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let spawns = [
            (OVERWORLD, Environment::Normal, DVec3::new(220.0, 64.0, -40.0)),
            (OVERWORLD, Environment::Normal, DVec3::new(-30.0, 70.0, 25.0)),
            (OVERWORLD, Environment::Normal, DVec3::new(40.0, 64.0, 40.0)),
            (NETHER, Environment::Nether, DVec3::new(10.0, 40.0, 10.0)),
        ];
        let observers = spawns
            .iter()
            .enumerate()
            .map(|(i, &(world, environment, position))| Wanderer {
                id: ObserverId(i as u64 + 1),
                world,
                environment,
                position,
                heading: rng.gen_range(0.0..std::f64::consts::TAU),
            })
            .collect();
        Self {
            rng,
            observers,
            markers: 0,
            cues: 0,
        }
    }

    fn highest_solid_y(x: f64, z: f64) -> i32 {
        let in_hall = (HALL_MIN..=HALL_MAX).contains(&x) && (HALL_MIN..=HALL_MAX).contains(&z);
        if in_hall {
            HALL_ROOF_Y
        } else {
            GROUND_Y
        }
    }

    fn wander(&mut self) {
        for w in &mut self.observers {
            w.heading += self.rng.gen_range(-0.2..0.2);
            let (sin, cos) = w.heading.sin_cos();
            w.position.x += cos * WALK_SPEED;
            w.position.z += sin * WALK_SPEED;
        }
    }

    fn take_counts(&mut self) -> (usize, usize) {
        let counts = (self.markers, self.cues);
        self.markers = 0;
        self.cues = 0;
        counts
    }
}

impl ObserverSource for SimHost {
    fn active_observers(&self) -> Vec<ObserverId> {
        self.observers.iter().map(|w| w.id).collect()
    }

    fn observer_state(&self, id: ObserverId) -> Option<ObserverState> {
        self.observers
            .iter()
            .find(|w| w.id == id)
            .map(|w| ObserverState {
                position: w.position,
                world: w.world,
                environment: w.environment,
            })
    }

    fn is_outside(&self, world: WorldId, position: DVec3) -> bool {
        world == OVERWORLD
            && is_outside_by_height(position, Self::highest_solid_y(position.x, position.z))
    }
}

impl MarkerSink for SimHost {
    fn spawn_marker(
        &mut self,
        _observer: ObserverId,
        _kind: MarkerKind,
        _point: DVec3,
    ) -> Result<(), SinkError> {
        self.markers += 1;
        Ok(())
    }
}

impl CueSink for SimHost {
    fn play_cue(
        &mut self,
        observer: ObserverId,
        cue: CueKind,
        position: DVec3,
        volume: f32,
        pitch: f32,
    ) -> Result<(), SinkError> {
        self.cues += 1;
        log::info!(
            "{observer} hears {cue} at ({:.1}, {:.1}, {:.1}) vol={volume} pitch={pitch}",
            position.x,
            position.y,
            position.z
        );
        Ok(())
    }
}

fn accumulate(total: &mut TickReport, report: &TickReport) {
    total.observers += report.observers;
    total.skipped += report.skipped;
    total.cues_played += report.cues_played;
    total.cues_throttled += report.cues_throttled;
    total.beams_drawn += report.beams_drawn;
    total.markers_emitted += report.markers_emitted;
    total.failures += report.failures;
}

fn spawn_scheduler(
    store: Arc<ConfigStore>,
    host: Arc<Mutex<SimHost>>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<thread::JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name("beam-scheduler".into())
        .spawn(move || {
            let mut scheduler = BeamScheduler::new(store);
            let start = Instant::now();
            let mut next_tick = start;
            let mut ticks: u64 = 0;
            let mut window = TickReport::default();
            while running.load(Ordering::Relaxed) {
                {
                    let mut host = host.lock().unwrap_or_else(|e| e.into_inner());
                    host.wander();
                    let report = scheduler.tick(start.elapsed(), &mut *host);
                    accumulate(&mut window, &report);
                    ticks += 1;
                    if ticks % REPORT_EVERY_TICKS == 0 {
                        let (markers, cues) = host.take_counts();
                        log::info!(
                            "last {REPORT_EVERY_TICKS} ticks: beams={} markers={markers} cues={cues} throttled={} skipped={} failures={} angle={:.3}",
                            window.beams_drawn,
                            window.cues_throttled,
                            window.skipped,
                            window.failures,
                            scheduler.angle()
                        );
                        window = TickReport::default();
                    }
                }
                // Fixed-rate schedule; a late tick runs immediately without catching up twice.
                next_tick += HOST_TICK;
                let now = Instant::now();
                if next_tick > now {
                    thread::sleep(next_tick - now);
                } else {
                    next_tick = now;
                }
            }
        })?;
    Ok(handle)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "config.yml".to_string());
    let source = FileSource::new(path);
    source.ensure_default()?;
    let store = Arc::new(ConfigStore::load(&source)?);
    log::info!("loaded {}", source.path().display());

    let host = Arc::new(Mutex::new(SimHost::new(42)));
    let running = Arc::new(AtomicBool::new(true));
    let scheduler = spawn_scheduler(Arc::clone(&store), Arc::clone(&host), Arc::clone(&running))?;

    log::info!("type `distb reload` to reload the configuration, `quit` to exit");
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("stop") {
            break;
        }
        match handle_line(&store, &source, trimmed) {
            CommandOutcome::Handled(message) => println!("{message}"),
            CommandOutcome::NotHandled => println!("usage: distb reload"),
        }
    }

    running.store(false, Ordering::Relaxed);
    if scheduler.join().is_err() {
        anyhow::bail!("scheduler thread panicked");
    }
    Ok(())
}
