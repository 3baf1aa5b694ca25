//! Recording collaborators shared by the stepper tests.

#![allow(dead_code)]

use pt_project::{DrivetrainConfig, EngineConfig, SoundConfig};
use pt_sim::{
    AudioBackend, DrivetrainModel, EngineModel, Sample, SampleSet, SimError, SimResult,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    EngineInit,
    DrivetrainInit,
    EngineIntegrate { load_inertia: f64, time: f64, h: f64 },
    DrivetrainIntegrate { h: f64 },
    EngineSolvePos { h: f64 },
    DrivetrainSolvePos { h: f64, engine_corrections: u32 },
    EngineUpdate { h: f64 },
    DrivetrainUpdate { h: f64 },
    EngineSolveVel { h: f64 },
    DrivetrainSolveVel { h: f64, engine_corrections: u32 },
    ApplySounds { samples: usize, gear: u32 },
    AudioInit { id: usize },
    AudioDispose { id: usize },
}

pub type Log = Rc<RefCell<Vec<Call>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

#[derive(Debug, thiserror::Error)]
#[error("mock collaborator refused: {0}")]
pub struct MockError(pub &'static str);

pub struct MockEngine {
    pub log: Log,
    pub rpm: f64,
    /// Bumped by every position/velocity correction
    pub corrections: u32,
    pub fail_init: bool,
    pub initialized: bool,
}

impl MockEngine {
    pub fn new(log: &Log, rpm: f64) -> Self {
        Self {
            log: log.clone(),
            rpm,
            corrections: 0,
            fail_init: false,
            initialized: false,
        }
    }
}

impl EngineModel for MockEngine {
    fn init(&mut self, _config: &EngineConfig) -> SimResult<()> {
        self.log.borrow_mut().push(Call::EngineInit);
        if self.fail_init {
            return Err(SimError::collaborator(MockError("engine")));
        }
        self.initialized = true;
        Ok(())
    }

    fn integrate(&mut self, load_inertia: f64, time: f64, h: f64) {
        self.log.borrow_mut().push(Call::EngineIntegrate {
            load_inertia,
            time,
            h,
        });
    }

    fn solve_pos<D: DrivetrainModel + ?Sized>(&mut self, _drivetrain: &D, h: f64) {
        self.corrections += 1;
        self.log.borrow_mut().push(Call::EngineSolvePos { h });
    }

    fn update(&mut self, h: f64) {
        self.log.borrow_mut().push(Call::EngineUpdate { h });
    }

    fn solve_vel<D: DrivetrainModel + ?Sized>(&mut self, _drivetrain: &D, h: f64) {
        self.corrections += 1;
        self.log.borrow_mut().push(Call::EngineSolveVel { h });
    }

    fn rpm(&self) -> f64 {
        self.rpm
    }

    fn apply_sounds(&mut self, samples: &SampleSet, gear: u32) {
        self.log.borrow_mut().push(Call::ApplySounds {
            samples: samples.len(),
            gear,
        });
    }
}

pub struct MockDrivetrain {
    pub log: Log,
    pub gear: u32,
    pub gear_ratio: f64,
    pub final_drive: f64,
    pub inertia: f64,
    pub fail_init: bool,
    pub initialized: bool,
    /// Engine correction counts seen by this side's solves
    pub seen_engine_corrections: Vec<u32>,
}

impl MockDrivetrain {
    pub fn new(log: &Log, gear: u32, gear_ratio: f64, final_drive: f64) -> Self {
        Self {
            log: log.clone(),
            gear,
            gear_ratio,
            final_drive,
            inertia: 0.5,
            fail_init: false,
            initialized: false,
            seen_engine_corrections: Vec::new(),
        }
    }
}

impl DrivetrainModel for MockDrivetrain {
    fn init(&mut self, _config: &DrivetrainConfig) -> SimResult<()> {
        self.log.borrow_mut().push(Call::DrivetrainInit);
        if self.fail_init {
            return Err(SimError::collaborator(MockError("drivetrain")));
        }
        self.initialized = true;
        Ok(())
    }

    fn integrate(&mut self, h: f64) {
        self.log.borrow_mut().push(Call::DrivetrainIntegrate { h });
    }

    fn solve_pos<E: EngineModel + ?Sized>(&mut self, engine: &E, h: f64) {
        // The engine's rpm is the only thing a generic engine exposes; the
        // mock encodes its correction count there via `rpm_marker`.
        let engine_corrections = rpm_marker(engine.rpm());
        self.seen_engine_corrections.push(engine_corrections);
        self.log.borrow_mut().push(Call::DrivetrainSolvePos {
            h,
            engine_corrections,
        });
    }

    fn update(&mut self, h: f64) {
        self.log.borrow_mut().push(Call::DrivetrainUpdate { h });
    }

    fn solve_vel<E: EngineModel + ?Sized>(&mut self, engine: &E, h: f64) {
        let engine_corrections = rpm_marker(engine.rpm());
        self.log.borrow_mut().push(Call::DrivetrainSolveVel {
            h,
            engine_corrections,
        });
    }

    fn gear(&self) -> u32 {
        self.gear
    }

    fn inertia(&self) -> f64 {
        self.inertia
    }

    fn gear_ratio(&self) -> f64 {
        self.gear_ratio
    }

    fn total_gear_ratio(&self) -> f64 {
        self.gear_ratio * self.final_drive
    }
}

/// Engine whose reported rpm is its correction count, so the drivetrain can
/// observe whether it sees the pre- or post-correction engine.
pub struct CountingEngine(pub MockEngine);

impl EngineModel for CountingEngine {
    fn init(&mut self, config: &EngineConfig) -> SimResult<()> {
        self.0.init(config)
    }
    fn integrate(&mut self, load_inertia: f64, time: f64, h: f64) {
        self.0.integrate(load_inertia, time, h)
    }
    fn solve_pos<D: DrivetrainModel + ?Sized>(&mut self, drivetrain: &D, h: f64) {
        self.0.solve_pos(drivetrain, h)
    }
    fn update(&mut self, h: f64) {
        self.0.update(h)
    }
    fn solve_vel<D: DrivetrainModel + ?Sized>(&mut self, drivetrain: &D, h: f64) {
        self.0.solve_vel(drivetrain, h)
    }
    fn rpm(&self) -> f64 {
        f64::from(self.0.corrections)
    }
    fn apply_sounds(&mut self, samples: &SampleSet, gear: u32) {
        self.0.apply_sounds(samples, gear)
    }
}

pub fn rpm_marker(rpm: f64) -> u32 {
    rpm.max(0.0) as u32
}

pub struct MockAudio {
    pub log: Log,
    pub id: usize,
    pub active: bool,
    pub fail: bool,
    pub samples: SampleSet,
}

impl AudioBackend for MockAudio {
    async fn init(&mut self, sounds: &SoundConfig) -> SimResult<()> {
        self.log.borrow_mut().push(Call::AudioInit { id: self.id });
        tokio::task::yield_now().await;
        if self.fail {
            return Err(SimError::collaborator(MockError("audio")));
        }
        self.samples = SampleSet::new(
            sounds
                .samples
                .iter()
                .map(|def| Sample {
                    name: def.name.clone(),
                    rpm: def.rpm,
                    volume: def.volume,
                    data: Vec::<u8>::new().into(),
                })
                .collect(),
        );
        self.active = true;
        Ok(())
    }

    fn dispose(&mut self) {
        self.log.borrow_mut().push(Call::AudioDispose { id: self.id });
        self.samples.clear();
        self.active = false;
    }

    fn samples(&self) -> &SampleSet {
        &self.samples
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Factory handing out audio instances with increasing ids.
pub fn audio_factory(log: &Log, fail: bool) -> (impl Fn() -> MockAudio + 'static, Rc<Cell<usize>>) {
    let created = Rc::new(Cell::new(0));
    let counter = created.clone();
    let log = log.clone();
    let factory = move || {
        let id = counter.get();
        counter.set(id + 1);
        MockAudio {
            log: log.clone(),
            id,
            active: false,
            fail,
            samples: SampleSet::default(),
        }
    };
    (factory, created)
}
