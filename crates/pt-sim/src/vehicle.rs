//! The vehicle stepper: owns engine, drivetrain and audio, runs one frame
//! per `update` call and publishes the frame's readouts.

use crate::audio::{AudioBackend, SilentAudio};
use crate::body::VehicleBody;
use crate::dashboard::{Dashboard, FrameOutput};
use crate::error::{SimError, SimResult};
use crate::inertia::load_inertia;
use crate::integrator::{SUB_STEPS, SubstepClock, SubstepIntegrator};
use crate::model::{DrivetrainModel, EngineModel};
use crate::speed::{SpeedInputs, display_speed};
use pt_project::Configuration;

/// Options for the per-frame stepper.
#[derive(Clone, Debug)]
pub struct StepperOptions {
    /// Sub-steps per frame
    pub sub_steps: usize,
    /// Time cadence handed to the engine's integrate phase
    pub clock: SubstepClock,
    /// Gain on the load inertia fed to the engine's integrate phase.
    /// Zero leaves the engine unloaded by the vehicle.
    pub load_inertia_gain: f64,
}

impl Default for StepperOptions {
    fn default() -> Self {
        Self {
            sub_steps: SUB_STEPS,
            clock: SubstepClock::default(),
            load_inertia_gain: 0.0,
        }
    }
}

pub struct Vehicle<E, D, A = SilentAudio> {
    engine: E,
    drivetrain: D,
    audio: Option<A>,
    make_audio: Box<dyn Fn() -> A>,
    body: VehicleBody,
    /// Dashboard speed (mph); output only
    velocity: f64,
    load_inertia_gain: f64,
    integrator: SubstepIntegrator,
    dashboard: Option<Box<dyn Dashboard>>,
}

impl<E, D, A> Vehicle<E, D, A>
where
    E: EngineModel,
    D: DrivetrainModel,
    A: AudioBackend,
{
    /// Build a stepper whose audio collaborators come from `A::default()`.
    pub fn new(engine: E, drivetrain: D, body: VehicleBody, options: StepperOptions) -> SimResult<Self>
    where
        A: Default + 'static,
    {
        Self::with_audio_factory(engine, drivetrain, body, options, A::default)
    }

    /// Build a stepper that creates each fresh audio collaborator with `factory`.
    pub fn with_audio_factory<F>(
        engine: E,
        drivetrain: D,
        body: VehicleBody,
        options: StepperOptions,
        factory: F,
    ) -> SimResult<Self>
    where
        F: Fn() -> A + 'static,
    {
        if !options.load_inertia_gain.is_finite() {
            return Err(SimError::InvalidArg {
                what: "load_inertia_gain must be finite",
            });
        }
        let integrator = SubstepIntegrator::new(options.sub_steps, options.clock)?;

        Ok(Self {
            engine,
            drivetrain,
            audio: None,
            make_audio: Box::new(factory),
            body,
            velocity: 0.0,
            load_inertia_gain: options.load_inertia_gain,
            integrator,
            dashboard: None,
        })
    }

    /// Register a dashboard sink.
    pub fn with_dashboard(mut self, sink: impl Dashboard + 'static) -> Self {
        self.dashboard = Some(Box::new(sink));
        self
    }

    pub fn set_dashboard(&mut self, sink: Option<Box<dyn Dashboard>>) {
        self.dashboard = sink;
    }

    /// Re-initialize engine and drivetrain in place. Leaves audio alone.
    ///
    /// Collaborator errors propagate unchanged. Engine is configured before
    /// drivetrain; a drivetrain failure leaves the engine reconfigured.
    pub fn configure(&mut self, config: &Configuration) -> SimResult<()> {
        self.engine.init(&config.engine)?;
        self.drivetrain.init(&config.drivetrain)?;
        tracing::debug!(
            name = %config.name,
            gears = config.drivetrain.gear_ratios.len(),
            "engine and drivetrain configured"
        );
        Ok(())
    }

    /// Full (re)initialization: release the current audio collaborator,
    /// configure engine and drivetrain, then load a fresh audio collaborator.
    ///
    /// The fresh collaborator is installed before it loads, so a failed load
    /// leaves an inactive instance in place and the physics configured.
    pub async fn init(&mut self, config: &Configuration) -> SimResult<()> {
        self.release_audio();
        self.configure(config)?;

        let audio = self.audio.insert((self.make_audio)());
        audio.init(&config.sounds).await?;

        tracing::debug!(
            samples = audio.samples().len(),
            active = audio.is_active(),
            "audio ready"
        );
        Ok(())
    }

    /// Dispose and drop the audio collaborator, if any.
    pub fn release_audio(&mut self) {
        if let Some(mut audio) = self.audio.take() {
            audio.dispose();
            tracing::debug!("audio released");
        }
    }

    /// Advance one frame of `dt` seconds starting at `time`.
    ///
    /// Always runs every sub-step. Does no validation; bad collaborator state
    /// shows up as non-finite readouts.
    pub fn update(&mut self, time: f64, dt: f64) -> FrameOutput {
        let load_inertia = self.load_inertia() * self.load_inertia_gain;

        self.integrator
            .step(&mut self.engine, &mut self.drivetrain, load_inertia, time, dt);

        let gear = self.drivetrain.gear();
        let rpm = self.engine.rpm();
        let inputs = SpeedInputs {
            gear,
            engine_rpm: rpm,
            total_gear_ratio: self.drivetrain.total_gear_ratio(),
            wheel_radius: self.body.wheel_radius(),
        };
        self.velocity = display_speed(inputs, self.velocity, dt);

        let frame = FrameOutput {
            rpm,
            speed_mph: self.velocity,
            gear,
        };

        if let Some(dashboard) = self.dashboard.as_mut() {
            dashboard.show(frame.rpm, frame.speed_mph, frame.gear);
        }

        if let Some(audio) = self.audio.as_ref().filter(|a| a.is_active()) {
            self.engine.apply_sounds(audio.samples(), gear);
        }

        tracing::trace!(time, dt, rpm, speed_mph = frame.speed_mph, gear, "frame");
        frame
    }

    /// Inertia the engine feels through the current gear (kg·m²).
    pub fn load_inertia(&self) -> f64 {
        load_inertia(&self.body, &self.drivetrain)
    }

    /// Dashboard speed (mph).
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn body(&self) -> &VehicleBody {
        &self.body
    }

    pub fn sub_steps(&self) -> usize {
        self.integrator.sub_steps()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn drivetrain(&self) -> &D {
        &self.drivetrain
    }

    pub fn drivetrain_mut(&mut self) -> &mut D {
        &mut self.drivetrain
    }

    pub fn audio(&self) -> Option<&A> {
        self.audio.as_ref()
    }

    /// True when the next `update` will apply sounds.
    pub fn sound_active(&self) -> bool {
        self.audio.as_ref().is_some_and(|a| a.is_active())
    }
}
