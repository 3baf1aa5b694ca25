//! Per-frame powertrain stepping.
//!
//! Provides:
//! - Collaborator traits for engine, drivetrain, audio and dashboard
//! - Fixed-count sub-stepped XPBD-style integrator (four-phase protocol)
//! - Reflected load inertia and dashboard speed derivation
//! - The vehicle stepper and a fixed-step session runner for host loops

pub mod audio;
pub mod body;
pub mod dashboard;
pub mod error;
pub mod inertia;
pub mod integrator;
pub mod model;
pub mod session;
pub mod speed;
pub mod vehicle;

// Re-exports for public API
pub use audio::{AudioBackend, Sample, SampleSet, SilentAudio};
pub use body::VehicleBody;
pub use dashboard::{Dashboard, FrameOutput};
pub use error::{SimError, SimResult};
pub use inertia::{LoadInertia, load_inertia};
pub use integrator::{SUB_STEPS, SubstepClock, SubstepIntegrator};
pub use model::{DrivetrainModel, EngineModel, GearJoint, ShaftView};
pub use session::{SessionOptions, SessionRecord, run_session};
pub use speed::{SPEED_SCALE, SpeedInputs, display_speed};
pub use vehicle::{StepperOptions, Vehicle};
