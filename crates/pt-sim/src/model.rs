//! Collaborator traits for the engine and drivetrain.
//!
//! Engine and drivetrain are independent state owners. They only meet through
//! the four-phase sub-step protocol driven by
//! [`SubstepIntegrator`](crate::integrator::SubstepIntegrator): every solve
//! call borrows the other side read-only, so each side corrects its own state
//! against whatever the other currently holds. Call order decides who sees
//! pre- or post-correction values within a sub-step.

use crate::audio::SampleSet;
use crate::error::SimResult;
use pt_project::{DrivetrainConfig, EngineConfig};

/// Read-only rotational snapshot one side exposes to the other.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ShaftView {
    /// Angle at the end of the current integrate/solve pass (rad)
    pub theta: f64,
    /// Angle at the start of the sub-step (rad)
    pub prev_theta: f64,
    /// Angular velocity (rad/s)
    pub omega: f64,
    /// 1 / inertia; zero means immovable
    pub inv_inertia: f64,
}

/// Active coupling between crank and drivetrain output shaft.
///
/// The constraint keeps `Δθ_engine = ratio · Δθ_output` per sub-step, softened
/// by `compliance` and limited to `max_torque_nm` of transmitted torque.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GearJoint {
    pub ratio: f64,
    /// XPBD compliance (rad/(N·m)); 0 is rigid
    pub compliance: f64,
    pub max_torque_nm: f64,
    /// Relative-velocity damping rate (1/s)
    pub damping_per_s: f64,
}

/// Engine side of the powertrain.
pub trait EngineModel {
    /// (Re)initialize in place from configuration.
    fn init(&mut self, config: &EngineConfig) -> SimResult<()>;

    /// Free rotational motion over `h`, with `load_inertia` added to the crank.
    fn integrate(&mut self, load_inertia: f64, time: f64, h: f64);

    /// Position-level correction against the drivetrain's current state.
    fn solve_pos<D: DrivetrainModel + ?Sized>(&mut self, drivetrain: &D, h: f64);

    /// Derive auxiliary state (velocity, rpm) from the solved position.
    fn update(&mut self, h: f64);

    /// Velocity-level correction against the drivetrain's current state.
    fn solve_vel<D: DrivetrainModel + ?Sized>(&mut self, drivetrain: &D, h: f64);

    fn rpm(&self) -> f64;

    fn apply_sounds(&mut self, samples: &SampleSet, gear: u32);

    fn shaft(&self) -> ShaftView {
        ShaftView::default()
    }
}

/// Drivetrain side of the powertrain. Gear `0` is neutral.
pub trait DrivetrainModel {
    /// (Re)initialize in place from configuration.
    fn init(&mut self, config: &DrivetrainConfig) -> SimResult<()>;

    fn integrate(&mut self, h: f64);

    fn solve_pos<E: EngineModel + ?Sized>(&mut self, engine: &E, h: f64);

    fn update(&mut self, h: f64);

    fn solve_vel<E: EngineModel + ?Sized>(&mut self, engine: &E, h: f64);

    fn gear(&self) -> u32;

    /// Driveline rotating inertia (kg·m²).
    fn inertia(&self) -> f64;

    /// Ratio of the engaged gear.
    fn gear_ratio(&self) -> f64;

    /// Engaged gear ratio times final drive.
    fn total_gear_ratio(&self) -> f64;

    fn shaft(&self) -> ShaftView {
        ShaftView::default()
    }

    /// Coupling to the engine, `None` while disengaged.
    fn clutch(&self) -> Option<GearJoint> {
        None
    }
}
