//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const LATEST_VERSION: u32 = 1;

/// The bundle consumed by `init`: engine, drivetrain and sound setup, plus
/// the optional vehicle body a host uses to build the stepper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Configuration {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub name: String,
    pub engine: EngineConfig,
    pub drivetrain: DrivetrainConfig,
    #[serde(default)]
    pub sounds: SoundConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<VehicleDef>,
}

impl Configuration {
    /// Rewrite relative sample paths so they are anchored at `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for sample in &mut self.sounds.samples {
            if sample.path.is_relative() {
                sample.path = base.join(&sample.path);
            }
        }
    }

    /// Vehicle body section, or the stock body when the file omits it.
    pub fn vehicle_or_default(&self) -> VehicleDef {
        self.vehicle.clone().unwrap_or_default()
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            version: LATEST_VERSION,
            name: String::new(),
            engine: EngineConfig::default(),
            drivetrain: DrivetrainConfig::default(),
            sounds: SoundConfig::default(),
            vehicle: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Crank + flywheel moment of inertia (kg·m²)
    pub inertia_kg_m2: f64,
    #[serde(default = "default_idle_rpm")]
    pub idle_rpm: f64,
    #[serde(default = "default_redline_rpm")]
    pub redline_rpm: f64,
    /// How long fuel stays cut once the limiter trips (s)
    #[serde(default = "default_limiter_cut_s")]
    pub limiter_cut_s: f64,
    /// Viscous friction (N·m·s/rad)
    #[serde(default = "default_engine_friction")]
    pub friction_nm_s_per_rad: f64,
    /// Wide-open-throttle torque, sorted by rpm
    pub torque_curve: Vec<TorquePoint>,
    #[serde(default = "default_throttle_tau_s")]
    pub throttle_tau_s: f64,
    #[serde(default = "default_throttle_rate_limit")]
    pub throttle_rate_limit_per_s: f64,
    /// Throttle floor applied below idle rpm
    #[serde(default = "default_idle_throttle")]
    pub idle_throttle: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            inertia_kg_m2: 0.2,
            idle_rpm: default_idle_rpm(),
            redline_rpm: default_redline_rpm(),
            limiter_cut_s: default_limiter_cut_s(),
            friction_nm_s_per_rad: default_engine_friction(),
            torque_curve: vec![
                TorquePoint::new(1000.0, 120.0),
                TorquePoint::new(4500.0, 190.0),
                TorquePoint::new(7000.0, 150.0),
            ],
            throttle_tau_s: default_throttle_tau_s(),
            throttle_rate_limit_per_s: default_throttle_rate_limit(),
            idle_throttle: default_idle_throttle(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TorquePoint {
    pub rpm: f64,
    pub torque_nm: f64,
}

impl TorquePoint {
    pub fn new(rpm: f64, torque_nm: f64) -> Self {
        Self { rpm, torque_nm }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrivetrainConfig {
    /// Forward gear ratios, first gear first
    pub gear_ratios: Vec<f64>,
    pub final_drive: f64,
    /// Driveline rotating inertia between gearbox and final drive (kg·m²)
    pub inertia_kg_m2: f64,
    /// Output shaft inertia: wheels plus vehicle mass equivalent (kg·m²)
    #[serde(default = "default_output_inertia")]
    pub output_inertia_kg_m2: f64,
    #[serde(default = "default_clutch_max_torque")]
    pub clutch_max_torque_nm: f64,
    /// XPBD compliance of the clutch joint (rad/(N·m)); 0 is rigid
    #[serde(default)]
    pub clutch_compliance: f64,
    /// Relative-velocity damping rate of the clutch joint (1/s)
    #[serde(default)]
    pub clutch_damping_per_s: f64,
    /// Rolling/driveline drag on the output shaft (N·m·s/rad)
    #[serde(default = "default_drag")]
    pub drag_nm_s_per_rad: f64,
}

impl Default for DrivetrainConfig {
    fn default() -> Self {
        Self {
            gear_ratios: vec![3.6, 2.1, 1.4, 1.0, 0.8],
            final_drive: 3.9,
            inertia_kg_m2: 0.5,
            output_inertia_kg_m2: default_output_inertia(),
            clutch_max_torque_nm: default_clutch_max_torque(),
            clutch_compliance: 0.0,
            clutch_damping_per_s: 0.0,
            drag_nm_s_per_rad: default_drag(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SoundConfig {
    #[serde(default)]
    pub samples: Vec<SampleDef>,
}

/// One recorded engine loop and the rpm it was recorded at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SampleDef {
    pub name: String,
    pub path: PathBuf,
    pub rpm: f64,
    #[serde(default = "default_volume")]
    pub volume: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VehicleDef {
    #[serde(default = "default_mass_kg")]
    pub mass_kg: f64,
    #[serde(default = "default_wheel_radius_m")]
    pub wheel_radius_m: f64,
}

impl Default for VehicleDef {
    fn default() -> Self {
        Self {
            mass_kg: default_mass_kg(),
            wheel_radius_m: default_wheel_radius_m(),
        }
    }
}

fn default_version() -> u32 {
    LATEST_VERSION
}

fn default_idle_rpm() -> f64 {
    800.0
}

fn default_redline_rpm() -> f64 {
    7000.0
}

fn default_limiter_cut_s() -> f64 {
    0.05
}

fn default_engine_friction() -> f64 {
    0.02
}

fn default_throttle_tau_s() -> f64 {
    0.05
}

fn default_throttle_rate_limit() -> f64 {
    20.0
}

fn default_idle_throttle() -> f64 {
    0.08
}

fn default_output_inertia() -> f64 {
    40.0
}

fn default_clutch_max_torque() -> f64 {
    400.0
}

fn default_drag() -> f64 {
    2.0
}

fn default_volume() -> f64 {
    1.0
}

fn default_mass_kg() -> f64 {
    500.0
}

fn default_wheel_radius_m() -> f64 {
    0.25
}
