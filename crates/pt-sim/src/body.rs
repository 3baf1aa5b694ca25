//! Scalar vehicle body: the mass and wheel geometry behind the drivetrain.

use crate::error::SimResult;
use pt_core::{Length, Mass, ensure_positive};
use pt_project::VehicleDef;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleBody {
    mass: f64,
    wheel_radius: f64,
}

impl VehicleBody {
    /// # Errors
    /// `NonPhysical` if mass (kg) or wheel radius (m) is NaN or infinite,
    /// `InvalidArg` if either is zero or negative.
    pub fn new(mass: f64, wheel_radius: f64) -> SimResult<Self> {
        let mass = ensure_positive(mass, "vehicle mass must be positive")?;
        let wheel_radius = ensure_positive(wheel_radius, "wheel radius must be positive")?;
        Ok(Self { mass, wheel_radius })
    }

    pub fn from_si(mass: Mass, wheel_radius: Length) -> SimResult<Self> {
        use uom::si::length::meter;
        use uom::si::mass::kilogram;
        Self::new(mass.get::<kilogram>(), wheel_radius.get::<meter>())
    }

    pub fn from_def(def: &VehicleDef) -> SimResult<Self> {
        Self::new(def.mass_kg, def.wheel_radius_m)
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn wheel_radius(&self) -> f64 {
        self.wheel_radius
    }
}

impl Default for VehicleBody {
    fn default() -> Self {
        Self {
            mass: 500.0,
            wheel_radius: 0.25,
        }
    }
}
