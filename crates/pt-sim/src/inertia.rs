//! Reflected load inertia seen at the crank.
//!
//! Inertias downstream of a reduction are divided by the square of that
//! reduction's ratio when referred to the upstream shaft:
//!
//! ```text
//! I1 = m·r² / N_total²            vehicle mass at the contact patch
//! I2 = 4·12.0·r² / N_total²       four wheels
//! I3 = I_driveline / N_gear²      driveline, behind the gearbox only
//! ```

use crate::body::VehicleBody;
use crate::model::DrivetrainModel;

pub const WHEEL_COUNT: f64 = 4.0;

/// Per-wheel inertia term, multiplied by r² like the vehicle mass.
pub const WHEEL_INERTIA: f64 = 12.0;

/// The three reflected contributions, kept apart for inspection.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LoadInertia {
    pub vehicle: f64,
    pub wheels: f64,
    pub driveline: f64,
}

impl LoadInertia {
    /// All contributions for an engaged gear.
    pub fn reflected(
        body: &VehicleBody,
        gear_ratio: f64,
        total_gear_ratio: f64,
        driveline_inertia: f64,
    ) -> Self {
        let r2 = body.wheel_radius().powi(2);
        let total2 = total_gear_ratio.powi(2);

        Self {
            vehicle: body.mass() * r2 / total2,
            wheels: WHEEL_COUNT * WHEEL_INERTIA * r2 / total2,
            driveline: driveline_inertia / gear_ratio.powi(2),
        }
    }

    /// Contributions for the drivetrain's current gear; all zero in neutral.
    pub fn of<D: DrivetrainModel + ?Sized>(body: &VehicleBody, drivetrain: &D) -> Self {
        if drivetrain.gear() == 0 {
            return Self::default();
        }
        Self::reflected(
            body,
            drivetrain.gear_ratio(),
            drivetrain.total_gear_ratio(),
            drivetrain.inertia(),
        )
    }

    pub fn total(&self) -> f64 {
        self.vehicle + self.wheels + self.driveline
    }
}

/// Effective inertia the engine feels through the current gear (kg·m²).
pub fn load_inertia<D: DrivetrainModel + ?Sized>(body: &VehicleBody, drivetrain: &D) -> f64 {
    LoadInertia::of(body, drivetrain).total()
}
