//! Manual gearbox with a friction clutch onto a single output shaft.

use crate::coupling::{output_correction, position_lambda, velocity_impulse};
use crate::error::{ComponentError, ComponentResult};
use crate::shaft::Shaft;
use pt_project::DrivetrainConfig;
use pt_project::validate::validate_drivetrain;
use pt_sim::{DrivetrainModel, EngineModel, GearJoint, ShaftView, SimResult};

/// Gearbox, final drive and clutch feeding one output shaft.
///
/// The output shaft carries the driveline inertia plus the configured output
/// inertia (wheels and vehicle mass seen at the axle) and loses torque to
/// viscous drag. Gear `0` is neutral; gear `n` uses `gear_ratios[n - 1]`.
#[derive(Clone, Debug)]
pub struct ManualDrivetrain {
    config: DrivetrainConfig,
    output: Shaft,
    gear: u32,
    /// Clutch engagement in [0, 1]
    clutch: f64,
}

impl ManualDrivetrain {
    /// Build a drivetrain at rest in neutral with the clutch engaged.
    ///
    /// # Errors
    /// Returns a configuration error if `config` fails validation.
    pub fn new(config: &DrivetrainConfig) -> ComponentResult<Self> {
        validate_drivetrain(config)?;
        let output = Shaft::new(
            config.inertia_kg_m2 + config.output_inertia_kg_m2,
            config.drag_nm_s_per_rad,
        )?;
        Ok(Self {
            config: config.clone(),
            output,
            gear: 0,
            clutch: 1.0,
        })
    }

    pub fn config(&self) -> &DrivetrainConfig {
        &self.config
    }

    /// Number of forward gears.
    pub fn gear_count(&self) -> usize {
        self.config.gear_ratios.len()
    }

    /// Select `gear` (0 = neutral).
    ///
    /// # Errors
    /// Returns `GearOutOfRange` for a gear the box does not have; the current
    /// gear is kept.
    pub fn set_gear(&mut self, gear: u32) -> ComponentResult<()> {
        if gear as usize > self.gear_count() {
            return Err(ComponentError::GearOutOfRange {
                gear,
                gears: self.gear_count(),
            });
        }
        if gear != self.gear {
            tracing::debug!(from = self.gear, to = gear, "gear change");
        }
        self.gear = gear;
        Ok(())
    }

    /// Up one gear, staying in top. Returns the selected gear.
    pub fn shift_up(&mut self) -> u32 {
        if (self.gear as usize) < self.gear_count() {
            self.gear += 1;
        }
        self.gear
    }

    /// Down one gear, stopping at neutral. Returns the selected gear.
    pub fn shift_down(&mut self) -> u32 {
        self.gear = self.gear.saturating_sub(1);
        self.gear
    }

    /// Set clutch engagement, clamped to [0, 1]. Non-finite input disengages.
    pub fn set_clutch(&mut self, engagement: f64) {
        self.clutch = if engagement.is_finite() {
            engagement.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn clutch_engagement(&self) -> f64 {
        self.clutch
    }

    /// Output shaft speed (rpm).
    pub fn output_rpm(&self) -> f64 {
        self.output.rpm()
    }

    /// Spin the output shaft up or down, e.g. to start a run rolling.
    pub fn set_output_rpm(&mut self, rpm: f64) {
        self.output.set_rpm(rpm);
    }
}

impl DrivetrainModel for ManualDrivetrain {
    fn init(&mut self, config: &DrivetrainConfig) -> SimResult<()> {
        *self = Self::new(config)?;
        tracing::debug!(
            gears = config.gear_ratios.len(),
            final_drive = config.final_drive,
            "drivetrain initialized"
        );
        Ok(())
    }

    fn integrate(&mut self, h: f64) {
        self.output.integrate(0.0, 0.0, h);
    }

    fn solve_pos<E: EngineModel + ?Sized>(&mut self, engine: &E, h: f64) {
        let Some(joint) = self.clutch() else {
            return;
        };
        let own = self.output.view();
        let lambda = position_lambda(engine.shaft(), own, &joint, h);
        self.output.theta += output_correction(&own, &joint, lambda);
    }

    fn update(&mut self, h: f64) {
        self.output.update(h);
    }

    fn solve_vel<E: EngineModel + ?Sized>(&mut self, engine: &E, h: f64) {
        let Some(joint) = self.clutch() else {
            return;
        };
        let own = self.output.view();
        let impulse = velocity_impulse(engine.shaft(), own, &joint, h);
        self.output
            .apply_velocity_correction(output_correction(&own, &joint, impulse));
    }

    fn gear(&self) -> u32 {
        self.gear
    }

    fn inertia(&self) -> f64 {
        self.config.inertia_kg_m2
    }

    fn gear_ratio(&self) -> f64 {
        if self.gear == 0 {
            return 0.0;
        }
        self.config
            .gear_ratios
            .get(self.gear as usize - 1)
            .copied()
            .unwrap_or(0.0)
    }

    fn total_gear_ratio(&self) -> f64 {
        self.gear_ratio() * self.config.final_drive
    }

    fn shaft(&self) -> ShaftView {
        self.output.view()
    }

    fn clutch(&self) -> Option<GearJoint> {
        if self.gear == 0 || self.clutch <= 0.0 {
            return None;
        }
        Some(GearJoint {
            ratio: self.total_gear_ratio(),
            compliance: self.config.clutch_compliance,
            max_torque_nm: self.config.clutch_max_torque_nm * self.clutch,
            damping_per_s: self.config.clutch_damping_per_s,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pt_sim::SimError;

    fn drivetrain() -> ManualDrivetrain {
        ManualDrivetrain::new(&DrivetrainConfig::default()).unwrap()
    }

    #[test]
    fn starts_in_neutral_at_rest() {
        let d = drivetrain();
        assert_eq!(d.gear(), 0);
        assert_eq!(d.gear_ratio(), 0.0);
        assert_eq!(d.total_gear_ratio(), 0.0);
        assert_eq!(d.output_rpm(), 0.0);
        assert_eq!(d.clutch_engagement(), 1.0);
        assert!(d.clutch().is_none());
    }

    #[test]
    fn gear_ratios_index_from_first_gear() {
        let mut d = drivetrain();
        d.set_gear(1).unwrap();
        assert_eq!(d.gear_ratio(), 3.6);
        assert!((d.total_gear_ratio() - 3.6 * 3.9).abs() < 1e-12);
        d.set_gear(5).unwrap();
        assert_eq!(d.gear_ratio(), 0.8);
    }

    #[test]
    fn gears_beyond_the_box_rejected() {
        let mut d = drivetrain();
        d.set_gear(3).unwrap();
        let err = d.set_gear(6).unwrap_err();
        assert!(matches!(err, ComponentError::GearOutOfRange { gear: 6, gears: 5 }));
        assert_eq!(d.gear(), 3);
    }

    #[test]
    fn shifting_saturates() {
        let mut d = drivetrain();
        assert_eq!(d.shift_down(), 0);
        for _ in 0..10 {
            d.shift_up();
        }
        assert_eq!(d.gear(), 5);
        assert_eq!(d.shift_down(), 4);
    }

    #[test]
    fn clutch_scales_joint_torque() {
        let mut d = drivetrain();
        d.set_gear(2).unwrap();
        d.set_clutch(0.25);
        let joint = d.clutch().unwrap();
        assert!((joint.ratio - 2.1 * 3.9).abs() < 1e-12);
        assert!((joint.max_torque_nm - 100.0).abs() < 1e-12);

        d.set_clutch(0.0);
        assert!(d.clutch().is_none());
        d.set_clutch(f64::NAN);
        assert_eq!(d.clutch_engagement(), 0.0);
        d.set_clutch(3.0);
        assert_eq!(d.clutch_engagement(), 1.0);
    }

    #[test]
    fn drag_slows_a_rolling_output() {
        let mut d = drivetrain();
        d.set_output_rpm(500.0);
        let h = 0.001;
        for _ in 0..1000 {
            d.integrate(h);
            d.update(h);
        }
        assert!(d.output_rpm() < 500.0);
        assert!(d.output_rpm() > 0.0);
    }

    #[test]
    fn init_resets_and_validates() {
        let mut d = drivetrain();
        d.set_gear(4).unwrap();
        d.init(&DrivetrainConfig::default()).unwrap();
        assert_eq!(d.gear(), 0);

        let bad = DrivetrainConfig {
            gear_ratios: vec![3.0, 0.0],
            ..DrivetrainConfig::default()
        };
        assert!(matches!(d.init(&bad), Err(SimError::Config(_))));
    }
}
