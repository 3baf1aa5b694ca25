//! Combustion engine: throttle-driven crank with a rev limiter.

use crate::actuator::FirstOrderActuator;
use crate::coupling::{position_lambda, velocity_impulse};
use crate::error::ComponentResult;
use crate::shaft::Shaft;
use pt_core::interp_linear;
use pt_project::EngineConfig;
use pt_project::validate::validate_engine;
use pt_sim::{DrivetrainModel, EngineModel, Sample, SampleSet, ShaftView, SimResult};

/// Load factor floor for the sound mix at closed throttle.
const CLOSED_THROTTLE_LOAD: f64 = 0.35;

/// Crank driven by a torque curve scaled by throttle position.
///
/// Per sub-step:
///
/// ```text
/// command  = max(throttle_cmd, idle_throttle if rpm < idle)
/// throttle → command through a first-order, rate-limited actuator
/// τ        = curve(rpm) · throttle   (0 while the limiter cuts)
/// crank integrates τ with friction, carrying the load inertia
/// ```
///
/// Hitting redline cuts combustion for `limiter_cut_s`. The cut counts down
/// by each sub-step's `h`, so it lasts the same whichever clock cadence the
/// stepper hands to `integrate`.
#[derive(Clone, Debug)]
pub struct CombustionEngine {
    config: EngineConfig,
    torque_curve: Vec<(f64, f64)>,
    actuator: FirstOrderActuator,
    shaft: Shaft,
    throttle_cmd: f64,
    throttle: f64,
    /// Combustion cut left to run (s)
    cut_remaining_s: f64,
    limiting: bool,
    combustion_torque: f64,
    sound_levels: Vec<f64>,
}

impl CombustionEngine {
    /// Build an engine idling at `idle_rpm`.
    ///
    /// # Errors
    /// Returns a configuration error if `config` fails validation.
    pub fn new(config: &EngineConfig) -> ComponentResult<Self> {
        validate_engine(config)?;

        let actuator = FirstOrderActuator::new(config.throttle_tau_s, config.throttle_rate_limit_per_s)?;
        let mut shaft = Shaft::new(config.inertia_kg_m2, config.friction_nm_s_per_rad)?;
        shaft.set_rpm(config.idle_rpm);

        Ok(Self {
            config: config.clone(),
            torque_curve: config
                .torque_curve
                .iter()
                .map(|p| (p.rpm, p.torque_nm))
                .collect(),
            actuator,
            shaft,
            throttle_cmd: 0.0,
            throttle: config.idle_throttle,
            cut_remaining_s: 0.0,
            limiting: false,
            combustion_torque: 0.0,
            sound_levels: Vec::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Driver's throttle request in [0, 1]. Non-finite requests close it.
    pub fn set_throttle(&mut self, command: f64) {
        self.throttle_cmd = if command.is_finite() {
            command.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn throttle_command(&self) -> f64 {
        self.throttle_cmd
    }

    /// Actual throttle position after actuator lag.
    pub fn throttle(&self) -> f64 {
        self.throttle
    }

    /// True when the last integrate ran with combustion cut.
    pub fn limiting(&self) -> bool {
        self.limiting
    }

    /// Combustion torque applied in the last integrate (N·m).
    pub fn combustion_torque(&self) -> f64 {
        self.combustion_torque
    }

    /// Full-throttle torque at `rpm` (N·m).
    pub fn torque_at(&self, rpm: f64) -> f64 {
        interp_linear(&self.torque_curve, rpm)
    }

    /// Playback level per sample, in sample-set order, from the last
    /// `apply_sounds`.
    pub fn sound_levels(&self) -> &[f64] {
        &self.sound_levels
    }

    /// Angular speed of the crank, as a unit-carrying quantity.
    pub fn angular_velocity(&self) -> pt_core::AngularVelocity {
        self.shaft.angular_velocity()
    }
}

impl EngineModel for CombustionEngine {
    fn init(&mut self, config: &EngineConfig) -> SimResult<()> {
        *self = Self::new(config)?;
        tracing::debug!(
            idle_rpm = config.idle_rpm,
            redline_rpm = config.redline_rpm,
            "engine initialized"
        );
        Ok(())
    }

    fn integrate(&mut self, load_inertia: f64, _time: f64, h: f64) {
        let rpm = self.shaft.rpm();

        let idle_floor = if rpm < self.config.idle_rpm {
            self.config.idle_throttle
        } else {
            0.0
        };
        let command = self.throttle_cmd.max(idle_floor);
        self.throttle = self.actuator.step(self.throttle, h, command);

        if rpm >= self.config.redline_rpm {
            self.cut_remaining_s = self.config.limiter_cut_s;
        }
        self.limiting = self.cut_remaining_s > 0.0;
        if self.limiting {
            self.cut_remaining_s = (self.cut_remaining_s - h).max(0.0);
        }

        self.combustion_torque = if self.limiting {
            0.0
        } else {
            self.torque_at(rpm) * self.throttle
        };

        self.shaft.integrate(self.combustion_torque, load_inertia, h);
    }

    fn solve_pos<D: DrivetrainModel + ?Sized>(&mut self, drivetrain: &D, h: f64) {
        let Some(joint) = drivetrain.clutch() else {
            return;
        };
        let lambda = position_lambda(self.shaft.view(), drivetrain.shaft(), &joint, h);
        self.shaft.theta += self.shaft.inverse_inertia() * lambda;
    }

    fn update(&mut self, h: f64) {
        self.shaft.update(h);
        // The crank does not run backwards
        if self.shaft.omega < 0.0 {
            self.shaft.omega = 0.0;
        }
    }

    fn solve_vel<D: DrivetrainModel + ?Sized>(&mut self, drivetrain: &D, h: f64) {
        let Some(joint) = drivetrain.clutch() else {
            return;
        };
        let impulse = velocity_impulse(self.shaft.view(), drivetrain.shaft(), &joint, h);
        let d_omega = self.shaft.inverse_inertia() * impulse;
        self.shaft.apply_velocity_correction(d_omega);
    }

    fn rpm(&self) -> f64 {
        self.shaft.rpm()
    }

    fn apply_sounds(&mut self, samples: &SampleSet, gear: u32) {
        let weights = crossfade_weights(samples.as_slice(), self.rpm());
        let mut load = CLOSED_THROTTLE_LOAD + (1.0 - CLOSED_THROTTLE_LOAD) * self.throttle;
        if gear == 0 {
            load *= 0.5;
        }

        self.sound_levels.clear();
        self.sound_levels.extend(
            samples
                .iter()
                .zip(weights)
                .map(|(sample, weight)| weight * sample.volume * load),
        );
    }

    fn shaft(&self) -> ShaftView {
        self.shaft.view()
    }
}

/// Linear crossfade between the two samples recorded nearest `rpm`.
///
/// Outside the recorded range the nearest sample plays alone. Weights come
/// back in the order of `samples` and sum to one unless `samples` is empty.
fn crossfade_weights(samples: &[Sample], rpm: f64) -> Vec<f64> {
    let mut weights = vec![0.0; samples.len()];
    let mut order: Vec<usize> = (0..samples.len()).collect();
    order.sort_by(|&a, &b| samples[a].rpm.total_cmp(&samples[b].rpm));

    let (Some(&lowest), Some(&highest)) = (order.first(), order.last()) else {
        return weights;
    };
    if rpm <= samples[lowest].rpm {
        weights[lowest] = 1.0;
        return weights;
    }
    if rpm >= samples[highest].rpm {
        weights[highest] = 1.0;
        return weights;
    }

    for pair in order.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if rpm <= samples[hi].rpm {
            let span = samples[hi].rpm - samples[lo].rpm;
            let f = if span > 0.0 {
                (rpm - samples[lo].rpm) / span
            } else {
                1.0
            };
            weights[lo] = 1.0 - f;
            weights[hi] = f;
            break;
        }
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use pt_project::TorquePoint;
    use pt_sim::SimError;
    use std::sync::Arc;

    fn sample(name: &str, rpm: f64, volume: f64) -> Sample {
        Sample {
            name: name.to_string(),
            rpm,
            volume,
            data: Arc::from(Vec::<u8>::new()),
        }
    }

    fn engine() -> CombustionEngine {
        CombustionEngine::new(&EngineConfig::default()).unwrap()
    }

    /// Drivetrain stand-in with nothing engaged.
    struct Neutral;

    impl DrivetrainModel for Neutral {
        fn init(&mut self, _config: &pt_project::DrivetrainConfig) -> SimResult<()> {
            Ok(())
        }
        fn integrate(&mut self, _h: f64) {}
        fn solve_pos<E: EngineModel + ?Sized>(&mut self, _engine: &E, _h: f64) {}
        fn update(&mut self, _h: f64) {}
        fn solve_vel<E: EngineModel + ?Sized>(&mut self, _engine: &E, _h: f64) {}
        fn gear(&self) -> u32 {
            0
        }
        fn inertia(&self) -> f64 {
            0.5
        }
        fn gear_ratio(&self) -> f64 {
            0.0
        }
        fn total_gear_ratio(&self) -> f64 {
            0.0
        }
    }

    fn run_free(engine: &mut CombustionEngine, seconds: f64) {
        let h = 1.0 / 1200.0;
        let steps = (seconds / h) as usize;
        for i in 0..steps {
            let t = i as f64 * h;
            engine.integrate(0.0, t, h);
            engine.solve_pos(&Neutral, h);
            engine.update(h);
            engine.solve_vel(&Neutral, h);
        }
    }

    #[test]
    fn starts_at_idle() {
        let e = engine();
        assert!((e.rpm() - 800.0).abs() < 1e-9);
        assert_eq!(e.throttle_command(), 0.0);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = EngineConfig {
            torque_curve: Vec::new(),
            ..EngineConfig::default()
        };
        assert!(CombustionEngine::new(&config).is_err());
    }

    #[test]
    fn init_reports_config_errors() {
        let mut e = engine();
        let config = EngineConfig {
            inertia_kg_m2: -1.0,
            ..EngineConfig::default()
        };
        let err = e.init(&config).unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn throttle_request_clamped() {
        let mut e = engine();
        e.set_throttle(1.7);
        assert_eq!(e.throttle_command(), 1.0);
        e.set_throttle(-0.2);
        assert_eq!(e.throttle_command(), 0.0);
        e.set_throttle(f64::NAN);
        assert_eq!(e.throttle_command(), 0.0);
    }

    #[test]
    fn torque_curve_interpolates_and_holds_ends() {
        let config = EngineConfig {
            torque_curve: vec![
                TorquePoint {
                    rpm: 1000.0,
                    torque_nm: 100.0,
                },
                TorquePoint {
                    rpm: 3000.0,
                    torque_nm: 200.0,
                },
            ],
            ..EngineConfig::default()
        };
        let e = CombustionEngine::new(&config).unwrap();
        assert_eq!(e.torque_at(500.0), 100.0);
        assert!((e.torque_at(2000.0) - 150.0).abs() < 1e-12);
        assert_eq!(e.torque_at(9000.0), 200.0);
    }

    #[test]
    fn throttle_revs_the_free_engine() {
        let mut e = engine();
        e.set_throttle(0.5);
        run_free(&mut e, 0.5);
        assert!(e.rpm() > 1500.0);
        assert!(e.throttle() > 0.45);
    }

    #[test]
    fn idle_throttle_holds_the_engine_up() {
        let mut e = engine();
        run_free(&mut e, 5.0);
        assert!(e.rpm() > 0.0);
        assert!(e.throttle() >= 0.0);
    }

    #[test]
    fn rev_limiter_caps_rpm() {
        let mut e = engine();
        e.set_throttle(1.0);
        run_free(&mut e, 5.0);
        // Limiter overshoot stays small at this inertia
        assert!(e.rpm() < 7000.0 * 1.1);
    }

    #[test]
    fn limiter_cut_counts_sub_steps_not_clock_time() {
        let mut e = engine();
        let h = 0.001;
        e.shaft.set_rpm(7200.0);
        e.set_throttle(1.0);
        e.integrate(0.0, 10.0, h);
        assert!(e.limiting());
        assert_eq!(e.combustion_torque(), 0.0);

        // Clock running backwards neither ends nor extends the 0.05 s cut
        e.shaft.set_rpm(6000.0);
        for _ in 0..45 {
            e.integrate(0.0, 0.0, h);
            assert!(e.limiting());
        }
        for _ in 0..10 {
            e.integrate(0.0, 0.0, h);
        }
        assert!(!e.limiting());
        assert!(e.combustion_torque() > 0.0);
    }

    #[test]
    fn load_inertia_slows_the_response() {
        let mut free = engine();
        let mut loaded = engine();
        free.set_throttle(1.0);
        loaded.set_throttle(1.0);
        for i in 0..200 {
            let t = i as f64 * 0.001;
            free.integrate(0.0, t, 0.001);
            free.update(0.001);
            loaded.integrate(2.0, t, 0.001);
            loaded.update(0.001);
        }
        assert!(free.rpm() > loaded.rpm());
    }

    #[test]
    fn neutral_leaves_the_crank_uncoupled() {
        let mut e = engine();
        e.integrate(0.0, 0.0, 0.001);
        let before = e.shaft();
        e.solve_pos(&Neutral, 0.001);
        e.solve_vel(&Neutral, 0.001);
        assert_eq!(e.shaft(), before);
    }

    #[test]
    fn crossfade_between_neighbours() {
        let samples = [
            sample("high", 6000.0, 1.0),
            sample("idle", 1000.0, 1.0),
            sample("mid", 3000.0, 1.0),
        ];
        let w = crossfade_weights(&samples, 2000.0);
        assert_eq!(w, vec![0.0, 0.5, 0.5]);

        let w = crossfade_weights(&samples, 500.0);
        assert_eq!(w, vec![0.0, 1.0, 0.0]);

        let w = crossfade_weights(&samples, 9000.0);
        assert_eq!(w, vec![1.0, 0.0, 0.0]);

        assert!(crossfade_weights(&[], 2000.0).is_empty());
    }

    #[test]
    fn sound_levels_follow_volume_and_gear() {
        let mut e = engine();
        let set = SampleSet::new(vec![sample("idle", 800.0, 0.8)]);

        e.apply_sounds(&set, 2);
        let in_gear = e.sound_levels()[0];
        e.apply_sounds(&set, 0);
        let neutral = e.sound_levels()[0];

        assert!(in_gear > 0.0 && in_gear <= 0.8);
        assert!((neutral - in_gear * 0.5).abs() < 1e-12);
    }
}
