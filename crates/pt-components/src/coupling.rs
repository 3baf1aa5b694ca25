//! Scalar gear-joint constraint between a crank and a drivetrain output shaft.
//!
//! Per sub-step the joint asks that the crank turn `ratio` times as far as the
//! output shaft:
//!
//! ```text
//! C = (θe - θe_prev) - r · (θd - θd_prev)
//! w = we + r² · wd                      (we, wd: inverse inertias)
//! λ = -C / (w + α / h²)                 clamped to ±τmax · h²
//! ```
//!
//! The engine moves its crank by `we · λ` and the drivetrain moves its output
//! by `-r · wd · λ`. Each side only applies its own share and recomputes `λ`
//! from whatever the other side currently holds, so the second side to solve
//! sees the first side's correction.

use pt_sim::{GearJoint, ShaftView};

fn effective_inverse_mass(engine: &ShaftView, output: &ShaftView, joint: &GearJoint) -> f64 {
    engine.inv_inertia + joint.ratio * joint.ratio * output.inv_inertia
}

fn symmetric_clamp(v: f64, limit: f64) -> f64 {
    v.max(-limit).min(limit)
}

/// Position multiplier for the joint (N·m·s²). Zero for a zero-length step.
pub fn position_lambda(engine: ShaftView, output: ShaftView, joint: &GearJoint, h: f64) -> f64 {
    if h <= 0.0 {
        return 0.0;
    }
    let w = effective_inverse_mass(&engine, &output, joint);
    if w <= 0.0 {
        return 0.0;
    }

    let c = (engine.theta - engine.prev_theta) - joint.ratio * (output.theta - output.prev_theta);
    let alpha = joint.compliance / (h * h);
    let lambda = -c / (w + alpha);

    symmetric_clamp(lambda, joint.max_torque_nm * h * h)
}

/// Velocity impulse damping the relative slip (N·m·s). Zero for a
/// zero-length step or an undamped joint.
pub fn velocity_impulse(engine: ShaftView, output: ShaftView, joint: &GearJoint, h: f64) -> f64 {
    if h <= 0.0 || joint.damping_per_s <= 0.0 {
        return 0.0;
    }
    let w = effective_inverse_mass(&engine, &output, joint);
    if w <= 0.0 {
        return 0.0;
    }

    let slip = engine.omega - joint.ratio * output.omega;
    let fraction = (joint.damping_per_s * h).min(1.0);
    let impulse = -slip / w * fraction;

    symmetric_clamp(impulse, joint.max_torque_nm * h)
}

/// Output shaft's share of a multiplier or impulse.
pub fn output_correction(output: &ShaftView, joint: &GearJoint, lambda: f64) -> f64 {
    -joint.ratio * output.inv_inertia * lambda
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rigid(ratio: f64) -> GearJoint {
        GearJoint {
            ratio,
            compliance: 0.0,
            max_torque_nm: 1.0e9,
            damping_per_s: 0.0,
        }
    }

    fn moving(delta: f64, omega: f64, inv_inertia: f64) -> ShaftView {
        ShaftView {
            theta: delta,
            prev_theta: 0.0,
            omega,
            inv_inertia,
        }
    }

    fn residual(engine: &ShaftView, output: &ShaftView, ratio: f64) -> f64 {
        (engine.theta - engine.prev_theta) - ratio * (output.theta - output.prev_theta)
    }

    #[test]
    fn rigid_joint_solved_in_one_combined_step() {
        let joint = rigid(3.0);
        let mut engine = moving(0.3, 300.0, 5.0);
        let mut output = moving(0.05, 50.0, 0.1);
        let h = 0.001;

        let lambda = position_lambda(engine, output, &joint, h);
        engine.theta += engine.inv_inertia * lambda;
        output.theta += output_correction(&output, &joint, lambda);

        assert!(residual(&engine, &output, 3.0).abs() < 1e-12);
    }

    #[test]
    fn sequential_shares_shrink_the_residual() {
        let joint = rigid(4.0);
        let mut engine = moving(0.5, 500.0, 5.0);
        let mut output = moving(0.0, 0.0, 0.05);
        let h = 0.001;
        let before = residual(&engine, &output, 4.0).abs();

        let lambda_e = position_lambda(engine, output, &joint, h);
        engine.theta += engine.inv_inertia * lambda_e;
        let lambda_d = position_lambda(engine, output, &joint, h);
        output.theta += output_correction(&output, &joint, lambda_d);

        let after = residual(&engine, &output, 4.0).abs();
        // Residual shrinks by at least a factor of four per sequential pass
        assert!(after <= before / 4.0 + 1e-12);
    }

    #[test]
    fn torque_limit_caps_the_multiplier() {
        let joint = GearJoint {
            max_torque_nm: 100.0,
            ..rigid(2.0)
        };
        let h = 0.01;
        let lambda = position_lambda(moving(1.0, 0.0, 1.0), moving(0.0, 0.0, 1.0), &joint, h);
        assert!((lambda.abs() - 100.0 * h * h).abs() < 1e-12);
    }

    #[test]
    fn compliance_softens_the_correction() {
        let soft = GearJoint {
            compliance: 1.0e-6,
            ..rigid(2.0)
        };
        let h = 0.001;
        let engine = moving(0.2, 0.0, 5.0);
        let output = moving(0.0, 0.0, 0.5);
        let stiff_lambda = position_lambda(engine, output, &rigid(2.0), h);
        let soft_lambda = position_lambda(engine, output, &soft, h);
        assert!(soft_lambda.abs() < stiff_lambda.abs());
        assert!(soft_lambda.signum() == stiff_lambda.signum());
    }

    #[test]
    fn zero_step_is_a_no_op() {
        let joint = rigid(3.0);
        let engine = moving(0.2, 100.0, 5.0);
        let output = moving(0.0, 0.0, 0.1);
        assert_eq!(position_lambda(engine, output, &joint, 0.0), 0.0);
        assert_eq!(velocity_impulse(engine, output, &joint, 0.0), 0.0);
    }

    #[test]
    fn damping_removes_slip() {
        let joint = GearJoint {
            damping_per_s: 1.0e6,
            ..rigid(2.0)
        };
        let mut engine = moving(0.0, 200.0, 5.0);
        let mut output = moving(0.0, 50.0, 0.5);
        let p = velocity_impulse(engine, output, &joint, 0.001);
        engine.omega += engine.inv_inertia * p;
        output.omega += output_correction(&output, &joint, p);
        assert!((engine.omega - 2.0 * output.omega).abs() < 1e-9);
    }

    #[test]
    fn undamped_joint_leaves_velocities() {
        let joint = rigid(2.0);
        assert_eq!(
            velocity_impulse(moving(0.0, 200.0, 5.0), moving(0.0, 0.0, 0.5), &joint, 0.001),
            0.0
        );
    }
}
