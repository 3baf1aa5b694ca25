//! Rotating shaft advanced by position-based sub-steps.

use crate::error::{ComponentError, ComponentResult};
use pt_core::{AngularVelocity, ensure_finite, ensure_positive, rad_per_s, rad_per_s_to_rpm};
use pt_sim::ShaftView;

/// Rotating shaft with inertia and viscous loss.
///
/// Each sub-step predicts a new angle from the applied torque, leaves room
/// for constraint corrections on `theta`, then derives the velocity back from
/// the corrected angle:
///
/// ```text
/// integrate:  θ_prev = θ
///             ω     += h · (τ + τ_loss) / (I + I_extra)
///             θ     += h · ω
/// update:     ω      = (θ - θ_prev) / h
/// ```
///
/// where τ_loss = -loss_coeff · ω.
#[derive(Clone, Debug)]
pub struct Shaft {
    /// Angle (rad)
    pub theta: f64,
    /// Angle at the start of the current sub-step (rad)
    pub prev_theta: f64,
    /// Angular velocity (rad/s)
    pub omega: f64,
    /// Own moment of inertia (kg·m²)
    inertia: f64,
    /// Viscous friction coefficient (N·m·s/rad)
    loss_coeff: f64,
    /// Inertia coupled on for the current sub-step (kg·m²)
    extra_inertia: f64,
}

impl Shaft {
    /// Create a shaft at rest.
    ///
    /// # Errors
    /// `NonPhysical` for a NaN or infinite argument, `InvalidArg` if inertia
    /// is not positive or the loss coefficient is negative.
    pub fn new(inertia: f64, loss_coeff: f64) -> ComponentResult<Self> {
        let inertia = ensure_positive(inertia, "shaft inertia must be positive")?;
        let loss_coeff = ensure_finite(loss_coeff, "loss coefficient")?;
        if loss_coeff < 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "loss coefficient cannot be negative",
            });
        }

        Ok(Self {
            theta: 0.0,
            prev_theta: 0.0,
            omega: 0.0,
            inertia,
            loss_coeff,
            extra_inertia: 0.0,
        })
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Own inertia plus whatever was coupled on at the last integrate.
    pub fn effective_inertia(&self) -> f64 {
        self.inertia + self.extra_inertia
    }

    pub fn inverse_inertia(&self) -> f64 {
        1.0 / self.effective_inertia()
    }

    /// Friction torque (always opposes motion).
    pub fn friction_torque(&self, omega: f64) -> f64 {
        -self.loss_coeff * omega
    }

    /// Set the angular velocity, keeping the angle.
    pub fn set_rpm(&mut self, rpm: f64) {
        self.omega = pt_core::rpm_to_rad_per_s(rpm);
    }

    /// Predict the end-of-step angle from `torque` applied over `h`.
    ///
    /// `extra_inertia` joins the shaft's own inertia for this sub-step and for
    /// the constraint solves that follow it. Negative or NaN values count as
    /// zero.
    pub fn integrate(&mut self, torque: f64, extra_inertia: f64, h: f64) {
        self.extra_inertia = extra_inertia.max(0.0);
        self.prev_theta = self.theta;

        let net = torque + self.friction_torque(self.omega);
        self.omega += h * net / self.effective_inertia();
        self.theta += h * self.omega;
    }

    /// Derive velocity from the solved angle. A zero-length step keeps it.
    pub fn update(&mut self, h: f64) {
        if h > 0.0 {
            self.omega = (self.theta - self.prev_theta) / h;
        }
    }

    /// Apply an angular impulse-per-inertia computed by a velocity solve.
    pub fn apply_velocity_correction(&mut self, d_omega: f64) {
        self.omega += d_omega;
    }

    pub fn view(&self) -> ShaftView {
        ShaftView {
            theta: self.theta,
            prev_theta: self.prev_theta,
            omega: self.omega,
            inv_inertia: self.inverse_inertia(),
        }
    }

    pub fn angular_velocity(&self) -> AngularVelocity {
        rad_per_s(self.omega)
    }

    pub fn rpm(&self) -> f64 {
        rad_per_s_to_rpm(self.omega)
    }
}
