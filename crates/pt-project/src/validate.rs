//! Configuration validation logic.

use crate::schema::{
    Configuration, DrivetrainConfig, EngineConfig, LATEST_VERSION, SoundConfig, VehicleDef,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Empty list: {field}")]
    Empty { field: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_configuration(config: &Configuration) -> Result<(), ValidationError> {
    if config.version == 0 || config.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }

    validate_engine(&config.engine)?;
    validate_drivetrain(&config.drivetrain)?;
    validate_sounds(&config.sounds)?;
    if let Some(vehicle) = &config.vehicle {
        validate_vehicle(vehicle)?;
    }
    Ok(())
}

pub fn validate_engine(engine: &EngineConfig) -> Result<(), ValidationError> {
    positive("engine.inertia_kg_m2", engine.inertia_kg_m2)?;
    positive("engine.idle_rpm", engine.idle_rpm)?;
    positive("engine.redline_rpm", engine.redline_rpm)?;
    if engine.redline_rpm <= engine.idle_rpm {
        return Err(invalid(
            "engine.redline_rpm",
            engine.redline_rpm,
            "must be above idle_rpm",
        ));
    }
    non_negative("engine.limiter_cut_s", engine.limiter_cut_s)?;
    non_negative("engine.friction_nm_s_per_rad", engine.friction_nm_s_per_rad)?;
    positive("engine.throttle_tau_s", engine.throttle_tau_s)?;
    positive(
        "engine.throttle_rate_limit_per_s",
        engine.throttle_rate_limit_per_s,
    )?;
    unit_interval("engine.idle_throttle", engine.idle_throttle)?;

    if engine.torque_curve.is_empty() {
        return Err(ValidationError::Empty {
            field: "engine.torque_curve".to_string(),
        });
    }
    for point in &engine.torque_curve {
        non_negative("engine.torque_curve.rpm", point.rpm)?;
        finite("engine.torque_curve.torque_nm", point.torque_nm)?;
    }
    for pair in engine.torque_curve.windows(2) {
        if pair[1].rpm <= pair[0].rpm {
            return Err(invalid(
                "engine.torque_curve.rpm",
                pair[1].rpm,
                "points must be sorted by strictly increasing rpm",
            ));
        }
    }
    Ok(())
}

pub fn validate_drivetrain(drivetrain: &DrivetrainConfig) -> Result<(), ValidationError> {
    if drivetrain.gear_ratios.is_empty() {
        return Err(ValidationError::Empty {
            field: "drivetrain.gear_ratios".to_string(),
        });
    }
    for &ratio in &drivetrain.gear_ratios {
        positive("drivetrain.gear_ratios", ratio)?;
    }
    positive("drivetrain.final_drive", drivetrain.final_drive)?;
    positive("drivetrain.inertia_kg_m2", drivetrain.inertia_kg_m2)?;
    positive(
        "drivetrain.output_inertia_kg_m2",
        drivetrain.output_inertia_kg_m2,
    )?;
    non_negative(
        "drivetrain.clutch_max_torque_nm",
        drivetrain.clutch_max_torque_nm,
    )?;
    non_negative("drivetrain.clutch_compliance", drivetrain.clutch_compliance)?;
    non_negative(
        "drivetrain.clutch_damping_per_s",
        drivetrain.clutch_damping_per_s,
    )?;
    non_negative("drivetrain.drag_nm_s_per_rad", drivetrain.drag_nm_s_per_rad)?;
    Ok(())
}

pub fn validate_sounds(sounds: &SoundConfig) -> Result<(), ValidationError> {
    for sample in &sounds.samples {
        if sample.name.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "sounds.samples.name".to_string(),
                value: format!("{:?}", sample.name),
                reason: "must not be blank".to_string(),
            });
        }
        positive("sounds.samples.rpm", sample.rpm)?;
        non_negative("sounds.samples.volume", sample.volume)?;
    }
    Ok(())
}

pub fn validate_vehicle(vehicle: &VehicleDef) -> Result<(), ValidationError> {
    positive("vehicle.mass_kg", vehicle.mass_kg)?;
    positive("vehicle.wheel_radius_m", vehicle.wheel_radius_m)?;
    Ok(())
}

fn invalid(field: &str, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be finite"))
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be non-negative"))
    }
}

fn unit_interval(field: &str, value: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, value, "must be within [0, 1]"))
    }
}
