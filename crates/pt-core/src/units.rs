// pt-core/src/units.rs

use uom::si::f64::{
    AngularVelocity as UomAngularVelocity, Length as UomLength, Mass as UomMass,
    Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type AngularVelocity = UomAngularVelocity;
pub type Length = UomLength;
pub type Mass = UomMass;
pub type Velocity = UomVelocity;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn rpm(v: f64) -> AngularVelocity {
    use uom::si::angular_velocity::revolution_per_minute;
    AngularVelocity::new::<revolution_per_minute>(v)
}

#[inline]
pub fn rad_per_s(v: f64) -> AngularVelocity {
    use uom::si::angular_velocity::radian_per_second;
    AngularVelocity::new::<radian_per_second>(v)
}

/// Angular speed in rad/s expressed as revolutions per minute.
#[inline]
pub fn rad_per_s_to_rpm(omega: f64) -> f64 {
    use uom::si::angular_velocity::revolution_per_minute;
    rad_per_s(omega).get::<revolution_per_minute>()
}

/// Revolutions per minute expressed as rad/s.
#[inline]
pub fn rpm_to_rad_per_s(v: f64) -> f64 {
    use uom::si::angular_velocity::radian_per_second;
    rpm(v).get::<radian_per_second>()
}

/// Display speed in km/h for a value in mph.
#[inline]
pub fn mph_to_kph(v: f64) -> f64 {
    use uom::si::velocity::{kilometer_per_hour, mile_per_hour};
    Velocity::new::<mile_per_hour>(v).get::<kilometer_per_hour>()
}

/// Fixed conversion factors used by the dashboard speed readout.
///
/// These are the rounded shop-manual values, not uom's exact definitions, so
/// the readout matches the tuning it was calibrated against.
pub mod constants {
    pub const INCHES_PER_METER: f64 = 39.3701;
    pub const INCHES_PER_MILE: f64 = 63_360.0;
    pub const MINUTES_PER_HOUR: f64 = 60.0;
}
