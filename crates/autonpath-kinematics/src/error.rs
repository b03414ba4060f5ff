//! Error types for the kinematics library.
//!
//! This module defines the errors returned when a drive model is built from
//! physically meaningless parameters.

use core::fmt;

/// Errors that can occur when constructing kinematic models.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Error for an invalid drive motor cartridge speed.
    /// This variant is returned when the RPM is not positive and finite.
    InvalidDriveRpm(&'static str),
    /// Error for an invalid wheel diameter.
    /// This variant is returned when a wheel diameter is provided that is not positive.
    InvalidWheelDiameter(&'static str),
    /// Error for an invalid track width.
    /// This variant is returned when the distance between the drive sides is not positive.
    InvalidTrackWidth(&'static str),
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::InvalidDriveRpm(msg) => write!(f, "Invalid drive rpm: {}", msg),
            KinematicsError::InvalidWheelDiameter(msg) => write!(f, "Invalid wheel diameter: {}", msg),
            KinematicsError::InvalidTrackWidth(msg) => write!(f, "Invalid track width: {}", msg),
        }
    }
}

impl core::error::Error for KinematicsError {}
