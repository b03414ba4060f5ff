//! This module defines the error types used by the `autonpath-routine` crate.

use autonpath_kinematics::KinematicsError;
use thiserror::Error;

/// Error type for routine recording and path preview setup.
///
/// Degenerate motion inside a routine is never an error: it is logged and the
/// prediction falls back to a defined pose. These variants cover the
/// configuration and lookup mistakes a caller can actually act on.
#[derive(Debug, Error, PartialEq)]
pub enum RoutineError {
    /// The drivetrain parameters were rejected by the kinematics model.
    #[error("invalid drive model: {0}")]
    Kinematics(#[from] KinematicsError),
    /// The densification step must be a positive, finite distance.
    #[error("invalid lookahead step: {0}")]
    InvalidLookahead(f64),
    /// Densification needs at least one iteration per segment.
    #[error("iteration budget must be at least 1")]
    InvalidIterationBudget,
    /// A routine with this name is already registered.
    #[error("routine '{0}' is already registered")]
    DuplicateRoutine(String),
    /// No routine is registered under this name.
    #[error("no routine named '{0}'")]
    UnknownRoutine(String),
    /// The selector index is past the end of the registry.
    #[error("routine index {index} out of range for {len} routines")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of registered routines.
        len: usize,
    },
}
