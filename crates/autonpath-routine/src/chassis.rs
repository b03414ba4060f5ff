//! The drivetrain controller capability the motion wrappers dispatch to.
//!
//! The PID and pure-pursuit implementations live outside this crate; anything
//! that can run these primitives and report an odometry estimate can drive a
//! routine.

use std::time::Duration;

use autonpath_kinematics::{Direction, Pose};

use crate::coordinate::TurnBehavior;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Competition state that gates hardware dispatch.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchState {
    /// Robot disabled, or a dry run for path preview.
    #[default]
    Disabled,
    /// Autonomous using the PID drive and turn primitives.
    AutoPid,
    /// Autonomous using odometry moves.
    AutoOdom,
    /// Operator control.
    Driver,
}

impl MatchState {
    /// True in either autonomous state.
    pub fn is_autonomous(self) -> bool {
        matches!(self, MatchState::AutoPid | MatchState::AutoOdom)
    }

    /// True whenever the robot is not disabled.
    pub fn is_enabled(self) -> bool {
        self != MatchState::Disabled
    }
}

/// Exit condition for a blocking motion wait.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitKind {
    /// Wait until the motion fully settles.
    #[default]
    Settle,
    /// Exit as soon as the error is small.
    Quick,
    /// Exit early so the next motion chains into this one.
    Chain,
}

/// Partial-progress condition for [`Chassis::wait_until`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaitUntil {
    /// Travelled distance along the current drive motion (in).
    Distance(f64),
    /// Heading reached during the current turn (deg).
    Angle(f64),
    /// Position reached during the current odometry move.
    Point {
        /// Field x (in).
        x: f64,
        /// Field y (in).
        y: f64,
    },
}

/// Which side drives during a swing turn.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingSide {
    /// Left side drives, right side holds the opposite speed.
    Left,
    /// Right side drives, left side holds the opposite speed.
    Right,
}

/// Drivetrain controller consumed by [`crate::RoutineContext`].
///
/// Motion calls start a motion and return immediately; [`Chassis::wait`] and
/// [`Chassis::wait_until`] block on completion.
pub trait Chassis {
    /// Seed the odometry estimate.
    fn set_pose(&mut self, pose: Pose);

    /// Current odometry estimate.
    fn pose(&self) -> Pose;

    /// Straight drive using the encoder PID.
    fn pid_drive(&mut self, distance: f64, speed: f64, slew: bool);

    /// Straight drive using odometry heading hold.
    fn odom_drive(&mut self, distance: f64, speed: f64, slew: bool);

    /// Turn in place to an absolute heading.
    fn turn_to_heading(&mut self, theta: f64, speed: f64, behavior: TurnBehavior);

    /// Swing about one side to an absolute heading.
    fn swing(&mut self, side: SwingSide, theta: f64, main_speed: f64, opp_speed: f64, behavior: TurnBehavior);

    /// Pure-pursuit move to a field position.
    fn move_to_point(&mut self, target: Pose, direction: Direction, speed: f64);

    /// Boomerang move to a field position and heading.
    fn move_to_pose(&mut self, target: Pose, direction: Direction, speed: f64);

    /// Block until the active motion exits.
    fn wait(&mut self, kind: WaitKind);

    /// Block until the active motion passes a partial-progress mark.
    fn wait_until(&mut self, until: WaitUntil);

    /// Plain timed delay.
    fn delay(&mut self, duration: Duration) {
        spin_sleep::sleep(duration);
    }
}

/// A chassis with no hardware behind it, used for dry runs.
///
/// Every command is dropped; the pose stays wherever it was last seeded.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineChassis {
    pose: Pose,
}

impl Chassis for OfflineChassis {
    fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    fn pose(&self) -> Pose {
        self.pose
    }

    fn pid_drive(&mut self, _distance: f64, _speed: f64, _slew: bool) {}

    fn odom_drive(&mut self, _distance: f64, _speed: f64, _slew: bool) {}

    fn turn_to_heading(&mut self, _theta: f64, _speed: f64, _behavior: TurnBehavior) {}

    fn swing(&mut self, _side: SwingSide, _theta: f64, _main_speed: f64, _opp_speed: f64, _behavior: TurnBehavior) {}

    fn move_to_point(&mut self, _target: Pose, _direction: Direction, _speed: f64) {}

    fn move_to_pose(&mut self, _target: Pose, _direction: Direction, _speed: f64) {}

    fn wait(&mut self, _kind: WaitKind) {}

    fn wait_until(&mut self, _until: WaitUntil) {}

    fn delay(&mut self, _duration: Duration) {}
}
