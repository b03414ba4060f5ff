#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for differential-drive path prediction."]
#![doc = ""]
#![doc = "Poses are field-relative inches with compass headings in degrees: 0 points along +y,"]
#![doc = "90 along +x, and headings grow clockwise. The helpers here convert commanded voltages"]
#![doc = "into wheel velocities and integrate straight and arc motion between logged waypoints."]

use core::f64::consts::PI;
use core::fmt;
use libm::{atan2, cos, fabs, fmod, sin, sqrt};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::KinematicsError;

/// Full-scale magnitude of a drive voltage command.
pub const VOLTAGE_SCALE: f64 = 127.0;

/// Normalize a heading in degrees into `[0, 360)`.
pub fn normalize_heading(degrees: f64) -> f64 {
    let a = fmod(degrees, 360.0);
    let a = if a < 0.0 { a + 360.0 } else { a };
    // -1e-14 + 360.0 rounds to exactly 360.0
    if a >= 360.0 { 0.0 } else { a }
}

/// Signed turn in degrees from `current` to `target`, in `(-180, 180]`.
///
/// A negative value means the short way round is counter-clockwise.
pub fn shortest_delta(target: f64, current: f64) -> f64 {
    let delta = normalize_heading(target - current);
    if delta > 180.0 { delta - 360.0 } else { delta }
}

/// Travel direction of the robot along its heading.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Intake side first.
    #[default]
    Forward,
    /// Back of the robot first.
    Reverse,
}

impl Direction {
    /// `1.0` for forward travel, `-1.0` for reverse.
    pub const fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }

    /// Direction implied by the sign of a travel distance.
    pub fn of_distance(distance: f64) -> Self {
        if distance < 0.0 { Direction::Reverse } else { Direction::Forward }
    }
}

/// A field pose `(x, y, θ)` in inches and compass degrees.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// Field x position (in).
    pub x: f64,
    /// Field y position (in).
    pub y: f64,
    /// Heading (deg), normalized to `[0, 360)` by every operation in this crate.
    pub theta: f64,
}

impl Pose {
    /// Construct a new pose. The heading is normalized.
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Pose { x, y, theta: normalize_heading(theta) }
    }

    /// Same position, different heading.
    pub fn with_heading(self, theta: f64) -> Self {
        Pose::new(self.x, self.y, theta)
    }

    /// Euclidean planar distance to `other`.
    pub fn distance_to(&self, other: &Pose) -> f64 {
        distance(self, other)
    }

    /// Mirror the pose for the opposite alliance's starting side.
    ///
    /// Position is reflected through the field centre and the heading is
    /// complemented, with 0 and 180 swapped.
    pub fn mirrored(&self) -> Pose {
        let heading = normalize_heading(self.theta);
        let theta = if heading == 0.0 {
            180.0
        } else if heading == 180.0 {
            0.0
        } else {
            360.0 - heading
        };
        Pose::new(-self.x, -self.y, theta)
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {:.2}, y: {:.2}, θ: {:.2}°)", self.x, self.y, self.theta)
    }
}

/// Euclidean planar distance between two poses.
pub fn distance(from: &Pose, to: &Pose) -> f64 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    sqrt(dx * dx + dy * dy)
}

/// Compass bearing from `from` to `to`.
///
/// Reverse travel faces the back of the robot at the target, so the bearing is
/// offset by 180 degrees.
pub fn heading_toward(from: &Pose, to: &Pose, direction: Direction) -> f64 {
    let offset = match direction {
        Direction::Forward => 0.0,
        Direction::Reverse => 180.0,
    };
    let bearing = atan2(to.x - from.x, to.y - from.y) * 180.0 / PI;
    normalize_heading(bearing + offset)
}

/// Time to cover `distance` at `velocity`.
///
/// A zero velocity describes a segment with no commanded motion; it is treated
/// as instantaneous and yields `0.0`.
pub fn travel_time(distance: f64, velocity: f64) -> f64 {
    if velocity == 0.0 { 0.0 } else { distance / velocity }
}

/// Move `pose` by `distance` along its own heading. Negative distances drive backwards.
pub fn advance_straight(pose: Pose, distance: f64) -> Pose {
    let rad = pose.theta * PI / 180.0;
    Pose {
        x: pose.x + distance * sin(rad),
        y: pose.y + distance * cos(rad),
        theta: pose.theta,
    }
}

/// Physical parameters of a tank drivetrain.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveModel {
    /// Output speed of the drive at full voltage (rpm).
    drive_rpm: f64,
    /// Drive wheel diameter (in).
    wheel_diameter: f64,
    /// Distance between the left and right wheel contact lines (in).
    track_width: f64,
}

impl DriveModel {
    /// Construct a new drive model.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidDriveRpm)` if `drive_rpm` is not positive.
    /// Returns `Err(KinematicsError::InvalidWheelDiameter)` if `wheel_diameter` is not positive.
    /// Returns `Err(KinematicsError::InvalidTrackWidth)` if `track_width` is not positive.
    pub fn new(drive_rpm: f64, wheel_diameter: f64, track_width: f64) -> Result<Self, KinematicsError> {
        if !(drive_rpm > 0.0 && drive_rpm.is_finite()) {
            return Err(KinematicsError::InvalidDriveRpm("must be positive"));
        }
        if !(wheel_diameter > 0.0 && wheel_diameter.is_finite()) {
            return Err(KinematicsError::InvalidWheelDiameter("must be positive"));
        }
        if !(track_width > 0.0 && track_width.is_finite()) {
            return Err(KinematicsError::InvalidTrackWidth("must be positive"));
        }
        Ok(DriveModel { drive_rpm, wheel_diameter, track_width })
    }

    /// Returns the drive rpm at full voltage.
    pub fn drive_rpm(&self) -> f64 {
        self.drive_rpm
    }

    /// Returns the wheel diameter.
    pub fn wheel_diameter(&self) -> f64 {
        self.wheel_diameter
    }

    /// Returns the track width.
    pub fn track_width(&self) -> f64 {
        self.track_width
    }

    /// Linear surface speed (in/s) of a wheel commanded at `voltage` on the ±127 scale.
    pub fn wheel_velocity(&self, voltage: f64) -> f64 {
        2.0 * PI * (voltage / VOLTAGE_SCALE * self.drive_rpm) * self.wheel_diameter / 120.0
    }

    /// Rate of heading change (rad/s, clockwise positive) for the given side velocities.
    pub fn angular_velocity(&self, v_left: f64, v_right: f64) -> f64 {
        (v_left - v_right) / self.track_width
    }

    /// Signed radius of the arc traced by the robot centre, `None` when driving straight.
    pub fn turn_radius(&self, v_left: f64, v_right: f64) -> Option<f64> {
        if v_left == v_right {
            return None;
        }
        Some((v_left + v_right) / (v_left - v_right) * (self.track_width / 2.0))
    }

    /// Integrate constant side velocities for `dt` seconds starting at `pose`.
    ///
    /// Equal velocities take the straight-line branch. Otherwise the robot
    /// follows a circular arc and the translation is the chord of that arc.
    /// `dt` may be negative to run the arc backwards.
    pub fn advance_arc(&self, pose: Pose, v_left: f64, v_right: f64, dt: f64) -> Pose {
        let Some(radius) = self.turn_radius(v_left, v_right) else {
            return advance_straight(pose, v_left * dt);
        };
        let start = pose.theta * PI / 180.0;
        let end = start + self.angular_velocity(v_left, v_right) * dt;

        Pose {
            x: pose.x + radius * (cos(start) - cos(end)),
            y: pose.y + radius * (sin(end) - sin(start)),
            theta: normalize_heading(end * 180.0 / PI),
        }
    }

    /// Heading swept (deg) in `dt` seconds; always non-negative.
    pub fn heading_step(&self, v_left: f64, v_right: f64, dt: f64) -> f64 {
        fabs(self.angular_velocity(v_left, v_right) * dt * 180.0 / PI)
    }
}

impl fmt::Display for DriveModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DriveModel (rpm: {:.0}, wheel: {:.2} in, track: {:.2} in)",
            self.drive_rpm, self.wheel_diameter, self.track_width
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-6;

    fn model() -> DriveModel {
        DriveModel::new(450.0, 3.25, 12.0).unwrap()
    }

    fn assert_pose_eq(a: Pose, b: Pose) {
        assert!((a.x - b.x).abs() < EPSILON, "x: {} != {}", a.x, b.x);
        assert!((a.y - b.y).abs() < EPSILON, "y: {} != {}", a.y, b.y);
        assert!(shortest_delta(a.theta, b.theta).abs() < EPSILON, "θ: {} != {}", a.theta, b.theta);
    }

    #[test]
    fn test_heading_normalization() {
        assert!((normalize_heading(-10.0) - 350.0).abs() < EPSILON);
        assert!((normalize_heading(370.0) - 10.0).abs() < EPSILON);
        assert_eq!(normalize_heading(360.0), 0.0);
        assert_eq!(normalize_heading(-360.0), 0.0);
        assert!((normalize_heading(-725.0) - 355.0).abs() < EPSILON);
        let tiny = normalize_heading(-1e-15);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn test_shortest_delta() {
        assert!((shortest_delta(10.0, 350.0) - 20.0).abs() < EPSILON);
        assert!((shortest_delta(350.0, 10.0) - (-20.0)).abs() < EPSILON);
        assert!((shortest_delta(90.0, 0.0) - 90.0).abs() < EPSILON);
        // Half a turn counts as clockwise
        assert!((shortest_delta(180.0, 0.0) - 180.0).abs() < EPSILON);
        assert!((shortest_delta(0.0, 180.0) - 180.0).abs() < EPSILON);
    }

    #[test]
    fn test_heading_toward() {
        let origin = Pose::new(0.0, 0.0, 45.0);
        let north = Pose::new(0.0, 10.0, 0.0);
        let east = Pose::new(10.0, 0.0, 0.0);
        assert!(heading_toward(&origin, &north, Direction::Forward).abs() < EPSILON);
        assert!((heading_toward(&origin, &east, Direction::Forward) - 90.0).abs() < EPSILON);

        let target = Pose::new(-3.0, 7.0, 0.0);
        let forward = heading_toward(&origin, &target, Direction::Forward);
        let reverse = heading_toward(&origin, &target, Direction::Reverse);
        assert!((reverse - normalize_heading(forward + 180.0)).abs() < EPSILON);
        assert!((0.0..360.0).contains(&forward));
    }

    #[test]
    fn test_distance() {
        let a = Pose::new(1.0, 1.0, 0.0);
        let b = Pose::new(4.0, 5.0, 90.0);
        assert!((distance(&a, &b) - 5.0).abs() < EPSILON);
        assert!((a.distance_to(&b) - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_advance_straight_round_trip() {
        let cases = [
            (Pose::new(0.0, 0.0, 0.0), 24.0),
            (Pose::new(-12.5, 40.0, 135.0), -17.25),
            (Pose::new(3.0, -8.0, 271.3), 0.5),
        ];
        for (pose, d) in cases {
            let there = advance_straight(pose, d);
            let back = advance_straight(there, -d);
            assert_pose_eq(back, pose);
        }
    }

    #[test]
    fn test_advance_straight_follows_compass() {
        let north = advance_straight(Pose::new(0.0, 0.0, 0.0), 24.0);
        assert_pose_eq(north, Pose::new(0.0, 24.0, 0.0));
        let east = advance_straight(Pose::new(0.0, 0.0, 90.0), 10.0);
        assert_pose_eq(east, Pose::new(10.0, 0.0, 90.0));
        let reversed = advance_straight(Pose::new(0.0, 0.0, 0.0), -6.0);
        assert_pose_eq(reversed, Pose::new(0.0, -6.0, 0.0));
    }

    #[test]
    fn test_wheel_velocity() {
        let model = model();
        // Full voltage: π · rpm · diameter / 60
        let expected = PI * 450.0 * 3.25 / 60.0;
        assert!((model.wheel_velocity(127.0) - expected).abs() < EPSILON);
        assert!((model.wheel_velocity(-63.5) + expected / 2.0).abs() < EPSILON);
        assert_eq!(model.wheel_velocity(0.0), 0.0);
    }

    #[test]
    fn test_travel_time() {
        assert!((travel_time(24.0, 12.0) - 2.0).abs() < EPSILON);
        assert_eq!(travel_time(24.0, 0.0), 0.0);
        assert!(travel_time(-6.0, 12.0) < 0.0);
    }

    #[test]
    fn test_drive_model_constructor() {
        let model = model();
        assert_eq!(model.drive_rpm(), 450.0);
        assert_eq!(model.wheel_diameter(), 3.25);
        assert_eq!(model.track_width(), 12.0);
    }

    #[test]
    fn test_drive_model_invalid_parameters() {
        assert!(matches!(DriveModel::new(0.0, 3.25, 12.0), Err(KinematicsError::InvalidDriveRpm(_))));
        assert!(matches!(DriveModel::new(450.0, -1.0, 12.0), Err(KinematicsError::InvalidWheelDiameter(_))));
        assert!(matches!(DriveModel::new(450.0, 3.25, 0.0), Err(KinematicsError::InvalidTrackWidth(_))));
        assert!(matches!(DriveModel::new(f64::NAN, 3.25, 12.0), Err(KinematicsError::InvalidDriveRpm(_))));
    }

    #[test]
    fn test_advance_arc_equal_speeds_is_straight() {
        let model = model();
        let start = Pose::new(2.0, 3.0, 30.0);
        let arc = model.advance_arc(start, 20.0, 20.0, 1.5);
        assert_pose_eq(arc, advance_straight(start, 30.0));
        assert!(model.turn_radius(20.0, 20.0).is_none());
    }

    #[test]
    fn test_advance_arc_pivot_keeps_position() {
        let model = model();
        let start = Pose::new(5.0, -5.0, 0.0);
        // Left forward, right back: clockwise spin in place
        let dt = (PI / 2.0) / model.angular_velocity(10.0, -10.0);
        let end = model.advance_arc(start, 10.0, -10.0, dt);
        assert_pose_eq(end, Pose::new(5.0, -5.0, 90.0));
    }

    #[test]
    fn test_advance_arc_quarter_swing() {
        let model = model();
        let half_track = model.track_width() / 2.0;
        // Right side locked, left side driving: pivot about the right wheel
        let omega = model.angular_velocity(12.0, 0.0);
        let dt = (PI / 2.0) / omega;
        let end = model.advance_arc(Pose::new(0.0, 0.0, 0.0), 12.0, 0.0, dt);
        assert_pose_eq(end, Pose::new(half_track, half_track, 90.0));

        // Mirror image: left side locked turns counter-clockwise
        let omega = model.angular_velocity(0.0, 12.0);
        let dt = (-PI / 2.0) / omega;
        let end = model.advance_arc(Pose::new(0.0, 0.0, 0.0), 0.0, 12.0, dt);
        assert_pose_eq(end, Pose::new(-half_track, half_track, 270.0));
    }

    #[test]
    fn test_advance_arc_negative_time_reverses() {
        let model = model();
        let start = Pose::new(1.0, 2.0, 45.0);
        let forward = model.advance_arc(start, 30.0, 10.0, 0.4);
        let back = model.advance_arc(forward, 30.0, 10.0, -0.4);
        assert_pose_eq(back, start);
    }

    #[test]
    fn test_heading_step() {
        let model = model();
        let step = model.heading_step(-10.0, 10.0, 0.5);
        let expected = 20.0 / 12.0 * 0.5 * 180.0 / PI;
        assert!((step - expected).abs() < EPSILON);
        assert!(model.heading_step(10.0, -10.0, -0.5) > 0.0);
    }

    #[test]
    fn test_mirrored() {
        let flipped = Pose::new(10.0, 5.0, 30.0).mirrored();
        assert_pose_eq(flipped, Pose::new(-10.0, -5.0, 330.0));
        let flipped = Pose::new(10.0, 5.0, 0.0).mirrored();
        assert_eq!(flipped.theta, 180.0);
        assert_eq!((flipped.x, flipped.y), (-10.0, -5.0));
        let flipped = Pose::new(10.0, 5.0, 180.0).mirrored();
        assert_eq!(flipped.theta, 0.0);
    }

    #[test]
    fn test_direction() {
        assert_eq!(Direction::Forward.sign(), 1.0);
        assert_eq!(Direction::Reverse.sign(), -1.0);
        assert_eq!(Direction::of_distance(-3.0), Direction::Reverse);
        assert_eq!(Direction::of_distance(0.0), Direction::Forward);
    }
}
