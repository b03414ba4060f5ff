//! Logged waypoints and the path log they compose into.

use std::fmt;
use std::time::Duration;

use autonpath_kinematics::{DriveModel, Pose, normalize_heading};

use crate::inject::{InjectionConfig, inject_path};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sentinel stored in [`Coordinate::left`] to mark a timed pause.
///
/// A pause point carries its duration in milliseconds in [`Coordinate::right`].
pub const KEY: f64 = 267267.0;

/// How a turn picks its spin direction.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnBehavior {
    /// Heading increases.
    Clockwise,
    /// Heading decreases.
    CounterClockwise,
    /// Whichever way covers the smaller angle.
    #[default]
    Shortest,
    /// Follow the unwrapped numeric difference between target and current heading.
    Raw,
}

/// A predicted pose plus the commanded side speeds of the segment ending at it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
    /// Field x position (in).
    pub x: f64,
    /// Field y position (in).
    pub y: f64,
    /// Heading (deg), always in `[0, 360)`.
    pub t: f64,
    /// Left side voltage, or [`KEY`] for a pause.
    pub left: f64,
    /// Right side voltage, or the pause length in milliseconds.
    pub right: f64,
    /// Direction tag of the segment.
    pub behavior: TurnBehavior,
}

impl Coordinate {
    /// A stationary point with no commanded motion.
    pub fn new(x: f64, y: f64, t: f64) -> Self {
        Coordinate {
            x,
            y,
            t: normalize_heading(t),
            ..Default::default()
        }
    }

    /// Build a point from a pose, keeping the speeds and tag of `self`.
    pub fn at(self, pose: Pose) -> Self {
        Coordinate {
            x: pose.x,
            y: pose.y,
            t: normalize_heading(pose.theta),
            ..self
        }
    }

    /// A pause of `millis` milliseconds at `pose`.
    pub fn pause(pose: Pose, millis: u64) -> Self {
        Coordinate {
            left: KEY,
            right: millis as f64,
            behavior: TurnBehavior::Raw,
            ..Coordinate::default()
        }
        .at(pose)
    }

    /// Same pose with new side speeds.
    pub fn with_speeds(self, left: f64, right: f64) -> Self {
        Coordinate { left, right, ..self }
    }

    /// Same pose and speeds with a new direction tag.
    pub fn with_behavior(self, behavior: TurnBehavior) -> Self {
        Coordinate { behavior, ..self }
    }

    /// The spatial part of the point.
    pub fn pose(&self) -> Pose {
        Pose::new(self.x, self.y, self.t)
    }

    /// True when this point is a timed pause rather than a motion.
    pub fn is_pause(&self) -> bool {
        self.left == KEY
    }

    /// Length of the pause, `None` for motion points.
    pub fn pause_duration(&self) -> Option<Duration> {
        self.is_pause()
            .then(|| Duration::from_millis(self.right.max(0.0) as u64))
    }

    /// Mirror the point for the opposite alliance, keeping speeds and tag.
    pub fn mirrored(&self) -> Self {
        self.at(self.pose().mirrored())
    }
}

impl From<Pose> for Coordinate {
    fn from(pose: Pose) -> Self {
        Coordinate::new(pose.x, pose.y, pose.theta)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_pause() {
            write!(f, "({:.2}, {:.2}) wait {} ms", self.x, self.y, self.right)
        } else {
            write!(
                f,
                "({:.2}, {:.2}) θ {:.2}° [L {:.0} R {:.0}]",
                self.x, self.y, self.t, self.left, self.right
            )
        }
    }
}

/// The finished, ordered log of one routine execution.
///
/// Produced by [`crate::RoutineContext::finish`]; immutable from then on so the
/// preview side can share it freely.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathLog {
    points: Vec<Coordinate>,
}

impl PathLog {
    /// Wrap an already recorded sequence.
    pub fn from_points(points: Vec<Coordinate>) -> Self {
        PathLog { points }
    }

    /// Logged points in command order.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Number of logged points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when nothing was logged.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Heading the robot must be placed at before the routine starts.
    pub fn start_heading(&self) -> Option<f64> {
        self.points.first().map(|p| p.t)
    }

    /// Last logged point.
    pub fn last(&self) -> Option<&Coordinate> {
        self.points.last()
    }

    /// Lazily densify the log for animation. Recomputed on every call.
    pub fn densify<'a>(
        &'a self,
        model: &'a DriveModel,
        config: &'a InjectionConfig,
    ) -> impl Iterator<Item = Coordinate> + 'a {
        inject_path(&self.points, model, config)
    }

    /// Printable densified path, framed like the log's own print.
    pub fn densified<'a>(&'a self, model: &'a DriveModel, config: &'a InjectionConfig) -> DensifiedPath<'a> {
        DensifiedPath { log: self, model, config }
    }
}

fn write_framed(f: &mut fmt::Formatter<'_>, points: impl Iterator<Item = Coordinate>) -> fmt::Result {
    writeln!(f, "===========================================")?;
    for point in points {
        writeln!(f, "({:.2}, {:.2})", point.x, point.y)?;
    }
    write!(f, "===========================================")
}

impl fmt::Display for PathLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_framed(f, self.points.iter().copied())
    }
}

/// Display adapter returned by [`PathLog::densified`]; densifies on every format.
#[derive(Debug, Clone, Copy)]
pub struct DensifiedPath<'a> {
    log: &'a PathLog,
    model: &'a DriveModel,
    config: &'a InjectionConfig,
}

impl fmt::Display for DensifiedPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_framed(f, self.log.densify(self.model, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-6;

    #[test]
    fn test_coordinate_normalizes_heading() {
        let point = Coordinate::new(1.0, 2.0, -90.0);
        assert!((point.t - 270.0).abs() < EPSILON);
        assert!(!point.is_pause());
        assert_eq!(point.pause_duration(), None);
    }

    #[test]
    fn test_pause_point() {
        let pause = Coordinate::pause(Pose::new(4.0, 5.0, 90.0), 750);
        assert!(pause.is_pause());
        assert_eq!(pause.left, KEY);
        assert_eq!(pause.pause_duration(), Some(Duration::from_millis(750)));
        assert_eq!((pause.x, pause.y, pause.t), (4.0, 5.0, 90.0));
    }

    #[test]
    fn test_at_keeps_speeds() {
        let point = Coordinate::new(0.0, 0.0, 0.0)
            .with_speeds(90.0, -90.0)
            .with_behavior(TurnBehavior::Clockwise)
            .at(Pose::new(3.0, 4.0, 450.0));
        assert_eq!((point.left, point.right), (90.0, -90.0));
        assert_eq!(point.behavior, TurnBehavior::Clockwise);
        assert!((point.t - 90.0).abs() < EPSILON);
    }

    #[test]
    fn test_mirrored_coordinate() {
        let point = Coordinate::new(10.0, 5.0, 30.0).with_speeds(100.0, 100.0);
        let flipped = point.mirrored();
        assert_eq!((flipped.x, flipped.y), (-10.0, -5.0));
        assert!((flipped.t - 330.0).abs() < EPSILON);
        assert_eq!((flipped.left, flipped.right), (100.0, 100.0));

        let flipped = Coordinate::new(10.0, 5.0, 0.0).mirrored();
        assert_eq!((flipped.x, flipped.y, flipped.t), (-10.0, -5.0, 180.0));
    }

    #[test]
    fn test_path_log_accessors() {
        let log = PathLog::from_points(vec![
            Coordinate::new(0.0, 0.0, 45.0),
            Coordinate::new(0.0, 24.0, 45.0).with_speeds(100.0, 100.0),
        ]);
        assert_eq!(log.len(), 2);
        assert!(!log.is_empty());
        assert_eq!(log.start_heading(), Some(45.0));
        assert_eq!(log.last().map(|p| p.y), Some(24.0));
        assert!(PathLog::default().start_heading().is_none());
    }

    #[test]
    fn test_path_log_display() {
        let log = PathLog::from_points(vec![Coordinate::new(1.0, 2.0, 0.0), Coordinate::new(3.5, 4.25, 0.0)]);
        let rendered = log.to_string();
        assert!(rendered.contains("(1.00, 2.00)"));
        assert!(rendered.contains("(3.50, 4.25)"));
        assert_eq!(rendered.lines().count(), 4);
    }

    #[test]
    fn test_densified_display() {
        let model = DriveModel::new(450.0, 3.25, 12.0).unwrap();
        let config = InjectionConfig::default();
        let log = PathLog::from_points(vec![
            Coordinate::new(0.0, 0.0, 0.0),
            Coordinate::new(0.0, 4.0, 0.0).with_speeds(100.0, 100.0),
        ]);
        let rendered = log.densified(&model, &config).to_string();
        assert!(rendered.contains("(0.00, 2.00)"));
        // two frame lines around 0..=4 and the endpoint
        assert_eq!(rendered.lines().count(), 8);
        assert_eq!(log.to_string().lines().count(), 4);
    }
}
