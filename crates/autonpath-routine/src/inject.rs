//! Path injection: turns the sparse waypoint log into a dense, evenly stepped
//! sequence of poses by re-simulating the drivetrain between each pair of
//! logged points.

use autonpath_kinematics::{DriveModel, advance_straight, distance, shortest_delta, travel_time};
use tracing::warn;

use crate::coordinate::{Coordinate, TurnBehavior};
use crate::error::RoutineError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Resolution and safety budget of the densification.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InjectionConfig {
    /// Distance (in) travelled by the faster side between two synthesized
    /// points. On straight segments this is also the centre's travel.
    lookahead: f64,
    /// Maximum synthesized points per segment before the segment is truncated.
    max_iterations: usize,
}

impl InjectionConfig {
    /// Iteration budget used by [`InjectionConfig::default`].
    pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

    /// Construct a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `Err(RoutineError::InvalidLookahead)` if `lookahead` is not positive and finite.
    /// Returns `Err(RoutineError::InvalidIterationBudget)` if `max_iterations` is zero.
    pub fn new(lookahead: f64, max_iterations: usize) -> Result<Self, RoutineError> {
        if !(lookahead > 0.0 && lookahead.is_finite()) {
            return Err(RoutineError::InvalidLookahead(lookahead));
        }
        if max_iterations == 0 {
            return Err(RoutineError::InvalidIterationBudget);
        }
        Ok(InjectionConfig { lookahead, max_iterations })
    }

    /// Step distance between synthesized points.
    pub fn lookahead(&self) -> f64 {
        self.lookahead
    }

    /// Per-segment iteration budget.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }
}

impl Default for InjectionConfig {
    fn default() -> Self {
        InjectionConfig {
            lookahead: 1.0,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Synthesize the intermediate poses of the segment from `start` to `end`.
///
/// The segment's commanded speeds, direction tag and target heading are the
/// ones logged on `end`. Every synthesized point carries those speeds so the
/// preview can time it.
///
/// * pause segments yield `end` alone;
/// * segments with no commanded motion are instantaneous and yield `end` alone;
/// * equal side speeds step along a straight line until the logged distance is covered;
/// * anything else steps along the arc until the heading is within one step of the target;
///   an arc shorter than one step yields `end` alone.
///
/// A segment that exceeds the iteration budget is truncated: a warning is
/// logged and `end` is emitted in place of the remaining points.
pub fn inject_point(start: &Coordinate, end: &Coordinate, model: &DriveModel, config: &InjectionConfig) -> Vec<Coordinate> {
    if end.is_pause() {
        return vec![*end];
    }

    let v_left = model.wheel_velocity(end.left);
    let v_right = model.wheel_velocity(end.right);
    if v_left == 0.0 && v_right == 0.0 {
        return vec![*end];
    }

    if v_left == v_right {
        inject_straight(start, end, config)
    } else {
        inject_arc(start, end, v_left, v_right, model, config)
    }
}

fn inject_straight(start: &Coordinate, end: &Coordinate, config: &InjectionConfig) -> Vec<Coordinate> {
    // Drives keep their heading; point moves face the target at the end.
    let origin = start.pose().with_heading(end.t);
    let step = if end.left < 0.0 { -config.lookahead } else { config.lookahead };
    let length = distance(&origin, &end.pose());

    let mut points = Vec::new();
    let mut offset = 0.0;
    let mut covered = 0.0;
    while covered < length {
        if points.len() == config.max_iterations {
            return truncated(points, end, length - covered);
        }
        let pose = advance_straight(origin, offset);
        covered = distance(&origin, &pose);
        points.push(end.at(pose));
        offset += step;
    }
    points
}

fn inject_arc(
    start: &Coordinate,
    end: &Coordinate,
    v_left: f64,
    v_right: f64,
    model: &DriveModel,
    config: &InjectionConfig,
) -> Vec<Coordinate> {
    let omega = model.angular_velocity(v_left, v_right);
    // Pace by the faster side: the centre barely moves when the sides nearly cancel.
    let faster = v_left.abs().max(v_right.abs());
    let mut dt = travel_time(config.lookahead, faster);

    // Wheels spinning against the requested direction means the robot runs
    // the arc backwards.
    let against = match end.behavior {
        TurnBehavior::Clockwise => omega < 0.0,
        TurnBehavior::CounterClockwise => omega > 0.0,
        TurnBehavior::Shortest | TurnBehavior::Raw => false,
    };
    if against {
        dt = -dt;
    }
    let band = model.heading_step(v_left, v_right, dt);

    let origin = start.pose();
    let mut points = Vec::new();
    let mut heading = origin.theta;
    let mut elapsed = 0.0;
    while shortest_delta(end.t, heading).abs() > band {
        if points.len() == config.max_iterations {
            return truncated(points, end, shortest_delta(end.t, heading));
        }
        let pose = model.advance_arc(origin, v_left, v_right, elapsed);
        heading = pose.theta;
        points.push(end.at(pose));
        elapsed += dt;
    }
    if points.is_empty() {
        points.push(*end);
    }
    points
}

fn truncated(mut points: Vec<Coordinate>, end: &Coordinate, remaining: f64) -> Vec<Coordinate> {
    warn!(
        emitted = points.len(),
        remaining,
        end_x = end.x,
        end_y = end.y,
        end_t = end.t,
        "Densification budget exhausted, jumping to segment end"
    );
    points.push(*end);
    points
}

/// Densify a whole log: [`inject_point`] over each consecutive pair, then the
/// final logged point verbatim.
///
/// The iterator borrows the log and recomputes everything on each traversal,
/// so a preview can restart by calling this again. Logs with fewer than two
/// points come back unchanged.
pub fn inject_path<'a>(
    coords: &'a [Coordinate],
    model: &'a DriveModel,
    config: &'a InjectionConfig,
) -> impl Iterator<Item = Coordinate> + 'a {
    coords
        .windows(2)
        .flat_map(move |pair| inject_point(&pair[0], &pair[1], model, config))
        .chain(coords.last().copied())
}
