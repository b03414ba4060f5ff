//! Motion command wrappers.
//!
//! Every wrapper does two things: in the right match state it forwards the
//! command to the [`Chassis`], and in every state it predicts where the robot
//! ends up and appends that prediction to the path log. Running a routine
//! while disabled is therefore a dry run that only records the path.

use std::time::Duration;

use autonpath_kinematics::{
    Direction, DriveModel, Pose, advance_straight, distance, heading_toward, normalize_heading, shortest_delta,
};
use tracing::{debug, info, warn};

use crate::chassis::{Chassis, MatchState, SwingSide, WaitKind, WaitUntil};
use crate::coordinate::{Coordinate, PathLog, TurnBehavior};

/// Drives longer than this (in) enable slew when the caller does not choose.
pub const AUTO_SLEW_DISTANCE: f64 = 48.0;

/// Per-execution state of one autonomous routine.
///
/// Owns the predicted current point and the growing path log. Build a fresh
/// context for every run, live or dry, and call [`RoutineContext::finish`] to
/// hand the log to the preview side.
pub struct RoutineContext<'a> {
    chassis: &'a mut dyn Chassis,
    state: MatchState,
    model: DriveModel,
    current: Coordinate,
    path: Vec<Coordinate>,
}

impl<'a> RoutineContext<'a> {
    /// Start a routine execution in the given match state.
    pub fn new(chassis: &'a mut dyn Chassis, state: MatchState, model: DriveModel) -> Self {
        RoutineContext {
            chassis,
            state,
            model,
            current: Coordinate::default(),
            path: Vec::new(),
        }
    }

    /// Start a prediction-only execution; nothing reaches the chassis.
    pub fn dry_run(chassis: &'a mut dyn Chassis, model: DriveModel) -> Self {
        Self::new(chassis, MatchState::Disabled, model)
    }

    /// Match state the wrappers are gated on.
    pub fn state(&self) -> MatchState {
        self.state
    }

    /// Change the match state mid-routine, e.g. when the field disables the robot.
    ///
    /// Later commands keep predicting and logging; only dispatch is affected.
    pub fn set_match_state(&mut self, state: MatchState) {
        debug!(from = ?self.state, to = ?state, "Match state changed during routine");
        self.state = state;
    }

    /// Most recent predicted point.
    pub fn current(&self) -> Coordinate {
        self.current
    }

    /// Points logged so far.
    pub fn path(&self) -> &[Coordinate] {
        &self.path
    }

    /// Drivetrain model used for predictions.
    pub fn model(&self) -> &DriveModel {
        &self.model
    }

    /// End the execution and return the immutable log.
    pub fn finish(self) -> PathLog {
        info!(points = self.path.len(), state = ?self.state, "Routine recorded");
        PathLog::from_points(self.path)
    }

    //
    // Dispatch plumbing
    //

    fn dispatch<H>(&mut self, gate: fn(MatchState) -> bool, hardware: H)
    where
        H: FnOnce(&mut dyn Chassis, MatchState),
    {
        if gate(self.state) {
            hardware(&mut *self.chassis, self.state);
        }
    }

    fn record<P>(&mut self, predict: P)
    where
        P: FnOnce(&Coordinate, &DriveModel) -> Coordinate,
    {
        self.current = predict(&self.current, &self.model);
        debug!(point = %self.current, state = ?self.state, "Logged waypoint");
        self.path.push(self.current);
    }

    /// Forward `hardware` when `gate` admits the match state, then always log `predict`.
    fn dispatch_or_simulate<H, P>(&mut self, gate: fn(MatchState) -> bool, hardware: H, predict: P)
    where
        H: FnOnce(&mut dyn Chassis, MatchState),
        P: FnOnce(&Coordinate, &DriveModel) -> Coordinate,
    {
        self.dispatch(gate, hardware);
        self.record(predict);
    }

    /// Pose direction and bearing decisions are made from: live odometry in
    /// autonomous, the prediction otherwise.
    fn reference_pose(&self) -> Pose {
        if self.state.is_autonomous() {
            self.chassis.pose()
        } else {
            self.current.pose()
        }
    }

    //
    // Position
    //

    /// Place the robot. Seeds odometry whenever the robot is enabled.
    pub fn set_position(&mut self, x: f64, y: f64, theta: f64) {
        let pose = Pose::new(x, y, theta);
        self.dispatch_or_simulate(MatchState::is_enabled, |chassis, _| chassis.set_pose(pose), |_, _| {
            Coordinate::from(pose)
        });
    }

    /// Place the robot at `x`, `y` and keep its current heading.
    pub fn set_position_xy(&mut self, x: f64, y: f64) {
        let theta = self.reference_pose().theta;
        self.set_position(x, y, theta);
    }

    //
    // Waits
    //

    /// Block on the active motion.
    pub fn wait(&mut self, kind: WaitKind) {
        self.dispatch(MatchState::is_autonomous, |chassis, _| chassis.wait(kind));
    }

    /// Block until the active motion passes a mark.
    pub fn wait_until(&mut self, until: WaitUntil) {
        self.dispatch(MatchState::is_autonomous, |chassis, _| chassis.wait_until(until));
    }

    /// Timed pause, logged so the preview reproduces it.
    pub fn wait_millis(&mut self, millis: u64) {
        self.dispatch_or_simulate(
            MatchState::is_autonomous,
            |chassis, _| chassis.delay(Duration::from_millis(millis)),
            |current, _| Coordinate::pause(current.pose(), millis),
        );
    }

    /// Timed pause that is left out of the path log.
    pub fn hold(&mut self, millis: u64) {
        self.dispatch(MatchState::is_autonomous, |chassis, _| {
            chassis.delay(Duration::from_millis(millis))
        });
    }

    //
    // Drive
    //

    /// Drive straight along the current heading. Negative distances reverse.
    pub fn drive_distance(&mut self, distance: f64, speed: f64, slew: bool) {
        let signed = speed.abs() * Direction::of_distance(distance).sign();
        self.dispatch_or_simulate(
            MatchState::is_autonomous,
            |chassis, state| match state {
                MatchState::AutoOdom => chassis.odom_drive(distance, speed.abs(), slew),
                _ => chassis.pid_drive(distance, speed.abs(), slew),
            },
            |current, _| current.with_speeds(signed, signed).at(advance_straight(current.pose(), distance)),
        );
    }

    /// [`RoutineContext::drive_distance`] with slew on for long drives.
    pub fn drive(&mut self, distance: f64, speed: f64) {
        self.drive_distance(distance, speed, distance.abs() > AUTO_SLEW_DISTANCE);
    }

    //
    // Turns
    //

    /// Turn in place to an absolute heading.
    pub fn turn_to_heading(&mut self, theta: f64, speed: f64, behavior: TurnBehavior) {
        let target = normalize_heading(theta);
        let resolved = resolve_turn(behavior, target, self.reference_pose().theta);
        self.dispatch_or_simulate(
            MatchState::is_autonomous,
            |chassis, _| chassis.turn_to_heading(target, speed, behavior),
            |current, _| predict_turn(current, target, speed, resolved),
        );
    }

    /// Turn the short way to an absolute heading.
    pub fn turn(&mut self, theta: f64, speed: f64) {
        self.turn_to_heading(theta, speed, TurnBehavior::Shortest);
    }

    /// Turn to face `point`, or to put the back towards it when reversing.
    pub fn turn_to_point(&mut self, point: Pose, direction: Direction, speed: f64) {
        let theta = heading_toward(&self.reference_pose(), &point, direction);
        self.turn_to_heading(theta, speed, TurnBehavior::Shortest);
    }

    /// Turn by `delta` degrees from the present heading; negative is counter-clockwise.
    pub fn turn_relative(&mut self, delta: f64, speed: f64) {
        let behavior = if delta < 0.0 {
            TurnBehavior::CounterClockwise
        } else {
            TurnBehavior::Clockwise
        };
        let target = self.reference_pose().theta + delta;
        self.turn_to_heading(target, speed, behavior);
    }

    //
    // Swings
    //

    /// Swing to an absolute heading with `main_speed` on `side` and `opp_speed` on the other.
    pub fn swing(&mut self, side: SwingSide, theta: f64, main_speed: f64, opp_speed: f64, behavior: TurnBehavior) {
        let target = normalize_heading(theta);
        let resolved = resolve_turn(behavior, target, self.reference_pose().theta);
        self.dispatch_or_simulate(
            MatchState::is_autonomous,
            |chassis, _| chassis.swing(side, target, main_speed, opp_speed, behavior),
            |current, model| predict_swing(current, model, side, target, main_speed, opp_speed, resolved),
        );
    }

    /// Swing with the other side locked.
    pub fn swing_one_sided(&mut self, side: SwingSide, theta: f64, main_speed: f64, behavior: TurnBehavior) {
        self.swing(side, theta, main_speed, 0.0, behavior);
    }

    //
    // Point moves
    //

    /// Drive to a field position.
    ///
    /// With odometry the chassis follows the move itself; otherwise it is
    /// split into a turn to face the point and a straight drive.
    pub fn move_to_point(&mut self, point: Pose, direction: Direction, speed: f64) {
        if self.state == MatchState::AutoOdom {
            self.dispatch_or_simulate(
                MatchState::is_autonomous,
                |chassis, _| chassis.move_to_point(point, direction, speed),
                |current, _| predict_jump(current, point, direction, speed),
            );
            return;
        }

        let theta = heading_toward(&self.reference_pose(), &point, direction);
        self.turn_to_heading(theta, speed, TurnBehavior::Shortest);
        self.wait(WaitKind::Chain);
        let length = distance(&self.current.pose(), &point);
        self.drive(length * direction.sign(), speed);
    }

    /// Drive to a field position and finish at its heading.
    pub fn boomerang(&mut self, target: Pose, direction: Direction, speed: f64) {
        if self.state == MatchState::AutoOdom {
            self.dispatch_or_simulate(
                MatchState::is_autonomous,
                |chassis, _| chassis.move_to_pose(target, direction, speed),
                |current, _| predict_jump(current, target, direction, speed),
            );
            // The boomerang settles onto the final heading as it arrives
            let heading = normalize_heading(target.theta);
            let resolved = resolve_turn(TurnBehavior::Shortest, heading, self.current.t);
            if shortest_delta(heading, self.current.t) != 0.0 {
                self.record(|current, _| predict_turn(current, heading, speed, resolved));
            }
            return;
        }

        self.move_to_point(target, direction, speed);
        self.wait(WaitKind::Chain);
        self.turn(target.theta, speed);
    }
}

/// Pick an explicit spin direction for a turn from `current` to `target`.
///
/// `Shortest` picks counter-clockwise only when the shortest signed delta is
/// negative, so a half turn goes clockwise.
pub fn resolve_turn(behavior: TurnBehavior, target: f64, current: f64) -> TurnBehavior {
    let counter_clockwise = match behavior {
        TurnBehavior::Clockwise => false,
        TurnBehavior::CounterClockwise => true,
        TurnBehavior::Shortest => shortest_delta(target, current) < 0.0,
        TurnBehavior::Raw => target - current < 0.0,
    };
    if counter_clockwise {
        TurnBehavior::CounterClockwise
    } else {
        TurnBehavior::Clockwise
    }
}

fn predict_turn(current: &Coordinate, target: f64, speed: f64, resolved: TurnBehavior) -> Coordinate {
    let signed = match resolved {
        TurnBehavior::CounterClockwise => -speed.abs(),
        _ => speed.abs(),
    };
    current
        .with_speeds(signed, -signed)
        .with_behavior(resolved)
        .at(current.pose().with_heading(target))
}

fn predict_jump(current: &Coordinate, target: Pose, direction: Direction, speed: f64) -> Coordinate {
    let theta = heading_toward(&current.pose(), &target, direction);
    let signed = speed.abs() * direction.sign();
    current
        .with_speeds(signed, signed)
        .at(Pose::new(target.x, target.y, theta))
}

fn predict_swing(
    current: &Coordinate,
    model: &DriveModel,
    side: SwingSide,
    target: f64,
    main_speed: f64,
    opp_speed: f64,
    resolved: TurnBehavior,
) -> Coordinate {
    let (left, right) = match side {
        SwingSide::Left => (main_speed, opp_speed),
        SwingSide::Right => (opp_speed, main_speed),
    };
    let v_left = model.wheel_velocity(left);
    let v_right = model.wheel_velocity(right);
    let omega = model.angular_velocity(v_left, v_right);

    if omega == 0.0 {
        warn!(?side, left, right, target, "Swing with equal side speeds cannot turn, holding pose");
        return current.with_speeds(left, right).with_behavior(resolved);
    }

    let sweep = match resolved {
        TurnBehavior::CounterClockwise => -normalize_heading(current.t - target),
        _ => normalize_heading(target - current.t),
    };
    let dt = sweep.to_radians() / omega;

    // The controller flips the output sign when the commanded sides would
    // rotate the wrong way, so the arc is driven backwards.
    let (left, right, v_left, v_right, dt) = if dt < 0.0 {
        (-left, -right, -v_left, -v_right, -dt)
    } else {
        (left, right, v_left, v_right, dt)
    };

    let pose = model.advance_arc(current.pose(), v_left, v_right, dt).with_heading(target);
    current.with_speeds(left, right).with_behavior(resolved).at(pose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chassis::OfflineChassis;
    use crate::coordinate::KEY;

    const EPSILON: f64 = 1e-6;

    fn model() -> DriveModel {
        DriveModel::new(450.0, 3.25, 12.0).unwrap()
    }

    /// Records every dispatched command and teleports to motion targets.
    #[derive(Default)]
    struct RecordingChassis {
        pose: Pose,
        calls: Vec<String>,
    }

    impl Chassis for RecordingChassis {
        fn set_pose(&mut self, pose: Pose) {
            self.pose = pose;
            self.calls.push(format!("set_pose {:.0} {:.0} {:.0}", pose.x, pose.y, pose.theta));
        }
        fn pose(&self) -> Pose {
            self.pose
        }
        fn pid_drive(&mut self, distance: f64, speed: f64, slew: bool) {
            self.calls.push(format!("pid_drive {:.0} {:.0} {}", distance, speed, slew));
        }
        fn odom_drive(&mut self, distance: f64, speed: f64, slew: bool) {
            self.calls.push(format!("odom_drive {:.0} {:.0} {}", distance, speed, slew));
        }
        fn turn_to_heading(&mut self, theta: f64, speed: f64, behavior: TurnBehavior) {
            self.pose = self.pose.with_heading(theta);
            self.calls.push(format!("turn {:.0} {:.0} {:?}", theta, speed, behavior));
        }
        fn swing(&mut self, side: SwingSide, theta: f64, main_speed: f64, opp_speed: f64, _behavior: TurnBehavior) {
            self.calls.push(format!("swing {:?} {:.0} {:.0} {:.0}", side, theta, main_speed, opp_speed));
        }
        fn move_to_point(&mut self, target: Pose, direction: Direction, speed: f64) {
            self.calls.push(format!("move_to_point {:.0} {:.0} {:?} {:.0}", target.x, target.y, direction, speed));
        }
        fn move_to_pose(&mut self, target: Pose, direction: Direction, speed: f64) {
            self.calls.push(format!("move_to_pose {:.0} {:.0} {:.0} {:?} {:.0}", target.x, target.y, target.theta, direction, speed));
        }
        fn wait(&mut self, kind: WaitKind) {
            self.calls.push(format!("wait {:?}", kind));
        }
        fn wait_until(&mut self, until: WaitUntil) {
            self.calls.push(format!("wait_until {:?}", until));
        }
        fn delay(&mut self, duration: Duration) {
            self.calls.push(format!("delay {}", duration.as_millis()));
        }
    }

    fn assert_point(point: &Coordinate, x: f64, y: f64, t: f64) {
        assert!((point.x - x).abs() < EPSILON, "x: {} != {}", point.x, x);
        assert!((point.y - y).abs() < EPSILON, "y: {} != {}", point.y, y);
        assert!(shortest_delta(point.t, t).abs() < EPSILON, "t: {} != {}", point.t, t);
    }

    #[test]
    fn test_drive_then_turn_scenario() {
        let mut chassis = OfflineChassis::default();
        let mut ctx = RoutineContext::dry_run(&mut chassis, model());
        ctx.set_position(0.0, 0.0, 0.0);
        ctx.drive(24.0, 100.0);
        ctx.turn(90.0, 90.0);
        let log = ctx.finish();

        let points = log.points();
        assert_eq!(points.len(), 3);
        assert_point(&points[0], 0.0, 0.0, 0.0);
        assert_point(&points[1], 0.0, 24.0, 0.0);
        assert_eq!((points[1].left, points[1].right), (100.0, 100.0));
        assert_point(&points[2], 0.0, 24.0, 90.0);
        assert_eq!((points[2].left, points[2].right), (90.0, -90.0));
        assert_eq!(points[2].behavior, TurnBehavior::Clockwise);
    }

    #[test]
    fn test_shortest_turn_tie_break() {
        let mut chassis = OfflineChassis::default();
        let mut ctx = RoutineContext::dry_run(&mut chassis, model());
        ctx.set_position(0.0, 0.0, 350.0);
        ctx.turn(10.0, 60.0);
        let point = ctx.current();
        assert_eq!(point.behavior, TurnBehavior::Clockwise);
        assert_eq!((point.left, point.right), (60.0, -60.0));

        ctx.set_position(0.0, 0.0, 10.0);
        ctx.turn(350.0, 60.0);
        let point = ctx.current();
        assert_eq!(point.behavior, TurnBehavior::CounterClockwise);
        assert_eq!((point.left, point.right), (-60.0, 60.0));
    }

    #[test]
    fn test_resolve_turn() {
        assert_eq!(resolve_turn(TurnBehavior::Shortest, 10.0, 350.0), TurnBehavior::Clockwise);
        assert_eq!(resolve_turn(TurnBehavior::Shortest, 350.0, 10.0), TurnBehavior::CounterClockwise);
        assert_eq!(resolve_turn(TurnBehavior::Shortest, 180.0, 0.0), TurnBehavior::Clockwise);
        // Raw ignores the wrap: 350 -> 10 is a 340 degree counter-clockwise turn
        assert_eq!(resolve_turn(TurnBehavior::Raw, 10.0, 350.0), TurnBehavior::CounterClockwise);
        assert_eq!(resolve_turn(TurnBehavior::Clockwise, 350.0, 10.0), TurnBehavior::Clockwise);
        assert_eq!(resolve_turn(TurnBehavior::CounterClockwise, 10.0, 350.0), TurnBehavior::CounterClockwise);
    }

    #[test]
    fn test_disabled_never_dispatches() {
        let mut chassis = RecordingChassis::default();
        let mut ctx = RoutineContext::dry_run(&mut chassis, model());
        ctx.set_position(0.0, 0.0, 0.0);
        ctx.drive(24.0, 100.0);
        ctx.turn(90.0, 90.0);
        ctx.wait(WaitKind::Settle);
        ctx.wait_millis(250);
        ctx.hold(100);
        assert_eq!(ctx.path().len(), 4);
        drop(ctx);
        assert!(chassis.calls.is_empty());
    }

    #[test]
    fn test_autonomous_pid_dispatches() {
        let mut chassis = RecordingChassis::default();
        let mut ctx = RoutineContext::new(&mut chassis, MatchState::AutoPid, model());
        ctx.set_position(0.0, 0.0, 0.0);
        ctx.drive(60.0, 110.0);
        ctx.wait(WaitKind::Quick);
        ctx.turn(270.0, 90.0);
        ctx.wait_until(WaitUntil::Angle(300.0));
        ctx.wait_millis(500);
        ctx.hold(50);
        let log = ctx.finish();

        assert_eq!(log.len(), 4);
        assert_eq!(
            chassis.calls,
            vec![
                "set_pose 0 0 0",
                "pid_drive 60 110 true",
                "wait Quick",
                "turn 270 90 Shortest",
                "wait_until Angle(300.0)",
                "delay 500",
                "delay 50",
            ]
        );
        // Live heading 0 -> 270 resolves counter-clockwise
        assert_eq!(log.points()[2].behavior, TurnBehavior::CounterClockwise);
    }

    #[test]
    fn test_autonomous_odom_uses_odom_drive() {
        let mut chassis = RecordingChassis::default();
        let mut ctx = RoutineContext::new(&mut chassis, MatchState::AutoOdom, model());
        ctx.drive_distance(-12.0, 80.0, false);
        let point = ctx.current();
        assert_eq!((point.left, point.right), (-80.0, -80.0));
        assert_point(&point, 0.0, -12.0, 0.0);
        drop(ctx);
        assert_eq!(chassis.calls, vec!["odom_drive -12 80 false"]);
    }

    #[test]
    fn test_set_position_xy_keeps_heading() {
        let mut offline = OfflineChassis::default();
        let mut ctx = RoutineContext::dry_run(&mut offline, model());
        ctx.set_position(0.0, 0.0, 45.0);
        ctx.drive(10.0, 100.0);
        ctx.set_position_xy(-5.0, 5.0);
        let point = ctx.current();
        assert_point(&point, -5.0, 5.0, 45.0);
        assert_eq!((point.left, point.right), (0.0, 0.0));
        drop(ctx);

        // Live runs take the heading from odometry
        let mut chassis = RecordingChassis::default();
        let mut ctx = RoutineContext::new(&mut chassis, MatchState::AutoPid, model());
        ctx.set_position(0.0, 0.0, 0.0);
        ctx.turn(270.0, 90.0);
        ctx.set_position_xy(12.0, 24.0);
        assert_point(&ctx.current(), 12.0, 24.0, 270.0);
        drop(ctx);
        assert_eq!(chassis.calls.last().map(String::as_str), Some("set_pose 12 24 270"));
    }

    #[test]
    fn test_driver_state_only_seeds_position() {
        let mut chassis = RecordingChassis::default();
        let mut ctx = RoutineContext::new(&mut chassis, MatchState::Driver, model());
        ctx.set_position(12.0, -36.0, 90.0);
        ctx.drive(24.0, 100.0);
        assert_point(&ctx.current(), 36.0, -36.0, 90.0);
        drop(ctx);
        assert_eq!(chassis.calls, vec!["set_pose 12 -36 90"]);
    }

    #[test]
    fn test_forced_disable_keeps_logging() {
        let mut chassis = RecordingChassis::default();
        let mut ctx = RoutineContext::new(&mut chassis, MatchState::AutoPid, model());
        ctx.drive(10.0, 100.0);
        ctx.set_match_state(MatchState::Disabled);
        ctx.drive(10.0, 100.0);
        assert_eq!(ctx.path().len(), 2);
        assert_point(&ctx.current(), 0.0, 20.0, 0.0);
        drop(ctx);
        assert_eq!(chassis.calls.len(), 1);
    }

    #[test]
    fn test_wait_millis_logs_pause() {
        let mut chassis = OfflineChassis::default();
        let mut ctx = RoutineContext::dry_run(&mut chassis, model());
        ctx.set_position(5.0, 5.0, 45.0);
        ctx.wait_millis(750);
        ctx.hold(300);
        let log = ctx.finish();
        assert_eq!(log.len(), 2);
        let pause = log.points()[1];
        assert_eq!(pause.left, KEY);
        assert_eq!(pause.right, 750.0);
        assert_point(&pause, 5.0, 5.0, 45.0);
    }

    #[test]
    fn test_turn_to_point_and_relative() {
        let mut chassis = OfflineChassis::default();
        let mut ctx = RoutineContext::dry_run(&mut chassis, model());
        ctx.set_position(0.0, 0.0, 0.0);
        ctx.turn_to_point(Pose::new(10.0, 0.0, 0.0), Direction::Forward, 90.0);
        assert_point(&ctx.current(), 0.0, 0.0, 90.0);
        ctx.turn_to_point(Pose::new(10.0, 0.0, 0.0), Direction::Reverse, 90.0);
        assert_point(&ctx.current(), 0.0, 0.0, 270.0);

        ctx.turn_relative(-30.0, 90.0);
        assert_point(&ctx.current(), 0.0, 0.0, 240.0);
        assert_eq!(ctx.current().behavior, TurnBehavior::CounterClockwise);
        ctx.turn_relative(150.0, 90.0);
        assert_point(&ctx.current(), 0.0, 0.0, 30.0);
        assert_eq!(ctx.current().behavior, TurnBehavior::Clockwise);
    }

    #[test]
    fn test_move_to_point_decomposes_without_odom() {
        let mut chassis = RecordingChassis::default();
        let mut ctx = RoutineContext::new(&mut chassis, MatchState::AutoPid, model());
        ctx.set_position(0.0, 0.0, 0.0);
        ctx.move_to_point(Pose::new(10.0, 0.0, 0.0), Direction::Forward, 80.0);
        let log = ctx.finish();

        assert_eq!(log.len(), 3);
        assert_point(&log.points()[1], 0.0, 0.0, 90.0);
        assert_point(&log.points()[2], 10.0, 0.0, 90.0);
        assert_eq!((log.points()[2].left, log.points()[2].right), (80.0, 80.0));
        assert_eq!(
            chassis.calls,
            vec!["set_pose 0 0 0", "turn 90 80 Shortest", "wait Chain", "pid_drive 10 80 false"]
        );
    }

    #[test]
    fn test_move_to_point_reverse_dry_run() {
        let mut chassis = OfflineChassis::default();
        let mut ctx = RoutineContext::dry_run(&mut chassis, model());
        ctx.set_position(0.0, 0.0, 0.0);
        ctx.move_to_point(Pose::new(0.0, -10.0, 0.0), Direction::Reverse, 80.0);
        let point = ctx.current();
        assert_point(&point, 0.0, -10.0, 0.0);
        assert_eq!((point.left, point.right), (-80.0, -80.0));
    }

    #[test]
    fn test_move_to_point_with_odom_jumps() {
        let mut chassis = RecordingChassis::default();
        let mut ctx = RoutineContext::new(&mut chassis, MatchState::AutoOdom, model());
        ctx.set_position(0.0, 0.0, 0.0);
        ctx.move_to_point(Pose::new(10.0, 10.0, 0.0), Direction::Forward, 100.0);
        let log = ctx.finish();

        assert_eq!(log.len(), 2);
        assert_point(&log.points()[1], 10.0, 10.0, 45.0);
        assert_eq!((log.points()[1].left, log.points()[1].right), (100.0, 100.0));
        assert_eq!(chassis.calls[1], "move_to_point 10 10 Forward 100");
    }

    #[test]
    fn test_boomerang_with_odom_settles_heading() {
        let mut chassis = RecordingChassis::default();
        let mut ctx = RoutineContext::new(&mut chassis, MatchState::AutoOdom, model());
        ctx.set_position(0.0, 0.0, 0.0);
        ctx.boomerang(Pose::new(0.0, 24.0, 90.0), Direction::Forward, 100.0);
        let log = ctx.finish();

        assert_eq!(log.len(), 3);
        assert_point(&log.points()[1], 0.0, 24.0, 0.0);
        assert_point(&log.points()[2], 0.0, 24.0, 90.0);
        assert_eq!(chassis.calls, vec!["set_pose 0 0 0", "move_to_pose 0 24 90 Forward 100"]);
    }

    #[test]
    fn test_boomerang_dry_run_decomposes() {
        let mut chassis = OfflineChassis::default();
        let mut ctx = RoutineContext::dry_run(&mut chassis, model());
        ctx.set_position(0.0, 0.0, 0.0);
        ctx.boomerang(Pose::new(24.0, 0.0, 180.0), Direction::Forward, 100.0);
        let log = ctx.finish();
        // start, face target, drive, final turn
        assert_eq!(log.len(), 4);
        assert_point(&log.points()[2], 24.0, 0.0, 90.0);
        assert_point(&log.points()[3], 24.0, 0.0, 180.0);
    }

    #[test]
    fn test_swing_quarter_turn() {
        let mut chassis = OfflineChassis::default();
        let mut ctx = RoutineContext::dry_run(&mut chassis, model());
        ctx.set_position(0.0, 0.0, 0.0);
        ctx.swing_one_sided(SwingSide::Left, 90.0, 127.0, TurnBehavior::Shortest);
        let point = ctx.current();
        assert_point(&point, 6.0, 6.0, 90.0);
        assert_eq!((point.left, point.right), (127.0, 0.0));
        assert_eq!(point.behavior, TurnBehavior::Clockwise);
    }

    #[test]
    fn test_swing_against_wheels_drives_backwards() {
        let mut chassis = OfflineChassis::default();
        let mut ctx = RoutineContext::dry_run(&mut chassis, model());
        ctx.set_position(0.0, 0.0, 0.0);
        // Right side forward would turn counter-clockwise; clockwise is requested
        ctx.swing(SwingSide::Right, 90.0, 127.0, 0.0, TurnBehavior::Clockwise);
        let point = ctx.current();
        assert_point(&point, -6.0, -6.0, 90.0);
        assert_eq!((point.left, point.right), (0.0, -127.0));
    }

    #[test]
    fn test_degenerate_swing_holds_pose() {
        let mut chassis = OfflineChassis::default();
        let mut ctx = RoutineContext::dry_run(&mut chassis, model());
        ctx.set_position(3.0, 4.0, 10.0);
        ctx.swing(SwingSide::Left, 90.0, 50.0, 50.0, TurnBehavior::Shortest);
        let point = ctx.current();
        assert_point(&point, 3.0, 4.0, 10.0);
        assert_eq!((point.left, point.right), (50.0, 50.0));
        assert_eq!(ctx.path().len(), 2);
    }

    #[test]
    fn test_swing_dispatches_in_autonomous() {
        let mut chassis = RecordingChassis::default();
        let mut ctx = RoutineContext::new(&mut chassis, MatchState::AutoPid, model());
        ctx.swing(SwingSide::Right, 45.0, 110.0, 20.0, TurnBehavior::Shortest);
        drop(ctx);
        assert_eq!(chassis.calls, vec!["swing Right 45 110 20"]);
    }
}
