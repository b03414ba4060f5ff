use std::time::Duration;

use autonpath_kinematics::{advance_straight, heading_toward, shortest_delta, travel_time};
use autonpath_routine::{
    Chassis, Direction, DriveModel, Pose, SwingSide, TurnBehavior, WaitKind, WaitUntil,
};
use spin_sleep::SpinSleeper;
use tracing::debug;

/// Bench chassis: jumps straight to each commanded target and lets waits
/// take the time the motion would have needed, scaled by `time_scale`.
pub struct SimChassis {
    pose: Pose,
    model: DriveModel,
    time_scale: f64,
    sleeper: SpinSleeper,
    /// Estimated duration of the motion the next wait blocks on.
    pending: Duration,
    dispatched: usize,
}

impl SimChassis {
    pub fn new(model: DriveModel, time_scale: f64) -> Self {
        SimChassis {
            pose: Pose::default(),
            model,
            time_scale: time_scale.max(0.0),
            sleeper: SpinSleeper::new(10_000),
            pending: Duration::ZERO,
            dispatched: 0,
        }
    }

    /// Commands received so far.
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    fn command(&mut self, name: &str, target: Pose, inches: f64, speed: f64) {
        let velocity = self.model.wheel_velocity(speed.abs());
        let seconds = travel_time(inches.abs(), velocity);
        self.pending = Duration::from_secs_f64(seconds.max(0.0));
        self.pose = target;
        self.dispatched += 1;
        debug!(command = name, pose = %self.pose, eta = ?self.pending, "Simulated command");
    }

    /// Wheel travel of an in-place turn through `delta` degrees.
    fn spin_arc(&self, delta: f64) -> f64 {
        delta.to_radians().abs() * self.model.track_width() / 2.0
    }

    fn scaled_sleep(&self, duration: Duration) {
        if self.time_scale > 0.0 {
            self.sleeper.sleep(duration.mul_f64(self.time_scale));
        }
    }
}

impl Chassis for SimChassis {
    fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
        self.pending = Duration::ZERO;
        self.dispatched += 1;
    }

    fn pose(&self) -> Pose {
        self.pose
    }

    fn pid_drive(&mut self, distance: f64, speed: f64, _slew: bool) {
        let target = advance_straight(self.pose, distance);
        self.command("pid_drive", target, distance, speed);
    }

    fn odom_drive(&mut self, distance: f64, speed: f64, _slew: bool) {
        let target = advance_straight(self.pose, distance);
        self.command("odom_drive", target, distance, speed);
    }

    fn turn_to_heading(&mut self, theta: f64, speed: f64, _behavior: TurnBehavior) {
        let inches = self.spin_arc(shortest_delta(theta, self.pose.theta));
        self.command("turn", self.pose.with_heading(theta), inches, speed);
    }

    fn swing(&mut self, _side: SwingSide, theta: f64, main_speed: f64, _opp_speed: f64, _behavior: TurnBehavior) {
        // Only the heading is tracked; the swing's offset is left to the prediction.
        let inches = 2.0 * self.spin_arc(shortest_delta(theta, self.pose.theta));
        self.command("swing", self.pose.with_heading(theta), inches, main_speed);
    }

    fn move_to_point(&mut self, target: Pose, direction: Direction, speed: f64) {
        let theta = heading_toward(&self.pose, &target, direction);
        let inches = self.pose.distance_to(&target);
        self.command("move_to_point", Pose::new(target.x, target.y, theta), inches, speed);
    }

    fn move_to_pose(&mut self, target: Pose, _direction: Direction, speed: f64) {
        let inches = self.pose.distance_to(&target);
        self.command("move_to_pose", target, inches, speed);
    }

    fn wait(&mut self, kind: WaitKind) {
        let pending = std::mem::take(&mut self.pending);
        let duration = match kind {
            WaitKind::Settle => pending,
            WaitKind::Quick => pending.mul_f64(0.8),
            WaitKind::Chain => pending.mul_f64(0.6),
        };
        self.scaled_sleep(duration);
    }

    fn wait_until(&mut self, _until: WaitUntil) {
        // Marks are not tracked, so assume half the motion has elapsed.
        let half = self.pending / 2;
        self.pending -= half;
        self.scaled_sleep(half);
    }

    fn delay(&mut self, duration: Duration) {
        self.scaled_sleep(duration);
    }
}
