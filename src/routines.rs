//! Autonomous routines shown in the viewer's selector.
//!
//! Field frame: inches from the field centre, red alliance starting on the
//! negative-y wall.

use autonpath_routine::{
    Direction, Pose, RoutineContext, RoutineError, RoutineRegistry, SwingSide, TurnBehavior, WaitKind,
    WaitUntil,
};

pub fn library() -> Result<RoutineRegistry, RoutineError> {
    let mut registry = RoutineRegistry::new();
    registry.register("solo_awp", solo_awp)?;
    registry.register("left_side", left_side)?;
    registry.register("right_side", right_side)?;
    registry.register("skills", skills)?;
    Ok(registry)
}

fn solo_awp(ctx: &mut RoutineContext<'_>) {
    ctx.set_position(-48.0, -60.0, 0.0);
    ctx.drive(24.0, 110.0);
    ctx.wait(WaitKind::Settle);
    ctx.turn(90.0, 90.0);
    ctx.wait(WaitKind::Quick);
    ctx.drive(-12.0, 80.0);
    ctx.wait(WaitKind::Settle);
    // score preload
    ctx.wait_millis(400);
    ctx.move_to_point(Pose::new(-24.0, -24.0, 0.0), Direction::Forward, 100.0);
    ctx.wait(WaitKind::Settle);
    ctx.swing_one_sided(SwingSide::Right, 0.0, 110.0, TurnBehavior::Shortest);
    ctx.wait(WaitKind::Settle);
    ctx.drive(30.0, 100.0);
    ctx.wait(WaitKind::Settle);
}

fn left_side(ctx: &mut RoutineContext<'_>) {
    ctx.set_position(-36.0, -60.0, 45.0);
    ctx.drive(34.0, 110.0);
    ctx.wait(WaitKind::Settle);
    ctx.turn_to_heading(315.0, 90.0, TurnBehavior::CounterClockwise);
    ctx.wait_until(WaitUntil::Angle(330.0));
    ctx.wait(WaitKind::Quick);
    ctx.drive(-20.0, 90.0);
    ctx.wait(WaitKind::Settle);
    ctx.wait_millis(250);
    ctx.turn_relative(-45.0, 90.0);
    ctx.wait(WaitKind::Chain);
    ctx.drive(24.0, 100.0);
    ctx.wait(WaitKind::Settle);
}

fn right_side(ctx: &mut RoutineContext<'_>) {
    ctx.set_position(36.0, -60.0, 315.0);
    ctx.drive(34.0, 110.0);
    ctx.wait(WaitKind::Settle);
    ctx.turn(45.0, 90.0);
    ctx.wait(WaitKind::Quick);
    ctx.drive(-20.0, 90.0);
    ctx.wait_until(WaitUntil::Distance(10.0));
    ctx.wait(WaitKind::Settle);
    ctx.wait_millis(250);
    ctx.swing(SwingSide::Left, 90.0, 110.0, 30.0, TurnBehavior::Shortest);
    ctx.wait(WaitKind::Settle);
    ctx.drive(24.0, 100.0);
    ctx.wait(WaitKind::Settle);
}

fn skills(ctx: &mut RoutineContext<'_>) {
    ctx.set_position(-60.0, 0.0, 90.0);
    ctx.move_to_point(Pose::new(-24.0, 24.0, 0.0), Direction::Forward, 110.0);
    ctx.wait(WaitKind::Chain);
    ctx.boomerang(Pose::new(24.0, 48.0, 90.0), Direction::Forward, 100.0);
    ctx.wait_until(WaitUntil::Point { x: 0.0, y: 40.0 });
    ctx.wait(WaitKind::Settle);
    ctx.wait_millis(500);
    ctx.move_to_point(Pose::new(48.0, 0.0, 0.0), Direction::Reverse, 100.0);
    ctx.wait(WaitKind::Settle);
    ctx.turn_relative(180.0, 90.0);
    ctx.wait(WaitKind::Quick);
    ctx.swing_one_sided(SwingSide::Left, 180.0, 110.0, TurnBehavior::Shortest);
    ctx.wait(WaitKind::Chain);
    ctx.drive(40.0, 110.0);
    ctx.wait(WaitKind::Settle);
}
