use autonpath_routine::*;

fn skills_opening(ctx: &mut RoutineContext<'_>) {
    ctx.set_position(-60.0, -36.0, 90.0);
    ctx.drive(24.0, 110.0);
    ctx.turn(0.0, 90.0);
    ctx.wait_millis(250);
    ctx.swing_one_sided(SwingSide::Right, 300.0, 100.0, TurnBehavior::Shortest);
    ctx.move_to_point(Pose::new(-24.0, 0.0, 0.0), Direction::Forward, 100.0);
}

fn main() {
    let model = match DriveModel::new(450.0, 3.25, 12.5) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Invalid drivetrain: {}", e);
            return;
        }
    };

    let mut registry = RoutineRegistry::new();
    if let Err(e) = registry.register("skills_opening", skills_opening) {
        eprintln!("Failed to register routine: {}", e);
        return;
    }

    println!("Recording routine...");
    println!("  Drive Model: {}", model);

    let mut chassis = OfflineChassis::default();
    let log = match registry.record("skills_opening", &mut chassis, MatchState::Disabled, model) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Recording failed: {}", e);
            return;
        }
    };

    println!("\nLogged waypoints:");
    for (i, point) in log.points().iter().enumerate() {
        println!("  {:>2}: {}", i, point);
    }
    println!("\n{}", log);

    let config = InjectionConfig::default();
    let dense: Vec<Coordinate> = log.densify(&model, &config).collect();
    println!(
        "\nDensified {} waypoints into {} points at {} in steps.",
        log.len(),
        dense.len(),
        config.lookahead()
    );
    println!("{}", log.densified(&model, &config));

    let preview = PreviewPath::new(dense, model, config.lookahead(), Alliance::Red);
    let total: std::time::Duration = preview.points().iter().map(|p| preview.dwell(p)).sum();
    println!("Estimated run time: {:.2} s", total.as_secs_f64());
}
