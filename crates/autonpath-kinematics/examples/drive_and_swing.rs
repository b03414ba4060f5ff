use autonpath_kinematics::*;

fn main() {
    let drive_rpm = 450.0;
    let wheel_diameter = 3.25;
    let track_width = 12.0;
    let model_result = DriveModel::new(drive_rpm, wheel_diameter, track_width);

    let mut current_pose = Pose::new(0.0, 0.0, 0.0);
    let left_voltage = 110.0;
    let right_voltage = 40.0; // Sweeping right while still moving forward
    let dt = 0.05; // Time step in seconds
    let num_steps = 12;

    match model_result {
        Ok(model) => {
            let v_left = model.wheel_velocity(left_voltage);
            let v_right = model.wheel_velocity(right_voltage);

            println!("Initializing prediction...");
            println!("  {}", model);
            println!("  Left:  {} V -> {:.2} in/s", left_voltage, v_left);
            println!("  Right: {} V -> {:.2} in/s", right_voltage, v_right);
            if let Some(radius) = model.turn_radius(v_left, v_right) {
                println!("  Turn radius: {:.2} in", radius);
            }

            println!("\nStraight 24 in: {}", advance_straight(current_pose, 24.0));

            println!("\nSwinging...");
            for i in 0..num_steps {
                current_pose = model.advance_arc(current_pose, v_left, v_right, dt);
                println!("Step {:>2}: Pose: {}", i + 1, current_pose);
            }

            let home = Pose::default();
            println!("\nBearing back to start: {:.2}°", heading_toward(&current_pose, &home, Direction::Forward));
            println!("Turn needed: {:.2}°", shortest_delta(heading_toward(&current_pose, &home, Direction::Forward), current_pose.theta));
            println!("Opposite alliance start: {}", current_pose.mirrored());
        }
        Err(e) => {
            eprintln!("Failed to build drive model: {}", e);
            eprintln!("Please ensure rpm ({}), wheel diameter ({}) and track width ({}) are positive.", drive_rpm, wheel_diameter, track_width);
        }
    }
}
