use macroquad::prelude::*;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use autonpath_routine::{Alliance, Coordinate, PreviewFrame, PreviewPath};

use crate::blackboard::{Blackboard, State, select, snapshot, toggle_alliance, toggle_playing};
use crate::bus::Topic;
use crate::recorder::RecordRequest;

// Function to configure the macroquad window
pub fn window_conf() -> Conf {
    Conf {
        window_title: "Autonpath Preview".to_string(),
        window_width: 760,
        window_height: 860,
        high_dpi: true,
        ..Default::default()
    }
}

const FIELD_INCHES: f32 = 144.0;
const TILE_INCHES: f32 = 24.0;
const ROBOT_INCHES: f32 = 14.0;
const HUD_HEIGHT: f32 = 110.0;

/// Field-to-screen mapping: origin at the field centre, +y up the screen.
struct FieldView {
    center: Vec2,
    scale: f32, // pixels per inch
}

impl FieldView {
    fn fit() -> Self {
        let side = screen_width().min(screen_height() - HUD_HEIGHT) * 0.95;
        FieldView {
            center: Vec2::new(screen_width() / 2.0, HUD_HEIGHT + (screen_height() - HUD_HEIGHT) / 2.0),
            scale: side / FIELD_INCHES,
        }
    }

    fn to_screen(&self, x: f64, y: f64) -> Vec2 {
        Vec2::new(
            self.center.x + x as f32 * self.scale,
            self.center.y - y as f32 * self.scale,
        )
    }

    /// Screen direction of a compass heading in degrees.
    fn heading(theta: f64) -> Vec2 {
        let t = theta.to_radians() as f32;
        Vec2::new(t.sin(), -t.cos())
    }
}

fn alliance_color(alliance: Alliance) -> Color {
    match alliance {
        Alliance::Red => Color::new(0.80, 0.15, 0.15, 1.0),
        Alliance::Blue => Color::new(0.15, 0.30, 0.85, 1.0),
    }
}

pub async fn run_visualization_loop(
    mut frame_rx: broadcast::Receiver<Arc<PreviewFrame>>,
    path_rx: watch::Receiver<Arc<PreviewPath>>,
    play_tx: watch::Sender<bool>,
    bb: Blackboard,
    requests: Topic<RecordRequest>,
    routines: Vec<String>,
) {
    let mut current: Option<PreviewFrame> = None;

    info!("Visualization loop starting inside graphics module...");

    loop {
        loop {
            match frame_rx.try_recv() {
                Ok(frame) => current = Some(*frame),
                Err(broadcast::error::TryRecvError::Empty) => break,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    debug!("Visualization frame receiver lagged by {} frames.", n);
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    error!("Preview frame channel closed. Exiting visualization loop.");
                    return;
                }
            }
        }

        handle_keys(&bb, &play_tx, &requests, &routines);

        let state = snapshot(&bb);
        let path = path_rx.borrow().clone();
        let view = FieldView::fit();

        clear_background(LIGHTGRAY);
        draw_field(&view);
        let index = current.map(|frame| frame.index).unwrap_or(0);
        draw_trail(&view, &path, index);
        if let Some(point) = current.and_then(|frame| frame.point) {
            draw_robot(&view, &point, alliance_color(path.alliance()));
        }
        draw_hud(&state, &path, current.as_ref(), routines.len());

        next_frame().await
    }
}

fn handle_keys(bb: &Blackboard, play_tx: &watch::Sender<bool>, requests: &Topic<RecordRequest>, routines: &[String]) {
    let count = routines.len();
    if count == 0 {
        return;
    }

    let state = snapshot(bb);
    let mut selected = state.selected.min(count - 1);
    let mut alliance = state.alliance;
    let mut rerecord = false;

    if is_key_pressed(KeyCode::Right) {
        selected = (selected + 1) % count;
        rerecord = true;
    }
    if is_key_pressed(KeyCode::Left) {
        selected = (selected + count - 1) % count;
        rerecord = true;
    }
    if is_key_pressed(KeyCode::A) {
        alliance = toggle_alliance(bb);
        rerecord = true;
    }
    if is_key_pressed(KeyCode::R) {
        rerecord = true;
    }
    if is_key_pressed(KeyCode::Space) {
        let playing = toggle_playing(bb);
        info!(playing, "Preview playback toggled");
        if play_tx.send(playing).is_err() {
            warn!("Preview task is not listening. Playback state dropped.");
        }
    }

    if rerecord {
        select(bb, selected, &routines[selected]);
        info!(routine = %routines[selected], ?alliance, "Requesting recording");
        if !requests.publish(RecordRequest { index: selected, alliance }) {
            warn!("Recorder is not listening. Request dropped.");
        }
    }
}

fn draw_field(view: &FieldView) {
    let half = FIELD_INCHES as f64 / 2.0;
    let corner = view.to_screen(-half, half);
    let side = FIELD_INCHES * view.scale;
    draw_rectangle(corner.x, corner.y, side, side, Color::new(0.55, 0.55, 0.58, 1.0));

    let tiles = (FIELD_INCHES / TILE_INCHES) as i32;
    for i in 1..tiles {
        let offset = (i as f32 * TILE_INCHES) as f64 - half;
        let a = view.to_screen(offset, -half);
        let b = view.to_screen(offset, half);
        draw_line(a.x, a.y, b.x, b.y, 1.0, GRAY);
        let a = view.to_screen(-half, offset);
        let b = view.to_screen(half, offset);
        draw_line(a.x, a.y, b.x, b.y, 1.0, GRAY);
    }
    draw_rectangle_lines(corner.x, corner.y, side, side, 3.0, DARKGRAY);
}

fn draw_trail(view: &FieldView, path: &PreviewPath, index: usize) {
    let color = alliance_color(path.alliance());
    let faded = Color::new(color.r, color.g, color.b, 0.3);
    for i in 1..path.len() {
        let (Some(from), Some(to)) = (path.display_point(i - 1), path.display_point(i)) else {
            continue;
        };
        let a = view.to_screen(from.x, from.y);
        let b = view.to_screen(to.x, to.y);
        let (shade, width) = if i <= index { (color, 3.0) } else { (faded, 2.0) };
        draw_line(a.x, a.y, b.x, b.y, width, shade);
        if to.is_pause() {
            draw_circle(b.x, b.y, 4.0, ORANGE);
        }
    }
}

fn draw_robot(view: &FieldView, point: &Coordinate, color: Color) {
    let center = view.to_screen(point.x, point.y);
    let forward = FieldView::heading(point.t) * (ROBOT_INCHES / 2.0 * view.scale);
    let right = Vec2::new(-forward.y, forward.x);

    let front_left = center + forward - right;
    let front_right = center + forward + right;
    let back_right = center - forward + right;
    let back_left = center - forward - right;
    draw_triangle(front_left, front_right, back_right, color);
    draw_triangle(front_left, back_right, back_left, color);

    let nose = center + forward * 1.4;
    draw_line(center.x, center.y, nose.x, nose.y, 3.0, BLACK);
}

fn draw_hud(state: &State, path: &PreviewPath, frame: Option<&PreviewFrame>, count: usize) {
    let status = if state.playing { "playing" } else { "paused" };
    draw_text(
        &format!(
            "Routine: {} [{}/{}]  Alliance: {:?}  ({})",
            state.routine,
            state.selected + 1,
            count,
            state.alliance,
            status
        ),
        10.0,
        22.0,
        22.0,
        BLACK,
    );
    draw_text(
        &format!("Waypoints: {}  Dense points: {}", state.waypoints, path.len()),
        10.0,
        44.0,
        20.0,
        BLACK,
    );

    let pose_line = match frame.and_then(|f| f.point.map(|p| (f.index, p))) {
        Some((index, point)) => format!("Robot [{}]: {}", index, point),
        None => "Robot: hidden".to_string(),
    };
    draw_text(&pose_line, 10.0, 66.0, 20.0, BLACK);

    match state.faults.first() {
        Some(fault) => draw_text(&format!("Fault: {}", fault), 10.0, 88.0, 20.0, RED),
        None => draw_text(
            "Left/Right: routine   A: alliance   Space: pause   R: re-record",
            10.0,
            88.0,
            18.0,
            DARKGRAY,
        ),
    };
}
