//! Path preview: steps through a densified path at the pace the robot would
//! drive it and publishes one frame per step for a display surface.

use std::sync::Arc;
use std::time::Duration;

use autonpath_kinematics::{DriveModel, travel_time};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::coordinate::{Coordinate, PathLog};
use crate::inject::InjectionConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Field side the routine is previewed for.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alliance {
    /// Routines are written from this side.
    #[default]
    Red,
    /// Mirrored across the field centre.
    Blue,
}

impl Alliance {
    /// The other alliance.
    pub fn toggled(self) -> Self {
        match self {
            Alliance::Red => Alliance::Blue,
            Alliance::Blue => Alliance::Red,
        }
    }

    /// Transform a point into this alliance's frame.
    pub fn apply(self, point: Coordinate) -> Coordinate {
        match self {
            Alliance::Red => point,
            Alliance::Blue => point.mirrored(),
        }
    }
}

/// Immutable snapshot handed to the preview task.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewPath {
    points: Vec<Coordinate>,
    model: DriveModel,
    lookahead: f64,
    alliance: Alliance,
}

impl PreviewPath {
    /// Wrap points that are already densified.
    pub fn new(points: Vec<Coordinate>, model: DriveModel, lookahead: f64, alliance: Alliance) -> Self {
        PreviewPath {
            points,
            model,
            lookahead,
            alliance,
        }
    }

    /// Densify a recorded log for display.
    pub fn from_log(log: &PathLog, model: DriveModel, config: &InjectionConfig, alliance: Alliance) -> Self {
        let points: Vec<Coordinate> = log.densify(&model, config).collect();
        debug!(logged = log.len(), dense = points.len(), ?alliance, "Built preview path");
        Self::new(points, model, config.lookahead(), alliance)
    }

    /// A path with nothing to show.
    pub fn empty(model: DriveModel) -> Self {
        Self::new(Vec::new(), model, 1.0, Alliance::Red)
    }

    /// Densified points, in the routine's own frame.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Number of densified points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when there is nothing to animate.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Alliance the points are displayed for.
    pub fn alliance(&self) -> Alliance {
        self.alliance
    }

    /// Point `index` as displayed, mirrored for the blue alliance.
    pub fn display_point(&self, index: usize) -> Option<Coordinate> {
        self.points.get(index).map(|point| self.alliance.apply(*point))
    }

    /// How long the robot takes to reach the point after `point`.
    ///
    /// Pauses hold for their own duration. Motion holds for one lookahead
    /// step at the average side velocity, or at the moving side's velocity
    /// when the sides cancel out.
    pub fn dwell(&self, point: &Coordinate) -> Duration {
        if let Some(pause) = point.pause_duration() {
            return pause;
        }
        let v_left = self.model.wheel_velocity(point.left);
        let v_right = self.model.wheel_velocity(point.right);
        let average = (v_left + v_right) / 2.0;
        let velocity = if average != 0.0 {
            average
        } else if v_left != 0.0 {
            v_left
        } else {
            v_right
        };
        let seconds = travel_time(self.lookahead, velocity.abs());
        if seconds.is_finite() && seconds > 0.0 {
            Duration::from_secs_f64(seconds)
        } else {
            Duration::ZERO
        }
    }
}

/// Fixed holds of the preview loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewTiming {
    /// Extra hold after the first frame so the start pose is visible.
    pub start_hold: Duration,
    /// Extra hold on the last frame before wrapping.
    pub end_hold: Duration,
    /// Tick used while there is nothing to show.
    pub idle: Duration,
}

impl Default for PreviewTiming {
    fn default() -> Self {
        PreviewTiming {
            start_hold: Duration::from_millis(500),
            end_hold: Duration::from_millis(1000),
            idle: Duration::from_millis(10),
        }
    }
}

/// One animation step.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewFrame {
    /// Index into the densified path.
    pub index: usize,
    /// Pose to draw, already in the alliance frame. `None` hides the robot.
    pub point: Option<Coordinate>,
    /// How long to show this frame.
    pub hold: Duration,
}

/// Pure stepper over a [`PreviewPath`]; loops forever.
#[derive(Debug, Clone)]
pub struct PreviewPlayer {
    path: Arc<PreviewPath>,
    timing: PreviewTiming,
    index: usize,
}

impl PreviewPlayer {
    /// Start at the first point of `path`.
    pub fn new(path: Arc<PreviewPath>, timing: PreviewTiming) -> Self {
        PreviewPlayer { path, timing, index: 0 }
    }

    /// Path being played.
    pub fn path(&self) -> &Arc<PreviewPath> {
        &self.path
    }

    /// Produce the frame at the cursor and advance it, wrapping at the end.
    pub fn next_frame(&mut self) -> PreviewFrame {
        let len = self.path.len();
        if len < 2 {
            return PreviewFrame {
                index: 0,
                point: None,
                hold: self.timing.idle,
            };
        }

        let index = self.index;
        let raw = self.path.points[index];
        let mut hold = self.path.dwell(&raw);
        if index == 1 {
            hold += self.timing.start_hold;
        }
        if index + 1 == len {
            hold += self.timing.end_hold;
            self.index = 0;
        } else {
            self.index += 1;
        }

        PreviewFrame {
            index,
            point: self.path.display_point(index),
            hold,
        }
    }
}

/// Preview loop: publishes frames and restarts whenever a new path arrives.
///
/// # Arguments
/// * `path_rx` - A Tokio watch receiver carrying the latest `Arc<PreviewPath>`.
/// * `play_rx` - A Tokio watch receiver carrying the play state. While it reads
///   `false` the cursor stays put and no frames are published.
/// * `frame_tx` - A Tokio broadcast sender for the produced `Arc<PreviewFrame>`s.
/// * `timing` - Fixed holds of the loop.
///
/// Returns once either watch sender is dropped.
pub async fn run_preview_task(
    mut path_rx: watch::Receiver<Arc<PreviewPath>>,
    mut play_rx: watch::Receiver<bool>,
    frame_tx: broadcast::Sender<Arc<PreviewFrame>>,
    timing: PreviewTiming,
) -> anyhow::Result<()> {
    info!("Preview task started");
    let mut player = PreviewPlayer::new(path_rx.borrow_and_update().clone(), timing);

    loop {
        if !*play_rx.borrow_and_update() {
            debug!(index = player.index, "Preview paused");
            tokio::select! {
                changed = play_rx.changed() => {
                    if changed.is_err() {
                        info!("Playback control closed, stopping preview task");
                        return Ok(());
                    }
                }
                changed = path_rx.changed() => {
                    if changed.is_err() {
                        info!("Preview path source closed, stopping preview task");
                        return Ok(());
                    }
                    player = restart(&mut path_rx, timing);
                }
            }
            continue;
        }

        let frame = player.next_frame();
        let hold = frame.hold;
        if frame_tx.receiver_count() > 0 {
            if let Err(e) = frame_tx.send(Arc::new(frame)) {
                warn!("Failed to publish preview frame: {}", e);
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(hold) => {}
            changed = play_rx.changed() => {
                if changed.is_err() {
                    info!("Playback control closed, stopping preview task");
                    return Ok(());
                }
            }
            changed = path_rx.changed() => {
                if changed.is_err() {
                    info!("Preview path source closed, stopping preview task");
                    return Ok(());
                }
                player = restart(&mut path_rx, timing);
            }
        }
    }
}

fn restart(path_rx: &mut watch::Receiver<Arc<PreviewPath>>, timing: PreviewTiming) -> PreviewPlayer {
    let path = path_rx.borrow_and_update().clone();
    info!(points = path.len(), alliance = ?path.alliance(), "Preview restarted");
    PreviewPlayer::new(path, timing)
}
