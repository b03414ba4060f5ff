mod blackboard; // shared viewer state
mod bus; // broadcast topics
mod config; // settings from config/default.toml
mod graphics; // macroquad field view
mod recorder; // records routines into preview paths
mod routines; // routine library
mod sim; // bench chassis

use blackboard::{Blackboard, State};
use bus::Topic;
use graphics::window_conf;
use recorder::{RecordRequest, Recorder, spawn_recorder};

use autonpath_routine::{PreviewFrame, PreviewPath, run_preview_task};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Autonpath preview started. Loading configuration and routines...");

    let settings = match config::load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Cannot start without configuration: {}", e);
            return;
        }
    };
    let model = match settings.drive_model() {
        Ok(model) => model,
        Err(e) => {
            error!("Invalid drivetrain settings: {}", e);
            return;
        }
    };
    let registry = match routines::library() {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            error!("Failed to build routine library: {}", e);
            return;
        }
    };
    let recorder = match Recorder::new(Arc::clone(&registry), &settings) {
        Ok(recorder) => recorder,
        Err(e) => {
            error!("Invalid injection settings: {}", e);
            return;
        }
    };

    let names: Vec<String> = registry.names().map(str::to_string).collect();
    let selected = match names.iter().position(|name| *name == settings.viewer.routine) {
        Some(index) => index,
        None => {
            warn!(routine = %settings.viewer.routine, "Configured routine not found, starting with the first one");
            0
        }
    };
    let alliance = settings.viewer.alliance;

    let bb: Blackboard = Arc::new(RwLock::new(State {
        selected,
        routine: names.get(selected).cloned().unwrap_or_default(),
        alliance,
        ..State::default()
    }));

    let (path_tx, path_rx) = watch::channel(Arc::new(PreviewPath::empty(model)));
    let (play_tx, play_rx) = watch::channel(true);
    let frame_topic: Topic<PreviewFrame> = Topic::new(settings.viewer.frame_capacity);
    let frame_rx_for_vis = frame_topic.subscribe();
    let request_topic: Topic<RecordRequest> = Topic::new(8);

    info!("Spawning recorder thread...");
    if let Err(e) = spawn_recorder(recorder, request_topic.subscribe(), path_tx, Arc::clone(&bb)) {
        error!("Failed to spawn recorder thread: {}", e);
        return;
    }
    request_topic.publish(RecordRequest { index: selected, alliance });

    let tokio_rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to start tokio runtime: {}", e);
            return;
        }
    };

    let timing = settings.preview_timing();
    let path_rx_for_preview = path_rx.clone();
    let frame_tx = frame_topic.sender();
    tokio_rt.spawn(async move {
        match run_preview_task(path_rx_for_preview, play_rx, frame_tx, timing).await {
            Ok(()) => info!("Preview task finished."),
            Err(e) => error!("Preview task failed: {:?}", e),
        }
    });

    graphics::run_visualization_loop(frame_rx_for_vis, path_rx, play_tx, bb, request_topic, names).await;
}
