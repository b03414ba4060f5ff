use std::sync::Arc;
use std::thread::JoinHandle;

use autonpath_routine::{
    Alliance, DriveModel, InjectionConfig, MatchState, OfflineChassis, PathLog, PreviewPath, RoutineError,
    RoutineRegistry,
};
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use crate::blackboard::{Blackboard, raise_fault, touch_record};
use crate::config::Settings;
use crate::sim::SimChassis;

/// Ask for the routine at `index` to be recorded and previewed for `alliance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRequest {
    pub index: usize,
    pub alliance: Alliance,
}

pub struct Recording {
    pub routine: String,
    pub log: PathLog,
    pub path: PreviewPath,
}

/// Runs routines from the registry and densifies the result.
pub struct Recorder {
    registry: Arc<RoutineRegistry>,
    model: DriveModel,
    injection: InjectionConfig,
    bench: bool,
    time_scale: f64,
}

impl Recorder {
    pub fn new(registry: Arc<RoutineRegistry>, settings: &Settings) -> Result<Self, RoutineError> {
        Ok(Recorder {
            registry,
            model: settings.drive_model()?,
            injection: settings.injection_config()?,
            bench: settings.viewer.bench,
            time_scale: settings.viewer.time_scale,
        })
    }

    /// Dry run, or a bench run against [`SimChassis`] when bench mode is on.
    pub fn record(&self, request: RecordRequest) -> Result<Recording, RoutineError> {
        let name = self.registry.name_at(request.index)?;
        let log = if self.bench {
            let mut chassis = SimChassis::new(self.model, self.time_scale);
            let log = self.registry.record(name, &mut chassis, MatchState::AutoOdom, self.model)?;
            debug!(dispatched = chassis.dispatched(), "Bench run finished");
            log
        } else {
            let mut chassis = OfflineChassis::default();
            self.registry.record(name, &mut chassis, MatchState::Disabled, self.model)?
        };
        let path = PreviewPath::from_log(&log, self.model, &self.injection, request.alliance);
        Ok(Recording {
            routine: name.to_string(),
            log,
            path,
        })
    }
}

/// Serve record requests on a dedicated thread; bench runs may block on simulated waits.
pub fn spawn_recorder(
    recorder: Recorder,
    mut requests: broadcast::Receiver<Arc<RecordRequest>>,
    path_tx: watch::Sender<Arc<PreviewPath>>,
    bb: Blackboard,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new().name("recorder".into()).spawn(move || {
        info!("Recorder thread started.");
        loop {
            match requests.blocking_recv() {
                Ok(request) => match recorder.record(*request) {
                    Ok(recording) => {
                        info!(
                            routine = %recording.routine,
                            waypoints = recording.log.len(),
                            dense = recording.path.len(),
                            alliance = ?request.alliance,
                            "Routine recorded for preview"
                        );
                        debug!("Logged path:\n{}", recording.log);
                        touch_record(&bb, recording.log.len());
                        if path_tx.send(Arc::new(recording.path)).is_err() {
                            warn!("Preview path channel has no receivers. Recorder thread exiting.");
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Failed to record routine: {}", e);
                        raise_fault(&bb, &e.to_string());
                    }
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Record request receiver lagged by {} messages.", n);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("Record request channel closed. Recorder thread exiting.");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Topic;
    use crate::blackboard::snapshot;
    use crate::config::{DrivetrainSettings, InjectionSettings, PreviewSettings, ViewerSettings};
    use crate::routines;

    fn settings(bench: bool) -> Settings {
        Settings {
            drivetrain: DrivetrainSettings {
                drive_rpm: 450.0,
                wheel_diameter: 3.25,
                track_width: 12.0,
            },
            injection: InjectionSettings {
                lookahead: 1.0,
                max_iterations: 10_000,
            },
            preview: PreviewSettings {
                start_hold_ms: 500,
                end_hold_ms: 1000,
                idle_ms: 10,
            },
            viewer: ViewerSettings {
                routine: "solo_awp".to_string(),
                alliance: Alliance::Red,
                bench,
                time_scale: 0.0,
                frame_capacity: 16,
            },
        }
    }

    fn recorder(bench: bool) -> Recorder {
        Recorder::new(Arc::new(routines::library().unwrap()), &settings(bench)).unwrap()
    }

    #[test]
    fn test_record_dry_and_bench() {
        let request = RecordRequest {
            index: 0,
            alliance: Alliance::Blue,
        };
        let dry = recorder(false).record(request).unwrap();
        assert_eq!(dry.routine, "solo_awp");
        assert_eq!(dry.path.alliance(), Alliance::Blue);
        assert!(dry.path.len() > dry.log.len());

        let bench = recorder(true).record(request).unwrap();
        assert_eq!(bench.routine, "solo_awp");
        assert!(!bench.log.is_empty());
    }

    #[test]
    fn test_record_out_of_range() {
        let request = RecordRequest {
            index: 99,
            alliance: Alliance::Red,
        };
        let result = recorder(false).record(request);
        assert!(matches!(result, Err(RoutineError::IndexOutOfRange { index: 99, len: 4 })));
    }

    #[test]
    fn test_recorder_thread_publishes_paths() {
        let bb: Blackboard = Arc::default();
        let requests: Topic<RecordRequest> = Topic::new(4);
        let (path_tx, path_rx) = watch::channel(Arc::new(PreviewPath::empty(
            DriveModel::new(450.0, 3.25, 12.0).unwrap(),
        )));
        let handle = spawn_recorder(recorder(false), requests.subscribe(), path_tx, bb.clone()).unwrap();

        assert!(requests.publish(RecordRequest {
            index: 99,
            alliance: Alliance::Red,
        }));
        assert!(requests.publish(RecordRequest {
            index: 3,
            alliance: Alliance::Red,
        }));
        drop(requests);
        handle.join().unwrap();

        assert!(!path_rx.borrow().is_empty());
        let state = snapshot(&bb);
        assert!(state.faults.is_empty());
        assert!(state.waypoints > 0);
    }
}
