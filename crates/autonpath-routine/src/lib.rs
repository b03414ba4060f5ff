#![doc = "Autonomous routine recording and path preview for differential-drive robots."]
#![doc = ""]
#![doc = "A routine is a sequence of motion wrapper calls on a [`RoutineContext`]. Each call"]
#![doc = "forwards the command to a [`Chassis`] during autonomous play and always logs the"]
#![doc = "predicted pose, so the same routine can be dry-run off the field and replayed"]
#![doc = "as a densified path."]

pub mod chassis;
pub mod context;
pub mod coordinate;
pub mod error;
pub mod inject;
pub mod preview;
pub mod registry;

pub use chassis::{Chassis, MatchState, OfflineChassis, SwingSide, WaitKind, WaitUntil};
pub use context::{AUTO_SLEW_DISTANCE, RoutineContext, resolve_turn};
pub use coordinate::{Coordinate, DensifiedPath, KEY, PathLog, TurnBehavior};
pub use error::RoutineError;
pub use inject::{InjectionConfig, inject_path, inject_point};
pub use preview::{Alliance, PreviewFrame, PreviewPath, PreviewPlayer, PreviewTiming, run_preview_task};
pub use registry::{Routine, RoutineRegistry};

pub use autonpath_kinematics::{Direction, DriveModel, KinematicsError, Pose};
