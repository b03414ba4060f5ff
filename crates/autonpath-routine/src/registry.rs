//! Named autonomous routines in selector order.

use autonpath_kinematics::DriveModel;
use tracing::{debug, info};

use crate::chassis::{Chassis, MatchState};
use crate::context::RoutineContext;
use crate::coordinate::PathLog;
use crate::error::RoutineError;

/// An autonomous routine: a straight sequence of wrapper calls.
pub trait Routine: Send + Sync {
    /// Issue the routine's commands against `ctx`.
    fn run(&self, ctx: &mut RoutineContext<'_>);
}

impl<F> Routine for F
where
    F: Fn(&mut RoutineContext<'_>) + Send + Sync,
{
    fn run(&self, ctx: &mut RoutineContext<'_>) {
        self(ctx)
    }
}

/// Routine table keyed by name, kept in registration order.
#[derive(Default)]
pub struct RoutineRegistry {
    entries: Vec<(String, Box<dyn Routine>)>,
}

impl RoutineRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a routine at the end of the selector.
    ///
    /// # Errors
    ///
    /// Returns `Err(RoutineError::DuplicateRoutine)` if `name` is taken.
    pub fn register<R>(&mut self, name: impl Into<String>, routine: R) -> Result<(), RoutineError>
    where
        R: Routine + 'static,
    {
        let name = name.into();
        if self.position(&name).is_some() {
            return Err(RoutineError::DuplicateRoutine(name));
        }
        debug!(name = %name, index = self.entries.len(), "Registered routine");
        self.entries.push((name, Box::new(routine)));
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(entry, _)| entry == name)
    }

    /// Look up a routine by name.
    pub fn get(&self, name: &str) -> Option<&dyn Routine> {
        self.position(name).map(|index| self.entries[index].1.as_ref())
    }

    /// Name of the routine at selector position `index`.
    ///
    /// # Errors
    ///
    /// Returns `Err(RoutineError::IndexOutOfRange)` past the last routine.
    pub fn name_at(&self, index: usize) -> Result<&str, RoutineError> {
        self.entries
            .get(index)
            .map(|(name, _)| name.as_str())
            .ok_or(RoutineError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    /// Names in selector order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of registered routines.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Execute `name` in a fresh context and return its path log.
    ///
    /// With [`MatchState::Disabled`] this is a dry run: the chassis only
    /// serves as the odometry source and receives no commands.
    ///
    /// # Errors
    ///
    /// Returns `Err(RoutineError::UnknownRoutine)` if nothing is registered under `name`.
    pub fn record(
        &self,
        name: &str,
        chassis: &mut dyn Chassis,
        state: MatchState,
        model: DriveModel,
    ) -> Result<PathLog, RoutineError> {
        let routine = self
            .get(name)
            .ok_or_else(|| RoutineError::UnknownRoutine(name.to_string()))?;
        info!(routine = name, ?state, "Running routine");
        let mut ctx = RoutineContext::new(chassis, state, model);
        routine.run(&mut ctx);
        Ok(ctx.finish())
    }
}
