use parking_lot::RwLock;
use std::{sync::Arc, time::Instant};

use autonpath_routine::Alliance;

/// Viewer state shared between the render loop and the recorder thread.
#[derive(Clone, Debug)]
pub struct State {
    /// Selector index of the routine on screen.
    pub selected: usize,
    pub routine: String,
    pub alliance: Alliance,
    pub playing: bool,
    /// Logged waypoints of the last recording.
    pub waypoints: usize,
    pub last_record_ts: Option<Instant>,
    pub faults: Vec<String>,
}

impl Default for State {
    fn default() -> Self {
        State {
            selected: 0,
            routine: String::new(),
            alliance: Alliance::Red,
            playing: true,
            waypoints: 0,
            last_record_ts: None,
            faults: Vec::new(),
        }
    }
}

pub type Blackboard = Arc<RwLock<State>>;

pub fn snapshot(bb: &Blackboard) -> State {
    (*bb.read()).clone()
}

/// Point the viewer at another routine.
pub fn select(bb: &Blackboard, index: usize, routine: &str) {
    let mut g = bb.write();
    g.selected = index;
    g.routine = routine.to_string();
}

pub fn toggle_alliance(bb: &Blackboard) -> Alliance {
    let mut g = bb.write();
    g.alliance = g.alliance.toggled();
    g.alliance
}

pub fn toggle_playing(bb: &Blackboard) -> bool {
    let mut g = bb.write();
    g.playing = !g.playing;
    g.playing
}

/// Note a finished recording and clear faults from earlier attempts.
pub fn touch_record(bb: &Blackboard, waypoints: usize) {
    let mut g = bb.write();
    g.waypoints = waypoints;
    g.last_record_ts = Some(Instant::now());
    g.faults.clear();
}

pub fn raise_fault(bb: &Blackboard, msg: &str) {
    let mut g = bb.write();
    if !g.faults.iter().any(|s| s == msg) {
        g.faults.push(msg.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_and_toggles() {
        let bb: Blackboard = Arc::default();
        select(&bb, 2, "skills");
        assert_eq!(toggle_alliance(&bb), Alliance::Blue);
        assert!(!toggle_playing(&bb));

        let state = snapshot(&bb);
        assert_eq!(state.selected, 2);
        assert_eq!(state.routine, "skills");
        assert_eq!(state.alliance, Alliance::Blue);
        assert!(!state.playing);
    }

    #[test]
    fn test_faults_deduplicate_and_clear() {
        let bb: Blackboard = Arc::default();
        raise_fault(&bb, "no routine named 'x'");
        raise_fault(&bb, "no routine named 'x'");
        assert_eq!(snapshot(&bb).faults.len(), 1);

        touch_record(&bb, 12);
        let state = snapshot(&bb);
        assert!(state.faults.is_empty());
        assert_eq!(state.waypoints, 12);
        assert!(state.last_record_ts.is_some());
    }
}
