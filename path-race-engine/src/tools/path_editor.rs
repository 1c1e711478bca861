use bevy::prelude::*;
use constants::path::MIN_LOOP_POINTS;
use serde::{Deserialize, Serialize};

use crate::engine::core::config::EditorConfig;
use crate::engine::core::errors::PathError;
use crate::engine::curve::Curve;

/// Identity of a live waypoint. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaypointId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub id: WaypointId,
    pub position: Vec3,
}

/// Full editor state captured before an edit.
#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    positions: Vec<Vec3>,
    forced_closed: bool,
}

#[derive(Debug, Default)]
struct EditHistory {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
}

/// Live waypoints being sketched, with undo/redo and the curve through them.
#[derive(Resource, Debug)]
pub struct PathEditor {
    waypoints: Vec<Waypoint>,
    next_id: u32,
    history: EditHistory,
    forced_closed: bool,
    curve: Option<Curve>,
    dragging: Option<WaypointId>,
    config: EditorConfig,
}

impl Default for PathEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl PathEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            waypoints: Vec::new(),
            next_id: 0,
            history: EditHistory::default(),
            forced_closed: false,
            curve: None,
            dragging: None,
            config,
        }
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn positions(&self) -> Vec<Vec3> {
        self.waypoints.iter().map(|waypoint| waypoint.position).collect()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn curve(&self) -> Option<&Curve> {
        self.curve.as_ref()
    }

    pub fn dragging(&self) -> Option<WaypointId> {
        self.dragging
    }

    pub fn can_undo(&self) -> bool {
        !self.history.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.history.redo.is_empty()
    }

    /// Closed when forced by `close_loop`, or when the ends meet within the auto-close epsilon.
    pub fn is_closed(&self) -> bool {
        if self.forced_closed {
            return true;
        }
        match (self.waypoints.first(), self.waypoints.last()) {
            (Some(first), Some(last)) if self.waypoints.len() > 2 => {
                first.position.distance(last.position) < self.config.auto_close_epsilon
            }
            _ => false,
        }
    }

    /// Append a waypoint lifted above the clicked surface point.
    pub fn add_waypoint(&mut self, surface_point: Vec3, record_history: bool) -> WaypointId {
        if record_history {
            self.record();
        }
        let id = self.push_waypoint(surface_point + Vec3::Y * self.config.waypoint_lift);
        self.rebuild_curve();
        id
    }

    pub fn remove_all(&mut self) {
        self.record();
        self.waypoints.clear();
        self.forced_closed = false;
        self.dragging = None;
        self.rebuild_curve();
    }

    pub fn close_loop(&mut self) -> Result<(), PathError> {
        if self.waypoints.len() < MIN_LOOP_POINTS {
            return Err(PathError::LoopNeedsThreePoints {
                found: self.waypoints.len(),
            });
        }
        self.record();
        self.forced_closed = true;
        self.rebuild_curve();
        Ok(())
    }

    /// Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo.pop() else {
            return false;
        };
        let current = self.snapshot();
        self.history.redo.push(current);
        self.restore(snapshot);
        true
    }

    /// Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo.pop() else {
            return false;
        };
        let current = self.snapshot();
        self.history.undo.push(current);
        self.restore(snapshot);
        true
    }

    /// Replace the waypoints with a stored path for editing. Not recorded in history.
    pub fn load_points(&mut self, points: &[Vec3], closed: bool) {
        self.waypoints.clear();
        self.dragging = None;
        for point in points {
            self.push_waypoint(*point);
        }
        self.forced_closed = closed;
        self.rebuild_curve();
    }

    /// Start dragging a waypoint; the pre-drag state becomes one undo step.
    pub fn begin_drag(&mut self, id: WaypointId) -> bool {
        if self.index_of(id).is_none() {
            return false;
        }
        self.record();
        self.dragging = Some(id);
        true
    }

    pub fn move_waypoint(&mut self, id: WaypointId, position: Vec3) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.waypoints[index].position = position;
        self.rebuild_curve();
        true
    }

    /// Finish a drag. Releasing the last waypoint near the first snaps it shut.
    /// Returns true when the snap happened.
    pub fn end_drag(&mut self, id: WaypointId) -> bool {
        if self.dragging == Some(id) {
            self.dragging = None;
        }

        let count = self.waypoints.len();
        if count < MIN_LOOP_POINTS || self.waypoints[count - 1].id != id {
            return false;
        }

        let first = self.waypoints[0].position;
        let last = &mut self.waypoints[count - 1];
        if last.position.distance(first) >= self.config.drag_snap_distance {
            return false;
        }

        last.position = first;
        self.rebuild_curve();
        true
    }

    /// Waypoint closest to `point` within `radius`.
    pub fn nearest_waypoint(&self, point: Vec3, radius: f32) -> Option<WaypointId> {
        self.waypoints
            .iter()
            .map(|waypoint| (waypoint.id, waypoint.position.distance(point)))
            .filter(|(_, distance)| *distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    fn push_waypoint(&mut self, position: Vec3) -> WaypointId {
        let id = WaypointId(self.next_id);
        self.next_id += 1;
        self.waypoints.push(Waypoint { id, position });
        id
    }

    fn index_of(&self, id: WaypointId) -> Option<usize> {
        self.waypoints.iter().position(|waypoint| waypoint.id == id)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            positions: self.positions(),
            forced_closed: self.forced_closed,
        }
    }

    fn record(&mut self) {
        let snapshot = self.snapshot();
        self.history.undo.push(snapshot);
        self.history.redo.clear();
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.waypoints.clear();
        self.dragging = None;
        for position in snapshot.positions {
            self.push_waypoint(position);
        }
        self.forced_closed = snapshot.forced_closed;
        self.rebuild_curve();
    }

    fn rebuild_curve(&mut self) {
        self.curve = Curve::build(&self.positions(), self.is_closed()).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_with(points: &[Vec3]) -> PathEditor {
        let mut editor = PathEditor::default();
        for point in points {
            editor.add_waypoint(*point, true);
        }
        editor
    }

    #[test]
    fn added_waypoints_are_lifted_and_build_a_curve() {
        let editor = editor_with(&[Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)]);
        assert_eq!(editor.positions()[0], Vec3::new(0.0, 0.5, 0.0));
        assert!(editor.curve().is_some());
        assert!(!editor.is_closed());
    }

    #[test]
    fn undo_and_redo_retrace_the_edit_sequence() {
        let points: Vec<Vec3> = (0..5).map(|i| Vec3::new(i as f32 * 3.0, 0.0, 0.0)).collect();
        let mut editor = PathEditor::default();
        let mut states = vec![editor.positions()];
        for point in &points {
            editor.add_waypoint(*point, true);
            states.push(editor.positions());
        }

        for k in (0..points.len()).rev() {
            assert!(editor.undo());
            assert_eq!(editor.positions(), states[k]);
        }
        assert!(!editor.undo());

        for k in 1..=points.len() {
            assert!(editor.redo());
            assert_eq!(editor.positions(), states[k]);
        }
        assert!(!editor.redo());
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut editor = editor_with(&[Vec3::ZERO, Vec3::X]);
        editor.undo();
        assert!(editor.can_redo());
        editor.add_waypoint(Vec3::Z, true);
        assert!(!editor.can_redo());
    }

    #[test]
    fn restored_waypoints_get_new_identities() {
        let mut editor = editor_with(&[Vec3::ZERO, Vec3::X]);
        let before: Vec<_> = editor.waypoints().iter().map(|w| w.id).collect();
        editor.undo();
        editor.redo();
        let after: Vec<_> = editor.waypoints().iter().map(|w| w.id).collect();
        assert!(before.iter().all(|id| !after.contains(id)));
    }

    #[test]
    fn close_loop_needs_three_points() {
        let mut editor = editor_with(&[Vec3::ZERO, Vec3::X * 5.0]);
        assert_eq!(
            editor.close_loop(),
            Err(PathError::LoopNeedsThreePoints { found: 2 })
        );
        assert!(!editor.is_closed());
        assert!(!editor.can_redo());
        assert_eq!(editor.len(), 2);

        editor.add_waypoint(Vec3::Z * 5.0, true);
        assert!(editor.close_loop().is_ok());
        assert!(editor.is_closed());
        assert!(editor.curve().unwrap().is_closed());

        editor.undo();
        assert!(!editor.is_closed());
    }

    #[test]
    fn matching_endpoints_close_automatically() {
        let editor = editor_with(&[Vec3::ZERO, Vec3::X * 5.0, Vec3::Z * 5.0, Vec3::new(0.05, 0.0, 0.0)]);
        assert!(editor.is_closed());
    }

    #[test]
    fn remove_all_clears_forced_loop() {
        let mut editor = editor_with(&[Vec3::ZERO, Vec3::X * 5.0, Vec3::Z * 5.0]);
        editor.close_loop().unwrap();
        editor.remove_all();
        assert!(editor.is_empty());
        assert!(!editor.is_closed());
        assert!(editor.curve().is_none());
    }

    #[test]
    fn drag_is_one_undo_step_and_snaps_closed() {
        let mut editor = editor_with(&[Vec3::ZERO, Vec3::X * 10.0, Vec3::new(10.0, 0.0, 10.0)]);
        let last = editor.waypoints()[2].id;
        let original = editor.positions();

        assert!(editor.begin_drag(last));
        editor.move_waypoint(last, Vec3::new(5.0, 0.5, 5.0));
        editor.move_waypoint(last, Vec3::new(1.0, 0.5, 1.0));
        assert!(editor.end_drag(last));
        assert_eq!(editor.positions()[2], editor.positions()[0]);
        assert!(editor.is_closed());

        editor.undo();
        assert_eq!(editor.positions(), original);
    }

    #[test]
    fn loading_points_skips_history_and_lift() {
        let mut editor = PathEditor::default();
        editor.load_points(&[Vec3::ZERO, Vec3::X, Vec3::Z], true);
        assert_eq!(editor.positions(), vec![Vec3::ZERO, Vec3::X, Vec3::Z]);
        assert!(editor.is_closed());
        assert!(!editor.can_undo());
    }
}
