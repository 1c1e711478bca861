use bevy::prelude::*;
use constants::path::{MIN_LOOP_POINTS, MIN_PATH_POINTS};

use crate::engine::assets::documents::PathDocument;
use crate::engine::core::errors::{DocumentError, PathError};
use crate::engine::core::session::VehicleSlot;
use crate::engine::curve::Curve;
use crate::engine::motion::race::RaceState;
use crate::tools::path_editor::PathEditor;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredPath {
    pub name: String,
    pub points: Vec<Vec3>,
    pub closed: bool,
}

/// A stored path bound to a vehicle slot.
#[derive(Debug, Clone)]
pub struct AssignedPath {
    pub name: String,
    pub curve: Curve,
    /// `Some` only while a race using this path is running.
    pub race_state: Option<RaceState>,
}

impl AssignedPath {
    pub fn points(&self) -> &[Vec3] {
        self.curve.points()
    }
}

/// Result of saving the editor contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    pub index: usize,
    pub overwritten: bool,
}

/// Named stored paths plus the per-slot assignments built from them.
#[derive(Resource, Debug, Default)]
pub struct PathLibrary {
    paths: Vec<StoredPath>,
    selected: Option<usize>,
    editing: Option<usize>,
    assignments: [Option<AssignedPath>; 2],
}

impl PathLibrary {
    pub fn paths(&self) -> &[StoredPath] {
        &self.paths
    }

    pub fn get(&self, index: usize) -> Result<&StoredPath, PathError> {
        self.paths.get(index).ok_or(PathError::UnknownPath(index))
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_path(&self) -> Option<&StoredPath> {
        self.selected.and_then(|index| self.paths.get(index))
    }

    pub fn editing(&self) -> Option<usize> {
        self.editing
    }

    pub fn assignment(&self, slot: VehicleSlot) -> Option<&AssignedPath> {
        self.assignments[slot.index()].as_ref()
    }

    pub fn assignment_mut(&mut self, slot: VehicleSlot) -> Option<&mut AssignedPath> {
        self.assignments[slot.index()].as_mut()
    }

    /// Store a new path. A blank name becomes "My Path N".
    pub fn save(&mut self, points: &[Vec3], closed: bool, name: &str) -> Result<usize, PathError> {
        check_storable(points, closed)?;

        let name = match name.trim() {
            "" => format!("My Path {}", self.paths.len() + 1),
            trimmed => trimmed.to_string(),
        };
        self.paths.push(StoredPath {
            name,
            points: points.to_vec(),
            closed,
        });
        Ok(self.paths.len() - 1)
    }

    pub fn overwrite(&mut self, index: usize, points: &[Vec3], closed: bool) -> Result<(), PathError> {
        check_storable(points, closed)?;
        let path = self.paths.get_mut(index).ok_or(PathError::UnknownPath(index))?;
        path.points = points.to_vec();
        path.closed = closed;
        Ok(())
    }

    pub fn rename(&mut self, index: usize, name: &str) -> Result<(), PathError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PathError::EmptyName);
        }
        let path = self.paths.get_mut(index).ok_or(PathError::UnknownPath(index))?;
        path.name = name.to_string();
        Ok(())
    }

    /// Select a path for preview, or clear the selection.
    pub fn select(&mut self, index: Option<usize>) -> Result<(), PathError> {
        if let Some(index) = index {
            self.get(index)?;
        }
        self.selected = index;
        Ok(())
    }

    /// Load a stored path into the editor and remember it for overwriting.
    pub fn begin_edit(&mut self, index: usize, editor: &mut PathEditor) -> Result<(), PathError> {
        let path = self.get(index)?;
        editor.load_points(&path.points, path.closed);
        self.editing = Some(index);
        Ok(())
    }

    /// Save the editor contents, overwriting the path being edited when asked.
    pub fn save_from_editor(
        &mut self,
        editor: &PathEditor,
        name: &str,
        overwrite: bool,
    ) -> Result<SaveOutcome, PathError> {
        let points = editor.positions();
        let closed = editor.is_closed();

        let outcome = match self.editing.filter(|_| overwrite) {
            Some(index) => {
                self.overwrite(index, &points, closed)?;
                SaveOutcome {
                    index,
                    overwritten: true,
                }
            }
            None => SaveOutcome {
                index: self.save(&points, closed, name)?,
                overwritten: false,
            },
        };

        self.editing = None;
        Ok(outcome)
    }

    /// Bind a stored path to a slot, replacing any previous assignment.
    pub fn assign(&mut self, slot: VehicleSlot, index: usize) -> Result<&AssignedPath, PathError> {
        let path = self.get(index)?;
        let curve = Curve::build(&path.points, path.closed)?;
        let assigned = AssignedPath {
            name: path.name.clone(),
            curve,
            race_state: None,
        };
        Ok(self.assignments[slot.index()].insert(assigned))
    }

    pub fn deassign(&mut self, slot: VehicleSlot) -> Option<AssignedPath> {
        self.assignments[slot.index()].take()
    }

    pub fn load_document(&mut self, name: &str, document: &PathDocument) -> Result<usize, DocumentError> {
        document.validate()?;
        let name = name.trim_end_matches(".json").trim_end_matches(".path");
        self.save(&document.positions(), document.is_closed, name)
            .map_err(|err| match err {
                PathError::LoopNeedsThreePoints { found } => {
                    DocumentError::LoopNeedsThreePoints { found }
                }
                _ => DocumentError::TooFewPoints {
                    found: document.points.len(),
                },
            })
    }

    pub fn export(&self, index: usize) -> Result<PathDocument, PathError> {
        let path = self.get(index)?;
        Ok(PathDocument::new(&path.points, path.closed))
    }
}

/// Open paths need two points and closed loops three.
fn check_storable(points: &[Vec3], closed: bool) -> Result<(), PathError> {
    if points.len() < MIN_PATH_POINTS {
        return Err(PathError::TooFewPoints {
            required: MIN_PATH_POINTS,
            found: points.len(),
        });
    }
    if closed && points.len() < MIN_LOOP_POINTS {
        return Err(PathError::LoopNeedsThreePoints {
            found: points.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library_with_square() -> PathLibrary {
        let mut library = PathLibrary::default();
        let square = [
            Vec3::ZERO,
            Vec3::new(20.0, 0.0, 0.0),
            Vec3::new(20.0, 0.0, 20.0),
            Vec3::new(0.0, 0.0, 20.0),
        ];
        library.save(&square, true, "Square").unwrap();
        library
    }

    #[test]
    fn save_rejects_short_paths_and_defaults_names() {
        let mut library = PathLibrary::default();
        assert_eq!(
            library.save(&[Vec3::ZERO], false, "x"),
            Err(PathError::TooFewPoints { required: 2, found: 1 })
        );
        let index = library.save(&[Vec3::ZERO, Vec3::X], false, "   ").unwrap();
        assert_eq!(library.paths()[index].name, "My Path 1");
    }

    #[test]
    fn rename_ignores_blank_names() {
        let mut library = library_with_square();
        assert_eq!(library.rename(0, "  "), Err(PathError::EmptyName));
        assert_eq!(library.rename(3, "Loop"), Err(PathError::UnknownPath(3)));
        library.rename(0, " Loop ").unwrap();
        assert_eq!(library.paths()[0].name, "Loop");
    }

    #[test]
    fn assign_builds_curve_and_replaces_previous() {
        let mut library = library_with_square();
        library.save(&[Vec3::ZERO, Vec3::X * 10.0], false, "Line").unwrap();

        assert!(library.assign(VehicleSlot::Primary, 0).unwrap().curve.is_closed());
        library.assign(VehicleSlot::Primary, 1).unwrap();
        assert_eq!(library.assignment(VehicleSlot::Primary).unwrap().name, "Line");
        assert!(library.assignment(VehicleSlot::Secondary).is_none());
        assert_eq!(
            library.assign(VehicleSlot::Secondary, 9).err(),
            Some(PathError::UnknownPath(9))
        );
    }

    #[test]
    fn deassign_drops_race_state() {
        let mut library = library_with_square();
        library.assign(VehicleSlot::Secondary, 0).unwrap();
        library.assignment_mut(VehicleSlot::Secondary).unwrap().race_state = Some(RaceState::default());

        let removed = library.deassign(VehicleSlot::Secondary).unwrap();
        assert!(removed.race_state.is_some());
        assert!(library.assignment(VehicleSlot::Secondary).is_none());
    }

    #[test]
    fn editing_then_saving_overwrites_in_place() {
        let mut library = library_with_square();
        let mut editor = PathEditor::default();
        library.begin_edit(0, &mut editor).unwrap();
        assert_eq!(library.editing(), Some(0));

        editor.add_waypoint(Vec3::new(10.0, 0.0, 30.0), true);
        let outcome = library.save_from_editor(&editor, "", true).unwrap();
        assert_eq!(outcome, SaveOutcome { index: 0, overwritten: true });
        assert_eq!(library.paths().len(), 1);
        assert_eq!(library.paths()[0].points.len(), 5);
        assert_eq!(library.editing(), None);
    }

    #[test]
    fn declining_overwrite_saves_a_copy() {
        let mut library = library_with_square();
        let mut editor = PathEditor::default();
        library.begin_edit(0, &mut editor).unwrap();

        let outcome = library.save_from_editor(&editor, "Copy", false).unwrap();
        assert_eq!(outcome, SaveOutcome { index: 1, overwritten: false });
        assert_eq!(library.paths()[1].name, "Copy");
        assert!(library.paths()[1].closed);
    }

    #[test]
    fn documents_load_and_export() {
        let mut library = PathLibrary::default();
        let document = PathDocument::new(&[Vec3::ZERO, Vec3::X, Vec3::Z], true);
        let index = library.load_document("hill_climb.path.json", &document).unwrap();
        assert_eq!(library.paths()[index].name, "hill_climb");
        assert_eq!(library.export(index).unwrap(), document);

        let short = PathDocument::new(&[Vec3::ZERO], false);
        assert!(library.load_document("short", &short).is_err());
        assert_eq!(library.paths().len(), 1);
    }

    #[test]
    fn two_point_loops_are_refused_everywhere() {
        let mut library = library_with_square();
        let line = [Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)];
        assert_eq!(
            library.save(&line, true, "Pinch"),
            Err(PathError::LoopNeedsThreePoints { found: 2 })
        );
        assert_eq!(
            library.overwrite(0, &line, true),
            Err(PathError::LoopNeedsThreePoints { found: 2 })
        );
        assert_eq!(library.paths()[0].points.len(), 4);

        let json = r#"{"points":[{"x":0,"y":0,"z":0},{"x":10,"y":0,"z":0}],"isClosed":true}"#;
        let document: PathDocument = serde_json::from_str(json).unwrap();
        assert!(matches!(
            library.load_document("pinch.path.json", &document),
            Err(DocumentError::LoopNeedsThreePoints { found: 2 })
        ));
        assert_eq!(library.paths().len(), 1);

        let open = PathDocument::new(&line, false);
        assert!(library.load_document("line.path.json", &open).is_ok());
    }

    #[test]
    fn selecting_unknown_path_keeps_selection() {
        let mut library = library_with_square();
        library.select(Some(0)).unwrap();
        assert_eq!(library.select(Some(4)), Err(PathError::UnknownPath(4)));
        assert_eq!(library.selected(), Some(0));
        library.select(None).unwrap();
        assert!(library.selected_path().is_none());
    }
}
