//! The editing session.
//!
//! A [`Session`] owns one document, its history and connection-point index,
//! the selection and the clipboard. Input events are processed one at a time
//! through [`Session::handle_event`]; gestures buffer their provisional
//! geometry and reach the history exactly once, when they complete.

use std::collections::HashSet;
use std::mem;

use abdraw_core::{
    Connection, Document, Endpoint, Font, GridSettings, Handle, HandleKind, Shape, ShapeId,
    ShapeKind, SnapIndex, SnapPoint, Style,
};
use abdraw_geometry::{Bounds, Point, Routing};
use tracing::{debug, info, warn};

use crate::command::{Action, Command, ShapeEdit};
use crate::config::{SessionConfig, Tool};
use crate::event::{InputEvent, Key, Modifiers};
use crate::history::History;
use crate::tools;

/// What handling an event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing changed
    Ignored,
    /// Gesture, selection, view or grid state changed without a command
    Updated,
    Committed(Action),
    Undone(Action),
    Redone(Action),
    /// An active gesture was discarded
    Cancelled,
}

/// Observable state of the editing state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    DrawingShape,
    PlacingOrtho,
    DraggingSelection,
    ResizingHandle,
    SelectingMarquee,
    EditingText,
    EditingLabel,
}

/// Gesture in progress, with its provisional geometry
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Gesture {
    Idle,
    DrawingShape {
        tool: Tool,
        start: Point,
        start_snap: Option<SnapPoint>,
        end_snap: Option<SnapPoint>,
        preview: Option<Shape>,
    },
    PlacingOrtho {
        arrow: bool,
        waypoints: Vec<Point>,
        routing: Routing,
        start_snap: Option<SnapPoint>,
        /// Connection candidate of the most recent point
        end_snap: Option<SnapPoint>,
        cursor: Option<Point>,
        style: Style,
    },
    DraggingSelection {
        origin: Point,
        delta: Point,
    },
    ResizingHandle {
        id: ShapeId,
        handle: HandleKind,
        preview: Shape,
    },
    SelectingMarquee {
        origin: Point,
        current: Point,
        additive: bool,
    },
    /// New text when `target` is `None`, otherwise the content of an existing one
    EditingText {
        anchor: Point,
        target: Option<ShapeId>,
        text: String,
        font: Font,
        style: Style,
    },
    EditingLabel {
        id: ShapeId,
        text: String,
    },
}

impl Gesture {
    fn state(&self) -> SessionState {
        match self {
            Gesture::Idle => SessionState::Idle,
            Gesture::DrawingShape { .. } => SessionState::DrawingShape,
            Gesture::PlacingOrtho { .. } => SessionState::PlacingOrtho,
            Gesture::DraggingSelection { .. } => SessionState::DraggingSelection,
            Gesture::ResizingHandle { .. } => SessionState::ResizingHandle,
            Gesture::SelectingMarquee { .. } => SessionState::SelectingMarquee,
            Gesture::EditingText { .. } => SessionState::EditingText,
            Gesture::EditingLabel { .. } => SessionState::EditingLabel,
        }
    }

    pub(crate) fn text_buffer_mut(&mut self) -> Option<&mut String> {
        match self {
            Gesture::EditingText { text, .. } | Gesture::EditingLabel { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// An editing session over one document
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) document: Document,
    pub(crate) history: History,
    pub(crate) index: SnapIndex,
    /// Selected shapes, in selection order
    pub(crate) selection: Vec<ShapeId>,
    pub(crate) clipboard: Vec<Shape>,
    /// Pastes since the last copy, for cascading offsets
    pub(crate) paste_count: u32,
    pub(crate) gesture: Gesture,
    /// Tool the current gesture belongs to
    pub(crate) tool: Tool,
    pub(crate) hover_snap: Option<SnapPoint>,
    status: Option<String>,
    dirty: bool,
}

impl Session {
    /// Session over an empty document using the configured grid
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_document(config, Document::with_grid(config.grid))
    }

    fn with_document(config: &SessionConfig, document: Document) -> Self {
        let index = SnapIndex::build(&document);
        Self {
            document,
            history: History::default(),
            index,
            selection: Vec::new(),
            clipboard: Vec::new(),
            paste_count: 0,
            gesture: Gesture::Idle,
            tool: config.tool,
            hover_snap: None,
            status: None,
            dirty: false,
        }
    }

    /// Session over a loaded document. The configuration adopts its grid.
    pub fn open(config: &mut SessionConfig, document: Document) -> Self {
        config.grid = *document.grid();
        Self::with_document(config, document)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> &[ShapeId] {
        &self.selection
    }

    pub fn state(&self) -> SessionState {
        self.gesture.state()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.gesture, Gesture::Idle)
    }

    /// Number of shapes on the clipboard
    pub fn clipboard_len(&self) -> usize {
        self.clipboard.len()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Set a status message to display
    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Whether the document changed since it was created, loaded or saved
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Replace the document with an empty one
    pub fn new_document(&mut self, config: &SessionConfig) {
        self.document = Document::with_grid(config.grid);
        self.reset();
        info!("new document");
    }

    /// Replace the document with a loaded one. The configuration adopts its grid.
    pub fn load_document(&mut self, config: &mut SessionConfig, document: Document) {
        config.grid = *document.grid();
        self.document = document;
        self.reset();
        info!(shapes = self.document.len(), "document loaded");
    }

    fn reset(&mut self) {
        self.history.clear();
        self.index.rebuild(&self.document);
        self.selection.clear();
        self.paste_count = 0;
        self.gesture = Gesture::Idle;
        self.hover_snap = None;
        self.status = None;
        self.dirty = false;
    }

    /// Switch tools, cancelling any gesture in progress
    pub fn set_tool(&mut self, config: &mut SessionConfig, tool: Tool) -> Outcome {
        config.tool = tool;
        self.switch_tool(tool)
    }

    fn switch_tool(&mut self, tool: Tool) -> Outcome {
        let outcome = match self.cancel_gesture() {
            Outcome::Cancelled => Outcome::Cancelled,
            _ => Outcome::Updated,
        };
        self.tool = tool;
        self.set_status(format!("Tool: {}", tool.name()));
        outcome
    }

    /// Process one input event to completion
    pub fn handle_event(&mut self, config: &mut SessionConfig, event: InputEvent) -> Outcome {
        let switched = if config.tool != self.tool {
            self.switch_tool(config.tool)
        } else {
            Outcome::Ignored
        };
        let outcome = match event {
            InputEvent::KeyDown { key, modifiers } => self.handle_key(config, key, modifiers),
            _ => self.handle_pointer(config, &event),
        };
        if outcome == Outcome::Ignored {
            switched
        } else {
            outcome
        }
    }

    fn handle_pointer(&mut self, config: &SessionConfig, event: &InputEvent) -> Outcome {
        // A press anywhere closes an open text editor
        let pressed = matches!(
            event,
            InputEvent::PointerDown { .. } | InputEvent::Click { .. } | InputEvent::RightClick { .. }
        );
        let closed = if pressed && self.is_editing_text() {
            tools::text::commit(self)
        } else {
            Outcome::Ignored
        };

        let outcome = match self.tool {
            Tool::Select => tools::select::handle_select_event(self, config, event),
            Tool::Text => tools::text::handle_text_event(self, config, event),
            Tool::OrthoLine | Tool::OrthoArrow => tools::ortho::handle_ortho_event(self, config, event),
            Tool::Line
            | Tool::Arrow
            | Tool::Rectangle
            | Tool::Square
            | Tool::Circle
            | Tool::Ellipse
            | Tool::Triangle => tools::shape::handle_shape_event(self, config, event),
        };
        if outcome == Outcome::Ignored {
            closed
        } else {
            outcome
        }
    }

    fn handle_key(&mut self, config: &mut SessionConfig, key: Key, mods: Modifiers) -> Outcome {
        if self.is_editing_text() {
            return tools::text::handle_text_key(self, key, mods);
        }
        if mods.ctrl {
            return self.handle_shortcut(config, key, mods);
        }
        match key {
            Key::Escape => {
                if !self.is_idle() {
                    self.cancel_gesture()
                } else if !self.selection.is_empty() {
                    self.selection.clear();
                    Outcome::Updated
                } else {
                    Outcome::Ignored
                }
            }
            Key::Enter => match self.gesture {
                Gesture::PlacingOrtho { .. } => tools::ortho::finish(self),
                Gesture::Idle => tools::text::begin_edit_selected(self),
                _ => Outcome::Ignored,
            },
            Key::Char('r' | 'R') => self.flip_routing(),
            Key::Delete | Key::Backspace if self.is_idle() => self.delete_selected(),
            _ => Outcome::Ignored,
        }
    }

    fn handle_shortcut(&mut self, config: &mut SessionConfig, key: Key, mods: Modifiers) -> Outcome {
        let Key::Char(c) = key else {
            return Outcome::Ignored;
        };
        match c.to_ascii_lowercase() {
            'z' if mods.shift => self.redo(),
            'z' => self.undo(),
            'y' => self.redo(),
            'c' => self.copy(),
            'v' => self.paste(config),
            'a' => self.select_all(),
            'g' => self.toggle_grid_visible(config),
            'h' => self.toggle_grid_snap(config),
            'l' => tools::text::begin_label_edit(self),
            ']' => self.bring_to_front(),
            '[' => self.send_to_back(),
            _ => Outcome::Ignored,
        }
    }

    fn is_editing_text(&self) -> bool {
        matches!(
            self.gesture,
            Gesture::EditingText { .. } | Gesture::EditingLabel { .. }
        )
    }

    /// Discard the active gesture without touching the document
    pub fn cancel_gesture(&mut self) -> Outcome {
        self.hover_snap = None;
        if self.is_idle() {
            return Outcome::Ignored;
        }
        let state = self.gesture.state();
        self.gesture = Gesture::Idle;
        debug!(?state, "gesture cancelled");
        Outcome::Cancelled
    }

    /// Execute a command through the history. Commands with no effect are
    /// not recorded.
    pub(crate) fn commit(&mut self, command: Command) -> Outcome {
        if command.is_empty() {
            return Outcome::Updated;
        }
        match self.history.execute(command, &mut self.document) {
            Ok(action) => {
                self.after_mutation();
                info!(%action, shapes = self.document.len(), "committed");
                self.set_status(action.to_string());
                Outcome::Committed(action)
            }
            Err(err) => {
                warn!(%err, "command rejected");
                self.set_status(format!("Error: {err}"));
                Outcome::Ignored
            }
        }
    }

    fn after_mutation(&mut self) {
        self.index.rebuild(&self.document);
        self.selection.retain(|id| self.document.contains(id));
        self.dirty = true;
    }

    /// Undo the last command
    pub fn undo(&mut self) -> Outcome {
        self.cancel_gesture();
        match self.history.undo(&mut self.document) {
            Ok(Some(action)) => {
                self.after_mutation();
                info!(%action, "undo");
                self.set_status(format!("Undo: {action}"));
                Outcome::Undone(action)
            }
            Ok(None) => {
                self.set_status("Nothing to undo");
                Outcome::Ignored
            }
            Err(err) => {
                warn!(%err, "undo failed");
                self.set_status(format!("Undo error: {err}"));
                Outcome::Ignored
            }
        }
    }

    /// Redo the last undone command
    pub fn redo(&mut self) -> Outcome {
        self.cancel_gesture();
        match self.history.redo(&mut self.document) {
            Ok(Some(action)) => {
                self.after_mutation();
                info!(%action, "redo");
                self.set_status(format!("Redo: {action}"));
                Outcome::Redone(action)
            }
            Ok(None) => {
                self.set_status("Nothing to redo");
                Outcome::Ignored
            }
            Err(err) => {
                warn!(%err, "redo failed");
                self.set_status(format!("Redo error: {err}"));
                Outcome::Ignored
            }
        }
    }

    /// Copy selected shapes to the clipboard, in z-order
    pub fn copy(&mut self) -> Outcome {
        if self.selection.is_empty() {
            return Outcome::Ignored;
        }
        self.clipboard = self
            .document
            .iter()
            .filter(|s| self.selection.contains(&s.id))
            .cloned()
            .collect();
        self.paste_count = 0;
        self.set_status(format!("Copied {} shape(s)", self.clipboard.len()));
        Outcome::Updated
    }

    /// Paste the clipboard front-most with fresh ids, offset further on each
    /// repeated paste, and select the copies
    pub fn paste(&mut self, config: &SessionConfig) -> Outcome {
        if self.clipboard.is_empty() {
            self.set_status("Clipboard is empty");
            return Outcome::Ignored;
        }
        self.cancel_gesture();
        self.paste_count += 1;
        let steps = f64::from(self.paste_count);
        let offset = Point::new(config.paste_offset.x * steps, config.paste_offset.y * steps);
        let shapes: Vec<Shape> = self
            .clipboard
            .iter()
            .map(|s| Shape {
                id: ShapeId::new(),
                connections: Vec::new(),
                ..s.translated(offset)
            })
            .collect();
        let ids: Vec<ShapeId> = shapes.iter().map(|s| s.id.clone()).collect();
        let command = Command::insert(Action::Paste, &self.document, shapes);
        let outcome = self.commit(command);
        if matches!(outcome, Outcome::Committed(_)) {
            self.selection = ids;
        }
        outcome
    }

    pub fn select_all(&mut self) -> Outcome {
        self.cancel_gesture();
        self.selection = self.document.order();
        Outcome::Updated
    }

    /// Delete the selection. Lines attached to deleted shapes stay and are
    /// detached in the same command.
    pub fn delete_selected(&mut self) -> Outcome {
        if self.selection.is_empty() {
            return Outcome::Ignored;
        }
        self.cancel_gesture();
        let doomed: HashSet<ShapeId> = self.selection.iter().cloned().collect();
        let detach: Vec<ShapeEdit> = self
            .document
            .iter()
            .filter(|s| !doomed.contains(&s.id))
            .filter(|s| s.connections.iter().any(|c| doomed.contains(&c.target)))
            .map(|s| {
                let mut after = s.clone();
                after.connections.retain(|c| !doomed.contains(&c.target));
                ShapeEdit::new(s.clone(), after)
            })
            .collect();
        let ids = mem::take(&mut self.selection);
        let command = Command::composite(
            Action::Delete,
            vec![
                Command::edit(Action::Delete, detach),
                Command::remove(Action::Delete, &self.document, &ids),
            ],
        );
        self.commit(command)
    }

    pub fn bring_to_front(&mut self) -> Outcome {
        self.reorder_selection(Action::BringToFront)
    }

    pub fn send_to_back(&mut self) -> Outcome {
        self.reorder_selection(Action::SendToBack)
    }

    fn reorder_selection(&mut self, action: Action) -> Outcome {
        if self.selection.is_empty() {
            return Outcome::Ignored;
        }
        self.cancel_gesture();
        let mut reordered = self.document.clone();
        if action == Action::SendToBack {
            reordered.send_to_back_many(&self.selection);
        } else {
            reordered.bring_to_front_many(&self.selection);
        }
        let command = Command::reorder(action, self.document.order(), reordered.order());
        if command.is_empty() {
            return Outcome::Ignored;
        }
        self.commit(command)
    }

    /// Flip the routing of the ortho shape being placed, or of every selected
    /// ortho shape as one undoable edit
    pub fn flip_routing(&mut self) -> Outcome {
        if let Gesture::PlacingOrtho { routing, .. } = &mut self.gesture {
            *routing = routing.flipped();
            let name = routing.name();
            self.set_status(format!("Routing: {name}"));
            return Outcome::Updated;
        }
        if !self.is_idle() {
            return Outcome::Ignored;
        }
        let edits: Vec<ShapeEdit> = self
            .selected_shapes()
            .filter_map(|before| {
                let mut after = before.clone();
                match &mut after.kind {
                    ShapeKind::OrthoLine { routing, .. } | ShapeKind::OrthoArrow { routing, .. } => {
                        *routing = routing.flipped();
                    }
                    _ => return None,
                }
                Some(ShapeEdit::new(before.clone(), after))
            })
            .collect();
        if edits.is_empty() {
            return Outcome::Ignored;
        }
        self.commit(Command::edit(Action::FlipRouting, edits))
    }

    /// Give every selected shape a new style
    pub fn restyle_selection(&mut self, style: &Style) -> Outcome {
        self.cancel_gesture();
        let edits: Vec<ShapeEdit> = self
            .selected_shapes()
            .map(|before| {
                let after = Shape {
                    style: style.clone(),
                    ..before.clone()
                };
                ShapeEdit::new(before.clone(), after)
            })
            .collect();
        self.commit(Command::edit(Action::Restyle, edits))
    }

    pub fn toggle_grid_visible(&mut self, config: &mut SessionConfig) -> Outcome {
        let grid = GridSettings {
            visible: !config.grid.visible,
            ..config.grid
        };
        self.set_grid(config, grid)
    }

    pub fn toggle_grid_snap(&mut self, config: &mut SessionConfig) -> Outcome {
        let grid = GridSettings {
            snap: !config.grid.snap,
            ..config.grid
        };
        self.set_grid(config, grid)
    }

    /// Apply grid settings to both the configuration and the document.
    /// Grid changes are not part of the undo history.
    pub fn set_grid(&mut self, config: &mut SessionConfig, grid: GridSettings) -> Outcome {
        config.grid = grid;
        if *self.document.grid() != grid {
            self.document.set_grid(grid);
            self.dirty = true;
        }
        debug!(?grid, "grid settings changed");
        self.set_status(format!(
            "Grid: {} {}px, snap {}, {}",
            grid.kind.name(),
            grid.spacing,
            if grid.snap { "on" } else { "off" },
            if grid.visible { "shown" } else { "hidden" },
        ));
        Outcome::Updated
    }

    pub(crate) fn selected_shapes(&self) -> impl Iterator<Item = &Shape> + '_ {
        self.selection.iter().filter_map(|id| self.document.get(id))
    }

    /// Resolve a candidate point: a connection point within the snap radius
    /// wins, otherwise the grid applies when snapping is on
    pub(crate) fn snap_point(
        &self,
        config: &SessionConfig,
        raw: Point,
        exclude: Option<&ShapeId>,
    ) -> (Point, Option<SnapPoint>) {
        match self.index.nearest_snap(raw, exclude, config.snap_radius()) {
            Some(snap) => (snap.position, Some(snap)),
            None => (config.grid.snap(raw), None),
        }
    }

    /// Edits replacing shapes with `updated` versions, plus every line
    /// attached to them re-placed on the updated connection points
    pub(crate) fn with_followers(&self, updated: Vec<Shape>) -> Vec<ShapeEdit> {
        let changed: HashSet<&ShapeId> = updated.iter().map(|s| &s.id).collect();
        let lookup = |id: &ShapeId| {
            updated
                .iter()
                .find(|s| &s.id == id)
                .or_else(|| self.document.get(id))
        };
        let followers: Vec<ShapeEdit> = self
            .document
            .iter()
            .filter(|s| !changed.contains(&s.id))
            .filter(|s| s.connections.iter().any(|c| changed.contains(&c.target)))
            .map(|s| ShapeEdit::new(s.clone(), s.follow_connections(&lookup)))
            .collect();
        let mut edits: Vec<ShapeEdit> = updated
            .iter()
            .filter_map(|after| {
                let before = self.document.get(&after.id)?;
                Some(ShapeEdit::new(before.clone(), after.clone()))
            })
            .collect();
        edits.extend(followers);
        edits
    }

    /// Shapes to paint, back-most first: the document with live gesture
    /// previews applied and any provisional new shape on top
    pub fn visible_shapes(&self) -> Vec<Shape> {
        let overrides: Vec<Shape> = match &self.gesture {
            Gesture::DraggingSelection { delta, .. } => tools::select::moved_edits(self, *delta)
                .into_iter()
                .map(|e| e.after)
                .collect(),
            Gesture::ResizingHandle { preview, .. } => self
                .with_followers(vec![preview.clone()])
                .into_iter()
                .map(|e| e.after)
                .collect(),
            Gesture::EditingText {
                target: Some(id),
                text,
                ..
            } => self
                .document
                .get(id)
                .map(|s| tools::text::with_content(s, text))
                .into_iter()
                .collect(),
            _ => Vec::new(),
        };
        let mut shapes: Vec<Shape> = self
            .document
            .iter()
            .map(|s| overrides.iter().find(|o| o.id == s.id).unwrap_or(s).clone())
            .collect();
        shapes.extend(self.provisional_shape());
        shapes
    }

    /// The not-yet-committed shape of a drawing gesture
    pub fn provisional_shape(&self) -> Option<Shape> {
        match &self.gesture {
            Gesture::DrawingShape { preview, .. } => preview.clone(),
            Gesture::PlacingOrtho { .. } => tools::ortho::preview(&self.gesture),
            Gesture::EditingText { target: None, .. } => tools::text::preview(&self.gesture),
            _ => None,
        }
    }

    /// Handles of the selected shapes, at their previewed positions
    pub fn selection_handles(&self) -> Vec<(ShapeId, Handle)> {
        self.visible_shapes()
            .iter()
            .filter(|s| self.selection.contains(&s.id))
            .flat_map(|s| s.handles().into_iter().map(move |h| (s.id.clone(), h)))
            .collect()
    }

    /// Connection point the pointer is currently snapped to
    pub fn hover_snap(&self) -> Option<&SnapPoint> {
        self.hover_snap.as_ref()
    }

    /// Rubber band of an active marquee selection
    pub fn marquee(&self) -> Option<Bounds> {
        match self.gesture {
            Gesture::SelectingMarquee {
                origin, current, ..
            } => Some(Bounds::from_corners(origin, current)),
            _ => None,
        }
    }

    /// Text being typed into an open text or label editor
    pub fn text_input(&self) -> Option<&str> {
        match &self.gesture {
            Gesture::EditingText { text, .. } | Gesture::EditingLabel { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Connection for a line endpoint that landed on a snap point
pub(crate) fn connection_to(endpoint: Endpoint, snap: Option<SnapPoint>) -> Option<Connection> {
    snap.map(|s| Connection {
        endpoint,
        target: s.shape_id,
        point: s.index,
    })
}
