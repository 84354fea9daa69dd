use crate::annotation::{AnnotationKind, AnnotationStore, Preview, MIN_POLYGON_VERTICES};
use crate::geometry::Point;
use crate::transform::{ViewTransform, ZOOM_STEP, ZOOM_STEP_FAST};

/// Clicking within this distance (image px) of a polygon's first vertex
/// closes it.
pub const CLOSE_POLYGON_RADIUS: f32 = 10.0;

/// Which annotation kind the primary button draws. Selected externally
/// (keyboard shortcut or control-panel toggle) and persists across drags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrawMode {
    #[default]
    Rectangle,
    Line,
    Polygon,
}

impl DrawMode {
    pub const ALL: [DrawMode; 3] = [DrawMode::Rectangle, DrawMode::Line, DrawMode::Polygon];

    pub fn label(self) -> &'static str {
        match self {
            DrawMode::Rectangle => "Rectangle",
            DrawMode::Line => "Line",
            DrawMode::Polygon => "Polygon",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    DraggingRect,
    DraggingLine,
    DrawingPolygon,
    Panning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    Primary,
    Secondary,
    Middle,
}

/// Pointer/keyboard input, positions in viewport coordinates. Wheel zooming
/// is handled atomically and never becomes a persistent state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    ButtonDown { button: Button, pos: Point },
    ButtonUp { button: Button, pos: Point },
    DoubleClick { button: Button, pos: Point },
    PointerMove { pos: Point },
    /// Wheel notches; positive zooms in. `fast` is the Ctrl-held step.
    Wheel { steps: f32, fast: bool, pos: Point },
    Escape,
}

/// Drives the annotation store and view transform from raw input events.
///
/// `handle` reports whether the event mutated either; when it did, the
/// caller must run a render pass before returning control to the event
/// source, so the very next paint reflects the change.
#[derive(Debug)]
pub struct InteractionMachine {
    state: InteractionState,
    mode: DrawMode,
    last_pointer: Point,
}

impl Default for InteractionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self {
            state: InteractionState::Idle,
            mode: DrawMode::default(),
            last_pointer: Point::ZERO,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DrawMode) {
        self.mode = mode;
    }

    /// Last pointer position seen, viewport coordinates.
    pub fn pointer(&self) -> Point {
        self.last_pointer
    }

    pub fn handle(
        &mut self,
        event: InputEvent,
        transform: &mut ViewTransform,
        store: &mut AnnotationStore,
    ) -> bool {
        match event {
            InputEvent::ButtonDown {
                button: Button::Primary,
                pos,
            } => self.primary_down(pos, transform, store),
            InputEvent::ButtonUp {
                button: Button::Primary,
                pos,
            } => self.primary_up(pos, transform, store),
            InputEvent::ButtonDown {
                button: Button::Secondary,
                ..
            } => self.secondary_down(transform, store),
            InputEvent::DoubleClick {
                button: Button::Secondary,
                ..
            } => {
                if store.is_empty() {
                    return false;
                }
                store.clear();
                true
            }
            InputEvent::ButtonDown {
                button: Button::Middle,
                pos,
            } => {
                if self.state == InteractionState::Idle {
                    self.state = InteractionState::Panning;
                }
                self.last_pointer = pos;
                false
            }
            InputEvent::ButtonUp {
                button: Button::Middle,
                ..
            } => {
                if self.state == InteractionState::Panning {
                    self.state = InteractionState::Idle;
                }
                false
            }
            InputEvent::PointerMove { pos } => self.pointer_move(pos, transform, store),
            InputEvent::Wheel { steps, fast, pos } => {
                let step = if fast { ZOOM_STEP_FAST } else { ZOOM_STEP };
                transform.apply_zoom(step.powf(steps), pos);
                true
            }
            InputEvent::Escape => {
                if matches!(
                    self.state,
                    InteractionState::DraggingRect
                        | InteractionState::DraggingLine
                        | InteractionState::DrawingPolygon
                ) {
                    store.cancel_preview();
                    self.state = InteractionState::Idle;
                    true
                } else {
                    false
                }
            }
            InputEvent::ButtonUp { .. } | InputEvent::DoubleClick { .. } => false,
        }
    }

    fn primary_down(
        &mut self,
        pos: Point,
        transform: &mut ViewTransform,
        store: &mut AnnotationStore,
    ) -> bool {
        self.last_pointer = pos;
        let image_pos = transform.clamp_to_image(transform.screen_to_image(pos));
        match (self.state, self.mode) {
            (InteractionState::Idle, DrawMode::Rectangle) => {
                match store.begin_preview(AnnotationKind::Rectangle, image_pos) {
                    Ok(()) => {
                        self.state = InteractionState::DraggingRect;
                        true
                    }
                    Err(e) => {
                        tracing::warn!("ignored draw start: {e}");
                        false
                    }
                }
            }
            (InteractionState::Idle, DrawMode::Line) => {
                match store.begin_preview(AnnotationKind::Line, image_pos) {
                    Ok(()) => {
                        self.state = InteractionState::DraggingLine;
                        true
                    }
                    Err(e) => {
                        tracing::warn!("ignored draw start: {e}");
                        false
                    }
                }
            }
            (InteractionState::Idle, DrawMode::Polygon) => {
                match store.begin_preview(AnnotationKind::Polygon, image_pos) {
                    Ok(()) => {
                        self.state = InteractionState::DrawingPolygon;
                        true
                    }
                    Err(e) => {
                        tracing::warn!("ignored draw start: {e}");
                        false
                    }
                }
            }
            (InteractionState::DrawingPolygon, _) => {
                let closes = matches!(
                    store.preview(),
                    Some(Preview::Polygon { vertices, .. })
                        if vertices.len() >= MIN_POLYGON_VERTICES
                            && vertices[0].distance(image_pos) < CLOSE_POLYGON_RADIUS
                );
                if closes {
                    store.commit_preview();
                    self.state = InteractionState::Idle;
                } else {
                    store.add_vertex(image_pos);
                }
                true
            }
            _ => false,
        }
    }

    fn primary_up(
        &mut self,
        pos: Point,
        transform: &mut ViewTransform,
        store: &mut AnnotationStore,
    ) -> bool {
        match self.state {
            InteractionState::DraggingRect | InteractionState::DraggingLine => {
                store.update_preview(transform.clamp_to_image(transform.screen_to_image(pos)));
                store.commit_preview();
                self.state = InteractionState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Right-click is overloaded: close the polygon while drawing one, undo
    /// the last annotation otherwise, and reset the view when there is
    /// nothing left to undo.
    fn secondary_down(
        &mut self,
        transform: &mut ViewTransform,
        store: &mut AnnotationStore,
    ) -> bool {
        match self.state {
            InteractionState::DrawingPolygon => {
                // Commits when the polygon has enough vertices, drops it otherwise.
                store.commit_preview();
                self.state = InteractionState::Idle;
                true
            }
            InteractionState::Idle => {
                if store.undo_last().is_none() {
                    transform.reset();
                }
                true
            }
            _ => false,
        }
    }

    fn pointer_move(
        &mut self,
        pos: Point,
        transform: &mut ViewTransform,
        store: &mut AnnotationStore,
    ) -> bool {
        let delta = pos - self.last_pointer;
        self.last_pointer = pos;
        match self.state {
            InteractionState::DraggingRect
            | InteractionState::DraggingLine
            | InteractionState::DrawingPolygon => {
                store.update_preview(transform.clamp_to_image(transform.screen_to_image(pos)));
                true
            }
            InteractionState::Panning => {
                transform.apply_pan(delta.x, delta.y);
                true
            }
            InteractionState::Idle => false,
        }
    }
}
