use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use crate::annotation::AnnotationStore;
use crate::controls::{ControlDef, ControlMax, SHOW_PARAM};
use crate::error::{ParamscopeError, Result};
use crate::frame::LabeledFrame;
use crate::geometry::{Point, Size};
use crate::interaction::{DrawMode, InputEvent, InteractionMachine};
use crate::params::{Constraint, ParameterSet};
use crate::render::{self, Scene, StatusLine};
use crate::snapshot::ParamSnapshot;
use crate::transform::ViewTransform;

/// Most recent log lines retained by the sink.
pub const LOG_CAPACITY: usize = 200;

/// External call duration above which the recompute listener reports
/// latency to the log sink (informational, not enforced by preemption).
pub const SLOW_CALL_WARNING: Duration = Duration::from_millis(250);

/// Image-processing callback: parameter mapping in, labeled rasters out.
/// The second argument is the injected log function.
pub type ProcessFn =
    Box<dyn FnMut(&BTreeMap<String, f64>, &dyn Fn(&str)) -> Result<Vec<LabeledFrame>>>;

/// Append-only text sink shared between a session and its dependents.
/// Repeated identical messages are dropped and only the most recent
/// `LOG_CAPACITY` lines are retained.
#[derive(Debug, Default)]
pub struct LogSink {
    lines: RefCell<Vec<String>>,
    seen: RefCell<HashSet<String>>,
}

impl LogSink {
    pub fn append(&self, message: impl Into<String>) {
        let message = message.into();
        if !self.seen.borrow_mut().insert(message.clone()) {
            return;
        }
        let mut lines = self.lines.borrow_mut();
        lines.push(message);
        if lines.len() > LOG_CAPACITY {
            let excess = lines.len() - LOG_CAPACITY;
            lines.drain(..excess);
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
        self.seen.borrow_mut().clear();
    }
}

/// Identifier for a session within one shared-resource group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u32);

/// One session's contribution to the shared control panel.
#[derive(Clone, Debug)]
pub struct PanelSection {
    pub session: SessionId,
    pub title: String,
    pub controls: Vec<ControlDef>,
}

/// Widget definitions of every session sharing one control panel.
/// Dependent sessions register their sections here instead of building a
/// second panel.
#[derive(Debug, Default)]
pub struct ControlRegistry {
    sections: RefCell<Vec<PanelSection>>,
}

impl ControlRegistry {
    pub fn register(&self, section: PanelSection) {
        let mut sections = self.sections.borrow_mut();
        if let Some(existing) = sections.iter_mut().find(|s| s.session == section.session) {
            *existing = section;
        } else {
            sections.push(section);
        }
    }

    pub fn remove(&self, session: SessionId) {
        self.sections.borrow_mut().retain(|s| s.session != session);
    }

    pub fn sections(&self) -> Vec<PanelSection> {
        self.sections.borrow().clone()
    }
}

/// Log sink and control panel shared across a session tree. Created exactly
/// once, by the primary session.
#[derive(Debug, Default)]
pub struct SharedResources {
    pub log: LogSink,
    pub controls: ControlRegistry,
    next_id: Cell<u32>,
}

impl SharedResources {
    fn allocate_id(&self) -> SessionId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        SessionId(id)
    }
}

/// How a session reaches the shared resources. Ownership is a type-level
/// fact: a `Guest` holds a weak reference and can neither re-create nor
/// outlive the owner's log sink and control panel.
#[derive(Clone, Debug)]
pub enum SharedHandle {
    Owner(Rc<SharedResources>),
    Guest(Weak<SharedResources>),
}

impl SharedHandle {
    pub fn get(&self) -> Option<Rc<SharedResources>> {
        match self {
            SharedHandle::Owner(rc) => Some(rc.clone()),
            SharedHandle::Guest(weak) => weak.upgrade(),
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, SharedHandle::Owner(_))
    }
}

/// Viewer construction options.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub title: String,
    pub viewport: Size,
    pub slow_call_warning: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            title: "Viewer".to_string(),
            viewport: Size::new(800.0, 600.0),
            slow_call_warning: SLOW_CALL_WARNING,
        }
    }
}

/// Owns one view transform, annotation store, parameter set, and the
/// externally supplied processing function, and orchestrates the
/// event → mutate → render cycle.
///
/// The primary session also owns the shared log sink and control panel;
/// dependents reference them weakly and register their widget sections into
/// the parent's panel. All failures inside the cycle are caught here;
/// nothing escapes to crash the message pump, and the displayed frames are
/// never replaced by a failed processing call.
pub struct Session {
    id: SessionId,
    title: String,
    shared: SharedHandle,
    transform: ViewTransform,
    store: AnnotationStore,
    params: ParameterSet,
    machine: InteractionMachine,
    controls: Vec<ControlDef>,
    processor: ProcessFn,
    frames: Vec<LabeledFrame>,
    dependents: Vec<Session>,
    cursor: Option<Point>,
    revision: u64,
    closed: bool,
    slow_call_warning: Duration,
}

impl Session {
    /// Open the primary session: creates the shared log sink and control
    /// panel, registers the controls, and runs the processor once.
    pub fn open(
        config: SessionConfig,
        controls: Vec<ControlDef>,
        processor: ProcessFn,
    ) -> Result<Session> {
        let shared = Rc::new(SharedResources::default());
        Self::build(SharedHandle::Owner(shared), config, controls, processor)
    }

    fn build(
        shared: SharedHandle,
        config: SessionConfig,
        controls: Vec<ControlDef>,
        processor: ProcessFn,
    ) -> Result<Session> {
        let resources = shared.get().ok_or_else(|| {
            ParamscopeError::ResourceUnavailable("shared session resources".to_string())
        })?;
        let id = resources.allocate_id();

        let mut params = ParameterSet::new();
        for control in &controls {
            let max = match control.max_value {
                ControlMax::Fixed(v) => v,
                ControlMax::ImageCount => 0.0,
            };
            params.register(&control.parameter, 0.0, max, control.initial, control.constraint);
        }
        params.take_changed();

        resources.controls.register(PanelSection {
            session: id,
            title: config.title.clone(),
            controls: controls.clone(),
        });

        // Placeholder raster size until the first processing call lands.
        let transform = ViewTransform::new(config.viewport, config.viewport)?;

        let mut session = Session {
            id,
            title: config.title,
            shared,
            transform,
            store: AnnotationStore::new(),
            params,
            machine: InteractionMachine::new(),
            controls,
            processor,
            frames: Vec::new(),
            dependents: Vec::new(),
            cursor: None,
            revision: 0,
            closed: false,
            slow_call_warning: config.slow_call_warning,
        };
        session.recompute();
        Ok(session)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// False once the session was closed by the user or programmatically.
    pub fn should_continue(&self) -> bool {
        !self.closed
    }

    pub fn shared(&self) -> Option<Rc<SharedResources>> {
        self.shared.get()
    }

    pub fn owns_shared(&self) -> bool {
        self.shared.is_owner()
    }

    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn frames(&self) -> &[LabeledFrame] {
        &self.frames
    }

    pub fn controls(&self) -> &[ControlDef] {
        &self.controls
    }

    /// Bumped on every successful processing call; display caches key off it.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.machine.mode()
    }

    pub fn set_draw_mode(&mut self, mode: DrawMode) {
        self.machine.set_mode(mode);
    }

    pub fn log(&self, message: impl Into<String>) {
        if let Some(shared) = self.shared.get() {
            shared.log.append(message);
        }
    }

    /// Feed one input event through the interaction machine. Returns whether
    /// the transform or annotation store changed; the caller must compose
    /// and paint the scene before handing control back to the event source,
    /// so the very next paint reflects the change.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        if self.closed {
            return false;
        }
        if let InputEvent::PointerMove { pos } = event {
            self.cursor = Some(pos);
        }
        self.machine.handle(event, &mut self.transform, &mut self.store)
    }

    pub fn set_viewport_size(&mut self, size: Size) {
        self.transform.set_viewport_size(size);
    }

    pub fn reset_view(&mut self) {
        self.transform.reset();
    }

    pub fn undo_annotation(&mut self) {
        self.store.undo_last();
    }

    pub fn clear_annotations(&mut self) {
        self.store.clear();
    }

    pub fn param(&self, name: &str, default: f64) -> f64 {
        self.params.get(name, default)
    }

    /// Widget write path: coerce, store, then run the recompute-and-render
    /// listener synchronously. Returns the coerced value.
    pub fn set_param(&mut self, name: &str, value: f64) -> f64 {
        if self.closed {
            return self.params.get(name, value);
        }
        let coerced = self.params.set(name, value);
        if coerced != value {
            let violation = ParamscopeError::ConstraintViolation {
                name: name.to_string(),
                value,
                coerced,
            };
            self.log(violation.to_string());
        }
        if self.params.take_changed() {
            self.recompute();
        }
        coerced
    }

    /// Bulk parameter application (snapshot reload). Values are coerced
    /// individually; the processor runs once at the end.
    pub fn apply_parameters(&mut self, mapping: &BTreeMap<String, f64>) {
        if self.closed {
            return;
        }
        for (name, value) in mapping {
            self.params.set(name, *value);
        }
        if self.params.take_changed() {
            self.recompute();
        }
    }

    pub fn apply_snapshot(&mut self, snapshot: &ParamSnapshot) {
        self.apply_parameters(&snapshot.values);
        self.log(format!("Applied parameter snapshot `{}`", snapshot.name));
    }

    pub fn capture_snapshot(&self, name: &str) -> ParamSnapshot {
        ParamSnapshot::capture(name, &self.params)
    }

    /// Run the processing function with the current parameters. On success
    /// the new frames replace the old; on failure the error is logged and
    /// the previously rendered frames stay on screen.
    pub fn recompute(&mut self) {
        if self.closed {
            return;
        }
        let values = self.params.values().clone();
        let started = Instant::now();
        let result = {
            let shared = self.shared.get();
            let log = |message: &str| {
                if let Some(ref resources) = shared {
                    resources.log.append(message);
                }
            };
            (self.processor)(&values, &log)
        };
        let elapsed = started.elapsed();
        if elapsed > self.slow_call_warning {
            self.log(format!(
                "{}: processing took {:.0} ms",
                self.title,
                elapsed.as_secs_f64() * 1000.0
            ));
        }
        match result {
            Ok(frames) if frames.is_empty() => {
                self.log(format!(
                    "{}: processor returned no images, keeping previous frames",
                    self.title
                ));
            }
            Ok(frames) => {
                if let Err(e) = self.adopt_frames(frames) {
                    self.log(format!("{}: {e}", self.title));
                }
            }
            Err(e) => {
                self.log(format!("{}: processing failed: {e}", self.title));
                tracing::warn!(session = %self.title, error = %e, "processing function failed");
            }
        }
    }

    fn adopt_frames(&mut self, frames: Vec<LabeledFrame>) -> Result<()> {
        for labeled in &frames {
            labeled.frame.ensure_displayable()?;
        }
        self.frames = frames;
        self.revision += 1;
        self.sync_show_selector();
        let size = self.frames[self.current_index()].frame.size();
        self.transform.set_image_size(size)?;
        Ok(())
    }

    /// Keep the image-selector bounds in step with the processor's output
    /// count, clamping the current selection when the list shrank.
    fn sync_show_selector(&mut self) {
        let uses_selector = self
            .controls
            .iter()
            .any(|c| c.max_value == ControlMax::ImageCount);
        if !uses_selector {
            return;
        }
        let max = self.frames.len().saturating_sub(1) as f64;
        self.params
            .register(SHOW_PARAM, 0.0, max, 0.0, Constraint::None);
        self.params.take_changed();
    }

    /// The clamped `show` selection.
    pub fn current_index(&self) -> usize {
        let shown = self.params.get(SHOW_PARAM, 0.0).max(0.0) as usize;
        shown.min(self.frames.len().saturating_sub(1))
    }

    /// Compose the displayable scene. `None` while no frames exist yet or
    /// after close; a stale render call against a closed session must not
    /// touch display state.
    pub fn scene(&mut self) -> Result<Option<Scene>> {
        if self.closed || self.frames.is_empty() {
            return Ok(None);
        }
        let selected = self.current_index();
        let size = self.frames[selected].frame.size();
        self.transform.set_image_size(size)?;
        render::compose(&self.frames, selected, &self.transform, &self.store, self.cursor)
            .map(Some)
    }

    pub fn status_line(&self) -> Option<StatusLine> {
        if self.frames.is_empty() {
            return None;
        }
        let frame = &self.frames[self.current_index()].frame;
        Some(render::status_line(frame, &self.transform, &self.store, self.cursor))
    }

    /// Spawn a dependent session: fresh transform, annotation store, and
    /// parameter set, but the parent's log sink and control panel are
    /// referenced, never re-created.
    pub fn spawn_dependent(
        &mut self,
        config: SessionConfig,
        controls: Vec<ControlDef>,
        processor: ProcessFn,
    ) -> Result<SessionId> {
        let resources = self.shared.get().ok_or_else(|| {
            ParamscopeError::ResourceUnavailable("shared session resources".to_string())
        })?;
        let child = Self::build(
            SharedHandle::Guest(Rc::downgrade(&resources)),
            config,
            controls,
            processor,
        )?;
        let id = child.id;
        self.dependents.push(child);
        Ok(id)
    }

    pub fn dependents(&self) -> &[Session] {
        &self.dependents
    }

    pub fn dependents_mut(&mut self) -> impl Iterator<Item = &mut Session> {
        self.dependents.iter_mut()
    }

    pub fn dependent_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.dependents.iter_mut().find(|s| s.id == id)
    }

    /// Close this session: release its display state, cascade to any open
    /// dependents, and withdraw its control-panel section. A dependent's
    /// close never touches resources owned by the parent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        for dependent in &mut self.dependents {
            dependent.close();
        }
        if let Some(shared) = self.shared.get() {
            shared.controls.remove(self.id);
            shared.log.append(format!("{} closed", self.title));
        }
        self.frames.clear();
        self.cursor = None;
        self.closed = true;
    }

    /// Drop dependents whose windows are gone.
    pub fn prune_closed_dependents(&mut self) {
        self.dependents.retain(|d| !d.closed);
    }

    /// Swap in a different processing function and recompute immediately.
    pub fn set_processor(&mut self, processor: ProcessFn) {
        self.processor = processor;
        self.recompute();
    }
}
