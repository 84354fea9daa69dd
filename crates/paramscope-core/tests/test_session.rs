mod common;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use paramscope_core::controls::{image_selector, odd_slider, slider};
use paramscope_core::geometry::{Point, Size};
use paramscope_core::interaction::{Button, InputEvent};
use paramscope_core::session::{Session, SessionConfig};

fn config(title: &str) -> SessionConfig {
    SessionConfig {
        title: title.to_string(),
        viewport: Size::new(800.0, 600.0),
        ..Default::default()
    }
}

fn gain_controls() -> Vec<paramscope_core::controls::ControlDef> {
    vec![slider("Gain", "gain", 10.0, 1.0)]
}

#[test]
fn open_runs_the_processor_once() {
    let calls = Rc::new(RefCell::new(0));
    let session = Session::open(
        config("Primary"),
        gain_controls(),
        common::counting_processor(320, 240, calls.clone()),
    )
    .unwrap();

    assert_eq!(*calls.borrow(), 1);
    assert_eq!(session.frames().len(), 1);
    assert!(session.should_continue());
    assert!(session.owns_shared());
}

#[test]
fn set_param_recomputes_synchronously_and_returns_coerced() {
    let calls = Rc::new(RefCell::new(0));
    let mut session = Session::open(
        config("Primary"),
        vec![
            slider("Gain", "gain", 10.0, 1.0),
            odd_slider("Kernel Size", "kernel_size", 31.0, 5.0),
        ],
        common::counting_processor(320, 240, calls.clone()),
    )
    .unwrap();
    assert_eq!(*calls.borrow(), 1);

    let coerced = session.set_param("kernel_size", 4.0);
    assert!(coerced == 3.0 || coerced == 5.0);
    assert_eq!(*calls.borrow(), 2);

    // The coercion is surfaced in the shared log, not silently swallowed.
    let lines = session.shared().unwrap().log.lines();
    assert!(
        lines.iter().any(|l| l.contains("kernel_size")),
        "{lines:?}"
    );
}

#[test]
fn processing_failure_keeps_previous_frames_and_logs() {
    let calls = Rc::new(RefCell::new(0));
    let mut session = Session::open(
        config("Primary"),
        gain_controls(),
        common::counting_processor(320, 240, calls.clone()),
    )
    .unwrap();
    let frames_before = session.frames().to_vec();
    let revision_before = session.revision();

    session.set_processor(common::failing_processor());

    assert_eq!(session.frames(), frames_before.as_slice());
    assert_eq!(session.revision(), revision_before);
    assert!(session.should_continue());
    let lines = session.shared().unwrap().log.lines();
    assert!(
        lines.iter().any(|l| l.contains("processing failed")),
        "{lines:?}"
    );

    // The session stays usable: a later parameter edit still recomputes.
    session.set_param("gain", 2.0);
    assert_eq!(session.frames(), frames_before.as_slice());
}

#[test]
fn slow_processing_reports_latency_to_the_log() {
    let calls = Rc::new(RefCell::new(0));
    let mut cfg = config("Primary");
    cfg.slow_call_warning = Duration::ZERO;
    let session = Session::open(
        cfg,
        gain_controls(),
        common::counting_processor(64, 64, calls),
    )
    .unwrap();

    let lines = session.shared().unwrap().log.lines();
    assert!(
        lines.iter().any(|l| l.contains("processing took")),
        "{lines:?}"
    );
}

#[test]
fn dependent_shares_log_sink_and_control_panel() {
    let calls = Rc::new(RefCell::new(0));
    let mut parent = Session::open(
        config("Primary"),
        gain_controls(),
        common::counting_processor(320, 240, calls.clone()),
    )
    .unwrap();

    let child_id = parent
        .spawn_dependent(
            config("Preview"),
            vec![slider("Level", "level", 255.0, 128.0)],
            common::counting_processor(320, 240, calls.clone()),
        )
        .unwrap();

    let shared = parent.shared().unwrap();
    let sections = shared.controls.sections();
    assert_eq!(sections.len(), 2);
    assert!(sections.iter().any(|s| s.session == child_id));

    let child = parent.dependent_mut(child_id).unwrap();
    assert!(!child.owns_shared());
    child.log("hello from the dependent");
    assert!(shared
        .log
        .lines()
        .iter()
        .any(|l| l == "hello from the dependent"));
}

#[test]
fn closing_a_dependent_leaves_parent_resources_open() {
    let calls = Rc::new(RefCell::new(0));
    let mut parent = Session::open(
        config("Primary"),
        gain_controls(),
        common::counting_processor(320, 240, calls.clone()),
    )
    .unwrap();
    let child_id = parent
        .spawn_dependent(
            config("Preview"),
            vec![],
            common::counting_processor(320, 240, calls.clone()),
        )
        .unwrap();

    parent.dependent_mut(child_id).unwrap().close();

    assert!(parent.should_continue());
    let shared = parent.shared().unwrap();
    // The child's section is gone, the parent's remains.
    let sections = shared.controls.sections();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].session, parent.id());
    // The log sink still accepts writes.
    shared.log.append("still alive");
    assert!(shared.log.lines().iter().any(|l| l == "still alive"));

    parent.prune_closed_dependents();
    assert!(parent.dependents().is_empty());
}

#[test]
fn closing_the_parent_cascades_to_dependents() {
    let calls = Rc::new(RefCell::new(0));
    let mut parent = Session::open(
        config("Primary"),
        gain_controls(),
        common::counting_processor(320, 240, calls.clone()),
    )
    .unwrap();
    for i in 0..2 {
        parent
            .spawn_dependent(
                config(&format!("Preview {i}")),
                vec![],
                common::counting_processor(320, 240, calls.clone()),
            )
            .unwrap();
    }

    parent.close();

    assert!(!parent.should_continue());
    assert!(parent.dependents().iter().all(|d| d.is_closed()));
}

#[test]
fn closed_session_ignores_stale_input_and_render_calls() {
    let calls = Rc::new(RefCell::new(0));
    let mut session = Session::open(
        config("Primary"),
        gain_controls(),
        common::counting_processor(320, 240, calls.clone()),
    )
    .unwrap();
    session.close();

    let calls_before = *calls.borrow();
    assert!(!session.handle_input(InputEvent::ButtonDown {
        button: Button::Primary,
        pos: Point::new(10.0, 10.0),
    }));
    session.set_param("gain", 3.0);
    assert_eq!(*calls.borrow(), calls_before);
    assert!(session.scene().unwrap().is_none());
}

#[test]
fn input_mutations_show_up_in_the_next_scene() {
    let calls = Rc::new(RefCell::new(0));
    let mut session = Session::open(
        config("Primary"),
        gain_controls(),
        common::counting_processor(320, 240, calls),
    )
    .unwrap();

    // The 320x240 raster is centered in the 800x600 viewport, so the
    // viewport point (250, 190) lands on image pixel (10, 10).
    assert!(session.handle_input(InputEvent::ButtonDown {
        button: Button::Primary,
        pos: Point::new(250.0, 190.0),
    }));
    assert!(session.handle_input(InputEvent::PointerMove {
        pos: Point::new(320.0, 250.0),
    }));

    // The preview must be visible on the very next composed scene.
    let scene = session.scene().unwrap().unwrap();
    assert_eq!(scene.overlays.len(), 1);
    assert_eq!(scene.overlays[0].label, "preview");

    assert!(session.handle_input(InputEvent::ButtonUp {
        button: Button::Primary,
        pos: Point::new(320.0, 250.0),
    }));
    let scene = session.scene().unwrap().unwrap();
    assert_eq!(scene.overlays[0].label, "ROI 1");
}

#[test]
fn apply_parameters_coerces_and_recomputes_once() {
    let calls = Rc::new(RefCell::new(0));
    let mut session = Session::open(
        config("Primary"),
        vec![
            slider("Gain", "gain", 10.0, 1.0),
            odd_slider("Kernel Size", "kernel_size", 31.0, 5.0),
        ],
        common::counting_processor(320, 240, calls.clone()),
    )
    .unwrap();
    assert_eq!(*calls.borrow(), 1);

    let mut mapping = BTreeMap::new();
    mapping.insert("gain".to_string(), 4.0);
    mapping.insert("kernel_size".to_string(), 8.0);
    session.apply_parameters(&mapping);

    assert_eq!(*calls.borrow(), 2);
    assert_eq!(session.param("gain", 0.0), 4.0);
    let kernel = session.param("kernel_size", 0.0);
    assert!(kernel == 7.0 || kernel == 9.0);
}

#[test]
fn show_selector_tracks_the_frame_count() {
    let mut session = Session::open(
        config("Primary"),
        vec![image_selector(), slider("Count", "count", 8.0, 3.0)],
        common::multi_frame_processor(160, 120),
    )
    .unwrap();
    assert_eq!(session.frames().len(), 3);

    session.set_param("show", 2.0);
    assert_eq!(session.current_index(), 2);

    // Shrinking the output list clamps the selection.
    session.set_param("count", 1.0);
    assert_eq!(session.frames().len(), 1);
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.param("show", 99.0), 0.0);
}
