use crate::params::Constraint;

/// Parameter name of the image-selector control.
pub const SHOW_PARAM: &str = "show";

/// Upper bound of a control: fixed, or tracking the processor's output
/// count (the image-selector case).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlMax {
    Fixed(f64),
    ImageCount,
}

/// Declarative definition of one live value control, consumed at session
/// setup to build the bound widget.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlDef {
    pub display_name: String,
    pub parameter: String,
    pub max_value: ControlMax,
    pub initial: f64,
    pub constraint: Constraint,
}

pub fn slider(display_name: &str, parameter: &str, max_value: f64, initial: f64) -> ControlDef {
    ControlDef {
        display_name: display_name.to_string(),
        parameter: parameter.to_string(),
        max_value: ControlMax::Fixed(max_value),
        initial,
        constraint: Constraint::None,
    }
}

/// Odd-valued slider (kernel sizes).
pub fn odd_slider(display_name: &str, parameter: &str, max_value: f64, initial: f64) -> ControlDef {
    ControlDef {
        display_name: display_name.to_string(),
        parameter: parameter.to_string(),
        max_value: ControlMax::Fixed(max_value),
        initial,
        constraint: Constraint::Odd,
    }
}

/// Selector choosing which processor output is displayed. Its upper bound
/// tracks the output count of the latest processing call.
pub fn image_selector() -> ControlDef {
    ControlDef {
        display_name: "Show Image".to_string(),
        parameter: SHOW_PARAM.to_string(),
        max_value: ControlMax::ImageCount,
        initial: 0.0,
        constraint: Constraint::None,
    }
}

/// Sliders steering a shared region of interest, one per rectangle field.
pub fn roi_sliders() -> Vec<ControlDef> {
    vec![
        slider("RectX", "roi_x", 1000.0, 0.0),
        slider("RectY", "roi_y", 1000.0, 0.0),
        slider("RectWidth", "roi_width", 1000.0, 100.0),
        slider("RectHeight", "roi_height", 1000.0, 100.0),
    ]
}
