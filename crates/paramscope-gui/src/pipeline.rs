use std::rc::Rc;

use paramscope_core::controls::{image_selector, odd_slider, slider, ControlDef};
use paramscope_core::filters;
use paramscope_core::frame::{Frame, LabeledFrame};
use paramscope_core::session::ProcessFn;

/// Stock control set for the tuning pipeline.
pub fn standard_controls() -> Vec<ControlDef> {
    vec![
        image_selector(),
        slider("Threshold", "threshold", 255.0, 128.0),
        odd_slider("Kernel Size", "kernel_size", 31.0, 5.0),
        slider("Iterations", "iterations", 10.0, 1.0),
    ]
}

/// Blur → threshold → open pipeline, one labeled frame per stage.
pub fn tuning_processor(source: Rc<Frame>) -> ProcessFn {
    Box::new(move |params, log| {
        let threshold = params.get("threshold").copied().unwrap_or(128.0) as f32 / 255.0;
        let kernel = params.get("kernel_size").copied().unwrap_or(5.0).max(1.0) as usize;
        let iterations = params.get("iterations").copied().unwrap_or(1.0).max(0.0) as usize;

        log(&format!(
            "threshold={:.0} kernel={kernel} iterations={iterations}",
            threshold * 255.0
        ));

        // The kernel size spans roughly +/- 3 sigma.
        let sigma = kernel as f32 / 6.0;
        let blurred = filters::gaussian_blur(&source, sigma);
        let binary = filters::threshold(&blurred, threshold, false);
        let opened = filters::opening(&binary, 3, iterations);

        Ok(vec![
            LabeledFrame::new((*source).clone(), "Original"),
            LabeledFrame::new(blurred, format!("Blurred (k={kernel})")),
            LabeledFrame::new(binary, format!("Binary (t={:.0})", threshold * 255.0)),
            LabeledFrame::new(opened, format!("Opened (n={iterations})")),
        ])
    })
}

pub fn preview_controls() -> Vec<ControlDef> {
    vec![slider("Threshold", "preview_threshold", 255.0, 128.0)]
}

/// Threshold-only processor backing a dependent preview view.
pub fn threshold_preview_processor(source: Rc<Frame>) -> ProcessFn {
    Box::new(move |params, _log| {
        let threshold = params.get("preview_threshold").copied().unwrap_or(128.0) as f32 / 255.0;
        let binary = filters::threshold(&source, threshold, false);
        Ok(vec![LabeledFrame::new(
            binary,
            format!("Threshold {:.0}", threshold * 255.0),
        )])
    })
}

/// Synthetic fallback image: a diagonal gradient with a bright disc and a
/// dark square for the thresholding stages to bite on.
pub fn demo_frame() -> Frame {
    let (w, h) = (640usize, 480usize);
    let mut frame = Frame::zeros(w, h);
    for row in 0..h {
        for col in 0..w {
            let mut v = 0.15 + 0.5 * (row + col) as f32 / (w + h) as f32;
            let dx = col as f32 - 420.0;
            let dy = row as f32 - 160.0;
            if (dx * dx + dy * dy).sqrt() < 70.0 {
                v = 0.95;
            }
            if (120..220).contains(&col) && (260..360).contains(&row) {
                v = 0.05;
            }
            frame.data[[row, col]] = v;
        }
    }
    frame
}
