#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use paramscope_core::error::ParamscopeError;
use paramscope_core::frame::{Frame, LabeledFrame};
use paramscope_core::session::ProcessFn;

/// Build a diagonal-gradient frame.
pub fn gradient_frame(width: usize, height: usize) -> Frame {
    let mut frame = Frame::zeros(width, height);
    for row in 0..height {
        for col in 0..width {
            frame.data[[row, col]] = (row + col) as f32 / (width + height) as f32;
        }
    }
    frame
}

/// Build a constant-valued frame.
pub fn flat_frame(width: usize, height: usize, value: f32) -> Frame {
    let mut frame = Frame::zeros(width, height);
    frame.data.fill(value);
    frame
}

/// Build a dark frame with a bright axis-aligned square.
pub fn frame_with_square(
    width: usize,
    height: usize,
    x0: usize,
    y0: usize,
    side: usize,
) -> Frame {
    let mut frame = flat_frame(width, height, 0.1);
    for row in y0..(y0 + side).min(height) {
        for col in x0..(x0 + side).min(width) {
            frame.data[[row, col]] = 0.9;
        }
    }
    frame
}

/// Processor producing one gradient frame scaled by the `gain` parameter,
/// counting how often it is invoked.
pub fn counting_processor(width: usize, height: usize, calls: Rc<RefCell<u32>>) -> ProcessFn {
    Box::new(move |params, _log| {
        *calls.borrow_mut() += 1;
        let gain = params.get("gain").copied().unwrap_or(1.0) as f32;
        let mut frame = gradient_frame(width, height);
        frame.data.mapv_inplace(|v| (v * gain).clamp(0.0, 1.0));
        Ok(vec![LabeledFrame::new(frame, format!("gain {gain}"))])
    })
}

/// Processor producing `count` equally sized frames, where `count` follows
/// the `count` parameter.
pub fn multi_frame_processor(width: usize, height: usize) -> ProcessFn {
    Box::new(move |params, _log| {
        let count = params.get("count").copied().unwrap_or(1.0).max(1.0) as usize;
        Ok((0..count)
            .map(|i| LabeledFrame::new(gradient_frame(width, height), format!("stage {i}")))
            .collect())
    })
}

/// Processor that always fails.
pub fn failing_processor() -> ProcessFn {
    Box::new(|_params, _log| {
        Err(ParamscopeError::Processing(
            "synthetic failure".to_string(),
        ))
    })
}
