use std::fmt;

use crate::annotation::{Annotation, AnnotationStore, Preview};
use crate::error::{ParamscopeError, Result};
use crate::frame::{Frame, LabeledFrame};
use crate::geometry::{Point, Rect};
use crate::transform::ViewTransform;

/// Vertical gap between a shape and its label, screen px.
const LABEL_OFFSET: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayStyle {
    Committed,
    Preview,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OverlayGeometry {
    Rect(Rect),
    Segment { a: Point, b: Point },
    Path { points: Vec<Point>, closed: bool },
}

/// One projected overlay, ready to paint in viewport coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayShape {
    pub style: OverlayStyle,
    pub label: String,
    pub label_anchor: Point,
    pub geometry: OverlayGeometry,
}

/// Cursor readout for the status line, image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorInfo {
    pub x: f32,
    pub y: f32,
    pub value: Option<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatusLine {
    pub zoom_percent: f32,
    pub annotation_count: usize,
    pub cursor: Option<CursorInfo>,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zoom: {:.0}% | {} annotation{}",
            self.zoom_percent,
            self.annotation_count,
            if self.annotation_count == 1 { "" } else { "s" }
        )?;
        if let Some(cursor) = self.cursor {
            write!(f, " | ({:.0}, {:.0})", cursor.x, cursor.y)?;
            if let Some(value) = cursor.value {
                write!(f, " Gray: {value:.3}")?;
            }
        }
        Ok(())
    }
}

/// A fully composed frame description. Painting a `Scene` twice with
/// unchanged inputs produces identical pixels; every view-dependent
/// calculation is resolved here rather than in the paint code, and
/// annotations are projected fresh each time, never baked into the raster.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Which processor output is displayed (the clamped `show` selection).
    pub frame_index: usize,
    pub frame_label: String,
    /// Viewport-space rectangle the visible crop is drawn into.
    pub dest_rect: Rect,
    /// Matching sub-rectangle of the raster, normalized to 0..=1.
    pub source_uv: Rect,
    pub overlays: Vec<OverlayShape>,
    pub status: StatusLine,
}

/// Compose the scene for the selected frame. `cursor` is the pointer
/// position in viewport coordinates, if any.
pub fn compose(
    frames: &[LabeledFrame],
    selected: usize,
    transform: &ViewTransform,
    store: &AnnotationStore,
    cursor: Option<Point>,
) -> Result<Scene> {
    let frame_index = selected.min(frames.len().saturating_sub(1));
    let current = frames
        .get(frame_index)
        .ok_or_else(|| ParamscopeError::Processing("no frames to display".to_string()))?;
    current.frame.ensure_displayable()?;

    let visible = transform.visible_rect();
    let image = transform.image_size();
    let dest_rect = Rect::from_min_max(
        transform.image_to_screen(visible.min),
        transform.image_to_screen(visible.max),
    );
    let source_uv = Rect::from_min_max(
        Point::new(visible.min.x / image.width, visible.min.y / image.height),
        Point::new(visible.max.x / image.width, visible.max.y / image.height),
    );

    let mut overlays = Vec::with_capacity(store.len() + 1);
    let (mut rois, mut lines, mut polys) = (0usize, 0usize, 0usize);
    for annotation in store.committed() {
        let label = match annotation {
            Annotation::Rectangle { .. } => {
                rois += 1;
                format!("ROI {rois}")
            }
            Annotation::Line { .. } => {
                lines += 1;
                format!("Line {lines}")
            }
            Annotation::Polygon { .. } => {
                polys += 1;
                format!("Poly {polys}")
            }
        };
        overlays.push(project(annotation, label, OverlayStyle::Committed, transform));
    }
    if let Some(preview) = store.preview() {
        overlays.push(project_preview(preview, transform));
    }

    Ok(Scene {
        frame_index,
        frame_label: current.label.clone(),
        dest_rect,
        source_uv,
        overlays,
        status: status_line(&current.frame, transform, store, cursor),
    })
}

/// Status strip content: zoom percentage, annotation count, and the pixel
/// under the cursor.
pub fn status_line(
    frame: &Frame,
    transform: &ViewTransform,
    store: &AnnotationStore,
    cursor: Option<Point>,
) -> StatusLine {
    let cursor = cursor.map(|pos| {
        let image_pos = transform.screen_to_image(pos);
        CursorInfo {
            x: image_pos.x,
            y: image_pos.y,
            value: frame.sample(image_pos.x, image_pos.y),
        }
    });
    StatusLine {
        zoom_percent: transform.zoom() * 100.0,
        annotation_count: store.len(),
        cursor,
    }
}

fn project(
    annotation: &Annotation,
    label: String,
    style: OverlayStyle,
    transform: &ViewTransform,
) -> OverlayShape {
    match annotation {
        Annotation::Rectangle {
            x,
            y,
            width,
            height,
        } => {
            let min = transform.image_to_screen(Point::new(*x, *y));
            let max = transform.image_to_screen(Point::new(x + width, y + height));
            OverlayShape {
                style,
                label,
                label_anchor: Point::new(min.x, min.y - LABEL_OFFSET),
                geometry: OverlayGeometry::Rect(Rect::from_min_max(min, max)),
            }
        }
        Annotation::Line { x1, y1, x2, y2 } => {
            let a = transform.image_to_screen(Point::new(*x1, *y1));
            let b = transform.image_to_screen(Point::new(*x2, *y2));
            OverlayShape {
                style,
                label,
                label_anchor: Point::new(a.x, a.y - LABEL_OFFSET),
                geometry: OverlayGeometry::Segment { a, b },
            }
        }
        Annotation::Polygon { vertices, closed } => {
            let points: Vec<Point> = vertices
                .iter()
                .map(|v| transform.image_to_screen(*v))
                .collect();
            let anchor = points.first().copied().unwrap_or(Point::ZERO);
            OverlayShape {
                style,
                label,
                label_anchor: Point::new(anchor.x, anchor.y - LABEL_OFFSET),
                geometry: OverlayGeometry::Path {
                    points,
                    closed: *closed,
                },
            }
        }
    }
}

fn project_preview(preview: &Preview, transform: &ViewTransform) -> OverlayShape {
    match preview {
        // The in-progress polygon gets the rubber band to the cursor.
        Preview::Polygon { vertices, cursor } => {
            let mut points: Vec<Point> = vertices
                .iter()
                .map(|v| transform.image_to_screen(*v))
                .collect();
            points.push(transform.image_to_screen(*cursor));
            let anchor = points.first().copied().unwrap_or(Point::ZERO);
            OverlayShape {
                style: OverlayStyle::Preview,
                label: "preview".to_string(),
                label_anchor: Point::new(anchor.x, anchor.y - LABEL_OFFSET),
                geometry: OverlayGeometry::Path {
                    points,
                    closed: false,
                },
            }
        }
        other => project(
            &other.as_annotation(),
            "preview".to_string(),
            OverlayStyle::Preview,
            transform,
        ),
    }
}
