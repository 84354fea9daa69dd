use crate::error::{ParamscopeError, Result};
use crate::geometry::Point;

/// Committed rectangles must have both sides at least this long (image px).
pub const MIN_RECT_SIDE: f32 = 1.0;
/// Committed lines must be at least this long (image px).
pub const MIN_LINE_LENGTH: f32 = 5.0;
/// Polygons need at least this many vertices to commit.
pub const MIN_POLYGON_VERTICES: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnnotationKind {
    Rectangle,
    Line,
    Polygon,
}

/// A committed annotation. Coordinates are always image space, so they
/// survive any amount of zooming and panning unchanged.
#[derive(Clone, Debug, PartialEq)]
pub enum Annotation {
    Rectangle {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    Polygon {
        vertices: Vec<Point>,
        closed: bool,
    },
}

impl Annotation {
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::Rectangle { .. } => AnnotationKind::Rectangle,
            Annotation::Line { .. } => AnnotationKind::Line,
            Annotation::Polygon { .. } => AnnotationKind::Polygon,
        }
    }
}

/// The single in-progress annotation. Kept apart from the committed
/// sequence so `clear` and `undo_last` never disturb it.
#[derive(Clone, Debug, PartialEq)]
pub enum Preview {
    Rectangle { anchor: Point, cursor: Point },
    Line { start: Point, cursor: Point },
    Polygon { vertices: Vec<Point>, cursor: Point },
}

impl Preview {
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Preview::Rectangle { .. } => AnnotationKind::Rectangle,
            Preview::Line { .. } => AnnotationKind::Line,
            Preview::Polygon { .. } => AnnotationKind::Polygon,
        }
    }

    /// The annotation this preview would commit as, normalized (rectangle
    /// anchor/cursor order does not matter). Polygons stay open here.
    pub fn as_annotation(&self) -> Annotation {
        match self {
            Preview::Rectangle { anchor, cursor } => Annotation::Rectangle {
                x: anchor.x.min(cursor.x),
                y: anchor.y.min(cursor.y),
                width: (anchor.x - cursor.x).abs(),
                height: (anchor.y - cursor.y).abs(),
            },
            Preview::Line { start, cursor } => Annotation::Line {
                x1: start.x,
                y1: start.y,
                x2: cursor.x,
                y2: cursor.y,
            },
            Preview::Polygon { vertices, .. } => Annotation::Polygon {
                vertices: vertices.clone(),
                closed: false,
            },
        }
    }
}

/// Ordered committed annotations plus at most one preview. Insertion order
/// is creation order and drives the 1-based sequence labels.
#[derive(Debug, Default)]
pub struct AnnotationStore {
    committed: Vec<Annotation>,
    preview: Option<Preview>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed(&self) -> &[Annotation] {
        &self.committed
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn len(&self) -> usize {
        self.committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    /// Start a new preview at `start`. Fails if one is already in progress.
    pub fn begin_preview(&mut self, kind: AnnotationKind, start: Point) -> Result<()> {
        if self.preview.is_some() {
            return Err(ParamscopeError::AlreadyDrawing);
        }
        self.preview = Some(match kind {
            AnnotationKind::Rectangle => Preview::Rectangle {
                anchor: start,
                cursor: start,
            },
            AnnotationKind::Line => Preview::Line {
                start,
                cursor: start,
            },
            AnnotationKind::Polygon => Preview::Polygon {
                vertices: vec![start],
                cursor: start,
            },
        });
        Ok(())
    }

    /// Move the preview's free endpoint. Polygons only move the rubber-band
    /// cursor here; vertices are added explicitly via `add_vertex`.
    pub fn update_preview(&mut self, cursor: Point) {
        if let Some(
            Preview::Rectangle { cursor: c, .. }
            | Preview::Line { cursor: c, .. }
            | Preview::Polygon { cursor: c, .. },
        ) = &mut self.preview
        {
            *c = cursor;
        }
    }

    /// Append a vertex to a polygon preview. No-op for other kinds.
    pub fn add_vertex(&mut self, p: Point) {
        if let Some(Preview::Polygon { vertices, cursor }) = &mut self.preview {
            vertices.push(p);
            *cursor = p;
        }
    }

    /// Validate and commit the preview. Returns the committed annotation's
    /// index, or `None` when the preview was below the minimum size and
    /// discarded (a bare click must not produce a zero-area region).
    pub fn commit_preview(&mut self) -> Option<usize> {
        let preview = self.preview.take()?;
        let annotation = match preview {
            Preview::Rectangle { anchor, cursor } => {
                let width = (anchor.x - cursor.x).abs();
                let height = (anchor.y - cursor.y).abs();
                if width < MIN_RECT_SIDE || height < MIN_RECT_SIDE {
                    tracing::debug!(width, height, "rectangle below minimum size, discarded");
                    return None;
                }
                Annotation::Rectangle {
                    x: anchor.x.min(cursor.x),
                    y: anchor.y.min(cursor.y),
                    width,
                    height,
                }
            }
            Preview::Line { start, cursor } => {
                let length = start.distance(cursor);
                if length < MIN_LINE_LENGTH {
                    tracing::debug!(length, "line below minimum length, discarded");
                    return None;
                }
                Annotation::Line {
                    x1: start.x,
                    y1: start.y,
                    x2: cursor.x,
                    y2: cursor.y,
                }
            }
            Preview::Polygon { vertices, .. } => {
                if vertices.len() < MIN_POLYGON_VERTICES {
                    tracing::debug!(count = vertices.len(), "polygon too small, discarded");
                    return None;
                }
                Annotation::Polygon {
                    vertices,
                    closed: true,
                }
            }
        };
        self.committed.push(annotation);
        Some(self.committed.len() - 1)
    }

    /// Drop the preview without committing. Returns whether one existed.
    pub fn cancel_preview(&mut self) -> bool {
        self.preview.take().is_some()
    }

    /// Pop the most recently committed annotation. No-op on an empty store.
    pub fn undo_last(&mut self) -> Option<Annotation> {
        self.committed.pop()
    }

    /// Remove every committed annotation. An in-progress preview survives.
    pub fn clear(&mut self) {
        self.committed.clear();
    }
}
