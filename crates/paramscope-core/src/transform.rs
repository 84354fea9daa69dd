use crate::error::{ParamscopeError, Result};
use crate::geometry::{Point, Rect, Size};

pub const ZOOM_MIN: f32 = 0.1;
pub const ZOOM_MAX: f32 = 10.0;
/// Multiplicative zoom change per wheel notch.
pub const ZOOM_STEP: f32 = 1.1;
/// Zoom change per wheel notch with the fast-zoom modifier held.
pub const ZOOM_STEP_FAST: f32 = 1.4;

/// Mapping between viewport (screen) pixels and image pixels.
///
/// `pan` is the image coordinate shown at the viewport's top-left corner.
/// When the zoomed image is smaller than the viewport along an axis, `pan`
/// goes negative so the image is centered on that axis instead.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
    zoom: f32,
    pan: Point,
    viewport: Size,
    image: Size,
}

impl ViewTransform {
    pub fn new(image: Size, viewport: Size) -> Result<Self> {
        if !image.is_positive() {
            return Err(ParamscopeError::InvalidImage {
                width: image.width.max(0.0) as u32,
                height: image.height.max(0.0) as u32,
            });
        }
        let mut transform = Self {
            zoom: 1.0,
            pan: Point::ZERO,
            viewport,
            image,
        };
        transform.clamp_pan();
        Ok(transform)
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan_offset(&self) -> Point {
        self.pan
    }

    pub fn image_size(&self) -> Size {
        self.image
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport_size(&mut self, viewport: Size) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.clamp_pan();
    }

    /// Swap in a new raster size. A dimension change resets the view.
    pub fn set_image_size(&mut self, image: Size) -> Result<()> {
        if !image.is_positive() {
            return Err(ParamscopeError::InvalidImage {
                width: image.width.max(0.0) as u32,
                height: image.height.max(0.0) as u32,
            });
        }
        if image != self.image {
            self.image = image;
            self.reset();
        }
        Ok(())
    }

    pub fn screen_to_image(&self, p: Point) -> Point {
        Point::new(self.pan.x + p.x / self.zoom, self.pan.y + p.y / self.zoom)
    }

    pub fn image_to_screen(&self, p: Point) -> Point {
        Point::new((p.x - self.pan.x) * self.zoom, (p.y - self.pan.y) * self.zoom)
    }

    /// Multiplicative zoom anchored at `pivot` (viewport coordinates): the
    /// image point under the pivot stays under it after the zoom, except
    /// where the pan clamp pushes the view back inside the raster.
    pub fn apply_zoom(&mut self, factor: f32, pivot: Point) {
        let pivot_image = self.screen_to_image(pivot);
        self.zoom = (self.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        self.pan = Point::new(
            pivot_image.x - pivot.x / self.zoom,
            pivot_image.y - pivot.y / self.zoom,
        );
        self.clamp_pan();
    }

    /// Pan by a delta in screen pixels (positive drags the content right
    /// and down).
    pub fn apply_pan(&mut self, dx: f32, dy: f32) {
        self.pan.x -= dx / self.zoom;
        self.pan.y -= dy / self.zoom;
        self.clamp_pan();
    }

    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Point::ZERO;
        self.clamp_pan();
    }

    /// Clamp an image-space point into the raster bounds. Drawing
    /// coordinates must never leave the image, even when the pointer does.
    pub fn clamp_to_image(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(0.0, self.image.width),
            p.y.clamp(0.0, self.image.height),
        )
    }

    /// The image-space rectangle currently visible, clipped to the raster.
    pub fn visible_rect(&self) -> Rect {
        let span = Size::new(
            self.viewport.width / self.zoom,
            self.viewport.height / self.zoom,
        );
        let full = Rect::from_min_size(self.pan, span);
        let bounds = Rect::from_min_size(Point::ZERO, self.image);
        full.intersect(bounds)
    }

    fn clamp_pan(&mut self) {
        self.pan.x = clamp_axis(self.pan.x, self.viewport.width / self.zoom, self.image.width);
        self.pan.y = clamp_axis(
            self.pan.y,
            self.viewport.height / self.zoom,
            self.image.height,
        );
    }
}

/// Clamp one pan axis so the visible span stays inside the raster, or
/// center the raster when the span is larger than it.
fn clamp_axis(pan: f32, span: f32, image: f32) -> f32 {
    if span >= image {
        (image - span) / 2.0
    } else {
        pan.clamp(0.0, image - span)
    }
}
