#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEGENERATE_SCALE, MAX_SCALE, MIN_SCALE};

/// A point in either screen or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned rectangle. Used for DOM bounding boxes and bubble frames.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

/// On-screen pixel size of the rendering surface. Recomputed on resize.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Logical (untransformed) size of a page's drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Raised when a transform cannot be used for coordinate conversion.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("degenerate transform scale: {scale}")]
    Degenerate { scale: f64 },
    #[error("transform or point contains non-finite values")]
    NonFinite,
}

/// Pan/zoom state of the editing canvas.
///
/// `x` / `y` are the screen-space translation in CSS pixels, `scale` is the
/// zoom factor (1.0 = no zoom). A canvas point `c` appears on screen at
/// `c * scale + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, scale: 1.0 };

    #[must_use]
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    /// Reject non-finite components and non-positive scales.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::NonFinite`] or [`TransformError::Degenerate`].
    pub fn validate(&self) -> Result<(), TransformError> {
        if !(self.x.is_finite() && self.y.is_finite() && self.scale.is_finite()) {
            return Err(TransformError::NonFinite);
        }
        if self.scale <= 0.0 {
            return Err(TransformError::Degenerate { scale: self.scale });
        }
        Ok(())
    }

    /// Convert a screen-space point to canvas space: `(p - translation) / scale`.
    ///
    /// A positive scale too small to divide by safely maps the point to itself.
    ///
    /// # Errors
    ///
    /// Returns an error when the transform or the point is invalid.
    pub fn to_canvas(&self, screen: Point) -> Result<Point, TransformError> {
        self.validate()?;
        if !screen.is_finite() {
            return Err(TransformError::NonFinite);
        }
        if self.scale < DEGENERATE_SCALE {
            return Ok(screen);
        }
        Ok(Point { x: (screen.x - self.x) / self.scale, y: (screen.y - self.y) / self.scale })
    }

    /// Convert a canvas-space point to screen space. Inverse of [`Self::to_canvas`].
    ///
    /// # Errors
    ///
    /// Returns an error when the transform or the point is invalid.
    pub fn to_screen(&self, canvas: Point) -> Result<Point, TransformError> {
        self.validate()?;
        if !canvas.is_finite() {
            return Err(TransformError::NonFinite);
        }
        if self.scale < DEGENERATE_SCALE {
            return Ok(canvas);
        }
        Ok(Point { x: canvas.x * self.scale + self.x, y: canvas.y * self.scale + self.y })
    }

    /// Convert a screen-space distance to a canvas-space distance.
    ///
    /// # Errors
    ///
    /// Returns an error when the transform is invalid.
    pub fn screen_dist_to_canvas(&self, dist: f64) -> Result<f64, TransformError> {
        self.validate()?;
        if self.scale < DEGENERATE_SCALE {
            return Ok(dist);
        }
        Ok(dist / self.scale)
    }

    /// Translate by a screen-space delta.
    #[must_use]
    pub fn pan_by(&self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy, scale: self.scale }
    }

    /// Multiply the zoom by `factor` while keeping the canvas point under
    /// `anchor` (screen space) fixed on screen. The resulting scale is clamped
    /// to `[MIN_SCALE, MAX_SCALE]`.
    ///
    /// # Errors
    ///
    /// Returns an error when the current transform or the factor is invalid.
    pub fn zoom_at(&self, anchor: Point, factor: f64) -> Result<Self, TransformError> {
        if !factor.is_finite() {
            return Err(TransformError::NonFinite);
        }
        if factor <= 0.0 {
            return Err(TransformError::Degenerate { scale: factor });
        }
        let pinned = self.to_canvas(anchor)?;
        let scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        Ok(Self { x: anchor.x - pinned.x * scale, y: anchor.y - pinned.y * scale, scale })
    }

    /// Transform that fits `canvas` inside `viewport` with `margin` pixels of
    /// padding on every side, centred. Zero-sized surfaces yield identity.
    #[must_use]
    pub fn fit(viewport: Viewport, canvas: CanvasSize, margin: f64) -> Self {
        if viewport.is_empty() || canvas.is_empty() {
            return Self::IDENTITY;
        }
        let avail_w = (viewport.width - margin * 2.0).max(1.0);
        let avail_h = (viewport.height - margin * 2.0).max(1.0);
        let scale = (avail_w / canvas.width).min(avail_h / canvas.height).clamp(MIN_SCALE, MAX_SCALE);
        Self {
            x: (viewport.width - canvas.width * scale) * 0.5,
            y: (viewport.height - canvas.height * scale) * 0.5,
            scale,
        }
    }

    /// Whether every component is within `tol` of `other`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        (self.x - other.x).abs() <= tol && (self.y - other.y).abs() <= tol && (self.scale - other.scale).abs() <= tol
    }

    /// Round the translation onto the device-pixel grid.
    ///
    /// Both the canvas renderer and the HTML overlay consume the snapped
    /// transform so the two never disagree by a fractional device pixel.
    #[must_use]
    pub fn snapped(&self, dpr: f64) -> Self {
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        Self { x: (self.x * dpr).round() / dpr, y: (self.y * dpr).round() / dpr, scale: self.scale }
    }
}
