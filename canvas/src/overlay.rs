//! HTML layer synchronizer: keeps a DOM overlay registered with the canvas.
//!
//! The overlay (text editors, selection chrome, bubble inputs) sits on top of
//! the rendering canvas inside the same host element. Every transform the
//! canvas renders with is mirrored onto the overlay as a CSS
//! `translate(..) scale(..)` using the same device-pixel snapping and the
//! same translate-then-scale order as the renderer, so the two layers cannot
//! drift apart.
//!
//! The DOM is reached through [`OverlaySurface`], which keeps this module
//! testable without a browser. See [`crate::dom::DomOverlay`] for the
//! `web_sys` implementation.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use tracing::{debug, warn};

use crate::camera::{Point, Rect, Transform, TransformError};
use crate::consts::SYNC_TOLERANCE;
use crate::store::{ListenerId, TransformListener, TransformStore};

/// The DOM operations the synchronizer needs from an overlay element.
pub trait OverlaySurface {
    /// Whether the element is still attached to the document.
    fn is_connected(&self) -> bool;
    /// Bounding box of the untransformed host in client coordinates.
    fn host_rect(&self) -> Rect;
    fn set_style(&mut self, property: &str, value: &str);
    fn remove_style(&mut self, property: &str);
}

/// Result of a [`HtmlLayerSync::sync`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A new CSS transform was written.
    Applied,
    /// The transform matched the last applied one; nothing was written.
    Unchanged,
    /// The overlay is no longer in the document; the update was skipped.
    Detached,
    /// The synchronizer has been torn down.
    Destroyed,
}

/// CSS transform string for a (snapped) transform.
#[must_use]
pub fn css_transform(transform: &Transform) -> String {
    format!("translate({}px, {}px) scale({})", transform.x, transform.y, transform.scale)
}

pub struct HtmlLayerSync<S: OverlaySurface> {
    surface: S,
    dpr: f64,
    last_applied: Option<Transform>,
    listener: Option<ListenerId>,
    destroyed: bool,
}

impl<S: OverlaySurface> HtmlLayerSync<S> {
    /// Take ownership of an overlay and pin its transform origin to the
    /// top-left corner, matching the canvas coordinate origin.
    pub fn new(mut surface: S, dpr: f64) -> Self {
        surface.set_style("transform-origin", "0 0");
        Self { surface, dpr: sanitize_dpr(dpr), last_applied: None, listener: None, destroyed: false }
    }

    /// Subscribe `sync` to `store` and apply the store's current transform.
    pub fn attach(sync: &std::rc::Rc<std::cell::RefCell<Self>>, store: &mut TransformStore)
    where
        S: 'static,
    {
        let id = store.subscribe(sync);
        let mut this = sync.borrow_mut();
        if let Some(previous) = this.listener.replace(id) {
            store.unsubscribe(previous);
        }
        this.apply_logged(&store.current());
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn last_applied(&self) -> Option<Transform> {
        self.last_applied
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Change the device pixel ratio. Forces the next sync to write.
    pub fn set_device_pixel_ratio(&mut self, dpr: f64) {
        let dpr = sanitize_dpr(dpr);
        if (dpr - self.dpr).abs() > f64::EPSILON {
            self.dpr = dpr;
            self.last_applied = None;
        }
    }

    /// Mirror `transform` onto the overlay.
    ///
    /// Repeating the last applied transform performs no DOM write. A detached
    /// overlay is skipped, not treated as an error.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] when `transform` is degenerate.
    pub fn sync(&mut self, transform: &Transform) -> Result<SyncOutcome, TransformError> {
        if self.destroyed {
            return Ok(SyncOutcome::Destroyed);
        }
        transform.validate()?;
        if !self.surface.is_connected() {
            debug!("overlay detached from document; skipping sync");
            return Ok(SyncOutcome::Detached);
        }
        if let Some(last) = self.last_applied {
            if last.approx_eq(transform, SYNC_TOLERANCE) {
                return Ok(SyncOutcome::Unchanged);
            }
        }

        let snapped = transform.snapped(self.dpr);
        self.surface.set_style("transform", &css_transform(&snapped));
        self.last_applied = Some(*transform);
        Ok(SyncOutcome::Applied)
    }

    /// Convert a pointer position in client coordinates to canvas space.
    ///
    /// The host's DOM offset is removed first, then the applied transform is
    /// inverted. Before the first sync the identity transform is assumed.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] for non-finite input.
    pub fn convert_event_coordinates(&self, client: Point) -> Result<Point, TransformError> {
        let host = self.surface.host_rect();
        let local = Point::new(client.x - host.x, client.y - host.y);
        let applied = self.last_applied.unwrap_or_default().snapped(self.dpr);
        applied.to_canvas(local)
    }

    /// Unsubscribe from `store`, clear the overlay transform and drop cached
    /// state. Safe to call any number of times.
    pub fn destroy(&mut self, store: &mut TransformStore) {
        if let Some(id) = self.listener.take() {
            store.unsubscribe(id);
        }
        if self.destroyed {
            return;
        }
        self.surface.remove_style("transform");
        self.last_applied = None;
        self.destroyed = true;
    }

    fn apply_logged(&mut self, transform: &Transform) {
        if let Err(err) = self.sync(transform) {
            warn!(error = %err, "overlay sync rejected transform");
        }
    }
}

impl<S: OverlaySurface> TransformListener for HtmlLayerSync<S> {
    fn on_transform(&mut self, transform: &Transform) {
        self.apply_logged(transform);
    }
}

fn sanitize_dpr(dpr: f64) -> f64 {
    if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 }
}
