//! Bubble tails ("queues"): per-type defaults, legacy migration, and geometry.
//!
//! Angles are in degrees, counter-clockwise from the positive x axis with y
//! pointing up, so `270` points straight down and `225` down-left. Geometry
//! output is in canvas space where y grows downward.

#[cfg(test)]
#[path = "tail_test.rs"]
mod tail_test;

use serde::{Deserialize, Serialize};

use crate::camera::{Point, Rect};
use crate::consts::{DEFAULT_TAIL_ANGLE_DEG, JAGGED_TEETH};

/// Dialogue bubble flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BubbleType {
    #[default]
    Speech,
    Thought,
    Shout,
    Whisper,
    Explosion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStyle {
    Triangle,
    Curved,
    Jagged,
    Thin,
}

/// Shape of the pointer connecting a bubble to its speaker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueConfig {
    pub angle: f64,
    pub length: f64,
    pub thickness: f64,
    pub style: QueueStyle,
    /// Sideways bend of a curved tail, as a fraction of its length.
    pub curvature: f64,
    /// 1.0 ends in a point, 0.0 keeps the full base width at the tip.
    pub tapering: f64,
}

impl QueueConfig {
    /// Defaults for a freshly created bubble. Shouts and explosions have no tail.
    #[must_use]
    pub fn for_bubble_type(bubble_type: BubbleType) -> Self {
        let angle = DEFAULT_TAIL_ANGLE_DEG;
        match bubble_type {
            BubbleType::Speech => Self {
                angle,
                length: 40.0,
                thickness: 16.0,
                style: QueueStyle::Triangle,
                curvature: 0.0,
                tapering: 1.0,
            },
            BubbleType::Thought => Self {
                angle,
                length: 36.0,
                thickness: 14.0,
                style: QueueStyle::Curved,
                curvature: 0.4,
                tapering: 0.9,
            },
            BubbleType::Whisper => Self {
                angle,
                length: 32.0,
                thickness: 8.0,
                style: QueueStyle::Thin,
                curvature: 0.2,
                tapering: 1.0,
            },
            BubbleType::Shout => Self {
                angle,
                length: 0.0,
                thickness: 20.0,
                style: QueueStyle::Jagged,
                curvature: 0.0,
                tapering: 1.0,
            },
            BubbleType::Explosion => Self {
                angle,
                length: 0.0,
                thickness: 24.0,
                style: QueueStyle::Jagged,
                curvature: 0.0,
                tapering: 1.0,
            },
        }
    }

    /// Defaults for `bubble_type` pointed in the direction a legacy
    /// position string describes.
    #[must_use]
    pub fn from_legacy(bubble_type: BubbleType, legacy_position: Option<&str>) -> Self {
        let angle = legacy_position.map_or(DEFAULT_TAIL_ANGLE_DEG, legacy_position_to_angle);
        Self { angle, ..Self::for_bubble_type(bubble_type) }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.length > 0.0 && self.thickness > 0.0
    }
}

/// Map an old tail position keyword (`"bottom-left"`, `"top_right"`,
/// `"bottomLeft"`) to an angle. Unknown values fall back to the default.
#[must_use]
pub fn legacy_position_to_angle(position: &str) -> f64 {
    let mut normalized = String::with_capacity(position.len() + 1);
    let mut prev_lower = false;
    for c in position.trim().chars() {
        if matches!(c, '-' | '_' | ' ') {
            if !normalized.ends_with('-') {
                normalized.push('-');
            }
            prev_lower = false;
            continue;
        }
        if c.is_ascii_uppercase() && prev_lower {
            normalized.push('-');
        }
        prev_lower = c.is_ascii_lowercase();
        normalized.push(c.to_ascii_lowercase());
    }

    match normalized.trim_matches('-') {
        "right" => 0.0,
        "top-right" => 45.0,
        "top" => 90.0,
        "top-left" => 135.0,
        "left" => 180.0,
        "bottom-left" => 225.0,
        "bottom" => 270.0,
        "bottom-right" => 315.0,
        _ => DEFAULT_TAIL_ANGLE_DEG,
    }
}

/// Resolved tail outline in canvas space.
#[derive(Debug, Clone, PartialEq)]
pub struct TailGeometry {
    /// Where the tail meets the bubble outline.
    pub anchor: Point,
    pub tip: Point,
    /// Closed polygon, starting on the bubble outline.
    pub points: Vec<Point>,
    /// Quadratic control point for curved tails.
    pub control: Option<Point>,
}

/// Compute the tail outline for a bubble drawn inside `frame`.
///
/// The tail leaves the ellipse inscribed in `frame` at `config.angle`.
/// Returns `None` when the tail is suppressed.
#[must_use]
pub fn tail_geometry(frame: Rect, config: &QueueConfig) -> Option<TailGeometry> {
    if !config.is_visible() {
        return None;
    }
    let theta = config.angle.to_radians();
    let dir = Point::new(theta.cos(), -theta.sin());
    let normal = Point::new(theta.sin(), theta.cos());
    let center = frame.center();

    let anchor = Point::new(center.x + frame.width * 0.5 * dir.x, center.y + frame.height * 0.5 * dir.y);
    let tip = offset(anchor, dir, config.length);

    let half = config.thickness * 0.5;
    let tip_half = half * (1.0 - config.tapering.clamp(0.0, 1.0));
    let base_l = offset(anchor, normal, half);
    let base_r = offset(anchor, normal, -half);
    let tip_l = offset(tip, normal, tip_half);
    let tip_r = offset(tip, normal, -tip_half);

    let mut points = vec![base_l];
    let mut control = None;
    match config.style {
        QueueStyle::Triangle | QueueStyle::Thin => {}
        QueueStyle::Curved => {
            let mid = lerp(anchor, tip, 0.5);
            control = Some(offset(mid, normal, config.curvature * config.length * 0.5));
        }
        QueueStyle::Jagged => {
            #[allow(clippy::cast_precision_loss)]
            let steps = (JAGGED_TEETH + 1) as f64;
            for k in 1..=JAGGED_TEETH {
                #[allow(clippy::cast_precision_loss)]
                let t = k as f64 / steps;
                let jag = if k % 2 == 1 { half * 0.6 } else { -half * 0.3 };
                points.push(offset(lerp(base_l, tip_l, t), normal, jag));
            }
        }
    }
    if tip_half > 0.0 {
        points.push(tip_l);
        points.push(tip_r);
    } else {
        points.push(tip);
    }
    points.push(base_r);

    Some(TailGeometry { anchor, tip, points, control })
}

fn offset(p: Point, dir: Point, dist: f64) -> Point {
    Point::new(p.x + dir.x * dist, p.y + dir.y * dist)
}

fn lerp(a: Point, b: Point, t: f64) -> Point {
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}
