//! Arena geometry.
//!
//! All positions are continuous coordinates in arena units; angles are radians.

use core::f64::consts::PI;

/// Location in the arena (coordinates only).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArenaLocation {
    pub x: f64,
    pub y: f64,
}

impl ArenaLocation {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &ArenaLocation) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Bearing from this location to `other`.
    pub fn angle_to(&self, other: &ArenaLocation) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Returns true if this location lies inside the circle (border inclusive).
    pub fn is_inside(&self, area: &ArenaCircleArea) -> bool {
        self.distance_to(&area.center()) <= area.radius
    }

    /// Moves this location toward `center` until it is within `radius` of it.
    ///
    /// Returns the location unchanged when already in range.
    pub fn constrained_in_range(&self, center: &ArenaLocation, radius: f64) -> ArenaLocation {
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        let length = (dx * dx + dy * dy).sqrt();
        if length <= radius {
            *self
        } else {
            let factor = radius / length;
            ArenaLocation::new(center.x + dx * factor, center.y + dy * factor)
        }
    }

    /// Pushes this location out of a circle along the line coming from `source`.
    ///
    /// The result is the intersection between the (source, self) line and the
    /// circle nearest to the source. Returns `None` when already outside (or
    /// when the line misses the circle), meaning the location is unchanged.
    pub fn moved_out_of_circle(
        &self,
        circle: &ArenaLocation,
        radius: f64,
        source: &ArenaLocation,
    ) -> Option<ArenaLocation> {
        let dx = self.x - circle.x;
        let dy = self.y - circle.y;
        if (dx * dx + dy * dy).sqrt() >= radius {
            return None;
        }
        intersect_line_circle(source.x - circle.x, source.y - circle.y, dx, dy, radius)
            .map(|(x, y)| ArenaLocation::new(x + circle.x, y + circle.y))
    }

    /// Shortens the (source, self) segment so that its end lies inside the rectangle.
    pub fn kept_inside_rectangle(
        &self,
        min: ArenaLocation,
        max: ArenaLocation,
        source: &ArenaLocation,
    ) -> ArenaLocation {
        let mut length = self.distance_to(source);
        let mut result = *self;
        if result.x < min.x {
            length *= (min.x - source.x) / (result.x - source.x);
            result = result.constrained_in_range(source, length);
        }
        if result.x > max.x {
            length *= (max.x - source.x) / (result.x - source.x);
            result = result.constrained_in_range(source, length);
        }
        if result.y < min.y {
            length *= (min.y - source.y) / (result.y - source.y);
            result = result.constrained_in_range(source, length);
        }
        if result.y > max.y {
            length *= (max.y - source.y) / (result.y - source.y);
            result = result.constrained_in_range(source, length);
        }
        result
    }
}

/// Nearest intersection to `(x1, y1)` between the line through `(x1, y1)`,
/// `(x2, y2)` and the circle of radius `r` centered at the origin.
fn intersect_line_circle(x1: f64, y1: f64, x2: f64, y2: f64, r: f64) -> Option<(f64, f64)> {
    const EPS: f64 = 10e-8;

    let a = y2 - y1;
    let b = -(x2 - x1);
    let c = -(a * x1 + b * y1);
    let norm = a * a + b * b;
    if norm == 0.0 {
        return None;
    }
    let x0 = -a * c / norm;
    let y0 = -b * c / norm;

    if c * c > r * r * norm + EPS {
        None
    } else if (c * c - r * r * norm).abs() < EPS {
        Some((x0, y0))
    } else {
        let d = r * r - c * c / norm;
        let mult = (d / norm).sqrt();
        let first = (x0 + b * mult, y0 - a * mult);
        let second = (x0 - b * mult, y0 + a * mult);
        let dist = |(x, y): (f64, f64)| ((x - x1) * (x - x1) + (y - y1) * (y - y1)).sqrt();
        if dist(second) < dist(first) {
            Some(second)
        } else {
            Some(first)
        }
    }
}

/// Location in the arena, with a facing angle in radians.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArenaLocationAngle {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

impl ArenaLocationAngle {
    pub const fn new(x: f64, y: f64, angle: f64) -> Self {
        Self { x, y, angle }
    }

    pub const fn location(&self) -> ArenaLocation {
        ArenaLocation::new(self.x, self.y)
    }
}

/// Circle area in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArenaCircleArea {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl ArenaCircleArea {
    pub const fn new(x: f64, y: f64, radius: f64) -> Self {
        Self { x, y, radius }
    }

    pub const fn center(&self) -> ArenaLocation {
        ArenaLocation::new(self.x, self.y)
    }
}

/// Angular difference from `angle1` to `angle2`, in the `]-π, π]` range.
pub fn angular_difference(angle1: f64, angle2: f64) -> f64 {
    let diff = angle2 - angle1;
    diff - 2.0 * PI * ((diff + PI) / (2.0 * PI)).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn distance_and_angle() {
        let a = ArenaLocation::new(0.0, 0.0);
        let b = ArenaLocation::new(3.0, 4.0);
        assert!(approx(a.distance_to(&b), 5.0));
        assert!(approx(a.angle_to(&ArenaLocation::new(0.0, 2.0)), PI / 2.0));
    }

    #[test]
    fn angular_difference_wraps() {
        assert!(approx(angular_difference(0.0, 0.5), 0.5));
        assert!(approx(angular_difference(0.5, 0.0), -0.5));
        assert!(approx(angular_difference(0.0, 2.0 * PI), 0.0));
        assert!(approx(angular_difference(PI - 0.1, -PI + 0.1), 0.2));
    }

    #[test]
    fn constrained_in_range_shortens_segment() {
        let far = ArenaLocation::new(10.0, 0.0);
        let near = far.constrained_in_range(&ArenaLocation::new(0.0, 0.0), 4.0);
        assert!(approx(near.x, 4.0));
        assert!(approx(near.y, 0.0));
        let unchanged =
            ArenaLocation::new(1.0, 1.0).constrained_in_range(&ArenaLocation::default(), 4.0);
        assert_eq!(unchanged, ArenaLocation::new(1.0, 1.0));
    }

    #[test]
    fn moved_out_of_circle_stops_at_nearest_intersection() {
        let target = ArenaLocation::new(10.0, 0.0);
        let moved = target
            .moved_out_of_circle(&ArenaLocation::new(10.0, 0.0), 2.0, &ArenaLocation::new(0.0, 0.0))
            .unwrap();
        assert!(approx(moved.x, 8.0));
        assert!(approx(moved.y, 0.0));
        assert!(ArenaLocation::new(20.0, 0.0)
            .moved_out_of_circle(&ArenaLocation::new(10.0, 0.0), 2.0, &ArenaLocation::default())
            .is_none());
    }

    #[test]
    fn kept_inside_rectangle_scales_segment() {
        let source = ArenaLocation::new(50.0, 50.0);
        let result = ArenaLocation::new(150.0, 50.0).kept_inside_rectangle(
            ArenaLocation::new(0.0, 0.0),
            ArenaLocation::new(100.0, 100.0),
            &source,
        );
        assert!(approx(result.x, 100.0));
        assert!(approx(result.y, 50.0));
    }
}
