use std::{future::Future, pin::Pin};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Boxed, non-`Send` future used at async trait seams (strategy init, feeds).
///
/// The engine runs on a single cooperative thread, so nothing here needs `Send`.
pub type LocalBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A position in world space. `z` points toward the camera.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position3D {
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn on_plane(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn lerp(self, to: Self, t: f64) -> Self {
        Self {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
            z: self.z + (to.z - self.z) * t,
        }
    }

    pub fn distance(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn xy(self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Point> for Position3D {
    fn from(p: Point) -> Self {
        Self::on_plane(p.x, p.y)
    }
}

/// Axis-aligned extent of the visible scene in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl SceneBounds {
    pub const EMPTY: Self = Self {
        min_x: 0.0,
        max_x: 0.0,
        min_y: 0.0,
        max_y: 0.0,
    };

    pub const fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Bounds of photo centers padded by half the photo extent on each side.
    ///
    /// An empty input yields [`SceneBounds::EMPTY`].
    pub fn around_centers<I>(centers: I, half_width: f64, half_height: f64) -> Self
    where
        I: IntoIterator<Item = Point>,
    {
        let mut it = centers.into_iter();
        let Some(first) = it.next() else {
            return Self::EMPTY;
        };
        let mut b = Self::new(
            first.x - half_width,
            first.x + half_width,
            first.y - half_height,
            first.y + half_height,
        );
        for p in it {
            b.min_x = b.min_x.min(p.x - half_width);
            b.max_x = b.max_x.max(p.x + half_width);
            b.min_y = b.min_y.min(p.y - half_height);
            b.max_y = b.max_y.max(p.y + half_height);
        }
        b
    }

    pub fn width(self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl From<Rect> for SceneBounds {
    fn from(r: Rect) -> Self {
        Self::new(r.x0, r.x1, r.y0, r.y1)
    }
}

/// Width and height of a photo card in world units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhotoSize {
    pub width: f64,
    pub height: f64,
}

impl PhotoSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn half(self) -> (f64, f64) {
        (self.width * 0.5, self.height * 0.5)
    }

    /// Radius of the circle that circumscribes the card.
    pub fn circumradius(self) -> f64 {
        (self.width * self.width + self.height * self.height).sqrt() / 2.0
    }

    pub fn rect_at(self, center: Point) -> Rect {
        Rect::from_center_size(center, (self.width, self.height))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
