#[derive(Default, Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub w: f32,
    pub h: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            w: x2 - x1,
            h: y2 - y1,
        }
    }

    /// Computes the area of the bounding box.
    pub fn area(&self) -> f32 {
        self.h * self.w
    }

    /// Computes the intersection area between this bounding box and another.
    pub fn intersect(&self, other: &BoundingBox) -> f32 {
        let left = self.x1.max(other.x1);
        let right = (self.x1 + self.w).min(other.x1 + other.w);
        let top = self.y1.max(other.y1);
        let bottom = (self.y1 + self.h).min(other.y1 + other.h);
        (right - left).max(0.) * (bottom - top).max(0.)
    }

    /// Computes the union area between this bounding box and another.
    pub fn union(&self, other: &BoundingBox) -> f32 {
        self.area() + other.area() - self.intersect(other)
    }

    /// Intersection over union. Two degenerate boxes give `0.0`, never NaN.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let union = self.union(other);
        if union <= 0. {
            return 0.;
        }
        self.intersect(other) / union
    }

    /// Sets the bounding box's coordinates and dimensions using `(x, y, w, h)`.
    pub fn with_x1y1_wh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.x1 = x;
        self.y1 = y;
        self.w = w;
        self.h = h;

        self.x2 = x + w;
        self.y2 = y + h;
        self
    }
}
