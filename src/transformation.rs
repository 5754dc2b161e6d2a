// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
use sprite_raster::Rect;

/// Where the selected pixels are moved to, and how they are rotated, while being transformed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transformation {
    /// The area the selection covers before rotating.
    pub bounds: Rect,
    /// Center of the rotation, in pixel coordinates.
    pub pivot: (f64, f64),
    /// Rotation in radians.
    pub angle: f64,
}

impl Transformation {
    /// The identity transformation of a selection covering `bounds`, pivoting around its center.
    pub fn new(bounds: Rect) -> Self {
        Transformation {
            bounds,
            pivot: (
                bounds.x as f64 + bounds.w as f64 / 2.0,
                bounds.y as f64 + bounds.h as f64 / 2.0,
            ),
            angle: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pivot_at_center() {
        let transformation = Transformation::new(Rect::new(2, 4, 5, 2));
        assert_eq!(transformation.pivot, (4.5, 5.0));
        assert_eq!(transformation.angle, 0.0);
    }
}
