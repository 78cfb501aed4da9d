//! External contour extraction and polygon measurements.

use std::f64::consts::PI;

use image::GrayImage;
use imageproc::{
    contours::{find_contours, BorderType},
    geometry::contour_area,
    point::Point,
};

/// Closed polygon tracing the outer border of a mask blob.
///
/// Vertices are pixel centres, so a filled `w × h` rectangle encloses an area
/// of `(w - 1) × (h - 1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Contour {
    points: Vec<Point<i32>>,
}

/// Zeroth and first order spatial moments of a contour polygon.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Moments {
    /// Enclosed area.
    pub m00: f64,
    /// First moment about the vertical axis.
    pub m10: f64,
    /// First moment about the horizontal axis.
    pub m01: f64,
}

impl Contour {
    /// Creates a contour from its vertices in tracing order.
    #[must_use]
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        Self {
            points: points.into_iter().map(|(x, y)| Point::new(x, y)).collect(),
        }
    }

    /// Number of vertices in the contour.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Reports whether the contour has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Polygon moments computed with Green's theorem, normalised so `m00` is non-negative.
    #[must_use]
    pub fn moments(&self) -> Moments {
        let Some((mut previous_x, mut previous_y)) = self.points.last().map(to_f64) else {
            return Moments::default();
        };

        let mut a00 = 0.0;
        let mut a10 = 0.0;
        let mut a01 = 0.0;
        for (x, y) in self.points.iter().map(to_f64) {
            let cross = previous_x * y - x * previous_y;
            a00 += cross;
            a10 += cross * (previous_x + x);
            a01 += cross * (previous_y + y);
            previous_x = x;
            previous_y = y;
        }

        if a00.abs() <= f64::EPSILON {
            return Moments::default();
        }

        let sign = a00.signum();
        Moments {
            m00: sign * a00 / 2.0,
            m10: sign * a10 / 6.0,
            m01: sign * a01 / 6.0,
        }
    }

    /// Area enclosed by the polygon, regardless of tracing orientation.
    #[must_use]
    pub fn area(&self) -> f64 {
        contour_area(&self.points)
    }

    /// Length of the closed polygon outline.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        let Some(last) = self.points.last().map(to_f64) else {
            return 0.0;
        };

        self.points
            .iter()
            .map(to_f64)
            .scan(last, |previous, point| {
                let length = (point.0 - previous.0).hypot(point.1 - previous.1);
                *previous = point;
                Some(length)
            })
            .sum()
    }

    /// Integer pixel centroid, or `None` when the polygon encloses no area.
    #[must_use]
    pub fn centroid(&self) -> Option<(u32, u32)> {
        let moments = self.moments();
        if moments.m00 <= f64::EPSILON {
            return None;
        }

        let x = (moments.m10 / moments.m00).trunc();
        let y = (moments.m01 / moments.m00).trunc();
        Some((x as u32, y as u32))
    }

    /// Isoperimetric ratio `4π·area / perimeter²`; 1.0 for a circle.
    ///
    /// Returns `None` for degenerate contours without a perimeter.
    #[must_use]
    pub fn circularity(&self) -> Option<f64> {
        let perimeter = self.perimeter();
        if perimeter <= 0.0 {
            return None;
        }

        Some(4.0 * PI * self.area() / (perimeter * perimeter))
    }
}

/// Outer borders of every top-level blob in the mask.
///
/// Holes and blobs nested inside holes are skipped. Any non-zero pixel counts
/// as foreground.
#[must_use]
pub fn external_contours(mask: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .map(|contour| Contour {
            points: contour.points,
        })
        .collect()
}

fn to_f64(point: &Point<i32>) -> (f64, f64) {
    (f64::from(point.x), f64::from(point.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(origin: (i32, i32), side: i32) -> Contour {
        let (x, y) = origin;
        Contour::from_points([
            (x, y),
            (x, y + side),
            (x + side, y + side),
            (x + side, y),
        ])
    }

    #[test]
    fn square_moments_match_closed_form() {
        let contour = square((10, 20), 4);
        let moments = contour.moments();
        assert!((moments.m00 - 16.0).abs() < 1e-9);
        assert!((moments.m10 / moments.m00 - 12.0).abs() < 1e-9);
        assert!((moments.m01 / moments.m00 - 22.0).abs() < 1e-9);
        assert!((contour.perimeter() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn orientation_does_not_change_area() {
        let clockwise = square((0, 0), 6);
        let counter = Contour::from_points([(0, 0), (6, 0), (6, 6), (0, 6)]);
        assert!((clockwise.area() - counter.area()).abs() < 1e-9);
        assert_eq!(clockwise.centroid(), counter.centroid());
    }

    #[test]
    fn concave_area_agrees_with_zeroth_moment() {
        let ell = Contour::from_points([(0, 0), (0, 6), (6, 6), (6, 4), (2, 4), (2, 0)]);
        assert!((ell.area() - 20.0).abs() < 1e-9);
        assert!((ell.area() - ell.moments().m00).abs() < 1e-9);
    }

    #[test]
    fn degenerate_contours_have_no_centroid() {
        let point = Contour::from_points([(5, 5)]);
        assert_eq!(point.centroid(), None);
        assert_eq!(point.circularity(), None);

        let line = Contour::from_points([(0, 0), (4, 0)]);
        assert_eq!(line.area(), 0.0);
        assert_eq!(line.centroid(), None);
    }

    #[test]
    fn square_circularity_is_pi_over_four() {
        let contour = square((0, 0), 10);
        let circularity = contour.circularity().expect("square has a perimeter");
        assert!((circularity - std::f64::consts::FRAC_PI_4).abs() < 1e-9);
    }
}
