//! Sutherland–Hodgman clipping of map polygons against sector triangles.

use crate::geometry::{polygon_area, signed_area, Point, EPS};
use crate::sector::Sector;

/// Returns `poly` in counter-clockwise order (reversed if not already CCW).
pub fn ensure_ccw(poly: &[Point]) -> Vec<Point> {
    if signed_area(poly) > 0. {
        poly.to_vec()
    } else {
        poly.iter().rev().copied().collect()
    }
}

/// Left of (or on) the directed edge a->b, which is the inside for a CCW clipper.
fn is_inside(p: Point, a: Point, b: Point) -> bool {
    (b - a).cross(p - a) >= -EPS
}

/// Intersection of the line through s, e with the line through a, b.
/// `None` if the lines are parallel.
fn line_intersection(s: Point, e: Point, a: Point, b: Point) -> Option<Point> {
    let d1 = e - s;
    let d2 = b - a;
    let denom = d1.cross(d2);
    if denom.abs() < EPS {
        return None;
    }
    let t = (a - s).cross(d2) / denom;
    Some(Point::new(s.x + t * d1.x, s.y + t * d1.y))
}

/// Clips `subject` against the convex polygon `clipper`. Either polygon with
/// fewer than three vertices yields an empty result.
pub fn clip_polygon(subject: &[Point], clipper: &[Point]) -> Vec<Point> {
    if subject.len() < 3 || clipper.len() < 3 {
        return Vec::new();
    }
    let clip = ensure_ccw(clipper);
    let mut output = subject.to_vec();

    for i in 0..clip.len() {
        let (a, b) = (clip[i], clip[(i + 1) % clip.len()]);
        let input = std::mem::take(&mut output);
        let Some(&last) = input.last() else {
            break;
        };

        let mut s = last;
        for &e in input.iter() {
            if is_inside(e, a, b) {
                if !is_inside(s, a, b) {
                    output.extend(line_intersection(s, e, a, b));
                }
                output.push(e);
            } else if is_inside(s, a, b) {
                output.extend(line_intersection(s, e, a, b));
            }
            s = e;
        }
    }
    output
}

/// Area of `subject` that falls inside `sector`.
pub fn intersection_area(subject: &[Point], sector: &Sector) -> f64 {
    let clipped = clip_polygon(subject, &sector.vertices());
    if clipped.is_empty() {
        return 0.;
    }
    polygon_area(&clipped)
}

/// Fraction of the subject's area inside `sector`, in [0, 1]. Degenerate
/// subjects (fewer than three vertices, zero or non-finite area) give 0.
pub fn intersection_ratio(subject: &[Point], sector: &Sector) -> f64 {
    let subject_area = polygon_area(subject);
    if !(subject_area > 0.) || !subject_area.is_finite() {
        return 0.;
    }
    let ratio = intersection_area(subject, sector) / subject_area;
    if ratio.is_finite() {
        // self-intersecting subjects can cancel area in the shoelace sum
        ratio.clamp(0., 1.)
    } else {
        0.
    }
}
