use ordered_float::OrderedFloat;

use crate::geometry::{Point, Rect, EPS};

/// Triangular approximation of the angular wedge between two anchors, as seen
/// from a fixed apex (the canvas top-right corner). The base vertices are where
/// the rays apex->anchor leave the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sector {
  pub apex: Point,
  pub base1: Point,
  pub base2: Point,
}

impl Sector {
  /// Builds the sector spanned by anchors `a` and `b` around `apex`, clipped to `bounds`.
  pub fn build(apex: Point, a: Point, b: Point, bounds: &Rect) -> Sector {
    Sector {
      apex,
      base1: ray_rect_hit(apex, a, bounds),
      base2: ray_rect_hit(apex, b, bounds),
    }
  }

  /// Vertices in construction order: apex, hit(a), hit(b).
  pub fn vertices(&self) -> [Point; 3] {
    [self.apex, self.base1, self.base2]
  }

  /// Checks if a point lies inside the triangle, edges included. Only sign
  /// consistency is tested, so the winding of the vertices does not matter.
  pub fn contains(&self, p: Point) -> bool {
    let [v0, v1, v2] = self.vertices();
    let d1 = edge_sign(p, v0, v1);
    let d2 = edge_sign(p, v1, v2);
    let d3 = edge_sign(p, v2, v0);
    let has_neg = d1 < 0. || d2 < 0. || d3 < 0.;
    let has_pos = d1 > 0. || d2 > 0. || d3 > 0.;
    !(has_neg && has_pos)
  }
}

fn edge_sign(p: Point, a: Point, b: Point) -> f64 {
  (p.x - b.x) * (a.y - b.y) - (a.x - b.x) * (p.y - b.y)
}

/// First point where the ray from `origin` through `through` crosses the
/// boundary of `bounds` (smallest t > 0). Falls back to `through` itself when
/// no crossing exists, e.g. when both points coincide.
pub fn ray_rect_hit(origin: Point, through: Point, bounds: &Rect) -> Point {
  let (dx, dy) = (through.x - origin.x, through.y - origin.y);
  let mut hits: Vec<(f64, Point)> = Vec::with_capacity(4);

  if dx.abs() > EPS {
    for x_edge in [bounds.xmin, bounds.xmax] {
      let t = (x_edge - origin.x) / dx;
      if t > 0. {
        let y = origin.y + t * dy;
        if bounds.ymin - EPS <= y && y <= bounds.ymax + EPS {
          hits.push((t, Point::new(x_edge, y)));
        }
      }
    }
  }
  if dy.abs() > EPS {
    for y_edge in [bounds.ymin, bounds.ymax] {
      let t = (y_edge - origin.y) / dy;
      if t > 0. {
        let x = origin.x + t * dx;
        if bounds.xmin - EPS <= x && x <= bounds.xmax + EPS {
          hits.push((t, Point::new(x, y_edge)));
        }
      }
    }
  }

  // min_by_key keeps the first of equal candidates (x edges before y edges)
  hits
    .into_iter()
    .min_by_key(|(t, _)| OrderedFloat(*t))
    .map(|(_, p)| p)
    .unwrap_or(through)
}
