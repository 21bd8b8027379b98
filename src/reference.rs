use std::fmt::Display;
use std::sync::Arc;

use fxhash::FxHashMap;
use lazy_static::lazy_static;

use crate::error::ReferenceError;
use crate::geometry::{Point, Rect};
use crate::sector::Sector;

/// Anchor coordinates (RpG, BpG) of the colour-temperature bands.
/// `Ultra` and `100K` are not real illuminants; they extend the chain to the
/// top-left and bottom-right of the canvas so the fan covers the whole plot.
pub const TEMPERATURE_ANCHORS: [(&str, f64, f64); 10] = [
    ("Ultra", 0.01, 1.70),
    ("High", 0.29, 0.997878),
    ("D75", 0.432664, 0.775651),
    ("D65", 0.455606, 0.741601),
    ("D50", 0.507914, 0.610665),
    ("F", 0.585179, 0.483977),
    ("A", 0.756114, 0.391159),
    ("H", 0.940325, 0.345813),
    ("1500", 1.35, 0.25),
    ("100K", 2.50, 0.01),
];

/// Adjacent anchor pairs, from the coolest band to the warmest.
pub const REFERENCE_INTERVALS: [(&str, &str); 9] = [
    ("Ultra", "High"),
    ("High", "D75"),
    ("D75", "D65"),
    ("D65", "D50"),
    ("D50", "F"),
    ("F", "A"),
    ("A", "H"),
    ("H", "1500"),
    ("1500", "100K"),
];

/// Fixed plot extent; its top-right corner is the apex of every sector.
pub const CANVAS_BOUNDS: Rect = Rect::new(0.0, 2.53, 0.0, 1.7);

lazy_static! {
    pub static ref DEFAULT_REFERENCE: Arc<ReferenceModel> = match ReferenceModel::standard() {
        Ok(model) => Arc::new(model),
        Err(e) => panic!("Built-in reference tables are inconsistent: {e}"),
    };
}

#[derive(Clone, Debug, PartialEq)]
pub struct Anchor {
    pub name: String,
    pub pos: Point,
}

/// An ordered pair of anchors. The name is `"{a}-{b}"` and is matched
/// literally by span filters.
#[derive(Clone, Debug, PartialEq)]
pub struct Interval {
    pub a: String,
    pub b: String,
    name: String,
}

impl Interval {
    pub fn new(a: &str, b: &str) -> Interval {
        Interval {
            a: a.to_string(),
            b: b.to_string(),
            name: format!("{a}-{b}"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Read-only table of anchors, intervals and the canvas. Every interval is
/// guaranteed to reference known anchors once constructed.
#[derive(Clone, Debug)]
pub struct ReferenceModel {
    anchors: Vec<Anchor>,
    /// Anchor name -> index into `anchors`
    index: FxHashMap<String, usize>,
    intervals: Vec<Interval>,
    bounds: Rect,
}

impl ReferenceModel {
    pub fn new(
        anchors: Vec<Anchor>,
        intervals: Vec<Interval>,
        bounds: Rect,
    ) -> Result<ReferenceModel, ReferenceError> {
        if anchors.is_empty() {
            return Err(ReferenceError::NoAnchors);
        }
        if intervals.is_empty() {
            return Err(ReferenceError::NoIntervals);
        }
        if !(bounds.xmin < bounds.xmax && bounds.ymin < bounds.ymax) {
            return Err(ReferenceError::DegenerateBounds {
                xmin: bounds.xmin,
                xmax: bounds.xmax,
                ymin: bounds.ymin,
                ymax: bounds.ymax,
            });
        }

        let mut index = FxHashMap::default();
        for (i, anchor) in anchors.iter().enumerate() {
            if !anchor.pos.is_finite() {
                return Err(ReferenceError::NonFiniteAnchor {
                    name: anchor.name.clone(),
                });
            }
            if index.insert(anchor.name.clone(), i).is_some() {
                return Err(ReferenceError::DuplicateAnchor(anchor.name.clone()));
            }
        }
        for interval in intervals.iter() {
            for name in [&interval.a, &interval.b] {
                if !index.contains_key(name) {
                    return Err(ReferenceError::UnknownAnchor {
                        a: interval.a.clone(),
                        b: interval.b.clone(),
                        missing: name.clone(),
                    });
                }
            }
        }

        Ok(ReferenceModel {
            anchors,
            index,
            intervals,
            bounds,
        })
    }

    /// The built-in anchor chain from `Ultra` to `100K`.
    pub fn standard() -> Result<ReferenceModel, ReferenceError> {
        let anchors = TEMPERATURE_ANCHORS
            .iter()
            .map(|&(name, x, y)| Anchor {
                name: name.to_string(),
                pos: Point::new(x, y),
            })
            .collect();
        let intervals = REFERENCE_INTERVALS
            .iter()
            .map(|&(a, b)| Interval::new(a, b))
            .collect();
        ReferenceModel::new(anchors, intervals, CANVAS_BOUNDS)
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Shared apex of all sectors.
    pub fn corner(&self) -> Point {
        self.bounds.top_right()
    }

    /// Anchor coordinate by (case-sensitive) name.
    pub fn anchor(&self, name: &str) -> Option<Point> {
        self.index.get(name).map(|&i| self.anchors[i].pos)
    }

    /// Interval by its formatted `"{a}-{b}"` name.
    pub fn interval(&self, name: &str) -> Option<&Interval> {
        self.intervals.iter().find(|iv| iv.name() == name)
    }

    /// Sector between two named anchors, `None` if either name is unknown.
    pub fn sector_between(&self, a: &str, b: &str) -> Option<Sector> {
        let (pa, pb) = (self.anchor(a)?, self.anchor(b)?);
        let sector = Sector::build(self.corner(), pa, pb, &self.bounds);
        log::trace!(
            "Sector {}-{}: corner {}, pa {}, pb {}",
            a,
            b,
            sector.apex,
            sector.base1,
            sector.base2
        );
        Some(sector)
    }

    /// Triangle vertices (corner, hit(a), hit(b)) for plotting.
    pub fn sector_vertices(&self, a: &str, b: &str) -> Option<[Point; 3]> {
        self.sector_between(a, b).map(|s| s.vertices())
    }

    /// Sectors for every interval, in table order.
    pub fn sectors(&self) -> Vec<Sector> {
        self.intervals
            .iter()
            .map(|iv| {
                let (pa, pb) = (self.anchors[self.index[&iv.a]].pos, self.anchors[self.index[&iv.b]].pos);
                Sector::build(self.corner(), pa, pb, &self.bounds)
            })
            .collect()
    }
}
