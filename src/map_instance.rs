use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{bail, ensure, Context};

use crate::geometry::Point;
use crate::span::AnalysisWarning;

/// A map point as supplied by the map data layer.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEntity {
  /// Single point; `coord` is already absolute (base boundary + offset).
  Point { alias: String, coord: Point },
  /// Polygon region; the centroid is what the point test uses.
  Polygon {
    alias: String,
    centroid: Point,
    vertices: Vec<Point>,
  },
}

impl MapEntity {
  pub fn alias(&self) -> &str {
    match self {
      MapEntity::Point { alias, .. } | MapEntity::Polygon { alias, .. } => alias,
    }
  }

  /// Coordinate used for the point-in-sector test.
  pub fn coord(&self) -> Point {
    match self {
      MapEntity::Point { coord, .. } => *coord,
      MapEntity::Polygon { centroid, .. } => *centroid,
    }
  }

  pub fn is_polygon(&self) -> bool {
    matches!(self, MapEntity::Polygon { .. })
  }

  /// Polygon vertices; empty for single points.
  pub fn vertices(&self) -> &[Point] {
    match self {
      MapEntity::Point { .. } => &[],
      MapEntity::Polygon { vertices, .. } => vertices,
    }
  }

  /// Checks the entity can be classified.
  pub fn validate(&self) -> Result<(), AnalysisWarning> {
    let alias = self.alias().to_string();
    if !self.coord().is_finite() {
      return Err(AnalysisWarning::NonFiniteCoordinate { alias });
    }
    if let MapEntity::Polygon { vertices, .. } = self {
      if vertices.is_empty() {
        return Err(AnalysisWarning::EmptyPolygon { alias });
      }
      if vertices.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisWarning::NonFiniteCoordinate { alias });
      }
    }
    Ok(())
  }
}

impl Display for MapEntity {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      MapEntity::Point { alias, coord } => write!(f, "Point({}, {})", alias, coord),
      MapEntity::Polygon { alias, centroid, vertices } => {
        write!(f, "Polygon({}, {}, {} vertices)", alias, centroid, vertices.len())
      }
    }
  }
}

/// A set of map points loaded from a text file.
///
/// Format, one record per line (`#` starts a comment):
///
/// ```text
/// base  <rpg> <bpg>
/// point <alias> <offset_x> <offset_y>
/// poly  <alias> <cx> <cy> [<x1> <y1> ...]
/// ```
#[derive(Debug, Clone)]
pub struct MapInstance {
  /// Instance name.
  pub instance_name: String,
  /// Load time.
  pub start_time: Instant,

  /// Base boundary reference; single points are offsets from it.
  pub base: Point,
  /// Entities, in file order.
  pub entities: Vec<MapEntity>,
}

impl MapInstance {
  pub fn load(path: impl AsRef<Path>) -> anyhow::Result<MapInstance> {
    let path = path.as_ref();
    // Get basename from file path supplied
    let instance_name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| path.display().to_string());

    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    MapInstance::parse(&instance_name, &text)
  }

  pub fn parse(instance_name: &str, text: &str) -> anyhow::Result<MapInstance> {
    let start_time = Instant::now();

    let mut base: Option<Point> = None;
    let mut seen_point = false;
    let mut entities = Vec::new();

    for (i, raw) in text.lines().enumerate() {
      let line = raw.split('#').next().unwrap_or("").trim();
      if line.is_empty() {
        continue;
      }
      let lineno = i + 1;
      let mut parts = line.split_whitespace();
      let Some(kind) = parts.next() else {
        continue;
      };

      match kind {
        "base" => {
          let nums = parse_numbers(parts).with_context(|| format!("{instance_name}:{lineno}"))?;
          ensure!(nums.len() == 2, "{instance_name}:{lineno}: base expects 2 numbers, got {}", nums.len());
          ensure!(base.is_none(), "{instance_name}:{lineno}: duplicate base record");
          ensure!(!seen_point, "{instance_name}:{lineno}: base must precede point records");
          base = Some(Point::new(nums[0], nums[1]));
        }
        "point" => {
          let alias = parts.next().with_context(|| format!("{instance_name}:{lineno}: point without alias"))?;
          let nums = parse_numbers(parts).with_context(|| format!("{instance_name}:{lineno}"))?;
          ensure!(nums.len() == 2, "{instance_name}:{lineno}: point expects 2 offsets, got {}", nums.len());
          seen_point = true;
          let offset = Point::new(nums[0], nums[1]);
          entities.push(MapEntity::Point {
            alias: alias.to_string(),
            coord: base.unwrap_or_default() + offset,
          });
        }
        "poly" => {
          let alias = parts.next().with_context(|| format!("{instance_name}:{lineno}: poly without alias"))?;
          let nums = parse_numbers(parts).with_context(|| format!("{instance_name}:{lineno}"))?;
          ensure!(nums.len() >= 2, "{instance_name}:{lineno}: poly needs a centroid");
          ensure!(nums.len() % 2 == 0, "{instance_name}:{lineno}: odd number of vertex coordinates");
          let centroid = Point::new(nums[0], nums[1]);
          let vertices = nums[2..].chunks_exact(2).map(|c| Point::new(c[0], c[1])).collect::<Vec<_>>();
          if vertices.is_empty() {
            log::warn!("{instance_name}:{lineno}: polygon {alias} has no vertices");
          }
          entities.push(MapEntity::Polygon {
            alias: alias.to_string(),
            centroid,
            vertices,
          });
        }
        other => bail!("{instance_name}:{lineno}: unknown record `{other}`"),
      }
    }

    log::debug!("Loaded {} map points from {}", entities.len(), instance_name);
    Ok(MapInstance {
      instance_name: instance_name.to_string(),
      start_time,
      base: base.unwrap_or_default(),
      entities,
    })
  }
}

fn parse_numbers<'a>(parts: impl Iterator<Item = &'a str>) -> anyhow::Result<Vec<f64>> {
  parts
    .map(|p| p.parse::<f64>().with_context(|| format!("invalid number `{p}`")))
    .collect()
}
