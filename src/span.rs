use std::fmt::Display;

use fxhash::FxHashMap;
use thiserror::Error;

use crate::geometry::Point;

/// Intervals highlighted by table consumers.
pub const KEY_INTERVALS: [&str; 3] = ["D65-D50", "D50-F", "F-A"];

/// Reasons an entity could not be classified. The entity still gets a
/// zero-match span; the warning is reported next to the results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisWarning {
    #[error("Map point {alias} is a polygon without vertices")]
    EmptyPolygon { alias: String },

    #[error("Map point {alias} has a non-finite coordinate")]
    NonFiniteCoordinate { alias: String },
}

impl AnalysisWarning {
    pub fn alias(&self) -> &str {
        match self {
            AnalysisWarning::EmptyPolygon { alias } => alias,
            AnalysisWarning::NonFiniteCoordinate { alias } => alias,
        }
    }
}

/// The intervals one map point was classified into.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanResult {
    pub alias: String,
    /// Matched interval names, in interval-table order
    pub interval_names: Vec<String>,
    pub count: usize,
    /// Coordinate used for the point test
    pub coords: Point,
}

impl SpanResult {
    pub fn new(alias: &str, interval_names: Vec<String>, coords: Point) -> SpanResult {
        SpanResult {
            alias: alias.to_string(),
            count: interval_names.len(),
            interval_names,
            coords,
        }
    }

    /// Zero-match span for entities that could not be classified.
    pub fn empty(alias: &str, coords: Point) -> SpanResult {
        SpanResult::new(alias, Vec::new(), coords)
    }

    /// Display column text, e.g. `"D65-D50, D50-F"`.
    pub fn joined_names(&self) -> String {
        self.interval_names.join(", ")
    }

    /// Table filter: a map point without any span is never filtered out.
    pub fn matches_interval(&self, name: &str) -> bool {
        self.interval_names.is_empty() || self.interval_names.iter().any(|n| n == name)
    }

    pub fn touches_key_interval(&self) -> bool {
        self.interval_names
            .iter()
            .any(|n| KEY_INTERVALS.contains(&n.as_str()))
    }
}

impl Display for SpanResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] count={} coords=({:.3}, {:.3})",
            self.alias,
            self.joined_names(),
            self.count,
            self.coords.x,
            self.coords.y
        )
    }
}

/// Orders by count descending, then alias ascending.
pub fn rank_spans<'a>(spans: impl Iterator<Item = &'a SpanResult>, n: usize) -> Vec<SpanResult> {
    let mut ranked: Vec<&SpanResult> = spans.collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.alias.cmp(&b.alias)));
    ranked.into_iter().take(n).cloned().collect()
}

/// Result of one analysis run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisOutput {
    pub spans_by_alias: FxHashMap<String, SpanResult>,
    /// Aliases in first-seen order
    pub order: Vec<String>,
    /// Highest spans first
    pub top: Vec<SpanResult>,
    pub warnings: Vec<AnalysisWarning>,
}

impl AnalysisOutput {
    /// Records a span; a repeated alias replaces the earlier span but keeps
    /// its position.
    pub fn insert(&mut self, span: SpanResult) {
        if !self.spans_by_alias.contains_key(&span.alias) {
            self.order.push(span.alias.clone());
        }
        self.spans_by_alias.insert(span.alias.clone(), span);
    }

    pub fn get(&self, alias: &str) -> Option<&SpanResult> {
        self.spans_by_alias.get(alias)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Spans in first-seen alias order.
    pub fn iter(&self) -> impl Iterator<Item = &SpanResult> {
        self.order.iter().filter_map(|alias| self.spans_by_alias.get(alias))
    }

    /// Aliases passing the table filter for interval `name`.
    pub fn filter(&self, name: &str) -> Vec<&str> {
        self.iter()
            .filter(|span| span.matches_interval(name))
            .map(|span| span.alias.as_str())
            .collect()
    }

    /// Rebuilds the ranked list from the current spans.
    pub fn rank(&mut self, n: usize) {
        self.top = rank_spans(self.spans_by_alias.values(), n);
    }
}
