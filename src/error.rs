use thiserror::Error;

/// Inconsistencies in the anchor / interval tables. These are configuration
/// mistakes and are reported once, when the reference model is built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReferenceError {
    #[error("Reference model has no anchors")]
    NoAnchors,

    #[error("Reference model has no intervals")]
    NoIntervals,

    #[error("Duplicate anchor name: {0}")]
    DuplicateAnchor(String),

    #[error("Interval {a}-{b} references unknown anchor {missing}")]
    UnknownAnchor {
        a: String,
        b: String,
        missing: String,
    },

    #[error("Anchor {name} has a non-finite coordinate")]
    NonFiniteAnchor { name: String },

    #[error("Degenerate canvas bounds: x [{xmin}, {xmax}], y [{ymin}, {ymax}]")]
    DegenerateBounds {
        xmin: f64,
        xmax: f64,
        ymin: f64,
        ymax: f64,
    },
}
