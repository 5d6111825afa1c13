//! Line-shape trait and the tagged result of trying one shape.
//!
//! Each known row layout is a [`LineShape`]. The [`Extractor`] holds them as
//! an ordered decision list: shapes are tried from most to least specific and
//! the first one that does not answer [`ShapeMatch::Unmatched`] decides the
//! fate of the row.
//!
//! [`Extractor`]: super::Extractor

use std::cmp::Ordering;

use chrono::NaiveDate;
use labtrend_model::{InvalidReason, LineGroup, Observation, UnsupportedShape};

use super::ExtractOptions;

/// Outcome of matching one line group against one shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeMatch {
    /// The row was read into an observation.
    Matched(Observation),
    /// The row has a recognised layout that cannot be extracted.
    Unsupported(UnsupportedShape),
    /// The row matched the layout but is internally inconsistent.
    Invalid(InvalidReason),
    /// The shape does not apply; try the next one.
    Unmatched,
}

impl ShapeMatch {
    pub fn is_unmatched(&self) -> bool {
        matches!(self, Self::Unmatched)
    }
}

/// How literal a shape is.
///
/// `anchors` counts fixed, position-bound tokens the shape requires (a
/// timestamp column, an explicit marker, a delimiter layout). Ordering is by
/// anchors, then by required cell count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Specificity {
    pub anchors: u8,
    pub min_cells: usize,
}

impl Specificity {
    pub const fn new(anchors: u8, min_cells: usize) -> Self {
        Self { anchors, min_cells }
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.anchors
            .cmp(&other.anchors)
            .then(self.min_cells.cmp(&other.min_cells))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Per-document inputs available to every shape.
#[derive(Debug, Clone, Copy)]
pub struct ShapeContext<'a> {
    /// Date located in the document header.
    pub report_date: NaiveDate,
    pub options: &'a ExtractOptions,
}

/// A named parser for one row layout.
///
/// Implementations must be pure: the same group and context always give the
/// same answer.
pub trait LineShape: Send + Sync {
    /// Stable identifier, e.g. `"numeric-columns"`.
    fn name(&self) -> &'static str;

    /// One-line human-readable description of the layout.
    fn description(&self) -> &'static str;

    fn specificity(&self) -> Specificity;

    /// Tries to read `group` as this layout.
    fn parse(&self, group: &LineGroup, ctx: &ShapeContext<'_>) -> ShapeMatch;
}
