use std::fmt;
use std::sync::Arc;

/// Planar coordinate in the same coordinate reference system as the
/// route network. Equality is exact: identical begin/end input points
/// must be detected as such, not as "close enough".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<Point> for geo::Point<f64> {
    fn from(point: Point) -> Self {
        Self::new(point.x, point.y)
    }
}

impl From<geo::Point<f64>> for Point {
    fn from(point: geo::Point<f64>) -> Self {
        Self::new(point.x(), point.y())
    }
}

/// Measure (M-value) along a route, typically milepost-like.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Measure(f64);

impl Measure {
    pub const fn from_value(value: f64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Rounds the measure to a fixed number of decimal places.
    pub fn round_to(self, precision: u32) -> Self {
        let factor = 10f64.powi(precision as i32);
        Self((self.0 * factor).round() / factor)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Route identifier. Ordering is lexical, which makes it the stable
/// tie-break key when a fallback match returns several candidates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteId(Arc<str>);

impl RouteId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RouteId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Back-reference to a vertex of a route by its flat index, counted
/// continuously across all parts of a multi-part geometry. Aligns 1:1
/// with the route's flat measure sequence; never owns geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexRef {
    pub route: RouteId,
    pub index: usize,
}

/// One input record as delivered by the upstream coordinate normalizer:
/// both points are already reprojected into the network CRS, and a
/// malformed or absent coordinate arrives as `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventInput {
    pub organization: String,
    pub id: String,
    pub begin: Option<Point>,
    pub end: Option<Point>,
}

impl EventInput {
    /// Effective end coordinate: a record with only a begin point is a
    /// point event and reuses the begin coordinate as its end.
    pub fn end_or_begin(&self) -> Option<Point> {
        self.end.or(self.begin)
    }
}

/// One output record of the event table. Always produced, one per
/// input record; unresolved fields stay `None` and the comment carries
/// the diagnostic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Event {
    pub organization: String,
    pub id: String,
    pub route: Option<RouteId>,
    pub begin_measure: Option<Measure>,
    pub end_measure: Option<Measure>,
    pub comment: String,
}

impl Event {
    pub(crate) fn from_input(input: &EventInput) -> Self {
        Self {
            organization: input.organization.clone(),
            id: input.id.clone(),
            ..Self::default()
        }
    }

    pub fn push_comment(&mut self, note: &str) {
        if !self.comment.is_empty() {
            self.comment.push_str("; ");
        }
        self.comment.push_str(note);
    }

    /// True when the event carries a route and both measures.
    pub fn is_resolved(&self) -> bool {
        self.route.is_some() && self.begin_measure.is_some() && self.end_measure.is_some()
    }
}
