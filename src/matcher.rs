use tracing::debug;

use crate::{Point, RouteId, RouteNetwork};

/// Tunables of the matching engine.
///
/// The defaults are calibrated for a projected, meter-based CRS (the
/// event-table variant of the reference workflow). Networks kept in
/// degree-based coordinates need much smaller radius and tolerance
/// values; both are configuration, not algorithm.
#[derive(Debug, Clone, Copy)]
pub struct MatcherConfig {
    /// Widest disambiguation radius, in the network's planar units.
    pub search_radius: f64,
    /// Amount the radius shrinks by per disambiguation iteration.
    /// Non-positive values are treated as the default step of 1.
    pub radius_step: f64,
    /// Positional slack of the locator's segment containment test.
    /// Floating-point/geometric slack, not a search tolerance.
    pub segment_tolerance: f64,
    /// Decimal places kept on interpolated measures.
    pub measure_precision: u32,
    /// Symmetric nudge applied when begin and end measures come out
    /// equal, so the event keeps a strictly positive length.
    pub degenerate_epsilon: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            search_radius: 25.0,
            radius_step: 1.0,
            segment_tolerance: 0.1,
            measure_precision: 3,
            degenerate_epsilon: 0.1,
        }
    }
}

/// Outcome of the shrinking-radius route disambiguation.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteMatch {
    /// Exactly one route is near both points.
    Unique(RouteId),
    /// The remaining candidates are essentially equidistant. Sorted
    /// lexically; the caller picks the first and records the ambiguity.
    Fallback(Vec<RouteId>),
    /// No route within the widest search radius of both points.
    NoMatch,
}

/// Finds the single route both the begin and end point lie on.
///
/// Starts at the configured search radius and shrinks it step by step:
/// at each radius the candidate set is the intersection of the routes
/// near the begin point and the routes near the end point. An empty
/// intersection at the widest radius is a terminal no-match. An
/// intersection that vanishes at a narrower radius means the last
/// survivors were equidistant: the search backs off one step and
/// returns that wider set as a fallback instead of guessing.
pub fn disambiguate(
    network: &RouteNetwork,
    config: &MatcherConfig,
    begin: Point,
    end: Point,
) -> RouteMatch {
    // a non-positive step would never shrink the radius and the search
    // could loop forever on tied candidates
    let step = if config.radius_step > 0.0 {
        config.radius_step
    } else {
        1.0
    };
    let mut radius = config.search_radius;

    loop {
        let matches = matching_routes(network, begin, end, radius);
        debug!("{} candidate routes within {radius}", matches.len());

        if matches.is_empty() {
            if radius >= config.search_radius {
                // nothing even at the widest tolerance; shrinking cannot gain matches
                return RouteMatch::NoMatch;
            }
            let fallback = matching_routes(network, begin, end, radius + step);
            debug!("Candidates vanished, backing off to {} fallback routes", fallback.len());
            return RouteMatch::Fallback(fallback);
        }

        if let [route] = matches.as_slice() {
            return RouteMatch::Unique(route.clone());
        }

        radius -= step;
        if radius <= 0.0 {
            // still ambiguous at the narrowest radius
            return RouteMatch::Fallback(matches);
        }
    }
}

/// Routes near both points at the given radius. Inputs are sorted and
/// deduplicated, so the intersection stays lexically sorted.
fn matching_routes(network: &RouteNetwork, begin: Point, end: Point, radius: f64) -> Vec<RouteId> {
    let begin_routes = network.routes_within(begin, radius);
    let end_routes = network.routes_within(end, radius);

    begin_routes
        .into_iter()
        .filter(|id| end_routes.contains(id))
        .collect()
}
