use geo::{Closest, ClosestPoint, Distance, Euclidean, Line, Point as GeoPoint};
use ordered_float::OrderedFloat;
use tracing::{debug, trace};

use crate::{LocateError, MatcherConfig, Measure, Point, Route, RouteId, RouteNetwork};

/// Finds the measure value of the location along `route_id` closest to
/// `point`.
///
/// The point is projected onto the route geometry (nearest-point
/// projection over every segment of every part), the bounding segment
/// of the projection is identified by a flat-indexed re-scan, and the
/// measure is linearly interpolated between the segment's endpoint
/// measures. The result is rounded to the configured precision.
pub fn locate(
    network: &RouteNetwork,
    route_id: &RouteId,
    point: Point,
    config: &MatcherConfig,
) -> Result<Measure, LocateError> {
    let route = network
        .get(route_id)
        .ok_or_else(|| LocateError::UnknownRoute(route_id.clone()))?;

    let target = GeoPoint::from(point);
    let projected = nearest_point_on_route(route, target)
        .ok_or_else(|| LocateError::SegmentNotFound(route_id.clone()))?;
    trace!("Projected {point:?} onto {route_id} at {projected:?}");

    let Some((index, segment)) = bounding_segment(route, projected, config.segment_tolerance)
    else {
        debug!("No segment of {route_id} bounds {projected:?} within tolerance");
        return Err(LocateError::SegmentNotFound(route_id.clone()));
    };

    let previous = route.vertex_ref(index);
    let next = route.vertex_ref(index + 1);

    let segment_length = Euclidean.distance(segment.start_point(), segment.end_point());
    let distance_to_point = Euclidean.distance(segment.start_point(), projected);

    // degenerate segment guard
    let ratio = if segment_length == 0.0 {
        0.0
    } else {
        distance_to_point / segment_length
    };

    let previous_measure = route
        .measure_of(&previous)
        .ok_or_else(|| LocateError::SegmentNotFound(route_id.clone()))?;
    let next_measure = route
        .measure_of(&next)
        .ok_or_else(|| LocateError::SegmentNotFound(route_id.clone()))?;

    // an exact vertex hit returns the vertex measure without interpolation drift
    let value = if ratio == 0.0 {
        previous_measure
    } else {
        previous_measure + (next_measure - previous_measure) * ratio
    };

    Ok(Measure::from_value(value).round_to(config.measure_precision))
}

/// Nearest point on the route's full geometry, minimizing Euclidean
/// distance over all segments of all parts.
fn nearest_point_on_route(route: &Route, target: GeoPoint) -> Option<GeoPoint> {
    route
        .parts()
        .iter()
        .flat_map(|part| part.lines())
        .filter_map(|segment| closest_on_segment(&segment, target))
        .min_by_key(|candidate| OrderedFloat(Euclidean.distance(*candidate, target)))
}

/// First segment, in traversal order, whose distance to the projected
/// point is within tolerance. Returns the flat index of the segment's
/// start vertex: a single running counter across all parts that never
/// resets, matching the flat measure sequence.
fn bounding_segment(route: &Route, projected: GeoPoint, tolerance: f64) -> Option<(usize, Line)> {
    let mut flat_index = 0;

    for part in route.parts() {
        for segment in part.lines() {
            let distance = closest_on_segment(&segment, projected)
                .map_or(f64::INFINITY, |p| Euclidean.distance(p, projected));

            if distance <= tolerance {
                return Some((flat_index, segment));
            }
            flat_index += 1;
        }
        // the last vertex of a part has no outgoing segment
        flat_index += 1;
    }

    None
}

fn closest_on_segment(segment: &Line, point: GeoPoint) -> Option<GeoPoint> {
    if segment.start == segment.end {
        return Some(segment.start_point());
    }

    match segment.closest_point(&point) {
        Closest::SinglePoint(p) | Closest::Intersection(p) => Some(p),
        Closest::Indeterminate => None,
    }
}

#[cfg(test)]
mod tests {
    use geo::line_string;
    use test_log::test;

    use super::*;

    fn network() -> RouteNetwork {
        let rte100 = Route::new(
            RouteId::from("RTE100"),
            vec![line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 20.0, y: 0.0)]],
            vec![0.0, 1.0, 2.0],
        )
        .unwrap();

        // multi-part route: the flat vertex index keeps counting across
        // the gap between the parts
        let sr0642 = Route::new(
            RouteId::from("SR0642"),
            vec![
                line_string![(x: 0.0, y: 100.0), (x: 10.0, y: 100.0), (x: 20.0, y: 100.0)],
                line_string![(x: 30.0, y: 100.0), (x: 40.0, y: 100.0)],
            ],
            vec![0.0, 1.0, 2.0, 5.0, 6.0],
        )
        .unwrap();

        RouteNetwork::new(vec![rte100, sr0642]).unwrap()
    }

    #[test]
    fn locate_exact_vertex_hit() {
        let network = network();
        let config = MatcherConfig::default();
        let route = RouteId::from("RTE100");

        for (point, expected) in [
            (Point::new(0.0, 0.0), 0.0),
            (Point::new(10.0, 0.0), 1.0),
            (Point::new(20.0, 0.0), 2.0),
        ] {
            let measure = locate(&network, &route, point, &config).unwrap();
            assert_eq!(measure.value(), expected, "{point:?}");
        }
    }

    #[test]
    fn locate_midpoint() {
        let network = network();
        let config = MatcherConfig::default();
        let route = RouteId::from("RTE100");

        let measure = locate(&network, &route, Point::new(5.0, 0.0), &config).unwrap();
        assert_eq!(measure, Measure::from_value(0.5));

        let measure = locate(&network, &route, Point::new(15.0, 0.0), &config).unwrap();
        assert_eq!(measure, Measure::from_value(1.5));
    }

    #[test]
    fn locate_projects_off_route_point() {
        let network = network();
        let config = MatcherConfig::default();
        let route = RouteId::from("RTE100");

        // projects straight down onto (5, 0)
        let measure = locate(&network, &route, Point::new(5.0, 3.0), &config).unwrap();
        assert_eq!(measure, Measure::from_value(0.5));
    }

    #[test]
    fn locate_on_second_part_uses_flat_index() {
        let network = network();
        let config = MatcherConfig::default();
        let route = RouteId::from("SR0642");

        // midpoint of the second part: measures[3..=4] = [5.0, 6.0]
        let measure = locate(&network, &route, Point::new(35.0, 100.0), &config).unwrap();
        assert_eq!(measure, Measure::from_value(5.5));

        // last vertex of the first part
        let measure = locate(&network, &route, Point::new(20.0, 100.0), &config).unwrap();
        assert_eq!(measure, Measure::from_value(2.0));
    }

    #[test]
    fn locate_zero_length_segment_returns_start_measure() {
        let route = Route::new(
            RouteId::from("US0011"),
            vec![line_string![
                (x: 10.0, y: 0.0),
                (x: 10.0, y: 0.0),
                (x: 20.0, y: 0.0),
            ]],
            vec![1.0, 1.0, 2.0],
        )
        .unwrap();
        let network = RouteNetwork::new(vec![route]).unwrap();
        let config = MatcherConfig::default();

        let measure = locate(
            &network,
            &RouteId::from("US0011"),
            Point::new(10.0, 0.0),
            &config,
        )
        .unwrap();
        assert_eq!(measure, Measure::from_value(1.0));
    }

    #[test]
    fn locate_rounds_to_configured_precision() {
        let route = Route::new(
            RouteId::from("RTE100"),
            vec![line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 0.0)]],
            vec![0.0, 1.0],
        )
        .unwrap();
        let network = RouteNetwork::new(vec![route]).unwrap();
        let route = RouteId::from("RTE100");

        let config = MatcherConfig::default();
        let measure = locate(&network, &route, Point::new(1.0, 0.0), &config).unwrap();
        assert_eq!(measure.value(), 0.333);

        let config = MatcherConfig {
            measure_precision: 1,
            ..Default::default()
        };
        let measure = locate(&network, &route, Point::new(1.0, 0.0), &config).unwrap();
        assert_eq!(measure.value(), 0.3);
    }

    #[test]
    fn locate_unknown_route() {
        let network = network();
        let config = MatcherConfig::default();

        let error = locate(
            &network,
            &RouteId::from("US0058"),
            Point::new(5.0, 0.0),
            &config,
        )
        .unwrap_err();
        assert_eq!(error, LocateError::UnknownRoute(RouteId::from("US0058")));
    }

    #[test]
    fn locate_segment_not_found() {
        let network = network();
        // force the containment test to fail
        let config = MatcherConfig {
            segment_tolerance: -1.0,
            ..Default::default()
        };

        let error = locate(
            &network,
            &RouteId::from("RTE100"),
            Point::new(5.0, 0.0),
            &config,
        )
        .unwrap_err();
        assert_eq!(error, LocateError::SegmentNotFound(RouteId::from("RTE100")));
    }
}
