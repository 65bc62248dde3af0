use thiserror::Error;

use crate::RouteId;

/// Structural failures in the route network itself. These are fatal at
/// load time: no event can be trusted against a corrupt network.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("route {route} has {measures} measures for {vertices} vertices")]
    MeasureCountMismatch {
        route: RouteId,
        vertices: usize,
        measures: usize,
    },
    #[error("route {route} has a geometry part with fewer than 2 vertices")]
    DegeneratePart { route: RouteId },
    #[error("route {route} is defined more than once")]
    DuplicateRoute { route: RouteId },
}

/// Failures of the point locator. Kept distinct from "no route
/// matched": a `SegmentNotFound` means the point was nominally on a
/// matched route but the geometry/tolerance disagreed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocateError {
    #[error("route {0} does not exist in the network")]
    UnknownRoute(RouteId),
    #[error("no segment of route {0} bounds the projected point within tolerance")]
    SegmentNotFound(RouteId),
}
