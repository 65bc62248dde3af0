use geo::{BoundingRect, Closest, ClosestPoint, Distance, Euclidean, LineString, Point as GeoPoint};
use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{NetworkError, Point, RouteId, VertexRef};

/// A single named route of the Linear Referencing System.
///
/// The geometry is an ordered list of parts, each part a polyline with
/// at least 2 vertices. The measure sequence is flat: one value per
/// vertex in traversal order across all parts, without resetting at
/// part boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    id: RouteId,
    parts: Vec<LineString>,
    measures: Vec<f64>,
}

impl Route {
    pub fn new(
        id: RouteId,
        parts: Vec<LineString>,
        measures: Vec<f64>,
    ) -> Result<Self, NetworkError> {
        if parts.is_empty() || parts.iter().any(|part| part.0.len() < 2) {
            return Err(NetworkError::DegeneratePart { route: id });
        }

        let vertices = parts.iter().map(|part| part.0.len()).sum::<usize>();
        if vertices != measures.len() {
            return Err(NetworkError::MeasureCountMismatch {
                route: id,
                vertices,
                measures: measures.len(),
            });
        }

        Ok(Self { id, parts, measures })
    }

    pub fn id(&self) -> &RouteId {
        &self.id
    }

    pub fn parts(&self) -> &[LineString] {
        &self.parts
    }

    pub fn vertex_count(&self) -> usize {
        self.measures.len()
    }

    pub fn vertex_ref(&self, index: usize) -> VertexRef {
        VertexRef {
            route: self.id.clone(),
            index,
        }
    }

    /// Measure at the referenced flat vertex index.
    pub fn measure_of(&self, vertex: &VertexRef) -> Option<f64> {
        self.measures.get(vertex.index).copied()
    }
}

/// One geometry part of a route as stored in the spatial index.
#[derive(Debug)]
struct IndexedPart {
    route: RouteId,
    geometry: LineString,
    envelope: AABB<GeoPoint>,
}

impl IndexedPart {
    fn new(route: RouteId, geometry: LineString) -> Self {
        // route parts are validated to hold at least 2 vertices, so the
        // bounding rect always exists
        let bbox = geometry.bounding_rect().unwrap();
        let envelope = AABB::from_corners(
            GeoPoint::new(bbox.min().x, bbox.min().y),
            GeoPoint::new(bbox.max().x, bbox.max().y),
        );

        Self {
            route,
            geometry,
            envelope,
        }
    }
}

impl RTreeObject for IndexedPart {
    type Envelope = AABB<GeoPoint>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl PointDistance for IndexedPart {
    fn distance_2(&self, point: &GeoPoint) -> f64 {
        match self.geometry.closest_point(point) {
            Closest::SinglePoint(p) | Closest::Intersection(p) => {
                let distance = Euclidean.distance(p, *point);
                distance * distance
            }
            Closest::Indeterminate => f64::INFINITY,
        }
    }
}

/// Immutable route network: identifier lookups plus a spatial
/// proximity query across all route geometries. Built once at startup
/// and shared read-only by every worker thereafter.
#[derive(Debug)]
pub struct RouteNetwork {
    routes: FxHashMap<RouteId, Route>,
    index: RTree<IndexedPart>,
}

impl RouteNetwork {
    /// Builds the network, validating the per-route measure/vertex
    /// length invariant. Any violation is fatal before the first event
    /// is processed.
    pub fn new(routes: Vec<Route>) -> Result<Self, NetworkError> {
        let mut map = FxHashMap::default();
        let mut parts = Vec::new();

        for route in routes {
            if map.contains_key(route.id()) {
                return Err(NetworkError::DuplicateRoute {
                    route: route.id().clone(),
                });
            }

            for part in route.parts() {
                parts.push(IndexedPart::new(route.id().clone(), part.clone()));
            }
            map.insert(route.id().clone(), route);
        }

        debug!("Indexed {} routes in {} parts", map.len(), parts.len());

        Ok(Self {
            routes: map,
            index: RTree::bulk_load(parts),
        })
    }

    pub fn get(&self, id: &RouteId) -> Option<&Route> {
        self.routes.get(id)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterates over the route identifiers, in no particular order.
    pub fn route_ids(&self) -> impl Iterator<Item = &RouteId> {
        self.routes.keys()
    }

    /// Identifiers of all routes whose geometry intersects the disk of
    /// `radius` centered at `point`. Conceptually a set: the result is
    /// sorted lexically and deduplicated, and is empty when nothing is
    /// within reach.
    pub fn routes_within(&self, point: Point, radius: f64) -> Vec<RouteId> {
        let radius = radius.max(0.0);
        let center = GeoPoint::from(point);

        let mut ids: Vec<RouteId> = self
            .index
            .locate_within_distance(center, radius * radius)
            .map(|part| part.route.clone())
            .collect();

        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
