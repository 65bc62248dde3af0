use geo::line_string;
use lrs_events::{Route, RouteId, RouteNetwork};

/// Small fixture network in a projected planar CRS: a straight route,
/// a multi-part route, two crossing routes and a pair of routes that
/// share the same alignment. The clusters are spaced further apart
/// than the default search radius so scenarios don't interfere.
pub fn salem_network() -> RouteNetwork {
    let rte100 = Route::new(
        RouteId::from("RTE100"),
        vec![line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 20.0, y: 0.0)]],
        vec![0.0, 1.0, 2.0],
    )
    .unwrap();

    let sr0642 = Route::new(
        RouteId::from("SR0642"),
        vec![
            line_string![(x: 0.0, y: 100.0), (x: 10.0, y: 100.0), (x: 20.0, y: 100.0)],
            line_string![(x: 30.0, y: 100.0), (x: 40.0, y: 100.0)],
        ],
        vec![0.0, 1.0, 2.0, 5.0, 6.0],
    )
    .unwrap();

    // US0011 and US0460 cross at (100, 200)
    let us0011 = Route::new(
        RouteId::from("US0011"),
        vec![line_string![(x: 0.0, y: 200.0), (x: 200.0, y: 200.0)]],
        vec![10.0, 12.0],
    )
    .unwrap();
    let us0460 = Route::new(
        RouteId::from("US0460"),
        vec![line_string![(x: 100.0, y: 150.0), (x: 100.0, y: 300.0)]],
        vec![0.0, 15.0],
    )
    .unwrap();

    // same alignment, different measures: only resolvable by fallback
    let sr0785 = Route::new(
        RouteId::from("SR0785"),
        vec![line_string![(x: 0.0, y: 400.0), (x: 100.0, y: 400.0)]],
        vec![0.0, 1.0],
    )
    .unwrap();
    let sr0785a = Route::new(
        RouteId::from("SR0785A"),
        vec![line_string![(x: 0.0, y: 400.0), (x: 100.0, y: 400.0)]],
        vec![100.0, 101.0],
    )
    .unwrap();

    RouteNetwork::new(vec![rte100, sr0642, us0011, us0460, sr0785, sr0785a]).unwrap()
}
