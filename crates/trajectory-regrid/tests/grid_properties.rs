//! Geometric properties of window construction and regridding.

use field_common::{CoordAxis, FieldCollection, Grid};
use test_utils::{
    arc_km, assert_approx_eq, lon_lat_field, regular_points, uniform_field, EARTH_RADIUS_KM,
};
use trajectory_regrid::{
    haversine_km, meshgrid, ConservativeRegridder, EmptySelectionPolicy, GeodesicMask,
    GridBuilder, RegridConfig,
};

fn builder() -> GridBuilder {
    GridBuilder::new(EARTH_RADIUS_KM, EmptySelectionPolicy::Fail)
}

#[test]
fn test_box_encloses_every_selected_point() {
    let lons = regular_points(-20.0, 0.5, 81);
    let lats = regular_points(-10.0, 0.5, 81);
    let field = lon_lat_field("f", &lons, &lats, |_, _| 0.0);
    let (xg, yg) = meshgrid(&lons, &lats);

    let cases = [
        (0.0, 0.0, 300.0),
        (3.2, -4.7, 150.0),
        (-12.0, 8.1, 500.0),
        (7.77, 1.23, 90.0),
    ];
    for (lon, lat, diameter) in cases {
        let grid = builder().build(&field, lon, lat, diameter).unwrap();
        let bbox = grid.bbox().unwrap();
        let mask = GeodesicMask::compute(&xg, &yg, (lon, lat), diameter, EARTH_RADIUS_KM).unwrap();

        let selected: Vec<(f64, f64)> = mask
            .retained_values(&xg)
            .zip(mask.retained_values(&yg))
            .collect();
        assert!(!selected.is_empty());
        for (x, y) in &selected {
            assert!(bbox.contains_point(*x, *y), "({}, {}) outside {}", x, y, bbox);
        }

        // Box edges are exactly the extremes of the selection.
        let min_x = selected.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let max_y = selected.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        assert_approx_eq!(bbox.min_x, min_x, 1e-12);
        assert_approx_eq!(bbox.max_y, max_y, 1e-12);
    }
}

#[test]
fn test_box_corners_can_exceed_radius() {
    let lons = regular_points(-5.0, 0.25, 41);
    let lats = regular_points(-5.0, 0.25, 41);
    let field = lon_lat_field("f", &lons, &lats, |_, _| 0.0);

    let diameter = arc_km(4.0);
    let grid = builder().build(&field, 0.0, 0.0, diameter).unwrap();
    let bbox = grid.bbox().unwrap();

    let corner = haversine_km(bbox.max_x, bbox.max_y, 0.0, 0.0, EARTH_RADIUS_KM);
    assert!(corner > diameter / 2.0);
}

#[test]
fn test_window_across_longitude_seam() {
    let lons = regular_points(0.0, 1.0, 360);
    let lats = regular_points(-10.0, 1.0, 21);
    let (x_dim, x) = {
        let field = lon_lat_field("f", &lons, &lats, |_, _| 0.0);
        let (dim, x) = field.coord_by_axis(CoordAxis::X).unwrap();
        (dim, x.clone().with_circular(true))
    };
    let mut field = lon_lat_field("atmosphere_boundary_layer_thickness", &lons, &lats, |lon, _| {
        lon as f32
    });
    field.replace_coord(x_dim, x).unwrap();

    let grid = builder().build(&field, 359.5, 0.0, arc_km(5.0)).unwrap();
    let points = grid.x().points();

    // Contiguous, monotonic and straddling 360.
    assert!(grid.x().is_strictly_monotonic());
    assert!(points.first().copied().unwrap() < 360.0);
    assert!(points.last().copied().unwrap() > 360.0);
    for pair in points.windows(2) {
        assert_approx_eq!(pair[1] - pair[0], 1.0, 1e-9);
    }

    // Regridding back onto the seam window picks up both ends of the source.
    let source: FieldCollection = std::iter::once(field).collect();
    let regridder = ConservativeRegridder::from_config(&RegridConfig::default());
    let out = regridder.regrid(&source, &grid).unwrap();
    let blt = out.extract("atmosphere_boundary_layer_thickness").unwrap();
    let row = blt.shape()[0] / 2;
    let nx = blt.shape()[1];
    assert_approx_eq!(blt.data()[[row, 0]], points[0], 1e-3);
    assert_approx_eq!(blt.data()[[row, nx - 1]], points[nx - 1] - 360.0, 1e-3);
}

#[test]
fn test_regrid_onto_supplied_grid_with_bounds() {
    let lons = regular_points(0.0, 1.0, 10);
    let lats = regular_points(0.0, 1.0, 10);
    let source: FieldCollection =
        std::iter::once(uniform_field("specific_humidity", &lons, &lats, 2.0)).collect();

    let x = field_common::DimCoord::new("longitude", CoordAxis::X, vec![3.0, 5.0])
        .with_bounds(vec![[2.0, 4.0], [4.0, 6.0]])
        .unwrap();
    let y = field_common::DimCoord::new("latitude", CoordAxis::Y, vec![3.0, 5.0])
        .with_bounds(vec![[2.0, 4.0], [4.0, 6.0]])
        .unwrap();
    let grid = Grid::new(y, x).unwrap();

    let regridder = ConservativeRegridder::from_config(&RegridConfig::default());
    let out = regridder.regrid(&source, &grid).unwrap();
    let q = out.extract("specific_humidity").unwrap();

    assert_eq!(q.shape(), &[2, 2]);
    assert_eq!(q.coord_by_axis(CoordAxis::X).unwrap().1.bounds().unwrap()[1], [4.0, 6.0]);
    for &v in q.data().iter() {
        assert_approx_eq!(v, 2.0, 1e-6);
    }
}
