//! Tests for named colormaps, colormap files and value normalization.

use std::sync::Arc;

use povplot::colormap::{gray, hot, jet, viridis, Color, ColormapFile};
use povplot::{resolve, ColorBinding, Colormap, ColormapRegistry, InputError, VertexColors};
use test_utils::{assert_color_near, temp_test_dir};

fn rgb8(map: &dyn Colormap, t: f64) -> [u8; 3] {
    let c = map.color(t);
    [c.r, c.g, c.b]
}

// ============================================================================
// Built-in maps
// ============================================================================

#[test]
fn test_viridis_matches_reference_anchors() {
    let anchors = [
        "#440154", "#482475", "#414487", "#355f8d", "#2a788e", "#21918c", "#22a884", "#44bf70",
        "#7ad151", "#bddf26", "#fde725",
    ];
    let map = viridis();
    for (i, hex) in anchors.iter().enumerate() {
        let t = i as f64 / 10.0;
        let expected = Color::from_hex(hex).unwrap();
        assert_color_near!(rgb8(&map, t), [expected.r, expected.g, expected.b], 4);
    }
}

#[test]
fn test_jet_known_points() {
    let map = jet();
    assert_eq!(rgb8(&map, 0.0), [0, 0, 128]);
    assert_eq!(rgb8(&map, 0.5)[1], 255);
    assert_eq!(rgb8(&map, 1.0), [128, 0, 0]);
    // Cyan band between the blue and green ramps.
    assert_color_near!(rgb8(&map, 0.35), [0, 230, 247], 2);
}

#[test]
fn test_hot_runs_black_to_white() {
    let map = hot();
    assert_color_near!(rgb8(&map, 0.0), [11, 0, 0], 1);
    assert_eq!(rgb8(&map, 1.0), [255, 255, 255]);
    let mid = rgb8(&map, 0.5);
    assert_eq!(mid[0], 255);
    assert_eq!(mid[2], 0);
}

#[test]
fn test_gray_is_linear() {
    let map = gray();
    for i in 0..=10 {
        let t = i as f64 / 10.0;
        let v = (t * 255.0).round() as u8;
        assert_eq!(rgb8(&map, t), [v, v, v]);
    }
}

#[test]
fn test_colormaps_clamp() {
    let maps: [Arc<dyn Colormap>; 2] = [Arc::new(jet()), Arc::new(viridis())];
    for map in maps {
        assert_eq!(map.rgb(-1.0), map.rgb(0.0));
        assert_eq!(map.rgb(2.0), map.rgb(1.0));
        for &c in &map.rgb(0.3) {
            assert!((0.0..=1.0).contains(&c));
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_registry_default_is_viridis() {
    let registry = ColormapRegistry::default();
    let map = registry.get(None).unwrap();
    assert_eq!(map.name(), "viridis");
    assert_eq!(registry.get(Some("grey")).unwrap().rgb(0.25), gray().rgb(0.25));
    assert!(registry.names().contains(&"hot"));
}

#[test]
fn test_registry_reversed_maps() {
    let registry = ColormapRegistry::default();
    let reversed = registry.get(Some("viridis_r")).unwrap();
    assert_eq!(reversed.rgb(0.2), viridis().rgb(0.8));
    assert!(matches!(
        registry.get(Some("nope_r")),
        Err(InputError::UnknownColormap(name)) if name == "nope_r"
    ));
}

#[test]
fn test_load_colormap_file() {
    let dir = temp_test_dir();
    let path = dir.path().join("terrain.json");
    std::fs::write(
        &path,
        r##"{"name": "terrain", "stops": [
            {"value": 100, "color": "#0000ff"},
            {"value": -100, "color": "#000000"},
            {"value": 0, "color": "#ffffff"}
        ]}"##,
    )
    .unwrap();

    let mut registry = ColormapRegistry::default();
    assert_eq!(registry.load_file(&path).unwrap(), "terrain");
    let map = registry.get(Some("terrain")).unwrap();
    assert_eq!(rgb8(map.as_ref(), 0.0), [0, 0, 0]);
    assert_eq!(rgb8(map.as_ref(), 0.5), [255, 255, 255]);
    assert_eq!(rgb8(map.as_ref(), 1.0), [0, 0, 255]);
    assert_eq!(rgb8(map.as_ref(), 0.25), [128, 128, 128]);
}

#[test]
fn test_colormap_file_validation() {
    let one_stop =
        ColormapFile::from_json(r##"{"name": "x", "stops": [{"value": 0, "color": "#000000"}]}"##)
            .unwrap();
    assert!(one_stop.into_colormap().is_err());

    let bad_color = ColormapFile::from_json(
        r##"{"name": "x", "stops": [{"value": 0, "color": "#000000"}, {"value": 1, "color": "blue"}]}"##,
    )
    .unwrap();
    assert!(bad_color.into_colormap().is_err());

    assert!(ColormapFile::from_json("{").is_err());
}

// ============================================================================
// Value normalization
// ============================================================================

#[test]
fn test_binding_defaults_to_value_range() {
    let mesh = test_utils::square_mesh(50.0);
    let binding = ColorBinding::for_mesh(&mesh, Arc::new(gray()), None, None).unwrap();
    assert_eq!((binding.vmin, binding.vmax), (0.0, 2.0));

    let binding = ColorBinding::for_mesh(&mesh, Arc::new(gray()), Some(-1.0), None).unwrap();
    assert_eq!((binding.vmin, binding.vmax), (-1.0, 2.0));
}

#[test]
fn test_binding_rejects_inverted_range() {
    let mesh = test_utils::square_mesh(50.0);
    let err = ColorBinding::for_mesh(&mesh, Arc::new(gray()), Some(3.0), Some(-1.0)).unwrap_err();
    assert_eq!(err, InputError::InvalidRange { vmin: 3.0, vmax: -1.0 });
}

#[test]
fn test_resolve_clamps_out_of_range_values() {
    let binding = ColorBinding::new(Arc::new(jet()), 0.0, 1.0).unwrap();
    match resolve(Some(&[-5.0, 0.5, 5.0]), &binding, [0.0; 3]) {
        VertexColors::Mapped { positions, colors } => {
            assert_eq!(positions, vec![0.0, 0.5, 1.0]);
            assert_eq!(colors[0], jet().rgb(0.0));
            assert_eq!(colors[2], jet().rgb(1.0));
        }
        other => panic!("expected mapped colors, got {:?}", other),
    }
}

#[test]
fn test_resolve_equal_bounds_maps_to_middle() {
    let binding = ColorBinding::new(Arc::new(viridis()), 1.0, 1.0).unwrap();
    match resolve(Some(&[1.0, 1.0, 1.0]), &binding, [0.0; 3]) {
        VertexColors::Mapped { positions, .. } => assert_eq!(positions, vec![0.5; 3]),
        other => panic!("expected mapped colors, got {:?}", other),
    }
}
