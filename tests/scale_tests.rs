use chart_engine::error::ChartError;
use chart_engine::scales::{extent, format_number, BandScale, ChartScale, ContinuousScale};

#[test]
fn test_linear_scale_maps_and_inverts() {
    let scale = ContinuousScale::new((0.0, 100.0), (0.0, 500.0)).unwrap();

    assert_eq!(scale.map(0.0), 0.0);
    assert_eq!(scale.map(50.0), 250.0);
    assert_eq!(scale.map(100.0), 500.0);

    assert_eq!(scale.invert(0.0), 0.0);
    assert_eq!(scale.invert(250.0), 50.0);
    assert_eq!(scale.invert(500.0), 100.0);
}

#[test]
fn test_linear_scale_inverted_range() {
    // screen y grows downwards
    let scale = ContinuousScale::new((0.0, 10.0), (200.0, 0.0)).unwrap();
    assert_eq!(scale.map(0.0), 200.0);
    assert_eq!(scale.map(10.0), 0.0);
    assert_eq!(scale.map(2.5), 150.0);
}

#[test]
fn test_linear_scale_clamp() {
    let scale = ContinuousScale::new((0.0, 10.0), (0.0, 100.0))
        .unwrap()
        .with_clamp(true);
    assert_eq!(scale.map(20.0), 100.0);
    assert_eq!(scale.map(-5.0), 0.0);

    let loose = ContinuousScale::new((0.0, 10.0), (0.0, 100.0)).unwrap();
    assert_eq!(loose.map(20.0), 200.0);
}

#[test]
fn test_flat_domain_maps_to_range_midpoint() {
    let scale = ContinuousScale::new((5.0, 5.0), (0.0, 300.0)).unwrap();
    assert_eq!(scale.map(5.0), 150.0);
    assert_eq!(scale.map(-100.0), 150.0);
    assert!(scale.map(1e9).is_finite());
    assert_eq!(scale.invert(42.0), 5.0);
    assert_eq!(scale.ticks(5), vec![5.0]);
}

#[test]
fn test_reversed_domain_is_a_configuration_error() {
    let err = ContinuousScale::new((10.0, 0.0), (0.0, 1.0)).unwrap_err();
    assert!(matches!(err, ChartError::Configuration(_)));
}

#[test]
fn test_non_finite_domain_is_degenerate() {
    let err = ContinuousScale::new((0.0, f64::NAN), (0.0, 1.0)).unwrap_err();
    assert!(matches!(err, ChartError::DegenerateDomain(_)));
    assert!(err.is_recoverable());
}

#[test]
fn test_ticks_and_nice() {
    let scale = ContinuousScale::new((0.0, 10.0), (0.0, 100.0)).unwrap();
    assert_eq!(scale.ticks(5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);

    let nice = ContinuousScale::new((0.3, 9.6), (0.0, 100.0)).unwrap().nice(5);
    assert_eq!(nice.domain(), (0.0, 10.0));
}

#[test]
fn test_band_scale_without_padding() {
    let scale = BandScale::new(["A", "B", "C"], (0.0, 300.0), 0.0).unwrap();

    assert_eq!(scale.bandwidth(), 100.0);
    assert_eq!(scale.map("A"), Some(0.0));
    assert_eq!(scale.map("B"), Some(100.0));
    assert_eq!(scale.map("C"), Some(200.0));
    assert_eq!(scale.map("D"), None);
    assert_eq!(scale.center("B"), Some(150.0));
}

#[test]
fn test_band_scale_with_padding() {
    let scale = BandScale::new(["A", "B"], (0.0, 200.0), 0.2).unwrap();

    assert_eq!(scale.step(), 100.0);
    assert!((scale.bandwidth() - 80.0).abs() < 1e-9);
    assert!((scale.map("A").unwrap() - 10.0).abs() < 1e-9);
    assert!((scale.map("B").unwrap() - 110.0).abs() < 1e-9);
}

#[test]
fn test_band_scale_outer_padding_and_invert() {
    let scale = BandScale::new(["A", "B"], (0.0, 400.0), 0.0)
        .unwrap()
        .with_outer_padding(1.0);

    assert_eq!(scale.step(), 100.0);
    assert_eq!(scale.map("A"), Some(100.0));
    assert_eq!(scale.invert(50.0), None);
    assert_eq!(scale.invert(150.0), Some("A"));
    assert_eq!(scale.invert(250.0), Some("B"));
    assert_eq!(scale.invert(350.0), None);
}

#[test]
fn test_band_scale_rejects_duplicates_and_empty() {
    let dup = BandScale::new(["A", "B", "A"], (0.0, 300.0), 0.0).unwrap_err();
    assert!(matches!(dup, ChartError::Configuration(_)));

    let empty = BandScale::new(Vec::<String>::new(), (0.0, 300.0), 0.0).unwrap_err();
    assert!(matches!(empty, ChartError::DegenerateDomain(_)));
}

#[test]
fn test_chart_scale_dispatch() {
    let linear = ChartScale::new_linear((0.0, 1.0), (0.0, 10.0)).unwrap();
    assert!(linear.as_linear().is_some());
    assert!(linear.as_band().is_none());

    let band = ChartScale::new_band(["x"], (0.0, 10.0), 0.0).unwrap();
    assert_eq!(band.range(), (0.0, 10.0));
    assert_eq!(band.as_band().map(|b| b.len()), Some(1));
}

#[test]
fn test_extent_skips_non_finite() {
    assert_eq!(extent([3.0, f64::NAN, -1.0, 7.0]), Some((-1.0, 7.0)));
    assert_eq!(extent([f64::INFINITY]), None);
    assert_eq!(extent(Vec::<f64>::new()), None);
}

#[test]
fn test_format_number() {
    assert_eq!(format_number(1.0), "1");
    assert_eq!(format_number(2.5), "2.5");
    assert_eq!(format_number(1.23456), "1.235");
    assert_eq!(format_number(-0.0001), "0");
}
