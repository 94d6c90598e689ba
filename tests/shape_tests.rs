use chart_engine::data_types::{Accessor, ArcSlice, KeyFn, PathSegment, Point, Rect};
use chart_engine::shapes::treemap::treemap;
use chart_engine::shapes::{
    arc_path, centroid, partition, path_for, polar, stack, Curve, Hierarchy, LineGenerator,
    Metric, PieLayout, StackSeries, StackValue, StepMode, Tiling,
};
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::rc::Rc;

const EPS: f64 = 1e-9;

#[derive(Clone, Debug)]
struct Node {
    name: &'static str,
    size: f64,
    children: Vec<Node>,
}

fn leaf(name: &'static str, size: f64) -> Node {
    Node {
        name,
        size,
        children: vec![],
    }
}

fn branch(name: &'static str, children: Vec<Node>) -> Node {
    Node {
        name,
        size: 0.0,
        children,
    }
}

fn build(records: &[Node], metric: Metric) -> Hierarchy<Node> {
    let key = KeyFn::field(|n: &Node| n.name.to_string());
    let value = Accessor::new(|n: &Node| n.size);
    let children: Rc<dyn Fn(&Node) -> Vec<Node>> = Rc::new(|n: &Node| n.children.clone());
    let (tree, warnings) = Hierarchy::build(records, Some(&children), &key, Some(&value), metric).unwrap();
    assert!(warnings.is_empty());
    tree
}

// ---- pie ----

#[test]
fn test_pie_spans_sum_to_full_turn() {
    let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
    let slices = PieLayout::default().layout(&values);

    let total: f64 = slices.iter().map(|s| s.span()).sum();
    assert!((total - TAU).abs() < EPS);
    assert_eq!(slices.last().unwrap().end_angle, TAU);
    // contiguous in input order
    for pair in slices.windows(2) {
        assert_eq!(pair[0].end_angle, pair[1].start_angle);
    }
}

#[test]
fn test_pie_spans_sum_to_configured_span() {
    let layout = PieLayout {
        start_angle: -FRAC_PI_2,
        span: PI,
        sort: false,
    };
    let slices = layout.layout(&[1.0, 2.0, 3.0]);
    let total: f64 = slices.iter().map(|s| s.span()).sum();
    assert!((total - PI).abs() < EPS);
    assert_eq!(slices[0].start_angle, -FRAC_PI_2);
    assert!((slices[2].end_angle - FRAC_PI_2).abs() < EPS);
}

#[test]
fn test_pie_two_records_quarter_and_rest() {
    // x = 1, y = 3
    let slices = PieLayout::default().layout(&[1.0, 3.0]);

    assert_eq!(slices[0].start_angle, 0.0);
    assert!((slices[0].end_angle - FRAC_PI_2).abs() < EPS);
    assert!((slices[1].start_angle - FRAC_PI_2).abs() < EPS);
    assert_eq!(slices[1].end_angle, TAU);
}

#[test]
fn test_pie_non_positive_values_get_zero_span() {
    let slices = PieLayout::default().layout(&[2.0, 0.0, -5.0, f64::NAN, 2.0]);

    assert!((slices[0].span() - PI).abs() < EPS);
    assert_eq!(slices[1].span(), 0.0);
    assert_eq!(slices[2].span(), 0.0);
    assert_eq!(slices[3].span(), 0.0);
    assert!((slices[4].span() - PI).abs() < EPS);
    assert_eq!(slices[1].start_angle, slices[0].end_angle);
}

#[test]
fn test_pie_sort_is_opt_in_and_stable() {
    let values = [1.0, 5.0, 3.0, 5.0];
    let unsorted = PieLayout::default().layout(&values);
    assert_eq!(unsorted[0].start_angle, 0.0);

    let sorted = PieLayout {
        sort: true,
        ..PieLayout::default()
    }
    .layout(&values);
    // slices stay indexed by input position
    assert_eq!(sorted[1].start_angle, 0.0);
    assert_eq!(sorted[3].start_angle, sorted[1].end_angle);
    assert_eq!(sorted[0].end_angle, TAU);
    assert!(sorted.iter().enumerate().all(|(i, s)| s.index == i));
}

#[test]
fn test_pie_all_zero_has_no_spans() {
    let slices = PieLayout::default().layout(&[0.0, 0.0]);
    assert!(slices.iter().all(|s| s.span() == 0.0));
}

// ---- arcs ----

#[test]
fn test_polar_starts_at_twelve_oclock_clockwise() {
    let c = Point::new(100.0, 100.0);
    let top = polar(c, 10.0, 0.0);
    assert!((top.x - 100.0).abs() < EPS && (top.y - 90.0).abs() < EPS);

    let right = polar(c, 10.0, FRAC_PI_2);
    assert!((right.x - 110.0).abs() < EPS && (right.y - 100.0).abs() < EPS);
}

#[test]
fn test_arc_path_and_centroid() {
    let arc = ArcSlice {
        center: Point::new(0.0, 0.0),
        inner_radius: 0.0,
        outer_radius: 10.0,
        start_angle: 0.0,
        end_angle: FRAC_PI_2,
        pad_angle: 0.0,
    };
    let path = arc_path(&arc).to_string();
    // wedge: centre, out to 12 o'clock, clockwise to 3 o'clock, back
    assert_eq!(path, "M0,0L0,-10A10,10,0,0,1,10,0Z");

    let c = centroid(&arc);
    assert!(c.x > 0.0 && c.y < 0.0);

    let empty = ArcSlice {
        end_angle: 0.0,
        ..arc
    };
    assert!(arc_path(&empty).is_empty());
}

// ---- stack ----

#[test]
fn test_stack_second_series_sits_on_first() {
    let series = vec![
        StackSeries::new("s1", vec![StackValue::new("a", 3.0)]),
        StackSeries::new("s2", vec![StackValue::new("a", 5.0)]),
    ];
    let stacked = stack(&series);

    assert_eq!(stacked.bands[0][0].y0, 0.0);
    assert_eq!(stacked.bands[0][0].y1, 3.0);
    assert_eq!(stacked.bands[1][0].y0, 3.0);
    assert_eq!(stacked.bands[1][0].y1, 8.0);
    assert_eq!(stacked.extent(), (0.0, 8.0));
}

#[test]
fn test_stack_aligns_by_id_not_position() {
    let series = vec![
        StackSeries::new("s1", vec![StackValue::new("a", 1.0), StackValue::new("b", 2.0)]),
        StackSeries::new("s2", vec![StackValue::new("b", 10.0), StackValue::new("c", 4.0)]),
    ];
    let stacked = stack(&series);

    assert_eq!(stacked.ids, vec!["a", "b", "c"]);
    let b = &stacked.bands[1][0];
    assert_eq!((b.id.as_str(), b.y0, b.y1), ("b", 2.0, 12.0));
    let c = &stacked.bands[1][1];
    assert_eq!((c.y0, c.y1), (0.0, 4.0));
}

#[test]
fn test_stack_negative_values_stack_below_zero() {
    let series = vec![
        StackSeries::new("s1", vec![StackValue::new("a", 2.0)]),
        StackSeries::new("s2", vec![StackValue::new("a", -3.0)]),
        StackSeries::new("s3", vec![StackValue::new("a", 4.0)]),
        StackSeries::new("s4", vec![StackValue::new("a", -1.0)]),
    ];
    let stacked = stack(&series);

    let bands: Vec<(f64, f64)> = stacked.bands.iter().map(|r| (r[0].y0, r[0].y1)).collect();
    assert_eq!(bands, vec![(0.0, 2.0), (0.0, -3.0), (2.0, 6.0), (-3.0, -4.0)]);
    assert_eq!(stacked.extent(), (-4.0, 6.0));
    assert_eq!(stacked.bands[1][0].low(), -3.0);
    assert_eq!(stacked.bands[1][0].high(), 0.0);
}

#[test]
fn test_stack_non_finite_counts_as_zero() {
    let series = vec![
        StackSeries::new("s1", vec![StackValue::new("a", f64::NAN)]),
        StackSeries::new("s2", vec![StackValue::new("a", 2.0)]),
    ];
    let stacked = stack(&series);
    assert_eq!(stacked.bands[0][0].value, 0.0);
    assert_eq!(stacked.bands[1][0].y0, 0.0);
}

// ---- hierarchy, treemap and partition ----

#[test]
fn test_hierarchy_sums_and_child_keys() {
    let data = vec![
        branch("fruit", vec![leaf("apple", 3.0), leaf("pear", 1.0)]),
        leaf("bread", 4.0),
    ];
    let tree = build(&data, Metric::Sum);

    assert_eq!(tree.root().value, 8.0);
    assert_eq!(tree.max_depth(), 2);
    let keys: Vec<String> = tree.leaves().map(|(_, n)| n.key.to_string()).collect();
    assert_eq!(keys, vec!["fruit/apple", "fruit/pear", "bread"]);

    let count = build(&data, Metric::Count);
    assert_eq!(count.root().value, 3.0);
}

#[test]
fn test_treemap_areas_are_proportional() {
    let data = vec![leaf("a", 6.0), leaf("b", 3.0), leaf("c", 1.0)];
    let tree = build(&data, Metric::Sum);
    let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);

    for tiling in [Tiling::Squarify, Tiling::SliceDice] {
        let rects = treemap(&tree, bounds, tiling, 0.0);
        let areas: Vec<f64> = tree.leaves().map(|(i, _)| rects[i].area()).collect();
        assert!((areas[0] - 6000.0).abs() < 1e-6, "{tiling:?}: {areas:?}");
        assert!((areas[1] - 3000.0).abs() < 1e-6);
        assert!((areas[2] - 1000.0).abs() < 1e-6);
        for (i, _) in tree.leaves() {
            let r = rects[i];
            assert!(r.x >= -EPS && r.y >= -EPS);
            assert!(r.x1() <= 100.0 + 1e-6 && r.y1() <= 100.0 + 1e-6);
        }
    }
}

#[test]
fn test_treemap_children_stay_inside_parent() {
    let data = vec![
        branch("g", vec![leaf("x", 2.0), leaf("y", 2.0)]),
        leaf("z", 4.0),
    ];
    let tree = build(&data, Metric::Sum);
    let rects = treemap(&tree, Rect::new(0.0, 0.0, 200.0, 100.0), Tiling::Squarify, 0.0);

    let (g, _) = tree.descendants().find(|(_, n)| n.key.to_string() == "g").unwrap();
    let parent = rects[g];
    for &child in &tree.nodes[g].children {
        let r = rects[child];
        assert!(r.x >= parent.x - EPS && r.x1() <= parent.x1() + EPS);
        assert!(r.y >= parent.y - EPS && r.y1() <= parent.y1() + EPS);
    }
}

#[test]
fn test_treemap_zero_and_negative_values_collapse() {
    let data = vec![leaf("a", 5.0), leaf("zero", 0.0), leaf("neg", -2.0)];
    let tree = build(&data, Metric::Sum);
    let rects = treemap(&tree, Rect::new(0.0, 0.0, 50.0, 50.0), Tiling::Squarify, 0.0);

    let areas: Vec<f64> = tree.leaves().map(|(i, _)| rects[i].area()).collect();
    assert!((areas[0] - 2500.0).abs() < 1e-6);
    assert_eq!(areas[1], 0.0);
    assert_eq!(areas[2], 0.0);
}

#[test]
fn test_partition_root_hidden_and_spans_proportional() {
    let data = vec![
        branch("fruit", vec![leaf("apple", 3.0), leaf("pear", 1.0)]),
        leaf("bread", 4.0),
    ];
    let tree = build(&data, Metric::Sum);
    let arcs = partition(&tree, Point::new(0.0, 0.0), 90.0);

    // three rings of 30px; the root keeps the centre
    let fruit = tree.nodes[0].children[0];
    let bread = tree.nodes[0].children[1];
    assert!((arcs[fruit].span() - PI).abs() < EPS);
    assert!((arcs[bread].span() - PI).abs() < EPS);
    assert_eq!(arcs[fruit].inner_radius, 30.0);
    assert_eq!(arcs[fruit].outer_radius, 60.0);

    let apple = tree.nodes[fruit].children[0];
    assert!((arcs[apple].span() - 3.0 * PI / 4.0).abs() < EPS);
    assert_eq!(arcs[apple].inner_radius, 60.0);
    assert_eq!(arcs[apple].start_angle, arcs[fruit].start_angle);
}

#[test]
fn test_partition_count_metric_ignores_values() {
    let data = vec![leaf("a", 100.0), leaf("b", 1.0), leaf("c", 1.0), leaf("d", 1.0)];
    let tree = build(&data, Metric::Count);
    let arcs = partition(&tree, Point::new(0.0, 0.0), 10.0);
    for (i, _) in tree.descendants() {
        assert!((arcs[i].span() - FRAC_PI_2).abs() < EPS);
    }
}

// ---- lines ----

fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
    coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

#[test]
fn test_line_generators() {
    let points = pts(&[(0.0, 10.0), (10.0, 0.0), (20.0, 5.0)]);
    assert_eq!(
        LineGenerator::new(Curve::Linear).line(&points).to_string(),
        "M0,10L10,0L20,5"
    );

    let two = pts(&[(0.0, 10.0), (10.0, 0.0)]);
    assert_eq!(
        LineGenerator::new(Curve::Step(StepMode::After)).line(&two).to_string(),
        "M0,10L10,10L10,0"
    );
    assert_eq!(
        LineGenerator::new(Curve::Step(StepMode::Before)).line(&two).to_string(),
        "M0,10L0,0L10,0"
    );
}

#[test]
fn test_area_closes_to_baseline() {
    let points = pts(&[(0.0, 10.0), (10.0, 0.0)]);
    let area = LineGenerator::new(Curve::Linear).area(&points, 20.0);
    assert_eq!(area.to_string(), "M0,20L0,10L10,0L10,20Z");
}

#[test]
fn test_cardinal_passes_through_points() {
    let points = pts(&[(0.0, 0.0), (10.0, 10.0), (20.0, 0.0)]);
    let path = LineGenerator::new(Curve::Cardinal(0.0)).line(&points).to_string();
    assert!(path.starts_with("M0,0L"));
    assert!(path.contains("L10,10L"));
    assert!(path.ends_with("L20,0"));
    assert!(!path.contains('C'));
}

#[test]
fn test_path_segment_uses_its_baseline() {
    let segment = PathSegment {
        points: pts(&[(0.0, 10.0), (10.0, 0.0)]),
        baseline: Some(20.0),
        curve: Curve::Linear,
    };
    assert_eq!(path_for(&segment).to_string(), "M0,20L0,10L10,0L10,20Z");

    let open = PathSegment {
        baseline: None,
        ..segment
    };
    assert_eq!(path_for(&open).to_string(), "M0,10L10,0");
}
