use chart_engine::data_types::{Accessors, ChartConfig, ChartOptions, Key, Margins, Point, Rect, Shape};
use chart_engine::error::ChartError;
use chart_engine::events::{ChartEvent, EventRelay};
use chart_engine::plot_types::{BarPlot, PiePlot};
use chart_engine::rendering::render_svg;
use chart_engine::tooltip::TooltipOverlay;
use chart_engine::transition::{Easing, TransitionScheduler};
use chart_engine::visual::ElementState;
use chart_engine::Chart;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
struct Sale {
    name: String,
    amount: f64,
}

fn sale(name: &str, amount: f64) -> Sale {
    Sale {
        name: name.to_string(),
        amount,
    }
}

fn sales(rows: &[(&str, f64)]) -> Vec<Sale> {
    rows.iter().map(|(n, a)| sale(n, *a)).collect()
}

fn config() -> ChartConfig {
    ChartConfig {
        margins: Margins::uniform(0.0),
        band_padding: 0.0,
        transition_duration_ms: 1000.0,
        easing: Easing::Linear,
        ..ChartConfig::sized(300.0, 300.0)
    }
}

fn bar_accessors() -> Accessors<Sale> {
    Accessors::new()
        .x(|s: &Sale| s.name.clone())
        .y(|s: &Sale| s.amount)
        .key(|s: &Sale| s.name.clone())
}

fn bar_chart() -> Chart<Sale> {
    let mut chart = Chart::standalone(BarPlot::new(), ChartOptions::new(config(), bar_accessors()));
    chart.init_chart().unwrap();
    chart
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Runs every pending transition to its end.
fn settle(chart: &Chart<Sale>) {
    let scheduler = chart.scheduler();
    scheduler.advance(Duration::ZERO);
    for _ in 0..100 {
        if !scheduler.has_active() {
            break;
        }
        scheduler.advance(ms(100));
    }
}

fn rect_of(chart: &Chart<Sale>, key: &str) -> Rect {
    match chart.element(&Key::field(key)).map(|e| e.shape) {
        Some(Shape::Rect(r)) => r,
        other => panic!("no rect for {key}: {other:?}"),
    }
}

fn keys(chart: &Chart<Sale>) -> Vec<String> {
    chart.tree().keys().map(|k| k.to_string()).collect()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn test_render_requires_init() {
    let mut chart = Chart::standalone(BarPlot::new(), ChartOptions::new(config(), bar_accessors()));
    chart.set_graph_data(sales(&[("a", 1.0)]));

    assert!(matches!(chart.draw(), Err(ChartError::Configuration(_))));
    assert!(matches!(chart.transition(), Err(ChartError::Configuration(_))));
    assert!(chart.tree().is_empty());
}

#[test]
fn test_init_rejects_missing_canvas_and_accessors() {
    let mut no_canvas = Chart::standalone(
        BarPlot::new(),
        ChartOptions::new(ChartConfig::default(), bar_accessors()),
    );
    assert!(matches!(no_canvas.init_chart(), Err(ChartError::Configuration(_))));

    let mut no_y = Chart::standalone(
        BarPlot::new(),
        ChartOptions::new(config(), Accessors::new().x(|s: &Sale| s.name.clone())),
    );
    let err = no_y.init_chart().unwrap_err();
    assert!(err.to_string().contains("y"), "{err}");
    assert!(!no_y.is_initialized());
}

#[test]
fn test_draw_renders_final_pose() {
    let mut chart = bar_chart();
    chart.set_graph_data(sales(&[("a", 10.0), ("b", 20.0), ("c", 30.0)]));

    let report = chart.draw().unwrap();
    assert_eq!(report.entered.len(), 3);
    assert!(!chart.scheduler().has_active());

    let b = rect_of(&chart, "b");
    assert!(close(b.x, 100.0) && close(b.width, 100.0));
    assert!(close(b.y, 100.0) && close(b.height, 200.0));
    for element in chart.tree().iter() {
        assert_eq!(element.opacity, 1.0);
        assert_eq!(element.state, ElementState::Active);
    }
    assert!(chart.scales().x.is_some());
}

#[test]
fn test_transition_enters_from_baseline() {
    let mut chart = bar_chart();
    chart.set_graph_data(sales(&[("a", 10.0), ("b", 20.0), ("c", 30.0)]));
    chart.transition().unwrap();

    // entering bars start flat on the axis, invisible
    let a = rect_of(&chart, "a");
    assert!(close(a.y, 300.0) && close(a.height, 0.0));
    assert_eq!(chart.element(&Key::field("a")).unwrap().opacity, 0.0);

    chart.scheduler().advance(Duration::ZERO);
    chart.scheduler().advance(ms(500));
    let a = rect_of(&chart, "a");
    assert!(close(a.height, 50.0), "{a:?}");
    assert!(close(chart.element(&Key::field("a")).unwrap().opacity, 0.5));

    settle(&chart);
    let a = rect_of(&chart, "a");
    assert!(close(a.y, 200.0) && close(a.height, 100.0));
    let el = chart.element(&Key::field("a")).unwrap();
    assert_eq!(el.opacity, 1.0);
    assert_eq!(el.state, ElementState::Active);
}

#[test]
fn test_update_enters_updates_and_exits() {
    let mut chart = bar_chart();
    chart.set_graph_data(sales(&[("a", 10.0), ("b", 20.0), ("c", 30.0)]));
    chart.draw().unwrap();

    let report = chart.update(sales(&[("b", 30.0), ("c", 30.0), ("d", 15.0)])).unwrap();
    assert_eq!(report.entered, vec![Key::field("d")]);
    assert_eq!(report.exited, vec![Key::field("a")]);
    let updated: Vec<&Key> = report.updated.iter().map(|(k, _)| k).collect();
    assert_eq!(updated, vec![&Key::field("b"), &Key::field("c")]);
    assert!(!report.is_noop());

    // the exiting bar stays painted underneath the live ones
    assert_eq!(keys(&chart), vec!["a", "b", "c", "d"]);
    assert!(chart.element(&Key::field("a")).unwrap().is_exiting());
    assert_eq!(chart.tree().live().count(), 3);

    settle(&chart);
    assert_eq!(keys(&chart), vec!["b", "c", "d"]);
    let b = rect_of(&chart, "b");
    assert!(close(b.x, 0.0) && close(b.y, 0.0) && close(b.height, 300.0));
}

#[test]
fn test_entering_elements_paint_over_exiting_ones() {
    let mut chart = bar_chart();
    chart.update(sales(&[("a", 1.0), ("b", 2.0), ("c", 3.0)])).unwrap();
    settle(&chart);

    // x and y take the slots a and c leave behind
    chart.update(sales(&[("x", 4.0), ("b", 2.0), ("y", 5.0)])).unwrap();
    // tree order is paint order
    assert_eq!(keys(&chart), vec!["a", "c", "x", "b", "y"]);
    assert!(chart.element(&Key::field("c")).unwrap().is_exiting());

    settle(&chart);
    assert_eq!(keys(&chart), vec!["x", "b", "y"]);
}

#[test]
fn test_reconciling_same_data_is_a_noop() {
    let mut chart = bar_chart();
    let data = sales(&[("a", 1.0), ("b", 2.0)]);
    chart.update(data.clone()).unwrap();
    settle(&chart);

    let report = chart.update(data).unwrap();
    assert!(report.entered.is_empty() && report.exited.is_empty());
    assert!(report.updated.iter().all(|(_, delta)| *delta == 0.0));
    assert!(report.is_noop());
    assert!(!chart.scheduler().has_active());
}

#[test]
fn test_duplicate_key_keeps_previous_render() {
    // keyed by the first letter, so "x1" and "x2" collide
    let accessors = Accessors::new()
        .x(|s: &Sale| s.name.clone())
        .y(|s: &Sale| s.amount)
        .key(|s: &Sale| s.name[..1].to_string());
    let mut chart = Chart::standalone(BarPlot::new(), ChartOptions::new(config(), accessors));
    chart.init_chart().unwrap();
    chart.update(sales(&[("a", 1.0), ("b", 2.0)])).unwrap();
    settle(&chart);
    let before = rect_of(&chart, "a");

    let err = chart
        .update(sales(&[("x1", 1.0), ("y", 2.0), ("x2", 3.0)]))
        .unwrap_err();
    assert_eq!(
        err,
        ChartError::DuplicateKey {
            key: Key::field("x"),
            first: 0,
            second: 2,
        }
    );
    assert_eq!(keys(&chart), vec!["a", "b"]);
    assert_eq!(rect_of(&chart, "a"), before);
    assert!(!chart.scheduler().has_active());
}

#[test]
fn test_new_render_rebases_running_transitions() {
    let mut chart = bar_chart();
    chart.set_graph_data(sales(&[("a", 20.0), ("b", 10.0)]));
    chart.draw().unwrap();
    assert!(close(rect_of(&chart, "b").height, 150.0));

    chart.update(sales(&[("a", 20.0), ("b", 20.0)])).unwrap();
    chart.scheduler().advance(Duration::ZERO);
    chart.scheduler().advance(ms(500));
    let mid = rect_of(&chart, "b");
    assert!(close(mid.height, 225.0), "{mid:?}");

    chart.update(sales(&[("a", 20.0), ("b", 0.0)])).unwrap();
    chart.scheduler().advance(Duration::ZERO);
    let restart = rect_of(&chart, "b");
    assert!(close(restart.height, mid.height), "jumped from {mid:?} to {restart:?}");

    chart.scheduler().advance(ms(500));
    let halfway = rect_of(&chart, "b");
    assert!(close(halfway.height, 112.5), "{halfway:?}");

    settle(&chart);
    assert!(close(rect_of(&chart, "b").height, 0.0));
}

#[test]
fn test_exiting_key_that_returns_is_revived() {
    let mut chart = bar_chart();
    chart.set_graph_data(sales(&[("a", 10.0), ("b", 20.0)]));
    chart.draw().unwrap();

    chart.update(sales(&[("b", 20.0)])).unwrap();
    chart.scheduler().advance(Duration::ZERO);
    chart.scheduler().advance(ms(300));
    assert!(chart.element(&Key::field("a")).unwrap().is_exiting());

    let report = chart.update(sales(&[("a", 10.0), ("b", 20.0)])).unwrap();
    assert!(report.entered.is_empty());
    assert_eq!(report.updated.len(), 2);

    settle(&chart);
    let a = chart.element(&Key::field("a")).expect("revived element survives");
    assert_eq!(a.state, ElementState::Active);
    assert_eq!(a.opacity, 1.0);
    assert_eq!(keys(&chart), vec!["a", "b"]);
}

#[test]
fn test_empty_data_shows_placeholder() {
    let mut chart = bar_chart();
    chart.update(sales(&[("a", 1.0), ("b", 2.0)])).unwrap();
    settle(&chart);

    let report = chart.update(Vec::new()).unwrap();
    assert!(report.placeholder);
    assert_eq!(report.exited.len(), 2);
    let label = chart.placeholder().expect("placeholder label");
    assert_eq!(label.text, "No data");
    assert_eq!(label.position, Point::new(150.0, 150.0));
    assert!(chart.scales().x.is_none());

    settle(&chart);
    assert!(chart.tree().is_empty());

    let report = chart.update(sales(&[("c", 3.0)])).unwrap();
    assert!(!report.placeholder);
    assert!(chart.placeholder().is_none());
    assert_eq!(report.entered, vec![Key::field("c")]);
}

#[test]
fn test_static_draw_of_empty_data_clears_at_once() {
    let mut chart = bar_chart();
    chart.set_graph_data(sales(&[("a", 1.0)]));
    chart.draw().unwrap();

    chart.set_graph_data(Vec::new());
    let report = chart.draw().unwrap();
    assert!(report.placeholder);
    assert!(chart.tree().is_empty());
    let svg = render_svg(&chart.tree(), 300.0, 300.0, chart.placeholder(), &chart.config().theme);
    assert!(svg.contains(">No data</text>"));
}

#[test]
fn test_failing_accessor_skips_one_element() {
    let accessors = Accessors::new()
        .x(|s: &Sale| s.name.clone())
        .y(|s: &Sale| if s.name == "bad" { f64::NAN } else { s.amount })
        .key(|s: &Sale| s.name.clone());
    let mut chart = Chart::standalone(BarPlot::new(), ChartOptions::new(config(), accessors));
    chart.init_chart().unwrap();
    chart.set_graph_data(sales(&[("a", 1.0), ("bad", 2.0), ("c", 3.0)]));

    let report = chart.draw().unwrap();
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        report.warnings[0],
        ChartError::Accessor { role: "y", index: 1, .. }
    ));
    assert_eq!(keys(&chart), vec!["a", "c"]);
}

#[test]
fn test_zero_duration_snaps() {
    let mut cfg = config();
    cfg.transition_duration_ms = 0.0;
    let mut chart = Chart::standalone(BarPlot::new(), ChartOptions::new(cfg, bar_accessors()));
    chart.init_chart().unwrap();

    chart.update(sales(&[("a", 1.0), ("b", 2.0)])).unwrap();
    assert!(!chart.scheduler().has_active());
    assert_eq!(chart.element(&Key::field("a")).unwrap().opacity, 1.0);

    chart.update(sales(&[("b", 4.0)])).unwrap();
    assert_eq!(keys(&chart), vec!["b"]);
    assert!(close(rect_of(&chart, "b").height, 300.0));
}

#[test]
fn test_destroy_cancels_and_unsubscribes() {
    let scheduler = TransitionScheduler::new();
    let relay: EventRelay<ChartEvent> = EventRelay::new();
    let tooltip = TooltipOverlay::default();
    let mut chart = Chart::new(
        BarPlot::new(),
        ChartOptions::new(config(), bar_accessors()),
        scheduler.clone(),
        tooltip.clone(),
        relay.clone(),
    );
    chart.init_chart().unwrap();
    chart.subscribe("hover", |_| Ok(()));
    chart.subscribe("click", |_| Ok(()));

    chart.update(sales(&[("a", 1.0), ("b", 2.0)])).unwrap();
    scheduler.advance(Duration::ZERO);
    chart.pointer_over(&Key::field("a"), Point::new(10.0, 290.0)).unwrap();
    assert!(scheduler.has_active());
    assert!(tooltip.is_visible());

    chart.destroy();
    assert!(chart.is_destroyed());
    assert!(!scheduler.has_active());
    assert_eq!(relay.subscriber_count("hover"), 0);
    assert_eq!(relay.subscriber_count("click"), 0);
    assert!(!tooltip.is_visible());
    assert!(chart.tree().is_empty());

    // idempotent, and the chart stays unusable
    chart.destroy();
    assert!(matches!(chart.draw(), Err(ChartError::Configuration(_))));
    assert!(matches!(chart.init_chart(), Err(ChartError::Configuration(_))));
}

#[test]
fn test_dropping_a_chart_releases_shared_resources() {
    let scheduler = TransitionScheduler::new();
    let relay: EventRelay<ChartEvent> = EventRelay::new();
    {
        let mut chart = Chart::new(
            BarPlot::new(),
            ChartOptions::new(config(), bar_accessors()),
            scheduler.clone(),
            TooltipOverlay::default(),
            relay.clone(),
        );
        chart.init_chart().unwrap();
        chart.subscribe("hover", |_| Ok(()));
        chart.update(sales(&[("a", 1.0)])).unwrap();
        assert!(scheduler.has_active());
    }
    assert!(!scheduler.has_active());
    assert_eq!(relay.subscriber_count("hover"), 0);
}

#[test]
fn test_pointer_events_drive_tooltip_and_topics() {
    let mut chart = bar_chart();
    chart.set_graph_data(sales(&[("a", 10.0), ("b", 20.0), ("c", 30.0)]));
    chart.draw().unwrap();

    let events = Rc::new(RefCell::new(Vec::new()));
    for topic in ["hover", "leave", "click"] {
        let log = events.clone();
        chart.subscribe(topic, move |e: &ChartEvent| {
            log.borrow_mut().push((topic, e.key.to_string(), e.value));
            Ok(())
        });
    }

    // b occupies x 100..200, y 100..300
    let hit = chart.hover_at(Point::new(150.0, 250.0)).unwrap();
    assert_eq!(hit, Some(Key::field("b")));
    let state = chart.tooltip().state();
    assert!(state.visible);
    assert_eq!(state.content, "b: 20");
    assert_eq!(state.position, Point::new(162.0, 238.0));

    chart.pointer_move(Point::new(160.0, 260.0));
    assert_eq!(chart.tooltip().state().position, Point::new(172.0, 248.0));

    // staying on b does not republish
    chart.hover_at(Point::new(151.0, 250.0)).unwrap();
    assert_eq!(chart.hover_at(Point::new(150.0, 50.0)).unwrap(), None);
    assert!(!chart.tooltip().is_visible());

    chart.click(&Key::field("c"), Point::new(250.0, 10.0)).unwrap();

    assert_eq!(
        *events.borrow(),
        vec![
            ("hover", "b".to_string(), Some(20.0)),
            ("leave", "b".to_string(), Some(20.0)),
            ("click", "c".to_string(), Some(30.0)),
        ]
    );
}

#[test]
fn test_exiting_hovered_element_hides_tooltip() {
    let mut chart = bar_chart();
    chart.update(sales(&[("a", 10.0), ("b", 20.0)])).unwrap();
    settle(&chart);

    chart.pointer_over(&Key::field("b"), Point::new(150.0, 250.0)).unwrap();
    assert!(chart.tooltip().is_visible());

    // b survives this update
    chart.update(sales(&[("a", 10.0), ("b", 20.0), ("c", 5.0)])).unwrap();
    assert_eq!(chart.hovered(), Some(&Key::field("b")));
    assert!(chart.tooltip().is_visible());

    chart.update(sales(&[("a", 10.0), ("c", 5.0)])).unwrap();
    assert_eq!(chart.hovered(), None);
    assert!(!chart.tooltip().is_visible());
}

#[test]
fn test_placeholder_hides_tooltip() {
    let mut chart = bar_chart();
    chart.update(sales(&[("a", 10.0)])).unwrap();
    settle(&chart);
    chart.pointer_over(&Key::field("a"), Point::new(10.0, 290.0)).unwrap();
    assert!(chart.tooltip().is_visible());

    let report = chart.update(Vec::new()).unwrap();
    assert!(report.placeholder);
    assert_eq!(chart.hovered(), None);
    assert!(!chart.tooltip().is_visible());
}

#[test]
fn test_topic_prefix_and_tooltip_accessor() {
    let mut cfg = config();
    cfg.topic_prefix = Some("sales".to_string());
    let accessors = bar_accessors().tooltip(|s: &Sale| format!("{} sold {}", s.name, s.amount));
    let mut chart = Chart::standalone(BarPlot::new(), ChartOptions::new(cfg, accessors));
    chart.init_chart().unwrap();
    chart.set_graph_data(sales(&[("a", 4.0)]));
    chart.draw().unwrap();

    let seen = Rc::new(RefCell::new(0));
    let s = seen.clone();
    chart.subscribe("hover", move |_| {
        *s.borrow_mut() += 1;
        Ok(())
    });
    assert_eq!(chart.relay().subscriber_count("sales:hover"), 1);

    chart.pointer_over(&Key::field("a"), Point::new(1.0, 1.0)).unwrap();
    assert_eq!(chart.tooltip().state().content, "a sold 4");
    assert_eq!(*seen.borrow(), 1);
}

#[test]
fn test_handler_failure_does_not_abort_render() {
    let mut chart = bar_chart();
    chart.set_graph_data(sales(&[("a", 4.0)]));
    chart.draw().unwrap();
    chart.subscribe("hover", |_| eyre::bail!("grid is gone"));

    let err = chart.pointer_over(&Key::field("a"), Point::new(1.0, 299.0)).unwrap_err();
    assert!(matches!(err, ChartError::Relay { .. }));
    // the tooltip was still shown
    assert!(chart.tooltip().is_visible());
    assert!(chart.transition().is_ok());
}

#[test]
fn test_charts_share_one_tooltip() {
    let tooltip = TooltipOverlay::default();
    let scheduler = TransitionScheduler::new();
    let relay: EventRelay<ChartEvent> = EventRelay::new();
    let make = || {
        let mut chart = Chart::new(
            BarPlot::new(),
            ChartOptions::new(config(), bar_accessors()),
            scheduler.clone(),
            tooltip.clone(),
            relay.clone(),
        );
        chart.init_chart().unwrap();
        chart.set_graph_data(sales(&[("a", 1.0)]));
        chart.draw().unwrap();
        chart
    };
    let mut x = make();
    let mut y = make();

    x.pointer_over(&Key::field("a"), Point::new(5.0, 295.0)).unwrap();
    y.pointer_over(&Key::field("a"), Point::new(50.0, 295.0)).unwrap();

    let state = tooltip.state();
    assert!(state.visible);
    assert_eq!(state.owner, Some(y.id()));

    // x leaving late leaves y's tooltip alone
    x.pointer_out().unwrap();
    assert!(tooltip.is_visible());
    y.pointer_out().unwrap();
    assert!(!tooltip.is_visible());
}

#[test]
fn test_set_size_rebuilds_scales_on_next_render() {
    let mut chart = bar_chart();
    chart.set_graph_data(sales(&[("a", 1.0), ("b", 1.0)]));
    chart.draw().unwrap();
    assert!(close(rect_of(&chart, "b").x, 150.0));

    assert!(chart.set_size(-1.0, 10.0).is_err());
    assert_eq!(chart.config().canvas_width, 300.0);

    chart.set_size(600.0, 300.0).unwrap();
    chart.draw().unwrap();
    assert!(close(rect_of(&chart, "b").x, 300.0));
    assert!(chart.previous_scales().x.is_some());
}

#[test]
fn test_pie_chart_angles() {
    let accessors = Accessors::new()
        .value(|s: &Sale| s.amount)
        .key(|s: &Sale| s.name.clone());
    let mut chart = Chart::standalone(PiePlot::new(), ChartOptions::new(config(), accessors));
    chart.init_chart().unwrap();
    chart.set_graph_data(sales(&[("x", 1.0), ("y", 3.0)]));
    chart.draw().unwrap();

    let arc = |k: &str| match chart.element(&Key::field(k)).map(|e| e.shape) {
        Some(Shape::Arc(a)) => a,
        other => panic!("{other:?}"),
    };
    let (x, y) = (arc("x"), arc("y"));
    assert_eq!(x.start_angle, 0.0);
    assert!(close(x.end_angle, std::f64::consts::FRAC_PI_2));
    assert!(close(y.start_angle, std::f64::consts::FRAC_PI_2));
    assert!(close(y.end_angle, std::f64::consts::TAU));
    assert_eq!(x.center, Point::new(150.0, 150.0));
    assert_eq!(x.outer_radius, 150.0);
}

#[test]
fn test_pie_with_no_positive_values_is_placeholder() {
    let accessors = Accessors::new().value(|s: &Sale| s.amount);
    let mut chart = Chart::standalone(PiePlot::new(), ChartOptions::new(config(), accessors));
    chart.init_chart().unwrap();
    chart.set_graph_data(sales(&[("x", 0.0), ("y", -1.0)]));
    assert!(chart.draw().unwrap().placeholder);
}

#[test]
fn test_svg_of_a_drawn_chart() {
    let mut chart = bar_chart();
    chart.set_graph_data(sales(&[("a", 1.0), ("b", 2.0)]));
    chart.draw().unwrap();

    let svg = render_svg(&chart.tree(), 300.0, 300.0, chart.placeholder(), &chart.config().theme);
    assert_eq!(svg.matches("<rect").count(), 2);
    assert!(svg.contains(r##"fill="#1f77b4""##));
}
