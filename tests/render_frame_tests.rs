use approx::assert_relative_eq;
use chart_gallery::charts::{
    BarChartConfig, BarDatum, DefaultTranslator, RenderContext, render_bar_chart,
};
use chart_gallery::core::Viewport;
use chart_gallery::interaction::Tooltip;
use chart_gallery::render::{
    CirclePrimitive, Color, Container, NullRenderer, Paint, RectPrimitive, RenderFrame, Renderer,
    SceneLayer, Shape, SvgRenderer, Transition, TransitionKind,
};

fn rendered_bar_container() -> Container {
    let container = Container::new(Viewport::new(720, 420));
    let tooltip = Tooltip::new();
    let ctx = RenderContext::new(&container, &tooltip, &DefaultTranslator);
    let data = vec![
        BarDatum::new("Berlin", 42.0),
        BarDatum::new("Köln", 58.0),
        BarDatum::new("Hamburg", 17.5),
    ];
    render_bar_chart(&ctx, &data, &BarChartConfig::default()).expect("chart rendered");
    container
}

#[test]
fn null_renderer_counts_frame_content() {
    let container = rendered_bar_container();
    let frame = container.frame();
    let mut renderer = NullRenderer::default();
    renderer.render(&frame).expect("valid frame");

    assert_eq!(renderer.last_node_count, frame.nodes.len());
    assert_eq!(renderer.last_mark_count, 3);
    assert_eq!(renderer.last_text_count, frame.texts().count());
    assert!(frame.texts().any(|text| text == "17.5"));
}

#[test]
fn frame_nodes_follow_layer_paint_order() {
    let frame = rendered_bar_container().frame();
    let layers: Vec<SceneLayer> = frame.nodes.iter().map(|node| node.layer).collect();
    let mut sorted = layers.clone();
    sorted.sort();
    assert_eq!(layers, sorted);
    assert!(frame.layer_count(SceneLayer::Axis) > 0);
    assert_eq!(frame.layer_count(SceneLayer::Marks), 3);
}

#[test]
fn invalid_frames_are_rejected() {
    let mut renderer = NullRenderer::default();
    assert!(renderer.render(&RenderFrame::new(Viewport::new(0, 100))).is_err());

    let container = Container::new(Viewport::new(100, 100));
    container.append_external(
        SceneLayer::Marks,
        Shape::Circle(CirclePrimitive::new(
            f64::NAN,
            10.0,
            4.0,
            Paint::Solid(Color::rgb(0.0, 0.0, 0.0)),
        )),
    );
    assert!(renderer.render(&container.frame()).is_err());
    assert!(SvgRenderer::default().render(&container.frame()).is_err());
}

#[test]
fn svg_renderer_writes_one_element_per_node() {
    let frame = rendered_bar_container().frame();
    let mut renderer = SvgRenderer::new(Some(Color::rgb(1.0, 1.0, 1.0)));
    renderer.render(&frame).expect("svg render");
    let svg = renderer.last_output();

    assert!(svg.contains("viewBox=\"0 0 720 420\""));
    assert_eq!(svg.matches("<text").count(), frame.texts().count());
    assert_eq!(svg.matches("<linearGradient").count(), 3);
    assert!(svg.trim_end().ends_with("</svg>"));
}

#[test]
fn grow_transition_starts_on_the_baseline() {
    let paint = Paint::Solid(Color::rgb(0.2, 0.4, 0.6));
    let target = Shape::Rect(RectPrimitive::new(10.0, 100.0, 20.0, 200.0, paint));
    let grow = TransitionKind::GrowFromBaseline { baseline_y: 300.0 };
    let transition = Transition::new(grow, 800).with_delay(100);

    let start = transition.frame(&target, 1.0, 0);
    match start.shape {
        Shape::Rect(rect) => {
            assert_relative_eq!(rect.y, 300.0);
            assert_relative_eq!(rect.height, 0.0);
        }
        other => panic!("expected a rect, got {other:?}"),
    }
    let end = transition.frame(&target, 1.0, transition.total_ms());
    assert_eq!(end.shape, target);
}

#[test]
fn stroke_reveal_and_fade_reach_their_targets() {
    let black = Paint::Solid(Color::rgb(0.0, 0.0, 0.0));
    let target = Shape::Circle(CirclePrimitive::new(5.0, 5.0, 3.0, black.clone()));

    let reveal = Transition::new(TransitionKind::StrokeReveal { length: 120.0 }, 1_000);
    assert_eq!(reveal.frame(&target, 1.0, 0).dash_offset, Some(120.0));
    assert_eq!(reveal.frame(&target, 1.0, 1_000).dash_offset, Some(0.0));

    let fade = Transition::new(TransitionKind::FadeIn, 400);
    assert_relative_eq!(fade.frame(&target, 0.7, 0).opacity, 0.0);
    assert_relative_eq!(fade.frame(&target, 0.7, 400).opacity, 0.7);

    let tween = Transition::new(
        TransitionKind::Tween {
            from: Box::new(Shape::Circle(CirclePrimitive::new(0.0, 0.0, 1.0, black))),
        },
        200,
    );
    assert_eq!(tween.frame(&target, 1.0, 200).shape, target);
}
