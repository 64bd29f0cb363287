use chart_gallery::charts::{
    BarChartConfig, BarDatum, DEFAULT_MOUNT_DELAY_MS, DefaultTranslator, RenderContext,
    mount_deferred, render_bar_chart,
};
use chart_gallery::core::Viewport;
use chart_gallery::interaction::{Scheduler, Tooltip};
use chart_gallery::render::Container;

fn deferred_bar(
    scheduler: &Scheduler,
    container: &Container,
    tooltip: &Tooltip,
) -> chart_gallery::charts::DeferredMount {
    let container = container.clone();
    let tooltip = tooltip.clone();
    mount_deferred(scheduler, DEFAULT_MOUNT_DELAY_MS, move || {
        let ctx = RenderContext::new(&container, &tooltip, &DefaultTranslator);
        let data = vec![BarDatum::new("Berlin", 42.0), BarDatum::new("Köln", 58.0)];
        render_bar_chart(&ctx, &data, &BarChartConfig::default())
    })
}

#[test]
fn render_runs_after_the_mount_delay() {
    let scheduler = Scheduler::new();
    let container = Container::new(Viewport::new(720, 420));
    let tooltip = Tooltip::new();
    let mount = deferred_bar(&scheduler, &container, &tooltip);

    assert!(mount.is_pending());
    assert!(!mount.is_mounted());
    scheduler.advance_by(DEFAULT_MOUNT_DELAY_MS - 1);
    assert!(container.is_empty());

    scheduler.advance_by(1);
    assert!(mount.is_mounted());
    assert!(!mount.is_pending());
    assert_eq!(container.mark_count(), 2);
    assert!(mount.handle().is_some());
}

#[test]
fn cancel_before_firing_drops_the_render() {
    let scheduler = Scheduler::new();
    let container = Container::new(Viewport::new(720, 420));
    let tooltip = Tooltip::new();
    let mount = deferred_bar(&scheduler, &container, &tooltip);

    assert!(mount.cancel());
    assert!(!mount.cancel());
    assert_eq!(scheduler.pending_count(), 0);
    scheduler.advance_by(1_000);
    assert!(container.is_empty());
    assert!(!mount.is_mounted());
}

#[test]
fn cancel_after_mount_cleans_up_the_chart() {
    let scheduler = Scheduler::new();
    let container = Container::new(Viewport::new(720, 420));
    let tooltip = Tooltip::new();
    let mount = deferred_bar(&scheduler, &container, &tooltip);

    scheduler.advance_by(DEFAULT_MOUNT_DELAY_MS);
    let handle = mount.handle().expect("mounted chart");
    assert!(mount.cancel());
    assert!(!handle.is_active());
    assert!(container.is_empty());
    assert!(!mount.cancel());
}

#[test]
fn render_returning_nothing_leaves_mount_empty() {
    let scheduler = Scheduler::new();
    let container = Container::new(Viewport::new(720, 420));
    let tooltip = Tooltip::new();
    let target = container.clone();
    let overlay = tooltip.clone();
    let mount = mount_deferred(&scheduler, DEFAULT_MOUNT_DELAY_MS, move || {
        let ctx = RenderContext::new(&target, &overlay, &DefaultTranslator);
        render_bar_chart(&ctx, &[], &BarChartConfig::default())
    });

    scheduler.advance_by(DEFAULT_MOUNT_DELAY_MS);
    assert!(!mount.is_mounted());
    assert!(mount.handle().is_none());
    assert!(!mount.cancel());
}
