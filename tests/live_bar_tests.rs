use std::rc::Rc;

use chart_gallery::charts::{
    BarDatum, DefaultTranslator, LiveBarChart, LiveBarConfig, LivePhase, MagnitudeControl,
    SharedContext, render_live_bar_chart,
};
use chart_gallery::core::Viewport;
use chart_gallery::interaction::{RandomSource, Scheduler, SeededRandom, Tooltip};
use chart_gallery::render::Container;
use proptest::prelude::*;

/// Always picks the same bar and direction.
struct Fixed {
    index: usize,
    upward: bool,
}

impl RandomSource for Fixed {
    fn pick_index(&mut self, _len: usize) -> usize {
        self.index
    }

    fn pick_direction(&mut self) -> bool {
        self.upward
    }
}

fn cities() -> Vec<BarDatum> {
    vec![
        BarDatum::new("Berlin", 42.0),
        BarDatum::new("Hamburg", 3.0),
        BarDatum::new("Köln", 0.0),
    ]
}

fn mount(
    container: &Container,
    scheduler: &Scheduler,
    data: Vec<BarDatum>,
    magnitude: f64,
    random: Box<dyn RandomSource>,
) -> LiveBarChart {
    let tooltip = Tooltip::new();
    let ctx = SharedContext::new(container, &tooltip, Rc::new(DefaultTranslator));
    render_live_bar_chart(
        ctx,
        scheduler,
        data,
        &LiveBarConfig::default(),
        MagnitudeControl::new(magnitude),
        random,
    )
    .expect("live chart mounted")
}

fn check_tick(before: &[BarDatum], after: &[BarDatum], highlighted: &str, magnitude: f64) {
    assert_eq!(before.len(), after.len());
    let mut changed = Vec::new();
    for (old, new) in before.iter().zip(after) {
        assert_eq!(old.key, new.key);
        assert!(new.value >= 0.0, "{} went negative", new.key);
        if old.value != new.value {
            assert!((new.value - old.value).abs() <= magnitude + 1e-9);
            changed.push(new.key.clone());
        }
    }
    match changed.as_slice() {
        [] => {
            let entry = after
                .iter()
                .find(|datum| datum.key == highlighted)
                .expect("highlighted key exists");
            assert_eq!(entry.value, 0.0);
        }
        [only] => assert_eq!(only, highlighted),
        more => panic!("one tick changed several bars: {more:?}"),
    }
}

#[test]
fn thousand_ticks_stay_non_negative_and_highlight_the_mutated_bar() {
    let container = Container::new(Viewport::new(720, 420));
    let scheduler = Scheduler::new();
    let chart = mount(&container, &scheduler, cities(), 5.0, Box::new(SeededRandom::new(7)));
    assert!(chart.is_running());

    for _ in 0..1_000 {
        let before = chart.data();
        scheduler.advance_by(2_000);
        let after = chart.data();
        let highlighted = chart.highlighted_key().expect("tick highlights a bar");
        check_tick(&before, &after, &highlighted, 5.0);
    }
    assert_eq!(chart.tick_count(), 1_000);
    assert_eq!(container.mark_count(), 3);
}

#[test]
fn clamped_tick_still_highlights_the_picked_bar() {
    let container = Container::new(Viewport::new(720, 420));
    let scheduler = Scheduler::new();
    let chart = mount(
        &container,
        &scheduler,
        cities(),
        5.0,
        Box::new(Fixed {
            index: 2,
            upward: false,
        }),
    );

    scheduler.advance_by(2_000);
    assert_eq!(chart.highlighted_key().as_deref(), Some("Köln"));
    assert_eq!(chart.data()[2].value, 0.0);
}

#[test]
fn highlight_pulse_ends_after_its_duration() {
    let container = Container::new(Viewport::new(720, 420));
    let scheduler = Scheduler::new();
    let chart = mount(
        &container,
        &scheduler,
        cities(),
        5.0,
        Box::new(Fixed {
            index: 0,
            upward: true,
        }),
    );
    assert_eq!(chart.phase(), LivePhase::Scheduled);

    scheduler.advance_by(2_000);
    assert_eq!(
        chart.phase(),
        LivePhase::Highlighted {
            key: "Berlin".to_owned()
        }
    );
    let bar = chart.handle().mark_id("Berlin").expect("Berlin bar");
    assert!(container.node(bar).expect("node").style.glow);

    scheduler.advance_by(599);
    assert!(chart.highlighted_key().is_some());
    scheduler.advance_by(1);
    assert_eq!(chart.phase(), LivePhase::Scheduled);
    assert!(!container.node(bar).expect("node").style.glow);
    assert_eq!(chart.data()[0].value, 47.0);
}

#[test]
fn magnitude_change_applies_on_next_tick() {
    let container = Container::new(Viewport::new(720, 420));
    let scheduler = Scheduler::new();
    let chart = mount(
        &container,
        &scheduler,
        cities(),
        5.0,
        Box::new(Fixed {
            index: 1,
            upward: true,
        }),
    );

    chart.magnitude().set(20.0);
    scheduler.advance_by(2_000);
    assert_eq!(chart.data()[1].value, 23.0);

    chart.magnitude().set(f64::NAN);
    scheduler.advance_by(2_000);
    assert_eq!(chart.data()[1].value, 23.0);
    assert_eq!(chart.tick_count(), 2);
}

#[test]
fn start_is_idempotent_and_cleanup_cancels_timers() {
    let container = Container::new(Viewport::new(720, 420));
    let scheduler = Scheduler::new();
    let chart = mount(&container, &scheduler, cities(), 5.0, Box::new(SeededRandom::new(1)));

    assert!(!chart.start());
    assert_eq!(scheduler.pending_count(), 1);

    scheduler.advance_by(2_000);
    assert_eq!(scheduler.pending_count(), 2);

    assert!(chart.cleanup());
    assert_eq!(scheduler.pending_count(), 0);
    assert!(!chart.is_running());
    assert_eq!(chart.phase(), LivePhase::Stopped);
    assert!(container.is_empty());

    let ticks = chart.tick_count();
    assert_eq!(scheduler.advance_by(10_000), 0);
    assert_eq!(chart.tick_count(), ticks);
    assert!(!chart.cleanup());
    assert!(!chart.start());
}

#[test]
fn stop_then_start_resumes_updates() {
    let container = Container::new(Viewport::new(720, 420));
    let scheduler = Scheduler::new();
    let chart = mount(&container, &scheduler, cities(), 5.0, Box::new(SeededRandom::new(3)));

    assert!(chart.stop());
    assert!(!chart.stop());
    scheduler.advance_by(6_000);
    assert_eq!(chart.tick_count(), 0);

    assert!(chart.start());
    scheduler.advance_by(2_000);
    assert_eq!(chart.tick_count(), 1);
}

#[test]
fn detached_container_skips_ticks() {
    let container = Container::new(Viewport::new(720, 420));
    let scheduler = Scheduler::new();
    let chart = mount(&container, &scheduler, cities(), 5.0, Box::new(SeededRandom::new(9)));

    container.detach();
    scheduler.advance_by(4_000);
    assert_eq!(chart.tick_count(), 0);
    assert_eq!(chart.data(), cities());
}

#[test]
fn empty_input_mounts_nothing() {
    let container = Container::new(Viewport::new(720, 420));
    let scheduler = Scheduler::new();
    let tooltip = Tooltip::new();
    let ctx = SharedContext::new(&container, &tooltip, Rc::new(DefaultTranslator));
    let chart = render_live_bar_chart(
        ctx,
        &scheduler,
        Vec::new(),
        &LiveBarConfig::default(),
        MagnitudeControl::default(),
        Box::new(SeededRandom::new(0)),
    );
    assert!(chart.is_none());
    assert_eq!(scheduler.pending_count(), 0);
    assert!(container.is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn randomized_ticks_never_go_negative(
        seed in any::<u64>(),
        magnitude in 0.0f64..50.0,
        values in prop::collection::vec(0.0f64..30.0, 1..6)
    ) {
        let data: Vec<BarDatum> = values
            .iter()
            .enumerate()
            .map(|(index, value)| BarDatum::new(format!("city-{index}"), *value))
            .collect();
        let container = Container::new(Viewport::new(720, 420));
        let scheduler = Scheduler::new();
        let chart = mount(
            &container,
            &scheduler,
            data,
            magnitude,
            Box::new(SeededRandom::new(seed)),
        );

        for _ in 0..50 {
            scheduler.advance_by(2_000);
            prop_assert!(chart.data().iter().all(|datum| datum.value >= 0.0));
        }
        prop_assert_eq!(chart.tick_count(), 50);
    }
}
