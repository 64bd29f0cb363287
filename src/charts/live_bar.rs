use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::interaction::{RandomSource, Scheduler, TimerId};
use crate::render::{
    Container, NodeDraft, NodeId, NodeRole, SceneBuilder, SceneLayer, Shape, Transition,
    TransitionKind,
};

use super::bar::{
    BarChartConfig, BarDatum, BarNodes, BarScene, add_bar, bar_tooltip, category_label_shape,
    draw_bar_axes, layout_bars, value_label_shape,
};
use super::context::{RenderContext, SharedContext};
use super::handle::{ChartHandle, ChartKind};
use super::join::DataJoin;

pub const LIVE_TICK_INTERVAL_MS: u64 = 2_000;
pub const LIVE_HIGHLIGHT_MS: u64 = 600;
pub const LIVE_UPDATE_DURATION_MS: u32 = 600;
pub const DEFAULT_MAGNITUDE: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveBarConfig {
    pub bar: BarChartConfig,
    pub tick_interval_ms: u64,
    pub highlight_ms: u64,
    pub update_duration_ms: u32,
}

impl Default for LiveBarConfig {
    fn default() -> Self {
        Self {
            bar: BarChartConfig::default(),
            tick_interval_ms: LIVE_TICK_INTERVAL_MS,
            highlight_ms: LIVE_HIGHLIGHT_MS,
            update_duration_ms: LIVE_UPDATE_DURATION_MS,
        }
    }
}

/// Caller-adjustable mutation size, shared with a slider or similar input.
///
/// The chart reads it on every tick, so changes apply to the next mutation.
#[derive(Debug, Clone)]
pub struct MagnitudeControl {
    value: Rc<Cell<f64>>,
}

impl Default for MagnitudeControl {
    fn default() -> Self {
        Self::new(DEFAULT_MAGNITUDE)
    }
}

impl MagnitudeControl {
    #[must_use]
    pub fn new(value: f64) -> Self {
        let control = Self {
            value: Rc::new(Cell::new(0.0)),
        };
        control.set(value);
        control
    }

    /// Non-finite and negative inputs are stored as zero.
    pub fn set(&self, value: f64) {
        let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
        self.value.set(value);
    }

    #[must_use]
    pub fn get(&self) -> f64 {
        self.value.get()
    }
}

/// Update loop phase: `Scheduled -> Mutating -> Highlighted -> Scheduled`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LivePhase {
    Stopped,
    Scheduled,
    Mutating,
    Highlighted { key: String },
}

struct LiveState {
    ctx: SharedContext,
    scheduler: Scheduler,
    handle: ChartHandle,
    scene: BarScene,
    data: Vec<BarDatum>,
    config: LiveBarConfig,
    magnitude: MagnitudeControl,
    random: Box<dyn RandomSource>,
    phase: LivePhase,
    interval: Option<TimerId>,
    pulse: Option<TimerId>,
    ticks: u64,
    this: Weak<RefCell<LiveState>>,
}

impl LiveState {
    fn start(&mut self) -> bool {
        if self.interval.is_some() || !self.handle.is_active() {
            return false;
        }
        let weak = self.this.clone();
        let timer = self.scheduler.set_interval(self.config.tick_interval_ms, move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().tick();
            }
        });
        self.handle.track_timer(&self.scheduler, timer);
        self.interval = Some(timer);
        self.phase = LivePhase::Scheduled;
        debug!(
            owner = self.handle.owner().0,
            interval_ms = self.config.tick_interval_ms,
            "live updates started"
        );
        true
    }

    fn stop(&mut self) -> bool {
        let Some(interval) = self.interval.take() else {
            return false;
        };
        self.scheduler.clear(interval);
        self.handle.untrack_timer(interval);
        self.clear_pulse();
        self.phase = LivePhase::Stopped;
        debug!(owner = self.handle.owner().0, ticks = self.ticks, "live updates stopped");
        true
    }

    fn clear_pulse(&mut self) {
        if let Some(pulse) = self.pulse.take() {
            self.scheduler.clear(pulse);
            self.handle.untrack_timer(pulse);
        }
        if self.handle.is_active() {
            self.handle.with_instance(|instance| instance.set_glow(None));
        }
    }

    fn tick(&mut self) {
        if !self.handle.is_active() || !self.ctx.container.is_attached() || self.data.is_empty() {
            return;
        }
        self.phase = LivePhase::Mutating;

        let index = self.random.pick_index(self.data.len()).min(self.data.len() - 1);
        let upward = self.random.pick_direction();
        let magnitude = self.magnitude.get();
        let datum = &mut self.data[index];
        let delta = if upward { magnitude } else { -magnitude };
        let previous = datum.value;
        datum.value = (datum.value + delta).max(0.0);
        let key = datum.key.clone();
        self.ticks += 1;
        trace!(tick = self.ticks, key = %key, previous, value = datum.value, "live bar mutated");

        let ctx = self.ctx.borrowed();
        update_bar_scene(
            &ctx,
            &self.data,
            &self.config.bar,
            self.config.update_duration_ms,
            &self.handle,
            &mut self.scene,
        );

        self.clear_pulse();
        self.handle.with_instance(|instance| instance.set_glow(Some(&key)));
        let weak = self.this.clone();
        let pulse = self.scheduler.set_timeout(self.config.highlight_ms, move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().end_pulse();
            }
        });
        self.handle.track_timer(&self.scheduler, pulse);
        self.pulse = Some(pulse);
        self.phase = LivePhase::Highlighted { key };
    }

    fn end_pulse(&mut self) {
        if let Some(pulse) = self.pulse.take() {
            self.handle.untrack_timer(pulse);
        }
        if self.handle.is_active() {
            self.handle.with_instance(|instance| instance.set_glow(None));
        }
        if self.interval.is_some() {
            self.phase = LivePhase::Scheduled;
        }
    }
}

/// Bar chart that nudges one random bar per tick and pulses it.
///
/// Clones share the same chart.
#[derive(Clone)]
pub struct LiveBarChart {
    state: Rc<RefCell<LiveState>>,
}

impl std::fmt::Debug for LiveBarChart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("LiveBarChart")
            .field("phase", &state.phase)
            .field("ticks", &state.ticks)
            .finish()
    }
}

impl LiveBarChart {
    /// Starts the tick interval; a second call while running is a no-op.
    pub fn start(&self) -> bool {
        self.state.borrow_mut().start()
    }

    /// Cancels the interval and any pending highlight.
    pub fn stop(&self) -> bool {
        self.state.borrow_mut().stop()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        let state = self.state.borrow();
        state.interval.is_some() && state.handle.is_active()
    }

    /// Stops updates and removes the chart.
    pub fn cleanup(&self) -> bool {
        let handle = {
            let mut state = self.state.borrow_mut();
            state.stop();
            state.phase = LivePhase::Stopped;
            state.handle.clone()
        };
        handle.cleanup()
    }

    #[must_use]
    pub fn handle(&self) -> ChartHandle {
        self.state.borrow().handle.clone()
    }

    #[must_use]
    pub fn phase(&self) -> LivePhase {
        self.state.borrow().phase.clone()
    }

    /// Entity glowing after the latest tick, if its pulse is still running.
    #[must_use]
    pub fn highlighted_key(&self) -> Option<String> {
        match &self.state.borrow().phase {
            LivePhase::Highlighted { key } => Some(key.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn data(&self) -> Vec<BarDatum> {
        self.state.borrow().data.clone()
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.state.borrow().ticks
    }

    #[must_use]
    pub fn magnitude(&self) -> MagnitudeControl {
        self.state.borrow().magnitude.clone()
    }
}

/// Mounts a bar chart and starts its randomized update loop.
///
/// Returns `None` for empty input or an unusable container.
pub fn render_live_bar_chart(
    ctx: SharedContext,
    scheduler: &Scheduler,
    data: Vec<BarDatum>,
    config: &LiveBarConfig,
    magnitude: MagnitudeControl,
    random: Box<dyn RandomSource>,
) -> Option<LiveBarChart> {
    let (handle, scene) =
        super::bar::render_bar_scene(&ctx.borrowed(), &data, &config.bar, ChartKind::LiveBar)?;
    let state = Rc::new_cyclic(|this| {
        RefCell::new(LiveState {
            ctx,
            scheduler: scheduler.clone(),
            handle,
            scene,
            data,
            config: config.clone(),
            magnitude,
            random,
            phase: LivePhase::Stopped,
            interval: None,
            pulse: None,
            ticks: 0,
            this: this.clone(),
        })
    });
    let chart = LiveBarChart { state };
    chart.start();
    Some(chart)
}

fn remove_bar_nodes(ctx: &RenderContext<'_>, handle: &ChartHandle, nodes: BarNodes) {
    handle.with_instance(|instance| instance.unbind(nodes.bar));
    for id in nodes.ids() {
        ctx.container.remove_node(id);
    }
}

/// Moves a label to `target`, dropping it while its text is blank and
/// re-adding it once the text comes back.
fn retarget_label(
    container: &Container,
    builder: &mut SceneBuilder,
    label: &mut Option<NodeId>,
    target: Shape,
    duration_ms: u32,
) {
    match *label {
        Some(id) if target.is_blank_text() => {
            container.remove_node(id);
            *label = None;
        }
        Some(id) => {
            container.with_node_mut(id, |node| {
                let from = Box::new(std::mem::replace(&mut node.shape, target));
                node.transition =
                    Some(Transition::new(TransitionKind::Tween { from }, duration_ms));
            });
        }
        None => {
            *label = builder.add_text(
                NodeDraft::new(SceneLayer::Labels, target)
                    .with_role(NodeRole::Label)
                    .with_transition(Transition::new(TransitionKind::FadeIn, duration_ms)),
            );
        }
    }
}

/// Reconciles the bars on screen with `data`.
///
/// Surviving keys tween to their new geometry, new keys grow in, vanished
/// keys are removed. The value axis is redrawn because its domain follows
/// the data.
pub(crate) fn update_bar_scene(
    ctx: &RenderContext<'_>,
    data: &[BarDatum],
    config: &BarChartConfig,
    duration_ms: u32,
    handle: &ChartHandle,
    scene: &mut BarScene,
) {
    let container = ctx.container;
    let geometry = layout_bars(data, config);

    for id in scene.axis_nodes.drain(..) {
        container.remove_node(id);
    }
    for nodes in std::mem::take(&mut scene.unkeyed) {
        remove_bar_nodes(ctx, handle, nodes);
    }
    let plan = scene.join.plan(geometry.bars.iter().map(|bar| bar.key.as_str()));
    for key in &plan.exit {
        if let Some(nodes) = scene.join.remove(key) {
            remove_bar_nodes(ctx, handle, nodes);
        }
    }

    let mut builder = SceneBuilder::new(container, handle.owner());
    scene.axis_nodes = draw_bar_axes(&mut builder, ctx, config, &geometry);

    let tween = |from: Shape| {
        Transition::new(TransitionKind::Tween { from: Box::new(from) }, duration_ms)
    };
    let mut seen = IndexSet::new();
    let mut entered = DataJoin::new();
    for bar in &geometry.bars {
        let first = seen.insert(bar.key.as_str());
        if let Some(mut nodes) = scene.join.get(&bar.key).copied().filter(|_| first) {
            container.with_node_mut(nodes.bar, |node| {
                if let Shape::Rect(rect) = &mut node.shape {
                    let from = Shape::Rect(rect.clone());
                    rect.x = bar.x;
                    rect.y = bar.y;
                    rect.width = bar.width;
                    rect.height = bar.height;
                    node.transition = Some(tween(from));
                }
            });
            if config.show_value_labels {
                let target = value_label_shape(ctx, bar, &config.style);
                retarget_label(
                    container,
                    &mut builder,
                    &mut nodes.value_label,
                    target,
                    duration_ms,
                );
            }
            let target = category_label_shape(ctx, bar, config.layout, &config.style);
            retarget_label(container, &mut builder, &mut nodes.category_label, target, duration_ms);
            if let Some(entry) = scene.join.get_mut(&bar.key) {
                *entry = nodes;
            }
            let tooltip = bar_tooltip(ctx, &bar.key, bar.value);
            handle.with_instance(|instance| {
                if let Some(binding) = instance.bindings.get_mut(&nodes.bar) {
                    binding.tooltip = tooltip;
                }
            });
            continue;
        }

        let slot = scene.next_slot;
        scene.next_slot += 1;
        let entrance = Transition::new(
            TransitionKind::GrowFromBaseline {
                baseline_y: config.layout.plot_bottom(),
            },
            duration_ms,
        );
        let (nodes, binding) = add_bar(&mut builder, ctx, config, bar, data.len(), slot, entrance);
        handle.with_instance(|instance| instance.bind(nodes.bar, binding));
        if first {
            entered.insert(bar.key.clone(), nodes);
        } else {
            scene.unkeyed.push(nodes);
        }
    }
    for (key, nodes) in entered.iter() {
        scene.join.insert(key, *nodes);
    }
    scene.join.reorder(geometry.bars.iter().map(|bar| bar.key.as_str()));

    let added = builder.commit_into_layers();
    trace!(
        owner = handle.owner().0,
        entered = plan.enter.len(),
        updated = plan.update.len(),
        exited = plan.exit.len(),
        added,
        "bar scene updated"
    );
}
