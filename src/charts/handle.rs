use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{nearest_axis_by_angle, nearest_position_index};
use crate::interaction::{HighlightController, PointerEvent, Scheduler, TimerId, Tooltip};
use crate::render::{Container, ExportHandle, ExportSettings, NodeId, NodeStyle, OwnerId};

/// Every chart the gallery can mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartKind {
    Bar,
    LiveBar,
    Line,
    Donut,
    MultiBand,
    Dumbbell,
    Bubble,
    ParallelCoordinates,
    Radial,
}

impl ChartKind {
    /// Base name of exported files.
    #[must_use]
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Bar => "bar-chart",
            Self::LiveBar => "live-bar-chart",
            Self::Line => "line-chart",
            Self::Donut => "donut-chart",
            Self::MultiBand => "multi-band-chart",
            Self::Dumbbell => "dumbbell-chart",
            Self::Bubble => "bubble-chart",
            Self::ParallelCoordinates => "parallel-coordinates",
            Self::Radial => "radial-chart",
        }
    }
}

/// One anchor of a nearest-axis tooltip.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AxisAnchor {
    /// Pixel x for horizontal lookups; unused for angular ones.
    pub position: f64,
    pub html: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum LookupGeometry {
    Horizontal,
    Angular { center: (f64, f64) },
}

/// Tooltip body that depends on which axis the pointer is closest to.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AxisLookup {
    pub header: String,
    pub anchors: Vec<AxisAnchor>,
    pub geometry: LookupGeometry,
}

impl AxisLookup {
    pub(crate) fn nearest(&self, pointer: PointerEvent) -> Option<usize> {
        match self.geometry {
            LookupGeometry::Horizontal => {
                let positions: Vec<f64> =
                    self.anchors.iter().map(|anchor| anchor.position).collect();
                nearest_position_index(&positions, pointer.x)
            }
            LookupGeometry::Angular { center } => {
                nearest_axis_by_angle(center, (pointer.x, pointer.y), self.anchors.len())
            }
        }
    }

    fn html_at(&self, pointer: PointerEvent) -> String {
        match self.nearest(pointer).and_then(|index| self.anchors.get(index)) {
            Some(anchor) => format!("{}<br/>{}", self.header, anchor.html),
            None => self.header.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TooltipContent {
    Static(String),
    NearestAxis(AxisLookup),
}

impl TooltipContent {
    fn html_at(&self, pointer: PointerEvent) -> String {
        match self {
            Self::Static(html) => html.clone(),
            Self::NearestAxis(lookup) => lookup.html_at(pointer),
        }
    }

    fn tracks_pointer(&self) -> bool {
        matches!(self, Self::NearestAxis(_))
    }
}

/// Style a mark switches to while the pointer is over it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct HoverEffect {
    pub opacity: f64,
    pub stroke_width: Option<f64>,
    pub raise: bool,
}

impl HoverEffect {
    pub(crate) fn opaque() -> Self {
        Self {
            opacity: 1.0,
            stroke_width: None,
            raise: false,
        }
    }

    pub(crate) fn with_stroke(stroke_width: f64) -> Self {
        Self {
            opacity: 1.0,
            stroke_width: Some(stroke_width),
            raise: true,
        }
    }
}

/// Interaction metadata for one hoverable node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MarkBinding {
    pub key: String,
    /// Entity group matched on mark hover.
    pub group: String,
    /// Legend entry this mark belongs to, when the chart has a legend.
    pub legend_key: Option<String>,
    pub tooltip: TooltipContent,
    pub base: NodeStyle,
    pub hover: HoverEffect,
}

impl MarkBinding {
    pub(crate) fn new(key: impl Into<String>, tooltip: TooltipContent) -> Self {
        let key = key.into();
        Self {
            group: key.clone(),
            key,
            legend_key: None,
            tooltip,
            base: NodeStyle::default(),
            hover: HoverEffect::opaque(),
        }
    }

    pub(crate) fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub(crate) fn with_legend_key(mut self, legend_key: impl Into<String>) -> Self {
        self.legend_key = Some(legend_key.into());
        self
    }

    pub(crate) fn with_base(mut self, base: NodeStyle) -> Self {
        self.base = base;
        self
    }

    pub(crate) fn with_hover(mut self, hover: HoverEffect) -> Self {
        self.hover = hover;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HighlightSource {
    Mark,
    Legend,
}

/// Summary of one mark for callers and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkInfo {
    pub id: NodeId,
    pub key: String,
    pub group: String,
}

/// State shared by a chart handle and the callbacks it registered.
#[derive(Debug)]
pub(crate) struct ChartInstance {
    pub kind: ChartKind,
    pub owner: OwnerId,
    pub container: Container,
    pub tooltip: Tooltip,
    pub bindings: IndexMap<NodeId, MarkBinding>,
    pub legend: IndexMap<NodeId, String>,
    pub dim_on_mark_hover: bool,
    pub export: ExportSettings,
    highlight: HighlightController,
    highlight_source: HighlightSource,
    hovered: Option<NodeId>,
    timers: Vec<TimerId>,
    scheduler: Option<Scheduler>,
    active: bool,
}

impl ChartInstance {
    pub(crate) fn new(
        kind: ChartKind,
        owner: OwnerId,
        container: &Container,
        tooltip: &Tooltip,
        export: ExportSettings,
    ) -> Self {
        Self {
            kind,
            owner,
            container: container.clone(),
            tooltip: tooltip.clone(),
            bindings: IndexMap::new(),
            legend: IndexMap::new(),
            dim_on_mark_hover: false,
            export,
            highlight: HighlightController::default(),
            highlight_source: HighlightSource::Mark,
            hovered: None,
            timers: Vec::new(),
            scheduler: None,
            active: true,
        }
    }

    pub(crate) fn with_mark_dimming(mut self) -> Self {
        self.dim_on_mark_hover = true;
        self
    }

    pub(crate) fn bind(&mut self, id: NodeId, binding: MarkBinding) {
        self.bindings.insert(id, binding);
    }

    pub(crate) fn bind_legend(&mut self, id: NodeId, key: impl Into<String>) {
        self.legend.insert(id, key.into());
    }

    pub(crate) fn unbind(&mut self, id: NodeId) {
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        self.bindings.shift_remove(&id);
    }

    fn interactive(&self) -> bool {
        self.active && self.container.is_attached()
    }

    /// Recomputes opacity and stroke width of every bound node.
    pub(crate) fn apply_styles(&self) {
        for (id, binding) in &self.bindings {
            let matched_key = match self.highlight_source {
                HighlightSource::Mark if self.dim_on_mark_hover => Some(binding.group.as_str()),
                HighlightSource::Mark => None,
                HighlightSource::Legend => Some(binding.legend_key.as_deref().unwrap_or_default()),
            };
            let mut opacity = match matched_key {
                Some(group) => self.highlight.opacity_for(group, binding.base.opacity),
                None => binding.base.opacity,
            };
            let mut stroke_width = binding.base.stroke_width;
            if self.hovered == Some(*id) {
                opacity = binding.hover.opacity;
                stroke_width = binding.hover.stroke_width.or(stroke_width);
            }
            self.container.with_node_mut(*id, |node| {
                node.style.opacity = opacity;
                node.style.stroke_width = stroke_width;
            });
        }
        for (id, key) in &self.legend {
            let opacity = match self.highlight_source {
                HighlightSource::Legend => self.highlight.opacity_for(key, 1.0),
                HighlightSource::Mark => 1.0,
            };
            self.container.with_node_mut(*id, |node| node.style.opacity = opacity);
        }
    }

    /// Turns the glow filter on for marks of `key` and off for the rest.
    pub(crate) fn set_glow(&self, key: Option<&str>) {
        for (id, binding) in &self.bindings {
            let glow = key.is_some_and(|key| key == binding.key);
            self.container.with_node_mut(*id, |node| node.style.glow = glow);
        }
    }

    fn pointer_enter(&mut self, id: NodeId, pointer: PointerEvent) -> bool {
        if !self.interactive() {
            return false;
        }
        let Some(binding) = self.bindings.get(&id) else {
            return false;
        };
        let html = binding.tooltip.html_at(pointer);
        let group = binding.group.clone();
        let raise = binding.hover.raise;

        self.hovered = Some(id);
        self.highlight_source = HighlightSource::Mark;
        if self.dim_on_mark_hover {
            self.highlight.enter(&group);
        }
        if raise {
            self.container.raise(id);
        }
        self.apply_styles();
        self.tooltip.show(Some(self.owner), html, pointer);
        trace!(owner = self.owner.0, node = id.0, "mark hover enter");
        true
    }

    fn pointer_move(&mut self, id: NodeId, pointer: PointerEvent) -> bool {
        if !self.interactive() || self.hovered != Some(id) {
            return false;
        }
        if let Some(binding) = self.bindings.get(&id) {
            if binding.tooltip.tracks_pointer() {
                self.tooltip.set_html(binding.tooltip.html_at(pointer));
            }
        }
        self.tooltip.move_to(pointer);
        true
    }

    fn pointer_leave(&mut self, id: NodeId) -> bool {
        if self.hovered != Some(id) {
            return false;
        }
        self.hovered = None;
        self.highlight.leave();
        if self.active {
            self.apply_styles();
        }
        self.tooltip.hide();
        trace!(owner = self.owner.0, node = id.0, "mark hover leave");
        true
    }

    fn legend_enter(&mut self, key: &str) -> bool {
        if !self.interactive() || !self.legend.values().any(|legend_key| legend_key == key) {
            return false;
        }
        self.highlight_source = HighlightSource::Legend;
        self.highlight.enter(key);
        self.apply_styles();
        true
    }

    fn legend_leave(&mut self) -> bool {
        if self.highlight_source != HighlightSource::Legend || !self.highlight.leave() {
            return false;
        }
        self.highlight_source = HighlightSource::Mark;
        if self.active {
            self.apply_styles();
        }
        true
    }

    fn cleanup(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        if let Some(scheduler) = &self.scheduler {
            for timer in self.timers.drain(..) {
                scheduler.clear(timer);
            }
        }
        self.tooltip.hide_for(self.owner);
        let removed = if self.container.is_attached() {
            self.container.remove_owned(self.owner)
        } else {
            0
        };
        self.hovered = None;
        self.highlight.leave();
        self.bindings.clear();
        self.legend.clear();
        debug!(chart = ?self.kind, owner = self.owner.0, removed, "chart cleaned up");
        true
    }
}

/// Returned by every render call; owns the chart's lifecycle.
///
/// Cloning shares the same chart. `cleanup` may be called any number of
/// times.
#[derive(Debug, Clone)]
pub struct ChartHandle {
    inner: Rc<RefCell<ChartInstance>>,
}

impl ChartHandle {
    pub(crate) fn new(instance: ChartInstance) -> Self {
        Self {
            inner: Rc::new(RefCell::new(instance)),
        }
    }

    pub(crate) fn with_instance<R>(&self, f: impl FnOnce(&mut ChartInstance) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    /// Registers a timer that `cleanup` must cancel.
    pub(crate) fn track_timer(&self, scheduler: &Scheduler, timer: TimerId) {
        let mut instance = self.inner.borrow_mut();
        if !instance.active {
            scheduler.clear(timer);
            return;
        }
        instance.scheduler.get_or_insert_with(|| scheduler.clone());
        instance.timers.retain(|existing| scheduler.is_pending(*existing));
        instance.timers.push(timer);
    }

    pub(crate) fn untrack_timer(&self, timer: TimerId) {
        self.inner.borrow_mut().timers.retain(|existing| *existing != timer);
    }

    /// Removes every node, timer and tooltip ownership this chart created.
    ///
    /// Returns `false` when the chart was already cleaned up.
    pub fn cleanup(&self) -> bool {
        self.inner.borrow_mut().cleanup()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.borrow().active
    }

    #[must_use]
    pub fn kind(&self) -> ChartKind {
        self.inner.borrow().kind
    }

    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.inner.borrow().owner
    }

    #[must_use]
    pub fn container(&self) -> Container {
        self.inner.borrow().container.clone()
    }

    /// Hoverable marks in bind order.
    #[must_use]
    pub fn marks(&self) -> Vec<MarkInfo> {
        self.inner
            .borrow()
            .bindings
            .iter()
            .map(|(id, binding)| MarkInfo {
                id: *id,
                key: binding.key.clone(),
                group: binding.group.clone(),
            })
            .collect()
    }

    #[must_use]
    pub fn mark_id(&self, key: &str) -> Option<NodeId> {
        self.inner
            .borrow()
            .bindings
            .iter()
            .find(|(_, binding)| binding.key == key)
            .map(|(id, _)| *id)
    }

    /// Legend entry nodes and their keys.
    #[must_use]
    pub fn legend_entries(&self) -> Vec<(NodeId, String)> {
        self.inner
            .borrow()
            .legend
            .iter()
            .map(|(id, key)| (*id, key.clone()))
            .collect()
    }

    pub fn pointer_enter(&self, id: NodeId, pointer: PointerEvent) -> bool {
        self.inner.borrow_mut().pointer_enter(id, pointer)
    }

    pub fn pointer_move(&self, id: NodeId, pointer: PointerEvent) -> bool {
        self.inner.borrow_mut().pointer_move(id, pointer)
    }

    pub fn pointer_leave(&self, id: NodeId) -> bool {
        self.inner.borrow_mut().pointer_leave(id)
    }

    pub fn legend_enter(&self, key: &str) -> bool {
        self.inner.borrow_mut().legend_enter(key)
    }

    pub fn legend_leave(&self) -> bool {
        self.inner.borrow_mut().legend_leave()
    }

    #[must_use]
    pub fn highlighted_key(&self) -> Option<String> {
        self.inner.borrow().highlight.hovered_key().map(str::to_owned)
    }

    #[must_use]
    pub fn hovered_node(&self) -> Option<NodeId> {
        self.inner.borrow().hovered
    }

    #[must_use]
    pub fn export_handle(&self) -> ExportHandle {
        let instance = self.inner.borrow();
        ExportHandle::new(&instance.container, instance.kind.file_stem(), instance.export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_lookup_picks_nearest_anchor() {
        let lookup = AxisLookup {
            header: "<strong>BE001</strong>".to_owned(),
            anchors: vec![
                AxisAnchor {
                    position: 100.0,
                    html: "NO2: 31".to_owned(),
                },
                AxisAnchor {
                    position: 200.0,
                    html: "PM10: 18".to_owned(),
                },
            ],
            geometry: LookupGeometry::Horizontal,
        };
        assert_eq!(lookup.nearest(PointerEvent::new(150.0, 0.0)), Some(0));
        assert_eq!(
            lookup.html_at(PointerEvent::new(190.0, 0.0)),
            "<strong>BE001</strong><br/>PM10: 18"
        );
    }
}
