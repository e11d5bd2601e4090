//! The engine's view of the page
//!
//! [`Surface`] is the seam between the effect engine and the DOM. The engine
//! only appends and removes decorations, flips reveal state on group members,
//! and writes styles, text, icons and values to named targets.
//!
//! [`MemorySurface`] keeps all of that in memory. It backs the unit tests and
//! the headless simulator; the browser binding lives in `crate::wasm`.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use thiserror::Error;

use crate::models::{Decoration, Group, Layer, Target};

/// Identifier of a decorative node appended by the engine.
pub type NodeId = u64;

/// Errors raised while binding a surface to a page.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum SurfaceError {
    /// A required element is not on the page
    #[error("Missing page element: {selector}")]
    MissingElement { selector: String },
    /// The host environment rejected an operation
    #[error("Host error: {0}")]
    Host(String),
}

/// Operations the engine performs on the page.
///
/// Implementations resolve every element up front; once bound, these calls
/// cannot fail.
pub trait Surface {
    /// Append a decoration to `layer`, returning its node id.
    fn append(&mut self, layer: Layer, decoration: &Decoration) -> NodeId;

    /// Remove a node. Returns `false` if it was already gone.
    fn remove(&mut self, node: NodeId) -> bool;

    /// Remove every node in `layer`.
    fn clear(&mut self, layer: Layer);

    /// Number of nodes currently in `layer`.
    fn count(&self, layer: Layer) -> usize;

    /// Number of members in `group`.
    fn group_len(&self, group: Group) -> usize;

    /// Top edge of a group member relative to the viewport, in pixels.
    fn member_top(&self, group: Group, index: usize) -> f64;

    /// Current viewport height in pixels.
    fn viewport_height(&self) -> f64;

    /// Add or remove the `show` class on a group member.
    fn set_revealed(&mut self, group: Group, index: usize, revealed: bool);

    /// Show or hide a target (`display`).
    fn set_visible(&mut self, target: Target, visible: bool);

    /// Set one inline style property on a target.
    fn set_style(&mut self, target: Target, property: &str, value: &str);

    /// Replace a target's text content.
    fn set_text(&mut self, target: Target, text: &str);

    /// Replace an icon element's class list.
    fn set_icon(&mut self, target: Target, class_name: &str);

    /// Set an input's value.
    fn set_value(&mut self, target: Target, value: f64);

    /// Number of `.heart` nodes on the page, across every heart layer.
    fn heart_count(&self) -> usize {
        self.count(Layer::Hearts) + self.count(Layer::ModalHearts)
    }
}

#[derive(Debug, Clone, Default)]
struct Member {
    top: f64,
    revealed: bool,
}

/// In-memory page used by tests and the headless simulator.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    viewport_height: f64,
    next_node: NodeId,
    nodes: BTreeMap<NodeId, (Layer, Decoration)>,
    groups: HashMap<Group, Vec<Member>>,
    visible: HashMap<Target, bool>,
    styles: HashMap<(Target, String), String>,
    texts: HashMap<Target, String>,
    icons: HashMap<Target, String>,
    values: HashMap<Target, f64>,
    /// Count of `set_revealed(_, _, false)` calls per group
    hides: HashMap<Group, usize>,
}

impl MemorySurface {
    pub fn new(viewport_height: f64) -> Self {
        Self {
            viewport_height,
            next_node: 1,
            nodes: BTreeMap::new(),
            groups: HashMap::new(),
            visible: HashMap::new(),
            styles: HashMap::new(),
            texts: HashMap::new(),
            icons: HashMap::new(),
            values: HashMap::new(),
            hides: HashMap::new(),
        }
    }

    /// Add a group whose members sit at the given viewport tops.
    pub fn with_group(mut self, group: Group, tops: impl IntoIterator<Item = f64>) -> Self {
        self.groups.insert(group, tops.into_iter().map(|top| Member { top, revealed: false }).collect());
        self
    }

    /// A page laid out like the greeting: message texts near the top, the
    /// timeline and quality cards further down, lyrics in between.
    pub fn sample_page(viewport_height: f64) -> Self {
        Self::new(viewport_height)
            .with_group(Group::Messages, [120.0, 220.0, 320.0, 900.0])
            .with_group(Group::Lyrics, [400.0, 440.0, 480.0, 520.0])
            .with_group(Group::Timeline, [1100.0, 1300.0, 1500.0, 1700.0])
            .with_group(Group::Qualities, [2000.0, 2000.0, 2200.0, 2200.0, 2400.0, 2400.0])
    }

    /// Scroll the page down by `dy` pixels (negative scrolls up).
    pub fn scroll_by(&mut self, dy: f64) {
        for members in self.groups.values_mut() {
            for m in members {
                m.top -= dy;
            }
        }
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height;
    }

    pub fn is_revealed(&self, group: Group, index: usize) -> bool {
        self.groups.get(&group).and_then(|g| g.get(index)).map(|m| m.revealed).unwrap_or(false)
    }

    pub fn revealed_count(&self, group: Group) -> usize {
        self.groups.get(&group).map(|g| g.iter().filter(|m| m.revealed).count()).unwrap_or(0)
    }

    /// How many times members of `group` were hidden again.
    pub fn hide_count(&self, group: Group) -> usize {
        self.hides.get(&group).copied().unwrap_or(0)
    }

    /// Visibility of a target; targets never toggled are hidden.
    pub fn is_visible(&self, target: Target) -> bool {
        self.visible.get(&target).copied().unwrap_or(false)
    }

    pub fn style(&self, target: Target, property: &str) -> Option<&str> {
        self.styles.get(&(target, property.to_string())).map(String::as_str)
    }

    pub fn text(&self, target: Target) -> Option<&str> {
        self.texts.get(&target).map(String::as_str)
    }

    pub fn icon(&self, target: Target) -> Option<&str> {
        self.icons.get(&target).map(String::as_str)
    }

    pub fn value(&self, target: Target) -> Option<f64> {
        self.values.get(&target).copied()
    }

    /// Decorations currently in `layer`, in append order.
    pub fn decorations(&self, layer: Layer) -> Vec<&Decoration> {
        self.nodes.values().filter(|(l, _)| *l == layer).map(|(_, d)| d).collect()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Snapshot of counts, for reporting.
    pub fn summary(&self) -> SurfaceSummary {
        SurfaceSummary {
            hearts: self.count(Layer::Hearts),
            confetti: self.count(Layer::Confetti),
            modal_hearts: self.count(Layer::ModalHearts),
            modal_open: self.is_visible(Target::Modal),
            now_playing: self.is_visible(Target::PlayingIndicator),
            progress: self.style(Target::Progress, "width").map(str::to_string),
            revealed: Group::ALL.iter().map(|g| (*g, self.revealed_count(*g))).collect(),
        }
    }
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::sample_page(800.0)
    }
}

/// Counts taken from a [`MemorySurface`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceSummary {
    pub hearts: usize,
    pub confetti: usize,
    pub modal_hearts: usize,
    pub modal_open: bool,
    pub now_playing: bool,
    pub progress: Option<String>,
    pub revealed: BTreeMap<Group, usize>,
}

impl Surface for MemorySurface {
    fn append(&mut self, layer: Layer, decoration: &Decoration) -> NodeId {
        let id = self.next_node;
        self.next_node += 1;
        self.nodes.insert(id, (layer, decoration.clone()));
        id
    }

    fn remove(&mut self, node: NodeId) -> bool {
        self.nodes.remove(&node).is_some()
    }

    fn clear(&mut self, layer: Layer) {
        self.nodes.retain(|_, (l, _)| *l != layer);
    }

    fn count(&self, layer: Layer) -> usize {
        self.nodes.values().filter(|(l, _)| *l == layer).count()
    }

    fn group_len(&self, group: Group) -> usize {
        self.groups.get(&group).map(Vec::len).unwrap_or(0)
    }

    fn member_top(&self, group: Group, index: usize) -> f64 {
        self.groups.get(&group).and_then(|g| g.get(index)).map(|m| m.top).unwrap_or(f64::INFINITY)
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn set_revealed(&mut self, group: Group, index: usize, revealed: bool) {
        if let Some(member) = self.groups.get_mut(&group).and_then(|g| g.get_mut(index)) {
            member.revealed = revealed;
            if !revealed {
                *self.hides.entry(group).or_insert(0) += 1;
            }
        }
    }

    fn set_visible(&mut self, target: Target, visible: bool) {
        self.visible.insert(target, visible);
    }

    fn set_style(&mut self, target: Target, property: &str, value: &str) {
        self.styles.insert((target, property.to_string()), value.to_string());
    }

    fn set_text(&mut self, target: Target, text: &str) {
        self.texts.insert(target, text.to_string());
    }

    fn set_icon(&mut self, target: Target, class_name: &str) {
        self.icons.insert(target, class_name.to_string());
    }

    fn set_value(&mut self, target: Target, value: f64) {
        self.values.insert(target, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Iteration, Offset, Shape};

    fn dot() -> Decoration {
        Decoration {
            shape: Shape::Circle,
            left: Offset::Viewport(1.0),
            size: 5.0,
            color: "#ff6b93".to_string(),
            animation: "floatUp".to_string(),
            duration: 2.0,
            delay: 0.0,
            iteration: Iteration::Forwards,
        }
    }

    #[test]
    fn test_append_remove_clear() {
        let mut s = MemorySurface::new(800.0);
        let a = s.append(Layer::Confetti, &dot());
        let b = s.append(Layer::Confetti, &dot());
        s.append(Layer::Hearts, &dot());

        assert_eq!(s.count(Layer::Confetti), 2);
        assert!(s.remove(a));
        assert!(!s.remove(a));
        assert!(s.contains(b));

        s.clear(Layer::Confetti);
        assert_eq!(s.count(Layer::Confetti), 0);
        assert_eq!(s.count(Layer::Hearts), 1);
    }

    #[test]
    fn test_heart_count_spans_heart_layers() {
        let mut s = MemorySurface::new(800.0);
        s.append(Layer::Hearts, &dot());
        s.append(Layer::ModalHearts, &dot());
        s.append(Layer::Confetti, &dot());
        assert_eq!(s.heart_count(), 2);
    }

    #[test]
    fn test_scroll_moves_members_up() {
        let mut s = MemorySurface::new(800.0).with_group(Group::Timeline, [1000.0]);
        s.scroll_by(300.0);
        assert_eq!(s.member_top(Group::Timeline, 0), 700.0);
        assert_eq!(s.member_top(Group::Timeline, 9), f64::INFINITY);
    }

    #[test]
    fn test_hide_count_tracks_unreveals() {
        let mut s = MemorySurface::new(800.0).with_group(Group::Lyrics, [0.0, 0.0]);
        s.set_revealed(Group::Lyrics, 0, true);
        s.set_revealed(Group::Lyrics, 0, false);
        assert_eq!(s.hide_count(Group::Lyrics), 1);
        assert_eq!(s.hide_count(Group::Messages), 0);
    }
}
