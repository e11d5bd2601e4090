//! Scroll-triggered reveal state
//!
//! Each tracked element moves through `Hidden -> Pending -> Revealed` and
//! never back. `Pending` means a staggered reveal is already scheduled, so
//! repeated scroll events do not schedule it twice.
//!
//! The tracker decides *what* to reveal and *when*; the caller owns the clock
//! and feeds scheduled reveals back through [`RevealTracker::reveal`].

use std::collections::BTreeMap;

use crate::config::RevealConfig;
use crate::models::Group;
use crate::scheduler::Millis;
use crate::surface::Surface;

/// Groups whose reveal state is tracked, in scan order.
pub const TRACKED: [Group; 3] = [Group::Messages, Group::Timeline, Group::Qualities];

/// Reveal state of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Hidden,
    Pending,
    Revealed,
}

/// A reveal the caller must run after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledReveal {
    pub group: Group,
    pub index: usize,
    pub delay: Millis,
}

/// Append-only reveal state for the message, timeline and quality groups.
#[derive(Debug, Clone)]
pub struct RevealTracker {
    config: RevealConfig,
    states: BTreeMap<Group, Vec<RevealState>>,
}

impl RevealTracker {
    /// Size the tracker from the groups present on the page.
    pub fn new(config: RevealConfig, surface: &dyn Surface) -> Self {
        let states = TRACKED
            .iter()
            .map(|g| (*g, vec![RevealState::Hidden; surface.group_len(*g)]))
            .collect();
        Self { config, states }
    }

    /// Delay before the entrance reveal of the message group.
    pub fn entrance_delay(&self) -> Millis {
        self.config.entrance_delay_ms
    }

    pub fn state(&self, group: Group, index: usize) -> Option<RevealState> {
        self.states.get(&group).and_then(|s| s.get(index)).copied()
    }

    pub fn is_revealed(&self, group: Group, index: usize) -> bool {
        self.state(group, index) == Some(RevealState::Revealed)
    }

    pub fn revealed_count(&self, group: Group) -> usize {
        self.states
            .get(&group)
            .map(|s| s.iter().filter(|st| **st == RevealState::Revealed).count())
            .unwrap_or(0)
    }

    /// Reveal one member. Returns `true` if this call made the transition.
    pub fn reveal(&mut self, surface: &mut dyn Surface, group: Group, index: usize) -> bool {
        let Some(state) = self.states.get_mut(&group).and_then(|s| s.get_mut(index)) else {
            return false;
        };
        if *state == RevealState::Revealed {
            return false;
        }
        *state = RevealState::Revealed;
        surface.set_revealed(group, index, true);
        true
    }

    /// Reveal every member of a group (the timed entrance effect).
    pub fn reveal_all(&mut self, surface: &mut dyn Surface, group: Group) -> usize {
        let len = self.states.get(&group).map(Vec::len).unwrap_or(0);
        (0..len).filter(|i| self.reveal(surface, group, *i)).count()
    }

    /// Scroll handler.
    ///
    /// Messages past the threshold reveal immediately. Timeline entries and
    /// quality cards past the threshold are returned as staggered reveals,
    /// delayed by their index in the group times the group's step.
    pub fn scan(&mut self, surface: &mut dyn Surface) -> Vec<ScheduledReveal> {
        let line = surface.viewport_height() - self.config.threshold;
        let mut scheduled = Vec::new();

        for group in TRACKED {
            let step = match group {
                Group::Timeline => Some(self.config.timeline_step_ms),
                Group::Qualities => Some(self.config.quality_step_ms),
                _ => None,
            };
            let len = self.states.get(&group).map(Vec::len).unwrap_or(0);

            for index in 0..len {
                if self.state(group, index) != Some(RevealState::Hidden) {
                    continue;
                }
                if surface.member_top(group, index) >= line {
                    continue;
                }
                match step {
                    None => {
                        self.reveal(surface, group, index);
                    }
                    Some(step) => {
                        if let Some(st) = self.states.get_mut(&group).and_then(|s| s.get_mut(index)) {
                            *st = RevealState::Pending;
                        }
                        scheduled.push(ScheduledReveal { group, index, delay: index as Millis * step });
                    }
                }
            }
        }

        scheduled
    }
}
