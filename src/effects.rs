//! Decorative effect spawning: background hearts, confetti and modal hearts.
//!
//! Hearts and confetti follow two different lifecycle policies:
//!
//! - **Hearts** accumulate as ambient background. They are never removed; the
//!   periodic spawner checks the page's heart count against a cap before
//!   adding another.
//! - **Confetti** is a one-shot burst. Every piece reports its own lifetime
//!   so the caller can schedule its removal, which bounds the population no
//!   matter how often bursts are triggered.
//!
//! The modal heart set is a third, reset-on-open lifecycle: it is cleared and
//! rebuilt every time the secret modal opens.

use crate::config::{ConfettiConfig, HeartsConfig, ModalConfig};
use crate::models::{Decoration, Iteration, Layer, Offset, Shape};
use crate::scheduler::Millis;
use crate::surface::{NodeId, Surface};

/// A confetti piece on the page and the time it must be removed after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiring {
    pub node: NodeId,
    pub lifetime: Millis,
}

/// Creates decorations with randomized visual parameters.
pub struct EffectSpawner {
    hearts: HeartsConfig,
    confetti: ConfettiConfig,
    modal: ModalConfig,
    rng: fastrand::Rng,
}

impl EffectSpawner {
    /// Create a spawner. A seed makes every decoration reproducible.
    pub fn new(
        hearts: HeartsConfig,
        confetti: ConfettiConfig,
        modal: ModalConfig,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self { hearts, confetti, modal, rng }
    }

    /// Heart population cap.
    pub fn cap(&self) -> usize {
        self.hearts.cap
    }

    /// Build one background heart.
    pub fn heart(&mut self) -> Decoration {
        let left = self.between([0.0, 100.0]);
        let delay = self.between(self.hearts.delay);
        let duration = self.between(self.hearts.duration);
        let size = self.between(self.hearts.size);
        let color = pick(&mut self.rng, &self.hearts.palette);

        Decoration {
            shape: Shape::Heart,
            left: Offset::Viewport(left),
            size,
            color,
            animation: self.hearts.animation.clone(),
            duration,
            delay,
            iteration: Iteration::Infinite,
        }
    }

    /// Append one background heart. Hearts are never removed by the engine.
    pub fn spawn_heart(&mut self, surface: &mut dyn Surface) -> NodeId {
        let heart = self.heart();
        surface.append(Layer::Hearts, &heart)
    }

    /// Create the initial background population.
    pub fn populate(&mut self, surface: &mut dyn Surface) -> usize {
        for _ in 0..self.hearts.initial {
            self.spawn_heart(surface);
        }
        self.hearts.initial
    }

    /// Spawner tick: add a heart only while the page holds fewer than the cap.
    pub fn try_spawn_heart(&mut self, surface: &mut dyn Surface) -> Option<NodeId> {
        if surface.heart_count() < self.hearts.cap {
            Some(self.spawn_heart(surface))
        } else {
            None
        }
    }

    /// Build one confetti piece.
    pub fn confetti_piece(&mut self) -> Decoration {
        let color = pick(&mut self.rng, &self.confetti.palette);
        let size = self.between(self.confetti.size);
        let left = self.between([0.0, 100.0]);
        let duration = self.between(self.confetti.duration);
        let shape = if self.rng.bool() { Shape::Circle } else { Shape::Square };

        Decoration {
            shape,
            left: Offset::Viewport(left),
            size,
            color,
            animation: self.confetti.animation.clone(),
            duration,
            delay: 0.0,
            iteration: Iteration::Forwards,
        }
    }

    /// Append a confetti burst. The caller must remove every returned node
    /// once its lifetime has elapsed.
    pub fn spawn_confetti(&mut self, surface: &mut dyn Surface) -> Vec<Expiring> {
        (0..self.confetti.count)
            .map(|_| {
                let piece = self.confetti_piece();
                let node = surface.append(Layer::Confetti, &piece);
                Expiring { node, lifetime: piece.duration_ms() }
            })
            .collect()
    }

    /// The modal heart set, laid out left to right with staggered delays.
    pub fn modal_hearts(&self) -> Vec<Decoration> {
        (0..self.modal.hearts)
            .map(|i| Decoration {
                shape: Shape::Heart,
                left: Offset::Percent(self.modal.start + i as f64 * self.modal.spacing),
                size: self.modal.size,
                color: self.modal.color.clone(),
                animation: self.hearts.animation.clone(),
                duration: self.modal.duration,
                delay: round_millis(i as f64 * self.modal.stagger),
                iteration: Iteration::Infinite,
            })
            .collect()
    }

    /// Clear the modal heart layer and rebuild it.
    pub fn rebuild_modal_hearts(&mut self, surface: &mut dyn Surface) -> usize {
        surface.clear(Layer::ModalHearts);
        let hearts = self.modal_hearts();
        for heart in &hearts {
            surface.append(Layer::ModalHearts, heart);
        }
        hearts.len()
    }

    fn between(&mut self, range: [f64; 2]) -> f64 {
        range[0] + self.rng.f64() * (range[1] - range[0])
    }
}

/// Uniform choice from a palette.
fn pick(rng: &mut fastrand::Rng, palette: &[String]) -> String {
    if palette.is_empty() {
        return String::new();
    }
    palette[rng.usize(..palette.len())].clone()
}

/// Keep stagger delays like `0.9` from printing as `0.8999999999999999`.
fn round_millis(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;

    fn spawner(seed: u64) -> EffectSpawner {
        EffectSpawner::new(
            HeartsConfig::default(),
            ConfettiConfig::default(),
            ModalConfig::default(),
            Some(seed),
        )
    }

    #[test]
    fn test_heart_parameters_in_range() {
        let mut s = spawner(1);
        let palette = HeartsConfig::default().palette;
        for _ in 0..500 {
            let h = s.heart();
            let left = h.left.value();
            assert!((0.0..=100.0).contains(&left), "left {} out of range", left);
            assert!((15.0..=30.0).contains(&h.duration));
            assert!((0.0..=10.0).contains(&h.delay));
            assert!((8.0..=28.0).contains(&h.size));
            assert!(palette.contains(&h.color));
            assert_eq!(h.shape, Shape::Heart);
            assert_eq!(h.iteration, Iteration::Infinite);
        }
    }

    #[test]
    fn test_confetti_parameters_in_range() {
        let mut s = spawner(2);
        let palette = ConfettiConfig::default().palette;
        let mut circles = 0;
        for _ in 0..1000 {
            let c = s.confetti_piece();
            assert!((5.0..=15.0).contains(&c.size));
            assert!((2.0..=5.0).contains(&c.duration));
            assert!(palette.contains(&c.color));
            assert_eq!(c.iteration, Iteration::Forwards);
            if c.shape == Shape::Circle {
                circles += 1;
            }
        }
        // 50/50 split, loosely
        assert!(circles > 400 && circles < 600, "circles: {}", circles);
    }

    #[test]
    fn test_populate_creates_initial_hearts() {
        let mut s = spawner(3);
        let mut page = MemorySurface::default();
        assert_eq!(s.populate(&mut page), 20);
        assert_eq!(page.count(Layer::Hearts), 20);
    }

    #[test]
    fn test_try_spawn_respects_cap() {
        let mut s = spawner(4);
        let mut page = MemorySurface::default();
        s.populate(&mut page);

        let spawned = (0..100).filter_map(|_| s.try_spawn_heart(&mut page)).count();
        assert_eq!(spawned, 10);
        assert_eq!(page.heart_count(), 30);
    }

    #[test]
    fn test_modal_hearts_count_toward_cap() {
        let mut s = spawner(5);
        let mut page = MemorySurface::default();
        s.populate(&mut page);
        s.rebuild_modal_hearts(&mut page);

        let spawned = (0..100).filter_map(|_| s.try_spawn_heart(&mut page)).count();
        assert_eq!(spawned, 2);
        assert_eq!(page.heart_count(), 30);
    }

    #[test]
    fn test_confetti_burst_reports_lifetimes() {
        let mut s = spawner(6);
        let mut page = MemorySurface::default();
        let burst = s.spawn_confetti(&mut page);

        assert_eq!(burst.len(), 50);
        assert_eq!(page.count(Layer::Confetti), 50);
        for piece in &burst {
            assert!((2000..=5000).contains(&piece.lifetime));
            assert!(page.contains(piece.node));
        }
    }

    #[test]
    fn test_rebuild_modal_hearts_resets() {
        let mut s = spawner(7);
        let mut page = MemorySurface::default();

        assert_eq!(s.rebuild_modal_hearts(&mut page), 8);
        assert_eq!(s.rebuild_modal_hearts(&mut page), 8);
        assert_eq!(page.count(Layer::ModalHearts), 8);

        let hearts = page.decorations(Layer::ModalHearts);
        assert_eq!(hearts[0].left, Offset::Percent(10.0));
        assert_eq!(hearts[7].left, Offset::Percent(94.0));
        assert_eq!(hearts[3].delay, 0.9);
        assert_eq!(hearts[0].size, 12.0);
        assert!(hearts.iter().all(|h| h.color == "#ff6b93" && h.duration == 6.0));
    }

    #[test]
    fn test_same_seed_same_decorations() {
        let mut a = spawner(42);
        let mut b = spawner(42);
        for _ in 0..20 {
            assert_eq!(a.heart(), b.heart());
            assert_eq!(a.confetti_piece(), b.confetti_piece());
        }
    }
}
