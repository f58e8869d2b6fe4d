//! Simulation state: the owned collection of live branches
//!
//! Everything the growth process touches lives in `GrowthSimulator`, so a
//! teardown is a plain drop.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::f32::consts::{FRAC_PI_2, TAU};

use super::branch::{BranchNode, StopRule};
use super::reveal::{Rect, RevealDetector};
use crate::is_finite_point;
use crate::settings::{GrowthConfig, SeedConfig, SeedMode, StopLimit};

/// Complete growth state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GrowthSimulator {
    pub config: GrowthConfig,
    /// Run seed for reproducibility
    seed: u64,
    pub(super) rng: Pcg32,
    /// Live branches in insertion order
    pub(super) active: Vec<BranchNode>,
    /// Surface width and height in pixels
    pub(super) bounds: Vec2,
    /// Present only in collision mode
    pub(super) reveal: Option<RevealDetector>,
    pub(super) next_id: u32,
    /// Nodes ever created, roots and children
    pub(super) created_total: u64,
    /// Simulation tick counter
    pub(super) time_ticks: u64,
}

impl GrowthSimulator {
    /// Create an empty simulation with the given seed
    pub fn new(config: GrowthConfig, seed: u64, width: f32, height: f32) -> Self {
        let reveal = config
            .collision_mode
            .then(|| RevealDetector::new(config.reveal_padding));
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            active: Vec::new(),
            bounds: Vec2::new(width.max(0.0), height.max(0.0)),
            reveal,
            next_id: 1,
            created_total: 0,
            time_ticks: 0,
            config,
        }
    }

    pub fn seed_value(&self) -> u64 {
        self.seed
    }

    pub fn active(&self) -> &[BranchNode] {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn created_total(&self) -> u64 {
        self.created_total
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn reveal(&self) -> Option<&RevealDetector> {
        self.reveal.as_ref()
    }

    fn has_room(&self) -> bool {
        self.active.len() < self.config.max_branches
    }

    /// Add one root node. Dropped (None) when the ceiling is reached or the
    /// origin is not finite.
    pub fn plant(
        &mut self,
        origin: Vec2,
        direction: f32,
        length: f32,
        depth: u32,
        stop: StopRule,
    ) -> Option<u32> {
        if !self.has_room() || !is_finite_point(origin) {
            return None;
        }
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        let node = BranchNode::new(
            id,
            origin,
            direction,
            length,
            depth,
            stop,
            &self.config,
            &mut self.rng,
        );
        self.active.push(node);
        self.created_total += 1;
        Some(id)
    }

    /// Seed roots at a pointer position using the configured seeding.
    ///
    /// Returns how many roots were planted.
    pub fn seed(&mut self, point: Vec2, angle: Option<f32>) -> usize {
        let seed = self.config.seed.clone();
        self.seed_with(point, angle, &seed)
    }

    /// Seed roots with explicit parameters
    pub fn seed_with(&mut self, point: Vec2, angle: Option<f32>, seed: &SeedConfig) -> usize {
        if !is_finite_point(point) || !self.has_room() {
            return 0;
        }

        let stop = match seed.stop {
            StopLimit::HeightRatio(span) => {
                StopRule::HeightRatio(span.sample(&mut self.rng).clamp(0.0, 1.0))
            }
            StopLimit::MaxDistance(span) => StopRule::MaxDistance {
                origin: point,
                radius: span.sample(&mut self.rng).max(0.0),
            },
        };
        let length = seed.base_length.sample(&mut self.rng);

        let planted = match seed.mode {
            SeedMode::Drop => {
                // Ink falls to the bottom edge and rises from there
                let origin = if self.bounds.y > 0.0 {
                    Vec2::new(point.x, self.bounds.y)
                } else {
                    point
                };
                let direction = angle.unwrap_or(-FRAC_PI_2);
                usize::from(self.plant(origin, direction, length, seed.depth, stop).is_some())
            }
            SeedMode::Splash {
                min_roots,
                max_roots,
                jitter,
            } => {
                let roots = if max_roots > min_roots {
                    self.rng.random_range(min_roots..=max_roots)
                } else {
                    min_roots
                };
                let rotation = angle.unwrap_or(0.0);
                let mut planted = 0;
                for i in 0..roots {
                    let direction = TAU * i as f32 / roots as f32
                        + self.rng.random::<f32>() * jitter
                        + rotation;
                    if self.plant(point, direction, length, seed.depth, stop).is_some() {
                        planted += 1;
                    }
                }
                planted
            }
        };

        log::debug!(
            "Seeded {} root(s) at ({:.0}, {:.0}), {} active",
            planted,
            point.x,
            point.y,
            self.active.len()
        );
        planted
    }

    /// Drop every branch at once (no fade-out). Revealed glyphs stay revealed.
    pub fn clear(&mut self) {
        log::debug!("Cleared {} branches", self.active.len());
        self.active.clear();
    }

    /// New surface size. In-flight branches keep their coordinates.
    pub fn resize(&mut self, width: f32, height: f32) {
        if width.is_finite() && height.is_finite() {
            self.bounds = Vec2::new(width.max(0.0), height.max(0.0));
            log::debug!("Simulation bounds now {}x{}", self.bounds.x, self.bounds.y);
        }
    }

    /// Replace the tracked glyph boxes (collision mode only)
    pub fn set_glyph_regions(&mut self, boxes: impl IntoIterator<Item = Rect>) {
        if let Some(reveal) = self.reveal.as_mut() {
            reveal.set_regions(boxes);
        }
    }

    /// Glyph indices revealed since the last call
    pub fn take_newly_revealed(&mut self) -> Vec<usize> {
        self.reveal
            .as_mut()
            .map(RevealDetector::take_newly_revealed)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Preset, Span};

    #[test]
    fn test_drop_seed_plants_on_bottom_edge() {
        let mut sim = GrowthSimulator::new(Preset::Rising.growth(), 1, 800.0, 600.0);
        assert_eq!(sim.seed(Vec2::new(250.0, 100.0), None), 1);
        let root = &sim.active()[0];
        assert_eq!(root.origin(), Vec2::new(250.0, 600.0));
        assert!((root.direction() + FRAC_PI_2).abs() < 1e-6);
        assert_eq!(root.depth(), 7);
        assert!(root.target_length() >= 120.0 && root.target_length() < 150.0);
    }

    #[test]
    fn test_splash_seed_plants_a_ring() {
        let mut sim = GrowthSimulator::new(Preset::Splash.growth(), 2, 800.0, 600.0);
        let planted = sim.seed(Vec2::new(400.0, 300.0), None);
        assert!((6..=8).contains(&planted));
        assert_eq!(sim.len(), planted);
        for root in sim.active() {
            assert_eq!(root.origin(), Vec2::new(400.0, 300.0));
            assert!(matches!(root.stop_rule(), StopRule::MaxDistance { .. }));
        }
    }

    #[test]
    fn test_seed_respects_ceiling() {
        let config = GrowthConfig {
            max_branches: 10,
            ..Preset::Splash.growth()
        };
        let mut sim = GrowthSimulator::new(config, 3, 800.0, 600.0);
        while sim.len() < 10 {
            sim.seed(Vec2::new(100.0, 100.0), None);
        }
        assert_eq!(sim.len(), 10);
        assert_eq!(sim.seed(Vec2::new(200.0, 200.0), None), 0);
        assert_eq!(sim.len(), 10);
    }

    #[test]
    fn test_non_finite_seed_is_ignored() {
        let mut sim = GrowthSimulator::new(Preset::Rising.growth(), 4, 800.0, 600.0);
        assert_eq!(sim.seed(Vec2::new(f32::NAN, 10.0), None), 0);
        assert!(sim.is_empty());
        assert_eq!(sim.created_total(), 0);
    }

    #[test]
    fn test_clear_empties_immediately() {
        let mut sim = GrowthSimulator::new(Preset::Splash.growth(), 5, 800.0, 600.0);
        sim.seed(Vec2::new(400.0, 300.0), None);
        assert!(!sim.is_empty());
        sim.clear();
        assert!(sim.is_empty());
    }

    #[test]
    fn test_resize_keeps_branches_in_place() {
        let mut sim = GrowthSimulator::new(Preset::Rising.growth(), 6, 800.0, 600.0);
        sim.seed(Vec2::new(300.0, 0.0), None);
        let before = sim.active()[0].origin();
        sim.resize(1024.0, 768.0);
        assert_eq!(sim.bounds(), Vec2::new(1024.0, 768.0));
        assert_eq!(sim.active()[0].origin(), before);
    }

    #[test]
    fn test_explicit_seed_overrides_config() {
        let mut sim = GrowthSimulator::new(Preset::Rising.growth(), 7, 800.0, 600.0);
        let seed = SeedConfig {
            mode: SeedMode::Drop,
            depth: 3,
            base_length: Span::fixed(100.0),
            stop: StopLimit::HeightRatio(Span::fixed(1.0)),
        };
        assert_eq!(sim.seed_with(Vec2::new(10.0, 10.0), Some(-1.0), &seed), 1);
        let root = &sim.active()[0];
        assert_eq!(root.depth(), 3);
        assert_eq!(root.target_length(), 100.0);
        assert_eq!(root.direction(), -1.0);
    }

    #[test]
    fn test_glyph_regions_need_collision_mode() {
        let rect = Rect::from_center_size(Vec2::ZERO, Vec2::splat(10.0));
        let mut plain = GrowthSimulator::new(Preset::Rising.growth(), 8, 800.0, 600.0);
        plain.set_glyph_regions([rect]);
        assert!(plain.reveal().is_none());

        let mut splash = GrowthSimulator::new(Preset::Splash.growth(), 8, 800.0, 600.0);
        splash.set_glyph_regions([rect]);
        assert_eq!(splash.reveal().map(|r| r.regions().len()), Some(1));
    }
}
