//! Branch nodes - single growing ink strokes
//!
//! A node grows along a fixed ray, forks once, drops splats while growing and
//! fades out on its own clock.

use glam::Vec2;
use rand::Rng;

use super::reveal::RevealDetector;
use super::splat::{InkSplatEmitter, Splat};
use crate::polar_to_cartesian;
use crate::settings::GrowthConfig;

/// Chance per splat that a late-generation twig also blossoms
const TWIG_BLOSSOM_CHANCE: f32 = 0.01;
/// Extra blossom chance once a twig is nearly fully grown
const TIP_BLOSSOM_CHANCE: f32 = 0.03;
/// Chance per tick that a ready fork point blossoms
const FORK_BLOSSOM_CHANCE: f32 = 0.1;

/// Where a tree stops forking
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopRule {
    /// No forks once the tip rises above `ratio` of the surface height,
    /// measured from the bottom edge
    HeightRatio(f32),
    /// No forks once the tip is farther than `radius` from the seed point
    MaxDistance { origin: Vec2, radius: f32 },
}

impl StopRule {
    pub fn halts(&self, tip: Vec2, bounds: Vec2) -> bool {
        match *self {
            StopRule::HeightRatio(ratio) => tip.y < bounds.y * (1.0 - ratio),
            StopRule::MaxDistance { origin, radius } => tip.distance(origin) > radius,
        }
    }
}

/// What a node can see of the world while it grows
#[derive(Debug, Clone, Copy)]
pub struct GrowthContext<'a> {
    pub config: &'a GrowthConfig,
    /// Surface width and height in pixels
    pub bounds: Vec2,
}

/// Small pink flower painted over the ink
#[derive(Debug, Clone, PartialEq)]
pub struct Blossom {
    pub pos: Vec2,
    pub size: f32,
    /// Hue in degrees
    pub hue: f32,
    /// Lightness (0-1)
    pub lightness: f32,
    pub opacity: f32,
}

impl Blossom {
    fn random<R: Rng + ?Sized>(pos: Vec2, rng: &mut R) -> Self {
        Self {
            pos,
            size: 1.0 + rng.random::<f32>() * 3.0,
            hue: (330.0 + rng.random::<f32>() * 30.0) % 360.0,
            lightness: 0.7 + rng.random::<f32>() * 0.2,
            opacity: rng.random::<f32>() * 0.4,
        }
    }
}

/// One growing ink stroke with its splats
#[derive(Debug, Clone)]
pub struct BranchNode {
    pub id: u32,
    origin: Vec2,
    direction: f32,
    target_length: f32,
    progress: f32,
    depth: u32,
    branch_threshold_ratio: f32,
    has_branched: bool,
    growth_speed: f32,
    age: u32,
    lifetime: f32,
    fade_start_age: f32,
    opacity: f32,
    stop: StopRule,
    splats: Vec<Splat>,
    blossoms: Vec<Blossom>,
    fork_blossom_added: bool,
}

impl BranchNode {
    /// Create a node; non-finite or negative lengths collapse to zero
    #[allow(clippy::too_many_arguments)]
    pub fn new<R: Rng + ?Sized>(
        id: u32,
        origin: Vec2,
        direction: f32,
        target_length: f32,
        depth: u32,
        stop: StopRule,
        config: &GrowthConfig,
        rng: &mut R,
    ) -> Self {
        let target_length = if target_length.is_finite() {
            target_length.max(0.0)
        } else {
            0.0
        };
        let branch_threshold_ratio = config.branch_threshold.sample(rng).clamp(0.01, 0.99);
        let lifetime = config.lifetime.sample(rng).max(1.0);
        let growth_speed = config.growth_speed.sample(rng).max(0.0);

        Self {
            id,
            origin,
            direction: if direction.is_finite() { direction } else { 0.0 },
            target_length,
            progress: 0.0,
            depth,
            branch_threshold_ratio,
            has_branched: false,
            growth_speed,
            age: 0,
            lifetime,
            fade_start_age: lifetime * config.fade_start_ratio.clamp(0.0, 1.0),
            opacity: 1.0,
            stop,
            splats: Vec::new(),
            blossoms: Vec::new(),
            fork_blossom_added: false,
        }
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn target_length(&self) -> f32 {
        self.target_length
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn has_branched(&self) -> bool {
        self.has_branched
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    pub fn fade_start_age(&self) -> f32 {
        self.fade_start_age
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn stop_rule(&self) -> StopRule {
        self.stop
    }

    pub fn splats(&self) -> &[Splat] {
        &self.splats
    }

    pub fn blossoms(&self) -> &[Blossom] {
        &self.blossoms
    }

    /// Current end of the stroke
    pub fn tip(&self) -> Vec2 {
        self.origin + polar_to_cartesian(self.progress, self.direction)
    }

    pub fn is_growing(&self) -> bool {
        self.progress < self.target_length
    }

    fn can_blossom(&self) -> bool {
        self.depth == 1 || self.depth == 2
    }

    /// Advance one tick: grow, fade, drop and age splats.
    ///
    /// Returns whether the node is still alive.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        ctx: &GrowthContext,
        rng: &mut R,
        mut reveal: Option<&mut RevealDetector>,
    ) -> bool {
        let config = ctx.config;
        self.age = self.age.saturating_add(1);

        if self.is_growing() {
            self.progress = (self.progress + self.growth_speed).min(self.target_length);
        }

        let age = self.age as f32;
        if age > self.fade_start_age {
            let fade_span = self.lifetime - self.fade_start_age;
            let fade = if fade_span > 0.0 {
                ((age - self.fade_start_age) / fade_span).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let next = (1.0 - fade.powf(config.fade_exponent)).clamp(0.0, 1.0);
            // Never brighten once fading has begun
            self.opacity = self.opacity.min(next);
        }

        if self.is_growing() {
            self.drop_splat(config, rng, reveal.as_deref_mut());
        }

        self.splats.retain_mut(|splat| {
            let alive = splat.advance();
            if let Some(detector) = reveal.as_deref_mut() {
                detector.check(splat.pos, splat.current_size());
            }
            alive
        });

        self.is_alive(config)
    }

    pub fn is_alive(&self, config: &GrowthConfig) -> bool {
        (self.age as f32) < self.lifetime && self.opacity > config.death_opacity
    }

    fn drop_splat<R: Rng + ?Sized>(
        &mut self,
        config: &GrowthConfig,
        rng: &mut R,
        reveal: Option<&mut RevealDetector>,
    ) {
        let emitter = InkSplatEmitter::new(config);
        if !emitter.should_emit(self.opacity, rng) {
            return;
        }

        let tip = self.tip();
        let until_fade = self.fade_start_age - self.age as f32;
        let splat = emitter.emit(tip, self.depth, self.opacity, until_fade, rng);
        if let Some(detector) = reveal {
            detector.check(splat.pos, splat.current_size());
        }
        self.splats.push(splat);

        if config.blossoms && self.can_blossom() {
            if rng.random::<f32>() < TWIG_BLOSSOM_CHANCE {
                self.blossoms.push(Blossom::random(tip, rng));
            }
            if self.target_length > 0.0
                && self.progress / self.target_length > 0.9
                && rng.random::<f32>() < TIP_BLOSSOM_CHANCE
            {
                self.blossoms.push(Blossom::random(tip, rng));
            }
        }
    }

    /// True once the stroke has grown past its fork point and not yet forked
    pub fn is_ready_to_branch(&self) -> bool {
        !self.has_branched && self.progress >= self.target_length * self.branch_threshold_ratio
    }

    /// Roll for the one-shot blossom at a ready fork point
    pub fn maybe_blossom_at_fork<R: Rng + ?Sized>(&mut self, config: &GrowthConfig, rng: &mut R) {
        if config.blossoms
            && !self.fork_blossom_added
            && self.is_ready_to_branch()
            && rng.random::<f32>() < FORK_BLOSSOM_CHANCE
        {
            self.blossoms.push(Blossom::random(self.tip(), rng));
            self.fork_blossom_added = true;
        }
    }

    /// Fork into children rooted at the current tip.
    ///
    /// Returns nothing for exhausted depth, zero length, a tip past the stop
    /// rule, or a node that already forked. `next_id` is advanced per child.
    pub fn spawn_children<R: Rng + ?Sized>(
        &mut self,
        ctx: &GrowthContext,
        rng: &mut R,
        next_id: &mut u32,
    ) -> Vec<BranchNode> {
        if self.has_branched || self.depth == 0 || self.target_length <= 0.0 {
            return Vec::new();
        }
        let tip = self.tip();
        if self.stop.halts(tip, ctx.bounds) {
            return Vec::new();
        }

        let config = ctx.config;
        let base = (self.depth / 2).max(1);
        let count = if config.extra_children {
            base + rng.random_range(0..base)
        } else {
            base
        };

        let children = (0..count)
            .map(|_| {
                let offset = (rng.random::<f32>() - 0.5) * config.branch_cone_angle;
                let length = self.target_length * config.child_length.sample(rng);
                let id = *next_id;
                *next_id = next_id.wrapping_add(1);
                BranchNode::new(
                    id,
                    tip,
                    self.direction + offset,
                    length,
                    self.depth - 1,
                    self.stop,
                    config,
                    rng,
                )
            })
            .collect();

        self.has_branched = true;
        children
    }
}
