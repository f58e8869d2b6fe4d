//! Ink splats - short-lived blots dropped around a growing branch tip

use glam::Vec2;
use rand::Rng;

use crate::settings::GrowthConfig;

/// Exponent of the splat fade curve
const SPLAT_FADE_EXPONENT: f32 = 0.7;

/// A decorative ink blot owned by one branch
#[derive(Debug, Clone, PartialEq)]
pub struct Splat {
    pub pos: Vec2,
    pub base_size: f32,
    /// Peak opacity (0-1)
    pub opacity: f32,
    pub growth_factor: f32,
    age: u32,
    lifetime: f32,
}

impl Splat {
    pub fn new(pos: Vec2, base_size: f32, opacity: f32, lifetime: f32, growth_factor: f32) -> Self {
        Self {
            pos,
            base_size: base_size.max(0.0),
            opacity: opacity.clamp(0.0, 1.0),
            growth_factor: growth_factor.max(0.0),
            age: 0,
            lifetime: lifetime.max(0.0),
        }
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    /// Radius after spreading for `age` ticks
    pub fn current_size(&self) -> f32 {
        self.base_size * (1.0 + (self.age as f32 / 100.0) * self.growth_factor)
    }

    /// Opacity to paint with, given the owning branch's opacity
    pub fn rendered_opacity(&self, parent_opacity: f32) -> f32 {
        let remaining = if self.lifetime > 0.0 {
            (1.0 - self.age as f32 / self.lifetime).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (self.opacity * remaining.powf(SPLAT_FADE_EXPONENT) * parent_opacity.clamp(0.0, 1.0))
            .clamp(0.0, 1.0)
    }

    pub fn is_expired(&self) -> bool {
        self.age as f32 >= self.lifetime
    }

    /// Age by one tick; returns false once the splat should be removed
    pub fn advance(&mut self) -> bool {
        self.age = self.age.saturating_add(1);
        !self.is_expired()
    }
}

/// Decides when and how a branch drops splats
#[derive(Debug, Clone, Copy)]
pub struct InkSplatEmitter<'a> {
    config: &'a GrowthConfig,
}

impl<'a> InkSplatEmitter<'a> {
    pub fn new(config: &'a GrowthConfig) -> Self {
        Self { config }
    }

    /// Roll for a splat this tick; fading branches drop fewer
    pub fn should_emit<R: Rng + ?Sized>(&self, parent_opacity: f32, rng: &mut R) -> bool {
        rng.random::<f32>() < self.config.splat_chance * parent_opacity.clamp(0.0, 1.0)
    }

    /// Splat lifetime, capped so it is gone before the parent starts to fade
    pub fn lifetime_for(&self, ticks_until_fade: f32) -> f32 {
        let ticks_until_fade = ticks_until_fade.max(0.0);
        self.config.max_ink_lifetime.min(
            self.config
                .min_ink_lifetime
                .max(ticks_until_fade - self.config.ink_fade_margin),
        )
    }

    /// Create a splat scattered around `tip`
    pub fn emit<R: Rng + ?Sized>(
        &self,
        tip: Vec2,
        depth: u32,
        parent_opacity: f32,
        ticks_until_fade: f32,
        rng: &mut R,
    ) -> Splat {
        let size = self.config.splat_base_size
            + rng.random::<f32>() * depth as f32 * self.config.splat_size_per_depth;
        let spread = self.config.splat_spread.sample(rng);
        let offset = Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5) * spread;
        let opacity = parent_opacity.min(0.1 + rng.random::<f32>() * 0.2);
        let growth = self.config.splat_growth.sample(rng);

        Splat::new(
            tip + offset,
            size,
            opacity,
            self.lifetime_for(ticks_until_fade),
            growth,
        )
    }
}
