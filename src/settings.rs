//! Card settings and growth presets
//!
//! Every ink variant is one `GrowthConfig`. A host picks a `Preset` and may
//! override any field with a JSON document.

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::f32::consts::PI;

/// Uniform range `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub const fn fixed(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Draw a value. A degenerate span returns `min` without touching the RNG.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.random_range(self.min..self.max)
        } else {
            self.min
        }
    }
}

/// When a tree stops forking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StopLimit {
    /// Fraction of the surface height (from the bottom) the tree may cover
    HeightRatio(Span),
    /// Distance from the seed point beyond which no fork happens
    MaxDistance(Span),
}

/// How a pointer action plants roots
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SeedMode {
    /// One root on the bottom edge below the pointer, growing upward
    Drop,
    /// A ring of roots radiating from the pointer
    Splash {
        min_roots: u32,
        max_roots: u32,
        /// Random angular jitter added to each root (radians)
        jitter: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedConfig {
    pub mode: SeedMode,
    pub depth: u32,
    pub base_length: Span,
    pub stop: StopLimit,
}

/// Growth parameters shared by every branch of a simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthConfig {
    /// Pixels grown per tick
    pub growth_speed: Span,
    /// Fraction of the target length at which a node may fork
    pub branch_threshold: Span,
    /// Full width of the cone children are spread over (radians)
    pub branch_cone_angle: f32,
    /// Child length as a fraction of the parent's
    pub child_length: Span,
    /// Add `random(0, depth/2)` extra children on top of the base count
    pub extra_children: bool,
    /// Node lifetime in ticks
    pub lifetime: Span,
    /// Fraction of the lifetime after which the node fades
    pub fade_start_ratio: f32,
    /// Fade curve exponent; below 1 collapses faster than linear
    pub fade_exponent: f32,
    /// Opacity at or below which a node counts as dead
    pub death_opacity: f32,
    pub max_ink_lifetime: f32,
    pub min_ink_lifetime: f32,
    /// Ticks a splat must finish before its parent starts fading
    pub ink_fade_margin: f32,
    /// Per-tick splat chance at full opacity
    pub splat_chance: f32,
    pub splat_base_size: f32,
    pub splat_size_per_depth: f32,
    pub splat_spread: Span,
    pub splat_growth: Span,
    /// Stroke half-width per depth level at the origin
    pub taper_start: f32,
    /// Stroke half-width per depth level at the tip
    pub taper_end: f32,
    /// Reveal glyphs hit by ink splats
    pub collision_mode: bool,
    pub reveal_padding: f32,
    /// Population ceiling
    pub max_branches: usize,
    /// Scatter small blossoms on the last generations
    pub blossoms: bool,
    pub seed: SeedConfig,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Preset::Rising.growth()
    }
}

/// Named looks of the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    /// Ink trees rising from the bottom of the window
    #[default]
    Rising,
    /// Rising trees on a fixed 800x400 card
    Postcard,
    /// Rising trees with pink blossoms on the outer twigs
    Blossom,
    /// Radial splash that uncovers the name underneath
    Splash,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Rising => "Rising",
            Preset::Postcard => "Postcard",
            Preset::Blossom => "Blossom",
            Preset::Splash => "Splash",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rising" | "tree" => Some(Preset::Rising),
            "postcard" | "card" => Some(Preset::Postcard),
            "blossom" | "flower" => Some(Preset::Blossom),
            "splash" | "reveal" => Some(Preset::Splash),
            _ => None,
        }
    }

    /// Fixed drawing surface size, if the preset has one
    pub fn canvas_size(&self) -> Option<(u32, u32)> {
        match self {
            Preset::Postcard => Some((800, 400)),
            _ => None,
        }
    }

    pub fn growth(&self) -> GrowthConfig {
        let rising = GrowthConfig {
            growth_speed: Span::fixed(2.0),
            branch_threshold: Span::new(0.6, 0.9),
            branch_cone_angle: PI / 10.0 * 4.0,
            child_length: Span::new(0.5, 0.9),
            extra_children: true,
            lifetime: Span::new(150.0, 200.0),
            fade_start_ratio: 0.6,
            fade_exponent: 0.4,
            death_opacity: 0.05,
            max_ink_lifetime: 40.0,
            min_ink_lifetime: 10.0,
            ink_fade_margin: 10.0,
            splat_chance: 0.3,
            splat_base_size: 5.0,
            splat_size_per_depth: 3.0,
            splat_spread: Span::new(10.0, 25.0),
            splat_growth: Span::new(1.0, 1.5),
            taper_start: 0.6,
            taper_end: 0.3,
            collision_mode: false,
            reveal_padding: 10.0,
            max_branches: 2000,
            blossoms: false,
            seed: SeedConfig {
                mode: SeedMode::Drop,
                depth: 7,
                base_length: Span::new(120.0, 150.0),
                stop: StopLimit::HeightRatio(Span::new(0.3, 0.7)),
            },
        };

        match self {
            Preset::Rising => rising,
            Preset::Postcard => GrowthConfig {
                seed: SeedConfig {
                    mode: SeedMode::Drop,
                    depth: 6,
                    base_length: Span::new(80.0, 100.0),
                    stop: StopLimit::HeightRatio(Span::new(0.7, 0.8)),
                },
                ..rising
            },
            Preset::Blossom => GrowthConfig {
                splat_chance: 0.2,
                blossoms: true,
                ..rising
            },
            Preset::Splash => GrowthConfig {
                growth_speed: Span::new(3.0, 5.0),
                branch_threshold: Span::new(0.3, 0.5),
                branch_cone_angle: PI / 3.0,
                child_length: Span::new(0.3, 0.6),
                extra_children: false,
                lifetime: Span::new(80.0, 110.0),
                fade_start_ratio: 0.4,
                fade_exponent: 0.3,
                splat_chance: 0.5,
                splat_base_size: 10.0,
                splat_size_per_depth: 5.0,
                splat_spread: Span::new(15.0, 40.0),
                taper_start: 0.5,
                collision_mode: true,
                max_branches: 300,
                seed: SeedConfig {
                    mode: SeedMode::Splash {
                        min_roots: 6,
                        max_roots: 8,
                        jitter: 0.3,
                    },
                    depth: 4,
                    base_length: Span::new(30.0, 50.0),
                    stop: StopLimit::MaxDistance(Span::new(200.0, 250.0)),
                },
                ..rising
            },
        }
    }

    fn style(&self) -> InkStyle {
        match self {
            Preset::Rising | Preset::Blossom => InkStyle::default(),
            Preset::Postcard | Preset::Splash => InkStyle {
                paper_color: [1.0, 1.0, 1.0],
                ..InkStyle::default()
            },
        }
    }
}

/// Colours and alphas used when painting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InkStyle {
    pub ink_color: [f32; 3],
    pub paper_color: [f32; 3],
    /// Alpha of the per-frame paper wash that fades old ink
    pub wash_alpha: f32,
    /// Stroke alpha at full branch opacity
    pub stroke_alpha: f32,
}

impl Default for InkStyle {
    fn default() -> Self {
        Self {
            ink_color: [0.0, 0.0, 0.0],
            paper_color: [100.0 / 255.0, 100.0 / 255.0, 100.0 / 255.0],
            wash_alpha: 0.01,
            stroke_alpha: 0.9,
        }
    }
}

/// Card settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub preset: Preset,
    /// Pinned RNG seed; the host picks one when absent
    pub seed: Option<u64>,
    pub growth: GrowthConfig,
    pub style: InkStyle,
    /// Key that wipes the card
    pub clear_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

impl Settings {
    /// Create settings from a preset (applies preset defaults)
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            preset,
            seed: None,
            growth: preset.growth(),
            style: preset.style(),
            clear_key: "c".to_string(),
        }
    }

    /// Parse a partial JSON document layered over its preset's defaults.
    ///
    /// `{"preset": "Splash", "growth": {"max_branches": 120}}` yields the
    /// splash preset with a lower ceiling.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let overlay: Value = serde_json::from_str(json)?;
        let preset = overlay
            .get("preset")
            .and_then(Value::as_str)
            .and_then(Preset::from_str)
            .unwrap_or_default();

        let mut merged = serde_json::to_value(Self::from_preset(preset))?;
        merge(&mut merged, overlay);
        if let Value::Object(map) = &mut merged {
            map.insert("preset".to_string(), serde_json::to_value(preset)?);
        }
        serde_json::from_value(merged)
    }

    /// Parse host-supplied settings, falling back to defaults on bad input
    pub fn load_or_default(json: Option<&str>) -> Self {
        match json.map(str::trim).filter(|s| !s.is_empty()) {
            Some(json) => match Self::from_json(json) {
                Ok(settings) => {
                    log::info!("Loaded {} settings", settings.preset.as_str());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed ink settings: {}", e);
                    Self::default()
                }
            },
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Whether a key press should wipe the card
    pub fn is_clear_key(&self, key: &str) -> bool {
        key.eq_ignore_ascii_case(&self.clear_key)
    }
}

/// Recursively overlay `patch` onto `base`; objects merge, everything else replaces
fn merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
