//! Ink card controller
//!
//! Owns the simulator, the frame scheduler and the input queued between
//! frames. A host forwards pointer, key and resize events and calls `frame`
//! once per animation frame with its drawing surface.

use glam::Vec2;

use crate::frame::FrameScheduler;
use crate::painter;
use crate::settings::Settings;
use crate::sim::{GrowthSimulator, Rect, TickInput};
use crate::surface::Surface;

pub struct InkCard {
    sim: GrowthSimulator,
    settings: Settings,
    scheduler: FrameScheduler,
    /// Input queued since the last frame
    input: TickInput,
}

impl InkCard {
    /// Create a card on a `width` x `height` surface.
    ///
    /// A seed pinned in the settings wins over `seed`.
    pub fn new(settings: Settings, seed: u64, width: f32, height: f32) -> Self {
        let seed = settings.seed.unwrap_or(seed);
        log::info!(
            "Ink card: {} preset, seed {}, {}x{}",
            settings.preset.as_str(),
            seed,
            width,
            height
        );
        Self {
            sim: GrowthSimulator::new(settings.growth.clone(), seed, width, height),
            settings,
            scheduler: FrameScheduler::new(),
            input: TickInput::default(),
        }
    }

    pub fn sim(&self) -> &GrowthSimulator {
        &self.sim
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Queue a seed at a surface position
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.input.seeds.push(Vec2::new(x, y));
    }

    /// Handle a key press; returns true if it was consumed
    pub fn key(&mut self, key: &str) -> bool {
        if self.settings.is_clear_key(key) {
            self.input.clear = true;
            true
        } else {
            false
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.input.resize = Some(Vec2::new(width, height));
    }

    /// Glyph boxes in surface pixels (ignored outside reveal mode)
    pub fn set_glyph_regions(&mut self, boxes: impl IntoIterator<Item = Rect>) {
        self.sim.set_glyph_regions(boxes);
    }

    pub fn take_newly_revealed(&mut self) -> Vec<usize> {
        self.sim.take_newly_revealed()
    }

    /// Advance and paint one animation frame; returns the number of ticks run
    pub fn frame(&mut self, now_ms: f64, surface: &mut impl Surface) -> u32 {
        let input = std::mem::take(&mut self.input);
        if input.clear {
            painter::clear(&self.settings.style, surface);
        }
        self.sim.apply_input(&input);

        let ticks = self.scheduler.due_ticks(now_ms);
        for _ in 0..ticks {
            self.sim.tick();
            painter::paint(&self.sim, &self.settings.style, surface);
        }
        ticks
    }
}
