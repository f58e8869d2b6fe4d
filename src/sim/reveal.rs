//! Glyph reveal by ink contact
//!
//! Each tracked glyph starts hidden and flips to revealed the first time a
//! splat's circle touches its padded box. The flip is permanent.

use glam::Vec2;

/// Axis-aligned box in surface pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        Self::new(center - half, center + half)
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }
}

/// A glyph's hit box and whether ink has reached it
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRegion {
    pub bounds: Rect,
    revealed: bool,
}

impl GlyphRegion {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            revealed: false,
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }
}

/// Tracks glyph regions and reveals them on splat contact
#[derive(Debug, Clone, Default)]
pub struct RevealDetector {
    regions: Vec<GlyphRegion>,
    padding: f32,
    /// Indices revealed since the last drain, in reveal order
    newly_revealed: Vec<usize>,
}

impl RevealDetector {
    pub fn new(padding: f32) -> Self {
        Self {
            regions: Vec::new(),
            padding: padding.max(0.0),
            newly_revealed: Vec::new(),
        }
    }

    /// Replace the tracked boxes (after layout or resize).
    ///
    /// Regions keep the revealed flag of the glyph at the same index.
    pub fn set_regions(&mut self, boxes: impl IntoIterator<Item = Rect>) {
        let previous = std::mem::take(&mut self.regions);
        self.regions = boxes
            .into_iter()
            .enumerate()
            .map(|(i, bounds)| GlyphRegion {
                bounds,
                revealed: previous.get(i).is_some_and(GlyphRegion::is_revealed),
            })
            .collect();
        self.newly_revealed.retain(|&i| i < self.regions.len());
    }

    pub fn regions(&self) -> &[GlyphRegion] {
        &self.regions
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.regions.get(index).is_some_and(GlyphRegion::is_revealed)
    }

    pub fn revealed_count(&self) -> usize {
        self.regions.iter().filter(|r| r.revealed).count()
    }

    pub fn all_revealed(&self) -> bool {
        self.regions.iter().all(|r| r.revealed)
    }

    /// Test a splat circle against every hidden glyph; returns how many flipped
    pub fn check(&mut self, center: Vec2, radius: f32) -> usize {
        if !(center.x.is_finite() && center.y.is_finite() && radius.is_finite()) {
            return 0;
        }

        let mut hits = 0;
        for (i, region) in self.regions.iter_mut().enumerate() {
            if region.revealed {
                continue;
            }
            let reach = region.bounds.half_extents() + Vec2::splat(self.padding + radius.max(0.0));
            let d = (center - region.bounds.center()).abs();
            if d.x <= reach.x && d.y <= reach.y {
                region.revealed = true;
                self.newly_revealed.push(i);
                hits += 1;
            }
        }
        if hits > 0 {
            log::debug!("Revealed {} glyph(s) at ({:.0}, {:.0})", hits, center.x, center.y);
        }
        hits
    }

    /// Drain the indices revealed since the last call
    pub fn take_newly_revealed(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.newly_revealed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(x: f32, y: f32) -> Rect {
        Rect::from_center_size(Vec2::new(x, y), Vec2::new(40.0, 60.0))
    }

    #[test]
    fn test_hit_within_padding() {
        let mut detector = RevealDetector::new(10.0);
        detector.set_regions([glyph(100.0, 100.0)]);

        // Half width 20 + padding 10 + radius 5 = 35
        assert_eq!(detector.check(Vec2::new(136.0, 100.0), 5.0), 0);
        assert_eq!(detector.check(Vec2::new(135.0, 100.0), 5.0), 1);
        assert!(detector.is_revealed(0));
    }

    #[test]
    fn test_reveal_is_write_once() {
        let mut detector = RevealDetector::new(10.0);
        detector.set_regions([glyph(0.0, 0.0), glyph(500.0, 0.0)]);

        assert_eq!(detector.check(Vec2::ZERO, 1.0), 1);
        // Already revealed glyphs are skipped
        assert_eq!(detector.check(Vec2::ZERO, 1.0), 0);
        assert_eq!(detector.take_newly_revealed(), vec![0]);
        assert!(detector.take_newly_revealed().is_empty());
        assert!(detector.is_revealed(0));
        assert!(!detector.is_revealed(1));
    }

    #[test]
    fn test_growing_splat_reveals_later() {
        let mut detector = RevealDetector::new(0.0);
        detector.set_regions([glyph(100.0, 0.0)]);
        let center = Vec2::new(50.0, 0.0);

        assert_eq!(detector.check(center, 20.0), 0);
        assert_eq!(detector.check(center, 30.0), 1);
    }

    #[test]
    fn test_set_regions_keeps_flags_by_index() {
        let mut detector = RevealDetector::new(10.0);
        detector.set_regions([glyph(0.0, 0.0), glyph(300.0, 0.0)]);
        detector.check(Vec2::ZERO, 1.0);

        // Layout moved after a resize
        detector.set_regions([glyph(10.0, 10.0), glyph(320.0, 10.0), glyph(640.0, 10.0)]);
        assert!(detector.is_revealed(0));
        assert!(!detector.is_revealed(1));
        assert!(!detector.is_revealed(2));
        assert_eq!(detector.revealed_count(), 1);
    }

    #[test]
    fn test_non_finite_splat_is_ignored() {
        let mut detector = RevealDetector::new(10.0);
        detector.set_regions([glyph(0.0, 0.0)]);
        assert_eq!(detector.check(Vec2::new(f32::NAN, 0.0), 5.0), 0);
        assert_eq!(detector.check(Vec2::ZERO, f32::INFINITY), 0);
        assert!(!detector.all_revealed());
    }
}
