//! Property tests for the growth simulation

use std::collections::HashMap;

use glam::Vec2;
use ink_card::settings::{GrowthConfig, Preset};
use ink_card::sim::{GrowthSimulator, Rect};
use proptest::prelude::*;

/// Upper bound on ticks for any tree to die out
const TICK_LIMIT: u64 = 5_000;

fn preset() -> impl Strategy<Value = Preset> {
    prop_oneof![
        Just(Preset::Rising),
        Just(Preset::Postcard),
        Just(Preset::Blossom),
        Just(Preset::Splash),
    ]
}

fn seed_points() -> impl Strategy<Value = Vec<(f32, f32)>> {
    prop::collection::vec((0.0f32..800.0, 0.0f32..600.0), 1..4)
}

fn simulator(preset: Preset, max_branches: usize, seed: u64) -> GrowthSimulator {
    let config = GrowthConfig {
        max_branches,
        ..preset.growth()
    };
    GrowthSimulator::new(config, seed, 800.0, 600.0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn population_never_exceeds_ceiling(
        preset in preset(),
        max_branches in 1usize..120,
        seed in any::<u64>(),
        points in seed_points(),
    ) {
        let mut sim = simulator(preset, max_branches, seed);
        for (x, y) in points {
            sim.seed(Vec2::new(x, y), None);
            prop_assert!(sim.len() <= max_branches);
        }
        for _ in 0..400 {
            sim.tick();
            prop_assert!(sim.len() <= max_branches);
        }
    }

    #[test]
    fn opacity_stays_in_unit_range_and_only_fades(
        preset in preset(),
        seed in any::<u64>(),
        points in seed_points(),
    ) {
        let mut sim = simulator(preset, 150, seed);
        for (x, y) in points {
            sim.seed(Vec2::new(x, y), None);
        }

        let mut fading: HashMap<u32, f32> = HashMap::new();
        while !sim.is_empty() && sim.time_ticks() < TICK_LIMIT {
            sim.tick();
            for node in sim.active() {
                let opacity = node.opacity();
                prop_assert!((0.0..=1.0).contains(&opacity));
                for splat in node.splats() {
                    let rendered = splat.rendered_opacity(opacity);
                    prop_assert!((0.0..=1.0).contains(&rendered));
                }
                if node.age() as f32 > node.fade_start_age() {
                    if let Some(&last) = fading.get(&node.id) {
                        prop_assert!(opacity <= last);
                    }
                    fading.insert(node.id, opacity);
                }
            }
        }
    }

    #[test]
    fn branching_is_one_shot_and_trees_terminate(
        preset in preset(),
        seed in any::<u64>(),
        points in seed_points(),
    ) {
        let mut sim = simulator(preset, 150, seed);
        for (x, y) in points {
            sim.seed(Vec2::new(x, y), None);
        }

        let mut branched: HashMap<u32, bool> = HashMap::new();
        while !sim.is_empty() && sim.time_ticks() < TICK_LIMIT {
            sim.tick();
            for node in sim.active() {
                if node.depth() == 0 {
                    prop_assert!(!node.has_branched());
                }
                let before = branched.insert(node.id, node.has_branched());
                if before == Some(true) {
                    prop_assert!(node.has_branched());
                }
            }
        }
        prop_assert!(sim.is_empty(), "still {} live after {} ticks", sim.len(), TICK_LIMIT);
    }

    #[test]
    fn same_seed_same_run(
        preset in preset(),
        seed in any::<u64>(),
        points in seed_points(),
    ) {
        let run = |seed: u64| {
            let mut sim = simulator(preset, 150, seed);
            for &(x, y) in &points {
                sim.seed(Vec2::new(x, y), None);
            }
            let mut history = Vec::new();
            for _ in 0..200 {
                sim.tick();
                history.push((sim.len(), sim.created_total()));
            }
            history
        };
        prop_assert_eq!(run(seed), run(seed));
    }

    #[test]
    fn revealed_glyphs_stay_revealed(
        seed in any::<u64>(),
        glyphs in prop::collection::vec((0.0f32..800.0, 0.0f32..600.0), 1..8),
        point in (200.0f32..600.0, 150.0f32..450.0),
    ) {
        let mut sim = simulator(Preset::Splash, 300, seed);
        sim.set_glyph_regions(
            glyphs
                .iter()
                .map(|&(x, y)| Rect::from_center_size(Vec2::new(x, y), Vec2::new(40.0, 60.0))),
        );
        sim.seed(Vec2::new(point.0, point.1), None);

        let mut seen = vec![false; glyphs.len()];
        while !sim.is_empty() && sim.time_ticks() < TICK_LIMIT {
            sim.tick();
            let reveal = sim.reveal().expect("splash preset tracks glyphs");
            for (i, was) in seen.iter_mut().enumerate() {
                let now = reveal.is_revealed(i);
                prop_assert!(!(*was && !now));
                *was = now;
            }
        }
        let drained = sim.take_newly_revealed();
        prop_assert_eq!(drained.len(), seen.iter().filter(|&&r| r).count());
    }
}
