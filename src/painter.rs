//! Paints a simulation frame onto a `Surface`
//!
//! Painting is additive: each frame lays a faint paper wash over whatever is
//! already on the surface, so old ink lingers as a trail.

use crate::settings::InkStyle;
use crate::sim::{BranchNode, GrowthSimulator};
use crate::surface::{Stroke, Surface, hsla, rgba};

/// Narrowest stroke half-width at the origin
const MIN_START_WIDTH: f32 = 0.5;
/// Narrowest stroke half-width at the tip
const MIN_END_WIDTH: f32 = 0.2;

/// Paint one frame: wash, branches with their splats, then blossoms on top
pub fn paint(sim: &GrowthSimulator, style: &InkStyle, surface: &mut impl Surface) {
    surface.wash(rgba(style.paper_color, style.wash_alpha));

    for node in sim.active() {
        paint_branch(node, sim, style, surface);
    }

    for blossom in sim.active().iter().flat_map(BranchNode::blossoms) {
        let outer = hsla(
            blossom.hue,
            0.8,
            blossom.lightness - 0.05,
            blossom.opacity * 0.5,
        );
        surface.fill_circle(blossom.pos, blossom.size * 1.5, outer);
        let inner = hsla(blossom.hue, 0.9, blossom.lightness, blossom.opacity);
        surface.fill_circle(blossom.pos, blossom.size * 0.6, inner);
    }
}

fn paint_branch(
    node: &BranchNode,
    sim: &GrowthSimulator,
    style: &InkStyle,
    surface: &mut impl Surface,
) {
    let config = &sim.config;
    if node.progress() > 0.0 {
        let depth = node.depth() as f32;
        surface.stroke_line(&Stroke {
            from: node.origin(),
            to: node.tip(),
            start_width: (depth * config.taper_start).max(MIN_START_WIDTH),
            end_width: (depth * config.taper_end).max(MIN_END_WIDTH),
            color: rgba(style.ink_color, node.opacity() * style.stroke_alpha),
        });
    }

    for splat in node.splats() {
        let alpha = splat.rendered_opacity(node.opacity());
        if alpha > 0.0 {
            surface.fill_circle(
                splat.pos,
                splat.current_size(),
                rgba(style.ink_color, alpha),
            );
        }
    }
}

/// Wipe the surface back to bare paper
pub fn clear(style: &InkStyle, surface: &mut impl Surface) {
    surface.wash(rgba(style.paper_color, 1.0));
}
