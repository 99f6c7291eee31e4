use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::geom::point;
use crate::layers::LayerIndex;
use crate::rng::XorShift64Star;
use crate::tree::Tree;
use rustc_hash::FxHashSet;

/// Places the root at the canvas center and scatters every other node at random.
///
/// No two nodes share an x value, and no two share a y value: force terms divide by the
/// distance between nodes, so axis collisions are redrawn up front.
///
/// Fails with [`Error::InvalidConfig`] when the sampling range is not finite or is too narrow to
/// hold a distinct value per node.
pub fn initialize_positions(
    tree: &mut Tree,
    layers: &LayerIndex,
    config: &LayoutConfig,
) -> Result<()> {
    config.validate()?;
    let mut rng = XorShift64Star::new(config.seed);

    let w = config.canvas_width;
    let h = config.canvas_height;
    let (x_lo, x_hi) = (-config.spawn_spread * w, (1.0 + config.spawn_spread) * w);
    let (y_lo, y_hi) = (-config.spawn_spread * h, (1.0 + config.spawn_spread) * h);

    let root = point(w / 2.0, h / 2.0);
    tree.set_position(tree.root(), root);

    let mut used_x: FxHashSet<u64> = FxHashSet::default();
    let mut used_y: FxHashSet<u64> = FxHashSet::default();
    used_x.insert(root.x.to_bits());
    used_y.insert(root.y.to_bits());

    for (_, layer) in layers.iter().skip(1) {
        for &v in layer {
            let x = draw_unique(&mut rng, x_lo, x_hi, &mut used_x).ok_or_else(|| {
                Error::InvalidConfig {
                    field: "canvasWidth",
                    reason: format!("no distinct x left in [{x_lo}, {x_hi})"),
                }
            })?;
            let y = draw_unique(&mut rng, y_lo, y_hi, &mut used_y).ok_or_else(|| {
                Error::InvalidConfig {
                    field: "canvasHeight",
                    reason: format!("no distinct y left in [{y_lo}, {y_hi})"),
                }
            })?;
            tree.set_position(v, point(x, y));
        }
    }

    tracing::debug!(
        nodes = tree.len(),
        seed = config.seed,
        "initial positions assigned"
    );
    Ok(())
}

/// Redraws before giving up on a range that has run out of distinct values.
const MAX_DRAWS: usize = 1024;

fn draw_unique(
    rng: &mut XorShift64Star,
    lo: f64,
    hi: f64,
    used: &mut FxHashSet<u64>,
) -> Option<f64> {
    for _ in 0..MAX_DRAWS {
        let v = rng.next_f64_range(lo, hi);
        if !v.is_finite() {
            return None;
        }
        // `+0.0` and `-0.0` compare equal but have different bits.
        let v = if v == 0.0 { 0.0 } else { v };
        if used.insert(v.to_bits()) {
            return Some(v);
        }
    }
    None
}
