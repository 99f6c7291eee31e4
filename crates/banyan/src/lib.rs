#![forbid(unsafe_code)]

//! Headless force-directed tree layout with an edge-crossing metric.
//!
//! Pipeline: [`Record`]s → [`Tree`] → [`LayerIndex`] → [`initialize_positions`] →
//! [`ForceSolver`] → [`count_crossings`]. [`layout`] runs all of it; the individual stages are
//! public for callers that want to drive the solver one step at a time (e.g. to animate it).

pub mod config;
pub mod crossings;
pub mod error;
pub mod generate;
pub mod geom;
pub mod init;
pub mod layers;
pub mod render;
mod rng;
pub mod solver;
pub mod tree;

pub use config::{LayoutConfig, Variant};
pub use crossings::{count_crossings, count_segment_crossings, segments_intersect};
pub use error::{Error, Result};
pub use init::initialize_positions;
pub use layers::LayerIndex;
pub use render::{Frame, Renderer};
pub use solver::{ForceSolver, Phase, SolveOutcome, StepReport, Termination};
pub use tree::{Node, NodeIdx, NodeKey, Record, Tree};

use indexmap::IndexMap;
use serde::Serialize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl From<geom::Point> for Position {
    fn from(p: geom::Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    /// Final positions keyed by node id, in input order.
    pub positions: IndexMap<NodeKey, Position>,
    pub crossings: usize,
    pub iterations: usize,
    pub termination: Termination,
}

/// Headless layout entry point.
pub fn layout(records: &[Record], config: &LayoutConfig) -> Result<Layout> {
    run_layout(records, config, None)
}

/// Like [`layout`], handing `renderer` a frame every `every` iterations.
pub fn layout_with(
    records: &[Record],
    config: &LayoutConfig,
    renderer: &mut dyn Renderer,
    every: usize,
) -> Result<Layout> {
    run_layout(records, config, Some((renderer, every)))
}

fn run_layout(
    records: &[Record],
    config: &LayoutConfig,
    renderer: Option<(&mut dyn Renderer, usize)>,
) -> Result<Layout> {
    config.validate()?;
    let mut tree = Tree::from_records(records)?;
    let layers = LayerIndex::build(&mut tree);
    initialize_positions(&mut tree, &layers, config)?;

    let outcome = {
        let mut solver = ForceSolver::new(&mut tree, &layers, config)?;
        match renderer {
            Some((r, every)) => solver.run_with(r, every)?,
            None => solver.run()?,
        }
    };

    let crossings = count_crossings(&tree);
    tracing::debug!(
        nodes = tree.len(),
        depths = layers.depth_count(),
        iterations = outcome.iterations,
        termination = ?outcome.termination,
        crossings,
        "layout finished"
    );

    Ok(Layout {
        positions: tree
            .positions()
            .into_iter()
            .map(|(k, p)| (k, p.into()))
            .collect(),
        crossings,
        iterations: outcome.iterations,
        termination: outcome.termination,
    })
}
