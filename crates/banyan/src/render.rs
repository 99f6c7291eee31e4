//! Hook for external renderers.
//!
//! The core never draws anything itself; a [`Renderer`] receives read-only frames at whatever
//! cadence the caller asks [`ForceSolver::run_with`](crate::ForceSolver::run_with) for.

use crate::solver::Phase;
use crate::tree::{NodeIdx, Tree};

#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Iterations completed when the frame was taken.
    pub iteration: usize,
    pub phase: Phase,
    pub depth: usize,
    pub tree: &'a Tree,
    /// Nodes revealed so far. Edges whose child is not on the board should not be drawn yet.
    pub board: &'a [NodeIdx],
    /// Every `(parent, child)` edge of the tree.
    pub edges: &'a [(NodeIdx, NodeIdx)],
}

pub trait Renderer {
    fn frame(&mut self, frame: &Frame<'_>);
}

impl<F> Renderer for F
where
    F: FnMut(&Frame<'_>),
{
    fn frame(&mut self, frame: &Frame<'_>) {
        self(frame)
    }
}
