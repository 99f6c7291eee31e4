//! Step-wise force relaxation.
//!
//! Each [`ForceSolver::step`] call performs exactly one iteration and returns, so callers decide
//! when to render, pause or stop. Positions are valid at every iteration boundary.
//!
//! One iteration computes, for every active node, the sum of
//!
//! - spring pulls towards `base_spring_length` along each tree edge to a node on the board,
//! - inverse-square repulsion from every other node on the board,
//! - an optional constant push away from the root,
//!
//! against the positions at the start of the iteration, then moves every active node by its
//! force (unit mass, unit time step).

pub mod monitor;

pub use monitor::{ConvergenceMonitor, Termination};

use crate::config::{LayoutConfig, Variant};
use crate::error::{Error, Result};
use crate::geom::{Vector, direction, distance, is_finite, manhattan, vector};
use crate::layers::LayerIndex;
use crate::render::{Frame, Renderer};
use crate::tree::{NodeIdx, Tree};
use serde::Serialize;

/// Virtual separation assumed between two nodes that sit on exactly the same point.
pub const DEGENERATE_NUDGE: f64 = 1e-6;

/// An iteration moving the active nodes further than this many canvas half-perimeters each is
/// treated as a runaway layout.
pub const DIVERGENCE_FACTOR: f64 = 1e6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Monolithic variant: every non-root node moves.
    Full,
    /// Layered variant: only the newest depth moves.
    Frontier,
    /// Layered variant: every revealed non-root node moves.
    Joint,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    /// Iterations performed so far, across all passes.
    pub iteration: usize,
    pub phase: Phase,
    /// Deepest revealed depth.
    pub depth: usize,
    /// Sum of `|fx| + |fy|` over the nodes moved in this iteration.
    pub total_displacement: f64,
    /// Coincident node pairs nudged apart in this iteration.
    pub repaired: usize,
    /// Set once the whole layout has terminated.
    pub termination: Option<Termination>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveOutcome {
    pub iterations: usize,
    pub termination: Termination,
}

#[derive(Debug, Clone)]
enum Stage {
    Running {
        phase: Phase,
        monitor: ConvergenceMonitor,
    },
    Done(Termination),
}

#[derive(Debug)]
pub struct ForceSolver<'a> {
    tree: &'a mut Tree,
    layers: &'a LayerIndex,
    config: LayoutConfig,
    /// Nodes whose positions count for repulsion and child springs.
    board: Vec<NodeIdx>,
    on_board: Vec<bool>,
    /// Nodes moved by the current pass.
    active: Vec<NodeIdx>,
    depth: usize,
    stage: Stage,
    iterations: usize,
    diverged: bool,
}

impl<'a> ForceSolver<'a> {
    /// Prepares a solver over `tree`, whose positions should already be initialized.
    ///
    /// The solver holds the tree exclusively until it is dropped.
    pub fn new(tree: &'a mut Tree, layers: &'a LayerIndex, config: &LayoutConfig) -> Result<Self> {
        config.validate()?;
        let n = tree.len();
        let mut solver = Self {
            tree,
            layers,
            config: config.clone(),
            board: Vec::with_capacity(n),
            on_board: vec![false; n],
            active: Vec::new(),
            depth: 0,
            stage: Stage::Done(Termination::Converged),
            iterations: 0,
            diverged: false,
        };

        match solver.config.variant {
            Variant::Monolithic => {
                for v in layers.nodes_in_order() {
                    solver.place(v);
                }
                solver.depth = layers.depth_count().saturating_sub(1);
                solver.active = solver.board[1..].to_vec();
                if !solver.active.is_empty() {
                    solver.start(Phase::Full, solver.config.max_iterations);
                }
            }
            Variant::Layered => {
                let root = solver.tree.root();
                solver.place(root);
                solver.reveal_from(1, Termination::Converged);
            }
        }
        Ok(solver)
    }

    pub fn tree(&self) -> &Tree {
        &*self.tree
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Nodes currently revealed, in reveal order.
    pub fn board(&self) -> &[NodeIdx] {
        &self.board
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn termination(&self) -> Option<Termination> {
        match self.stage {
            Stage::Done(t) => Some(t),
            Stage::Running { .. } => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.stage, Stage::Done(_))
    }

    /// Whether some iteration blew up: a non-finite total displacement, or one beyond
    /// [`DIVERGENCE_FACTOR`] times the canvas half-perimeter per active node. Iterations that
    /// repaired a coincidence are not judged.
    pub fn diverged(&self) -> bool {
        self.diverged
    }

    /// Advances by exactly one iteration.
    ///
    /// After termination this is a no-op that repeats the final status. In diagnostics mode a
    /// coincident pair fails the step before any node moves.
    pub fn step(&mut self) -> Result<StepReport> {
        let phase = match &self.stage {
            Stage::Done(t) => {
                return Ok(StepReport {
                    iteration: self.iterations,
                    phase: self.final_phase(),
                    depth: self.depth,
                    total_displacement: 0.0,
                    repaired: 0,
                    termination: Some(*t),
                });
            }
            Stage::Running { phase, .. } => *phase,
        };

        let (total, repaired) = self.iterate()?;
        self.iterations += 1;
        let depth = self.depth;
        if repaired == 0 && !self.diverged && self.is_runaway(total) {
            self.diverged = true;
            tracing::warn!(
                iteration = self.iterations,
                ?phase,
                depth,
                total,
                elastic_constant = self.config.elastic_constant,
                "layout is diverging"
            );
        }

        let finished = match &mut self.stage {
            Stage::Running { monitor, .. } => monitor.record(total),
            Stage::Done(_) => None,
        };
        tracing::trace!(
            iteration = self.iterations,
            ?phase,
            depth,
            total,
            "force iteration"
        );
        if let Some(reason) = finished {
            self.finish_pass(phase, reason);
        }

        Ok(StepReport {
            iteration: self.iterations,
            phase,
            depth,
            total_displacement: total,
            repaired,
            termination: self.termination(),
        })
    }

    /// Steps until the layout terminates.
    pub fn run(&mut self) -> Result<SolveOutcome> {
        loop {
            if let Some(termination) = self.step()?.termination {
                return Ok(SolveOutcome {
                    iterations: self.iterations,
                    termination,
                });
            }
        }
    }

    /// Steps until the layout terminates, handing `renderer` a frame before the first
    /// iteration, after every `every` iterations and once more at the end.
    pub fn run_with(&mut self, renderer: &mut dyn Renderer, every: usize) -> Result<SolveOutcome> {
        let every = every.max(1);
        let edges = self.tree.edges();
        self.emit(renderer, &edges);
        loop {
            let report = self.step()?;
            if let Some(termination) = report.termination {
                self.emit(renderer, &edges);
                return Ok(SolveOutcome {
                    iterations: self.iterations,
                    termination,
                });
            }
            if report.iteration.is_multiple_of(every) {
                self.emit(renderer, &edges);
            }
        }
    }

    fn emit(&self, renderer: &mut dyn Renderer, edges: &[(NodeIdx, NodeIdx)]) {
        let phase = match &self.stage {
            Stage::Running { phase, .. } => *phase,
            Stage::Done(_) => self.final_phase(),
        };
        renderer.frame(&Frame {
            iteration: self.iterations,
            phase,
            depth: self.depth,
            tree: &*self.tree,
            board: &self.board,
            edges,
        });
    }

    fn is_runaway(&self, total: f64) -> bool {
        let bound = DIVERGENCE_FACTOR
            * (self.config.canvas_width + self.config.canvas_height)
            * self.active.len() as f64;
        !total.is_finite() || total > bound
    }

    fn final_phase(&self) -> Phase {
        match self.config.variant {
            Variant::Monolithic => Phase::Full,
            Variant::Layered if self.config.runs_joint_pass() => Phase::Joint,
            Variant::Layered => Phase::Frontier,
        }
    }

    fn place(&mut self, v: NodeIdx) {
        if !self.on_board[v.index()] {
            self.on_board[v.index()] = true;
            self.board.push(v);
        }
    }

    fn start(&mut self, phase: Phase, max_iterations: usize) {
        tracing::debug!(
            ?phase,
            depth = self.depth,
            active = self.active.len(),
            board = self.board.len(),
            "relaxation pass started"
        );
        self.stage = Stage::Running {
            phase,
            monitor: ConvergenceMonitor::new(self.config.convergence_epsilon, max_iterations),
        };
    }

    /// Reveals `depth` and starts its first pass, skipping depths with nothing to run.
    fn reveal_from(&mut self, mut depth: usize, mut last: Termination) {
        while depth < self.layers.depth_count() {
            self.depth = depth;
            let layers = self.layers;
            for &v in layers.layer(depth) {
                self.place(v);
            }
            if self.config.frontier_max_iterations > 0 {
                self.active = layers.layer(depth).to_vec();
                self.start(Phase::Frontier, self.config.frontier_max_iterations);
                return;
            }
            if self.config.runs_joint_pass() {
                self.start_joint();
                return;
            }
            last = Termination::Converged;
            depth += 1;
        }
        self.complete(last);
    }

    fn start_joint(&mut self) {
        self.active = self.board[1..].to_vec();
        self.start(Phase::Joint, self.config.max_iterations);
    }

    fn finish_pass(&mut self, phase: Phase, reason: Termination) {
        tracing::debug!(
            ?phase,
            depth = self.depth,
            ?reason,
            iterations = self.iterations,
            "relaxation pass finished"
        );
        match phase {
            Phase::Full => self.complete(reason),
            Phase::Frontier if self.config.runs_joint_pass() => self.start_joint(),
            Phase::Frontier | Phase::Joint => self.reveal_from(self.depth + 1, reason),
        }
    }

    fn complete(&mut self, reason: Termination) {
        self.active.clear();
        self.stage = Stage::Done(reason);
        tracing::debug!(iterations = self.iterations, ?reason, "layout terminated");
    }

    /// One Jacobi-style iteration over the active set. Returns the total displacement and the
    /// number of repaired coincidences.
    fn iterate(&mut self) -> Result<(f64, usize)> {
        let cfg = &self.config;
        let tree: &Tree = &*self.tree;
        let root = tree.position(tree.root());
        let mut repaired = 0usize;
        let mut moves: Vec<Vector> = Vec::with_capacity(self.active.len());

        for &v in &self.active {
            let node = tree.node(v);
            let p = node.position();
            let mut force = vector(0.0, 0.0);

            let children = node
                .children()
                .iter()
                .copied()
                .filter(|c| !cfg.freeze_drawn_nodes && self.on_board[c.index()]);
            for n in node.parent().into_iter().chain(children) {
                let Some((dir, d)) = separation(tree, v, n, cfg.diagnostics, &mut repaired)?
                else {
                    continue;
                };
                force += dir * (cfg.elastic_constant * (cfg.base_spring_length - d));
            }

            for &o in &self.board {
                if o == v {
                    continue;
                }
                let Some((dir, d)) = separation(tree, v, o, cfg.diagnostics, &mut repaired)?
                else {
                    continue;
                };
                let multiplier = if cfg.use_weighted_repulsion {
                    1.0 + 2.0 * tree.child_count(v) as f64 + 2.0 * tree.child_count(o) as f64
                } else {
                    1.0
                };
                force += dir * (multiplier * cfg.electrostatic_constant / (d * d));
            }

            if cfg.use_center_repulsion {
                if let Some(dir) = direction(root, p) {
                    force += dir * cfg.center_repulsion_magnitude;
                }
            }

            moves.push(force);
        }

        let mut total = 0.0;
        for (&v, &m) in self.active.iter().zip(&moves) {
            let p = self.tree.position(v);
            self.tree.set_position(v, p + m);
            total += manhattan(m);
        }
        Ok((total, repaired))
    }
}

/// Unit vector from `other` towards `node` and the distance between them, or `None` when either
/// position is no longer finite.
///
/// Exactly coincident pairs are treated as if `node` sat [`DEGENERATE_NUDGE`] away along the x axis,
/// on the side given by index order, so the two nodes of a pair separate in opposite directions.
fn separation(
    tree: &Tree,
    node: NodeIdx,
    other: NodeIdx,
    diagnostics: bool,
    repaired: &mut usize,
) -> Result<Option<(Vector, f64)>> {
    let a = tree.position(node);
    let b = tree.position(other);
    if a != b || !is_finite(a) {
        return Ok(direction(b, a).map(|dir| (dir, distance(a, b))));
    }
    if diagnostics {
        return Err(Error::DegenerateState {
            node: tree.node(node).id().clone(),
            other: tree.node(other).id().clone(),
        });
    }
    *repaired += 1;
    tracing::warn!(
        node = %tree.node(node).id(),
        other = %tree.node(other).id(),
        "coincident nodes nudged apart"
    );
    let side = if node > other { 1.0 } else { -1.0 };
    Ok(Some((vector(side, 0.0), DEGENERATE_NUDGE)))
}
