//! Growing a variation tree under a budget.
//!
//! An [`ExplorationSession`] starts at the tree's current node and repeatedly takes
//! the most promising move from a priority queue, plays it, evaluates the resulting
//! position and, if [`assess_continuation`] agrees, queues the engine's and humans'
//! replies. Before every step it checks, in order:
//!
//! 1. the [`StopHandle`] ([`StopReason::UserStopped`]),
//! 2. the node budget ([`StopReason::MaxNodesReached`]),
//! 3. the time budget ([`StopReason::BudgetExhausted`]),
//! 4. evaluation stability ([`StopReason::PositionResolved`]),
//! 5. the queue itself ([`StopReason::QueueEmpty`], [`StopReason::MaxDepthReached`]
//!    when only depth kept it from growing, [`StopReason::PriorityThreshold`]).
//!
//! Service failures are not fatal. They are reported to the warning callback and to
//! `log::warn!`, and the session carries on with whatever it still knows.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashSet},
    sync::{
        Arc,
        atomic::{self, AtomicBool},
    },
    time::Instant,
};

use kibitz_board::BoardService;
use kibitz_evaluator::evaluation::{EngineEvaluation, Evaluation};
use serde::{Deserialize, Serialize};

use crate::{
    config::StoppingConfig,
    heuristics::{ContinuationConfig, Suggestion, assess_continuation},
    services::{EvaluationService, HumanMoveService},
    tree::{NodeId, VariationTree},
};

/// Priority of moves flagged as interesting on the starting node.
const INTERESTING_PRIORITY: f32 = 0.5;
/// Human moves less likely than this are not queued.
const MIN_HUMAN_PROBABILITY: f32 = 0.1;
const DEFAULT_MULTI_PV: u32 = 3;

pub type WarningCallback = Box<dyn FnMut(&str) + Send>;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    #[display("max_nodes_reached")]
    MaxNodesReached,
    #[display("max_depth_reached")]
    MaxDepthReached,
    #[display("budget_exhausted")]
    BudgetExhausted,
    #[display("queue_empty")]
    QueueEmpty,
    #[display("priority_threshold")]
    PriorityThreshold,
    #[display("position_resolved")]
    PositionResolved,
    #[display("user_stopped")]
    UserStopped,
}

/// Requests a running session to stop at its next check.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, atomic::Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(atomic::Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplorationState {
    pub nodes_explored: usize,
    /// Deepest node added, in plies below the starting node.
    pub max_depth_reached: u32,
    pub elapsed_ms: u64,
    /// Priority of the best queued move.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest_priority: Option<f32>,
    pub user_stopped: bool,
    /// Set when a node or time budget ended the session.
    pub hard_stopped: bool,
    /// Evaluations in the order they arrived, in centipawns from White's view.
    pub eval_history: Vec<i32>,
    pub service_calls: u32,
    pub warnings: usize,
}

impl ExplorationState {
    /// Whether the last `threshold` evaluations lie within `cp_range` of each other.
    #[must_use]
    pub fn is_eval_stable(&self, threshold: usize, cp_range: i32) -> bool {
        if threshold == 0 || self.eval_history.len() < threshold {
            return false;
        }
        let window = &self.eval_history[self.eval_history.len() - threshold..];
        let (min, max) = window
            .iter()
            .fold((i32::MAX, i32::MIN), |(lo, hi), &cp| (lo.min(cp), hi.max(cp)));
        max.saturating_sub(min) <= cp_range
    }
}

#[derive(Debug)]
struct QueueEntry {
    priority: f32,
    seq: u64,
    parent: NodeId,
    san: String,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

pub struct ExplorationSession<B> {
    tree: VariationTree<B>,
    evaluator: Arc<dyn EvaluationService>,
    human_moves: Option<(Arc<dyn HumanMoveService>, u32)>,
    stopping: StoppingConfig,
    continuation: ContinuationConfig,
    multi_pv: u32,
    stop: StopHandle,
    on_warning: Option<WarningCallback>,
    state: ExplorationState,
    queue: BinaryHeap<QueueEntry>,
    queued: HashSet<(NodeId, String)>,
    seq: u64,
    start: NodeId,
}

impl<B> ExplorationSession<B>
where
    B: BoardService,
{
    /// Creates a session exploring from the tree's current node.
    pub fn new(
        tree: VariationTree<B>,
        evaluator: Arc<dyn EvaluationService>,
        stopping: StoppingConfig,
    ) -> Self {
        let start = tree.current().id();
        Self {
            tree,
            evaluator,
            human_moves: None,
            stopping,
            continuation: ContinuationConfig::default(),
            multi_pv: DEFAULT_MULTI_PV,
            stop: StopHandle::default(),
            on_warning: None,
            state: ExplorationState::default(),
            queue: BinaryHeap::new(),
            queued: HashSet::new(),
            seq: 0,
            start,
        }
    }

    /// Also queues the moves humans of `rating` are likely to play.
    #[must_use]
    pub fn with_human_moves(mut self, service: Arc<dyn HumanMoveService>, rating: u32) -> Self {
        self.human_moves = Some((service, rating));
        self
    }

    #[must_use]
    pub fn with_continuation(mut self, continuation: ContinuationConfig) -> Self {
        self.continuation = continuation;
        self
    }

    #[must_use]
    pub fn with_multi_pv(mut self, multi_pv: u32) -> Self {
        self.multi_pv = EngineEvaluation::clamp_multi_pv(multi_pv);
        self
    }

    #[must_use]
    pub fn on_warning(mut self, callback: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_warning = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    #[must_use]
    pub fn state(&self) -> &ExplorationState {
        &self.state
    }

    #[must_use]
    pub fn tree(&self) -> &VariationTree<B> {
        &self.tree
    }

    #[must_use]
    pub fn into_tree(self) -> VariationTree<B> {
        self.tree
    }

    /// Explores until a stop condition holds. The tree's cursor is left on the
    /// starting node.
    pub async fn run(&mut self) -> StopReason {
        let started = Instant::now();
        self.state = ExplorationState::default();
        self.queue.clear();
        self.queued.clear();

        let start = self.start;
        if let Some(evaluation) = self.evaluate(start).await {
            self.queue_engine_moves(start, &evaluation, 1.0);
        }
        self.queue_human_moves(start, 1.0).await;
        for san in self.tree.take_interesting(start) {
            self.push(start, &san, INTERESTING_PRIORITY);
        }

        let mut depth_limited = false;
        let reason = loop {
            self.state.elapsed_ms = elapsed_ms(started);
            self.state.highest_priority = self.queue.peek().map(|e| e.priority);

            if self.stop.is_stopped() {
                self.state.user_stopped = true;
                break StopReason::UserStopped;
            }
            if self.state.nodes_explored >= self.stopping.max_nodes {
                self.state.hard_stopped = true;
                break StopReason::MaxNodesReached;
            }
            if self.state.elapsed_ms >= self.stopping.budget_ms {
                self.state.hard_stopped = true;
                break StopReason::BudgetExhausted;
            }
            if self.state.is_eval_stable(
                self.stopping.eval_stability_threshold,
                self.stopping.eval_stability_cp_range,
            ) {
                break StopReason::PositionResolved;
            }
            let Some(entry) = self.queue.pop() else {
                break if depth_limited {
                    StopReason::MaxDepthReached
                } else {
                    StopReason::QueueEmpty
                };
            };
            if entry.priority < self.stopping.min_priority {
                break StopReason::PriorityThreshold;
            }

            let before = self.tree.len();
            let added = self
                .tree
                .go_to_node(entry.parent)
                .and_then(|_| self.tree.add_move(&entry.san));
            let node = match added {
                Ok(node) => node,
                Err(err) => {
                    self.warn(&format!("skipping {}: {err}", entry.san));
                    continue;
                }
            };
            if self.tree.len() == before {
                continue;
            }
            self.state.nodes_explored += 1;
            let depth = self.relative_depth(node);
            self.state.max_depth_reached = self.state.max_depth_reached.max(depth);

            let evaluation = self.evaluate(node).await;
            if depth >= self.stopping.max_depth {
                depth_limited = true;
                continue;
            }
            self.expand(node, depth, entry.priority, evaluation.as_ref())
                .await;
        };

        if let Err(err) = self.tree.go_to_node(start) {
            self.warn(&format!("cannot return to the starting node: {err}"));
        }
        self.state.elapsed_ms = elapsed_ms(started);
        log::debug!(
            "exploration stopped ({reason}) after {} nodes, depth {}",
            self.state.nodes_explored,
            self.state.max_depth_reached
        );
        reason
    }

    async fn expand(
        &mut self,
        node: NodeId,
        depth: u32,
        priority: f32,
        evaluation: Option<&EngineEvaluation>,
    ) {
        let Some(current) = self.tree.node(node) else {
            return;
        };
        let fen = current.fen().to_owned();
        let previous = current
            .parent()
            .and_then(|parent| self.white_eval(parent));
        let current = self.white_eval(node);

        let assessment = match assess_continuation(
            self.tree.board(),
            &fen,
            previous,
            current,
            depth,
            self.state.service_calls,
            &self.continuation,
        ) {
            Ok(assessment) => assessment,
            Err(err) => {
                self.warn(&format!("cannot assess {fen}: {err}"));
                return;
            }
        };
        let priority = priority * f32::from(assessment.interest_score) / 100.0;
        match assessment.suggestion {
            Suggestion::ExploreDeeper => {
                if let Some(evaluation) = evaluation {
                    self.queue_engine_moves(node, evaluation, priority);
                }
                self.queue_human_moves(node, priority).await;
            }
            Suggestion::WrapUp => {
                if let Some(san) = evaluation.and_then(EngineEvaluation::best_move) {
                    self.push(node, san, priority * 0.5);
                }
            }
            Suggestion::StopNow => {}
        }
    }

    async fn evaluate(&mut self, node: NodeId) -> Option<EngineEvaluation> {
        let fen = self.tree.node(node)?.fen().to_owned();
        self.state.service_calls += 1;
        let evaluator = Arc::clone(&self.evaluator);
        match evaluator.evaluate(&fen, self.multi_pv).await {
            Ok(evaluation) => {
                self.tree.set_engine_eval_at(node, evaluation.clone());
                if let Some(white) = self.white_eval(node) {
                    self.state.eval_history.push(white.normalized());
                }
                Some(evaluation)
            }
            Err(err) => {
                self.warn(&format!("evaluation of {fen} failed: {err}"));
                None
            }
        }
    }

    async fn queue_human_moves(&mut self, node: NodeId, priority: f32) {
        let Some((service, rating)) = self.human_moves.clone() else {
            return;
        };
        let Some(fen) = self.tree.node(node).map(|n| n.fen().to_owned()) else {
            return;
        };
        self.state.service_calls += 1;
        match service.predict(&fen, rating).await {
            Ok(moves) => {
                for m in moves {
                    if m.probability >= MIN_HUMAN_PROBABILITY {
                        self.push(node, &m.san, priority * m.probability.min(1.0));
                    }
                }
            }
            Err(err) => self.warn(&format!("human move prediction for {fen} failed: {err}")),
        }
    }

    fn queue_engine_moves(&mut self, node: NodeId, evaluation: &EngineEvaluation, priority: f32) {
        if let Some(san) = evaluation.best_move() {
            self.push(node, san, priority);
        }
        for (line, loss) in evaluation
            .alternatives
            .iter()
            .zip(evaluation.alternative_losses())
        {
            if let Some(san) = line.first_move() {
                #[expect(clippy::cast_precision_loss)]
                let discount = 1.0 + loss as f32 / 100.0;
                self.push(node, san, priority / discount);
            }
        }
    }

    /// Queues `mv`, given in SAN or UCI, under its canonical SAN.
    fn push(&mut self, parent: NodeId, mv: &str, priority: f32) {
        let Some(fen) = self.tree.node(parent).map(|n| n.fen().to_owned()) else {
            return;
        };
        let san = match self.tree.board().to_san(&fen, mv) {
            Ok(san) => san,
            Err(err) => {
                self.warn(&format!("skipping {mv}: {err}"));
                return;
            }
        };
        if !self.queued.insert((parent, san.clone())) {
            return;
        }
        self.seq += 1;
        self.queue.push(QueueEntry {
            priority,
            seq: self.seq,
            parent,
            san,
        });
    }

    /// Cached evaluation of a node, from White's view.
    fn white_eval(&self, node: NodeId) -> Option<Evaluation> {
        let node = self.tree.node(node)?;
        let evaluation = node.engine_eval()?.evaluation();
        let white_to_move = self
            .tree
            .board()
            .header(node.fen())
            .map_or(true, |header| header.side_to_move.is_white());
        Some(evaluation.from_white_perspective(white_to_move))
    }

    fn relative_depth(&self, node: NodeId) -> u32 {
        let depth = |id| self.tree.node(id).map_or(0, |n| n.depth());
        depth(node).saturating_sub(depth(self.start))
    }

    fn warn(&mut self, message: &str) {
        log::warn!("{message}");
        self.state.warnings += 1;
        if let Some(callback) = &mut self.on_warning {
            callback(message);
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
