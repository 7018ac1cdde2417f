//! A navigable, annotatable tree of variations.
//!
//! Nodes live in a flat arena and refer to each other by [`NodeId`]. The tree keeps a
//! cursor (the current node) that most operations act on, so an external agent can
//! drive it one tool call at a time:
//!
//! ```
//! use kibitz_board::ShakmatyBoard;
//! use kibitz_explorer::tree::VariationTree;
//!
//! let start = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
//! let mut tree = VariationTree::new(ShakmatyBoard, start).unwrap();
//! tree.add_move("e4").unwrap();
//! tree.add_move("e5").unwrap();
//! tree.add_alternative("c5").unwrap();
//!
//! let info = tree.current_info();
//! assert_eq!(info.san, "e5");
//! assert!(info.is_on_principal_path);
//! tree.go_to_parent().unwrap();
//! assert_eq!(tree.current_info().children, ["e5", "c5"]);
//! ```
//!
//! # Transpositions
//!
//! Nodes are indexed by position, ignoring the move counters, so the same position
//! reached by different move orders maps to several nodes. [`VariationTree::go_to`]
//! prefers the one on the principal path.

use std::collections::HashMap;

use kibitz_board::{BoardError, BoardService};
use kibitz_evaluator::evaluation::EngineEvaluation;
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("#{_0}")]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: Self = Self(0);

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(
    Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::IsVariant,
)]
pub enum TreeError {
    #[display("invalid root position: {source}")]
    InvalidRoot { source: BoardError },
    #[display("cannot play '{san}': {source}")]
    IllegalMove { san: String, source: BoardError },
    #[display("no node for position '{fen}'")]
    UnknownPosition { fen: String },
    #[display("no node {id}")]
    UnknownNode { id: NodeId },
    #[display("'{san}' is not a continuation of the current node")]
    UnknownChild { san: String },
    #[display("the root has no parent")]
    AtRoot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariationNode {
    id: NodeId,
    fen: String,
    san: String,
    comment: Option<String>,
    nags: Vec<u8>,
    engine_eval: Option<EngineEvaluation>,
    children: Vec<NodeId>,
    principal: Option<NodeId>,
    parent: Option<NodeId>,
    depth: u32,
    interesting: Vec<String>,
}

impl VariationNode {
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn fen(&self) -> &str {
        &self.fen
    }

    /// Move leading to this node; empty at the root.
    #[must_use]
    pub fn san(&self) -> &str {
        &self.san
    }

    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    #[must_use]
    pub fn nags(&self) -> &[u8] {
        &self.nags
    }

    #[must_use]
    pub fn engine_eval(&self) -> Option<&EngineEvaluation> {
        self.engine_eval.as_ref()
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn principal(&self) -> Option<NodeId> {
        self.principal
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Plies below the root.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Moves flagged for later exploration, oldest first.
    #[must_use]
    pub fn interesting_moves(&self) -> &[String] {
        &self.interesting
    }

    /// The continuation followed when reading the line: the principal child, or the
    /// first child if none is set.
    #[must_use]
    pub fn main_child(&self) -> Option<NodeId> {
        self.principal.or_else(|| self.children.first().copied())
    }
}

/// Serializable view of one node for tool-calling agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub fen: String,
    pub san: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub nags: Vec<u8>,
    pub interesting_moves: Vec<String>,
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_child: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_fen: Option<String>,
    pub is_on_principal_path: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_eval: Option<EngineEvaluation>,
}

/// Outcome of one tree operation as reported to a tool-calling agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeInfo>,
}

impl ToolResponse {
    #[must_use]
    pub fn ok(node: NodeInfo) -> Self {
        Self {
            success: true,
            error: None,
            node: Some(node),
        }
    }

    #[must_use]
    pub fn error(error: &TreeError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            node: None,
        }
    }
}

/// One move of a serialized line, with the variations branching off before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveInfo {
    pub san: String,
    pub fen: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nags: Vec<u8>,
    /// Alternatives to this move, each a line of its own.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variations: Vec<Vec<MoveInfo>>,
}

#[derive(Debug)]
pub struct VariationTree<B> {
    board: B,
    nodes: Vec<VariationNode>,
    by_position: HashMap<String, Vec<NodeId>>,
    current: NodeId,
}

/// Position part of a FEN: placement, side to move, castling and en passant.
fn position_key(fen: &str) -> String {
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

fn san_matches(a: &str, b: &str) -> bool {
    let strip = |s: &str| s.trim_end_matches(['+', '#', '!', '?']).to_owned();
    strip(a) == strip(b)
}

impl<B> VariationTree<B>
where
    B: BoardService,
{
    pub fn new(board: B, root_fen: impl Into<String>) -> Result<Self, TreeError> {
        let fen = root_fen.into();
        board
            .header(&fen)
            .map_err(|source| TreeError::InvalidRoot { source })?;
        let mut tree = Self {
            board,
            nodes: vec![],
            by_position: HashMap::new(),
            current: NodeId::ROOT,
        };
        tree.push_node(fen, String::new(), None);
        Ok(tree)
    }

    #[must_use]
    pub fn board(&self) -> &B {
        &self.board
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn root(&self) -> &VariationNode {
        &self.nodes[NodeId::ROOT.0]
    }

    #[must_use]
    pub fn current(&self) -> &VariationNode {
        &self.nodes[self.current.0]
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&VariationNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &VariationNode> + '_ {
        self.nodes.iter()
    }

    fn push_node(&mut self, fen: String, san: String, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let depth = parent.map_or(0, |p| self.nodes[p.0].depth + 1);
        self.by_position
            .entry(position_key(&fen))
            .or_default()
            .push(id);
        self.nodes.push(VariationNode {
            id,
            fen,
            san,
            comment: None,
            nags: vec![],
            engine_eval: None,
            children: vec![],
            principal: None,
            parent,
            depth,
            interesting: vec![],
        });
        if let Some(parent) = parent {
            let parent = &mut self.nodes[parent.0];
            parent.children.push(id);
            parent.principal.get_or_insert(id);
        }
        id
    }

    /// Child of `parent` reached by `san`, created if needed.
    fn child(&mut self, parent: NodeId, san: &str) -> Result<NodeId, TreeError> {
        let outcome = self
            .board
            .make_move(&self.nodes[parent.0].fen, san)
            .map_err(|source| TreeError::IllegalMove {
                san: san.to_owned(),
                source,
            })?;
        let existing = self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c.0].san == outcome.san);
        Ok(existing
            .unwrap_or_else(|| self.push_node(outcome.fen_after, outcome.san, Some(parent))))
    }

    /// Plays `san` from the current node and moves there.
    ///
    /// Playing a move that already has a node reuses it.
    pub fn add_move(&mut self, san: &str) -> Result<NodeId, TreeError> {
        let id = self.child(self.current, san)?;
        self.current = id;
        Ok(id)
    }

    /// Adds `san` as an alternative to the current move without moving.
    ///
    /// At the root there is no current move to branch from, so the move is added as a
    /// child of the root instead.
    pub fn add_alternative(&mut self, san: &str) -> Result<NodeId, TreeError> {
        let parent = self.current().parent.unwrap_or(self.current);
        self.child(parent, san)
    }

    /// Moves to a node for `fen`, preferring one on the principal path.
    pub fn go_to(&mut self, fen: &str) -> Result<NodeId, TreeError> {
        let candidates = self
            .by_position
            .get(&position_key(fen))
            .ok_or_else(|| TreeError::UnknownPosition {
                fen: fen.to_owned(),
            })?;
        let id = candidates
            .iter()
            .copied()
            .find(|&id| self.is_on_principal_path(id))
            .or_else(|| candidates.first().copied())
            .ok_or_else(|| TreeError::UnknownPosition {
                fen: fen.to_owned(),
            })?;
        self.current = id;
        Ok(id)
    }

    pub fn go_to_node(&mut self, id: NodeId) -> Result<NodeId, TreeError> {
        if id.0 >= self.nodes.len() {
            return Err(TreeError::UnknownNode { id });
        }
        self.current = id;
        Ok(id)
    }

    pub fn go_to_parent(&mut self) -> Result<NodeId, TreeError> {
        let parent = self.current().parent.ok_or(TreeError::AtRoot)?;
        self.current = parent;
        Ok(parent)
    }

    pub fn go_to_root(&mut self) -> NodeId {
        self.current = NodeId::ROOT;
        self.current
    }

    /// Sets the comment of the current node; an empty comment removes it.
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        let comment = comment.into();
        self.nodes[self.current.0].comment = (!comment.is_empty()).then_some(comment);
    }

    pub fn add_nag(&mut self, nag: u8) {
        let nags = &mut self.nodes[self.current.0].nags;
        if !nags.contains(&nag) {
            nags.push(nag);
        }
    }

    pub fn set_nags(&mut self, nags: impl IntoIterator<Item = u8>) {
        let mut unique = vec![];
        for nag in nags {
            if !unique.contains(&nag) {
                unique.push(nag);
            }
        }
        self.nodes[self.current.0].nags = unique;
    }

    /// Flags a legal move of the current position for later exploration.
    pub fn mark_interesting(&mut self, san: &str) -> Result<(), TreeError> {
        let node = &self.nodes[self.current.0];
        let outcome =
            self.board
                .make_move(&node.fen, san)
                .map_err(|source| TreeError::IllegalMove {
                    san: san.to_owned(),
                    source,
                })?;
        let queue = &mut self.nodes[self.current.0].interesting;
        if !queue.contains(&outcome.san) {
            queue.push(outcome.san);
        }
        Ok(())
    }

    pub fn clear_interesting(&mut self) {
        self.nodes[self.current.0].interesting.clear();
    }

    /// Removes and returns the flagged moves of a node.
    pub fn take_interesting(&mut self, id: NodeId) -> Vec<String> {
        self.nodes
            .get_mut(id.0)
            .map(|node| std::mem::take(&mut node.interesting))
            .unwrap_or_default()
    }

    /// Makes the child reached by `child_san` the main continuation.
    pub fn set_principal(&mut self, child_san: &str) -> Result<NodeId, TreeError> {
        let child = self
            .current()
            .children
            .iter()
            .copied()
            .find(|&c| san_matches(&self.nodes[c.0].san, child_san))
            .ok_or_else(|| TreeError::UnknownChild {
                san: child_san.to_owned(),
            })?;
        self.nodes[self.current.0].principal = Some(child);
        Ok(child)
    }

    pub fn set_engine_eval(&mut self, evaluation: EngineEvaluation) {
        self.set_engine_eval_at(self.current, evaluation);
    }

    pub fn set_engine_eval_at(&mut self, id: NodeId, evaluation: EngineEvaluation) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.engine_eval = Some(evaluation);
        }
    }

    /// Whether `id` lies on the line obtained by following principal children from
    /// the root.
    #[must_use]
    pub fn is_on_principal_path(&self, id: NodeId) -> bool {
        let mut node = id;
        while let Some(parent) = self.nodes.get(node.0).and_then(|n| n.parent) {
            if self.nodes[parent.0].main_child() != Some(node) {
                return false;
            }
            node = parent;
        }
        node == NodeId::ROOT
    }

    /// Nodes of the principal line, root first.
    #[must_use]
    pub fn principal_path(&self) -> Vec<NodeId> {
        let mut path = vec![NodeId::ROOT];
        let mut node = NodeId::ROOT;
        while let Some(next) = self.nodes[node.0].main_child() {
            path.push(next);
            node = next;
        }
        path
    }

    /// The principal line with every other child attached as a nested variation at
    /// the move it replaces.
    #[must_use]
    pub fn to_move_info(&self) -> Vec<MoveInfo> {
        self.root()
            .main_child()
            .map(|first| self.line(first, true))
            .unwrap_or_default()
    }

    fn line(&self, first: NodeId, with_first_siblings: bool) -> Vec<MoveInfo> {
        let mut line = vec![];
        let mut next = Some(first);
        let mut with_siblings = with_first_siblings;
        while let Some(id) = next {
            let node = &self.nodes[id.0];
            let variations = match node.parent {
                Some(parent) if with_siblings => self.nodes[parent.0]
                    .children
                    .iter()
                    .filter(|&&c| c != id)
                    .map(|&c| self.line(c, false))
                    .collect(),
                _ => vec![],
            };
            line.push(MoveInfo {
                san: node.san.clone(),
                fen: node.fen.clone(),
                comment: node.comment.clone(),
                nags: node.nags.clone(),
                variations,
            });
            with_siblings = true;
            next = node.main_child();
        }
        line
    }

    #[must_use]
    pub fn node_info(&self, id: NodeId) -> Option<NodeInfo> {
        self.nodes.get(id.0).map(|node| self.info(node))
    }

    #[must_use]
    pub fn current_info(&self) -> NodeInfo {
        self.info(self.current())
    }

    fn info(&self, node: &VariationNode) -> NodeInfo {
        let san_of = |id: NodeId| self.nodes[id.0].san.clone();
        NodeInfo {
            fen: node.fen.clone(),
            san: node.san.clone(),
            comment: node.comment.clone(),
            nags: node.nags.clone(),
            interesting_moves: node.interesting.clone(),
            children: node.children.iter().copied().map(san_of).collect(),
            principal_child: node.principal.map(san_of),
            parent_fen: node.parent.map(|p| self.nodes[p.0].fen.clone()),
            is_on_principal_path: self.is_on_principal_path(node.id),
            engine_eval: node.engine_eval.clone(),
        }
    }

    /// Wraps the result of an operation, reporting the current node on success.
    #[must_use]
    pub fn respond<T>(&self, result: Result<T, TreeError>) -> ToolResponse {
        match result {
            Ok(_) => ToolResponse::ok(self.current_info()),
            Err(err) => ToolResponse::error(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use kibitz_board::ShakmatyBoard;
    use kibitz_evaluator::evaluation::{EngineLine, Evaluation};

    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn tree() -> VariationTree<ShakmatyBoard> {
        VariationTree::new(ShakmatyBoard, START).unwrap()
    }

    mod moves {
        use super::*;

        #[test]
        fn test_add_move_is_idempotent() {
            let mut tree = tree();
            let first = tree.add_move("e4").unwrap();
            tree.go_to_parent().unwrap();
            let second = tree.add_move("e4").unwrap();
            assert_eq!(first, second);
            assert_eq!(tree.len(), 2);
            assert_eq!(tree.root().children(), [first]);
        }

        #[test]
        fn test_equivalent_san_reuses_node() {
            let mut tree = tree();
            let first = tree.add_move("Nf3").unwrap();
            tree.go_to_root();
            let second = tree.add_move("Ng1f3").unwrap();
            assert_eq!(first, second);
        }

        #[test]
        fn test_illegal_move_leaves_tree_unchanged() {
            let mut tree = tree();
            tree.add_move("e4").unwrap();
            let before_len = tree.len();
            let before = tree.current_info();

            let err = tree.add_move("e4").unwrap_err();
            assert!(err.is_illegal_move());
            assert_eq!(tree.len(), before_len);
            assert_eq!(tree.current_info(), before);

            let err = tree.add_alternative("Ke2").unwrap_err();
            assert!(err.is_illegal_move());
            assert_eq!(tree.len(), before_len);
        }

        #[test]
        fn test_first_child_becomes_principal() {
            let mut tree = tree();
            let e4 = tree.add_move("e4").unwrap();
            let d4 = tree.add_alternative("d4").unwrap();
            assert_eq!(tree.current().id(), e4);
            assert_eq!(tree.root().principal(), Some(e4));
            assert!(tree.is_on_principal_path(e4));
            assert!(!tree.is_on_principal_path(d4));
        }

        #[test]
        fn test_alternative_at_root_adds_child() {
            let mut tree = tree();
            let d4 = tree.add_alternative("d4").unwrap();
            assert_eq!(tree.current().id(), NodeId::ROOT);
            assert_eq!(tree.root().children(), [d4]);
            assert_eq!(tree.node(d4).unwrap().depth(), 1);
        }

        #[test]
        fn test_set_principal() {
            let mut tree = tree();
            tree.add_move("e4").unwrap();
            tree.add_alternative("d4").unwrap();
            tree.go_to_root();
            let d4 = tree.set_principal("d4").unwrap();
            assert!(tree.is_on_principal_path(d4));
            assert_eq!(tree.principal_path(), [NodeId::ROOT, d4]);
            assert!(tree.set_principal("c4").unwrap_err().is_unknown_child());
        }
    }

    mod navigation {
        use super::*;

        #[test]
        fn test_go_to_parent_at_root_fails() {
            let mut tree = tree();
            assert_eq!(tree.go_to_parent(), Err(TreeError::AtRoot));
        }

        #[test]
        fn test_go_to_unknown_position() {
            let mut tree = tree();
            let err = tree.go_to("8/8/8/8/8/8/8/K6k w - - 0 1").unwrap_err();
            assert!(err.is_unknown_position());
            assert_eq!(tree.current().id(), NodeId::ROOT);
        }

        #[test]
        fn test_go_to_prefers_principal_transposition() {
            // 1. Nf3 Nf6 2. Nc3 and 1. Nc3 Nf6 2. Nf3 reach the same position.
            let mut tree = tree();
            tree.add_move("Nc3").unwrap();
            tree.add_move("Nf6").unwrap();
            let side = tree.add_move("Nf3").unwrap();
            tree.go_to_root();
            tree.add_alternative("Nf3").unwrap();
            tree.set_principal("Nf3").unwrap();
            tree.add_move("Nf3").unwrap();
            tree.add_move("Nf6").unwrap();
            let main = tree.add_move("Nc3").unwrap();
            assert_ne!(side, main);

            let fen = tree.node(side).unwrap().fen().to_owned();
            tree.go_to_root();
            assert_eq!(tree.go_to(&fen).unwrap(), main);
        }

        #[test]
        fn test_go_to_ignores_move_counters() {
            let mut tree = tree();
            let e4 = tree.add_move("e4").unwrap();
            tree.go_to_root();
            let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 7";
            assert_eq!(tree.go_to(fen).unwrap(), e4);
        }
    }

    mod annotations {
        use super::*;

        #[test]
        fn test_nags_and_comment() {
            let mut tree = tree();
            tree.add_move("e4").unwrap();
            tree.add_nag(1);
            tree.add_nag(1);
            tree.set_comment("Best by test.");
            assert_eq!(tree.current().nags(), [1]);
            assert_eq!(tree.current().comment(), Some("Best by test."));

            tree.set_nags([3, 14, 3]);
            assert_eq!(tree.current().nags(), [3, 14]);
            tree.set_comment("");
            assert_eq!(tree.current().comment(), None);
        }

        #[test]
        fn test_interesting_queue() {
            let mut tree = tree();
            tree.mark_interesting("d4").unwrap();
            tree.mark_interesting("Nf3").unwrap();
            tree.mark_interesting("d4").unwrap();
            assert!(tree.mark_interesting("d5").unwrap_err().is_illegal_move());
            assert_eq!(tree.current().interesting_moves(), ["d4", "Nf3"]);

            tree.clear_interesting();
            assert!(tree.current().interesting_moves().is_empty());
        }

        #[test]
        fn test_engine_eval_is_cached() {
            let mut tree = tree();
            let eval = EngineEvaluation {
                best: EngineLine {
                    evaluation: Evaluation::cp(25),
                    depth: 20,
                    pv: vec!["e4".to_owned()],
                },
                alternatives: vec![],
            };
            tree.set_engine_eval(eval.clone());
            assert_eq!(tree.root().engine_eval(), Some(&eval));
        }
    }

    mod serialization {
        use super::*;

        #[test]
        fn test_node_info_shape() {
            let mut tree = tree();
            tree.add_move("e4").unwrap();
            tree.add_move("e5").unwrap();
            tree.go_to_parent().unwrap();
            tree.mark_interesting("c5").unwrap();

            let json = serde_json::to_value(tree.current_info()).unwrap();
            assert_eq!(json["san"], "e4");
            assert_eq!(json["children"], serde_json::json!(["e5"]));
            assert_eq!(json["principalChild"], "e5");
            assert_eq!(json["parentFen"], START);
            assert_eq!(json["isOnPrincipalPath"], true);
            assert_eq!(json["interestingMoves"], serde_json::json!(["c5"]));
            assert!(json.get("comment").is_none());
            assert!(json.get("engineEval").is_none());

            let root = serde_json::to_value(tree.node_info(NodeId::ROOT).unwrap()).unwrap();
            assert!(root.get("parentFen").is_none());
        }

        #[test]
        fn test_tool_response() {
            let mut tree = tree();
            let ok = tree.add_move("e4");
            let response = tree.respond(ok);
            assert!(response.success);
            assert_eq!(response.node.unwrap().san, "e4");

            let err = tree.add_move("Qh5");
            let response = tree.respond(err);
            assert!(!response.success);
            assert!(response.node.is_none());
            let json = serde_json::to_value(&response).unwrap();
            assert_eq!(json["success"], false);
            assert!(json["error"].as_str().unwrap().contains("Qh5"));
        }

        #[test]
        fn test_move_info_nests_variations() {
            // 1. e4 (1. d4 d5) e5 (1... c5 2. Nf3) 2. Nf3
            let mut tree = tree();
            tree.add_move("e4").unwrap();
            tree.add_alternative("d4").unwrap();
            tree.add_move("e5").unwrap();
            tree.add_alternative("c5").unwrap();
            tree.add_move("Nf3").unwrap();
            let e4 = tree.root().children()[0];
            let d4 = tree.root().children()[1];
            tree.go_to_node(d4).unwrap();
            tree.add_move("d5").unwrap();
            let c5 = tree.node(e4).unwrap().children()[1];
            tree.go_to_node(c5).unwrap();
            tree.add_move("Nf3").unwrap();

            let line = tree.to_move_info();
            let sans = line.iter().map(|m| m.san.as_str()).collect::<Vec<_>>();
            assert_eq!(sans, ["e4", "e5", "Nf3"]);

            assert_eq!(line[0].variations.len(), 1);
            let d4 = line[0].variations[0]
                .iter()
                .map(|m| m.san.as_str())
                .collect::<Vec<_>>();
            assert_eq!(d4, ["d4", "d5"]);

            assert_eq!(line[1].variations.len(), 1);
            let c5 = line[1].variations[0]
                .iter()
                .map(|m| m.san.as_str())
                .collect::<Vec<_>>();
            assert_eq!(c5, ["c5", "Nf3"]);
            assert!(line[2].variations.is_empty());
        }

        #[test]
        fn test_empty_tree_has_no_moves() {
            assert!(tree().to_move_info().is_empty());
        }
    }
}
