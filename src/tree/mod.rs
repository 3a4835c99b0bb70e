/*
    Derivation trees: an arena of symbol-labeled nodes built by replaying
    the engine's application trace
*/

pub mod render;

use std::fmt::Display;

use crate::derivation::Application;
use crate::grammar::{Grammar, Symbol};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, PartialEq)]
pub struct Node {
    pub symbol: Symbol,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

// A rooted ordered tree owning all of its nodes. Nodes are addressed by
// their index in the arena; the root is node 0
#[derive(Debug, PartialEq)]
pub struct DerivationTree {
    nodes: Vec<Node>,
}

impl DerivationTree {
    fn new(root: Symbol) -> Self {
        DerivationTree {
            nodes: vec![Node {
                symbol: root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    // All nodes in creation order, for rendering
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    fn add_child(&mut self, parent: NodeId, symbol: Symbol) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            symbol,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    // The terminal frontier, left to right. For a tree built from an
    // accepted string this reads back exactly that string
    pub fn terminal_leaves(&self) -> Vec<&str> {
        let mut leaves = Vec::new();
        self.collect_leaves(self.root(), &mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, id: NodeId, leaves: &mut Vec<&'a str>) {
        let node = self.node(id);
        if let Symbol::Terminal(name) = &node.symbol {
            leaves.push(name);
        }
        for &child in &node.children {
            self.collect_leaves(child, leaves);
        }
    }

    fn fmt_children(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        id: NodeId,
        prefix: &str,
    ) -> std::fmt::Result {
        let children = &self.node(id).children;
        for (index, &child) in children.iter().enumerate() {
            let last = index + 1 == children.len();
            let (branch, pad) = if last {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            writeln!(f, "{prefix}{branch}{}", self.node(child).symbol)?;
            self.fmt_children(f, child, &format!("{prefix}{pad}"))?;
        }
        Ok(())
    }
}

impl Display for DerivationTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.node(self.root()).symbol)?;
        self.fmt_children(f, self.root(), "")
    }
}

// Replays a successful derivation trace into a tree. Each application
// expands the leftmost unexpanded nonterminal leaf into one child per
// right-hand symbol; an epsilon application contributes a single ε leaf.
// The trace is trusted to come from a successful derive call
pub fn build(grammar: &Grammar, trace: &[Application]) -> DerivationTree {
    let mut tree = DerivationTree::new(Symbol::Nonterminal(grammar.start.clone()));
    // Unexpanded nonterminal leaves, leftmost on top
    let mut pending = vec![tree.root()];

    for application in trace {
        let Some(parent) = pending.pop() else {
            debug_assert!(false, "trace applies a production with nothing left to expand");
            break;
        };
        let production = &grammar.productions[application.production];
        debug_assert_eq!(tree.node(parent).symbol.name(), production.left);

        let mut created = Vec::new();
        for symbol in &production.right {
            created.push(tree.add_child(parent, symbol.clone()));
        }
        // Reversed so the leftmost new leaf comes off the stack first
        for id in created.into_iter().rev() {
            if matches!(tree.node(id).symbol, Symbol::Nonterminal(_)) {
                pending.push(id);
            }
        }
    }

    tree
}
