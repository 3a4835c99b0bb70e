/*
    Graphviz output for derivation trees, for rendering with `dot -Tpng`
*/

use super::DerivationTree;

// Emits the tree as a Graphviz digraph: one node per arena entry, edges
// from each parent to its children in order
pub fn to_dot(tree: &DerivationTree) -> String {
    let mut out = String::from("digraph derivation {\n");
    out.push_str("    node [shape=circle, style=filled, fillcolor=lightblue];\n");

    for (id, node) in tree.nodes() {
        out.push_str(&format!(
            "    n{} [label=\"{}\"];\n",
            id.index(),
            escape(node.symbol.name())
        ));
    }
    for (id, node) in tree.nodes() {
        for child in &node.children {
            out.push_str(&format!("    n{} -> n{};\n", id.index(), child.index()));
        }
    }

    out.push_str("}\n");
    return out;
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivation::{DerivationEngine, MatchResult};
    use crate::grammar::{Grammar, Production, Symbol};
    use crate::tree;

    fn derivation_tree() -> DerivationTree {
        // S -> a S b | ε, derived for "ab"
        let grammar = Grammar {
            terminals: vec!["a".to_string(), "b".to_string()],
            nonterminals: vec!["S".to_string()],
            start: "S".to_string(),
            productions: vec![
                Production {
                    left: "S".to_string(),
                    right: vec![
                        Symbol::Terminal("a".to_string()),
                        Symbol::Nonterminal("S".to_string()),
                        Symbol::Terminal("b".to_string()),
                    ],
                },
                Production {
                    left: "S".to_string(),
                    right: vec![Symbol::Epsilon],
                },
            ],
        };

        let engine = DerivationEngine::default();
        match engine.derive(&grammar, &grammar.tokenize("ab")).unwrap() {
            MatchResult::Match(trace) => tree::build(&grammar, &trace),
            MatchResult::NoMatch => panic!("expected \"ab\" to be derivable"),
        }
    }

    #[test]
    fn dot_lists_every_node_and_edge() {
        let dot = to_dot(&derivation_tree());

        assert!(dot.starts_with("digraph derivation {"));
        assert!(dot.ends_with("}\n"));
        // Root plus four children created by the two applications
        assert!(dot.contains("n0 [label=\"S\"];"));
        assert!(dot.contains("n4 [label=\"ε\"];"));
        assert!(dot.contains("n0 -> n1;"));
        assert!(dot.contains("n0 -> n2;"));
        assert!(dot.contains("n0 -> n3;"));
        assert!(dot.contains("n2 -> n4;"));
    }

    #[test]
    fn labels_are_escaped() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("\""), "\\\"");
        assert_eq!(escape("\\"), "\\\\");
    }
}
