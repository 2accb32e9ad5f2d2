//! Graphviz export.
//!
//! Terminals are squares at the bottom, decision nodes are circles grouped by variable, high
//! edges are solid and low edges dashed. Every root gets a labelled box at the top.
//!
//! ```
//! use logic_rs::robdd::Robdd;
//! use logic_rs::types::Var;
//!
//! let bdd = Robdd::new((1..=2).map(Var::new)).unwrap();
//! let x1 = bdd.var(Var::new(1)).unwrap();
//! let x2 = bdd.var(Var::new(2)).unwrap();
//! let f = bdd.and(x1, x2);
//!
//! let dot = bdd.to_dot(&[f]).unwrap();
//! assert!(dot.starts_with("digraph {"));
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::handle::Handle;
use crate::robdd::Robdd;

#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for decision nodes (default: "circle")
    pub node_shape: &'static str,
    /// Shape for terminals (default: "square")
    pub terminal_shape: &'static str,
    /// Shape for roots (default: "rect")
    pub root_shape: &'static str,
    /// Style for high edges (default: "solid")
    pub high_edge_style: &'static str,
    /// Style for low edges (default: "dashed")
    pub low_edge_style: &'static str,
    /// Show handles next to variable names (default: false)
    pub show_handles: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            node_shape: "circle",
            terminal_shape: "square",
            root_shape: "rect",
            high_edge_style: "solid",
            low_edge_style: "dashed",
            show_handles: false,
        }
    }
}

impl Robdd {
    /// Renders the diagrams rooted at `roots` in DOT format. Shared nodes appear once.
    pub fn to_dot(&self, roots: &[Handle]) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(roots, &DotConfig::default())
    }

    pub fn to_dot_with_config(
        &self,
        roots: &[Handle],
        config: &DotConfig,
    ) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "node [shape={}, fixedsize=true];", config.node_shape)?;

        writeln!(dot, "{{ rank=sink")?;
        writeln!(dot, "0 [shape={}, label=\"0\"];", config.terminal_shape)?;
        writeln!(dot, "1 [shape={}, label=\"1\"];", config.terminal_shape)?;
        writeln!(dot, "}}")?;

        let all_nodes = self.descendants(roots.iter().copied());

        // One rank per variable, in the order of the diagram.
        let mut levels = BTreeMap::<usize, Vec<Handle>>::new();
        for &h in &all_nodes {
            if !h.is_terminal() {
                levels.entry(self.handle_level(h)).or_default().push(h);
            }
        }

        for level in levels.values_mut() {
            level.sort();
            writeln!(dot, "{{ rank=same")?;
            for &h in level.iter() {
                let Some(node) = self.node(h) else { continue };
                let label = if config.show_handles {
                    format!("\"{}\\n{}\"", node.var, h)
                } else {
                    format!("\"{}\"", node.var)
                };
                writeln!(dot, "{} [label={}];", h.get(), label)?;
            }
            writeln!(dot, "}}")?;
        }

        let mut sorted: Vec<Handle> = all_nodes.into_iter().collect();
        sorted.sort();
        for h in sorted {
            let Some(node) = self.node(h) else { continue };
            writeln!(
                dot,
                "{} -> {} [style={}];",
                h.get(),
                node.high.get(),
                config.high_edge_style
            )?;
            writeln!(
                dot,
                "{} -> {} [style={}];",
                h.get(),
                node.low.get(),
                config.low_edge_style
            )?;
        }

        writeln!(dot, "{{ rank=source")?;
        for (i, root) in roots.iter().enumerate() {
            writeln!(dot, "r{} [shape={}, label=\"{}\"];", i, config.root_shape, root)?;
        }
        writeln!(dot, "}}")?;
        for (i, root) in roots.iter().enumerate() {
            writeln!(dot, "r{} -> {};", i, root.get())?;
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Var;

    fn setup() -> (Robdd, Handle, Handle) {
        let bdd = Robdd::new((1..=2).map(Var::new)).unwrap();
        let x1 = bdd.var(Var::new(1)).unwrap();
        let x2 = bdd.var(Var::new(2)).unwrap();
        (bdd, x1, x2)
    }

    #[test]
    fn test_to_dot_basic() {
        let (bdd, x1, x2) = setup();
        let f = bdd.and(x1, x2);

        let dot = bdd.to_dot(&[f]).unwrap();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains(&format!("{} -> {} [style=solid];", f.get(), x2.get())));
        assert!(dot.contains(&format!("{} -> 0 [style=dashed];", f.get())));
        assert!(dot.contains(&format!("r0 -> {};", f.get())));
    }

    #[test]
    fn test_to_dot_constants() {
        let (bdd, _, _) = setup();
        let dot = bdd.to_dot(&[Handle::ZERO, Handle::ONE]).unwrap();
        assert!(dot.contains("r0 -> 0;"));
        assert!(dot.contains("r1 -> 1;"));
        assert!(!dot.contains("rank=same"));
    }

    #[test]
    fn test_to_dot_with_config() {
        let (bdd, x1, _) = setup();
        let config = DotConfig {
            show_handles: true,
            node_shape: "ellipse",
            ..DotConfig::default()
        };

        let dot = bdd.to_dot_with_config(&[x1], &config).unwrap();
        assert!(dot.contains("node [shape=ellipse"));
        assert!(dot.contains(&format!("[label=\"x1\\n{}\"]", x1)));
    }
}
