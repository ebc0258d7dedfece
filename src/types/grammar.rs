//! Grammar model: named rules of weighted branch templates.
//!
//! A grammar is built once (from a builtin or a parsed file) and is read-only
//! afterwards. Rules keep their definition order; the first rule is the
//! default entry point.
//!
//! # Example
//!
//! ```text
//! E ::= triple(C, C, C);
//! A ::= random | x | y;
//! C ::= 2 A | 3 add(C, C) | 3 mult(C, C);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU32;

use serde::Serialize;

use super::node::{NodeArena, NodeId, NodeKind, Origin};

/// One weighted alternative of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Branch {
    pub template: NodeId,
    pub weight: NonZeroU32,
}

/// A named production.
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    branches: Vec<Branch>,
    weight_sum: u64,
}

impl Rule {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            branches: Vec::new(),
            weight_sum: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Sum of all branch weights.
    pub fn weight_sum(&self) -> u64 {
        self.weight_sum
    }

    fn push(&mut self, branch: Branch) {
        self.branches.push(branch);
        self.weight_sum = self.branches.iter().map(|b| u64::from(b.weight.get())).sum();
    }
}

/// A collection of rules plus the arena holding their templates.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
    nodes: NodeArena,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arena holding the branch templates.
    pub fn nodes(&self) -> &NodeArena {
        &self.nodes
    }

    /// Mutable arena access, for building templates before adding branches.
    pub fn nodes_mut(&mut self) -> &mut NodeArena {
        &mut self.nodes
    }

    /// Append a branch to `rule`, creating the rule if needed.
    pub fn add_branch(&mut self, rule: &str, template: NodeId, weight: NonZeroU32) {
        let index = match self.index.get(rule) {
            Some(&index) => index,
            None => {
                self.rules.push(Rule::new(rule));
                self.index.insert(rule.to_string(), self.rules.len() - 1);
                self.rules.len() - 1
            }
        };
        self.rules[index].push(Branch { template, weight });
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.index.get(name).map(|&i| &self.rules[i])
    }

    /// Position of a rule in definition order.
    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The first defined rule, used when no entry is named.
    pub fn entry(&self) -> Option<&Rule> {
        self.rules.first()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Every rule reference that names no defined rule, in template order.
    pub fn undefined_references(&self) -> Vec<(String, Origin)> {
        let mut missing = Vec::new();
        for rule in &self.rules {
            for branch in &rule.branches {
                self.collect_undefined(branch.template, &mut missing);
            }
        }
        missing
    }

    fn collect_undefined(&self, id: NodeId, missing: &mut Vec<(String, Origin)>) {
        let node = &self.nodes[id];
        if let NodeKind::Rule(name) = &node.kind {
            if !self.index.contains_key(name) {
                missing.push((name.clone(), node.origin.clone()));
            }
        }
        for child in node.kind.children() {
            self.collect_undefined(child, missing);
        }
    }

    /// Smallest depth budget under which each rule can terminate, in rule order.
    ///
    /// `None` means the rule can never terminate (every branch recurses
    /// forever or refers to an undefined rule).
    pub fn min_depths(&self) -> Vec<Option<u32>> {
        let mut depths: Vec<Option<u32>> = vec![None; self.rules.len()];
        loop {
            let mut changed = false;
            for (i, rule) in self.rules.iter().enumerate() {
                let best = rule
                    .branches
                    .iter()
                    .filter_map(|b| self.template_need(b.template, &depths))
                    .min()
                    .map(|need| need.max(1));
                if best.is_some() && (depths[i].is_none() || best < depths[i]) {
                    depths[i] = best;
                    changed = true;
                }
            }
            if !changed {
                return depths;
            }
        }
    }

    /// Budget a template needs, given the current per-rule estimates.
    fn template_need(&self, id: NodeId, depths: &[Option<u32>]) -> Option<u32> {
        match &self.nodes[id].kind {
            NodeKind::Rule(name) => {
                let index = self.rule_index(name)?;
                depths[index].map(|d| d.saturating_add(1))
            }
            kind => kind
                .children()
                .into_iter()
                .try_fold(0, |acc, child| Some(acc.max(self.template_need(child, depths)?))),
        }
    }

    /// Same rules, branch order, weights and template structure.
    pub fn equivalent(&self, other: &Grammar) -> bool {
        self.rules.len() == other.rules.len()
            && self.rules.iter().zip(&other.rules).all(|(a, b)| {
                a.name == b.name
                    && a.weight_sum == b.weight_sum
                    && a.branches.len() == b.branches.len()
                    && a.branches.iter().zip(&b.branches).all(|(x, y)| {
                        x.weight == y.weight
                            && self.nodes.same_tree(x.template, &other.nodes, y.template)
                    })
            })
    }

    /// Machine-readable summary of the grammar.
    pub fn summary(&self) -> GrammarSummary {
        let depths = self.min_depths();
        GrammarSummary {
            rules: self
                .rules
                .iter()
                .zip(depths)
                .map(|(rule, min_depth)| RuleSummary {
                    name: rule.name.clone(),
                    weight_sum: rule.weight_sum,
                    min_depth,
                    branches: rule
                        .branches
                        .iter()
                        .map(|b| BranchSummary {
                            weight: b.weight.get(),
                            template: self.nodes.display(b.template).to_string(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            write!(f, "{} ::= ", rule.name)?;
            for (i, branch) in rule.branches.iter().enumerate() {
                if i > 0 {
                    f.write_str(" | ")?;
                }
                if branch.weight.get() != 1 {
                    write!(f, "{} ", branch.weight)?;
                }
                write!(f, "{}", self.nodes.display(branch.template))?;
            }
            writeln!(f, ";")?;
        }
        Ok(())
    }
}

/// Serializable view of a grammar (see [`Grammar::summary`]).
#[derive(Debug, Clone, Serialize)]
pub struct GrammarSummary {
    pub rules: Vec<RuleSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleSummary {
    pub name: String,
    pub weight_sum: u64,
    pub min_depth: Option<u32>,
    pub branches: Vec<BranchSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BranchSummary {
    pub weight: u32,
    pub template: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    /// E ::= triple(C, C, C); A ::= random | x | y; C ::= 2 A | 3 add(C, C) | 3 mult(C, C);
    fn classic() -> Grammar {
        let mut g = Grammar::new();
        let n = g.nodes_mut();
        let (c1, c2, c3) = (n.rule("C"), n.rule("C"), n.rule("C"));
        let e = n.triple(c1, c2, c3);
        let (random, x, y) = (n.random(), n.x(), n.y());
        let a = n.rule("A");
        let (l, r) = (n.rule("C"), n.rule("C"));
        let add = n.add(l, r);
        let (l, r) = (n.rule("C"), n.rule("C"));
        let mult = n.mult(l, r);

        g.add_branch("E", e, weight(1));
        g.add_branch("A", random, weight(1));
        g.add_branch("A", x, weight(1));
        g.add_branch("A", y, weight(1));
        g.add_branch("C", a, weight(2));
        g.add_branch("C", add, weight(3));
        g.add_branch("C", mult, weight(3));
        g
    }

    #[test]
    fn test_weight_sum_tracks_appends() {
        let g = classic();
        assert_eq!(g.rule("A").unwrap().weight_sum(), 3);
        assert_eq!(g.rule("C").unwrap().weight_sum(), 8);
        assert_eq!(g.entry().unwrap().name(), "E");
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn test_display() {
        insta::assert_snapshot!(classic().to_string(), @r"
        E ::= triple(C, C, C);
        A ::= random | x | y;
        C ::= 2 A | 3 add(C, C) | 3 mult(C, C);
        ");
    }

    #[test]
    fn test_min_depths() {
        // E needs C (2) + 1, C needs A (1) + 1, A is terminal.
        assert_eq!(classic().min_depths(), vec![Some(3), Some(1), Some(2)]);
    }

    #[test]
    fn test_min_depth_never_terminates() {
        let mut g = Grammar::new();
        let c = g.nodes_mut().rule("C");
        g.add_branch("C", c, weight(1));
        assert_eq!(g.min_depths(), vec![None]);
    }

    #[test]
    fn test_undefined_references() {
        let mut g = Grammar::new();
        let missing = g.nodes_mut().rule("Nope");
        g.add_branch("E", missing, weight(1));

        let undefined = g.undefined_references();
        assert_eq!(undefined.len(), 1);
        assert_eq!(undefined[0].0, "Nope");
        assert_eq!(g.min_depths(), vec![None]);
    }

    #[test]
    fn test_equivalent() {
        assert!(classic().equivalent(&classic()));

        let mut other = classic();
        let t = other.nodes_mut().t();
        other.add_branch("A", t, weight(1));
        assert!(!classic().equivalent(&other));
    }

    #[test]
    fn test_summary() {
        let summary = classic().summary();
        assert_eq!(summary.rules.len(), 3);
        assert_eq!(summary.rules[2].branches[1].template, "add(C, C)");
        assert_eq!(summary.rules[2].branches[1].weight, 3);
        assert_eq!(summary.rules[0].min_depth, Some(3));
    }
}
