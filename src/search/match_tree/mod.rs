//! The match tree: a compiled decision tree over atom and numeric-
//! constraint selectors that dispatches the ground elements (actions or
//! axioms) whose preconditions hold in a state. Nodes live in an arena and
//! reference each other by dense indices; dispatch is an explicit
//! depth-first traversal.

mod options;

pub use options::{MatchTreeOptions, OptimizationDirection, SplitMetric, SplitStrategy};

use crate::search::{GroundConjunctiveCondition, GroundNumericConstraint, PredicateTag, State};
use std::collections::VecDeque;
use std::io::{self, Write};
use tracing::debug;

/// A split feature: a fluent/derived atom or an interned numeric
/// constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selector {
    Atom(PredicateTag, u32),
    NumericConstraint(u16),
}

/// The outcome of testing one element against a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    True,
    False,
    DontCare,
}

/// An arena node. Children are arena indices; an absent child means no
/// element lives down that branch.
#[derive(Debug, Clone)]
pub enum Node {
    AtomSelector {
        tag: PredicateTag,
        atom: u32,
        true_child: Option<u32>,
        false_child: Option<u32>,
        dontcare_child: Option<u32>,
    },
    NumericConstraintSelector {
        constraint: u16,
        true_child: Option<u32>,
        dontcare_child: Option<u32>,
    },
    /// Emits its whole span unconditionally: the path proved every
    /// element's precondition.
    PerfectGenerator { begin: u32, end: u32 },
    /// Emits the span elements that survive a per-element re-test.
    ImperfectGenerator { begin: u32, end: u32 },
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Root,
    True(u32),
    False(u32),
    DontCare(u32),
}

#[derive(Debug)]
struct Placeholder {
    begin: usize,
    end: usize,
    slot: Slot,
    useless: Vec<Selector>,
    decided: Vec<(Selector, bool)>,
}

/// The compiled match tree over a fixed pool of ground elements.
#[derive(Debug)]
pub struct MatchTree {
    nodes: Vec<Node>,
    root: Option<u32>,
    /// Element ids, permuted so that every generator leaf owns a
    /// contiguous span.
    elements: Vec<u32>,
    constraints: Vec<GroundNumericConstraint>,
    num_selector_nodes: usize,
}

impl MatchTree {
    /// Compiles a match tree over `element_ids`; `condition` maps an
    /// element id to its ground precondition.
    pub fn build<'g>(
        element_ids: Vec<u32>,
        condition: impl Fn(u32) -> &'g GroundConjunctiveCondition,
        options: &MatchTreeOptions,
    ) -> Self {
        let mut tree = Self {
            nodes: vec![],
            root: None,
            elements: element_ids,
            constraints: vec![],
            num_selector_nodes: 0,
        };
        if tree.elements.is_empty() {
            return tree;
        }

        // Intern the numeric-constraint selectors up front so classes are
        // cheap to compute.
        for &element in &tree.elements {
            for constraint in &condition(element).numeric_constraints {
                if !tree.constraints.iter().any(|known| known == constraint) {
                    tree.constraints.push(constraint.clone());
                }
            }
        }

        let static_order = match options.split_strategy {
            SplitStrategy::Static => {
                let span: Vec<u32> = tree.elements.clone();
                tree.ranked_selectors(&span, &condition, options)
            }
            SplitStrategy::DynamicPerSubtree => vec![],
        };

        let mut queue: VecDeque<Placeholder> = VecDeque::new();
        queue.push_back(Placeholder {
            begin: 0,
            end: tree.elements.len(),
            slot: Slot::Root,
            useless: vec![],
            decided: vec![],
        });

        while let Some(mut placeholder) = queue.pop_front() {
            if tree.num_selector_nodes >= options.max_num_nodes {
                tree.finish_generator(placeholder, &condition);
                continue;
            }

            let span = tree.elements[placeholder.begin..placeholder.end].to_vec();
            let chosen = match options.split_strategy {
                SplitStrategy::Static => static_order.iter().copied().find(|selector| {
                    !placeholder.useless.contains(selector)
                        && !placeholder.decided.iter().any(|(s, _)| s == selector)
                        && {
                            let useful = tree.is_useful_split(*selector, &span, &condition);
                            if !useful {
                                placeholder.useless.push(*selector);
                            }
                            useful
                        }
                }),
                SplitStrategy::DynamicPerSubtree => {
                    tree.best_dynamic_split(&mut placeholder, &span, &condition, options)
                }
            };

            match chosen {
                None => tree.finish_generator(placeholder, &condition),
                Some(selector) => tree.apply_split(placeholder, selector, &condition, &mut queue),
            }
        }

        debug!(
            num_nodes = tree.nodes.len(),
            num_selector_nodes = tree.num_selector_nodes,
            num_elements = tree.elements.len(),
            "compiled match tree"
        );
        tree
    }

    /// All candidate selectors of a span, ranked best-first.
    fn ranked_selectors<'g>(
        &self,
        span: &[u32],
        condition: &impl Fn(u32) -> &'g GroundConjunctiveCondition,
        options: &MatchTreeOptions,
    ) -> Vec<Selector> {
        let mut selectors = self.candidate_selectors(span, condition);
        let mut scored: Vec<(f64, usize, Selector)> = selectors
            .drain(..)
            .enumerate()
            .map(|(position, selector)| {
                (
                    self.score(selector, span, condition, options.split_metric),
                    position,
                    selector,
                )
            })
            .collect();
        // stable order: score per direction, then first occurrence
        scored.sort_by(|a, b| {
            let by_score = match options.optimization_direction {
                OptimizationDirection::Maximize => b.0.total_cmp(&a.0),
                OptimizationDirection::Minimize => a.0.total_cmp(&b.0),
            };
            by_score.then(a.1.cmp(&b.1))
        });
        scored.into_iter().map(|(_, _, selector)| selector).collect()
    }

    fn best_dynamic_split<'g>(
        &self,
        placeholder: &mut Placeholder,
        span: &[u32],
        condition: &impl Fn(u32) -> &'g GroundConjunctiveCondition,
        options: &MatchTreeOptions,
    ) -> Option<Selector> {
        let mut best: Option<(f64, Selector)> = None;
        for selector in self.candidate_selectors(span, condition) {
            if placeholder.useless.contains(&selector)
                || placeholder.decided.iter().any(|(s, _)| s == &selector)
            {
                continue;
            }
            if !self.is_useful_split(selector, span, condition) {
                // a useless split stays useless below this node and must
                // not be revisited
                placeholder.useless.push(selector);
                continue;
            }
            let score = self.score(selector, span, condition, options.split_metric);
            let better = match best {
                None => true,
                Some((best_score, _)) => match options.optimization_direction {
                    OptimizationDirection::Maximize => score > best_score,
                    OptimizationDirection::Minimize => score < best_score,
                },
            };
            if better {
                best = Some((score, selector));
            }
        }
        best.map(|(_, selector)| selector)
    }

    /// Candidate selectors of a span, in first-occurrence order.
    fn candidate_selectors<'g>(
        &self,
        span: &[u32],
        condition: &impl Fn(u32) -> &'g GroundConjunctiveCondition,
    ) -> Vec<Selector> {
        let mut selectors: Vec<Selector> = vec![];
        let mut push = |selector: Selector, selectors: &mut Vec<Selector>| {
            if !selectors.contains(&selector) {
                selectors.push(selector);
            }
        };
        for &element in span {
            let condition = condition(element);
            for tag in [PredicateTag::Fluent, PredicateTag::Derived] {
                for &atom in condition.positive(tag) {
                    push(Selector::Atom(tag, atom), &mut selectors);
                }
                for &atom in condition.negative(tag) {
                    push(Selector::Atom(tag, atom), &mut selectors);
                }
            }
            for constraint in &condition.numeric_constraints {
                let index = self
                    .constraints
                    .iter()
                    .position(|known| known == constraint)
                    .expect("constraint interned during construction");
                push(Selector::NumericConstraint(index as u16), &mut selectors);
            }
        }
        selectors
    }

    fn classify<'g>(
        &self,
        selector: Selector,
        element: u32,
        condition: &impl Fn(u32) -> &'g GroundConjunctiveCondition,
    ) -> Class {
        let condition = condition(element);
        match selector {
            Selector::Atom(tag, atom) => {
                if condition.positive(tag).binary_search(&atom).is_ok() {
                    Class::True
                } else if condition.negative(tag).binary_search(&atom).is_ok() {
                    Class::False
                } else {
                    Class::DontCare
                }
            }
            Selector::NumericConstraint(index) => {
                let constraint = &self.constraints[index as usize];
                if condition
                    .numeric_constraints
                    .iter()
                    .any(|known| known == constraint)
                {
                    Class::True
                } else {
                    Class::DontCare
                }
            }
        }
    }

    fn class_counts<'g>(
        &self,
        selector: Selector,
        span: &[u32],
        condition: &impl Fn(u32) -> &'g GroundConjunctiveCondition,
    ) -> (usize, usize, usize) {
        let mut counts = (0usize, 0usize, 0usize);
        for &element in span {
            match self.classify(selector, element, condition) {
                Class::True => counts.0 += 1,
                Class::False => counts.1 += 1,
                Class::DontCare => counts.2 += 1,
            }
        }
        counts
    }

    /// A split is useless once all elements of the span agree on it.
    fn is_useful_split<'g>(
        &self,
        selector: Selector,
        span: &[u32],
        condition: &impl Fn(u32) -> &'g GroundConjunctiveCondition,
    ) -> bool {
        let (num_true, num_false, num_dontcare) = self.class_counts(selector, span, condition);
        let num_nonempty =
            usize::from(num_true > 0) + usize::from(num_false > 0) + usize::from(num_dontcare > 0);
        num_nonempty > 1
    }

    fn score<'g>(
        &self,
        selector: Selector,
        span: &[u32],
        condition: &impl Fn(u32) -> &'g GroundConjunctiveCondition,
        metric: SplitMetric,
    ) -> f64 {
        let (num_true, num_false, num_dontcare) = self.class_counts(selector, span, condition);
        let total = (num_true + num_false + num_dontcare) as f64;
        match metric {
            SplitMetric::MaxCover => (num_true + num_false) as f64,
            SplitMetric::Frequency => (num_true + num_false) as f64 / total,
            SplitMetric::Gini => {
                let fraction = |n: usize| {
                    let f = n as f64 / total;
                    f * f
                };
                1.0 - fraction(num_true) - fraction(num_false) - fraction(num_dontcare)
            }
        }
    }

    /// Replaces the placeholder by the selector node and enqueues child
    /// placeholders for its nonempty classes.
    fn apply_split<'g>(
        &mut self,
        placeholder: Placeholder,
        selector: Selector,
        condition: &impl Fn(u32) -> &'g GroundConjunctiveCondition,
        queue: &mut VecDeque<Placeholder>,
    ) {
        let span = &self.elements[placeholder.begin..placeholder.end];

        // stable three-way partition of the span
        let mut trues = vec![];
        let mut falses = vec![];
        let mut dontcares = vec![];
        for &element in span {
            match self.classify(selector, element, condition) {
                Class::True => trues.push(element),
                Class::False => falses.push(element),
                Class::DontCare => dontcares.push(element),
            }
        }
        let (num_true, num_false) = (trues.len(), falses.len());
        let mut cursor = placeholder.begin;
        for element in trues.into_iter().chain(falses).chain(dontcares) {
            self.elements[cursor] = element;
            cursor += 1;
        }

        let true_range = placeholder.begin..placeholder.begin + num_true;
        let false_range = true_range.end..true_range.end + num_false;
        let dontcare_range = false_range.end..placeholder.end;

        let node_index = self.nodes.len() as u32;
        let node = match selector {
            Selector::Atom(tag, atom) => Node::AtomSelector {
                tag,
                atom,
                true_child: None,
                false_child: None,
                dontcare_child: None,
            },
            Selector::NumericConstraint(constraint) => {
                debug_assert!(false_range.is_empty());
                Node::NumericConstraintSelector {
                    constraint,
                    true_child: None,
                    dontcare_child: None,
                }
            }
        };
        self.nodes.push(node);
        self.num_selector_nodes += 1;
        self.patch_slot(placeholder.slot, node_index);

        let child = |slot: Slot, range: std::ops::Range<usize>, outcome: Option<bool>| {
            let mut decided = placeholder.decided.clone();
            if let Some(outcome) = outcome {
                decided.push((selector, outcome));
            }
            Placeholder {
                begin: range.start,
                end: range.end,
                slot,
                useless: placeholder.useless.clone(),
                decided,
            }
        };
        if !true_range.is_empty() {
            queue.push_back(child(Slot::True(node_index), true_range, Some(true)));
        }
        if !false_range.is_empty() {
            queue.push_back(child(Slot::False(node_index), false_range, Some(false)));
        }
        if !dontcare_range.is_empty() {
            queue.push_back(child(Slot::DontCare(node_index), dontcare_range, None));
        }
    }

    /// Caps a placeholder with a generator leaf. The leaf is perfect iff the
    /// path decided every element's precondition.
    fn finish_generator<'g>(
        &mut self,
        placeholder: Placeholder,
        condition: &impl Fn(u32) -> &'g GroundConjunctiveCondition,
    ) {
        if placeholder.begin == placeholder.end {
            return;
        }
        let span = &self.elements[placeholder.begin..placeholder.end];
        let decided_positive = |tag: PredicateTag, atom: u32| {
            placeholder
                .decided
                .contains(&(Selector::Atom(tag, atom), true))
        };
        let decided_negative = |tag: PredicateTag, atom: u32| {
            placeholder
                .decided
                .contains(&(Selector::Atom(tag, atom), false))
        };
        let perfect = span.iter().all(|&element| {
            let condition = condition(element);
            [PredicateTag::Fluent, PredicateTag::Derived]
                .into_iter()
                .all(|tag| {
                    condition
                        .positive(tag)
                        .iter()
                        .all(|&atom| decided_positive(tag, atom))
                        && condition
                            .negative(tag)
                            .iter()
                            .all(|&atom| decided_negative(tag, atom))
                })
                && condition.numeric_constraints.iter().all(|constraint| {
                    let index = self
                        .constraints
                        .iter()
                        .position(|known| known == constraint)
                        .expect("constraint interned during construction");
                    placeholder
                        .decided
                        .contains(&(Selector::NumericConstraint(index as u16), true))
                })
        });

        let node_index = self.nodes.len() as u32;
        let (begin, end) = (placeholder.begin as u32, placeholder.end as u32);
        self.nodes.push(if perfect {
            Node::PerfectGenerator { begin, end }
        } else {
            Node::ImperfectGenerator { begin, end }
        });
        self.patch_slot(placeholder.slot, node_index);
    }

    fn patch_slot(&mut self, slot: Slot, node_index: u32) {
        match slot {
            Slot::Root => self.root = Some(node_index),
            Slot::True(parent) => match &mut self.nodes[parent as usize] {
                Node::AtomSelector { true_child, .. } => *true_child = Some(node_index),
                Node::NumericConstraintSelector { true_child, .. } => {
                    *true_child = Some(node_index)
                }
                _ => unreachable!("generator nodes have no children"),
            },
            Slot::False(parent) => match &mut self.nodes[parent as usize] {
                Node::AtomSelector { false_child, .. } => *false_child = Some(node_index),
                _ => unreachable!("only atom selectors have a false child"),
            },
            Slot::DontCare(parent) => match &mut self.nodes[parent as usize] {
                Node::AtomSelector { dontcare_child, .. } => *dontcare_child = Some(node_index),
                Node::NumericConstraintSelector { dontcare_child, .. } => {
                    *dontcare_child = Some(node_index)
                }
                _ => unreachable!("generator nodes have no children"),
            },
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_selector_nodes(&self) -> usize {
        self.num_selector_nodes
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// Lazily yields the elements applicable in `state`, in the depth-first
    /// order of the compiled tree. `is_applicable` re-tests elements at
    /// imperfect generator leaves.
    pub fn dispatch<'a, F>(&'a self, state: &'a State, is_applicable: F) -> MatchTreeIter<'a, F>
    where
        F: Fn(u32) -> bool,
    {
        MatchTreeIter {
            tree: self,
            state,
            is_applicable,
            stack: self.root.into_iter().collect(),
            span: 0..0,
            retest: false,
        }
    }

    /// Writes the tree in dot format: one node per internal/leaf, edges
    /// labelled T / F / X.
    pub fn write_dot(
        &self,
        out: &mut dyn Write,
        atom_label: &dyn Fn(PredicateTag, u32) -> String,
    ) -> io::Result<()> {
        writeln!(out, "digraph match_tree {{")?;
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                Node::AtomSelector {
                    tag,
                    atom,
                    true_child,
                    false_child,
                    dontcare_child,
                } => {
                    writeln!(out, "  n{index} [label=\"{}\"];", atom_label(*tag, *atom))?;
                    for (child, label) in [
                        (true_child, "T"),
                        (false_child, "F"),
                        (dontcare_child, "X"),
                    ] {
                        if let Some(child) = child {
                            writeln!(out, "  n{index} -> n{child} [label=\"{label}\"];")?;
                        }
                    }
                }
                Node::NumericConstraintSelector {
                    constraint,
                    true_child,
                    dontcare_child,
                } => {
                    writeln!(
                        out,
                        "  n{index} [label=\"{:?}\"];",
                        self.constraints[*constraint as usize].comparator
                    )?;
                    if let Some(child) = true_child {
                        writeln!(out, "  n{index} -> n{child} [label=\"constraint\"];")?;
                    }
                    if let Some(child) = dontcare_child {
                        writeln!(out, "  n{index} -> n{child} [label=\"dontcare\"];")?;
                    }
                }
                Node::PerfectGenerator { begin, end } => {
                    writeln!(
                        out,
                        "  n{index} [shape=box,label=\"perfect [{begin},{end})\"];"
                    )?;
                }
                Node::ImperfectGenerator { begin, end } => {
                    writeln!(
                        out,
                        "  n{index} [shape=box,label=\"imperfect [{begin},{end})\"];"
                    )?;
                }
            }
        }
        writeln!(out, "}}")
    }
}

/// Explicit depth-first dispatch over the compiled tree.
#[derive(Debug)]
pub struct MatchTreeIter<'a, F> {
    tree: &'a MatchTree,
    state: &'a State,
    is_applicable: F,
    stack: Vec<u32>,
    span: std::ops::Range<u32>,
    retest: bool,
}

impl<'a, F> Iterator for MatchTreeIter<'a, F>
where
    F: Fn(u32) -> bool,
{
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        loop {
            // drain the current generator span first
            while let Some(position) = self.span.next() {
                let element = self.tree.elements[position as usize];
                if !self.retest || (self.is_applicable)(element) {
                    return Some(element);
                }
            }

            let node = self.stack.pop()?;
            match &self.tree.nodes[node as usize] {
                Node::AtomSelector {
                    tag,
                    atom,
                    true_child,
                    false_child,
                    dontcare_child,
                } => {
                    let holds = match tag {
                        PredicateTag::Fluent => self.state.has_fluent_atom(*atom),
                        PredicateTag::Derived => self.state.has_derived_atom(*atom),
                        PredicateTag::Static => unreachable!("static atoms are not selectors"),
                    };
                    // push X first so the decided branch is visited first
                    if let Some(child) = dontcare_child {
                        self.stack.push(*child);
                    }
                    match (holds, true_child, false_child) {
                        (true, Some(child), _) => self.stack.push(*child),
                        (false, _, Some(child)) => self.stack.push(*child),
                        _ => {}
                    }
                }
                Node::NumericConstraintSelector {
                    constraint,
                    true_child,
                    dontcare_child,
                } => {
                    if let Some(child) = dontcare_child {
                        self.stack.push(*child);
                    }
                    if self.tree.constraints[*constraint as usize].is_satisfied(self.state) {
                        if let Some(child) = true_child {
                            self.stack.push(*child);
                        }
                    }
                }
                Node::PerfectGenerator { begin, end } => {
                    self.span = *begin..*end;
                    self.retest = false;
                }
                Node::ImperfectGenerator { begin, end } => {
                    self.span = *begin..*end;
                    self.retest = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::GroundConjunctiveCondition;

    fn condition(positive: &[u32], negative: &[u32]) -> GroundConjunctiveCondition {
        GroundConjunctiveCondition {
            positive_fluent: positive.to_vec(),
            negative_fluent: negative.to_vec(),
            ..GroundConjunctiveCondition::default()
        }
    }

    fn state_with(fluent: &[u32]) -> State {
        State::new(fluent.to_vec(), vec![], vec![])
    }

    #[test]
    fn fully_split_trees_have_perfect_leaves() {
        // two elements disagreeing on atom 0
        let conditions = vec![condition(&[0], &[]), condition(&[], &[0])];
        let tree = MatchTree::build(
            vec![0, 1],
            |id| &conditions[id as usize],
            &MatchTreeOptions::default(),
        );

        // one selector, two perfect generator children
        assert_eq!(tree.num_selector_nodes(), 1);
        assert_eq!(tree.num_nodes(), 3);

        let applicable = |_: u32| panic!("perfect leaves must not re-test");
        let with_atom: Vec<u32> = tree.dispatch(&state_with(&[0]), applicable).collect();
        assert_eq!(with_atom, vec![0]);
        let without_atom: Vec<u32> = tree.dispatch(&state_with(&[]), applicable).collect();
        assert_eq!(without_atom, vec![1]);
    }

    #[test]
    fn dontcare_elements_are_always_yielded() {
        let conditions = vec![condition(&[0], &[]), condition(&[], &[])];
        let tree = MatchTree::build(
            vec![0, 1],
            |id| &conditions[id as usize],
            &MatchTreeOptions::default(),
        );

        let applicable = |id: u32| conditions[id as usize].is_satisfied(&state_with(&[]));
        let without_atom: Vec<u32> = tree.dispatch(&state_with(&[]), applicable).collect();
        assert_eq!(without_atom, vec![1]);

        let applicable = |id: u32| conditions[id as usize].is_satisfied(&state_with(&[0]));
        let mut with_atom: Vec<u32> = tree.dispatch(&state_with(&[0]), applicable).collect();
        with_atom.sort_unstable();
        assert_eq!(with_atom, vec![0, 1]);
    }

    #[test]
    fn node_cap_zero_degenerates_to_one_imperfect_leaf() {
        let conditions = vec![condition(&[0], &[]), condition(&[1], &[])];
        let options = MatchTreeOptions {
            max_num_nodes: 0,
            ..MatchTreeOptions::default()
        };
        let tree = MatchTree::build(vec![0, 1], |id| &conditions[id as usize], &options);

        assert_eq!(tree.num_selector_nodes(), 0);
        assert_eq!(tree.num_nodes(), 1);

        // the imperfect leaf re-tests every element
        let state = state_with(&[1]);
        let applicable = |id: u32| conditions[id as usize].is_satisfied(&state);
        let survivors: Vec<u32> = tree.dispatch(&state, applicable).collect();
        assert_eq!(survivors, vec![1]);
    }

    #[test]
    fn agreeing_elements_make_a_split_useless() {
        // both elements require atom 7: splitting on it cannot separate them
        let conditions = vec![condition(&[7], &[]), condition(&[7], &[])];
        let tree = MatchTree::build(
            vec![0, 1],
            |id| &conditions[id as usize],
            &MatchTreeOptions::default(),
        );
        // no useful split exists, so the root is a single generator leaf
        assert_eq!(tree.num_selector_nodes(), 0);
        assert_eq!(tree.num_nodes(), 1);
    }

    #[test]
    fn dispatch_cost_skips_unreachable_branches() {
        // element 0 requires atom 0; element 1 requires atom 1
        let conditions = vec![condition(&[0], &[]), condition(&[1], &[])];
        let tree = MatchTree::build(
            vec![0, 1],
            |id| &conditions[id as usize],
            &MatchTreeOptions::default(),
        );
        let applicable = |id: u32| {
            // only called for imperfect leaves along the taken path
            conditions[id as usize].is_satisfied(&state_with(&[0]))
        };
        let result: Vec<u32> = tree.dispatch(&state_with(&[0]), applicable).collect();
        assert_eq!(result, vec![0]);
    }
}
