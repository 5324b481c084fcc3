//! The CNF feature grammar: every derivation rule has exactly one layer of
//! concrete constructor with non-terminal children; nesting is expressed by
//! named non-terminals and substitution rules. Non-terminals hold only
//! names; the grammar owns the rule lists and rules reference non-terminals
//! by index.

mod generator;
mod parser;
mod presets;

pub use generator::{
    GeneratedSentences, GeneratorStatistics, SentenceGenerator, SentenceStatistics,
    StateListRefinementPruningFunction,
};
pub use presets::GrammarPreset;

use crate::search::{PredicateTag, Task};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

pub type NonTerminalId = u32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("the body nonterminal <{0}> is never defined in a rule head")]
    UndefinedBodyNonTerminal(String),
    #[error("the grammar does not define any start symbol")]
    NoStartSymbol,
    #[error("the start nonterminal <{0}> should not appear in a rule body")]
    StartSymbolInBody(String),
    #[error("the substitution rules through <{0}> are cyclic")]
    CyclicSubstitution(String),
    #[error("unknown predicate {0}")]
    UnknownPredicate(String),
    #[error("predicate {0} has the wrong arity for this constructor")]
    PredicateArity(String),
    #[error("unknown object {0}")]
    UnknownObject(String),
    #[error("unknown constructor keyword @{0}")]
    UnknownKeyword(String),
    #[error("malformed grammar text: {0}")]
    Parse(String),
}

/// The body of a concept derivation rule: one concrete constructor whose
/// sub-positions are non-terminals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConceptBody {
    Bot,
    Top,
    AtomicState(PredicateTag, usize),
    AtomicGoal(PredicateTag, usize, bool),
    Intersection(NonTerminalId, NonTerminalId),
    Union(NonTerminalId, NonTerminalId),
    Negation(NonTerminalId),
    ValueRestriction(NonTerminalId, NonTerminalId),
    ExistentialQuantification(NonTerminalId, NonTerminalId),
    RoleValueMapContainment(NonTerminalId, NonTerminalId),
    RoleValueMapEquality(NonTerminalId, NonTerminalId),
    Nominal(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleBody {
    Universal,
    AtomicState(PredicateTag, usize),
    AtomicGoal(PredicateTag, usize, bool),
    Intersection(NonTerminalId, NonTerminalId),
    Union(NonTerminalId, NonTerminalId),
    Complement(NonTerminalId),
    Inverse(NonTerminalId),
    Composition(NonTerminalId, NonTerminalId),
    TransitiveClosure(NonTerminalId),
    ReflexiveTransitiveClosure(NonTerminalId),
    Restriction(NonTerminalId, NonTerminalId),
    Identity(NonTerminalId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BooleanBody {
    AtomicState(PredicateTag, usize),
    NonemptyConcept(NonTerminalId),
    NonemptyRole(NonTerminalId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumericalBody {
    CountConcept(NonTerminalId),
    CountRole(NonTerminalId),
    Distance(NonTerminalId, NonTerminalId, NonTerminalId),
}

/// `Head ::= Body` where the body is one concrete constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationRule<B> {
    pub head: NonTerminalId,
    pub body: B,
}

/// `Head ::= Body` where the body is another non-terminal of the same tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubstitutionRule {
    pub head: NonTerminalId,
    pub body: NonTerminalId,
}

/// The feature-language tag of a non-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureTag {
    Concept,
    Role,
    Boolean,
    Numerical,
}

/// A CNF feature grammar with per-tag non-terminal arenas, optional start
/// symbols, derivation rules, and substitution rules.
#[derive(Debug, Default, PartialEq)]
pub struct Grammar {
    pub concept_nonterminals: Vec<String>,
    pub role_nonterminals: Vec<String>,
    pub boolean_nonterminals: Vec<String>,
    pub numerical_nonterminals: Vec<String>,
    pub concept_start: Option<NonTerminalId>,
    pub role_start: Option<NonTerminalId>,
    pub boolean_start: Option<NonTerminalId>,
    pub numerical_start: Option<NonTerminalId>,
    pub concept_rules: Vec<DerivationRule<ConceptBody>>,
    pub role_rules: Vec<DerivationRule<RoleBody>>,
    pub boolean_rules: Vec<DerivationRule<BooleanBody>>,
    pub numerical_rules: Vec<DerivationRule<NumericalBody>>,
    pub concept_substitutions: Vec<SubstitutionRule>,
    pub role_substitutions: Vec<SubstitutionRule>,
    pub boolean_substitutions: Vec<SubstitutionRule>,
    pub numerical_substitutions: Vec<SubstitutionRule>,
}

impl Grammar {
    /// Parses the surface syntax and verifies well-formedness.
    pub fn from_text(text: &str, task: &Task) -> Result<Self, GrammarError> {
        let grammar = parser::parse_grammar(text, task)?;
        grammar.verify()?;
        Ok(grammar)
    }

    /// Builds one of the predefined grammars for the task's domain.
    pub fn create(preset: GrammarPreset, task: &Task) -> Result<Self, GrammarError> {
        Self::from_text(&presets::preset_text(preset, task), task)
    }

    fn nonterminal_name(&self, tag: FeatureTag, id: NonTerminalId) -> &str {
        match tag {
            FeatureTag::Concept => &self.concept_nonterminals[id as usize],
            FeatureTag::Role => &self.role_nonterminals[id as usize],
            FeatureTag::Boolean => &self.boolean_nonterminals[id as usize],
            FeatureTag::Numerical => &self.numerical_nonterminals[id as usize],
        }
    }

    /// Collects the non-terminals appearing in rule heads and in rule
    /// bodies, per tag.
    fn heads_and_bodies(&self) -> (HashSet<(FeatureTag, u32)>, HashSet<(FeatureTag, u32)>) {
        let mut heads = HashSet::new();
        let mut bodies = HashSet::new();

        for rule in &self.concept_rules {
            heads.insert((FeatureTag::Concept, rule.head));
            collect_concept_body(&rule.body, &mut bodies);
        }
        for rule in &self.role_rules {
            heads.insert((FeatureTag::Role, rule.head));
            collect_role_body(&rule.body, &mut bodies);
        }
        for rule in &self.boolean_rules {
            heads.insert((FeatureTag::Boolean, rule.head));
            match rule.body {
                BooleanBody::AtomicState(_, _) => {}
                BooleanBody::NonemptyConcept(c) => {
                    bodies.insert((FeatureTag::Concept, c));
                }
                BooleanBody::NonemptyRole(r) => {
                    bodies.insert((FeatureTag::Role, r));
                }
            }
        }
        for rule in &self.numerical_rules {
            heads.insert((FeatureTag::Numerical, rule.head));
            match rule.body {
                NumericalBody::CountConcept(c) => {
                    bodies.insert((FeatureTag::Concept, c));
                }
                NumericalBody::CountRole(r) => {
                    bodies.insert((FeatureTag::Role, r));
                }
                NumericalBody::Distance(c1, r, c2) => {
                    bodies.insert((FeatureTag::Concept, c1));
                    bodies.insert((FeatureTag::Role, r));
                    bodies.insert((FeatureTag::Concept, c2));
                }
            }
        }

        for (tag, substitutions) in [
            (FeatureTag::Concept, &self.concept_substitutions),
            (FeatureTag::Role, &self.role_substitutions),
            (FeatureTag::Boolean, &self.boolean_substitutions),
            (FeatureTag::Numerical, &self.numerical_substitutions),
        ] {
            for rule in substitutions {
                heads.insert((tag, rule.head));
                bodies.insert((tag, rule.body));
            }
        }

        (heads, bodies)
    }

    /// Well-formedness: every body non-terminal is defined in some head, a
    /// start symbol exists, start symbols appear only in heads, and the
    /// substitution rules admit a topological order.
    pub fn verify(&self) -> Result<(), GrammarError> {
        let (heads, bodies) = self.heads_and_bodies();

        for &(tag, id) in &bodies {
            if !heads.contains(&(tag, id)) {
                return Err(GrammarError::UndefinedBodyNonTerminal(
                    self.nonterminal_name(tag, id).to_string(),
                ));
            }
        }

        let starts = [
            (FeatureTag::Concept, self.concept_start),
            (FeatureTag::Role, self.role_start),
            (FeatureTag::Boolean, self.boolean_start),
            (FeatureTag::Numerical, self.numerical_start),
        ];
        if starts.iter().all(|(_, start)| start.is_none()) {
            return Err(GrammarError::NoStartSymbol);
        }
        for (tag, start) in starts {
            let Some(start) = start else { continue };
            if !heads.contains(&(tag, start)) {
                return Err(GrammarError::UndefinedBodyNonTerminal(
                    self.nonterminal_name(tag, start).to_string(),
                ));
            }
            if bodies.contains(&(tag, start)) {
                return Err(GrammarError::StartSymbolInBody(
                    self.nonterminal_name(tag, start).to_string(),
                ));
            }
        }

        for (tag, substitutions) in [
            (FeatureTag::Concept, &self.concept_substitutions),
            (FeatureTag::Role, &self.role_substitutions),
            (FeatureTag::Boolean, &self.boolean_substitutions),
            (FeatureTag::Numerical, &self.numerical_substitutions),
        ] {
            substitution_order(substitutions).map_err(|id| {
                GrammarError::CyclicSubstitution(self.nonterminal_name(tag, id).to_string())
            })?;
        }

        Ok(())
    }
}

fn collect_concept_body(body: &ConceptBody, bodies: &mut HashSet<(FeatureTag, u32)>) {
    match *body {
        ConceptBody::Bot
        | ConceptBody::Top
        | ConceptBody::AtomicState(_, _)
        | ConceptBody::AtomicGoal(_, _, _)
        | ConceptBody::Nominal(_) => {}
        ConceptBody::Intersection(a, b) | ConceptBody::Union(a, b) => {
            bodies.insert((FeatureTag::Concept, a));
            bodies.insert((FeatureTag::Concept, b));
        }
        ConceptBody::Negation(a) => {
            bodies.insert((FeatureTag::Concept, a));
        }
        ConceptBody::ValueRestriction(r, c) | ConceptBody::ExistentialQuantification(r, c) => {
            bodies.insert((FeatureTag::Role, r));
            bodies.insert((FeatureTag::Concept, c));
        }
        ConceptBody::RoleValueMapContainment(a, b) | ConceptBody::RoleValueMapEquality(a, b) => {
            bodies.insert((FeatureTag::Role, a));
            bodies.insert((FeatureTag::Role, b));
        }
    }
}

fn collect_role_body(body: &RoleBody, bodies: &mut HashSet<(FeatureTag, u32)>) {
    match *body {
        RoleBody::Universal | RoleBody::AtomicState(_, _) | RoleBody::AtomicGoal(_, _, _) => {}
        RoleBody::Intersection(a, b) | RoleBody::Union(a, b) | RoleBody::Composition(a, b) => {
            bodies.insert((FeatureTag::Role, a));
            bodies.insert((FeatureTag::Role, b));
        }
        RoleBody::Complement(a)
        | RoleBody::Inverse(a)
        | RoleBody::TransitiveClosure(a)
        | RoleBody::ReflexiveTransitiveClosure(a) => {
            bodies.insert((FeatureTag::Role, a));
        }
        RoleBody::Restriction(r, c) => {
            bodies.insert((FeatureTag::Role, r));
            bodies.insert((FeatureTag::Concept, c));
        }
        RoleBody::Identity(c) => {
            bodies.insert((FeatureTag::Concept, c));
        }
    }
}

/// Topologically orders substitution rules so that a rule runs after every
/// rule its body depends on; `Err` carries a non-terminal on a cycle.
pub(crate) fn substitution_order(
    substitutions: &[SubstitutionRule],
) -> Result<Vec<usize>, NonTerminalId> {
    // edges: rule with head h must run after rules whose head is its body
    let mut by_head: HashMap<NonTerminalId, Vec<usize>> = HashMap::new();
    for (index, rule) in substitutions.iter().enumerate() {
        by_head.entry(rule.head).or_default().push(index);
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }
    let mut marks = vec![Mark::Unvisited; substitutions.len()];
    let mut order = vec![];

    fn visit(
        index: usize,
        substitutions: &[SubstitutionRule],
        by_head: &HashMap<NonTerminalId, Vec<usize>>,
        marks: &mut [Mark],
        order: &mut Vec<usize>,
    ) -> Result<(), NonTerminalId> {
        match marks[index] {
            Mark::Done => return Ok(()),
            Mark::InProgress => return Err(substitutions[index].head),
            Mark::Unvisited => {}
        }
        marks[index] = Mark::InProgress;
        if let Some(dependencies) = by_head.get(&substitutions[index].body) {
            for &dependency in dependencies {
                visit(dependency, substitutions, by_head, marks, order)?;
            }
        }
        marks[index] = Mark::Done;
        order.push(index);
        Ok(())
    }

    for index in 0..substitutions.len() {
        visit(index, substitutions, &by_head, &mut marks, &mut order)?;
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn gripper_task() -> Task {
        Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT)
    }

    #[test]
    fn presets_are_well_formed() {
        let task = gripper_task();
        assert!(Grammar::create(GrammarPreset::FrancesEtAlAaai2021, &task).is_ok());
        assert!(Grammar::create(GrammarPreset::Complete, &task).is_ok());
    }

    #[test]
    fn undefined_body_nonterminal_is_rejected() {
        let task = gripper_task();
        let text = r#"
        [start_symbols]
            <concept_start> = <concept>
        [grammar_rules]
            <concept> ::= @concept_negation <missing>
        "#;
        assert_eq!(
            Grammar::from_text(text, &task),
            Err(GrammarError::UndefinedBodyNonTerminal("missing".to_string()))
        );
    }

    #[test]
    fn missing_start_symbol_is_rejected() {
        let task = gripper_task();
        let text = r#"
        [start_symbols]
        [grammar_rules]
            <concept> ::= @concept_top
        "#;
        assert_eq!(
            Grammar::from_text(text, &task),
            Err(GrammarError::NoStartSymbol)
        );
    }

    #[test]
    fn start_symbol_in_a_body_is_rejected() {
        let task = gripper_task();
        let text = r#"
        [start_symbols]
            <concept_start> = <concept>
        [grammar_rules]
            <concept> ::= @concept_top
            <concept> ::= @concept_negation <concept_start>
        "#;
        assert_eq!(
            Grammar::from_text(text, &task),
            Err(GrammarError::StartSymbolInBody("concept_start".to_string()))
        );
    }

    #[test]
    fn unknown_predicates_are_rejected() {
        let task = gripper_task();
        let text = r#"
        [start_symbols]
            <concept_start> = <concept>
        [grammar_rules]
            <concept> ::= @concept_atomic_state no-such-predicate
        "#;
        assert_eq!(
            Grammar::from_text(text, &task),
            Err(GrammarError::UnknownPredicate("no-such-predicate".to_string()))
        );
    }

    #[test]
    fn arity_mismatches_are_rejected() {
        let task = gripper_task();
        // `at` has arity 2 and cannot be a concept
        let text = r#"
        [start_symbols]
            <concept_start> = <concept>
        [grammar_rules]
            <concept> ::= @concept_atomic_state at
        "#;
        assert_eq!(
            Grammar::from_text(text, &task),
            Err(GrammarError::PredicateArity("at".to_string()))
        );
    }

    #[test]
    fn parsed_rules_land_in_their_tag_partitions() {
        let task = gripper_task();
        let text = r#"
        [start_symbols]
            <concept_start> = <concept>
            <numerical_start> = <numerical>
        [grammar_rules]
            <concept_prim> ::= @concept_atomic_state at-robby
            <role_prim> ::= @role_atomic_state at
            <concept_some> ::= @concept_existential_quantification <role_prim> <concept_prim>
            <concept> ::= <concept_prim>
            <concept> ::= <concept_some>
            <numerical> ::= @numerical_count <concept>
        "#;
        let grammar = Grammar::from_text(text, &task).unwrap();
        assert_eq!(grammar.concept_rules.len(), 2);
        assert_eq!(grammar.role_rules.len(), 1);
        assert_eq!(grammar.numerical_rules.len(), 1);
        // two explicit substitutions plus the implicit start substitutions
        assert_eq!(grammar.concept_substitutions.len(), 3);
        assert_eq!(grammar.numerical_substitutions.len(), 1);
        assert!(grammar.concept_start.is_some());
        assert!(grammar.role_start.is_none());
    }
}
