//! Systematic sentence generation by syntactic complexity, with
//! denotation-based refinement pruning over a fixed representative state
//! set.

use crate::dl::grammar::{
    substitution_order, BooleanBody, ConceptBody, Grammar, NonTerminalId, NumericalBody, RoleBody,
    SubstitutionRule,
};
use crate::dl::{
    evaluate_boolean, evaluate_concept, evaluate_numerical, evaluate_role, Boolean, BooleanId,
    Concept, ConceptDenotation, ConceptId, DenotationCaches, EvaluationContext, Numerical,
    NumericalId, Repositories, Role, RoleDenotation, RoleId,
};
use crate::search::{State, StateId, Task};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::debug;

/// Per-tag generation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorStatistics {
    pub num_generated: usize,
    pub num_kept: usize,
    pub num_pruned: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentenceStatistics {
    pub concept: GeneratorStatistics,
    pub role: GeneratorStatistics,
    pub boolean: GeneratorStatistics,
    pub numerical: GeneratorStatistics,
}

/// The kept sentences, per (non-terminal, complexity).
#[derive(Debug, Default)]
pub struct GeneratedSentences {
    concepts: HashMap<(NonTerminalId, usize), Vec<ConceptId>>,
    roles: HashMap<(NonTerminalId, usize), Vec<RoleId>>,
    booleans: HashMap<(NonTerminalId, usize), Vec<BooleanId>>,
    numericals: HashMap<(NonTerminalId, usize), Vec<NumericalId>>,
}

impl GeneratedSentences {
    pub fn concepts_at(&self, nonterminal: NonTerminalId, complexity: usize) -> &[ConceptId] {
        self.concepts
            .get(&(nonterminal, complexity))
            .map_or(&[], Vec::as_slice)
    }

    pub fn roles_at(&self, nonterminal: NonTerminalId, complexity: usize) -> &[RoleId] {
        self.roles
            .get(&(nonterminal, complexity))
            .map_or(&[], Vec::as_slice)
    }

    pub fn booleans_at(&self, nonterminal: NonTerminalId, complexity: usize) -> &[BooleanId] {
        self.booleans
            .get(&(nonterminal, complexity))
            .map_or(&[], Vec::as_slice)
    }

    pub fn numericals_at(&self, nonterminal: NonTerminalId, complexity: usize) -> &[NumericalId] {
        self.numericals
            .get(&(nonterminal, complexity))
            .map_or(&[], Vec::as_slice)
    }

    /// All kept concepts of a non-terminal up to a complexity bound.
    pub fn concepts_up_to(
        &self,
        nonterminal: NonTerminalId,
        max_complexity: usize,
    ) -> Vec<ConceptId> {
        (1..=max_complexity)
            .flat_map(|c| self.concepts_at(nonterminal, c).iter().copied())
            .collect()
    }
}

/// Refinement pruning against a fixed representative state set: a candidate
/// is pruned iff its denotation vector across the states equals that of an
/// already-kept sentence.
#[derive(Debug)]
pub struct StateListRefinementPruningFunction {
    task: Rc<Task>,
    states: Vec<(StateId, State)>,
    caches: DenotationCaches,
    seen_concepts: HashSet<Vec<ConceptDenotation>>,
    seen_roles: HashSet<Vec<RoleDenotation>>,
    seen_booleans: HashSet<Vec<bool>>,
    seen_numericals: HashSet<Vec<u32>>,
}

impl StateListRefinementPruningFunction {
    pub fn new(task: Rc<Task>, states: Vec<(StateId, State)>) -> Self {
        Self {
            task,
            states,
            caches: DenotationCaches::new(),
            seen_concepts: HashSet::new(),
            seen_roles: HashSet::new(),
            seen_booleans: HashSet::new(),
            seen_numericals: HashSet::new(),
        }
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn concept_denotations(
        &mut self,
        repositories: &Repositories,
        id: ConceptId,
    ) -> Vec<ConceptDenotation> {
        let task = self.task.clone();
        self.states
            .iter()
            .map(|(state_id, state)| {
                let context = EvaluationContext::new(&task, state, *state_id);
                (*evaluate_concept(repositories, &context, &mut self.caches, id)).clone()
            })
            .collect()
    }

    pub fn should_prune_concept(&mut self, repositories: &Repositories, id: ConceptId) -> bool {
        let vector = self.concept_denotations(repositories, id);
        !self.seen_concepts.insert(vector)
    }

    pub fn should_prune_role(&mut self, repositories: &Repositories, id: RoleId) -> bool {
        let task = self.task.clone();
        let vector: Vec<RoleDenotation> = self
            .states
            .iter()
            .map(|(state_id, state)| {
                let context = EvaluationContext::new(&task, state, *state_id);
                (*evaluate_role(repositories, &context, &mut self.caches, id)).clone()
            })
            .collect();
        !self.seen_roles.insert(vector)
    }

    pub fn should_prune_boolean(&mut self, repositories: &Repositories, id: BooleanId) -> bool {
        let task = self.task.clone();
        let vector: Vec<bool> = self
            .states
            .iter()
            .map(|(state_id, state)| {
                let context = EvaluationContext::new(&task, state, *state_id);
                evaluate_boolean(repositories, &context, &mut self.caches, id)
            })
            .collect();
        !self.seen_booleans.insert(vector)
    }

    pub fn should_prune_numerical(&mut self, repositories: &Repositories, id: NumericalId) -> bool {
        let task = self.task.clone();
        let vector: Vec<u32> = self
            .states
            .iter()
            .map(|(state_id, state)| {
                let context = EvaluationContext::new(&task, state, *state_id);
                evaluate_numerical(repositories, &context, &mut self.caches, id)
            })
            .collect();
        !self.seen_numericals.insert(vector)
    }
}

/// Generates sentences by complexity c = 1..=max_complexity: derivation
/// rules expand one constructor layer over the already-generated pools of
/// their child non-terminals, then substitution rules copy pools along
/// their topological order.
#[derive(Debug)]
pub struct SentenceGenerator {
    max_complexity: usize,
}

impl SentenceGenerator {
    pub fn new(max_complexity: usize) -> Self {
        Self { max_complexity }
    }

    pub fn generate(
        &self,
        grammar: &Grammar,
        repositories: &mut Repositories,
        pruning: &mut StateListRefinementPruningFunction,
    ) -> (GeneratedSentences, SentenceStatistics) {
        let mut sentences = GeneratedSentences::default();
        let mut statistics = SentenceStatistics::default();

        let concept_order = substitution_order(&grammar.concept_substitutions)
            .expect("verified grammars have acyclic substitutions");
        let role_order = substitution_order(&grammar.role_substitutions)
            .expect("verified grammars have acyclic substitutions");
        let boolean_order = substitution_order(&grammar.boolean_substitutions)
            .expect("verified grammars have acyclic substitutions");
        let numerical_order = substitution_order(&grammar.numerical_substitutions)
            .expect("verified grammars have acyclic substitutions");

        for complexity in 1..=self.max_complexity {
            for rule in &grammar.concept_rules {
                let candidates =
                    expand_concept_body(&rule.body, complexity, &sentences, repositories);
                for candidate in candidates {
                    statistics.concept.num_generated += 1;
                    if pruning.should_prune_concept(repositories, candidate) {
                        statistics.concept.num_pruned += 1;
                    } else {
                        statistics.concept.num_kept += 1;
                        sentences
                            .concepts
                            .entry((rule.head, complexity))
                            .or_default()
                            .push(candidate);
                    }
                }
            }
            for rule in &grammar.role_rules {
                let candidates = expand_role_body(&rule.body, complexity, &sentences, repositories);
                for candidate in candidates {
                    statistics.role.num_generated += 1;
                    if pruning.should_prune_role(repositories, candidate) {
                        statistics.role.num_pruned += 1;
                    } else {
                        statistics.role.num_kept += 1;
                        sentences
                            .roles
                            .entry((rule.head, complexity))
                            .or_default()
                            .push(candidate);
                    }
                }
            }
            for rule in &grammar.boolean_rules {
                let candidates =
                    expand_boolean_body(&rule.body, complexity, &sentences, repositories);
                for candidate in candidates {
                    statistics.boolean.num_generated += 1;
                    if pruning.should_prune_boolean(repositories, candidate) {
                        statistics.boolean.num_pruned += 1;
                    } else {
                        statistics.boolean.num_kept += 1;
                        sentences
                            .booleans
                            .entry((rule.head, complexity))
                            .or_default()
                            .push(candidate);
                    }
                }
            }
            for rule in &grammar.numerical_rules {
                let candidates =
                    expand_numerical_body(&rule.body, complexity, &sentences, repositories);
                for candidate in candidates {
                    statistics.numerical.num_generated += 1;
                    if pruning.should_prune_numerical(repositories, candidate) {
                        statistics.numerical.num_pruned += 1;
                    } else {
                        statistics.numerical.num_kept += 1;
                        sentences
                            .numericals
                            .entry((rule.head, complexity))
                            .or_default()
                            .push(candidate);
                    }
                }
            }

            apply_substitutions(
                &grammar.concept_substitutions,
                &concept_order,
                complexity,
                &mut sentences.concepts,
            );
            apply_substitutions(
                &grammar.role_substitutions,
                &role_order,
                complexity,
                &mut sentences.roles,
            );
            apply_substitutions(
                &grammar.boolean_substitutions,
                &boolean_order,
                complexity,
                &mut sentences.booleans,
            );
            apply_substitutions(
                &grammar.numerical_substitutions,
                &numerical_order,
                complexity,
                &mut sentences.numericals,
            );
        }

        debug!(
            concepts_kept = statistics.concept.num_kept,
            roles_kept = statistics.role.num_kept,
            booleans_kept = statistics.boolean.num_kept,
            numericals_kept = statistics.numerical.num_kept,
            "sentence generation finished"
        );
        (sentences, statistics)
    }
}

fn apply_substitutions(
    substitutions: &[SubstitutionRule],
    order: &[usize],
    complexity: usize,
    pools: &mut HashMap<(NonTerminalId, usize), Vec<u32>>,
) {
    for &index in order {
        let rule = substitutions[index];
        let source = pools
            .get(&(rule.body, complexity))
            .cloned()
            .unwrap_or_default();
        if !source.is_empty() {
            pools
                .entry((rule.head, complexity))
                .or_default()
                .extend(source);
        }
    }
}

/// Splits `complexity - 1` into two positive parts; `commutative` restricts
/// to `i <= j` (partial symmetry breaking).
fn binary_splits(complexity: usize, commutative: bool) -> Vec<(usize, usize)> {
    let mut splits = vec![];
    if complexity >= 3 {
        for i in 1..complexity - 1 {
            let j = complexity - 1 - i;
            if commutative && i > j {
                continue;
            }
            splits.push((i, j));
        }
    }
    splits
}

fn expand_concept_body(
    body: &ConceptBody,
    complexity: usize,
    sentences: &GeneratedSentences,
    repositories: &mut Repositories,
) -> Vec<ConceptId> {
    let mut result = vec![];
    match *body {
        ConceptBody::Bot => {
            if complexity == 1 {
                result.push(repositories.get_or_create_concept(Concept::Bot));
            }
        }
        ConceptBody::Top => {
            if complexity == 1 {
                result.push(repositories.get_or_create_concept(Concept::Top));
            }
        }
        ConceptBody::AtomicState(tag, predicate) => {
            if complexity == 1 {
                result.push(
                    repositories.get_or_create_concept(Concept::AtomicState(tag, predicate)),
                );
            }
        }
        ConceptBody::AtomicGoal(tag, predicate, negated) => {
            if complexity == 1 {
                result.push(repositories.get_or_create_concept(Concept::AtomicGoal(
                    tag, predicate, negated,
                )));
            }
        }
        ConceptBody::Nominal(object) => {
            if complexity == 1 {
                result.push(repositories.get_or_create_concept(Concept::Nominal(object)));
            }
        }
        ConceptBody::Negation(inner) => {
            if complexity >= 2 {
                for &concept in sentences.concepts_at(inner, complexity - 1) {
                    result.push(repositories.get_or_create_concept(Concept::Negation(concept)));
                }
            }
        }
        ConceptBody::Intersection(left, right) | ConceptBody::Union(left, right) => {
            let union = matches!(body, ConceptBody::Union(_, _));
            for (i, j) in binary_splits(complexity, true) {
                for &a in sentences.concepts_at(left, i) {
                    for &b in sentences.concepts_at(right, j) {
                        let concept = if union {
                            Concept::Union(a, b)
                        } else {
                            Concept::Intersection(a, b)
                        };
                        result.push(repositories.get_or_create_concept(concept));
                    }
                }
            }
        }
        ConceptBody::ValueRestriction(role, concept)
        | ConceptBody::ExistentialQuantification(role, concept) => {
            let existential = matches!(body, ConceptBody::ExistentialQuantification(_, _));
            for (i, j) in binary_splits(complexity, false) {
                for &r in sentences.roles_at(role, i) {
                    for &c in sentences.concepts_at(concept, j) {
                        let built = if existential {
                            Concept::ExistentialQuantification(r, c)
                        } else {
                            Concept::ValueRestriction(r, c)
                        };
                        result.push(repositories.get_or_create_concept(built));
                    }
                }
            }
        }
        ConceptBody::RoleValueMapContainment(left, right) => {
            for (i, j) in binary_splits(complexity, false) {
                for &a in sentences.roles_at(left, i) {
                    for &b in sentences.roles_at(right, j) {
                        result.push(
                            repositories
                                .get_or_create_concept(Concept::RoleValueMapContainment(a, b)),
                        );
                    }
                }
            }
        }
        ConceptBody::RoleValueMapEquality(left, right) => {
            for (i, j) in binary_splits(complexity, true) {
                for &a in sentences.roles_at(left, i) {
                    for &b in sentences.roles_at(right, j) {
                        result.push(
                            repositories.get_or_create_concept(Concept::RoleValueMapEquality(a, b)),
                        );
                    }
                }
            }
        }
    }
    result
}

fn expand_role_body(
    body: &RoleBody,
    complexity: usize,
    sentences: &GeneratedSentences,
    repositories: &mut Repositories,
) -> Vec<RoleId> {
    let mut result = vec![];
    match *body {
        RoleBody::Universal => {
            if complexity == 1 {
                result.push(repositories.get_or_create_role(Role::Universal));
            }
        }
        RoleBody::AtomicState(tag, predicate) => {
            if complexity == 1 {
                result.push(repositories.get_or_create_role(Role::AtomicState(tag, predicate)));
            }
        }
        RoleBody::AtomicGoal(tag, predicate, negated) => {
            if complexity == 1 {
                result.push(
                    repositories.get_or_create_role(Role::AtomicGoal(tag, predicate, negated)),
                );
            }
        }
        RoleBody::Complement(inner)
        | RoleBody::Inverse(inner)
        | RoleBody::TransitiveClosure(inner)
        | RoleBody::ReflexiveTransitiveClosure(inner) => {
            if complexity >= 2 {
                for &role in sentences.roles_at(inner, complexity - 1) {
                    let built = match body {
                        RoleBody::Complement(_) => Role::Complement(role),
                        RoleBody::Inverse(_) => Role::Inverse(role),
                        RoleBody::TransitiveClosure(_) => Role::TransitiveClosure(role),
                        _ => Role::ReflexiveTransitiveClosure(role),
                    };
                    result.push(repositories.get_or_create_role(built));
                }
            }
        }
        RoleBody::Intersection(left, right) | RoleBody::Union(left, right) => {
            let union = matches!(body, RoleBody::Union(_, _));
            for (i, j) in binary_splits(complexity, true) {
                for &a in sentences.roles_at(left, i) {
                    for &b in sentences.roles_at(right, j) {
                        let built = if union {
                            Role::Union(a, b)
                        } else {
                            Role::Intersection(a, b)
                        };
                        result.push(repositories.get_or_create_role(built));
                    }
                }
            }
        }
        RoleBody::Composition(left, right) => {
            for (i, j) in binary_splits(complexity, false) {
                for &a in sentences.roles_at(left, i) {
                    for &b in sentences.roles_at(right, j) {
                        result.push(repositories.get_or_create_role(Role::Composition(a, b)));
                    }
                }
            }
        }
        RoleBody::Restriction(role, concept) => {
            for (i, j) in binary_splits(complexity, false) {
                for &r in sentences.roles_at(role, i) {
                    for &c in sentences.concepts_at(concept, j) {
                        result.push(repositories.get_or_create_role(Role::Restriction(r, c)));
                    }
                }
            }
        }
        RoleBody::Identity(concept) => {
            if complexity >= 2 {
                for &c in sentences.concepts_at(concept, complexity - 1) {
                    result.push(repositories.get_or_create_role(Role::Identity(c)));
                }
            }
        }
    }
    result
}

fn expand_boolean_body(
    body: &BooleanBody,
    complexity: usize,
    sentences: &GeneratedSentences,
    repositories: &mut Repositories,
) -> Vec<BooleanId> {
    let mut result = vec![];
    match *body {
        BooleanBody::AtomicState(tag, predicate) => {
            if complexity == 1 {
                result.push(
                    repositories.get_or_create_boolean(Boolean::AtomicState(tag, predicate)),
                );
            }
        }
        BooleanBody::NonemptyConcept(inner) => {
            if complexity >= 2 {
                for &concept in sentences.concepts_at(inner, complexity - 1) {
                    result
                        .push(repositories.get_or_create_boolean(Boolean::NonemptyConcept(concept)));
                }
            }
        }
        BooleanBody::NonemptyRole(inner) => {
            if complexity >= 2 {
                for &role in sentences.roles_at(inner, complexity - 1) {
                    result.push(repositories.get_or_create_boolean(Boolean::NonemptyRole(role)));
                }
            }
        }
    }
    result
}

fn expand_numerical_body(
    body: &NumericalBody,
    complexity: usize,
    sentences: &GeneratedSentences,
    repositories: &mut Repositories,
) -> Vec<NumericalId> {
    let mut result = vec![];
    match *body {
        NumericalBody::CountConcept(inner) => {
            if complexity >= 2 {
                for &concept in sentences.concepts_at(inner, complexity - 1) {
                    result
                        .push(repositories.get_or_create_numerical(Numerical::CountConcept(concept)));
                }
            }
        }
        NumericalBody::CountRole(inner) => {
            if complexity >= 2 {
                for &role in sentences.roles_at(inner, complexity - 1) {
                    result.push(repositories.get_or_create_numerical(Numerical::CountRole(role)));
                }
            }
        }
        NumericalBody::Distance(source, role, target) => {
            if complexity >= 4 {
                for i in 1..complexity - 2 {
                    for j in 1..complexity - 1 - i {
                        let k = complexity - 1 - i - j;
                        for &c1 in sentences.concepts_at(source, i) {
                            for &r in sentences.roles_at(role, j) {
                                for &c2 in sentences.concepts_at(target, k) {
                                    result.push(repositories.get_or_create_numerical(
                                        Numerical::Distance(c1, r, c2),
                                    ));
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dl::grammar::{Grammar, GrammarPreset};
    use crate::search::grounding::DeleteRelaxedProblemExplorator;
    use crate::test_utils::*;

    fn representative_states(task: &Rc<Task>) -> Vec<(StateId, State)> {
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let (repository, order) = enumerate_reachable_states(&explorator);
        order
            .into_iter()
            .map(|id| (id, repository.get(id).clone()))
            .collect()
    }

    #[test]
    fn generation_counts_are_consistent() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let states = representative_states(&task);
        let grammar = Grammar::create(GrammarPreset::FrancesEtAlAaai2021, &task).unwrap();

        let mut repositories = Repositories::new();
        let mut pruning = StateListRefinementPruningFunction::new(task.clone(), states);
        let generator = SentenceGenerator::new(4);
        let (sentences, statistics) = generator.generate(&grammar, &mut repositories, &mut pruning);

        for tag_statistics in [
            statistics.concept,
            statistics.role,
            statistics.boolean,
            statistics.numerical,
        ] {
            assert_eq!(
                tag_statistics.num_generated,
                tag_statistics.num_kept + tag_statistics.num_pruned
            );
        }
        assert!(statistics.concept.num_kept > 0);
        assert!(statistics.role.num_kept > 0);
        assert!(statistics.numerical.num_kept > 0);

        // the start pool receives everything through substitutions
        let start = grammar.concept_start.unwrap();
        let in_start_pool = sentences.concepts_up_to(start, 4).len();
        assert_eq!(in_start_pool, statistics.concept.num_kept);
    }

    /// Testable property: every pair of kept sentences has distinct
    /// denotation vectors on the representative state set.
    #[test]
    fn kept_sentences_have_distinct_denotation_vectors() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let states = representative_states(&task);
        let grammar = Grammar::create(GrammarPreset::FrancesEtAlAaai2021, &task).unwrap();

        let mut repositories = Repositories::new();
        let mut pruning = StateListRefinementPruningFunction::new(task.clone(), states);
        let generator = SentenceGenerator::new(3);
        let (sentences, _) = generator.generate(&grammar, &mut repositories, &mut pruning);

        let start = grammar.concept_start.unwrap();
        let kept = sentences.concepts_up_to(start, 3);
        let mut vectors = std::collections::HashSet::new();
        for concept in kept {
            let vector = pruning.concept_denotations(&repositories, concept);
            assert!(vectors.insert(vector), "duplicate denotation vector kept");
        }
    }

    #[test]
    fn complexity_one_concepts_of_the_complete_preset() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let states = representative_states(&task);
        let grammar = Grammar::create(GrammarPreset::Complete, &task).unwrap();

        let mut repositories = Repositories::new();
        let mut pruning = StateListRefinementPruningFunction::new(task.clone(), states);
        let generator = SentenceGenerator::new(1);
        let (_, statistics) = generator.generate(&grammar, &mut repositories, &mut pruning);

        // gripper has two arity-1 predicates (at-robby, free): bot, top,
        // two atomic-state and four atomic-goal concepts, plus one nominal
        // per object
        assert_eq!(
            statistics.concept.num_generated,
            2 + 2 + 4 + task.objects.len()
        );
    }
}
