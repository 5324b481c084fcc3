//! Denotation-based evaluation of the constructor algebra. Every
//! constructor's evaluation is a total function of the interpreted state;
//! results are memoised per (constructor, state).

use crate::dl::{
    Boolean, BooleanId, Concept, ConceptDenotation, ConceptId, DenotationCaches, Numerical,
    NumericalId, Repositories, Role, RoleDenotation, RoleId, INFINITY_NUMERICAL,
};
use crate::search::{ObjectTuple, PredicateTag, State, StateId, Task};
use bit_set::BitSet;
use std::collections::VecDeque;
use std::rc::Rc;

/// The interpreted state a constructor is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub task: &'a Task,
    pub state: &'a State,
    pub state_id: StateId,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(task: &'a Task, state: &'a State, state_id: StateId) -> Self {
        Self {
            task,
            state,
            state_id,
        }
    }

    fn num_objects(&self) -> usize {
        self.task.objects.len()
    }

    /// The argument tuples of the true ground atoms of a predicate.
    fn true_atoms(&self, tag: PredicateTag, predicate_index: usize) -> Vec<ObjectTuple> {
        let repository = self.task.atoms.get(tag);
        let mut result = vec![];
        for index in 0..repository.len() as u32 {
            if repository.predicate_index(index) != predicate_index {
                continue;
            }
            let holds = match tag {
                PredicateTag::Static => true,
                PredicateTag::Fluent => self.state.has_fluent_atom(index),
                PredicateTag::Derived => self.state.has_derived_atom(index),
            };
            if holds {
                result.push(repository.objects(index));
            }
        }
        result
    }

    /// The argument tuples of the goal atoms of a predicate, by polarity.
    fn goal_atoms(
        &self,
        tag: PredicateTag,
        predicate_index: usize,
        negated: bool,
    ) -> Vec<ObjectTuple> {
        let goal = &self.task.goal;
        match tag {
            PredicateTag::Static => goal
                .static_literals
                .iter()
                .filter(|literal| literal.is_negated() == negated)
                .filter(|literal| literal.underlying().0 == predicate_index)
                .map(|literal| literal.underlying().1.clone())
                .collect(),
            PredicateTag::Fluent | PredicateTag::Derived => {
                let repository = self.task.atoms.get(tag);
                let atoms = if negated {
                    goal.condition.negative(tag)
                } else {
                    goal.condition.positive(tag)
                };
                atoms
                    .iter()
                    .filter(|&&atom| repository.predicate_index(atom) == predicate_index)
                    .map(|&atom| repository.objects(atom))
                    .collect()
            }
        }
    }
}

pub fn evaluate_concept(
    repositories: &Repositories,
    context: &EvaluationContext,
    caches: &mut DenotationCaches,
    id: ConceptId,
) -> Rc<ConceptDenotation> {
    if let Some(cached) = caches.concepts.get(&(id, context.state_id)) {
        return cached.clone();
    }

    let denotation = match repositories.concept(id).clone() {
        Concept::Top => {
            let mut set = BitSet::new();
            for object in 0..context.num_objects() {
                set.insert(object);
            }
            ConceptDenotation::from_bitset(&set)
        }
        Concept::Bot => ConceptDenotation::default(),
        Concept::AtomicState(tag, predicate) => {
            let mut set = BitSet::new();
            for objects in context.true_atoms(tag, predicate) {
                set.insert(objects[0]);
            }
            ConceptDenotation::from_bitset(&set)
        }
        Concept::AtomicGoal(tag, predicate, negated) => {
            let mut set = BitSet::new();
            for objects in context.goal_atoms(tag, predicate, negated) {
                set.insert(objects[0]);
            }
            ConceptDenotation::from_bitset(&set)
        }
        Concept::Intersection(left, right) => {
            let mut set = evaluate_concept(repositories, context, caches, left).to_bitset();
            set.intersect_with(&evaluate_concept(repositories, context, caches, right).to_bitset());
            ConceptDenotation::from_bitset(&set)
        }
        Concept::Union(left, right) => {
            let mut set = evaluate_concept(repositories, context, caches, left).to_bitset();
            set.union_with(&evaluate_concept(repositories, context, caches, right).to_bitset());
            ConceptDenotation::from_bitset(&set)
        }
        Concept::Negation(inner) => {
            let inner = evaluate_concept(repositories, context, caches, inner);
            let mut set = BitSet::new();
            for object in 0..context.num_objects() {
                if !inner.contains(object as u32) {
                    set.insert(object);
                }
            }
            ConceptDenotation::from_bitset(&set)
        }
        Concept::ValueRestriction(role, concept) => {
            let role = evaluate_role(repositories, context, caches, role);
            let concept = evaluate_concept(repositories, context, caches, concept);
            let mut set = BitSet::new();
            for object in 0..context.num_objects() as u32 {
                if role.successors(object).all(|b| concept.contains(b)) {
                    set.insert(object as usize);
                }
            }
            ConceptDenotation::from_bitset(&set)
        }
        Concept::ExistentialQuantification(role, concept) => {
            let role = evaluate_role(repositories, context, caches, role);
            let concept = evaluate_concept(repositories, context, caches, concept);
            let mut set = BitSet::new();
            for &(a, b) in role.pairs() {
                if concept.contains(b) {
                    set.insert(a as usize);
                }
            }
            ConceptDenotation::from_bitset(&set)
        }
        Concept::RoleValueMapContainment(left, right) => {
            let left = evaluate_role(repositories, context, caches, left);
            let right = evaluate_role(repositories, context, caches, right);
            let mut set = BitSet::new();
            for object in 0..context.num_objects() as u32 {
                if left.successors(object).all(|b| right.contains((object, b))) {
                    set.insert(object as usize);
                }
            }
            ConceptDenotation::from_bitset(&set)
        }
        Concept::RoleValueMapEquality(left, right) => {
            let left = evaluate_role(repositories, context, caches, left);
            let right = evaluate_role(repositories, context, caches, right);
            let mut set = BitSet::new();
            for object in 0..context.num_objects() as u32 {
                let forward = left.successors(object).all(|b| right.contains((object, b)));
                let backward = right.successors(object).all(|b| left.contains((object, b)));
                if forward && backward {
                    set.insert(object as usize);
                }
            }
            ConceptDenotation::from_bitset(&set)
        }
        Concept::Nominal(object) => ConceptDenotation::from_sorted(vec![object as u32]),
    };

    let denotation = Rc::new(denotation);
    caches
        .concepts
        .insert((id, context.state_id), denotation.clone());
    denotation
}

pub fn evaluate_role(
    repositories: &Repositories,
    context: &EvaluationContext,
    caches: &mut DenotationCaches,
    id: RoleId,
) -> Rc<RoleDenotation> {
    if let Some(cached) = caches.roles.get(&(id, context.state_id)) {
        return cached.clone();
    }

    let num_objects = context.num_objects() as u32;
    let denotation = match repositories.role(id).clone() {
        Role::Universal => {
            let mut pairs = vec![];
            for a in 0..num_objects {
                for b in 0..num_objects {
                    pairs.push((a, b));
                }
            }
            RoleDenotation::new(pairs)
        }
        Role::AtomicState(tag, predicate) => RoleDenotation::new(
            context
                .true_atoms(tag, predicate)
                .into_iter()
                .map(|objects| (objects[0] as u32, objects[1] as u32))
                .collect(),
        ),
        Role::AtomicGoal(tag, predicate, negated) => RoleDenotation::new(
            context
                .goal_atoms(tag, predicate, negated)
                .into_iter()
                .map(|objects| (objects[0] as u32, objects[1] as u32))
                .collect(),
        ),
        Role::Intersection(left, right) => {
            let left = evaluate_role(repositories, context, caches, left);
            let right = evaluate_role(repositories, context, caches, right);
            RoleDenotation::new(
                left.pairs()
                    .iter()
                    .copied()
                    .filter(|&pair| right.contains(pair))
                    .collect(),
            )
        }
        Role::Union(left, right) => {
            let left = evaluate_role(repositories, context, caches, left);
            let right = evaluate_role(repositories, context, caches, right);
            let mut pairs = left.pairs().to_vec();
            pairs.extend(right.pairs().iter().copied());
            RoleDenotation::new(pairs)
        }
        Role::Complement(inner) => {
            let inner = evaluate_role(repositories, context, caches, inner);
            let mut pairs = vec![];
            for a in 0..num_objects {
                for b in 0..num_objects {
                    if !inner.contains((a, b)) {
                        pairs.push((a, b));
                    }
                }
            }
            RoleDenotation::new(pairs)
        }
        Role::Inverse(inner) => {
            let inner = evaluate_role(repositories, context, caches, inner);
            RoleDenotation::new(inner.pairs().iter().map(|&(a, b)| (b, a)).collect())
        }
        Role::Composition(left, right) => {
            let left = evaluate_role(repositories, context, caches, left);
            let right = evaluate_role(repositories, context, caches, right);
            let mut pairs = vec![];
            for &(a, b) in left.pairs() {
                for c in right.successors(b) {
                    pairs.push((a, c));
                }
            }
            RoleDenotation::new(pairs)
        }
        Role::TransitiveClosure(inner) => {
            let inner = evaluate_role(repositories, context, caches, inner);
            transitive_closure(&inner)
        }
        Role::ReflexiveTransitiveClosure(inner) => {
            let inner = evaluate_role(repositories, context, caches, inner);
            let closure = transitive_closure(&inner);
            let mut pairs = closure.pairs().to_vec();
            for object in 0..num_objects {
                pairs.push((object, object));
            }
            RoleDenotation::new(pairs)
        }
        Role::Restriction(role, concept) => {
            let role = evaluate_role(repositories, context, caches, role);
            let concept = evaluate_concept(repositories, context, caches, concept);
            RoleDenotation::new(
                role.pairs()
                    .iter()
                    .copied()
                    .filter(|&(_, b)| concept.contains(b))
                    .collect(),
            )
        }
        Role::Identity(concept) => {
            let concept = evaluate_concept(repositories, context, caches, concept);
            RoleDenotation::new(concept.objects().iter().map(|&a| (a, a)).collect())
        }
    };

    let denotation = Rc::new(denotation);
    caches
        .roles
        .insert((id, context.state_id), denotation.clone());
    denotation
}

fn transitive_closure(role: &RoleDenotation) -> RoleDenotation {
    let mut pairs: Vec<(u32, u32)> = role.pairs().to_vec();
    loop {
        let current = RoleDenotation::new(pairs.clone());
        let mut extended = current.pairs().to_vec();
        for &(a, b) in current.pairs() {
            for c in role.successors(b) {
                if !current.contains((a, c)) {
                    extended.push((a, c));
                }
            }
        }
        if extended.len() == current.len() {
            return current;
        }
        pairs = extended;
    }
}

pub fn evaluate_boolean(
    repositories: &Repositories,
    context: &EvaluationContext,
    caches: &mut DenotationCaches,
    id: BooleanId,
) -> bool {
    if let Some(&cached) = caches.booleans.get(&(id, context.state_id)) {
        return cached;
    }

    let value = match repositories.boolean(id).clone() {
        Boolean::AtomicState(tag, predicate) => !context.true_atoms(tag, predicate).is_empty(),
        Boolean::NonemptyConcept(concept) => {
            !evaluate_concept(repositories, context, caches, concept).is_empty()
        }
        Boolean::NonemptyRole(role) => {
            !evaluate_role(repositories, context, caches, role).is_empty()
        }
    };

    caches.booleans.insert((id, context.state_id), value);
    value
}

pub fn evaluate_numerical(
    repositories: &Repositories,
    context: &EvaluationContext,
    caches: &mut DenotationCaches,
    id: NumericalId,
) -> u32 {
    if let Some(&cached) = caches.numericals.get(&(id, context.state_id)) {
        return cached;
    }

    let value = match repositories.numerical(id).clone() {
        Numerical::CountConcept(concept) => {
            evaluate_concept(repositories, context, caches, concept).len() as u32
        }
        Numerical::CountRole(role) => {
            evaluate_role(repositories, context, caches, role).len() as u32
        }
        Numerical::Distance(source, role, target) => {
            let source = evaluate_concept(repositories, context, caches, source);
            let role = evaluate_role(repositories, context, caches, role);
            let target = evaluate_concept(repositories, context, caches, target);
            distance(context.num_objects(), &source, &role, &target)
        }
    };

    caches.numericals.insert((id, context.state_id), value);
    value
}

/// Multi-source BFS from `source` along `role` edges to the closest object
/// in `target`.
fn distance(
    num_objects: usize,
    source: &ConceptDenotation,
    role: &RoleDenotation,
    target: &ConceptDenotation,
) -> u32 {
    let mut distances = vec![INFINITY_NUMERICAL; num_objects];
    let mut queue = VecDeque::new();
    for &object in source.objects() {
        distances[object as usize] = 0;
        queue.push_back(object);
    }
    while let Some(object) = queue.pop_front() {
        let current = distances[object as usize];
        if target.contains(object) {
            return current;
        }
        for successor in role.successors(object) {
            if distances[successor as usize] == INFINITY_NUMERICAL {
                distances[successor as usize] = current + 1;
                queue.push_back(successor);
            }
        }
    }
    INFINITY_NUMERICAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dl::Repositories;
    use crate::search::grounding::DeleteRelaxedProblemExplorator;
    use crate::search::{ApplicableActionGenerator, GroundedApplicableActionGenerator};
    use crate::search::match_tree::MatchTreeOptions;
    use crate::test_utils::*;
    use std::rc::Rc;

    #[test]
    fn at_robby_concept_follows_the_robot() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let mut repository = state_repository(&explorator);
        let mut generator =
            GroundedApplicableActionGenerator::new(explorator.clone(), MatchTreeOptions::default());

        let mut repositories = Repositories::new();
        let (tag, at_robby) = task.find_predicate("at-robby").unwrap();
        let concept =
            repositories.get_or_create_concept(Concept::AtomicState(tag, at_robby));
        let rooma = task.object_index("rooma").unwrap() as u32;
        let roomb = task.object_index("roomb").unwrap() as u32;

        let mut caches = DenotationCaches::new();
        let initial = repository.initial();
        let initial_state = repository.get(initial).clone();
        let context = EvaluationContext::new(&task, &initial_state, initial);
        let denotation = evaluate_concept(&repositories, &context, &mut caches, concept);
        assert_eq!(denotation.objects(), &[rooma]);

        // after move(rooma, roomb) the denotation is {roomb}
        let move_id = generator
            .applicable_actions(&initial_state)
            .into_iter()
            .find(|&id| generator.ground_action(id).human_readable(&task) == "(move rooma roomb)")
            .unwrap();
        let action = generator.ground_action(move_id).clone();
        let successor = repository.apply(&action, initial);
        let successor_state = repository.get(successor).clone();
        let context = EvaluationContext::new(&task, &successor_state, successor);
        let denotation = evaluate_concept(&repositories, &context, &mut caches, concept);
        assert_eq!(denotation.objects(), &[roomb]);
    }

    #[test]
    fn evaluation_is_deterministic_with_and_without_the_cache() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let initial_state = closed_initial_state(&explorator);

        let mut repositories = Repositories::new();
        let (at_tag, at) = task.find_predicate("at").unwrap();
        let (robby_tag, at_robby) = task.find_predicate("at-robby").unwrap();
        let at_role = repositories.get_or_create_role(Role::AtomicState(at_tag, at));
        let robby_room =
            repositories.get_or_create_concept(Concept::AtomicState(robby_tag, at_robby));
        // balls lying in the room the robot occupies
        let exists = repositories
            .get_or_create_concept(Concept::ExistentialQuantification(at_role, robby_room));
        let count = repositories.get_or_create_numerical(Numerical::CountConcept(exists));

        let context = EvaluationContext::new(&task, &initial_state, 0);

        let mut warm = DenotationCaches::new();
        let first = evaluate_numerical(&repositories, &context, &mut warm, count);
        let second = evaluate_numerical(&repositories, &context, &mut warm, count);
        assert_eq!(first, 2);
        assert_eq!(first, second);

        // a fresh cache yields the same value as the warm one
        let mut cold = DenotationCaches::new();
        assert_eq!(
            evaluate_numerical(&repositories, &context, &mut cold, count),
            first
        );
    }

    #[test]
    fn goal_atoms_and_role_machinery() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let initial_state = closed_initial_state(&explorator);

        let mut repositories = Repositories::new();
        let mut caches = DenotationCaches::new();
        let context = EvaluationContext::new(&task, &initial_state, 0);

        let (tag, at) = task.find_predicate("at").unwrap();
        let ball1 = task.object_index("ball1").unwrap() as u32;
        let ball2 = task.object_index("ball2").unwrap() as u32;
        let rooma = task.object_index("rooma").unwrap() as u32;
        let roomb = task.object_index("roomb").unwrap() as u32;

        // the goal wants both balls in roomb
        let goal_role = repositories.get_or_create_role(Role::AtomicGoal(tag, at, false));
        let goal_denotation = evaluate_role(&repositories, &context, &mut caches, goal_role);
        assert_eq!(goal_denotation.pairs(), &[(ball1, roomb), (ball2, roomb)]);

        // in the initial state both balls are in rooma
        let at_role = repositories.get_or_create_role(Role::AtomicState(tag, at));
        let state_denotation = evaluate_role(&repositories, &context, &mut caches, at_role);
        assert_eq!(state_denotation.pairs(), &[(ball1, rooma), (ball2, rooma)]);

        // inverse flips the pairs
        let inverse = repositories.get_or_create_role(Role::Inverse(at_role));
        let inverse_denotation = evaluate_role(&repositories, &context, &mut caches, inverse);
        assert_eq!(inverse_denotation.pairs(), &[(rooma, ball1), (rooma, ball2)]);

        // counting over an arity-1 state concept
        let (robby_tag, at_robby) = task.find_predicate("at-robby").unwrap();
        let robby_room =
            repositories.get_or_create_concept(Concept::AtomicState(robby_tag, at_robby));
        let count = repositories.get_or_create_numerical(Numerical::CountConcept(robby_room));
        assert_eq!(
            evaluate_numerical(&repositories, &context, &mut caches, count),
            1
        );
    }
}
