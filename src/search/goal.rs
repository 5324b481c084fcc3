use crate::parsed_types::Condition as ParsedCondition;
use crate::search::{
    ConjunctiveCondition, GroundConjunctiveCondition, Negatable, ObjectTuple, PredicateTag, State,
    Task,
};
use std::collections::HashMap;

/// The grounded goal: fluent/derived literals as a ground conjunctive
/// condition, with static goal literals resolved at construction time.
#[derive(Debug, Clone, Default)]
pub struct Goal {
    pub condition: GroundConjunctiveCondition,
    /// The static goal literals as (predicate, objects) pairs; they are
    /// resolved away from `condition` but kept for feature evaluation.
    pub static_literals: Vec<Negatable<(usize, ObjectTuple)>>,
    /// True iff some static goal literal is false; the goal can then never
    /// be reached.
    statically_falsified: bool,
}

impl Goal {
    pub fn new(task: &Task, goal: &ParsedCondition) -> Self {
        // A goal is a parameterless conjunctive condition; reuse the schema
        // machinery with an empty binding.
        let empty_parameters = HashMap::new();
        let schema = ConjunctiveCondition::new(
            vec![],
            Some(goal),
            &task.predicate_table,
            &task.function_table,
            &empty_parameters,
            &task.object_table,
        );

        let mut condition = GroundConjunctiveCondition::default();
        let mut static_literals = vec![];
        let mut statically_falsified = false;
        for (tag, literals) in schema.literals.iter() {
            for literal in literals {
                let atom = literal.underlying();
                let objects = atom.ground_arguments(&[]);
                match tag {
                    PredicateTag::Static => {
                        let holds = task
                            .atoms
                            .get(PredicateTag::Static)
                            .find(atom.predicate_index, &objects)
                            .is_some();
                        if holds == literal.is_negated() {
                            statically_falsified = true;
                        }
                        static_literals.push(Negatable::new(
                            literal.is_negated(),
                            (atom.predicate_index, objects),
                        ));
                    }
                    PredicateTag::Fluent => {
                        let index = task
                            .atoms
                            .get(PredicateTag::Fluent)
                            .get_or_create(atom.predicate_index, &objects);
                        if literal.is_negated() {
                            condition.negative_fluent.push(index);
                        } else {
                            condition.positive_fluent.push(index);
                        }
                    }
                    PredicateTag::Derived => {
                        let index = task
                            .atoms
                            .get(PredicateTag::Derived)
                            .get_or_create(atom.predicate_index, &objects);
                        if literal.is_negated() {
                            condition.negative_derived.push(index);
                        } else {
                            condition.positive_derived.push(index);
                        }
                    }
                }
            }
        }
        for constraint in &schema.numeric_constraints {
            condition
                .numeric_constraints
                .push(task.ground_numeric_constraint(constraint, &[]));
        }

        condition.positive_fluent.sort_unstable();
        condition.positive_fluent.dedup();
        condition.negative_fluent.sort_unstable();
        condition.negative_fluent.dedup();
        condition.positive_derived.sort_unstable();
        condition.positive_derived.dedup();
        condition.negative_derived.sort_unstable();
        condition.negative_derived.dedup();

        Self {
            condition,
            static_literals,
            statically_falsified,
        }
    }

    pub fn is_satisfied(&self, state: &State) -> bool {
        !self.statically_falsified && self.condition.is_satisfied(state)
    }

    /// The positive fluent and derived goal atoms.
    pub fn positive_atoms(&self, tag: PredicateTag) -> &[u32] {
        self.condition.positive(tag)
    }
}
