//! Axiom stratification: partitions the derived predicates into strata such
//! that all predicates a stratum depends on negatively are fully evaluated
//! in earlier strata.

use crate::search::{PredicateTag, Task};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StratificationError {
    #[error("set of axioms is not stratifiable")]
    NonStratifiable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum StratumStatus {
    Unconstrained = 0,
    Lower = 1,
    StrictlyLower = 2,
}

/// Computes the stratification of the derived predicates: each stratum is a
/// set of derived predicate indices. Fails iff some predicate must be
/// strictly lower than itself, i.e. a cycle runs through a negated body
/// literal.
pub fn compute_stratification(task: &Task) -> Result<Vec<Vec<usize>>, StratificationError> {
    let num_derived = task.predicates.get(PredicateTag::Derived).len();
    let mut relation = vec![vec![StratumStatus::Unconstrained; num_derived]; num_derived];

    // Body-to-head constraints: a negated derived body literal forces the
    // body predicate strictly below the head, a positive one at most as
    // high.
    for axiom in &task.axiom_schemas {
        let head = axiom.head.predicate_index;
        for literal in axiom.condition.literals.get(PredicateTag::Derived) {
            let body = literal.underlying().predicate_index;
            let status = if literal.is_negated() {
                StratumStatus::StrictlyLower
            } else {
                StratumStatus::Lower
            };
            relation[body][head] = relation[body][head].max(status);
        }
    }

    // Transitive closure over the min/max semiring: a path propagates the
    // strongest constraint along it.
    for mid in 0..num_derived {
        for from in 0..num_derived {
            for to in 0..num_derived {
                let through = relation[from][mid].min(relation[mid][to]);
                if through > StratumStatus::Unconstrained {
                    relation[from][to] = relation[from][to]
                        .max(relation[from][mid])
                        .max(relation[mid][to]);
                }
            }
        }
    }

    if (0..num_derived).any(|p| relation[p][p] == StratumStatus::StrictlyLower) {
        return Err(StratificationError::NonStratifiable);
    }

    // Repeatedly extract the predicates no remaining predicate is strictly
    // below.
    let mut stratification = vec![];
    let mut remaining: Vec<usize> = (0..num_derived).collect();
    while !remaining.is_empty() {
        let stratum: Vec<usize> = remaining
            .iter()
            .copied()
            .filter(|&p| {
                remaining
                    .iter()
                    .all(|&q| relation[q][p] != StratumStatus::StrictlyLower)
            })
            .collect();
        debug_assert!(!stratum.is_empty(), "stratifiable relation always progresses");
        remaining.retain(|p| !stratum.contains(p));
        stratification.push(stratum);
    }

    Ok(stratification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Task;
    use crate::test_utils::*;

    #[test]
    fn a_cycle_through_a_negated_literal_is_rejected() {
        let task = Task::from_text(NON_STRATIFIABLE_DOMAIN_TEXT, NON_STRATIFIABLE_PROBLEM_TEXT);
        assert_eq!(
            compute_stratification(&task),
            Err(StratificationError::NonStratifiable)
        );
    }

    #[test]
    fn positive_recursion_is_stratifiable() {
        let task = Task::from_text(BLOCKS_DERIVED_DOMAIN_TEXT, BLOCKS_DERIVED_PROBLEM_TEXT);
        let strata = compute_stratification(&task).unwrap();
        // the single derived predicate sits alone in one stratum
        assert_eq!(strata, vec![vec![0]]);
    }

    #[test]
    fn negation_forces_an_earlier_stratum() {
        let domain = r#"
        (define (domain layered)
            (:requirements :strips :derived-predicates :negative-preconditions)
            (:predicates (base) (low) (high))
            (:action flip
                :parameters ()
                :precondition ()
                :effect (and (base)))
            (:derived (low) (and (base)))
            (:derived (high) (and (not (low))))
        )"#;
        let problem = r#"
        (define (problem layered-1)
            (:domain layered)
            (:init)
            (:goal (and (high)))
        )"#;
        let task = Task::from_text(domain, problem);
        let strata = compute_stratification(&task).unwrap();
        assert_eq!(strata.len(), 2);

        let (_, low) = task.find_predicate("low").unwrap();
        let (_, high) = task.find_predicate("high").unwrap();
        assert_eq!(strata[0], vec![low]);
        assert_eq!(strata[1], vec![high]);
    }
}
