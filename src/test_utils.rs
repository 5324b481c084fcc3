//! PDDL text fixtures and helpers shared by the unit tests.

use crate::search::axioms::AxiomEvaluator;
use crate::search::grounding::DeleteRelaxedProblemExplorator;
use crate::search::match_tree::MatchTreeOptions;
use crate::search::states::{StateId, StateRepository};
use crate::search::{ApplicableActionGenerator, GroundedApplicableActionGenerator, State};
use std::rc::Rc;

/// Gripper with an explicit inequality on `move`, so the self-loop
/// move(r, r) is forbidden by a static precondition.
pub const GRIPPER_DOMAIN_TEXT: &str = r#"
(define (domain gripper)
    (:requirements :strips :typing :negative-preconditions :equality)
    (:types room ball gripper)
    (:predicates
        (at-robby ?r - room)
        (at ?b - ball ?r - room)
        (free ?g - gripper)
        (carry ?o - ball ?g - gripper))

    (:action move
        :parameters (?from ?to - room)
        :precondition (and (at-robby ?from) (not (= ?from ?to)))
        :effect (and (at-robby ?to) (not (at-robby ?from))))

    (:action pick
        :parameters (?obj - ball ?room - room ?gripper - gripper)
        :precondition (and (at ?obj ?room) (at-robby ?room) (free ?gripper))
        :effect (and (carry ?obj ?gripper) (not (at ?obj ?room)) (not (free ?gripper))))

    (:action drop
        :parameters (?obj - ball ?room - room ?gripper - gripper)
        :precondition (and (carry ?obj ?gripper) (at-robby ?room))
        :effect (and (at ?obj ?room) (free ?gripper) (not (carry ?obj ?gripper))))
)"#;

pub const GRIPPER_PROBLEM_TEXT: &str = r#"
(define (problem p-1-0)
    (:domain gripper)
    (:objects rooma roomb - room ball1 ball2 - ball left right - gripper)
    (:init
        (at-robby rooma)
        (at ball1 rooma)
        (at ball2 rooma)
        (free left)
        (free right))
    (:goal (and (at ball1 roomb) (at ball2 roomb)))
)"#;

/// The goal already holds in the initial state.
pub const GRIPPER_TRIVIAL_PROBLEM_TEXT: &str = r#"
(define (problem p-trivial)
    (:domain gripper)
    (:objects rooma roomb - room ball1 - ball left - gripper)
    (:init (at-robby rooma) (at ball1 rooma) (free left))
    (:goal (and (at ball1 rooma)))
)"#;

/// Without a robot position nothing can ever be picked up.
pub const GRIPPER_UNSOLVABLE_PROBLEM_TEXT: &str = r#"
(define (problem p-unsolvable)
    (:domain gripper)
    (:objects rooma roomb - room ball1 - ball left - gripper)
    (:init (at ball1 rooma) (free left))
    (:goal (and (carry ball1 left)))
)"#;

/// Blocksworld with a recursively derived `above` predicate.
pub const BLOCKS_DERIVED_DOMAIN_TEXT: &str = r#"
(define (domain blocks-derived)
    (:requirements :strips :typing :derived-predicates)
    (:types block)
    (:predicates
        (on ?x - block ?y - block)
        (on-table ?x - block)
        (clear ?x - block)
        (holding ?x - block)
        (handempty)
        (above ?x - block ?y - block))

    (:action pickup
        :parameters (?x - block)
        :precondition (and (clear ?x) (on-table ?x) (handempty))
        :effect (and (holding ?x) (not (clear ?x)) (not (on-table ?x)) (not (handempty))))

    (:action putdown
        :parameters (?x - block)
        :precondition (and (holding ?x))
        :effect (and (on-table ?x) (clear ?x) (handempty) (not (holding ?x))))

    (:action stack
        :parameters (?x - block ?y - block)
        :precondition (and (holding ?x) (clear ?y))
        :effect (and (on ?x ?y) (clear ?x) (handempty) (not (holding ?x)) (not (clear ?y))))

    (:action unstack
        :parameters (?x - block ?y - block)
        :precondition (and (on ?x ?y) (clear ?x) (handempty))
        :effect (and (holding ?x) (clear ?y) (not (on ?x ?y)) (not (clear ?x)) (not (handempty))))

    (:derived (above ?x - block ?y - block) (and (on ?x ?y)))
    (:derived (above ?x - block ?y - block) (and (on ?x ?z) (above ?z ?y)))
)"#;

pub const BLOCKS_DERIVED_PROBLEM_TEXT: &str = r#"
(define (problem tower3)
    (:domain blocks-derived)
    (:objects b1 b2 b3 - block)
    (:init (on-table b3) (on b2 b3) (on b1 b2) (clear b1) (handempty))
    (:goal (and (above b3 b1)))
)"#;

/// p depends negatively on r, and r depends on p: not stratifiable.
pub const NON_STRATIFIABLE_DOMAIN_TEXT: &str = r#"
(define (domain nonstrat)
    (:requirements :strips :derived-predicates :negative-preconditions)
    (:predicates (q) (p) (r))
    (:action make-q
        :parameters ()
        :precondition ()
        :effect (and (q)))
    (:derived (p) (and (q) (not (r))))
    (:derived (r) (and (p)))
)"#;

pub const NON_STRATIFIABLE_PROBLEM_TEXT: &str = r#"
(define (problem nonstrat-1)
    (:domain nonstrat)
    (:init)
    (:goal (and (p)))
)"#;

/// Trucks with numeric fuel levels and a static capacity.
pub const FUEL_DOMAIN_TEXT: &str = r#"
(define (domain fuel)
    (:requirements :strips :typing :numeric-fluents)
    (:types truck location)
    (:predicates (at ?t - truck ?l - location))
    (:functions (fuel ?t - truck) (capacity ?t - truck))

    (:action drive
        :parameters (?t - truck ?from ?to - location)
        :precondition (and (at ?t ?from) (>= (fuel ?t) 1))
        :effect (and (at ?t ?to) (not (at ?t ?from)) (decrease (fuel ?t) 1)))

    (:action refuel
        :parameters (?t - truck ?l - location)
        :precondition (and (at ?t ?l) (< (fuel ?t) (capacity ?t)))
        :effect (and (assign (fuel ?t) (capacity ?t))))
)"#;

pub const FUEL_PROBLEM_TEXT: &str = r#"
(define (problem fuel-1)
    (:domain fuel)
    (:objects t1 - truck depot station - location)
    (:init (at t1 depot) (= (fuel t1) 1) (= (capacity t1) 2))
    (:goal (and (at t1 station)))
)"#;

/// A cart with a universal conditional effect moving every loaded item.
pub const CONVEYOR_DOMAIN_TEXT: &str = r#"
(define (domain conveyor)
    (:requirements :strips :typing :conditional-effects :negative-preconditions :equality)
    (:types item location)
    (:predicates
        (at-cart ?l - location)
        (loaded ?i - item)
        (item-at ?i - item ?l - location))

    (:action drive
        :parameters (?from ?to - location)
        :precondition (and (at-cart ?from) (not (= ?from ?to)))
        :effect (and (at-cart ?to) (not (at-cart ?from))
                     (forall (?i - item)
                         (when (loaded ?i)
                             (and (item-at ?i ?to) (not (item-at ?i ?from)))))))

    (:action load
        :parameters (?i - item ?l - location)
        :precondition (and (at-cart ?l) (item-at ?i ?l))
        :effect (and (loaded ?i)))
)"#;

pub const CONVEYOR_PROBLEM_TEXT: &str = r#"
(define (problem conveyor-1)
    (:domain conveyor)
    (:objects box - item dock yard - location)
    (:init (at-cart dock) (item-at box dock))
    (:goal (and (item-at box yard)))
)"#;

/// Builds the stratified axiom evaluator over the explorator's ground
/// axioms.
pub fn axiom_evaluator(explorator: &Rc<DeleteRelaxedProblemExplorator>) -> Rc<AxiomEvaluator> {
    Rc::new(
        AxiomEvaluator::new(
            explorator.task(),
            explorator.grounder().axioms(),
            &MatchTreeOptions::default(),
        )
        .expect("test fixtures are stratifiable"),
    )
}

/// Builds the state repository with the axiom-closed initial state.
pub fn state_repository(explorator: &Rc<DeleteRelaxedProblemExplorator>) -> StateRepository {
    StateRepository::new(explorator.task().clone(), axiom_evaluator(explorator))
}

/// The axiom-closed initial state of the task.
pub fn closed_initial_state(explorator: &Rc<DeleteRelaxedProblemExplorator>) -> State {
    let repository = state_repository(explorator);
    repository.get(repository.initial()).clone()
}

/// Exhaustively enumerates the reachable states with the grounded
/// applicable-action generator; returns the repository and the states in
/// discovery order.
pub fn enumerate_reachable_states(
    explorator: &Rc<DeleteRelaxedProblemExplorator>,
) -> (StateRepository, Vec<StateId>) {
    let mut repository = state_repository(explorator);
    let mut generator =
        GroundedApplicableActionGenerator::new(explorator.clone(), MatchTreeOptions::default());

    let mut order = vec![repository.initial()];
    let mut frontier = vec![repository.initial()];
    while let Some(state_id) = frontier.pop() {
        let state = repository.get(state_id).clone();
        for action_id in generator.applicable_actions(&state) {
            let action = generator.ground_action(action_id).clone();
            let successor = repository.apply(&action, state_id);
            if !order.contains(&successor) {
                order.push(successor);
                frontier.push(successor);
            }
        }
    }
    (repository, order)
}
