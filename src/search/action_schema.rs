//! Action schemas with conjunctive conditions, conjunctive effects, and
//! conditional effects.

use crate::parsed_types::{
    ActionDefinition, AssignOp, Condition as ParsedCondition, Effect as ParsedEffect, Literal,
    Name, Term,
};
use crate::search::{
    ConjunctiveCondition, FunctionTag, Parameter, PredicateTag, SchemaAtom,
    SchemaFunctionExpression, TypeHierarchy,
};
use std::collections::HashMap;

/// A schema-level numeric effect `(<op> (<f> args) <fexp>)`. The target is
/// always a fluent function.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNumericEffect {
    pub op: AssignOp,
    pub function_index: usize,
    pub arguments: Vec<crate::search::SchemaArgument>,
    pub expression: SchemaFunctionExpression,
}

/// The unconditional part of an action's effect.
#[derive(Debug, Clone, Default)]
pub struct ConjunctiveEffect {
    pub add: Vec<SchemaAtom>,
    pub delete: Vec<SchemaAtom>,
    pub numeric_effects: Vec<SchemaNumericEffect>,
}

impl ConjunctiveEffect {
    fn is_empty(&self) -> bool {
        self.add.is_empty() && self.delete.is_empty() && self.numeric_effects.is_empty()
    }
}

/// A conditional effect. Extra parameters (from `forall`) extend the
/// action's parameter space and are disjoint from it.
#[derive(Debug, Clone)]
pub struct ConditionalEffectSchema {
    pub parameters: Vec<Parameter>,
    pub condition: ConjunctiveCondition,
    pub effect: ConjunctiveEffect,
}

/// An indexed action schema.
#[derive(Debug, Clone)]
pub struct ActionSchema {
    pub name: Name,
    pub index: usize,
    pub parameters: Vec<Parameter>,
    pub condition: ConjunctiveCondition,
    pub effect: ConjunctiveEffect,
    pub conditional_effects: Vec<ConditionalEffectSchema>,
}

pub(crate) struct SchemaTables<'a> {
    pub predicates: &'a HashMap<Name, (PredicateTag, usize)>,
    pub functions: &'a HashMap<Name, (FunctionTag, usize)>,
    pub objects: &'a HashMap<Name, usize>,
    pub types: &'a TypeHierarchy,
}

impl ActionSchema {
    pub(crate) fn new(index: usize, action: &ActionDefinition, tables: &SchemaTables) -> Self {
        let parameters: Vec<Parameter> = action
            .parameters()
            .iter()
            .enumerate()
            .map(|(index, variable)| Parameter::new(index, variable, tables.types))
            .collect();

        let parameter_table: HashMap<Name, usize> = action
            .parameters()
            .iter()
            .enumerate()
            .map(|(index, variable)| (variable.value().name().clone(), index))
            .collect();

        let condition = ConjunctiveCondition::new(
            parameters.clone(),
            action.precondition(),
            tables.predicates,
            tables.functions,
            &parameter_table,
            tables.objects,
        );

        let mut effect = ConjunctiveEffect::default();
        let mut conditional_effects = vec![];
        if let Some(parsed_effect) = action.effect() {
            collect_effects(
                parsed_effect,
                &parameters,
                &parameter_table,
                tables,
                &mut effect,
                &mut conditional_effects,
            );
        }

        Self {
            name: action.name().clone(),
            index,
            parameters,
            condition,
            effect,
            conditional_effects,
        }
    }
}

/// Walks an effect formula, separating the unconditional conjunctive effect
/// from `when`/`forall` conditional effects.
fn collect_effects(
    effect: &ParsedEffect,
    action_parameters: &[Parameter],
    action_parameter_table: &HashMap<Name, usize>,
    tables: &SchemaTables,
    conjunctive: &mut ConjunctiveEffect,
    conditional: &mut Vec<ConditionalEffectSchema>,
) {
    match effect {
        ParsedEffect::And(effects) => {
            for effect in effects {
                collect_effects(
                    effect,
                    action_parameters,
                    action_parameter_table,
                    tables,
                    conjunctive,
                    conditional,
                );
            }
        }
        ParsedEffect::Literal(literal) => {
            push_effect_literal(literal, action_parameter_table, tables, conjunctive);
        }
        ParsedEffect::Numeric(op, function, expression) => {
            push_numeric_effect(
                *op,
                function,
                expression,
                action_parameter_table,
                tables,
                conjunctive,
            );
        }
        ParsedEffect::When(condition, body) => {
            conditional.push(build_conditional_effect(
                &[],
                Some(condition),
                body,
                action_parameters,
                action_parameter_table,
                tables,
            ));
        }
        ParsedEffect::Forall(variables, body) => {
            let (condition, inner) = match body.as_ref() {
                ParsedEffect::When(condition, inner) => (Some(condition), inner.as_ref()),
                other => (None, other),
            };
            let extras: Vec<(Name, crate::parsed_types::Typed<crate::parsed_types::Variable>)> =
                variables
                    .iter()
                    .map(|v| (v.value().name().clone(), v.clone()))
                    .collect();
            conditional.push(build_conditional_effect(
                &extras,
                condition,
                inner,
                action_parameters,
                action_parameter_table,
                tables,
            ));
        }
    }
}

fn build_conditional_effect(
    extras: &[(Name, crate::parsed_types::Typed<crate::parsed_types::Variable>)],
    condition: Option<&ParsedCondition>,
    body: &ParsedEffect,
    action_parameters: &[Parameter],
    action_parameter_table: &HashMap<Name, usize>,
    tables: &SchemaTables,
) -> ConditionalEffectSchema {
    // Extra parameters continue the action's parameter index space.
    let mut parameter_table = action_parameter_table.clone();
    let mut extra_parameters = vec![];
    for (offset, (name, variable)) in extras.iter().enumerate() {
        let index = action_parameters.len() + offset;
        parameter_table.insert(name.clone(), index);
        extra_parameters.push(Parameter::new(index, variable, tables.types));
    }

    let mut all_parameters: Vec<Parameter> = action_parameters.to_vec();
    all_parameters.extend(extra_parameters.iter().cloned());

    let condition = ConjunctiveCondition::new(
        all_parameters,
        condition,
        tables.predicates,
        tables.functions,
        &parameter_table,
        tables.objects,
    );

    let mut effect = ConjunctiveEffect::default();
    let mut nested = vec![];
    collect_effects(
        body,
        action_parameters,
        &parameter_table,
        tables,
        &mut effect,
        &mut nested,
    );
    assert!(
        nested.is_empty(),
        "nested conditional effects are not supported"
    );
    assert!(!effect.is_empty(), "conditional effect with empty body");

    ConditionalEffectSchema {
        parameters: extra_parameters,
        condition,
        effect,
    }
}

fn push_effect_literal(
    literal: &Literal<Term>,
    parameter_table: &HashMap<Name, usize>,
    tables: &SchemaTables,
    conjunctive: &mut ConjunctiveEffect,
) {
    let (atom, negated) = match literal {
        Literal::Positive(atom) => (atom, false),
        Literal::Negative(atom) => (atom, true),
    };
    let &(tag, predicate_index) = tables
        .predicates
        .get(atom.predicate_name())
        .expect("effect predicate not declared in the domain");
    assert_eq!(
        tag,
        PredicateTag::Fluent,
        "only fluent predicates may appear in effects"
    );
    let schema_atom = SchemaAtom::new(predicate_index, atom, parameter_table, tables.objects);
    if negated {
        conjunctive.delete.push(schema_atom);
    } else {
        conjunctive.add.push(schema_atom);
    }
}

fn push_numeric_effect(
    op: AssignOp,
    function: &crate::parsed_types::FunctionTerm<Term>,
    expression: &crate::parsed_types::FExp<Term>,
    parameter_table: &HashMap<Name, usize>,
    tables: &SchemaTables,
    conjunctive: &mut ConjunctiveEffect,
) {
    let &(tag, function_index) = tables
        .functions
        .get(function.symbol())
        .expect("effect function not declared in the domain");
    assert_eq!(
        tag,
        FunctionTag::Fluent,
        "only fluent functions may be numeric effect targets"
    );
    let arguments = function
        .values()
        .iter()
        .map(|term| crate::search::SchemaArgument::new(term, parameter_table, tables.objects))
        .collect();
    conjunctive.numeric_effects.push(SchemaNumericEffect {
        op,
        function_index,
        arguments,
        expression: SchemaFunctionExpression::new(
            expression,
            tables.functions,
            parameter_table,
            tables.objects,
        ),
    });
}
