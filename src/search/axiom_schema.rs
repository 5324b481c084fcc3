//! Axiom schemas for derived predicates.

use crate::parsed_types::{DerivedDefinition, Name};
use crate::search::action_schema::SchemaTables;
use crate::search::{ConjunctiveCondition, Parameter, PredicateTag, SchemaArgument, SchemaAtom};
use std::collections::HashMap;

/// An indexed axiom schema `head :- body`. The head predicate is Derived.
/// Parameters cover the head variables plus any extra free variables of the
/// body (which are existential).
#[derive(Debug, Clone)]
pub struct AxiomSchema {
    pub index: usize,
    pub parameters: Vec<Parameter>,
    pub condition: ConjunctiveCondition,
    /// Head atom template over the first `head_arity` parameters.
    pub head: SchemaAtom,
}

impl AxiomSchema {
    pub(crate) fn new(index: usize, derived: &DerivedDefinition, tables: &SchemaTables) -> Self {
        let &(tag, head_predicate) = tables
            .predicates
            .get(derived.predicate_name())
            .expect("derived predicate not declared in the domain");
        assert_eq!(
            tag,
            PredicateTag::Derived,
            "axiom head must be a derived predicate"
        );

        let mut parameters: Vec<Parameter> = vec![];
        let mut parameter_table: HashMap<Name, usize> = HashMap::new();
        for variable in derived.parameters().iter() {
            let parameter_index = parameters.len();
            parameter_table.insert(variable.value().name().clone(), parameter_index);
            parameters.push(Parameter::new(parameter_index, variable, tables.types));
        }
        let head_arity = parameters.len();

        // Extra free variables of the body extend the parameter space; they
        // are existentially quantified by the axiom semantics. Their types
        // default to object.
        let (literals, _comparisons) = derived.condition().clone().flatten();
        for literal in &literals {
            for term in literal.atom().values() {
                if let crate::parsed_types::Term::Variable(variable) = term {
                    if !parameter_table.contains_key(variable.name()) {
                        let parameter_index = parameters.len();
                        parameter_table.insert(variable.name().clone(), parameter_index);
                        parameters.push(Parameter {
                            index: parameter_index,
                            type_indices: vec![0],
                        });
                    }
                }
            }
        }

        let condition = ConjunctiveCondition::new(
            parameters.clone(),
            Some(derived.condition()),
            tables.predicates,
            tables.functions,
            &parameter_table,
            tables.objects,
        );

        let head = SchemaAtom {
            predicate_index: head_predicate,
            arguments: (0..head_arity).map(SchemaArgument::Free).collect(),
        };

        Self {
            index,
            parameters,
            condition,
            head,
        }
    }
}
