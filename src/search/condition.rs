//! Schema-level conjunctive conditions and their ground counterparts.

use crate::parsed_types::{
    Atom as ParsedAtom, BinaryComp, Condition as ParsedCondition, FExp, FunctionTerm, Literal,
    Name, Term, Typed, Variable,
};
use crate::search::{
    FunctionTag, GroundNumericConstraint, Negatable, ObjectTuple, PerTag, PredicateTag, State,
    Task,
};
use crate::parsed_types::BinaryOp;
use std::collections::HashMap;

/// A free parameter of a schema, with the primitive types it accepts.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub index: usize,
    pub type_indices: Vec<usize>,
}

impl Parameter {
    pub fn new(index: usize, variable: &Typed<Variable>, task_types: &crate::search::TypeHierarchy) -> Self {
        let type_indices = variable
            .type_()
            .primitives()
            .iter()
            .map(|primitive| {
                task_types
                    .index_of(primitive.name())
                    .expect("parameter type not declared in the domain")
            })
            .collect();
        Self {
            index,
            type_indices,
        }
    }
}

/// An argument of a schema atom: a constant object or a free parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaArgument {
    Constant(usize),
    Free(usize),
}

impl SchemaArgument {
    pub fn new(
        term: &Term,
        parameter_table: &HashMap<Name, usize>,
        object_table: &HashMap<Name, usize>,
    ) -> Self {
        match term {
            Term::Name(name) => Self::Constant(
                *object_table
                    .get(name)
                    .expect("schema constant argument not found in the object table"),
            ),
            Term::Variable(variable) => Self::Free(
                *parameter_table
                    .get(variable.name())
                    .expect("schema variable argument not found in the parameter table"),
            ),
        }
    }

    /// Resolves the argument under a (possibly partial) binding.
    #[inline(always)]
    pub fn resolve(&self, binding: &[Option<usize>]) -> Option<usize> {
        match self {
            Self::Constant(object) => Some(*object),
            Self::Free(parameter) => binding.get(*parameter).copied().flatten(),
        }
    }

    /// Resolves the argument under a complete binding.
    #[inline(always)]
    pub fn ground(&self, binding: &[usize]) -> usize {
        match self {
            Self::Constant(object) => *object,
            Self::Free(parameter) => binding[*parameter],
        }
    }
}

/// An atom whose arguments may mention free parameters. The predicate tag is
/// implied by the containing literal bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaAtom {
    pub predicate_index: usize,
    pub arguments: Vec<SchemaArgument>,
}

impl SchemaAtom {
    pub fn new(
        predicate_index: usize,
        atom: &ParsedAtom<Term>,
        parameter_table: &HashMap<Name, usize>,
        object_table: &HashMap<Name, usize>,
    ) -> Self {
        let arguments = atom
            .values()
            .iter()
            .map(|term| SchemaArgument::new(term, parameter_table, object_table))
            .collect();
        Self {
            predicate_index,
            arguments,
        }
    }

    pub fn ground_arguments(&self, binding: &[usize]) -> ObjectTuple {
        self.arguments
            .iter()
            .map(|argument| argument.ground(binding))
            .collect()
    }
}

/// A schema-level function expression over [`SchemaArgument`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaFunctionExpression {
    Number(f64),
    Function {
        tag: FunctionTag,
        index: usize,
        arguments: Vec<SchemaArgument>,
    },
    Binary(
        BinaryOp,
        Box<SchemaFunctionExpression>,
        Box<SchemaFunctionExpression>,
    ),
}

impl SchemaFunctionExpression {
    pub fn new(
        expression: &FExp<Term>,
        function_table: &HashMap<Name, (FunctionTag, usize)>,
        parameter_table: &HashMap<Name, usize>,
        object_table: &HashMap<Name, usize>,
    ) -> Self {
        match expression {
            FExp::Number(value) => Self::Number(*value),
            FExp::Function(function) => Self::new_function(
                function,
                function_table,
                parameter_table,
                object_table,
            ),
            FExp::Binary(op, lhs, rhs) => Self::Binary(
                *op,
                Box::new(Self::new(lhs, function_table, parameter_table, object_table)),
                Box::new(Self::new(rhs, function_table, parameter_table, object_table)),
            ),
        }
    }

    /// Whether the expression references any fluent function.
    pub fn mentions_fluent(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Function { tag, .. } => *tag == FunctionTag::Fluent,
            Self::Binary(_, lhs, rhs) => lhs.mentions_fluent() || rhs.mentions_fluent(),
        }
    }

    pub fn new_function(
        function: &FunctionTerm<Term>,
        function_table: &HashMap<Name, (FunctionTag, usize)>,
        parameter_table: &HashMap<Name, usize>,
        object_table: &HashMap<Name, usize>,
    ) -> Self {
        let &(tag, index) = function_table
            .get(function.symbol())
            .expect("function symbol not declared in the domain");
        let arguments = function
            .values()
            .iter()
            .map(|term| SchemaArgument::new(term, parameter_table, object_table))
            .collect();
        Self::Function {
            tag,
            index,
            arguments,
        }
    }
}

/// A schema-level numeric constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericConstraint {
    pub comparator: BinaryComp,
    pub lhs: SchemaFunctionExpression,
    pub rhs: SchemaFunctionExpression,
}

/// A conjunctive condition: free parameters, literals per predicate tag, and
/// numeric constraints. The free variables are exactly `parameters`.
#[derive(Debug, Clone, Default)]
pub struct ConjunctiveCondition {
    pub parameters: Vec<Parameter>,
    pub literals: PerTag<Vec<Negatable<SchemaAtom>>>,
    pub numeric_constraints: Vec<NumericConstraint>,
}

impl ConjunctiveCondition {
    /// Builds a conjunctive condition from a parsed goal description. The
    /// parameter list is supplied by the owning schema.
    pub fn new(
        parameters: Vec<Parameter>,
        condition: Option<&ParsedCondition>,
        predicate_table: &HashMap<Name, (PredicateTag, usize)>,
        function_table: &HashMap<Name, (FunctionTag, usize)>,
        parameter_table: &HashMap<Name, usize>,
        object_table: &HashMap<Name, usize>,
    ) -> Self {
        let mut result = Self {
            parameters,
            ..Default::default()
        };

        let Some(condition) = condition else {
            return result;
        };
        let (literals, comparisons) = condition.clone().flatten();

        for literal in literals {
            let (atom, negated) = match &literal {
                Literal::Positive(atom) => (atom, false),
                Literal::Negative(atom) => (atom, true),
            };
            let &(tag, predicate_index) = predicate_table
                .get(atom.predicate_name())
                .expect("condition predicate not declared in the domain");
            let schema_atom =
                SchemaAtom::new(predicate_index, atom, parameter_table, object_table);
            result
                .literals
                .get_mut(tag)
                .push(Negatable::new(negated, schema_atom));
        }

        for (comparator, lhs, rhs) in &comparisons {
            result.numeric_constraints.push(NumericConstraint {
                comparator: *comparator,
                lhs: SchemaFunctionExpression::new(
                    lhs,
                    function_table,
                    parameter_table,
                    object_table,
                ),
                rhs: SchemaFunctionExpression::new(
                    rhs,
                    function_table,
                    parameter_table,
                    object_table,
                ),
            });
        }

        result
    }

    /// Exact satisfaction test of the fully-bound condition against a state.
    /// In relaxed mode, negative fluent/derived literals and fluent numeric
    /// constraints are ignored; static constraints never change and stay
    /// enforced.
    pub fn is_satisfied_by(
        &self,
        task: &Task,
        state: &State,
        binding: &[usize],
        relaxed: bool,
    ) -> bool {
        for (tag, literals) in self.literals.iter() {
            for literal in literals {
                if relaxed && literal.is_negated() && tag != PredicateTag::Static {
                    continue;
                }
                let atom = literal.underlying();
                let objects = atom.ground_arguments(binding);
                let holds = task.is_atom_true(tag, atom.predicate_index, &objects, state);
                if holds == literal.is_negated() {
                    return false;
                }
            }
        }
        for constraint in &self.numeric_constraints {
            if relaxed
                && (constraint.lhs.mentions_fluent() || constraint.rhs.mentions_fluent())
            {
                continue;
            }
            let ground = task.ground_numeric_constraint(constraint, binding);
            if !ground.is_satisfied(state) {
                return false;
            }
        }
        true
    }
}

/// A fully ground conjunctive condition, stored as compressed ascending atom
/// index lists per polarity and tag. Static literals are resolved away at
/// grounding time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundConjunctiveCondition {
    pub positive_fluent: Vec<u32>,
    pub negative_fluent: Vec<u32>,
    pub positive_derived: Vec<u32>,
    pub negative_derived: Vec<u32>,
    pub numeric_constraints: Vec<GroundNumericConstraint>,
}

impl GroundConjunctiveCondition {
    pub fn is_satisfied(&self, state: &State) -> bool {
        self.positive_fluent
            .iter()
            .all(|&atom| state.has_fluent_atom(atom))
            && self
                .negative_fluent
                .iter()
                .all(|&atom| !state.has_fluent_atom(atom))
            && self
                .positive_derived
                .iter()
                .all(|&atom| state.has_derived_atom(atom))
            && self
                .negative_derived
                .iter()
                .all(|&atom| !state.has_derived_atom(atom))
            && self
                .numeric_constraints
                .iter()
                .all(|constraint| constraint.is_satisfied(state))
    }

    /// Positive precondition atoms of the given tag.
    pub fn positive(&self, tag: PredicateTag) -> &[u32] {
        match tag {
            PredicateTag::Fluent => &self.positive_fluent,
            PredicateTag::Derived => &self.positive_derived,
            PredicateTag::Static => &[],
        }
    }

    /// Negative precondition atoms of the given tag.
    pub fn negative(&self, tag: PredicateTag) -> &[u32] {
        match tag {
            PredicateTag::Fluent => &self.negative_fluent,
            PredicateTag::Derived => &self.negative_derived,
            PredicateTag::Static => &[],
        }
    }

    pub fn is_trivially_true(&self) -> bool {
        self.positive_fluent.is_empty()
            && self.negative_fluent.is_empty()
            && self.positive_derived.is_empty()
            && self.negative_derived.is_empty()
            && self.numeric_constraints.is_empty()
    }
}
