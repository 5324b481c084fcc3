//! Value types produced by the PDDL parsers in [`crate::parsers`]. These are
//! plain data; all index-based resolution happens in [`crate::search::Task`].

mod action_definition;
mod atom;
mod condition;
mod derived_definition;
mod domain;
mod effect;
mod literal;
mod name;
mod numeric;
mod predicate_definition;
mod problem;
mod requirements;
mod term;
mod r#type;
mod typed;
mod variable;

pub use action_definition::ActionDefinition;
pub use atom::Atom;
pub use condition::Condition;
pub use derived_definition::DerivedDefinition;
pub use domain::Domain;
pub use effect::Effect;
pub use literal::Literal;
pub use name::Name;
pub use numeric::{AssignOp, BinaryComp, BinaryOp, FExp, FunctionDeclaration, FunctionTerm};
pub use predicate_definition::PredicateDefinition;
pub use problem::{InitElement, Metric, Optimization, Problem};
pub use r#type::{PrimitiveType, Type, TYPE_OBJECT};
pub use requirements::Requirement;
pub use term::Term;
pub use typed::{Typed, TypedList, Types};
pub use variable::Variable;
