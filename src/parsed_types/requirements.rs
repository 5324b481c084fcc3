use std::fmt::{self, Display, Formatter};

/// A `(:requirements ...)` flag this planner understands.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Requirement {
    Strips,
    Typing,
    NegativePreconditions,
    Equality,
    ConditionalEffects,
    DerivedPredicates,
    NumericFluents,
    ActionCosts,
    Adl,
}

impl Requirement {
    pub fn keyword(&self) -> &'static str {
        match self {
            Requirement::Strips => ":strips",
            Requirement::Typing => ":typing",
            Requirement::NegativePreconditions => ":negative-preconditions",
            Requirement::Equality => ":equality",
            Requirement::ConditionalEffects => ":conditional-effects",
            Requirement::DerivedPredicates => ":derived-predicates",
            Requirement::NumericFluents => ":numeric-fluents",
            Requirement::ActionCosts => ":action-costs",
            Requirement::Adl => ":adl",
        }
    }
}

impl Display for Requirement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}
