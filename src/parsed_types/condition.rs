use crate::parsed_types::{BinaryComp, FExp, Literal, Term};

/// A goal description restricted to the conjunctive fragment the planner
/// consumes: conjunctions of literals and numeric comparisons.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    And(Vec<Condition>),
    Literal(Literal<Term>),
    Comparison(BinaryComp, FExp<Term>, FExp<Term>),
}

impl Condition {
    /// An empty conjunction, i.e. the trivially true condition.
    pub fn top() -> Self {
        Condition::And(vec![])
    }

    /// Flattens nested conjunctions into a list of literals and a list of
    /// numeric comparisons.
    pub fn flatten(self) -> (Vec<Literal<Term>>, Vec<(BinaryComp, FExp<Term>, FExp<Term>)>) {
        let mut literals = vec![];
        let mut comparisons = vec![];
        self.flatten_into(&mut literals, &mut comparisons);
        (literals, comparisons)
    }

    fn flatten_into(
        self,
        literals: &mut Vec<Literal<Term>>,
        comparisons: &mut Vec<(BinaryComp, FExp<Term>, FExp<Term>)>,
    ) {
        match self {
            Condition::And(conditions) => {
                for condition in conditions {
                    condition.flatten_into(literals, comparisons);
                }
            }
            Condition::Literal(literal) => literals.push(literal),
            Condition::Comparison(comp, lhs, rhs) => comparisons.push((comp, lhs, rhs)),
        }
    }
}
