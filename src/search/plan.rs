use crate::parsed_types::Name;
use crate::search::grounding::GroundAction;
use crate::search::Task;
use std::fmt::{self, Display, Formatter};

/// One plan step: the action name and its instantiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub action_name: Name,
    pub objects: Vec<Name>,
}

/// A plan: a sequence of ground action applications and its total cost.
/// `Display` renders one `(name obj ...)` line per step followed by a
/// `; cost = <float>` comment.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    steps: Vec<PlanStep>,
    cost: f64,
}

impl Plan {
    pub fn new(steps: Vec<PlanStep>, cost: f64) -> Self {
        Self { steps, cost }
    }

    pub fn from_actions<'a>(task: &Task, actions: impl IntoIterator<Item = &'a GroundAction>) -> Self {
        let mut steps = vec![];
        let mut cost = 0.0;
        for action in actions {
            let schema = &task.action_schemas[action.schema_index];
            steps.push(PlanStep {
                action_name: schema.name.clone(),
                objects: action
                    .objects
                    .iter()
                    .map(|&object| task.objects[object].name.clone())
                    .collect(),
            });
            cost += action.cost;
        }
        Self { steps, cost }
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }
}

impl Display for Plan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "({}", step.action_name)?;
            for object in &step.objects {
                write!(f, " {object}")?;
            }
            writeln!(f, ")")?;
        }
        write!(f, "; cost = {}", self.cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let plan = Plan::new(
            vec![
                PlanStep {
                    action_name: Name::from("pick"),
                    objects: vec![Name::from("ball1"), Name::from("rooma"), Name::from("left")],
                },
                PlanStep {
                    action_name: Name::from("move"),
                    objects: vec![Name::from("rooma"), Name::from("roomb")],
                },
            ],
            2.0,
        );
        assert_eq!(
            plan.to_string(),
            "(pick ball1 rooma left)\n(move rooma roomb)\n; cost = 2"
        );
    }
}
