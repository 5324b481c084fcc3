//! The grounder: turns (schema, binding) pairs into canonical interned
//! ground actions and ground axioms with compressed precondition lists.

use crate::parsed_types::AssignOp;
use crate::search::grounding::{StaticAssignmentSets, StaticConsistencyGraph};
use crate::search::{
    ConjunctiveCondition, ConjunctiveEffect, GroundConjunctiveCondition, GroundFunctionExpression,
    GroundNumericConstraint, Negatable, ObjectTuple, PredicateTag, State, Task,
};
use std::collections::HashMap;
use std::rc::Rc;

/// A fully ground numeric effect. `is_auxiliary` marks effects on the
/// plan-cost accumulator, which are applied after the ordinary fluent
/// effects.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundNumericEffect {
    pub op: AssignOp,
    pub target: u32,
    pub expression: GroundFunctionExpression,
    pub is_auxiliary: bool,
}

/// The ground add/delete/numeric effects of an action or conditional
/// effect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundEffect {
    pub add: Vec<u32>,
    pub delete: Vec<u32>,
    pub numeric_effects: Vec<GroundNumericEffect>,
}

/// A ground conditional effect: a guard over the pre-state plus the effect
/// it enables.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundConditionalEffect {
    pub condition: GroundConjunctiveCondition,
    pub effect: GroundEffect,
}

/// A canonical ground action: one instance per (schema, binding).
#[derive(Debug, Clone)]
pub struct GroundAction {
    pub index: u32,
    pub schema_index: usize,
    pub objects: ObjectTuple,
    pub condition: GroundConjunctiveCondition,
    pub effect: GroundEffect,
    pub conditional_effects: Vec<GroundConditionalEffect>,
    pub cost: f64,
}

impl GroundAction {
    /// Whether the full ground precondition holds in `state`. Static
    /// literals were resolved at grounding time.
    pub fn is_applicable(&self, state: &State) -> bool {
        self.condition.is_satisfied(state)
    }

    /// Renders the action as `(name obj ...)`.
    pub fn human_readable(&self, task: &Task) -> String {
        let schema = &task.action_schemas[self.schema_index];
        let mut out = format!("({}", schema.name);
        for &object in &self.objects {
            out.push(' ');
            out.push_str(&task.objects[object].name);
        }
        out.push(')');
        out
    }
}

/// A canonical ground axiom: one instance per (schema, binding).
#[derive(Debug, Clone)]
pub struct GroundAxiom {
    pub index: u32,
    pub schema_index: usize,
    pub objects: ObjectTuple,
    pub condition: GroundConjunctiveCondition,
    /// The derived atom the axiom concludes.
    pub head: u32,
}

impl GroundAxiom {
    pub fn is_applicable(&self, state: &State) -> bool {
        self.condition.is_satisfied(state)
    }
}

/// Interning repository for ground actions and axioms.
#[derive(Debug)]
pub struct Grounder {
    static_sets: Rc<StaticAssignmentSets>,
    actions: Vec<GroundAction>,
    action_table: HashMap<(usize, ObjectTuple), u32>,
    axioms: Vec<GroundAxiom>,
    axiom_table: HashMap<(usize, ObjectTuple), u32>,
    /// Per action schema, per conditional effect: the consistency graph of
    /// the effect's extra parameters, if it has any.
    conditional_effect_graphs: Vec<Vec<Option<StaticConsistencyGraph>>>,
}

impl Grounder {
    pub fn new(task: &Task, static_sets: Rc<StaticAssignmentSets>) -> Self {
        let conditional_effect_graphs = task
            .action_schemas
            .iter()
            .map(|schema| {
                schema
                    .conditional_effects
                    .iter()
                    .map(|effect| {
                        if effect.parameters.is_empty() {
                            None
                        } else {
                            let begin = schema.parameters.len();
                            let end = begin + effect.parameters.len();
                            Some(StaticConsistencyGraph::new(
                                task,
                                &static_sets,
                                &effect.condition,
                                begin,
                                end,
                            ))
                        }
                    })
                    .collect()
            })
            .collect();
        Self {
            static_sets,
            actions: vec![],
            action_table: HashMap::new(),
            axioms: vec![],
            axiom_table: HashMap::new(),
            conditional_effect_graphs,
        }
    }

    pub fn actions(&self) -> &[GroundAction] {
        &self.actions
    }

    pub fn action(&self, index: u32) -> &GroundAction {
        &self.actions[index as usize]
    }

    pub fn axioms(&self) -> &[GroundAxiom] {
        &self.axioms
    }

    pub fn axiom(&self, index: u32) -> &GroundAxiom {
        &self.axioms[index as usize]
    }

    /// Interns the ground action for (schema, binding). The binding must
    /// satisfy the schema's static precondition (the binding generator
    /// guarantees this).
    pub fn ground_action(&mut self, task: &Task, schema_index: usize, binding: &ObjectTuple) -> u32 {
        if let Some(&index) = self.action_table.get(&(schema_index, binding.clone())) {
            return index;
        }

        let schema = &task.action_schemas[schema_index];
        let full_binding: Vec<usize> = binding.iter().copied().collect();

        let condition = ground_condition(task, &schema.condition, &full_binding)
            .expect("statically inconsistent binding passed to the grounder");
        let effect = ground_effect(task, &schema.effect, &full_binding);

        let mut conditional_effects = vec![];
        for (effect_index, conditional) in schema.conditional_effects.iter().enumerate() {
            match &self.conditional_effect_graphs[schema_index][effect_index] {
                None => {
                    if let Some(guard) = ground_condition(task, &conditional.condition, &full_binding)
                    {
                        conditional_effects.push(GroundConditionalEffect {
                            condition: guard,
                            effect: ground_effect(task, &conditional.effect, &full_binding),
                        });
                    }
                }
                Some(graph) => {
                    let mut extras = vec![0usize; conditional.parameters.len()];
                    enumerate_extra_bindings(
                        task,
                        graph,
                        conditional,
                        &full_binding,
                        &mut extras,
                        &mut vec![],
                        0,
                        &mut conditional_effects,
                    );
                }
            }
        }

        let cost = extract_cost(&effect);
        let index = self.actions.len() as u32;
        self.actions.push(GroundAction {
            index,
            schema_index,
            objects: binding.clone(),
            condition,
            effect,
            conditional_effects,
            cost,
        });
        self.action_table
            .insert((schema_index, binding.clone()), index);
        index
    }

    /// Interns the ground axiom for (schema, binding).
    pub fn ground_axiom(&mut self, task: &Task, schema_index: usize, binding: &ObjectTuple) -> u32 {
        if let Some(&index) = self.axiom_table.get(&(schema_index, binding.clone())) {
            return index;
        }

        let schema = &task.axiom_schemas[schema_index];
        let full_binding: Vec<usize> = binding.iter().copied().collect();
        let condition = ground_condition(task, &schema.condition, &full_binding)
            .expect("statically inconsistent binding passed to the grounder");
        let head_objects = schema.head.ground_arguments(&full_binding);
        let head = task
            .atoms
            .get(PredicateTag::Derived)
            .get_or_create(schema.head.predicate_index, &head_objects);

        let index = self.axioms.len() as u32;
        self.axioms.push(GroundAxiom {
            index,
            schema_index,
            objects: binding.clone(),
            condition,
            head,
        });
        self.axiom_table
            .insert((schema_index, binding.clone()), index);
        index
    }

    pub fn static_sets(&self) -> &Rc<StaticAssignmentSets> {
        &self.static_sets
    }
}

/// Grounds a conjunctive condition, resolving static literals. `None` means
/// the condition is statically false.
pub fn ground_condition(
    task: &Task,
    condition: &ConjunctiveCondition,
    binding: &[usize],
) -> Option<GroundConjunctiveCondition> {
    let mut result = GroundConjunctiveCondition::default();
    for (tag, literals) in condition.literals.iter() {
        for literal in literals {
            let atom = literal.underlying();
            let objects = atom.ground_arguments(binding);
            match tag {
                PredicateTag::Static => {
                    let holds = task
                        .atoms
                        .get(PredicateTag::Static)
                        .find(atom.predicate_index, &objects)
                        .is_some();
                    if holds == literal.is_negated() {
                        return None;
                    }
                }
                PredicateTag::Fluent => {
                    let index = task
                        .atoms
                        .get(PredicateTag::Fluent)
                        .get_or_create(atom.predicate_index, &objects);
                    match literal {
                        Negatable::Positive(_) => result.positive_fluent.push(index),
                        Negatable::Negative(_) => result.negative_fluent.push(index),
                    }
                }
                PredicateTag::Derived => {
                    let index = task
                        .atoms
                        .get(PredicateTag::Derived)
                        .get_or_create(atom.predicate_index, &objects);
                    match literal {
                        Negatable::Positive(_) => result.positive_derived.push(index),
                        Negatable::Negative(_) => result.negative_derived.push(index),
                    }
                }
            }
        }
    }

    for constraint in &condition.numeric_constraints {
        let ground = task.ground_numeric_constraint(constraint, binding);
        match constant_truth(&ground) {
            Some(true) => {}
            Some(false) => return None,
            None => result.numeric_constraints.push(ground),
        }
    }

    result.positive_fluent.sort_unstable();
    result.positive_fluent.dedup();
    result.negative_fluent.sort_unstable();
    result.negative_fluent.dedup();
    result.positive_derived.sort_unstable();
    result.positive_derived.dedup();
    result.negative_derived.sort_unstable();
    result.negative_derived.dedup();
    Some(result)
}

/// Evaluates a ground constraint that mentions no fluent variable.
fn constant_truth(constraint: &GroundNumericConstraint) -> Option<bool> {
    fn constant_value(expression: &GroundFunctionExpression) -> Option<Option<f64>> {
        match expression {
            GroundFunctionExpression::Number(value) => Some(Some(*value)),
            GroundFunctionExpression::Undefined => Some(None),
            GroundFunctionExpression::Variable(_) => None,
            GroundFunctionExpression::Binary(op, lhs, rhs) => {
                let lhs = constant_value(lhs)?;
                let rhs = constant_value(rhs)?;
                match (lhs, rhs) {
                    (Some(lhs), Some(rhs)) => {
                        use crate::parsed_types::BinaryOp;
                        let value = match op {
                            BinaryOp::Add => lhs + rhs,
                            BinaryOp::Sub => lhs - rhs,
                            BinaryOp::Mul => lhs * rhs,
                            BinaryOp::Div => lhs / rhs,
                        };
                        Some(value.is_finite().then_some(value))
                    }
                    _ => Some(None),
                }
            }
        }
    }

    let lhs = constant_value(&constraint.lhs)?;
    let rhs = constant_value(&constraint.rhs)?;
    let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
        return Some(false);
    };
    use crate::parsed_types::BinaryComp;
    Some(match constraint.comparator {
        BinaryComp::Less => lhs < rhs,
        BinaryComp::LessEq => lhs <= rhs,
        BinaryComp::Equal => lhs == rhs,
        BinaryComp::GreaterEq => lhs >= rhs,
        BinaryComp::Greater => lhs > rhs,
    })
}

fn ground_effect(task: &Task, effect: &ConjunctiveEffect, binding: &[usize]) -> GroundEffect {
    let fluent_atoms = task.atoms.get(PredicateTag::Fluent);
    let mut result = GroundEffect::default();
    for atom in &effect.add {
        let objects = atom.ground_arguments(binding);
        result
            .add
            .push(fluent_atoms.get_or_create(atom.predicate_index, &objects));
    }
    for atom in &effect.delete {
        let objects = atom.ground_arguments(binding);
        result
            .delete
            .push(fluent_atoms.get_or_create(atom.predicate_index, &objects));
    }
    result.add.sort_unstable();
    result.add.dedup();
    result.delete.sort_unstable();
    result.delete.dedup();

    for numeric in &effect.numeric_effects {
        let objects: ObjectTuple = numeric
            .arguments
            .iter()
            .map(|argument| argument.ground(binding))
            .collect();
        let target = task
            .ground_functions
            .get(crate::search::FunctionTag::Fluent)
            .get_or_create(numeric.function_index, &objects);
        let is_auxiliary = task.total_cost_function == Some(numeric.function_index);
        result.numeric_effects.push(GroundNumericEffect {
            op: numeric.op,
            target,
            expression: task.ground_schema_expression(&numeric.expression, binding),
            is_auxiliary,
        });
    }
    result
}

/// The step cost of an action: the amount of its auxiliary (plan-cost)
/// increase when that amount is a constant, and 1 otherwise.
fn extract_cost(effect: &GroundEffect) -> f64 {
    for numeric in &effect.numeric_effects {
        if numeric.is_auxiliary && numeric.op == AssignOp::Increase {
            if let GroundFunctionExpression::Number(value) = numeric.expression {
                return value;
            }
        }
    }
    1.0
}

/// Depth-first enumeration of the extra-parameter bindings of a universal
/// conditional effect, constrained by the effect's consistency graph.
#[allow(clippy::too_many_arguments)]
fn enumerate_extra_bindings(
    task: &Task,
    graph: &StaticConsistencyGraph,
    conditional: &crate::search::ConditionalEffectSchema,
    action_binding: &[usize],
    extras: &mut Vec<usize>,
    chosen_vertices: &mut Vec<usize>,
    level: usize,
    out: &mut Vec<GroundConditionalEffect>,
) {
    if level == conditional.parameters.len() {
        let mut full: Vec<usize> = action_binding.to_vec();
        full.extend(extras.iter().copied());
        if let Some(guard) = ground_condition(task, &conditional.condition, &full) {
            out.push(GroundConditionalEffect {
                condition: guard,
                effect: ground_effect(task, &conditional.effect, &full),
            });
        }
        return;
    }

    for &vertex_index in &graph.vertices_by_parameter()[level] {
        let vertex = graph.vertices()[vertex_index];
        if !chosen_vertices
            .iter()
            .all(|&earlier| graph.has_edge(earlier, vertex_index))
        {
            continue;
        }
        extras[level] = vertex.object_index;
        chosen_vertices.push(vertex_index);
        enumerate_extra_bindings(
            task,
            graph,
            conditional,
            action_binding,
            extras,
            chosen_vertices,
            level + 1,
            out,
        );
        chosen_vertices.pop();
    }
}
