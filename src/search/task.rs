use crate::parsed_types::{
    Condition as ParsedCondition, Domain, Effect as ParsedEffect, InitElement, Literal, Name,
    PredicateDefinition, Problem, Type, Typed, TypedList, Variable,
};
use crate::parsers::Parser;
use crate::search::{
    ActionSchema, AtomRepository, AxiomSchema, FunctionSkeleton, FunctionTag, Goal,
    GroundFunctionExpression, GroundFunctionRepository, GroundNumericConstraint, NumericConstraint,
    Object, ObjectTuple, PerFunctionTag, PerTag, Predicate, PredicateTag,
    SchemaFunctionExpression, State, TypeHierarchy,
};
use crate::search::action_schema::SchemaTables;
use ordered_float::OrderedFloat;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// The name of the static predicate that equality conditions are compiled
/// into.
pub const EQUALITY_PREDICATE_NAME: &str = "@object-equal";

/// An indexed planning task: the domain and problem resolved to dense
/// indices, with interning repositories for ground atoms and functions.
#[derive(Debug)]
pub struct Task {
    domain_name: Name,
    problem_name: Name,
    pub types: TypeHierarchy,
    pub objects: Vec<Object>,
    pub predicates: PerTag<Vec<Predicate>>,
    pub functions: PerFunctionTag<Vec<FunctionSkeleton>>,
    pub action_schemas: Vec<ActionSchema>,
    pub axiom_schemas: Vec<AxiomSchema>,
    /// Ground-atom interning repositories, one per predicate tag. The
    /// static repository contains exactly the true static atoms.
    pub atoms: PerTag<AtomRepository>,
    pub ground_functions: PerFunctionTag<GroundFunctionRepository>,
    /// Values of static ground functions, aligned with the static function
    /// repository at construction time; later-interned indices are
    /// undefined.
    static_function_values: Vec<f64>,
    /// The initial state before the derived-predicate closure; the state
    /// repository closes it.
    pub initial_state: State,
    pub goal: Goal,
    /// Sorted object indices per type index (reflexive over subtyping).
    objects_by_type: Vec<Vec<usize>>,
    /// The fluent function representing the accumulated plan cost, if the
    /// domain declares one.
    pub total_cost_function: Option<usize>,
    pub(crate) predicate_table: HashMap<Name, (PredicateTag, usize)>,
    pub(crate) function_table: HashMap<Name, (FunctionTag, usize)>,
    pub(crate) object_table: HashMap<Name, usize>,
}

impl Task {
    pub fn from_path(domain_path: &PathBuf, problem_path: &PathBuf) -> Self {
        let domain_text =
            fs::read_to_string(domain_path).expect("Failed to read domain file, does it exist?");
        let problem_text =
            fs::read_to_string(problem_path).expect("Failed to read problem file, does it exist?");
        Self::from_text(&domain_text, &problem_text)
    }

    pub fn from_text(domain_text: &str, problem_text: &str) -> Self {
        let domain = Domain::from_str(domain_text).expect("Failed to parse domain file");
        let problem = Problem::from_str(problem_text).expect("Failed to parse problem file");
        Self::from_parsed(domain, problem)
    }

    pub fn from_parsed(domain: Domain, problem: Problem) -> Self {
        assert_eq!(
            domain.name(),
            problem.domain(),
            "Problem domain does not match the domain."
        );

        let types = TypeHierarchy::new(domain.types());

        /* Objects: problem objects first, then domain constants. */
        let mut objects: Vec<Object> = vec![];
        let mut object_table: HashMap<Name, usize> = HashMap::new();
        for typed in problem.objects().iter().chain(domain.constants().iter()) {
            let index = objects.len();
            objects.push(Object::new(index, typed, &types));
            let previous = object_table.insert(typed.value().clone(), index);
            assert!(previous.is_none(), "duplicate object name");
        }

        /* Partition predicates into Static / Fluent / Derived. */
        let derived_names: HashSet<Name> = domain
            .deriveds()
            .iter()
            .map(|derived| derived.predicate_name().clone())
            .collect();
        let mut effect_names: HashSet<Name> = HashSet::new();
        for action in domain.actions() {
            if let Some(effect) = action.effect() {
                collect_effect_predicate_names(effect, &mut effect_names);
            }
        }

        let uses_equality = domain_uses_equality(&domain, &problem);
        let mut predicate_definitions: Vec<PredicateDefinition> = domain.predicates().to_vec();
        if uses_equality {
            info!("compiling equality conditions into {EQUALITY_PREDICATE_NAME}");
            predicate_definitions.push(equality_predicate_definition());
        }

        let mut predicates: PerTag<Vec<Predicate>> = PerTag::default();
        let mut predicate_table: HashMap<Name, (PredicateTag, usize)> = HashMap::new();
        for definition in &predicate_definitions {
            let tag = if derived_names.contains(definition.name()) {
                PredicateTag::Derived
            } else if effect_names.contains(definition.name()) {
                PredicateTag::Fluent
            } else {
                PredicateTag::Static
            };
            let index = predicates.get(tag).len();
            predicates
                .get_mut(tag)
                .push(Predicate::new(index, tag, definition, &types));
            predicate_table.insert(definition.name().clone(), (tag, index));
        }
        if uses_equality {
            let entry = predicate_table[&Name::from(EQUALITY_PREDICATE_NAME)];
            predicate_table.insert(Name::from("="), entry);
        }

        /* Partition functions into Static / Fluent. */
        let mut numeric_effect_names: HashSet<Name> = HashSet::new();
        for action in domain.actions() {
            if let Some(effect) = action.effect() {
                collect_numeric_effect_names(effect, &mut numeric_effect_names);
            }
        }
        let mut functions: PerFunctionTag<Vec<FunctionSkeleton>> = PerFunctionTag::default();
        let mut function_table: HashMap<Name, (FunctionTag, usize)> = HashMap::new();
        let mut total_cost_function = None;
        for declaration in domain.functions() {
            let tag = if numeric_effect_names.contains(declaration.name()) {
                FunctionTag::Fluent
            } else {
                FunctionTag::Static
            };
            let index = functions.get(tag).len();
            functions
                .get_mut(tag)
                .push(FunctionSkeleton::new(index, tag, declaration, &types));
            function_table.insert(declaration.name().clone(), (tag, index));
            if tag == FunctionTag::Fluent && declaration.name() == &"total-cost" {
                total_cost_function = Some(index);
            }
        }

        /* Action and axiom schemas. */
        let tables = SchemaTables {
            predicates: &predicate_table,
            functions: &function_table,
            objects: &object_table,
            types: &types,
        };
        let action_schemas: Vec<ActionSchema> = domain
            .actions()
            .iter()
            .enumerate()
            .map(|(index, action)| ActionSchema::new(index, action, &tables))
            .collect();
        let axiom_schemas: Vec<AxiomSchema> = domain
            .deriveds()
            .iter()
            .enumerate()
            .map(|(index, derived)| AxiomSchema::new(index, derived, &tables))
            .collect();

        /* Ground atoms and function values of the initial state. */
        let atoms: PerTag<AtomRepository> = PerTag::from_fn(|_| AtomRepository::new());
        let ground_functions: PerFunctionTag<GroundFunctionRepository> = PerFunctionTag {
            static_: GroundFunctionRepository::new(),
            fluent: GroundFunctionRepository::new(),
        };
        let mut initial_fluent_atoms: Vec<u32> = vec![];
        let mut static_function_values: Vec<f64> = vec![];
        let mut fluent_function_values: Vec<(u32, f64)> = vec![];
        for element in problem.init() {
            match element {
                InitElement::Literal(literal) => {
                    let atom = match literal {
                        Literal::Positive(atom) => atom,
                        Literal::Negative(_) => {
                            panic!("Negative atoms in the initial state do not make sense")
                        }
                    };
                    let &(tag, predicate_index) = predicate_table
                        .get(atom.predicate_name())
                        .expect("initial-state predicate not declared in the domain");
                    assert_ne!(
                        tag,
                        PredicateTag::Derived,
                        "derived atoms cannot appear in the initial state"
                    );
                    let arguments: ObjectTuple = atom
                        .values()
                        .iter()
                        .map(|name| {
                            *object_table
                                .get(name)
                                .expect("initial-state object not declared")
                        })
                        .collect();
                    let index = atoms.get(tag).get_or_create(predicate_index, &arguments);
                    if tag == PredicateTag::Fluent {
                        initial_fluent_atoms.push(index);
                    }
                }
                InitElement::FunctionValue(function, value) => {
                    let &(tag, function_index) = function_table
                        .get(function.symbol())
                        .expect("initial-state function not declared in the domain");
                    let arguments: ObjectTuple = function
                        .values()
                        .iter()
                        .map(|name| {
                            *object_table
                                .get(name)
                                .expect("initial-state object not declared")
                        })
                        .collect();
                    match tag {
                        FunctionTag::Static => {
                            let index = ground_functions
                                .get(FunctionTag::Static)
                                .get_or_create(function_index, &arguments);
                            assert_eq!(index as usize, static_function_values.len());
                            static_function_values.push(*value);
                        }
                        FunctionTag::Fluent => {
                            let index = ground_functions
                                .get(FunctionTag::Fluent)
                                .get_or_create(function_index, &arguments);
                            fluent_function_values.push((index, *value));
                        }
                    }
                }
            }
        }
        if uses_equality {
            let (_, equality_index) = predicate_table[&Name::from(EQUALITY_PREDICATE_NAME)];
            for object in &objects {
                let arguments: ObjectTuple =
                    crate::search::object_tuple![object.index, object.index];
                atoms
                    .get(PredicateTag::Static)
                    .get_or_create(equality_index, &arguments);
            }
        }

        let num_fluent_functions = ground_functions.get(FunctionTag::Fluent).len();
        let mut initial_numeric = vec![OrderedFloat(f64::NAN); num_fluent_functions];
        for (index, value) in fluent_function_values {
            initial_numeric[index as usize] = OrderedFloat(value);
        }
        let initial_state = State::new(initial_fluent_atoms, vec![], initial_numeric);

        /* Objects per type. */
        let mut objects_by_type = vec![vec![]; types.len()];
        for object in &objects {
            for &t in &object.type_closure {
                objects_by_type[t].push(object.index);
            }
        }
        for list in &mut objects_by_type {
            list.sort_unstable();
            list.dedup();
        }

        let mut task = Self {
            domain_name: domain.name().clone(),
            problem_name: problem.name().clone(),
            types,
            objects,
            predicates,
            functions,
            action_schemas,
            axiom_schemas,
            atoms,
            ground_functions,
            static_function_values,
            initial_state,
            goal: Goal::default(),
            objects_by_type,
            total_cost_function,
            predicate_table,
            function_table,
            object_table,
        };
        task.goal = Goal::new(&task, problem.goal());
        info!(
            domain = %task.domain_name,
            problem = %task.problem_name,
            num_objects = task.objects.len(),
            num_actions = task.action_schemas.len(),
            num_axioms = task.axiom_schemas.len(),
            "constructed task"
        );
        task
    }

    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }

    pub fn problem_name(&self) -> &str {
        &self.problem_name
    }

    /// The sorted object indices legal for a parameter accepting any of
    /// `type_indices`.
    pub fn legal_objects(&self, type_indices: &[usize]) -> Vec<usize> {
        let mut result: Vec<usize> = type_indices
            .iter()
            .flat_map(|&t| self.objects_by_type[t].iter().copied())
            .collect();
        result.sort_unstable();
        result.dedup();
        result
    }

    pub fn objects_by_type(&self) -> &[Vec<usize>] {
        &self.objects_by_type
    }

    pub fn object_index(&self, name: &str) -> Option<usize> {
        self.object_table.get(&Name::from(name)).copied()
    }

    pub fn find_predicate(&self, name: &str) -> Option<(PredicateTag, usize)> {
        self.predicate_table.get(&Name::from(name)).copied()
    }

    /// Truth of a ground atom in a state. Atoms that were never interned
    /// are false; interned static atoms are true by construction.
    pub fn is_atom_true(
        &self,
        tag: PredicateTag,
        predicate_index: usize,
        objects: &ObjectTuple,
        state: &State,
    ) -> bool {
        match tag {
            PredicateTag::Static => self
                .atoms
                .get(PredicateTag::Static)
                .find(predicate_index, objects)
                .is_some(),
            PredicateTag::Fluent => self
                .atoms
                .get(PredicateTag::Fluent)
                .find(predicate_index, objects)
                .map_or(false, |index| state.has_fluent_atom(index)),
            PredicateTag::Derived => self
                .atoms
                .get(PredicateTag::Derived)
                .find(predicate_index, objects)
                .map_or(false, |index| state.has_derived_atom(index)),
        }
    }

    /// The value of a static ground function, or `None` if undefined.
    pub fn static_function_value(&self, index: u32) -> Option<f64> {
        self.static_function_values.get(index as usize).copied()
    }

    /// Grounds a schema-level function expression under a complete binding,
    /// folding static function values into constants.
    pub fn ground_schema_expression(
        &self,
        expression: &SchemaFunctionExpression,
        binding: &[usize],
    ) -> GroundFunctionExpression {
        match expression {
            SchemaFunctionExpression::Number(value) => GroundFunctionExpression::Number(*value),
            SchemaFunctionExpression::Function {
                tag,
                index,
                arguments,
            } => {
                let objects: ObjectTuple = arguments
                    .iter()
                    .map(|argument| argument.ground(binding))
                    .collect();
                match tag {
                    FunctionTag::Static => {
                        let ground = self
                            .ground_functions
                            .get(FunctionTag::Static)
                            .find(*index, &objects);
                        match ground.and_then(|g| self.static_function_value(g)) {
                            Some(value) => GroundFunctionExpression::Number(value),
                            None => GroundFunctionExpression::Undefined,
                        }
                    }
                    FunctionTag::Fluent => {
                        let ground = self
                            .ground_functions
                            .get(FunctionTag::Fluent)
                            .get_or_create(*index, &objects);
                        GroundFunctionExpression::Variable(ground)
                    }
                }
            }
            SchemaFunctionExpression::Binary(op, lhs, rhs) => GroundFunctionExpression::Binary(
                *op,
                Box::new(self.ground_schema_expression(lhs, binding)),
                Box::new(self.ground_schema_expression(rhs, binding)),
            ),
        }
    }

    /// Grounds a schema-level numeric constraint under a complete binding.
    pub fn ground_numeric_constraint(
        &self,
        constraint: &NumericConstraint,
        binding: &[usize],
    ) -> GroundNumericConstraint {
        GroundNumericConstraint {
            comparator: constraint.comparator,
            lhs: self.ground_schema_expression(&constraint.lhs, binding),
            rhs: self.ground_schema_expression(&constraint.rhs, binding),
        }
    }
}

fn collect_effect_predicate_names(effect: &ParsedEffect, names: &mut HashSet<Name>) {
    match effect {
        ParsedEffect::And(effects) => {
            for effect in effects {
                collect_effect_predicate_names(effect, names);
            }
        }
        ParsedEffect::Literal(literal) => {
            names.insert(literal.atom().predicate_name().clone());
        }
        ParsedEffect::Numeric(_, _, _) => {}
        ParsedEffect::When(_, body) => collect_effect_predicate_names(body, names),
        ParsedEffect::Forall(_, body) => collect_effect_predicate_names(body, names),
    }
}

fn collect_numeric_effect_names(effect: &ParsedEffect, names: &mut HashSet<Name>) {
    match effect {
        ParsedEffect::And(effects) => {
            for effect in effects {
                collect_numeric_effect_names(effect, names);
            }
        }
        ParsedEffect::Literal(_) => {}
        ParsedEffect::Numeric(_, function, _) => {
            names.insert(function.symbol().clone());
        }
        ParsedEffect::When(_, body) => collect_numeric_effect_names(body, names),
        ParsedEffect::Forall(_, body) => collect_numeric_effect_names(body, names),
    }
}

fn equality_predicate_definition() -> PredicateDefinition {
    let variables = TypedList::new(vec![
        Typed::new(Variable::from("x"), Type::object()),
        Typed::new(Variable::from("y"), Type::object()),
    ]);
    PredicateDefinition::new(Name::from(EQUALITY_PREDICATE_NAME), variables)
}

fn domain_uses_equality(domain: &Domain, problem: &Problem) -> bool {
    fn condition_uses_equality(condition: &ParsedCondition) -> bool {
        match condition {
            ParsedCondition::And(conditions) => conditions.iter().any(condition_uses_equality),
            ParsedCondition::Literal(literal) => literal.atom().predicate_name() == &"=",
            ParsedCondition::Comparison(_, _, _) => false,
        }
    }
    fn effect_uses_equality(effect: &ParsedEffect) -> bool {
        match effect {
            ParsedEffect::And(effects) => effects.iter().any(effect_uses_equality),
            ParsedEffect::Literal(_) | ParsedEffect::Numeric(_, _, _) => false,
            ParsedEffect::When(condition, body) => {
                condition_uses_equality(condition) || effect_uses_equality(body)
            }
            ParsedEffect::Forall(_, body) => effect_uses_equality(body),
        }
    }

    domain.actions().iter().any(|action| {
        action
            .precondition()
            .map_or(false, condition_uses_equality)
            || action.effect().map_or(false, effect_uses_equality)
    }) || domain
        .deriveds()
        .iter()
        .any(|derived| condition_uses_equality(derived.condition()))
        || condition_uses_equality(problem.goal())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn gripper() {
        let task = Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT);

        assert_eq!(task.domain_name(), "gripper");
        assert_eq!(task.problem_name(), "p-1-0");
        assert_eq!(task.objects.len(), 6);
        assert_eq!(task.action_schemas.len(), 3);
        assert!(task.axiom_schemas.is_empty());

        // at-robby, at, free, carry are all written by effects
        assert_eq!(task.predicates.get(PredicateTag::Fluent).len(), 4);
        // equality is compiled into a static predicate
        assert_eq!(task.predicates.get(PredicateTag::Static).len(), 1);
        assert_eq!(
            task.find_predicate(EQUALITY_PREDICATE_NAME),
            task.find_predicate("=")
        );
        // one reflexive equality atom per object
        assert_eq!(task.atoms.get(PredicateTag::Static).len(), 6);

        // initial state: at-robby + two balls + two free grippers
        assert_eq!(task.initial_state.fluent_atoms().len(), 5);
        assert_eq!(task.goal.positive_atoms(PredicateTag::Fluent).len(), 2);
    }

    #[test]
    fn predicate_tagging_with_axioms() {
        let task = Task::from_text(BLOCKS_DERIVED_DOMAIN_TEXT, BLOCKS_DERIVED_PROBLEM_TEXT);

        assert_eq!(task.predicates.get(PredicateTag::Derived).len(), 1);
        assert_eq!(task.predicates.get(PredicateTag::Fluent).len(), 5);
        assert_eq!(task.axiom_schemas.len(), 2);
        // the recursive rule carries an extra existential body variable
        assert_eq!(task.axiom_schemas[1].parameters.len(), 3);
        assert_eq!(task.goal.positive_atoms(PredicateTag::Derived).len(), 1);
    }

    #[test]
    fn function_tagging() {
        let task = Task::from_text(FUEL_DOMAIN_TEXT, FUEL_PROBLEM_TEXT);

        // fuel is assigned and decreased, capacity never changes
        assert_eq!(task.functions.get(FunctionTag::Fluent).len(), 1);
        assert_eq!(task.functions.get(FunctionTag::Static).len(), 1);

        // (= (fuel t1) 1) defines the initial numeric state
        assert_eq!(task.initial_state.numeric_values().len(), 1);
        assert_eq!(task.initial_state.numeric_value(0), Some(1.0));
        // (= (capacity t1) 2) is a static function value
        assert_eq!(task.static_function_value(0), Some(2.0));
    }

    #[test]
    fn legal_objects_respect_subtyping() {
        let task = Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT);
        let room = task.types.index_of(&Name::from("room")).unwrap();
        let ball = task.types.index_of(&Name::from("ball")).unwrap();
        let object = task.types.index_of(&Name::from("object")).unwrap();

        assert_eq!(task.legal_objects(&[room]).len(), 2);
        assert_eq!(task.legal_objects(&[ball]).len(), 2);
        assert_eq!(task.legal_objects(&[room, ball]).len(), 4);
        assert_eq!(task.legal_objects(&[object]).len(), 6);
    }
}
