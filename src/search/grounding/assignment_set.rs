//! Assignment sets: per-predicate bit-indexed sets of partial-binding ranks,
//! answering "is there any ground atom extending this partial binding?" in
//! O(1), plus the analogous interval sets for ground function values.

use crate::parsed_types::BinaryOp;
use crate::search::{
    Bounds, FunctionTag, Negatable, ObjectTuple, PredicateTag, SchemaAtom,
    SchemaFunctionExpression, State, Task,
};
use bit_set::BitSet;

/// A vertex assignment `[parameter_index/object_index]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAssignment {
    pub index: usize,
    pub object: usize,
}

impl VertexAssignment {
    pub fn new(index: usize, object: usize) -> Self {
        Self { index, object }
    }
}

/// An edge assignment `[i/o, j/o']` with `i < j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeAssignment {
    pub first: VertexAssignment,
    pub second: VertexAssignment,
}

impl EdgeAssignment {
    pub fn new(first: VertexAssignment, second: VertexAssignment) -> Self {
        debug_assert!(first.index < second.index);
        Self { first, second }
    }
}

/// A minimal perfect hash from vertex and edge assignments to dense ranks.
///
/// Rank 0 is the empty sentinel. A vertex `(i, o)` with `o` type-legal for
/// parameter `i` gets rank `offsets[i] + remapping[i][o]`; an illegal pair
/// ranks 0. Edge ranks pack as `rank(j,o') * num_assignments + rank(i,o)`,
/// so an edge whose second component is absent degrades to the plain vertex
/// rank of its first component.
#[derive(Debug, Clone)]
pub struct PerfectAssignmentHash {
    num_assignments: usize,
    remapping: Vec<Vec<u32>>,
    offsets: Vec<usize>,
}

impl PerfectAssignmentHash {
    /// `legal_objects[i]` lists the objects legal for parameter `i`.
    pub fn new(legal_objects: &[Vec<usize>], num_objects: usize) -> Self {
        let num_parameters = legal_objects.len();
        let mut remapping = vec![vec![0u32; num_objects]; num_parameters];
        let mut offsets = vec![0usize; num_parameters];
        let mut num_assignments = 1usize;
        for (i, legal) in legal_objects.iter().enumerate() {
            offsets[i] = num_assignments - 1;
            for (position, &object) in legal.iter().enumerate() {
                remapping[i][object] = position as u32 + 1;
            }
            num_assignments += legal.len();
        }
        Self {
            num_assignments,
            remapping,
            offsets,
        }
    }

    #[inline(always)]
    pub fn empty_rank() -> usize {
        0
    }

    /// The rank of a vertex assignment; 0 if the pair is not type-legal.
    #[inline(always)]
    pub fn vertex_rank(&self, assignment: VertexAssignment) -> usize {
        let remapped = self.remapping[assignment.index][assignment.object];
        if remapped == 0 {
            0
        } else {
            let rank = self.offsets[assignment.index] + remapped as usize;
            debug_assert!(rank < self.num_assignments);
            rank
        }
    }

    /// The rank of a (possibly partial) edge assignment. The second
    /// component carries the multiplier, so an absent second component
    /// degrades to the first component's vertex rank.
    #[inline(always)]
    pub fn edge_rank(
        &self,
        first: Option<VertexAssignment>,
        second: Option<VertexAssignment>,
    ) -> usize {
        let first_rank = first.map_or(0, |v| self.vertex_rank(v));
        let second_rank = second.map_or(0, |v| self.vertex_rank(v));
        debug_assert!(
            second.is_some() || second_rank * self.num_assignments + first_rank == first_rank
        );
        second_rank * self.num_assignments + first_rank
    }

    /// The total number of ranks, i.e. the size of the backing bitset.
    pub fn num_ranks(&self) -> usize {
        self.num_assignments * self.num_assignments
    }
}

/// The assignment set of one predicate: one bit per valid rank.
#[derive(Debug)]
pub struct PredicateAssignmentSet {
    hash: PerfectAssignmentHash,
    set: BitSet,
}

impl PredicateAssignmentSet {
    fn new(hash: PerfectAssignmentHash) -> Self {
        let capacity = hash.num_ranks();
        Self {
            hash,
            set: BitSet::with_capacity(capacity),
        }
    }

    pub fn reset(&mut self) {
        self.set.clear();
    }

    /// Marks every vertex and edge assignment derivable from the atom's
    /// argument tuple.
    pub fn insert_ground_atom(&mut self, objects: &ObjectTuple) {
        let num = self.hash.num_assignments;
        let ranks: Vec<usize> = objects
            .iter()
            .enumerate()
            .map(|(position, &object)| {
                self.hash.vertex_rank(VertexAssignment::new(position, object))
            })
            .collect();
        for (position, &rank) in ranks.iter().enumerate() {
            if rank == 0 {
                continue;
            }
            // Complete vertex; doubles as the partial edge whose second
            // component is absent.
            self.set.insert(rank);
            // Partial edge with only the second component bound.
            self.set.insert(rank * num);
            for &second_rank in &ranks[position + 1..] {
                if second_rank != 0 {
                    self.set.insert(second_rank * num + rank);
                }
            }
        }
    }

    /// Bit test for a vertex assignment; `None` means the rank is the empty
    /// sentinel and nothing is known.
    pub fn test_vertex(&self, assignment: VertexAssignment) -> Option<bool> {
        let rank = self.hash.vertex_rank(assignment);
        (rank != 0).then(|| self.set.contains(rank))
    }

    /// Bit test for a (possibly partial) edge assignment.
    pub fn test_edge(
        &self,
        first: Option<VertexAssignment>,
        second: Option<VertexAssignment>,
    ) -> Option<bool> {
        let rank = self.hash.edge_rank(first, second);
        (rank != 0).then(|| self.set.contains(rank))
    }
}

/// Per-predicate assignment sets for one predicate tag.
#[derive(Debug)]
pub struct PredicateAssignmentSets {
    sets: Vec<PredicateAssignmentSet>,
}

impl PredicateAssignmentSets {
    pub fn new(task: &Task, tag: PredicateTag) -> Self {
        let sets = task
            .predicates
            .get(tag)
            .iter()
            .map(|predicate| {
                let legal: Vec<Vec<usize>> = predicate
                    .parameter_types
                    .iter()
                    .map(|types| task.legal_objects(types))
                    .collect();
                PredicateAssignmentSet::new(PerfectAssignmentHash::new(
                    &legal,
                    task.objects.len(),
                ))
            })
            .collect();
        Self { sets }
    }

    pub fn reset(&mut self) {
        for set in &mut self.sets {
            set.reset();
        }
    }

    pub fn insert_ground_atom(&mut self, predicate_index: usize, objects: &ObjectTuple) {
        self.sets[predicate_index].insert_ground_atom(objects);
    }

    pub fn get(&self, predicate_index: usize) -> &PredicateAssignmentSet {
        &self.sets[predicate_index]
    }

    /// Whether the assignment sets refute the literal under the partial
    /// binding. Positive literals are refuted when a derived vertex/edge bit
    /// is absent; negative unary/binary literals are refuted when their
    /// fully-bound bit is present. Unknown (empty-sentinel) ranks never
    /// refute.
    pub fn refutes_literal(
        &self,
        literal: &Negatable<SchemaAtom>,
        binding: &[Option<usize>],
    ) -> bool {
        let atom = literal.underlying();
        let arity = atom.arguments.len();
        if arity == 0 {
            return false;
        }
        let set = self.get(atom.predicate_index);
        let resolved: Vec<Option<VertexAssignment>> = atom
            .arguments
            .iter()
            .enumerate()
            .map(|(position, argument)| {
                argument
                    .resolve(binding)
                    .map(|object| VertexAssignment::new(position, object))
            })
            .collect();

        if literal.is_negated() {
            // Only a fully-bound unary or binary literal has an exact bit;
            // a type-illegal component degrades the edge rank to a partial
            // rank, which must not refute.
            match (arity, &resolved[..]) {
                (1, [Some(v)]) => set.test_vertex(*v) == Some(true),
                (2, [Some(first), Some(second)]) => {
                    set.test_vertex(*first).is_some()
                        && set.test_vertex(*second).is_some()
                        && set.test_edge(Some(*first), Some(*second)) == Some(true)
                }
                _ => false,
            }
        } else {
            for (position, vertex) in resolved.iter().enumerate() {
                let Some(vertex) = vertex else { continue };
                if set.test_vertex(*vertex) == Some(false) {
                    return true;
                }
                for second in resolved[position + 1..].iter().flatten() {
                    if set.test_edge(Some(*vertex), Some(*second)) == Some(false) {
                        return true;
                    }
                }
            }
            false
        }
    }
}

/// The interval set of one function skeleton: per rank, the bounds of the
/// ground function values matching that partial assignment.
#[derive(Debug)]
pub struct FunctionSkeletonAssignmentSet {
    hash: PerfectAssignmentHash,
    set: Vec<Bounds>,
}

impl FunctionSkeletonAssignmentSet {
    fn new(hash: PerfectAssignmentHash) -> Self {
        let size = hash.num_ranks();
        Self {
            hash,
            set: vec![Bounds::unbounded(); size],
        }
    }

    pub fn reset(&mut self) {
        self.set.fill(Bounds::unbounded());
    }

    pub fn insert_ground_function_value(&mut self, objects: &ObjectTuple, value: f64) {
        let num = self.hash.num_assignments;
        self.set[PerfectAssignmentHash::empty_rank()].extend(value);
        let ranks: Vec<usize> = objects
            .iter()
            .enumerate()
            .map(|(position, &object)| {
                self.hash.vertex_rank(VertexAssignment::new(position, object))
            })
            .collect();
        for (position, &rank) in ranks.iter().enumerate() {
            if rank == 0 {
                continue;
            }
            self.set[rank].extend(value);
            self.set[rank * num].extend(value);
            for &second_rank in &ranks[position + 1..] {
                if second_rank != 0 {
                    self.set[second_rank * num + rank].extend(value);
                }
            }
        }
    }

    /// The value bounds of the function under a partial binding of its
    /// argument positions, intersecting every pairwise view. `None` means
    /// no ground value matches, i.e. the value is certainly undefined.
    pub fn bounds(&self, bound: &[Option<usize>]) -> Option<Bounds> {
        let mut result = self.set[PerfectAssignmentHash::empty_rank()];
        if result.is_unbounded() {
            // nothing has a value at all
            return None;
        }
        let vertices: Vec<Option<VertexAssignment>> = bound
            .iter()
            .enumerate()
            .map(|(position, object)| object.map(|o| VertexAssignment::new(position, o)))
            .collect();
        for (position, vertex) in vertices.iter().enumerate() {
            let Some(vertex) = vertex else { continue };
            let rank = self.hash.vertex_rank(*vertex);
            if rank != 0 {
                let cell = self.set[rank];
                if cell.is_unbounded() {
                    return None;
                }
                result = result.intersect(&cell);
            }
            for second in vertices[position + 1..].iter().flatten() {
                let rank = self.hash.edge_rank(Some(*vertex), Some(*second));
                if rank != 0 {
                    let cell = self.set[rank];
                    if cell.is_unbounded() {
                        return None;
                    }
                    result = result.intersect(&cell);
                }
            }
        }
        (result.lower <= result.upper).then_some(result)
    }
}

/// Per-skeleton interval sets for one function tag.
#[derive(Debug)]
pub struct FunctionAssignmentSets {
    sets: Vec<FunctionSkeletonAssignmentSet>,
}

impl FunctionAssignmentSets {
    pub fn new(task: &Task, tag: FunctionTag) -> Self {
        let sets = task
            .functions
            .get(tag)
            .iter()
            .map(|skeleton| {
                let legal: Vec<Vec<usize>> = skeleton
                    .parameter_types
                    .iter()
                    .map(|types| task.legal_objects(types))
                    .collect();
                FunctionSkeletonAssignmentSet::new(PerfectAssignmentHash::new(
                    &legal,
                    task.objects.len(),
                ))
            })
            .collect();
        Self { sets }
    }

    pub fn reset(&mut self) {
        for set in &mut self.sets {
            set.reset();
        }
    }

    pub fn insert_ground_function_value(
        &mut self,
        function_index: usize,
        objects: &ObjectTuple,
        value: f64,
    ) {
        self.sets[function_index].insert_ground_function_value(objects, value);
    }

    pub fn get(&self, function_index: usize) -> &FunctionSkeletonAssignmentSet {
        &self.sets[function_index]
    }
}

/// Interval evaluation of a schema function expression under a partial
/// binding. `fluent` may be absent (e.g. in the static consistency graph),
/// in which case fluent function values are unconstrained.
fn expression_bounds(
    expression: &SchemaFunctionExpression,
    static_functions: &FunctionAssignmentSets,
    fluent_functions: Option<&FunctionAssignmentSets>,
    binding: &[Option<usize>],
) -> Option<Bounds> {
    match expression {
        SchemaFunctionExpression::Number(value) => Some(Bounds::exactly(*value)),
        SchemaFunctionExpression::Function {
            tag,
            index,
            arguments,
        } => {
            let bound: Vec<Option<usize>> = arguments
                .iter()
                .map(|argument| argument.resolve(binding))
                .collect();
            match tag {
                FunctionTag::Static => static_functions.get(*index).bounds(&bound),
                FunctionTag::Fluent => match fluent_functions {
                    Some(sets) => sets.get(*index).bounds(&bound),
                    None => Some(Bounds::unbounded()),
                },
            }
        }
        SchemaFunctionExpression::Binary(op, lhs, rhs) => {
            let lhs = expression_bounds(lhs, static_functions, fluent_functions, binding)?;
            let rhs = expression_bounds(rhs, static_functions, fluent_functions, binding)?;
            Some(match op {
                BinaryOp::Add => lhs.add(&rhs),
                BinaryOp::Sub => lhs.sub(&rhs),
                BinaryOp::Mul => lhs.mul(&rhs),
                BinaryOp::Div => lhs.div(&rhs),
            })
        }
    }
}

/// Whether the numeric constraint can possibly hold under the partial
/// binding, judged by interval arithmetic over the function assignment
/// sets.
pub fn constraint_possibly_satisfiable(
    constraint: &crate::search::NumericConstraint,
    static_functions: &FunctionAssignmentSets,
    fluent_functions: Option<&FunctionAssignmentSets>,
    binding: &[Option<usize>],
) -> bool {
    let lhs = expression_bounds(&constraint.lhs, static_functions, fluent_functions, binding);
    let rhs = expression_bounds(&constraint.rhs, static_functions, fluent_functions, binding);
    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => lhs.maybe_satisfies(constraint.comparator, &rhs),
        _ => false,
    }
}

/// The problem-constant assignment sets: static predicates and static
/// function values, built once per task.
#[derive(Debug)]
pub struct StaticAssignmentSets {
    pub predicates: PredicateAssignmentSets,
    pub functions: FunctionAssignmentSets,
}

impl StaticAssignmentSets {
    pub fn new(task: &Task) -> Self {
        let mut predicates = PredicateAssignmentSets::new(task, PredicateTag::Static);
        let repository = task.atoms.get(PredicateTag::Static);
        for index in repository.indices() {
            let atom = repository.get(index);
            predicates.insert_ground_atom(atom.predicate_index, &atom.objects);
        }

        let mut functions = FunctionAssignmentSets::new(task, FunctionTag::Static);
        let function_repository = task.ground_functions.get(FunctionTag::Static);
        for index in 0..function_repository.len() as u32 {
            if let Some(value) = task.static_function_value(index) {
                let function = function_repository.get(index);
                functions.insert_ground_function_value(
                    function.function_index,
                    &function.objects,
                    value,
                );
            }
        }

        Self {
            predicates,
            functions,
        }
    }
}

/// The per-state assignment sets consulted by the binding generator: fluent
/// and derived atoms of the state plus the fluent function values.
#[derive(Debug)]
pub struct StateAssignmentSets {
    pub fluent: PredicateAssignmentSets,
    pub derived: PredicateAssignmentSets,
    pub fluent_functions: FunctionAssignmentSets,
}

impl StateAssignmentSets {
    pub fn new(task: &Task) -> Self {
        Self {
            fluent: PredicateAssignmentSets::new(task, PredicateTag::Fluent),
            derived: PredicateAssignmentSets::new(task, PredicateTag::Derived),
            fluent_functions: FunctionAssignmentSets::new(task, FunctionTag::Fluent),
        }
    }

    /// Rebuilds the sets for a state. `reset` clears all bits first, so one
    /// instance can be reused across states.
    pub fn rebuild(&mut self, task: &Task, state: &State) {
        self.fluent.reset();
        self.derived.reset();
        self.fluent_functions.reset();
        self.insert_atoms(task, PredicateTag::Fluent, state.fluent_atoms());
        self.insert_atoms(task, PredicateTag::Derived, state.derived_atoms());

        let repository = task.ground_functions.get(FunctionTag::Fluent);
        for (index, value) in state.numeric_values().iter().enumerate() {
            if value.into_inner().is_nan() {
                continue;
            }
            let function = repository.get(index as u32);
            self.fluent_functions.insert_ground_function_value(
                function.function_index,
                &function.objects,
                value.into_inner(),
            );
        }
    }

    /// Inserts an arbitrary atom collection; used by the delete-relaxed
    /// explorator where the "state" is the monotonically growing atom set.
    pub fn insert_atoms(&mut self, task: &Task, tag: PredicateTag, atoms: &[u32]) {
        let repository = task.atoms.get(tag);
        let sets = match tag {
            PredicateTag::Fluent => &mut self.fluent,
            PredicateTag::Derived => &mut self.derived,
            PredicateTag::Static => unreachable!("static atoms have their own sets"),
        };
        for &index in atoms {
            let atom = repository.get(index);
            sets.insert_ground_atom(atom.predicate_index, &atom.objects);
        }
    }

    pub fn for_tag(&self, tag: PredicateTag) -> &PredicateAssignmentSets {
        match tag {
            PredicateTag::Fluent => &self.fluent,
            PredicateTag::Derived => &self.derived,
            PredicateTag::Static => unreachable!("static atoms have their own sets"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_for(legal: &[Vec<usize>], num_objects: usize) -> PerfectAssignmentHash {
        PerfectAssignmentHash::new(legal, num_objects)
    }

    #[test]
    fn vertex_ranks_are_dense_and_start_after_the_sentinel() {
        // two parameters: {0, 1} legal for the first, {2} for the second
        let hash = hash_for(&[vec![0, 1], vec![2]], 3);
        assert_eq!(PerfectAssignmentHash::empty_rank(), 0);
        assert_eq!(hash.vertex_rank(VertexAssignment::new(0, 0)), 1);
        assert_eq!(hash.vertex_rank(VertexAssignment::new(0, 1)), 2);
        assert_eq!(hash.vertex_rank(VertexAssignment::new(1, 2)), 3);
        // illegal pairs rank 0
        assert_eq!(hash.vertex_rank(VertexAssignment::new(0, 2)), 0);
        assert_eq!(hash.vertex_rank(VertexAssignment::new(1, 0)), 0);
    }

    #[test]
    fn partial_edge_degrades_to_the_vertex_rank() {
        let hash = hash_for(&[vec![0, 1], vec![2]], 3);
        let vertex = VertexAssignment::new(0, 1);
        assert_eq!(
            hash.edge_rank(Some(vertex), None),
            hash.vertex_rank(vertex)
        );
    }

    #[test]
    fn insert_sets_every_derived_assignment() {
        // binary predicate over three objects, all legal everywhere
        let hash = hash_for(&[vec![0, 1, 2], vec![0, 1, 2]], 3);
        let mut set = PredicateAssignmentSet::new(hash);
        let atom = crate::search::object_tuple![0, 2];
        set.insert_ground_atom(&atom);

        // vertex assignments from the atom's arguments
        assert_eq!(set.test_vertex(VertexAssignment::new(0, 0)), Some(true));
        assert_eq!(set.test_vertex(VertexAssignment::new(1, 2)), Some(true));
        // the full edge
        assert_eq!(
            set.test_edge(
                Some(VertexAssignment::new(0, 0)),
                Some(VertexAssignment::new(1, 2))
            ),
            Some(true)
        );
        // assignments not derived from the atom stay false
        assert_eq!(set.test_vertex(VertexAssignment::new(0, 1)), Some(false));
        assert_eq!(
            set.test_edge(
                Some(VertexAssignment::new(0, 0)),
                Some(VertexAssignment::new(1, 1))
            ),
            Some(false)
        );
    }

    #[test]
    fn reset_clears_all_bits() {
        let hash = hash_for(&[vec![0, 1]], 2);
        let mut set = PredicateAssignmentSet::new(hash);
        set.insert_ground_atom(&crate::search::object_tuple![1]);
        assert_eq!(set.test_vertex(VertexAssignment::new(0, 1)), Some(true));
        set.reset();
        assert_eq!(set.test_vertex(VertexAssignment::new(0, 1)), Some(false));
    }

    #[test]
    fn function_bounds_track_min_and_max() {
        let hash = hash_for(&[vec![0, 1]], 2);
        let mut set = FunctionSkeletonAssignmentSet::new(hash);
        set.insert_ground_function_value(&crate::search::object_tuple![0], 3.0);
        set.insert_ground_function_value(&crate::search::object_tuple![1], 7.0);

        let unbound = set.bounds(&[None]).unwrap();
        assert_eq!(unbound, Bounds::new(3.0, 7.0));
        let bound = set.bounds(&[Some(1)]).unwrap();
        assert_eq!(bound, Bounds::exactly(7.0));
    }

    #[test]
    fn missing_function_value_is_undefined() {
        let hash = hash_for(&[vec![0, 1]], 2);
        let mut set = FunctionSkeletonAssignmentSet::new(hash);
        set.insert_ground_function_value(&crate::search::object_tuple![0], 3.0);
        assert!(set.bounds(&[Some(1)]).is_none());
    }
}
