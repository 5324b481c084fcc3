use ordered_float::OrderedFloat;

/// Identifier of an interned state in a [`super::StateRepository`].
pub type StateId = usize;

/// A canonical state: sorted fluent and derived ground-atom index lists plus
/// the values of the fluent numeric variables. The derived atoms are the
/// least fixpoint of the axiom rules over the fluent atoms. Undefined
/// numeric values are stored as NaN (which `OrderedFloat` hashes and
/// compares consistently).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State {
    fluent_atoms: Vec<u32>,
    derived_atoms: Vec<u32>,
    numeric_values: Vec<OrderedFloat<f64>>,
}

impl State {
    pub fn new(
        mut fluent_atoms: Vec<u32>,
        mut derived_atoms: Vec<u32>,
        mut numeric_values: Vec<OrderedFloat<f64>>,
    ) -> Self {
        fluent_atoms.sort_unstable();
        fluent_atoms.dedup();
        derived_atoms.sort_unstable();
        derived_atoms.dedup();
        // trailing undefined values carry no information; trimming them
        // keeps states canonical when the function repository grows later
        while numeric_values
            .last()
            .is_some_and(|value| value.into_inner().is_nan())
        {
            numeric_values.pop();
        }
        Self {
            fluent_atoms,
            derived_atoms,
            numeric_values,
        }
    }

    #[inline(always)]
    pub fn has_fluent_atom(&self, atom: u32) -> bool {
        self.fluent_atoms.binary_search(&atom).is_ok()
    }

    #[inline(always)]
    pub fn has_derived_atom(&self, atom: u32) -> bool {
        self.derived_atoms.binary_search(&atom).is_ok()
    }

    pub fn fluent_atoms(&self) -> &[u32] {
        &self.fluent_atoms
    }

    pub fn derived_atoms(&self) -> &[u32] {
        &self.derived_atoms
    }

    pub fn numeric_values(&self) -> &[OrderedFloat<f64>] {
        &self.numeric_values
    }

    /// The value of the fluent numeric variable with the given ground
    /// function index, or `None` if undefined.
    pub fn numeric_value(&self, index: u32) -> Option<f64> {
        let value = self.numeric_values.get(index as usize)?.into_inner();
        if value.is_nan() {
            None
        } else {
            Some(value)
        }
    }
}
