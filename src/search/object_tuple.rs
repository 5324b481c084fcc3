use smallvec::SmallVec;

/// Most predicates and functions have few arguments, so object tuples are
/// kept inline up to this arity.
pub(crate) const TYPICAL_NUM_ARGUMENTS: usize = 5;

/// A tuple of object indices, e.g. the arguments of a ground atom or the
/// binding of an action schema.
pub type ObjectTuple = SmallVec<[usize; TYPICAL_NUM_ARGUMENTS]>;

/// Builds an [`ObjectTuple`] with `vec!`-like syntax.
macro_rules! object_tuple {
    ($($x:tt)*) => {
        {
            let tuple: crate::search::ObjectTuple = smallvec::smallvec![$($x)*];
            tuple
        }
    };
}

pub(crate) use object_tuple;
