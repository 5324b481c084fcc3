use crate::parsed_types::Atom;

/// A possibly negated atomic formula, i.e. `<atom> | (not <atom>)`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Literal<T> {
    Positive(Atom<T>),
    Negative(Atom<T>),
}

impl<T> Literal<T> {
    pub const fn new(atom: Atom<T>) -> Self {
        Self::Positive(atom)
    }

    pub const fn new_not(atom: Atom<T>) -> Self {
        Self::Negative(atom)
    }

    #[inline(always)]
    pub const fn atom(&self) -> &Atom<T> {
        match self {
            Self::Positive(atom) => atom,
            Self::Negative(atom) => atom,
        }
    }

    #[inline(always)]
    pub const fn is_negated(&self) -> bool {
        matches!(self, Self::Negative(_))
    }
}
