//! Numeric-fluent constructs: function terms, function expressions, numeric
//! comparisons and assignment operators.

use crate::parsed_types::{Name, TypedList, Variable};
use std::fmt::{self, Display, Formatter};

/// A function application `(<function> t*)` over terms of type `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTerm<T> {
    symbol: Name,
    values: Vec<T>,
}

impl<T> FunctionTerm<T> {
    pub const fn new(symbol: Name, values: Vec<T>) -> Self {
        Self { symbol, values }
    }

    #[inline(always)]
    pub fn symbol(&self) -> &Name {
        &self.symbol
    }

    #[inline(always)]
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

/// A declaration in the `(:functions ...)` section. The result type is always
/// `number`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    name: Name,
    variables: TypedList<Variable>,
}

impl FunctionDeclaration {
    pub const fn new(name: Name, variables: TypedList<Variable>) -> Self {
        Self { name, variables }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn variables(&self) -> &TypedList<Variable> {
        &self.variables
    }
}

/// A binary arithmetic operator in a function expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        };
        write!(f, "{s}")
    }
}

/// A binary comparator in a numeric condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryComp {
    Less,
    LessEq,
    Equal,
    GreaterEq,
    Greater,
}

impl Display for BinaryComp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryComp::Less => "<",
            BinaryComp::LessEq => "<=",
            BinaryComp::Equal => "=",
            BinaryComp::GreaterEq => ">=",
            BinaryComp::Greater => ">",
        };
        write!(f, "{s}")
    }
}

/// An assignment operator in a numeric effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Increase,
    Decrease,
}

/// A function expression, i.e. `<number> | (<f> t*) | (<op> <fexp> <fexp>)`.
#[derive(Debug, Clone, PartialEq)]
pub enum FExp<T> {
    Number(f64),
    Function(FunctionTerm<T>),
    Binary(BinaryOp, Box<FExp<T>>, Box<FExp<T>>),
}

impl<T> FExp<T> {
    pub fn new_binary(op: BinaryOp, lhs: FExp<T>, rhs: FExp<T>) -> Self {
        Self::Binary(op, Box::new(lhs), Box::new(rhs))
    }
}
