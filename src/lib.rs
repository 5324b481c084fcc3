#![warn(missing_debug_implementations)]
#![deny(non_ascii_idents)]
#![deny(trivial_numeric_casts)]
#![warn(unused_qualifications)]

pub mod dl;
pub mod parsed_types;
pub mod parsers;
pub mod search;

#[cfg(test)]
mod test_utils;

pub use search::Task;
