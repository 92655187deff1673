//! Domain types for qualdiff.
//! Defines the core data structures and business objects used throughout the crate.

pub mod comparison;
pub mod error;
pub mod issue;

pub use comparison::*;
pub use error::*;
pub use issue::*;
