//! Grammar productions, split by syntactic category.
//!
//! - `item`: top-level declarations
//! - `stmt`: statements and blocks
//! - `expr`: expressions by precedence
//! - `ty`: type expressions

mod expr;
mod item;
mod stmt;
mod ty;
