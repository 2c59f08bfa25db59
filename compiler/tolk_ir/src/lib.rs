//! Tolk IR - syntax tree types shared by the parser and the semantic core.
//!
//! - [`Span`], [`Position`] and [`LineIndex`] for source locations
//! - [`NodeKind`] and [`FieldName`], the closed sets of node kinds and
//!   named child slots
//! - [`SyntaxTree`] (immutable arena), [`TreeBuilder`] and the owned
//!   [`SyntaxNode`] cursor whose [`NodeKey`] is the cache identity
//! - [`visitor::walk`] for pre-order traversal
//! - [`ensure_sufficient_stack`] for deep recursion

mod kind;
mod span;
mod stack;
mod tree;
pub mod visitor;

pub use kind::{FieldName, NodeKind};
pub use span::{LineIndex, Position, Span};
pub use stack::ensure_sufficient_stack;
pub use tree::{Child, FileId, NodeId, NodeKey, SyntaxNode, SyntaxTree, TreeBuilder};
