//! PBRT statement-language front end.
//!
//! This module turns raw scene text into an ordered stream of typed
//! [`Statement`](statement::Statement) records. It is deliberately
//! grammar-implementation-agnostic: the semantic layer in
//! [`crate::builder`] only consumes statements and never touches tokens.
//!
//! ## Handled directives
//!
//! The full statement grammar: world/attribute/transform/object blocks,
//! transform ops (`Translate`, `Rotate`, `LookAt`, `Transform`, ...),
//! material/texture/light/shape declarations and the pre-world config
//! directives (`Camera`, `Film`, `Sampler`, `Filter`, `Integrator`,
//! `Accelerator`).

mod reader;
mod statement;
mod tokenizer;

pub use reader::StatementReader;
pub use statement::{ParamSet, ParamValue, Statement, StatementKind};
pub use tokenizer::{tokenize, ParseError, ParseResult, Token};
