//! DynamoDB model types for Rustack update expressions.
//!
//! This crate holds the wire-level types that the update-expression compiler
//! consumes and produces: the `AttributeValue` tagged union, the declarative
//! update model (`UpdateMap`, `UpdateValue`, `UpdateAction`), and the
//! request envelopes the compiled expression is merged into. All of them use
//! DynamoDB's `PascalCase` JSON naming.
// "DynamoDB" appears in virtually every doc comment in this crate.
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod attribute_value;
pub mod input;
pub mod output;
pub mod update;

pub use attribute_value::AttributeValue;
pub use input::{ReturnValue, UpdateInput, UpdateItemInput};
pub use output::UpdateOutput;
pub use update::{Delta, DeltaSign, OperandOrder, UpdateAction, UpdateMap, UpdateValue};
