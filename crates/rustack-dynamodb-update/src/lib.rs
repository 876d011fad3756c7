//! DynamoDB update-expression compiler for Rustack.
//!
//! Turns a declarative [`UpdateMap`](rustack_dynamodb_model::UpdateMap) into
//! the update-expression dialect of DynamoDB's `UpdateItem`: an expression
//! string plus `ExpressionAttributeNames` / `ExpressionAttributeValues`
//! placeholder tables. The pipeline is:
//!
//! 1. **Naming**: every attribute and value gets a collision-free placeholder.
//! 2. **Delta parsing**: `SET` strings like `"count + 2"` become arithmetic updates.
//! 3. **Clause assembly**: entries are rendered per action and joined.
//!
//! ```
//! use std::collections::HashMap;
//!
//! use rustack_dynamodb_model::{UpdateAction, UpdateMap};
//! use rustack_dynamodb_update::UpdateExpressionCompiler;
//!
//! let update = UpdateMap::new().with("name", "Jane").with("age", "age + 1");
//! let compiled = UpdateExpressionCompiler::default()
//!     .compile(&update, &UpdateAction::Set, &HashMap::new(), &HashMap::new())
//!     .unwrap();
//! assert_eq!(compiled.expression, "SET #name = :Jane, #age = #age + :1");
//! ```
#![allow(clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod compiler;
pub mod config;
pub mod delta;
pub mod error;
pub mod placeholder;
pub mod request;

pub use compiler::{CompiledUpdate, UpdateExpressionCompiler, get_update_expression};
pub use config::{DeltaDetection, UpdateExpressionConfig};
pub use error::{UpdateExpressionError, UpdateExpressionResult};
pub use placeholder::PlaceholderNamer;
