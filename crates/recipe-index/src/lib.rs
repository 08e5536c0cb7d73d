//! Recipe index — recipe data model and vector similarity search plumbing.
//!
//! The crate owns everything that sits between a tool invocation and the
//! hosted vector index: the [`Recipe`] record, structured metadata
//! [`Filter`]s, the [`VectorIndex`] collaborator contract with its Upstash
//! REST and in-memory implementations, and [`RecipeStore`], which turns
//! search options into index queries.

pub mod error;
pub mod filter;
pub mod index;
pub mod recipe;
pub mod store;

pub use error::{FilterError, IndexError, IndexResult};
pub use filter::{Condition, FieldPath, Filter, FilterGroup};
pub use index::memory::InMemoryIndex;
pub use index::upstash::{UpstashConfig, UpstashIndex};
pub use index::{FetchedItem, QueryMatch, QueryRequest, UpsertItem, VectorIndex};
pub use recipe::{Nutrition, Recipe};
pub use store::{RecipeStore, SearchOptions, DEFAULT_NAMESPACE, UPSERT_BATCH_SIZE};
