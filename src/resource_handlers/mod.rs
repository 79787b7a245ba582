//! In-memory reference handlers for the built-in User and Group resource
//! types. They keep resources in a `RwLock`-guarded map and leave
//! filtering, sorting and pagination to the dispatcher, which is exactly
//! what auto-filtering resource types expect. Real deployments replace
//! them with handlers over their own storage.

mod in_memory;

pub use in_memory::{InMemoryGroupHandler, InMemoryUserHandler};
