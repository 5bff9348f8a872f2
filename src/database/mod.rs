//! Durable store plumbing: pool creation, migrations, administrative ops.

pub mod pool;

pub use pool::{create_pool, run_migrations, Database, DatabaseError};
