//! SQLite storage implementation for buckets and bucket groups.

mod model;
mod repository;

pub use model::{BucketDB, BucketGroupDB};
pub use repository::BucketRepository;
