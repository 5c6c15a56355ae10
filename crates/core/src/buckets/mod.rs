//! Buckets module - envelopes and their groups.

mod buckets_model;
mod buckets_service;
mod buckets_traits;


// Re-export the public interface
pub use buckets_model::{
    rollover_amount, Bucket, BucketGroup, BucketKind, BucketUpdate, NewBucket, NewBucketGroup,
};
pub use buckets_service::BucketService;
pub use buckets_traits::{BucketRepositoryTrait, BucketServiceTrait};
