//! Bucket repository and service traits.

use async_trait::async_trait;

use super::buckets_model::{Bucket, BucketGroup, BucketUpdate, NewBucket, NewBucketGroup};
use crate::errors::Result;

/// Trait defining the contract for bucket and bucket-group persistence.
#[async_trait]
pub trait BucketRepositoryTrait: Send + Sync {
    /// Creates a bucket inside an existing group.
    async fn create(&self, new_bucket: NewBucket) -> Result<Bucket>;

    /// Updates a bucket's editable fields.
    async fn update(&self, update: BucketUpdate) -> Result<Bucket>;

    /// Moves a bucket to another group.
    async fn move_to_group(&self, bucket_id: String, group_id: String) -> Result<Bucket>;

    /// Marks a bucket archived, hiding it while keeping its history.
    async fn archive(&self, bucket_id: String) -> Result<()>;

    /// Hard-deletes a bucket. Only valid when it has no ledger history.
    async fn delete(&self, bucket_id: String) -> Result<usize>;

    /// Retrieves a bucket by its ID.
    fn get_by_id(&self, bucket_id: &str) -> Result<Bucket>;

    /// Lists a user's buckets across all groups, ordered by group then
    /// bucket sort order. Excludes archived buckets unless asked.
    fn list_for_user(&self, user_id: &str, include_archived: bool) -> Result<Vec<Bucket>>;

    /// Whether any allocation or budget-allocation rows reference the bucket.
    fn has_ledger_history(&self, bucket_id: &str) -> Result<bool>;

    /// Creates a bucket group.
    async fn create_group(&self, new_group: NewBucketGroup) -> Result<BucketGroup>;

    /// Renames a group.
    async fn rename_group(&self, group_id: String, name: String) -> Result<BucketGroup>;

    /// Deletes a group. The service guarantees it holds no active buckets.
    async fn delete_group(&self, group_id: String) -> Result<usize>;

    /// Retrieves a group by its ID.
    fn get_group_by_id(&self, group_id: &str) -> Result<BucketGroup>;

    /// Lists a user's groups in sort order.
    fn list_groups_for_user(&self, user_id: &str) -> Result<Vec<BucketGroup>>;

    /// Applies a new ordering to a user's groups, atomically.
    async fn reorder_groups(&self, user_id: String, ordered_ids: Vec<String>) -> Result<()>;

    /// Counts the active (non-archived) buckets in a group.
    fn count_active_in_group(&self, group_id: &str) -> Result<i64>;
}

/// Trait defining the contract for bucket service operations.
#[async_trait]
pub trait BucketServiceTrait: Send + Sync {
    async fn create_bucket(&self, user_id: &str, new_bucket: NewBucket) -> Result<Bucket>;

    async fn update_bucket(&self, user_id: &str, update: BucketUpdate) -> Result<Bucket>;

    /// Moves a bucket into another of the user's groups. A move target
    /// owned by a different user is rejected as Forbidden; this is the one
    /// ownership check that distinguishes Forbidden from NotFound.
    async fn move_bucket(&self, user_id: &str, bucket_id: &str, group_id: &str) -> Result<Bucket>;

    /// Deletes a bucket: soft-delete (archive) when it has ledger history,
    /// hard delete otherwise.
    async fn delete_bucket(&self, user_id: &str, bucket_id: &str) -> Result<()>;

    fn get_bucket(&self, user_id: &str, bucket_id: &str) -> Result<Bucket>;

    fn list_buckets(&self, user_id: &str, include_archived: bool) -> Result<Vec<Bucket>>;

    async fn create_group(&self, new_group: NewBucketGroup) -> Result<BucketGroup>;

    async fn rename_group(&self, user_id: &str, group_id: &str, name: String)
        -> Result<BucketGroup>;

    /// Deletes a group, refusing while it still holds active buckets.
    async fn delete_group(&self, user_id: &str, group_id: &str) -> Result<()>;

    fn list_groups(&self, user_id: &str) -> Result<Vec<BucketGroup>>;

    async fn reorder_groups(&self, user_id: &str, ordered_ids: Vec<String>) -> Result<()>;
}
