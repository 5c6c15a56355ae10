use log::debug;
use std::sync::Arc;

use super::buckets_model::{Bucket, BucketGroup, BucketUpdate, NewBucket, NewBucketGroup};
use super::buckets_traits::{BucketRepositoryTrait, BucketServiceTrait};
use crate::errors::{DatabaseError, Error, Result, ValidationError};

/// Service for managing buckets and their groups.
pub struct BucketService {
    repository: Arc<dyn BucketRepositoryTrait>,
}

impl BucketService {
    pub fn new(repository: Arc<dyn BucketRepositoryTrait>) -> Self {
        Self { repository }
    }

    /// Loads a bucket and resolves its ownership chain
    /// (bucket -> group -> user) against the caller.
    pub(crate) fn get_owned(&self, user_id: &str, bucket_id: &str) -> Result<Bucket> {
        let bucket = match self.repository.get_by_id(bucket_id) {
            Ok(bucket) => bucket,
            Err(Error::Database(DatabaseError::NotFound(_))) => {
                return Err(Error::NotFound(format!("Bucket {}", bucket_id)))
            }
            Err(e) => return Err(e),
        };
        let group = self.repository.get_group_by_id(&bucket.group_id)?;
        if group.user_id != user_id {
            return Err(Error::NotFound(format!("Bucket {}", bucket_id)));
        }
        Ok(bucket)
    }

    fn get_owned_group(&self, user_id: &str, group_id: &str) -> Result<BucketGroup> {
        let group = match self.repository.get_group_by_id(group_id) {
            Ok(group) => group,
            Err(Error::Database(DatabaseError::NotFound(_))) => {
                return Err(Error::NotFound(format!("Bucket group {}", group_id)))
            }
            Err(e) => return Err(e),
        };
        if group.user_id != user_id {
            return Err(Error::NotFound(format!("Bucket group {}", group_id)));
        }
        Ok(group)
    }
}

#[async_trait::async_trait]
impl BucketServiceTrait for BucketService {
    async fn create_bucket(&self, user_id: &str, new_bucket: NewBucket) -> Result<Bucket> {
        new_bucket.validate()?;
        self.get_owned_group(user_id, &new_bucket.group_id)?;
        self.repository.create(new_bucket).await
    }

    async fn update_bucket(&self, user_id: &str, update: BucketUpdate) -> Result<Bucket> {
        update.validate()?;
        self.get_owned(user_id, &update.id)?;
        if let Some(ref target_id) = update.rollover_target_id {
            // Rollover targets stay within the same user's buckets.
            self.get_owned(user_id, target_id)?;
        }
        self.repository.update(update).await
    }

    async fn move_bucket(&self, user_id: &str, bucket_id: &str, group_id: &str) -> Result<Bucket> {
        let bucket = self.get_owned(user_id, bucket_id)?;
        let target = match self.repository.get_group_by_id(group_id) {
            Ok(group) => group,
            Err(Error::Database(DatabaseError::NotFound(_))) => {
                return Err(Error::NotFound(format!("Bucket group {}", group_id)))
            }
            Err(e) => return Err(e),
        };
        if target.user_id != user_id {
            return Err(Error::Forbidden(
                "Target group belongs to another user".to_string(),
            ));
        }
        self.repository.move_to_group(bucket.id, target.id).await
    }

    async fn delete_bucket(&self, user_id: &str, bucket_id: &str) -> Result<()> {
        let bucket = self.get_owned(user_id, bucket_id)?;
        if self.repository.has_ledger_history(&bucket.id)? {
            debug!("Bucket {} has history; archiving instead", bucket.id);
            self.repository.archive(bucket.id).await
        } else {
            self.repository.delete(bucket.id).await?;
            Ok(())
        }
    }

    fn get_bucket(&self, user_id: &str, bucket_id: &str) -> Result<Bucket> {
        self.get_owned(user_id, bucket_id)
    }

    fn list_buckets(&self, user_id: &str, include_archived: bool) -> Result<Vec<Bucket>> {
        self.repository.list_for_user(user_id, include_archived)
    }

    async fn create_group(&self, new_group: NewBucketGroup) -> Result<BucketGroup> {
        new_group.validate()?;
        self.repository.create_group(new_group).await
    }

    async fn rename_group(
        &self,
        user_id: &str,
        group_id: &str,
        name: String,
    ) -> Result<BucketGroup> {
        if name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Group name cannot be empty".to_string(),
            )));
        }
        let group = self.get_owned_group(user_id, group_id)?;
        self.repository.rename_group(group.id, name).await
    }

    async fn delete_group(&self, user_id: &str, group_id: &str) -> Result<()> {
        let group = self.get_owned_group(user_id, group_id)?;
        let active = self.repository.count_active_in_group(&group.id)?;
        if active > 0 {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Group still contains {} active bucket(s)",
                active
            ))));
        }
        self.repository.delete_group(group.id).await?;
        Ok(())
    }

    fn list_groups(&self, user_id: &str) -> Result<Vec<BucketGroup>> {
        self.repository.list_groups_for_user(user_id)
    }

    async fn reorder_groups(&self, user_id: &str, ordered_ids: Vec<String>) -> Result<()> {
        for group_id in &ordered_ids {
            self.get_owned_group(user_id, group_id)?;
        }
        self.repository
            .reorder_groups(user_id.to_string(), ordered_ids)
            .await
    }
}
