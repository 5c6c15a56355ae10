use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::{exists, select};
use diesel::prelude::*;
use std::sync::Arc;

use kitty_core::buckets::{
    Bucket, BucketGroup, BucketRepositoryTrait, BucketUpdate, NewBucket, NewBucketGroup,
};
use kitty_core::Result;

use super::model::{BucketDB, BucketGroupDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{allocations, bucket_groups, buckets, budget_allocations};

pub struct BucketRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl BucketRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl BucketRepositoryTrait for BucketRepository {
    async fn create(&self, new_bucket: NewBucket) -> Result<Bucket> {
        self.writer
            .exec(move |conn| {
                let mut row: BucketDB = new_bucket.into();
                if row.id.is_empty() {
                    row.id = uuid::Uuid::new_v4().to_string();
                }
                diesel::insert_into(buckets::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }

    async fn update(&self, update: BucketUpdate) -> Result<Bucket> {
        self.writer
            .exec(move |conn| {
                diesel::update(buckets::table.find(&update.id))
                    .set((
                        buckets::name.eq(&update.name),
                        buckets::kind.eq(update.kind.as_str()),
                        buckets::color.eq(&update.color),
                        buckets::auto_allocate_amount
                            .eq(update.auto_allocate_amount.map(|d| d.to_string())),
                        buckets::rollover.eq(update.rollover),
                        buckets::rollover_target_id.eq(&update.rollover_target_id),
                        buckets::sort_order.eq(update.sort_order),
                        buckets::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let row = buckets::table
                    .select(BucketDB::as_select())
                    .find(&update.id)
                    .first::<BucketDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }

    async fn move_to_group(&self, bucket_id: String, group_id: String) -> Result<Bucket> {
        self.writer
            .exec(move |conn| {
                diesel::update(buckets::table.find(&bucket_id))
                    .set((
                        buckets::group_id.eq(&group_id),
                        buckets::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let row = buckets::table
                    .select(BucketDB::as_select())
                    .find(&bucket_id)
                    .first::<BucketDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }

    async fn archive(&self, bucket_id: String) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::update(buckets::table.find(&bucket_id))
                    .set((
                        buckets::is_archived.eq(true),
                        buckets::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn delete(&self, bucket_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                Ok(diesel::delete(buckets::table.find(bucket_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    fn get_by_id(&self, bucket_id: &str) -> Result<Bucket> {
        let mut conn = get_connection(&self.pool)?;
        let row = buckets::table
            .select(BucketDB::as_select())
            .find(bucket_id)
            .first::<BucketDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(row.into())
    }

    fn list_for_user(&self, user_id: &str, include_archived: bool) -> Result<Vec<Bucket>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = buckets::table
            .inner_join(bucket_groups::table)
            .filter(bucket_groups::user_id.eq(user_id))
            .order((
                bucket_groups::sort_order.asc(),
                buckets::sort_order.asc(),
                buckets::created_at.asc(),
            ))
            .select(BucketDB::as_select())
            .into_boxed();
        if !include_archived {
            query = query.filter(buckets::is_archived.eq(false));
        }
        let rows = query
            .load::<BucketDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Bucket::from).collect())
    }

    fn has_ledger_history(&self, bucket_id: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let in_allocations: bool = select(exists(
            allocations::table.filter(allocations::bucket_id.eq(bucket_id)),
        ))
        .get_result(&mut conn)
        .map_err(StorageError::from)?;
        if in_allocations {
            return Ok(true);
        }
        let in_budget: bool = select(exists(
            budget_allocations::table.filter(budget_allocations::bucket_id.eq(bucket_id)),
        ))
        .get_result(&mut conn)
        .map_err(StorageError::from)?;
        Ok(in_budget)
    }

    async fn create_group(&self, new_group: NewBucketGroup) -> Result<BucketGroup> {
        self.writer
            .exec(move |conn| {
                let mut row: BucketGroupDB = new_group.into();
                if row.id.is_empty() {
                    row.id = uuid::Uuid::new_v4().to_string();
                }
                diesel::insert_into(bucket_groups::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }

    async fn rename_group(&self, group_id: String, name: String) -> Result<BucketGroup> {
        self.writer
            .exec(move |conn| {
                diesel::update(bucket_groups::table.find(&group_id))
                    .set(bucket_groups::name.eq(&name))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let row = bucket_groups::table
                    .select(BucketGroupDB::as_select())
                    .find(&group_id)
                    .first::<BucketGroupDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }

    async fn delete_group(&self, group_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                Ok(diesel::delete(bucket_groups::table.find(group_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    fn get_group_by_id(&self, group_id: &str) -> Result<BucketGroup> {
        let mut conn = get_connection(&self.pool)?;
        let row = bucket_groups::table
            .select(BucketGroupDB::as_select())
            .find(group_id)
            .first::<BucketGroupDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(row.into())
    }

    fn list_groups_for_user(&self, user_id: &str) -> Result<Vec<BucketGroup>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = bucket_groups::table
            .filter(bucket_groups::user_id.eq(user_id))
            .order((bucket_groups::sort_order.asc(), bucket_groups::created_at.asc()))
            .select(BucketGroupDB::as_select())
            .load::<BucketGroupDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(BucketGroup::from).collect())
    }

    async fn reorder_groups(&self, user_id: String, ordered_ids: Vec<String>) -> Result<()> {
        self.writer
            .exec(move |conn| {
                for (position, group_id) in ordered_ids.iter().enumerate() {
                    diesel::update(
                        bucket_groups::table
                            .filter(bucket_groups::id.eq(group_id))
                            .filter(bucket_groups::user_id.eq(&user_id)),
                    )
                    .set(bucket_groups::sort_order.eq(position as i32))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                }
                Ok(())
            })
            .await
    }

    fn count_active_in_group(&self, group_id: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let count = buckets::table
            .filter(buckets::group_id.eq(group_id))
            .filter(buckets::is_archived.eq(false))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count)
    }
}
