use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use kitty_core::buckets::{Bucket, BucketGroup, BucketKind, NewBucket, NewBucketGroup};

use crate::schema::{bucket_groups, buckets};
use crate::utils::parse_stored_decimal;

#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Serialize, Deserialize, Debug,
    Clone,
)]
#[diesel(table_name = buckets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BucketDB {
    pub id: String,
    pub group_id: String,
    pub name: String,
    pub kind: String,
    pub color: String,
    pub auto_allocate_amount: Option<String>,
    pub rollover: bool,
    pub rollover_target_id: Option<String>,
    pub sort_order: i32,
    pub is_archived: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<BucketDB> for Bucket {
    fn from(db: BucketDB) -> Self {
        Bucket {
            id: db.id,
            group_id: db.group_id,
            name: db.name,
            kind: BucketKind::from_str(&db.kind),
            color: db.color,
            auto_allocate_amount: db
                .auto_allocate_amount
                .as_deref()
                .map(|s| parse_stored_decimal(s, "auto_allocate_amount")),
            rollover: db.rollover,
            rollover_target_id: db.rollover_target_id,
            sort_order: db.sort_order,
            is_archived: db.is_archived,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewBucket> for BucketDB {
    fn from(new_bucket: NewBucket) -> Self {
        let now = Utc::now().naive_utc();
        BucketDB {
            id: new_bucket.id.unwrap_or_default(),
            group_id: new_bucket.group_id,
            name: new_bucket.name,
            kind: new_bucket.kind.as_str().to_string(),
            color: new_bucket.color,
            auto_allocate_amount: new_bucket.auto_allocate_amount.map(|d| d.to_string()),
            rollover: new_bucket.rollover,
            rollover_target_id: new_bucket.rollover_target_id,
            sort_order: new_bucket.sort_order,
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Serialize, Deserialize, Debug,
    Clone,
)]
#[diesel(table_name = bucket_groups)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BucketGroupDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub sort_order: i32,
    pub created_at: NaiveDateTime,
}

impl From<BucketGroupDB> for BucketGroup {
    fn from(db: BucketGroupDB) -> Self {
        BucketGroup {
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            sort_order: db.sort_order,
            created_at: db.created_at,
        }
    }
}

impl From<NewBucketGroup> for BucketGroupDB {
    fn from(new_group: NewBucketGroup) -> Self {
        BucketGroupDB {
            id: new_group.id.unwrap_or_default(),
            user_id: new_group.user_id,
            name: new_group.name,
            sort_order: new_group.sort_order,
            created_at: Utc::now().naive_utc(),
        }
    }
}
