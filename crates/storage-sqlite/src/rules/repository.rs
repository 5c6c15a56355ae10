use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use kitty_core::rules::{CategorizationRule, NewCategorizationRule, RuleRepositoryTrait};
use kitty_core::Result;

use super::model::CategorizationRuleDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::categorization_rules;

pub struct RuleRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl RuleRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl RuleRepositoryTrait for RuleRepository {
    async fn upsert(&self, new_rule: NewCategorizationRule) -> Result<CategorizationRule> {
        self.writer
            .exec(move |conn| {
                let mut row: CategorizationRuleDB = new_rule.into();

                // (user_id, pattern) is unique; an existing rule for the
                // pattern keeps its id and priority, only the bucket moves.
                let existing = categorization_rules::table
                    .filter(categorization_rules::user_id.eq(&row.user_id))
                    .filter(categorization_rules::pattern.eq(&row.pattern))
                    .select(CategorizationRuleDB::as_select())
                    .first::<CategorizationRuleDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?;

                match existing {
                    Some(current) => {
                        diesel::update(categorization_rules::table.find(&current.id))
                            .set(categorization_rules::bucket_id.eq(&row.bucket_id))
                            .execute(conn)
                            .map_err(StorageError::from)?;
                        row.id = current.id;
                        row.created_at = current.created_at;
                    }
                    None => {
                        row.id = uuid::Uuid::new_v4().to_string();
                        diesel::insert_into(categorization_rules::table)
                            .values(&row)
                            .execute(conn)
                            .map_err(StorageError::from)?;
                    }
                }
                Ok(row.into())
            })
            .await
    }

    async fn delete(&self, rule_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                Ok(diesel::delete(categorization_rules::table.find(rule_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    fn get_by_id(&self, rule_id: &str) -> Result<CategorizationRule> {
        let mut conn = get_connection(&self.pool)?;
        let row = categorization_rules::table
            .select(CategorizationRuleDB::as_select())
            .find(rule_id)
            .first::<CategorizationRuleDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(row.into())
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<CategorizationRule>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = categorization_rules::table
            .filter(categorization_rules::user_id.eq(user_id))
            .order((
                categorization_rules::created_at.asc(),
                categorization_rules::id.asc(),
            ))
            .select(CategorizationRuleDB::as_select())
            .load::<CategorizationRuleDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(CategorizationRule::from).collect())
    }
}
