use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use kitty_core::rules::{CategorizationRule, NewCategorizationRule};

use crate::schema::categorization_rules;

#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Serialize, Deserialize, Debug,
    Clone,
)]
#[diesel(table_name = categorization_rules)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CategorizationRuleDB {
    pub id: String,
    pub user_id: String,
    pub pattern: String,
    pub bucket_id: String,
    pub created_at: NaiveDateTime,
}

impl From<CategorizationRuleDB> for CategorizationRule {
    fn from(db: CategorizationRuleDB) -> Self {
        CategorizationRule {
            id: db.id,
            user_id: db.user_id,
            pattern: db.pattern,
            bucket_id: db.bucket_id,
            created_at: db.created_at,
        }
    }
}

impl From<NewCategorizationRule> for CategorizationRuleDB {
    fn from(new_rule: NewCategorizationRule) -> Self {
        let pattern = new_rule.normalized_pattern();
        CategorizationRuleDB {
            id: String::new(),
            user_id: new_rule.user_id,
            pattern,
            bucket_id: new_rule.bucket_id,
            created_at: Utc::now().naive_utc(),
        }
    }
}
