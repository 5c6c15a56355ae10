use chrono::Local;
use log::debug;
use std::sync::Arc;

use super::recurrence::{advance_to_next_due, calculate_next_due, matches_scheduled};
use super::scheduled_model::{
    NewScheduledTransaction, ScheduledTransaction, ScheduledTransactionUpdate,
};
use super::scheduled_traits::{ScheduledRepositoryTrait, ScheduledServiceTrait};
use crate::buckets::BucketServiceTrait;
use crate::errors::{DatabaseError, Error, Result};
use crate::ledger::NewAllocation;
use crate::transactions::Transaction;

/// Service for managing scheduled transactions and auto-matching.
pub struct ScheduledService {
    repository: Arc<dyn ScheduledRepositoryTrait>,
    bucket_service: Arc<dyn BucketServiceTrait>,
}

impl ScheduledService {
    pub fn new(
        repository: Arc<dyn ScheduledRepositoryTrait>,
        bucket_service: Arc<dyn BucketServiceTrait>,
    ) -> Self {
        Self {
            repository,
            bucket_service,
        }
    }

    fn get_owned(&self, user_id: &str, scheduled_id: &str) -> Result<ScheduledTransaction> {
        let scheduled = match self.repository.get_by_id(scheduled_id) {
            Ok(scheduled) => scheduled,
            Err(Error::Database(DatabaseError::NotFound(_))) => {
                return Err(Error::NotFound(format!(
                    "Scheduled transaction {}",
                    scheduled_id
                )))
            }
            Err(e) => return Err(e),
        };
        if scheduled.user_id != user_id {
            return Err(Error::NotFound(format!(
                "Scheduled transaction {}",
                scheduled_id
            )));
        }
        Ok(scheduled)
    }
}

#[async_trait::async_trait]
impl ScheduledServiceTrait for ScheduledService {
    async fn create_scheduled(
        &self,
        user_id: &str,
        new_scheduled: NewScheduledTransaction,
    ) -> Result<ScheduledTransaction> {
        new_scheduled.validate()?;
        self.bucket_service
            .get_bucket(user_id, &new_scheduled.bucket_id)?;
        let today = Local::now().date_naive();
        let next_due = calculate_next_due(
            new_scheduled.start_date,
            new_scheduled.frequency,
            new_scheduled.interval,
            today,
        );
        self.repository.create(new_scheduled, next_due).await
    }

    async fn update_scheduled(
        &self,
        user_id: &str,
        update: ScheduledTransactionUpdate,
    ) -> Result<ScheduledTransaction> {
        update.validate()?;
        let existing = self.get_owned(user_id, &update.id)?;
        self.bucket_service.get_bucket(user_id, &update.bucket_id)?;

        // The due date is recomputed only when the recurrence itself
        // changed; otherwise an edit (rename, amount tweak) must not
        // regress an already-advanced next_due.
        let recurrence_changed = update.start_date != existing.start_date
            || update.frequency != existing.frequency
            || update.interval != existing.interval;
        let next_due = if recurrence_changed {
            calculate_next_due(
                update.start_date,
                update.frequency,
                update.interval,
                Local::now().date_naive(),
            )
        } else {
            existing.next_due
        };
        self.repository.update(update, next_due).await
    }

    async fn set_enabled(&self, user_id: &str, scheduled_id: &str, enabled: bool) -> Result<()> {
        let scheduled = self.get_owned(user_id, scheduled_id)?;
        self.repository.set_enabled(scheduled.id, enabled).await
    }

    async fn delete_scheduled(&self, user_id: &str, scheduled_id: &str) -> Result<()> {
        let scheduled = self.get_owned(user_id, scheduled_id)?;
        self.repository.delete(scheduled.id).await?;
        Ok(())
    }

    fn get_scheduled(&self, user_id: &str, scheduled_id: &str) -> Result<ScheduledTransaction> {
        self.get_owned(user_id, scheduled_id)
    }

    fn list_scheduled(&self, user_id: &str) -> Result<Vec<ScheduledTransaction>> {
        self.repository.list_for_user(user_id)
    }

    async fn auto_match_transaction(&self, transaction: &Transaction) -> Result<Option<String>> {
        let candidates = self.repository.list_enabled_for_user(&transaction.user_id)?;

        // Smallest days_diff wins; ties go to the first candidate in the
        // repository's ascending (next_due, id) order.
        let mut best: Option<(&ScheduledTransaction, i64)> = None;
        for scheduled in &candidates {
            let outcome = matches_scheduled(
                transaction.amount,
                transaction.date,
                scheduled.amount,
                scheduled.next_due,
            );
            if !outcome.matches {
                continue;
            }
            match best {
                Some((_, best_days)) if outcome.days_diff >= best_days => {}
                _ => best = Some((scheduled, outcome.days_diff)),
            }
        }

        let Some((scheduled, days_diff)) = best else {
            return Ok(None);
        };

        debug!(
            "Transaction {} matched schedule {} ({} days off due date)",
            transaction.id, scheduled.id, days_diff
        );

        let new_next_due =
            advance_to_next_due(scheduled.next_due, scheduled.frequency, scheduled.interval);
        let allocation = NewAllocation {
            id: None,
            transaction_id: transaction.id.clone(),
            bucket_id: scheduled.bucket_id.clone(),
            amount: transaction.amount,
        };
        self.repository
            .record_match(
                transaction.id.clone(),
                scheduled.id.clone(),
                new_next_due,
                allocation,
            )
            .await?;
        Ok(Some(scheduled.id.clone()))
    }
}
