//! Ledger service - allocation splits, budget allocations, and the derived
//! balances built from them.

use chrono::Local;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use super::ledger_model::{
    Allocation, AllocationInput, BucketBalance, BudgetAllocation, BudgetAllocationUpdate,
    NewAllocation, NewBudgetAllocation,
};
use super::ledger_traits::{LedgerRepositoryTrait, LedgerServiceTrait};
use crate::budget::{bucket_balance, period_end};
use crate::buckets::BucketServiceTrait;
use crate::constants::allocation_tolerance;
use crate::errors::{DatabaseError, Error, Result};
use crate::scheduled::ScheduledRepositoryTrait;
use crate::settings::SettingsServiceTrait;
use crate::transactions::{Transaction, TransactionRepositoryTrait};

/// Service for the two ledgers and every balance derived from them.
pub struct LedgerService {
    repository: Arc<dyn LedgerRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    scheduled_repository: Arc<dyn ScheduledRepositoryTrait>,
    settings_service: Arc<dyn SettingsServiceTrait>,
    bucket_service: Arc<dyn BucketServiceTrait>,
}

impl LedgerService {
    pub fn new(
        repository: Arc<dyn LedgerRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        scheduled_repository: Arc<dyn ScheduledRepositoryTrait>,
        settings_service: Arc<dyn SettingsServiceTrait>,
        bucket_service: Arc<dyn BucketServiceTrait>,
    ) -> Self {
        Self {
            repository,
            transaction_repository,
            scheduled_repository,
            settings_service,
            bucket_service,
        }
    }

    fn get_owned_transaction(&self, user_id: &str, transaction_id: &str) -> Result<Transaction> {
        let transaction = match self.transaction_repository.get_by_id(transaction_id) {
            Ok(transaction) => transaction,
            Err(Error::Database(DatabaseError::NotFound(_))) => {
                return Err(Error::NotFound(format!("Transaction {}", transaction_id)))
            }
            Err(e) => return Err(e),
        };
        if transaction.user_id != user_id {
            return Err(Error::NotFound(format!("Transaction {}", transaction_id)));
        }
        Ok(transaction)
    }

    fn get_owned_budget_allocation(
        &self,
        user_id: &str,
        allocation_id: &str,
    ) -> Result<BudgetAllocation> {
        let allocation = match self.repository.get_budget_allocation(allocation_id) {
            Ok(allocation) => allocation,
            Err(Error::Database(DatabaseError::NotFound(_))) => {
                return Err(Error::NotFound(format!(
                    "Budget allocation {}",
                    allocation_id
                )))
            }
            Err(e) => return Err(e),
        };
        if allocation.user_id != user_id {
            return Err(Error::NotFound(format!(
                "Budget allocation {}",
                allocation_id
            )));
        }
        Ok(allocation)
    }
}

#[async_trait::async_trait]
impl LedgerServiceTrait for LedgerService {
    fn available_to_budget(&self, user_id: &str) -> Result<Decimal> {
        // Pending inflows stay out of the pool until they settle.
        let inflows: Decimal = self
            .transaction_repository
            .list_for_user(user_id)?
            .iter()
            .filter(|t| !t.is_pending() && t.is_income())
            .map(|t| t.amount)
            .sum();
        let allocated: Decimal = self
            .repository
            .list_budget_allocations_for_user(user_id)?
            .iter()
            .map(|a| a.amount)
            .sum();
        Ok(inflows - allocated)
    }

    fn bucket_balances(&self, user_id: &str) -> Result<Vec<BucketBalance>> {
        let mut by_bucket: HashMap<String, Vec<Decimal>> = HashMap::new();
        for allocation in self.repository.list_allocations_for_user(user_id)? {
            by_bucket
                .entry(allocation.bucket_id)
                .or_default()
                .push(allocation.amount);
        }
        for allocation in self.repository.list_budget_allocations_for_user(user_id)? {
            by_bucket
                .entry(allocation.bucket_id)
                .or_default()
                .push(allocation.amount);
        }

        let buckets = self.bucket_service.list_buckets(user_id, false)?;
        Ok(buckets
            .into_iter()
            .map(|bucket| {
                let amounts = by_bucket.remove(&bucket.id).unwrap_or_default();
                BucketBalance {
                    bucket_id: bucket.id,
                    balance: bucket_balance(&amounts),
                }
            })
            .collect())
    }

    fn reserved_by_bucket(&self, user_id: &str) -> Result<Vec<BucketBalance>> {
        let settings = self.settings_service.get_settings(user_id)?;
        let today = Local::now().date_naive();
        let horizon = period_end(settings.cycle_type, settings.cycle_start_day, today);

        let mut by_bucket: HashMap<String, Decimal> = HashMap::new();
        for scheduled in self.scheduled_repository.list_enabled_for_user(user_id)? {
            if scheduled.next_due > horizon {
                continue;
            }
            *by_bucket.entry(scheduled.bucket_id).or_default() += scheduled.amount.abs();
        }

        let mut reserved: Vec<BucketBalance> = by_bucket
            .into_iter()
            .map(|(bucket_id, balance)| BucketBalance { bucket_id, balance })
            .collect();
        reserved.sort_by(|a, b| a.bucket_id.cmp(&b.bucket_id));
        Ok(reserved)
    }

    fn list_allocations(&self, user_id: &str, transaction_id: &str) -> Result<Vec<Allocation>> {
        let transaction = self.get_owned_transaction(user_id, transaction_id)?;
        self.repository
            .list_allocations_for_transaction(&transaction.id)
    }

    async fn allocate_transaction(
        &self,
        user_id: &str,
        transaction_id: &str,
        inputs: Vec<AllocationInput>,
    ) -> Result<Vec<Allocation>> {
        let transaction = self.get_owned_transaction(user_id, transaction_id)?;

        // Every target bucket must be the caller's; lookup doubles as the
        // existence check.
        for input in &inputs {
            self.bucket_service.get_bucket(user_id, &input.bucket_id)?;
        }

        let total: Decimal = inputs.iter().map(|i| i.amount).sum();
        if (total - transaction.amount).abs() > allocation_tolerance() {
            return Err(Error::AllocationMismatch {
                expected: transaction.amount,
                actual: total,
            });
        }

        let new_allocations = inputs
            .into_iter()
            .map(|input| NewAllocation {
                id: None,
                transaction_id: transaction.id.clone(),
                bucket_id: input.bucket_id,
                amount: input.amount,
            })
            .collect();

        debug!("Replacing allocations for transaction {}", transaction.id);
        self.repository
            .replace_allocations(transaction.id.clone(), new_allocations)
            .await
    }

    async fn unallocate_transaction(&self, user_id: &str, transaction_id: &str) -> Result<()> {
        let transaction = self.get_owned_transaction(user_id, transaction_id)?;
        self.repository.clear_allocations(transaction.id).await?;
        Ok(())
    }

    fn list_budget_allocations(&self, user_id: &str) -> Result<Vec<BudgetAllocation>> {
        self.repository.list_budget_allocations_for_user(user_id)
    }

    async fn create_budget_allocation(
        &self,
        user_id: &str,
        new_allocation: NewBudgetAllocation,
    ) -> Result<BudgetAllocation> {
        new_allocation.validate()?;
        if new_allocation.user_id != user_id {
            return Err(Error::Forbidden(
                "Budget allocation user does not match caller".to_string(),
            ));
        }
        self.bucket_service
            .get_bucket(user_id, &new_allocation.bucket_id)?;
        self.repository.create_budget_allocation(new_allocation).await
    }

    async fn update_budget_allocation(
        &self,
        user_id: &str,
        update: BudgetAllocationUpdate,
    ) -> Result<BudgetAllocation> {
        update.validate()?;
        self.get_owned_budget_allocation(user_id, &update.id)?;
        self.repository.update_budget_allocation(update).await
    }

    async fn delete_budget_allocation(&self, user_id: &str, allocation_id: &str) -> Result<()> {
        let allocation = self.get_owned_budget_allocation(user_id, allocation_id)?;
        self.repository.delete_budget_allocation(allocation.id).await?;
        Ok(())
    }

    async fn feed_all(&self, user_id: &str) -> Result<Vec<BudgetAllocation>> {
        let buckets = self.bucket_service.list_buckets(user_id, false)?;
        let new_allocations: Vec<NewBudgetAllocation> = buckets
            .into_iter()
            .filter_map(|bucket| {
                let amount = bucket.auto_allocate_amount?;
                if amount <= Decimal::ZERO {
                    return None;
                }
                Some(NewBudgetAllocation {
                    id: None,
                    user_id: user_id.to_string(),
                    bucket_id: bucket.id,
                    amount,
                    note: Some("Auto feed".to_string()),
                })
            })
            .collect();

        if new_allocations.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            "Feeding {} buckets for user {}",
            new_allocations.len(),
            user_id
        );
        self.repository
            .create_budget_allocations(user_id.to_string(), new_allocations)
            .await
    }
}
