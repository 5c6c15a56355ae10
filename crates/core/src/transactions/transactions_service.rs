use log::debug;
use std::sync::Arc;

use super::transactions_model::{NewTransaction, Transaction};
use super::transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
use crate::accounts::AccountRepositoryTrait;
use crate::errors::{DatabaseError, Error, Result, ValidationError};

/// Service for reading transactions and managing manual entries.
///
/// Sync-sourced writes (creation, promotion, amendment) go through the
/// reconciliation engine, not this service.
pub struct TransactionService {
    repository: Arc<dyn TransactionRepositoryTrait>,
    account_repository: Arc<dyn AccountRepositoryTrait>,
}

impl TransactionService {
    pub fn new(
        repository: Arc<dyn TransactionRepositoryTrait>,
        account_repository: Arc<dyn AccountRepositoryTrait>,
    ) -> Self {
        Self {
            repository,
            account_repository,
        }
    }

    /// Loads a transaction and walks the ownership chain: through the
    /// account for bank transactions, through the manual flag otherwise.
    pub(crate) fn get_owned(&self, user_id: &str, transaction_id: &str) -> Result<Transaction> {
        let transaction = match self.repository.get_by_id(transaction_id) {
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
}

#[async_trait::async_trait]
impl TransactionServiceTrait for TransactionService {
    async fn create_manual(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        new_transaction.validate()?;
        if !new_transaction.is_manual {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Only manual transactions can be entered directly".to_string(),
            )));
        }
        debug!(
            "Creating manual transaction for user {}: {} {}",
            new_transaction.user_id, new_transaction.description, new_transaction.amount
        );
        self.repository.create(new_transaction).await
    }

    fn get_transaction(&self, user_id: &str, transaction_id: &str) -> Result<Transaction> {
        self.get_owned(user_id, transaction_id)
    }

    fn list_account_transactions(
        &self,
        user_id: &str,
        account_id: &str,
        from: Option<chrono::NaiveDate>,
        to: Option<chrono::NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        let account = self.account_repository.get_by_id(account_id)?;
        if account.user_id != user_id {
            return Err(Error::NotFound(format!("Account {}", account_id)));
        }
        self.repository.list_for_account(account_id, from, to)
    }

    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        self.repository.list_for_user(user_id)
    }

    async fn delete_manual(&self, user_id: &str, transaction_id: &str) -> Result<()> {
        let transaction = self.get_owned(user_id, transaction_id)?;
        if !transaction.is_manual {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Only manual transactions can be deleted directly".to_string(),
            )));
        }
        self.repository.delete(transaction.id).await?;
        Ok(())
    }
}
