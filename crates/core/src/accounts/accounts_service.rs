use log::debug;
use std::sync::Arc;

use super::accounts_model::Account;
use super::accounts_traits::{AccountRepositoryTrait, AccountServiceTrait};
use crate::errors::{DatabaseError, Error, Result};

/// Service for managing connected bank accounts.
pub struct AccountService {
    repository: Arc<dyn AccountRepositoryTrait>,
}

impl AccountService {
    /// Creates a new AccountService instance
    pub fn new(repository: Arc<dyn AccountRepositoryTrait>) -> Self {
        Self { repository }
    }

    /// Loads an account and checks it belongs to `user_id`.
    ///
    /// An account owned by another user is reported as not found.
    pub(crate) fn get_owned(&self, user_id: &str, account_id: &str) -> Result<Account> {
        let account = match self.repository.get_by_id(account_id) {
            Ok(account) => account,
            Err(Error::Database(DatabaseError::NotFound(_))) => {
                return Err(Error::NotFound(format!("Account {}", account_id)))
            }
            Err(e) => return Err(e),
        };
        if account.user_id != user_id {
            // Reported identically to a missing record so that one user
            // cannot probe for another user's account ids.
            return Err(Error::NotFound(format!("Account {}", account_id)));
        }
        Ok(account)
    }
}

#[async_trait::async_trait]
impl AccountServiceTrait for AccountService {
    fn get_account(&self, user_id: &str, account_id: &str) -> Result<Account> {
        self.get_owned(user_id, account_id)
    }

    fn list_accounts(&self, user_id: &str) -> Result<Vec<Account>> {
        self.repository.list_for_user(user_id)
    }

    async fn delete_account(&self, user_id: &str, account_id: &str) -> Result<()> {
        let account = self.get_owned(user_id, account_id)?;
        debug!("Deleting account {} and its transactions", account.id);
        self.repository.delete(account.id).await?;
        Ok(())
    }
}
