//! Tests for the scheduled transaction service, mock-repository style.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    use crate::buckets::{
        Bucket, BucketGroup, BucketKind, BucketServiceTrait, BucketUpdate, NewBucket,
        NewBucketGroup,
    };
    use crate::errors::Result;
    use crate::ledger::NewAllocation;
    use crate::scheduled::{
        Frequency, NewScheduledTransaction, ScheduledRepositoryTrait, ScheduledService,
        ScheduledServiceTrait, ScheduledTransaction, ScheduledTransactionUpdate,
    };
    use crate::transactions::{Transaction, TransactionStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn timestamp() -> NaiveDateTime {
        date(2025, 1, 1).and_hms_opt(0, 0, 0).unwrap()
    }

    fn schedule(id: &str, amount: rust_decimal::Decimal, next_due: NaiveDate) -> ScheduledTransaction {
        ScheduledTransaction {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            bucket_id: format!("bucket-{}", id),
            name: format!("Schedule {}", id),
            amount,
            frequency: Frequency::Weekly,
            interval: 1,
            start_date: date(2024, 12, 1),
            next_due,
            is_enabled: true,
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    fn incoming(amount: rust_decimal::Decimal, on: NaiveDate) -> Transaction {
        Transaction {
            id: "tx-1".to_string(),
            user_id: "user-1".to_string(),
            account_id: Some("acc-1".to_string()),
            external_id: Some("ext-1".to_string()),
            date: on,
            merchant: Some("Power Co".to_string()),
            description: "POWER CO DIRECT DEBIT".to_string(),
            amount,
            status: TransactionStatus::Confirmed,
            is_manual: false,
            is_amended: false,
            scheduled_transaction_id: None,
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    // --- Mock repository ---

    #[derive(Default)]
    struct MockScheduledRepository {
        schedules: Mutex<Vec<ScheduledTransaction>>,
        recorded: Mutex<Vec<(String, String, NaiveDate, NewAllocation)>>,
    }

    #[async_trait]
    impl ScheduledRepositoryTrait for MockScheduledRepository {
        async fn create(
            &self,
            _new_scheduled: NewScheduledTransaction,
            _next_due: NaiveDate,
        ) -> Result<ScheduledTransaction> {
            unimplemented!()
        }

        async fn update(
            &self,
            _update: ScheduledTransactionUpdate,
            _next_due: NaiveDate,
        ) -> Result<ScheduledTransaction> {
            unimplemented!()
        }

        async fn set_enabled(&self, _scheduled_id: String, _enabled: bool) -> Result<()> {
            unimplemented!()
        }

        async fn delete(&self, _scheduled_id: String) -> Result<usize> {
            unimplemented!()
        }

        fn get_by_id(&self, _scheduled_id: &str) -> Result<ScheduledTransaction> {
            unimplemented!()
        }

        fn list_for_user(&self, _user_id: &str) -> Result<Vec<ScheduledTransaction>> {
            Ok(self.schedules.lock().unwrap().clone())
        }

        fn list_enabled_for_user(&self, _user_id: &str) -> Result<Vec<ScheduledTransaction>> {
            let mut all: Vec<_> = self
                .schedules
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.is_enabled)
                .cloned()
                .collect();
            all.sort_by(|a, b| (a.next_due, a.id.clone()).cmp(&(b.next_due, b.id.clone())));
            Ok(all)
        }

        async fn record_match(
            &self,
            transaction_id: String,
            scheduled_id: String,
            new_next_due: NaiveDate,
            allocation: NewAllocation,
        ) -> Result<()> {
            self.recorded.lock().unwrap().push((
                transaction_id,
                scheduled_id,
                new_next_due,
                allocation,
            ));
            Ok(())
        }
    }

    // --- Mock bucket service (unused by auto-match) ---

    struct MockBucketService;

    #[async_trait]
    impl BucketServiceTrait for MockBucketService {
        async fn create_bucket(&self, _user_id: &str, _new_bucket: NewBucket) -> Result<Bucket> {
            unimplemented!()
        }
        async fn update_bucket(&self, _user_id: &str, _update: BucketUpdate) -> Result<Bucket> {
            unimplemented!()
        }
        async fn move_bucket(
            &self,
            _user_id: &str,
            _bucket_id: &str,
            _group_id: &str,
        ) -> Result<Bucket> {
            unimplemented!()
        }
        async fn delete_bucket(&self, _user_id: &str, _bucket_id: &str) -> Result<()> {
            unimplemented!()
        }
        fn get_bucket(&self, _user_id: &str, bucket_id: &str) -> Result<Bucket> {
            Ok(Bucket {
                id: bucket_id.to_string(),
                group_id: "group-1".to_string(),
                name: "Bucket".to_string(),
                kind: BucketKind::Spending,
                color: "#333333".to_string(),
                auto_allocate_amount: None,
                rollover: true,
                rollover_target_id: None,
                sort_order: 0,
                is_archived: false,
                created_at: timestamp(),
                updated_at: timestamp(),
            })
        }
        fn list_buckets(&self, _user_id: &str, _include_archived: bool) -> Result<Vec<Bucket>> {
            unimplemented!()
        }
        async fn create_group(&self, _new_group: NewBucketGroup) -> Result<BucketGroup> {
            unimplemented!()
        }
        async fn rename_group(
            &self,
            _user_id: &str,
            _group_id: &str,
            _name: String,
        ) -> Result<BucketGroup> {
            unimplemented!()
        }
        async fn delete_group(&self, _user_id: &str, _group_id: &str) -> Result<()> {
            unimplemented!()
        }
        fn list_groups(&self, _user_id: &str) -> Result<Vec<BucketGroup>> {
            unimplemented!()
        }
        async fn reorder_groups(&self, _user_id: &str, _ordered_ids: Vec<String>) -> Result<()> {
            unimplemented!()
        }
    }

    fn service(repo: Arc<MockScheduledRepository>) -> ScheduledService {
        ScheduledService::new(repo, Arc::new(MockBucketService))
    }

    #[tokio::test]
    async fn test_auto_match_picks_smallest_days_diff() {
        let repo = Arc::new(MockScheduledRepository::default());
        repo.schedules.lock().unwrap().extend([
            schedule("a", dec!(-100), date(2025, 1, 5)),
            schedule("b", dec!(-100), date(2025, 1, 9)),
        ]);
        let tx = incoming(dec!(-100), date(2025, 1, 9));

        let matched = service(repo.clone()).auto_match_transaction(&tx).await.unwrap();
        assert_eq!(matched.as_deref(), Some("b"));

        let recorded = repo.recorded.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        let (tx_id, sched_id, new_due, allocation) = &recorded[0];
        assert_eq!(tx_id, "tx-1");
        assert_eq!(sched_id, "b");
        // Weekly schedule advanced one step.
        assert_eq!(*new_due, date(2025, 1, 16));
        // Full transaction amount allocated to the schedule's bucket.
        assert_eq!(allocation.amount, dec!(-100));
        assert_eq!(allocation.bucket_id, "bucket-b");
    }

    #[tokio::test]
    async fn test_auto_match_ties_go_to_first_in_next_due_order() {
        let repo = Arc::new(MockScheduledRepository::default());
        // Both 2 days from the transaction date; "a" has the earlier next_due.
        repo.schedules.lock().unwrap().extend([
            schedule("b", dec!(-100), date(2025, 1, 11)),
            schedule("a", dec!(-100), date(2025, 1, 7)),
        ]);
        let tx = incoming(dec!(-100), date(2025, 1, 9));

        let matched = service(repo).auto_match_transaction(&tx).await.unwrap();
        assert_eq!(matched.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_auto_match_without_candidates_has_no_side_effects() {
        let repo = Arc::new(MockScheduledRepository::default());
        repo.schedules
            .lock()
            .unwrap()
            .push(schedule("a", dec!(-500), date(2025, 1, 9)));
        // Amount way outside the 20% tolerance.
        let tx = incoming(dec!(-100), date(2025, 1, 9));

        let matched = service(repo.clone()).auto_match_transaction(&tx).await.unwrap();
        assert!(matched.is_none());
        assert!(repo.recorded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_auto_match_skips_disabled_schedules() {
        let repo = Arc::new(MockScheduledRepository::default());
        let mut disabled = schedule("a", dec!(-100), date(2025, 1, 9));
        disabled.is_enabled = false;
        repo.schedules.lock().unwrap().push(disabled);
        let tx = incoming(dec!(-100), date(2025, 1, 9));

        let matched = service(repo).auto_match_transaction(&tx).await.unwrap();
        assert!(matched.is_none());
    }
}
