// ============================================================================
// ACCOUNT LOOKUP - Mock social-media account search with simulated latency
// ============================================================================
// Stands in for a server-side lookup against the real platform API. Only the
// accounts in the table exist; only business/creator accounts are returned.
// ============================================================================

use std::collections::HashMap;
use std::time::Duration;

use futures::future::{FutureExt, LocalBoxFuture};

use crate::models::{AccountRecord, Coordinates};
use crate::utils::constants::DEFAULT_LOOKUP_LATENCY_MS;
use crate::utils::timer::sleep;

pub trait AccountLookup {
    /// Eligible account for `handle`, or None when not found / not eligible
    fn lookup(&self, handle: &str) -> LocalBoxFuture<'_, Option<AccountRecord>>;
}

pub struct MockAccountLookup {
    table: HashMap<String, AccountRecord>,
    latency: Duration,
}

impl MockAccountLookup {
    /// Built-in table with the given latency
    pub fn new(latency: Duration) -> Self {
        Self::with_records(default_records(), latency)
    }

    pub fn with_records(records: Vec<AccountRecord>, latency: Duration) -> Self {
        let table = records
            .into_iter()
            .map(|record| (record.username.clone(), record))
            .collect();
        Self { table, latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// The lookup without the delay
    pub fn find(&self, handle: &str) -> Option<AccountRecord> {
        self.table
            .get(handle)
            .filter(|record| record.is_business)
            .cloned()
    }
}

impl Default for MockAccountLookup {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_LOOKUP_LATENCY_MS))
    }
}

impl AccountLookup for MockAccountLookup {
    fn lookup(&self, handle: &str) -> LocalBoxFuture<'_, Option<AccountRecord>> {
        let handle = handle.to_string();
        async move {
            sleep(self.latency).await;
            let found = self.find(&handle);
            match &found {
                Some(record) => log::debug!("🔍 [AccountLookup] @{} -> {}", handle, record.name),
                None => log::debug!("🔍 [AccountLookup] @{} not found", handle),
            }
            found
        }
        .boxed_local()
    }
}

fn account(username: &str, name: &str, lat: f64, lng: f64) -> AccountRecord {
    AccountRecord {
        username: username.to_string(),
        name: name.to_string(),
        is_business: true,
        location: Some(Coordinates::new(lat, lng)),
    }
}

fn default_records() -> Vec<AccountRecord> {
    vec![
        account("test_a", "Test Account A", 40.502816475580396, -74.45207104430426),
        account("test_b", "Test Account B", 40.52340518764876, -74.45830437357046),
        account("test_c", "Test Account C", 40.52361408326971, -74.43720414347104),
        account("rutgersblueprint", "Rutgers Blueprint", 40.50502571797236, -74.4524553673336),
    ]
}
