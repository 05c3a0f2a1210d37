//! In-memory fakes for the store, cache, and catalog seams

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;

use crate::cache::Cache;
use crate::catalog::{CatalogClient, ProbeError};
use crate::store::{CommitOutcome, Store, StoreError};

/// Mutex-guarded in-memory store. `commit_order` holds the lock across the
/// check and the decrement, mirroring the atomicity of the real guarded
/// UPDATE.
pub struct MemoryStore {
    users: HashSet<i64>,
    inner: Mutex<MemoryState>,
    next_order_id: AtomicI64,
    reads_down: AtomicBool,
}

struct MemoryState {
    stock: HashMap<i64, i64>,
    orders: Vec<(i64, i64, i64)>, // (product_id, user_id, quantity)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: HashSet::new(),
            inner: Mutex::new(MemoryState { stock: HashMap::new(), orders: Vec::new() }),
            next_order_id: AtomicI64::new(1),
            reads_down: AtomicBool::new(false),
        }
    }

    pub fn with_user(mut self, user_id: i64) -> Self {
        self.users.insert(user_id);
        self
    }

    pub fn with_product(self, product_id: i64, stock: i64) -> Self {
        self.inner.lock().unwrap().stock.insert(product_id, stock);
        self
    }

    /// Simulate a store outage on the read paths
    pub fn fail_reads(&self, down: bool) {
        self.reads_down.store(down, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.reads_down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn user_exists(&self, user_id: i64) -> Result<bool, StoreError> {
        self.check_reads()?;
        Ok(self.users.contains(&user_id))
    }

    async fn stock_of(&self, product_id: i64) -> Result<Option<i64>, StoreError> {
        self.check_reads()?;
        Ok(self.inner.lock().unwrap().stock.get(&product_id).copied())
    }

    async fn commit_order(
        &self,
        product_id: i64,
        user_id: i64,
        quantity: i64,
    ) -> Result<CommitOutcome, StoreError> {
        let mut state = self.inner.lock().unwrap();
        match state.stock.get_mut(&product_id) {
            Some(stock) if *stock >= quantity => {
                *stock -= quantity;
                state.orders.push((product_id, user_id, quantity));
                let order_id = self.next_order_id.fetch_add(1, Ordering::SeqCst);
                Ok(CommitOutcome::Placed { order_id })
            }
            _ => Ok(CommitOutcome::OutOfStock),
        }
    }

    async fn purchases_by_user(&self, user_id: i64) -> Result<BTreeMap<i64, i64>, StoreError> {
        self.check_reads()?;
        let state = self.inner.lock().unwrap();
        let mut totals = BTreeMap::new();
        for (product_id, order_user, quantity) in &state.orders {
            if *order_user == user_id {
                *totals.entry(*product_id).or_insert(0) += quantity;
            }
        }
        Ok(totals)
    }
}

/// In-memory cache. TTLs are accepted and ignored; tests that need expiry
/// delete entries explicitly.
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    async fn exists(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    async fn set_with_expiry(&self, key: &str, value: &str, _ttl_secs: u64) {
        self.entries.lock().unwrap().insert(key.to_owned(), value.to_owned());
    }

    async fn delete(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

/// Catalog stub with a fixed answer
pub struct StaticCatalog(pub bool);

#[async_trait]
impl CatalogClient for StaticCatalog {
    async fn product_exists(&self, _product_id: i64) -> Result<bool, ProbeError> {
        Ok(self.0)
    }
}

/// Catalog stub that is always unreachable
pub struct FaultyCatalog;

#[async_trait]
impl CatalogClient for FaultyCatalog {
    async fn product_exists(&self, _product_id: i64) -> Result<bool, ProbeError> {
        Err(ProbeError::Transport("connection refused".into()))
    }
}
