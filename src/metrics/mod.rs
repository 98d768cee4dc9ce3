use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::AppResult;
use crate::gateway::{DataGateway, RecordedMovement};
use crate::models::{Movement, MovementKind, NewMovement, NewProduct, Product};

/// Entries kept when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 5_000;

/// One timed gateway call.
#[derive(Debug, Clone, Serialize)]
pub struct MetricEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: String, // "list_products" | "record_movement:salidas" | ...
    pub backend: String,   // "http" | "memory"
    pub duration_ns: u64,
    pub item_count: usize,
    pub success: bool,
    pub notes: Option<String>,
}

impl MetricEntry {
    pub fn new(
        operation: impl Into<String>,
        backend: impl Into<String>,
        duration_ns: u64,
        item_count: usize,
        success: bool,
        notes: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: operation.into(),
            backend: backend.into(),
            duration_ns,
            item_count,
            success,
            notes,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ns as f64 / 1_000_000.0
    }
}

/// The most recent gateway calls, oldest first. Once `capacity` entries are
/// held, each new entry evicts the oldest one.
#[derive(Debug)]
pub struct MetricsStore {
    entries: VecDeque<MetricEntry>,
    capacity: usize,
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl MetricsStore {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> impl Iterator<Item = &MetricEntry> {
        self.entries.iter()
    }

    pub fn record(&mut self, entry: MetricEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Health of each (operation, backend) pair over the retained window.
    pub fn aggregated(&self) -> Vec<OperationStats> {
        let mut map: BTreeMap<(&str, &str), OperationStats> = BTreeMap::new();

        for e in &self.entries {
            let stats = map
                .entry((e.operation.as_str(), e.backend.as_str()))
                .or_insert_with(|| OperationStats::empty(&e.operation, &e.backend));
            stats.calls += 1;
            if !e.success {
                stats.failures += 1;
                stats.last_error = e.notes.clone();
            }
            stats.total_ms += e.duration_ms();
            stats.max_ms = stats.max_ms.max(e.duration_ms());
            stats.last_call = Some(e.timestamp);
        }

        map.into_values()
            .map(|mut stats| {
                stats.failure_rate = stats.failures as f64 / stats.calls as f64;
                stats.avg_ms = stats.total_ms / stats.calls as f64;
                stats
            })
            .collect()
    }

    /// Export the retained entries as a CSV string.
    pub fn to_csv(&self) -> anyhow::Result<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record([
            "timestamp",
            "operation",
            "backend",
            "duration_ms",
            "item_count",
            "success",
            "notes",
        ])?;

        for e in self.entries() {
            wtr.write_record([
                e.timestamp.to_rfc3339(),
                e.operation.clone(),
                e.backend.clone(),
                format!("{:.3}", e.duration_ms()),
                e.item_count.to_string(),
                e.success.to_string(),
                e.notes.clone().unwrap_or_default(),
            ])?;
        }

        let data = wtr.into_inner()?;
        Ok(String::from_utf8(data)?)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationStats {
    pub operation: String,
    pub backend: String,
    pub calls: usize,
    pub failures: usize,
    pub failure_rate: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
    pub last_call: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    #[serde(skip)]
    total_ms: f64,
}

impl OperationStats {
    fn empty(operation: &str, backend: &str) -> Self {
        Self {
            operation: operation.to_string(),
            backend: backend.to_string(),
            calls: 0,
            failures: 0,
            failure_rate: 0.0,
            avg_ms: 0.0,
            max_ms: 0.0,
            last_call: None,
            last_error: None,
            total_ms: 0.0,
        }
    }
}

// ── Instrumented gateway ──────────────────────────────────────────────────────

/// Decorator that times every call of the wrapped gateway into a
/// [`MetricsStore`].
pub struct InstrumentedGateway {
    inner: Arc<dyn DataGateway>,
    metrics: Arc<RwLock<MetricsStore>>,
}

impl InstrumentedGateway {
    pub fn new(inner: Arc<dyn DataGateway>, metrics: Arc<RwLock<MetricsStore>>) -> Self {
        Self { inner, metrics }
    }

    async fn timed<T, F>(&self, operation: String, count: fn(&T) -> usize, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>> + Send,
        T: Send,
    {
        let start = Instant::now();
        let result = call.await;
        let elapsed = start.elapsed().as_nanos() as u64;

        let entry = match &result {
            Ok(value) => MetricEntry::new(operation, self.inner.backend(), elapsed, count(value), true, None),
            Err(e) => MetricEntry::new(
                operation,
                self.inner.backend(),
                elapsed,
                0,
                false,
                Some(e.to_string()),
            ),
        };
        self.metrics.write().await.record(entry);
        result
    }
}

fn one<T>(_: &T) -> usize {
    1
}

#[allow(clippy::ptr_arg)]
fn len<T>(items: &Vec<T>) -> usize {
    items.len()
}

#[async_trait]
impl DataGateway for InstrumentedGateway {
    fn backend(&self) -> &'static str {
        self.inner.backend()
    }

    async fn list_products(&self) -> AppResult<Vec<Product>> {
        self.timed("list_products".into(), len, self.inner.list_products())
            .await
    }

    async fn create_product(&self, product: &NewProduct) -> AppResult<Product> {
        self.timed("create_product".into(), one, self.inner.create_product(product))
            .await
    }

    async fn update_product(&self, product: &Product) -> AppResult<Product> {
        self.timed("update_product".into(), one, self.inner.update_product(product))
            .await
    }

    async fn delete_product(&self, id: i64) -> AppResult<()> {
        self.timed("delete_product".into(), one, self.inner.delete_product(id))
            .await
    }

    async fn list_movements(&self, kind: MovementKind) -> AppResult<Vec<Movement>> {
        self.timed(format!("list_movements:{}", kind), len, self.inner.list_movements(kind))
            .await
    }

    async fn create_movement(&self, kind: MovementKind, movement: &NewMovement) -> AppResult<Movement> {
        self.timed(
            format!("create_movement:{}", kind),
            one,
            self.inner.create_movement(kind, movement),
        )
        .await
    }

    async fn record_movement(
        &self,
        kind: MovementKind,
        product: &Product,
        quantity: u32,
        at: DateTime<Utc>,
    ) -> AppResult<RecordedMovement> {
        self.timed(
            format!("record_movement:{}", kind),
            one,
            self.inner.record_movement(kind, product, quantity, at),
        )
        .await
    }
}
