use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use parking_lot::Mutex;
use crate::record::RollExpression;


/// Bounded, arrival-ordered store of executed rolls.
///
/// Records are shared as `Arc`s; once the capacity is exceeded the oldest
/// record is evicted. Every operation takes the lock once, and readers only
/// copy `Arc`s while holding it.
#[derive(Debug)]
pub struct History {
    capacity: usize,
    records: Mutex<VecDeque<Arc<RollExpression>>>,
}

impl History {
    /// Creates an empty store holding at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
        }
    }

    /// Maximum number of records kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Appends a record, evicting the oldest ones beyond capacity.
    pub fn record(&self, expression: Arc<RollExpression>) {
        let mut records = self.records.lock();
        records.push_back(expression);

        while records.len() > self.capacity {
            records.pop_front();
        }
    }

    /// Up to `limit` records, most recent first. A `limit` of 0 returns everything.
    pub fn recent(&self, limit: usize) -> Vec<Arc<RollExpression>> {
        let records = self.records.lock();
        let limit = if limit == 0 { records.len() } else { limit };

        records.iter().rev().take(limit).cloned().collect()
    }

    /// Drops every record.
    pub fn clear(&self) {
        self.records.lock().clear();
    }

    /// Oldest stored record executed with `seed`.
    pub fn find_by_seed(&self, seed: &str) -> Option<Arc<RollExpression>> {
        self.records.lock()
            .iter()
            .find(|record| record.seed() == Some(seed))
            .cloned()
    }

    /// Copy of the stored records in arrival order.
    pub fn snapshot(&self) -> Vec<Arc<RollExpression>> {
        self.records.lock().iter().cloned().collect()
    }

    /// Aggregate statistics over a snapshot of the store.
    pub fn statistics(&self) -> Statistics {
        Statistics::from_records(&self.snapshot())
    }
}


/// Aggregates over the stored rolls.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Statistics {
    /// Every stored record, valid or not.
    pub count: usize,
    /// Records that parsed and were rolled.
    pub valid_count: usize,
    /// Mean total of valid records, rounded to two decimals. 0 when there are none.
    pub mean_total: f64,
    /// Most used valid expression; ties go to the one seen first.
    pub most_frequent_expression: Option<String>,
    /// Natural 20s across every d20 rolled.
    pub natural_20_count: usize,
    /// Natural 1s across every d20 rolled.
    pub natural_1_count: usize,
    /// Usage count of each valid expression.
    pub expression_counts: BTreeMap<String, usize>,
}

impl Statistics {
    /// Computes statistics from records in arrival order.
    pub fn from_records(records: &[Arc<RollExpression>]) -> Self {
        let mut stats = Statistics { count: records.len(), ..Default::default() };
        let mut sum = 0i64;
        let mut first_seen: HashMap<&str, usize> = HashMap::new();

        for (i, record) in records.iter().filter(|record| record.is_valid()).enumerate() {
            stats.valid_count += 1;
            sum += record.total();

            let (twenties, ones) = record.naturals();
            stats.natural_20_count += twenties;
            stats.natural_1_count += ones;

            first_seen.entry(record.expression()).or_insert(i);
            *stats.expression_counts.entry(record.expression().to_string()).or_default() += 1;
        }

        if stats.valid_count > 0 {
            stats.mean_total = (sum as f64 / stats.valid_count as f64 * 100.0).round() / 100.0;
        }

        stats.most_frequent_expression = stats.expression_counts.iter()
            .max_by(|(a, a_count), (b, b_count)| {
                a_count.cmp(b_count).then_with(|| first_seen[b.as_str()].cmp(&first_seen[a.as_str()]))
            })
            .map(|(expression, _)| expression.clone());

        stats
    }
}
