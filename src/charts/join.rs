use indexmap::{IndexMap, IndexSet};

/// Result of matching a new key list against the keys already on screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JoinPlan {
    /// Keys present before and after, in new order.
    pub update: Vec<String>,
    /// New keys, in new order.
    pub enter: Vec<String>,
    /// Keys no longer present, in old order.
    pub exit: Vec<String>,
    /// Repeated keys in the new list; always entered as fresh unkeyed items.
    pub duplicates: Vec<usize>,
}

/// Keyed association between data items and the scene parts drawn for them.
///
/// Keys are entity identifiers (city, station code). Repeated keys in an input
/// list cannot be matched stably, so they are reported as duplicates and the
/// caller redraws them from scratch on every pass.
#[derive(Debug, Clone)]
pub struct DataJoin<V> {
    entries: IndexMap<String, V>,
}

impl<V> Default for DataJoin<V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<V> DataJoin<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn plan<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> JoinPlan {
        let mut seen = IndexSet::new();
        let mut plan = JoinPlan::default();
        for (index, key) in keys.into_iter().enumerate() {
            if !seen.insert(key) {
                plan.duplicates.push(index);
                continue;
            }
            if self.entries.contains_key(key) {
                plan.update.push(key.to_owned());
            } else {
                plan.enter.push(key.to_owned());
            }
        }
        plan.exit = self
            .entries
            .keys()
            .filter(|key| !seen.contains(key.as_str()))
            .cloned()
            .collect();
        plan
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        self.entries.insert(key.into(), value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Reorders entries to match `keys`; unknown keys are ignored.
    pub fn reorder<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) {
        let mut reordered = IndexMap::with_capacity(self.entries.len());
        for key in keys {
            if let Some((key, value)) = self.entries.shift_remove_entry(key) {
                reordered.insert(key, value);
            }
        }
        reordered.extend(self.entries.drain(..));
        self.entries = reordered;
    }
}
