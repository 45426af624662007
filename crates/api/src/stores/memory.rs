//! In-process implementation of the store contract.
//!
//! Used when no Redis URL is configured and by the test suite. Every call
//! takes one lock, so single operations and batches are atomic and isolated.
//! Expired keys are dropped lazily when next touched.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tokio::time::Instant;

use super::{Batch, Keyspace, KvStore, WriteOp};

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Hash(HashMap<String, String>),
    Set(HashSet<String>),
    SortedSet(HashMap<String, f64>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

type Entries = HashMap<String, Entry>;

/// In-memory implementation of KvStore and Keyspace.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<Entries>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&mut Entries) -> Result<T>) -> Result<T> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        f(&mut entries)
    }
}

fn wrong_type(key: &str) -> anyhow::Error {
    anyhow!("WRONGTYPE operation against key {key} holding the wrong kind of value")
}

/// Live entry for `key`, evicting it first if its TTL has passed.
fn live<'a>(entries: &'a mut Entries, key: &str) -> Option<&'a mut Entry> {
    if entries.get(key).is_some_and(|e| e.is_expired(Instant::now())) {
        entries.remove(key);
    }
    entries.get_mut(key)
}

fn hash_mut<'a>(entries: &'a mut Entries, key: &str) -> Result<&'a mut HashMap<String, String>> {
    if live(entries, key).is_none() {
        entries.insert(key.to_string(), Entry::new(Value::Hash(HashMap::new())));
    }
    match entries.get_mut(key).map(|e| &mut e.value) {
        Some(Value::Hash(hash)) => Ok(hash),
        _ => Err(wrong_type(key)),
    }
}

fn set_mut<'a>(entries: &'a mut Entries, key: &str) -> Result<&'a mut HashSet<String>> {
    if live(entries, key).is_none() {
        entries.insert(key.to_string(), Entry::new(Value::Set(HashSet::new())));
    }
    match entries.get_mut(key).map(|e| &mut e.value) {
        Some(Value::Set(set)) => Ok(set),
        _ => Err(wrong_type(key)),
    }
}

fn zset_mut<'a>(entries: &'a mut Entries, key: &str) -> Result<&'a mut HashMap<String, f64>> {
    if live(entries, key).is_none() {
        entries.insert(
            key.to_string(),
            Entry::new(Value::SortedSet(HashMap::new())),
        );
    }
    match entries.get_mut(key).map(|e| &mut e.value) {
        Some(Value::SortedSet(zset)) => Ok(zset),
        _ => Err(wrong_type(key)),
    }
}

fn zset_ref<'a>(entries: &'a mut Entries, key: &str) -> Result<Option<&'a HashMap<String, f64>>> {
    match live(entries, key).map(|e| &e.value) {
        None => Ok(None),
        Some(Value::SortedSet(zset)) => Ok(Some(zset)),
        Some(_) => Err(wrong_type(key)),
    }
}

/// Drop a collection key once its last member is gone.
fn remove_if_empty(entries: &mut Entries, key: &str) {
    let empty = match entries.get(key).map(|e| &e.value) {
        Some(Value::Hash(hash)) => hash.is_empty(),
        Some(Value::Set(set)) => set.is_empty(),
        Some(Value::SortedSet(zset)) => zset.is_empty(),
        _ => false,
    };
    if empty {
        entries.remove(key);
    }
}

/// Members ordered by score, ties broken by member name.
fn sorted(zset: &HashMap<String, f64>) -> Vec<(String, f64)> {
    let mut members: Vec<(String, f64)> = zset.iter().map(|(m, s)| (m.clone(), *s)).collect();
    members.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    members
}

/// Resolve an inclusive rank range the way Redis does.
fn rank_window(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };

    if len == 0 || start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

fn apply(entries: &mut Entries, op: &WriteOp) -> Result<()> {
    match op {
        WriteOp::HashSet { key, fields } => {
            let hash = hash_mut(entries, key)?;
            for (field, value) in fields {
                hash.insert(field.clone(), value.clone());
            }
        }
        WriteOp::HashIncr { key, field, delta } => {
            let hash = hash_mut(entries, key)?;
            let current = match hash.get(field) {
                Some(raw) => raw
                    .parse::<i64>()
                    .map_err(|_| anyhow!("hash value {key}.{field} is not an integer"))?,
                None => 0,
            };
            hash.insert(field.clone(), (current + delta).to_string());
        }
        WriteOp::SortedSetAdd { key, member, score } => {
            zset_mut(entries, key)?.insert(member.clone(), *score);
        }
        WriteOp::SortedSetIncr { key, member, delta } => {
            *zset_mut(entries, key)?.entry(member.clone()).or_insert(0.0) += delta;
        }
    }
    Ok(())
}

/// Glob match supporting `*` and `?`.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if let Some((sp, st)) = star {
            p = sp + 1;
            t = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| *c == '*')
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn ping(&self) -> Result<bool> {
        self.with(|_| Ok(true))
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        self.with(|entries| {
            let next = match live(entries, key).map(|e| &e.value) {
                None => 1,
                Some(Value::Str(raw)) => {
                    raw.parse::<i64>()
                        .map_err(|_| anyhow!("value at {key} is not an integer"))?
                        + 1
                }
                Some(_) => return Err(wrong_type(key)),
            };
            match live(entries, key) {
                Some(entry) => entry.value = Value::Str(next.to_string()),
                None => {
                    entries.insert(key.to_string(), Entry::new(Value::Str(next.to_string())));
                }
            }
            Ok(next)
        })
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.with(|entries| match live(entries, key).map(|e| &e.value) {
            None => Ok(None),
            Some(Value::Str(value)) => Ok(Some(value.clone())),
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn del(&self, key: &str) -> Result<bool> {
        self.with(|entries| Ok(live(entries, key).is_some() && entries.remove(key).is_some()))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.with(|entries| Ok(live(entries, key).is_some()))
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<()> {
        self.with(|entries| {
            if let Some(entry) = live(entries, key) {
                entry.expires_at = Some(Instant::now() + Duration::from_secs(ttl_secs));
            }
            Ok(())
        })
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool> {
        self.with(|entries| Ok(set_mut(entries, key)?.insert(member.to_string())))
    }

    async fn srem(&self, key: &str, member: &str) -> Result<()> {
        self.with(|entries| {
            match live(entries, key).map(|e| &mut e.value) {
                None => return Ok(()),
                Some(Value::Set(set)) => {
                    set.remove(member);
                }
                Some(_) => return Err(wrong_type(key)),
            }
            remove_if_empty(entries, key);
            Ok(())
        })
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        self.with(|entries| match live(entries, key).map(|e| &e.value) {
            None => Ok(Vec::new()),
            Some(Value::Set(set)) => Ok(set.iter().cloned().collect()),
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn scard(&self, key: &str) -> Result<u64> {
        self.with(|entries| match live(entries, key).map(|e| &e.value) {
            None => Ok(0),
            Some(Value::Set(set)) => Ok(set.len() as u64),
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<()> {
        self.with(|entries| {
            zset_mut(entries, key)?.insert(member.to_string(), score);
            Ok(())
        })
    }

    async fn zincr(&self, key: &str, member: &str, delta: f64) -> Result<f64> {
        self.with(|entries| {
            let score = zset_mut(entries, key)?
                .entry(member.to_string())
                .or_insert(0.0);
            *score += delta;
            Ok(*score)
        })
    }

    async fn zscore(&self, key: &str, member: &str) -> Result<Option<f64>> {
        self.with(|entries| Ok(zset_ref(entries, key)?.and_then(|z| z.get(member).copied())))
    }

    async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        let entries = self.zrange_with_scores(key, start, stop).await?;
        Ok(entries.into_iter().map(|(member, _)| member).collect())
    }

    async fn zrange_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(String, f64)>> {
        self.with(|entries| {
            let Some(zset) = zset_ref(entries, key)? else {
                return Ok(Vec::new());
            };
            let members = sorted(zset);
            Ok(match rank_window(members.len(), start, stop) {
                Some((from, to)) => members[from..=to].to_vec(),
                None => Vec::new(),
            })
        })
    }

    async fn zinterstore(
        &self,
        dest: &str,
        set_key: &str,
        ranking_key: &str,
        ttl_secs: u64,
    ) -> Result<i64> {
        self.with(|entries| {
            let members: HashSet<String> = match live(entries, set_key).map(|e| &e.value) {
                None => HashSet::new(),
                Some(Value::Set(set)) => set.clone(),
                Some(Value::SortedSet(zset)) => zset.keys().cloned().collect(),
                Some(_) => return Err(wrong_type(set_key)),
            };
            let ranking = zset_ref(entries, ranking_key)?.cloned().unwrap_or_default();

            let result: HashMap<String, f64> = ranking
                .into_iter()
                .filter(|(member, _)| members.contains(member))
                .collect();
            let count = result.len() as i64;

            entries.remove(dest);
            if !result.is_empty() {
                entries.insert(
                    dest.to_string(),
                    Entry {
                        value: Value::SortedSet(result),
                        expires_at: Some(Instant::now() + Duration::from_secs(ttl_secs)),
                    },
                );
            }
            Ok(count)
        })
    }

    async fn hset_multiple(&self, key: &str, fields: Vec<(String, String)>) -> Result<()> {
        let op = WriteOp::HashSet {
            key: key.to_string(),
            fields,
        };
        self.with(|entries| apply(entries, &op))
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        self.with(|entries| match live(entries, key).map(|e| &e.value) {
            None => Ok(HashMap::new()),
            Some(Value::Hash(hash)) => Ok(hash.clone()),
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn commit(&self, batch: Batch) -> Result<()> {
        self.with(|entries| {
            // Stage touched keys so a failing op leaves the store untouched.
            let mut staged: Entries = HashMap::new();
            for op in batch.ops() {
                let key = match op {
                    WriteOp::HashSet { key, .. }
                    | WriteOp::HashIncr { key, .. }
                    | WriteOp::SortedSetAdd { key, .. }
                    | WriteOp::SortedSetIncr { key, .. } => key,
                };
                if !staged.contains_key(key)
                    && let Some(entry) = live(entries, key)
                {
                    staged.insert(key.clone(), entry.clone());
                }
            }

            for op in batch.ops() {
                apply(&mut staged, op)?;
            }

            entries.extend(staged);
            Ok(())
        })
    }
}

#[async_trait]
impl Keyspace for MemoryKvStore {
    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.with(|entries| {
            let now = Instant::now();
            entries.retain(|_, entry| !entry.is_expired(now));

            let mut keys: Vec<String> = entries
                .keys()
                .filter(|key| glob_match(pattern, key))
                .cloned()
                .collect();
            keys.sort();
            Ok(keys)
        })
    }

    async fn flush(&self) -> Result<()> {
        self.with(|entries| {
            entries.clear();
            Ok(())
        })
    }
}

impl MemoryKvStore {
    /// Store a raw string value. Only needed to seed odd states in tests.
    #[cfg(test)]
    pub async fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        self.with(|entries| {
            if entries.get(key).is_some_and(|e| !matches!(e.value, Value::Str(_))) {
                return Err(wrong_type(key));
            }
            entries.insert(key.to_string(), Entry::new(Value::Str(value.to_string())));
            Ok(())
        })
    }
}
