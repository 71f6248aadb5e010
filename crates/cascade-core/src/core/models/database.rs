use super::level::{LevelKey, LevelRecord};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DatabaseError {
    #[error("No level with energy {energy} keV exists in the level database")]
    UnknownLevel { energy: f64 },
    #[error("The level database is empty")]
    EmptyDatabase,
    #[error("Duplicate level energy {energy} keV")]
    DuplicateLevel { energy: f64 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// The last record loaded for an energy wins; the collision is logged and kept in
    /// [`LevelDatabase::duplicates`].
    #[default]
    Replace,
    Reject,
}

/// Read-only mapping from level energy to [`LevelRecord`].
#[derive(Debug, Clone, Default)]
pub struct LevelDatabase {
    levels: BTreeMap<LevelKey, LevelRecord>,
    duplicates: Vec<LevelKey>,
}

impl LevelDatabase {
    pub fn from_records(
        records: impl IntoIterator<Item = LevelRecord>,
    ) -> Result<Self, DatabaseError> {
        LevelDatabaseBuilder::new().extend(records).build()
    }

    /// Exact-key lookup with no nearest-match fallback.
    pub fn lookup(&self, energy: f64) -> Result<&LevelRecord, DatabaseError> {
        LevelKey::from_energy(energy)
            .and_then(|key| self.levels.get(&key))
            .ok_or(DatabaseError::UnknownLevel { energy })
    }

    pub fn contains(&self, energy: f64) -> bool {
        LevelKey::from_energy(energy).is_some_and(|key| self.levels.contains_key(&key))
    }

    pub fn highest_energy(&self) -> Result<f64, DatabaseError> {
        self.levels
            .values()
            .next_back()
            .map(LevelRecord::energy)
            .ok_or(DatabaseError::EmptyDatabase)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Levels in ascending energy order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LevelRecord> {
        self.levels.values()
    }

    pub fn duplicates(&self) -> &[LevelKey] {
        &self.duplicates
    }

    /// Checks the level graph for conditions that would make a cascade fail or loop.
    pub fn validate(&self, half_life_threshold: f64) -> SchemeReport {
        let mut report = SchemeReport::default();

        for level in self.levels.values() {
            for &destination in level.transitions() {
                if !self.contains(destination) {
                    report.dangling.push(DanglingTransition {
                        from: level.key(),
                        to_energy: destination,
                    });
                }
            }
            if level.is_short_lived(half_life_threshold) && level.is_terminal_ground() {
                report.dead_ends.push(level.key());
            }
        }

        report.cyclic = self.short_lived_cycle_members(half_life_threshold);
        debug!(
            dangling = report.dangling.len(),
            dead_ends = report.dead_ends.len(),
            cyclic = report.cyclic.len(),
            "Level scheme validation finished."
        );
        report
    }

    /// Keys of every short-lived level lying on a directed cycle made only of
    /// short-lived levels joined by transitions of positive weight.
    ///
    /// Iterative Tarjan over the short-lived subgraph: a level is reported when its
    /// strongly connected component has more than one member or it loops onto itself.
    fn short_lived_cycle_members(&self, threshold: f64) -> BTreeSet<LevelKey> {
        let nodes: Vec<LevelKey> = self
            .levels
            .iter()
            .filter(|(_, l)| l.is_short_lived(threshold))
            .map(|(k, _)| *k)
            .collect();
        let position: BTreeMap<LevelKey, usize> =
            nodes.iter().enumerate().map(|(i, k)| (*k, i)).collect();
        let adjacency: Vec<Vec<usize>> = nodes
            .iter()
            .map(|key| {
                self.levels[key]
                    .outgoing()
                    .filter(|&(_, weight)| weight > 0.0)
                    .filter_map(|(energy, _)| LevelKey::from_energy(energy))
                    .filter_map(|dest| position.get(&dest).copied())
                    .unique()
                    .collect()
            })
            .collect();

        let mut order: Vec<Option<usize>> = vec![None; nodes.len()];
        let mut lowlink = vec![0usize; nodes.len()];
        let mut on_stack = vec![false; nodes.len()];
        let mut stack: Vec<usize> = Vec::new();
        let mut counter = 0usize;
        let mut members = BTreeSet::new();

        for root in 0..nodes.len() {
            if order[root].is_some() {
                continue;
            }
            order[root] = Some(counter);
            lowlink[root] = counter;
            counter += 1;
            stack.push(root);
            on_stack[root] = true;
            let mut frames: Vec<(usize, usize)> = vec![(root, 0)];

            while let Some((node, edge)) = frames.last_mut() {
                let node = *node;
                if let Some(&next) = adjacency[node].get(*edge) {
                    *edge += 1;
                    match order[next] {
                        None => {
                            order[next] = Some(counter);
                            lowlink[next] = counter;
                            counter += 1;
                            stack.push(next);
                            on_stack[next] = true;
                            frames.push((next, 0));
                        }
                        Some(visited) if on_stack[next] => {
                            lowlink[node] = lowlink[node].min(visited);
                        }
                        Some(_) => {}
                    }
                    continue;
                }

                frames.pop();
                if let Some(&(parent, _)) = frames.last() {
                    lowlink[parent] = lowlink[parent].min(lowlink[node]);
                }
                if order[node] != Some(lowlink[node]) {
                    continue;
                }
                let mut component = Vec::new();
                while let Some(member) = stack.pop() {
                    on_stack[member] = false;
                    component.push(member);
                    if member == node {
                        break;
                    }
                }
                if component.len() > 1 || adjacency[node].contains(&node) {
                    members.extend(component.into_iter().map(|i| nodes[i]));
                }
            }
        }
        members
    }
}

#[derive(Debug, Default)]
pub struct LevelDatabaseBuilder {
    records: Vec<LevelRecord>,
    policy: DuplicatePolicy,
}

impl LevelDatabaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn add_record(mut self, record: LevelRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn extend(mut self, records: impl IntoIterator<Item = LevelRecord>) -> Self {
        self.records.extend(records);
        self
    }

    pub fn build(self) -> Result<LevelDatabase, DatabaseError> {
        let mut database = LevelDatabase::default();
        for record in self.records {
            let key = record.key();
            if let Some(previous) = database.levels.insert(key, record) {
                if self.policy == DuplicatePolicy::Reject {
                    return Err(DatabaseError::DuplicateLevel {
                        energy: previous.energy(),
                    });
                }
                warn!(
                    "Level {} was loaded more than once; keeping the last record.",
                    key
                );
                database.duplicates.push(key);
            }
        }
        debug!(levels = database.levels.len(), "Level database built.");
        Ok(database)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DanglingTransition {
    pub from: LevelKey,
    pub to_energy: f64,
}

/// Findings of [`LevelDatabase::validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemeReport {
    pub dangling: Vec<DanglingTransition>,
    pub dead_ends: Vec<LevelKey>,
    pub cyclic: BTreeSet<LevelKey>,
}

impl SchemeReport {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty() && self.dead_ends.is_empty() && self.cyclic.is_empty()
    }

    pub fn finding_count(&self) -> usize {
        self.dangling.len() + self.dead_ends.len() + self.cyclic.len()
    }
}

impl fmt::Display for SchemeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(f, "level scheme is consistent");
        }
        for d in &self.dangling {
            writeln!(
                f,
                "transition from {} to unknown level {} keV",
                d.from, d.to_energy
            )?;
        }
        for key in &self.dead_ends {
            writeln!(f, "short-lived level {} has no outgoing transitions", key)?;
        }
        if !self.cyclic.is_empty() {
            writeln!(
                f,
                "short-lived levels on a cycle: {}",
                self.cyclic.iter().join(", ")
            )?;
        }
        Ok(())
    }
}
