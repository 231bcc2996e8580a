//! Neighbour access inside match / match+period groups
//!
//! Every look-ahead or look-back in the pipeline goes through this view so a
//! row never sees a neighbour from another period or match.

use crate::schema::ActionRecord;
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct GroupedView {
    members: Vec<Vec<usize>>,
    // (group, rank inside group) per row
    slot: Vec<(usize, usize)>,
}

impl GroupedView {
    /// Groups `len` rows by `key`. Members of a group keep row order; groups
    /// are numbered by first appearance.
    pub fn build<K, F>(len: usize, key: F) -> Self
    where
        K: Eq + Hash,
        F: Fn(usize) -> K,
    {
        let mut index: HashMap<K, usize> = HashMap::new();
        let mut members: Vec<Vec<usize>> = Vec::new();
        let mut slot = Vec::with_capacity(len);

        for row in 0..len {
            let next_id = members.len();
            let group = *index.entry(key(row)).or_insert(next_id);
            if group == next_id {
                members.push(Vec::new());
            }
            slot.push((group, members[group].len()));
            members[group].push(row);
        }

        Self { members, slot }
    }

    pub fn by_period<T: ActionRecord>(rows: &[T]) -> Self {
        Self::build(rows.len(), |i| (rows[i].match_id(), rows[i].period_id()))
    }

    pub fn by_match<T: ActionRecord>(rows: &[T]) -> Self {
        Self::build(rows.len(), |i| rows[i].match_id())
    }

    pub fn group_count(&self) -> usize {
        self.members.len()
    }

    pub fn groups(&self) -> impl Iterator<Item = &[usize]> {
        self.members.iter().map(|m| m.as_slice())
    }

    /// The row following `row` in its group.
    pub fn next(&self, row: usize) -> Option<usize> {
        let (group, rank) = self.slot[row];
        self.members[group].get(rank + 1).copied()
    }

    /// The row `k` places before `row` in its group, if there is one.
    pub fn prev(&self, row: usize, k: usize) -> Option<usize> {
        let (group, rank) = self.slot[row];
        rank.checked_sub(k).map(|r| self.members[group][r])
    }

    /// Like [`prev`](Self::prev) but falls back to the group's first row.
    pub fn prev_or_first(&self, row: usize, k: usize) -> usize {
        let (group, rank) = self.slot[row];
        self.members[group][rank.saturating_sub(k)]
    }

    /// The row `k` places after `row`, clamped to the group's last row.
    pub fn ahead_or_last(&self, row: usize, k: usize) -> usize {
        let (group, rank) = self.slot[row];
        let members = &self.members[group];
        members[(rank + k).min(members.len() - 1)]
    }

    /// Index of `row` inside its group.
    pub fn rank(&self, row: usize) -> usize {
        self.slot[row].1
    }
}
