use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::console;
use crate::storage::KeyValueStore;

pub const SCORES_KEY: &str = "scores";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScoreTable {
    entries: BTreeMap<String, u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankedScore<'a> {
    pub rank: usize,
    pub username: &'a str,
    pub points: u32,
}

// Numbers are clamped into `0..=u32::MAX` and truncated; anything else is unreadable.
fn points_from_json(value: &Value) -> Option<u32> {
    let points = value.as_f64()?;
    if points.is_nan() {
        return None;
    }
    Some(points.clamp(0.0, f64::from(u32::MAX)) as u32)
}

impl ScoreTable {
    pub fn load(store: &impl KeyValueStore) -> Self {
        let Some(raw) = store.get(SCORES_KEY) else {
            return Self::default();
        };
        let parsed: BTreeMap<String, Value> = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                console::warn(&format!("ignoring unreadable score table: {err}"));
                return Self::default();
            }
        };

        // One bad entry must not cost every other user their score.
        let mut entries = BTreeMap::new();
        for (username, value) in parsed {
            match points_from_json(&value) {
                Some(points) => {
                    entries.insert(username, points);
                }
                None => console::warn(&format!("dropping unreadable score for {username}: {value}")),
            }
        }
        Self { entries }
    }

    pub fn persist(&self, store: &impl KeyValueStore) -> Result<(), String> {
        let raw = serde_json::to_string(self).map_err(|err| err.to_string())?;
        store.set(SCORES_KEY, &raw)
    }

    pub fn get(&self, username: &str) -> Option<u32> {
        self.entries.get(username).copied()
    }

    pub fn set(&mut self, username: &str, points: u32) {
        match self.entries.get_mut(username) {
            Some(existing) => *existing = points,
            None => {
                self.entries.insert(username.to_string(), points);
            }
        }
    }

    pub fn ensure(&mut self, username: &str) -> (u32, bool) {
        match self.entries.get(username) {
            Some(points) => (*points, false),
            None => {
                self.entries.insert(username.to_string(), 0);
                (0, true)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ranking(&self) -> Vec<RankedScore<'_>> {
        let mut rows: Vec<(&str, u32)> = self
            .entries
            .iter()
            .map(|(name, points)| (name.as_str(), *points))
            .collect();
        // BTreeMap iteration is already name-ordered; a stable sort keeps it for ties.
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        rows.into_iter()
            .enumerate()
            .map(|(idx, (username, points))| RankedScore {
                rank: idx + 1,
                username,
                points,
            })
            .collect()
    }
}
