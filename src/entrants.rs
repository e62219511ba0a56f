use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::warn;

use crate::obf::{EntrantRecord, PersonalInformation};

/// One competing party. Identity is fixed; tag and seed may be corrected.
#[derive(Debug, Clone, PartialEq)]
pub struct Entrant {
    id: String,
    pub tag: String,
    /// Initial seed, lower is stronger
    pub seed: u32,
    pub final_placement: Option<u32>,
    /// Carried through untouched from the interchange record
    pub personal_information: Vec<PersonalInformation>,
    /// Opaque metadata, carried through untouched
    pub other: Option<Value>,
}

impl Entrant {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn assign_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    fn from_record(record: &EntrantRecord, seed: u32) -> Self {
        Entrant {
            id: record.entrant_id.clone(),
            tag: record.entrant_tag.clone(),
            seed,
            final_placement: record.final_placement.filter(|p| *p > 0),
            personal_information: record.personal_information.clone(),
            other: record.other.clone(),
        }
    }

    pub fn to_record(&self) -> EntrantRecord {
        EntrantRecord {
            entrant_id: self.id.clone(),
            entrant_tag: self.tag.clone(),
            initial_seed: self.seed,
            final_placement: self.final_placement,
            personal_information: self.personal_information.clone(),
            other: self.other.clone(),
        }
    }
}

/// EntrantRegistry holds the entrants of one bracket in seed order.
///
/// The bracket places entrants by their *rank* in this order (1..=n), so
/// gaps in the seed numbers never turn into phantom byes.
#[derive(Debug, Clone, Default)]
pub struct EntrantRegistry {
    /// Entrants sorted by seed
    entrants: Vec<Entrant>,
    /// Index from entrant id to position in `entrants`
    by_id: HashMap<String, usize>,
}

impl EntrantRegistry {
    /// Register entrants from interchange records.
    ///
    /// A seed of 0, or a seed already claimed by an earlier record, is
    /// replaced by the lowest free seed in input order. Records repeating an
    /// id that is already registered are dropped.
    pub fn from_records(records: &[EntrantRecord]) -> Self {
        let mut seen_ids = HashSet::new();
        let mut used_seeds = HashSet::new();
        let mut assigned: Vec<(&EntrantRecord, u32)> = Vec::with_capacity(records.len());

        for record in records {
            if !seen_ids.insert(record.entrant_id.as_str()) {
                warn!("Duplicate entrant id {} ignored", record.entrant_id);
                continue;
            }
            let seed = Some(record.initial_seed).filter(|s| *s > 0 && !used_seeds.contains(s));
            let final_seed = if let Some(seed) = seed {
                used_seeds.insert(seed);
                seed
            } else {
                0
            };
            assigned.push((record, final_seed));
        }

        let mut next_seed = 1u32;
        for (_, seed) in assigned.iter_mut() {
            if *seed != 0 {
                continue;
            }
            while used_seeds.contains(&next_seed) {
                next_seed += 1;
            }
            *seed = next_seed;
            used_seeds.insert(next_seed);
            next_seed += 1;
        }

        let entrants = assigned
            .into_iter()
            .map(|(record, seed)| Entrant::from_record(record, seed))
            .collect();
        EntrantRegistry::from_entrants(entrants)
    }

    fn from_entrants(mut entrants: Vec<Entrant>) -> Self {
        entrants.sort_by_key(|e| e.seed);
        let mut registry = EntrantRegistry {
            entrants,
            by_id: HashMap::new(),
        };
        registry.reindex();
        registry
    }

    fn reindex(&mut self) {
        self.by_id = self
            .entrants
            .iter()
            .enumerate()
            .map(|(idx, e)| (e.id.clone(), idx))
            .collect();
    }

    pub fn len(&self) -> usize {
        self.entrants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entrants.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Entrant> {
        self.by_id.get(id).and_then(|idx| self.entrants.get(*idx))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Entrant at 1-based `rank` in seed order
    pub fn by_rank(&self, rank: u32) -> Option<&Entrant> {
        let idx = (rank as usize).checked_sub(1)?;
        self.entrants.get(idx)
    }

    /// All entrants, strongest seed first
    pub fn iter(&self) -> impl Iterator<Item = &Entrant> {
        self.entrants.iter()
    }

    /// Correct an entrant's seed. Ordering is refreshed, but an already built
    /// bracket keeps its structure.
    pub fn assign_seed(&mut self, id: &str, seed: u32) -> Result<(), String> {
        let idx = *self
            .by_id
            .get(id)
            .ok_or_else(|| format!("Entrant {id} not found."))?;
        if seed == 0 {
            return Err("Seed must be positive.".to_string());
        }
        self.entrants[idx].seed = seed;
        self.entrants.sort_by_key(|e| e.seed);
        self.reindex();
        Ok(())
    }

    pub fn assign_tag(&mut self, id: &str, tag: &str) -> Result<(), String> {
        let idx = *self
            .by_id
            .get(id)
            .ok_or_else(|| format!("Entrant {id} not found."))?;
        self.entrants[idx].assign_tag(tag);
        Ok(())
    }

    pub fn set_final_placement(&mut self, id: &str, placement: Option<u32>) {
        if let Some(idx) = self.by_id.get(id).copied() {
            self.entrants[idx].final_placement = placement;
        }
    }

    pub fn to_records(&self) -> Vec<EntrantRecord> {
        self.entrants.iter().map(Entrant::to_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, seed: u32) -> EntrantRecord {
        EntrantRecord {
            entrant_id: id.to_string(),
            entrant_tag: format!("Player {id}"),
            initial_seed: seed,
            ..EntrantRecord::default()
        }
    }

    #[test]
    fn test_missing_seeds_follow_input_order() {
        let registry = EntrantRegistry::from_records(&[
            record("a", 0),
            record("b", 1),
            record("c", 0),
        ]);

        assert_eq!(registry.get("b").unwrap().seed, 1);
        assert_eq!(registry.get("a").unwrap().seed, 2);
        assert_eq!(registry.get("c").unwrap().seed, 3);
        assert_eq!(registry.by_rank(1).unwrap().id(), "b");
    }

    #[test]
    fn test_duplicate_seed_and_id() {
        let registry = EntrantRegistry::from_records(&[
            record("a", 2),
            record("b", 2),
            record("a", 5),
        ]);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("a").unwrap().seed, 2);
        // Seed 2 is taken, so "b" gets the lowest free seed.
        assert_eq!(registry.get("b").unwrap().seed, 1);
    }

    #[test]
    fn test_rank_ignores_seed_gaps() {
        let registry = EntrantRegistry::from_records(&[
            record("x", 10),
            record("y", 3),
            record("z", 7),
        ]);

        let ranked: Vec<&str> = (1..=3).map(|r| registry.by_rank(r).unwrap().id()).collect();
        assert_eq!(ranked, vec!["y", "z", "x"]);
        assert!(registry.by_rank(4).is_none());
        assert!(registry.by_rank(0).is_none());
    }

    #[test]
    fn test_assign_seed_reorders() {
        let mut registry = EntrantRegistry::from_records(&[record("a", 1), record("b", 2)]);

        registry.assign_seed("b", 0).unwrap_err();
        registry.assign_seed("a", 9).unwrap();

        assert_eq!(registry.by_rank(1).unwrap().id(), "b");
        assert_eq!(registry.get("a").unwrap().seed, 9);
        assert!(registry.assign_seed("nobody", 1).is_err());
    }

    #[test]
    fn test_assign_tag_keeps_identity() {
        let mut registry = EntrantRegistry::from_records(&[record("a", 1)]);
        registry.assign_tag("a", "Renamed").unwrap();

        let entrant = registry.get("a").unwrap();
        assert_eq!(entrant.tag, "Renamed");
        assert_eq!(entrant.to_record().entrant_id, "a");
        assert!(registry.assign_tag("b", "Nobody").is_err());
    }
}
