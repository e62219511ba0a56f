use std::collections::HashMap;

use chrono::Local;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::builder::{build_winners, BuildContext};
use crate::config::BracketConfig;
use crate::entrants::EntrantRegistry;
use crate::losers::{build_grand_finals, build_losers};
use crate::obf::{is_empty_entrant_id, EntrantRecord, EventRecord, SetRecord, TournamentRecord};
use crate::placement::place_entrants;
use crate::ranking::assign_placements;
use crate::set::MatchNode;
use crate::topology::round_count;
use crate::types::{Layout, MatchId, SetGameResult, SetStatus, Side, EMPTY_ENTRANT_ID};

/// Outcome of applying interchange set records to a built bracket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Records matched to a node and copied
    pub applied: usize,
    /// Records whose set id names no node
    pub unknown_sets: usize,
    /// Entrant slots left untouched because the id is not registered
    pub skipped_entrants: usize,
}

/// One fully linked bracket: the entrants, the match arena and the roots of
/// its trees.
///
/// Structure is fixed at construction. Afterwards only entrant slots, scores,
/// results, status and games change, through `import_sets` or
/// `record_result`.
#[derive(Debug, Clone)]
pub struct Bracket {
    layout: Layout,
    entrants: EntrantRegistry,
    /// Arena indexed by `id - 1`
    nodes: Vec<MatchNode>,
    root: Option<MatchId>,
    winners_root: Option<MatchId>,
    losers_root: Option<MatchId>,
    grand_finals: Option<MatchId>,
    reset: Option<MatchId>,
    round_count: usize,
    losers_round_count: usize,
    event: EventRecord,
    version: Option<String>,
}

impl Bracket {
    pub fn new(entrants: &[EntrantRecord], config: &BracketConfig) -> Self {
        Self::build(EntrantRegistry::from_records(entrants), config)
    }

    /// Build, then copy the state of already played sets onto the result.
    pub fn with_sets(entrants: &[EntrantRecord], sets: &[SetRecord], config: &BracketConfig) -> Self {
        let mut bracket = Self::new(entrants, config);
        bracket.import_sets(sets);
        bracket
    }

    /// Build from a whole interchange document. A recognised
    /// `tournamentStructure` overrides the configured layout.
    pub fn from_tournament(tournament: &TournamentRecord, config: &BracketConfig) -> Self {
        let mut config = config.clone();
        if let Ok(layout) = tournament.event.tournament_structure.parse::<Layout>() {
            config.layout = layout;
        }
        let mut bracket = Self::with_sets(&tournament.entrants, &tournament.sets, &config);
        bracket.event = tournament.event.clone();
        bracket.version = tournament.version.clone();
        bracket
    }

    fn build(entrants: EntrantRegistry, config: &BracketConfig) -> Self {
        let n = entrants.len();
        let layout = config.layout;
        let mut ctx = BuildContext::new(layout, n, config.number_to_win.max(1));

        let winners = build_winners(&mut ctx);
        let losers = build_losers(&mut ctx, &winners);
        let finals = build_grand_finals(&mut ctx, &winners, &losers, config.grand_finals_reset);
        if layout == Layout::DoubleElimination && n == 2 {
            debug!("double elimination with 2 entrants is a single match");
        }
        place_entrants(&mut ctx, &winners, &entrants);

        let root = finals.reset.or(finals.grand_finals).or(winners.root);
        assign_placements(&mut ctx, root, losers.root, finals);

        let nodes = ctx.into_nodes();
        info!("Built {layout} bracket: {n} entrants, {} matches", nodes.len());
        Bracket {
            layout,
            entrants,
            nodes,
            root,
            winners_root: winners.root,
            losers_root: losers.root,
            grand_finals: finals.grand_finals,
            reset: finals.reset,
            round_count: round_count(n, layout),
            losers_round_count: losers.round_count,
            event: EventRecord::default(),
            version: None,
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn entrants(&self) -> &EntrantRegistry {
        &self.entrants
    }

    pub fn node(&self, id: MatchId) -> Option<&MatchNode> {
        let idx = (id as usize).checked_sub(1)?;
        self.nodes.get(idx)
    }

    fn node_mut(&mut self, id: MatchId) -> Option<&mut MatchNode> {
        let idx = (id as usize).checked_sub(1)?;
        self.nodes.get_mut(idx)
    }

    pub fn nodes(&self) -> &[MatchNode] {
        &self.nodes
    }

    pub fn sets_by_round(&self, side: Side, round: u32) -> Vec<&MatchNode> {
        self.nodes
            .iter()
            .filter(|node| node.side == side && node.round == round)
            .collect()
    }

    /// The deciding match: the reset if modeled, else grand finals, else the
    /// winners final. `None` for round robin and for fewer than 2 entrants.
    pub fn root(&self) -> Option<MatchId> {
        self.root
    }

    pub fn winners_root(&self) -> Option<MatchId> {
        self.winners_root
    }

    pub fn losers_root(&self) -> Option<MatchId> {
        self.losers_root
    }

    pub fn grand_finals(&self) -> Option<MatchId> {
        self.grand_finals
    }

    pub fn grand_finals_reset(&self) -> Option<MatchId> {
        self.reset
    }

    /// Winners bracket rounds, or the rounds of a round robin.
    pub fn round_count(&self) -> usize {
        self.round_count
    }

    pub fn losers_round_count(&self) -> usize {
        self.losers_round_count
    }

    /// Copy played state from interchange records. Records are matched to
    /// nodes by id; linking fields in the records are ignored since links are
    /// owned by the bracket.
    pub fn import_sets(&mut self, records: &[SetRecord]) -> ImportReport {
        let by_id: HashMap<String, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id.to_string(), idx))
            .collect();
        let mut report = ImportReport::default();

        for record in records {
            let Some(idx) = by_id.get(record.set_id.trim()).copied() else {
                debug!("Set {} not in bracket, skipped", record.set_id);
                report.unknown_sets += 1;
                continue;
            };
            let node = &mut self.nodes[idx];
            for (slot, raw) in [&record.entrant1_id, &record.entrant2_id].into_iter().enumerate() {
                let id = raw.trim();
                if is_empty_entrant_id(id) {
                    continue;
                }
                if self.entrants.contains(id) {
                    node.assign_entrant(slot, id);
                } else {
                    debug!("Set {}: unknown entrant {id}, slot {} left as is", record.set_id, slot + 1);
                    report.skipped_entrants += 1;
                }
            }
            node.status = record.status;
            node.results = [record.entrant1_result, record.entrant2_result];
            node.update_score(0, record.entrant1_score);
            node.update_score(1, record.entrant2_score);
            node.games = record.games.clone();
            node.other = record.other.clone();
            report.applied += 1;
        }

        debug!(
            "Imported {} set(s), {} unknown, {} entrant slot(s) skipped",
            report.applied, report.unknown_sets, report.skipped_entrants
        );
        report
    }

    pub fn export_sets(&self) -> Vec<SetRecord> {
        self.nodes.iter().map(|node| self.export_set(node)).collect()
    }

    fn export_set(&self, node: &MatchNode) -> SetRecord {
        let link = |id: Option<MatchId>| id.map(|id| id.to_string()).unwrap_or_else(|| EMPTY_ENTRANT_ID.to_string());
        let entrant = |slot: usize| node.entrant(slot).unwrap_or(EMPTY_ENTRANT_ID).to_string();
        let previous = |slot: usize| link(node.children[slot].or(node.sources[slot]));

        let mut record = SetRecord::new(node.id.to_string());
        record.entrant1_id = entrant(0);
        record.entrant2_id = entrant(1);
        record.status = node.status;
        record.entrant1_result = node.results[0];
        record.entrant2_result = node.results[1];
        record.entrant1_score = node.scores[0].unwrap_or(0);
        record.entrant2_score = node.scores[1].unwrap_or(0);
        record.entrant1_next_set_id = Some(link(node.parent));
        record.entrant2_next_set_id = Some(link(node.parent));
        record.entrant1_prev_set_id = Some(previous(0));
        record.entrant2_prev_set_id = Some(previous(1));
        record.set_format = node.set_format();
        record.round_id = node.round_id().to_string();
        record.games = node.games.clone();
        record.other = Some(self.export_other(node));
        record
    }

    /// Imported metadata with the link hints written over it: the match
    /// limit, where the winner and loser go, and which slot of the drop
    /// match the loser takes.
    fn export_other(&self, node: &MatchNode) -> Value {
        let mut other = match &node.other {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        let link = |id: Option<MatchId>| Value::String(id.map(|id| id.to_string()).unwrap_or_else(|| EMPTY_ENTRANT_ID.to_string()));
        let drop_slot = node
            .drop
            .and_then(|drop| self.node(drop))
            .and_then(|drop| drop.slot_of_source(node.id));
        let loser_slot = |slot: usize| link(node.drop.filter(|_| drop_slot == Some(slot)));

        other.insert("matchLimit".to_string(), Value::from(node.number_to_win));
        other.insert("nextWinnerSet".to_string(), link(node.parent));
        other.insert("nextLoserSet".to_string(), link(node.drop));
        other.insert("nextLeftLoserSlot".to_string(), loser_slot(0));
        other.insert("nextRightLoserSlot".to_string(), loser_slot(1));
        Value::Object(other)
    }

    /// Correct an entrant's display tag.
    pub fn assign_tag(&mut self, id: &str, tag: &str) -> Result<(), String> {
        self.entrants.assign_tag(id, tag)
    }

    /// Correct an entrant's seed. The built structure is left as is, so the
    /// new seed shows up in exports and in the next build.
    pub fn assign_seed(&mut self, id: &str, seed: u32) -> Result<(), String> {
        self.entrants.assign_seed(id, seed)
    }

    pub fn export_entrants(&self) -> Vec<EntrantRecord> {
        self.entrants.to_records()
    }

    pub fn to_tournament(&self) -> TournamentRecord {
        let mut event = self.event.clone();
        event.tournament_structure = self.layout.as_str().to_string();
        event.number_entrants = self.entrants.len() as u32;
        if event.date.trim().is_empty() {
            event.date = Local::now().format("%Y-%m-%d").to_string();
        }
        TournamentRecord {
            event,
            sets: self.export_sets(),
            entrants: self.export_entrants(),
            version: self.version.clone(),
        }
    }

    /// Record the outcome of one match and move both entrants on: the winner
    /// to the parent slot and, with a losers bracket, the loser to the drop
    /// slot. A grand finals won by the winners bracket side skips the reset.
    /// A round robin match may end in a draw; elimination matches may not.
    pub fn record_result(
        &mut self,
        id: MatchId,
        scores: [i32; 2],
        results: Option<[SetGameResult; 2]>,
    ) -> Result<(), String> {
        let layout = self.layout;
        let node = self.node_mut(id).ok_or_else(|| format!("Set {id} not found."))?;
        if node.entrants.iter().any(Option::is_none) {
            return Err(format!("Set {id} is missing an entrant."));
        }
        let previous = (node.scores, node.results, node.status);
        node.update_score(0, scores[0]);
        node.update_score(1, scores[1]);
        node.results = results.map(|[a, b]| [Some(a), Some(b)]).unwrap_or([None, None]);
        node.status = SetStatus::Completed;
        let Some(winner_slot) = node.winner_slot() else {
            // Round robin keeps a draw as a finished match; nothing advances.
            if layout == Layout::RoundRobin {
                debug!("Set {id}: recorded as a draw");
                return Ok(());
            }
            (node.scores, node.results, node.status) = previous;
            return Err(format!("Set {id} has no winner."));
        };
        let winner = node.entrants[winner_slot].clone();
        let loser = node.entrants[1 - winner_slot].clone();
        let (parent, drop) = (node.parent, node.drop);

        if self.grand_finals == Some(id) && winner_slot == 0 {
            debug!("Set {id}: winners side took grand finals, reset not played");
            return Ok(());
        }
        if let Some(parent) = parent {
            if let Some(parent_node) = self.node_mut(parent) {
                if let Some(slot) = parent_node.slot_of_child(id) {
                    parent_node.entrants[slot] = winner;
                }
            }
        }
        if let Some(drop) = drop {
            if let Some(drop_node) = self.node_mut(drop) {
                if let Some(slot) = drop_node.slot_of_source(id) {
                    drop_node.entrants[slot] = loser;
                }
            }
        }
        Ok(())
    }

    /// Write final placements for entrants eliminated in completed matches,
    /// and first place once the deciding match is complete. Returns how many
    /// entrants hold a placement.
    pub fn finalize_standings(&mut self) -> usize {
        let mut standings: Vec<(String, u32)> = Vec::new();
        for node in &self.nodes {
            if node.placement == 0 || node.status != SetStatus::Completed {
                continue;
            }
            // Grand finals taken by the losers bracket side eliminates nobody.
            if Some(node.id) == self.grand_finals && self.reset.is_some() && node.winner_slot() == Some(1) {
                continue;
            }
            if let Some(loser) = node.loser() {
                standings.push((loser.to_string(), node.placement));
            }
        }
        if let Some(champion) = self.champion() {
            standings.push((champion.to_string(), 1));
        }

        for (id, placement) in &standings {
            self.entrants.set_final_placement(id, Some(*placement));
        }
        info!("Finalized {} placement(s)", standings.len());
        self.entrants.iter().filter(|e| e.final_placement.is_some()).count()
    }

    fn champion(&self) -> Option<&str> {
        let decided = |id: Option<MatchId>| {
            self.node(id?)
                .filter(|node| node.status == SetStatus::Completed)
                .and_then(|node| node.winner_slot().map(|slot| (node, slot)))
        };
        if let Some((node, _)) = decided(self.reset) {
            return node.winner();
        }
        if let Some((node, slot)) = decided(self.grand_finals) {
            return if slot == 0 || self.reset.is_none() { node.winner() } else { None };
        }
        match decided(self.winners_root) {
            Some((node, _)) if self.grand_finals.is_none() && self.layout.is_elimination() => node.winner(),
            _ => None,
        }
    }
}
