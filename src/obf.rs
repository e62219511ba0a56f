use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fs, path::Path};

use crate::types::{SetGameResult, SetStatus, EMPTY_ENTRANT_ID};

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TournamentRecord {
  #[serde(default)]
  pub event: EventRecord,
  #[serde(default)]
  pub sets: Vec<SetRecord>,
  #[serde(default)]
  pub entrants: Vec<EntrantRecord>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub state: Option<EventState>,
  #[serde(default)]
  pub date: String,
  #[serde(default)]
  pub game_name: String,
  #[serde(default)]
  pub tournament_structure: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phases: Option<Vec<PhaseRecord>>,
  #[serde(default)]
  pub ruleset: String,
  #[serde(default, rename = "originURL")]
  pub origin_url: String,
  #[serde(default)]
  pub number_entrants: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub other: Option<Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventState {
  Open,
  Pending,
  Started,
  Completed,
  Finalized,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PhaseRecord {
  #[serde(rename = "phaseID")]
  pub phase_id: String,
  #[serde(default)]
  pub phase_structure: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub other: Option<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntrantRecord {
  #[serde(rename = "entrantID")]
  pub entrant_id: String,
  #[serde(default)]
  pub entrant_tag: String,
  #[serde(default)]
  pub initial_seed: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub final_placement: Option<u32>,
  #[serde(default)]
  pub personal_information: Vec<PersonalInformation>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub other: Option<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInformation {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub country: Option<String>,
  pub tag: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub prefix: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetRecord {
  #[serde(rename = "setID")]
  pub set_id: String,
  #[serde(rename = "entrant1ID", default = "empty_entrant_id")]
  pub entrant1_id: String,
  #[serde(rename = "entrant2ID", default = "empty_entrant_id")]
  pub entrant2_id: String,
  #[serde(default)]
  pub status: SetStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub entrant1_result: Option<SetGameResult>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub entrant2_result: Option<SetGameResult>,
  #[serde(default)]
  pub entrant1_score: i32,
  #[serde(default)]
  pub entrant2_score: i32,
  #[serde(rename = "entrant1NextSetID", default, skip_serializing_if = "Option::is_none")]
  pub entrant1_next_set_id: Option<String>,
  #[serde(rename = "entrant2NextSetID", default, skip_serializing_if = "Option::is_none")]
  pub entrant2_next_set_id: Option<String>,
  #[serde(rename = "entrant1PrevSetID", default, skip_serializing_if = "Option::is_none")]
  pub entrant1_prev_set_id: Option<String>,
  #[serde(rename = "entrant2PrevSetID", default, skip_serializing_if = "Option::is_none")]
  pub entrant2_prev_set_id: Option<String>,
  #[serde(default)]
  pub set_format: String,
  #[serde(rename = "phaseID", default)]
  pub phase_id: String,
  #[serde(rename = "roundID", default)]
  pub round_id: String,
  #[serde(default)]
  pub games: Vec<GameRecord>,
  /// Link hints for consumers plus any opaque metadata
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub other: Option<Value>,
}

impl SetRecord {
  /// A pending record with both slots empty.
  pub fn new(set_id: impl Into<String>) -> Self {
    SetRecord {
      set_id: set_id.into(),
      entrant1_id: empty_entrant_id(),
      entrant2_id: empty_entrant_id(),
      status: SetStatus::Pending,
      entrant1_result: None,
      entrant2_result: None,
      entrant1_score: 0,
      entrant2_score: 0,
      entrant1_next_set_id: None,
      entrant2_next_set_id: None,
      entrant1_prev_set_id: None,
      entrant2_prev_set_id: None,
      set_format: String::new(),
      phase_id: String::new(),
      round_id: String::new(),
      games: Vec::new(),
      other: None,
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
  pub game_number: u32,
  #[serde(default)]
  pub entrant1_characters: Vec<String>,
  #[serde(default)]
  pub entrant2_characters: Vec<String>,
  #[serde(default)]
  pub stage: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub entrant1_result: Option<SetGameResult>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub entrant2_result: Option<SetGameResult>,
}

fn empty_entrant_id() -> String {
  EMPTY_ENTRANT_ID.to_string()
}

/// True for ids that mean "no entrant in this slot".
pub fn is_empty_entrant_id(raw: &str) -> bool {
  let trimmed = raw.trim();
  trimmed.is_empty() || trimmed == EMPTY_ENTRANT_ID || trimmed == "undefined"
}

pub fn read_tournament(path: &Path) -> Result<TournamentRecord, String> {
  let data = fs::read_to_string(path).map_err(|e| format!("read tournament {}: {e}", path.display()))?;
  serde_json::from_str::<TournamentRecord>(&data)
    .map_err(|e| format!("parse tournament {}: {e}", path.display()))
}

pub fn write_tournament(path: &Path, tournament: &TournamentRecord) -> Result<(), String> {
  let payload = serde_json::to_string_pretty(tournament).map_err(|e| e.to_string())?;
  fs::write(path, payload).map_err(|e| format!("write tournament {}: {e}", path.display()))
}
