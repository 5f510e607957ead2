//! Roster store interface, the normalized update record, and an in-memory store.

use crate::boundary::StoreError;
use crate::models::{Player, PlayerId, SkillRating};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::RwLock;
use uuid::Uuid;

/// Persistent roster. The scheduler only reads players and updates their fields.
pub trait RosterStore: Send + Sync {
    fn list(&self) -> Result<Vec<Player>, StoreError>;
    /// Apply field updates; returns the number of rows changed.
    fn batch_update(&self, updates: &[PlayerUpdate]) -> Result<usize, StoreError>;
    /// Insert new players or replace existing ones by id; returns the stored rows.
    fn upsert(&self, players: Vec<Player>) -> Result<Vec<Player>, StoreError>;
    fn delete(&self, ids: &[PlayerId]) -> Result<(), StoreError>;
}

/// Field changes for one player. `None` leaves the field untouched.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<SkillRating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub present: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bench_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_played_round: Option<u32>,
}

impl PlayerFields {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&self, p: &mut Player) {
        if let Some(name) = &self.name {
            p.name = name.clone();
        }
        if let Some(skill) = self.skill {
            p.skill = skill;
        }
        if let Some(present) = self.present {
            p.present = present;
        }
        if let Some(n) = self.bench_count {
            p.bench_count = n;
        }
        if let Some(r) = self.last_played_round {
            p.last_played_round = r;
        }
    }
}

/// The single update shape the scheduler emits and the store consumes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerUpdate {
    pub id: PlayerId,
    pub fields: PlayerFields,
}

impl PlayerUpdate {
    pub fn benched(id: PlayerId, bench_count: u32) -> Self {
        Self {
            id,
            fields: PlayerFields {
                bench_count: Some(bench_count),
                ..PlayerFields::default()
            },
        }
    }

    pub fn played(id: PlayerId, round: u32) -> Self {
        Self {
            id,
            fields: PlayerFields {
                last_played_round: Some(round),
                ..PlayerFields::default()
            },
        }
    }

    /// Normalize a loosely-shaped payload: either flat (`{"id", "bench_count", ..}`)
    /// or nested (`{"id", "fields": {..}}`).
    pub fn from_payload(value: &Value) -> Result<Self, StoreError> {
        let obj = value
            .as_object()
            .ok_or_else(|| StoreError::Validation("update must be an object".into()))?;
        let id = obj
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::Validation("missing id".into()))?;
        let id = Uuid::parse_str(id)
            .map_err(|e| StoreError::Validation(format!("bad id '{}': {}", id, e)))?;

        let fields_value = match obj.get("fields") {
            Some(nested) => nested.clone(),
            None => {
                let mut flat = obj.clone();
                flat.remove("id");
                Value::Object(flat)
            }
        };
        let fields: PlayerFields = serde_json::from_value(fields_value)
            .map_err(|e| StoreError::Validation(e.to_string()))?;
        if fields.is_empty() {
            return Err(StoreError::Validation(format!("no fields to update for {}", id)));
        }
        Ok(Self { id, fields })
    }

    /// Normalize a single payload or an array of payloads.
    pub fn from_payloads(value: &Value) -> Result<Vec<Self>, StoreError> {
        match value {
            Value::Array(items) => items.iter().map(Self::from_payload).collect(),
            single => Ok(vec![Self::from_payload(single)?]),
        }
    }
}

/// CSV roster row: `name,skill[,present]`.
#[derive(Deserialize)]
struct CsvRow {
    name: String,
    skill: u8,
    #[serde(default)]
    present: Option<bool>,
}

/// In-memory roster, insertion order preserved.
#[derive(Debug, Default)]
pub struct InMemoryRoster {
    players: RwLock<Vec<Player>>,
}

impl InMemoryRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_players(players: Vec<Player>) -> Self {
        Self {
            players: RwLock::new(players),
        }
    }

    /// Load players from CSV with a header row. Skills are clamped into 1..=10.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, StoreError> {
        Ok(Self::with_players(parse_csv_players(reader)?))
    }

    /// Load a roster file. A missing or unreadable file is a configuration error.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            StoreError::Configuration(format!("cannot open roster {}: {}", path.display(), e))
        })?;
        Self::from_csv_reader(file)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<Player>>, StoreError> {
        self.players
            .read()
            .map_err(|_| StoreError::Backend("lock error".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<Player>>, StoreError> {
        self.players
            .write()
            .map_err(|_| StoreError::Backend("lock error".into()))
    }
}

/// Parse `name,skill[,present]` rows into new players.
pub fn parse_csv_players<R: Read>(reader: R) -> Result<Vec<Player>, StoreError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut players = Vec::new();
    for row in rdr.deserialize::<CsvRow>() {
        let row = row.map_err(|e| StoreError::Validation(e.to_string()))?;
        let name = row.name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation("empty player name".into()));
        }
        let mut p = Player::new(name, row.skill);
        p.present = row.present.unwrap_or(false);
        players.push(p);
    }
    Ok(players)
}

impl RosterStore for InMemoryRoster {
    fn list(&self) -> Result<Vec<Player>, StoreError> {
        Ok(self.read()?.clone())
    }

    fn batch_update(&self, updates: &[PlayerUpdate]) -> Result<usize, StoreError> {
        if let Some(bad) = updates.iter().find(|u| u.fields.is_empty()) {
            return Err(StoreError::Validation(format!("no fields to update for {}", bad.id)));
        }
        let mut g = self.write()?;
        let index: HashMap<PlayerId, usize> =
            g.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
        let mut applied = 0;
        for u in updates {
            match index.get(&u.id) {
                Some(&i) => {
                    u.fields.apply(&mut g[i]);
                    applied += 1;
                }
                None => log::warn!("Skipping update for unknown player {}", u.id),
            }
        }
        Ok(applied)
    }

    fn upsert(&self, players: Vec<Player>) -> Result<Vec<Player>, StoreError> {
        let mut g = self.write()?;
        for p in &players {
            match g.iter().position(|x| x.id == p.id) {
                Some(i) => g[i] = p.clone(),
                None => g.push(p.clone()),
            }
        }
        Ok(players)
    }

    fn delete(&self, ids: &[PlayerId]) -> Result<(), StoreError> {
        let mut g = self.write()?;
        if let Some(missing) = ids.iter().find(|id| !g.iter().any(|p| p.id == **id)) {
            return Err(StoreError::NotFound(*missing));
        }
        g.retain(|p| !ids.contains(&p.id));
        Ok(())
    }
}
