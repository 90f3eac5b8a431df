use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::foundation::{
    core::GeoPoint,
    error::{BattleError, BattleResult},
};

/// A complete battle as delivered by the upstream generator.
///
/// Collections the validator must be able to report as *missing* are optional here, so a
/// structurally incomplete document still deserializes and fails in
/// [`BattleDataset::validate`](crate::BattleDataset::validate) with a precise message.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleDataset {
    /// Narrative background shown before the first scene.
    #[serde(default)]
    pub historical_context: String,
    /// Date, place and the armies taking part.
    #[serde(default)]
    pub battle_info: BattleInfo,
    /// Scenes in narrative order.
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

/// Battle metadata.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleInfo {
    /// Free-form date text.
    #[serde(default)]
    pub date: String,
    /// Where the battle took place; its coordinates centre the viewport.
    #[serde(default)]
    pub location: Location,
    /// Armies keyed by side identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armies: Option<BTreeMap<String, Army>>,
}

/// Named battle site.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Location {
    /// Place name.
    #[serde(default)]
    pub name: String,
    /// Site coordinates.
    #[serde(default)]
    pub coordinates: GeoPoint,
}

/// One army side, keyed in [`BattleInfo::armies`] by the identifier troops use in `side`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Army {
    /// Display name; required by validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Total strength.
    #[serde(default)]
    pub total: u32,
    /// Infantry strength.
    #[serde(default)]
    pub infantry: u32,
    /// Cavalry strength.
    #[serde(default)]
    pub cavalry: u32,
    /// Fill colour of this army's unit markers, e.g. `#e63946`; required by validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Commanding officer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commander: Option<String>,
}

/// One narrative frame: a snapshot of every troop at that point of the battle.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Scene {
    /// Declared id, expected to ascend.
    pub id: u32,
    /// Short heading.
    #[serde(default)]
    pub title: String,
    /// Narrative text.
    #[serde(default)]
    pub description: String,
    /// Troop snapshots; `None` when the field is missing, which validation rejects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub troops: Option<Vec<Troop>>,
}

impl Scene {
    /// Troop snapshots of this scene; empty when the list is missing.
    pub fn troops(&self) -> &[Troop] {
        self.troops.as_deref().unwrap_or(&[])
    }

    /// Snapshot of troop `id` in this scene.
    pub fn troop(&self, id: &str) -> Option<&Troop> {
        self.troops().iter().find(|t| t.id == id)
    }
}

/// One formation in one scene.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Troop {
    /// Stable id across scenes.
    pub id: String,
    /// Key into [`BattleInfo::armies`].
    pub side: String,
    /// Arm of service, from the `type` field.
    #[serde(rename = "type")]
    pub kind: UnitKind,
    /// Display name; may be empty.
    #[serde(default)]
    pub name: String,
    /// Head-count; drives marker radius.
    #[serde(default)]
    pub size: u32,
    /// Status as delivered; see [`Troop::status`] for the effective value.
    #[serde(default, skip_serializing_if = "DeclaredStatus::is_missing")]
    pub status: DeclaredStatus,
    /// Position at the start of the scene.
    pub position: GeoPoint,
    /// Where the troop heads during the scene.
    pub movement: Movement,
}

impl Troop {
    /// Name for labels, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Effective status; missing or unrecognised values count as active.
    pub fn status(&self) -> TroopStatus {
        match self.status {
            DeclaredStatus::Known(s) => s,
            DeclaredStatus::Missing | DeclaredStatus::Invalid(_) => TroopStatus::Active,
        }
    }

    /// `true` unless the movement is static.
    pub fn is_moving(&self) -> bool {
        self.movement.kind != MovementKind::Static
    }
}

/// Destination and manner of a troop's movement within a scene.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    /// Destination; equals the position for static troops.
    pub to: GeoPoint,
    /// Kind of movement, from the `type` field.
    #[serde(rename = "type")]
    pub kind: MovementKind,
}

/// How a troop moves; anything but `Static` gets an arrow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Holds position.
    #[default]
    Static,
    /// Moves towards the enemy.
    Advance,
    /// Falls back; drawn with a red arrow.
    Retreat,
    /// Moves around an enemy flank.
    Flank,
}

/// Effective combat status of a troop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TroopStatus {
    /// Still fighting.
    #[default]
    Active,
    /// Forced to withdraw; fades out while moving and never returns.
    Routed,
    /// Destroyed in place; fades to a residual opacity.
    Defeated,
}

impl TroopStatus {
    /// Routed and defeated units have left the battle for good.
    pub fn is_out_of_battle(self) -> bool {
        matches!(self, Self::Routed | Self::Defeated)
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "routed" => Some(Self::Routed),
            "defeated" => Some(Self::Defeated),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Routed => "routed",
            Self::Defeated => "defeated",
        }
    }
}

/// The `status` field exactly as the generator delivered it.
///
/// Preparation rewrites `Missing` and `Invalid` into `Known(Active)` and reports a warning.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DeclaredStatus {
    /// No `status` field.
    #[default]
    Missing,
    /// A recognised status.
    Known(TroopStatus),
    /// Any other value, kept verbatim for the warning.
    Invalid(String),
}

impl DeclaredStatus {
    /// `true` when the field was absent.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl From<TroopStatus> for DeclaredStatus {
    fn from(s: TroopStatus) -> Self {
        Self::Known(s)
    }
}

impl<'de> Deserialize<'de> for DeclaredStatus {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = Option::<serde_json::Value>::deserialize(d)?;
        Ok(match raw {
            None | Some(serde_json::Value::Null) => Self::Missing,
            Some(serde_json::Value::String(s)) => match TroopStatus::parse(&s) {
                Some(status) => Self::Known(status),
                None => Self::Invalid(s),
            },
            Some(other) => Self::Invalid(other.to_string()),
        })
    }
}

impl Serialize for DeclaredStatus {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Missing => s.serialize_none(),
            Self::Known(status) => s.serialize_str(status.as_str()),
            Self::Invalid(raw) => s.serialize_str(raw),
        }
    }
}

/// Closed classification of the free-form troop `type` string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UnitKind {
    /// Foot soldiers; also `foot`.
    Infantry,
    /// Mounted troops; also `horse`.
    Cavalry,
    /// Guns and siege engines.
    Artillery,
    /// Ships; also `navy` and `fleet`.
    Naval,
    /// Anything else, with the original spelling kept for display.
    Other(String),
}

impl UnitKind {
    /// Canonical lowercase name, or the original text for `Other`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Infantry => "infantry",
            Self::Cavalry => "cavalry",
            Self::Artillery => "artillery",
            Self::Naval => "naval",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for UnitKind {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "infantry" | "foot" => Self::Infantry,
            "cavalry" | "horse" => Self::Cavalry,
            "artillery" => Self::Artillery,
            "naval" | "navy" | "fleet" => Self::Naval,
            _ => Self::Other(raw),
        }
    }
}

impl From<UnitKind> for String {
    fn from(kind: UnitKind) -> Self {
        match kind {
            UnitKind::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl BattleDataset {
    /// Parse a dataset from JSON text. Only syntax and field types are checked here.
    pub fn from_json(s: &str) -> BattleResult<Self> {
        serde_json::from_str(s).map_err(|e| BattleError::serde(e.to_string()))
    }

    /// Read and parse a dataset file.
    pub fn from_path(path: impl AsRef<Path>) -> BattleResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            BattleError::Other(anyhow::Error::new(e).context(format!(
                "read battle dataset '{}'",
                path.display()
            )))
        })?;
        Self::from_json(&text)
    }

    /// Number of scenes.
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Scene at `index` (not id).
    pub fn scene(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    /// Army for a side identifier.
    pub fn army(&self, side: &str) -> Option<&Army> {
        self.battle_info.armies.as_ref()?.get(side)
    }

    /// Every troop snapshot across all scenes, mutably, in scene order.
    pub(crate) fn troops_mut(&mut self) -> impl Iterator<Item = &mut Troop> {
        self.scenes
            .iter_mut()
            .flat_map(|s| s.troops.iter_mut().flatten())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
