/// Result alias used across the engine.
pub type BattleResult<T> = Result<T, BattleError>;

/// Fatal errors surfaced to callers of the viewer and the preparation passes.
#[derive(thiserror::Error, Debug)]
pub enum BattleError {
    /// The dataset is structurally unusable; no engine state was installed.
    #[error("dataset validation error: {0}")]
    Validation(String),

    /// `go_to_scene` was called with an index outside `[0, count)`.
    #[error("scene index {index} is out of range (scene count {count})")]
    SceneIndexOutOfRange {
        /// Requested scene index.
        index: usize,
        /// Number of scenes in the loaded dataset.
        count: usize,
    },

    /// The render surface cannot project geographic coordinates.
    #[error("projection unavailable: render surface has no geographic projector")]
    ProjectionUnavailable,

    /// A navigation call was made before any battle was loaded.
    #[error("no battle loaded")]
    NoBattleLoaded,

    /// Dataset or config (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Opaque upstream error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BattleError {
    /// Build a [`BattleError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BattleError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// Recoverable data defects. These are logged and reported, never raised.
#[derive(thiserror::Error, Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataIntegrityWarning {
    /// A troop snapshot had no `status`; treated as active.
    #[error("scene {scene_id}: troop '{troop_id}' has no status, treating as active")]
    MissingStatus {
        /// Scene id as declared in the dataset.
        scene_id: u32,
        /// Troop id.
        troop_id: String,
    },

    /// A troop snapshot had an unrecognised `status`; treated as active.
    #[error("scene {scene_id}: troop '{troop_id}' has invalid status {raw:?}, treating as active")]
    InvalidStatus {
        /// Scene id as declared in the dataset.
        scene_id: u32,
        /// Troop id.
        troop_id: String,
        /// The raw value found in the dataset.
        raw: String,
    },

    /// Scene ids are expected to ascend in narrative order.
    #[error("scene {scene_id} does not follow scene {previous} in ascending order")]
    NonAscendingSceneId {
        /// Offending scene id.
        scene_id: u32,
        /// Id of the scene before it.
        previous: u32,
    },

    /// A scene declared an empty troop list.
    #[error("scene {scene_id} has no troops")]
    EmptyScene {
        /// Scene id.
        scene_id: u32,
    },

    /// The same troop id appeared twice in one scene; the later snapshot was dropped.
    #[error("scene {scene_id}: duplicate troop '{troop_id}' dropped")]
    DuplicateTroop {
        /// Scene id.
        scene_id: u32,
        /// Troop id.
        troop_id: String,
    },

    /// A troop declared a head-count of zero.
    #[error("scene {scene_id}: troop '{troop_id}' has zero size")]
    ZeroSize {
        /// Scene id.
        scene_id: u32,
        /// Troop id.
        troop_id: String,
    },
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
