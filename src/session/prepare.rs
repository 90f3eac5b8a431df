use crate::{
    foundation::error::{BattleResult, DataIntegrityWarning},
    normalize::{
        coords::{NormalizeReport, normalize_coordinates},
        layout::{LayoutReport, correct_layout},
    },
    scene::model::BattleDataset,
    session::config::EngineConfig,
};

/// What preparation found and changed in a dataset.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct LoadReport {
    /// Repairs made by sanitizing.
    pub warnings: Vec<DataIntegrityWarning>,
    /// `None` when the dataset had no troops to rescale.
    pub normalize: Option<NormalizeReport>,
    /// Flank and cavalry corrections.
    pub layout: LayoutReport,
}

/// Validate, sanitize, normalize and lay out `dataset` in place.
///
/// Fails on an unusable config or dataset; on error the dataset has not been modified.
#[tracing::instrument(skip_all)]
pub fn prepare_dataset(
    dataset: &mut BattleDataset,
    config: &EngineConfig,
) -> BattleResult<LoadReport> {
    config.validate()?;
    dataset.validate()?;
    let warnings = dataset.sanitize();
    let normalize = normalize_coordinates(dataset, &config.normalize);
    let layout = correct_layout(dataset, &config.layout);
    Ok(LoadReport {
        warnings,
        normalize,
        layout,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/session/prepare.rs"]
mod tests;
