use std::collections::HashSet;

use crate::{
    foundation::error::{BattleError, BattleResult, DataIntegrityWarning},
    scene::model::{Army, BattleDataset, DeclaredStatus, TroopStatus},
};

impl BattleDataset {
    /// Check the structural requirements that make a dataset renderable at all.
    ///
    /// Any failure here is fatal for the dataset. Recoverable defects are left for
    /// [`BattleDataset::sanitize`].
    pub fn validate(&self) -> BattleResult<()> {
        let armies = self
            .battle_info
            .armies
            .as_ref()
            .ok_or_else(|| BattleError::validation("battleInfo.armies is missing"))?;
        if armies.len() < 2 {
            return Err(BattleError::validation(format!(
                "at least two armies are required, found {}",
                armies.len()
            )));
        }
        for (side, army) in armies {
            validate_army(side, army)?;
        }

        if self.scenes.is_empty() {
            return Err(BattleError::validation("dataset has no scenes"));
        }

        for scene in &self.scenes {
            let troops = scene.troops.as_ref().ok_or_else(|| {
                BattleError::validation(format!("scene {} is missing 'troops'", scene.id))
            })?;
            for troop in troops {
                if troop.id.trim().is_empty() {
                    return Err(BattleError::validation(format!(
                        "scene {}: troop with empty id",
                        scene.id
                    )));
                }
                if !armies.contains_key(&troop.side) {
                    return Err(BattleError::validation(format!(
                        "scene {}: troop '{}' references unknown army side '{}'",
                        scene.id, troop.id, troop.side
                    )));
                }
                let coords = [
                    troop.position.lat,
                    troop.position.lng,
                    troop.movement.to.lat,
                    troop.movement.to.lng,
                ];
                if coords.iter().any(|c| !c.is_finite()) {
                    return Err(BattleError::validation(format!(
                        "scene {}: troop '{}' has non-finite coordinates",
                        scene.id, troop.id
                    )));
                }
            }
        }

        Ok(())
    }

    /// Repair recoverable defects in place and report each one.
    ///
    /// Missing or unrecognised statuses become `active`, later duplicates of a troop id within
    /// one scene are dropped. Ordering, empty scenes and zero sizes are only reported.
    pub fn sanitize(&mut self) -> Vec<DataIntegrityWarning> {
        let mut warnings = Vec::new();
        let mut previous_id: Option<u32> = None;

        for scene in &mut self.scenes {
            let scene_id = scene.id;
            if let Some(prev) = previous_id
                && scene_id <= prev
            {
                warnings.push(DataIntegrityWarning::NonAscendingSceneId {
                    scene_id,
                    previous: prev,
                });
            }
            previous_id = Some(scene_id);

            let Some(troops) = scene.troops.as_mut() else {
                continue;
            };
            if troops.is_empty() {
                warnings.push(DataIntegrityWarning::EmptyScene { scene_id });
            }

            let mut seen = HashSet::new();
            troops.retain(|t| {
                if seen.insert(t.id.clone()) {
                    true
                } else {
                    warnings.push(DataIntegrityWarning::DuplicateTroop {
                        scene_id,
                        troop_id: t.id.clone(),
                    });
                    false
                }
            });

            for troop in troops.iter_mut() {
                match &troop.status {
                    DeclaredStatus::Known(_) => {}
                    DeclaredStatus::Missing => {
                        warnings.push(DataIntegrityWarning::MissingStatus {
                            scene_id,
                            troop_id: troop.id.clone(),
                        });
                        troop.status = DeclaredStatus::Known(TroopStatus::Active);
                    }
                    DeclaredStatus::Invalid(raw) => {
                        warnings.push(DataIntegrityWarning::InvalidStatus {
                            scene_id,
                            troop_id: troop.id.clone(),
                            raw: raw.clone(),
                        });
                        troop.status = DeclaredStatus::Known(TroopStatus::Active);
                    }
                }
                if troop.size == 0 {
                    warnings.push(DataIntegrityWarning::ZeroSize {
                        scene_id,
                        troop_id: troop.id.clone(),
                    });
                }
            }
        }

        for w in &warnings {
            tracing::warn!(warning = %w, "battle data integrity");
        }
        warnings
    }
}

fn validate_army(side: &str, army: &Army) -> BattleResult<()> {
    let missing = |field: &str| {
        BattleError::validation(format!(
            "army '{side}' is missing required display field '{field}'"
        ))
    };
    if army.name.as_deref().is_none_or(|s| s.trim().is_empty()) {
        return Err(missing("name"));
    }
    if army.color.as_deref().is_none_or(|s| s.trim().is_empty()) {
        return Err(missing("color"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/validate.rs"]
mod tests;
