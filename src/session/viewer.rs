use crate::{
    foundation::error::{BattleError, BattleResult},
    render::surface::RenderSurface,
    scene::model::{BattleDataset, Scene},
    session::{
        config::EngineConfig,
        director::{Admission, AnimationDirector, TransitionReport},
        prepare::{LoadReport, prepare_dataset},
        reconcile::reconcile,
        store::UnitStateStore,
    },
};

/// Host-facing navigation over one loaded battle.
///
/// Owns the render surface, the unit state store and the animation director. Navigation calls
/// return once their transition has settled on the surface.
pub struct BattleViewer<S> {
    surface: S,
    config: EngineConfig,
    dataset: Option<BattleDataset>,
    store: UnitStateStore,
    director: AnimationDirector,
    current: Option<usize>,
}

impl<S: RenderSurface> BattleViewer<S> {
    /// Viewer with nothing loaded.
    pub fn new(surface: S, config: EngineConfig) -> Self {
        let director = AnimationDirector::new(config.director);
        Self {
            surface,
            config,
            dataset: None,
            store: UnitStateStore::new(),
            director,
            current: None,
        }
    }

    /// The host surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Engine configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Last committed state of every rendered unit.
    pub fn store(&self) -> &UnitStateStore {
        &self.store
    }

    /// The transition director, for phase and queue inspection.
    pub fn director(&self) -> &AnimationDirector {
        &self.director
    }

    /// The prepared dataset, once loaded.
    pub fn dataset(&self) -> Option<&BattleDataset> {
        self.dataset.as_ref()
    }

    /// Index of the last scene whose transition settled.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Scene at [`BattleViewer::current_index`].
    pub fn current_scene(&self) -> Option<&Scene> {
        self.dataset.as_ref()?.scene(self.current?)
    }

    /// Number of scenes in the loaded battle; zero before a load.
    pub fn scene_count(&self) -> usize {
        self.dataset.as_ref().map_or(0, BattleDataset::scene_count)
    }

    /// Prepare and install `dataset`, replacing any loaded battle.
    ///
    /// Nothing is drawn; the first navigation call renders. A dataset that fails validation
    /// leaves the viewer exactly as it was.
    #[tracing::instrument(skip_all)]
    pub fn load_battle(&mut self, mut dataset: BattleDataset) -> BattleResult<LoadReport> {
        let report = prepare_dataset(&mut dataset, &self.config)?;

        self.director.abort();
        self.store.reset_all();
        self.surface.clear_all();
        self.current = None;
        tracing::info!(
            scenes = dataset.scene_count(),
            warnings = report.warnings.len(),
            layout_adjustments = report.layout.adjustments.len(),
            "battle loaded"
        );
        self.dataset = Some(dataset);
        Ok(report)
    }

    /// Queue a transition without driving it. See [`BattleViewer::settle`].
    pub fn request_scene(&mut self, index: usize) -> BattleResult<Admission> {
        let count = self.loaded()?.scene_count();
        if index >= count {
            return Err(BattleError::SceneIndexOutOfRange { index, count });
        }
        Ok(self.director.request(index))
    }

    /// Drive queued transitions until none is in flight; returns the last report.
    ///
    /// A failing transition drops everything queued behind it.
    pub async fn settle(&mut self) -> BattleResult<Option<TransitionReport>> {
        let mut last = None;
        while let Some(index) = self.director.in_flight() {
            match self.run_transition(index).await {
                Ok(report) => {
                    last = Some(report);
                    self.director.finish();
                }
                Err(e) => {
                    self.director.abort();
                    return Err(e);
                }
            }
        }
        Ok(last)
    }

    /// Transition to scene `index` and wait for it to settle.
    pub async fn go_to_scene(&mut self, index: usize) -> BattleResult<TransitionReport> {
        self.request_scene(index)?;
        self.settle().await?.ok_or_else(|| {
            BattleError::Other(anyhow::anyhow!(
                "scene {index} was requested but no transition ran"
            ))
        })
    }

    /// Advance one scene; before the first render this shows scene 0. `None` at the last scene.
    pub async fn next_scene(&mut self) -> BattleResult<Option<TransitionReport>> {
        let count = self.loaded()?.scene_count();
        let target = match self.current {
            None => 0,
            Some(i) if i + 1 < count => i + 1,
            Some(_) => return Ok(None),
        };
        self.go_to_scene(target).await.map(Some)
    }

    /// Step back one scene. `None` at scene 0 or before the first render.
    pub async fn previous_scene(&mut self) -> BattleResult<Option<TransitionReport>> {
        self.loaded()?;
        match self.current {
            Some(i) if i > 0 => self.go_to_scene(i - 1).await.map(Some),
            _ => Ok(None),
        }
    }

    fn loaded(&self) -> BattleResult<&BattleDataset> {
        self.dataset.as_ref().ok_or(BattleError::NoBattleLoaded)
    }

    async fn run_transition(&mut self, index: usize) -> BattleResult<TransitionReport> {
        let dataset = self.dataset.as_ref().ok_or(BattleError::NoBattleLoaded)?;
        if self.surface.projector().is_none() {
            return Err(BattleError::ProjectionUnavailable);
        }
        if index == 0 {
            self.store.reset_all();
        }

        let plan = reconcile(dataset, index, &self.store, self.config.default_facing_deg)?;
        let report = self
            .director
            .play(&self.surface, &plan, dataset, &mut self.store)
            .await?;
        self.current = Some(index);

        tracing::info!(
            scene_index = index,
            scene_id = report.scene_id,
            units = report.units_drawn,
            arrows = report.arrows,
            suppressed = report.suppressed.len(),
            "scene transition settled"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/viewer.rs"]
mod tests;
