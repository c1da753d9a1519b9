use crate::workflow::manifest::PreparedBatch;
use anyhow::Context;
use mmecore::naming::{FolderPlanner, ResolvedFolder};
use mmecore::{BatchReport, Emitter, EmitterConfig};
use std::path::Path;

#[derive(Clone)]
pub struct Runner {
    config: EmitterConfig,
}

impl Runner {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    /// Folders the batch would create, without touching the disk.
    pub fn plan(&self, root: &Path, batch: &PreparedBatch) -> anyhow::Result<Vec<ResolvedFolder>> {
        let mut planner =
            FolderPlanner::new(&self.config, root).context("configuring folder planner")?;
        Ok(batch
            .tests
            .iter()
            .map(|test| planner.plan(&batch.info, test))
            .collect())
    }

    pub fn execute(&self, root: &Path, batch: &PreparedBatch) -> anyhow::Result<BatchReport> {
        let emitter = Emitter::new(self.config.clone()).context("configuring emitter")?;
        let report = emitter
            .emit_batch(root, &batch.tests, &batch.dimensions, &batch.info)
            .with_context(|| format!("emitting batch under {}", root.display()))?;
        Ok(report)
    }
}
