use crate::model::{TestRecord, VehicleDimensions, VehicleInfo};
use crate::mme::MmeWriter;
use crate::naming::FolderResolver;
use crate::prelude::{BatchPolicy, Clock, EmitError, EmitResult, EmitterConfig, LocalClock};
use crate::telemetry::LogManager;
use std::path::{Path, PathBuf};

/// Folder and file produced for one test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedTest {
    pub index: usize,
    pub name: String,
    pub folder: PathBuf,
    pub mme_path: PathBuf,
}

/// A test that could not be emitted.
#[derive(Debug)]
pub struct BatchFailure {
    pub index: usize,
    pub name: String,
    pub error: EmitError,
}

/// Outcome of one `emit_batch` call.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub emitted: Vec<EmittedTest>,
    pub failures: Vec<BatchFailure>,
    /// Set when [`BatchPolicy::AbortOnFirstError`] stopped the batch early.
    pub aborted: bool,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.aborted
    }

    pub fn summary(&self) -> String {
        let mut text = format!(
            "{} emitted, {} failed",
            self.emitted.len(),
            self.failures.len()
        );
        if self.aborted {
            text.push_str(", aborted");
        }
        text
    }
}

/// Creates the folder tree and MME file for every test of a batch.
pub struct Emitter<C: Clock = LocalClock> {
    config: EmitterConfig,
    clock: C,
    logger: LogManager,
}

impl Emitter<LocalClock> {
    pub fn new(config: EmitterConfig) -> EmitResult<Self> {
        Self::with_clock(config, LocalClock)
    }
}

impl<C: Clock> Emitter<C> {
    pub fn with_clock(config: EmitterConfig, clock: C) -> EmitResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            logger: LogManager::new(),
        })
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Emits a single test. Directories created before a failure are kept.
    pub fn emit_test(
        &self,
        root: &Path,
        index: usize,
        test: &TestRecord,
        dimensions: &VehicleDimensions,
        info: &VehicleInfo,
    ) -> EmitResult<EmittedTest> {
        let resolver = FolderResolver::new(&self.config)?;
        let folder = resolver.create(root, info, test)?;
        let writer = MmeWriter::new(&self.config.header, &self.clock);
        let mme_path = writer.write(&folder, test, dimensions, info)?;
        Ok(EmittedTest {
            index,
            name: test.name().to_string(),
            folder: folder.path,
            mme_path,
        })
    }

    /// Emits every test in list order.
    ///
    /// Failures are collected in the report. With
    /// [`BatchPolicy::AbortOnFirstError`] the batch stops after the first one
    /// and the report is marked aborted; tests emitted before it stay listed.
    pub fn emit_batch<'t>(
        &self,
        root: &Path,
        tests: impl IntoIterator<Item = &'t TestRecord>,
        dimensions: &VehicleDimensions,
        info: &VehicleInfo,
    ) -> EmitResult<BatchReport> {
        let mut report = BatchReport::default();
        for (index, test) in tests.into_iter().enumerate() {
            match self.emit_test(root, index, test, dimensions, info) {
                Ok(emitted) => {
                    self.logger.record(&format!(
                        "test {} ({}) -> {}",
                        index,
                        emitted.name,
                        emitted.folder.display()
                    ));
                    report.emitted.push(emitted);
                }
                Err(error) => {
                    self.logger
                        .warn(&format!("test {} ({}) failed: {}", index, test.name(), error));
                    report.failures.push(BatchFailure {
                        index,
                        name: test.name().to_string(),
                        error,
                    });
                    if self.config.policy == BatchPolicy::AbortOnFirstError {
                        report.aborted = true;
                        break;
                    }
                }
            }
        }

        self.logger
            .record(&format!("batch finished: {}", report.summary()));
        Ok(report)
    }
}

/// Emits `tests` under `root` with the default configuration and local clock.
pub fn emit_batch<'t>(
    root: impl AsRef<Path>,
    tests: impl IntoIterator<Item = &'t TestRecord>,
    dimensions: &VehicleDimensions,
    info: &VehicleInfo,
) -> EmitResult<BatchReport> {
    Emitter::new(EmitterConfig::default())?.emit_batch(root.as_ref(), tests, dimensions, info)
}
