//! Folder naming and MME metadata emission for crash-test data entry.
//!
//! Takes finished test records plus the vehicle records and lays out, per
//! test, a uniquely named folder with `Channel`/`Movie` subfolders and a
//! tab-separated `.mme` description file.

pub mod batch;
pub mod mme;
pub mod model;
pub mod naming;
pub mod prelude;
pub mod telemetry;

pub use batch::{emit_batch, BatchFailure, BatchReport, EmittedTest, Emitter};
pub use prelude::{BatchPolicy, EmitError, EmitResult, EmitterConfig, MmeHeader};
