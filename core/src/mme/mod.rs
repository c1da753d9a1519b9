pub mod writer;

pub use writer::{format_points, MmeWriter, LINE_COUNT, MME_EXTENSION, NO_VALUE, TIMESTAMP_FORMAT};
