pub mod record;
pub mod vehicle;

pub use record::{
    format_number, DisplayColumn, FieldValue, Robustness, RobustnessLayer, TestList, TestRecord,
    TestRecordBuilder, NAME_KEY,
};
pub use vehicle::{Point, Profile, VehicleDimensions, VehicleInfo};
