use crate::model::{format_number, Point, TestRecord, VehicleDimensions, VehicleInfo};
use crate::naming::ResolvedFolder;
use crate::prelude::{Clock, EmitError, EmitResult, MmeHeader};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Written in place of any optional record field that is missing.
pub const NO_VALUE: &str = "NOVALUE";

pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d,%H:%M";

pub const MME_EXTENSION: &str = "mme";

/// Number of lines in every MME file.
pub const LINE_COUNT: usize = 32;

/// Run repetition is not tracked yet; every run is the first.
const RUN_REPETITION: &str = "1";
const DRIVER_POSITION: &str = "1";

/// Renders a test as `label\tvalue` lines and writes the `.mme` file.
pub struct MmeWriter<'a> {
    header: &'a MmeHeader,
    clock: &'a dyn Clock,
}

impl<'a> MmeWriter<'a> {
    pub fn new(header: &'a MmeHeader, clock: &'a dyn Clock) -> Self {
        Self { header, clock }
    }

    pub fn lines(
        &self,
        test: &TestRecord,
        dimensions: &VehicleDimensions,
        info: &VehicleInfo,
    ) -> Vec<String> {
        let field = |key: &str| {
            test.field(key)
                .map(|value| value.to_string())
                .unwrap_or_else(|| NO_VALUE.to_string())
        };
        let timestamp = self.clock.now().format(TIMESTAMP_FORMAT).to_string();
        let profile = &dimensions.profile;
        let overhang = dimensions
            .front_overhang
            .map(format_number)
            .unwrap_or_else(|| NO_VALUE.to_string());

        let entries: Vec<(&str, String)> = vec![
            ("Data format edition number", self.header.edition.clone()),
            ("Laboratory name", self.header.laboratory.clone()),
            ("Customer name", self.header.customer.clone()),
            ("Customer project ref. number", info.number.clone()),
            (
                "Title",
                format!("{} {}", self.header.title_prefix, info.year),
            ),
            ("Timestamp", timestamp),
            ("Scenario", test.name().to_string()),
            ("Type of the test", field("test_type")),
            ("Condition of test", field("test_condition")),
            ("Run repetition", RUN_REPETITION.to_string()),
            ("Region", self.header.region.clone()),
            ("Robustness Layer", test.robustness().describe()),
            ("Name of test object 1", info.display_name()),
            ("Driver Position object 1", DRIVER_POSITION.to_string()),
            ("Ref. number of test object 1", info.vin.clone()),
            ("S/W version of TOB 1", info.sw_version.clone()),
            (
                "Dimensions of TOB 1",
                format!(
                    "{},{}",
                    format_number(dimensions.length),
                    format_number(dimensions.width)
                ),
            ),
            ("Shape Front TOB 1", format_points(profile.front())),
            ("Shape Left Side TOB 1", format_points(profile.left())),
            ("Shape Rear TOB 1", format_points(profile.back())),
            ("Shape Right Side TOB 1", format_points(profile.right())),
            ("Front overhang TOB 1", overhang),
            ("Velocity longitudinal TOB 1", field("long_speed_VUT")),
            ("Velocity lateral TOB 1", field("lat_speed_VUT")),
            ("Impact side TOB 1", field("impact_side")),
            ("Impact location of test object 1", field("overlap")),
            ("Driver State TOB 1", NO_VALUE.to_string()),
            ("Name of test object 2", field("target_type")),
            ("Velocity test object 2", field("target_speed")),
            ("Acceleration test object 2", field("target_acceleration")),
            ("Heading test object 2", field("target_heading")),
            ("Type of data source", self.header.data_source.clone()),
        ];

        entries
            .into_iter()
            .map(|(label, value)| format!("{}:\t{}", label, value))
            .collect()
    }

    /// Writes `<leaf>.mme` into the resolved folder, replacing any existing file.
    pub fn write(
        &self,
        folder: &ResolvedFolder,
        test: &TestRecord,
        dimensions: &VehicleDimensions,
        info: &VehicleInfo,
    ) -> EmitResult<PathBuf> {
        let path = folder
            .path
            .join(format!("{}.{}", folder.leaf_name, MME_EXTENSION));
        let file = File::create(&path).map_err(|err| EmitError::io(&path, err))?;
        let mut writer = BufWriter::new(file);
        for line in self.lines(test, dimensions, info) {
            writeln!(writer, "{}", line).map_err(|err| EmitError::io(&path, err))?;
        }
        writer.flush().map_err(|err| EmitError::io(&path, err))?;
        Ok(path)
    }
}

/// `(x1;y1), (x2;y2), ...` in stored order.
pub fn format_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("({};{})", format_number(p.x), format_number(p.y)))
        .collect::<Vec<_>>()
        .join(", ")
}
