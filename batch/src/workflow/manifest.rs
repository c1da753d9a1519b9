use anyhow::{bail, Context};
use mmecore::model::{
    FieldValue, Point, Profile, Robustness, TestList, TestRecord, VehicleDimensions, VehicleInfo,
};
use mmecore::EmitterConfig;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Unit the manifest geometry is authored in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Mm,
    Cm,
    M,
}

impl LengthUnit {
    pub fn to_millimetres(self, value: f64) -> f64 {
        match self {
            LengthUnit::Mm => value,
            LengthUnit::Cm => value * 10.0,
            LengthUnit::M => value * 1000.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProfileSpec {
    #[serde(default)]
    pub front: Vec<[f64; 2]>,
    #[serde(default)]
    pub right: Vec<[f64; 2]>,
    #[serde(default)]
    pub back: Vec<[f64; 2]>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DimensionsSpec {
    pub length: f64,
    pub width: f64,
    #[serde(default)]
    pub front_overhang: Option<f64>,
    pub profile: ProfileSpec,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SelectionSpec {
    pub key: String,
    pub value: FieldValue,
    /// Display text; defaults to the rendered value.
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RobustnessSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub layer: Option<String>,
    #[serde(default)]
    pub parameter: Option<FieldValue>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TestSpec {
    pub name: String,
    pub macro_type: String,
    #[serde(default)]
    pub fixed: BTreeMap<String, FieldValue>,
    #[serde(default)]
    pub selected: Vec<SelectionSpec>,
    pub robustness: RobustnessSpec,
}

/// Everything needed to emit one batch, as written by hand or exported by the UI.
#[derive(Clone, Debug, Deserialize)]
pub struct BatchManifest {
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub units: LengthUnit,
    pub vehicle: VehicleInfo,
    pub dimensions: DimensionsSpec,
    #[serde(default)]
    pub tests: Vec<TestSpec>,
    #[serde(default)]
    pub emitter: EmitterConfig,
}

/// Records ready to hand to the emitter.
pub struct PreparedBatch {
    pub tests: TestList,
    pub dimensions: VehicleDimensions,
    pub info: VehicleInfo,
}

impl BatchManifest {
    /// Reads JSON when the extension is `.json`, YAML otherwise.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading batch manifest {}", path_ref.display()))?;
        let is_json = path_ref
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let manifest: BatchManifest = if is_json {
            serde_json::from_str(&contents)
                .with_context(|| format!("parsing batch manifest {}", path_ref.display()))?
        } else {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("parsing batch manifest {}", path_ref.display()))?
        };
        Ok(manifest)
    }

    pub fn prepare(&self) -> anyhow::Result<PreparedBatch> {
        let mut tests = TestList::new();
        for (index, spec) in self.tests.iter().enumerate() {
            let record = build_record(spec)
                .with_context(|| format!("building test {} ({})", index, spec.name))?;
            tests.push(record);
        }

        Ok(PreparedBatch {
            tests,
            dimensions: self.dimensions_in_mm(),
            info: self.vehicle.clone(),
        })
    }

    fn dimensions_in_mm(&self) -> VehicleDimensions {
        let unit = self.units;
        let convert = |points: &[[f64; 2]]| -> Vec<Point> {
            points
                .iter()
                .map(|[x, y]| Point::new(unit.to_millimetres(*x), unit.to_millimetres(*y)))
                .collect()
        };
        let spec = &self.dimensions;
        VehicleDimensions {
            length: unit.to_millimetres(spec.length),
            width: unit.to_millimetres(spec.width),
            front_overhang: spec.front_overhang.map(|v| unit.to_millimetres(v)),
            profile: Profile::from_authored(
                convert(&spec.profile.front),
                convert(&spec.profile.right),
                convert(&spec.profile.back),
            ),
        }
    }
}

fn build_robustness(spec: &RobustnessSpec) -> anyhow::Result<Robustness> {
    match (&spec.layer, &spec.parameter) {
        (None, None) => Ok(Robustness::new(spec.kind.clone())),
        (Some(layer), None) => Ok(Robustness::with_layer(spec.kind.clone(), layer.clone())),
        (Some(layer), Some(parameter)) => Ok(Robustness::with_parameter(
            spec.kind.clone(),
            layer.clone(),
            parameter.clone(),
        )),
        (None, Some(_)) => bail!(
            "robustness {} has a parameter but no layer",
            spec.kind
        ),
    }
}

fn build_record(spec: &TestSpec) -> anyhow::Result<TestRecord> {
    let mut builder = TestRecord::builder(spec.name.clone(), spec.macro_type.clone());
    for (key, value) in &spec.fixed {
        builder = builder.fixed(key.clone(), value.clone());
    }
    for selection in &spec.selected {
        let label = selection
            .label
            .clone()
            .unwrap_or_else(|| selection.value.to_string());
        builder = builder.selected(selection.key.clone(), selection.value.clone(), label);
    }
    let record = builder.robustness(build_robustness(&spec.robustness)?).build()?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    const YAML: &str = r#"
units: m
vehicle:
  year: "2024"
  number: "12345"
  oem: OEM1
  make: Acme
  model: X1
  vin: VIN1
  sw_version: "1.0"
dimensions:
  length: 4.5
  width: 1.8
  front_overhang: 0.9
  profile:
    front: [[0.0, -0.9], [0.0, 0.9]]
    right: [[0.1, 0.9], [4.0, 0.88]]
    back: [[4.5, -0.85], [4.5, 0.85]]
tests:
  - name: ELK
    macro_type: AEBC
    fixed:
      test_type: LSS
    selected:
      - key: speed
        value: 50
      - key: overlap
        value: N/A
    robustness:
      type: Speed
      layer: Layer 1
      parameter: 2
emitter:
  replacement: "_"
"#;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::TempPath {
        let mut temp = Builder::new().suffix(suffix).tempfile().unwrap();
        temp.write_all(contents.as_bytes()).unwrap();
        temp.into_temp_path()
    }

    #[test]
    fn manifest_load_reads_yaml_and_converts_units() {
        let path = write_temp(".yaml", YAML);
        let manifest = BatchManifest::load(&path).unwrap();
        assert_eq!(manifest.units, LengthUnit::M);
        assert_eq!(manifest.emitter.replacement, "_");

        let batch = manifest.prepare().unwrap();
        assert_eq!(batch.dimensions.length, 4500.0);
        assert_eq!(batch.dimensions.front_overhang, Some(900.0));
        assert_eq!(batch.dimensions.profile.right()[0], Point::new(100.0, 900.0));
        assert_eq!(batch.dimensions.profile.left()[0], Point::new(4000.0, -880.0));

        let record = batch.tests.get(0).unwrap();
        let texts: Vec<_> = record
            .display_columns()
            .iter()
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(texts, vec!["ELK", "50", "N/A"]);
        assert_eq!(record.robustness().describe(), "Speed;Layer 1;2");
    }

    #[test]
    fn manifest_load_reads_json_by_extension() {
        let json = r#"{
            "vehicle": {"year": "2023", "number": "9", "oem": "O", "model": "M",
                        "vin": "V", "sw_version": "2"},
            "dimensions": {"length": 4000, "width": 1700, "profile": {}},
            "tests": [{"name": "CCRs", "macro_type": "AEBC",
                       "robustness": {"type": "None"}}]
        }"#;
        let path = write_temp(".json", json);
        let manifest = BatchManifest::load(&path).unwrap();
        assert_eq!(manifest.units, LengthUnit::Mm);
        let batch = manifest.prepare().unwrap();
        assert_eq!(batch.tests.len(), 1);
        assert_eq!(batch.info.make, "");
        assert!(batch.dimensions.front_overhang.is_none());
    }

    #[test]
    fn bundled_sample_manifest_prepares() {
        let manifest: BatchManifest =
            serde_yaml::from_str(include_str!("../../manifests/sample.yaml")).unwrap();
        let batch = manifest.prepare().unwrap();
        assert_eq!(batch.tests.len(), 2);
        assert_eq!(batch.dimensions.profile.left().len(), 3);
        let elk = batch.tests.get(1).unwrap();
        assert_eq!(elk.display_columns()[2].text, "N/A");
    }

    #[test]
    fn fixed_name_override_is_rejected() {
        let yaml = YAML.replace("test_type: LSS", "name: Other");
        let manifest: BatchManifest = serde_yaml::from_str(&yaml).unwrap();
        assert!(manifest.prepare().is_err());
    }

    #[test]
    fn parameter_without_layer_is_rejected() {
        let spec = RobustnessSpec {
            kind: "Speed".into(),
            layer: None,
            parameter: Some(FieldValue::Integer(1)),
        };
        assert!(build_robustness(&spec).is_err());
    }

    #[test]
    fn unit_conversion_scales_to_millimetres() {
        assert_eq!(LengthUnit::Cm.to_millimetres(45.0), 450.0);
        assert_eq!(LengthUnit::M.to_millimetres(1.8), 1800.0);
        assert_eq!(LengthUnit::Mm.to_millimetres(12.5), 12.5);
    }
}
