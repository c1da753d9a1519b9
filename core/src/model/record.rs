use crate::prelude::{EmitError, EmitResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Scalar captured from the catalog or from a user selection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    /// Plain integers and coded enum values.
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Flag(value) => write!(f, "{}", value),
            FieldValue::Integer(value) => write!(f, "{}", value),
            FieldValue::Float(value) => f.write_str(&format_number(*value)),
            FieldValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// Shortest round-trip decimal; integral values keep a trailing `.0`.
pub fn format_number(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

/// Second level of a robustness refinement.
#[derive(Debug, Clone, PartialEq)]
pub struct RobustnessLayer {
    pub layer: String,
    pub parameter: Option<FieldValue>,
}

/// Robustness refinement chosen from the robustness catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Robustness {
    pub kind: String,
    pub refinement: Option<RobustnessLayer>,
}

impl Robustness {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            refinement: None,
        }
    }

    pub fn with_layer(kind: impl Into<String>, layer: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            refinement: Some(RobustnessLayer {
                layer: layer.into(),
                parameter: None,
            }),
        }
    }

    pub fn with_parameter(
        kind: impl Into<String>,
        layer: impl Into<String>,
        parameter: impl Into<FieldValue>,
    ) -> Self {
        Self {
            kind: kind.into(),
            refinement: Some(RobustnessLayer {
                layer: layer.into(),
                parameter: Some(parameter.into()),
            }),
        }
    }

    /// `type`, `type;layer` or `type;layer;parameter`.
    pub fn describe(&self) -> String {
        let mut text = self.kind.clone();
        if let Some(refinement) = &self.refinement {
            text.push(';');
            text.push_str(&refinement.layer);
            if let Some(parameter) = &refinement.parameter {
                text.push(';');
                text.push_str(&parameter.to_string());
            }
        }
        text
    }
}

/// One `(field key, display text)` column shown for a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayColumn {
    pub key: String,
    pub text: String,
}

impl DisplayColumn {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}

/// A configured test instance. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRecord {
    name: String,
    macro_type: String,
    fields: BTreeMap<String, FieldValue>,
    robustness: Robustness,
    display_columns: Vec<DisplayColumn>,
}

impl TestRecord {
    pub fn builder(name: impl Into<String>, macro_type: impl Into<String>) -> TestRecordBuilder {
        TestRecordBuilder::new(name, macro_type)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn macro_type(&self) -> &str {
        &self.macro_type
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn robustness(&self) -> &Robustness {
        &self.robustness
    }

    pub fn display_columns(&self) -> &[DisplayColumn] {
        &self.display_columns
    }
}

/// Key holding the test name; owned by the builder.
pub const NAME_KEY: &str = "name";

/// Assembles a [`TestRecord`] from fixed catalog parameters and user selections.
#[derive(Debug, Clone)]
pub struct TestRecordBuilder {
    name: String,
    macro_type: String,
    fields: BTreeMap<String, FieldValue>,
    robustness: Option<Robustness>,
    selections: Vec<DisplayColumn>,
    name_overridden: bool,
}

impl TestRecordBuilder {
    pub fn new(name: impl Into<String>, macro_type: impl Into<String>) -> Self {
        let name = name.into();
        let mut fields = BTreeMap::new();
        fields.insert(NAME_KEY.to_string(), FieldValue::Text(name.clone()));
        Self {
            name,
            macro_type: macro_type.into(),
            fields,
            robustness: None,
            selections: Vec::new(),
            name_overridden: false,
        }
    }

    /// Parameter fixed by the catalog; stored but not displayed.
    pub fn fixed(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let key = key.into();
        if key == NAME_KEY {
            self.name_overridden = true;
            return self;
        }
        self.fields.insert(key, value.into());
        self
    }

    /// Parameter picked by the user; stored and shown with its label.
    pub fn selected(
        mut self,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
        label: impl Into<String>,
    ) -> Self {
        let key = key.into();
        if key == NAME_KEY {
            self.name_overridden = true;
            return self;
        }
        self.fields.insert(key.clone(), value.into());
        self.selections.retain(|column| column.key != key);
        self.selections.push(DisplayColumn::new(key, label));
        self
    }

    pub fn robustness(mut self, robustness: Robustness) -> Self {
        self.robustness = Some(robustness);
        self
    }

    pub fn build(self) -> EmitResult<TestRecord> {
        if self.name.trim().is_empty() {
            return Err(EmitError::InvalidRecord("test name is empty".into()));
        }
        if self.macro_type.trim().is_empty() {
            return Err(EmitError::InvalidRecord(format!(
                "test {} has no macro type",
                self.name
            )));
        }
        if self.name_overridden {
            return Err(EmitError::InvalidRecord(format!(
                "test {} sets the reserved `{}` parameter",
                self.name, NAME_KEY
            )));
        }
        let robustness = self.robustness.ok_or_else(|| {
            EmitError::InvalidRecord(format!("test {} has no robustness type", self.name))
        })?;

        let mut display_columns = Vec::with_capacity(self.selections.len() + 1);
        display_columns.push(DisplayColumn::new(NAME_KEY, self.name.clone()));
        display_columns.extend(self.selections);

        Ok(TestRecord {
            name: self.name,
            macro_type: self.macro_type,
            fields: self.fields,
            robustness,
            display_columns,
        })
    }
}

/// Caller-owned working list of configured tests.
#[derive(Debug, Clone, Default)]
pub struct TestList {
    tests: Vec<TestRecord>,
}

impl TestList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, test: TestRecord) {
        self.tests.push(test);
    }

    pub fn remove(&mut self, index: usize) -> Option<TestRecord> {
        if index < self.tests.len() {
            Some(self.tests.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&TestRecord> {
        self.tests.get(index)
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Emission order: oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, TestRecord> {
        self.tests.iter()
    }

    pub fn as_slice(&self) -> &[TestRecord] {
        &self.tests
    }

    /// Newest first, for table display only.
    pub fn display_order(&self) -> impl Iterator<Item = &TestRecord> {
        self.tests.iter().rev()
    }
}

impl FromIterator<TestRecord> for TestList {
    fn from_iter<I: IntoIterator<Item = TestRecord>>(iter: I) -> Self {
        Self {
            tests: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TestList {
    type Item = &'a TestRecord;
    type IntoIter = std::slice::Iter<'a, TestRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.tests.iter()
    }
}
