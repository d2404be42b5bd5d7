use std::borrow::Cow;
use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: String,
}

/// A named group of fields, in the order the upstream document lists them.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Ordered-map insert: an existing field keeps its position and takes the new value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value,
            None => self.fields.push(Field { name, value }),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == field)
            .map(|f| f.value.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.name == field)
    }
}

/// Section name -> (field name -> value), both levels insertion ordered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractedData {
    sections: Vec<Section>,
}

impl ExtractedData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.insert_section(section);
        self
    }

    /// Replaces a section of the same name in place, otherwise appends.
    pub fn insert_section(&mut self, section: Section) {
        match self.sections.iter_mut().find(|s| s.name == section.name) {
            Some(existing) => *existing = section,
            None => self.sections.push(section),
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn field_count(&self) -> usize {
        self.sections.iter().map(|s| s.fields.len()).sum()
    }

    /// Looks a value up by section and field, distinguishing "absent" (None)
    /// from a present but empty value.
    pub fn value(&self, section: &str, field: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(field))
    }
}

/// Payload of the single-form export request.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormExport {
    #[serde(deserialize_with = "display_string")]
    pub form_id: String,
    #[serde(deserialize_with = "display_string")]
    pub template_type: String,
    #[serde(deserialize_with = "display_string")]
    pub file_name: String,
    pub extracted_data: ExtractedData,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormRecord {
    #[serde(deserialize_with = "display_string")]
    pub form_id: String,
    #[serde(deserialize_with = "display_string")]
    pub file_name: String,
    #[serde(deserialize_with = "display_string")]
    pub created_at: String,
    pub extracted_data: ExtractedData,
}

/// Template type -> records of that template, in payload order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TemplateGroup {
    groups: Vec<(String, Vec<FormRecord>)>,
}

impl TemplateGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, template: impl Into<String>, records: Vec<FormRecord>) -> Self {
        let template = template.into();
        match self.groups.iter_mut().find(|(t, _)| *t == template) {
            Some((_, existing)) => *existing = records,
            None => self.groups.push((template, records)),
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FormRecord])> {
        self.groups.iter().map(|(t, r)| (t.as_str(), r.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn form_count(&self) -> usize {
        self.groups.iter().map(|(_, r)| r.len()).sum()
    }
}

/// Payload of the multi-form export request.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AllFormsExport {
    #[serde(deserialize_with = "display_string")]
    pub username: String,
    #[serde(deserialize_with = "display_string")]
    pub export_date: String,
    pub forms_by_template: TemplateGroup,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Cell::Text(s) => Cow::Borrowed(s),
            Cell::Number(n) => Cow::Owned(n.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// Rows of cells; rows may differ in length (title and spacer rows).
pub type CellGrid = Vec<Vec<Cell>>;

/// Render an arbitrary JSON value as display text. Absent/null becomes "".
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

fn display_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(display_value(&value))
}

// Ordered deserialization. serde_json's `Value::Object` does not keep key
// order, so the two map levels are walked with visitors instead.

struct ExtractedDataVisitor;

impl<'de> Visitor<'de> for ExtractedDataVisitor {
    type Value = ExtractedData;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of section names to field maps")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ExtractedData, A::Error> {
        let mut data = ExtractedData::new();
        while let Some(name) = map.next_key::<String>()? {
            let fields = map.next_value::<SectionFields>()?;
            let fields = fields.0.unwrap_or_else(|| {
                log::warn!("Section {name:?} is not a field map; rendering it empty");
                Vec::new()
            });
            let mut section = Section::new(name);
            for field in fields {
                section.insert(field.name, field.value);
            }
            data.insert_section(section);
        }
        Ok(data)
    }

    fn visit_unit<E: de::Error>(self) -> Result<ExtractedData, E> {
        Ok(ExtractedData::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<ExtractedData, E> {
        Ok(ExtractedData::new())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ExtractedData, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(not_a_section_map())
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<ExtractedData, E> {
        Ok(not_a_section_map())
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<ExtractedData, E> {
        Ok(not_a_section_map())
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<ExtractedData, E> {
        Ok(not_a_section_map())
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<ExtractedData, E> {
        Ok(not_a_section_map())
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<ExtractedData, E> {
        Ok(not_a_section_map())
    }
}

fn not_a_section_map() -> ExtractedData {
    log::warn!("extractedData is not a section map; rendering it empty");
    ExtractedData::new()
}

impl<'de> Deserialize<'de> for ExtractedData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ExtractedDataVisitor)
    }
}

/// Field map of one section; `None` when the section value was not a map.
struct SectionFields(Option<Vec<Field>>);

struct SectionFieldsVisitor;

impl<'de> Visitor<'de> for SectionFieldsVisitor {
    type Value = SectionFields;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of field names to values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<SectionFields, A::Error> {
        let mut fields = Vec::new();
        while let Some(name) = map.next_key::<String>()? {
            let value = map.next_value::<Value>()?;
            fields.push(Field {
                name,
                value: display_value(&value),
            });
        }
        Ok(SectionFields(Some(fields)))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<SectionFields, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(SectionFields(None))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<SectionFields, E> {
        Ok(SectionFields(None))
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<SectionFields, E> {
        Ok(SectionFields(None))
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<SectionFields, E> {
        Ok(SectionFields(None))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<SectionFields, E> {
        Ok(SectionFields(None))
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<SectionFields, E> {
        Ok(SectionFields(None))
    }

    fn visit_unit<E: de::Error>(self) -> Result<SectionFields, E> {
        Ok(SectionFields(None))
    }

    fn visit_none<E: de::Error>(self) -> Result<SectionFields, E> {
        Ok(SectionFields(None))
    }
}

impl<'de> Deserialize<'de> for SectionFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SectionFieldsVisitor)
    }
}

struct TemplateGroupVisitor;

impl<'de> Visitor<'de> for TemplateGroupVisitor {
    type Value = TemplateGroup;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of template types to form record lists")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<TemplateGroup, A::Error> {
        let mut group = TemplateGroup::new();
        while let Some(template) = map.next_key::<String>()? {
            let records = map.next_value::<Option<Vec<FormRecord>>>()?.unwrap_or_default();
            group = group.with_records(template, records);
        }
        Ok(group)
    }

    fn visit_unit<E: de::Error>(self) -> Result<TemplateGroup, E> {
        Ok(TemplateGroup::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<TemplateGroup, E> {
        Ok(TemplateGroup::new())
    }
}

impl<'de> Deserialize<'de> for TemplateGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TemplateGroupVisitor)
    }
}
