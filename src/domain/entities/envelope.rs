use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::domain::entities::value::Value;

/// One output row: positional cells followed by named reserved metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapedRow {
    pub values: Vec<Value>,
    pub metadata: Vec<(String, Value)>,
}

impl ShapedRow {
    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.metadata
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }
}

// Rows with metadata encode as an object keyed "0".."n-1" plus the metadata
// keys, which is what grid clients expect for DT_RowId/DT_RowClass.
impl Serialize for ShapedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.metadata.is_empty() {
            return self.values.serialize(serializer);
        }

        let mut map = serializer.serialize_map(Some(self.values.len() + self.metadata.len()))?;
        for (idx, value) in self.values.iter().enumerate() {
            map.serialize_entry(&idx.to_string(), value)?;
        }
        for (key, value) in &self.metadata {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Envelope {
    #[serde(rename = "sEcho")]
    pub echo: i64,
    #[serde(rename = "iTotalRecords")]
    pub total_count: i64,
    #[serde(rename = "iTotalDisplayRecords")]
    pub filtered_count: i64,
    #[serde(rename = "aaData")]
    pub rows: Vec<ShapedRow>,
}
