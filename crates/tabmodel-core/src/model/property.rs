use serde::{Deserialize, Serialize};

/// Scalar property of a handle that the engine tracks changes for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyName {
    Name,
    Expression,
    Ordinal,
}

impl PropertyName {
    pub fn label(&self) -> &'static str {
        match self {
            PropertyName::Name => "Name",
            PropertyName::Expression => "Expression",
            PropertyName::Ordinal => "Ordinal",
        }
    }
}

impl std::fmt::Display for PropertyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Value carried by property-change records and events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Integer(u32),
    Empty,
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<u32> {
        match self {
            PropertyValue::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<Option<String>> for PropertyValue {
    fn from(value: Option<String>) -> Self {
        value.map(PropertyValue::Text).unwrap_or(PropertyValue::Empty)
    }
}

impl From<Option<u32>> for PropertyValue {
    fn from(value: Option<u32>) -> Self {
        value.map(PropertyValue::Integer).unwrap_or(PropertyValue::Empty)
    }
}
