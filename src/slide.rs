use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub id: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Slide {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            payload: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.payload
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Numeric attribute. Numbers stored as strings ("24") are accepted.
    pub fn number(&self, key: &str) -> Option<f32> {
        match self.payload.get(key)? {
            Value::Number(n) => n.as_f64().map(|n| n as f32),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}
