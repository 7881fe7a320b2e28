use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ConnectionStatus {
    #[serde(default)]
    pub connected: Option<Value>,
}

impl ConnectionStatus {
    /// Only a literal JSON `true` counts as connected
    pub fn is_connected(&self) -> bool {
        matches!(self.connected, Some(Value::Bool(true)))
    }
}
