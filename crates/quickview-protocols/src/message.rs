//! Message envelopes exchanged across the frame boundary.
//!
//! Wire format (both directions):
//!
//! ```text
//! {"type": "tpb-qv" | "tpb-qv-config", "action": "<action>", ...payload}
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::types::{Path, SelectionState, SelectionValue, StepRole};

/// Envelope type of messages sent by the iframe to the parent.
pub const IFRAME_MESSAGE_TYPE: &str = "tpb-qv";

/// Envelope type of messages sent by the parent to the iframe.
pub const PARENT_MESSAGE_TYPE: &str = "tpb-qv-config";

/// A message with a fixed envelope `type` and an `action` tag.
pub trait WireMessage: Serialize + DeserializeOwned {
    /// Value of the `type` discriminator.
    const TYPE: &'static str;

    /// Every `action` this envelope understands.
    const ACTIONS: &'static [&'static str];

    /// Encode into a JSON object carrying `type` and `action`.
    fn to_wire(&self) -> Result<Value, ProtocolError> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.insert("type".to_string(), Value::String(Self::TYPE.to_string()));
        }
        Ok(value)
    }

    /// Decode a JSON object, rejecting foreign types and unknown actions.
    fn from_wire(data: &Value) -> Result<Self, ProtocolError> {
        let kind = data
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingType)?;
        if kind != Self::TYPE {
            return Err(ProtocolError::UnexpectedType(kind.to_string()));
        }

        let action = data
            .get("action")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingAction)?;
        if !Self::ACTIONS.contains(&action) {
            return Err(ProtocolError::UnrecognizedAction(action.to_string()));
        }

        serde_json::from_value(data.clone()).map_err(|e| ProtocolError::MalformedPayload {
            action: action.to_string(),
            message: e.to_string(),
        })
    }
}

/// Payload of a `cpb-selection` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionReport {
    /// Display title of the step that changed.
    pub component: String,
    pub role: StepRole,
    pub index: usize,
    pub value: SelectionValue,
    /// Full snapshot after the change.
    pub all_selections: SelectionState,
}

/// Iframe -> parent messages (`type: "tpb-qv"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum IframeMessage {
    /// Content height changed.
    Resize { height: u32 },

    /// A step's selection changed.
    CpbSelection { selection: SelectionReport },

    /// The resolved SKU appeared or changed.
    SkuSwap { sku: String, path: Path },

    /// The cart form was submitted.
    AddToCart {
        #[serde(rename = "productId")]
        product_id: Option<String>,
        sku: Option<String>,
        path: Option<Path>,
    },
}

impl WireMessage for IframeMessage {
    const TYPE: &'static str = IFRAME_MESSAGE_TYPE;
    const ACTIONS: &'static [&'static str] = &["resize", "cpb-selection", "sku-swap", "add-to-cart"];
}

impl IframeMessage {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Resize { .. } => "resize",
            Self::CpbSelection { .. } => "cpb-selection",
            Self::SkuSwap { .. } => "sku-swap",
            Self::AddToCart { .. } => "add-to-cart",
        }
    }
}

fn default_true() -> bool {
    true
}

/// Configuration the parent hands to the iframe on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitConfig {
    /// Base URL for same-origin navigation started inside the iframe.
    pub home: String,
    /// Query parameter that keeps the quick view layout.
    pub qv_param: String,
    #[serde(rename = "enableSKUSwap", default = "default_true")]
    pub enable_sku_swap: bool,
    #[serde(default = "default_true")]
    pub enable_analytics: bool,
}

impl InitConfig {
    pub fn new(home: impl Into<String>, qv_param: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            qv_param: qv_param.into(),
            enable_sku_swap: true,
            enable_analytics: true,
        }
    }
}

/// Parent -> iframe messages (`type: "tpb-qv-config"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ParentMessage {
    Init { config: InitConfig },
}

impl WireMessage for ParentMessage {
    const TYPE: &'static str = PARENT_MESSAGE_TYPE;
    const ACTIONS: &'static [&'static str] = &["init"];
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
