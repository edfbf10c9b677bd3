// ── Configuration model ──
//
// Typed view of the YAML configuration document. Top-level keys are
// component names; only the `sesame_server` block gets a typed schema,
// the rest stay opaque and feed module conflict/dependency resolution.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConfigError;
use crate::validate::is_hex_string;

/// Component name of the sesame_server block in the document.
pub const COMPONENT_NAME: &str = "sesame_server";

// ── Document ────────────────────────────────────────────────────────

/// A parsed configuration document: an ordered mapping of component
/// names to raw blocks.
#[derive(Debug, Clone)]
pub struct Document {
    modules: IndexMap<String, serde_yaml::Value>,
}

impl Document {
    /// Parse a YAML document. The top level must be a mapping.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let modules: IndexMap<String, serde_yaml::Value> = serde_yaml::from_str(text)?;
        Ok(Self { modules })
    }

    /// Names of all configured components, in document order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Extract and type-check the `sesame_server` block.
    ///
    /// Fails if the block is absent or does not match the schema. This
    /// performs shape validation only; [`crate::validate::validate_server`]
    /// enforces the cross-field invariants.
    pub fn server_config(&self) -> Result<ServerConfig, ConfigError> {
        let raw = self
            .modules
            .get(COMPONENT_NAME)
            .ok_or(ConfigError::MissingComponent {
                component: COMPONENT_NAME,
            })?;
        Ok(serde_yaml::from_value(raw.clone())?)
    }
}

// ── MacAddress ──────────────────────────────────────────────────────

/// MAC address in strict lowercase colon-separated form (aa:bb:cc:dd:ee:ff).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MacAddress(String);

impl MacAddress {
    /// Parse a MAC address, requiring six colon-separated hex octet groups.
    /// The stored form is lowercased.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let groups: Vec<&str> = raw.split(':').collect();
        if groups.len() != 6 || !groups.iter().all(|g| is_hex_string(g, 2)) {
            return Err(ConfigError::InvalidMacAddress {
                value: raw.to_owned(),
            });
        }
        Ok(Self(raw.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ── EventType ───────────────────────────────────────────────────────

/// Event classification a trigger may report. The surface is fixed;
/// anything else fails schema validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Open,
    Close,
    Lock,
    Unlock,
}

impl EventType {
    /// The full event surface, in registration order.
    pub const ALL: [Self; 4] = [Self::Open, Self::Close, Self::Lock, Self::Unlock];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Lock => "lock",
            Self::Unlock => "unlock",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Component blocks ────────────────────────────────────────────────

/// The `sesame_server` block: one BLE lock-server declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Declaration identifier; defaulted deterministically when absent.
    pub id: Option<String>,

    /// Server UUID, canonical 36-char hyphenated form.
    pub uuid: Uuid,

    /// Deprecated and inert. Presence emits a warning, nothing else.
    pub address: Option<String>,

    /// Registered-device secret, exactly 32 hex chars.
    pub secret: Option<String>,

    /// Maximum concurrent BLE sessions, 1..=9.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u8,

    /// Status-lock entity reflecting the server's own lock state.
    pub lock: Option<LockConfig>,

    /// Event sources, order-preserving.
    #[serde(default)]
    pub triggers: Vec<TriggerConfig>,
}

fn default_max_sessions() -> u8 {
    3
}

/// One configured event source (typically one physical lock device).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerConfig {
    pub id: Option<String>,

    /// Display name for the event entity.
    pub name: Option<String>,

    /// Device MAC address. At least one of `address`/`uuid` is required.
    pub address: Option<MacAddress>,

    /// Device UUID. At least one of `address`/`uuid` is required.
    pub uuid: Option<Uuid>,

    /// Restriction of the event surface; `None` means all four types.
    pub event_types: Option<Vec<EventType>>,

    /// Text sensor publishing the latest history tag.
    pub history_tag: Option<EntityConfig>,

    /// Numeric sensor publishing the trigger type.
    pub trigger_type: Option<EntityConfig>,

    /// Per-trigger status lock entity.
    pub lock: Option<LockConfig>,

    /// Binary sensor for connection status (device class `connectivity`).
    pub connection_sensor: Option<EntityConfig>,
}

/// A status-lock entity declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockConfig {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Generic sensor-style entity declaration (text, numeric, binary).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityConfig {
    pub id: Option<String>,
    pub name: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub disabled_by_default: bool,
}
