use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ============================================================================
// Entity Capability
// ============================================================================
//
// Anything stored behind the CRUD router implements `Entity`.
// The router, the store and the API document are all generic over it.
//
// ============================================================================

/// A record with an unsigned 64-bit identifier.
///
/// Identifiers are expected to be unique within a store but nothing enforces
/// it; lookups act on the first match.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Path segment under `/data` (e.g. `users`)
    const COLLECTION: &'static str;

    /// Schema name in the API document (e.g. `User`)
    const SCHEMA_NAME: &'static str;

    fn id(&self) -> u64;

    /// JSON schema of the wire representation
    fn schema() -> Value;
}

// ============================================================================
// Concrete Kinds
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
}

impl User {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const SCHEMA_NAME: &'static str = "User";

    fn id(&self) -> u64 {
        self.id
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "required": ["id", "name"],
            "properties": {
                "id": { "type": "integer", "format": "int64", "minimum": 0 },
                "name": { "type": "string" }
            }
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub id: u64,
    pub text: String,
}

impl Message {
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Self { id, text: text.into() }
    }
}

impl Entity for Message {
    const COLLECTION: &'static str = "messages";
    const SCHEMA_NAME: &'static str = "Message";

    fn id(&self) -> u64 {
        self.id
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "required": ["id", "text"],
            "properties": {
                "id": { "type": "integer", "format": "int64", "minimum": 0 },
                "text": { "type": "string" }
            }
        })
    }
}

// ============================================================================
// Seeds
// ============================================================================

pub fn seed_users() -> Vec<User> {
    vec![User::new(1, "John")]
}

pub fn seed_messages() -> Vec<Message> {
    vec![Message::new(1, "Hello World")]
}
