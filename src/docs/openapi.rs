use serde_json::{json, Map, Value};

use crate::config::{DocsSettings, OAuthSettings};
use crate::models::Entity;

// ============================================================================
// OpenAPI Document Builder
// ============================================================================
//
// Every entity kind mounted with `list_crud` is described here with the same
// statuses the handlers produce. Built once at startup.
//
// ============================================================================

const OPENAPI_VERSION: &str = "3.0.3";
const SECURITY_SCHEME: &str = "oauth2";

pub struct ApiDocs {
    info: DocsSettings,
    paths: Map<String, Value>,
    schemas: Map<String, Value>,
    security_schemes: Map<String, Value>,
}

impl ApiDocs {
    pub fn new(info: &DocsSettings) -> Self {
        Self {
            info: info.clone(),
            paths: Map::new(),
            schemas: Map::new(),
            security_schemes: Map::new(),
        }
    }

    /// Declare the OAuth2 authorization-code scheme guarding protected routes
    pub fn with_oauth(mut self, oauth: &OAuthSettings) -> Self {
        if !oauth.enabled {
            return self;
        }

        let scopes: Map<String, Value> = oauth
            .scopes
            .iter()
            .map(|scope| (scope.clone(), Value::String(String::new())))
            .collect();

        self.security_schemes.insert(
            SECURITY_SCHEME.to_string(),
            json!({
                "type": "oauth2",
                "flows": {
                    "authorizationCode": {
                        "authorizationUrl": oauth.authorize_url,
                        "tokenUrl": oauth.token_url,
                        "scopes": scopes
                    }
                }
            }),
        );
        self
    }

    /// GET /hello
    pub fn with_hello(mut self) -> Self {
        let mut get = json!({
            "summary": "Hello, world.",
            "operationId": "hello",
            "responses": {
                "200": {
                    "description": "Hello",
                    "content": { "text/plain": { "schema": { "type": "string" } } }
                },
                "401": { "description": "No live session." }
            }
        });
        self.secure(&mut get);

        self.paths.insert("/hello".to_string(), json!({ "get": get }));
        self
    }

    /// The four CRUD operations mounted under `{prefix}/{E::COLLECTION}`
    pub fn with_crud<E: Entity>(mut self, prefix: &str) -> Self {
        let name = E::SCHEMA_NAME;
        let entity_ref = json!({ "$ref": format!("#/components/schemas/{}", name) });
        let collection_path = format!("{}/{}", prefix, E::COLLECTION);
        let item_path = format!("{}/{{id}}", collection_path);

        let malformed = json!({ "description": "The ID parameter is malformatted or missing." });
        let not_found = json!({ "description": "The entity for the given ID does not exist." });
        let unauthorized = json!({ "description": "No live session." });

        let mut list = json!({
            "summary": format!("Get a list of {}.", name),
            "operationId": format!("list{}", name),
            "tags": [E::COLLECTION],
            "responses": {
                "200": {
                    "description": "The list of items.",
                    "content": {
                        "application/json": {
                            "schema": { "type": "array", "items": entity_ref.clone() }
                        }
                    }
                },
                "401": unauthorized.clone()
            }
        });

        let mut create = json!({
            "summary": format!("Save a new {}.", name),
            "operationId": format!("create{}", name),
            "tags": [E::COLLECTION],
            "requestBody": {
                "required": true,
                "content": { "application/json": { "schema": entity_ref.clone() } }
            },
            "responses": {
                "204": { "description": "The new entity was saved." },
                "400": { "description": "The body is not a valid entity." },
                "401": unauthorized.clone()
            }
        });

        let mut get = json!({
            "summary": "Get a single entity by ID.",
            "operationId": format!("get{}", name),
            "tags": [E::COLLECTION],
            "responses": {
                "200": {
                    "description": "The entity found with the given ID.",
                    "content": { "application/json": { "schema": entity_ref } }
                },
                "400": malformed.clone(),
                "401": unauthorized.clone(),
                "404": not_found.clone()
            }
        });

        let mut delete = json!({
            "summary": "Delete the entity with the given ID.",
            "operationId": format!("delete{}", name),
            "tags": [E::COLLECTION],
            "responses": {
                "204": { "description": "The entity was deleted." },
                "400": malformed,
                "401": unauthorized,
                "404": not_found
            }
        });

        for operation in [&mut list, &mut create, &mut get, &mut delete] {
            self.secure(operation);
        }

        self.paths
            .insert(collection_path, json!({ "get": list, "post": create }));
        self.paths.insert(
            item_path,
            json!({
                "parameters": [{
                    "name": "id",
                    "in": "path",
                    "required": true,
                    "description": "the ID of the entity",
                    "schema": { "type": "integer", "format": "int64", "minimum": 0 }
                }],
                "get": get,
                "delete": delete
            }),
        );
        self.schemas.insert(name.to_string(), E::schema());
        self
    }

    fn secure(&self, operation: &mut Value) {
        if self.security_schemes.contains_key(SECURITY_SCHEME) {
            let mut requirement = Map::new();
            requirement.insert(SECURITY_SCHEME.to_string(), json!([]));
            operation["security"] = json!([requirement]);
        }
    }

    pub fn title(&self) -> &str {
        &self.info.title
    }

    pub fn document(&self) -> Value {
        let mut components = json!({ "schemas": self.schemas });
        if !self.security_schemes.is_empty() {
            components["securitySchemes"] = Value::Object(self.security_schemes.clone());
        }

        json!({
            "openapi": OPENAPI_VERSION,
            "info": {
                "title": self.info.title,
                "version": self.info.version,
                "description": self.info.summary
            },
            "paths": self.paths,
            "components": components
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Message, User};

    fn docs() -> ApiDocs {
        ApiDocs::new(&DocsSettings::default())
            .with_hello()
            .with_crud::<User>("/data")
            .with_crud::<Message>("/data")
    }

    #[test]
    fn test_info_block() {
        let doc = docs().document();
        assert_eq!(doc["openapi"], "3.0.3");
        assert_eq!(doc["info"]["title"], "OpenAPI example");
        assert_eq!(doc["info"]["version"], "2.1");
        assert_eq!(doc["info"]["description"], "This is a sample API");
    }

    #[test]
    fn test_every_kind_documented() {
        let doc = docs().document();

        for (collection, schema) in [("users", "User"), ("messages", "Message")] {
            let list = &doc["paths"][format!("/data/{}", collection)];
            let item = &doc["paths"][format!("/data/{}/{{id}}", collection)];

            assert!(list["get"]["responses"]["200"].is_object());
            assert!(list["post"]["responses"]["204"].is_object());
            assert!(item["get"]["responses"]["404"].is_object());
            assert!(item["delete"]["responses"]["400"].is_object());
            assert!(doc["components"]["schemas"][schema].is_object());
        }
    }

    #[test]
    fn test_security_only_when_oauth_enabled() {
        let open = docs().document();
        assert!(open["paths"]["/hello"]["get"].get("security").is_none());
        assert!(open["components"].get("securitySchemes").is_none());

        let secured = ApiDocs::new(&DocsSettings::default())
            .with_oauth(&OAuthSettings::default())
            .with_crud::<User>("/data")
            .document();
        assert_eq!(
            secured["paths"]["/data/users"]["get"]["security"][0]["oauth2"],
            json!([])
        );
        let scheme = &secured["components"]["securitySchemes"]["oauth2"];
        assert_eq!(
            scheme["flows"]["authorizationCode"]["tokenUrl"],
            "https://accounts.google.com/o/oauth2/token"
        );
    }
}
