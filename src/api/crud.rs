use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError, Scope};
use std::sync::Arc;

use super::error::ApiError;
use crate::metrics::Metrics;
use crate::models::Entity;
use crate::store::EntityStore;

// ============================================================================
// Generic CRUD Router
// ============================================================================
//
// `list_crud::<E>` mounts four routes over one `EntityStore<E>`:
//
//   GET    /{collection}/{id}  -> 200 entity | 400 | 404
//   GET    /{collection}       -> 200 [entity]
//   POST   /{collection}       -> 204
//   DELETE /{collection}/{id}  -> 204 | 400 | 404
//
// A request that names no identifier (`GET /{collection}/`, `DELETE
// /{collection}`) reaches the same handlers and is answered with 400.
//
// The same handlers serve every entity kind.
//
// ============================================================================

/// Scope serving `E::COLLECTION` from `store`
pub fn list_crud<E: Entity>(store: Arc<EntityStore<E>>) -> Scope {
    web::scope(&format!("/{}", E::COLLECTION))
        .app_data(web::Data::from(store))
        .route("", web::get().to(list_entities::<E>))
        .route("", web::post().to(create_entity::<E>))
        .route("", web::delete().to(delete_entity::<E>))
        .route("/", web::get().to(get_entity::<E>))
        .route("/", web::delete().to(delete_entity::<E>))
        .route("/{id}", web::get().to(get_entity::<E>))
        .route("/{id}", web::delete().to(delete_entity::<E>))
}

/// Parse a path identifier as an unsigned 64-bit integer
pub fn parse_identifier(token: Option<&str>) -> Result<u64, ApiError> {
    token
        .and_then(|token| token.parse::<u64>().ok())
        .ok_or(ApiError::MalformedIdentifier)
}

fn record<T>(
    metrics: &Metrics,
    kind: &str,
    operation: &str,
    result: &Result<T, ApiError>,
    ok: StatusCode,
) {
    let status = match result {
        Ok(_) => ok,
        Err(e) => e.status_code(),
    };
    metrics.record_crud(kind, operation, status.as_u16());
}

async fn get_entity<E: Entity>(
    req: HttpRequest,
    store: web::Data<EntityStore<E>>,
    metrics: web::Data<Arc<Metrics>>,
) -> Result<web::Json<E>, ApiError> {
    let result = parse_identifier(req.match_info().get("id"))
        .and_then(|id| store.get(id).map_err(ApiError::from));

    record(&metrics, E::COLLECTION, "get", &result, StatusCode::OK);
    result.map(web::Json)
}

async fn list_entities<E: Entity>(
    store: web::Data<EntityStore<E>>,
    metrics: web::Data<Arc<Metrics>>,
) -> web::Json<Vec<E>> {
    metrics.record_crud(E::COLLECTION, "list", StatusCode::OK.as_u16());
    web::Json(store.list())
}

async fn create_entity<E: Entity>(
    body: web::Json<E>,
    store: web::Data<EntityStore<E>>,
    metrics: web::Data<Arc<Metrics>>,
) -> HttpResponse {
    let entity = body.into_inner();
    let id = entity.id();
    store.insert(entity);

    tracing::debug!(kind = E::COLLECTION, id = id, "Entity created");
    metrics.record_crud(E::COLLECTION, "create", StatusCode::NO_CONTENT.as_u16());
    metrics.set_store_size(E::COLLECTION, store.len());

    HttpResponse::NoContent().finish()
}

async fn delete_entity<E: Entity>(
    req: HttpRequest,
    store: web::Data<EntityStore<E>>,
    metrics: web::Data<Arc<Metrics>>,
) -> Result<HttpResponse, ApiError> {
    let result = parse_identifier(req.match_info().get("id"))
        .and_then(|id| store.remove(id).map_err(ApiError::from));

    record(&metrics, E::COLLECTION, "delete", &result, StatusCode::NO_CONTENT);

    let removed = result?;
    tracing::debug!(kind = E::COLLECTION, id = removed.id(), "Entity deleted");
    metrics.set_store_size(E::COLLECTION, store.len());

    Ok(HttpResponse::NoContent().finish())
}
