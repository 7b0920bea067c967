// ============================================================================
// API Documentation
// ============================================================================
//
// GET /docs               - Swagger UI
// GET /docs/openapi.json  - the generated OpenAPI document
//
// ============================================================================

mod openapi;

pub use openapi::ApiDocs;

use actix_web::{web, HttpResponse, Scope};

pub fn scope() -> Scope {
    web::scope("/docs")
        .route("", web::get().to(swagger_ui))
        .route("/openapi.json", web::get().to(openapi_json))
}

async fn openapi_json(docs: web::Data<ApiDocs>) -> HttpResponse {
    HttpResponse::Ok().json(docs.document())
}

async fn swagger_ui(docs: web::Data<ApiDocs>) -> HttpResponse {
    let page = format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>{title}</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.ui = SwaggerUIBundle({{ url: "/docs/openapi.json", dom_id: "#swagger-ui" }});
  </script>
</body>
</html>"##,
        title = html_escape(docs.title())
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page)
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocsSettings;
    use crate::models::User;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_docs_routes() {
        let docs = ApiDocs::new(&DocsSettings::default()).with_crud::<User>("/data");
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(docs))
                .service(scope()),
        )
        .await;

        let req = test::TestRequest::get().uri("/docs").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let page = test::read_body(resp).await;
        assert!(std::str::from_utf8(&page).unwrap().contains("<title>OpenAPI example</title>"));

        let req = test::TestRequest::get().uri("/docs/openapi.json").to_request();
        let doc: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(doc["paths"]["/data/users/{id}"].is_object());
    }

    #[actix_web::test]
    async fn test_html_escape() {
        assert_eq!(html_escape("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
    }
}
