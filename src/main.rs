mod error;
mod models;
mod service;
mod storage;
mod user_models;
mod user_storage;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use error::ApiError;
use models::{
    Document, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
    UploadDocumentRequest, UploadDocumentResponse,
};
use service::AccessService;
use storage::DocumentStorage;
use user_storage::UserStorage;

struct AppState {
    service: AccessService,
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/documents", post(upload_document))
        .route("/api/documents", get(list_documents))
        .route("/api/documents/:id", get(get_document))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docshare=info,tower_http=debug".into()),
        )
        .init();

    let host = std::env::var("DOCSHARE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("DOCSHARE_PORT")
        .unwrap_or_else(|_| "9000".into())
        .parse()
        .context("DOCSHARE_PORT must be a port number")?;
    let users_path =
        std::env::var("DOCSHARE_USERS_PATH").unwrap_or_else(|_| "users.json".into());
    let documents_path =
        std::env::var("DOCSHARE_DOCUMENTS_PATH").unwrap_or_else(|_| "documents.json".into());

    tracing::info!("user store: {}", users_path);
    tracing::info!("document store: {}", documents_path);

    let identity = Arc::new(
        UserStorage::open(users_path).context("Failed to initialize user storage")?,
    );
    let documents = Arc::new(
        DocumentStorage::open(documents_path)
            .context("Failed to initialize document storage")?,
    );

    let app_state = Arc::new(AppState {
        service: AccessService::new(identity, documents),
    });

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .with_context(|| format!("Failed to bind to port {}", port))?;

    println!("🚀 Document sharing service running on http://{}:{}", host, port);
    println!("📋 Endpoints:");
    println!("   POST /api/register      - Register a new user");
    println!("   POST /api/login         - Log in with username and credential");
    println!("   POST /api/documents     - Upload document metadata");
    println!("   GET  /api/documents     - List documents, newest first");
    println!("   GET  /api/documents/:id - Fetch a single document");

    axum::serve(listener, app(app_state))
        .await
        .context("Server error")?;

    Ok(())
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let role = payload.validate()?;

    state
        .service
        .register(payload.username, payload.credential, role)
        .await?;

    Ok(Json(RegisterResponse {
        message: "User registered successfully".to_string(),
    }))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.validate()?;

    let user = state
        .service
        .login(&payload.username, &payload.credential)
        .await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user,
    }))
}

async fn upload_document(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UploadDocumentRequest>,
) -> Result<Json<UploadDocumentResponse>, ApiError> {
    payload.validate()?;

    let document = state
        .service
        .upload_document(
            payload.title,
            payload.url,
            payload.summary,
            payload.uploaded_by,
        )
        .await?;

    Ok(Json(UploadDocumentResponse {
        message: "Document saved successfully".to_string(),
        document,
    }))
}

async fn list_documents(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let documents = state.service.list_documents().await?;
    Ok(Json(documents))
}

async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    let document = state.service.get_document(&id).await?;
    Ok(Json(document))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use super::*;

    fn test_app() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let identity = Arc::new(UserStorage::open(dir.path().join("users.json")).unwrap());
        let documents =
            Arc::new(DocumentStorage::open(dir.path().join("documents.json")).unwrap());
        let state = Arc::new(AppState {
            service: AccessService::new(identity, documents),
        });
        (dir, app(state))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(res: axum::response::Response) -> Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(bytes.as_ref()).unwrap()
    }

    #[tokio::test]
    async fn register_login_upload_list_and_fetch_end_to_end() {
        let (_dir, router) = test_app();

        let res = router
            .clone()
            .oneshot(post_json(
                "/api/register",
                json!({"username": "alice", "credential": "pw1", "role": "employee"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            body_json(res).await,
            json!({"message": "User registered successfully"})
        );

        let res = router
            .clone()
            .oneshot(post_json(
                "/api/login",
                json!({"username": "alice", "credential": "pw1"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let login = body_json(res).await;
        assert_eq!(login["message"], "Login successful");
        assert_eq!(login["user"]["username"], "alice");
        assert_eq!(login["user"]["role"], "employee");

        let res = router
            .clone()
            .oneshot(post_json(
                "/api/documents",
                json!({
                    "title": "Policy",
                    "url": "http://x/doc",
                    "summary": "s",
                    "uploadedBy": "alice"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let upload = body_json(res).await;
        assert_eq!(upload["message"], "Document saved successfully");
        let id = upload["document"]["id"].as_str().unwrap().to_string();

        let res = router
            .clone()
            .oneshot(get_request("/api/documents"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let listed = body_json(res).await;
        let listed = listed.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["title"], "Policy");
        assert_eq!(listed[0]["uploadedBy"], "alice");

        let res = router
            .clone()
            .oneshot(get_request(&format!("/api/documents/{}", id)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let fetched = body_json(res).await;
        assert_eq!(fetched, listed[0]);
    }

    #[tokio::test]
    async fn duplicate_registration_is_a_400_with_the_store_detail() {
        let (_dir, router) = test_app();

        let body = json!({"username": "bob", "credential": "pw", "role": "hr"});
        let res = router
            .clone()
            .oneshot(post_json("/api/register", body.clone()))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = router
            .clone()
            .oneshot(post_json("/api/register", body))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(res).await,
            json!({"error": "Username already exists"})
        );
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable_401s() {
        let (_dir, router) = test_app();

        let res = router
            .clone()
            .oneshot(post_json(
                "/api/register",
                json!({"username": "carol", "credential": "pw", "role": "admin"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let wrong_credential = router
            .clone()
            .oneshot(post_json(
                "/api/login",
                json!({"username": "carol", "credential": "nope"}),
            ))
            .await
            .unwrap();
        let unknown_user = router
            .clone()
            .oneshot(post_json(
                "/api/login",
                json!({"username": "mallory", "credential": "pw"}),
            ))
            .await
            .unwrap();

        assert_eq!(wrong_credential.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
        let expected = json!({"error": "Invalid credentials"});
        assert_eq!(body_json(wrong_credential).await, expected);
        assert_eq!(body_json(unknown_user).await, expected);
    }

    #[tokio::test]
    async fn invalid_role_is_a_400_validation_error() {
        let (_dir, router) = test_app();

        let res = router
            .oneshot(post_json(
                "/api/register",
                json!({"username": "dan", "credential": "pw", "role": "contractor"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(res).await,
            json!({"error": "role must be one of: admin, hr, employee"})
        );
    }

    #[tokio::test]
    async fn empty_title_is_a_400_validation_error() {
        let (_dir, router) = test_app();

        let res = router
            .oneshot(post_json(
                "/api/documents",
                json!({"title": "  ", "url": "http://x", "summary": "", "uploadedBy": "eve"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(res).await,
            json!({"error": "title cannot be empty"})
        );
    }

    #[tokio::test]
    async fn unknown_document_id_is_a_404() {
        let (_dir, router) = test_app();

        let res = router
            .oneshot(get_request("/api/documents/no-such-id"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(res).await,
            json!({"error": "Document not found"})
        );
    }

    #[tokio::test]
    async fn documents_list_newest_first_over_http() {
        let (_dir, router) = test_app();

        for title in ["first", "second", "third"] {
            let res = router
                .clone()
                .oneshot(post_json(
                    "/api/documents",
                    json!({
                        "title": title,
                        "url": format!("http://x/{title}"),
                        "summary": "s",
                        "uploadedBy": "alice"
                    }),
                ))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::OK);
        }

        let res = router
            .oneshot(get_request("/api/documents"))
            .await
            .unwrap();
        let listed = body_json(res).await;
        let titles: Vec<&str> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
    }
}
