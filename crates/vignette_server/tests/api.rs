use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::io::{Cursor, Read};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;
use vignette_auth_mock::StaticTokenAuth;
use vignette_core::prelude::{headers::INTERNAL_REQUEST, scopes::READ, *};
use vignette_fs::FileSystemStorage;
use vignette_server::prelude::*;
use vignette_sqlite::SqliteCatalog;

const ADMIN_TOKEN: &str = "admin-token";
const INTERNAL_SECRET: &str = "internal-secret-for-tests";
const BOUNDARY: &str = "vignette-test-boundary";
const ROCKET: &[u8] = br#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg"><path d="M0 0"/></svg>"#;

struct TestApp {
    router: Router,
    storage: FileSystemStorage,
    catalog: SqliteCatalog,
    signer: AssetSigner,
    _dir: TempDir,
}

async fn app_with(config: ServerConfig) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileSystemStorage::new(dir.path());
    let catalog = SqliteCatalog::in_memory().await.unwrap();
    let signer = AssetSigner::new("integration-secret").unwrap();

    let services = CoreServices {
        storage: storage.clone(),
        catalog: catalog.clone(),
        auth: StaticTokenAuth::new(ADMIN_TOKEN),
    };
    let router = VignetteServer::new(config).build(services, signer.clone());

    TestApp {
        router,
        storage,
        catalog,
        signer,
        _dir: dir,
    }
}

async fn app() -> TestApp {
    app_with(ServerConfig {
        internal_presign_secret: Some(INTERNAL_SECRET.to_string()),
        ..ServerConfig::default()
    })
    .await
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

async fn send(router: &Router, request: Request<Body>) -> Reply {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    Reply {
        status,
        headers,
        body,
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(uri: &str, fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Request<Body> {
    Request::post(uri)
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields, file)))
        .unwrap()
}

async fn upload(app: &TestApp, fields: &[(&str, &str)], file_name: &str) -> Value {
    let reply = send(
        &app.router,
        upload_request(
            "/api/v1/illustrations/upload",
            fields,
            Some((file_name, "image/svg+xml", ROCKET)),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{:?}", reply.body);
    reply.json()["data"].clone()
}

async fn create_term(app: &TestApp, segment: &str, name: &str) -> i64 {
    let reply = send(
        &app.router,
        json_request(Method::POST, &format!("/api/v1/{segment}"), json!({ "name": name })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    reply.json()["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_and_info() {
    let app = app().await;

    let reply = send(&app.router, get("/health")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "OK");

    let about = send(&app.router, get("/api/v1/info/about")).await.json();
    assert!(about["about"].as_str().unwrap().contains("SVG"));

    let license = send(&app.router, get("/api/v1/info/license")).await.json();
    assert!(license["license"].as_str().unwrap().contains("MIT"));
}

#[tokio::test]
async fn term_lifecycle() {
    let app = app().await;

    let reply = send(
        &app.router,
        json_request(Method::POST, "/api/v1/styles", json!({ "name": "Flat Line_Art" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    let style = reply.json()["data"].clone();
    assert_eq!(style["slug"], "flat-line-art");
    let id = style["id"].as_i64().unwrap();

    let list = send(&app.router, get("/api/v1/styles")).await.json();
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    let renamed = send(
        &app.router,
        json_request(Method::PUT, &format!("/api/v1/styles/{id}"), json!({ "name": "Outline" })),
    )
    .await
    .json();
    assert_eq!(renamed["data"]["slug"], "outline");

    let deleted = send(&app.router, authed(Method::DELETE, &format!("/api/v1/styles/{id}"))).await;
    assert_eq!(deleted.status, StatusCode::OK);
    let stamp = deleted.json()["deleted_at"].clone();
    assert!(stamp.is_string());

    let again = send(&app.router, authed(Method::DELETE, &format!("/api/v1/styles/{id}"))).await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.json()["deleted_at"], stamp);

    let gone = send(&app.router, get(&format!("/api/v1/styles/{id}"))).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert!(gone.json()["error"].is_string());

    let list = send(&app.router, get("/api/v1/styles")).await.json();
    assert!(list["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_term_input() {
    let app = app().await;

    let blank = send(
        &app.router,
        json_request(Method::POST, "/api/v1/categories", json!({ "name": "  " })),
    )
    .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);

    let bad_id = send(&app.router, get("/api/v1/categories/abc")).await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);

    let unknown = send(&app.router, get("/api/v1/categories/42/illustrations")).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[derive(Clone)]
struct ReadOnlyAuth;

impl AuthProvider for ReadOnlyAuth {
    async fn verify(&self, _token: &str) -> Result<User, AuthError> {
        Ok(User {
            id: "reader".into(),
            scopes: vec![READ.to_string()],
        })
    }
}

#[tokio::test]
async fn writes_require_the_write_scope() {
    let app = app().await;

    let anonymous = Request::post("/api/v1/packs")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"Space"}"#))
        .unwrap();
    assert_eq!(send(&app.router, anonymous).await.status, StatusCode::UNAUTHORIZED);

    let wrong = Request::post("/api/v1/packs")
        .header(header::AUTHORIZATION, "Bearer nope")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"Space"}"#))
        .unwrap();
    assert_eq!(send(&app.router, wrong).await.status, StatusCode::UNAUTHORIZED);

    let dir = tempfile::tempdir().unwrap();
    let services = CoreServices {
        storage: FileSystemStorage::new(dir.path()),
        catalog: SqliteCatalog::in_memory().await.unwrap(),
        auth: ReadOnlyAuth,
    };
    let reader = VignetteServer::default().build(services, app.signer.clone());
    let reply = send(
        &reader,
        json_request(Method::POST, "/api/v1/packs", json!({ "name": "Space" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    // Reads stay public.
    assert_eq!(send(&reader, get("/api/v1/packs")).await.status, StatusCode::OK);
}

#[tokio::test]
async fn upload_and_stream_public_illustration() {
    let app = app().await;
    let category = create_term(&app, "categories", "Travel").await;

    let data = upload(
        &app,
        &[("title", "Rocket"), ("category_id", &category.to_string())],
        "rocket.svg",
    )
    .await;
    let id = data["id"].as_i64().unwrap();
    assert_eq!(data["file_name"], "rocket.svg");
    assert_eq!(data["is_premium"], false);
    assert_eq!(data["image_url"], format!("/api/v1/illustrations/{id}/public"));
    assert!(data.get("storage_key").is_none());

    let stored = app.catalog.get_illustration(id).await.unwrap();
    let (date, rest) = stored.storage_key.split_once('-').unwrap();
    assert_eq!(date.len(), 8);
    assert_eq!(rest.len(), 16 + 4);
    assert!(app.storage.exists(&stored.storage_key).await.unwrap());

    let reply = send(&app.router, get(&format!("/api/v1/illustrations/{id}/public"))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, ROCKET);
    assert_eq!(reply.headers[header::CONTENT_TYPE], "image/svg+xml");
    assert_eq!(reply.headers[header::CACHE_CONTROL], "public, max-age=86400");
    assert_eq!(
        reply.headers[header::CONTENT_DISPOSITION],
        "inline; filename=\"rocket.svg\""
    );
    assert_eq!(
        reply.headers[header::CONTENT_SECURITY_POLICY],
        "default-src 'none'; img-src 'self'; style-src 'unsafe-inline'"
    );

    let etag = reply.headers[header::ETAG].to_str().unwrap().to_string();
    let cached = Request::get(format!("/api/v1/illustrations/{id}/public"))
        .header(header::IF_NONE_MATCH, etag)
        .body(Body::empty())
        .unwrap();
    let reply = send(&app.router, cached).await;
    assert_eq!(reply.status, StatusCode::NOT_MODIFIED);
    assert!(reply.body.is_empty());

    let by_category = send(
        &app.router,
        get(&format!("/api/v1/categories/{category}/illustrations")),
    )
    .await
    .json();
    assert_eq!(by_category["data"][0]["id"], id);

    let filtered = send(
        &app.router,
        get(&format!("/api/v1/illustrations?category_id={}", category + 1)),
    )
    .await
    .json();
    assert!(filtered["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn upload_validation() {
    let app = app().await;

    let png = send(
        &app.router,
        upload_request(
            "/api/v1/illustrations/upload",
            &[("title", "Logo")],
            Some(("logo.png", "image/png", ROCKET)),
        ),
    )
    .await;
    assert_eq!(png.status, StatusCode::BAD_REQUEST);

    let disguised = send(
        &app.router,
        upload_request(
            "/api/v1/illustrations/upload",
            &[("title", "Logo")],
            Some(("logo.svg", "image/svg+xml", b"\x89PNG\r\n\x1a\n")),
        ),
    )
    .await;
    assert_eq!(disguised.status, StatusCode::BAD_REQUEST);

    let untitled = send(
        &app.router,
        upload_request(
            "/api/v1/illustrations/upload",
            &[],
            Some(("logo.svg", "image/svg+xml", ROCKET)),
        ),
    )
    .await;
    assert_eq!(untitled.status, StatusCode::BAD_REQUEST);

    let no_file = send(
        &app.router,
        upload_request("/api/v1/illustrations/upload", &[("title", "Logo")], None),
    )
    .await;
    assert_eq!(no_file.status, StatusCode::BAD_REQUEST);

    let unknown_pack = send(
        &app.router,
        upload_request(
            "/api/v1/illustrations/upload",
            &[("title", "Logo"), ("pack_id", "99")],
            Some(("logo.svg", "image/svg+xml", ROCKET)),
        ),
    )
    .await;
    assert_eq!(unknown_pack.status, StatusCode::BAD_REQUEST);

    let list = send(&app.router, get("/api/v1/illustrations")).await.json();
    assert!(list["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn multipart_create_behaves_like_upload() {
    let app = app().await;

    let reply = send(
        &app.router,
        upload_request(
            "/api/v1/illustrations",
            &[("title", "Moon"), ("file_name", "moon.svg")],
            Some(("upload.svg", "image/svg+xml", ROCKET)),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.json()["data"]["file_name"], "moon.svg");
}

#[tokio::test]
async fn multipart_content_type_is_case_insensitive() {
    let app = app().await;

    let request = Request::post("/api/v1/illustrations")
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .header(
            header::CONTENT_TYPE,
            format!("Multipart/Form-Data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(
            &[("title", "Comet")],
            Some(("comet.svg", "image/svg+xml", ROCKET)),
        )))
        .unwrap();

    let reply = send(&app.router, request).await;
    assert_eq!(reply.status, StatusCode::CREATED, "{:?}", reply.body);
    assert_eq!(reply.json()["data"]["title"], "Comet");
}

#[tokio::test]
async fn json_create_requires_an_existing_object() {
    let app = app().await;
    let key = "20240101-00112233aabbccdd.svg";

    let missing_key = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/illustrations",
            json!({ "title": "Sun", "file_name": "sun.svg" }),
        ),
    )
    .await;
    assert_eq!(missing_key.status, StatusCode::BAD_REQUEST);

    let absent = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/illustrations",
            json!({ "title": "Sun", "file_name": "sun.svg", "storage_key": key }),
        ),
    )
    .await;
    assert_eq!(absent.status, StatusCode::BAD_REQUEST);

    app.storage
        .put_object(key, Bytes::from_static(ROCKET), "image/svg+xml")
        .await
        .unwrap();

    let style = create_term(&app, "styles", "Flat").await;
    send(&app.router, authed(Method::DELETE, &format!("/api/v1/styles/{style}"))).await;
    let deleted_style = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/illustrations",
            json!({ "title": "Sun", "file_name": "sun.svg", "storage_key": key, "style_id": style }),
        ),
    )
    .await;
    assert_eq!(deleted_style.status, StatusCode::BAD_REQUEST);

    let created = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/illustrations",
            json!({ "title": "Sun", "file_name": "sun.svg", "storage_key": key, "is_premium": true }),
        ),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let data = created.json()["data"].clone();
    assert_eq!(data["is_premium"], true);
    assert!(data["image_url"].as_str().unwrap().starts_with("/api/v1/i/"));

    let duplicate = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/illustrations",
            json!({ "title": "Sun again", "file_name": "sun.svg", "storage_key": key }),
        ),
    )
    .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn premium_illustrations_need_a_token() {
    let app = app().await;
    let data = upload(
        &app,
        &[("title", "Comet"), ("is_premium", "true")],
        "comet.svg",
    )
    .await;
    let id = data["id"].as_i64().unwrap();
    let image_url = data["image_url"].as_str().unwrap().to_string();
    assert!(image_url.starts_with("/api/v1/i/"));

    let public = send(&app.router, get(&format!("/api/v1/illustrations/{id}/public"))).await;
    assert_eq!(public.status, StatusCode::FORBIDDEN);

    let reply = send(&app.router, get(&image_url)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, ROCKET);
    assert_eq!(reply.headers[header::CACHE_CONTROL], "public, max-age=900");

    let key = app.catalog.get_illustration(id).await.unwrap().storage_key;
    assert_eq!(
        reply.headers[header::CONTENT_DISPOSITION],
        format!("inline; filename=\"{key}\"").as_str()
    );

    // Same token, one character off.
    let token = image_url.trim_start_matches("/api/v1/i/");
    let mut tampered: Vec<char> = token.chars().collect();
    let last = tampered.len() - 2;
    tampered[last] = if tampered[last] == 'A' { 'B' } else { 'A' };
    let tampered: String = tampered.into_iter().collect();

    let expired = app
        .signer
        .issue_at(&key, Duration::from_secs(5), chrono::Utc::now().timestamp() - 60)
        .unwrap();

    for token in [tampered.as_str(), expired.as_str(), "not-a-valid-base64!!"] {
        let reply = send(&app.router, get(&format!("/api/v1/i/{token}"))).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{token}");
        assert_eq!(reply.json(), json!({ "error": "invalid or expired token" }));
    }
}

#[tokio::test]
async fn token_for_a_missing_object_is_not_found() {
    let app = app().await;
    let token = app
        .signer
        .issue("20240101-ffffffffffffffff.svg", Duration::from_secs(60))
        .unwrap();

    let reply = send(&app.router, get(&format!("/api/v1/i/{token}"))).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json(), json!({ "error": "object not found" }));
}

#[tokio::test]
async fn internal_callers_fall_back_to_tokens_without_presigning() {
    let app = app().await;
    upload(&app, &[("title", "Star"), ("is_premium", "1")], "star.svg").await;

    let request = Request::get("/api/v1/illustrations?include_presign=1")
        .header(INTERNAL_REQUEST, INTERNAL_SECRET)
        .body(Body::empty())
        .unwrap();
    let list = send(&app.router, request).await.json();
    let url = list["data"][0]["image_url"].as_str().unwrap();
    assert!(url.starts_with("/api/v1/i/"));
}

#[tokio::test]
async fn image_urls_use_the_public_base() {
    let app = app_with(ServerConfig {
        public_base_url: Some("https://api.example.com/".into()),
        ..ServerConfig::default()
    })
    .await;
    let data = upload(&app, &[("title", "Planet")], "planet.svg").await;
    let id = data["id"].as_i64().unwrap();

    let detail = send(&app.router, get(&format!("/api/v1/illustrations/{id}"))).await.json();
    assert_eq!(
        detail["data"]["image_url"],
        format!("https://api.example.com/api/v1/illustrations/{id}/public")
    );
}

#[tokio::test]
async fn soft_deleted_illustrations_disappear() {
    let app = app().await;
    let data = upload(&app, &[("title", "Satellite")], "satellite.svg").await;
    let id = data["id"].as_i64().unwrap();

    let deleted = send(&app.router, authed(Method::DELETE, &format!("/api/v1/illustrations/{id}"))).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.json()["id"], id);

    let detail = send(&app.router, get(&format!("/api/v1/illustrations/{id}"))).await;
    assert_eq!(detail.status, StatusCode::NOT_FOUND);

    let public = send(&app.router, get(&format!("/api/v1/illustrations/{id}/public"))).await;
    assert_eq!(public.status, StatusCode::NOT_FOUND);

    let list = send(&app.router, get("/api/v1/illustrations")).await.json();
    assert!(list["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn presigned_urls_need_a_capable_backend() {
    let app = app().await;
    let data = upload(&app, &[("title", "Orbit")], "orbit.svg").await;
    let id = data["id"].as_i64().unwrap();

    let download = send(&app.router, get(&format!("/api/v1/illustrations/{id}/download"))).await;
    assert_eq!(download.status, StatusCode::NOT_IMPLEMENTED);

    let file = send(&app.router, get(&format!("/api/v1/illustrations/{id}/file"))).await;
    assert_eq!(file.status, StatusCode::NOT_IMPLEMENTED);

    let premium = upload(&app, &[("title", "Nebula"), ("is_premium", "on")], "nebula.svg").await;
    let premium_id = premium["id"].as_i64().unwrap();
    let hidden = send(
        &app.router,
        get(&format!("/api/v1/illustrations/{premium_id}/download")),
    )
    .await;
    assert_eq!(hidden.status, StatusCode::FORBIDDEN);

    let key = app.catalog.get_illustration(id).await.unwrap().storage_key;
    let by_key = send(&app.router, get(&format!("/api/v1/illustrations/file/{key}"))).await;
    assert_eq!(by_key.status, StatusCode::FORBIDDEN);

    let internal = Request::get(format!("/api/v1/illustrations/file/{key}"))
        .header(INTERNAL_REQUEST, INTERNAL_SECRET)
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app.router, internal).await.status, StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn pack_download_zips_live_illustrations() {
    let app = app().await;
    let pack = create_term(&app, "packs", "Space Travel").await;
    let pack_id = pack.to_string();

    upload(&app, &[("title", "One"), ("pack_id", &pack_id)], "one.svg").await;
    upload(&app, &[("title", "Two"), ("pack_id", &pack_id)], "one.svg").await;
    let lost = upload(&app, &[("title", "Lost"), ("pack_id", &pack_id)], "lost.svg").await;
    let removed = upload(&app, &[("title", "Removed"), ("pack_id", &pack_id)], "removed.svg").await;
    upload(&app, &[("title", "Elsewhere")], "elsewhere.svg").await;

    let lost_key = app
        .catalog
        .get_illustration(lost["id"].as_i64().unwrap())
        .await
        .unwrap()
        .storage_key;
    app.storage.delete_object(&lost_key).await.unwrap();
    send(
        &app.router,
        authed(
            Method::DELETE,
            &format!("/api/v1/illustrations/{}", removed["id"]),
        ),
    )
    .await;

    let reply = send(&app.router, get(&format!("/api/v1/packs/{pack}/download"))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.headers[header::CONTENT_TYPE], "application/zip");
    let disposition = reply.headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with(&format!("attachment; filename=pack-space-travel-{pack}-")));
    assert!(disposition.ends_with(".zip"));

    let mut archive = zip::ZipArchive::new(Cursor::new(reply.body.to_vec())).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names.len(), 2);
    assert_eq!(names[1], "one.svg");
    assert!(names[0].ends_with("-one.svg"));

    let mut content = Vec::new();
    archive
        .by_name("one.svg")
        .unwrap()
        .read_to_end(&mut content)
        .unwrap();
    assert_eq!(content, ROCKET);

    let missing = send(&app.router, get("/api/v1/packs/999/download")).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pack_download_survives_colliding_entry_names() {
    let app = app().await;
    let pack = create_term(&app, "packs", "Clash").await;
    let pack_id = pack.to_string();

    upload(&app, &[("title", "First"), ("pack_id", &pack_id)], "a.svg").await;
    let second = upload(&app, &[("title", "Second"), ("pack_id", &pack_id)], "a.svg").await;
    let taken = format!("{}-a.svg", second["id"]);
    upload(&app, &[("title", "Third"), ("pack_id", &pack_id)], &taken).await;

    let reply = send(&app.router, get(&format!("/api/v1/packs/{pack}/download"))).await;
    assert_eq!(reply.status, StatusCode::OK, "{:?}", reply.body);

    let archive = zip::ZipArchive::new(Cursor::new(reply.body.to_vec())).unwrap();
    let names: std::collections::HashSet<&str> = archive.file_names().collect();
    assert_eq!(archive.len(), 3);
    assert_eq!(names.len(), 3);
    assert!(names.contains("a.svg"));
    assert!(names.contains(taken.as_str()));
}
