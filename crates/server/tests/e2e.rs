use std::net::SocketAddr;

use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use configs::ServerConfig;
use server::{build_app, build_state};

struct TestApp {
    base_url: String,
    http: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String { format!("{}/api/v1/admin{path}", self.base_url) }

    async fn login(&self) -> anyhow::Result<String> {
        let resp = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({"username": "admin", "password": "password123"}))
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await?;
        Ok(body["token"].as_str().unwrap_or_default().to_string())
    }
}

async fn start_server(seed: bool) -> anyhow::Result<TestApp> {
    let cfg = ServerConfig { seed_demo_data: seed, jwt_secret: "test-secret".into(), ..ServerConfig::default() };
    let app = build_app(build_state(&cfg).await?);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {e}");
        }
    });
    Ok(TestApp { base_url: format!("http://{addr}"), http: reqwest::Client::new() })
}

#[tokio::test]
async fn health_and_metrics_are_public() -> anyhow::Result<()> {
    let app = start_server(false).await?;
    let resp = app.http.get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let _ = app.http.get(app.url("/countries")).send().await?;
    let text = app.http.get(format!("{}/metrics", app.base_url)).send().await?.text().await?;
    assert!(text.contains("marketplace_api_requests_total"));
    Ok(())
}

#[tokio::test]
async fn forged_token_is_rejected() -> anyhow::Result<()> {
    let app = start_server(false).await?;
    let resp = app.http.get(app.url("/countries")).bearer_auth("fake-jwt-token.YWRtaW4.1").send().await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "invalid or expired token");
    Ok(())
}

#[tokio::test]
async fn uploaded_file_can_be_referenced_and_downloaded() -> anyhow::Result<()> {
    let app = start_server(false).await?;
    let token = app.login().await?;

    let part = reqwest::multipart::Part::bytes(b"icon-bytes".to_vec())
        .file_name("icon.png")
        .mime_str("image/png")?;
    let resp = app
        .http
        .post(app.url("/files"))
        .bearer_auth(&token)
        .multipart(reqwest::multipart::Form::new().part("file", part))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let file_id = resp.json::<Value>().await?["id"].as_str().unwrap_or_default().to_string();
    assert!(!file_id.is_empty());

    let resp = app.http.get(app.url(&format!("/files/{file_id}"))).bearer_auth(&token).send().await?;
    assert_eq!(resp.headers()["content-type"], "image/png");
    assert_eq!(resp.bytes().await?.as_ref(), b"icon-bytes");

    let resp = app
        .http
        .post(app.url("/categories"))
        .bearer_auth(&token)
        .json(&json!({"name": {"uz": "Tozalash", "ru": "Уборка", "en": "Cleaning"}, "icon": file_id}))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let category: Value = resp.json().await?;
    assert_eq!(category["icon"], file_id.as_str());
    Ok(())
}

#[tokio::test]
async fn district_region_must_belong_to_country() -> anyhow::Result<()> {
    let app = start_server(true).await?;
    let token = app.login().await?;

    let regions: Value = app.http.get(app.url("/regions")).bearer_auth(&token).send().await?.json().await?;
    let region_id = regions["data"][0]["id"].as_str().unwrap_or_default().to_string();
    assert!(regions["data"][0]["country"]["name"]["en"].is_string());

    let other: Value = app
        .http
        .post(app.url("/countries"))
        .bearer_auth(&token)
        .json(&json!({"name": {"uz": "Tojikiston", "ru": "Таджикистан", "en": "Tajikistan"}}))
        .send()
        .await?
        .json()
        .await?;

    let resp = app
        .http
        .post(app.url("/districts"))
        .bearer_auth(&token)
        .json(&json!({
            "name": {"uz": "X", "ru": "X", "en": "X"},
            "countryId": other["id"],
            "regionId": region_id,
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert!(body["message"].as_str().unwrap_or_default().contains("does not belong"));
    Ok(())
}

#[tokio::test]
async fn master_requires_existing_services() -> anyhow::Result<()> {
    let app = start_server(true).await?;
    let token = app.login().await?;
    let district: Value = app.http.get(app.url("/districts?limit=1")).bearer_auth(&token).send().await?.json().await?;
    let d = &district["data"][0];

    let resp = app
        .http
        .post(app.url("/masters"))
        .bearer_auth(&token)
        .json(&json!({
            "firstName": "Aziz",
            "lastName": "Karimov",
            "phone": "+998901234567",
            "location": {"countryId": d["countryId"], "regionId": d["regionId"], "districtId": d["id"]},
            "serviceIds": ["missing"],
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "service 'missing' does not exist");
    Ok(())
}
