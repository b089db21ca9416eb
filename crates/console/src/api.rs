//! Generic REST client for the admin API.
//!
//! Every request carries the session's bearer token; a missing token fails
//! fast with [`ConsoleError::MissingCredential`] before anything is sent.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use common::types::ErrorBody;
use models::{Entity, EntityId, FileId, Page, RawPage};

use crate::errors::ConsoleError;
use crate::pagination::PageRequest;
use crate::session::SessionStore;
use crate::toast::Toaster;

/// Page size used to fill selector options.
pub const OPTIONS_LIMIT: u32 = 100;

const APPLICATION_JSON: &str = "application/json";

pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ConsoleError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ConsoleError::Transport(e.to_string()))
}

#[derive(Deserialize)]
struct Uploaded {
    id: FileId,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: &str, session: SessionStore) -> Self {
        Self { http, base_url: Arc::from(base_url.trim_end_matches('/')), session }
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    pub fn session(&self) -> &SessionStore { &self.session }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ConsoleError> {
        let token = self.session.token().ok_or(ConsoleError::MissingCredential)?;
        Ok(self.http.request(method, self.url(path)).bearer_auth(token).header(ACCEPT, APPLICATION_JSON))
    }

    async fn execute(&self, method: &Method, path: &str, req: RequestBuilder) -> Result<Option<Value>, ConsoleError> {
        let resp = req.send().await?;
        let status = resp.status();
        debug!(%method, path, status = status.as_u16(), "api call");
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(error_from_body(status, &bytes));
        }
        if status == StatusCode::NO_CONTENT || bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Raw JSON call; `None` means the server answered without a body.
    #[instrument(skip(self, method, body), fields(method = %method))]
    pub async fn call(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Option<Value>, ConsoleError> {
        let mut req = self.request(method.clone(), path)?.header(CONTENT_TYPE, APPLICATION_JSON);
        if let Some(body) = body {
            req = req.json(body);
        }
        self.execute(&method, path, req).await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Option<Value>, ConsoleError> {
        let mut req = self.request(method.clone(), path)?.header(CONTENT_TYPE, APPLICATION_JSON);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        self.execute(&method, path, req).await
    }

    /// `GET path?limit=&page=&<filters>` normalized into a [`Page`].
    #[instrument(skip(self, filters))]
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        request: PageRequest,
        filters: &[(&str, &str)],
    ) -> Result<Page<T>, ConsoleError> {
        let request = request.normalize();
        let mut query = vec![("limit", request.limit.to_string()), ("page", request.page.to_string())];
        query.extend(filters.iter().map(|(k, v)| (*k, v.to_string())));
        let value = self
            .send_json::<()>(Method::GET, path, &query, None)
            .await?
            .ok_or_else(no_response)?;
        let raw: RawPage<T> = serde_json::from_value(value)?;
        Ok(Page::from_raw(raw, request.limit))
    }

    /// Up to [`OPTIONS_LIMIT`] records for a selector.
    pub async fn fetch_options<T: DeserializeOwned>(
        &self,
        path: &str,
        filters: &[(&str, &str)],
    ) -> Result<Vec<T>, ConsoleError> {
        let page = self.fetch_page(path, PageRequest::new(1, OPTIONS_LIMIT), filters).await?;
        Ok(page.data)
    }

    pub async fn get_one<T: DeserializeOwned>(&self, path: &str, id: &EntityId) -> Result<T, ConsoleError> {
        let value = self
            .send_json::<()>(Method::GET, &format!("{path}/{id}"), &[], None)
            .await?
            .ok_or_else(no_response)?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn create<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ConsoleError> {
        let value = self.send_json(Method::POST, path, &[], Some(body)).await?.ok_or_else(no_response)?;
        Ok(serde_json::from_value(value)?)
    }

    /// `PUT path/id`; some servers answer an update without a body.
    pub async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        id: &EntityId,
        body: &B,
    ) -> Result<Option<T>, ConsoleError> {
        match self.send_json(Method::PUT, &format!("{path}/{id}"), &[], Some(body)).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// `DELETE path/id` behind a loading toast that is replaced by the outcome.
    #[instrument(skip(self, toaster))]
    pub async fn delete_one(
        &self,
        path: &str,
        id: &EntityId,
        display_name: &str,
        toaster: &Toaster,
    ) -> Result<(), ConsoleError> {
        let toast = toaster.loading(format!("Deleting '{display_name}'..."), None);
        match self.send_json::<()>(Method::DELETE, &format!("{path}/{id}"), &[], None).await {
            Ok(_) => {
                toaster.success(format!("'{display_name}' deleted successfully."), Some(toast));
                Ok(())
            }
            Err(e) => {
                toaster.error(e.to_string(), Some(toast));
                Err(e)
            }
        }
    }

    /// Multipart `POST /files` with a single `file` field.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_file(&self, bytes: Vec<u8>, file_name: &str) -> Result<FileId, ConsoleError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let req = self.request(Method::POST, "/files")?.multipart(form);
        let value = self.execute(&Method::POST, "/files", req).await?.ok_or_else(no_response)?;
        let uploaded: Uploaded = serde_json::from_value(value)?;
        Ok(uploaded.id)
    }

    /// `GET /statistics/<name>` as raw JSON.
    pub async fn statistics(&self, name: &str) -> Result<Value, ConsoleError> {
        self.send_json::<()>(Method::GET, &format!("/statistics/{name}"), &[], None)
            .await?
            .ok_or_else(no_response)
    }

    pub async fn list<E: Entity>(&self, request: PageRequest, filters: &[(&str, &str)]) -> Result<Page<E>, ConsoleError> {
        self.fetch_page(&resource_path::<E>(), request, filters).await
    }

    pub async fn get<E: Entity>(&self, id: &EntityId) -> Result<E, ConsoleError> {
        self.get_one(&resource_path::<E>(), id).await
    }

    pub async fn create_entity<E: Entity>(&self, input: &E::Input) -> Result<E, ConsoleError> {
        self.create(&resource_path::<E>(), input).await
    }

    pub async fn update_entity<E: Entity>(&self, id: &EntityId, input: &E::Input) -> Result<Option<E>, ConsoleError> {
        self.update(&resource_path::<E>(), id, input).await
    }

    pub async fn delete_entity<E: Entity>(&self, entity: &E, toaster: &Toaster) -> Result<(), ConsoleError> {
        self.delete_one(&resource_path::<E>(), entity.id(), &entity.display_name(), toaster).await
    }
}

pub fn resource_path<E: Entity>() -> String { format!("/{}", E::RESOURCE) }

fn no_response() -> ConsoleError { ConsoleError::Decode("no response from server".into()) }

fn error_from_body(status: StatusCode, body: &[u8]) -> ConsoleError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .map(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    ConsoleError::Http { status: status.as_u16(), message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StaticAuthenticator;
    use crate::storage::MemoryStorage;
    use crate::toast::ToastKind;

    async fn anonymous_client() -> ApiClient {
        let session = SessionStore::restore(Arc::new(MemoryStorage::default()), Arc::new(StaticAuthenticator::default())).await;
        ApiClient::new(reqwest::Client::new(), "http://127.0.0.1:9/api/", session)
    }

    #[test]
    fn error_body_message_then_error_then_reason() {
        let e = error_from_body(StatusCode::NOT_FOUND, br#"{"message":"country not found"}"#);
        assert_eq!(e.to_string(), "API error (404): country not found");

        let e = error_from_body(StatusCode::BAD_REQUEST, br#"{"error":"bad name"}"#);
        assert_eq!(e, ConsoleError::Http { status: 400, message: "bad name".into() });

        let e = error_from_body(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>");
        assert_eq!(e, ConsoleError::Http { status: 500, message: "Internal Server Error".into() });
    }

    #[tokio::test]
    async fn missing_token_fails_before_sending() {
        let api = anonymous_client().await;
        assert_eq!(api.base_url(), "http://127.0.0.1:9/api");
        let err = api.fetch_page::<Value>("/countries", PageRequest::default(), &[]).await.unwrap_err();
        assert_eq!(err, ConsoleError::MissingCredential);
        let err = api.call(Method::GET, "/countries", None).await.unwrap_err();
        assert_eq!(err, ConsoleError::MissingCredential);
    }

    #[tokio::test]
    async fn failed_delete_replaces_loading_toast_with_error() {
        let api = anonymous_client().await;
        let toaster = Toaster::new();
        let err = api.delete_one("/countries", &EntityId::new("c1"), "Uzbekistan", &toaster).await.unwrap_err();
        assert_eq!(err, ConsoleError::MissingCredential);
        let toasts = toaster.current();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Error);
        assert_eq!(toasts[0].message, "authentication token not found");
    }

    #[tokio::test]
    async fn url_joins_with_single_slash() {
        let api = anonymous_client().await;
        assert_eq!(api.url("/countries"), "http://127.0.0.1:9/api/countries");
        assert_eq!(api.url("countries/1"), "http://127.0.0.1:9/api/countries/1");
    }
}
