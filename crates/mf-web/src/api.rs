//! Clients REST API
//!
//! Thin client over the `/users` resource. No retries; callers turn errors
//! into user-facing messages.

use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder, Response};
use log::{debug, error};
use mf_sync::{Client, ClientId, ClientPage, ClientSource, CreateClientRequest, UpdateClientRequest};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Page size used to pull the whole list in one request
pub const FETCH_ALL_LIMIT: usize = 1000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("HTTP error! status: {status}")]
    Status { status: u16 },
    #[error("failed to encode request body: {0}")]
    Encode(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("{0} returned no body")]
    EmptyBody(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

/// Decide what a successful response body means.
///
/// DELETE responses, empty bodies and non-JSON content are "no result"
/// and never parsed.
pub fn decode_body<T: DeserializeOwned>(
    method: Method,
    content_type: Option<&str>,
    content_length: Option<&str>,
    body: &str,
) -> Result<Option<T>, ApiError> {
    if method == Method::Delete || content_length == Some("0") || body.trim().is_empty() {
        return Ok(None);
    }
    if !content_type.is_some_and(|ct| ct.contains("application/json")) {
        return Ok(None);
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestClient {
    base_url: String,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================
    // Endpoints
    // ========================

    pub async fn get_clients(&self, page: usize, limit: usize) -> Result<ClientPage, ApiError> {
        let path = format!("/users?page={}&limit={}", page, limit);
        Ok(self
            .request::<ClientPage>(Method::Get, &path, None)
            .await?
            .unwrap_or_default())
    }

    pub async fn fetch_all_clients(&self) -> Result<Vec<Client>, ApiError> {
        let page = self.get_clients(1, FETCH_ALL_LIMIT).await?;
        debug!("[api] fetched {} of {} clients", page.clients.len(), page.total_clients);
        Ok(page.clients)
    }

    pub async fn get_client(&self, id: ClientId) -> Result<Client, ApiError> {
        let path = format!("/users/{}", id);
        self.request(Method::Get, &path, None)
            .await?
            .ok_or(ApiError::EmptyBody(path))
    }

    pub async fn create_client(&self, data: &CreateClientRequest) -> Result<Client, ApiError> {
        let body = encode(data)?;
        self.request(Method::Post, "/users", Some(body))
            .await?
            .ok_or_else(|| ApiError::EmptyBody("/users".to_string()))
    }

    pub async fn update_client(&self, id: ClientId, data: &UpdateClientRequest) -> Result<Client, ApiError> {
        let path = format!("/users/{}", id);
        let body = encode(data)?;
        self.request(Method::Patch, &path, Some(body))
            .await?
            .ok_or(ApiError::EmptyBody(path))
    }

    pub async fn delete_client(&self, id: ClientId) -> Result<(), ApiError> {
        let path = format!("/users/{}", id);
        self.request::<serde_json::Value>(Method::Delete, &path, None).await?;
        Ok(())
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<Option<T>, ApiError> {
        let url = self.url(path);
        let builder = builder(method, &url).header("Content-Type", "application/json");
        let response = match body {
            Some(body) => builder
                .body(body)
                .map_err(|e| ApiError::Encode(e.to_string()))?
                .send()
                .await,
            None => builder.send().await,
        }
        .map_err(|e| {
            error!("[api] {:?} {} failed: {}", method, path, e);
            ApiError::Network(e.to_string())
        })?;

        if !response.ok() {
            error!("[api] {:?} {} answered {}", method, path, response.status());
            return Err(ApiError::Status {
                status: response.status(),
            });
        }
        read_body(method, response).await
    }
}

#[async_trait(?Send)]
impl ClientSource for RestClient {
    type Error = ApiError;

    async fn fetch_all(&self) -> Result<Vec<Client>, ApiError> {
        self.fetch_all_clients().await
    }
}

fn builder(method: Method, url: &str) -> RequestBuilder {
    match method {
        Method::Get => Request::get(url),
        Method::Post => Request::post(url),
        Method::Patch => Request::patch(url),
        Method::Delete => Request::delete(url),
    }
}

async fn read_body<T: DeserializeOwned>(method: Method, response: Response) -> Result<Option<T>, ApiError> {
    if method == Method::Delete {
        return Ok(None);
    }
    let headers = response.headers();
    let content_type = headers.get("content-type");
    let content_length = headers.get("content-length");
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    decode_body(method, content_type.as_deref(), content_length.as_deref(), &text)
}

fn encode<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: Option<&str> = Some("application/json; charset=utf-8");

    #[test]
    fn test_delete_and_empty_bodies_are_not_parsed() {
        let none: Option<Client> = decode_body(Method::Delete, JSON, None, "{not json").unwrap();
        assert!(none.is_none());
        let none: Option<Client> = decode_body(Method::Post, JSON, Some("0"), "").unwrap();
        assert!(none.is_none());
        let none: Option<Client> = decode_body(Method::Patch, JSON, None, "   ").unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_non_json_content_is_ignored() {
        let none: Option<Client> = decode_body(Method::Get, Some("text/html"), None, "<html>").unwrap();
        assert!(none.is_none());
        let none: Option<Client> = decode_body(Method::Get, None, None, "{}").unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_page_body_is_decoded() {
        let body = r#"{"clients":[{"id":3,"name":"Ana","salary":3500,"companyValuation":120000}],"currentPage":1,"totalPages":1,"totalClients":1}"#;
        let page: ClientPage = decode_body(Method::Get, JSON, None, body).unwrap().unwrap();
        assert_eq!(page.clients[0].company_valuation, 120000.0);
        assert_eq!(page.total_clients, 1);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let result: Result<Option<Client>, _> = decode_body(Method::Get, JSON, None, "{\"id\":");
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_urls() {
        let api = RestClient::new("https://api.example.com/");
        assert_eq!(api.url("/users?page=1&limit=1000"), "https://api.example.com/users?page=1&limit=1000");
    }
}
