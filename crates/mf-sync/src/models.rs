//! Client Models
//!
//! Data structures shared by every surface and the REST collaborator.

use serde::{Deserialize, Serialize};

/// Server-assigned client identifier
pub type ClientId = u32;

/// Client record (matches the REST API, camelCase on the wire)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub salary: f64,
    pub company_valuation: f64,
}

/// Body of `POST /users`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    pub name: String,
    pub salary: f64,
    pub company_valuation: f64,
}

/// Body of `PATCH /users/:id`, only the present fields are sent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_valuation: Option<f64>,
}

impl From<CreateClientRequest> for UpdateClientRequest {
    fn from(req: CreateClientRequest) -> Self {
        Self {
            name: Some(req.name),
            salary: Some(req.salary),
            company_valuation: Some(req.company_valuation),
        }
    }
}

/// Response of `GET /users?page&limit`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPage {
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub current_page: usize,
    #[serde(default)]
    pub total_pages: usize,
    #[serde(default)]
    pub total_clients: usize,
}

/// Full state pushed by a `state:sync` event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub selected_ids: Vec<ClientId>,
}
