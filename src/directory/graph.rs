//! Microsoft Graph implementation of the directory seam.
//!
//! Authenticates with the OAuth2 client-credentials grant and reads users
//! and their `directReports` through the v1.0 REST API. Paging follows the
//! `@odata.nextLink` URLs returned by the service.

use super::{AttributeSelector, Directory, DirectoryError, Page};
use crate::models::Entity;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

const USER_ODATA_TYPE: &str = "#microsoft.graph.user";

/// Connection settings for [`GraphDirectory`].
#[derive(Clone)]
pub struct GraphConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// Graph API root, e.g. `https://graph.microsoft.com/v1.0`.
    pub graph_url: String,
    /// Token authority root, e.g. `https://login.microsoftonline.com`.
    pub authority_url: String,
    pub scope: String,
    pub timeout_seconds: u64,
}

impl fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("graph_url", &self.graph_url)
            .field("authority_url", &self.authority_url)
            .field("scope", &self.scope)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl GraphConfig {
    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_url.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorResponse {
    error: GraphErrorBody,
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// A directory object as returned by Graph with `$select`.
#[derive(Debug, Deserialize)]
struct GraphObject {
    #[serde(rename = "@odata.type", default)]
    odata_type: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
    #[serde(rename = "userPrincipalName", default)]
    user_principal_name: Option<String>,
    /// Everything else, including extension attributes.
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct GraphCollection {
    #[serde(default)]
    value: Vec<GraphObject>,
    #[serde(rename = "@odata.nextLink", default)]
    next_link: Option<String>,
}

impl GraphObject {
    /// Converts to an [`Entity`], dropping records that are not users or have no id.
    fn into_entity(self, hire_date_attribute: &str) -> Option<Entity> {
        if let Some(ref kind) = self.odata_type {
            if kind != USER_ODATA_TYPE {
                debug!("Skipping non-user directory object of type {}", kind);
                return None;
            }
        }

        let id = self.id?;
        let mut entity = Entity::new(
            id,
            self.display_name.unwrap_or_default(),
            self.user_principal_name.unwrap_or_default(),
        );
        entity.hire_date_raw = self.extra.get(hire_date_attribute).and_then(attribute_text);
        Some(entity)
    }
}

/// String form of an attribute value; `None` for JSON null.
fn attribute_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn collection_into_page(collection: GraphCollection, hire_date_attribute: &str) -> Page {
    Page {
        items: collection
            .value
            .into_iter()
            .filter_map(|obj| obj.into_entity(hire_date_attribute))
            .collect(),
        next_link: collection.next_link,
    }
}

/// Builds a [`DirectoryError::Api`] from a failed Graph response body.
fn api_error(status: StatusCode, body: &str) -> DirectoryError {
    let message = match serde_json::from_str::<GraphErrorResponse>(body) {
        Ok(parsed) if !parsed.error.code.is_empty() => {
            format!("{} ({})", parsed.error.message, parsed.error.code)
        }
        Ok(parsed) => parsed.error.message,
        Err(_) => body.trim().to_string(),
    };
    DirectoryError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Graph-backed [`Directory`].
pub struct GraphDirectory {
    config: GraphConfig,
    http_client: reqwest::Client,
    token: OnceCell<String>,
}

impl GraphDirectory {
    /// Create a client. No network traffic happens until the first lookup.
    pub fn new(config: GraphConfig) -> Result<Self, DirectoryError> {
        info!(
            "Initializing Graph client for tenant {} at {}",
            config.tenant_id, config.graph_url
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
            token: OnceCell::new(),
        })
    }

    /// Bearer token for this run, fetched on first use.
    async fn access_token(&self) -> Result<&str, DirectoryError> {
        let token = self
            .token
            .get_or_try_init(|| self.request_token())
            .await?;
        Ok(token.as_str())
    }

    async fn request_token(&self) -> Result<String, DirectoryError> {
        debug!("Requesting access token for client {}", self.config.client_id);

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("scope", self.config.scope.as_str()),
        ];

        let response = self
            .http_client
            .post(self.config.token_url())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let reason = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => format!("token endpoint returned {}", status),
            };
            return Err(DirectoryError::Auth(reason));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        debug!("Access token acquired");
        Ok(token.access_token)
    }

    /// `{graph_url}/seg/seg...` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, DirectoryError> {
        let mut url = Url::parse(&self.config.graph_url)
            .map_err(|e| DirectoryError::InvalidUrl(format!("{}: {}", self.config.graph_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| DirectoryError::InvalidUrl(self.config.graph_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Parses a continuation link. Only links on the `graph_url` origin get
    /// the bearer token.
    fn continuation_url(&self, link: &str) -> Result<Url, DirectoryError> {
        let url = Url::parse(link)
            .map_err(|e| DirectoryError::InvalidUrl(format!("{}: {}", link, e)))?;
        let api = Url::parse(&self.config.graph_url)
            .map_err(|e| DirectoryError::InvalidUrl(format!("{}: {}", self.config.graph_url, e)))?;
        if url.origin() != api.origin() {
            return Err(DirectoryError::InvalidUrl(format!(
                "next page link {} is outside {}",
                link, self.config.graph_url
            )));
        }
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, DirectoryError> {
        let token = self.access_token().await?;
        debug!("GET {}", url);
        let response = self.http_client.get(url).bearer_auth(token).send().await?;
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, DirectoryError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Directory for GraphDirectory {
    async fn get_entity_by_principal_name(
        &self,
        name: &str,
        select: &AttributeSelector,
    ) -> Result<Option<Entity>, DirectoryError> {
        let mut url = self.endpoint(&["users", name])?;
        url.query_pairs_mut()
            .append_pair("$select", &select.to_select());

        let response = self.get(url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("No user with principal name {}", name);
            return Ok(None);
        }

        let object: GraphObject = Self::read_json(response).await?;
        Ok(object.into_entity(select.hire_date_attribute()))
    }

    async fn get_direct_reports(
        &self,
        entity_id: &str,
        select: &AttributeSelector,
        page_size: u32,
    ) -> Result<Page, DirectoryError> {
        let mut url = self.endpoint(&["users", entity_id, "directReports"])?;
        url.query_pairs_mut()
            .append_pair("$select", &select.to_select())
            .append_pair("$top", &page_size.to_string());

        let collection: GraphCollection = Self::read_json(self.get(url).await?).await?;
        Ok(collection_into_page(
            collection,
            select.hire_date_attribute(),
        ))
    }

    async fn get_next_page(
        &self,
        page: &Page,
        select: &AttributeSelector,
    ) -> Result<Option<Page>, DirectoryError> {
        let Some(ref link) = page.next_link else {
            return Ok(None);
        };

        // The link already carries $select, $top and the skip token.
        let url = self.continuation_url(link)?;

        let collection: GraphCollection = Self::read_json(self.get(url).await?).await?;
        Ok(Some(collection_into_page(
            collection,
            select.hire_date_attribute(),
        )))
    }
}
