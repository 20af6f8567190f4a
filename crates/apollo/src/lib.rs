//! Apollo data-provider client
//!
//! People and organization search, job postings, and enrichment against the
//! Apollo REST API, with responses cleaned into fixed-shape records the
//! model and UI can consume directly.

use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use ebisu_config::ApolloConfig;

pub mod clean;
pub mod types;

pub use clean::{
    normalize_person, EmploymentEntry, JobPosting, OrganizationRecord, PersonRecord,
    ProfileSummary, LOCKED_EMAIL, UNLOCK_SENTINEL,
};
pub use types::{
    EnrichmentParams, OrganizationSearchParams, PeopleSearchParams, RawEmployment,
    RawOrganization, RawPerson,
};

#[derive(Error, Debug)]
pub enum ApolloError {
    /// Raised on first use, not at client construction
    #[error("APOLLO_API_KEY is not configured")]
    MissingApiKey,

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-2xx provider response: status code, raw body, human message
    #[error("{message} (status {status})")]
    Api {
        status: u16,
        body: String,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, ApolloError>;

/// Apollo REST client
///
/// Holds the credential read once from [`ApolloConfig`]; no global state.
pub struct ApolloClient {
    http: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl ApolloClient {
    pub fn new(config: &ApolloConfig) -> Self {
        Self {
            http: Client::new(),
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    fn key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ApolloError::MissingApiKey)
    }

    async fn post(&self, path: &str, body: Value, context: &str) -> Result<Value> {
        let url = format!("{}{}", self.endpoint, path);
        let response = self
            .http
            .post(&url)
            .header("Cache-Control", "no-cache")
            .json(&body)
            .send()
            .await?;
        Self::into_payload(response, context).await
    }

    async fn get(&self, path: &str, query: &[(&str, String)], context: &str) -> Result<Value> {
        let url = format!("{}{}", self.endpoint, path);
        let response = self
            .http
            .get(&url)
            .header("Cache-Control", "no-cache")
            .query(query)
            .send()
            .await?;
        Self::into_payload(response, context).await
    }

    async fn into_payload(response: reqwest::Response, context: &str) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApolloError::Api {
                status: status.as_u16(),
                body,
                message: context.to_string(),
            });
        }
        Ok(response.json().await?)
    }

    /// Search for people matching the given filters
    ///
    /// Returns normalized records; an empty result set is not an error.
    pub async fn people_search(&self, params: PeopleSearchParams) -> Result<Vec<PersonRecord>> {
        let mut body = serde_json::to_value(&params)?;
        body["api_key"] = json!(self.key()?);

        let payload = self
            .post(
                "/v1/mixed_people/search",
                body,
                "Failed to fetch people search results",
            )
            .await?;

        let people: Vec<RawPerson> = match payload.get("people") {
            Some(Value::Null) | None => Vec::new(),
            Some(value) => serde_json::from_value(value.clone())?,
        };
        debug!(count = people.len(), "people search returned");

        Ok(people.iter().map(normalize_person).collect())
    }

    /// Search for organizations matching the given filters
    pub async fn organization_search(
        &self,
        params: OrganizationSearchParams,
    ) -> Result<Vec<OrganizationRecord>> {
        let mut body = serde_json::to_value(&params)?;
        body["api_key"] = json!(self.key()?);

        let payload = self
            .post(
                "/v1/mixed_companies/search",
                body,
                "Failed to fetch organization search results",
            )
            .await?;

        let orgs: Vec<RawOrganization> = match payload.get("organizations") {
            Some(Value::Null) | None => Vec::new(),
            Some(value) => serde_json::from_value(value.clone())?,
        };
        debug!(count = orgs.len(), "organization search returned");

        Ok(orgs.iter().map(clean::clean_organization).collect())
    }

    /// Current job postings for an organization
    pub async fn organization_job_postings(
        &self,
        organization_id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<JobPosting>> {
        if organization_id.is_empty() {
            return Err(ApolloError::InvalidParams(
                "organization_id is required".to_string(),
            ));
        }
        let key = self.key()?.to_string();

        let payload = self
            .get(
                &format!("/v1/organizations/{}/job_postings", organization_id),
                &[
                    ("api_key", key),
                    ("page", page.to_string()),
                    ("per_page", per_page.to_string()),
                ],
                "Failed to fetch organization job postings",
            )
            .await?;

        let postings = match payload.get("organization_job_postings") {
            Some(Value::Null) | None => Vec::new(),
            Some(value) => serde_json::from_value(value.clone())?,
        };
        Ok(postings)
    }

    /// Enrich a single person from whatever identifiers are known
    pub async fn people_enrichment(
        &self,
        params: EnrichmentParams,
    ) -> Result<Option<ProfileSummary>> {
        let mut body = serde_json::to_value(&params)?;
        body["api_key"] = json!(self.key()?);

        let payload = self
            .post(
                "/v1/people/match",
                body,
                "Failed to fetch person enrichment data",
            )
            .await?;

        match payload.get("person") {
            Some(Value::Null) | None => Ok(None),
            Some(value) => {
                let raw: RawPerson = serde_json::from_value(value.clone())?;
                Ok(Some(clean::clean_person(&raw)))
            }
        }
    }

    /// Enrich a single organization by domain
    pub async fn organization_enrichment(
        &self,
        domain: &str,
    ) -> Result<Option<OrganizationRecord>> {
        if domain.is_empty() {
            return Err(ApolloError::InvalidParams("domain is required".to_string()));
        }
        let key = self.key()?.to_string();

        let payload = self
            .get(
                "/v1/organizations/enrich",
                &[("api_key", key), ("domain", domain.to_string())],
                "Failed to fetch organization enrichment data",
            )
            .await?;

        match payload.get("organization") {
            Some(Value::Null) | None => Ok(None),
            Some(value) => {
                let raw: RawOrganization = serde_json::from_value(value.clone())?;
                Ok(Some(clean::clean_organization(&raw)))
            }
        }
    }
}
