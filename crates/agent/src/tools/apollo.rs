//! Apollo-backed tools

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use ebisu_apollo::{ApolloClient, EnrichmentParams, OrganizationSearchParams, PeopleSearchParams};

use super::{
    Tool, ORGANIZATION_ENRICHMENT, ORGANIZATION_JOB_POSTINGS, ORGANIZATION_SEARCH,
    PEOPLE_ENRICHMENT, PEOPLE_SEARCH,
};

type ToolOutput = std::result::Result<String, Box<dyn std::error::Error + Send + Sync>>;

/// Search for people in the Apollo database
///
/// The execution node runs this capability through its streaming protocol;
/// the plain [`Tool`] implementation exists for direct registry use.
pub struct PeopleSearchTool {
    client: Arc<ApolloClient>,
}

impl PeopleSearchTool {
    pub fn new(client: Arc<ApolloClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for PeopleSearchTool {
    fn name(&self) -> &str {
        PEOPLE_SEARCH
    }

    fn description(&self) -> &str {
        "Search for people in the Apollo database by job title, location, seniority, \
         employer, and keywords. Returns normalized contact records."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "q_person_name": { "type": "string", "description": "Name of the person to find" },
                "person_titles": {
                    "type": "array", "items": { "type": "string" },
                    "description": "Job titles held by the people to find"
                },
                "include_similar_titles": { "type": "boolean", "description": "Match similar titles too" },
                "person_locations": {
                    "type": "array", "items": { "type": "string" },
                    "description": "Where the people live"
                },
                "person_seniorities": {
                    "type": "array", "items": { "type": "string" },
                    "description": "Seniority within the current employer, e.g. manager, director"
                },
                "organization_locations": {
                    "type": "array", "items": { "type": "string" },
                    "description": "Headquarters location of the current employer"
                },
                "q_organization_domains_list": {
                    "type": "array", "items": { "type": "string" },
                    "description": "Employer domain names"
                },
                "contact_email_status": {
                    "type": "array", "items": { "type": "string" },
                    "description": "Email statuses to include, e.g. verified"
                },
                "organization_ids": {
                    "type": "array", "items": { "type": "string" },
                    "description": "Apollo ids of employers to include"
                },
                "organization_num_employees_ranges": {
                    "type": "array", "items": { "type": "string" },
                    "description": "Employee-count ranges, e.g. \"1,10\""
                },
                "q_keywords": { "type": "string", "description": "Free-text keyword filter" },
                "page": { "type": "integer", "minimum": 1 },
                "per_page": { "type": "integer", "minimum": 1, "maximum": 100 }
            }
        })
    }

    async fn execute(&self, args: Value) -> ToolOutput {
        let params: PeopleSearchParams = serde_json::from_value(args)?;
        let people = self.client.people_search(params).await?;
        Ok(serde_json::to_string(&people)?)
    }
}

/// Search for organizations in the Apollo database
pub struct OrganizationSearchTool {
    client: Arc<ApolloClient>,
}

impl OrganizationSearchTool {
    pub fn new(client: Arc<ApolloClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for OrganizationSearchTool {
    fn name(&self) -> &str {
        ORGANIZATION_SEARCH
    }

    fn description(&self) -> &str {
        "Search for organizations in the Apollo database by name, location, domain, \
         headcount, and industry."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "q_organization_name": { "type": "string" },
                "organization_locations": { "type": "array", "items": { "type": "string" } },
                "q_organization_domains": { "type": "array", "items": { "type": "string" } },
                "organization_num_employees_ranges": { "type": "array", "items": { "type": "string" } },
                "organization_industries": { "type": "array", "items": { "type": "string" } },
                "page": { "type": "integer", "minimum": 1 },
                "per_page": { "type": "integer", "minimum": 1, "maximum": 100 }
            }
        })
    }

    async fn execute(&self, args: Value) -> ToolOutput {
        let params: OrganizationSearchParams = serde_json::from_value(args)?;
        let organizations = self.client.organization_search(params).await?;
        Ok(serde_json::to_string(&organizations)?)
    }
}

/// Current job postings for a company
pub struct JobPostingsTool {
    client: Arc<ApolloClient>,
}

impl JobPostingsTool {
    pub fn new(client: Arc<ApolloClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for JobPostingsTool {
    fn name(&self) -> &str {
        ORGANIZATION_JOB_POSTINGS
    }

    fn description(&self) -> &str {
        "List the current job postings for a company identified by its Apollo id."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "organization_id": { "type": "string", "description": "Apollo id of the company" },
                "page": { "type": "integer", "minimum": 1 },
                "per_page": { "type": "integer", "minimum": 1, "maximum": 100 }
            },
            "required": ["organization_id"]
        })
    }

    async fn execute(&self, args: Value) -> ToolOutput {
        let organization_id = args["organization_id"].as_str().unwrap_or_default();
        let page = args["page"].as_u64().unwrap_or(1) as u32;
        let per_page = args["per_page"].as_u64().unwrap_or(10) as u32;

        let postings = self
            .client
            .organization_job_postings(organization_id, page, per_page)
            .await?;
        Ok(serde_json::to_string(&postings)?)
    }
}

/// Enrich a single person from known identifiers
pub struct PeopleEnrichmentTool {
    client: Arc<ApolloClient>,
}

impl PeopleEnrichmentTool {
    pub fn new(client: Arc<ApolloClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for PeopleEnrichmentTool {
    fn name(&self) -> &str {
        PEOPLE_ENRICHMENT
    }

    fn description(&self) -> &str {
        "Enrich a single person from whatever identifiers are known: name, email, \
         employer domain, or LinkedIn URL."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "first_name": { "type": "string" },
                "last_name": { "type": "string" },
                "name": { "type": "string", "description": "Full name" },
                "domain": { "type": "string", "description": "Domain of the current employer" },
                "email": { "type": "string" },
                "linkedin_url": { "type": "string" },
                "reveal_personal_emails": { "type": "boolean" },
                "reveal_phone_number": { "type": "boolean" }
            }
        })
    }

    async fn execute(&self, args: Value) -> ToolOutput {
        let params: EnrichmentParams = serde_json::from_value(args)?;
        match self.client.people_enrichment(params).await? {
            Some(profile) => Ok(serde_json::to_string(&profile)?),
            None => Ok("No matching person found.".to_string()),
        }
    }
}

/// Enrich a single organization by domain
pub struct OrganizationEnrichmentTool {
    client: Arc<ApolloClient>,
}

impl OrganizationEnrichmentTool {
    pub fn new(client: Arc<ApolloClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for OrganizationEnrichmentTool {
    fn name(&self) -> &str {
        ORGANIZATION_ENRICHMENT
    }

    fn description(&self) -> &str {
        "Enrich a single organization identified by its domain name."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "domain": { "type": "string", "description": "Domain to enrich, e.g. acme.io" }
            },
            "required": ["domain"]
        })
    }

    async fn execute(&self, args: Value) -> ToolOutput {
        let domain = args["domain"].as_str().unwrap_or_default();
        match self.client.organization_enrichment(domain).await? {
            Some(org) => Ok(serde_json::to_string(&org)?),
            None => Ok("No matching organization found.".to_string()),
        }
    }
}
