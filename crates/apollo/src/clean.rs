//! Response cleaning
//!
//! Projections from raw provider payloads into the fixed-shape records the
//! rest of the system consumes. All of these are pure functions; fields the
//! provider withheld are dropped from the serialized output instead of being
//! carried as nulls.

use serde::{Deserialize, Serialize};

use crate::types::{RawOrganization, RawPerson};

/// Placeholder address Apollo returns until a contact is unlocked
pub const LOCKED_EMAIL: &str = "email_not_unlocked@domain.com";

/// What the locked placeholder is rewritten to
pub const UNLOCK_SENTINEL: &str = "Unlock";

/// Normalized people-search result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub first_name: String,
    pub last_name: String,
    pub linkedin_url: String,
    pub email_status: String,
    /// Contact address, or [`UNLOCK_SENTINEL`] when the provider withholds it
    pub email: String,
    /// Title at the current position, empty when unknown
    pub title: String,
    /// Name of the current employer, empty when unknown
    pub organization: String,
    /// "City, State", or whichever half is known
    pub location: String,
}

/// Project a raw person into a [`PersonRecord`]
///
/// The current title and employer come from the first employment-history
/// entry; the location is synthesized from city and state.
pub fn normalize_person(raw: &RawPerson) -> PersonRecord {
    let email = match raw.email.as_deref() {
        Some(LOCKED_EMAIL) => UNLOCK_SENTINEL.to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    let (title, organization) = raw
        .employment_history
        .as_deref()
        .and_then(|history| history.first())
        .map(|current| {
            (
                current.title.clone().unwrap_or_default(),
                current.organization_name.clone().unwrap_or_default(),
            )
        })
        .unwrap_or_default();

    let city = raw.city.as_deref().unwrap_or_default();
    let state = raw.state.as_deref().unwrap_or_default();
    let location = if !city.is_empty() && !state.is_empty() {
        format!("{}, {}", city, state)
    } else if !city.is_empty() {
        city.to_string()
    } else {
        state.to_string()
    };

    PersonRecord {
        first_name: raw.first_name.clone().unwrap_or_default(),
        last_name: raw.last_name.clone().unwrap_or_default(),
        linkedin_url: raw.linkedin_url.clone().unwrap_or_default(),
        email_status: raw.email_status.clone().unwrap_or_default(),
        email,
        title,
        organization,
        location,
    }
}

/// Cleaned organization, from search or enrichment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founded_year: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employees: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_funding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_funding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Capped at 10 to stay model-context friendly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

/// Clean a raw organization payload
///
/// Enrichment responses print revenue as `annual_revenue_printed`, search
/// responses as `organization_revenue_printed`; the first present wins.
pub fn clean_organization(raw: &RawOrganization) -> OrganizationRecord {
    OrganizationRecord {
        name: raw.name.clone(),
        website_url: raw.website_url.clone(),
        linkedin_url: raw.linkedin_url.clone(),
        domain: raw.primary_domain.clone(),
        founded_year: raw.founded_year,
        revenue: raw
            .annual_revenue_printed
            .clone()
            .or_else(|| raw.organization_revenue_printed.clone()),
        employees: raw.estimated_num_employees,
        industry: raw.industry.clone(),
        latest_funding: raw.latest_funding_stage.clone(),
        total_funding: raw.total_funding_printed.clone(),
        description: raw.short_description.clone(),
        keywords: raw
            .keywords
            .as_ref()
            .map(|k| k.iter().take(10).cloned().collect()),
    }
}

/// One cleaned employment-history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Defaults to "Present" for the ongoing position
    pub end_date: String,
}

/// Cleaned enrichment profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    /// "City, State, Country", only when all three are known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_organization: Option<OrganizationRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_history: Option<Vec<EmploymentEntry>>,
}

/// Clean a raw person into an enrichment profile
pub fn clean_person(raw: &RawPerson) -> ProfileSummary {
    let location = match (
        raw.city.as_deref(),
        raw.state.as_deref(),
        raw.country.as_deref(),
    ) {
        (Some(city), Some(state), Some(country))
            if !city.is_empty() && !state.is_empty() && !country.is_empty() =>
        {
            Some(format!("{}, {}, {}", city, state, country))
        }
        _ => None,
    };

    ProfileSummary {
        name: raw.name.clone(),
        title: raw.title.clone(),
        headline: raw.headline.clone(),
        linkedin_url: raw.linkedin_url.clone(),
        location,
        current_organization: raw.organization.as_ref().map(clean_organization),
        employment_history: raw.employment_history.as_ref().map(|history| {
            history
                .iter()
                .map(|job| EmploymentEntry {
                    title: job.title.clone(),
                    organization_name: job.organization_name.clone(),
                    start_date: job.start_date.clone(),
                    end_date: job
                        .end_date
                        .clone()
                        .unwrap_or_else(|| "Present".to_string()),
                })
                .collect()
        }),
    }
}

/// Current job posting at an organization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<String>,
}
