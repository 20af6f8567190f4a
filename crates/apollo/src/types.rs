//! Request parameters and raw wire types
//!
//! Filter fields mirror the Apollo API; unset fields are omitted from the
//! request body. See <https://docs.apollo.io/reference/people-search>.

use serde::{Deserialize, Serialize};

/// Filters for a people search
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PeopleSearchParams {
    /// Name of the person to find
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q_person_name: Option<String>,
    /// Job titles held by the people to find
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_titles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_similar_titles: Option<bool>,
    /// Where the people live
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_locations: Option<Vec<String>>,
    /// Seniority within the current employer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_seniorities: Option<Vec<String>>,
    /// Headquarters location of the current employer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_locations: Option<Vec<String>>,
    /// Employer domain names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q_organization_domains_list: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email_status: Option<Vec<String>>,
    /// Apollo ids of employers to include
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_ids: Option<Vec<String>>,
    /// Employee-count ranges, e.g. "1,10"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_num_employees_ranges: Option<Vec<String>>,
    /// Free-text keyword filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q_keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

/// Filters for an organization search
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrganizationSearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q_organization_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_locations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q_organization_domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_num_employees_ranges: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_industries: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

/// Identifiers for a person-enrichment lookup
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnrichmentParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Domain of the current employer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal_personal_emails: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal_phone_number: Option<bool>,
}

/// A person as returned by the provider, before cleaning
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPerson {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub email_status: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub organization: Option<RawOrganization>,
    #[serde(default)]
    pub employment_history: Option<Vec<RawEmployment>>,
}

/// One employment-history entry; index 0 is the current position
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEmployment {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// An organization as returned by the provider, before cleaning
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOrganization {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub primary_domain: Option<String>,
    #[serde(default)]
    pub founded_year: Option<i64>,
    /// Revenue as printed by enrichment responses
    #[serde(default)]
    pub annual_revenue_printed: Option<String>,
    /// Revenue as printed by search responses
    #[serde(default)]
    pub organization_revenue_printed: Option<String>,
    #[serde(default)]
    pub estimated_num_employees: Option<u64>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub total_funding_printed: Option<String>,
    #[serde(default)]
    pub latest_funding_stage: Option<String>,
}
