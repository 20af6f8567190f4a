//! System prompt for the decision node

/// Build the fixed system prompt
///
/// The prompt names the bound tools so the model knows what it can reach;
/// host actions are bound separately and resolved by the host.
pub fn system_prompt(language: &str, tool_names: &[String]) -> String {
    format!(
        "You are Ebisu, a helpful sales prospect research assistant. Talk in {}. \
         You have access to powerful people search tools through Apollo. \
         When users ask you to search for people/prospects, use the people_search tool \
         to find relevant contacts. \
         You can search by job titles, company names, locations, and other criteria. \
         Examples of good search queries: \
         - 'Find software engineers at tech companies in San Francisco' \
         - 'Search for marketing managers at SaaS companies' \
         - 'Look for sales directors in the healthcare industry' \
         Always be helpful and provide context about the search results you find. \
         Available tools: {}",
        language,
        tool_names.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_mentions_language_and_tools() {
        let prompt = system_prompt(
            "spanish",
            &["people_search".to_string(), "company_search".to_string()],
        );
        assert!(prompt.contains("Talk in spanish."));
        assert!(prompt.contains("people_search, company_search"));
    }
}
