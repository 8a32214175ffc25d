//! Prompt templates and reply parsing.

use serde::Serialize;

use crate::types::{DealAnalysis, PropertyInfo};

/// Reply the extractor is told to send when a message names no property.
pub const NO_ADDRESS_SENTINEL: &str = "NO_ADDRESS_FOUND";

pub fn address_extraction_system() -> &'static str {
    "You are a helpful assistant that extracts property addresses from user messages. \
     Extract ONLY the address in the format: Street, City, State. \
     If no clear address is found, respond with 'NO_ADDRESS_FOUND'."
}

pub fn analyst_system() -> &'static str {
    r#"You are an expert real estate investment analyst.

Your job is to analyze property data and provide detailed insights including:
1. Property overview with key details
2. Investment analysis (ARV, repair costs, ROI, profit potential)
3. Market assumptions and reasoning
4. Potential risks and opportunities
5. Clear recommendation (BUY/PASS/NEGOTIATE)

Be specific, use the numbers provided, and explain your reasoning. The calculated metrics are authoritative: do not recompute or contradict them. Make reasonable assumptions about market conditions and mention them clearly."#
}

pub fn chat_system() -> &'static str {
    "You are a helpful real estate investment assistant. Answer questions about \
     real estate investing, property analysis, and market trends."
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// User message for the commentary call: the property record, computed
/// metrics and repair estimate as JSON.
pub fn build_commentary_prompt(
    property: &PropertyInfo,
    analysis: &DealAnalysis,
    user_query: &str,
) -> String {
    let query = if user_query.trim().is_empty() {
        property.address.as_str()
    } else {
        user_query.trim()
    };

    let repair = match &analysis.repair_estimate {
        Some(estimate) => pretty(estimate),
        None => format!(
            "User-provided repair budget: {}",
            crate::report::format_currency(analysis.estimated_repairs)
        ),
    };

    format!(
        r#"Analyze this property investment opportunity:

USER QUERY: {query}

PROPERTY DATA:
{property}

CALCULATED METRICS:
{metrics}

REPAIR ESTIMATE:
{repair}

Please provide a comprehensive analysis with:
1. Property summary
2. Investment metrics breakdown
3. Your assumptions (market trends, neighborhood, buyer demand, etc.)
4. Risk factors
5. Final recommendation

Format your response in a clear, professional manner."#,
        property = pretty(property),
        metrics = pretty(analysis),
    )
}

/// Interpret the extractor's reply. Sentinel or empty replies mean no
/// address; surrounding quotes and a trailing period are dropped.
pub fn parse_extracted_address(reply: &str) -> Option<String> {
    let trimmed = reply.trim();
    if trimmed.is_empty() || trimmed.contains(NO_ADDRESS_SENTINEL) {
        return None;
    }

    let cleaned = trimmed
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim_end_matches('.')
        .trim();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}
