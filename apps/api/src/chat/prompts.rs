// Chat pipeline prompt templates.
// Placeholders: {query}, {context}, {listings}, {url}. Fill with `fill`.

pub const BIAS_PROMPT: &str = r#"You must respond with ONLY a valid JSON object, with no additional text, markdown, or formatting.
Analyze this query for gender bias: "{query}"

Return your analysis in this exact JSON format:
{"is_biased": false, "alternative_response": null}
or
{"is_biased": true, "alternative_response": "unbiased rephrasing here"}"#;

pub const INTENT_PROMPT: &str = r#"Return ONLY ONE of these exact words to classify the intent:
job_listing, event, mentorship, faq, unknown

Query: {query}"#;

pub const JOBS_PROMPT: &str = r#"Given the following user query, conversation context, and scraped job listings, generate a concise and user-friendly response.
Query: {query}
Context: {context}
Job Listings:
{listings}
Response: Present every scraped job listing in a conversational tone. Include key details (title, company, location, skills, salary, apply URL). If a detail is missing, say so briefly rather than inventing it.
Note: Every job must come with a link. Use the job's own apply URL when present, otherwise link to {url}."#;

pub const JOBS_FALLBACK_PROMPT: &str = r#"Given the following user query and conversation context, generate a response as if you were retrieving job listings. No valid job listings were found, so provide a generic response with mock job data relevant to the query.
Query: {query}
Context: {context}
Response: Provide a concise list of mock job listings (2-3 examples) that align with the query. Include title, company, location, skills, salary, and a placeholder apply URL."#;

pub const EVENTS_PROMPT: &str = r#"Given the following user query, conversation context, and scraped event listings, generate a concise and user-friendly response.
Query: {query}
Context: {context}
Event Listings:
{listings}
Response: Summarize the event listings in a natural, conversational tone. Include key details (title, date, location, description, register URL) and make it engaging."#;

pub const EVENTS_FALLBACK_PROMPT: &str = r#"Given the following user query and conversation context, generate a response as if you were retrieving upcoming events. No valid event listings were found, so provide a generic response with mock event data relevant to the query.
Query: {query}
Context: {context}
Response: Provide a concise list of mock event listings (2-3 examples) that align with the query. Include title, date, location, description, and a placeholder register URL."#;

pub const MENTORSHIP_PROMPT: &str = r#"Given the following user query, conversation context, and scraped mentorship opportunities, generate a concise and user-friendly response.
Query: {query}
Context: {context}
Mentorship Opportunities:
{listings}
Response: Summarize the mentorship opportunities in a natural, conversational tone. Include key details (title, mentor name, description, register URL) and make it engaging."#;

pub const MENTORSHIP_FALLBACK_PROMPT: &str = r#"Given the following user query and conversation context, generate a response as if you were retrieving mentorship opportunities. No valid mentorship opportunities were found, so provide a generic response with mock mentorship data relevant to the query.
Query: {query}
Context: {context}
Response: Provide a concise list of mock mentorship opportunities (2-3 examples) that align with the query. Include title, mentor name, description, and a placeholder register URL."#;

pub const FAQ_PROMPT: &str = r#"Given the following user query, generate a response as if you were answering a frequently asked question.
Query: {query}
Context: {context}
Response: Provide a concise answer to the query."#;

pub const GENERAL_PROMPT: &str = r#"Given the following user query, generate a response as if you were a helpful assistant.
Query: {query}
Context: {context}
Response: Provide a concise answer to the query.
Remember that you are Asha Bot, here to help women with career development, job opportunities, and mentorship programs."#;

/// Substitutes `{key}` placeholders in `template` in a single pass.
///
/// Substituted values are copied verbatim, so braces inside user text or
/// scraped listings are never expanded. Unknown `{...}` spans are kept.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let slot = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match slot {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
