//! Naukri.com search-result parser.

use super::{
    extract_cards, first_href, first_text, selector, JobListing, ScrapeError, NOT_AVAILABLE,
    NOT_DISCLOSED,
};

pub const BASE_URL: &str = "https://www.naukri.com/";
pub const MAX_PAGES: usize = 2;

const JOB_CARD: &str = "article.jobTuple, div.jobTuple, div.srp-jobtuple-wrapper";
const TITLE: &str = "a.title, a.job-title, .jobTupleHeader a";
const COMPANY: &str = "a.subTitle, .company-name, .subTitle a";
const LOCATION: &str = ".location, .loc-info, .job-location";
const SALARY: &str = ".salary, .sal-info, .salary-info";
const EXPERIENCE: &str = ".experience, .exp-info, .exp";
const SKILLS: &str = ".tags, .skills, .key-skills";

/// Words that describe the request rather than the job being searched for.
const FILLER_WORDS: &[&str] = &[
    "show", "me", "current", "latest", "find", "get", "list", "please", "job", "jobs", "from",
    "on", "naukri", "naukri.com", "com", "any", "some", "the", "a",
];

/// Result-page URLs for `query` under `base`, first page first.
///
/// Naukri serves search results at `/<slug>-jobs`, `/<slug>-jobs-2`, ...
/// A query with no search terms falls back to the landing page only.
pub fn search_urls(base: &str, query: &str) -> Vec<String> {
    let slug = search_slug(query);
    if slug.is_empty() {
        return vec![base.to_string()];
    }
    (1..=MAX_PAGES)
        .map(|page| match page {
            1 => format!("{base}{slug}-jobs"),
            n => format!("{base}{slug}-jobs-{n}"),
        })
        .collect()
}

fn search_slug(query: &str) -> String {
    query
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '`' || c == ',')
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '.'))
        .filter(|w| !w.is_empty() && !FILLER_WORDS.contains(w))
        .map(|w| {
            w.chars()
                .map(|c| if c.is_alphanumeric() { c } else { '-' })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("-")
}

pub fn parse_jobs(html: &str, page_url: &str) -> Result<Vec<JobListing>, ScrapeError> {
    let title = selector(TITLE)?;
    let company = selector(COMPANY)?;
    let location = selector(LOCATION)?;
    let salary = selector(SALARY)?;
    let experience = selector(EXPERIENCE)?;
    let skills = selector(SKILLS)?;

    let jobs = extract_cards(html, JOB_CARD, |card| JobListing {
        title: first_text(card, &title, NOT_AVAILABLE),
        company: first_text(card, &company, NOT_AVAILABLE),
        details: first_text(card, &location, NOT_AVAILABLE),
        experience: first_text(card, &experience, NOT_AVAILABLE),
        skills: first_text(card, &skills, NOT_AVAILABLE),
        salary: first_text(card, &salary, NOT_DISCLOSED),
        apply_url: first_href(card, &title, page_url),
    })?;

    Ok(jobs.into_iter().filter(JobListing::has_content).collect())
}
