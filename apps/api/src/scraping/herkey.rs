//! Herkey page parsers: jobs board, events calendar, mentorship search.

use super::{
    extract_cards, first_href, first_text, selector, EventListing, JobListing, MentorshipListing,
    ScrapeError, NOT_AVAILABLE, NOT_DISCLOSED,
};

pub const JOBS_URL: &str = "https://www.herkey.com/jobs";
pub const EVENTS_URL: &str = "https://events.herkey.com/events";
pub const MENTORSHIP_URL: &str = "https://www.herkey.com/search";

const JOB_CARD: &str = "[data-test-id='job-details']";
const JOB_TITLE: &str = "[data-test-id='job-title']";
const JOB_COMPANY: &str = "[data-test-id='company-name']";
const JOB_DETAILS: &str = "p[class*='capitalize css-y9sg3k']";
const JOB_SKILLS: &str = "span[class*='capitalize css-2wpeo8']";
const JOB_APPLY: &str = "[data-test-id='apply-job']";

const EVENT_CARD: &str = ".card, .event-item, [class*='event'], [data-test-id*='event']";
const EVENT_TITLE: &str =
    "h1, h2, h3, h4, h5, h6, [class*='title'], [class*='MuiTypography-root'], [data-test-id*='title'], span, p";
const EVENT_DATE: &str =
    "time, [class*='date'], [class*='MuiTypography-root'], [data-test-id*='date'], span, p";
const EVENT_LOCATION: &str =
    "[class*='location'], [class*='MuiTypography-root'], [data-test-id*='location'], span, p";
const DESCRIPTION: &str =
    "[class*='description'], [class*='MuiTypography-root'], [data-test-id*='description'], p, div";
const EVENT_LINK: &str = "a[href], [class*='register'], [class*='link']";

const MENTOR_CARD: &str =
    ".card, .mentor-item, [class*='mentor'], [data-test-id*='mentor'], [class*='result']";
const MENTOR_NAME: &str =
    "[class*='mentor-name'], [class*='name'], [class*='MuiTypography-root'], [data-test-id*='mentor-name'], span, p";
const MENTOR_LINK: &str = "a[href], [class*='register'], [class*='link'], [class*='apply']";

/// Job cards from the Herkey jobs board. Salary is never shown there.
pub fn parse_jobs(html: &str, page_url: &str) -> Result<Vec<JobListing>, ScrapeError> {
    let title = selector(JOB_TITLE)?;
    let company = selector(JOB_COMPANY)?;
    let details = selector(JOB_DETAILS)?;
    let skills = selector(JOB_SKILLS)?;
    let apply = selector(JOB_APPLY)?;

    let jobs = extract_cards(html, JOB_CARD, |card| JobListing {
        title: first_text(card, &title, NOT_AVAILABLE),
        company: first_text(card, &company, NOT_AVAILABLE),
        details: first_text(card, &details, NOT_AVAILABLE),
        experience: NOT_AVAILABLE.to_string(),
        skills: first_text(card, &skills, NOT_AVAILABLE),
        salary: NOT_DISCLOSED.to_string(),
        apply_url: first_href(card, &apply, page_url),
    })?;

    Ok(jobs.into_iter().filter(JobListing::has_content).collect())
}

pub fn parse_events(html: &str, page_url: &str) -> Result<Vec<EventListing>, ScrapeError> {
    let title = selector(EVENT_TITLE)?;
    let date = selector(EVENT_DATE)?;
    let location = selector(EVENT_LOCATION)?;
    let description = selector(DESCRIPTION)?;
    let link = selector(EVENT_LINK)?;

    let events = extract_cards(html, EVENT_CARD, |card| EventListing {
        title: first_text(card, &title, NOT_AVAILABLE),
        date: first_text(card, &date, NOT_AVAILABLE),
        location: first_text(card, &location, NOT_AVAILABLE),
        description: first_text(card, &description, NOT_AVAILABLE),
        url: first_href(card, &link, page_url),
    })?;

    Ok(dedup(events.into_iter().filter(EventListing::has_content)))
}

pub fn parse_mentorships(html: &str, page_url: &str) -> Result<Vec<MentorshipListing>, ScrapeError> {
    let title = selector(EVENT_TITLE)?;
    let name = selector(MENTOR_NAME)?;
    let description = selector(DESCRIPTION)?;
    let link = selector(MENTOR_LINK)?;

    let mentors = extract_cards(html, MENTOR_CARD, |card| MentorshipListing {
        title: first_text(card, &title, NOT_AVAILABLE),
        mentor_name: first_text(card, &name, NOT_AVAILABLE),
        description: first_text(card, &description, NOT_AVAILABLE),
        url: first_href(card, &link, page_url),
    })?;

    Ok(dedup(mentors.into_iter().filter(MentorshipListing::has_content)))
}

/// Drops exact repeats, keeping first-seen order. Nested card matches produce them.
fn dedup<T: PartialEq>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
