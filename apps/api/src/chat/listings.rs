//! Decides whether scraped listings are good enough to show, and renders them
//! into the bullet list the reply prompt embeds.

use crate::scraping::{EventListing, JobListing, MentorshipListing, NOT_AVAILABLE};

/// A scraped record the pipeline can summarise for the LLM.
pub trait Listing {
    /// At most this many records go into a prompt.
    const PROMPT_LIMIT: usize;

    /// Whether this record carries the fields that make a listing meaningful.
    fn is_usable(&self) -> bool;

    fn summary_line(&self) -> String;
}

fn present(field: &str) -> bool {
    field != NOT_AVAILABLE
}

impl Listing for JobListing {
    const PROMPT_LIMIT: usize = 8;

    fn is_usable(&self) -> bool {
        present(&self.title) && present(&self.company)
    }

    fn summary_line(&self) -> String {
        format!(
            "- {} at {} (Location: {}, Skills: {}, Salary: {}, Apply: {})",
            self.title, self.company, self.details, self.skills, self.salary, self.apply_url
        )
    }
}

impl Listing for EventListing {
    const PROMPT_LIMIT: usize = 5;

    fn is_usable(&self) -> bool {
        present(&self.title) && present(&self.date)
    }

    fn summary_line(&self) -> String {
        format!(
            "- {} (Date: {}, Location: {}, Description: {}, Register: {})",
            self.title, self.date, self.location, self.description, self.url
        )
    }
}

impl Listing for MentorshipListing {
    const PROMPT_LIMIT: usize = 5;

    fn is_usable(&self) -> bool {
        present(&self.title) || present(&self.mentor_name)
    }

    fn summary_line(&self) -> String {
        format!(
            "- {} (Mentor: {}, Description: {}, Register: {})",
            self.title, self.mentor_name, self.description, self.url
        )
    }
}

/// Scraped output is worth showing if at least one record is usable.
pub fn is_valid<T: Listing>(items: &[T]) -> bool {
    items.iter().any(T::is_usable)
}

/// The first `PROMPT_LIMIT` records, one per line. Unusable records are kept:
/// the prompt tells the model how to treat missing fields.
pub fn render<T: Listing>(items: &[T]) -> String {
    items
        .iter()
        .take(T::PROMPT_LIMIT)
        .map(T::summary_line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraping::NOT_DISCLOSED;

    fn job(title: &str, company: &str) -> JobListing {
        JobListing {
            title: title.to_string(),
            company: company.to_string(),
            details: "Remote".to_string(),
            experience: NOT_AVAILABLE.to_string(),
            skills: "Rust".to_string(),
            salary: NOT_DISCLOSED.to_string(),
            apply_url: "https://example.com/apply".to_string(),
        }
    }

    fn event(title: &str, date: &str) -> EventListing {
        EventListing {
            title: title.to_string(),
            date: date.to_string(),
            location: "Online".to_string(),
            description: "Talk".to_string(),
            url: NOT_AVAILABLE.to_string(),
        }
    }

    fn mentor(title: &str, name: &str) -> MentorshipListing {
        MentorshipListing {
            title: title.to_string(),
            mentor_name: name.to_string(),
            description: NOT_AVAILABLE.to_string(),
            url: NOT_AVAILABLE.to_string(),
        }
    }

    #[test]
    fn test_jobs_need_title_and_company() {
        assert!(!is_valid::<JobListing>(&[]));
        assert!(!is_valid(&[job("Engineer", NOT_AVAILABLE), job(NOT_AVAILABLE, "Acme")]));
        assert!(is_valid(&[job(NOT_AVAILABLE, "Acme"), job("Engineer", "Acme")]));
    }

    #[test]
    fn test_events_need_title_and_date() {
        assert!(!is_valid(&[event("Summit", NOT_AVAILABLE)]));
        assert!(is_valid(&[event("Summit", "1 June")]));
    }

    #[test]
    fn test_mentorships_need_title_or_name() {
        assert!(!is_valid(&[mentor(NOT_AVAILABLE, NOT_AVAILABLE)]));
        assert!(is_valid(&[mentor(NOT_AVAILABLE, "Priya")]));
        assert!(is_valid(&[mentor("Circle", NOT_AVAILABLE)]));
    }

    #[test]
    fn test_job_line_format() {
        assert_eq!(
            job("Engineer", "Acme").summary_line(),
            "- Engineer at Acme (Location: Remote, Skills: Rust, Salary: Not disclosed, Apply: https://example.com/apply)"
        );
    }

    #[test]
    fn test_event_and_mentor_line_format() {
        assert_eq!(
            event("Summit", "1 June").summary_line(),
            "- Summit (Date: 1 June, Location: Online, Description: Talk, Register: N/A)"
        );
        assert_eq!(
            mentor("Circle", "Priya").summary_line(),
            "- Circle (Mentor: Priya, Description: N/A, Register: N/A)"
        );
    }

    #[test]
    fn test_render_caps_jobs_at_eight() {
        let jobs: Vec<_> = (0..12).map(|i| job(&format!("Role {i}"), "Acme")).collect();
        let rendered = render(&jobs);
        assert_eq!(rendered.lines().count(), 8);
        assert!(rendered.contains("Role 7"));
        assert!(!rendered.contains("Role 8"));
    }

    #[test]
    fn test_render_caps_events_at_five() {
        let events: Vec<_> = (0..7).map(|i| event(&format!("E{i}"), "today")).collect();
        assert_eq!(render(&events).lines().count(), 5);
    }
}
