//! Job list filtering and ordering.

use std::collections::BTreeSet;

use super::types::{Job, JobStatus};

/// Follow-up urgency buckets for the quick filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
  /// Follow-up date set and before today
  Overdue,
  /// Follow-up date set, today or later
  Upcoming,
  /// No follow-up date set
  NoDate,
}

impl Urgency {
  pub const ALL: &'static [Urgency] = &[Urgency::Overdue, Urgency::Upcoming, Urgency::NoDate];

  pub fn label(&self) -> &'static str {
    match self {
      Urgency::Overdue => "Overdue",
      Urgency::Upcoming => "Upcoming",
      Urgency::NoDate => "No date",
    }
  }

  fn matches(&self, job: &Job, today: &str) -> bool {
    match (self, job.next_follow_up_date.as_deref()) {
      (Urgency::Overdue, Some(date)) => date < today,
      (Urgency::Upcoming, Some(date)) => date >= today,
      (Urgency::NoDate, None) => true,
      _ => false,
    }
  }
}

/// Filter configuration for the job list view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
  /// Case-insensitive substring over company, role, location and tags
  pub text_query: String,
  pub status: Option<JobStatus>,
  /// Conjunctive: a job must carry every selected tag
  pub tags: BTreeSet<String>,
  pub urgency: Option<Urgency>,
}

impl JobFilter {
  pub fn is_empty(&self) -> bool {
    self.text_query.trim().is_empty()
      && self.status.is_none()
      && self.tags.is_empty()
      && self.urgency.is_none()
  }

  /// Toggle a tag in the conjunctive tag set.
  pub fn toggle_tag(&mut self, tag: &str) {
    if !self.tags.remove(tag) {
      self.tags.insert(tag.to_string());
    }
  }

  /// Apply the filter and return matching jobs, most recently updated
  /// first. `today` is resolved once per pass from the local calendar.
  pub fn apply(&self, jobs: &[Job]) -> Vec<Job> {
    let today = crate::domain::followup::today();
    self.apply_at(jobs, &today)
  }

  /// Like [`apply`](Self::apply) with an explicit "today", for tests.
  pub fn apply_at(&self, jobs: &[Job], today: &str) -> Vec<Job> {
    let query = self.text_query.trim().to_lowercase();

    let mut matched: Vec<Job> = jobs
      .iter()
      .filter(|job| self.status.map_or(true, |s| job.status == s))
      .filter(|job| self.urgency.map_or(true, |u| u.matches(job, today)))
      .filter(|job| self.tags.iter().all(|tag| job.tags.iter().any(|t| t == tag)))
      .filter(|job| {
        if query.is_empty() {
          return true;
        }
        job.company.to_lowercase().contains(&query)
          || job.role.to_lowercase().contains(&query)
          || job.location.to_lowercase().contains(&query)
          || job.tags.join(" ").to_lowercase().contains(&query)
      })
      .cloned()
      .collect();

    // Plain string compare is correct: updated_at values are same-length
    // ISO-8601 timestamps.
    matched.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    matched
  }
}

/// Every distinct tag across the job list, sorted.
pub fn all_tags(jobs: &[Job]) -> Vec<String> {
  let set: BTreeSet<&str> = jobs
    .iter()
    .flat_map(|j| j.tags.iter().map(String::as_str))
    .collect();
  set.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::types::Job;

  fn job(company: &str, tags: &[&str], updated: &str) -> Job {
    let mut job = Job::new(
      company.to_string(),
      "Reception / Cleaner".to_string(),
      "Byron Bay, NSW".to_string(),
      "2025-01-01T00:00:00.000Z".to_string(),
    );
    job.tags = tags.iter().map(|t| t.to_string()).collect();
    job.updated_at = updated.to_string();
    job
  }

  fn sample_jobs() -> Vec<Job> {
    let mut a = job("Byron Hostel", &["hostel", "accommodation"], "2025-03-01T10:00:00.000Z");
    a.status = JobStatus::Applied;
    a.next_follow_up_date = Some("2025-02-01".to_string());

    let mut b = job("Cafe Corner", &["cafe"], "2025-03-02T10:00:00.000Z");
    b.status = JobStatus::ToApply;
    b.next_follow_up_date = Some("2025-09-01".to_string());

    let mut c = job("Farm Connect", &["farm", "hostel"], "2025-03-03T10:00:00.000Z");
    c.status = JobStatus::Applied;

    vec![a, b, c]
  }

  const TODAY: &str = "2025-06-01";

  #[test]
  fn test_no_filter_returns_all_sorted_by_updated_desc() {
    let jobs = sample_jobs();
    let result = JobFilter::default().apply_at(&jobs, TODAY);
    let companies: Vec<&str> = result.iter().map(|j| j.company.as_str()).collect();
    assert_eq!(companies, ["Farm Connect", "Cafe Corner", "Byron Hostel"]);
  }

  #[test]
  fn test_status_filter() {
    let jobs = sample_jobs();
    let filter = JobFilter {
      status: Some(JobStatus::Applied),
      ..Default::default()
    };
    let result = filter.apply_at(&jobs, TODAY);
    assert_eq!(result.len(), 2);
    assert!(result.iter().all(|j| j.status == JobStatus::Applied));
  }

  #[test]
  fn test_urgency_buckets() {
    let jobs = sample_jobs();

    let overdue = JobFilter {
      urgency: Some(Urgency::Overdue),
      ..Default::default()
    }
    .apply_at(&jobs, TODAY);
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].company, "Byron Hostel");

    let upcoming = JobFilter {
      urgency: Some(Urgency::Upcoming),
      ..Default::default()
    }
    .apply_at(&jobs, TODAY);
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].company, "Cafe Corner");

    let no_date = JobFilter {
      urgency: Some(Urgency::NoDate),
      ..Default::default()
    }
    .apply_at(&jobs, TODAY);
    assert_eq!(no_date.len(), 1);
    assert_eq!(no_date[0].company, "Farm Connect");
  }

  #[test]
  fn test_follow_up_today_counts_as_upcoming() {
    let mut j = job("Due Today", &[], "2025-03-01T10:00:00.000Z");
    j.next_follow_up_date = Some(TODAY.to_string());

    let filter = JobFilter {
      urgency: Some(Urgency::Upcoming),
      ..Default::default()
    };
    assert_eq!(filter.apply_at(&[j], TODAY).len(), 1);
  }

  #[test]
  fn test_tag_filter_is_conjunctive() {
    let jobs = sample_jobs();
    let mut filter = JobFilter::default();
    filter.toggle_tag("hostel");
    assert_eq!(filter.apply_at(&jobs, TODAY).len(), 2);

    // A job tagged only "hostel" drops out when "accommodation" is added
    filter.toggle_tag("accommodation");
    let result = filter.apply_at(&jobs, TODAY);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].company, "Byron Hostel");
  }

  #[test]
  fn test_text_search_is_case_insensitive_and_covers_tags() {
    let jobs = sample_jobs();

    let by_company = JobFilter {
      text_query: "byron".to_string(),
      ..Default::default()
    }
    .apply_at(&jobs, TODAY);
    // Matches "Byron Hostel" (company) and "Byron Bay" (location of all three)
    assert_eq!(by_company.len(), 3);

    let by_tag = JobFilter {
      text_query: "FARM".to_string(),
      ..Default::default()
    }
    .apply_at(&jobs, TODAY);
    assert_eq!(by_tag.len(), 1);
    assert_eq!(by_tag[0].company, "Farm Connect");
  }

  #[test]
  fn test_filter_is_idempotent() {
    let jobs = sample_jobs();
    let filter = JobFilter {
      status: Some(JobStatus::Applied),
      text_query: "hostel".to_string(),
      ..Default::default()
    };

    let once = filter.apply_at(&jobs, TODAY);
    let twice = filter.apply_at(&once, TODAY);
    assert_eq!(once, twice);
  }

  #[test]
  fn test_all_tags_sorted_distinct() {
    let jobs = sample_jobs();
    assert_eq!(
      all_tags(&jobs),
      ["accommodation", "cafe", "farm", "hostel"]
    );
  }
}
