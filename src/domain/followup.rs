//! Date helpers, follow-up defaults, and dashboard buckets.

use chrono::{Duration, Local, NaiveDate};

use super::types::{Job, JobStatus};

/// Current timestamp, ISO 8601 with milliseconds (the record format).
pub fn now_iso() -> String {
  chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Today's local calendar date as "YYYY-MM-DD".
pub fn today() -> String {
  Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Today plus `days`, as "YYYY-MM-DD".
pub fn today_plus(days: i64) -> String {
  (Local::now().date_naive() + Duration::days(days))
    .format("%Y-%m-%d")
    .to_string()
}

/// Loose validation for user-entered dates.
pub fn is_valid_date(s: &str) -> bool {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Follow-up date to set when a job transitions to `status`.
///
/// Applied gets today+3 only when no date is set yet; FollowUp and
/// Interview always overwrite (today+4 and today+1); every other status
/// leaves the date untouched (returns None).
pub fn follow_up_default(status: JobStatus, existing: Option<&str>) -> Option<String> {
  match status {
    JobStatus::Applied => {
      if existing.is_none() {
        Some(today_plus(3))
      } else {
        None
      }
    }
    JobStatus::FollowUp => Some(today_plus(4)),
    JobStatus::Interview => Some(today_plus(1)),
    _ => None,
  }
}

/// Per-status counts for the dashboard KPI tiles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusCounts {
  pub total: usize,
  pub to_apply: usize,
  pub applied: usize,
  pub interview: usize,
}

/// Follow-up buckets for the dashboard "action required" section.
/// Only active jobs (not Offer/Rejected) are considered.
#[derive(Debug, Clone, Default)]
pub struct FollowUpBuckets {
  pub overdue: Vec<Job>,
  pub due_today: Vec<Job>,
}

pub fn status_counts(jobs: &[Job]) -> StatusCounts {
  let mut counts = StatusCounts {
    total: jobs.len(),
    ..Default::default()
  };
  for job in jobs {
    match job.status {
      JobStatus::ToApply => counts.to_apply += 1,
      JobStatus::Applied => counts.applied += 1,
      JobStatus::Interview => counts.interview += 1,
      _ => {}
    }
  }
  counts
}

/// Split active jobs into overdue and due-today by `next_follow_up_date`.
/// `today_str` is computed once by the caller so one pass sees one "today".
pub fn follow_up_buckets(jobs: &[Job], today_str: &str) -> FollowUpBuckets {
  let mut buckets = FollowUpBuckets::default();
  for job in jobs {
    if !job.status.is_active() {
      continue;
    }
    match job.next_follow_up_date.as_deref() {
      Some(date) if date < today_str => buckets.overdue.push(job.clone()),
      Some(date) if date == today_str => buckets.due_today.push(job.clone()),
      _ => {}
    }
  }
  buckets
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::types::Job;

  fn job_with(status: JobStatus, follow_up: Option<&str>) -> Job {
    let mut job = Job::new(
      "Acme".to_string(),
      "Cook".to_string(),
      "Bundaberg, QLD".to_string(),
      "2025-01-01T00:00:00.000Z".to_string(),
    );
    job.status = status;
    job.next_follow_up_date = follow_up.map(String::from);
    job
  }

  #[test]
  fn test_applied_sets_three_days_only_when_unset() {
    let set = follow_up_default(JobStatus::Applied, None);
    assert_eq!(set, Some(today_plus(3)));

    // Existing date is left alone
    assert_eq!(follow_up_default(JobStatus::Applied, Some("2030-01-01")), None);
  }

  #[test]
  fn test_follow_up_and_interview_always_overwrite() {
    assert_eq!(
      follow_up_default(JobStatus::FollowUp, Some("2030-01-01")),
      Some(today_plus(4))
    );
    assert_eq!(
      follow_up_default(JobStatus::Interview, None),
      Some(today_plus(1))
    );
  }

  #[test]
  fn test_other_transitions_leave_date_untouched() {
    for status in [
      JobStatus::ToApply,
      JobStatus::Offer,
      JobStatus::Rejected,
    ] {
      assert_eq!(follow_up_default(status, Some("2030-01-01")), None);
      assert_eq!(follow_up_default(status, None), None);
    }
  }

  #[test]
  fn test_default_date_format() {
    let date = follow_up_default(JobStatus::Interview, None).unwrap();
    assert!(is_valid_date(&date));
  }

  #[test]
  fn test_buckets_skip_inactive_jobs() {
    let jobs = vec![
      job_with(JobStatus::Applied, Some("2025-05-01")),
      job_with(JobStatus::Rejected, Some("2025-05-01")),
      job_with(JobStatus::Interview, Some("2025-06-01")),
      job_with(JobStatus::FollowUp, None),
    ];

    let buckets = follow_up_buckets(&jobs, "2025-06-01");
    assert_eq!(buckets.overdue.len(), 1);
    assert_eq!(buckets.overdue[0].status, JobStatus::Applied);
    assert_eq!(buckets.due_today.len(), 1);
    assert_eq!(buckets.due_today[0].status, JobStatus::Interview);
  }

  #[test]
  fn test_status_counts() {
    let jobs = vec![
      job_with(JobStatus::ToApply, None),
      job_with(JobStatus::Applied, None),
      job_with(JobStatus::Applied, None),
      job_with(JobStatus::Offer, None),
    ];
    let counts = status_counts(&jobs);
    assert_eq!(counts.total, 4);
    assert_eq!(counts.to_apply, 1);
    assert_eq!(counts.applied, 2);
    assert_eq!(counts.interview, 0);
  }
}
