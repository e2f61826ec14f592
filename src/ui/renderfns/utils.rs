use ratatui::prelude::Color;

use crate::domain::types::JobStatus;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.len() <= max_len {
    s.to_string()
  } else {
    format!("{}...", &s[..max_len.saturating_sub(3)])
  }
}

/// Display color for a job status
pub fn status_color(status: JobStatus) -> Color {
  match status {
    JobStatus::Offer => Color::Green,
    JobStatus::Interview | JobStatus::FollowUp => Color::Yellow,
    JobStatus::Rejected => Color::DarkGray,
    JobStatus::ToApply | JobStatus::Applied => Color::White,
  }
}

/// Follow-up column text: the date, flagged when overdue.
pub fn follow_up_label(date: Option<&str>, today: &str) -> String {
  match date {
    Some(d) if d < today => format!("{} (overdue)", d),
    Some(d) => d.to_string(),
    None => "-".to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_status_colors() {
    assert_eq!(status_color(JobStatus::Offer), Color::Green);
    assert_eq!(status_color(JobStatus::Interview), Color::Yellow);
    assert_eq!(status_color(JobStatus::Rejected), Color::DarkGray);
    assert_eq!(status_color(JobStatus::ToApply), Color::White);
  }

  #[test]
  fn test_follow_up_label() {
    assert_eq!(follow_up_label(None, "2025-06-01"), "-");
    assert_eq!(follow_up_label(Some("2025-06-02"), "2025-06-01"), "2025-06-02");
    assert_eq!(
      follow_up_label(Some("2025-05-01"), "2025-06-01"),
      "2025-05-01 (overdue)"
    );
  }
}
