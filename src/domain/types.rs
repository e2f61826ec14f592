//! Core record types for the tracker.
//!
//! Field names and enum spellings follow the backup wire format, so a file
//! exported from any ApplyFlow build imports cleanly into this one.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a tracked application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
  #[serde(rename = "TO_APPLY")]
  ToApply,
  #[serde(rename = "APPLIED")]
  Applied,
  #[serde(rename = "FOLLOW_UP")]
  FollowUp,
  #[serde(rename = "INTERVIEW")]
  Interview,
  #[serde(rename = "OFFER")]
  Offer,
  #[serde(rename = "REJECTED")]
  Rejected,
}

impl JobStatus {
  pub const ALL: &'static [JobStatus] = &[
    JobStatus::ToApply,
    JobStatus::Applied,
    JobStatus::FollowUp,
    JobStatus::Interview,
    JobStatus::Offer,
    JobStatus::Rejected,
  ];

  /// Human-readable label for list and picker rows.
  pub fn label(&self) -> &'static str {
    match self {
      JobStatus::ToApply => "To apply",
      JobStatus::Applied => "Applied",
      JobStatus::FollowUp => "Follow-up",
      JobStatus::Interview => "Interview",
      JobStatus::Offer => "Offer",
      JobStatus::Rejected => "Rejected",
    }
  }

  /// Whether a job in this status still needs attention.
  /// Offers and rejections drop out of the follow-up buckets.
  pub fn is_active(&self) -> bool {
    !matches!(self, JobStatus::Offer | JobStatus::Rejected)
  }
}

/// How a contact is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactChannel {
  Whatsapp,
  Call,
  Email,
  InPerson,
  Linkedin,
  Other,
}

impl ContactChannel {
  pub const ALL: &'static [ContactChannel] = &[
    ContactChannel::Whatsapp,
    ContactChannel::Call,
    ContactChannel::Email,
    ContactChannel::InPerson,
    ContactChannel::Linkedin,
    ContactChannel::Other,
  ];

  pub fn label(&self) -> &'static str {
    match self {
      ContactChannel::Whatsapp => "WhatsApp",
      ContactChannel::Call => "Call",
      ContactChannel::Email => "Email",
      ContactChannel::InPerson => "In person",
      ContactChannel::Linkedin => "LinkedIn",
      ContactChannel::Other => "Other",
    }
  }
}

/// Kind of a logged touchpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionType {
  Msg,
  Call,
  Email,
  InPerson,
  Linkedin,
  Other,
}

impl InteractionType {
  pub const ALL: &'static [InteractionType] = &[
    InteractionType::Msg,
    InteractionType::Call,
    InteractionType::Email,
    InteractionType::InPerson,
    InteractionType::Linkedin,
    InteractionType::Other,
  ];

  pub fn label(&self) -> &'static str {
    match self {
      InteractionType::Msg => "Msg",
      InteractionType::Call => "Call",
      InteractionType::Email => "Email",
      InteractionType::InPerson => "Visit",
      InteractionType::Linkedin => "LinkedIn",
      InteractionType::Other => "Other",
    }
  }
}

/// One tracked application or lead.
///
/// `next_follow_up_date` and `last_contact_date` are `YYYY-MM-DD` strings;
/// `created_at`/`updated_at` are full ISO-8601 timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
  pub id: String,
  pub company: String,
  pub role: String,
  pub location: String,
  pub status: JobStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub next_follow_up_date: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_contact_date: Option<String>,
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
  pub created_at: String,
  pub updated_at: String,
}

impl Job {
  pub fn new(company: String, role: String, location: String, now: String) -> Self {
    Self {
      id: new_id(),
      company,
      role,
      location,
      status: JobStatus::ToApply,
      next_follow_up_date: None,
      last_contact_date: None,
      tags: Vec::new(),
      notes: None,
      created_at: now.clone(),
      updated_at: now,
    }
  }
}

/// A person attached to a job. `job_id` is a reference, not ownership:
/// it need not resolve, and deleting the job leaves the contact behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  pub id: String,
  pub job_id: String,
  pub name: String,
  pub channel: ContactChannel,
  pub handle: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
  pub created_at: String,
}

impl Contact {
  pub fn new(job_id: String, name: String, channel: ContactChannel, handle: String, now: String) -> Self {
    Self {
      id: new_id(),
      job_id,
      name,
      channel,
      handle,
      notes: None,
      created_at: now,
    }
  }
}

/// A logged historical touchpoint for a job. Same soft `job_id` reference
/// as [`Contact`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
  pub id: String,
  pub job_id: String,
  /// "YYYY-MM-DD"
  pub date: String,
  #[serde(rename = "type")]
  pub kind: InteractionType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub outcome: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
  pub created_at: String,
}

impl Interaction {
  pub fn new(job_id: String, date: String, kind: InteractionType, now: String) -> Self {
    Self {
      id: new_id(),
      job_id,
      date,
      kind,
      outcome: None,
      notes: None,
      created_at: now,
    }
  }
}

/// A reusable message body with `{{placeholder}}` tokens.
/// Global - not scoped to any job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
  pub id: String,
  pub title: String,
  pub channel: ContactChannel,
  pub body: String,
  pub created_at: String,
}

impl Template {
  pub fn new(title: String, channel: ContactChannel, body: String, now: String) -> Self {
    Self {
      id: new_id(),
      title,
      channel,
      body,
      created_at: now,
    }
  }
}

/// Generate a fresh record id.
pub fn new_id() -> String {
  Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_wire_spelling() {
    let json = serde_json::to_string(&JobStatus::ToApply).unwrap();
    assert_eq!(json, "\"TO_APPLY\"");
    let back: JobStatus = serde_json::from_str("\"FOLLOW_UP\"").unwrap();
    assert_eq!(back, JobStatus::FollowUp);
  }

  #[test]
  fn test_job_field_names_match_wire_format() {
    let mut job = Job::new(
      "Cafe Corner".to_string(),
      "Kitchen hand".to_string(),
      "Coffs Harbour, NSW".to_string(),
      "2025-01-01T00:00:00.000Z".to_string(),
    );
    job.next_follow_up_date = Some("2025-01-04".to_string());

    let value = serde_json::to_value(&job).unwrap();
    assert!(value.get("nextFollowUpDate").is_some());
    assert!(value.get("createdAt").is_some());
    // None fields are omitted, like the original export
    assert!(value.get("lastContactDate").is_none());
  }

  #[test]
  fn test_interaction_type_field_rename() {
    let i = Interaction::new(
      "job-1".to_string(),
      "2025-01-01".to_string(),
      InteractionType::Msg,
      "2025-01-01T00:00:00.000Z".to_string(),
    );
    let value = serde_json::to_value(&i).unwrap();
    assert_eq!(value.get("type").unwrap(), "MSG");
  }

  #[test]
  fn test_job_with_missing_tags_deserializes() {
    // Early records were written before tags existed
    let json = r#"{
      "id": "x", "company": "A", "role": "B", "location": "C",
      "status": "APPLIED",
      "createdAt": "2025-01-01T00:00:00.000Z",
      "updatedAt": "2025-01-01T00:00:00.000Z"
    }"#;
    let job: Job = serde_json::from_str(json).unwrap();
    assert!(job.tags.is_empty());
  }
}
