//! Store record implementations for the domain types.

use crate::store::Record;

use super::types::{Contact, Interaction, Job, Template};

impl Record for Job {
  fn id(&self) -> &str {
    &self.id
  }

  fn collection() -> &'static str {
    "jobs"
  }

  fn updated_at(&self) -> Option<&str> {
    Some(&self.updated_at)
  }
}

impl Record for Contact {
  fn id(&self) -> &str {
    &self.id
  }

  fn collection() -> &'static str {
    "contacts"
  }
}

impl Record for Interaction {
  fn id(&self) -> &str {
    &self.id
  }

  fn collection() -> &'static str {
    "interactions"
  }
}

impl Record for Template {
  fn id(&self) -> &str {
    &self.id
  }

  fn collection() -> &'static str {
    "templates"
  }
}
