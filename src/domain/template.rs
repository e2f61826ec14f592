//! Message template substitution.

use super::types::{Contact, ContactChannel, Interaction, InteractionType, Job, Template};

/// Fallback shown for `{{name}}` when no contact is selected.
const NAME_PLACEHOLDER: &str = "(Name)";

/// Values available to a template body.
#[derive(Debug, Clone, Default)]
pub struct Bindings<'a> {
  pub role: &'a str,
  pub company: &'a str,
  pub location: &'a str,
  pub name: Option<&'a str>,
}

impl<'a> Bindings<'a> {
  /// Bindings for a job, optionally with a contact for `{{name}}`.
  pub fn for_job(job: &'a Job, contact: Option<&'a Contact>) -> Self {
    Self {
      role: &job.role,
      company: &job.company,
      location: &job.location,
      name: contact.map(|c| c.name.as_str()),
    }
  }
}

/// Replace every placeholder occurrence with its bound value.
///
/// Unbound `{{name}}` renders as the literal "(Name)"; substituted values
/// are inserted verbatim, no escaping.
pub fn render(body: &str, bindings: &Bindings) -> String {
  body
    .replace("{{role}}", bindings.role)
    .replace("{{company}}", bindings.company)
    .replace("{{location}}", bindings.location)
    .replace("{{name}}", bindings.name.unwrap_or(NAME_PLACEHOLDER))
}

/// Interaction logged when a template is used for a job.
///
/// WhatsApp templates log as a message, everything else as email - the
/// touchpoint kinds the templates are written for.
pub fn usage_interaction(template: &Template, job_id: &str, date: String, now: String) -> Interaction {
  let kind = if template.channel == ContactChannel::Whatsapp {
    InteractionType::Msg
  } else {
    InteractionType::Email
  };

  let mut interaction = Interaction::new(job_id.to_string(), date, kind, now);
  interaction.notes = Some(format!("Template used: {}", template.title));
  interaction
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_render_substitutes_all_placeholders() {
    let bindings = Bindings {
      role: "Cook",
      company: "Acme",
      location: "Coffs Harbour",
      name: Some("Sam"),
    };
    let out = render("Hi {{name}}, re {{role}} at {{company}}", &bindings);
    assert_eq!(out, "Hi Sam, re Cook at Acme");
  }

  #[test]
  fn test_unbound_name_renders_placeholder() {
    let bindings = Bindings {
      role: "Cook",
      company: "Acme",
      location: "",
      name: None,
    };
    assert_eq!(render("Dear {{name}}", &bindings), "Dear (Name)");
  }

  #[test]
  fn test_repeated_placeholders_all_replaced() {
    let bindings = Bindings {
      role: "",
      company: "Acme",
      location: "",
      name: None,
    };
    assert_eq!(
      render("{{company}} - yes, {{company}}!", &bindings),
      "Acme - yes, Acme!"
    );
  }

  #[test]
  fn test_values_are_not_escaped() {
    let bindings = Bindings {
      role: "{{company}}",
      company: "Acme",
      location: "",
      name: None,
    };
    // Substitution is sequential replace; injected tokens pass through
    // whatever later replacements match. Documented behavior, not a bug.
    assert_eq!(render("{{role}}", &bindings), "Acme");
  }

  #[test]
  fn test_usage_interaction_channel_mapping() {
    let now = "2025-01-01T00:00:00.000Z".to_string();
    let wa = Template::new(
      "Nudge".to_string(),
      ContactChannel::Whatsapp,
      "Hi {{name}}".to_string(),
      now.clone(),
    );
    let email = Template::new(
      "Intro".to_string(),
      ContactChannel::Email,
      "Dear {{name}}".to_string(),
      now.clone(),
    );

    let i = usage_interaction(&wa, "job-1", "2025-01-02".to_string(), now.clone());
    assert_eq!(i.kind, InteractionType::Msg);
    assert_eq!(i.notes.as_deref(), Some("Template used: Nudge"));

    let i = usage_interaction(&email, "job-1", "2025-01-02".to_string(), now);
    assert_eq!(i.kind, InteractionType::Email);
  }
}
