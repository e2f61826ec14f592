/// Available commands and autocomplete logic

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "dashboard",
    aliases: &["d", "dash", "home"],
    description: "Status overview and due follow-ups",
  },
  Command {
    name: "jobs",
    aliases: &["j", "job", "list"],
    description: "Browse tracked applications",
  },
  Command {
    name: "new",
    aliases: &["n", "add"],
    description: "Track a new application",
  },
  Command {
    name: "templates",
    aliases: &["t", "template"],
    description: "Manage message templates",
  },
  Command {
    name: "settings",
    aliases: &["s", "backup"],
    description: "Backup, import and reset",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit applyflow",
  },
];

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    // Exact match on name
    if cmd.name == input_lower {
      matches.push((cmd, 0)); // Highest priority
      continue;
    }

    // Exact match on alias
    if cmd.aliases.contains(&input_lower.as_str()) {
      matches.push((cmd, 1));
      continue;
    }

    // Prefix match on name
    if cmd.name.starts_with(&input_lower) {
      matches.push((cmd, 2));
      continue;
    }

    // Prefix match on alias
    if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((cmd, 3));
      continue;
    }

    // Fuzzy match (contains)
    if cmd.name.contains(&input_lower) {
      matches.push((cmd, 4));
      continue;
    }

    // Fuzzy match on alias
    if cmd.aliases.iter().any(|a| a.contains(&input_lower)) {
      matches.push((cmd, 5));
    }
  }

  // Sort by priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("jobs");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "jobs");
  }

  #[test]
  fn test_alias_match() {
    let suggestions = get_suggestions("j");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "jobs");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("temp");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "templates");
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("ting");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "settings");
  }
}
