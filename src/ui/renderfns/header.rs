use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with title, connectivity badge, and shortcuts.
///
/// `online` is None until the first shell sync attempt resolves; the
/// badge only appears once we know we are offline.
pub fn draw_header(frame: &mut Frame, area: Rect, title: &str, online: Option<bool>) {
  let mut spans = vec![
    Span::styled(format!(" {} ", title), Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
  ];

  if online == Some(false) {
    spans.push(Span::styled(
      " OFFLINE ",
      Style::default().fg(Color::Black).bg(Color::Red).bold(),
    ));
    spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
  }

  spans.extend([
    Span::raw("  "),
    // Shortcuts - keys and brackets highlighted, descriptions dimmed
    Span::styled("<:>", Style::default().fg(Color::Cyan)),
    Span::styled(" command", Style::default().fg(Color::DarkGray)),
    Span::raw("   "),
    Span::styled("</>", Style::default().fg(Color::Cyan)),
    Span::styled(" filter", Style::default().fg(Color::DarkGray)),
    Span::raw("   "),
    Span::styled("<q>", Style::default().fg(Color::Cyan)),
    Span::styled(" back", Style::default().fg(Color::DarkGray)),
  ]);

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}
