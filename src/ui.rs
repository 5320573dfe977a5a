use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::App;
use spelldrill::session::SessionPhase;
use spelldrill::speller::CharState;

const HORIZONTAL_MARGIN: u16 = 5;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.session.phase() {
            SessionPhase::Idle | SessionPhase::Loading => {
                centered_message("loading …", Color::Yellow, area, buf);
            }
            SessionPhase::Aborted => {
                let msg = self
                    .notice
                    .as_ref()
                    .map(|(text, _)| text.as_str())
                    .unwrap_or("failed to load the session");
                centered_message(msg, Color::Red, area, buf);
            }
            SessionPhase::SessionComplete => self.render_summary(area, buf),
            SessionPhase::Active | SessionPhase::RoundComplete => self.render_drill(area, buf),
        }
    }
}

fn centered_message(text: &str, color: Color, area: Rect, buf: &mut Buffer) {
    let message = Paragraph::new(Span::styled(
        text,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    let y = area.height / 2;
    let line = Rect::new(area.x, area.y + y, area.width, 1);
    message.render(line, buf);
}

impl App {
    fn render_drill(&self, area: Rect, buf: &mut Buffer) {
        let Some(word) = self.session.current_word() else {
            return;
        };

        let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
        let word_lines = ((word.text.width() as f64 / max_chars_per_line as f64).ceil()).max(1.0)
            as u16;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(1), // stats bar
                    Constraint::Min(1),    // top spacer
                    Constraint::Length(word_lines),
                    Constraint::Length(1), // phonetic
                    Constraint::Length(2), // definitions
                    Constraint::Min(1),    // sentences
                    Constraint::Length(1), // notice
                ]
                .as_ref(),
            )
            .split(area);

        self.render_stats(chunks[0], buf);
        self.render_word(chunks[2], buf);
        self.render_phonetic(chunks[3], buf);
        self.render_definitions(chunks[4], buf);
        self.render_sentences(chunks[5], buf);
        self.render_notice(chunks[6], buf);
    }

    fn render_stats(&self, area: Rect, buf: &mut Buffer) {
        let stats = self.session.stats();
        let dim = Style::default().add_modifier(Modifier::DIM);
        let line = Line::from(vec![
            Span::styled(format!("⏱ {}", stats.time), dim),
            Span::raw("   "),
            Span::styled(format!("attempts {}", stats.input_count), dim),
            Span::raw("   "),
            Span::styled(format!("correct {}", stats.correct_count), dim),
            Span::raw("   "),
            Span::styled(format!("accuracy {:.1}%", stats.accuracy), dim),
            Span::raw("   "),
            Span::styled(format!("left {}", stats.remaining), dim),
        ]);
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_word(&self, area: Rect, buf: &mut Buffer) {
        let Some(speller) = self.session.speller() else {
            return;
        };
        let target = speller.target();
        let states = speller.char_states();
        let in_error = speller.in_error();

        let green = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
        let red = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
        let dim = Style::default().add_modifier(Modifier::DIM);
        let current = Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::UNDERLINED);

        let spans: Vec<Span> = target
            .chars()
            .zip(states.iter())
            .enumerate()
            .map(|(idx, (ch, state))| {
                let shown = ch.to_string();
                match state {
                    CharState::Correct | CharState::Skipped => Span::styled(shown, green),
                    CharState::Incorrect => Span::styled(
                        match ch {
                            ' ' => "·".to_owned(),
                            c => c.to_string(),
                        },
                        red,
                    ),
                    CharState::Current => {
                        let masked = self.mask.contains(&idx);
                        let style = if in_error { red } else { current };
                        Span::styled(if masked { "_".to_owned() } else { shown }, style)
                    }
                    CharState::Untouched => {
                        let masked = self.mask.contains(&idx);
                        Span::styled(if masked { "_".to_owned() } else { shown }, dim)
                    }
                }
            })
            .collect();

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }

    fn render_phonetic(&self, area: Rect, buf: &mut Buffer) {
        let Some(word) = self.session.current_word() else {
            return;
        };
        if let Some(detail) = word.preferred_pronunciation() {
            Paragraph::new(Span::styled(
                format!("/{}/", detail.phonetic),
                Style::default().fg(Color::Magenta),
            ))
            .alignment(Alignment::Center)
            .render(area, buf);
        }
    }

    fn render_definitions(&self, area: Rect, buf: &mut Buffer) {
        let Some(word) = self.session.current_word() else {
            return;
        };
        let lines: Vec<Line> = word
            .definitions
            .iter()
            .map(|d| {
                Line::from(vec![
                    Span::styled(
                        format!("{} ", d.part_of_speech),
                        Style::default().add_modifier(Modifier::ITALIC),
                    ),
                    Span::raw(d.meaning.clone()),
                ])
            })
            .collect();
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }

    fn render_sentences(&self, area: Rect, buf: &mut Buffer) {
        if !self.settings.show_sentences() {
            return;
        }
        let Some(word) = self.session.current_word() else {
            return;
        };
        let hide_word = self.settings.hide_word_in_sentence();
        let show_translation = self.settings.show_sentence_translation();

        let mut lines = Vec::new();
        for example in &word.examples {
            let shown = if hide_word {
                blank_out(&example.text, &word.text)
            } else {
                example.text.clone()
            };
            lines.push(Line::from(Span::raw(shown)));
            if show_translation {
                if let Some(translation) = &example.translation {
                    lines.push(Line::from(Span::styled(
                        translation.clone(),
                        Style::default().add_modifier(Modifier::DIM),
                    )));
                }
            }
        }
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }

    fn render_notice(&self, area: Rect, buf: &mut Buffer) {
        if let Some((text, _)) = &self.notice {
            Paragraph::new(Span::styled(
                text.clone(),
                Style::default().fg(Color::Yellow),
            ))
            .alignment(Alignment::Center)
            .render(area, buf);
        }
    }

    fn render_summary(&self, area: Rect, buf: &mut Buffer) {
        let stats = self.session.stats();
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let dim = Style::default().add_modifier(Modifier::DIM);

        let lines = vec![
            Line::from(Span::styled("round complete", bold.fg(Color::Green))),
            Line::default(),
            Line::from(Span::raw(format!(
                "{} attempts · {} correct · {:.1}% accuracy · {}",
                stats.input_count, stats.correct_count, stats.accuracy, stats.time
            ))),
            Line::default(),
            Line::from(Span::styled("(a) next chapter  (r) run again  (esc) quit", dim)),
        ];

        let block = Rect {
            y: area.y + area.height / 3,
            height: lines.len() as u16,
            ..area
        };
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(block, buf);
    }
}

/// Replace every occurrence of the target word in a sentence with
/// underscores, to keep the answer out of sight.
pub fn blank_out(sentence: &str, word: &str) -> String {
    if word.is_empty() {
        return sentence.to_string();
    }
    let blank = "_".repeat(word.chars().count());
    // Case-insensitive only when lowercasing keeps byte offsets stable.
    let lowered = sentence.to_lowercase();
    let (lowered, needle) = if lowered.len() == sentence.len() {
        (lowered, word.to_lowercase())
    } else {
        (sentence.to_string(), word.to_string())
    };
    let mut result = String::new();
    let mut rest = 0;
    while let Some(pos) = lowered[rest..].find(&needle) {
        let start = rest + pos;
        result.push_str(&sentence[rest..start]);
        result.push_str(&blank);
        rest = start + needle.len();
    }
    result.push_str(&sentence[rest..]);
    result
}

#[cfg(test)]
mod tests {
    use super::blank_out;

    #[test]
    fn blank_out_hides_every_occurrence_case_insensitively() {
        assert_eq!(
            blank_out("An Apple a day: apple pie.", "apple"),
            "An _____ a day: _____ pie."
        );
    }

    #[test]
    fn blank_out_leaves_unrelated_sentences_alone() {
        assert_eq!(blank_out("No match here.", "apple"), "No match here.");
    }
}
