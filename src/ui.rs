use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use std::time::SystemTime;
use unicode_width::UnicodeWidthStr;
use wordrush::clue::Clue;
use wordrush::game::{RoundState, MAX_GUESSES};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;
const PANEL_RECENT_ROUNDS: usize = 8;
const KEYBOARD_ROWS: [&str; 3] = ["qwertyuiop", "asdfghjkl", "zxcvbnm"];

/// Clue colors, with a high-contrast palette for colorblind play.
fn clue_color(clue: Clue, colorblind: bool) -> Color {
    match (clue, colorblind) {
        (Clue::Correct, false) => Color::Green,
        (Clue::Elsewhere, false) => Color::Yellow,
        (Clue::Correct, true) => Color::Rgb(255, 165, 0),
        (Clue::Elsewhere, true) => Color::Blue,
        (Clue::Absent, _) => Color::DarkGray,
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let game = &self.game;
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let dim_italic_style = italic_style.add_modifier(Modifier::DIM);

        let keyboard_height = if game.opts.hide_keyboard {
            0
        } else {
            KEYBOARD_ROWS.len() as u16 + 1
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Min(MAX_GUESSES as u16 + 2),
                Constraint::Length(2),
                Constraint::Length(keyboard_height),
                Constraint::Length(1),
            ])
            .split(area);

        let panel = panel_lines(self);
        let panel_width = panel.iter().map(|l| l.width()).max().unwrap_or(0) as u16 + 2;

        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(panel_width)])
            .split(chunks[0]);

        let grid = grid_lines(self);
        let grid_height = grid.len() as u16;
        let pad = main[0].height.saturating_sub(grid_height) / 2;
        let grid_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(pad),
                Constraint::Length(grid_height),
                Constraint::Min(0),
            ])
            .split(main[0]);

        Paragraph::new(grid)
            .alignment(Alignment::Center)
            .render(grid_chunks[1], buf);
        Paragraph::new(panel).render(main[1], buf);

        // The hint line doubles as the countdown while the input delay
        // is running.
        let hint = match game.lock_remaining(SystemTime::now()) {
            Some(rem) => Span::styled(
                format!("wait {:.1}s", rem.as_secs_f64()),
                italic_style.fg(Color::Yellow),
            ),
            None => Span::styled(game.hint.clone(), italic_style),
        };
        Paragraph::new(hint)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[1], buf);

        if keyboard_height > 0 {
            Paragraph::new(keyboard_lines(self))
                .alignment(Alignment::Center)
                .render(chunks[2], buf);
        }

        let legend = "(enter) submit  (ctrl+g) give up  (ctrl+s) share  (esc) quit";
        Paragraph::new(Span::styled(legend, dim_italic_style))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }
}

/// The guess grid: committed rows in clue colors, the row being typed,
/// then empty rows up to the guess limit. Blind mode paints the colors
/// but hides the letters.
fn grid_lines(app: &App) -> Vec<Line<'static>> {
    let game = &app.game;
    let len = game.word_length();
    let empty_cell =
        || Span::styled(" · ".to_string(), Style::default().add_modifier(Modifier::DIM));

    let mut lines = Vec::with_capacity(MAX_GUESSES);
    for row in 0..MAX_GUESSES {
        let mut spans: Vec<Span> = Vec::with_capacity(len * 2);
        if row < game.rows.len() {
            for (i, cl) in game.rows[row].iter().enumerate() {
                if i > 0 {
                    spans.push(Span::raw(" "));
                }
                let cell = if game.opts.blind {
                    "   ".to_string()
                } else {
                    format!(" {} ", cl.letter.to_ascii_uppercase())
                };
                spans.push(Span::styled(
                    cell,
                    Style::default()
                        .bg(clue_color(cl.clue, app.colorblind))
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD),
                ));
            }
        } else if row == game.rows.len() && game.state == RoundState::Playing {
            let typed: Vec<char> = game.current.chars().collect();
            for i in 0..len {
                if i > 0 {
                    spans.push(Span::raw(" "));
                }
                match typed.get(i) {
                    Some(c) => spans.push(Span::styled(
                        format!(" {} ", c.to_ascii_uppercase()),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    None => spans.push(empty_cell()),
                }
            }
        } else {
            for i in 0..len {
                if i > 0 {
                    spans.push(Span::raw(" "));
                }
                spans.push(empty_cell());
            }
        }
        lines.push(Line::from(spans));
    }
    lines
}

/// Right-hand panel: game code, counters, the recent-round strip and
/// one block per configured window size.
fn panel_lines(app: &App) -> Vec<Line<'static>> {
    let game = &app.game;
    let dim_bold_style = Style::default().add_modifier(Modifier::BOLD | Modifier::DIM);
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        game.code().to_string(),
        dim_bold_style,
    )));
    let (correct, total) = game.stats.counts();
    lines.push(Line::from(format!("{correct}/{total} solved")));
    if let Some(summary) = &app.lifetime {
        let mut all_time = format!("all time {}/{}", summary.solved, summary.rounds);
        if let Some(mean) = summary.mean_secs {
            all_time.push_str(&format!("  avg {mean:.1}s"));
        }
        lines.push(Line::from(Span::styled(
            all_time,
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    lines.push(Line::default());

    let spans = game.log.spans();
    let first_shown = spans.len().saturating_sub(PANEL_RECENT_ROUNDS);
    let best_range = game
        .stats
        .primary()
        .and_then(|c| game.stats.report(c))
        .and_then(|r| r.best_total_range);
    let word_col = spans[first_shown..]
        .iter()
        .map(|s| s.word.width())
        .max()
        .unwrap_or(0)
        .max(4);
    for (i, span) in spans.iter().enumerate().skip(first_shown) {
        let mut style = if span.correct {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Red)
        };
        // Rounds inside the best window for the primary size get marked.
        if best_range.map_or(false, |(start, stop)| i >= start && i < stop) {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        lines.push(Line::from(Span::styled(
            format!(
                "{:<width$} {:>6.1}",
                span.word.to_uppercase(),
                span.secs,
                width = word_col
            ),
            style,
        )));
    }
    if !spans.is_empty() {
        lines.push(Line::default());
    }

    for report in game.stats.reports() {
        lines.push(Line::from(format!(
            "last {:<3} {:>6}  best {:>6}",
            report.window,
            fmt_secs(report.last_total),
            fmt_secs(report.best_total),
        )));
        lines.push(Line::from(Span::styled(
            format!(
                "  keys {:>7}  best {:>6}",
                fmt_secs(report.last_first_key_total),
                fmt_secs(report.best_first_key_total),
            ),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    lines
}

fn keyboard_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = vec![Line::default()];
    for row in KEYBOARD_ROWS {
        let mut spans = Vec::new();
        for (i, c) in row.chars().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            let style = match app.game.letter_info.get(&c) {
                Some(clue @ (Clue::Correct | Clue::Elsewhere)) => Style::default()
                    .fg(clue_color(*clue, app.colorblind))
                    .add_modifier(Modifier::BOLD),
                Some(Clue::Absent) => Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM),
                None => Style::default(),
            };
            spans.push(Span::styled(c.to_ascii_uppercase().to_string(), style));
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn fmt_secs(value: Option<f64>) -> String {
    match value {
        Some(secs) => format!("{secs:.1}"),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    use wordrush::game::{Game, GameOptions, SessionSetup, Submit};
    use wordrush::words::{Bank, LengthChoice};

    fn create_test_app() -> App {
        let bank = Bank::from_words("test", &["dart"], &["word", "trad"]);
        let game = Game::new(
            bank,
            GameOptions {
                length: LengthChoice::Fixed(4),
                ..GameOptions::default()
            },
            SessionSetup::default(),
            SystemTime::now(),
        );
        App {
            game,
            colorblind: false,
            history: None,
            round_csv: None,
            lifetime: None,
        }
    }

    fn rendered(app: &App, width: u16, height: u16) -> (String, Buffer) {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        (app).render(area, &mut buffer);
        let text = buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>();
        (text, buffer)
    }

    fn submit(app: &mut App, word: &str) -> Submit {
        let now = SystemTime::now();
        for c in word.chars() {
            app.game.on_key(c, now);
        }
        app.game.submit_current(now)
    }

    #[test]
    fn test_ui_constants() {
        let letters: usize = KEYBOARD_ROWS.iter().map(|r| r.len()).sum();
        assert_eq!(letters, 26);

        const _: () = assert!(HORIZONTAL_MARGIN * 2 < 80);
        const _: () = assert!(VERTICAL_MARGIN * 2 < 24);
    }

    #[test]
    fn test_initial_render_shows_code_hint_and_keyboard() {
        let app = create_test_app();
        let (text, _) = rendered(&app, 80, 24);

        assert!(text.contains("v01-N4x10"));
        assert!(text.contains("0/0 solved"));
        assert!(text.contains("Make your first guess!"));
        assert!(text.contains("Q W E R T Y U I O P"));
        assert!(text.contains("(enter) submit"));
    }

    #[test]
    fn test_committed_guess_shows_in_the_grid() {
        let mut app = create_test_app();
        assert_eq!(submit(&mut app, "word"), Submit::Accepted);

        // Grid cells are three wide with one space between them.
        let (text, _) = rendered(&app, 80, 24);
        assert!(text.contains("W   O   R   D"));
    }

    #[test]
    fn test_typed_letters_show_in_the_open_row() {
        let mut app = create_test_app();
        let now = SystemTime::now();
        app.game.on_key('d', now);
        app.game.on_key('a', now);

        let (text, _) = rendered(&app, 80, 24);
        assert!(text.contains("D   A"));
    }

    #[test]
    fn test_finished_round_shows_in_the_panel() {
        let mut app = create_test_app();
        assert_eq!(submit(&mut app, "dart"), Submit::RoundOver);

        let (text, _) = rendered(&app, 80, 24);
        assert!(text.contains("1/1 solved"));
        assert!(text.contains("DART"));
        assert!(text.contains("You won!"));
        assert!(text.contains("last 10"));
    }

    #[test]
    fn test_blind_mode_hides_committed_letters() {
        let mut app = create_test_app();
        app.game.opts.blind = true;
        submit(&mut app, "word");

        let (text, _) = rendered(&app, 80, 24);
        assert!(!text.contains("W   O   R   D"));
    }

    #[test]
    fn test_hidden_keyboard_is_not_rendered() {
        let mut app = create_test_app();
        app.game.opts.hide_keyboard = true;

        let (text, _) = rendered(&app, 80, 24);
        assert!(!text.contains("Q W E R T Y U I O P"));
    }

    #[test]
    fn test_colorblind_palette_swaps_clue_colors() {
        let mut app = create_test_app();
        app.colorblind = true;
        // "word" against "dart": r is correct, d is elsewhere.
        submit(&mut app, "word");

        let (_, buffer) = rendered(&app, 80, 24);
        let orange = buffer
            .content()
            .iter()
            .any(|c| c.style().bg == Some(Color::Rgb(255, 165, 0)));
        let blue = buffer
            .content()
            .iter()
            .any(|c| c.style().bg == Some(Color::Blue));
        assert!(orange);
        assert!(blue);
    }

    #[test]
    fn test_lifetime_summary_renders_when_present() {
        let mut app = create_test_app();
        app.lifetime = Some(wordrush::history::ModeSummary {
            rounds: 12,
            solved: 9,
            mean_secs: Some(7.5),
        });

        let (text, _) = rendered(&app, 80, 24);
        assert!(text.contains("all time 9/12  avg 7.5s"));
    }

    #[test]
    fn test_render_survives_extreme_sizes() {
        let app = create_test_app();
        for (w, h) in [(10, 5), (200, 5), (20, 50), (80, 24), (300, 100)] {
            let area = Rect::new(0, 0, w, h);
            let mut buffer = Buffer::empty(area);
            (&app).render(area, &mut buffer);
            assert!(*buffer.area() == area);
        }
    }

    #[test]
    fn test_render_multiple_times_tracks_state() {
        let mut app = create_test_app();

        let (before, _) = rendered(&app, 80, 24);
        assert!(!before.contains("W   O   R   D"));

        submit(&mut app, "word");
        let (after, _) = rendered(&app, 80, 24);
        assert!(after.contains("W   O   R   D"));
    }
}
