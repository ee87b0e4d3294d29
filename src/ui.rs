pub mod leaderboard;

use itertools::{EitherOrBoth, Itertools};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use quickdraw::{input_matcher::InputMatcher, KeyValueStore, Phase, Snapshot};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

pub fn draw<S: KeyValueStore>(app: &App<S>, f: &mut Frame) {
    let snap = &app.snapshot;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    f.render_widget(status_line(app), chunks[0]);

    match snap.phase {
        Phase::Idle => render_title(f, chunks[1]),
        Phase::Countdown => render_countdown(snap, f, chunks[1]),
        Phase::Playing => {
            render_playing(snap, app.machine.config().normalize_case, f, chunks[1])
        }
        Phase::Ended => leaderboard::render_results(snap, f, chunks[1]),
    }

    if let Some(flash) = app.flash() {
        f.render_widget(
            Paragraph::new(Span::styled(
                flash,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            chunks[2],
        );
    }

    f.render_widget(
        Paragraph::new(Span::styled(
            help_text(snap.phase),
            Style::default()
                .add_modifier(Modifier::ITALIC)
                .fg(Color::Gray),
        ))
        .alignment(Alignment::Center),
        chunks[3],
    );
}

fn status_line<S: KeyValueStore>(app: &App<S>) -> Paragraph<'static> {
    let snap = &app.snapshot;
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut spans = vec![Span::styled("quickdraw", bold.fg(Color::Magenta))];

    if matches!(snap.phase, Phase::Playing | Phase::Ended) {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(snap.time_display.clone(), bold));
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            format!("Hits: {}", snap.hits),
            bold.fg(Color::Green),
        ));
    }
    if app.music_playing {
        spans.push(Span::styled("   ♪", Style::default().fg(Color::Cyan)));
    }

    Paragraph::new(Line::from(spans))
}

fn render_title(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "QUICKDRAW",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "press enter to draw",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        centered_rows(area, 3),
    );
}

fn render_countdown(snap: &Snapshot, f: &mut Frame, area: Rect) {
    let text = snap.countdown.map(|n| n.to_string()).unwrap_or_default();
    f.render_widget(
        Paragraph::new(Span::styled(
            text,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        centered_rows(area, 1),
    );
}

fn render_playing(snap: &Snapshot, normalize_case: bool, f: &mut Frame, area: Rect) {
    let word = snap.current_word.as_deref().unwrap_or_default();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .flex(Flex::Center)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(area);

    f.render_widget(
        Paragraph::new(word_line(word, &snap.input, normalize_case)).alignment(Alignment::Center),
        rows[0],
    );

    let box_width = (word.width().max(snap.placeholder.width()) as u16 + 4).min(area.width);
    let [input_area] = Layout::horizontal([Constraint::Length(box_width)])
        .flex(Flex::Center)
        .areas(rows[2]);

    let input = if snap.input.is_empty() {
        Span::styled(
            snap.placeholder.clone(),
            Style::default().add_modifier(Modifier::DIM),
        )
    } else {
        Span::raw(snap.input.clone())
    };
    f.render_widget(
        Paragraph::new(input).block(Block::default().borders(Borders::ALL)),
        input_area,
    );
}

/// Target word with the typed prefix coloured: green where it agrees, red where
/// it has gone wrong, dim for what is left to type.
fn word_line(word: &str, input: &str, normalize_case: bool) -> Line<'static> {
    let matcher = InputMatcher::new(normalize_case);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let typed = input.trim();

    let spans = word
        .chars()
        .zip_longest(typed.chars())
        .map(|pair| match pair {
            EitherOrBoth::Both(expected, got) => {
                if matcher.is_prefix_consistent(&got.to_string(), &expected.to_string()) {
                    Span::styled(expected.to_string(), bold.fg(Color::Green))
                } else {
                    Span::styled(expected.to_string(), bold.fg(Color::Red))
                }
            }
            EitherOrBoth::Left(expected) => Span::styled(
                expected.to_string(),
                bold.add_modifier(Modifier::DIM),
            ),
            EitherOrBoth::Right(extra) => Span::styled(
                extra.to_string(),
                bold.fg(Color::Red).add_modifier(Modifier::CROSSED_OUT),
            ),
        })
        .collect::<Vec<_>>();

    Line::from(spans)
}

fn help_text(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "(enter) start / (esc) quit",
        Phase::Countdown => "get ready... / (esc) quit",
        Phase::Playing => "(ctrl-r) restart / (esc) quit",
        Phase::Ended => "(r) restart / (esc) quit",
    }
}

fn centered_rows(area: Rect, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    row
}
