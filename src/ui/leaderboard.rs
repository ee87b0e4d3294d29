use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use quickdraw::{ScoreRecord, Snapshot};

/// Game-over screen: this game's result above the leaderboard table
pub fn render_results(snap: &Snapshot, f: &mut Frame, area: Rect) {
    let board = snap.leaderboard.as_deref().unwrap_or_default();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(board.len() as u16 + 3),
            Constraint::Min(0),
        ])
        .split(area);

    f.render_widget(result_banner(snap), chunks[0]);

    if board.is_empty() {
        f.render_widget(
            Paragraph::new("No scores yet.")
                .block(Block::default().borders(Borders::ALL).title("Leaderboard"))
                .alignment(Alignment::Center),
            chunks[1],
        );
        return;
    }

    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from("Date"),
        Cell::from("Hits"),
        Cell::from("Accuracy"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let rows = board.iter().enumerate().map(|(idx, record)| {
        let style = if snap.result.as_ref() == Some(record) {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from((idx + 1).to_string()),
            Cell::from(record.timestamp.clone()),
            Cell::from(record.hits.to_string()),
            Cell::from(format!("{:.2}%", record.accuracy_percent)),
        ])
        .style(style)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(24),
            Constraint::Length(6),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title("Leaderboard"));

    f.render_widget(table, chunks[1]);
}

fn result_banner(snap: &Snapshot) -> Paragraph<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::from(Span::styled(
        snap.placeholder.clone(),
        bold.fg(Color::Red),
    ))];
    if let Some(result) = &snap.result {
        lines.push(Line::from(vec![
            Span::styled(format!("{} hits", result.hits), bold.fg(Color::Green)),
            Span::raw(" / "),
            Span::styled(format!("{:.2}% acc", result.accuracy_percent), bold),
        ]));
    }
    Paragraph::new(lines).alignment(Alignment::Center)
}

/// Plain-text leaderboard for `--scores`
pub fn format_plain(board: &[ScoreRecord]) -> String {
    if board.is_empty() {
        return "No scores yet.".to_string();
    }
    board
        .iter()
        .enumerate()
        .map(|(idx, r)| {
            format!(
                "{:>2}. {:>4} hits  {:>6.2}%  {}",
                idx + 1,
                r.hits,
                r.accuracy_percent,
                r.timestamp
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
