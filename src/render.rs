use crate::snapshot::DisplayState;
use std::fmt;
use tui::{
    Frame,
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

pub const CPU_LABEL: &str = "CPU Usage";
pub const MEMORY_LABEL: &str = "Memory Usage";
pub const DISK_LABEL: &str = "Disk Usage";

const HEADER: [&str; 2] = ["Metric", "Usage"];
const NO_VALUE: &str = "--";
const QUIT_HINT: &str = "Press 'q' to quit";

/// Fixed styling handed to [`draw`]. Built once at startup from config.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub title: String,
    pub header_color: Color,
    pub label_color: Color,
    pub value_color: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: "System Monitor".into(),
            header_color: Color::Yellow,
            label_color: Color::White,
            value_color: Color::Cyan,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRow {
    pub label: &'static str,
    pub value: String,
}

/// Text content of one frame, independent of any terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub rows: Vec<MetricRow>,
    pub status: String,
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} | {}", HEADER[0], HEADER[1])?;
        for row in &self.rows {
            writeln!(f, "{} | {}", row.label, row.value)?;
        }
        write!(f, "{}", self.status)
    }
}

/// Two decimals, halves rounded up, trailing `%`.
///
/// Rounds the shortest decimal form of `value` (what `{}` prints), so `0.285` becomes
/// `0.29%` even though the nearest `f64` sits just below 0.285.
pub fn format_percent(value: f64) -> String {
    let shortest = value.clamp(0.0, 100.0).to_string();
    let (whole, fraction) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));
    let digit = |i: usize| {
        fraction
            .as_bytes()
            .get(i)
            .map_or(0, |b| u64::from(b.wrapping_sub(b'0')))
    };
    let mut hundredths = whole.parse::<u64>().unwrap_or(0) * 100 + digit(0) * 10 + digit(1);
    if digit(2) >= 5 {
        hundredths += 1;
    }
    format!("{}.{:02}%", hundredths / 100, hundredths % 100)
}

pub fn render(state: &DisplayState) -> DashboardView {
    match state.snapshot() {
        None => DashboardView {
            rows: [CPU_LABEL, MEMORY_LABEL, DISK_LABEL]
                .into_iter()
                .map(|label| MetricRow {
                    label,
                    value: NO_VALUE.into(),
                })
                .collect(),
            status: format!("Waiting for first sample... {QUIT_HINT}"),
        },
        Some(snapshot) => DashboardView {
            rows: vec![
                MetricRow {
                    label: CPU_LABEL,
                    value: format_percent(snapshot.cpu_percent()),
                },
                MetricRow {
                    label: MEMORY_LABEL,
                    value: format_percent(snapshot.memory_percent()),
                },
                MetricRow {
                    label: DISK_LABEL,
                    value: format_percent(snapshot.disk_percent()),
                },
            ],
            status: format!(
                "Updated {}  {QUIT_HINT}",
                snapshot.captured_at().format("%H:%M:%S")
            ),
        },
    }
}

pub fn draw<B: Backend>(f: &mut Frame<'_, B>, view: &DashboardView, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.size());

    let header = Row::new(HEADER.iter().map(|h| Cell::from(*h))).style(
        Style::default()
            .fg(theme.header_color)
            .add_modifier(Modifier::BOLD),
    );
    let rows = view.rows.iter().map(|row| {
        Row::new(vec![
            Cell::from(row.label).style(Style::default().fg(theme.label_color)),
            Cell::from(row.value.as_str()).style(Style::default().fg(theme.value_color)),
        ])
    });
    let table = Table::new(rows)
        .header(header)
        .block(
            Block::default()
                .title(theme.title.as_str())
                .borders(Borders::ALL),
        )
        .widths(&[Constraint::Percentage(50), Constraint::Percentage(50)]);
    f.render_widget(table, chunks[0]);

    let status = Paragraph::new(Spans::from(vec![Span::raw(view.status.as_str())]))
        .style(Style::default().fg(Color::White));
    f.render_widget(status, chunks[1]);
}
