use ratatui::{
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::state::{AppState, View};
use crate::units::temperature::k2c;
use crate::weather::WeatherRecord;

const MISSING: &str = "--";
const PLACEHOLDER: &str = "Enter your city";
const CLOCK_WIDTH: u16 = 23;
const TILE_HEIGHT: u16 = 3;

fn rounded_block(title: &str) -> Block<'_> {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded);
    if title.is_empty() {
        block
    } else {
        block
            .title(Span::styled(title, Style::default().fg(Color::Yellow)))
            .title_alignment(Alignment::Left)
    }
}

fn value_style() -> Style {
    Style::default().fg(Color::Green)
}

fn or_missing(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v}{unit}"),
        None => MISSING.to_string(),
    }
}

pub fn celsius(temp_k: Option<f64>) -> String {
    or_missing(k2c(temp_k), "\u{00B0}C")
}

/// The seven detail tiles, in display order.
pub fn details(record: &WeatherRecord) -> [(&'static str, String); 7] {
    [
        ("Clouds", or_missing(record.clouds.all, " %")),
        (
            "Weather Type",
            record.condition().unwrap_or(MISSING).to_string(),
        ),
        ("Feels Like", celsius(record.main.feels_like)),
        ("Humidity", or_missing(record.main.humidity, " %")),
        ("Visibility", or_missing(record.visibility, " m")),
        ("Wind Speed", or_missing(record.wind.speed, " m/s")),
        ("Wind Direction", or_missing(record.wind.deg, "\u{00B0}")),
    ]
}

fn display_search(state: &AppState) -> Paragraph<'_> {
    let line = if state.search.is_empty() {
        let hint = state
            .weather
            .as_ref()
            .and_then(|w| w.name.as_deref())
            .filter(|name| !name.is_empty())
            .unwrap_or(PLACEHOLDER);
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(state.search.as_str())
    };
    Paragraph::new(line).block(rounded_block(" Search "))
}

fn display_clock(state: &AppState) -> Paragraph<'_> {
    Paragraph::new(Line::from(state.clock.as_str()))
        .alignment(Alignment::Center)
        .block(rounded_block(""))
}

fn display_loading() -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "( o )-- Searching...",
            Style::default().fg(Color::Cyan),
        )),
    ])
    .alignment(Alignment::Center)
}

fn display_error(message: &str) -> Paragraph<'_> {
    Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "(x_x)",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("Error: {message}"),
            Style::default().fg(Color::Red),
        )),
        Line::from("Please search another city"),
    ])
    .alignment(Alignment::Center)
}

fn display_idle() -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Type a city and press Enter",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
}

fn display_range(record: &WeatherRecord) -> Paragraph<'_> {
    Paragraph::new(Line::from(vec![
        Span::raw("Low "),
        Span::styled(celsius(record.main.temp_min), value_style()),
        Span::raw("   High "),
        Span::styled(celsius(record.main.temp_max), value_style()),
        Span::raw("   Pressure "),
        Span::styled(or_missing(record.main.pressure, " hPa"), value_style()),
    ]))
    .alignment(Alignment::Center)
}

fn display_sun(record: &WeatherRecord) -> Paragraph<'_> {
    let at = |t: Option<chrono::DateTime<chrono::FixedOffset>>| {
        t.map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| MISSING.to_string())
    };
    Paragraph::new(Line::from(vec![
        Span::raw("Sunrise "),
        Span::styled(at(record.sunrise()), value_style()),
        Span::raw("   Sunset "),
        Span::styled(at(record.sunset()), value_style()),
    ]))
    .alignment(Alignment::Center)
}

fn render_tile(f: &mut Frame, area: Rect, title: &'static str, value: String) {
    let tile = Paragraph::new(Line::from(Span::styled(value, value_style())))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(title)
                .title_alignment(Alignment::Center),
        );
    f.render_widget(tile, area);
}

fn render_weather(f: &mut Frame, area: Rect, record: &WeatherRecord) {
    let [name, _, temp, description, _, first_row, second_row, _, range, sun] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(TILE_HEIGHT),
            Constraint::Length(TILE_HEIGHT),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

    let place = record.name.clone().unwrap_or_else(|| MISSING.to_string());
    f.render_widget(
        Paragraph::new(Span::styled(
            place,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        name,
    );
    f.render_widget(
        Paragraph::new(Span::styled(
            celsius(record.main.temp),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        temp,
    );
    f.render_widget(
        Paragraph::new(Span::styled(
            record.description().unwrap_or_default(),
            Style::default().fg(Color::Gray),
        ))
        .alignment(Alignment::Center),
        description,
    );

    let mut tiles = details(record).into_iter();
    let first: [Rect; 4] = Layout::horizontal([Constraint::Ratio(1, 4); 4]).areas(first_row);
    let second: [Rect; 3] = Layout::horizontal([Constraint::Ratio(1, 3); 3]).areas(second_row);
    for area in first.into_iter().chain(second) {
        if let Some((title, value)) = tiles.next() {
            render_tile(f, area, title, value);
        }
    }

    f.render_widget(display_range(record), range);
    f.render_widget(display_sun(record), sun);
}

pub fn draw(f: &mut Frame, state: &AppState) {
    let outer = rounded_block(" wxnow ");
    let inner = outer.inner(f.area());
    f.render_widget(outer, f.area());

    let [top, body, help] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(inner);

    let [search, clock] =
        Layout::horizontal([Constraint::Min(10), Constraint::Length(CLOCK_WIDTH)]).areas(top);
    f.render_widget(display_search(state), search);
    f.render_widget(display_clock(state), clock);

    // no cursor once the text runs past the box
    let cursor_x = u16::try_from(state.search.chars().count())
        .ok()
        .and_then(|n| search.x.checked_add(1)?.checked_add(n))
        .filter(|&x| x < search.right().saturating_sub(1));
    if let Some(x) = cursor_x {
        f.set_cursor_position(Position::new(x, search.y + 1));
    }

    let panel = rounded_block(" Current Conditions ");
    let panel_area = panel.inner(body);
    f.render_widget(panel, body);

    match state.view() {
        View::Loading => f.render_widget(display_loading(), panel_area),
        View::Error(message) => f.render_widget(display_error(message), panel_area),
        View::Ready(record) => render_weather(f, panel_area, record),
        View::Idle => f.render_widget(display_idle(), panel_area),
    }

    f.render_widget(
        Paragraph::new(Span::styled(
            " Enter search  Ctrl-U clear  Ctrl-L locate  Esc quit",
            Style::default().fg(Color::DarkGray),
        )),
        help,
    );
}
