use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use sparpi::{
    hits::Direction,
    surface::{NoticeLevel, SurfaceState},
    validation::Field,
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

const HELP: [&str; 6] = [
    "(tab) next field",
    "(enter) start/stop",
    "(m)ode",
    "(c)alibrate",
    "(esc)ape",
    "digits and : edit",
];

pub fn draw(app: &App, f: &mut Frame) {
    let surface = app.controller.surface();

    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(7), // configuration form
            Constraint::Length(3), // start/stop button
            Constraint::Min(6),    // per-direction stats
            Constraint::Length(1), // status
            Constraint::Length(1), // help
        ])
        .split(f.area());

    let title = Paragraph::new(Line::from(vec![
        Span::styled("sparpi", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  {}", app.server_url),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]));
    f.render_widget(title, chunks[0]);

    f.render_widget(form(app, surface), chunks[1]);
    f.render_widget(button(surface), chunks[2]);
    f.render_widget(stats_table(surface), chunks[3]);
    f.render_widget(status(surface), chunks[4]);

    let help = Paragraph::new(HELP.iter().join("  "))
        .style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[5]);
}

fn field_label(field: Field) -> &'static str {
    match field {
        Field::Duration => "Time",
        Field::Frequency(Direction::Right) => "Right %",
        Field::Frequency(Direction::Center) => "Center %",
        Field::Frequency(Direction::Left) => "Left %",
        Field::FrequencyTotal => "Total %",
    }
}

fn form<'a>(app: &'a App, surface: &'a SurfaceState) -> Paragraph<'a> {
    let enabled = surface.inputs_enabled;

    let mut lines: Vec<Line> = Field::ALL
        .iter()
        .map(|field| {
            // While a workout runs the time field doubles as the countdown.
            let text = match (field, enabled, surface.remaining.as_deref()) {
                (Field::Duration, false, Some(remaining)) => remaining,
                _ => app.form.text(*field),
            };

            let mut style = Style::default().add_modifier(Modifier::BOLD);
            if !surface.is_field_valid(*field) {
                style = style.fg(Color::Red);
            }
            if !enabled {
                style = style.add_modifier(Modifier::DIM);
            } else if app.focus == *field {
                style = style.add_modifier(Modifier::UNDERLINED);
            }

            Line::from(vec![
                Span::raw(format!("{:<10}", field_label(*field))),
                Span::styled(format!("{text:<6}"), style),
            ])
        })
        .collect();

    let mode_style = if enabled {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };
    lines.push(Line::from(vec![
        Span::raw(format!("{:<10}", "Mode")),
        Span::styled(app.form.mode.to_string(), mode_style),
    ]));

    Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Workout"))
}

fn button(surface: &SurfaceState) -> Paragraph<'static> {
    let style = if surface.button_enabled {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    Paragraph::new(Span::styled(surface.button_label.to_string(), style))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
}

fn stats_table(surface: &SurfaceState) -> Table<'static> {
    let header = Row::new(vec![
        Cell::from("Direction"),
        Cell::from("Hits"),
        Cell::from("Avg time (s)"),
        Cell::from("Misses"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = Direction::ALL
        .iter()
        .map(|direction| match surface.stats.get(direction) {
            Some(stats) => Row::new(vec![
                Cell::from(direction.label()),
                Cell::from(stats.hits.to_string()).style(Style::default().fg(Color::Green)),
                Cell::from(stats.average_label.clone()),
                Cell::from(stats.misses.to_string()).style(Style::default().fg(Color::Red)),
            ]),
            None => Row::new(vec![
                Cell::from(direction.label()),
                Cell::from("0"),
                Cell::from("0"),
                Cell::from("0"),
            ]),
        })
        .collect();

    Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(14),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title("Results"))
}

fn status(surface: &SurfaceState) -> Paragraph<'static> {
    match &surface.notice {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Info => Color::Cyan,
                NoticeLevel::Error => Color::Red,
            };
            Paragraph::new(format!(
                "{}  {}",
                notice.at.format("%H:%M:%S"),
                notice.message
            ))
            .style(Style::default().fg(color))
        }
        None => Paragraph::new(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_has_a_label() {
        let labels: Vec<&str> = Field::ALL.iter().map(|f| field_label(*f)).collect();
        assert_eq!(labels, vec!["Time", "Right %", "Center %", "Left %"]);
    }
}
