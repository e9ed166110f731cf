use emicalc::{export::format_money, Field};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::{App, Screen, Status};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    fn base(self) -> Style {
        match self {
            Theme::Light => Style::default().fg(Color::Black).bg(Color::White),
            Theme::Dark => Style::default().fg(Color::White).bg(Color::Black),
        }
    }

    fn title(self) -> Style {
        let fg = match self {
            Theme::Light => Color::Blue,
            Theme::Dark => Color::Cyan,
        };
        Style::default().fg(fg).add_modifier(Modifier::BOLD)
    }

    fn focused(self) -> Style {
        let fg = match self {
            Theme::Light => Color::Magenta,
            Theme::Dark => Color::Yellow,
        };
        Style::default().fg(fg).add_modifier(Modifier::BOLD)
    }

    fn muted(self) -> Style {
        Style::default().fg(Color::DarkGray)
    }

    fn highlight(self) -> Style {
        match self {
            Theme::Light => Style::default().bg(Color::Gray),
            Theme::Dark => Style::default().bg(Color::DarkGray),
        }
    }
}

pub fn ui(f: &mut Frame, app: &mut App) {
    f.render_widget(Block::default().style(app.theme.base()), f.size());

    match app.screen {
        Screen::Form => render_form_screen(f, app),
        Screen::Schedule => render_schedule_screen(f, app),
        Screen::Summary => render_summary_screen(f, app),
    }
}

fn render_title(f: &mut Frame, app: &App, text: &str, area: Rect) {
    let title = Paragraph::new(text.to_string())
        .style(app.theme.title())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(title, area);
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let line = match &app.status {
        Some(Status::Success(msg)) => Line::styled(format!("✔ {}", msg), Style::default().fg(Color::Green)),
        Some(Status::Error(msg)) => Line::styled(format!("✘ {}", msg), Style::default().fg(Color::Red)),
        None => Line::from(""),
    };
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn field_display(app: &App, field: Field) -> String {
    let value = app.form.value(field);
    match field {
        Field::LoanAmount | Field::ExtraEmi => format!("{}{}", app.currency, value),
        Field::InterestRate => format!("{}%", value),
        Field::LoanTenure => format!("{} months", value),
    }
}

fn render_form_screen(f: &mut Frame, app: &App) {
    let mut constraints = vec![Constraint::Length(3)];
    for _ in Field::ALL {
        constraints.push(Constraint::Length(3));
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(constraints)
        .split(f.size());

    render_title(f, app, "EMI Calculator", chunks[0]);

    for (i, field) in Field::ALL.into_iter().enumerate() {
        let focused = field == app.focus;
        let border = if focused { app.theme.focused() } else { app.theme.muted() };
        let marker = if focused { "▶ " } else { "" };

        let input = Paragraph::new(field_display(app, field)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(format!("{}{}", marker, field.label())),
        );
        f.render_widget(input, chunks[1 + i * 2]);

        let error = app
            .errors
            .as_ref()
            .and_then(|errors| errors.for_field(field))
            .map(|e| e.to_string())
            .unwrap_or_default();
        let error = Paragraph::new(error).style(Style::default().fg(Color::Red));
        f.render_widget(error, chunks[2 + i * 2]);
    }

    let status_area = chunks[chunks.len() - 2];
    render_status(f, app, status_area);

    let mut help = String::from("Tab/↓: next field | Shift-Tab/↑: previous | Enter: calculate EMI");
    if app.calculation.is_some() {
        help.push_str(" | →: breakdown");
    }
    help.push_str(" | t: theme | Esc: exit");
    let help = Paragraph::new(help)
        .style(app.theme.muted())
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[chunks.len() - 1]);
}

fn render_schedule_screen(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(3)].as_ref())
        .split(f.size());

    let header = Row::new(vec![
        "Month",
        "EMI Paid",
        "Interest Paid",
        "Principal Paid",
        "Remaining Balance",
    ])
    .style(app.theme.focused())
    .height(1);

    let currency = app.currency.as_str();
    let rows: Vec<Row> = app
        .calculation
        .as_ref()
        .map(|c| {
            c.schedule
                .rows
                .iter()
                .map(|row| {
                    Row::new(vec![
                        Cell::from(row.month.to_string()),
                        Cell::from(format_money(row.emi_paid, currency)),
                        Cell::from(format_money(row.interest_paid, currency)),
                        Cell::from(format_money(row.principal_paid, currency)),
                        Cell::from(format_money(row.balance, currency)),
                    ])
                    .height(1)
                })
                .collect()
        })
        .unwrap_or_default();

    let widths = [
        Constraint::Length(6),
        Constraint::Length(16),
        Constraint::Length(16),
        Constraint::Length(16),
        Constraint::Length(18),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Month-wise Breakdown"))
        .highlight_style(app.theme.highlight())
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, chunks[0], &mut app.table_state);

    render_status(f, app, chunks[1]);

    let help = Paragraph::new("j/k or ↑/↓: navigate | g/G: top/bottom | s: summary | e: export CSV | t: theme | h/←: back | q: quit")
        .style(app.theme.muted())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(help, chunks[2]);
}

fn summary_line<'a>(label: &'a str, value: String, style: Style) -> Line<'a> {
    Line::from(vec![
        Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(value, style),
    ])
}

fn render_summary_screen(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    render_title(f, app, "Loan Summary", chunks[0]);

    if let Some(calculation) = &app.calculation {
        let currency = app.currency.as_str();
        let params = &calculation.params;
        let schedule = &calculation.schedule;
        let summary = schedule.summary();
        let plain = Style::default();

        let text = vec![
            summary_line("Loan Amount: ", format_money(params.principal, currency), plain),
            summary_line("Interest Rate: ", format!("{}%", params.annual_rate_percent), plain),
            summary_line("Tenure: ", format!("{} months", params.tenure_months), plain),
            Line::from(""),
            summary_line(
                "Monthly EMI: ",
                format_money(schedule.monthly_installment, currency),
                Style::default().fg(Color::Cyan),
            ),
            summary_line(
                "Extra Payment: ",
                format_money(schedule.extra_payment, currency),
                Style::default().fg(Color::Cyan),
            ),
            Line::from(""),
            summary_line(
                "Total Payments: ",
                format_money(summary.total_paid, currency),
                plain,
            ),
            summary_line(
                "Principal Paid: ",
                format_money(summary.total_principal, currency),
                Style::default().fg(Color::Green),
            ),
            summary_line(
                "Interest Paid: ",
                format_money(summary.total_interest, currency),
                Style::default().fg(Color::Red),
            ),
            Line::from(""),
            summary_line(
                "Months to Payoff: ",
                format!(
                    "{} ({:.1} years)",
                    summary.months_to_payoff,
                    summary.months_to_payoff as f64 / 12.0
                ),
                plain,
            ),
            summary_line(
                "Months Saved: ",
                summary.months_saved.to_string(),
                Style::default().fg(Color::Green),
            ),
        ];

        let summary_widget = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Financial Summary"))
            .alignment(Alignment::Left);
        f.render_widget(summary_widget, chunks[1]);
    }

    render_status(f, app, chunks[2]);

    let help = Paragraph::new("e: export to CSV | t: theme | h/←: back to breakdown | q: quit")
        .style(app.theme.muted())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(help, chunks[3]);
}
