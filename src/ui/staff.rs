use chrono::Utc;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, Widget},
};

use crate::staff::{humanize_last_active, StaffStatus};
use crate::App;

pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(6),
        ])
        .split(area);

    render_stats(app, chunks[0], buf);
    render_roster(app, chunks[1], buf);
    render_pending(app, chunks[2], buf);
}

fn render_stats(app: &App, area: Rect, buf: &mut Buffer) {
    let stats = app.staff.stats();
    let line = Line::from(format!(
        "Total Staff: {} \u{2022} Active: {} \u{2022} Pending Approval: {} \u{2022} Inactive: {}",
        stats.total, stats.active, stats.pending, stats.inactive
    ));
    Paragraph::new(line)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Staff Management"),
        )
        .render(area, buf);
}

fn status_style(status: StaffStatus) -> Style {
    match status {
        StaffStatus::Active => Style::default().fg(Color::Green),
        StaffStatus::Pending => Style::default().fg(Color::Yellow),
        StaffStatus::Inactive => Style::default().fg(Color::Red),
    }
}

fn render_roster(app: &App, area: Rect, buf: &mut Buffer) {
    let now = Utc::now();
    let members = if app.staff_view.filter.is_empty() {
        app.staff.roster().iter().collect::<Vec<_>>()
    } else {
        app.staff.search(&app.staff_view.filter)
    };

    let selected_style = Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let rows = members.iter().enumerate().map(|(i, member)| {
        let row = Row::new(vec![
            Span::raw(format!("{} <{}>", member.full_name, member.email)),
            Span::raw(member.role.to_string()),
            Span::styled(member.status.to_string(), status_style(member.status)),
            Span::raw(member.join_date.clone()),
            Span::raw(humanize_last_active(&member.last_active, now)),
        ]);
        if !app.staff_view.focus_pending && i == app.staff_view.selected {
            row.style(selected_style)
        } else {
            row
        }
    });

    let title = if app.staff_view.filter.is_empty() {
        "Roster".to_string()
    } else {
        format!("Roster (filter: {})", app.staff_view.filter)
    };

    Table::new(
        rows,
        [
            Constraint::Min(34),
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(11),
            Constraint::Min(14),
        ],
    )
    .header(
        Row::new(["Staff Member", "Role", "Status", "Joined", "Last Active"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title(title))
    .render(area, buf);
}

fn render_pending(app: &App, area: Rect, buf: &mut Buffer) {
    let pending = app.staff.pending();
    let lines: Vec<Line> = if pending.is_empty() {
        vec![Line::from(Span::styled(
            "No pending approvals",
            Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
        ))]
    } else {
        pending
            .iter()
            .enumerate()
            .map(|(i, applicant)| {
                let text = format!(
                    "{} \u{2022} {} \u{2022} Applied {}",
                    applicant.full_name, applicant.role, applicant.applied_date
                );
                if app.staff_view.focus_pending && i == app.staff_view.pending_selected {
                    Line::from(Span::styled(
                        text,
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(text)
                }
            })
            .collect()
    };

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Pending Approvals (a approve, x reject)"),
        )
        .render(area, buf);
}
