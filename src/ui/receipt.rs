use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::checkout::{self, RECEIPT_WIDTH};
use crate::App;

pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(view) = &app.receipt else {
        let message = Paragraph::new(vec![
            Line::from(Span::styled(
                "No Transaction Found",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from("There is no transaction data to display."),
            Line::from("Please return to sales and try again."),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        message.render(area, buf);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);

    let total_items = checkout::total_units(&view.record);
    let summary = format!(
        "{} \u{2022} {} products ({} items) \u{2022} {}",
        checkout::customer_display_name(&view.record),
        view.record.items.len(),
        total_items,
        view.record.total
    );
    Paragraph::new(Line::from(Span::styled(
        summary,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    // Center a receipt-width column and print the same text that goes to the
    // receipt file.
    let text = checkout::render_receipt_text(&view.record, &view.receipt_number, &app.cashier);
    let lines: Vec<Line> = text.lines().map(|l| Line::from(l.to_string())).collect();

    let width = (RECEIPT_WIDTH as u16) + 4;
    let column = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(chunks[1])[1];

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Receipt"))
        .render(column, buf);
}
