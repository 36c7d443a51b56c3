use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, Tabs, Widget},
};

use crate::discount::Discount;
use crate::util::format_naira;
use crate::App;

pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(9),
        ])
        .split(area);

    render_customer_tabs(app, chunks[0], buf);
    render_cart(app, chunks[1], buf);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);
    render_discounts(app, bottom[0], buf);
    render_totals(app, bottom[1], buf);
}

fn render_customer_tabs(app: &App, area: Rect, buf: &mut Buffer) {
    let sessions = app.registry.sessions();
    let titles: Vec<Line> = sessions
        .iter()
        .map(|s| Line::from(format!("{} ({})", s.display_name(), s.item_count())))
        .collect();
    let selected = app
        .registry
        .active_id()
        .and_then(|id| sessions.iter().position(|s| s.id == id))
        .unwrap_or(0);

    Tabs::new(titles)
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Customers {}/5", sessions.len())),
        )
        .render(area, buf);
}

fn render_cart(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(session) = app.registry.active() else {
        return;
    };
    let views = session.line_views(app.registry.catalog());

    let selected_style = Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let rows = views.iter().enumerate().map(|(i, view)| {
        let name = view
            .product_name
            .clone()
            .unwrap_or_else(|| "Select a product...".to_string());
        let row = Row::new(vec![
            name,
            view.quantity.to_string(),
            format_naira(view.unit_price),
            format_naira(view.line_total),
        ]);
        if i == app.sales.selected_row {
            row.style(selected_style)
        } else {
            row
        }
    });

    Table::new(
        rows,
        [
            Constraint::Min(24),
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Length(12),
        ],
    )
    .header(Row::new(["Product", "Qty", "Unit Price", "Total"]).style(
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Transaction - {}", session.display_name())),
    )
    .render(area, buf);
}

fn render_discounts(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(session) = app.registry.active() else {
        return;
    };
    let selection = session.discount();

    let custom_value = match selection {
        Discount::Custom(p) => format!("{p}%"),
        _ => "-%".to_string(),
    };
    let options: [(bool, &str, String, char); 5] = [
        (
            matches!(selection, Discount::None),
            "No Discount",
            "0%".to_string(),
            '0',
        ),
        (
            matches!(selection, Discount::Volume),
            "Volume Discount (10+ items)",
            "5%".to_string(),
            'v',
        ),
        (
            matches!(selection, Discount::Bulk),
            "Bulk Purchase (\u{20a6}5000+)",
            "3%".to_string(),
            'b',
        ),
        (
            matches!(selection, Discount::Premium),
            "Premium Customer (\u{20a6}10000+)",
            "7%".to_string(),
            'p',
        ),
        (
            matches!(selection, Discount::Custom(_)),
            "Custom Discount",
            custom_value,
            'u',
        ),
    ];

    let lines: Vec<Line> = options
        .iter()
        .map(|(active, label, value, key)| {
            let marker = if *active { "\u{25cf}" } else { "\u{25cb}" };
            let style = if *active {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(
                format!(" {marker} [{key}] {label:<32} {value}"),
                style,
            ))
        })
        .collect();

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Apply Discount"),
        )
        .render(area, buf);
}

fn render_totals(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(session) = app.registry.active() else {
        return;
    };
    let quote = session.quote();

    let mut lines = vec![Line::from(format!(
        "Subtotal: {}",
        format_naira(session.subtotal())
    ))];
    if quote.applies() {
        lines.push(Line::from(Span::styled(
            format!("{}: -{}", quote.label, format_naira(quote.amount)),
            Style::default().fg(Color::Green),
        )));
    } else if session.discount() != Discount::None {
        lines.push(Line::from(Span::styled(
            quote.label.clone(),
            Style::default().add_modifier(Modifier::DIM),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        format_naira(session.total()),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("Items: {}", session.item_count())));
    lines.push(Line::from(Span::styled(
        "enter: proceed to checkout",
        Style::default().add_modifier(Modifier::DIM),
    )));

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Totals"))
        .render(area, buf);
}
