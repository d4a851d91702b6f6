use super::app::{AddFriendForm, App, Focus, SplitForm, Status};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use splitbill_core::{describe_balance, Friend, Payer};
use unicode_width::UnicodeWidthStr;

const NAME_WIDTH: usize = 16;

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Sidebar + split panel
            Constraint::Length(3), // Status bar
        ])
        .split(f.area());

    draw_title(f, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    draw_sidebar(f, app, columns[0]);
    draw_split_panel(f, app, columns[1]);
    draw_status_bar(f, app, chunks[2]);
}

fn draw_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            " splitbill ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled("eat-n-split with friends", Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

/// Pads `name` to a fixed display width, truncating wide names.
fn pad_name(name: &str) -> String {
    let mut out = String::new();
    let mut width = 0;
    for c in name.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > NAME_WIDTH {
            break;
        }
        out.push(c);
        width += w;
    }
    let pad = NAME_WIDTH.saturating_sub(out.width());
    out.push_str(&" ".repeat(pad));
    out
}

fn balance_color(friend: &Friend) -> Color {
    if friend.is_settled() {
        Color::Gray
    } else if friend.balance < 0 {
        Color::Red
    } else {
        Color::Green
    }
}

fn draw_sidebar(f: &mut Frame, app: &mut App, area: Rect) {
    let form_height = if app.ledger.is_add_form_open() { 9 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),              // Friend list
            Constraint::Length(form_height), // Add-friend form
            Constraint::Length(3),           // Add / Close button
        ])
        .split(area);

    draw_friends(f, app, chunks[0]);
    if app.ledger.is_add_form_open() {
        draw_add_form(f, app, chunks[1]);
    }
    draw_add_button(f, app, chunks[2]);
}

fn draw_friends(f: &mut Frame, app: &mut App, area: Rect) {
    let selected = app.ledger.selected().cloned();
    let currency = app.currency.clone();

    let items: Vec<ListItem> = app
        .ledger
        .roster()
        .iter()
        .map(|friend| {
            let is_selected = selected.as_ref() == Some(&friend.id);
            let marker = if is_selected { "● " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Yellow)),
                Span::styled(
                    pad_name(&friend.name),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::styled(
                    describe_balance(&friend.name, friend.balance, &currency),
                    Style::default().fg(balance_color(friend)),
                ),
            ]))
        })
        .collect();

    let border = if app.focus == Focus::Friends {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let title = format!(" Friends ({}) ", app.ledger.roster().len());
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    f.render_stateful_widget(list, area, &mut app.friend_state);
}

/// Renders one labelled input line the way both forms show their fields.
fn field_line<'a>(label: &'a str, value: &str, hint: &str, is_selected: bool) -> Line<'a> {
    let (label_style, input_style) = if is_selected {
        (
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )
    } else {
        (
            Style::default().fg(Color::DarkGray),
            Style::default().fg(Color::Gray),
        )
    };

    let cursor = if is_selected { "█" } else { "" };
    let display_value = if value.is_empty() && !is_selected {
        format!("({})", hint)
    } else {
        format!("{}{}", value, cursor)
    };
    let indicator = if is_selected { "▶ " } else { "  " };

    Line::from(vec![
        Span::styled(indicator, label_style),
        Span::styled(format!("{}: ", label), label_style),
        Span::styled(display_value, input_style),
    ])
}

fn message_line(error: Option<&str>) -> Line<'_> {
    match error {
        Some(err) => Line::from(vec![
            Span::styled("✗ ", Style::default().fg(Color::Red)),
            Span::styled(err, Style::default().fg(Color::Red)),
        ]),
        None => Line::default(),
    }
}

fn draw_add_form(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::AddForm;
    let form: &AddFriendForm = &app.add_form;

    let lines = vec![
        field_line(
            "Friend name",
            &form.name,
            "required",
            focused && form.selected_field == 0,
        ),
        Line::default(),
        field_line(
            "Image URL",
            &form.image,
            "required",
            focused && form.selected_field == 1,
        ),
        Line::default(),
        Line::from(vec![
            Span::styled("Enter", Style::default().fg(Color::Green)),
            Span::styled(" Add  ", Style::default().fg(Color::DarkGray)),
            Span::styled("Tab", Style::default().fg(Color::Cyan)),
            Span::styled(" Next field  ", Style::default().fg(Color::DarkGray)),
            Span::styled("Esc", Style::default().fg(Color::Red)),
            Span::styled(" Close", Style::default().fg(Color::DarkGray)),
        ]),
        message_line(form.error.as_deref()),
    ];

    let border = if focused { Color::Yellow } else { Color::DarkGray };
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(" Add friend "),
        );
    f.render_widget(widget, area);
}

fn draw_add_button(f: &mut Frame, app: &App, area: Rect) {
    let label = if app.ledger.is_add_form_open() {
        "[a] Close"
    } else {
        "[a] Add friend"
    };
    let button = Paragraph::new(Line::from(Span::styled(
        label,
        Style::default().fg(Color::Black).bg(Color::Yellow),
    )))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(button, area);
}

fn draw_split_panel(f: &mut Frame, app: &App, area: Rect) {
    let Some(friend) = app.ledger.selected_friend() else {
        let hint = Paragraph::new(Line::from(Span::styled(
            "Select a friend to split a bill with.",
            Style::default().fg(Color::DarkGray),
        )))
        .block(Block::default().borders(Borders::ALL).title(" Split a bill "));
        f.render_widget(hint, area);
        return;
    };

    let focused = app.focus == Focus::SplitForm;
    let form: &SplitForm = &app.split_form;
    let field = |i: usize| focused && form.selected_field == i;

    let friend_expense_label = format!("{}'s expense", friend.name);
    let paid_by_friend = form.paid_by_friend();
    let payer_label = match form.payer {
        Payer::User => "You".to_string(),
        Payer::Friend => friend.name.clone(),
    };

    let payer_style = if field(SplitForm::PAYER_FIELD) {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let payer_indicator = if field(SplitForm::PAYER_FIELD) { "▶ " } else { "  " };

    let lines = vec![
        field_line("Bill value", &form.bill, "amount", field(0)),
        Line::default(),
        field_line("Your expense", &form.paid_by_user, "amount", field(1)),
        Line::default(),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(
                format!("{}: ", friend_expense_label),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(paid_by_friend, Style::default().fg(Color::Gray)),
        ]),
        Line::default(),
        Line::from(vec![
            Span::styled(payer_indicator, payer_style),
            Span::styled("Who is paying the bill: ", payer_style),
            Span::styled(
                format!("◀ {} ▶", payer_label),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::default(),
        Line::from(vec![
            Span::styled("Enter", Style::default().fg(Color::Green)),
            Span::styled(" Split bill  ", Style::default().fg(Color::DarkGray)),
            Span::styled("Tab", Style::default().fg(Color::Cyan)),
            Span::styled(" Next field  ", Style::default().fg(Color::DarkGray)),
            Span::styled("←/→", Style::default().fg(Color::Cyan)),
            Span::styled(" Payer", Style::default().fg(Color::DarkGray)),
        ]),
        message_line(form.error.as_deref()),
    ];

    let border = if focused { Color::Yellow } else { Color::DarkGray };
    let widget = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!(" Split a bill with {} ", friend.name)),
    );
    f.render_widget(widget, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let help_text = match app.focus {
        Focus::Friends => " ↑/↓:Move  Enter:Select  a:Add friend  Tab:Form  q:Quit ",
        Focus::AddForm => " Tab:Next field  Enter:Add  Esc:Close  Ctrl+C:Quit ",
        Focus::SplitForm => " Tab:Next field  ←/→:Payer  Enter:Split  Esc:Back  Ctrl+C:Quit ",
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let help = Paragraph::new(Line::from(Span::styled(
        help_text,
        Style::default().fg(Color::Cyan),
    )))
    .block(Block::default().borders(Borders::ALL).title(" Keys "));

    let status = match &app.status {
        Some(Status::Success(msg)) => Line::from(vec![
            Span::styled("✓ ", Style::default().fg(Color::Green)),
            Span::styled(msg.as_str(), Style::default().fg(Color::Green)),
        ]),
        Some(Status::Error(msg)) => Line::from(vec![
            Span::styled("✗ ", Style::default().fg(Color::Red)),
            Span::styled(msg.as_str(), Style::default().fg(Color::Red)),
        ]),
        None => Line::from(Span::styled(
            format!(" {} friends ", app.ledger.roster().len()),
            Style::default().fg(Color::DarkGray),
        )),
    };
    let status_widget =
        Paragraph::new(status).block(Block::default().borders(Borders::ALL).title(" Info "));

    f.render_widget(help, chunks[0]);
    f.render_widget(status_widget, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use splitbill_core::{FriendId, Ledger};

    fn render_text(app: &mut App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).expect("test backend should initialize");
        terminal
            .draw(|frame| draw(frame, app))
            .expect("app should render in test backend");

        let buffer = terminal.backend().buffer();
        let mut lines = Vec::with_capacity(usize::from(height));
        for y in 0..height {
            let mut line = String::new();
            for x in 0..width {
                let cell = buffer
                    .cell((x, y))
                    .expect("buffer coordinates should exist in declared viewport");
                line.push_str(cell.symbol());
            }
            lines.push(line.trim_end().to_owned());
        }
        lines.join("\n")
    }

    #[test]
    fn renders_balances_for_seed_roster() {
        let mut app = App::new(Ledger::seeded(), "£");
        let text = render_text(&mut app, 140, 30);
        assert!(text.contains("You owe Clark £7.00"));
        assert!(text.contains("Sarah owes you £20.00"));
        assert!(text.contains("You and Anthony are even"));
        assert!(text.contains("[a] Add friend"));
    }

    #[test]
    fn renders_split_panel_for_selected_friend() {
        let mut app = App::new(Ledger::seeded(), "£");
        app.ledger
            .select_friend(&FriendId::from(933372u64))
            .expect("seeded friend");
        let text = render_text(&mut app, 140, 30);
        assert!(text.contains("Split a bill with Sarah"));
        assert!(text.contains("Sarah's expense"));
    }

    #[test]
    fn button_reads_close_while_form_open() {
        let mut app = App::new(Ledger::seeded(), "£");
        app.toggle_add_form();
        let text = render_text(&mut app, 140, 30);
        assert!(text.contains("[a] Close"));
        assert!(text.contains("Friend name"));
    }

    #[test]
    fn balance_colors_follow_direction() {
        let roster = splitbill_core::seed_friends();
        assert_eq!(balance_color(&roster[0]), Color::Red);
        assert_eq!(balance_color(&roster[1]), Color::Green);
        assert_eq!(balance_color(&roster[2]), Color::Gray);
    }

    #[test]
    fn pad_name_truncates_by_display_width() {
        assert_eq!(pad_name("Clark").width(), NAME_WIDTH);
        assert_eq!(pad_name("漢字漢字漢字漢字漢字").width(), NAME_WIDTH);
    }
}
