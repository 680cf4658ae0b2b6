use anyhow::Result;
use chrono::{Datelike, Days, Months, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use milk_track::{
    Commodity, CommodityLedger, DateKey, Ledgers, PersistentStore, PriceInput, RecordOutcome,
    CURRENCY_LABEL,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Milk,
    Water,
}

impl Tab {
    pub fn next(&self) -> Self {
        match self {
            Tab::Milk => Tab::Water,
            Tab::Water => Tab::Milk,
        }
    }

    pub fn commodity(&self) -> Commodity {
        match self {
            Tab::Milk => Commodity::Milk,
            Tab::Water => Commodity::Water,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Milk => "Milk Record",
            Tab::Water => "Water Record",
        }
    }

    /// Highlight for days that have an entry
    fn mark_color(&self) -> Color {
        match self {
            Tab::Milk => Color::LightRed,
            Tab::Water => Color::Blue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Amount,
    Price,
}

pub struct App<S> {
    pub ledgers: Ledgers<S>,
    pub current_tab: Tab,
    /// Day under the calendar cursor (not yet selected)
    pub cursor: NaiveDate,
    pub input_mode: InputMode,
    pub status: Option<String>,
}

impl<S: PersistentStore> App<S> {
    pub fn new(ledgers: Ledgers<S>, today: NaiveDate) -> Self {
        Self {
            ledgers,
            current_tab: Tab::Milk,
            cursor: today,
            input_mode: InputMode::Normal,
            status: None,
        }
    }

    pub fn active(&self) -> &dyn CommodityLedger {
        self.ledgers.get(self.current_tab.commodity())
    }

    pub fn active_mut(&mut self) -> &mut dyn CommodityLedger {
        self.ledgers.get_mut(self.current_tab.commodity())
    }

    pub fn next_tab(&mut self) {
        self.current_tab = self.current_tab.next();
        self.input_mode = InputMode::Normal;
        self.status = None;
    }

    pub fn move_cursor(&mut self, days: i64) {
        let moved = if days >= 0 {
            self.cursor.checked_add_days(Days::new(days as u64))
        } else {
            self.cursor.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        if let Some(date) = moved {
            self.cursor = date;
        }
    }

    pub fn shift_month(&mut self, forward: bool) {
        let moved = if forward {
            self.cursor.checked_add_months(Months::new(1))
        } else {
            self.cursor.checked_sub_months(Months::new(1))
        };
        if let Some(date) = moved {
            self.cursor = date;
        }
    }

    /// Calendar "day pressed" event
    pub fn select_cursor(&mut self) {
        let date = DateKey::new(self.cursor);
        self.active_mut().select_date(date);
        self.status = Some(format!("Selected {}", date));
    }

    pub fn start_amount_input(&mut self) {
        self.input_mode = InputMode::Amount;
    }

    pub fn start_price_input(&mut self) {
        if self.active().selected_date().is_none() {
            self.status = Some("Select a date first (Enter on the calendar)".to_string());
            return;
        }
        self.input_mode = InputMode::Price;
    }

    pub fn push_char(&mut self, c: char) {
        match self.input_mode {
            InputMode::Amount => {
                let text = format!("{}{}", self.active().amount_input(), c);
                self.active_mut().set_amount_input(&text);
            }
            InputMode::Price => {
                let text = format!("{}{}", self.active().cost_input(), c);
                self.apply_price(&text);
            }
            InputMode::Normal => {}
        }
    }

    pub fn pop_char(&mut self) {
        match self.input_mode {
            InputMode::Amount => {
                let mut text = self.active().amount_input().to_string();
                text.pop();
                self.active_mut().set_amount_input(&text);
            }
            InputMode::Price => {
                let mut text = self.active().cost_input().to_string();
                text.pop();
                self.apply_price(&text);
            }
            InputMode::Normal => {}
        }
    }

    /// Every price keystroke goes straight to the engine
    fn apply_price(&mut self, text: &str) {
        match self.active_mut().type_price(text) {
            Ok(PriceInput::Committed(price)) => {
                self.status = Some(format!("Price set to {} {}", CURRENCY_LABEL, price));
            }
            Ok(PriceInput::Buffered) => {}
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    /// Enter while editing
    pub fn submit(&mut self) {
        match self.input_mode {
            InputMode::Amount => match self.active_mut().submit_amount() {
                Ok(outcome) => {
                    self.input_mode = InputMode::Normal;
                    self.status = Some(match outcome {
                        RecordOutcome::Recorded => "Saved".to_string(),
                        RecordOutcome::Unchanged => "No change".to_string(),
                    });
                }
                Err(err) => {
                    let prompt = self.active().prompt().map(str::to_string);
                    self.status = Some(prompt.unwrap_or_else(|| err.to_string()));
                }
            },
            InputMode::Price => self.input_mode = InputMode::Normal,
            InputMode::Normal => self.select_cursor(),
        }
    }

    pub fn cancel(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Returns true when the app should quit
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if self.input_mode != InputMode::Normal {
            match code {
                KeyCode::Esc => self.cancel(),
                KeyCode::Enter => self.submit(),
                KeyCode::Backspace => self.pop_char(),
                KeyCode::Char(c) => self.push_char(c),
                _ => {}
            }
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Tab | KeyCode::BackTab => self.next_tab(),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-7),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(7),
            KeyCode::PageUp | KeyCode::Char('[') => self.shift_month(false),
            KeyCode::PageDown | KeyCode::Char(']') => self.shift_month(true),
            KeyCode::Enter => self.select_cursor(),
            KeyCode::Char('a') => self.start_amount_input(),
            KeyCode::Char('p') => self.start_price_input(),
            _ => {}
        }
        false
    }
}

pub fn run_ui<S: PersistentStore>(app: &mut App<S>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend, S: PersistentStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key.code, key.modifiers) {
                return Ok(());
            }
        }
    }
}

fn ui<S: PersistentStore>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with tabs
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(32), // Calendar + input
            Constraint::Min(0),     // Records + summary
        ])
        .split(chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0)])
        .split(content[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(5)])
        .split(content[1]);

    render_calendar(f, left[0], app);
    render_inputs(f, left[1], app);
    render_records(f, right[0], app);
    render_summary(f, right[1], app);

    render_status_bar(f, chunks[2], app);
}

fn render_header<S: PersistentStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let mut tab_spans = vec![];
    for (i, tab) in [Tab::Milk, Tab::Water].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *tab == app.current_tab {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(tab.title(), style));
    }

    let ledger = app.active();
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!(
            "Default: {} {}/{}",
            CURRENCY_LABEL,
            ledger.last_entered_price(),
            ledger.commodity().unit_label()
        ),
        Style::default().fg(Color::White),
    ));
    if ledger.failed_saves() > 0 {
        tab_spans.push(Span::raw("  |  "));
        tab_spans.push(Span::styled(
            format!("⚠ {} unsaved", ledger.failed_saves()),
            Style::default().fg(Color::Red),
        ));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

/// Days of the month in week rows (Sunday first); None pads the grid
fn month_grid(any_day: NaiveDate) -> Vec<[Option<NaiveDate>; 7]> {
    let mut weeks = Vec::new();
    let Some(first) = any_day.with_day(1) else {
        return weeks;
    };

    let mut week = [None; 7];
    let mut slot = first.weekday().num_days_from_sunday() as usize;
    let mut day = first;

    while day.month() == first.month() {
        week[slot] = Some(day);
        slot += 1;
        if slot == 7 {
            weeks.push(week);
            week = [None; 7];
            slot = 0;
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    if slot > 0 {
        weeks.push(week);
    }

    weeks
}

fn render_calendar<S: PersistentStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let ledger = app.active();
    let marked = ledger.marked_dates();
    let selected = ledger.selected_date().map(|d| d.date());

    let mut lines = vec![Line::from(Span::styled(
        " Su Mo Tu We Th Fr Sa",
        Style::default().fg(Color::DarkGray),
    ))];

    for week in month_grid(app.cursor) {
        let mut spans = vec![];
        for slot in week {
            match slot {
                None => spans.push(Span::raw("   ")),
                Some(day) => {
                    let mut style = Style::default();
                    if marked.iter().any(|d| d.date() == day) {
                        style = style.fg(Color::White).bg(app.current_tab.mark_color());
                    }
                    if Some(day) == selected {
                        style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
                    }
                    if day == app.cursor {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    spans.push(Span::raw(" "));
                    spans.push(Span::styled(format!("{:>2}", day.day()), style));
                }
            }
        }
        lines.push(Line::from(spans));
    }

    let calendar = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", app.cursor.format("%Y %m"))),
    );

    f.render_widget(calendar, area);
}

fn render_inputs<S: PersistentStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let ledger = app.active();
    let commodity = ledger.commodity();

    let editing = |mode: InputMode| {
        if app.input_mode == mode {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };

    let lines = match ledger.selected_date() {
        None => vec![Line::from("Press Enter on a day to select it")],
        Some(date) => vec![
            Line::from(format!("Selected Date: {}", date)),
            Line::from(""),
            Line::from(vec![
                Span::raw(format!("{} ({}): ", commodity.title(), commodity.unit_label())),
                Span::styled(format!("{}▏", ledger.amount_input()), editing(InputMode::Amount)),
            ]),
            Line::from(vec![
                Span::raw(format!("Cost ({}): ", CURRENCY_LABEL)),
                Span::styled(format!("{}▏", ledger.cost_input()), editing(InputMode::Price)),
            ]),
        ],
    };

    let inputs = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Entry "));
    f.render_widget(inputs, area);
}

fn render_records<S: PersistentStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let ledger = app.active();
    let commodity = ledger.commodity();

    let header_cells = ["#", "Date", commodity.unit_label(), "Price", "Cost"]
        .into_iter()
        .map(|h| {
            Cell::from(h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows: Vec<Row> = ledger
        .daily_lines()
        .into_iter()
        .filter(|line| line.date.in_month(app.cursor.year(), app.cursor.month()))
        .map(|line| {
            let price_color = if ledger.overrides().contains_key(&line.date) {
                Color::Cyan
            } else {
                Color::White
            };
            Row::new(vec![
                Cell::from(line.index.to_string()),
                Cell::from(line.date.to_string()),
                Cell::from(line.quantity.to_string()),
                Cell::from(format!("{} {}", CURRENCY_LABEL, line.unit_price))
                    .style(Style::default().fg(price_color)),
                Cell::from(format!("{} {:.0}", CURRENCY_LABEL, line.cost)),
            ])
            .height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" {} Record for the Month ", commodity.title())),
    );

    f.render_widget(table, area);
}

fn render_summary<S: PersistentStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let ledger = app.active();
    let commodity = ledger.commodity();
    let summary = ledger.month_summary(app.cursor.year(), app.cursor.month());

    let lines = vec![
        Line::from(format!(
            "Total {} Consumed: {} {}",
            commodity.title(),
            summary.total_quantity,
            commodity.unit_label()
        )),
        Line::from(Span::styled(
            format!("Total Cost to Pay: {} {:.0}", CURRENCY_LABEL, summary.total_cost),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Summary for the Month "),
    );
    f.render_widget(panel, area);
}

fn render_status_bar<S: PersistentStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let mut status_spans = vec![];

    if let Some(status) = &app.status {
        status_spans.push(Span::styled(
            format!(" {} ", status),
            Style::default().fg(Color::Green),
        ));
        status_spans.push(Span::raw(" | "));
    }

    let help: &[(&str, &str)] = match app.input_mode {
        InputMode::Normal => &[
            ("←↑↓→", " Day | "),
            ("[ ]", " Month | "),
            ("Enter", " Select | "),
            ("a", " Amount | "),
            ("p", " Price | "),
            ("Tab", " Milk/Water | "),
        ],
        InputMode::Amount => &[("Enter", " Save | "), ("Esc", " Cancel")],
        InputMode::Price => &[("Enter/Esc", " Done")],
    };
    for (key, label) in help {
        status_spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(*label));
    }
    if app.input_mode == InputMode::Normal {
        status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
        status_spans.push(Span::raw(" Quit"));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use milk_track::MemoryStore;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    fn app() -> App<Arc<MemoryStore>> {
        let ledgers = Ledgers::open(Arc::new(MemoryStore::new()));
        App::new(ledgers, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap())
    }

    fn type_text(app: &mut App<Arc<MemoryStore>>, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[test]
    fn test_month_grid_july_2024() {
        let grid = month_grid(NaiveDate::from_ymd_opt(2024, 7, 15).unwrap());

        // 2024-07-01 is a Monday
        assert_eq!(grid[0][0], None);
        assert_eq!(grid[0][1], NaiveDate::from_ymd_opt(2024, 7, 1));
        assert_eq!(grid.len(), 5);
        assert_eq!(grid.iter().flatten().flatten().count(), 31);
    }

    #[test]
    fn test_record_amount_through_keys() {
        let mut app = app();

        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('a'), KeyModifiers::NONE);
        type_text(&mut app, "2");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.active().summary().total_cost, 280.0);
        assert_eq!(app.active().amount_input(), "", "buffer cleared");
    }

    #[test]
    fn test_amount_without_date_shows_prompt() {
        let mut app = app();

        app.handle_key(KeyCode::Char('a'), KeyModifiers::NONE);
        type_text(&mut app, "2");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(
            app.status.as_deref(),
            Some("Please select a date and enter the milk amount")
        );
        assert_eq!(app.input_mode, InputMode::Amount, "stays in edit mode");
        assert!(app.active().marked_dates().is_empty());
    }

    #[test]
    fn test_price_keystrokes_commit_progressively() {
        let mut app = app();
        app.next_tab();
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('p'), KeyModifiers::NONE);

        // Clear the displayed "40" then type a new price
        app.handle_key(KeyCode::Backspace, KeyModifiers::NONE);
        app.handle_key(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(app.active().cost_input(), "");
        assert_eq!(app.active().last_entered_price(), 4.0, "\"4\" was a valid keystroke state");

        type_text(&mut app, "45");
        assert_eq!(app.active().last_entered_price(), 45.0);
        assert_eq!(app.ledgers.milk.last_entered_price(), 140.0, "milk untouched");
    }

    fn rendered_text(app: &App<Arc<MemoryStore>>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_records_table_renders_unit_header() {
        let mut app = app();
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('a'), KeyModifiers::NONE);
        type_text(&mut app, "2");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        let text = rendered_text(&app);
        assert!(text.contains("Liters"), "milk tab shows the liters column");
        assert!(text.contains("2024-07-01"));

        app.next_tab();
        assert!(rendered_text(&app).contains("Cans"));
    }

    #[test]
    fn test_cursor_navigation() {
        let mut app = app();
        app.move_cursor(-1);
        assert_eq!(app.cursor, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
        app.shift_month(true);
        assert_eq!(app.cursor, NaiveDate::from_ymd_opt(2024, 7, 30).unwrap());
        assert!(app.handle_key(KeyCode::Char('q'), KeyModifiers::NONE));
    }
}
