use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io;
use teller_ledger::{parse_amount, Teller, TellerError, TransactionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FirstName,
    LastName,
    Pin,
    Amount,
}

impl Field {
    const ALL: [Field; 4] = [Field::FirstName, Field::LastName, Field::Pin, Field::Amount];

    pub fn label(&self) -> &str {
        match self {
            Field::FirstName => "First name",
            Field::LastName => "Last name",
            Field::Pin => "PIN",
            Field::Amount => "Amount",
        }
    }

    fn index(&self) -> usize {
        match self {
            Field::FirstName => 0,
            Field::LastName => 1,
            Field::Pin => 2,
            Field::Amount => 3,
        }
    }

    pub fn next(&self) -> Self {
        Field::ALL[(self.index() + 1) % Field::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        Field::ALL[(self.index() + Field::ALL.len() - 1) % Field::ALL.len()]
    }
}

pub struct App {
    teller: Teller,
    inputs: [String; 4],
    pub focus: Field,
    /// None until the customer picks withdraw or deposit
    pub action: Option<TransactionKind>,
    pub message: String,
    pub prompt: String,
    pub balance_line: String,
    pub should_quit: bool,
}

impl App {
    pub fn new(teller: Teller) -> Self {
        App {
            teller,
            inputs: Default::default(),
            focus: Field::FirstName,
            action: None,
            message: "Enter your name and PIN, then press Enter to search.".to_string(),
            prompt: String::new(),
            balance_line: String::new(),
            should_quit: false,
        }
    }

    pub fn input(&self, field: Field) -> &str {
        &self.inputs[field.index()]
    }

    pub fn set_input(&mut self, field: Field, value: &str) {
        self.inputs[field.index()] = value.to_string();
    }

    pub fn toggle_action(&mut self) {
        self.action = match self.action {
            None | Some(TransactionKind::Deposit) => Some(TransactionKind::Withdraw),
            Some(TransactionKind::Withdraw) => Some(TransactionKind::Deposit),
        };
    }

    fn clear_status(&mut self) {
        self.prompt.clear();
        self.balance_line.clear();
    }

    fn show_error(&mut self, err: TellerError) {
        self.message = match err {
            TellerError::Ledger(e) => format!("Ledger error: {}", e),
            other => other.to_string(),
        };
    }

    /// Look up the account from the name and PIN fields
    pub fn search(&mut self) {
        let [first, last, pin, _] = &self.inputs;
        let result = self.teller.sign_in(first, last, pin);

        match result {
            Ok(Some(summary)) => {
                self.message = format!("Welcome {}!", summary.holder);
                self.prompt = "What would you like to do?".to_string();
                self.balance_line = summary.balance_line();
            }
            Ok(None) => {
                self.message = "Account not found or wrong PIN.".to_string();
                self.clear_status();
            }
            Err(err) => {
                self.show_error(err);
                self.clear_status();
            }
        }
    }

    /// Run the selected withdraw/deposit against the current account
    pub fn process_transaction(&mut self) {
        if self.teller.current().is_none() {
            self.show_error(TellerError::NoAccountSelected);
            return;
        }
        let amount = self.input(Field::Amount).to_string();
        // Checked here as well as in transact() so a bad amount is reported
        // before a missing action
        if parse_amount(amount.trim()).is_none() {
            self.show_error(TellerError::InvalidAmount);
            return;
        }
        let Some(kind) = self.action else {
            self.message = "Please select an action.".to_string();
            return;
        };

        match self.teller.transact(kind, &amount) {
            Ok(outcome) => self.message = outcome.message().to_string(),
            Err(err) => self.show_error(err),
        }

        if let Some(summary) = self.teller.current() {
            self.balance_line = summary.balance_line();
        }
    }

    /// Flush the ledger for the account at the counter
    pub fn save_account(&mut self) {
        match self.teller.save_current() {
            Ok(()) => self.message = "Account saved.".to_string(),
            Err(err) => self.show_error(err),
        }
    }

    /// Open a new account from the form, amount field as initial deposit
    pub fn create_account(&mut self) {
        let [first, last, pin, deposit] = &self.inputs;
        let result = self.teller.open_account(first, last, pin, deposit);

        match result {
            Ok(summary) => {
                self.message = format!("Account created for {}!", summary.holder);
                self.prompt.clear();
                self.balance_line = summary.balance_line();
            }
            Err(err) => self.show_error(err),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Enter | KeyCode::F(1) => self.search(),
            KeyCode::F(2) => self.process_transaction(),
            KeyCode::F(3) => self.create_account(),
            KeyCode::F(4) => self.toggle_action(),
            KeyCode::F(5) => self.save_account(),
            KeyCode::Backspace => {
                self.inputs[self.focus.index()].pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.inputs[self.focus.index()].push(c);
            }
            _ => {}
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Windows reports releases too
            if key.kind == KeyEventKind::Press {
                app.handle_key(key);
            }
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(7), // Form
            Constraint::Min(5),    // Status
            Constraint::Length(3), // Key help
        ])
        .split(f.size());

    render_header(f, chunks[0]);
    render_form(f, chunks[1], app);
    render_status(f, chunks[2], app);
    render_help(f, chunks[3]);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(Span::styled(
        "🏧 Teller",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = Field::ALL
        .iter()
        .map(|field| {
            let value = match field {
                Field::Pin => "*".repeat(app.input(*field).chars().count()),
                _ => app.input(*field).to_string(),
            };

            let (marker, style) = if *field == app.focus {
                ("→ ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                ("  ", Style::default().fg(Color::White))
            };

            Line::from(vec![
                Span::raw(marker),
                Span::styled(format!("{:<12}", field.label()), style),
                Span::raw(value),
            ])
        })
        .collect();

    let radio = |kind: TransactionKind| {
        let mark = if app.action == Some(kind) { "(•)" } else { "( )" };
        format!("{} {}", mark, kind.as_str())
    };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<12}", "Action"), Style::default().fg(Color::White)),
        Span::styled(radio(TransactionKind::Withdraw), Style::default().fg(Color::Red)),
        Span::raw("   "),
        Span::styled(radio(TransactionKind::Deposit), Style::default().fg(Color::Green)),
    ]));

    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Account "),
    );

    f.render_widget(form, area);
}

fn render_status(f: &mut Frame, area: Rect, app: &App) {
    let lines = vec![
        Line::from(Span::styled(app.message.clone(), Style::default().fg(Color::Cyan))),
        Line::from(app.prompt.clone()),
        Line::from(Span::styled(
            app.balance_line.clone(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
    ];

    let status = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Status "),
    );

    f.render_widget(status, area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));

    let help = Paragraph::new(Line::from(vec![
        key(" Tab"),
        Span::raw(" Field | "),
        key("Enter/F1"),
        Span::raw(" Search | "),
        key("F2"),
        Span::raw(" Process | "),
        key("F3"),
        Span::raw(" Create | "),
        key("F4"),
        Span::raw(" Withdraw/Deposit | "),
        key("F5"),
        Span::raw(" Save | "),
        Span::styled("Esc", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::White)));

    f.render_widget(help, area);
}
