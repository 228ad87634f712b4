mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use itertools::Itertools;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs,
    io::{self, stdin, Read},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use codedrill::{
    anticheat::PasteHeuristic,
    catalog::{Difficulty, Snippet, SnippetBank},
    certificate::Certificate,
    config::{Config, ConfigStore, FileConfigStore},
    review::{request_review, FileSource, StaticSource},
    runtime::{DrillEvent, Events},
    session::{Session, Status, TimeLimit},
};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// terminal code-typing trainer with timed sessions and achievement certificates
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal code-typing trainer: reproduce a code snippet against the clock, \
get scored on speed and accuracy, earn a certificate, and pretty-print AI code reviews."
)]
pub struct Cli {
    /// name printed on results and certificates
    #[clap(short = 'n', long)]
    name: Option<String>,

    /// snippet difficulty tier
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// session time limit in seconds (30, 60, 120 or 300)
    #[clap(short = 's', long = "seconds", value_parser = parse_time_limit)]
    seconds: Option<TimeLimit>,

    /// start from this snippet within the tier
    #[clap(long, default_value_t = 0)]
    snippet: usize,

    /// list the available snippets and exit
    #[clap(long)]
    list: bool,

    /// format an AI review of this code file and print it (no tui)
    #[clap(long, value_name = "CODE_FILE")]
    review: Option<PathBuf>,

    /// read the reviewer's response from this file instead of stdin
    #[clap(long, value_name = "RESPONSE_FILE", requires = "review")]
    review_from: Option<PathBuf>,
}

fn parse_time_limit(s: &str) -> Result<TimeLimit, String> {
    let secs: u32 = s.parse().map_err(|_| format!("not a number: {s}"))?;
    TimeLimit::from_secs(secs)
        .ok_or_else(|| format!("unsupported time limit {secs}s (choose 30, 60, 120 or 300)"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Drill,
    Certificate,
}

#[derive(Debug)]
pub struct App {
    pub session: Session,
    pub bank: SnippetBank,
    pub policy: PasteHeuristic,
    pub difficulty: Difficulty,
    pub snippet_index: usize,
    pub view: View,
    pub notice: Option<String>,
    pub certificate_text: Option<String>,
}

impl App {
    pub fn new(config: &Config, snippet_index: usize) -> Self {
        let bank = SnippetBank::load();
        let snippet = bank.get(config.difficulty, snippet_index).clone();

        Self {
            session: Session::new(config.user_name.clone(), snippet.code, config.time_limit),
            bank,
            policy: PasteHeuristic::default(),
            difficulty: config.difficulty,
            snippet_index,
            view: View::Drill,
            notice: None,
            certificate_text: None,
        }
    }

    pub fn snippet(&self) -> &Snippet {
        self.bank.get(self.difficulty, self.snippet_index)
    }

    fn start(&mut self, now: Instant) {
        self.certificate_text = None;
        match self.session.start(now) {
            Ok(()) => self.notice = None,
            Err(err) => self.notice = Some(err.to_string()),
        }
    }

    fn restart(&mut self, now: Instant) {
        self.session.reset();
        self.start(now);
    }

    fn reset(&mut self) {
        self.session.reset();
        self.notice = None;
        self.certificate_text = None;
        self.view = View::Drill;
    }

    fn next_snippet(&mut self) {
        if self.session.is_active() {
            return;
        }
        self.snippet_index = (self.snippet_index + 1) % self.bank.len(self.difficulty);
        let code = self.snippet().code.clone();
        // set_target resets the session, so this cannot fail while idle
        let _ = self.session.set_target(code);
        self.notice = None;
        self.certificate_text = None;
    }

    /// One keystroke worth of input: the session still receives the full
    /// text, the way every edit does.
    fn type_char(&mut self, c: char, now: Instant) {
        let mut text = self.session.typed_text().to_string();
        text.push(c);
        self.session.edit(&self.policy, &text, now);
    }

    fn backspace(&mut self, now: Instant) {
        let mut text = self.session.typed_text().to_string();
        if text.pop().is_some() {
            self.session.edit(&self.policy, &text, now);
        }
    }

    /// A bracketed paste lands as one edit, which is what lets the burst
    /// policy see it for what it is.
    fn paste(&mut self, pasted: &str, now: Instant) {
        if !self.session.is_active() {
            return;
        }
        let mut text = self.session.typed_text().to_string();
        text.push_str(pasted);
        self.session.edit(&self.policy, &text, now);
    }

    fn open_certificate(&mut self) {
        let language = self.snippet().language.clone();
        match Certificate::issue(&self.session, self.difficulty, &language) {
            Ok(cert) => {
                self.certificate_text = Some(cert.render());
                self.view = View::Certificate;
                self.notice = None;
            }
            Err(why) => self.notice = Some(why.to_string()),
        }
    }

    fn save_certificate(&mut self) {
        let language = self.snippet().language.clone();
        match Certificate::issue(&self.session, self.difficulty, &language) {
            Ok(cert) => {
                // keep the artifact identical to what is on screen
                let text = match &self.certificate_text {
                    Some(text) => text.clone(),
                    None => cert.render(),
                };
                let path = Path::new(".").join(cert.file_name());
                match fs::write(&path, text) {
                    Ok(()) => self.notice = Some(format!("saved {}", path.display())),
                    Err(err) => self.notice = Some(format!("save failed: {err}")),
                }
            }
            Err(why) => self.notice = Some(why.to_string()),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // Non-TUI paths first: review formatting and snippet listing print to
    // stdout and exit.
    if let Some(code_path) = &cli.review {
        if let Err(err) = run_review(&cli, code_path) {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, err).exit();
        }
        return Ok(());
    }
    if cli.list {
        return run_list();
    }

    let store = FileConfigStore::new();
    let mut config = store.load();
    if let Some(name) = &cli.name {
        config.user_name = name.clone();
    }
    if let Some(difficulty) = cli.difficulty {
        config.difficulty = difficulty;
    }
    if let Some(limit) = cli.seconds {
        config.time_limit = limit;
    }
    let _ = store.save(&config);

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config, cli.snippet);
    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let events = Events::terminal(TICK_INTERVAL);

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match events.next()? {
            DrillEvent::Tick => {
                let epoch = app.session.epoch();
                app.session.tick(epoch, Instant::now());
            }
            DrillEvent::Resize => {}
            DrillEvent::Paste(text) => app.paste(&text, Instant::now()),
            DrillEvent::Key(key) => {
                if handle_key(app, key) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Returns true when the app should quit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Esc {
        return true;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    let now = Instant::now();

    match app.view {
        View::Certificate => match key.code {
            KeyCode::Char('s') => app.save_certificate(),
            KeyCode::Char('b') | KeyCode::Backspace => app.view = View::Drill,
            _ => {}
        },
        View::Drill => match app.session.status() {
            Status::Active => match key.code {
                KeyCode::Char(c) => app.type_char(c, now),
                KeyCode::Enter => app.type_char('\n', now),
                KeyCode::Backspace => app.backspace(now),
                _ => {}
            },
            Status::Idle => match key.code {
                KeyCode::Enter => app.start(now),
                KeyCode::Char('n') => app.next_snippet(),
                KeyCode::Char('r') => app.reset(),
                _ => {}
            },
            Status::Completed | Status::Flagged => match key.code {
                KeyCode::Enter => app.restart(now),
                KeyCode::Char('n') => app.next_snippet(),
                KeyCode::Char('r') => app.reset(),
                KeyCode::Char('c') => app.open_certificate(),
                _ => {}
            },
        },
    }

    false
}

fn run_review(cli: &Cli, code_path: &Path) -> Result<(), Box<dyn Error>> {
    let code = fs::read_to_string(code_path)?;

    let formatted = match &cli.review_from {
        Some(response_path) => request_review(&FileSource::new(response_path), &code)?,
        None => {
            let mut response = String::new();
            io::stdin().read_to_string(&mut response)?;
            request_review(&StaticSource::new(response), &code)?
        }
    };

    println!("{}", formatted.prose);
    for (index, block) in formatted.code_blocks.iter().enumerate() {
        println!();
        println!("--- suggested code #{} ---", index + 1);
        println!("{block}");
    }

    Ok(())
}

fn run_list() -> Result<(), Box<dyn Error>> {
    let bank = SnippetBank::load();
    for difficulty in Difficulty::ALL {
        println!("{difficulty}:");
        let lines = bank
            .tier(difficulty)
            .iter()
            .enumerate()
            .map(|(index, snippet)| {
                format!(
                    "  [{index}] {} ({} chars)",
                    snippet.language,
                    snippet.code.chars().count()
                )
            })
            .join("\n");
        println!("{lines}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            user_name: "Ada".into(),
            difficulty: Difficulty::Beginner,
            time_limit: TimeLimit::Standard,
        }
    }

    #[test]
    fn cli_parses_time_limits() {
        let cli = Cli::try_parse_from(["codedrill", "--seconds", "120"]).unwrap();
        assert_eq!(cli.seconds, Some(TimeLimit::Extended));

        let err = Cli::try_parse_from(["codedrill", "--seconds", "45"]);
        assert!(err.is_err());
    }

    #[test]
    fn cli_review_from_requires_review() {
        let err = Cli::try_parse_from(["codedrill", "--review-from", "resp.md"]);
        assert!(err.is_err());
    }

    #[test]
    fn cli_parses_difficulty() {
        let cli = Cli::try_parse_from(["codedrill", "-d", "advanced"]).unwrap();
        assert_eq!(cli.difficulty, Some(Difficulty::Advanced));
    }

    #[test]
    fn app_starts_idle_with_the_requested_snippet() {
        let app = App::new(&test_config(), 1);
        assert_eq!(app.session.status(), Status::Idle);
        assert_eq!(app.session.target_text(), app.snippet().code);
    }

    #[test]
    fn typing_flows_through_the_session() {
        let mut app = App::new(&test_config(), 0);
        let now = Instant::now();
        app.start(now);
        assert!(app.session.is_active());

        app.type_char('f', now + Duration::from_millis(200));
        assert_eq!(app.session.typed_text(), "f");

        app.backspace(now + Duration::from_millis(400));
        assert_eq!(app.session.typed_text(), "");
    }

    #[test]
    fn start_without_a_name_shows_a_notice() {
        let mut config = test_config();
        config.user_name = String::new();
        let mut app = App::new(&config, 0);

        app.start(Instant::now());
        assert!(!app.session.is_active());
        assert!(app.notice.as_deref().unwrap_or_default().contains("name"));
    }

    #[test]
    fn next_snippet_cycles_within_the_tier() {
        let mut app = App::new(&test_config(), 0);
        let first = app.snippet().clone();
        let count = app.bank.len(app.difficulty);

        for _ in 0..count {
            app.next_snippet();
        }
        assert_eq!(*app.snippet(), first);
    }

    #[test]
    fn next_snippet_is_locked_while_active() {
        let mut app = App::new(&test_config(), 0);
        app.start(Instant::now());
        let before = app.snippet_index;
        app.next_snippet();
        assert_eq!(app.snippet_index, before);
    }

    #[test]
    fn escape_always_quits() {
        let mut app = App::new(&test_config(), 0);
        assert!(handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)
        ));
    }

    #[test]
    fn paste_while_idle_is_dropped() {
        let mut app = App::new(&test_config(), 0);
        app.paste("stolen text", Instant::now());
        assert_eq!(app.session.typed_text(), "");
    }

    #[test]
    fn certificate_request_before_completion_sets_a_notice() {
        let mut app = App::new(&test_config(), 0);
        app.open_certificate();
        assert_eq!(app.view, View::Drill);
        assert!(app.notice.is_some());
    }
}
