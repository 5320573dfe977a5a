mod ui;

use clap::Parser;
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::error::Error;
use std::io::{self, stdin};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use spelldrill::{
    mask::hidden_indices,
    plan::{LearningPlan, PlanDetails, PlanProgress, PlanType, ReviewStrategy, SessionTrigger, TriggerAction},
    progress::ProgressReporter,
    progress_db::ProgressDb,
    provider::{BundledWordProvider, FileWordProvider, LocalPlanSource, WordProvider},
    runtime::{CrosstermEventSource, DrillEvent, FixedTicker, Runner},
    session::{SessionController, SessionEvent, SessionPhase},
    settings::{DisplayMode, SettingsStore},
    storage::FileKeyValueStore,
    word::Word,
};

/// terminal spelling drill with per-letter validation and mistake requeue
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Practice spelling a word list letter by letter. Missed words come back \
for a second pass at the end of the round, and every outcome is recorded locally."
)]
struct Cli {
    /// bundled word list to practice
    #[clap(short = 'l', long, default_value = "starter_en")]
    list: String,

    /// practice a word-list JSON file instead of a bundled list
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// restart today's quota instead of resuming it
    #[clap(long)]
    reset: bool,

    /// review the words you have missed most instead of learning new ones
    #[clap(long)]
    mistakes: bool,

    /// fixed number of new words per day (overrides the stored plan)
    #[clap(short = 'w', long)]
    words_per_day: Option<u32>,

    /// spread the whole list over this many days (overrides the stored plan)
    #[clap(short = 'd', long)]
    days: Option<u32>,

    /// skip review words entirely
    #[clap(long)]
    no_review: bool,

    /// how much of the word to mask while spelling (persisted)
    #[clap(long, value_enum)]
    display_mode: Option<DisplayMode>,

    /// show example sentences under the word (persisted)
    #[clap(long)]
    sentences: bool,
}

pub struct App {
    pub session: SessionController,
    pub settings: SettingsStore<FileKeyValueStore>,
    pub reporter: ProgressReporter,
    /// Masked character positions for the current word.
    pub mask: Vec<usize>,
    masked_word_index: Option<usize>,
    /// Transient host notice with its expiry deadline.
    pub notice: Option<(String, Instant)>,
    pub plan_id: u64,
}

const NOTICE_TTL: Duration = Duration::from_secs(3);

impl App {
    fn new(
        settings: SettingsStore<FileKeyValueStore>,
        reporter: ProgressReporter,
        plan_id: u64,
    ) -> Self {
        Self {
            session: SessionController::new(),
            settings,
            reporter,
            mask: Vec::new(),
            masked_word_index: None,
            notice: None,
            plan_id,
        }
    }

    /// Forward controller events to their collaborators.
    fn apply(&mut self, events: Vec<SessionEvent>, now: Instant) {
        for event in events {
            match event {
                SessionEvent::Report {
                    progress_id,
                    quality,
                } => self.reporter.report(progress_id, quality),
                SessionEvent::MistakeRoundStarted { count } => {
                    self.push_notice(format!("reviewing {} missed word(s)…", count), now);
                }
                SessionEvent::SessionComplete => {
                    self.push_notice("round complete".to_string(), now);
                }
                // Audio cues and speech are host concerns; the terminal
                // host has nothing to play.
                SessionEvent::Pronounce | SessionEvent::PlayCue(_) => {}
            }
        }
        self.refresh_mask();
    }

    fn push_notice(&mut self, text: String, now: Instant) {
        self.notice = Some((text, now + NOTICE_TTL));
    }

    /// Recompute the display mask when the current word changes. The
    /// random mode picks its positions once per word, not per frame.
    fn refresh_mask(&mut self) {
        let index = self.session.current_index();
        if self.masked_word_index == Some(index) {
            return;
        }
        self.masked_word_index = Some(index);
        self.mask = match self.session.current_word() {
            Some(word) => hidden_indices(self.settings.display_mode(), &word.text),
            None => Vec::new(),
        };
    }

    fn expire_notice(&mut self, now: Instant) {
        if let Some((_, deadline)) = &self.notice {
            if now >= *deadline {
                self.notice = None;
            }
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    if !stdin().is_tty() {
        eprintln!("spelldrill: stdin must be a tty");
        std::process::exit(2);
    }

    let mut settings = SettingsStore::load(FileKeyValueStore::new());
    if let Some(mode) = cli.display_mode {
        settings.set_display_mode(mode);
    }
    if cli.sentences {
        settings.set_show_sentences(true);
    }

    let bundled = BundledWordProvider::new();
    let file_provider = cli.file.as_ref().map(FileWordProvider::new);
    let (list_code, total_words, all_words): (String, u32, Vec<Word>) = match &file_provider {
        Some(provider) => {
            let list = provider.list()?;
            (list.list_code.clone(), list.words.len() as u32, list.words)
        }
        None => {
            let list = bundled.list(&cli.list)?;
            (list.list_code.clone(), list.words.len() as u32, list.words)
        }
    };

    let db = ProgressDb::new()?;
    let plan = build_plan(&cli, &list_code, total_words, &db);
    let plan_id = plan.plan_id;
    let trigger = build_trigger(&cli, &list_code, &all_words, &db);
    let plans = LocalPlanSource::new(vec![plan]);

    let reporter = ProgressReporter::new(Box::new(db));
    let mut app = App::new(settings, reporter, plan_id);

    let now = Instant::now();
    let load_result = match &file_provider {
        Some(provider) => app.session.start_session(trigger, &plans, provider, now),
        None => app.session.start_session(trigger, &plans, &bundled, now),
    };
    match load_result {
        Ok(events) => app.apply(events, now),
        Err(e) => {
            eprintln!("spelldrill: {}", e);
            std::process::exit(1);
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(
        &mut terminal,
        &mut app,
        &plans,
        &bundled,
        file_provider.as_ref(),
        &list_code,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    plans: &LocalPlanSource,
    bundled: &BundledWordProvider,
    file_provider: Option<&FileWordProvider>,
    list_code: &str,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            DrillEvent::Tick => {
                let now = Instant::now();
                let events = app.session.on_tick(now);
                app.apply(events, now);
                if let Some(notice) = app.reporter.try_take_notice() {
                    app.push_notice(notice, now);
                }
                app.expire_notice(now);
            }
            DrillEvent::Resize => {}
            DrillEvent::Key(key) => {
                if is_quit(&key) {
                    app.session.teardown();
                    break;
                }
                let now = Instant::now();
                match key.code {
                    KeyCode::Right => {
                        let events = app.session.next();
                        app.apply(events, now);
                    }
                    KeyCode::Left => {
                        let events = app.session.prev();
                        app.apply(events, now);
                    }
                    KeyCode::Char(c) => {
                        if app.session.phase() == SessionPhase::SessionComplete {
                            match c {
                                'a' => {
                                    let plan_id =
                                        app.session.plan_id().unwrap_or(app.plan_id);
                                    app.reporter.advance(plan_id);
                                }
                                'r' => {
                                    let trigger = SessionTrigger::Learning {
                                        list_code: list_code.to_string(),
                                        action: TriggerAction::Reset,
                                    };
                                    let result = match file_provider {
                                        Some(p) => {
                                            app.session.start_session(trigger, plans, p, now)
                                        }
                                        None => {
                                            app.session.start_session(trigger, plans, bundled, now)
                                        }
                                    };
                                    match result {
                                        Ok(events) => app.apply(events, now),
                                        Err(e) => app.push_notice(e.to_string(), now),
                                    }
                                }
                                _ => {}
                            }
                        } else {
                            let modifier_held = key
                                .modifiers
                                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
                            let events = app.session.handle_key(c, modifier_held, now);
                            app.apply(events, now);
                        }
                    }
                    _ => {}
                }
            }
        }
    }
    Ok(())
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Assemble the local plan snapshot the way a backend would report it.
fn build_plan(cli: &Cli, list_code: &str, total_words: u32, db: &ProgressDb) -> LearningPlan {
    let learned = db.learned_word_count().unwrap_or(0).min(total_words);
    let review_strategy = if cli.no_review {
        ReviewStrategy::None
    } else {
        ReviewStrategy::Ebbinghaus
    };
    let details = if let Some(value) = cli.words_per_day {
        PlanDetails {
            plan_type: PlanType::CustomWords,
            value,
            review_strategy,
        }
    } else if let Some(value) = cli.days {
        PlanDetails {
            plan_type: PlanType::CustomDays,
            value,
            review_strategy,
        }
    } else {
        PlanDetails {
            plan_type: PlanType::CustomWords,
            value: 10,
            review_strategy,
        }
    };

    LearningPlan {
        plan_id: 1,
        list_code: list_code.to_string(),
        total_words,
        plan: details,
        progress: PlanProgress {
            learned_count: learned,
            due_new_count: details.value.max(1).min(total_words),
            due_review_count: 0,
            ..PlanProgress::default()
        },
    }
}

fn build_trigger(
    cli: &Cli,
    list_code: &str,
    all_words: &[Word],
    db: &ProgressDb,
) -> SessionTrigger {
    if cli.mistakes {
        // Words with at least one recorded miss, worst accuracy first.
        let mistaken_ids: Vec<u64> = db
            .summary()
            .unwrap_or_default()
            .into_iter()
            .filter(|s| s.successes < s.attempts)
            .map(|s| s.progress_id)
            .collect();
        let words = mistaken_ids
            .iter()
            .filter_map(|id| all_words.iter().find(|w| w.progress_id == *id))
            .cloned()
            .collect();
        return SessionTrigger::MistakeReview { words };
    }

    let action = if cli.reset {
        TriggerAction::Reset
    } else if cli.words_per_day.is_some() || cli.days.is_some() {
        TriggerAction::Plan(build_plan(cli, list_code, all_words.len() as u32, db).plan)
    } else {
        TriggerAction::Activate
    };
    SessionTrigger::Learning {
        list_code: list_code.to_string(),
        action,
    }
}
