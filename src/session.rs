use crate::error::LoadError;
use crate::plan::{due_counts, SessionTrigger};
use crate::provider::{PlanSnapshotSource, WordProvider};
use crate::speller::{Cue, Speller, SpellerEvent};
use crate::util::{accuracy_percent, format_mmss};
use crate::word::Word;
use chrono::Local;
use directories::ProjectDirs;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::time::Instant;

/// Session lifecycle. `Idle` is initial; `SessionComplete` and
/// `Aborted` are terminal until a new trigger arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Loading,
    Active,
    /// Main pass exhausted with pending mistakes; the controller passes
    /// through this phase while it requeues and re-enters `Active`.
    RoundComplete,
    SessionComplete,
    Aborted,
}

/// Host-visible side effects of a controller transition.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Speak the current word.
    Pronounce,
    PlayCue(Cue),
    /// Outcome to forward to the progress reporter.
    Report { progress_id: u64, quality: u8 },
    MistakeRoundStarted { count: usize },
    SessionComplete,
}

/// Derived round statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    pub time: String,
    pub input_count: u32,
    pub correct_count: u32,
    pub accuracy: f64,
    pub remaining: usize,
}

/// Owns the practice round: word queue, cursor, mistake requeue,
/// per-word speller, timer latch, and stats.
#[derive(Debug, Default)]
pub struct SessionController {
    phase: SessionPhase,
    words: Vec<Word>,
    current_index: usize,
    /// Words that registered a mismatch this round, deduplicated by
    /// progress id. Drained into the queue when the main pass ends.
    failed: Vec<Word>,
    speller: Option<Speller>,
    successes: u32,
    failures: u32,
    started_at: Option<Instant>,
    elapsed_secs: u64,
    plan_id: Option<u64>,
}

impl Default for SessionPhase {
    fn default() -> Self {
        SessionPhase::Idle
    }
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_word(&self) -> Option<&Word> {
        self.words.get(self.current_index)
    }

    pub fn speller(&self) -> Option<&Speller> {
        self.speller.as_ref()
    }

    pub fn plan_id(&self) -> Option<u64> {
        self.plan_id
    }

    /// Load a round for a host trigger. On `Err` the session is
    /// `Aborted` with no partial queue retained.
    pub fn start_session(
        &mut self,
        trigger: SessionTrigger,
        plans: &dyn PlanSnapshotSource,
        provider: &dyn WordProvider,
        now: Instant,
    ) -> Result<Vec<SessionEvent>, LoadError> {
        self.teardown();
        self.phase = SessionPhase::Loading;
        match self.load(trigger, plans, provider, now) {
            Ok(events) => Ok(events),
            Err(e) => {
                self.teardown();
                self.phase = SessionPhase::Aborted;
                Err(e)
            }
        }
    }

    fn load(
        &mut self,
        trigger: SessionTrigger,
        plans: &dyn PlanSnapshotSource,
        provider: &dyn WordProvider,
        now: Instant,
    ) -> Result<Vec<SessionEvent>, LoadError> {
        match trigger {
            SessionTrigger::MistakeReview { words } => {
                if words.is_empty() {
                    self.phase = SessionPhase::SessionComplete;
                    return Ok(vec![SessionEvent::SessionComplete]);
                }
                Ok(self.begin_round(words, now))
            }
            SessionTrigger::Learning { list_code, action } => {
                let plan = plans
                    .learning_plan(&list_code)
                    .ok_or_else(|| LoadError::PlanNotFound(list_code.clone()))?;
                self.plan_id = Some(plan.plan_id);

                let due = due_counts(&action, &plan);
                if due.is_zero() {
                    // Nothing due today; the provider is never contacted.
                    self.phase = SessionPhase::SessionComplete;
                    return Ok(vec![SessionEvent::SessionComplete]);
                }

                let words = provider.fetch_words(
                    &list_code,
                    due.due_new as usize,
                    due.due_review as usize,
                )?;
                if words.is_empty() {
                    self.phase = SessionPhase::SessionComplete;
                    return Ok(vec![SessionEvent::SessionComplete]);
                }
                Ok(self.begin_round(words, now))
            }
        }
    }

    fn begin_round(&mut self, words: Vec<Word>, now: Instant) -> Vec<SessionEvent> {
        self.words = words;
        self.current_index = 0;
        self.failed.clear();
        self.successes = 0;
        self.failures = 0;
        self.elapsed_secs = 0;
        self.phase = SessionPhase::Active;
        // Latched once, on first entry into Active for this session.
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
        let mut events = Vec::new();
        self.mount_current(&mut events);
        events
    }

    fn mount_current(&mut self, events: &mut Vec<SessionEvent>) {
        if let Some(word) = self.words.get(self.current_index) {
            self.speller = Some(Speller::new(&word.text));
            events.push(SessionEvent::Pronounce);
        }
    }

    /// Feed one keystroke into the active word.
    pub fn handle_key(
        &mut self,
        c: char,
        modifier_held: bool,
        now: Instant,
    ) -> Vec<SessionEvent> {
        if self.phase != SessionPhase::Active {
            return Vec::new();
        }
        let speller_events = match self.speller.as_mut() {
            Some(speller) => speller.handle_key(c, modifier_held, now),
            None => Vec::new(),
        };
        let mut events = Vec::new();
        self.absorb(speller_events, &mut events);
        events
    }

    /// Drive the 1 Hz elapsed clock and the speller's deadlines.
    /// No-op outside `Active`.
    pub fn on_tick(&mut self, now: Instant) -> Vec<SessionEvent> {
        if self.phase != SessionPhase::Active {
            return Vec::new();
        }
        if let Some(started) = self.started_at {
            self.elapsed_secs = now.duration_since(started).as_secs();
        }
        let speller_events = match self.speller.as_mut() {
            Some(speller) => speller.poll(now),
            None => Vec::new(),
        };
        let mut events = Vec::new();
        self.absorb(speller_events, &mut events);
        events
    }

    fn absorb(&mut self, speller_events: Vec<SpellerEvent>, out: &mut Vec<SessionEvent>) {
        for ev in speller_events {
            match ev {
                SpellerEvent::PlayCue(cue) => {
                    match cue {
                        Cue::Success => self.successes += 1,
                        Cue::Failure => self.failures += 1,
                    }
                    out.push(SessionEvent::PlayCue(cue));
                }
                SpellerEvent::Report { quality } => {
                    if let Some(word) = self.words.get(self.current_index) {
                        out.push(SessionEvent::Report {
                            progress_id: word.progress_id,
                            quality,
                        });
                    }
                }
                SpellerEvent::Pronounce => out.push(SessionEvent::Pronounce),
                SpellerEvent::Advance => {
                    let followups = self.next();
                    out.extend(followups);
                }
            }
        }
    }

    /// Advance past the current word. Flushes the pending mistake flag,
    /// requeues the failure pass when the main queue runs out, and
    /// completes the session when nothing is left.
    pub fn next(&mut self) -> Vec<SessionEvent> {
        if self.phase != SessionPhase::Active {
            return Vec::new();
        }
        self.flush_mistake();

        let mut events = Vec::new();
        if self.current_index + 1 < self.words.len() {
            self.current_index += 1;
            self.mount_current(&mut events);
        } else if !self.failed.is_empty() {
            // Second, no-skip round over this round's mistakes.
            self.phase = SessionPhase::RoundComplete;
            let count = self.failed.len();
            self.words.append(&mut self.failed);
            events.push(SessionEvent::MistakeRoundStarted { count });
            self.current_index += 1;
            self.phase = SessionPhase::Active;
            self.mount_current(&mut events);
        } else {
            self.complete(&mut events);
        }
        events
    }

    /// Step back one word. Clamped at index 0; never completes the
    /// session or triggers a requeue.
    pub fn prev(&mut self) -> Vec<SessionEvent> {
        if self.phase != SessionPhase::Active {
            return Vec::new();
        }
        self.flush_mistake();

        let mut events = Vec::new();
        if self.current_index > 0 {
            self.current_index -= 1;
            self.mount_current(&mut events);
        }
        events
    }

    fn flush_mistake(&mut self) {
        let mistaken = self
            .speller
            .as_mut()
            .map(Speller::take_mistaken)
            .unwrap_or(false);
        if !mistaken {
            return;
        }
        if let Some(word) = self.words.get(self.current_index) {
            if !self.failed.iter().any(|f| f.progress_id == word.progress_id) {
                self.failed.push(word.clone());
            }
        }
    }

    fn complete(&mut self, events: &mut Vec<SessionEvent>) {
        self.current_index = self.words.len();
        self.speller = None;
        self.phase = SessionPhase::SessionComplete;
        let _ = self.save_results();
        events.push(SessionEvent::SessionComplete);
    }

    /// End the session from the host side and drop all round state.
    pub fn teardown(&mut self) {
        *self = Self::default();
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            time: format_mmss(self.elapsed_secs),
            input_count: self.successes + self.failures,
            correct_count: self.successes,
            accuracy: accuracy_percent(self.successes, self.failures),
            remaining: self.words.len().saturating_sub(self.current_index),
        }
    }

    /// Append a session row to the round log under the config dir.
    fn save_results(&self) -> io::Result<()> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "spelldrill") {
            let config_dir = proj_dirs.config_dir();
            let log_path = config_dir.join("rounds.csv");

            std::fs::create_dir_all(config_dir)?;

            let needs_header = !log_path.exists();
            let mut log_file = OpenOptions::new().append(true).create(true).open(log_path)?;

            if needs_header {
                writeln!(log_file, "date,words,attempts,correct,accuracy,elapsed_secs")?;
            }

            let stats = self.stats();
            writeln!(
                log_file,
                "{},{},{},{},{},{}",
                Local::now().format("%c"),
                self.words.len(),
                stats.input_count,
                stats.correct_count,
                stats.accuracy,
                self.elapsed_secs,
            )?;
        }
        Ok(())
    }
}
