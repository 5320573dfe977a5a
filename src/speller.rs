use std::time::{Duration, Instant};

/// How long keystrokes are ignored after a mismatch before the word
/// resets for a full retry.
pub const ERROR_COOLDOWN: Duration = Duration::from_millis(1000);
/// Pause between resolving a word and handing control back to `next`.
pub const ADVANCE_DELAY: Duration = Duration::from_millis(300);

/// Characters the user must type, matched case-sensitively.
pub fn is_input_required(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '\''
}

/// Characters auto-filled on correct entry of their neighbours.
pub fn is_skippable(c: char) -> bool {
    !is_input_required(c)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Success,
    Failure,
}

/// Derived render state of a single target character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharState {
    Untouched,
    Current,
    Correct,
    Incorrect,
    Skipped,
}

/// Side effects the speller asks its owner to perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpellerEvent {
    PlayCue(Cue),
    /// Replay the word's pronunciation.
    Pronounce,
    /// Report a quality score for this word to the progress service.
    Report { quality: u8 },
    /// Success delay elapsed; the controller should move to the next word.
    Advance,
}

#[derive(Clone, Copy, Debug)]
enum Pending {
    ErrorReset(Instant),
    Advance(Instant),
}

/// Keystroke validator for one target word.
///
/// Pure state machine: keystrokes and deadline polls go in, events come
/// out. Per-character render state is derived from the cursor and the
/// entered buffer, never stored on its own.
#[derive(Debug)]
pub struct Speller {
    target: Vec<char>,
    entered: Vec<Option<char>>,
    cursor: usize,
    complete: bool,
    mistaken: bool,
    pending: Option<Pending>,
}

impl Speller {
    pub fn new(text: &str) -> Self {
        let target: Vec<char> = text.chars().collect();
        let len = target.len();
        let mut speller = Self {
            target,
            entered: vec![None; len],
            cursor: 0,
            complete: false,
            mistaken: false,
            pending: None,
        };
        speller.seek_input_required();
        // A degenerate target with nothing to type mounts resolved;
        // arrow navigation still moves past it.
        speller.complete = len > 0 && speller.cursor == len;
        speller
    }

    /// Advance the cursor to the next input-required position,
    /// auto-filling every skippable character on the way.
    fn seek_input_required(&mut self) {
        while self.cursor < self.target.len() && is_skippable(self.target[self.cursor]) {
            self.entered[self.cursor] = Some(self.target[self.cursor]);
            self.cursor += 1;
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn target(&self) -> String {
        self.target.iter().collect()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// True while the post-mismatch cooldown is running.
    pub fn in_error(&self) -> bool {
        matches!(self.pending, Some(Pending::ErrorReset(_)))
    }

    /// Whether any mismatch happened during this visit. Left intact by
    /// success; the session consumes it when navigating away.
    pub fn take_mistaken(&mut self) -> bool {
        std::mem::take(&mut self.mistaken)
    }

    /// Feed one keystroke. Inputs are ignored outright while resolved
    /// or cooling down, when a modifier is held, and for keys that are
    /// not a letter or apostrophe.
    pub fn handle_key(&mut self, c: char, modifier_held: bool, now: Instant) -> Vec<SpellerEvent> {
        if self.complete || self.pending.is_some() || modifier_held || !is_input_required(c) {
            return Vec::new();
        }
        let Some(&expected) = self.target.get(self.cursor) else {
            return Vec::new();
        };

        self.entered[self.cursor] = Some(c);

        // Case-sensitive, no folding.
        if c != expected {
            self.mistaken = true;
            self.pending = Some(Pending::ErrorReset(now + ERROR_COOLDOWN));
            return vec![
                SpellerEvent::PlayCue(Cue::Failure),
                SpellerEvent::Report { quality: 1 },
            ];
        }

        self.cursor += 1;
        self.seek_input_required();

        if self.cursor == self.target.len() {
            self.complete = true;
            self.pending = Some(Pending::Advance(now + ADVANCE_DELAY));
            return vec![
                SpellerEvent::PlayCue(Cue::Success),
                SpellerEvent::Report { quality: 5 },
            ];
        }
        Vec::new()
    }

    /// Drive pending deadlines. Called from the runtime tick.
    pub fn poll(&mut self, now: Instant) -> Vec<SpellerEvent> {
        match self.pending {
            Some(Pending::ErrorReset(deadline)) if now >= deadline => {
                self.pending = None;
                self.reset_for_retry();
                vec![SpellerEvent::Pronounce]
            }
            Some(Pending::Advance(deadline)) if now >= deadline => {
                self.pending = None;
                vec![SpellerEvent::Advance]
            }
            _ => Vec::new(),
        }
    }

    /// After a mismatch the whole word is retried, not just the missed
    /// character.
    fn reset_for_retry(&mut self) {
        self.entered.fill(None);
        self.cursor = 0;
        self.seek_input_required();
    }

    /// Render state per target character, derived from cursor + buffer.
    pub fn char_states(&self) -> Vec<CharState> {
        self.target
            .iter()
            .enumerate()
            .map(|(i, &expected)| match self.entered[i] {
                Some(_) if is_skippable(expected) => CharState::Skipped,
                Some(typed) if typed == expected => CharState::Correct,
                Some(_) => CharState::Incorrect,
                None if i == self.cursor && !self.complete => CharState::Current,
                None => CharState::Untouched,
            })
            .collect()
    }
}
