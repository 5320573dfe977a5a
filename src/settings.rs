use crate::storage::KeyValueStore;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

mod keys {
    pub const SPEECH_CONFIG: &str = "spelldrill_speechConfig";
    pub const CUSTOM_VOICE: &str = "spelldrill_customVoice";
    pub const DISPLAY_MODE: &str = "spelldrill_displayMode";
    pub const HIDE_WORD_IN_SENTENCE: &str = "spelldrill_hideWordInSentence";
    pub const SHOW_SENTENCES: &str = "spelldrill_showSentences";
    pub const SHOW_SENTENCE_TRANSLATION: &str = "spelldrill_showSentenceTranslation";
}

/// How much of the target word is masked while spelling.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display, clap::ValueEnum,
)]
#[serde(rename_all = "camelCase")]
pub enum DisplayMode {
    Full,
    HideVowels,
    HideConsonants,
    HideRandom,
    HideAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    Auto,
    Male,
    Female,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechConfig {
    pub accent: String,
    pub rate: f64,
    pub gender: VoiceGender,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            accent: "en-GB".to_string(),
            rate: 0.8,
            gender: VoiceGender::Auto,
        }
    }
}

/// Session preferences with per-key durable persistence.
///
/// Every preference is loaded independently at startup; a missing or
/// corrupt entry falls back to its default without failing the load.
/// Every setter writes its own key straight back; write failures are
/// logged and swallowed so a broken disk never blocks a state change.
pub struct SettingsStore<S: KeyValueStore> {
    store: S,
    speech: SpeechConfig,
    custom_voice: bool,
    display_mode: DisplayMode,
    hide_word_in_sentence: bool,
    show_sentences: bool,
    show_sentence_translation: bool,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn load(store: S) -> Self {
        let speech = read_or(&store, keys::SPEECH_CONFIG, SpeechConfig::default());
        let custom_voice = read_or(&store, keys::CUSTOM_VOICE, false);
        let display_mode = read_or(&store, keys::DISPLAY_MODE, DisplayMode::HideRandom);
        let hide_word_in_sentence = read_or(&store, keys::HIDE_WORD_IN_SENTENCE, true);
        let show_sentences = read_or(&store, keys::SHOW_SENTENCES, false);
        let show_sentence_translation = read_or(&store, keys::SHOW_SENTENCE_TRANSLATION, true);

        Self {
            store,
            speech,
            custom_voice,
            display_mode,
            hide_word_in_sentence,
            show_sentences,
            show_sentence_translation,
        }
    }

    pub fn speech(&self) -> &SpeechConfig {
        &self.speech
    }

    pub fn set_speech(&mut self, speech: SpeechConfig) {
        self.speech = speech;
        self.write(keys::SPEECH_CONFIG, &self.speech);
    }

    pub fn custom_voice(&self) -> bool {
        self.custom_voice
    }

    pub fn set_custom_voice(&mut self, value: bool) {
        self.custom_voice = value;
        self.write(keys::CUSTOM_VOICE, &value);
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    /// Changing the mode away from `Full` forces the in-sentence hide
    /// flag on, as a side effect of this specific change only.
    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.display_mode = mode;
        self.write(keys::DISPLAY_MODE, &mode);
        if mode != DisplayMode::Full && !self.hide_word_in_sentence {
            self.set_hide_word_in_sentence(true);
        }
    }

    pub fn hide_word_in_sentence(&self) -> bool {
        self.hide_word_in_sentence
    }

    pub fn set_hide_word_in_sentence(&mut self, value: bool) {
        self.hide_word_in_sentence = value;
        self.write(keys::HIDE_WORD_IN_SENTENCE, &value);
    }

    pub fn show_sentences(&self) -> bool {
        self.show_sentences
    }

    pub fn set_show_sentences(&mut self, value: bool) {
        self.show_sentences = value;
        self.write(keys::SHOW_SENTENCES, &value);
    }

    pub fn show_sentence_translation(&self) -> bool {
        self.show_sentence_translation
    }

    pub fn set_show_sentence_translation(&mut self, value: bool) {
        self.show_sentence_translation = value;
        self.write(keys::SHOW_SENTENCE_TRANSLATION, &value);
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => {
                if let Err(e) = self.store.set(key, &json) {
                    log::warn!("failed to persist {}: {}", key, e);
                }
            }
            Err(e) => log::warn!("failed to serialize {}: {}", key, e),
        }
    }
}

fn read_or<S: KeyValueStore, T: DeserializeOwned>(store: &S, key: &str, default: T) -> T {
    match store.get(key) {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("corrupt preference {}: {}", key, e);
            default
        }),
        None => default,
    }
}
