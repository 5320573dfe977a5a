use crate::error::{ProviderError, SyncError};
use crate::plan::LearningPlan;
use crate::word::Word;
use include_dir::{include_dir, Dir};
use serde::Deserialize;
use std::path::{Path, PathBuf};

static WORDLIST_DIR: Dir = include_dir!("wordlists");

/// Supplies word batches for a session.
pub trait WordProvider {
    fn fetch_words(
        &self,
        list_code: &str,
        due_new: usize,
        due_review: usize,
    ) -> Result<Vec<Word>, ProviderError>;

    fn fetch_mistake_words(&self, plan_id: u64) -> Result<Vec<Word>, ProviderError>;
}

/// Supplies the plan/progress snapshot consumed once per trigger.
pub trait PlanSnapshotSource {
    fn learning_plan(&self, list_code: &str) -> Option<LearningPlan>;
}

/// External progress-sync collaborator.
pub trait ProgressSync: Send {
    fn update_progress(&mut self, progress_id: u64, quality: u8) -> Result<(), SyncError>;
    fn advance(&mut self, plan_id: u64) -> Result<(), SyncError>;
}

/// On-disk word-list format shared by the bundled and file providers.
#[derive(Debug, Clone, Deserialize)]
pub struct WordList {
    pub list_code: String,
    pub name: String,
    pub words: Vec<Word>,
}

impl WordList {
    fn parse(raw: &str) -> Result<Self, ProviderError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Word lists compiled into the binary.
#[derive(Debug, Default)]
pub struct BundledWordProvider;

impl BundledWordProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn list(&self, list_code: &str) -> Result<WordList, ProviderError> {
        let file = WORDLIST_DIR
            .get_file(format!("{}.json", list_code))
            .ok_or_else(|| ProviderError::UnknownList(list_code.to_string()))?;
        let raw = file
            .contents_utf8()
            .ok_or_else(|| ProviderError::UnknownList(list_code.to_string()))?;
        WordList::parse(raw)
    }

    pub fn available_lists(&self) -> Vec<String> {
        let mut codes: Vec<String> = WORDLIST_DIR
            .files()
            .filter_map(|f| f.path().file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        codes.sort();
        codes
    }
}

impl WordProvider for BundledWordProvider {
    fn fetch_words(
        &self,
        list_code: &str,
        due_new: usize,
        due_review: usize,
    ) -> Result<Vec<Word>, ProviderError> {
        let list = self.list(list_code)?;
        let batch = due_new + due_review;
        Ok(list.words.into_iter().take(batch).collect())
    }

    /// Bundled lists carry no server-side mistake book; mistake-review
    /// sessions are triggered with an explicit word list instead.
    fn fetch_mistake_words(&self, _plan_id: u64) -> Result<Vec<Word>, ProviderError> {
        Ok(Vec::new())
    }
}

/// A user-supplied word-list JSON file.
#[derive(Debug, Clone)]
pub struct FileWordProvider {
    path: PathBuf,
}

impl FileWordProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn list(&self) -> Result<WordList, ProviderError> {
        let raw = std::fs::read_to_string(&self.path)?;
        WordList::parse(&raw)
    }
}

impl WordProvider for FileWordProvider {
    fn fetch_words(
        &self,
        list_code: &str,
        due_new: usize,
        due_review: usize,
    ) -> Result<Vec<Word>, ProviderError> {
        let list = self.list()?;
        if list.list_code != list_code {
            return Err(ProviderError::UnknownList(list_code.to_string()));
        }
        Ok(list.words.into_iter().take(due_new + due_review).collect())
    }

    fn fetch_mistake_words(&self, _plan_id: u64) -> Result<Vec<Word>, ProviderError> {
        Ok(Vec::new())
    }
}

/// Fixed snapshot source assembled by the host at startup.
#[derive(Debug, Clone)]
pub struct LocalPlanSource {
    plans: Vec<LearningPlan>,
}

impl LocalPlanSource {
    pub fn new(plans: Vec<LearningPlan>) -> Self {
        Self { plans }
    }
}

impl PlanSnapshotSource for LocalPlanSource {
    fn learning_plan(&self, list_code: &str) -> Option<LearningPlan> {
        self.plans.iter().find(|p| p.list_code == list_code).cloned()
    }
}
