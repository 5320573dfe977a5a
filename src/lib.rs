// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod error;
pub mod mask;
pub mod plan;
pub mod progress;
pub mod progress_db;
pub mod provider;
pub mod runtime;
pub mod session;
pub mod settings;
pub mod speller;
pub mod storage;
pub mod util;
pub mod word;
