//! # MedChat Record Store
//!
//! Ordered, read-only collection of question/answer pairs loaded once at
//! startup.
//!
//! ## Formats
//!
//! - **CSV** (default): header row with `question` and `answer` columns,
//!   extra columns ignored (MedQuAD ships `source` and `focus_area`)
//! - **JSON**: array of objects with `question` / `answer` keys
//! - **JSONL**: one such object per line
//!
//! Rows whose answer is absent or empty are dropped before the store is
//! exposed, so every [`QaRecord`] carries a non-empty answer. A missing
//! question is kept as `None`.
//!
//! ## Example
//!
//! ```no_run
//! use medchat_records::RecordStore;
//!
//! fn main() -> medchat_records::Result<()> {
//!     let store = RecordStore::load("medquad.csv")?;
//!     for record in store.records().iter().take(3) {
//!         println!("{:?} => {}", record.question(), record.answer);
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod loader;
mod store;
mod types;

pub use error::{RecordStoreError, Result};
pub use loader::DatasetFormat;
pub use store::RecordStore;
pub use types::{LoadStats, QaRecord};
