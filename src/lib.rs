pub mod config;
pub mod dedup;
pub mod dispatch;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod keyphrase;
pub mod messaging;
pub mod render;
pub mod run;
pub mod source;

pub use error::RunError;
pub use run::{RunOutcome, run};
