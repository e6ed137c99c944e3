pub mod browser;
pub mod cli;
pub mod extractor;
pub mod logging;
pub mod pipeline;
pub mod search;

pub use browser::{BrowserHandle, BrowserSession, SessionGuard};
pub use cli::{handle_command, BrowserArgs, NewsCommands};
pub use extractor::{ContentExtractor, ExtractorConfig};
pub use logging::{init_logging, Logger};
pub use pipeline::{filter_recent, Pipeline, PipelineConfig, RunOutcome, RunReport};
pub use search::{SearchClient, SearchSelectors};

pub mod prelude {
    pub use super::browser::{BrowserHandle, Page};
    pub use super::pipeline::{Pipeline, PipelineConfig, RunOutcome};
    pub use ns_core::{Error, FinalPost, PipelineEvent, Renderer, Result};
}
