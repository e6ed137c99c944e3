pub mod chunker;
pub mod document;
pub mod error;
pub mod models;
pub mod recency;
pub mod render;
pub mod types;

pub use chunker::chunk;
pub use document::AggregatedDocument;
pub use error::{Error, Result};
pub use models::CompletionModel;
pub use recency::is_recent;
pub use render::{RenderOptions, Renderer};
pub use types::{
    Chunk, ChunkSummary, ExtractedArticle, ExtractionStatus, FinalPost, PipelineEvent,
    RecentArticle, SearchResult, Stage,
};
