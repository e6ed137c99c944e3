use std::sync::Arc;
use ns_core::{CompletionModel, Result};
use crate::{Config, Provider};

pub mod dummy;
pub mod openai;

pub use dummy::DummyModel;
pub use openai::OpenAiCompatibleModel;

/// Builds the completion model described by `config`, falling back to the
/// default Groq configuration when none is given.
pub fn create_model(config: Option<Config>) -> Result<Arc<dyn CompletionModel>> {
    let config = config.unwrap_or_default();
    let model: Arc<dyn CompletionModel> = match config.provider {
        Provider::Dummy => Arc::new(DummyModel::new()),
        _ => Arc::new(OpenAiCompatibleModel::new(&config)?),
    };
    tracing::debug!("Created completion model {} ({})", model.name(), config.model_name());
    Ok(model)
}
