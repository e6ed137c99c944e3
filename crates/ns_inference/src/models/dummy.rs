use std::fmt;
use ns_core::{CompletionModel, Result};

const WORD_LIMIT: usize = 20;

/// Offline stand-in for a completion service, handy for dry runs of the
/// pipeline without credentials.
#[derive(Default)]
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl CompletionModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        // Take first 20 words and join them
        let words: Vec<&str> = prompt.split_whitespace().take(WORD_LIMIT).collect();
        Ok(words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_model() {
        let model = DummyModel::new();
        let prompt = "This is a test prompt. It has multiple sentences.\n\nAnd a second paragraph \
                      that goes on for quite a while so that it is longer than twenty words in total.";

        let result = tokio_test::block_on(model.complete(prompt)).unwrap();
        assert!(result.starts_with("This is a test prompt."));
        assert_eq!(result.split_whitespace().count(), WORD_LIMIT);
    }
}
