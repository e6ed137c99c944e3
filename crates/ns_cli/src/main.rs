use std::sync::Arc;
use std::time::Duration;
use clap::Parser;
use tracing::{info, Level};
use ns_core::Result;
use ns_inference::Provider;
use ns_scrappers::{handle_command, init_logging, BrowserArgs, NewsCommands};

#[derive(Parser, Debug)]
#[command(author, version, about = "Turns recent news coverage of a topic into a short post", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    browser: BrowserArgs,
    /// Completion backend used for summaries and the final post
    #[arg(long, value_enum, env = "NS_PROVIDER", default_value = "groq")]
    provider: Provider,
    /// Model name; defaults to the provider's usual model (llama3-8b-8192 on Groq)
    #[arg(long, env = "NS_MODEL")]
    model: Option<String>,
    /// API key; read from the provider's variable (e.g. GROQ_API_KEY) when omitted
    #[arg(long)]
    api_key: Option<String>,
    /// Override the provider's OpenAI-compatible endpoint
    #[arg(long)]
    base_url: Option<String>,
    /// Seconds allowed for a single completion request
    #[arg(long, default_value_t = 90)]
    completion_timeout: u64,
    /// More output: -v for debug, -vv for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: NewsCommands,
}

impl Cli {
    fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    fn inference_config(&self) -> ns_inference::Config {
        let api_key = self.api_key.clone().or_else(|| {
            self.provider
                .api_key_var()
                .and_then(|var| std::env::var(var).ok())
                .filter(|key| !key.trim().is_empty())
        });

        ns_inference::Config {
            provider: self.provider,
            api_key,
            model_name: self.model.clone(),
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.completion_timeout),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    let inference = cli.inference_config();
    info!("🧠 Using {} ({})", cli.provider.display_name(), inference.model_name());

    let browser = Arc::new(cli.browser.browser_handle());
    handle_command(cli.command, browser, inference).await
}
