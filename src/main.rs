use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tetcard::logger::{self, LogLevel, LoggerConfig};
use tetcard::{
    CardController, CardError, CardPreview, Config, CredentialCapability, CredentialGate,
    EnvCapability, FormInput, GeminiClient, GenerateOutcome, PromptCapability, StyleOption,
    UiState,
};
use tokio::io::BufReader;

/// Rounds of "ask for a key, then try again" before giving up.
const MAX_KEY_PROMPTS: usize = 3;

/// Generate a Tết Bính Ngọ 2026 greeting card background with Gemini.
#[derive(Parser, Debug)]
#[command(name = "tetcard", version)]
struct Args {
    /// Sender shown at the bottom of the card (max 30 characters)
    #[arg(long, default_value = "")]
    name: String,

    /// Wish text; use \n for a line break (max 100 characters)
    #[arg(long, conflicts_with = "random_wish")]
    wish: Option<String>,

    /// Pick one of the built-in wishes
    #[arg(long)]
    random_wish: bool,

    /// Art style: traditional, modern-vector, three-d-cute, watercolor, luxury-gold, cyberpunk
    #[arg(long, default_value = "traditional")]
    style: StyleOption,

    /// Where to write the PNG (defaults to TETCARD_OUTPUT or tet-card.png)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Ask for the API key on stdin instead of reading GEMINI_API_KEY
    #[arg(long)]
    prompt_key: bool,

    /// List the available styles and exit
    #[arg(long)]
    list_styles: bool,

    #[arg(long, default_value = "info")]
    log_level: LogLevel,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let args = Args::parse();

    logger::init_with_config(
        LoggerConfig::new()
            .with_level(args.log_level)
            .with_json_output(args.json_logs),
    )?;
    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    if args.list_styles {
        for style in StyleOption::ALL {
            println!("{:<14} {}", style.id(), style.label());
        }
        return Ok(());
    }

    let mut config = Config::from_env();
    if let Some(out) = &args.out {
        config = config.with_output(out);
    }
    logger::log_config_info(&config);

    let client = GeminiClient::new(config.gemini.clone())?;
    let capability: Arc<dyn CredentialCapability> = if args.prompt_key {
        Arc::new(PromptCapability::new(
            client.key_store().clone(),
            BufReader::new(tokio::io::stdin()),
        ))
    } else {
        Arc::new(EnvCapability::new(client.key_store().clone()))
    };

    let mut form = FormInput::new()
        .with_sender_name(args.name.as_str())
        .with_style(args.style);
    if let Some(wish) = &args.wish {
        form.set_wish_text(wish.replace("\\n", "\n"));
    }

    let controller = CardController::new(
        CredentialGate::new(capability),
        Arc::new(client.image().clone()),
    )
    .with_form(form);
    if args.random_wish {
        let wish = controller.randomize_wish();
        log::info!("🎲 Wish: {}", wish.replace('\n', " / "));
    }

    controller.initialize().await;

    let mut prompts = 0;
    loop {
        match controller.generate().await {
            GenerateOutcome::Finished(UiState::Success(artifact)) => {
                let written = artifact.save(&config.output_path)?;
                log::info!(
                    "💾 Card background saved to {} ({} bytes)",
                    config.output_path.display(),
                    written
                );
                print_card(&controller.preview(), &config.output_path);
                log::info!("🏁 Final state: {}", controller.ui_state().name());
                return Ok(());
            }
            GenerateOutcome::Finished(UiState::Failed(err)) => {
                log::info!("🏁 Final state: {}", controller.ui_state().name());
                return Err(CardError::Generation(err).into());
            }
            GenerateOutcome::AlreadyGenerating => {
                return Err(CardError::Request("a generation is already in flight".into()).into());
            }
            GenerateOutcome::CredentialRequired | GenerateOutcome::Finished(_) => {
                if let Some(message) = controller.snapshot().error_message {
                    log::warn!("⚠️  {}", message);
                }
                if prompts == MAX_KEY_PROMPTS {
                    return Err(CardError::Config(
                        "no usable API key; set GEMINI_API_KEY or use --prompt-key".into(),
                    )
                    .into());
                }
                prompts += 1;
                controller.complete_credential_prompt().await?;
            }
        }
    }
}

fn print_card(preview: &CardPreview, path: &std::path::Path) {
    if let CardPreview::Ready { overlay, .. } = preview {
        println!("🧧 {}", path.display());
        for line in overlay.lines() {
            println!("   {}", line);
        }
    }
}
