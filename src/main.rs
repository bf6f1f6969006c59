use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::sync::watch;

use relay_bot::application::errors::BotError;
use relay_bot::application::messaging::{MessageDispatcher, MessageParser};
use relay_bot::application::services::{CommandService, MessageService};
use relay_bot::domain::entities::CommandRegistry;
use relay_bot::domain::traits::{Bot, ContentFetcher};
use relay_bot::infrastructure::adapters::console::{self, ConsoleAdapter};
use relay_bot::infrastructure::adapters::telegram::{self, TelegramAdapter};
use relay_bot::infrastructure::config::Config;
use relay_bot::infrastructure::fetcher::HttpFetcher;
use relay_bot::infrastructure::health::{self, StartSignal};

#[derive(Parser)]
#[command(name = "relay-bot")]
#[command(about = "A Telegram bot that relays facts, jokes and quotes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config and environment)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Telegram bot
    Run,
    /// Answer commands typed on stdin (dev mode)
    Console,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => load_config(&cli.config, cli.token).and_then(run_bot),
        Commands::Console => load_config(&cli.config, cli.token).and_then(run_console),
        Commands::Version => {
            println!("relay-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(config_path: &str, token_override: Option<String>) -> Result<Config, BotError> {
    let mut config = if std::path::Path::new(config_path).exists() {
        tracing::info!("Loading config from {}", config_path);
        Config::load(config_path)?
    } else {
        Config::default()
    };

    config.apply_env()?;
    if let Some(token) = token_override {
        config.telegram.token = Some(token);
    }

    Ok(config)
}

/// Built-in commands followed by the ones declared in the config file
fn build_registry(config: &Config) -> Result<CommandRegistry, BotError> {
    let mut commands = CommandService::new();
    commands.register_defaults()?;

    for source in &config.sources {
        commands.register(source.to_command())?;
    }

    tracing::info!("Registered {} commands", commands.registry().len());
    Ok(commands.into_registry())
}

fn build_fetcher(config: &Config) -> Result<Arc<dyn ContentFetcher>, BotError> {
    let fetcher = HttpFetcher::new(&config.fetch)
        .map_err(|e| BotError::Network(format!("Failed to build HTTP client: {}", e)))?;
    Ok(Arc::new(fetcher))
}

fn run_bot(config: Config) -> Result<(), BotError> {
    // Missing token is fatal before anything else starts
    let token = config.token()?.to_string();
    let registry = Arc::new(build_registry(&config)?);
    let fetcher = build_fetcher(&config)?;

    tracing::info!("Starting {}", config.bot.name);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_telegram_bot(config, token, registry, fetcher))
}

async fn run_telegram_bot(
    config: Config,
    token: String,
    registry: Arc<CommandRegistry>,
    fetcher: Arc<dyn ContentFetcher>,
) -> Result<(), BotError> {
    let signal = Arc::new(StartSignal::new());

    if let Some(port) = config.health.port {
        health::serve(&config.health, port, Arc::clone(&signal)).await?;

        if config.health.lazy_start {
            tracing::info!("Waiting for the first request to {} before polling", config.health.path);
            tokio::select! {
                _ = signal.wait() => {}
                _ = tokio::signal::ctrl_c() => return Ok(()),
            }
        }
    } else if config.health.lazy_start {
        tracing::warn!("health.lazy-start needs a health port; starting immediately");
    }

    let mut adapter = TelegramAdapter::new(token);
    adapter.fetch_bot_info().await?;
    let info = adapter.bot_info();
    tracing::info!("Bot started: @{}", info.username);

    if config.telegram.register_commands {
        if let Err(e) = adapter.register_commands(&registry.describe_all()).await {
            tracing::warn!("Failed to register commands: {}", e);
        }
    }

    let bot = Arc::new(adapter);
    bot.start().await?;

    let dispatcher = MessageDispatcher::new(registry, fetcher)
        .with_parser(MessageParser::new().with_bot_username(&info.username));
    let service = MessageService::new(Arc::clone(&bot), Arc::new(dispatcher));

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let poller = tokio::spawn(telegram::poll_loop(bot, service, config.telegram.poll_timeout, cancel_rx));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    let _ = cancel_tx.send(true);
    if let Err(e) = poller.await {
        tracing::error!("Poller task failed: {}", e);
    }

    Ok(())
}

fn run_console(config: Config) -> Result<(), BotError> {
    let registry = Arc::new(build_registry(&config)?);
    let fetcher = build_fetcher(&config)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let dispatcher = Arc::new(MessageDispatcher::new(registry, fetcher));
        let service = MessageService::new(Arc::new(ConsoleAdapter::new()), dispatcher);
        console::run_console(service).await
    })
}

fn init_config() -> Result<(), BotError> {
    let config = Config::default();
    let yaml = serde_yaml::to_string(&config)
        .map_err(|e| BotError::Parse(e.to_string()))?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
