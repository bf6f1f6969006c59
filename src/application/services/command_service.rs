use rand::seq::SliceRandom;

use crate::application::errors::CommandError;
use crate::domain::entities::{Command, CommandContext, CommandHandler, CommandRegistry, ContentSource};

pub const WELCOME_TEXT: &str = "Welcome to my Telegram bot! Type /help to see what I can do.";
pub const ECHO_USAGE: &str = "Usage: /echo YourText";

const JOKES: &[&str] = &[
    "Why don’t skeletons fight each other? They don’t have the guts!",
    "What do you call fake spaghetti? An impasta!",
    "Why don’t scientists trust atoms? Because they make up everything!",
];

/// Builds the command registry used by the dispatcher
pub struct CommandService {
    registry: CommandRegistry,
}

impl CommandService {
    pub fn new() -> Self {
        Self {
            registry: CommandRegistry::new(),
        }
    }

    pub fn register(&mut self, command: Command) -> Result<(), CommandError> {
        tracing::debug!("Registering /{} ({})", command.name, command.handler.kind());
        self.registry.register(command)
    }

    /// start, help, echo, joke, time, cat, advice, trivia, quote
    pub fn register_defaults(&mut self) -> Result<(), CommandError> {
        self.register(Command::new("start", CommandHandler::text(WELCOME_TEXT))
            .with_description("Start the bot and get a welcome message"))?;

        self.register(Command::new("help", CommandHandler::computed(|ctx| help_text(ctx.registry)))
            .with_description("List all available commands and their descriptions"))?;

        self.register(Command::new("echo", CommandHandler::computed(echo))
            .with_description("Echo back the text you send (Usage: /echo YourText)"))?;

        self.register(Command::new("joke", CommandHandler::computed(|_| random_joke().to_string()))
            .with_description("Get a random joke"))?;

        self.register(Command::new("time", CommandHandler::computed(|_| server_time()))
            .with_description("Get the current server time"))?;

        self.register(Command::new("cat", CommandHandler::Fetched(cat_fact_source()))
            .with_description("Get a random cat fact"))?;

        self.register(Command::new("advice", CommandHandler::Fetched(advice_source()))
            .with_description("Get a random piece of advice"))?;

        self.register(Command::new("trivia", CommandHandler::Fetched(trivia_source()))
            .with_description("Get a random trivia question with its answer"))?;

        self.register(Command::new("quote", CommandHandler::Fetched(quote_source()))
            .with_description("Get an inspirational quote"))?;

        Ok(())
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> CommandRegistry {
        self.registry
    }
}

impl Default for CommandService {
    fn default() -> Self {
        Self::new()
    }
}

/// Help listing built from the registry, in registration order
pub fn help_text(registry: &CommandRegistry) -> String {
    let lines: Vec<String> = registry
        .describe_all()
        .into_iter()
        .map(|(name, description)| format!("{} - {}", name, description))
        .collect();
    format!("Here are the available commands:\n\n{}", lines.join("\n"))
}

fn echo(ctx: &CommandContext<'_>) -> String {
    if ctx.args.is_empty() {
        ECHO_USAGE.to_string()
    } else {
        format!("You said: {}", ctx.args)
    }
}

fn random_joke() -> &'static str {
    JOKES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(JOKES[0])
}

fn server_time() -> String {
    let now = chrono::Local::now();
    format!("The current server time is: {}", now.format("%Y-%m-%d %H:%M:%S (UTC%:z)"))
}

pub fn cat_fact_source() -> ContentSource {
    ContentSource::new("https://catfact.ninja/fact", "🐱 Cat Fact:", "a cat fact", "{/fact}")
}

pub fn advice_source() -> ContentSource {
    ContentSource::new("https://api.adviceslip.com/advice", "💡 Advice:", "advice", "{/slip/advice}")
}

pub fn trivia_source() -> ContentSource {
    ContentSource::new(
        "https://opentdb.com/api.php?amount=1",
        "🧠 Trivia:",
        "a trivia question",
        "{/results/0/question}\nAnswer: {/results/0/correct_answer}",
    )
}

pub fn quote_source() -> ContentSource {
    ContentSource::new("https://api.quotable.io/random", "📜 Quote:", "a quote", "\"{/content}\" - {/author}")
}
