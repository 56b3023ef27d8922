use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use speakgenie::api::ApiServerBuilder;
use speakgenie::scenario::{self, ScenarioStatus};
use speakgenie::session::{RoleplaySession, SpokenUtterance, TurnOutcome};
use speakgenie::voice::{ConsoleRecognizer, ConsoleSynthesizer, SpeechAdapter};
use speakgenie::{
    CannedResponder, CaptureError, Config, ConversationGateway, Error, HttpResponder, Responder,
    SettingsStore, TurnSession, User, VoiceProfile,
};

/// Opening line of a free chat
const GREETING: &str = "Hi there! I'm Genie, your English tutor! Ask me anything about English or just have a chat. What would you like to talk about today?";

/// SpeakGenie - practice spoken English with Genie
#[derive(Parser)]
#[command(name = "genie", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the tutoring API server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "GENIE_PORT")]
        port: Option<u16>,
    },
    /// Talk freely with Genie
    Chat {
        /// Answer in-process instead of calling the API server
        #[arg(long)]
        offline: bool,
        /// Also hear every reply in your native language
        #[arg(long)]
        native: bool,
    },
    /// Practice a roleplay scenario
    Roleplay {
        /// Scenario id (see `genie scenarios`)
        scenario: String,
        /// Answer in-process instead of calling the API server
        #[arg(long)]
        offline: bool,
    },
    /// List roleplay scenarios
    Scenarios,
    /// Translate a phrase
    Translate {
        text: String,
        /// Target language tag (defaults to your native language)
        #[arg(long)]
        to: Option<String>,
        /// Answer in-process instead of calling the API server
        #[arg(long)]
        offline: bool,
    },
    /// Show saved learner and voice settings
    Settings,
    /// Interactive setup
    Setup,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,speakgenie=info",
        1 => "info,speakgenie=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load();
    tracing::debug!(?config, "loaded configuration");
    let store = SettingsStore::new(&config.data_dir);

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(&config, port).await,
        Command::Chat { offline, native } => chat(&config, &store, offline, native).await,
        Command::Roleplay { scenario, offline } => {
            roleplay(&config, &store, &scenario, offline).await
        }
        Command::Scenarios => {
            list_scenarios();
            Ok(())
        }
        Command::Translate { text, to, offline } => {
            let target = to.unwrap_or_else(|| store.load_user().native_language);
            let gateway = gateway(&config, offline)?;
            println!("{}", gateway.translate(&text, &target).await);
            Ok(())
        }
        Command::Settings => {
            println!("{}", serde_json::to_string_pretty(&store.load_user())?);
            println!("{}", serde_json::to_string_pretty(&store.load_voice_settings())?);
            Ok(())
        }
        Command::Setup => speakgenie::setup::run_setup(&store),
    }
}

async fn serve(config: &Config, port: Option<u16>) -> anyhow::Result<()> {
    let server = ApiServerBuilder::new(
        Arc::new(CannedResponder::new()),
        port.unwrap_or(config.api_server.port),
    )
    .static_dir(config.api_server.static_dir.clone())
    .build();

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    Ok(())
}

/// Gateway over the configured backend
fn gateway(config: &Config, offline: bool) -> anyhow::Result<ConversationGateway> {
    let responder: Arc<dyn Responder> = if offline {
        Arc::new(CannedResponder::new())
    } else {
        tracing::debug!(url = %config.gateway.api_url, "using HTTP responder");
        Arc::new(HttpResponder::new(
            config.gateway.api_url.clone(),
            config.gateway.reply_timeout,
        )?)
    };

    Ok(ConversationGateway::new(responder).reply_timeout(config.gateway.reply_timeout))
}

/// Session over console speech with the saved voice
fn console_session(
    config: &Config,
    store: &SettingsStore,
    offline: bool,
) -> anyhow::Result<TurnSession> {
    let speech = SpeechAdapter::new(
        ConsoleRecognizer::stdin(),
        ConsoleSynthesizer::stdout().word_pace(config.voice.word_pace),
    )
    .recognition_language("en-US");

    let profile = VoiceProfile::from(&store.load_voice_settings());

    Ok(TurnSession::new(Arc::new(speech), gateway(config, offline)?)
        .with_voice_profile(profile)
        .with_timeouts(config.session.capture_timeout, config.session.playback_timeout))
}

async fn chat(
    config: &Config,
    store: &SettingsStore,
    offline: bool,
    native: bool,
) -> anyhow::Result<()> {
    let user = store.load_user();
    let session = console_session(config, store, offline)?;
    let translate = native && user.wants_translation();

    println!("Type what you want to say and press Enter. Ctrl-D to finish.\n");
    report_playback(&session.announce(GREETING).await?);

    loop {
        match session.request_turn().await {
            Ok(TurnOutcome::Completed { reply, .. }) => {
                report_playback(&reply);
                if translate {
                    replay_native(&session, &reply, &user).await;
                }
            }
            Ok(TurnOutcome::NoSpeech) => println!("(I didn't catch that. Try typing something!)"),
            Err(Error::Capture(CaptureError::Denied)) => break,
            Err(e) if e.is_retryable() => println!("{}", e.user_message()),
            Err(e) => return Err(e.into()),
        }
    }

    println!("\nBye{}! See you next time.", greeting_name(&user));
    Ok(())
}

async fn roleplay(
    config: &Config,
    store: &SettingsStore,
    scenario_id: &str,
    offline: bool,
) -> anyhow::Result<()> {
    let script = scenario::find(scenario_id)?.clone();
    let session = console_session(config, store, offline)?;
    let mut roleplay = RoleplaySession::new(session, script);

    println!("{} {}\n", roleplay.script().emoji, roleplay.script().title);
    if let Some(opening) = roleplay.start().await? {
        report_playback(&opening);
    }
    print_hints(roleplay.hints());

    while !roleplay.is_completed() {
        match roleplay.take_turn().await {
            Ok(turn) => {
                if let TurnOutcome::Completed { reply, .. } = &turn.outcome {
                    report_playback(reply);
                }
                if let Some(next) = &turn.next {
                    report_playback(next);
                    println!("⭐ Score: {}", turn.progress.score);
                    print_hints(roleplay.hints());
                }
            }
            Err(Error::Capture(CaptureError::Denied)) => break,
            Err(e) if e.is_retryable() => println!("{}", e.user_message()),
            Err(e) => return Err(e.into()),
        }
    }

    let progress = roleplay.progress();
    if progress.status == ScenarioStatus::Completed {
        println!("\n🏆 Final score: {}", progress.score);
    } else {
        println!("\nStopped at prompt {} with {} points.", progress.current_index + 1, progress.score);
    }

    Ok(())
}

async fn replay_native(session: &TurnSession, reply: &SpokenUtterance, user: &User) {
    if let Err(e) = session
        .replay_translated(&reply.utterance.id, &user.native_language)
        .await
    {
        tracing::warn!(error = %e, "translated replay failed");
        println!("{}", e.user_message());
    }
}

fn report_playback(spoken: &SpokenUtterance) {
    if let Some(e) = &spoken.playback_error {
        tracing::warn!(error = %e, "playback failed");
        println!("{}", Error::Playback(e.clone()).user_message());
    }
}

fn print_hints(hints: &[String]) {
    if !hints.is_empty() {
        println!("💡 Try: {}", hints.join(" / "));
    }
}

fn greeting_name(user: &User) -> String {
    if user.name.is_empty() {
        String::new()
    } else {
        format!(", {}", user.name)
    }
}

fn list_scenarios() {
    for script in scenario::catalog() {
        println!(
            "{} {:<12} {} ({:?}, {} prompts)\n   {}",
            script.emoji,
            script.id,
            script.title,
            script.difficulty,
            script.len(),
            script.description
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_port_reads_genie_port() {
        let cli = Cli::command();
        let serve = cli.find_subcommand("serve").unwrap();
        let port = serve
            .get_arguments()
            .find(|arg| arg.get_id() == "port")
            .unwrap();
        assert_eq!(port.get_env(), Some(std::ffi::OsStr::new("GENIE_PORT")));
    }

    #[test]
    fn explicit_port_flag_parses() {
        let cli = Cli::try_parse_from(["genie", "serve", "--port", "4100"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Serve { port: Some(4100) })));
    }
}
