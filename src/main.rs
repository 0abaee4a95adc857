use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use jugal::integration::{
    default_config_dir, AppConfig, ConversationSession, SessionEvent, CONFIG_FILE_NAME,
};
use jugal::messages::Role;
use jugal::speech::Language;
use jugal::APP_NAME;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "Commands: /lang en|ne, /reset, /logout, /mic, /speak, /stop, /quit";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jugal=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting {}", APP_NAME);

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| default_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME)));
    let config = match config_path {
        Some(path) => AppConfig::load_or_default(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AppConfig::default(),
    };

    let mut session = ConversationSession::from_config(&config)?;
    let events = session.subscribe();

    for message in session.snapshot().messages {
        println!("{}: {}\n", APP_NAME, message.text);
    }
    if session.is_gated() {
        prompt_credential(None);
    } else {
        println!("{}", HELP);
        prompt(&session);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();

        if session.is_gated() {
            if line.is_empty() {
                prompt_credential(session.state().credential_error().as_deref());
                continue;
            }
            if session.save_credential(&line).is_ok() {
                println!("API key saved.\n{}", HELP);
            }
            drain(&events);
            if !session.is_gated() {
                prompt(&session);
            }
            continue;
        }

        match line.as_str() {
            "/quit" => break,
            "/reset" => {
                session.reset_conversation();
                for message in session.snapshot().messages {
                    println!("{}: {}\n", APP_NAME, message.text);
                }
            }
            "/logout" => session.remove_credential(),
            "/stop" => session.stop_speaking(),
            "/mic" => {
                // Failures are reported through a notice event
                let _ = session.toggle_recording();
            }
            "/speak" => {
                let last = session
                    .state()
                    .read()
                    .messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::Assistant)
                    .map(|m| m.id);
                if let Some(id) = last {
                    let _ = session.speak_message(id);
                }
            }
            cmd if cmd.starts_with("/lang") => {
                let arg = cmd.trim_start_matches("/lang").trim();
                match arg.parse::<Language>() {
                    Ok(language) => session.set_language(language),
                    Err(e) => println!("{}", e),
                }
            }
            cmd if cmd.starts_with('/') => println!("{}", HELP),
            text => {
                session.send(text).await;
            }
        }

        drain(&events);
        if !session.is_gated() {
            prompt(&session);
        }
    }

    info!("Shutting down");
    Ok(())
}

/// Print everything the session reported since the last command
fn drain(events: &Receiver<SessionEvent>) {
    for event in events.try_iter() {
        match event {
            SessionEvent::MessageAppended(message) if message.role == Role::Assistant => {
                println!("\n{}: {}\n", APP_NAME, message.text);
            }
            SessionEvent::CredentialRequired { error } => prompt_credential(error.as_deref()),
            SessionEvent::Notice(notice) => println!("! {}", notice),
            _ => {}
        }
    }
}

fn prompt_credential(error: Option<&str>) {
    if let Some(error) = error {
        println!("! {}", error);
    }
    print!("Enter your Gemini API key: ");
    let _ = std::io::stdout().flush();
}

fn prompt(session: &ConversationSession) {
    print!("[{}] > ", session.state().language().label());
    let _ = std::io::stdout().flush();
}
