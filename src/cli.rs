use clap::{Args, Parser, Subcommand};
use flashstore::config::{AppConfig, FileConfig, parse_utc_offset, validate_payload_limit};
use flashstore::error::ConfigError;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub(crate) enum RunOutcome {
    Serve(AppConfig),
    Exit(i32),
}

pub(crate) fn run() -> RunOutcome {
    let mut cli = Cli::parse();
    if let Some(Command::Init(args)) = cli.command.take() {
        let code = run_init(args);
        return RunOutcome::Exit(code);
    }

    match resolve_config(&cli) {
        Ok(config) => RunOutcome::Serve(config),
        Err(err) => {
            eprintln!("error: {err}");
            RunOutcome::Exit(2)
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "flashstore",
    version,
    about = "Flash-sale push subscription and delivery server"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    #[arg(long, env = "FLASHSTORE_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "FLASHSTORE_BIND")]
    bind: Option<SocketAddr>,
    #[arg(long, env = "FLASHSTORE_APP_NAME")]
    app_name: Option<String>,
    #[arg(long, env = "FLASHSTORE_VAPID_PRIVATE_KEY")]
    vapid_private_key: Option<String>,
    #[arg(long, env = "FLASHSTORE_VAPID_PUBLIC_KEY")]
    vapid_public_key: Option<String>,
    #[arg(long, env = "FLASHSTORE_VAPID_SUBJECT")]
    vapid_subject: Option<String>,
    #[arg(long, env = "FLASHSTORE_SEND_TIMEOUT_SECS")]
    send_timeout_secs: Option<u64>,
    #[arg(long, env = "FLASHSTORE_MAX_PAYLOAD_BYTES")]
    max_payload_bytes: Option<usize>,
    #[arg(long, env = "FLASHSTORE_UTC_OFFSET", allow_hyphen_values = true)]
    utc_offset: Option<String>,
    #[arg(long, env = "FLASHSTORE_KEEP_GONE_SUBSCRIPTIONS")]
    keep_gone_subscriptions: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a VAPID key pair.
    Init(InitArgs),
}

#[derive(Args, Debug)]
struct InitArgs {
    #[arg(long)]
    subject: Option<String>,
}

fn run_init(args: InitArgs) -> i32 {
    let credentials = match flashstore::generate_vapid_credentials() {
        Ok(credentials) => credentials,
        Err(err) => {
            eprintln!("failed to generate VAPID credentials: {err}");
            return 1;
        }
    };
    let (subject, show_subject_note) = match args.subject {
        Some(subject) => (subject, false),
        None => ("mailto:admin@flashstore.example".to_string(), true),
    };

    println!("VAPID credentials generated.");
    println!();
    println!("FLASHSTORE_VAPID_PRIVATE_KEY=\"{}\"", credentials.private_key);
    println!("FLASHSTORE_VAPID_PUBLIC_KEY=\"{}\"", credentials.public_key);
    println!("FLASHSTORE_VAPID_SUBJECT=\"{subject}\"");
    if show_subject_note {
        println!();
        println!("Note: replace FLASHSTORE_VAPID_SUBJECT with a contact URI you control.");
    }
    println!();
    println!(
        "--vapid-private-key \"{}\" --vapid-public-key \"{}\" --vapid-subject \"{subject}\"",
        credentials.private_key, credentials.public_key
    );
    0
}

/// Flags and environment win over the config file, which wins over defaults.
fn resolve_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    let file = match cli.config.as_deref() {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let mut config = file.into_app_config()?;

    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(app_name) = cli.app_name.as_ref() {
        config.app_name = app_name.clone();
    }
    if cli.vapid_private_key.is_some() {
        config.vapid_private_key = cli.vapid_private_key.clone();
    }
    if cli.vapid_public_key.is_some() {
        config.vapid_public_key = cli.vapid_public_key.clone();
    }
    if cli.vapid_subject.is_some() {
        config.vapid_subject = cli.vapid_subject.clone();
    }
    match cli.send_timeout_secs {
        Some(0) => return Err(ConfigError::InvalidTimeout),
        Some(secs) => config.send_timeout = Duration::from_secs(secs),
        None => {}
    }
    if let Some(bytes) = cli.max_payload_bytes {
        config.max_payload_bytes = validate_payload_limit(bytes)?;
    }
    if let Some(raw) = cli.utc_offset.as_deref() {
        config.utc_offset = parse_utc_offset(raw)?;
    }
    if cli.keep_gone_subscriptions {
        config.evict_gone_subscriptions = false;
    }

    Ok(config)
}
