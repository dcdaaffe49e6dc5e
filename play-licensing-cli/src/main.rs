//! play_licensing method-call runner
//!
//! Sends one method call through the licensing bridge, backed by a
//! scripted backend, and prints the reply as JSON. Useful for checking
//! how each backend outcome is shaped for `check` and `isAllowed`.
//!
//! Usage:
//!   play-licensing --method isAllowed --outcome error:6
//!   play-licensing --method check --salt d2411e80 --outcome dont-allow:561

use std::{fs, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use play_licensing::{
    CheckOutcome, HostIdentity, LicenseConfig, LicensingPlugin, MethodCall, ScriptedBackend,
    LICENSED, PUBLIC_KEY_ARG, SALT_ARG,
};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "play-licensing")]
#[command(about = "Send a play_licensing method call to a scripted backend")]
struct Args {
    /// Method to call (check, isAllowed, or anything else)
    #[arg(short, long, default_value = "check")]
    method: String,

    /// Hex salt override
    #[arg(long)]
    salt: Option<String>,

    /// Base64 public key override
    #[arg(long)]
    public_key: Option<String>,

    /// Backend outcome: allow:N, dont-allow:N or error:N
    #[arg(short, long, default_value = "allow:256")]
    outcome: String,

    /// Backend answer delay in milliseconds
    #[arg(long, default_value = "0")]
    delay_ms: u64,

    /// Package name reported to the backend
    #[arg(long, default_value = "com.github.yongjhih.flutter_play_licensing")]
    package: String,

    /// JSON configuration file (salt, publicKey); defaults to environment
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_outcome(spec: &str) -> Result<CheckOutcome> {
    let (kind, code) = spec.split_once(':').unwrap_or((spec, ""));
    let code = if code.is_empty() {
        LICENSED
    } else {
        code.parse::<i32>()
            .with_context(|| format!("invalid outcome code {code:?}"))?
    };
    match kind {
        "allow" => Ok(CheckOutcome::Allowed(code)),
        "dont-allow" => Ok(CheckOutcome::DontAllow(code)),
        "error" => Ok(CheckOutcome::ApplicationError(code)),
        other => bail!("unknown outcome kind {other:?} (expected allow, dont-allow or error)"),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<LicenseConfig> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            LicenseConfig::from_json(&json).context("parsing configuration")
        }
        None => LicenseConfig::from_env().context("reading configuration from environment"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = load_config(args.config.as_ref())?;
    let outcome = parse_outcome(&args.outcome)?;
    debug!(?outcome, method = %args.method, "Scripted call");

    let backend = ScriptedBackend::new(outcome).with_delay(Duration::from_millis(args.delay_ms));
    let plugin = LicensingPlugin::attach(
        config,
        Arc::new(HostIdentity::collect(args.package)),
        Arc::new(backend),
    )?;

    let mut call = MethodCall::new(args.method);
    if let Some(salt) = args.salt {
        call = call.with_argument(SALT_ARG, salt);
    }
    if let Some(key) = args.public_key {
        call = call.with_argument(PUBLIC_KEY_ARG, key);
    }

    let reply = plugin.call(call).await?;
    plugin.detach();

    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}
