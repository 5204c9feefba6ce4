//! muster entry point.

use std::{
    net::SocketAddr,
    path::PathBuf,
    process::ExitCode,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use clap::Parser;
use muster_cli::{App, FatalError, ports::UdpConnector};
use muster_console::TerminalConsole;
use muster_identity::{Credentials, IdentitySession};
use tracing_subscriber::EnvFilter;

/// Interactive console client for the muster room coordinator
#[derive(Debug, Parser)]
#[command(name = "muster")]
#[command(about = "Log in, coordinate rooms, stay at the prompt")]
#[command(version)]
struct Args {
    /// Identity (login) server address
    #[arg(long, default_value = "127.0.0.1:27004")]
    identity_server: SocketAddr,

    /// Room coordination server address
    #[arg(long, default_value = "127.0.0.1:27003")]
    coordination_server: SocketAddr,

    /// Credentials secret file; fresh ephemeral credentials are used when
    /// not given
    #[arg(long)]
    secret_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout belongs to the console's line discipline.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            e.exit_code()
        },
    }
}

async fn run(args: Args) -> Result<(), FatalError> {
    let credentials = match &args.secret_file {
        Some(path) => Credentials::load(path)?,
        None => Credentials::ephemeral(),
    };

    let identity = IdentitySession::connect(args.identity_server, credentials)?;
    let connector = UdpConnector::new(args.coordination_server);

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            flag.store(true, Ordering::Relaxed);
        }
    });

    // Raw mode last, so setup failures above still print normally.
    let console = TerminalConsole::new()?;

    App::new(console, identity, connector, shutdown).run().await
}
