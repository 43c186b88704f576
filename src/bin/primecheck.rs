use std::io;

use anyhow::Context;
use tokio::sync::oneshot;
use webapp::primes::repl;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the conversation, logs go to stderr
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    repl::intro(&mut io::stdout())?;

    let (done_tx, done_rx) = oneshot::channel();
    tokio::task::spawn_blocking(move || {
        let stdin = io::stdin();
        repl::read_user_input(stdin.lock(), io::stdout(), done_tx);
    });

    done_rx
        .await
        .context("input loop ended without reporting")?
        .context("reading input")?;

    println!("Goodbye.");
    Ok(())
}
