//! Server log handler: one-shot dump or `--follow` tail.

use std::sync::Arc;

use wadas_core::{Console, LogTail};

use crate::cli::{GlobalOpts, LogsArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(console: &Console, args: LogsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if !args.follow {
        let client = console.client();
        let lines = console.session().call(|| client.logs()).await?;
        output::print_output(&lines.join("\n"), global.quiet);
        return Ok(());
    }

    let period = args
        .interval
        .unwrap_or(console.config().log_poll_interval);
    let tail = LogTail::start(Arc::clone(console.client()), console.session().clone(), period);
    follow(console, &tail, global).await
}

/// Print new lines as the tail picks them up, until ctrl-c or the
/// session is lost.
async fn follow(console: &Console, tail: &LogTail, global: &GlobalOpts) -> Result<(), CliError> {
    let mut states = tail.subscribe();
    let mut printed: Vec<String> = Vec::new();
    let mut last_error: Option<String> = None;

    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => break,
            () = tail.stopped() => break,
            state = states.changed() => {
                let Some(state) = state else { break };
                if state.error != last_error {
                    if let Some(ref message) = state.error {
                        tracing::warn!(%message, "log poll failed");
                    }
                    last_error.clone_from(&state.error);
                }
                let fresh = unseen(&printed, &state.lines);
                if !fresh.is_empty() {
                    output::print_output(&fresh.join("\n"), global.quiet);
                }
                printed = state.lines;
            }
        }
    }

    tail.stop();
    if console.is_authenticated() {
        Ok(())
    } else {
        Err(CliError::SessionExpired)
    }
}

/// Lines of `current` that follow the last line already printed. The
/// server returns a rolling window, so an unknown last line means the
/// whole window is new.
fn unseen<'a>(printed: &[String], current: &'a [String]) -> &'a [String] {
    let Some(last) = printed.last() else {
        return current;
    };
    match current.iter().rposition(|line| line == last) {
        Some(pos) => &current[pos + 1..],
        None => current,
    }
}
