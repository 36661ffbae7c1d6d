//! Command dispatch. Each handler validates its flags, builds the typed
//! input, calls the resource client and prints JSON to `out`.

mod card;
mod deck;
mod due;
mod template;

use std::io::Write;

use futures::{pin_mut, Stream, StreamExt};
use mochi_core::{ApiError, Session};
use serde::Serialize;
use tracing::debug;

use crate::args::Command;

pub async fn run(command: Command, session: &mut Session, out: &mut dyn Write) -> Result<(), ApiError> {
    debug!(?command, "dispatching");
    match command {
        Command::Card(cmd) => card::run(cmd, session, out).await,
        Command::Deck(cmd) => deck::run(cmd, session, out).await,
        Command::Template(cmd) => template::run(cmd, session, out).await,
        Command::Due(args) => due::run(args, session, out).await,
    }
}

/// Pretty-printed JSON document followed by a newline.
pub(crate) fn print_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<(), ApiError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| ApiError::Serialization(e.to_string()))?;
    writeln!(out, "{text}")?;
    Ok(())
}

#[derive(Serialize)]
struct Ack<'a> {
    success: bool,
    message: &'a str,
}

/// `{"success":true,"message":...}` on one line.
pub(crate) fn print_ack(out: &mut dyn Write, message: &str) -> Result<(), ApiError> {
    let ack = Ack { success: true, message };
    let text = serde_json::to_string(&ack).map_err(|e| ApiError::Serialization(e.to_string()))?;
    writeln!(out, "{text}")?;
    Ok(())
}

/// Print every item as it arrives. Items already printed stay printed when a
/// later page fails.
pub(crate) async fn print_stream<T, S>(out: &mut dyn Write, items: S) -> Result<(), ApiError>
where
    T: Serialize,
    S: Stream<Item = Result<T, ApiError>>,
{
    pin_mut!(items);
    while let Some(item) = items.next().await {
        print_json(out, &item?)?;
        out.flush()?;
    }
    Ok(())
}
