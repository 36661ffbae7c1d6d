use std::io::Write;

use mochi_core::types::{Card, DueParams};
use mochi_core::{ApiError, Session};
use serde::Serialize;

use super::print_json;
use crate::args::{DueArgs, DueCommand};
use crate::input::required;

#[derive(Serialize)]
struct DueOutput {
    cards: Vec<Card>,
}

pub async fn run(args: DueArgs, session: &mut Session, out: &mut dyn Write) -> Result<(), ApiError> {
    let cards = match args.command {
        None => {
            let params = DueParams { date: args.list.date };
            session.client()?.due().list(&params).await?
        }
        Some(DueCommand::List(list)) => {
            let params = DueParams { date: list.date };
            session.client()?.due().list(&params).await?
        }
        Some(DueCommand::ListByDeck { deck_id, list }) => {
            let deck_id = required(deck_id, "deck-id")?;
            let params = DueParams { date: list.date };
            session.client()?.due().list_by_deck(&deck_id, &params).await?
        }
    };
    print_json(out, &DueOutput { cards })
}
