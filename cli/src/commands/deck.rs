use std::io::Write;

use mochi_core::types::{
    DeckCardsView, DeckCreateInput, DeckListParams, DeckSortBy, DeckUpdateInput,
};
use mochi_core::{ApiError, Session};

use super::{print_ack, print_json, print_stream};
use crate::args::{DeckArgs, DeckCommand};
use crate::input::{nullable, required};

pub async fn run(cmd: DeckCommand, session: &mut Session, out: &mut dyn Write) -> Result<(), ApiError> {
    match cmd {
        DeckCommand::List { bookmark, all } => {
            let client = session.client()?;
            if all {
                print_stream(out, client.decks().list_all()).await
            } else {
                let page = client.decks().list(&DeckListParams { bookmark }).await?;
                print_json(out, &page)
            }
        }
        DeckCommand::Get { id } => {
            let deck = session.client()?.decks().get(&id).await?;
            print_json(out, &deck)
        }
        DeckCommand::Create(args) => {
            let input = create_input(args)?;
            let deck = session.client()?.decks().create(&input).await?;
            print_json(out, &deck)
        }
        DeckCommand::Update { id, deck } => {
            let input = update_input(deck)?;
            let deck = session.client()?.decks().update(&id, &input).await?;
            print_json(out, &deck)
        }
        DeckCommand::Delete { id } => {
            session.client()?.decks().delete(&id).await?;
            print_ack(out, "Deck deleted")
        }
    }
}

struct Choices {
    sort_by: Option<DeckSortBy>,
    cards_view: Option<DeckCardsView>,
}

fn choices(args: &DeckArgs) -> Result<Choices, ApiError> {
    Ok(Choices {
        sort_by: args.sort_by.as_deref().map(str::parse).transpose()?,
        cards_view: args.cards_view.as_deref().map(str::parse).transpose()?,
    })
}

fn create_input(args: DeckArgs) -> Result<DeckCreateInput, ApiError> {
    let name = required(args.name.clone(), "name")?;
    let Choices { sort_by, cards_view } = choices(&args)?;
    Ok(DeckCreateInput {
        parent_id: args.parent_id,
        sort: args.sort,
        trashed: args.trashed,
        archived: args.archived.then_some(true),
        sort_by,
        cards_view,
        show_sides: args.show_sides.then_some(true),
        sort_by_direction: args.sort_by_direction.then_some(true),
        review_reverse: args.review_reverse.then_some(true),
        ..DeckCreateInput::new(name)
    })
}

fn update_input(args: DeckArgs) -> Result<DeckUpdateInput, ApiError> {
    let Choices { sort_by, cards_view } = choices(&args)?;
    Ok(DeckUpdateInput {
        name: args.name,
        parent_id: args.parent_id.map(nullable),
        sort: args.sort,
        trashed: args.trashed.map(nullable),
        archived: args.archived.then_some(true),
        sort_by,
        cards_view,
        show_sides: args.show_sides.then_some(true),
        sort_by_direction: args.sort_by_direction.then_some(true),
        review_reverse: args.review_reverse.then_some(true),
    })
}
