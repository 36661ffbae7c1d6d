use std::io::Write;
use std::path::Path;

use mochi_core::types::{CardCreateInput, CardListParams, CardUpdateInput};
use mochi_core::{ApiError, Session};

use super::{print_ack, print_json, print_stream};
use crate::args::{CardCommand, CardCreateArgs, CardUpdateArgs};
use crate::input::{nullable, parse_card_fields, parse_tags, required};

pub async fn run(cmd: CardCommand, session: &mut Session, out: &mut dyn Write) -> Result<(), ApiError> {
    match cmd {
        CardCommand::List {
            deck_id,
            limit,
            bookmark,
            all,
        } => {
            let params = CardListParams {
                deck_id,
                limit,
                bookmark,
            };
            let client = session.client()?;
            if all {
                print_stream(out, client.cards().list_all(&params)).await
            } else {
                print_json(out, &client.cards().list(&params).await?)
            }
        }
        CardCommand::Get { id } => {
            let card = session.client()?.cards().get(&id).await?;
            print_json(out, &card)
        }
        CardCommand::Create(args) => {
            let input = create_input(args)?;
            let card = session.client()?.cards().create(&input).await?;
            print_json(out, &card)
        }
        CardCommand::Update(args) => {
            let id = args.id.clone();
            let input = update_input(args)?;
            let card = session.client()?.cards().update(&id, &input).await?;
            print_json(out, &card)
        }
        CardCommand::Delete { id } => {
            session.client()?.cards().delete(&id).await?;
            print_ack(out, "Card deleted")
        }
        CardCommand::AddAttachment { id, file, filename } => {
            let file = required(file, "file")?;
            let filename = filename.unwrap_or_else(|| default_filename(&file));
            session
                .client()?
                .cards()
                .add_attachment(&id, &filename, &file)
                .await?;
            print_ack(out, "Attachment added")
        }
        CardCommand::DeleteAttachment { id, filename } => {
            let filename = required(filename, "filename")?;
            session
                .client()?
                .cards()
                .delete_attachment(&id, &filename)
                .await?;
            print_ack(out, "Attachment deleted")
        }
    }
}

fn create_input(args: CardCreateArgs) -> Result<CardCreateInput, ApiError> {
    let content = required(args.content, "content")?;
    let deck_id = required(args.deck_id, "deck-id")?;
    Ok(CardCreateInput {
        template_id: args.template_id,
        archived: args.archived.then_some(true),
        review_reverse: args.review_reverse.then_some(true),
        pos: args.pos,
        manual_tags: args.manual_tags.as_deref().map(parse_tags),
        fields: args.fields.as_deref().map(parse_card_fields).transpose()?,
        ..CardCreateInput::new(content, deck_id)
    })
}

fn update_input(args: CardUpdateArgs) -> Result<CardUpdateInput, ApiError> {
    Ok(CardUpdateInput {
        content: args.content,
        deck_id: args.deck_id,
        template_id: args.template_id.map(nullable),
        archived: args.archived.then_some(true),
        trashed: args.trashed.map(nullable),
        review_reverse: args.review_reverse.then_some(true),
        pos: args.pos,
        manual_tags: args.manual_tags.as_deref().map(parse_tags),
        fields: args.fields.as_deref().map(parse_card_fields).transpose()?,
    })
}

fn default_filename(file: &str) -> String {
    Path::new(file)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("attachment")
        .to_string()
}
