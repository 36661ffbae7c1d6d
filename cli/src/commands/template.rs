use std::io::Write;

use mochi_core::types::{TemplateCreateInput, TemplateListParams};
use mochi_core::{ApiError, Session};

use super::{print_json, print_stream};
use crate::args::{TemplateCommand, TemplateCreateArgs};
use crate::input::{parse_options, parse_style, parse_template_fields, required};

pub async fn run(cmd: TemplateCommand, session: &mut Session, out: &mut dyn Write) -> Result<(), ApiError> {
    match cmd {
        TemplateCommand::List { bookmark, all } => {
            let client = session.client()?;
            if all {
                print_stream(out, client.templates().list_all()).await
            } else {
                let page = client
                    .templates()
                    .list(&TemplateListParams { bookmark })
                    .await?;
                print_json(out, &page)
            }
        }
        TemplateCommand::Get { id } => {
            let template = session.client()?.templates().get(&id).await?;
            print_json(out, &template)
        }
        TemplateCommand::Create(args) => {
            let input = create_input(args)?;
            let template = session.client()?.templates().create(&input).await?;
            print_json(out, &template)
        }
    }
}

fn create_input(args: TemplateCreateArgs) -> Result<TemplateCreateInput, ApiError> {
    let name = required(args.name, "name")?;
    let content = required(args.content, "content")?;
    let fields = parse_template_fields(&required(args.fields, "fields")?)?;
    Ok(TemplateCreateInput {
        name,
        content,
        fields,
        pos: args.pos,
        style: args.style.as_deref().map(parse_style).transpose()?,
        options: args.options.as_deref().map(parse_options).transpose()?,
    })
}
