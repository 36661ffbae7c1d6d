use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "mochi",
    version,
    about = "Command-line client for the Mochi flashcard API",
    after_help = "Set MOCHI_API_KEY or pass --api-key. Output is JSON on stdout; errors are JSON on stderr.",
    disable_version_flag = true
)]
pub struct Cli {
    /// API key (falls back to the MOCHI_API_KEY environment variable)
    #[arg(long, global = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Log requests and retries to stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, hide = true, env = "MOCHI_BASE_URL")]
    pub base_url: Option<String>,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage cards
    #[command(subcommand)]
    Card(CardCommand),
    /// Manage decks
    #[command(subcommand)]
    Deck(DeckCommand),
    /// Manage templates
    #[command(subcommand)]
    Template(TemplateCommand),
    /// List cards due for review
    Due(DueArgs),
}

// --- card ---

#[derive(Debug, Subcommand)]
pub enum CardCommand {
    /// List cards
    List {
        /// Only cards in this deck
        #[arg(long)]
        deck_id: Option<String>,
        /// Cards per page
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
        limit: Option<u32>,
        /// Continue from this page bookmark
        #[arg(long)]
        bookmark: Option<String>,
        /// Stream every card, one JSON document each
        #[arg(long)]
        all: bool,
    },
    /// Get a card by id
    Get { id: String },
    /// Create a card
    Create(CardCreateArgs),
    /// Update a card
    Update(CardUpdateArgs),
    /// Delete a card permanently
    Delete { id: String },
    /// Upload a file as a card attachment
    AddAttachment {
        id: String,
        /// File to upload
        #[arg(long)]
        file: Option<String>,
        /// Attachment name (defaults to the file's name)
        #[arg(long)]
        filename: Option<String>,
    },
    /// Delete a card attachment
    DeleteAttachment {
        id: String,
        #[arg(long)]
        filename: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CardCreateArgs {
    /// Markdown content
    #[arg(long)]
    pub content: Option<String>,
    #[arg(long)]
    pub deck_id: Option<String>,
    #[arg(long)]
    pub template_id: Option<String>,
    #[arg(long)]
    pub archived: bool,
    #[arg(long)]
    pub review_reverse: bool,
    /// Sort position
    #[arg(long)]
    pub pos: Option<String>,
    /// Comma-separated tags
    #[arg(long)]
    pub manual_tags: Option<String>,
    /// Field values as JSON, e.g. '{"front": "Hola"}'
    #[arg(long)]
    pub fields: Option<String>,
}

#[derive(Debug, Args)]
pub struct CardUpdateArgs {
    pub id: String,
    #[arg(long)]
    pub content: Option<String>,
    #[arg(long)]
    pub deck_id: Option<String>,
    /// New template id, or "null" to remove it
    #[arg(long)]
    pub template_id: Option<String>,
    #[arg(long)]
    pub archived: bool,
    /// Trash the card at this ISO 8601 timestamp
    #[arg(long)]
    pub trashed: Option<String>,
    #[arg(long)]
    pub review_reverse: bool,
    #[arg(long)]
    pub pos: Option<String>,
    #[arg(long)]
    pub manual_tags: Option<String>,
    #[arg(long)]
    pub fields: Option<String>,
}

// --- deck ---

#[derive(Debug, Subcommand)]
pub enum DeckCommand {
    /// List decks
    List {
        #[arg(long)]
        bookmark: Option<String>,
        /// Stream every deck
        #[arg(long)]
        all: bool,
    },
    /// Get a deck by id
    Get { id: String },
    /// Create a deck
    Create(DeckArgs),
    /// Update a deck
    Update {
        id: String,
        #[command(flatten)]
        deck: DeckArgs,
    },
    /// Delete a deck permanently
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct DeckArgs {
    #[arg(long)]
    pub name: Option<String>,
    /// Parent deck for nesting
    #[arg(long)]
    pub parent_id: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub sort: Option<i64>,
    #[arg(long)]
    pub archived: bool,
    #[arg(long)]
    pub trashed: Option<String>,
    /// none, lexigraphically, lexicographically, created-at, updated-at,
    /// retention-rate-asc or interval-length
    #[arg(long)]
    pub sort_by: Option<String>,
    /// list, grid, note or column
    #[arg(long)]
    pub cards_view: Option<String>,
    #[arg(long)]
    pub show_sides: bool,
    /// Reverse the sort order
    #[arg(long)]
    pub sort_by_direction: bool,
    #[arg(long)]
    pub review_reverse: bool,
}

// --- template ---

#[derive(Debug, Subcommand)]
pub enum TemplateCommand {
    /// List templates
    List {
        #[arg(long)]
        bookmark: Option<String>,
        /// Stream every template
        #[arg(long)]
        all: bool,
    },
    /// Get a template by id
    Get { id: String },
    /// Create a template
    Create(TemplateCreateArgs),
}

#[derive(Debug, Args)]
pub struct TemplateCreateArgs {
    #[arg(long)]
    pub name: Option<String>,
    /// Template body with << Field >> placeholders
    #[arg(long)]
    pub content: Option<String>,
    #[arg(long)]
    pub pos: Option<String>,
    /// Field definitions as JSON, e.g. '{"front":{"name":"Front","type":"text"}}'
    #[arg(long)]
    pub fields: Option<String>,
    /// Style as JSON, e.g. '{"text-alignment":"center"}'
    #[arg(long)]
    pub style: Option<String>,
    /// Options as JSON, e.g. '{"show-sides-separately?":true}'
    #[arg(long)]
    pub options: Option<String>,
}

// --- due ---

#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct DueArgs {
    #[command(subcommand)]
    pub command: Option<DueCommand>,

    #[command(flatten)]
    pub list: DueListArgs,
}

#[derive(Debug, Subcommand)]
pub enum DueCommand {
    /// Cards due across all decks (default)
    List(DueListArgs),
    /// Cards due in one deck
    ListByDeck {
        #[arg(long)]
        deck_id: Option<String>,
        #[command(flatten)]
        list: DueListArgs,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct DueListArgs {
    /// Due date as an ISO 8601 timestamp (defaults to today)
    #[arg(long)]
    pub date: Option<String>,
}
