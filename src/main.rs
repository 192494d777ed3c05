use std::sync::Arc;

use clap::{
    ArgAction, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use tokio::sync::Mutex;
use vinylcli::{
    cli, config, error,
    types::{self, PkceToken},
    utils,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with the catalog service
    Auth(AuthOptions),

    /// Browse the vinyl collection
    Collection(CollectionOptions),

    /// Inspect or change the stored session
    Session(SessionOptions),

    /// Quota and configuration information
    Info(InfoOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Collection path to land on after signing in (e.g. "/collection?style=Rock")
    #[clap(long)]
    pub return_to: Option<String>,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Browse the vinyl collection")]
pub struct CollectionOptions {
    /// Filter by genre; can be repeated
    #[clap(long, action = ArgAction::Append, num_args = 1)]
    pub genre: Vec<String>,

    /// Filter by style; can be repeated
    #[clap(long, action = ArgAction::Append, num_args = 1)]
    pub style: Vec<String>,

    /// Filter by label; can be repeated
    #[clap(long, action = ArgAction::Append, num_args = 1)]
    pub label: Vec<String>,

    /// Filter by vinyl type (LP, EP, ...); can be repeated
    #[clap(long = "type", action = ArgAction::Append, num_args = 1)]
    pub release_type: Vec<String>,

    /// Filter by vinyl size (7", 10", 12"); can be repeated
    #[clap(long, action = ArgAction::Append, num_args = 1)]
    pub size: Vec<String>,

    /// Filter by country; can be repeated
    #[clap(long, action = ArgAction::Append, num_args = 1)]
    pub country: Vec<String>,

    /// Filter by release year range (<min>-<max>)
    #[clap(long, value_parser = utils::parse_year_range)]
    pub year: Option<(u32, u32)>,

    /// Search within artist names and titles
    #[clap(long)]
    pub search: Option<String>,

    /// Sort order key
    #[clap(long, value_parser = utils::parse_sort_key)]
    pub sort: Option<types::SortKey>,

    /// Sort direction (asc, desc)
    #[clap(long, value_parser = utils::parse_sort_order)]
    pub order: Option<types::SortOrder>,

    /// Shuffle seed for --sort random; reuse to reproduce an order
    #[clap(long)]
    pub seed: Option<u32>,

    /// Page to display
    #[clap(long)]
    pub page: Option<u32>,

    /// Releases per page
    #[clap(long)]
    pub per_page: Option<u32>,

    /// Print the facet menus above the table
    #[clap(long)]
    pub facets: bool,

    /// Restore a complete view from a shared query string
    #[clap(long)]
    pub query: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct SessionOptions {
    #[command(subcommand)]
    pub command: SessionSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SessionSubcommand {
    /// Show the current session state
    Status,

    /// Resume a signed-out session from stored tokens
    Continue,

    /// End the live session but keep tokens for a quick resume
    SignOut,

    /// Remove all stored credentials and preferences
    Disconnect,

    /// Set the preferred avatar source for the account
    Avatar(AvatarOptions),
}

#[derive(Parser, Debug, Clone)]
pub struct AvatarOptions {
    /// Where profile pictures should come from
    pub source: String,
}

#[derive(Parser, Debug, Clone)]
pub struct InfoOptions {
    #[clap(long)]
    quota: bool,
    #[clap(long)]
    config: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn collection_params(opt: CollectionOptions) -> cli::CollectionParams {
    // an explicit flag wins over the same field in --query
    let mut params = match opt.query {
        Some(query) => cli::CollectionParams::from_query_string(&query),
        None => cli::CollectionParams::default(),
    };

    params.selection.genres.extend(opt.genre);
    params.selection.styles.extend(opt.style);
    params.selection.labels.extend(opt.label);
    params.selection.types.extend(opt.release_type);
    params.selection.sizes.extend(opt.size);
    params.selection.countries.extend(opt.country);
    if let Some(year) = opt.year {
        params.selection.year_range = Some(year);
    }
    if let Some(search) = opt.search {
        params.search = search;
    }
    if let Some(sort) = opt.sort {
        params.sort = sort;
    }
    if let Some(order) = opt.order {
        params.sort_order = order;
    }
    if let Some(page) = opt.page {
        params.page = page;
    }
    params.per_page = opt.per_page.or(params.per_page);
    params.seed = opt.seed.or(params.seed);
    params.show_facets = opt.facets;

    params
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth(opt) => {
            let oauth_result: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
            cli::auth(Arc::clone(&oauth_result), opt.return_to).await;
        }

        Command::Collection(opt) => cli::browse(collection_params(opt)).await,

        Command::Session(opt) => match opt.command {
            SessionSubcommand::Status => cli::status().await,
            SessionSubcommand::Continue => cli::continue_session().await,
            SessionSubcommand::SignOut => cli::sign_out().await,
            SessionSubcommand::Disconnect => cli::disconnect().await,
            SessionSubcommand::Avatar(opt) => cli::set_avatar(opt.source).await,
        },

        Command::Info(opt) => cli::info(opt.quota, opt.config).await,

        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
