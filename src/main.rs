use std::path::PathBuf;

use clap::{
    Args, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use lmsadm::{cli, config, error, schema::EntityKind, types::SortOrder, utils};

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
    /// Use the local store instead of the API
    #[clap(long, global = true)]
    offline: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List entities of a type
    List(ListOptions),

    /// Show every field of one entity
    Show(ShowOptions),

    /// Create an entity from field assignments
    Create(CreateOptions),

    /// Change fields of an existing entity
    Update(UpdateOptions),

    /// Delete one entity
    Delete(ShowOptions),

    /// Delete several entities at once
    BulkDelete(BulkDeleteOptions),

    /// Run the mock backend over the local store
    Serve(ServeOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Free-text search over the type's search fields
    #[clap(long)]
    pub search: Option<String>,

    /// Filter as key=value; "all" removes it; can be repeated
    #[clap(long = "filter", value_parser = utils::parse_assignment)]
    pub filters: Vec<(String, String)>,

    /// Sort as field, field:asc or field:desc
    #[clap(long)]
    pub sort: Option<SortOrder>,

    /// Page to show, starting at 1
    #[clap(long)]
    pub page: Option<usize>,
}

impl From<QueryArgs> for cli::QueryOptions {
    fn from(args: QueryArgs) -> Self {
        cli::QueryOptions {
            search: args.search,
            filters: args.filters,
            sort: args.sort,
            page: args.page,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ListOptions {
    kind: EntityKind,

    #[clap(flatten)]
    query: QueryArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct ShowOptions {
    kind: EntityKind,
    id: String,
}

#[derive(Args, Debug, Clone)]
pub struct FormArgs {
    /// Field assignment as name=value; can be repeated
    #[clap(long = "set", value_parser = utils::parse_assignment)]
    pub sets: Vec<(String, String)>,

    /// Upload a file into a field as field=path; can be repeated
    #[clap(long = "upload", value_parser = parse_upload)]
    pub uploads: Vec<(String, PathBuf)>,
}

#[derive(Parser, Debug, Clone)]
pub struct CreateOptions {
    kind: EntityKind,

    #[clap(flatten)]
    form: FormArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct UpdateOptions {
    kind: EntityKind,
    id: String,

    #[clap(flatten)]
    form: FormArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct BulkDeleteOptions {
    kind: EntityKind,

    /// Ids to delete
    ids: Vec<String>,

    /// Also select every entity of the queried page
    #[clap(long)]
    visible: bool,

    #[clap(flatten)]
    query: QueryArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Bind address, defaults to LMSADM_SERVER_ADDRESS
    #[clap(long)]
    addr: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn parse_upload(s: &str) -> Result<(String, PathBuf), String> {
    let (field, path) = utils::parse_assignment(s)?;
    Ok((field, PathBuf::from(path)))
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();
    let offline = cli.offline;

    match cli.command {
        Command::List(opt) => cli::list(opt.kind, cli::connect(offline), opt.query.into()).await,
        Command::Show(opt) => cli::show(opt.kind, cli::connect(offline), opt.id).await,
        Command::Create(opt) => {
            cli::create(
                opt.kind,
                cli::connect(offline),
                opt.form.sets,
                opt.form.uploads,
            )
            .await
        }
        Command::Update(opt) => {
            cli::update(
                opt.kind,
                cli::connect(offline),
                opt.id,
                opt.form.sets,
                opt.form.uploads,
            )
            .await
        }
        Command::Delete(opt) => cli::delete(opt.kind, cli::connect(offline), opt.id).await,
        Command::BulkDelete(opt) => {
            cli::bulk_delete(
                opt.kind,
                cli::connect(offline),
                opt.ids,
                opt.visible,
                opt.query.into(),
            )
            .await
        }
        Command::Serve(opt) => cli::serve(opt.addr).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
