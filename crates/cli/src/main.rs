mod api;
mod commands;
mod config;
mod ui;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use shared::api::{ListQuery, Order};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "linkrank")]
#[command(about = "Post, vote on and rank links")]
#[command(version)]
#[command(after_help = "Examples:
  linkrank post sky 'This is sky' https://sky.com   Submit an article
  linkrank vote 1 jack                              Vote on article 1
  linkrank list --order time --page 2               Second page by post time
  linkrank group add 1 rust databases               Add article 1 to two groups
  linkrank group list rust                          Top of the rust group")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new article (counts as the poster's vote)
    #[command(after_help = "Example: linkrank post sky 'This is sky' https://sky.com")]
    Post {
        /// Who is posting
        poster: String,
        /// Article title
        title: String,
        /// Absolute URL of the article
        link: String,
    },

    /// Vote on an article
    #[command(after_help = "Example: linkrank vote 1 jack")]
    Vote {
        /// Numeric article id
        id: u64,
        /// Who is voting
        user: String,
    },

    /// Show one page of the global ranking
    #[command(after_help = "Examples:
  linkrank list
  linkrank list --order time --page 2")]
    List {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Manage article groups
    #[command(after_help = "Examples:
  linkrank group add 1 rust databases
  linkrank group remove 1 databases
  linkrank group list rust")]
    Group {
        #[command(subcommand)]
        action: GroupCommands,
    },

    /// Generate shell completions
    #[command(after_help = "Examples:
  linkrank completions bash > ~/.bash_completion.d/linkrank
  linkrank completions zsh > ~/.zfunc/_linkrank
  linkrank completions fish > ~/.config/fish/completions/linkrank.fish")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum GroupCommands {
    /// Add an article to groups
    Add {
        /// Numeric article id
        id: u64,
        /// Group names
        #[arg(required = true)]
        groups: Vec<String>,
    },
    /// Remove an article from groups
    Remove {
        /// Numeric article id
        id: u64,
        /// Group names
        #[arg(required = true)]
        groups: Vec<String>,
    },
    /// Show one page of a group's ranking
    List {
        /// Group name
        name: String,
        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Score,
    Time,
}

impl From<OrderArg> for Order {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Score => Order::Score,
            OrderArg::Time => Order::Time,
        }
    }
}

#[derive(clap::Args)]
struct PageArgs {
    /// Ranking to read
    #[arg(long, value_enum, default_value = "score")]
    order: OrderArg,
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,
}

impl From<PageArgs> for ListQuery {
    fn from(args: PageArgs) -> Self {
        ListQuery {
            order: args.order.into(),
            page: args.page,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        ui::print_error(&err);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = envy::prefixed("LINKRANK_").from_env::<Config>()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Post {
            poster,
            title,
            link,
        } => commands::post::run(&config, &poster, &title, &link).await,
        Commands::Vote { id, user } => commands::vote::run(&config, id, &user).await,
        Commands::List { page } => commands::list::run(&config, page.into()).await,
        Commands::Group { action } => match action {
            GroupCommands::Add { id, groups } => commands::group::add(&config, id, groups).await,
            GroupCommands::Remove { id, groups } => {
                commands::group::remove(&config, id, groups).await
            }
            GroupCommands::List { name, page } => {
                commands::group::list(&config, &name, page.into()).await
            }
        },
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "linkrank", &mut std::io::stdout());
            Ok(())
        }
    }
}
