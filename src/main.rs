use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use shoplist::cli::{handle_item_command, handle_list_command, ItemCommands, ListCommands};
use shoplist::config::{paths::DATA_DIR_ENV, Settings, ShoplistPaths};
use shoplist::services::ListStore;

#[derive(Parser)]
#[command(
    name = "shoplist",
    version,
    about = "Keep shopping lists as plain text, CSV or spreadsheet files",
    long_about = "shoplist keeps a directory of shopping lists, one file per list. \
                  Lists can be created, edited, imported from .txt, .csv and .xlsx \
                  files, and exported to any of those formats."
)]
struct Cli {
    /// Storage directory (overrides the platform default)
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    List(ListCommands),

    #[command(flatten)]
    Item(ItemCommands),

    /// Show current configuration and paths
    Config,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("SHOPLIST_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let paths = match cli.data_dir {
        Some(dir) => ShoplistPaths::with_base_dir(dir),
        None => ShoplistPaths::new()?,
    };
    let mut settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::List(cmd)) => {
            let store = ListStore::open(&paths, &settings).await?;
            handle_list_command(&store, &paths, &mut settings, cmd).await?;
        }
        Some(Commands::Item(cmd)) => {
            let store = ListStore::open(&paths, &settings).await?;
            handle_item_command(&store, &settings.currency_symbol, cmd).await?;
        }
        Some(Commands::Config) => {
            println!("shoplist Configuration");
            println!("======================");
            println!("Storage directory:  {}", paths.base_dir().display());
            println!("Lists directory:    {}", paths.lists_dir().display());
            println!("Export directory:   {}", paths.export_dir().display());
            println!("Settings file:      {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Sort order:         {}", settings.sort_order);
            println!("  Auto-save interval: {} ms", settings.autosave_interval().as_millis());
            println!("  Currency:           {}", settings.currency_symbol);
        }
        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
