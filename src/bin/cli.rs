use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use six_cities::config::{self, DatabaseConfig};
use six_cities::generate::{OfferGenerator, write_tsv};
use six_cities::import::{ImportStats, Importer, OfferSummary};
use six_cities::store::{MemoryStore, PgStore};

#[derive(Parser, Debug)]
#[command(
    name = "cli",
    version,
    about = "Import and generate Six Cities offer data"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import offers from a TSV file into the database.
    Import {
        /// Path to a tab-separated offer file with a header row.
        path: PathBuf,

        /// Parse and resolve rows in memory without touching the database.
        #[arg(long)]
        dry_run: bool,

        /// Connection string; defaults to DATABASE_URL or the DB_* variables.
        #[arg(long)]
        database_url: Option<String>,
    },
    /// Write randomly generated offers to a TSV file.
    Generate {
        /// Number of offers to generate.
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        count: u64,

        /// Destination file.
        path: PathBuf,

        /// Base URL used for generated avatar links.
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();
    config::load_dotenv();

    match Cli::parse().command {
        Command::Import {
            path,
            dry_run: true,
            ..
        } => dry_run_import(&path).await,
        Command::Import {
            path, database_url, ..
        } => {
            let database_url = match database_url {
                Some(url) => url,
                None => DatabaseConfig::from_env()?.connection_url(),
            };
            import(&path, &database_url).await
        }
        Command::Generate { count, path, url } => generate(count, &path, &url),
    }
}

async fn import(path: &Path, database_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut importer = Importer::new(PgStore::new(database_url)?);

    match importer.import_file(path).await {
        Ok(stats) => {
            print_stats(&stats)?;
            Ok(())
        }
        Err(err) => {
            writeln!(io::stderr(), "error: import failed: {err}")?;
            std::process::exit(1);
        }
    }
}

async fn dry_run_import(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut importer = Importer::new(MemoryStore::new());

    let stats = match importer.import_file(path).await {
        Ok(stats) => stats,
        Err(err) => {
            writeln!(io::stderr(), "error: import failed: {err}")?;
            std::process::exit(1);
        }
    };

    print_stats(&stats)?;

    let store = importer.into_store();
    let summary = OfferSummary::from_offers(&store.offers());
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "dry run, nothing was written")?;
    writeln!(stdout, "  premium offers:   {}", summary.premium)?;
    writeln!(stdout, "  average price:    {:.2}", summary.average_price)?;
    writeln!(stdout, "  average rating:   {:.2}", summary.average_rating)?;
    for (city, count) in &summary.per_city {
        writeln!(stdout, "  {city:<18}{count}")?;
    }

    Ok(())
}

fn print_stats(stats: &ImportStats) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "imported {} of {} offers", stats.imported, stats.total())?;
    writeln!(stdout, "  skipped rows:     {}", stats.skipped)?;
    writeln!(stdout, "  new cities:       {}", stats.cities_created)?;
    writeln!(stdout, "  new users:        {}", stats.users_created)
}

fn generate(count: u64, path: &Path, url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let count = usize::try_from(count)?;
    let offers = OfferGenerator::new(rand::thread_rng(), url).generate(count);

    if let Err(err) = write_tsv(path, &offers) {
        writeln!(io::stderr(), "error: failed to write {}: {err}", path.display())?;
        std::process::exit(1);
    }

    writeln!(
        io::stdout(),
        "generated {} offers into {}",
        offers.len(),
        path.display()
    )?;
    Ok(())
}
