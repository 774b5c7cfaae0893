use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::info;

use crate::config::Config;
use crate::context::{AppContext, DatabaseLocation};
use crate::database::Database;
use crate::error::KeyMapperError;
use crate::json_compare;
use crate::schema::SCHEMA_VERSION;

#[derive(Parser)]
#[command(
    name = "keymapper-db",
    version,
    about = "Inspect, migrate and compare Key Mapper keymap stores"
)]
pub struct Cli {
    /// Store to open (default: keymaps.db in the app's data directory)
    #[arg(long = "db", global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the stored schema version and keymap count without migrating
    Status,

    /// Migrate the store to a schema version (default: latest)
    Migrate {
        #[arg(long = "to")]
        to: Option<u32>,
    },

    /// Print every keymap as JSON, migrating first if needed
    Dump,

    /// Compare two JSON files structurally
    Compare { left: PathBuf, right: PathBuf },
}

impl Cli {
    pub fn handle_command_line() -> Result<(), KeyMapperError> {
        let args = Cli::parse();
        args.run()
    }

    pub fn run(self) -> Result<(), KeyMapperError> {
        match self.command {
            Command::Status => Self::status(&resolve_db_path(self.db)?),
            Command::Migrate { to } => Self::migrate(&resolve_db_path(self.db)?, to.unwrap_or(SCHEMA_VERSION)),
            Command::Dump => Self::dump(resolve_db_path(self.db)?),
            Command::Compare { left, right } => Self::compare(&left, &right),
        }
    }

    fn status(path: &Path) -> Result<(), KeyMapperError> {
        let db = Database::open_without_migrating(path)?;
        match db.schema_version()? {
            None => println!("{}: not initialized (latest schema version is {})", path.display(), SCHEMA_VERSION),
            Some(version) => {
                let count = db.query_all("keymaps")?.len();
                println!("{}", path.display());
                println!("  schema version: {}", version);
                println!("  latest version: {}", SCHEMA_VERSION);
                println!("  keymaps:        {}", count);
            }
        }
        Ok(())
    }

    fn migrate(path: &Path, to: u32) -> Result<(), KeyMapperError> {
        let mut db = Database::open_without_migrating(path)?;
        db.migrate_to(to)?;
        info!("Migrated {} to schema version {}", path.display(), to);
        println!("{} is at schema version {}", path.display(), to);
        Ok(())
    }

    fn dump(path: PathBuf) -> Result<(), KeyMapperError> {
        let ctx = AppContext::new(DatabaseLocation::File(path));
        let keymaps = ctx.keymaps()?.all()?;
        let json = serde_json::to_string_pretty(&keymaps)
            .map_err(|e| KeyMapperError::Error(format!("Failed to serialize keymaps: {}", e)))?;
        println!("{}", json);
        ctx.release()
    }

    fn compare(left: &Path, right: &Path) -> Result<(), KeyMapperError> {
        let left_text = fs::read_to_string(left)?;
        let right_text = fs::read_to_string(right)?;
        let left_name = left.display().to_string();
        let right_name = right.display().to_string();

        json_compare::compare_text(&left_text, &left_name, &right_text, &right_name)
            .map_err(|mismatch| KeyMapperError::Error(mismatch.to_string()))?;

        println!("{} and {} are structurally equal", left_name, right_name);
        Ok(())
    }
}

fn resolve_db_path(db: Option<PathBuf>) -> Result<PathBuf, KeyMapperError> {
    match db {
        Some(path) => Ok(path),
        None => Ok(Config::get().default_database_path(&Config::project_dirs()?)),
    }
}
