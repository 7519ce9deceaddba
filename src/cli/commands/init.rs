use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use tracing::debug;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file
///  - the SQLite database with its schema
pub fn handle(cli: &Cli) -> AppResult<()> {
    let db_path = Config::init_all(cli.db.clone())?;
    let db_path = db_path.to_string_lossy().to_string();

    info("Initializing prmonitor…");
    println!("📄 Config file : {}", Config::config_file().display());
    println!("🗄️  Database   : {}", &db_path);

    DbPool::new(&db_path)?;
    debug!("schema ready at {db_path}");

    success(format!("Database initialized at {}", &db_path));
    Ok(())
}
