use crate::config::Config;
use crate::core::config::ConfigLogic;
use crate::errors::AppResult;

use crate::cli::parser::Commands;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
    } = cmd
    {
        if *print_config {
            let path = Config::config_file();
            println!("📄 Current configuration ({}):\n", path.display());
            ConfigLogic::print(&path)?;
        }

        if *check {
            ConfigLogic::check(cfg)?;
        }
    }

    Ok(())
}
