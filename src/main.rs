use flexi_logger::Logger;
use log::{debug, error};

use keymapper_db::cli::Cli;
use keymapper_db::config::{Config, CONFIG};
use keymapper_db::KeyMapperError;

fn main() {
    if let Err(err) = run() {
        error!("{:?}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), KeyMapperError> {
    let project_dirs = Config::project_dirs()?;
    let config = CONFIG.get_or_init(|| Config::load_config(&project_dirs));

    // Logs go to stderr so `dump` output stays pipeable.
    let _logger = Logger::try_with_str(config.logging.log_spec())
        .and_then(|logger| logger.start())
        .map_err(|e| KeyMapperError::Error(format!("Failed to start logger: {}", e)))?;

    debug!("Command-line args: {:?}", std::env::args_os().collect::<Vec<_>>());

    Cli::handle_command_line()
}
