//! zrotate - tiered ZFS snapshot rotation and pool scrubbing.

use clap::Parser;
use zrotate_cli::commands;
use zrotate_cli::{logging, Cli, Command, ConfigFile, Formatter, EXIT_FATAL, EXIT_PARTIAL, EXIT_SUCCESS};

fn main() {
    // clap exits with status 2 on usage errors
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

fn run(cli: Cli) -> zrotate_cli::Result<i32> {
    let file = ConfigFile::load(&cli.config)?;

    let command = cli.command.unwrap_or_else(Command::default_command);
    let settings = match &command {
        Command::Run(args) => args.apply(file.settings.clone()),
        Command::Check | Command::Status => file.settings.clone(),
    };

    let color_enabled = !cli.no_color;
    logging::init(cli.verbose, color_enabled, settings.log_file.as_deref())?;
    tracing::info!("zrotate {}", env!("CARGO_PKG_VERSION"));

    let topology = file.topology()?;
    let formatter = Formatter::new(cli.format.into(), color_enabled);

    match command {
        Command::Run(_) => {
            let report = commands::execute_run(settings, &topology, &formatter)?;
            if report.has_failures() {
                tracing::warn!(failures = report.failures.len(), "Run completed with failures");
                Ok(EXIT_PARTIAL)
            } else {
                Ok(EXIT_SUCCESS)
            }
        }
        Command::Check => {
            let problems = commands::execute_check(&topology, &formatter)?;
            Ok(if problems.is_empty() { EXIT_SUCCESS } else { EXIT_FATAL })
        }
        Command::Status => {
            commands::execute_status(settings, &topology, &formatter)?;
            Ok(EXIT_SUCCESS)
        }
    }
}
