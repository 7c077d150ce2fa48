use clap::Parser;
use campus_cli::commands::server::ServerOverrides;
use campus_cli::{Cli, CliError, Command, ExitOnError, commands};
use campus_server::telemetry::{get_subscriber, init_subscriber};

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    // A missing .env is fine, the variables may come from the environment.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(e) = run_cli(cli) {
        e.exit_with_tips();
    }

    Ok(())
}

fn run_cli(cli: Cli) -> Result<(), CliError> {
    init_subscriber(get_subscriber(&cli.loglevel))?;

    match cli.command {
        Command::Init => commands::configuration::create_config_template().or_exit(),
        Command::Seed { no_samples } => commands::seed::handle(!no_samples)?,
        Command::Serve { interface, port } => {
            commands::server::start_server(ServerOverrides::new(interface, port))?;
        }
    }

    Ok(())
}
