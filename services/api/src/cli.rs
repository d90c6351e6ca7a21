use crate::server;
use clap::{Args, Parser, Subcommand};
use edu_platform::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Educational Platform API",
    about = "Serve the course catalog and platform API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the preferred port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// How many successive ports to try when the preferred one is taken
    #[arg(long)]
    pub(crate) max_port_retries: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::try_parse_from([
            "edu-platform-api",
            "serve",
            "--port",
            "5000",
            "--max-port-retries",
            "3",
        ])
        .expect("flags parse");

        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(5000));
                assert_eq!(args.max_port_retries, Some(3));
                assert!(args.host.is_none());
            }
            other => panic!("expected serve command, got {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["edu-platform-api"]).expect("parses");
        assert!(cli.command.is_none());
    }
}
