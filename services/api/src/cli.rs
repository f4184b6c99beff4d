use crate::commands::{run_check, run_poll_once, CheckArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use reservation_watch::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "reservation-watch",
    about = "Watch the Yosemite entry-reservation page and email subscribers when dates are posted",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service and poll loop (default command)
    Serve(ServeArgs),
    /// Fetch the reservation page once and print the dates found for a month
    Check(CheckArgs),
    /// Run a single poll over the stored monitoring requests
    PollOnce,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Check(args) => run_check(args).await,
        Command::PollOnce => run_poll_once().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["reservation-watch"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_check_and_poll_once() {
        let cli = Cli::try_parse_from(["reservation-watch", "check", "--month", "june"])
            .expect("parses");
        match cli.command {
            Some(Command::Check(args)) => assert_eq!(args.month, "June"),
            other => panic!("expected check, got {other:?}"),
        }

        let cli = Cli::try_parse_from(["reservation-watch", "poll-once"]).expect("parses");
        assert!(matches!(cli.command, Some(Command::PollOnce)));

        let cli = Cli::try_parse_from(["reservation-watch", "serve", "--port", "8080"])
            .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => assert_eq!(args.port, Some(8080)),
            other => panic!("expected serve, got {other:?}"),
        }
    }
}
