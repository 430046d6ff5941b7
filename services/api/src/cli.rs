use crate::demo::{run_demo, run_scope_generate, DemoArgs, ScopeGenerateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use restore_scope::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Restore Scope",
    about = "Generate preliminary scopes of works for water damage restoration claims",
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
    /// Work with scope-of-works documents offline
    Scope {
        #[command(subcommand)]
        command: ScopeCommand,
    },
    /// Generate and regenerate a sample burst-pipe scope end to end
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ScopeCommand {
    /// Generate a scope of works from a JSON input file
    Generate(ScopeGenerateArgs),
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
        Command::Scope {
            command: ScopeCommand::Generate(args),
        } => run_scope_generate(args),
        Command::Demo(args) => run_demo(args),
    }
}
