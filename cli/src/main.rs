mod commands;
mod terminal;

use commands::{CommandLine, Commands, serve, tree};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose);

    match commands.command {
        Commands::Serve { bind, build } => {
            print::header("starting tree service");
            serve::serve(bind, &build).await
        }
        Commands::Tree {
            hosts,
            filters,
            json,
            build,
        } => tree::tree(hosts, filters, json, &build).await,
    }
}
