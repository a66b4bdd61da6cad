use clap::Parser;
use orchestrator::cli::{
    handle_completions, handle_config_init, models, profiles, route, Cli, Commands,
    ConfigCommands,
};

fn print_output(
    result: Result<String, Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    result.map(|output| println!("{}", output))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => orchestrator::cli::serve::run_serve(args).await,
        Commands::Route(args) => print_output(route::handle_route(&args)),
        Commands::Profiles(args) => print_output(profiles::handle_profiles(&args)),
        Commands::Models(args) => print_output(models::handle_models(&args)),
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
