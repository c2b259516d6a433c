use clap::{Parser, Subcommand};
use serde::Serialize;

use fourstar::{api, logging};

#[derive(Parser, Debug)]
#[command(
    name = "fourstar",
    about = "Fee-aware investment projections: compound growth, retirement, DCA vs lump sum, allocation, rebalancing"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP API and the embedded web UI
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Project compound growth with and without fee drag
    Growth(api::GrowthArgs),
    /// Run the two-phase retirement projection
    Retirement(api::RetirementArgs),
    /// Compare dollar-cost averaging against lump-sum investing
    Compare(api::CompareArgs),
    /// Build a rule-based asset allocation
    Allocate(api::AllocateArgs),
    /// Plan the trades that move a portfolio back to its targets
    Rebalance(api::RebalanceArgs),
    /// Solve the monthly contribution needed to fund retirement
    Solve(api::SolveArgs),
}

#[tokio::main]
async fn main() {
    logging::init_logging();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { port } => {
            if let Err(e) = api::run_http_server(port).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Growth(args) => emit(api::growth_response(&args)),
        Command::Retirement(args) => emit(api::retirement_response(&args)),
        Command::Compare(args) => emit(api::compare_response(&args)),
        Command::Allocate(args) => emit(api::allocation_response(&args)),
        Command::Rebalance(args) => emit(api::rebalance_response(&args)),
        Command::Solve(args) => emit(api::solve_response(&args)),
    }
}

fn emit<T: Serialize>(result: Result<T, String>) {
    match result {
        Ok(body) => match serde_json::to_string_pretty(&body) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to encode result: {e}");
                std::process::exit(1);
            }
        },
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    }
}
