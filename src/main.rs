use clap::{Parser, Subcommand};
use tracing::info;

use nomad_chain::config::ChainSpec;
use nomad_chain::{Result, demo, diagnostics, report};

#[derive(Parser)]
#[command(name = "nomad-chain")]
#[command(about = "Evaluate chains of single-input, single-output function nodes", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the reference four-node chain (default).
    Demo,

    /// Build a chain from a JSON description and print the requested nodes.
    Run {
        #[arg(long)]
        chain: String,

        /// Seed every chain head with this value instead of the file's seeds.
        #[arg(long, allow_hyphen_values = true)]
        seed: Option<i64>,

        /// Emit JSON instead of "<Label> <value>" lines.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    diagnostics::init(cli.verbose);

    match cli.cmd.unwrap_or(Commands::Demo) {
        Commands::Demo => {
            let evals = demo::run()?;
            print!("{}", report::render_text(&evals));
        }
        Commands::Run { chain, seed, json } => {
            // 1) Parse + validate the chain file.
            let spec = ChainSpec::from_path(&chain)?;
            let mut built = spec.validate_and_build()?;
            info!(nodes = built.chain.len(), "built chain from {}", chain);

            // 2) Optional seed override.
            if let Some(value) = seed {
                built.seed_heads(value)?;
            }

            // 3) Evaluate + render.
            let evals = report::evaluate(&mut built.chain, &built.eval_order)?;
            if json {
                println!("{}", report::render_json(&evals)?);
            } else {
                print!("{}", report::render_text(&evals));
            }
        }
    }

    Ok(())
}
