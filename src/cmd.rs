//! Command line interface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use gatemap::expr::Equation;
use gatemap::io::{read_equation_file, write_netlist_file, write_schematic_file, write_schematic_json};
use gatemap::layout::{layout, StandardPorts};
use gatemap::sim::check_equivalence;
use gatemap::{stats::stats, synthesize, GateSet, GenerateConfig, Netlist, Result};
use tracing::info;

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show more messages; repeat for more detail
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Command line arguments
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a schematic from logic equations
    ///
    /// Each line of the file is an equation such as `Y = A AND (B OR C)`.
    /// The equations are mapped to the allowed gates, then placed and routed.
    /// The schematic is written as JSON, to standard output if no file is given.
    #[clap(alias = "gen")]
    Generate(GenerateArgs),

    /// Show statistics about the synthesized netlist
    ///
    /// Will print statistics on the number of inputs, outputs and gates of each kind.
    #[clap()]
    Show(ShowArgs),

    /// Check that the synthesized netlist computes the equations
    ///
    /// All input assignments are simulated for up to 16 inputs, random ones above.
    /// The command will fail if an output differs, and will show the failing assignment.
    #[clap()]
    Check(CheckArgs),
}

/// Equation file and synthesis options, common to all commands
#[derive(Args)]
pub struct SynthArgs {
    /// Equation file, one equation per line
    file: PathBuf,

    /// Allowed gates, as a comma-separated list such as AND,OR,NOT
    #[arg(short = 'g', long)]
    gates: Option<GateSet>,

    /// JSON configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Reject unbalanced parentheses and trailing tokens instead of ignoring them
    #[arg(long)]
    strict: bool,
}

impl SynthArgs {
    fn config(&self) -> Result<GenerateConfig> {
        let mut cfg = match &self.config {
            Some(path) => GenerateConfig::from_json_file(path)?,
            None => GenerateConfig::default(),
        };
        if let Some(gates) = self.gates {
            cfg.gates = gates;
        }
        cfg.strict |= self.strict;
        Ok(cfg)
    }

    fn synthesize(&self) -> Result<(GenerateConfig, Vec<Equation>, Netlist)> {
        let cfg = self.config()?;
        let text = read_equation_file(&self.file)?;
        let (equations, net) = synthesize(&text, &cfg)?;
        info!(
            file = %self.file.display(),
            gates = %cfg.gates,
            outputs = net.nb_outputs(),
            "synthesized"
        );
        Ok((cfg, equations, net))
    }
}

/// Command arguments for schematic generation
#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    synth: SynthArgs,

    /// Output file for the schematic
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Also write the netlist in .bench format
    #[arg(long)]
    bench: Option<PathBuf>,
}

impl GenerateArgs {
    pub fn run(&self) -> Result<()> {
        let (cfg, _, net) = self.synth.synthesize()?;
        let schematic = layout(&net, &cfg.layout, &cfg.route, &StandardPorts);
        match &self.output {
            Some(path) => {
                write_schematic_file(path, &schematic)?;
                info!(file = %path.display(), "wrote schematic");
            }
            None => write_schematic_json(&mut std::io::stdout().lock(), &schematic)?,
        }
        if let Some(path) = &self.bench {
            write_netlist_file(path, &net)?;
            info!(file = %path.display(), "wrote netlist");
        }
        Ok(())
    }
}

/// Command arguments for netlist informations
#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    synth: SynthArgs,

    /// Also print every node of the netlist
    #[arg(long)]
    nodes: bool,
}

impl ShowArgs {
    pub fn run(&self) -> Result<()> {
        let (_, _, net) = self.synth.synthesize()?;
        println!("Netlist stats:\n{}", stats(&net));
        if self.nodes {
            println!("{}", net);
        }
        Ok(())
    }
}

/// Command arguments for equivalence checking
#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    synth: SynthArgs,

    /// Random seed, used above 16 inputs
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

impl CheckArgs {
    pub fn run(&self) -> Result<()> {
        let (_, equations, net) = self.synth.synthesize()?;
        match check_equivalence(&equations, &net, self.seed) {
            Ok(()) => {
                println!("Netlist matches the equations");
                Ok(())
            }
            Err(cex) => {
                println!("Netlist does not match the equations: {}", cex);
                std::process::exit(1);
            }
        }
    }
}
