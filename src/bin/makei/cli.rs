//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// makei - Build IBM i projects described by iproj.json and Rules.mk
#[derive(Parser)]
#[command(name = "makei")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the whole project or specific targets
    Build(BuildArgs),

    /// Build the objects created from specific source files
    Compile(CompileArgs),

    /// List which target builds each source and directory
    Targets(TargetsArgs),

    /// Print the build variables Bob would receive
    Vars(VarsArgs),

    /// Show the project descriptor
    Info(InfoArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every command that runs make.
#[derive(Args, Debug, Clone)]
pub struct MakeArgs {
    /// Extra options passed through to make
    #[arg(long, allow_hyphen_values = true)]
    pub make_options: Option<String>,

    /// Bob installation directory
    #[arg(long, env = "BOB_PATH")]
    pub bob_path: Option<PathBuf>,

    /// Path to the make executable
    #[arg(long, env = "MAKEI_MAKE")]
    pub make: Option<PathBuf>,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Targets to build, e.g. HELLO.PGM or dir_QRPGLESRC (default: all)
    #[arg(short, long = "target")]
    pub target: Vec<String>,

    #[command(flatten)]
    pub make: MakeArgs,
}

#[derive(Args)]
pub struct CompileArgs {
    /// Source files to compile
    #[arg(short, long = "file", required = true)]
    pub file: Vec<PathBuf>,

    #[command(flatten)]
    pub make: MakeArgs,
}

#[derive(Args)]
pub struct TargetsArgs {
    /// Only show the target for this source file
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct VarsArgs {}

#[derive(Args)]
pub struct InfoArgs {
    /// Print the descriptor as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
