use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use lex_nbest_cli::commands::convert_ops::{self, ResourceArgs};
use lex_nbest_cli::commands::config_ops;
use lex_nbest_cli::trace_init::init_tracing;

#[derive(Parser)]
#[command(name = "nbestool", about = "Lattice n-best conversion diagnostics")]
struct Cli {
    /// Settings TOML to use instead of the embedded defaults
    #[arg(long, global = true)]
    settings: Option<String>,
    /// Write JSON trace events to this directory
    #[arg(long, global = true)]
    trace_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Resources {
    /// Dictionary text file (reading, left_id, right_id, cost, surface; tab-separated)
    dict_file: String,
    /// Connection matrix text file
    conn_file: String,
    /// Role table: one `id role` pair per line
    #[arg(long)]
    roles: Option<String>,
    /// Function-word class id range, MIN:MAX
    #[arg(long)]
    fw_range: Option<String>,
    /// Suppression list, one word per line, vetoed in prediction requests
    #[arg(long)]
    suppress: Option<String>,
}

impl Resources {
    fn as_args(&self) -> ResourceArgs<'_> {
        ResourceArgs {
            dict_file: &self.dict_file,
            conn_file: &self.conn_file,
            roles: self.roles.as_deref(),
            fw_range: self.fw_range.as_deref(),
            suppress: self.suppress.as_deref(),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Convert a reading into segments with ranked candidates
    Convert {
        #[command(flatten)]
        resources: Resources,
        /// Reading; wrap committed segments in brackets, e.g. "[しんこう]する"
        reading: String,
        /// Run as a prediction request (single segment, `--suppress` list applies)
        #[arg(long)]
        prediction: bool,
        /// Candidates per segment
        #[arg(short, long, default_value = "10")]
        n: usize,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Enumerate candidates for the whole reading under one boundary mode
    Nbest {
        #[command(flatten)]
        resources: Resources,
        /// Reading; brackets commit segment boundaries
        reading: String,
        /// strict, only_mid or only_edge (default from settings)
        #[arg(long)]
        mode: Option<String>,
        /// Run as a prediction request (`--suppress` list applies)
        #[arg(long)]
        prediction: bool,
        /// Number of candidates
        #[arg(short, long, default_value = "10")]
        n: usize,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Dump the lattice and its Viterbi costs
    Lattice {
        #[command(flatten)]
        resources: Resources,
        /// Reading; brackets commit segment boundaries
        reading: String,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the roles of two class ids and whether they split a segment
    Roles {
        /// Connection matrix text file
        conn_file: String,
        left_id: u16,
        right_id: u16,
        /// Role table: one `id role` pair per line
        #[arg(long)]
        roles: Option<String>,
        /// Function-word class id range, MIN:MAX
        #[arg(long)]
        fw_range: Option<String>,
    },
    /// Print the embedded default settings
    SettingsExport,
    /// Check a settings file
    SettingsValidate {
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.trace_dir.as_deref());
    if let Some(file) = &cli.settings {
        config_ops::settings_load(file);
    }

    match cli.command {
        Command::Convert {
            resources,
            reading,
            prediction,
            n,
            json,
        } => convert_ops::convert_cmd(&resources.as_args(), &reading, prediction, n, json),
        Command::Nbest {
            resources,
            reading,
            mode,
            prediction,
            n,
            json,
        } => convert_ops::nbest_cmd(
            &resources.as_args(),
            &reading,
            mode.as_deref(),
            prediction,
            n,
            json,
        ),
        Command::Lattice {
            resources,
            reading,
            json,
        } => convert_ops::lattice_cmd(&resources.as_args(), &reading, json),
        Command::Roles {
            conn_file,
            left_id,
            right_id,
            roles,
            fw_range,
        } => convert_ops::roles_cmd(
            &conn_file,
            roles.as_deref(),
            fw_range.as_deref(),
            left_id,
            right_id,
        ),
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}
