use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "zareladev CLI (alpha)", long_about = None)]
pub struct Cli {
    /// JSON config file; flags below override its values
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Content gateway base URL (serves /ipfs/<hash>)
    #[arg(long, global = true)]
    pub gateway: Option<String>,

    /// JSON-RPC endpoint answering eth_decrypt
    #[arg(long, global = true)]
    pub rpc: Option<String>,

    /// Viewer account (0x-prefixed)
    #[arg(long, global = true)]
    pub account: Option<String>,

    /// Directory that receives retrieved files
    #[arg(long, global = true)]
    pub out: Option<PathBuf>,

    /// Directory of exported order reads (<order>.json)
    #[arg(long, global = true)]
    pub orders: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Selection toggles. Applied as: --all, --group, --file, then
/// --deselect-group, --deselect-file.
#[derive(Args, Debug, Default)]
pub struct SelectionArgs {
    /// Select every file of every contributor
    #[arg(long)]
    pub all: bool,

    /// Select every file of one contributor
    #[arg(long = "group", value_name = "ADDR")]
    pub groups: Vec<String>,

    /// Select one file
    #[arg(long = "file", value_name = "ADDR:HASH")]
    pub files: Vec<String>,

    /// Clear one contributor's selection
    #[arg(long = "deselect-group", value_name = "ADDR")]
    pub deselect_groups: Vec<String>,

    /// Drop one file from the selection
    #[arg(long = "deselect-file", value_name = "ADDR:HASH")]
    pub deselect_files: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List contributors and their files for an order
    Files { order: u64 },

    /// Apply a selection and print the payout address list
    Payload {
        order: u64,
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Apply a selection and submit the payout (skipped when empty)
    Confirm {
        order: u64,
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Fetch, decrypt and save contributed files
    Retrieve {
        #[arg(required = true)]
        hashes: Vec<String>,

        /// Max retrievals in flight
        #[arg(long)]
        limit: Option<usize>,
    },
}
