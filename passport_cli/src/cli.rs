use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "passport",
    version,
    about = "Count valid passport records in batch files"
)]
pub struct Cli {
    /// Files or directories to scan; reads stdin when empty or `-`
    pub inputs: Vec<PathBuf>,

    #[arg(long, help = "Output machine-readable JSON")]
    pub json: bool,

    #[arg(long, help = "Run the scanner on its own thread")]
    pub threaded: bool,

    #[arg(long, help = "Require all six hair colour digits to be hexadecimal")]
    pub strict_hcl: bool,

    #[arg(long, help = "Include a per-record validation report")]
    pub report: bool,

    #[arg(long, value_name = "TOML", help = "Runtime configuration file")]
    pub config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    pub verbose: u8,

    #[arg(short, long, help = "Descend into subdirectories")]
    pub recursive: bool,

    #[arg(long, help = "Only scan files with this extension inside directories")]
    pub extension: Option<String>,

    #[arg(long, help = "Stop at the first file that fails")]
    pub fail_fast: bool,

    #[arg(long, value_name = "N", help = "Worker threads for multi-file batches")]
    pub threads: Option<usize>,
}

impl Cli {
    pub fn reads_stdin(&self) -> bool {
        self.inputs.is_empty() || (self.inputs.len() == 1 && self.inputs[0].as_os_str() == "-")
    }
}
