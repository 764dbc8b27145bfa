use super::*;

#[derive(Clone, Default, Debug, Parser)]
pub struct Options {
  #[arg(
    long,
    help = "Authenticate to Bitcoin Cash node RPC with <BITCOIN_RPC_PASSWORD>."
  )]
  pub(crate) bitcoin_rpc_password: Option<String>,
  #[arg(
    long,
    help = "Give up on Bitcoin Cash node RPC calls after <BITCOIN_RPC_TIMEOUT>. [default: 5s]"
  )]
  pub(crate) bitcoin_rpc_timeout: Option<String>,
  #[arg(long, help = "Connect to Bitcoin Cash node RPC at <BITCOIN_RPC_URL>.")]
  pub(crate) bitcoin_rpc_url: Option<String>,
  #[arg(
    long,
    help = "Authenticate to Bitcoin Cash node RPC as <BITCOIN_RPC_USERNAME>."
  )]
  pub(crate) bitcoin_rpc_username: Option<String>,
  #[arg(long = "chain", value_enum, help = "Use <CHAIN>. [default: bitcoincash]")]
  pub(crate) chain_argument: Option<Chain>,
  #[arg(long, help = "Load configuration from <CONFIG>.")]
  pub(crate) config: Option<PathBuf>,
  #[arg(long, help = "Load Bitcoin Cash node RPC cookie file from <COOKIE_FILE>.")]
  pub(crate) cookie_file: Option<PathBuf>,
  #[arg(long, alias = "datadir", help = "Store index in <DATA_DIR>.")]
  pub(crate) data_dir: Option<PathBuf>,
  #[arg(long, short, help = "Specify output format. [default: json]")]
  pub(crate) format: Option<OutputFormat>,
  #[arg(long, help = "Use index at <INDEX>.")]
  pub(crate) index: Option<PathBuf>,
  #[arg(long, short, help = "Use regtest. Equivalent to `--chain bitcoincash-regtest`.")]
  pub(crate) regtest: bool,
  #[arg(
    long,
    value_enum,
    help = "Keep <STORAGE> data. `full` also caches transaction bodies and inclusion proofs. [default: minimal]"
  )]
  pub(crate) storage: Option<Storage>,
  #[arg(long, short, help = "Use testnet. Equivalent to `--chain bitcoincash-testnet`.")]
  pub(crate) testnet: bool,
}
