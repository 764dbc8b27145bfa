use super::*;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
  pub txid: Txid,
  pub artifact: Option<Artifact>,
  pub addresses: Vec<Option<String>>,
  pub identity: Option<Identity>,
}

#[derive(Debug, Parser)]
#[clap(group(
  clap::ArgGroup::new("source")
    .required(true)
    .args(&["file", "txid"]),
))]
pub struct Decode {
  #[arg(long, conflicts_with = "file", help = "Fetch transaction with <TXID> from the node.")]
  txid: Option<Txid>,
  #[arg(long, conflicts_with = "txid", help = "Load transaction from <FILE>.")]
  file: Option<PathBuf>,
}

impl Decode {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let (transaction, block_hash) = if let Some(txid) = self.txid {
      let verbose = settings
        .bitcoin_rpc_client()?
        .call::<Value>("getrawtransaction", &[json!(txid), json!(1)])
        .with_context(|| format!("failed to fetch transaction {txid}"))?;

      let hex = verbose
        .get("hex")
        .and_then(Value::as_str)
        .context("transaction has no `hex` field")?;

      let block_hash = verbose
        .get("blockhash")
        .map(|hash| serde_json::from_value::<BlockHash>(hash.clone()))
        .transpose()?;

      (deserialize_hex::<Transaction>(hex)?, block_hash)
    } else if let Some(file) = self.file {
      let bytes = fs::read(&file).with_context(|| format!("failed to read `{}`", file.display()))?;
      (consensus::deserialize::<Transaction>(&bytes)?, None)
    } else {
      unreachable!()
    };

    let txid = transaction.compute_txid();

    let artifact = Registration::decipher(&transaction);

    let addresses = match &artifact {
      Some(Artifact::Registration(registration)) => registration
        .payloads
        .iter()
        .map(|payload| payload.address(settings.chain().cashaddr_prefix()))
        .collect(),
      _ => Vec::new(),
    };

    let identity = match (&artifact, block_hash) {
      (Some(Artifact::Registration(_)), Some(block_hash)) => Some(Identity::new(block_hash, txid)),
      _ => None,
    };

    Ok(Some(Box::new(Output {
      txid,
      artifact,
      addresses,
      identity,
    })))
  }
}
