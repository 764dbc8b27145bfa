use super::*;

pub(crate) struct BlockData {
  pub(crate) hash: BlockHash,
  pub(crate) header: Header,
  pub(crate) height: u32,
  pub(crate) txdata: Vec<(Transaction, Txid)>,
}

/// Fetches blocks and inclusion proofs from the node, falling back to older
/// and slower RPC methods when newer ones are missing or fail.
pub(crate) struct Fetcher<'client> {
  client: &'client Client,
  pub(crate) calls: u64,
}

impl<'client> Fetcher<'client> {
  pub(crate) fn new(client: &'client Client) -> Self {
    Self { client, calls: 0 }
  }

  fn call<T: for<'de> Deserialize<'de>>(
    &mut self,
    method: &str,
    args: &[Value],
  ) -> Result<T, bitcoincore_rpc::Error> {
    self.calls += 1;
    self.client.call(method, args)
  }

  /// Fetch the block at `height`, or `None` if the node has no such block yet.
  pub(crate) fn fetch_block(&mut self, height: u32) -> Result<Option<BlockData>> {
    self.calls += 1;
    let Some(hash) = self
      .client
      .get_block_hash(height.into())
      .into_option()
      .with_context(|| format!("failed to get hash of block {height}"))?
    else {
      return Ok(None);
    };

    self.calls += 1;
    let header = self
      .client
      .get_block_header(&hash)
      .with_context(|| format!("failed to get header of block {hash}"))?;

    let txdata = self
      .transactions(hash)?
      .into_iter()
      .map(|transaction| {
        let txid = transaction.compute_txid();
        (transaction, txid)
      })
      .collect();

    Ok(Some(BlockData {
      hash,
      header,
      height,
      txdata,
    }))
  }

  fn transactions(&mut self, hash: BlockHash) -> Result<Vec<Transaction>> {
    match self.raw_block_transactions(hash) {
      Ok(transactions) => return Ok(transactions),
      Err(err) => log::warn!(
        "`getrawblocktransactions` failed for block {hash}, falling back to `getblock`: {err}"
      ),
    }

    let txids = match self.block_transactions(hash)? {
      BlockTransactions::Full(transactions) => return Ok(transactions),
      BlockTransactions::Ids(txids) => txids,
    };

    log::warn!(
      "`getblock` returned only transaction ids for block {hash}, fetching {} transactions one by one",
      txids.len()
    );

    txids
      .into_iter()
      .map(|txid| {
        let transaction = self
          .call::<Value>("getrawtransaction", &[json!(txid), json!(1)])
          .with_context(|| format!("failed to get transaction {txid}"))?;

        decode_transaction(&transaction)
      })
      .collect()
  }

  fn raw_block_transactions(&mut self, hash: BlockHash) -> Result<Vec<Transaction>> {
    self
      .call::<Vec<Value>>("getrawblocktransactions", &[json!(hash), json!(1)])?
      .iter()
      .map(decode_transaction)
      .collect()
  }

  fn block_transactions(&mut self, hash: BlockHash) -> Result<BlockTransactions> {
    let block = match self.call::<Value>("getblock", &[json!(hash), json!(2)]) {
      Ok(block) => block,
      Err(err) => {
        log::warn!("`getblock` with verbosity 2 failed for block {hash}, retrying verbose: {err}");
        self
          .call::<Value>("getblock", &[json!(hash), json!(true)])
          .with_context(|| format!("failed to get block {hash}"))?
      }
    };

    BlockTransactions::from_block(&block)
  }

  /// Fetch proofs that each of `txids` is included in block `hash`.
  pub(crate) fn fetch_inclusion_proofs(
    &mut self,
    hash: BlockHash,
    txids: &[Txid],
  ) -> Result<BTreeMap<Txid, Vec<u8>>> {
    if txids.is_empty() {
      return Ok(BTreeMap::new());
    }

    match self
      .call::<Value>("gettxoutproofs", &[json!(txids), json!(hash)])
      .map_err(Error::from)
      .and_then(|proofs| proofs_from_batch(&proofs, txids))
    {
      Ok(proofs) => return Ok(proofs),
      Err(err) => log::warn!(
        "`gettxoutproofs` failed for block {hash}, falling back to `gettxoutproof`: {err}"
      ),
    }

    txids
      .iter()
      .map(|txid| {
        let proof = self
          .call::<String>("gettxoutproof", &[json!([txid]), json!(hash)])
          .with_context(|| format!("failed to get inclusion proof for {txid}"))?;

        Ok((*txid, hex::decode(proof)?))
      })
      .collect()
  }
}

enum BlockTransactions {
  Full(Vec<Transaction>),
  Ids(Vec<Txid>),
}

impl BlockTransactions {
  fn from_block(block: &Value) -> Result<Self> {
    let entries = block
      .get("tx")
      .and_then(Value::as_array)
      .context("block has no transaction list")?;

    if entries.iter().all(Value::is_string) {
      return entries
        .iter()
        .map(|txid| Ok(serde_json::from_value::<Txid>(txid.clone())?))
        .collect::<Result<Vec<Txid>>>()
        .map(Self::Ids);
    }

    entries
      .iter()
      .map(decode_transaction)
      .collect::<Result<Vec<Transaction>>>()
      .map(Self::Full)
  }
}

/// Decode a verbose transaction object, or a bare hex string, into a transaction.
fn decode_transaction(value: &Value) -> Result<Transaction> {
  let hex = match value {
    Value::String(hex) => hex,
    value => value
      .get("hex")
      .and_then(Value::as_str)
      .context("transaction has no `hex` field")?,
  };

  deserialize_hex(hex).context("failed to decode transaction")
}

/// A batch proof is either one merkle block covering every transaction, or
/// one proof per transaction in request order.
fn proofs_from_batch(proofs: &Value, txids: &[Txid]) -> Result<BTreeMap<Txid, Vec<u8>>> {
  match proofs {
    Value::String(proof) => {
      let proof = hex::decode(proof)?;
      Ok(txids.iter().map(|txid| (*txid, proof.clone())).collect())
    }
    Value::Array(proofs) => {
      ensure!(
        proofs.len() == txids.len(),
        "expected {} inclusion proofs but got {}",
        txids.len(),
        proofs.len()
      );

      txids
        .iter()
        .zip(proofs)
        .map(|(txid, proof)| {
          let proof = proof.as_str().context("inclusion proof is not a string")?;
          Ok((*txid, hex::decode(proof)?))
        })
        .collect()
    }
    _ => bail!("unexpected inclusion proof response: {proofs}"),
  }
}
