use {
  super::*,
  jsonrpc_core::{Error, ErrorCode},
};

pub(crate) struct Server {
  pub(crate) state: Arc<Mutex<State>>,
}

impl Server {
  pub(crate) fn new(state: Arc<Mutex<State>>) -> Self {
    Self { state }
  }

  fn state(&self) -> MutexGuard<'_, State> {
    self.state.lock().unwrap()
  }

  fn call(&self, method: &str) -> Result<MutexGuard<'_, State>, Error> {
    let mut state = self.state();
    state.calls.push(method.into());

    if state.unsupported.contains(method) {
      return Err(Error::method_not_found());
    }

    Ok(state)
  }

  fn verbose_transaction(transaction: &Transaction, block_hash: BlockHash) -> Value {
    json!({
      "txid": transaction.compute_txid(),
      "hash": transaction.compute_txid(),
      "hex": serialize_hex(transaction),
      "blockhash": block_hash,
      "vout": transaction
        .output
        .iter()
        .enumerate()
        .map(|(n, output)| json!({
          "n": n,
          "value": output.value.to_btc(),
          "scriptPubKey": {
            "hex": hex::encode(output.script_pubkey.as_bytes()),
          },
        }))
        .collect::<Vec<Value>>(),
    })
  }

  fn proof(state: &State, txids: &[Txid], block_hash: Option<BlockHash>) -> Result<String, Error> {
    let block_hash = match block_hash {
      Some(block_hash) => block_hash,
      None => {
        let Some((_, block_hash)) = txids
          .first()
          .and_then(|txid| state.transactions.get(txid))
        else {
          return Err(not_found("Transaction not yet in block"));
        };
        *block_hash
      }
    };

    let Some((_, block)) = state.block(block_hash) else {
      return Err(not_found("Block not found"));
    };

    let in_block = block
      .txdata
      .iter()
      .map(Transaction::compute_txid)
      .collect::<BTreeSet<Txid>>();

    if txids.is_empty() || txids.iter().any(|txid| !in_block.contains(txid)) {
      return Err(invalid_parameter("Not all transactions found in specified block"));
    }

    Ok(serialize_hex(&MerkleBlock::from_block_with_predicate(
      block,
      |txid| txids.contains(txid),
    )))
  }
}

fn not_found(message: &str) -> Error {
  Error {
    code: ErrorCode::ServerError(-5),
    message: message.into(),
    data: None,
  }
}

fn invalid_parameter(message: &str) -> Error {
  Error {
    code: ErrorCode::ServerError(-8),
    message: message.into(),
    data: None,
  }
}

fn truthy(value: &Option<Value>) -> Option<u64> {
  match value {
    None | Some(Value::Null) => Some(0),
    Some(Value::Bool(verbose)) => Some((*verbose).into()),
    Some(Value::Number(number)) => number.as_u64(),
    Some(_) => None,
  }
}

impl Api for Server {
  fn get_block_count(&self) -> Result<u64, Error> {
    let state = self.call("getblockcount")?;
    Ok(state.tip_height().unwrap_or_default().into())
  }

  fn get_block_hash(&self, height: usize) -> Result<BlockHash, Error> {
    let state = self.call("getblockhash")?;

    u32::try_from(height)
      .ok()
      .and_then(|height| state.blocks.get(&height))
      .map(Block::block_hash)
      .ok_or_else(|| invalid_parameter("Block height out of range"))
  }

  fn get_block_header(&self, block_hash: BlockHash, verbose: Option<bool>) -> Result<Value, Error> {
    let state = self.call("getblockheader")?;

    let Some((height, block)) = state.block(block_hash) else {
      return Err(not_found("Block not found"));
    };

    if verbose.unwrap_or(true) {
      Ok(json!({
        "hash": block_hash,
        "height": height,
        "previousblockhash": block.header.prev_blockhash,
        "nTx": block.txdata.len(),
      }))
    } else {
      Ok(Value::String(serialize_hex(&block.header)))
    }
  }

  fn get_block(
    &self,
    block_hash: BlockHash,
    verbosity: Option<Value>,
  ) -> Result<Value, Error> {
    let state = self.call("getblock")?;

    let Some(verbosity) = truthy(&verbosity) else {
      return Err(Error::invalid_params("verbosity must be a boolean or integer"));
    };

    if verbosity > 1 && state.unsupported.contains("getblock-verbosity-2") {
      return Err(Error {
        code: ErrorCode::ServerError(-1),
        message: "JSON value is not a boolean as expected".into(),
        data: None,
      });
    }

    let Some((height, block)) = state.block(block_hash) else {
      return Err(not_found("Block not found"));
    };

    Ok(match verbosity {
      0 => Value::String(serialize_hex(block)),
      1 => json!({
        "hash": block_hash,
        "height": height,
        "previousblockhash": block.header.prev_blockhash,
        "tx": block
          .txdata
          .iter()
          .map(Transaction::compute_txid)
          .collect::<Vec<Txid>>(),
      }),
      _ => json!({
        "hash": block_hash,
        "height": height,
        "previousblockhash": block.header.prev_blockhash,
        "tx": block
          .txdata
          .iter()
          .map(|transaction| Self::verbose_transaction(transaction, block_hash))
          .collect::<Vec<Value>>(),
      }),
    })
  }

  fn get_raw_block_transactions(
    &self,
    block_hash: BlockHash,
    _verbose: Option<Value>,
  ) -> Result<Vec<Value>, Error> {
    let state = self.call("getrawblocktransactions")?;

    let Some((_, block)) = state.block(block_hash) else {
      return Err(not_found("Block not found"));
    };

    Ok(
      block
        .txdata
        .iter()
        .map(|transaction| Self::verbose_transaction(transaction, block_hash))
        .collect(),
    )
  }

  fn get_raw_transaction(&self, txid: Txid, verbose: Option<Value>) -> Result<Value, Error> {
    let state = self.call("getrawtransaction")?;

    let Some((transaction, block_hash)) = state.transactions.get(&txid) else {
      return Err(not_found(
        "No such mempool or blockchain transaction. Use gettransaction for wallet transactions.",
      ));
    };

    if truthy(&verbose).unwrap_or_default() > 0 {
      Ok(Self::verbose_transaction(transaction, *block_hash))
    } else {
      Ok(Value::String(serialize_hex(transaction)))
    }
  }

  fn get_tx_out_proof(
    &self,
    txids: Vec<Txid>,
    block_hash: Option<BlockHash>,
  ) -> Result<String, Error> {
    let state = self.call("gettxoutproof")?;
    Self::proof(&state, &txids, block_hash)
  }

  fn get_tx_out_proofs(
    &self,
    txids: Vec<Txid>,
    block_hash: Option<BlockHash>,
  ) -> Result<String, Error> {
    let state = self.call("gettxoutproofs")?;

    if state.malformed.contains("gettxoutproofs") {
      return Ok("not hex".into());
    }

    Self::proof(&state, &txids, block_hash)
  }
}
