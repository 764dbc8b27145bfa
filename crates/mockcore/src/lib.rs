use {
  api::Api,
  bitcoin::{
    Amount, Block, BlockHash, CompactTarget, OutPoint, ScriptBuf, Sequence, Transaction, TxIn,
    TxOut, Txid, Witness,
    absolute::LockTime,
    block::{self, Header},
    consensus::encode::serialize_hex,
    hashes::Hash,
    merkle_tree::MerkleBlock,
    script, transaction,
  },
  jsonrpc_core::{IoHandler, Value},
  jsonrpc_http_server::{CloseHandle, ServerBuilder},
  serde_json::json,
  server::Server,
  state::State,
  std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::{Arc, Mutex, MutexGuard},
    thread,
    time::Duration,
  },
};

mod api;
mod server;
mod state;

pub fn builder() -> Builder {
  Builder {
    malformed: BTreeSet::new(),
    unsupported: BTreeSet::new(),
  }
}

pub struct Builder {
  malformed: BTreeSet<String>,
  unsupported: BTreeSet<String>,
}

impl Builder {
  /// Answer `method` with a method-not-found error, like a node that lacks it.
  pub fn unsupported(mut self, method: &str) -> Self {
    self.unsupported.insert(method.into());
    self
  }

  /// Answer `method` successfully but with an unusable result.
  ///
  /// Only `gettxoutproofs` honours this.
  pub fn malformed(mut self, method: &str) -> Self {
    self.malformed.insert(method.into());
    self
  }

  pub fn build(self) -> Handle {
    let state = Arc::new(Mutex::new(State::new(self.unsupported, self.malformed)));
    let server = Server::new(state.clone());
    let mut io = IoHandler::default();
    io.extend_with(server.to_delegate());

    let rpc_server = ServerBuilder::new(io)
      .threads(1)
      .start_http(&"127.0.0.1:0".parse().unwrap())
      .unwrap();

    let close_handle = rpc_server.close_handle();
    let port = rpc_server.address().port();

    thread::spawn(|| rpc_server.wait());

    for i in 0.. {
      match reqwest::blocking::get(format!("http://127.0.0.1:{port}/")) {
        Ok(_) => break,
        Err(err) => {
          if i == 400 {
            panic!("mock node failed to start: {err}");
          }
        }
      }

      thread::sleep(Duration::from_millis(25));
    }

    Handle {
      close_handle: Some(close_handle),
      port,
      state,
    }
  }
}

pub struct Handle {
  close_handle: Option<CloseHandle>,
  port: u16,
  state: Arc<Mutex<State>>,
}

impl Handle {
  pub fn url(&self) -> String {
    format!("http://127.0.0.1:{}", self.port)
  }

  pub fn state(&self) -> MutexGuard<'_, State> {
    self.state.lock().unwrap()
  }

  /// Add a block at `height` containing a coinbase followed by `transactions`.
  ///
  /// The block's parent is whatever block is stored at `height - 1`.
  pub fn insert_block(&self, height: u32, transactions: Vec<Transaction>) -> Block {
    self.state().insert_block(height, transactions)
  }

  /// Add a block directly above the current tip.
  pub fn mine_block(&self, transactions: Vec<Transaction>) -> Block {
    let mut state = self.state();
    let height = state.tip_height().map(|height| height + 1).unwrap_or(0);
    state.insert_block(height, transactions)
  }

  /// Replace the block at `height` with a different one.
  pub fn replace_block(&self, height: u32, transactions: Vec<Transaction>) -> Block {
    let mut state = self.state();
    state.nonce += 1;
    state.insert_block(height, transactions)
  }

  pub fn calls(&self) -> Vec<String> {
    self.state().calls.clone()
  }

  pub fn clear_calls(&self) {
    self.state().calls.clear();
  }

  pub fn unsupported(&self, method: &str) {
    self.state().unsupported.insert(method.into());
  }

  pub fn supported(&self, method: &str) {
    self.state().unsupported.remove(method);
  }
}

impl Drop for Handle {
  fn drop(&mut self) {
    if let Some(close_handle) = self.close_handle.take() {
      close_handle.close();
    }
  }
}

/// A transaction spending a made-up outpoint, with the given output scripts.
pub fn transaction(scripts: &[ScriptBuf]) -> Transaction {
  static NEXT: Mutex<u32> = Mutex::new(0);

  let mut next = NEXT.lock().unwrap();
  *next += 1;

  Transaction {
    version: transaction::Version::ONE,
    lock_time: LockTime::ZERO,
    input: vec![TxIn {
      previous_output: OutPoint {
        txid: Txid::all_zeros(),
        vout: *next,
      },
      script_sig: ScriptBuf::new(),
      sequence: Sequence::MAX,
      witness: Witness::new(),
    }],
    output: scripts
      .iter()
      .map(|script_pubkey| TxOut {
        value: Amount::ZERO,
        script_pubkey: script_pubkey.clone(),
      })
      .collect(),
  }
}
