use super::*;

pub struct State {
  pub blocks: BTreeMap<u32, Block>,
  pub calls: Vec<String>,
  pub hashes: HashMap<BlockHash, u32>,
  pub malformed: BTreeSet<String>,
  pub nonce: u32,
  pub transactions: HashMap<Txid, (Transaction, BlockHash)>,
  pub unsupported: BTreeSet<String>,
}

impl State {
  pub(crate) fn new(unsupported: BTreeSet<String>, malformed: BTreeSet<String>) -> Self {
    Self {
      blocks: BTreeMap::new(),
      calls: Vec::new(),
      hashes: HashMap::new(),
      malformed,
      nonce: 0,
      transactions: HashMap::new(),
      unsupported,
    }
  }

  pub fn tip_height(&self) -> Option<u32> {
    self.blocks.keys().next_back().copied()
  }

  pub fn block(&self, block_hash: BlockHash) -> Option<(u32, &Block)> {
    let height = *self.hashes.get(&block_hash)?;
    Some((height, self.blocks.get(&height)?))
  }

  pub(crate) fn insert_block(&mut self, height: u32, transactions: Vec<Transaction>) -> Block {
    let prev_blockhash = height
      .checked_sub(1)
      .and_then(|parent| self.blocks.get(&parent))
      .map(|parent| parent.block_hash())
      .unwrap_or_else(BlockHash::all_zeros);

    let coinbase = Transaction {
      version: transaction::Version::ONE,
      lock_time: LockTime::ZERO,
      input: vec![TxIn {
        previous_output: OutPoint::null(),
        script_sig: script::Builder::new()
          .push_int(height.into())
          .push_int(self.nonce.into())
          .into_script(),
        sequence: Sequence::MAX,
        witness: Witness::new(),
      }],
      output: vec![TxOut {
        value: Amount::from_sat(50 * 100_000_000),
        script_pubkey: ScriptBuf::new(),
      }],
    };

    let mut block = Block {
      header: Header {
        version: block::Version::ONE,
        prev_blockhash,
        merkle_root: Hash::all_zeros(),
        time: height,
        bits: CompactTarget::from_consensus(0x207f_ffff),
        nonce: self.nonce,
      },
      txdata: [coinbase].into_iter().chain(transactions).collect(),
    };

    if let Some(merkle_root) = block.compute_merkle_root() {
      block.header.merkle_root = merkle_root;
    }

    if let Some(replaced) = self.blocks.insert(height, block.clone()) {
      self.hashes.remove(&replaced.block_hash());
      for transaction in &replaced.txdata {
        self.transactions.remove(&transaction.compute_txid());
      }
    }

    let block_hash = block.block_hash();
    self.hashes.insert(block_hash, height);

    for transaction in &block.txdata {
      self
        .transactions
        .insert(transaction.compute_txid(), (transaction.clone(), block_hash));
    }

    block
  }
}
