use super::*;

#[jsonrpc_derive::rpc(server)]
pub trait Api {
  #[rpc(name = "getblockcount")]
  fn get_block_count(&self) -> Result<u64, jsonrpc_core::Error>;

  #[rpc(name = "getblockhash")]
  fn get_block_hash(&self, height: usize) -> Result<BlockHash, jsonrpc_core::Error>;

  #[rpc(name = "getblockheader")]
  fn get_block_header(
    &self,
    block_hash: BlockHash,
    verbose: Option<bool>,
  ) -> Result<Value, jsonrpc_core::Error>;

  #[rpc(name = "getblock")]
  fn get_block(
    &self,
    block_hash: BlockHash,
    verbosity: Option<Value>,
  ) -> Result<Value, jsonrpc_core::Error>;

  #[rpc(name = "getrawblocktransactions")]
  fn get_raw_block_transactions(
    &self,
    block_hash: BlockHash,
    verbose: Option<Value>,
  ) -> Result<Vec<Value>, jsonrpc_core::Error>;

  #[rpc(name = "getrawtransaction")]
  fn get_raw_transaction(
    &self,
    txid: Txid,
    verbose: Option<Value>,
  ) -> Result<Value, jsonrpc_core::Error>;

  #[rpc(name = "gettxoutproof")]
  fn get_tx_out_proof(
    &self,
    txids: Vec<Txid>,
    block_hash: Option<BlockHash>,
  ) -> Result<String, jsonrpc_core::Error>;

  #[rpc(name = "gettxoutproofs")]
  fn get_tx_out_proofs(
    &self,
    txids: Vec<Txid>,
    block_hash: Option<BlockHash>,
  ) -> Result<String, jsonrpc_core::Error>;
}
