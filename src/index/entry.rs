use super::*;

/// Conversion between in-memory values and their stored column form.
pub(crate) trait Entry: Sized {
  type Value;

  fn load(value: Self::Value) -> Self;

  fn store(self) -> Self::Value;
}

/// Hashes are stored as 32 bytes in display order, as printed by the node.
pub(super) type HashValue = [u8; 32];

impl Entry for BlockHash {
  type Value = HashValue;

  fn load(mut value: Self::Value) -> Self {
    value.reverse();
    Self::from_byte_array(value)
  }

  fn store(self) -> Self::Value {
    let mut value = self.to_byte_array();
    value.reverse();
    value
  }
}

impl Entry for Txid {
  type Value = HashValue;

  fn load(mut value: Self::Value) -> Self {
    value.reverse();
    Self::from_byte_array(value)
  }

  fn store(self) -> Self::Value {
    let mut value = self.to_byte_array();
    value.reverse();
    value
  }
}

#[derive(Debug, PartialEq, Clone)]
pub(crate) struct BlockEntry {
  pub(crate) hash: BlockHash,
  pub(crate) height: u32,
  pub(crate) parent: BlockHash,
}

#[derive(Debug, PartialEq, Clone)]
pub(crate) struct TransactionEntry {
  pub(crate) txid: Txid,
  pub(crate) body: Option<Vec<u8>>,
  pub(crate) proof: Option<Vec<u8>>,
}

#[derive(Debug, PartialEq, Clone)]
pub(crate) struct RejectionEntry {
  pub(crate) txid: Txid,
  pub(crate) flaw: Flaw,
}

#[derive(Debug, PartialEq, Clone)]
pub(crate) struct PayloadEntry {
  pub(crate) tag: u8,
  pub(crate) data: Vec<u8>,
  pub(crate) address: Option<String>,
}

#[derive(Debug, PartialEq, Clone)]
pub(crate) struct AccountEntry {
  pub(crate) txid: Txid,
  pub(crate) name: String,
  pub(crate) number: u32,
  pub(crate) identity: Identity,
  pub(crate) collision: Collision,
  pub(crate) payloads: Vec<PayloadEntry>,
}

/// Everything one block adds to the index.
#[derive(Debug, PartialEq, Clone)]
pub(crate) struct BlockEntries {
  pub(crate) block: BlockEntry,
  pub(crate) transactions: Vec<TransactionEntry>,
  pub(crate) rejections: Vec<RejectionEntry>,
  pub(crate) accounts: Vec<AccountEntry>,
}
