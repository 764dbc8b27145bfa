use {super::*, clap::ValueEnum};

#[derive(Default, ValueEnum, Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Chain {
  #[default]
  #[value(alias("bch"))]
  Bitcoincash,
  #[value(alias("bch-testnet"))]
  BitcoincashTestnet,
  #[value(alias("bch-regtest"))]
  BitcoincashRegtest,
}

impl Chain {
  pub(crate) fn default_rpc_port(self) -> u16 {
    match self {
      Self::Bitcoincash => 8332,
      Self::BitcoincashTestnet => 18332,
      Self::BitcoincashRegtest => 18443,
    }
  }

  /// Human readable part of CashAddr addresses on this chain.
  pub fn cashaddr_prefix(self) -> &'static str {
    match self {
      Self::Bitcoincash => "bitcoincash",
      Self::BitcoincashTestnet => "bchtest",
      Self::BitcoincashRegtest => "bchreg",
    }
  }

  /// Height of the first block that may contain registrations.
  pub fn first_registration_height(self) -> u32 {
    match self {
      Self::Bitcoincash => 563_720,
      Self::BitcoincashTestnet | Self::BitcoincashRegtest => 100,
    }
  }

  /// Subtracted from a block height to give account numbers.
  pub fn number_offset(self) -> u32 {
    match self {
      Self::Bitcoincash => 563_620,
      Self::BitcoincashTestnet | Self::BitcoincashRegtest => 0,
    }
  }

  pub(crate) fn account_number(self, height: u32) -> Option<u32> {
    height.checked_sub(self.number_offset())
  }

  pub(crate) fn join_with_data_dir(self, data_dir: impl AsRef<Path>) -> PathBuf {
    data_dir.as_ref().join(self.to_string())
  }
}

impl Display for Chain {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(
      f,
      "{}",
      match self {
        Self::Bitcoincash => "bitcoincash",
        Self::BitcoincashTestnet => "bitcoincash-testnet",
        Self::BitcoincashRegtest => "bitcoincash-regtest",
      }
    )
  }
}

impl FromStr for Chain {
  type Err = SnafuError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "bitcoincash" | "bch" | "mainnet" => Ok(Self::Bitcoincash),
      "bitcoincash-testnet" | "bch-testnet" | "testnet" => Ok(Self::BitcoincashTestnet),
      "bitcoincash-regtest" | "bch-regtest" | "regtest" => Ok(Self::BitcoincashRegtest),
      _ => Err(SnafuError::InvalidChain {
        chain: s.to_string(),
      }),
    }
  }
}
