use super::*;

const EMOJI: [u32; 100] = [
  128123, 128018, 128021, 128008, 128014, 128004, 128022, 128016, 128042, 128024, 128000, 128007,
  128063, 129415, 128019, 128039, 129414, 129417, 128034, 128013, 128031, 128025, 128012, 129419,
  128029, 128030, 128375, 127803, 127794, 127796, 127797, 127809, 127808, 127815, 127817, 127819,
  127820, 127822, 127826, 127827, 129373, 129381, 129365, 127805, 127798, 127812, 129472, 129370,
  129408, 127850, 127874, 127853, 127968, 128663, 128690, 9973, 9992, 128641, 128640, 8986, 9728,
  11088, 127752, 9730, 127880, 127872, 9917, 9824, 9829, 9830, 9827, 128083, 128081, 127913,
  128276, 127925, 127908, 127911, 127928, 127930, 129345, 128269, 128367, 128161, 128214, 9993,
  128230, 9999, 128188, 128203, 9986, 128273, 128274, 128296, 128295, 9878, 9775, 128681, 128099,
  127838,
];

/// Ten decimal digits distinguishing accounts that share a name and number.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollisionHash(String);

impl CollisionHash {
  pub const LENGTH: usize = 10;

  fn from_seed(seed: u32) -> Self {
    let mut digits = seed.to_string().chars().rev().collect::<String>();

    while digits.len() < Self::LENGTH {
      digits.push('0');
    }

    Self(digits)
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Length of the prefix shared with `other`.
  pub fn common_prefix(&self, other: &CollisionHash) -> usize {
    self
      .0
      .bytes()
      .zip(other.0.bytes())
      .take_while(|(a, b)| a == b)
      .count()
  }
}

impl FromStr for CollisionHash {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s.len() == Self::LENGTH && s.bytes().all(|byte| byte.is_ascii_digit()) {
      Ok(Self(s.into()))
    } else {
      Err(format!("invalid collision hash `{s}`"))
    }
  }
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Identity {
  pub collision_hash: CollisionHash,
  pub emoji: u32,
}

impl Identity {
  /// Derive the identity of the registration `txid` confirmed in `block_hash`.
  pub fn new(block_hash: bitcoin::BlockHash, txid: bitcoin::Txid) -> Self {
    Self::from_hashes(display_order(block_hash), display_order(txid))
  }

  /// Derive an identity from hashes given in display (RPC) byte order.
  pub fn from_hashes(block_hash: [u8; 32], transaction_hash: [u8; 32]) -> Self {
    let mut preimage = [0; 64];
    preimage[..32].copy_from_slice(&block_hash);
    preimage[32..].copy_from_slice(&transaction_hash);

    let digest = sha256::Hash::hash(&preimage).to_byte_array();

    let seed = BigEndian::read_u32(&digest[0..4]);
    let emoji_index = BigEndian::read_u32(&digest[28..32]) % 100;

    Self {
      collision_hash: CollisionHash::from_seed(seed),
      emoji: EMOJI[emoji_index as usize],
    }
  }

  pub fn emoji_char(&self) -> Option<char> {
    char::from_u32(self.emoji)
  }

  pub fn emoji_table() -> &'static [u32; 100] {
    &EMOJI
  }
}

fn display_order<T: Hash<Bytes = [u8; 32]>>(hash: T) -> [u8; 32] {
  let mut bytes = hash.to_byte_array();
  bytes.reverse();
  bytes
}
