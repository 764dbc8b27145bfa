//! CashAddr encoding of key and script hashes.

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

const GENERATORS: [u64; 5] = [
  0x98_f2bc_8e61,
  0x79_b76d_99e2,
  0xf3_3e5f_b3c4,
  0xae_2eab_e2a8,
  0x1e_4f43_e470,
];

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AddressType {
  KeyHash,
  ScriptHash,
}

impl AddressType {
  fn version(self) -> u8 {
    match self {
      Self::KeyHash => 0,
      Self::ScriptHash => 1,
    }
  }
}

/// Encode `hash` as `<prefix>:<payload>`.
///
/// Only 160-bit hashes are supported; any other length returns `None`.
pub fn encode(prefix: &str, address_type: AddressType, hash: &[u8]) -> Option<String> {
  if hash.len() != 20 {
    return None;
  }

  let mut payload = Vec::with_capacity(21);
  payload.push(address_type.version() << 3);
  payload.extend_from_slice(hash);

  let data = convert_bits(&payload);
  let checksum = checksum(prefix, &data);

  let mut address = String::with_capacity(prefix.len() + 1 + data.len() + checksum.len());
  address.push_str(prefix);
  address.push(':');
  address.extend(
    data
      .iter()
      .chain(checksum.iter())
      .map(|&value| char::from(CHARSET[usize::from(value)])),
  );

  Some(address)
}

fn convert_bits(bytes: &[u8]) -> Vec<u8> {
  let mut accumulator = 0u32;
  let mut bits = 0;
  let mut groups = Vec::with_capacity(bytes.len() * 8 / 5 + 1);

  for &byte in bytes {
    accumulator = (accumulator << 8) | u32::from(byte);
    bits += 8;
    while bits >= 5 {
      bits -= 5;
      groups.push(((accumulator >> bits) & 0x1f) as u8);
    }
  }

  if bits > 0 {
    groups.push(((accumulator << (5 - bits)) & 0x1f) as u8);
  }

  groups
}

fn checksum(prefix: &str, data: &[u8]) -> [u8; 8] {
  let values = prefix
    .bytes()
    .map(|byte| byte & 0x1f)
    .chain([0])
    .chain(data.iter().copied())
    .chain([0; 8]);

  let polymod = polymod(values);

  let mut checksum = [0; 8];
  for (i, group) in checksum.iter_mut().enumerate() {
    *group = ((polymod >> (5 * (7 - i))) & 0x1f) as u8;
  }
  checksum
}

fn polymod(values: impl Iterator<Item = u8>) -> u64 {
  let mut c = 1u64;

  for value in values {
    let top = c >> 35;
    c = ((c & 0x07_ffff_ffff) << 5) ^ u64::from(value);

    for (i, generator) in GENERATORS.iter().enumerate() {
      if (top >> i) & 1 == 1 {
        c ^= generator;
      }
    }
  }

  c ^ 1
}
