use {super::*, cashaddr::AddressType};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadKind {
  KeyHash,
  ScriptHash,
  PaymentCode,
  StealthKeys,
  TokenKeyHash,
  TokenScriptHash,
  TokenPaymentCode,
  TokenStealthKeys,
  Raw(u8),
}

impl PayloadKind {
  const PAYMENT_CODE_VERSION: u8 = 0x47;

  pub fn from_tag(tag: u8) -> Self {
    match tag {
      1 => Self::KeyHash,
      2 => Self::ScriptHash,
      3 => Self::PaymentCode,
      4 => Self::StealthKeys,
      129 => Self::TokenKeyHash,
      130 => Self::TokenScriptHash,
      131 => Self::TokenPaymentCode,
      132 => Self::TokenStealthKeys,
      tag => Self::Raw(tag),
    }
  }

  pub fn tag(self) -> u8 {
    match self {
      Self::KeyHash => 1,
      Self::ScriptHash => 2,
      Self::PaymentCode => 3,
      Self::StealthKeys => 4,
      Self::TokenKeyHash => 129,
      Self::TokenScriptHash => 130,
      Self::TokenPaymentCode => 131,
      Self::TokenStealthKeys => 132,
      Self::Raw(tag) => tag,
    }
  }

  /// Required data length, or `None` for unrecognized tags.
  pub fn length(self) -> Option<usize> {
    match self {
      Self::KeyHash | Self::ScriptHash | Self::TokenKeyHash | Self::TokenScriptHash => Some(20),
      Self::PaymentCode | Self::TokenPaymentCode => Some(80),
      Self::StealthKeys | Self::TokenStealthKeys => Some(66),
      Self::Raw(_) => None,
    }
  }

  pub fn name(self) -> Option<&'static str> {
    match self {
      Self::KeyHash => Some("Key Hash"),
      Self::ScriptHash => Some("Script Hash"),
      Self::PaymentCode => Some("Payment Code"),
      Self::StealthKeys => Some("Stealth Keys"),
      Self::TokenKeyHash => Some("Key Hash (Token Aware)"),
      Self::TokenScriptHash => Some("Script Hash (Token Aware)"),
      Self::TokenPaymentCode => Some("Payment Code (Token Aware)"),
      Self::TokenStealthKeys => Some("Stealth Keys (Token Aware)"),
      Self::Raw(_) => None,
    }
  }
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Payload {
  pub kind: PayloadKind,
  pub data: Vec<u8>,
}

impl Payload {
  /// Split a pushed segment into its type tag and data.
  ///
  /// Fails when a recognized tag carries data of the wrong length.
  pub fn from_segment(segment: &[u8]) -> Result<Self, Flaw> {
    let Some((&tag, data)) = segment.split_first() else {
      return Err(Flaw::InvalidPayloadLength);
    };

    let kind = PayloadKind::from_tag(tag);

    if let Some(length) = kind.length()
      && data.len() != length
    {
      return Err(Flaw::InvalidPayloadLength);
    }

    Ok(Self {
      kind,
      data: data.to_vec(),
    })
  }

  pub fn to_segment(&self) -> Vec<u8> {
    let mut segment = Vec::with_capacity(self.data.len() + 1);
    segment.push(self.kind.tag());
    segment.extend_from_slice(&self.data);
    segment
  }

  /// Display address for this payload, using `prefix` for CashAddr encodings.
  ///
  /// Token-aware hashes share the address of their plain counterparts.
  /// Stealth keys and unrecognized payloads have no address.
  pub fn address(&self, prefix: &str) -> Option<String> {
    match self.kind {
      PayloadKind::KeyHash | PayloadKind::TokenKeyHash => {
        cashaddr::encode(prefix, AddressType::KeyHash, &self.data)
      }
      PayloadKind::ScriptHash | PayloadKind::TokenScriptHash => {
        cashaddr::encode(prefix, AddressType::ScriptHash, &self.data)
      }
      PayloadKind::PaymentCode | PayloadKind::TokenPaymentCode => Some(self.payment_code()),
      PayloadKind::StealthKeys | PayloadKind::TokenStealthKeys | PayloadKind::Raw(_) => None,
    }
  }

  fn payment_code(&self) -> String {
    let mut data = Vec::with_capacity(self.data.len() + 1);
    data.push(PayloadKind::PAYMENT_CODE_VERSION);
    data.extend_from_slice(&self.data);
    bitcoin::base58::encode_check(&data)
  }
}
