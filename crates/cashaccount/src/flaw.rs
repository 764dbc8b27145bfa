use super::*;

/// Why a registration, or one of its payloads, was rejected.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Display, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Flaw {
  #[display("invalid account name")]
  InvalidName,
  #[display("missing payload")]
  MissingPayload,
  #[display("invalid payload length")]
  InvalidPayloadLength,
  #[display("malformed script")]
  MalformedScript,
}

impl Flaw {
  pub const ALL: [Self; 4] = [
    Self::InvalidName,
    Self::MissingPayload,
    Self::InvalidPayloadLength,
    Self::MalformedScript,
  ];

  /// Reason code stored alongside rejected transactions.
  pub fn code(self) -> u8 {
    match self {
      Self::InvalidName => 1,
      Self::MissingPayload => 2,
      Self::InvalidPayloadLength => 3,
      Self::MalformedScript => 4,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::InvalidName => "INVALID_NAME",
      Self::MissingPayload => "MISSING_PAYLOAD",
      Self::InvalidPayloadLength => "INVALID_PAYLOAD_LENGTH",
      Self::MalformedScript => "MALFORMED_SCRIPT",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn codes_are_distinct() {
    let mut codes = Flaw::ALL.iter().map(|flaw| flaw.code()).collect::<Vec<u8>>();
    codes.dedup();
    assert_eq!(codes, [1, 2, 3, 4]);
  }

  #[test]
  fn labels_match_serialization() {
    for flaw in Flaw::ALL {
      assert_eq!(
        serde_json::to_string(&flaw).unwrap(),
        format!("\"{}\"", flaw.label())
      );
    }
  }
}
