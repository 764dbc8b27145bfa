use super::*;

/// A Cash Account registration: a name and the payment data it resolves to.
#[derive(Debug, Default, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Registration {
  pub name: String,
  pub payloads: Vec<Payload>,
  /// Payloads that were dropped, one flaw per dropped payload.
  pub flaws: Vec<Flaw>,
}

impl Registration {
  pub const PROTOCOL_IDENTIFIER: [u8; 4] = [1, 1, 1, 1];
  pub const MAX_NAME_LENGTH: usize = 99;

  /// `OP_RETURN`, a four byte push, then the protocol identifier.
  pub const PREFIX: [u8; 6] = [
    0x6a,
    4,
    Self::PROTOCOL_IDENTIFIER[0],
    Self::PROTOCOL_IDENTIFIER[1],
    Self::PROTOCOL_IDENTIFIER[2],
    Self::PROTOCOL_IDENTIFIER[3],
  ];

  /// Decipher the registration carried by `transaction`, if any.
  ///
  /// Returns `None` when the transaction has no `OP_RETURN` output, more than
  /// one, or one without the protocol identifier.
  pub fn decipher(transaction: &Transaction) -> Option<Artifact> {
    let mut op_returns = transaction
      .output
      .iter()
      .filter(|output| output.script_pubkey.is_op_return());

    let script = op_returns.next()?.script_pubkey.as_bytes();

    if op_returns.next().is_some() {
      return None;
    }

    let tail = script.strip_prefix(&Self::PREFIX)?;

    Some(Self::from_tail(tail))
  }

  fn from_tail(tail: &[u8]) -> Artifact {
    let segments = match script::decode(tail) {
      Ok(segments) => segments,
      Err(_) => return Artifact::Rejection(Flaw::MalformedScript),
    };

    let Some((name, segments)) = segments.split_first() else {
      return Artifact::Rejection(Flaw::InvalidName);
    };

    let Some(name) = Self::parse_name(name) else {
      return Artifact::Rejection(Flaw::InvalidName);
    };

    if segments.is_empty() {
      return Artifact::Rejection(Flaw::MissingPayload);
    }

    let mut payloads = Vec::new();
    let mut flaws = Vec::new();

    for segment in segments {
      match Payload::from_segment(segment) {
        Ok(payload) => payloads.push(payload),
        Err(flaw) => flaws.push(flaw),
      }
    }

    Artifact::Registration(Self {
      name,
      payloads,
      flaws,
    })
  }

  fn parse_name(bytes: &[u8]) -> Option<String> {
    let name = std::str::from_utf8(bytes).ok()?;
    Self::is_valid_name(name).then(|| name.into())
  }

  pub fn is_valid_name(name: &str) -> bool {
    static NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]{1,99}$").unwrap());
    NAME.is_match(name)
  }

  /// Build the `OP_RETURN` script registering `self`.
  pub fn encipher(&self) -> ScriptBuf {
    let mut script = Self::PREFIX.to_vec();

    script::push(&mut script, self.name.as_bytes());

    for payload in &self.payloads {
      script::push(&mut script, &payload.to_segment());
    }

    ScriptBuf::from_bytes(script)
  }
}

#[cfg(test)]
mod tests {
  use {
    super::*,
    bitcoin::{
      Amount, OutPoint, Sequence, TxIn, TxOut, Witness, absolute::LockTime, transaction::Version,
    },
    pretty_assertions::assert_eq,
  };

  fn transaction(scripts: Vec<ScriptBuf>) -> Transaction {
    Transaction {
      version: Version::ONE,
      lock_time: LockTime::ZERO,
      input: vec![TxIn {
        previous_output: OutPoint::null(),
        script_sig: ScriptBuf::new(),
        sequence: Sequence::MAX,
        witness: Witness::new(),
      }],
      output: scripts
        .into_iter()
        .map(|script_pubkey| TxOut {
          value: Amount::ZERO,
          script_pubkey,
        })
        .collect(),
    }
  }

  fn tail(segments: &[&[u8]]) -> ScriptBuf {
    let mut script = Registration::PREFIX.to_vec();
    for segment in segments {
      script::push(&mut script, segment);
    }
    ScriptBuf::from_bytes(script)
  }

  fn key_hash(byte: u8) -> Payload {
    Payload {
      kind: PayloadKind::KeyHash,
      data: vec![byte; 20],
    }
  }

  #[test]
  fn round_trip() {
    let registration = Registration {
      name: "alice".into(),
      payloads: vec![
        key_hash(1),
        Payload {
          kind: PayloadKind::PaymentCode,
          data: vec![2; 80],
        },
      ],
      flaws: Vec::new(),
    };

    assert_eq!(
      Registration::decipher(&transaction(vec![registration.encipher()])),
      Some(Artifact::Registration(registration))
    );
  }

  #[test]
  fn prefix_bytes() {
    assert_eq!(
      Registration::PREFIX,
      [0x6a, 0x04, 0x01, 0x01, 0x01, 0x01]
    );
  }

  #[test]
  fn no_op_return() {
    assert_eq!(
      Registration::decipher(&transaction(vec![ScriptBuf::from_bytes(vec![0x51])])),
      None
    );
    assert_eq!(Registration::decipher(&transaction(Vec::new())), None);
  }

  #[test]
  fn multiple_op_returns() {
    let script = Registration {
      name: "alice".into(),
      payloads: vec![key_hash(1)],
      flaws: Vec::new(),
    }
    .encipher();

    assert_eq!(
      Registration::decipher(&transaction(vec![script.clone(), script])),
      None
    );
  }

  #[test]
  fn op_return_in_any_position() {
    let registration = Registration {
      name: "bob".into(),
      payloads: vec![key_hash(3)],
      flaws: Vec::new(),
    };

    assert_eq!(
      Registration::decipher(&transaction(vec![
        ScriptBuf::from_bytes(vec![0x51]),
        registration.encipher(),
      ])),
      Some(Artifact::Registration(registration))
    );
  }

  #[test]
  fn wrong_protocol_identifier() {
    assert_eq!(
      Registration::decipher(&transaction(vec![ScriptBuf::from_bytes(vec![
        0x6a, 0x04, 0x01, 0x01, 0x01, 0x02, 0x01, 0x61,
      ])])),
      None
    );
  }

  #[test]
  fn invalid_names() {
    #[track_caller]
    fn case(name: &[u8]) {
      assert_eq!(
        Registration::decipher(&transaction(vec![tail(&[name, &key_hash(1).to_segment()])])),
        Some(Artifact::Rejection(Flaw::InvalidName))
      );
    }

    case(b"al ice");
    case(b"alice!");
    case(&[b'a'; 100]);
    case(&[0xff, 0xfe]);
  }

  #[test]
  fn longest_valid_name() {
    let name = "a".repeat(99);
    assert!(matches!(
      Registration::decipher(&transaction(vec![tail(&[
        name.as_bytes(),
        &key_hash(1).to_segment()
      ])])),
      Some(Artifact::Registration(Registration { name: decoded, .. })) if decoded == name
    ));
  }

  #[test]
  fn missing_name() {
    assert_eq!(
      Registration::decipher(&transaction(vec![tail(&[])])),
      Some(Artifact::Rejection(Flaw::InvalidName))
    );
  }

  #[test]
  fn missing_payload() {
    assert_eq!(
      Registration::decipher(&transaction(vec![tail(&[b"alice"])])),
      Some(Artifact::Rejection(Flaw::MissingPayload))
    );
  }

  #[test]
  fn malformed_script() {
    let mut script = Registration::PREFIX.to_vec();
    script.extend_from_slice(&[5, b'a', b'l']);

    assert_eq!(
      Registration::decipher(&transaction(vec![ScriptBuf::from_bytes(script)])),
      Some(Artifact::Rejection(Flaw::MalformedScript))
    );
  }

  #[test]
  fn partial_payload_failure() {
    let valid = key_hash(7);
    let mut short = key_hash(8).to_segment();
    short.pop();

    assert_eq!(
      Registration::decipher(&transaction(vec![tail(&[
        b"alice",
        &valid.to_segment(),
        &short,
      ])])),
      Some(Artifact::Registration(Registration {
        name: "alice".into(),
        payloads: vec![valid],
        flaws: vec![Flaw::InvalidPayloadLength],
      }))
    );
  }

  #[test]
  fn unknown_payload_types_are_accepted() {
    assert_eq!(
      Registration::decipher(&transaction(vec![tail(&[b"alice", &[200, 1, 2]])])),
      Some(Artifact::Registration(Registration {
        name: "alice".into(),
        payloads: vec![Payload {
          kind: PayloadKind::Raw(200),
          data: vec![1, 2],
        }],
        flaws: Vec::new(),
      }))
    );
  }

  #[test]
  fn flaws() {
    assert_eq!(
      Artifact::Rejection(Flaw::InvalidName).flaws(),
      vec![Flaw::InvalidName]
    );
  }
}
