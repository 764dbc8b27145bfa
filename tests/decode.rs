use {super::*, calus::subcommand::decode::Output};

#[test]
fn registration_from_file() {
  let transaction = registration("alice", vec![key_hash(1)]);

  pretty_assert_eq!(
    CommandBuilder::new("--regtest decode --file transaction.bin")
      .write("transaction.bin", consensus::serialize(&transaction))
      .run_and_deserialize_output::<Output>(),
    Output {
      txid: transaction.compute_txid(),
      artifact: Some(Artifact::Registration(Registration {
        name: "alice".into(),
        payloads: vec![key_hash(1)],
        flaws: Vec::new(),
      })),
      addresses: vec![key_hash(1).address("bchreg")],
      identity: None,
    }
  );
}

#[test]
fn rejection_from_file() {
  let transaction = raw_registration(&[b"not valid".as_slice(), &[1; 21]]);

  pretty_assert_eq!(
    CommandBuilder::new("--regtest decode --file transaction.bin")
      .write("transaction.bin", consensus::serialize(&transaction))
      .run_and_deserialize_output::<Output>(),
    Output {
      txid: transaction.compute_txid(),
      artifact: Some(Artifact::Rejection(Flaw::InvalidName)),
      addresses: Vec::new(),
      identity: None,
    }
  );
}

#[test]
fn unrelated_transaction_from_file() {
  let transaction = mockcore::transaction(&[ScriptBuf::new()]);

  let output = CommandBuilder::new("--regtest decode --file transaction.bin")
    .write("transaction.bin", consensus::serialize(&transaction))
    .run_and_deserialize_output::<Output>();

  assert_eq!(output.artifact, None);
  assert!(output.addresses.is_empty());
}

#[test]
fn registration_from_node_includes_identity() {
  let core = mockcore::builder().build();

  let transaction = registration("bob", vec![key_hash(2)]);
  let txid = transaction.compute_txid();
  let block = core.insert_block(100, vec![transaction]);

  let output = CommandBuilder::new(&format!("--regtest decode --txid {txid}"))
    .core(&core)
    .run_and_deserialize_output::<Output>();

  assert_eq!(output.txid, txid);
  assert_eq!(output.identity, Some(Identity::new(block.block_hash(), txid)));
  assert_eq!(output.addresses, [key_hash(2).address("bchreg")]);
}

#[test]
fn unknown_transaction() {
  let core = mockcore::builder().build();

  let txid = mockcore::transaction(&[]).compute_txid();

  CommandBuilder::new(&format!("--regtest decode --txid {txid}"))
    .core(&core)
    .expected_exit_code(1)
    .stderr_regex(&format!("error: failed to fetch transaction {txid}\n.*"))
    .run_and_extract_stdout();
}

#[test]
fn source_is_required() {
  CommandBuilder::new("--regtest decode")
    .expected_exit_code(2)
    .stderr_regex("error: the following required arguments were not provided:.*")
    .run_and_extract_stdout();
}
