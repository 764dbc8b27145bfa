use super::*;

#[test]
fn fresh_index_reports_seeded_tip() {
  pretty_assert_eq!(
    CommandBuilder::new("--regtest status").run_and_deserialize_output::<Status>(),
    Status {
      chain: calus::Chain::BitcoincashRegtest,
      height: 99,
      hash: None,
      running: false,
      software: "calus".into(),
      version: env!("CARGO_PKG_VERSION").into(),
    }
  );
}

#[test]
fn mainnet_index_starts_below_first_registration_block() {
  let status = CommandBuilder::new("--chain bitcoincash status").run_and_deserialize_output::<Status>();

  assert_eq!(status.chain, calus::Chain::Bitcoincash);
  assert_eq!(status.height, 563_719);
}

#[test]
fn status_reports_indexed_tip() {
  let core = mockcore::builder().build();
  let block = core.insert_block(100, Vec::new());

  let tempdir = Arc::new(TempDir::new().unwrap());

  CommandBuilder::new("--regtest index update")
    .core(&core)
    .temp_dir(tempdir.clone())
    .run_and_deserialize_output::<PassSummary>();

  let status = CommandBuilder::new("--regtest status")
    .temp_dir(tempdir)
    .run_and_deserialize_output::<Status>();

  assert_eq!(status.height, 100);
  assert_eq!(status.hash, Some(block.block_hash()));
}

#[test]
fn yaml_output() {
  CommandBuilder::new("--regtest --format yaml status")
    .stdout_regex(".*chain: bitcoincash-regtest\nheight: 99\nhash: null\n.*")
    .run_and_extract_stdout();
}

#[test]
fn invalid_config_file() {
  CommandBuilder::new("--regtest --config calus.yaml status")
    .write("calus.yaml", "foo: bar\n")
    .expected_exit_code(1)
    .stderr_regex("error: Failed to parse config file `calus.yaml`\n")
    .run_and_extract_stdout();
}
