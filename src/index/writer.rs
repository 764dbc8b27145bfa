use {super::*, rusqlite::Savepoint};

/// Write everything a block adds to the index, then advance the chain tip.
///
/// The writes run inside one transaction, with one savepoint per kind of
/// entity, so a failure leaves no trace of the block and the tip unchanged.
pub(crate) fn persist(connection: &mut Connection, entries: &BlockEntries) -> rusqlite::Result<()> {
  let mut transaction = connection.transaction()?;

  let block_id = batch(&mut transaction, "blocks", |savepoint| {
    insert_block(savepoint, &entries.block)
  })?;

  let transaction_ids = batch(&mut transaction, "transactions", |savepoint| {
    let mut ids = BTreeMap::new();

    for entry in &entries.transactions {
      let transaction_id = insert_transaction(savepoint, entry)?;

      savepoint.execute(
        "INSERT OR IGNORE INTO block_transactions (block_id, transaction_id) VALUES (?1, ?2)",
        params![block_id, transaction_id],
      )?;

      ids.insert(entry.txid, transaction_id);
    }

    let mut positions = BTreeMap::<Txid, i64>::new();

    for rejection in &entries.rejections {
      let transaction_id = id(&ids, rejection.txid)?;
      let position = positions.entry(rejection.txid).or_default();

      savepoint.execute(
        "INSERT OR IGNORE INTO registration_rejections (transaction_id, position, reason_id)
         VALUES (?1, ?2, ?3)",
        params![transaction_id, *position, rejection.flaw.code()],
      )?;

      *position += 1;
    }

    Ok(ids)
  })?;

  let name_ids = batch(&mut transaction, "names", |savepoint| {
    entries
      .accounts
      .iter()
      .map(|account| Ok((account.txid, insert_name(savepoint, &account.name)?)))
      .collect::<rusqlite::Result<BTreeMap<Txid, i64>>>()
  })?;

  let payload_ids = batch(&mut transaction, "payloads", |savepoint| {
    entries
      .accounts
      .iter()
      .map(|account| {
        let ids = account
          .payloads
          .iter()
          .map(|payload| insert_payload(savepoint, payload))
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok((account.txid, ids))
      })
      .collect::<rusqlite::Result<BTreeMap<Txid, Vec<i64>>>>()
  })?;

  let account_ids = batch(&mut transaction, "accounts", |savepoint| {
    entries
      .accounts
      .iter()
      .map(|account| {
        let account_id = insert_account(
          savepoint,
          account,
          id(&transaction_ids, account.txid)?,
          id(&name_ids, account.txid)?,
        )?;
        Ok((account.txid, account_id))
      })
      .collect::<rusqlite::Result<BTreeMap<Txid, i64>>>()
  })?;

  batch(&mut transaction, "account_payloads", |savepoint| {
    for (txid, account_id) in &account_ids {
      for payload_id in payload_ids.get(txid).into_iter().flatten() {
        savepoint.execute(
          "INSERT OR IGNORE INTO account_payloads (account_id, payload_id) VALUES (?1, ?2)",
          params![account_id, payload_id],
        )?;
      }
    }
    Ok(())
  })?;

  batch(&mut transaction, "chain_tip", |savepoint| {
    savepoint.execute(
      "UPDATE service_status SET chain_tip_height = ?1, chain_tip_hash = ?2 WHERE status_id = 0",
      params![entries.block.height, entries.block.hash.store()],
    )?;
    Ok(())
  })?;

  transaction.commit()
}

fn batch<T>(
  transaction: &mut rusqlite::Transaction,
  name: &str,
  f: impl FnOnce(&Savepoint) -> rusqlite::Result<T>,
) -> rusqlite::Result<T> {
  let savepoint = transaction.savepoint_with_name(name)?;
  let value = f(&savepoint)?;
  savepoint.commit()?;
  Ok(value)
}

fn id(ids: &BTreeMap<Txid, i64>, txid: Txid) -> rusqlite::Result<i64> {
  ids.get(&txid).copied().ok_or(rusqlite::Error::QueryReturnedNoRows)
}

fn insert_block(connection: &Connection, block: &BlockEntry) -> rusqlite::Result<i64> {
  let parent_id = connection
    .query_row(
      "SELECT block_id FROM blocks WHERE hash = ?1",
      params![block.parent.store()],
      |row| row.get::<_, i64>(0),
    )
    .optional()?;

  connection.execute(
    "INSERT OR IGNORE INTO blocks (hash, height, parent_hash, parent_id) VALUES (?1, ?2, ?3, ?4)",
    params![block.hash.store(), block.height, block.parent.store(), parent_id],
  )?;

  connection.query_row(
    "SELECT block_id FROM blocks WHERE hash = ?1",
    params![block.hash.store()],
    |row| row.get(0),
  )
}

fn insert_transaction(connection: &Connection, entry: &TransactionEntry) -> rusqlite::Result<i64> {
  connection.execute(
    "INSERT INTO transactions (hash, body, proof) VALUES (?1, ?2, ?3)
     ON CONFLICT (hash) DO UPDATE SET
       body = COALESCE(transactions.body, excluded.body),
       proof = COALESCE(transactions.proof, excluded.proof)",
    params![entry.txid.store(), entry.body, entry.proof],
  )?;

  connection.query_row(
    "SELECT transaction_id FROM transactions WHERE hash = ?1",
    params![entry.txid.store()],
    |row| row.get(0),
  )
}

fn insert_name(connection: &Connection, name: &str) -> rusqlite::Result<i64> {
  connection.execute("INSERT OR IGNORE INTO names (name) VALUES (?1)", params![name])?;

  connection.query_row(
    "SELECT name_id FROM names WHERE name = ?1",
    params![name],
    |row| row.get(0),
  )
}

fn insert_payload(connection: &Connection, payload: &PayloadEntry) -> rusqlite::Result<i64> {
  connection.execute(
    "INSERT OR IGNORE INTO payloads (type, data, address) VALUES (?1, ?2, ?3)",
    params![payload.tag, payload.data, payload.address],
  )?;

  connection.query_row(
    "SELECT payload_id FROM payloads WHERE type = ?1 AND data = ?2",
    params![payload.tag, payload.data],
    |row| row.get(0),
  )
}

fn insert_account(
  connection: &Connection,
  account: &AccountEntry,
  transaction_id: i64,
  name_id: i64,
) -> rusqlite::Result<i64> {
  connection.execute(
    "INSERT OR IGNORE INTO accounts
       (transaction_id, name_id, number, collision_hash, emoji, collision_count, collision_length)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    params![
      transaction_id,
      name_id,
      account.number,
      account.identity.collision_hash.as_str(),
      account.identity.emoji,
      account.collision.count,
      account.collision.length,
    ],
  )?;

  connection.query_row(
    "SELECT account_id FROM accounts WHERE transaction_id = ?1",
    params![transaction_id],
    |row| row.get(0),
  )
}

#[cfg(test)]
mod tests {
  use {super::*, cashaccount::CollisionHash};

  fn connection() -> Connection {
    let mut connection = Connection::open_in_memory().unwrap();
    schema::initialize(&mut connection, Chain::BitcoincashRegtest).unwrap();
    connection
  }

  fn txid(n: u8) -> Txid {
    Txid::from_byte_array([n; 32])
  }

  fn entries(height: u32) -> BlockEntries {
    BlockEntries {
      block: BlockEntry {
        hash: BlockHash::from_byte_array([height as u8; 32]),
        height,
        parent: BlockHash::from_byte_array([height as u8 - 1; 32]),
      },
      transactions: vec![
        TransactionEntry {
          txid: txid(1),
          body: None,
          proof: None,
        },
        TransactionEntry {
          txid: txid(2),
          body: None,
          proof: None,
        },
      ],
      rejections: vec![
        RejectionEntry {
          txid: txid(1),
          flaw: Flaw::InvalidPayloadLength,
        },
        RejectionEntry {
          txid: txid(2),
          flaw: Flaw::InvalidName,
        },
      ],
      accounts: vec![AccountEntry {
        txid: txid(1),
        name: "alice".into(),
        number: height,
        identity: Identity {
          collision_hash: "1234567890".parse::<CollisionHash>().unwrap(),
          emoji: 128123,
        },
        collision: Collision::default(),
        payloads: vec![PayloadEntry {
          tag: 1,
          data: vec![0; 20],
          address: Some("bchreg:foo".into()),
        }],
      }],
    }
  }

  fn count(connection: &Connection, table: &str) -> i64 {
    connection
      .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
      .unwrap()
  }

  #[test]
  fn persist_writes_every_entity() {
    let mut connection = connection();
    persist(&mut connection, &entries(101)).unwrap();

    assert_eq!(count(&connection, "blocks"), 1);
    assert_eq!(count(&connection, "transactions"), 2);
    assert_eq!(count(&connection, "block_transactions"), 2);
    assert_eq!(count(&connection, "registration_rejections"), 2);
    assert_eq!(count(&connection, "names"), 1);
    assert_eq!(count(&connection, "payloads"), 1);
    assert_eq!(count(&connection, "accounts"), 1);
    assert_eq!(count(&connection, "account_payloads"), 1);

    assert_eq!(
      connection
        .query_row(
          "SELECT chain_tip_height, chain_tip_hash FROM service_status",
          [],
          |row| Ok((row.get::<_, u32>(0)?, row.get::<_, Vec<u8>>(1)?)),
        )
        .unwrap(),
      (101, vec![101; 32]),
    );
  }

  #[test]
  fn persisting_twice_does_not_duplicate() {
    let mut connection = connection();
    persist(&mut connection, &entries(101)).unwrap();
    persist(&mut connection, &entries(101)).unwrap();

    assert_eq!(count(&connection, "blocks"), 1);
    assert_eq!(count(&connection, "transactions"), 2);
    assert_eq!(count(&connection, "registration_rejections"), 2);
    assert_eq!(count(&connection, "accounts"), 1);
    assert_eq!(count(&connection, "account_payloads"), 1);
  }

  #[test]
  fn blocks_link_to_stored_parent() {
    let mut connection = connection();
    persist(&mut connection, &entries(101)).unwrap();

    let mut next = entries(102);
    next.transactions.clear();
    next.rejections.clear();
    next.accounts.clear();
    persist(&mut connection, &next).unwrap();

    assert_eq!(
      connection
        .query_row(
          "SELECT parent.height FROM blocks child JOIN blocks parent ON child.parent_id = parent.block_id",
          [],
          |row| row.get::<_, u32>(0),
        )
        .unwrap(),
      101
    );
  }

  #[test]
  fn names_are_reused_case_insensitively() {
    let mut connection = connection();
    persist(&mut connection, &entries(101)).unwrap();

    let mut next = entries(102);
    next.transactions = vec![TransactionEntry {
      txid: txid(3),
      body: None,
      proof: None,
    }];
    next.rejections.clear();
    next.accounts[0].txid = txid(3);
    next.accounts[0].name = "ALICE".into();
    persist(&mut connection, &next).unwrap();

    assert_eq!(count(&connection, "names"), 1);
    assert_eq!(count(&connection, "accounts"), 2);
    assert_eq!(count(&connection, "payloads"), 1);
    assert_eq!(count(&connection, "account_payloads"), 2);
  }

  #[test]
  fn failed_block_leaves_no_trace() {
    let mut connection = connection();

    let mut broken = entries(101);
    broken.accounts[0].txid = txid(9);

    assert!(persist(&mut connection, &broken).is_err());

    assert_eq!(count(&connection, "blocks"), 0);
    assert_eq!(count(&connection, "transactions"), 0);
    assert_eq!(count(&connection, "names"), 0);

    assert_eq!(
      connection
        .query_row("SELECT chain_tip_height FROM service_status", [], |row| row
          .get::<_, u32>(0))
        .unwrap(),
      99
    );
  }

  #[test]
  fn full_storage_fills_in_body_and_proof() {
    let mut connection = connection();
    persist(&mut connection, &entries(101)).unwrap();

    let mut full = entries(101);
    full.transactions[0].body = Some(vec![1, 2, 3]);
    full.transactions[0].proof = Some(vec![4, 5]);
    persist(&mut connection, &full).unwrap();

    assert_eq!(
      connection
        .query_row(
          "SELECT body, proof FROM transactions WHERE hash = ?1",
          params![txid(1).store()],
          |row| Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, Vec<u8>>(1)?)),
        )
        .unwrap(),
      (vec![1, 2, 3], vec![4, 5])
    );
  }
}
