#![no_main]

use {
  bitcoin::{Transaction, consensus::deserialize},
  cashaccount::{Artifact, Registration},
  libfuzzer_sys::fuzz_target,
};

fuzz_target!(|input: &[u8]| {
  let Ok(transaction) = deserialize::<Transaction>(input) else {
    return;
  };

  if let Some(Artifact::Registration(registration)) = Registration::decipher(&transaction) {
    for payload in &registration.payloads {
      payload.address("bitcoincash");
    }

    registration.encipher();
  }
});
