#![no_main]

use {cashaccount::script, libfuzzer_sys::fuzz_target};

fuzz_target!(|input: &[u8]| {
  let Ok(segments) = script::decode(input) else {
    return;
  };

  let mut encoded = Vec::new();

  for segment in &segments {
    script::push(&mut encoded, segment);
  }

  assert_eq!(script::decode(&encoded).unwrap(), segments);
});
