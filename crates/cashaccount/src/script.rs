//! Push-data segments of a registration script.
//!
//! A registration tail is a run of data pushes. Each push starts with an
//! opcode that either is the length itself (`0..=75`) or announces a one, two
//! or four byte big-endian length field (`OP_PUSHDATA1`, `OP_PUSHDATA2`,
//! `OP_PUSHDATA4`). Any other opcode carries no data and is skipped.

use super::*;

const PUSHDATA1: u8 = 76;
const PUSHDATA2: u8 = 77;
const PUSHDATA4: u8 = 78;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
#[error("push of {length} bytes at offset {offset} overruns script with {remaining} bytes left")]
pub struct MalformedScript {
  pub offset: usize,
  pub length: usize,
  pub remaining: usize,
}

/// Split `script` into its pushed segments, in order.
///
/// Empty pushes are dropped. Decoding stops once fewer than two bytes remain,
/// so a single trailing byte is ignored.
pub fn decode(script: &[u8]) -> Result<Vec<Vec<u8>>, MalformedScript> {
  let mut segments = Vec::new();
  let mut offset = 0;

  while script.len() - offset > 1 {
    let opcode = script[offset];
    let remaining = &script[offset + 1..];

    let (control, length) = match opcode {
      0..=75 => (0, usize::from(opcode)),
      PUSHDATA1 => (1, usize::from(remaining[0])),
      PUSHDATA2 => (2, length_field(remaining, 2, offset, BigEndian::read_u16)?),
      PUSHDATA4 => (4, length_field(remaining, 4, offset, BigEndian::read_u32)?),
      _ => (0, 0),
    };

    let start = offset + 1 + control;

    if length > script.len() - start {
      return Err(MalformedScript {
        offset,
        length,
        remaining: script.len() - start,
      });
    }

    if length > 0 {
      segments.push(script[start..start + length].to_vec());
    }

    offset = start + length;
  }

  Ok(segments)
}

fn length_field<T: Into<u64>>(
  remaining: &[u8],
  width: usize,
  offset: usize,
  read: fn(&[u8]) -> T,
) -> Result<usize, MalformedScript> {
  if remaining.len() < width {
    return Err(MalformedScript {
      offset,
      length: width,
      remaining: remaining.len(),
    });
  }

  let length = read(&remaining[..width]).into();

  usize::try_from(length).map_err(|_| MalformedScript {
    offset,
    length: usize::MAX,
    remaining: remaining.len() - width,
  })
}

/// Append `data` to `script` using the smallest push form that fits.
pub fn push(script: &mut Vec<u8>, data: &[u8]) {
  let length = data.len();

  if length <= 75 {
    script.push(length as u8);
  } else if let Ok(length) = u8::try_from(length) {
    script.push(PUSHDATA1);
    script.push(length);
  } else if let Ok(length) = u16::try_from(length) {
    script.push(PUSHDATA2);
    script.extend_from_slice(&length.to_be_bytes());
  } else {
    script.push(PUSHDATA4);
    script.extend_from_slice(&(length as u32).to_be_bytes());
  }

  script.extend_from_slice(data);
}
