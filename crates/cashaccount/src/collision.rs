use super::*;

/// How much of a collision hash is needed to tell an account apart from the
/// others registered under the same name in the same block.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct Collision {
  pub count: u32,
  pub length: u8,
}

/// Accounts of one block, grouped by lowercase name then collision hash.
#[derive(Debug, Default)]
pub struct CollisionTable {
  names: BTreeMap<String, BTreeMap<CollisionHash, u32>>,
}

impl CollisionTable {
  pub fn insert(&mut self, name: &str, hash: &CollisionHash) {
    *self
      .names
      .entry(name.to_lowercase())
      .or_default()
      .entry(hash.clone())
      .or_default() += 1;
  }

  /// Collision metadata for the account `hash` registered as `name`.
  ///
  /// An account alone under its name gets zero count and length. Otherwise
  /// the length is the shortest prefix of `hash` not shared with any other
  /// account of the group, capped at the full hash when two accounts have
  /// identical hashes.
  pub fn collision(&self, name: &str, hash: &CollisionHash) -> Collision {
    let Some(group) = self.names.get(&name.to_lowercase()) else {
      return Collision::default();
    };

    let count = group.values().sum::<u32>();

    if count <= 1 {
      return Collision::default();
    }

    let shared = group
      .iter()
      .filter_map(|(other, &accounts)| {
        if other == hash {
          (accounts > 1).then_some(CollisionHash::LENGTH)
        } else {
          Some(hash.common_prefix(other))
        }
      })
      .max()
      .unwrap_or_default();

    Collision {
      count,
      length: (shared + 1).min(CollisionHash::LENGTH) as u8,
    }
  }

  /// Names with at least two accounts whose collision hashes are identical.
  pub fn full_collisions(&self) -> impl Iterator<Item = (&str, &CollisionHash)> {
    self.names.iter().flat_map(|(name, group)| {
      group
        .iter()
        .filter(|(_, accounts)| **accounts > 1)
        .map(move |(hash, _)| (name.as_str(), hash))
    })
  }
}
