use super::*;

/// Outcome of deciphering a transaction that carries the protocol identifier.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Artifact {
  Registration(Registration),
  Rejection(Flaw),
}

impl Artifact {
  /// Rejection records this artifact produces, in payload order.
  pub fn flaws(&self) -> Vec<Flaw> {
    match self {
      Self::Registration(registration) => registration.flaws.clone(),
      Self::Rejection(flaw) => vec![*flaw],
    }
  }
}
