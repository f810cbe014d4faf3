//! Severity policy: which finding severities block the pipeline.

use crate::models::report::Severity;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Set of severities that cause a block decision. Membership only; there is
/// no threshold semantics and display ordering plays no role here.
pub struct SeverityPolicy {
    pub block_on: BTreeSet<Severity>,
}

impl Default for SeverityPolicy {
    fn default() -> Self {
        SeverityPolicy {
            block_on: [Severity::High, Severity::Medium].into_iter().collect(),
        }
    }
}

impl SeverityPolicy {
    pub fn new<I: IntoIterator<Item = Severity>>(severities: I) -> Self {
        SeverityPolicy {
            block_on: severities.into_iter().collect(),
        }
    }

    pub fn blocks(&self, severity: Severity) -> bool {
        self.block_on.contains(&severity)
    }

    /// Parse a list of severity names (e.g. from CLI or solgate.toml).
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, String> {
        let mut block_on = BTreeSet::new();
        for n in names {
            block_on.insert(n.as_ref().parse::<Severity>()?);
        }
        Ok(SeverityPolicy { block_on })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_blocks_high_and_medium() {
        let pol = SeverityPolicy::default();
        assert!(pol.blocks(Severity::High));
        assert!(pol.blocks(Severity::Medium));
        assert!(!pol.blocks(Severity::Low));
        assert!(!pol.blocks(Severity::Informational));
        assert!(!pol.blocks(Severity::Optimization));
    }

    #[test]
    fn test_from_names_rejects_unknown() {
        assert!(SeverityPolicy::from_names(&["High", "bogus"]).is_err());
        let pol = SeverityPolicy::from_names(&["low"]).unwrap();
        assert!(pol.blocks(Severity::Low));
        assert!(!pol.blocks(Severity::High));
    }
}
