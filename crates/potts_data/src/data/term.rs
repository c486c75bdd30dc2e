use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector for one additive component of the energy functional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermKind {
    Adhesion,
    Volume,
    Surface,
    Height,
    Persistence,
    Junction,
    Substrate,
}

impl TermKind {
    pub const ALL: [TermKind; 7] = [
        TermKind::Adhesion,
        TermKind::Volume,
        TermKind::Surface,
        TermKind::Height,
        TermKind::Persistence,
        TermKind::Junction,
        TermKind::Substrate,
    ];

    /// Terms that only make sense on a lattice with a z axis.
    #[must_use]
    pub const fn requires_volumetric(self) -> bool {
        matches!(self, TermKind::Height | TermKind::Junction | TermKind::Substrate)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TermKind::Adhesion => "adhesion",
            TermKind::Volume => "volume",
            TermKind::Surface => "surface",
            TermKind::Height => "height",
            TermKind::Persistence => "persistence",
            TermKind::Junction => "junction",
            TermKind::Substrate => "substrate",
        }
    }
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volumetric_terms() {
        let volumetric: Vec<_> = TermKind::ALL
            .iter()
            .filter(|t| t.requires_volumetric())
            .collect();
        assert_eq!(
            volumetric,
            vec![&TermKind::Height, &TermKind::Junction, &TermKind::Substrate]
        );
    }

    #[test]
    fn test_terms_parse_lowercase() {
        #[derive(Deserialize)]
        struct Terms {
            terms: Vec<TermKind>,
        }
        let parsed: Terms = toml::from_str(r#"terms = ["adhesion", "persistence"]"#).unwrap();
        assert_eq!(parsed.terms, vec![TermKind::Adhesion, TermKind::Persistence]);
    }
}
