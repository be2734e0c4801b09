//! Domain partitions: named catalog subsets.

use floorwise_core::{AppError, AppResult};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

const SOFT_SURFACE: &str = "SoftSurface";
const HARD_SURFACE: &str = "HardSurface";

/// A named catalog subset. Decides the classification constraint, the
/// catalog snapshot and the vector index consulted for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DomainPartition {
    All,
    SoftSurface,
    HardSurface,
}

impl DomainPartition {
    pub const ALL: [DomainPartition; 3] = [
        DomainPartition::All,
        DomainPartition::SoftSurface,
        DomainPartition::HardSurface,
    ];

    /// Parse a partition name. `all-products` is accepted as an alias of `all`.
    pub fn parse(name: &str) -> AppResult<Self> {
        match name.trim() {
            "all" | "all-products" => Ok(DomainPartition::All),
            "soft-surface" => Ok(DomainPartition::SoftSurface),
            "hard-surface" => Ok(DomainPartition::HardSurface),
            other => Err(AppError::InvalidPartition(format!(
                "'{}' (expected one of: all, soft-surface, hard-surface)",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DomainPartition::All => "all",
            DomainPartition::SoftSurface => "soft-surface",
            DomainPartition::HardSurface => "hard-surface",
        }
    }

    /// Default vector index name for this partition.
    pub fn index_name(&self) -> &'static str {
        match self {
            DomainPartition::All => "all-products",
            other => other.as_str(),
        }
    }

    /// Classification labels that scope structured queries to this partition.
    pub fn classifications(&self) -> Vec<String> {
        let labels: &[&str] = match self {
            DomainPartition::All => &[SOFT_SURFACE, HARD_SURFACE],
            DomainPartition::SoftSurface => &[SOFT_SURFACE],
            DomainPartition::HardSurface => &[HARD_SURFACE],
        };
        labels.iter().map(|l| l.to_string()).collect()
    }
}

impl FromStr for DomainPartition {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DomainPartition::parse(s)
    }
}

impl fmt::Display for DomainPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_partitions() {
        assert_eq!(DomainPartition::parse("all").unwrap(), DomainPartition::All);
        assert_eq!(
            DomainPartition::parse("all-products").unwrap(),
            DomainPartition::All
        );
        assert_eq!(
            "soft-surface".parse::<DomainPartition>().unwrap(),
            DomainPartition::SoftSurface
        );
        assert_eq!(
            DomainPartition::parse("hard-surface").unwrap(),
            DomainPartition::HardSurface
        );
    }

    #[test]
    fn test_unknown_partition_rejected() {
        for name in ["", "Soft-Surface", "carpet", "all products"] {
            assert!(matches!(
                DomainPartition::parse(name),
                Err(AppError::InvalidPartition(_))
            ));
        }
    }

    #[test]
    fn test_classifications() {
        assert_eq!(
            DomainPartition::All.classifications(),
            vec!["SoftSurface", "HardSurface"]
        );
        assert_eq!(
            DomainPartition::SoftSurface.classifications(),
            vec!["SoftSurface"]
        );
        assert_eq!(
            DomainPartition::HardSurface.classifications(),
            vec!["HardSurface"]
        );
    }

    #[test]
    fn test_index_names() {
        assert_eq!(DomainPartition::All.index_name(), "all-products");
        assert_eq!(DomainPartition::SoftSurface.index_name(), "soft-surface");
    }
}
