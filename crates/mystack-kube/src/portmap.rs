//! Port map parsing

use crate::error::{KubeError, Result};

/// Published/container port pair for one exposed port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMap {
    /// Published port
    pub port: i32,

    /// Container port, equal to `port` when the declaration gives one value
    pub target_port: i32,
}

impl PortMap {
    /// Parse a port declaration, either `"N"` or `"N:M"` (published:container).
    ///
    /// Anything else is rejected as fatal; a bad port string is never retried.
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || KubeError::InvalidPortMapping {
            value: value.to_string(),
        };

        match value.split_once(':') {
            None => {
                let port = value.trim().parse::<i32>().map_err(|_| invalid())?;
                Ok(PortMap {
                    port,
                    target_port: port,
                })
            }
            Some((published, container)) => {
                let port = published.trim().parse::<i32>().map_err(|_| invalid())?;
                let target_port = container.trim().parse::<i32>().map_err(|_| invalid())?;
                Ok(PortMap { port, target_port })
            }
        }
    }

    /// Parse every declaration of a workload, failing fast on the first bad one.
    pub fn parse_all(values: &[String]) -> Result<Vec<PortMap>> {
        values.iter().map(|v| PortMap::parse(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_value_publishes_same_port() {
        assert_eq!(
            PortMap::parse("5000").unwrap(),
            PortMap {
                port: 5000,
                target_port: 5000
            }
        );
    }

    #[test]
    fn pair_maps_published_to_container() {
        assert_eq!(
            PortMap::parse("5001:5002").unwrap(),
            PortMap {
                port: 5001,
                target_port: 5002
            }
        );
    }

    #[test]
    fn malformed_values_are_rejected() {
        for value in ["", "abc", "80:http", "1:2:3", "5000:"] {
            let err = PortMap::parse(value).unwrap_err();
            assert!(
                matches!(err, KubeError::InvalidPortMapping { .. }),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn parse_all_fails_on_first_bad_entry() {
        let values = vec!["5000".to_string(), "nope".to_string()];
        assert!(PortMap::parse_all(&values).is_err());

        let values = vec!["5000".to_string(), "5001:5002".to_string()];
        assert_eq!(PortMap::parse_all(&values).unwrap().len(), 2);
    }
}
