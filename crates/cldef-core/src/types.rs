use std::fmt;

use serde::{Deserialize, Serialize};

/// Contact metadata for the issuer that owns a credential definition.
///
/// Carried opaquely: never parsed, resolved, or fed into any key
/// computation. Reaching the issuer is the networking layer's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssuerEndpoint {
    /// Host name or IP address, as supplied.
    pub address: String,
    /// Port, as supplied.
    pub port: u16,
}

impl IssuerEndpoint {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }
}

impl fmt::Display for IssuerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_display() {
        let ep = IssuerEndpoint::new("10.0.0.4", 7000);
        assert_eq!(ep.to_string(), "10.0.0.4:7000");
    }

    #[test]
    fn test_endpoint_is_not_validated() {
        let ep = IssuerEndpoint::new("not a host name!", 0);
        assert_eq!(ep.address, "not a host name!");
        assert_eq!(ep.port, 0);
    }

    #[test]
    fn test_endpoint_serde_roundtrip() {
        let ep = IssuerEndpoint::new("faber.example", 5555);
        let json = serde_json::to_string(&ep).unwrap();
        assert_eq!(json, r#"{"address":"faber.example","port":5555}"#);
        let back: IssuerEndpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ep);
    }
}
