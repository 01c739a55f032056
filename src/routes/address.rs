// IPv4 address value used by the route table

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::AppError;

/// A dotted-quad IPv4 address as shown and accepted by the router UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpAddress(Ipv4Addr);

impl IpAddress {
    pub fn octets(&self) -> [u8; 4] {
        self.0.octets()
    }
}

impl FromStr for IpAddress {
    type Err = AppError;

    /// Table cells carry layout whitespace, so the text is trimmed first.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Ipv4Addr>()
            .map(IpAddress)
            .map_err(|_| AppError::InvalidAddress(s.to_string()))
    }
}

impl From<[u8; 4]> for IpAddress {
    fn from(octets: [u8; 4]) -> Self {
        IpAddress(Ipv4Addr::from(octets))
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
