// Routes module - static route entity, table scraping and reconciliation

pub mod address;
pub mod parser;
pub mod reconcile;

use std::fmt;

use crate::error::{AppError, AppResult};
pub use address::IpAddress;

/// Page the router expects as the origin of a route submission
const ROUTE_FORM_PAGE: &str = "/net/new_static_route.lua";

/// One entry of the router's static IPv4 route table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    index: Option<usize>,
    network: IpAddress,
    subnet_mask: IpAddress,
    gateway: IpAddress,
    is_active: bool,
}

impl Route {
    /// Build a route from textual addresses.
    ///
    /// `index` is `None` for a route the user asked for that has not yet been
    /// placed in the table.
    pub fn new(
        index: Option<usize>,
        network: &str,
        subnet_mask: &str,
        gateway: &str,
        is_active: bool,
    ) -> AppResult<Self> {
        Ok(Route::from_addresses(
            index,
            network.parse()?,
            subnet_mask.parse()?,
            gateway.parse()?,
            is_active,
        ))
    }

    pub fn from_addresses(
        index: Option<usize>,
        network: IpAddress,
        subnet_mask: IpAddress,
        gateway: IpAddress,
        is_active: bool,
    ) -> Self {
        Route {
            index,
            network,
            subnet_mask,
            gateway,
            is_active,
        }
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn network(&self) -> IpAddress {
        self.network
    }

    pub fn subnet_mask(&self) -> IpAddress {
        self.subnet_mask
    }

    pub fn gateway(&self) -> IpAddress {
        self.gateway
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn set_active(&mut self, is_active: bool) {
        self.is_active = is_active;
    }

    /// True when both routes describe the same network, mask and gateway.
    /// Table slot and active flag are not part of a route's identity.
    pub fn has_same_parameters(&self, other: &Route) -> bool {
        self.network == other.network
            && self.subnet_mask == other.subnet_mask
            && self.gateway == other.gateway
    }

    /// Form fields of the router's "new static route" dialog, in submission order.
    ///
    /// The router silently ignores submissions that deviate from this layout,
    /// so field names and sentinel values must not change.
    pub fn form_fields(&self) -> AppResult<Vec<(String, String)>> {
        let index = self.index.ok_or_else(|| {
            AppError::Protocol(format!("route {} has no table slot assigned", self))
        })?;

        let mut fields = Vec::with_capacity(22);
        push_octets(&mut fields, "ip", self.network);
        push_octets(&mut fields, "mask", self.subnet_mask);
        push_octets(&mut fields, "gw", self.gateway);
        if self.is_active {
            fields.push(("route_activ".to_string(), "on".to_string()));
        }
        fields.push(("route".to_string(), format!("route{}", index)));

        let sentinels = [
            ("oldpage", ROUTE_FORM_PAGE),
            ("apply", ""),
            ("myXhr", "1"),
            ("xhr", "1"),
            ("useajax", "1"),
            ("lang", "de"),
            ("no_sidrenew", ""),
        ];
        fields.extend(
            sentinels
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string())),
        );

        Ok(fields)
    }
}

fn push_octets(fields: &mut Vec<(String, String)>, prefix: &str, address: IpAddress) {
    for (i, octet) in address.octets().iter().enumerate() {
        fields.push((format!("{}{}", prefix, i), octet.to_string()));
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "Route{}", index)?,
            None => write!(f, "Route?")?,
        }
        write!(
            f,
            " Network: {}, Subnetmask: {}, Gateway: {}, Active: {}",
            self.network, self.subnet_mask, self.gateway, self.is_active
        )
    }
}
