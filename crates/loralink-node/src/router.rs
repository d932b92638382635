//! Destination address check.

use loralink_frame::Address;

/// Whether an inbound frame should be processed by this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Destination equals the local address.
    ForMe,
    /// Anything else, broadcast included.
    NotForMe,
}

/// Route a frame by exact destination match.
pub fn route(destination: Address, local_address: Address) -> RouteDecision {
    if destination == local_address {
        RouteDecision::ForMe
    } else {
        RouteDecision::NotForMe
    }
}

/// Router bound to this node's address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRouter {
    local_address: Address,
}

impl AddressRouter {
    pub fn new(local_address: Address) -> Self {
        AddressRouter { local_address }
    }

    pub fn local_address(&self) -> Address {
        self.local_address
    }

    pub fn route(&self, destination: Address) -> RouteDecision {
        route(destination, self.local_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loralink_frame::BROADCAST_ADDRESS;

    #[test]
    fn test_exact_match_only() {
        for local in 0..=255u8 {
            let expected = if local == 5 {
                RouteDecision::ForMe
            } else {
                RouteDecision::NotForMe
            };
            assert_eq!(route(5, local), expected);
        }
    }

    #[test]
    fn test_broadcast_not_accepted() {
        let router = AddressRouter::new(1);
        assert_eq!(router.route(BROADCAST_ADDRESS), RouteDecision::NotForMe);
        assert_eq!(router.route(1), RouteDecision::ForMe);
    }
}
