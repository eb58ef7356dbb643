use std::collections::HashSet;
use std::net::IpAddr;

/// Network origins allowed to use an endpoint's internal token.
///
/// Empty by default: no origin is trusted until configured.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrustedOrigins {
    addrs: HashSet<IpAddr>,
    loopback: bool,
    private: bool,
}

impl TrustedOrigins {
    pub fn none() -> Self {
        Self::default()
    }

    /// Trust only the local host.
    pub fn loopback() -> Self {
        Self::default().trust_loopback(true)
    }

    pub fn trust_loopback(mut self, enabled: bool) -> Self {
        self.loopback = enabled;
        self
    }

    /// Trust the RFC 1918 IPv4 ranges.
    pub fn trust_private(mut self, enabled: bool) -> Self {
        self.private = enabled;
        self
    }

    pub fn with_addr(mut self, addr: IpAddr) -> Self {
        self.addrs.insert(canonical(addr));
        self
    }

    pub fn with_addrs(self, addrs: impl IntoIterator<Item = IpAddr>) -> Self {
        addrs.into_iter().fold(self, Self::with_addr)
    }

    pub fn contains(&self, addr: IpAddr) -> bool {
        let addr = canonical(addr);
        if self.addrs.contains(&addr) {
            return true;
        }
        match addr {
            IpAddr::V4(v4) => (self.loopback && v4.is_loopback()) || (self.private && v4.is_private()),
            IpAddr::V6(v6) => self.loopback && v6.is_loopback(),
        }
    }
}

// `::ffff:10.0.0.1` and `10.0.0.1` are the same caller.
fn canonical(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(addr, IpAddr::V4),
        IpAddr::V4(_) => addr,
    }
}
