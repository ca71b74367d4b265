//! Host address discovery

use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs};

use tracing::{debug, warn};
use url::Url;

use crate::errors::DeployError;

/// Address other services should use to reach this host.
///
/// Resolves the host name the same way a `gethostbyname(gethostname())` call
/// would, preferring IPv4. Falls back to loopback when the name does not
/// resolve.
pub fn host_address() -> IpAddr {
    let Some(hostname) = sysinfo::System::host_name() else {
        warn!("Unable to determine host name, using loopback");
        return IpAddr::V4(Ipv4Addr::LOCALHOST);
    };

    match resolve(&hostname) {
        Ok(addr) => {
            debug!("Resolved {} to {}", hostname, addr);
            addr
        }
        Err(e) => {
            warn!("{}, using loopback", e);
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

/// First address of `hostname`, IPv4 preferred
pub fn resolve(hostname: &str) -> Result<IpAddr, DeployError> {
    let addrs: Vec<IpAddr> = (hostname, 0)
        .to_socket_addrs()
        .map_err(|e| DeployError::NetworkError(format!("Failed to resolve {}: {}", hostname, e)))?
        .map(|addr| addr.ip())
        .collect();

    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| DeployError::NetworkError(format!("No address for {}", hostname)))
}

/// `http://<ip>:<port><api_path>`
pub fn base_url(ip: IpAddr, port: u16, api_path: &str) -> Result<Url, DeployError> {
    let root = Url::parse(&format!("http://{}/", SocketAddr::new(ip, port)))?;
    Ok(root.join(api_path)?)
}
