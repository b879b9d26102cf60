use std::net::IpAddr;

use crate::error::SelfAddressError;

/// Resolve this host's name to its single routable address.
pub async fn find_my_addr() -> Result<String, SelfAddressError> {
    let host = hostname::get()
        .map_err(SelfAddressError::Hostname)?
        .to_string_lossy()
        .into_owned();

    let resolved = tokio::net::lookup_host((host.as_str(), 0))
        .await
        .map_err(|source| SelfAddressError::Lookup {
            host: host.clone(),
            source,
        })?;

    let mut addrs: Vec<IpAddr> = Vec::new();
    for sa in resolved {
        if !addrs.contains(&sa.ip()) {
            addrs.push(sa.ip());
        }
    }
    pick_self_addr(&host, addrs)
}

/// `http://{self}:{port}`, the URL this process serves cache peering on.
pub async fn find_my_url(port: u16) -> Result<String, SelfAddressError> {
    let addr = find_my_addr().await?;
    Ok(format!("http://{}", host_port(&addr, port)))
}

/// Exactly one address is success; several is ambiguous (first kept), none is an error.
pub fn pick_self_addr(host: &str, addrs: Vec<IpAddr>) -> Result<String, SelfAddressError> {
    match addrs.as_slice() {
        [] => Err(SelfAddressError::NotFound {
            host: host.to_string(),
        }),
        [only] => Ok(only.to_string()),
        [first, ..] => Err(SelfAddressError::Ambiguous {
            host: host.to_string(),
            addr: first.to_string(),
            all: addrs.clone(),
        }),
    }
}

/// `addr:port`, bracketing IPv6 literals.
pub(crate) fn host_port(addr: &str, port: u16) -> String {
    match addr.parse::<IpAddr>() {
        Ok(IpAddr::V6(_)) => format!("[{addr}]:{port}"),
        _ => format!("{addr}:{port}"),
    }
}
