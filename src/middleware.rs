use std::{convert::Infallible, net::SocketAddr};

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Caller address resolved by [`add_ip_to_context`]. Empty when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientIp(pub String);

/// Resolve the caller address and store it as a [`ClientIp`] extension.
pub async fn add_ip_to_context(mut req: Request, next: Next) -> Response {
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default();

    let ip = client_ip(req.headers(), &remote);
    debug!(ip = %ip, "client ip");
    req.extensions_mut().insert(ClientIp(ip));
    next.run(req).await
}

pub fn client_ip(headers: &HeaderMap, remote_addr: &str) -> String {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    match split_host_port(remote_addr) {
        Some(host) => host.to_string(),
        None => remote_addr.to_string(),
    }
}

/// `"host:port"` or `"[v6]:port"` to host; `None` when there is no port.
fn split_host_port(addr: &str) -> Option<&str> {
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        return tail.starts_with(':').then_some(host);
    }
    let (host, _port) = addr.rsplit_once(':')?;
    // a bare IPv6 address has colons but no port
    if host.contains(':') {
        return None;
    }
    Some(host)
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<ClientIp>().cloned().unwrap_or_default())
    }
}
