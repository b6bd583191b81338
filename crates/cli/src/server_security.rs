use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Why `serve` would not pick a listen address.
#[derive(Debug, Error)]
pub(crate) enum BindError {
    #[error("Failed to resolve bind address {bind}: {source}")]
    Resolve {
        bind: String,
        #[source]
        source: io::Error,
    },

    #[error("Bind address {bind} did not resolve to any socket address")]
    Unresolved { bind: String },

    #[error(
        "Refusing to bind to non-loopback address {bind} without --public. \
         Passwords are stored in plaintext; only expose the server deliberately."
    )]
    NotLoopback { bind: String },
}

/// Listen address chosen for `serve`, plus everything `--bind` resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BindTarget {
    pub addr: SocketAddr,
    pub resolved: Vec<SocketAddr>,
}

impl BindTarget {
    /// Resolve `bind` (host names allowed, e.g. `localhost:5000`) and pick
    /// the address to listen on.
    pub(crate) async fn resolve(bind: &str, public: bool) -> Result<Self, BindError> {
        let resolved: Vec<SocketAddr> = tokio::net::lookup_host(bind)
            .await
            .map_err(|source| BindError::Resolve {
                bind: bind.to_string(),
                source,
            })?
            .collect();
        Self::select(bind, resolved, public)
    }

    /// Without `public` only loopback addresses qualify. A name resolving to
    /// both loopback and routable addresses is served on loopback.
    /// IPv4 is preferred within whichever set qualifies.
    fn select(bind: &str, resolved: Vec<SocketAddr>, public: bool) -> Result<Self, BindError> {
        if resolved.is_empty() {
            return Err(BindError::Unresolved {
                bind: bind.to_string(),
            });
        }

        let candidates: Vec<SocketAddr> = if public {
            resolved.clone()
        } else {
            resolved
                .iter()
                .copied()
                .filter(|addr| addr.ip().is_loopback())
                .collect()
        };

        let addr = candidates
            .iter()
            .copied()
            .find(SocketAddr::is_ipv4)
            .or_else(|| candidates.first().copied())
            .ok_or_else(|| BindError::NotLoopback {
                bind: bind.to_string(),
            })?;

        if !addr.ip().is_loopback() {
            log::warn!("Serving on public address {addr}; credentials are stored in plaintext");
        }
        Ok(Self { addr, resolved })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(raw: &str) -> SocketAddr {
        raw.parse().unwrap()
    }

    #[test]
    fn routable_address_needs_public() {
        let err = BindTarget::select("0.0.0.0:5000", vec![addr("0.0.0.0:5000")], false)
            .unwrap_err();
        assert!(matches!(err, BindError::NotLoopback { .. }));
        assert!(err.to_string().contains("--public"));
        assert!(err.to_string().contains("plaintext"));

        let target =
            BindTarget::select("0.0.0.0:5000", vec![addr("0.0.0.0:5000")], true).unwrap();
        assert_eq!(target.addr, addr("0.0.0.0:5000"));
    }

    #[test]
    fn mixed_resolution_stays_on_loopback_unless_public() {
        let resolved = vec![
            addr("192.168.1.20:5000"),
            addr("[::1]:5000"),
            addr("127.0.0.1:5000"),
        ];

        let private = BindTarget::select("devbox:5000", resolved.clone(), false).unwrap();
        assert_eq!(private.addr, addr("127.0.0.1:5000"));
        assert_eq!(private.resolved.len(), 3);

        let public = BindTarget::select("devbox:5000", resolved, true).unwrap();
        assert_eq!(public.addr, addr("192.168.1.20:5000"));
    }

    #[test]
    fn ipv6_loopback_is_used_when_alone() {
        let target = BindTarget::select("[::1]:5000", vec![addr("[::1]:5000")], false).unwrap();
        assert_eq!(target.addr, addr("[::1]:5000"));
    }

    #[test]
    fn empty_resolution_is_an_error() {
        assert!(matches!(
            BindTarget::select("nowhere:5000", Vec::new(), true),
            Err(BindError::Unresolved { .. })
        ));
    }

    #[tokio::test]
    async fn resolves_literal_loopback() {
        let target = BindTarget::resolve("127.0.0.1:0", false).await.unwrap();
        assert_eq!(target.addr, addr("127.0.0.1:0"));
        assert!(BindTarget::resolve("0.0.0.0:0", false).await.is_err());
    }
}
