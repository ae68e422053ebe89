//! TLS trust policy.
//!
//! The engine never performs a handshake itself. It only decides whether the
//! prerequisites for a trustworthy handshake are in place and hands the
//! resulting [`TlsConfig`] to [`Transport::connect`](super::Transport::connect).

/// Unix times at or before this instant (2020-09-13) are treated as "clock not
/// set"; certificate validity checks against such a time are meaningless.
pub const MIN_VALID_UNIX_TIME: u64 = 1_600_000_000;

/// How the transport should authenticate the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trust {
    /// Verify the peer chain against this PEM-encoded CA certificate.
    ///
    /// Requires a valid wall-clock time (see [`MIN_VALID_UNIX_TIME`]).
    CaCertificate(&'static str),
    /// Skip certificate verification entirely.
    ///
    /// Encrypts traffic but does not authenticate the server. Meant for
    /// bring-up and testing.
    Insecure,
}

/// Which TLS prerequisite is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prerequisite {
    /// No trust policy configured, or an empty CA certificate.
    TrustAnchor,
    /// Certificate verification requested but no valid Unix time set.
    Time,
}

impl Trust {
    /// Checks that this policy can be honoured with the given Unix time.
    pub fn check(&self, unix_time: Option<u64>) -> Result<(), Prerequisite> {
        match self {
            Trust::Insecure => Ok(()),
            Trust::CaCertificate(pem) if pem.trim().is_empty() => Err(Prerequisite::TrustAnchor),
            Trust::CaCertificate(_) => match unix_time {
                Some(_) => Ok(()),
                None => Err(Prerequisite::Time),
            },
        }
    }

    /// Whether the peer certificate will be verified.
    pub fn verifies_peer(&self) -> bool {
        matches!(self, Trust::CaCertificate(_))
    }
}

/// Settings handed to the transport for one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlsConfig {
    /// Peer authentication policy.
    pub trust: Trust,
    /// Current Unix time in seconds, for certificate validity checks.
    pub unix_time: Option<u64>,
    /// Coarse bound on the TCP connect plus TLS handshake, in milliseconds.
    pub handshake_timeout_ms: u32,
}

/// Filters out Unix times too early to be a synchronised clock.
pub(crate) fn valid_unix_time(epoch: u64) -> Option<u64> {
    (epoch > MIN_VALID_UNIX_TIME).then_some(epoch)
}

#[cfg(feature = "defmt")]
impl defmt::Format for Prerequisite {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Prerequisite::TrustAnchor => defmt::write!(f, "TrustAnchor"),
            Prerequisite::Time => defmt::write!(f, "Time"),
        }
    }
}
