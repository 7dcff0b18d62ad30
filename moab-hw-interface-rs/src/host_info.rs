//! Facts about the host shown on the hat's info screen.

use std::env;
use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use anyhow::{bail, Context, Result};
use moab_hat::Version;

/// Environment variable carrying the installed software image version.
pub const VERSION_ENV: &str = "MOABIAN";

/// Reported when [`VERSION_ENV`] is unset.
pub const DEFAULT_VERSION: Version = Version::new(1, 0, 0);

/// Software version of the host image.
pub fn software_version() -> Result<Version> {
    match env::var(VERSION_ENV) {
        Ok(raw) => parse_version(&raw),
        Err(env::VarError::NotPresent) => Ok(DEFAULT_VERSION),
        Err(e) => Err(e).context(VERSION_ENV),
    }
}

fn parse_version(raw: &str) -> Result<Version> {
    raw.parse()
        .with_context(|| format!("{VERSION_ENV}={raw:?} is not a version"))
}

/// IPv4 address of the interface carrying the default route.
///
/// Connecting a UDP socket sends nothing; it only makes the kernel pick
/// the outgoing interface, whose address is then read back.
pub fn local_ipv4() -> Result<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).context("binding UDP socket")?;
    socket
        .connect((Ipv4Addr::new(1, 1, 1, 1), 1))
        .context("no route to the network")?;
    match socket.local_addr().context("reading local address")?.ip() {
        IpAddr::V4(ip) => Ok(ip),
        IpAddr::V6(ip) => bail!("expected an IPv4 address, got {ip}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_is_parsed() {
        assert_eq!(parse_version("2.3.4").unwrap(), Version::new(2, 3, 4));
        assert!(parse_version("dev").is_err());
    }

    #[test]
    fn default_version_is_one_zero_zero() {
        assert_eq!(DEFAULT_VERSION.to_string(), "1.0.0");
    }
}
