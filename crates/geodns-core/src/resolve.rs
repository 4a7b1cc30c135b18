//! Address inference for pool members
//!
//! Works out a hostname and/or IP for a member from its attribute snapshot.
//! The hostname attribute is preferred; the root-URL host is a fallback. The
//! IP comes only from the direct address attribute.

use std::net::IpAddr;

use tracing::warn;
use url::Url;

use crate::traits::Member;

/// Hostname/IP pair inferred from a member's attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAddress {
    pub hostname: Option<String>,
    pub ip: Option<IpAddr>,
}

/// Infer a member's hostname and IP from its attribute snapshot
///
/// Pure apart from logging. `already_flagged` is true when the member has an
/// outstanding geo-info complaint; the URL-fallback and port warnings are
/// skipped then so an unchanged condition does not log every poll.
///
/// Note the inferred "hostname" may in fact be an IP literal if that is what
/// the attributes carry; callers must not assume it parses as a name.
pub fn resolve_address(member: &Member, already_flagged: bool) -> ResolvedAddress {
    let mut hostname = member.hostname.clone();

    if let Some(url) = &member.root_url {
        match Url::parse(url) {
            Ok(parsed) => {
                if hostname.is_none() {
                    if !already_flagged {
                        warn!(
                            "using URL {} to redirect to {} (hostname attribute is preferred, but not available)",
                            url, member.id
                        );
                    }
                    hostname = parsed.host_str().map(|h| h.to_string());
                }

                // Url::port() is None for scheme defaults, so any explicit
                // port here survived into the URL on purpose.
                if let Some(port) = parsed.port()
                    && port != 80
                    && port != 443
                    && !already_flagged
                {
                    warn!(
                        "detected non-standard port in URL {} for {}; forwarding may not work",
                        url, member.id
                    );
                }
            }
            Err(_) => {
                warn!("invalid URL {} for member {}", url, member.id);
            }
        }
    }

    ResolvedAddress {
        hostname,
        ip: member.address,
    }
}
