//! Dial target construction
//!
//! Turns what the user typed into a `sip:user@domain` URI.

/// Leftover of a concatenation with a missing domain
const UNDEFINED_DOMAIN: &str = "@undefined";

/// Normalize raw dialer input against the default domain.
///
/// The scheme is checked before the domain, so `alice@example.com` keeps its
/// domain and `alice` gets `default_domain`.
pub fn normalize_target(raw: &str, default_domain: &str) -> String {
    let mut uri = raw.to_string();

    if !uri.contains("sip:") {
        uri = format!("sip:{}", uri);
    }
    if !uri.contains('@') {
        uri = format!("{}@{}", uri, default_domain);
    }

    strip_undefined_domain(uri, default_domain)
}

fn strip_undefined_domain(uri: String, domain: &str) -> String {
    if uri.contains(UNDEFINED_DOMAIN) {
        format!("{}@{}", uri.replacen(UNDEFINED_DOMAIN, "", 1), domain)
    } else {
        uri
    }
}

/// User part of raw input: scheme and any domain are dropped
pub fn local_part(raw: &str) -> &str {
    let without_scheme = raw.strip_prefix("sip:").unwrap_or(raw);
    without_scheme
        .split_once('@')
        .map(|(user, _)| user)
        .unwrap_or(without_scheme)
}

/// A VRS dial target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VrsTarget {
    /// First-pass construction, this is what gets dialed
    pub submitted: String,
    /// Result after the `@undefined` cleanup
    pub normalized: String,
}

impl VrsTarget {
    /// Whether the cleanup changed the first-pass URI
    pub fn diverges(&self) -> bool {
        self.submitted != self.normalized
    }
}

/// Build a VRS target: the local part of the input at the VRS domain
pub fn vrs_target(raw: &str, vrs_domain: &str) -> VrsTarget {
    let submitted = format!("sip:{}@{}", local_part(raw), vrs_domain);

    let mut uri = submitted.clone();
    if !uri.contains("sip:") {
        uri = format!("sip:{}", uri);
    }
    let normalized = strip_undefined_domain(uri, vrs_domain);

    VrsTarget {
        submitted,
        normalized,
    }
}

/// What the user asked to dial
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialRequest {
    /// Regular call, the default domain fills in a missing one
    Direct(String),
    /// Call through the VRS domain
    Vrs(String),
}

impl DialRequest {
    pub fn raw(&self) -> &str {
        match self {
            DialRequest::Direct(raw) | DialRequest::Vrs(raw) => raw,
        }
    }

    /// URI handed to the agent
    pub fn target(&self, default_domain: &str, vrs_domain: &str) -> String {
        match self {
            DialRequest::Direct(raw) => normalize_target(raw, default_domain),
            DialRequest::Vrs(raw) => {
                let target = vrs_target(raw, vrs_domain);
                if target.diverges() {
                    tracing::warn!(
                        "VRS target cleanup produced {} but dialing {}",
                        target.normalized,
                        target.submitted
                    );
                }
                target.submitted
            }
        }
    }
}
