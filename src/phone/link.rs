//! Invitation links
//!
//! An invitation points back at the app with `?callme=<uri>`; opening it
//! prefills the dialer with that URI.

use url::Url;

/// Query parameter carrying the URI to call
const CALLME_PARAM: &str = "callme";

/// Build `<protocol>//<host><pathname>?callme=<uri>`
pub fn invitation_link(protocol: &str, host: &str, pathname: &str, uri: &str) -> String {
    format!(
        "{}//{}{}?{}={}",
        protocol,
        host,
        pathname,
        CALLME_PARAM,
        urlencoding::encode(uri)
    )
}

/// Extract the `callme` value from a location search string (`?a=b&callme=...`)
pub fn callme_from_query(search: &str) -> Option<String> {
    let query = search.trim_start_matches('?');
    let query = query.split_once('#').map_or(query, |(q, _)| q);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == CALLME_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.trim().is_empty())
}

/// Parts of a page URL the invitation link is built from
#[derive(Debug, Clone, PartialEq)]
pub struct PageLocation {
    /// Scheme with its colon, `https:`
    pub protocol: String,
    pub host: String,
    pub pathname: String,
    /// Query string including the leading `?`, empty when absent
    pub search: String,
}

impl PageLocation {
    /// Split an absolute URL such as `https://host:8080/app/?callme=bob#top`
    pub fn parse(raw: &str) -> Option<Self> {
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Not a page URL {:?}: {}", raw, e);
                return None;
            }
        };
        let host = url.host_str()?;

        Some(Self {
            protocol: format!("{}:", url.scheme()),
            host: match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            },
            pathname: url.path().to_string(),
            search: url.query().map(|q| format!("?{}", q)).unwrap_or_default(),
        })
    }

    /// Location of the page currently loaded in the browser
    #[cfg(target_arch = "wasm32")]
    pub fn current() -> Option<Self> {
        let location = web_sys::window()?.location();
        Some(Self {
            protocol: location.protocol().ok()?,
            host: location.host().ok()?,
            pathname: location.pathname().ok()?,
            search: location.search().ok()?,
        })
    }

    /// Native builds have no page; `SOFTPHONE_PUBLIC_URL` stands in for it
    #[cfg(not(target_arch = "wasm32"))]
    pub fn current() -> Option<Self> {
        let url = std::env::var("SOFTPHONE_PUBLIC_URL").ok()?;
        Self::parse(&url)
    }

    pub fn invitation_link(&self, uri: &str) -> String {
        invitation_link(&self.protocol, &self.host, &self.pathname, uri)
    }

    pub fn callme(&self) -> Option<String> {
        callme_from_query(&self.search)
    }
}
