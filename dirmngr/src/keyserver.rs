//! Keyserver actions: SEARCH, GET, FETCH and PUT over HKP.
//!
//! A session carries an ordered list of keyservers; the actions walk
//! it until one server delivers.  The requests are plain HTTP against
//! the `/pks/` endpoints, built here and carried out by the
//! [`HttpFetcher`] collaborator under the session's timeout.
//!
//! [`HttpFetcher`]: ../backend/trait.HttpFetcher.html

use std::time::Duration;

use log::debug;
use percent_encoding::{percent_encode, NON_ALPHANUMERIC};

use crate::Error;
use crate::Result;
use crate::backend::HttpFetcher;
use crate::uri::Uri;

/// A keyserver configured in a session.
///
/// Keeps the URI as given next to its parsed form; the list is
/// head-inserted, so the most recently added server is tried first.
#[derive(Debug, Clone)]
pub struct KeyserverItem {
    /// The URI as configured.
    pub uri: String,
    /// Its parsed form.
    pub parsed: Uri,
}

impl KeyserverItem {
    /// Parses and wraps a keyserver URI.
    pub fn new(uri: &str) -> Result<Self> {
        let parsed = Uri::parse(uri)?;
        if !parsed.is_http && !parsed.is_https {
            return Err(Error::NotSupported.into());
        }
        Ok(KeyserverItem {
            uri: uri.to_string(),
            parsed,
        })
    }
}

fn encode(raw: &[u8]) -> String {
    percent_encode(raw, NON_ALPHANUMERIC).to_string()
}

fn lookup_url(ks: &KeyserverItem, op: &str, search: &str) -> Result<Uri> {
    Uri::parse(&format!("{}/pks/lookup?op={}&options=mr&search={}",
                        ks.parsed.http_base(), op, search))
}

/// Runs the patterns against each keyserver in turn until one yields
/// data; returns the concatenated responses.
pub fn search(http: &dyn HttpFetcher, keyservers: &[KeyserverItem],
              patterns: &[Vec<u8>], timeout: Duration) -> Result<Vec<u8>> {
    if patterns.is_empty() {
        return Err(Error::InvalidArgument("no pattern".into()).into());
    }

    let mut last_err = None;
    for ks in keyservers {
        debug!("searching {}", ks.uri);
        let mut out = Vec::new();
        let result = (|| -> Result<()> {
            for pattern in patterns {
                let url = lookup_url(ks, "index", &encode(pattern))?;
                out.extend_from_slice(&http.fetch(&url, timeout)?);
            }
            Ok(())
        })();

        match result {
            Ok(()) if !out.is_empty() => return Ok(out),
            Ok(()) => last_err = Some(Error::NoData.into()),
            Err(e) => last_err = Some(e),
        }
    }

    Err(last_err.unwrap_or_else(|| Error::NoData.into()))
}

/// How a GET pattern addresses a key.
enum GetPattern {
    /// A key ID or fingerprint, hex without the `0x` prefix.
    KeyId(String),
    /// An exact-match name, the `=name` form.
    Exact(String),
}

fn classify(pattern: &[u8]) -> Option<GetPattern> {
    let pattern = std::str::from_utf8(pattern).ok()?;
    if let Some(name) = pattern.strip_prefix('=') {
        if name.is_empty() {
            return None;
        }
        return Some(GetPattern::Exact(name.to_string()));
    }

    let hex = pattern.strip_prefix("0x").unwrap_or(pattern);
    if matches!(hex.len(), 8 | 16 | 32 | 40 | 64)
        && hex.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Some(GetPattern::KeyId(hex.to_string()));
    }
    None
}

/// Retrieves the keys addressed by the patterns.
///
/// At least one pattern must name a key: a key ID, a fingerprint, or
/// the exact-match `=name` form; free-text patterns are ignored.
/// Each key is fetched from the first keyserver that delivers it; the
/// key blocks are concatenated.
pub fn get(http: &dyn HttpFetcher, keyservers: &[KeyserverItem],
           patterns: &[Vec<u8>], timeout: Duration) -> Result<Vec<u8>> {
    let classified: Vec<_> = patterns.iter()
        .filter_map(|p| {
            let class = classify(p);
            if class.is_none() {
                debug!("ignoring pattern {:?}, not a key address",
                       String::from_utf8_lossy(p));
            }
            class
        })
        .collect();
    if classified.is_empty() {
        return Err(Error::InvalidArgument(
            "GET requires key IDs, fingerprints, or =name patterns"
                .into()).into());
    }

    let mut out = Vec::new();
    let mut last_err = None;
    for pattern in &classified {
        let mut got = false;
        for ks in keyservers {
            let url = match pattern {
                GetPattern::KeyId(hex) =>
                    lookup_url(ks, "get", &format!("0x{}", hex))?,
                GetPattern::Exact(name) => Uri::parse(&format!(
                    "{}/pks/lookup?op=get&options=mr&exact=on&search={}",
                    ks.parsed.http_base(), encode(name.as_bytes())))?,
            };
            match http.fetch(&url, timeout) {
                Ok(data) if !data.is_empty() => {
                    out.extend_from_slice(&data);
                    got = true;
                    break;
                },
                Ok(_) => last_err = Some(Error::NoData.into()),
                Err(e) => last_err = Some(e),
            }
        }
        if !got {
            debug!("no keyserver delivered a key for the pattern");
        }
    }

    if out.is_empty() {
        Err(last_err.unwrap_or_else(|| Error::NoData.into()))
    } else {
        Ok(out)
    }
}

/// Downloads a single key from the given URL.
pub fn fetch(http: &dyn HttpFetcher, url: &str, timeout: Duration)
             -> Result<Vec<u8>> {
    let url = Uri::parse(url)?;
    if !url.is_http && !url.is_https {
        return Err(Error::NotSupported.into());
    }
    http.fetch(&url, timeout)
}

/// Submits a keyblock to every configured keyserver.
///
/// One accepting server counts as success.
pub fn put(http: &dyn HttpFetcher, keyservers: &[KeyserverItem],
           keyblock: &[u8], info: &[u8], timeout: Duration) -> Result<()> {
    debug!("submitting keyblock: {}",
           String::from_utf8_lossy(info).lines().next().unwrap_or(""));

    let mut body = b"keytext=".to_vec();
    body.extend_from_slice(encode(keyblock).as_bytes());

    let mut last_err = None;
    let mut accepted = false;
    for ks in keyservers {
        let url = Uri::parse(&format!("{}/pks/add", ks.parsed.http_base()))?;
        match http.post(&url, "application/x-www-form-urlencoded",
                        &body, timeout) {
            Ok(_) => accepted = true,
            Err(e) => last_err = Some(e),
        }
    }

    if accepted {
        Ok(())
    } else {
        Err(last_err.unwrap_or_else(|| Error::NoData.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_patterns() {
        assert!(matches!(classify(b"=Alice <alice@example.org>"),
                         Some(GetPattern::Exact(_))));
        assert!(matches!(classify(b"0x31855247603831FD"),
                         Some(GetPattern::KeyId(_))));
        assert!(matches!(classify(b"31855247603831FD"),
                         Some(GetPattern::KeyId(_))));
        assert!(matches!(
            classify(b"AABBCCDDEEFF00112233445566778899AABBCCDD"),
            Some(GetPattern::KeyId(_))));
        // Free text is a SEARCH pattern, not a GET pattern.
        assert!(classify(b"alice").is_none());
        assert!(classify(b"=").is_none());
        assert!(classify(b"0xZZ855247603831FD").is_none());
    }

    #[test]
    fn rejects_non_http_keyservers() {
        assert!(KeyserverItem::new("hkp://keys.example.org").is_ok());
        assert!(KeyserverItem::new("ldap://keys.example.org").is_err());
    }
}
