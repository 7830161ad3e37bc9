//! A permissive URI parser for keyserver and CRL endpoints.
//!
//! This accepts `scheme ":" ( "//" authority )? path ( "?" query )?`
//! the way the HTTP-era web wrote it, without insisting on the full
//! generic syntax.  Percent-decoding is deferred to consumers; the
//! components are returned as found.  Unknown schemes are accepted
//! and kept opaque so callers can route them to other transports.

use crate::Error;
use crate::Result;

/// A parsed URI.
///
/// For the known schemes (`http`, `https`, `hkp`, `hkps`) the default
/// port is filled in when the authority does not name one: `hkp` is
/// HTTP on port 11371, `hkps` is HTTPS on port 443.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uri {
    /// The scheme, lower-cased.
    pub scheme: String,
    /// The userinfo part of the authority, if any.
    pub userinfo: Option<String>,
    /// The host, brackets stripped for IPv6 literals.
    pub host: String,
    /// The port, with the scheme's default filled in.
    pub port: u16,
    /// The path, `/` when absent.
    pub path: String,
    /// The query string, if any.
    pub query: Option<String>,
    /// Whether this addresses an HTTP endpoint (`http` or `hkp`).
    pub is_http: bool,
    /// Whether this addresses an HTTPS endpoint (`https` or `hkps`).
    pub is_https: bool,
    /// For unknown schemes, everything after the colon, verbatim.
    pub opaque: Option<String>,
}

impl Uri {
    /// Parses a URI.
    pub fn parse(s: &str) -> Result<Uri> {
        let colon = s.find(':').ok_or_else(|| Error::InvalidArgument(
            format!("no scheme in URI {:?}", s)))?;
        let (scheme, rest) = s.split_at(colon);
        let rest = &rest[1..];

        if scheme.is_empty()
            || !scheme.chars().next().map(|c| c.is_ascii_alphabetic())
                    .unwrap_or(false)
            || !scheme.chars().all(
                |c| c.is_ascii_alphanumeric() || c == '+' || c == '-'
                    || c == '.')
        {
            return Err(Error::InvalidArgument(
                format!("malformed scheme in URI {:?}", s)).into());
        }
        let scheme = scheme.to_ascii_lowercase();

        let (is_http, is_https, default_port) = match scheme.as_str() {
            "http" => (true, false, 80),
            "hkp" => (true, false, 11371),
            "https" => (false, true, 443),
            "hkps" => (false, true, 443),
            _ => {
                // Unknown scheme: accepted, returned opaque.
                return Ok(Uri {
                    scheme,
                    userinfo: None,
                    host: String::new(),
                    port: 0,
                    path: String::new(),
                    query: None,
                    is_http: false,
                    is_https: false,
                    opaque: Some(rest.to_string()),
                });
            },
        };

        let rest = rest.strip_prefix("//").ok_or_else(
            || Error::InvalidArgument(
                format!("URI {:?} has no authority", s)))?;

        let authority_end = rest.find(|c| c == '/' || c == '?')
            .unwrap_or(rest.len());
        let (authority, rest) = rest.split_at(authority_end);

        let (userinfo, hostport) = match authority.rfind('@') {
            Some(at) => (Some(authority[..at].to_string()),
                         &authority[at + 1..]),
            None => (None, authority),
        };

        // An IPv6 literal is bracketed so its colons do not look like
        // a port separator.
        let (host, port) = if let Some(v6) = hostport.strip_prefix('[') {
            let close = v6.find(']').ok_or_else(|| Error::InvalidArgument(
                format!("unterminated IPv6 literal in URI {:?}", s)))?;
            let host = &v6[..close];
            let port = match &v6[close + 1..] {
                "" => None,
                p => Some(p.strip_prefix(':').ok_or_else(
                    || Error::InvalidArgument(format!(
                        "garbage after IPv6 literal in URI {:?}", s)))?),
            };
            (host, port)
        } else {
            match hostport.find(':') {
                Some(colon) => (&hostport[..colon],
                                Some(&hostport[colon + 1..])),
                None => (hostport, None),
            }
        };

        if host.is_empty() {
            return Err(Error::InvalidArgument(
                format!("no host in URI {:?}", s)).into());
        }

        let port = match port {
            None => default_port,
            Some(p) => p.parse::<u16>().map_err(|_| Error::InvalidArgument(
                format!("bad port in URI {:?}", s)))?,
        };

        let (path, query) = match rest.find('?') {
            Some(q) => (&rest[..q], Some(rest[q + 1..].to_string())),
            None => (rest, None),
        };

        Ok(Uri {
            scheme,
            userinfo,
            host: host.to_ascii_lowercase(),
            port,
            path: if path.is_empty() { "/".into() } else { path.into() },
            query,
            is_http,
            is_https,
            opaque: None,
        })
    }

    /// Returns the `scheme://host:port` base for building request
    /// URLs, with hkp mapped to http and hkps mapped to https.
    pub fn http_base(&self) -> String {
        format!("{}://{}:{}",
                if self.is_https { "https" } else { "http" },
                self.host, self.port)
    }
}

impl std::fmt::Display for Uri {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(opaque) = &self.opaque {
            return write!(f, "{}:{}", self.scheme, opaque);
        }
        write!(f, "{}://", self.scheme)?;
        if let Some(userinfo) = &self.userinfo {
            write!(f, "{}@", userinfo)?;
        }
        if self.host.contains(':') {
            write!(f, "[{}]", self.host)?;
        } else {
            write!(f, "{}", self.host)?;
        }
        write!(f, ":{}{}", self.port, self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hkp_defaults() {
        let uri = Uri::parse("hkp://keys.example.org").unwrap();
        assert_eq!(uri.scheme, "hkp");
        assert_eq!(uri.host, "keys.example.org");
        assert_eq!(uri.port, 11371);
        assert_eq!(uri.path, "/");
        assert!(uri.is_http);
        assert!(!uri.is_https);
        assert_eq!(uri.http_base(), "http://keys.example.org:11371");
    }

    #[test]
    fn hkps_defaults() {
        let uri = Uri::parse("hkps://keys.example.org").unwrap();
        assert_eq!(uri.port, 443);
        assert!(uri.is_https);
        assert_eq!(uri.http_base(), "https://keys.example.org:443");
    }

    #[test]
    fn explicit_port_and_query() {
        let uri = Uri::parse(
            "http://user:pw@keys.example.org:8080/pks/lookup?op=index")
            .unwrap();
        assert_eq!(uri.userinfo.as_deref(), Some("user:pw"));
        assert_eq!(uri.host, "keys.example.org");
        assert_eq!(uri.port, 8080);
        assert_eq!(uri.path, "/pks/lookup");
        assert_eq!(uri.query.as_deref(), Some("op=index"));
    }

    #[test]
    fn ipv6_literal() {
        let uri = Uri::parse("https://[2001:db8::1]:8443/x").unwrap();
        assert_eq!(uri.host, "2001:db8::1");
        assert_eq!(uri.port, 8443);
        assert_eq!(uri.path, "/x");
    }

    #[test]
    fn unknown_scheme_is_opaque() {
        let uri = Uri::parse("ldap://ldap.example.org/cn=x").unwrap();
        assert_eq!(uri.scheme, "ldap");
        assert_eq!(uri.opaque.as_deref(), Some("//ldap.example.org/cn=x"));
        assert!(!uri.is_http);
        assert!(!uri.is_https);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Uri::parse("no-scheme-here").is_err());
        assert!(Uri::parse("http://").is_err());
        assert!(Uri::parse("http://host:70000/").is_err());
        assert!(Uri::parse("1http://x/").is_err());
        assert!(Uri::parse("http://[2001:db8::1/").is_err());
    }

    #[test]
    fn display_roundtrip() {
        for s in ["hkp://keys.example.org:11371/",
                  "https://user@[2001:db8::1]:8443/x?q=1"] {
            let uri = Uri::parse(s).unwrap();
            assert_eq!(Uri::parse(&uri.to_string()).unwrap(), uri);
        }
    }
}
