//! Cookie-backed store.
//!
//! [`CookieJar`] is built from the `Cookie` header of an incoming request.
//! Reads are answered from that header; writes and removals update the jar
//! immediately and queue a `Set-Cookie` header for the response, so the next
//! read in the same request already observes them.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::RwLock;
use std::time::Duration;

use super::{ConsentStore, StoreError, StoreErrorKind};

const BACKEND: &str = "Cookie";

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    /// Parse an attribute value, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "lax" => Some(Self::Lax),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

/// Attributes attached to every `Set-Cookie` header the jar emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieAttributes {
    /// Cookie path.
    pub path: String,
    /// Lifetime. `None` makes a session cookie.
    pub max_age: Option<Duration>,
    /// `SameSite` policy.
    pub same_site: SameSite,
    /// Add the `Secure` flag. Always set when `same_site` is `None`.
    pub secure: bool,
}

impl Default for CookieAttributes {
    fn default() -> Self {
        Self {
            path: "/".to_owned(),
            max_age: Some(Duration::from_secs(365 * 24 * 60 * 60)),
            same_site: SameSite::Lax,
            secure: false,
        }
    }
}

/// Request-scoped cookie store.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: RwLock<HashMap<String, String>>,
    pending: RwLock<Vec<String>>,
    attributes: CookieAttributes,
}

impl CookieJar {
    /// Create an empty jar.
    #[must_use]
    pub fn new(attributes: CookieAttributes) -> Self {
        Self {
            cookies: RwLock::new(HashMap::new()),
            pending: RwLock::new(Vec::new()),
            attributes,
        }
    }

    /// Create a jar from a `Cookie` request header value (`a=1; b=2`).
    ///
    /// Pairs without `=` are skipped. When a name repeats, the first
    /// occurrence wins, matching how browsers order more specific paths first.
    #[must_use]
    pub fn from_header(header: &str, attributes: CookieAttributes) -> Self {
        let mut cookies = HashMap::new();
        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            cookies
                .entry(name.to_owned())
                .or_insert_with(|| value.to_owned());
        }
        Self {
            cookies: RwLock::new(cookies),
            pending: RwLock::new(Vec::new()),
            attributes,
        }
    }

    /// Drain the `Set-Cookie` header values queued by writes and removals.
    #[must_use]
    pub fn take_set_cookie_headers(&self) -> Vec<String> {
        self.pending
            .write()
            .map(|mut pending| std::mem::take(&mut *pending))
            .unwrap_or_default()
    }

    fn set_cookie_header(&self, name: &str, value: &str, max_age: Option<Duration>) -> String {
        let attrs = &self.attributes;
        let mut header = format!("{name}={value}; Path={}", attrs.path);
        if let Some(age) = max_age {
            let _ = write!(header, "; Max-Age={}", age.as_secs());
        }
        let _ = write!(header, "; SameSite={}", attrs.same_site.as_str());
        if attrs.secure || attrs.same_site == SameSite::None {
            header.push_str("; Secure");
        }
        header
    }

    fn queue(&self, key: &str, header: String) -> Result<(), StoreError> {
        self.pending
            .write()
            .map_err(|_| unavailable(key))?
            .push(header);
        Ok(())
    }
}

fn unavailable(key: &str) -> StoreError {
    StoreError::unavailable(key).with_backend(BACKEND)
}

fn invalid(key: &str) -> StoreError {
    StoreError::new(StoreErrorKind::InvalidKey)
        .with_key(key)
        .with_backend(BACKEND)
}

/// RFC 6265 token characters for cookie names.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_graphic()
                && !matches!(
                    b,
                    b'(' | b')' | b'<' | b'>' | b'@' | b',' | b';' | b':' | b'\\' | b'"'
                        | b'/' | b'[' | b']' | b'?' | b'=' | b'{' | b'}'
                )
        })
}

/// RFC 6265 path-value: printable ASCII except `;`.
fn is_path_value(s: &str) -> bool {
    s.starts_with('/') && s.bytes().all(|b| (b.is_ascii_graphic() || b == b' ') && b != b';')
}

/// RFC 6265 cookie-octets for unquoted values.
fn is_cookie_value(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_graphic() && !matches!(b, b'"' | b',' | b';' | b'\\'))
}

impl ConsentStore for CookieJar {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let cookies = self.cookies.read().map_err(|_| unavailable(key))?;
        Ok(cookies.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if !is_token(key) || !is_cookie_value(value) || !is_path_value(&self.attributes.path) {
            return Err(invalid(key));
        }
        let header = self.set_cookie_header(key, value, self.attributes.max_age);
        self.cookies
            .write()
            .map_err(|_| unavailable(key))?
            .insert(key.to_owned(), value.to_owned());
        self.queue(key, header)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        if !is_token(key) || !is_path_value(&self.attributes.path) {
            return Err(invalid(key));
        }
        let header = self.set_cookie_header(key, "", Some(Duration::ZERO));
        self.cookies
            .write()
            .map_err(|_| unavailable(key))?
            .remove(key);
        self.queue(key, header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_header_parses_pairs() {
        let jar = CookieJar::from_header(
            "theme=dark; CookieConsent=true; _ga=GA1.1.123",
            CookieAttributes::default(),
        );
        assert_eq!(jar.read("CookieConsent").unwrap(), Some("true".to_owned()));
        assert_eq!(jar.read("theme").unwrap(), Some("dark".to_owned()));
        assert_eq!(jar.read("missing").unwrap(), None);
    }

    #[test]
    fn test_from_header_first_occurrence_wins() {
        let jar = CookieJar::from_header(
            "CookieConsent=false; CookieConsent=true",
            CookieAttributes::default(),
        );
        assert_eq!(jar.read("CookieConsent").unwrap(), Some("false".to_owned()));
    }

    #[test]
    fn test_from_header_strips_quotes_and_skips_garbage() {
        let jar = CookieJar::from_header(r#"junk; =x; a="quoted""#, CookieAttributes::default());
        assert_eq!(jar.read("a").unwrap(), Some("quoted".to_owned()));
        assert_eq!(jar.read("junk").unwrap(), None);
    }

    #[test]
    fn test_write_queues_set_cookie() {
        let jar = CookieJar::new(CookieAttributes::default());
        jar.write("CookieConsent", "true").unwrap();

        assert_eq!(jar.read("CookieConsent").unwrap(), Some("true".to_owned()));
        assert_eq!(
            jar.take_set_cookie_headers(),
            vec!["CookieConsent=true; Path=/; Max-Age=31536000; SameSite=Lax".to_owned()]
        );
        // Drained
        assert!(jar.take_set_cookie_headers().is_empty());
    }

    #[test]
    fn test_remove_expires_cookie() {
        let jar = CookieJar::from_header("CookieConsent=false", CookieAttributes::default());
        jar.remove("CookieConsent").unwrap();

        assert_eq!(jar.read("CookieConsent").unwrap(), None);
        assert_eq!(
            jar.take_set_cookie_headers(),
            vec!["CookieConsent=; Path=/; Max-Age=0; SameSite=Lax".to_owned()]
        );
    }

    #[test]
    fn test_session_cookie_and_same_site_none_is_secure() {
        let jar = CookieJar::new(CookieAttributes {
            path: "/docs".to_owned(),
            max_age: None,
            same_site: SameSite::None,
            secure: false,
        });
        jar.write("c", "1").unwrap();
        assert_eq!(
            jar.take_set_cookie_headers(),
            vec!["c=1; Path=/docs; SameSite=None; Secure".to_owned()]
        );
    }

    #[test]
    fn test_rejects_invalid_names_and_values() {
        let jar = CookieJar::new(CookieAttributes::default());
        assert_eq!(
            jar.write("bad name", "true").unwrap_err().kind,
            StoreErrorKind::InvalidKey
        );
        assert_eq!(
            jar.write("ok", "a;b").unwrap_err().kind,
            StoreErrorKind::InvalidKey
        );
        assert!(jar.take_set_cookie_headers().is_empty());
    }

    #[test]
    fn test_rejects_attribute_injection_through_path() {
        for path in [
            "/; Domain=evil.example\r\nX-Injected: 1",
            "/docs;Secure",
            "/docs\n",
            "docs",
        ] {
            let jar = CookieJar::from_header(
                "CookieConsent=true",
                CookieAttributes {
                    path: path.to_owned(),
                    ..CookieAttributes::default()
                },
            );
            assert_eq!(
                jar.write("CookieConsent", "false").unwrap_err().kind,
                StoreErrorKind::InvalidKey,
                "path {path:?}"
            );
            assert_eq!(
                jar.remove("CookieConsent").unwrap_err().kind,
                StoreErrorKind::InvalidKey,
                "path {path:?}"
            );
            assert!(jar.take_set_cookie_headers().is_empty());
            // Rejected writes leave the request cookie untouched
            assert_eq!(jar.read("CookieConsent").unwrap(), Some("true".to_owned()));
        }
    }

    #[test]
    fn test_same_site_parse() {
        assert_eq!(SameSite::parse("lax"), Some(SameSite::Lax));
        assert_eq!(SameSite::parse("Strict"), Some(SameSite::Strict));
        assert_eq!(SameSite::parse("NONE"), Some(SameSite::None));
        assert_eq!(SameSite::parse("sometimes"), None);
    }
}
