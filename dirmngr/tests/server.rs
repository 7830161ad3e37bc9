//! Drives the command dispatcher over in-memory transcripts.
//!
//! The client side is a scripted byte stream; the collaborators are
//! mocks recording what the dispatcher asked of them.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::time::Duration;

use palisade_dirmngr::Config;
use palisade_dirmngr::DEFAULT_KEYSERVER;
use palisade_dirmngr::Error;
use palisade_dirmngr::Result;
use palisade_dirmngr::backend::{
    Backend,
    Cert,
    CertCache,
    ClientSource,
    CrlCache,
    CrlStatus,
    HttpFetcher,
    OcspClient,
    PatternResult,
    ChainValidator,
    ValidateFlags,
};
use palisade_dirmngr::server::serve;
use palisade_dirmngr::uri::Uri;

#[derive(Default)]
struct MockCertCache {
    by_fpr: RefCell<HashMap<[u8; 20], Cert>>,
    by_pattern: RefCell<HashMap<String, Vec<Cert>>>,
    inserted: RefCell<Vec<Cert>>,
}

impl CertCache for MockCertCache {
    fn get_by_fpr(&self, fpr: &[u8; 20]) -> Option<Cert> {
        self.by_fpr.borrow().get(fpr).cloned()
    }

    fn get_by_pattern(&self, pattern: &str,
                      callback: &mut dyn FnMut(&Cert) -> Result<()>)
                      -> Result<PatternResult> {
        let map = self.by_pattern.borrow();
        let certs = map.get(pattern).map(|v| v.as_slice()).unwrap_or(&[]);
        for cert in certs {
            callback(cert)?;
        }
        Ok(PatternResult { count: certs.len(), truncated: false })
    }

    fn insert(&self, cert: Cert) -> Result<()> {
        self.inserted.borrow_mut().push(cert);
        Ok(())
    }
}

struct MockCrlCache {
    /// Scripted verdicts, consumed one per query; afterwards the
    /// default applies.
    script: RefCell<VecDeque<CrlStatus>>,
    default_verdict: Cell<CrlStatus>,
    /// Loading a CRL flips the default to Valid.
    reload_helps: bool,
    queries: RefCell<Vec<(String, String, bool)>>,
    reloads: Cell<usize>,
}

impl MockCrlCache {
    fn answering(verdict: CrlStatus) -> Self {
        MockCrlCache {
            script: RefCell::new(VecDeque::new()),
            default_verdict: Cell::new(verdict),
            reload_helps: false,
            queries: RefCell::new(Vec::new()),
            reloads: Cell::new(0),
        }
    }

    fn next_verdict(&self) -> CrlStatus {
        self.script.borrow_mut().pop_front()
            .unwrap_or_else(|| self.default_verdict.get())
    }
}

impl CrlCache for MockCrlCache {
    fn isvalid(&self, issuer_hash: &str, serial: &str, force_refresh: bool)
               -> Result<CrlStatus> {
        self.queries.borrow_mut().push(
            (issuer_hash.to_string(), serial.to_string(), force_refresh));
        Ok(self.next_verdict())
    }

    fn cert_isvalid(&self, _cert: &Cert, force_refresh: bool)
                    -> Result<CrlStatus> {
        self.queries.borrow_mut().push(
            ("<cert>".to_string(), String::new(), force_refresh));
        Ok(self.next_verdict())
    }

    fn reload_crl(&self, _cert: &Cert) -> Result<()> {
        self.reloads.set(self.reloads.get() + 1);
        if self.reload_helps {
            self.default_verdict.set(CrlStatus::Valid);
        }
        Ok(())
    }

    fn load(&self, _path: &str) -> Result<()> {
        Ok(())
    }

    fn list(&self, out: &mut dyn std::io::Write) -> Result<()> {
        out.write_all(b"crl cache is empty\n")?;
        Ok(())
    }

    fn insert(&self, _url: &str, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct MockOcsp {
    calls: Cell<usize>,
}

impl OcspClient for MockOcsp {
    fn isvalid(&self, _cert: Option<&Cert>, _issuer: Option<&Cert>,
               _force_default_responder: bool) -> Result<()> {
        self.calls.set(self.calls.get() + 1);
        Ok(())
    }
}

#[derive(Default)]
struct MockValidator {
    asks_about_root: Option<&'static str>,
    flags_seen: RefCell<Vec<ValidateFlags>>,
}

impl ChainValidator for MockValidator {
    fn validate_chain(&self, _cert: &Cert, flags: ValidateFlags,
                      client: &mut dyn ClientSource) -> Result<()> {
        self.flags_seen.borrow_mut().push(flags);
        if let Some(root) = self.asks_about_root {
            // A validator short on intermediates asks the client
            // before giving up; exercise that path too.
            if client.send_issuer_cert("CN=Test CA")?.is_none() {
                return Err(Error::MissingCertificate(
                    "CN=Test CA".into()).into());
            }
            if !client.is_trusted(root)? {
                return Err(Error::NotTrusted.into());
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct MockHttp {
    body: RefCell<Vec<u8>>,
    requests: RefCell<Vec<String>>,
}

impl HttpFetcher for MockHttp {
    fn fetch(&self, url: &Uri, _timeout: Duration) -> Result<Vec<u8>> {
        self.requests.borrow_mut().push(url.to_string());
        Ok(self.body.borrow().clone())
    }

    fn post(&self, url: &Uri, _content_type: &str, _body: &[u8],
            _timeout: Duration) -> Result<Vec<u8>> {
        self.requests.borrow_mut().push(format!("POST {}", url));
        Ok(b"OK".to_vec())
    }
}

struct Fixture {
    certs: MockCertCache,
    crls: MockCrlCache,
    ocsp: MockOcsp,
    validator: MockValidator,
    http: MockHttp,
    config: Config,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            certs: MockCertCache::default(),
            crls: MockCrlCache::answering(CrlStatus::Valid),
            ocsp: MockOcsp::default(),
            validator: MockValidator::default(),
            http: MockHttp::default(),
            config: Config::default(),
        }
    }

    /// Runs a client script against a fresh session and returns the
    /// server transcript and whether process termination was asked
    /// for.
    fn run(&self, script: &str) -> (String, bool) {
        let mut reader = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        let backend = Backend {
            certs: &self.certs,
            crls: &self.crls,
            ocsp: &self.ocsp,
            validator: &self.validator,
            http: &self.http,
        };
        let stopme = serve(&mut reader, &mut out, &self.config, &backend)
            .expect("session I/O cannot fail on in-memory transports");
        (String::from_utf8(out).expect("transcript is ASCII"), stopme)
    }
}

const ISSUER: &str = "0123456789abcdef0123456789abcdef01234567";

#[test]
fn greeting_and_bye() {
    let fixture = Fixture::new();
    let (out, stopme) = fixture.run("BYE\n");
    assert!(out.starts_with("OK palisade-dirmngr"));
    assert!(out.ends_with("OK closing connection\n"));
    assert!(!stopme);
}

#[test]
fn unknown_commands_are_reported() {
    let fixture = Fixture::new();
    let (out, _) = fixture.run("FROBNICATE now\nBYE\n");
    assert!(out.contains("ERR 33 Unknown command: FROBNICATE\n"));
}

#[test]
fn killdirmngr_requests_termination() {
    let fixture = Fixture::new();
    let (_, stopme) = fixture.run("KILLDIRMNGR\n");
    assert!(stopme);
}

#[test]
fn isvalid_happy_path() {
    let fixture = Fixture::new();
    let (out, _) = fixture.run(
        &format!("ISVALID {}.01\nBYE\n", ISSUER));
    // Greeting OK, command OK, closing OK.
    assert_eq!(out.matches("\nOK").count() + 1, 3);
    assert!(!out.contains("INQUIRE"));
    let queries = fixture.crls.queries.borrow();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0], (ISSUER.to_string(), "01".to_string(), false));
}

/// Scenario: the CRL cache knows nothing, the client supplies the
/// certificate on inquiry, and the freshly loaded CRL vouches.
#[test]
fn isvalid_inquires_once_and_succeeds() {
    let mut fixture = Fixture::new();
    fixture.crls = MockCrlCache::answering(CrlStatus::DontKnow);
    fixture.crls.reload_helps = true;

    let script = format!(
        "ISVALID {issuer}.0a0b\nD ISSUER-CERT\nEND\nBYE\n",
        issuer = ISSUER);
    let (out, _) = fixture.run(&script);

    assert!(out.contains(&format!("INQUIRE SENDCERT {}\n", ISSUER)));
    assert_eq!(fixture.crls.reloads.get(), 1);
    // DontKnow, then Valid after the reload.
    assert_eq!(fixture.crls.queries.borrow().len(), 2);
    // The command succeeded.
    let after_inquire = out.split("INQUIRE").nth(1).unwrap();
    assert!(after_inquire.contains("\nOK\n"));
}

/// The retry is capped: a second DontKnow answers no-crl-known
/// without a second inquiry.
#[test]
fn isvalid_retry_cap() {
    let mut fixture = Fixture::new();
    fixture.crls = MockCrlCache::answering(CrlStatus::DontKnow);

    let script = format!(
        "ISVALID {issuer}.01\nD ISSUER-CERT\nEND\nBYE\n", issuer = ISSUER);
    let (out, _) = fixture.run(&script);

    assert_eq!(out.matches("INQUIRE").count(), 1);
    assert_eq!(fixture.crls.reloads.get(), 1);
    assert!(out.contains("ERR 23 No CRL known\n"));
}

#[test]
fn isvalid_revoked() {
    let mut fixture = Fixture::new();
    fixture.crls = MockCrlCache::answering(CrlStatus::Revoked);
    let (out, _) = fixture.run(&format!("ISVALID {}.01\nBYE\n", ISSUER));
    assert!(out.contains("ERR 24 Certificate revoked\n"));
}

/// Scenario: a bare fingerprint switches ISVALID to OCSP, which is
/// refused while OCSP is disabled.
#[test]
fn isvalid_ocsp_disabled() {
    let fixture = Fixture::new();
    let (out, _) = fixture.run(
        "ISVALID --only-ocsp AABBCCDDEEFF00112233445566778899AABBCCDD\nBYE\n");
    assert!(out.contains("ERR 31 Not supported\n"));
    assert_eq!(fixture.ocsp.calls.get(), 0);
}

#[test]
fn isvalid_ocsp_enabled() {
    let mut fixture = Fixture::new();
    fixture.config.allow_ocsp = true;
    let fpr_hex = "AABBCCDDEEFF00112233445566778899AABBCCDD";
    let mut fpr = [0u8; 20];
    for (i, b) in fpr.iter_mut().enumerate() {
        *b = u8::from_str_radix(&fpr_hex[2 * i..2 * i + 2], 16).unwrap();
    }
    fixture.certs.by_fpr.borrow_mut().insert(
        fpr, Cert::from_der(b"TARGET".to_vec()).unwrap());

    let (out, _) = fixture.run(&format!("ISVALID {}\nBYE\n", fpr_hex));
    assert_eq!(fixture.ocsp.calls.get(), 1);
    assert_eq!(out.matches("\nOK").count() + 1, 3);
}

/// While an inquiry is outstanding, a pipelined command line is held
/// and served afterwards, in order.
#[test]
fn commands_are_held_during_inquiry() {
    let fixture = Fixture::new();
    let (out, _) = fixture.run(
        "CHECKCRL\nGETINFO pid\nD TARGET-CERT\nEND\nBYE\n");

    let inquire = out.find("INQUIRE TARGETCERT").unwrap();
    let checkcrl_ok = out[inquire..].find("\nOK\n").unwrap() + inquire;
    let pid_data = out.find("\nD ").unwrap();
    // The GETINFO answer comes after CHECKCRL finished.
    assert!(inquire < pid_data);
    assert!(checkcrl_ok < pid_data);
}

#[test]
fn checkcrl_reloads_once() {
    let mut fixture = Fixture::new();
    fixture.crls = MockCrlCache::answering(CrlStatus::DontKnow);
    fixture.crls.reload_helps = true;

    let (out, _) = fixture.run("CHECKCRL\nD TARGET-CERT\nEND\nBYE\n");
    assert_eq!(out.matches("INQUIRE TARGETCERT").count(), 1);
    assert_eq!(fixture.crls.reloads.get(), 1);
    let after = out.split("INQUIRE").nth(1).unwrap();
    assert!(after.contains("\nOK\n"));
}

#[test]
fn checkocsp_uses_cached_cert() {
    let mut fixture = Fixture::new();
    let fpr = [0x11u8; 20];
    fixture.certs.by_fpr.borrow_mut().insert(
        fpr, Cert::from_der(b"CACHED".to_vec()).unwrap());

    let fpr_hex = "11".repeat(20);
    let (out, _) = fixture.run(&format!("CHECKOCSP {}\nBYE\n", fpr_hex));
    // The certificate came from the cache, no inquiry needed.
    assert!(!out.contains("INQUIRE"));
    assert_eq!(fixture.ocsp.calls.get(), 1);
}

#[test]
fn lookup_streams_cache_hits() {
    let fixture = Fixture::new();
    fixture.certs.by_pattern.borrow_mut().insert(
        "alice".to_string(),
        vec![Cert::from_der(b"ALICE-CERT".to_vec()).unwrap()]);

    let (out, _) = fixture.run("LOOKUP alice\nBYE\n");
    assert!(out.contains("D ALICE-CERT\n"));

    let (out, _) = fixture.run("LOOKUP nobody\nBYE\n");
    assert!(out.contains("ERR 43 No data\n"));
}

#[test]
fn lookup_url_fetches() {
    let fixture = Fixture::new();
    *fixture.http.body.borrow_mut() = b"PEM-BLOB".to_vec();
    let (out, _) = fixture.run(
        "LOOKUP --url http://crl.example.org/ca.crt\nBYE\n");
    assert!(out.contains("D PEM-BLOB\n"));
    let requests = fixture.http.requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0], "http://crl.example.org:80/ca.crt");
}

#[test]
fn cachecert_inserts() {
    let fixture = Fixture::new();
    let (_, _) = fixture.run("CACHECERT\nD THE-CERT\nEND\nBYE\n");
    let inserted = fixture.certs.inserted.borrow();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].der(), b"THE-CERT");
}

#[test]
fn validate_tls_mode() {
    let mut fixture = Fixture::new();
    fixture.validator.asks_about_root = Some("ROOT-FPR");

    // base64("CERT-A") and base64("CERT-B").
    let script = "VALIDATE --tls --no-crl\n\
                  D -----BEGIN CERTIFICATE-----%0AQ0VSVC1B%0A\
                  -----END CERTIFICATE-----%0A\
                  -----BEGIN CERTIFICATE-----%0AQ0VSVC1C%0A\
                  -----END CERTIFICATE-----%0A\n\
                  END\n\
                  D ISSUER-DER\n\
                  END\n\
                  D 1\n\
                  END\n\
                  BYE\n";
    let (out, _) = fixture.run(script);

    assert!(out.contains("INQUIRE CERTLIST\n"));
    assert!(out.contains("INQUIRE SENDISSUERCERT CN=Test CA\n"));
    assert!(out.contains("INQUIRE ISTRUSTED ROOT-FPR\n"));
    let after = out.rfind("INQUIRE").unwrap();
    assert!(out[after..].contains("\nOK\n"));

    // The second certificate was cached as an intermediate.
    let inserted = fixture.certs.inserted.borrow();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].der(), b"CERT-B");

    let flags = fixture.validator.flags_seen.borrow();
    assert!(flags[0].tls && flags[0].no_crl && !flags[0].trust_system);
}

/// Clearing and adding in one call leaves exactly the added server.
#[test]
fn keyserver_clear_and_add() {
    let fixture = Fixture::new();
    let (out, _) = fixture.run(
        "KEYSERVER --clear\nKEYSERVER hkp://example.org\nKEYSERVER\nBYE\n");
    assert_eq!(out.matches("S KEYSERVER").count(), 1);
    assert!(out.contains("S KEYSERVER hkp://example.org\n"));
}

/// A fresh session lists the compile-time default.
#[test]
fn keyserver_default_fallback() {
    let fixture = Fixture::new();
    let (out, _) = fixture.run("KEYSERVER\nBYE\n");
    assert!(out.contains(&format!("S KEYSERVER {}\n", DEFAULT_KEYSERVER)));
}

#[test]
fn ks_get_builds_hkp_requests() {
    let fixture = Fixture::new();
    *fixture.http.body.borrow_mut() = b"KEY-BLOB".to_vec();
    let (out, _) = fixture.run(
        "KEYSERVER --clear hkp://keys.example.org\n\
         KS_GET 0x31855247603831FD\nBYE\n");
    assert!(out.contains("D KEY-BLOB\n"));
    let requests = fixture.http.requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0],
               "http://keys.example.org:11371/pks/lookup\
                ?op=get&options=mr&search=0x31855247603831FD");
}

#[test]
fn ks_get_rejects_free_text() {
    let fixture = Fixture::new();
    let (out, _) = fixture.run("KS_GET alice\nBYE\n");
    assert!(out.contains("ERR 11 Invalid argument"));
    assert!(fixture.http.requests.borrow().is_empty());
}

/// Scenario: an empty keyblock reply fails with missing-certificate.
#[test]
fn ks_put_empty_keyblock() {
    let fixture = Fixture::new();
    let (out, _) = fixture.run("KS_PUT\nEND\nBYE\n");
    assert!(out.contains("INQUIRE KEYBLOCK\n"));
    assert!(out.contains("ERR 22 Missing certificate"));
}

#[test]
fn ks_put_submits_valid_keyblock() {
    let fixture = Fixture::new();
    // A v4 RSA public key packet, n = 1, e = 2.
    let script = "KEYSERVER --clear hkp://keys.example.org\n\
                  KS_PUT\n\
                  D %99%00%0C%04%5Ad%9C%0A%01%00%01%01%00%02%02\n\
                  END\n\
                  D fpr:31855247603831FD\n\
                  END\n\
                  BYE\n";
    let (out, _) = fixture.run(script);
    assert!(out.contains("INQUIRE KEYBLOCK\n"));
    assert!(out.contains("INQUIRE KEYBLOCK_INFO\n"));
    let requests = fixture.http.requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0], "POST http://keys.example.org:11371/pks/add");
}

#[test]
fn getinfo() {
    let mut fixture = Fixture::new();
    fixture.config.use_tor = true;
    let (out, _) = fixture.run(
        "GETINFO version\nGETINFO tor\nGETINFO cmd_has_option \
         ISVALID --only-ocsp\nGETINFO cmd_has_option ISVALID --frob\nBYE\n");
    assert!(out.contains(&format!("D {}\n", env!("CARGO_PKG_VERSION"))));
    // tor mode is on, cmd_has_option says yes, then no.
    assert!(out.contains("ERR 31"));
}

#[test]
fn options_update_the_controller() {
    let fixture = Fixture::new();
    let (out, _) = fixture.run(
        "OPTION force-crl-refresh=1\n\
         ISVALID 0123456789abcdef0123456789abcdef01234567.01\n\
         OPTION no-such-option=1\nBYE\n");
    let queries = fixture.crls.queries.borrow();
    assert!(queries[0].2, "force_crl_refresh must reach the CRL cache");
    assert!(out.contains("ERR 32 Unknown option: no-such-option\n"));
}

#[test]
fn listcrls_dumps_into_data_channel() {
    let fixture = Fixture::new();
    let (out, _) = fixture.run("LISTCRLS\nBYE\n");
    assert!(out.contains("D crl cache is empty%0A\n"));
}
