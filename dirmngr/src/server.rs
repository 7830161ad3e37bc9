//! The command dispatcher and the per-command handlers.
//!
//! One call to [`serve`] handles one connection: it allocates the
//! per-session [`Controller`], sends the greeting, and then runs the
//! strictly single-threaded request/response loop.  Handlers may call
//! back into the client mid-command with an inquiry; no new command
//! is accepted while one is outstanding.
//!
//! [`serve`]: fn.serve.html
//! [`Controller`]: struct.Controller.html

use std::io::{BufRead, Write};
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::{debug, info};

use palisade_openpgp::parse::PacketParser;

use crate::Config;
use crate::DEFAULT_KEYSERVER;
use crate::Error;
use crate::Result;
use crate::assuan::{Channel, percent_plus_unescape};
use crate::backend::{
    Backend,
    Cert,
    ClientSource,
    CrlStatus,
    MAX_CERTLIST_SIZE,
    MAX_CERT_SIZE,
    ValidateFlags,
};
use crate::keyserver::{self, KeyserverItem};
use crate::map_err;
use crate::uri::Uri;

/// Maximum size of a keyblock accepted from the client.
pub const MAX_KEYBLOCK_SIZE: usize = 20 * 1024 * 1024;
/// Maximum size of the informational lines accompanying a keyblock.
const MAX_KEYBLOCK_INFO_SIZE: usize = 45 * 1024;
/// Maximum size of a reply to an ISTRUSTED inquiry.
const MAX_ISTRUSTED_SIZE: usize = 100;

/// Per-session state.
///
/// Allocated when a connection is accepted and dropped when it
/// closes.  Nothing in here outlives the session; the process-wide
/// state lives in the [`Backend`] caches.
///
/// [`Backend`]: ../backend/struct.Backend.html
pub struct Controller {
    /// The session's keyservers, most recently added first.
    keyservers: Vec<KeyserverItem>,
    /// Bypass the CRL cache freshness check.
    force_crl_refresh: bool,
    /// Proxy for outbound HTTP, if the session set one.
    http_proxy: Option<String>,
    /// Do not use HTTP to fetch CRLs.
    http_no_crl: bool,
    /// Deadline for outbound network operations.
    timeout: Duration,
    /// The session asked the whole process to terminate.
    stopme: bool,
    /// Certificates picked up during OCSP work; per-command state,
    /// cleared by RESET.
    ocsp_certs: Vec<Cert>,
}

impl Controller {
    fn new(config: &Config) -> Self {
        Controller {
            keyservers: Vec::new(),
            force_crl_refresh: false,
            http_proxy: None,
            http_no_crl: false,
            timeout: config.connect_timeout,
            stopme: false,
            ocsp_certs: Vec::new(),
        }
    }

    /// Returns the session's keyservers, most recently added first.
    pub fn keyservers(&self) -> &[KeyserverItem] {
        &self.keyservers
    }

    /// Returns the proxy configured for outbound HTTP, if any.
    pub fn http_proxy(&self) -> Option<&str> {
        self.http_proxy.as_deref()
    }

    /// Returns whether the session forbids fetching CRLs over HTTP.
    pub fn http_no_crl(&self) -> bool {
        self.http_no_crl
    }

    /// Returns the certificates the session's OCSP checks ran
    /// against.
    pub fn ocsp_certs(&self) -> &[Cert] {
        &self.ocsp_certs
    }
}

struct Session<'a, 'b> {
    ctrl: Controller,
    channel: Channel<'b>,
    config: &'a Config,
    backend: &'a Backend<'a>,
    quit: bool,
}

type Handler = for<'a, 'b> fn(&mut Session<'a, 'b>, &str) -> Result<()>;

struct Command {
    name: &'static str,
    options: &'static [&'static str],
    help: &'static str,
    handler: Handler,
}

/// The command table.  Lookup is case-insensitive.
static COMMANDS: &[Command] = &[
    Command {
        name: "ISVALID",
        options: &["--only-ocsp", "--force-default-responder"],
        help: "[--only-ocsp] [--force-default-responder] \
               <certificate_id> | <certificate_fpr>",
        handler: cmd_isvalid,
    },
    Command {
        name: "CHECKCRL",
        options: &[],
        help: "[<fingerprint>]",
        handler: cmd_checkcrl,
    },
    Command {
        name: "CHECKOCSP",
        options: &["--force-default-responder"],
        help: "[--force-default-responder] [<fingerprint>]",
        handler: cmd_checkocsp,
    },
    Command {
        name: "LOOKUP",
        options: &["--url", "--single", "--cache-only"],
        help: "[--url] [--single] [--cache-only] <pattern>",
        handler: cmd_lookup,
    },
    Command {
        name: "LOADCRL",
        options: &["--url"],
        help: "[--url] <filename|url>",
        handler: cmd_loadcrl,
    },
    Command {
        name: "LISTCRLS",
        options: &[],
        help: "",
        handler: cmd_listcrls,
    },
    Command {
        name: "CACHECERT",
        options: &[],
        help: "",
        handler: cmd_cachecert,
    },
    Command {
        name: "VALIDATE",
        options: &["--systrust", "--tls", "--no-crl"],
        help: "[--systrust] [--tls] [--no-crl]",
        handler: cmd_validate,
    },
    Command {
        name: "KEYSERVER",
        options: &["--clear", "--help"],
        help: "[<uri>|--clear]",
        handler: cmd_keyserver,
    },
    Command {
        name: "KS_SEARCH",
        options: &["--quick"],
        help: "{<pattern>}",
        handler: cmd_ks_search,
    },
    Command {
        name: "KS_GET",
        options: &["--quick"],
        help: "{<pattern>}",
        handler: cmd_ks_get,
    },
    Command {
        name: "KS_FETCH",
        options: &["--quick"],
        help: "<url>",
        handler: cmd_ks_fetch,
    },
    Command {
        name: "KS_PUT",
        options: &["--quick"],
        help: "",
        handler: cmd_ks_put,
    },
    Command {
        name: "GETINFO",
        options: &[],
        help: "{version|pid|tor|cmd_has_option <cmd> <opt>}",
        handler: cmd_getinfo,
    },
    Command {
        name: "OPTION",
        options: &[],
        help: "<name> [[=] <value>]",
        handler: cmd_option,
    },
    Command {
        name: "RESET",
        options: &[],
        help: "",
        handler: cmd_reset,
    },
    Command {
        name: "NOP",
        options: &[],
        help: "",
        handler: cmd_nop,
    },
    Command {
        name: "HELP",
        options: &[],
        help: "",
        handler: cmd_help,
    },
    Command {
        name: "BYE",
        options: &[],
        help: "",
        handler: cmd_bye,
    },
    Command {
        name: "KILLDIRMNGR",
        options: &[],
        help: "",
        handler: cmd_killdirmngr,
    },
];

fn lookup_command(name: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

/// Serves one connection.
///
/// Returns whether the session requested process termination.
pub fn serve(reader: &mut dyn BufRead, writer: &mut dyn Write,
             config: &Config, backend: &Backend) -> Result<bool> {
    let channel = Channel::new(reader, writer);
    let mut session = Session {
        ctrl: Controller::new(config),
        channel,
        config,
        backend,
        quit: false,
    };

    session.channel.ok(
        Some(concat!("palisade-dirmngr ",
                     env!("CARGO_PKG_VERSION"), " ready")))?;

    while !session.quit {
        let line = match session.channel.next_command() {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                // A bad line is answered like a bad command; only a
                // dead transport ends the session.
                let e = map_err(e);
                if matches!(e, Error::Transport(_)) {
                    return Err(e.into());
                }
                session.channel.err(&e)?;
                continue;
            },
        };

        let mut parts = line.trim().splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or("");
        let args = parts.next().unwrap_or("").trim();
        debug!("processing command {}", name);

        match lookup_command(name) {
            None => session.channel.err(
                &Error::UnknownCommand(name.to_ascii_uppercase()))?,
            Some(command) => match (command.handler)(&mut session, args) {
                Ok(()) if session.quit =>
                    session.channel.ok(Some("closing connection"))?,
                Ok(()) => session.channel.ok(None)?,
                Err(e) => {
                    let e = map_err(e);
                    info!("command {} failed: {}", command.name, e);
                    session.channel.err(&e)?;
                },
            },
        }
    }

    Ok(session.ctrl.stopme)
}

/// Returns whether the given option occurs on the command line.
fn has_option(args: &str, option: &str) -> bool {
    args.split_whitespace().any(|token| token == option)
}

/// Skips the leading `--options` of a command line.
fn skip_options(args: &str) -> &str {
    let mut rest = args.trim_start();
    while rest.starts_with("--") {
        match rest.split_once(char::is_whitespace) {
            Some((_, tail)) => rest = tail.trim_start(),
            None => return "",
        }
    }
    rest
}

/// Percent-plus decodes an argument into a string.
fn decode_string(arg: &str) -> Result<String> {
    String::from_utf8(percent_plus_unescape(arg)).map_err(
        |_| Error::InvalidArgument(
            "argument is not valid UTF-8".into()).into())
}

fn parse_fpr(hex: &str) -> Result<[u8; 20]> {
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidArgument(
            "expected a 40 digit hex fingerprint".into()).into());
    }
    let mut fpr = [0u8; 20];
    for (i, b) in fpr.iter_mut().enumerate() {
        *b = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16)
            .map_err(|_| Error::InvalidArgument(
                "expected a 40 digit hex fingerprint".into()))?;
    }
    Ok(fpr)
}

impl<'a, 'b> Session<'a, 'b> {
    /// Inquires a DER certificate from the client.
    fn inquire_cert(&mut self, keyword: &str, args: Option<&str>)
                    -> Result<Cert> {
        let der = self.channel.inquire(keyword, args, MAX_CERT_SIZE)?;
        Cert::from_der(der)
    }

    /// Gets the target certificate: from the cache if a fingerprint
    /// was given and known, else from the client.
    fn acquire_target_cert(&mut self, fpr_arg: &str) -> Result<Cert> {
        if !fpr_arg.is_empty() {
            let fpr = parse_fpr(fpr_arg)?;
            if let Some(cert) = self.backend.certs.get_by_fpr(&fpr) {
                return Ok(cert);
            }
        }
        self.inquire_cert("TARGETCERT", None)
    }

    /// Installs the compile-time default keyserver if the session has
    /// none configured.
    fn ensure_default_keyserver(&mut self) -> Result<()> {
        if self.ctrl.keyservers.is_empty() {
            self.ctrl.keyservers.push(KeyserverItem::new(DEFAULT_KEYSERVER)?);
        }
        Ok(())
    }

    /// The timeout for a keyserver command, honoring `--quick`.
    fn ks_timeout(&self, args: &str) -> Duration {
        if has_option(args, "--quick") {
            self.config.connect_quick_timeout
        } else {
            self.ctrl.timeout
        }
    }
}

/// ISVALID: check a certificate against CRLs, or against OCSP when
/// addressed by fingerprint.
///
/// With `issuerhash.serial` the CRL cache decides; a `DontKnow` makes
/// us ask the client for the certificate once, reload its CRL and
/// retry.  With a bare fingerprint the OCSP validator runs against
/// the certificate from the cache.
fn cmd_isvalid(s: &mut Session, args: &str) -> Result<()> {
    let only_ocsp = has_option(args, "--only-ocsp");
    let force_default_responder = has_option(args, "--force-default-responder");
    let arg = decode_string(skip_options(args))?;

    if let Some((issuer_hash, serial)) = arg.split_once('.') {
        if issuer_hash.len() != 40
            || !issuer_hash.chars().all(|c| c.is_ascii_hexdigit())
            || serial.is_empty()
            || !serial.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(Error::InvalidArgument(
                "expected <issuerhash>.<serial>".into()).into());
        }

        let mut inquired = false;
        loop {
            let status = s.backend.crls.isvalid(
                issuer_hash, serial, s.ctrl.force_crl_refresh)?;
            match status {
                CrlStatus::Valid => return Ok(()),
                CrlStatus::Revoked =>
                    return Err(Error::CertificateRevoked.into()),
                CrlStatus::CantUse => return Err(Error::NoCrlKnown.into()),
                CrlStatus::DontKnow if !inquired && !only_ocsp => {
                    // Ask the client for the certificate, load its
                    // CRL, and try again.  At most once.
                    let cert = s.inquire_cert("SENDCERT",
                                              Some(issuer_hash))?;
                    s.backend.crls.reload_crl(&cert)?;
                    inquired = true;
                },
                CrlStatus::DontKnow =>
                    return Err(Error::NoCrlKnown.into()),
            }
        }
    } else {
        // A bare fingerprint switches to OCSP.
        if !s.config.allow_ocsp {
            return Err(Error::NotSupported.into());
        }
        let fpr = parse_fpr(&arg)?;
        let cert = s.backend.certs.get_by_fpr(&fpr).ok_or_else(
            || Error::MissingCertificate(arg.clone()))?;
        s.ctrl.ocsp_certs.push(cert.clone());
        s.backend.ocsp.isvalid(Some(&cert), None, force_default_responder)
    }
}

/// CHECKCRL: check a certificate against the CRL cache, reloading the
/// CRL once if none is known.
fn cmd_checkcrl(s: &mut Session, args: &str) -> Result<()> {
    let arg = decode_string(skip_options(args))?;
    let cert = s.acquire_target_cert(&arg)?;

    let mut reloaded = false;
    loop {
        let status = s.backend.crls.cert_isvalid(
            &cert, s.ctrl.force_crl_refresh)?;
        match status {
            CrlStatus::Valid => return Ok(()),
            CrlStatus::Revoked => return Err(Error::CertificateRevoked.into()),
            CrlStatus::DontKnow | CrlStatus::CantUse if !reloaded => {
                s.backend.crls.reload_crl(&cert)?;
                reloaded = true;
            },
            CrlStatus::DontKnow | CrlStatus::CantUse =>
                return Err(Error::NoCrlKnown.into()),
        }
    }
}

/// CHECKOCSP: check a certificate against its OCSP responder.
fn cmd_checkocsp(s: &mut Session, args: &str) -> Result<()> {
    let force_default_responder = has_option(args, "--force-default-responder");
    let arg = decode_string(skip_options(args))?;
    let cert = s.acquire_target_cert(&arg)?;
    s.ctrl.ocsp_certs.push(cert.clone());
    s.backend.ocsp.isvalid(Some(&cert), None, force_default_responder)
}

/// LOOKUP: stream certificates matching the patterns from the local
/// cache, or fetch a single URL with `--url`.
fn cmd_lookup(s: &mut Session, args: &str) -> Result<()> {
    let url_mode = has_option(args, "--url");
    let single = has_option(args, "--single");
    let cache_only = has_option(args, "--cache-only");

    let patterns = skip_options(args).split_whitespace()
        .map(decode_string)
        .collect::<Result<Vec<_>>>()?;
    if patterns.is_empty() {
        return Err(Error::Parameter("no pattern given".into()).into());
    }

    if url_mode {
        if patterns.len() != 1 {
            return Err(Error::Parameter(
                "--url takes exactly one URL".into()).into());
        }
        let url = Uri::parse(&patterns[0])?;
        let data = s.backend.http.fetch(&url, s.ctrl.timeout)?;
        if data.is_empty() {
            return Err(Error::NoData.into());
        }
        return s.channel.data(&data);
    }

    // The external keyserver walk is out of scope here; without
    // --cache-only a --single lookup has nowhere left to go.
    let use_cache = !(single && !cache_only);

    let mut delivered = 0;
    let mut truncated = false;
    if use_cache {
        let channel = &mut s.channel;
        let backend = s.backend;
        'patterns: for pattern in &patterns {
            let mut count = 0;
            let outcome = backend.certs.get_by_pattern(
                pattern, &mut |cert| {
                    count += 1;
                    channel.data(cert.der())
                })?;
            delivered += count;
            truncated |= outcome.truncated;
            if single && delivered > 0 {
                break 'patterns;
            }
        }
    }

    if truncated {
        s.channel.status("TRUNCATED", &delivered.to_string())?;
    }
    if delivered == 0 {
        return Err(Error::NoData.into());
    }
    Ok(())
}

/// LOADCRL: load a CRL from a local file, or with `--url` fetch it
/// and hand it to the cache.
fn cmd_loadcrl(s: &mut Session, args: &str) -> Result<()> {
    let url_mode = has_option(args, "--url");
    let arg = decode_string(skip_options(args))?;
    if arg.is_empty() {
        return Err(Error::Parameter("no CRL source given".into()).into());
    }

    if url_mode {
        let url = Uri::parse(&arg)?;
        let data = s.backend.http.fetch(&url, s.ctrl.timeout)?;
        s.backend.crls.insert(&arg, &data)
    } else {
        s.backend.crls.load(&arg)
    }
}

/// LISTCRLS: dump the CRL cache into the data channel.
fn cmd_listcrls(s: &mut Session, _args: &str) -> Result<()> {
    let mut buf = Vec::new();
    s.backend.crls.list(&mut buf)?;
    s.channel.data(&buf)
}

/// CACHECERT: put an inquired certificate into the cache.
fn cmd_cachecert(s: &mut Session, _args: &str) -> Result<()> {
    let cert = s.inquire_cert("TARGETCERT", None)?;
    s.backend.certs.insert(cert)
}

/// VALIDATE: validate a certificate chain.
///
/// In TLS mode the client supplies a PEM list; the first entry is the
/// target, the rest are cached as intermediates.
fn cmd_validate(s: &mut Session, args: &str) -> Result<()> {
    let flags = ValidateFlags {
        tls: has_option(args, "--tls"),
        trust_system: has_option(args, "--systrust"),
        no_crl: has_option(args, "--no-crl"),
    };

    let cert = if flags.tls {
        let pem = s.channel.inquire("CERTLIST", None, MAX_CERTLIST_SIZE)?;
        let mut certs = parse_pem_certs(&pem)?.into_iter();
        let target = certs.next().ok_or_else(
            || Error::MissingCertificate("empty certificate list".into()))?;
        for intermediate in certs {
            s.backend.certs.insert(intermediate)?;
        }
        target
    } else {
        s.inquire_cert("TARGETCERT", None)?
    };

    let mut client = ChannelClient { channel: &mut s.channel };
    s.backend.validator.validate_chain(&cert, flags, &mut client)
}

/// Adapts the command channel into the [`ClientSource`] call-backs a
/// validation may issue.
///
/// [`ClientSource`]: ../backend/trait.ClientSource.html
struct ChannelClient<'c, 'b> {
    channel: &'c mut Channel<'b>,
}

impl ChannelClient<'_, '_> {
    fn inquire_opt_cert(&mut self, keyword: &str, args: &str)
                        -> Result<Option<Cert>> {
        let der = self.channel.inquire(keyword, Some(args),
                                       MAX_CERT_SIZE)?;
        if der.is_empty() {
            Ok(None)
        } else {
            Cert::from_der(der).map(Some)
        }
    }
}

impl ClientSource for ChannelClient<'_, '_> {
    fn send_cert(&mut self, name: &str) -> Result<Option<Cert>> {
        self.inquire_opt_cert("SENDCERT", name)
    }

    fn send_issuer_cert(&mut self, name: &str) -> Result<Option<Cert>> {
        self.inquire_opt_cert("SENDISSUERCERT", name)
    }

    fn send_cert_ski(&mut self, keyid_hex: &str, subject: &str)
                     -> Result<Option<Cert>> {
        self.inquire_opt_cert("SENDCERT_SKI",
                              &format!("{} /{}", keyid_hex, subject))
    }

    fn is_trusted(&mut self, fpr_hex: &str) -> Result<bool> {
        let reply = self.channel.inquire("ISTRUSTED", Some(fpr_hex),
                                         MAX_ISTRUSTED_SIZE)?;
        Ok(reply.first() == Some(&b'1'))
    }
}

/// Extracts the DER certificates from a PEM bundle.
fn parse_pem_certs(pem: &[u8]) -> Result<Vec<Cert>> {
    let text = std::str::from_utf8(pem).map_err(
        |_| Error::InvalidCertificate("PEM list is not ASCII".into()))?;

    let mut certs = Vec::new();
    let mut b64 = None;
    for line in text.lines() {
        let line = line.trim();
        if line == "-----BEGIN CERTIFICATE-----" {
            if b64.is_some() {
                return Err(Error::InvalidCertificate(
                    "nested PEM header".into()).into());
            }
            b64 = Some(String::new());
        } else if line == "-----END CERTIFICATE-----" {
            let der = BASE64.decode(b64.take().ok_or_else(
                || Error::InvalidCertificate(
                    "stray PEM trailer".into()))?)
                .map_err(|e| Error::InvalidCertificate(e.to_string()))?;
            certs.push(Cert::from_der(der)?);
        } else if let Some(acc) = b64.as_mut() {
            acc.push_str(line);
        }
    }
    if b64.is_some() {
        return Err(Error::InvalidCertificate(
            "unterminated PEM block".into()).into());
    }
    Ok(certs)
}

/// KEYSERVER: list, add or clear the session's keyservers.
fn cmd_keyserver(s: &mut Session, args: &str) -> Result<()> {
    if has_option(args, "--help") {
        if let Some(command) = lookup_command("KEYSERVER") {
            s.channel.comment(&format!("KEYSERVER {}", command.help))?;
        }
        return Ok(());
    }

    let clear = has_option(args, "--clear");
    if clear {
        s.ctrl.keyservers.clear();
    }

    let arg = skip_options(args);
    if !arg.is_empty() {
        let uri = decode_string(arg)?;
        let item = KeyserverItem::new(&uri)?;
        s.ctrl.keyservers.insert(0, item);
    } else if !clear {
        // List mode: make sure there is something to list.
        s.ensure_default_keyserver()?;
        let channel = &mut s.channel;
        for ks in &s.ctrl.keyservers {
            channel.status("KEYSERVER", &ks.uri)?;
        }
    }
    Ok(())
}

fn ks_patterns(args: &str) -> Result<Vec<Vec<u8>>> {
    Ok(skip_options(args).split_whitespace()
       .map(percent_plus_unescape)
       .collect())
}

/// KS_SEARCH: search the configured keyservers.
fn cmd_ks_search(s: &mut Session, args: &str) -> Result<()> {
    let patterns = ks_patterns(args)?;
    let timeout = s.ks_timeout(args);
    s.ensure_default_keyserver()?;
    let data = keyserver::search(s.backend.http, &s.ctrl.keyservers,
                                 &patterns, timeout)?;
    s.channel.data(&data)
}

/// KS_GET: retrieve keys from the configured keyservers.
fn cmd_ks_get(s: &mut Session, args: &str) -> Result<()> {
    let patterns = ks_patterns(args)?;
    let timeout = s.ks_timeout(args);
    s.ensure_default_keyserver()?;
    let data = keyserver::get(s.backend.http, &s.ctrl.keyservers,
                              &patterns, timeout)?;
    s.channel.data(&data)
}

/// KS_FETCH: download a key from an explicit URL.
fn cmd_ks_fetch(s: &mut Session, args: &str) -> Result<()> {
    let url = decode_string(skip_options(args))?;
    if url.is_empty() {
        return Err(Error::Parameter("no URL given".into()).into());
    }
    let timeout = s.ks_timeout(args);
    let data = keyserver::fetch(s.backend.http, &url, timeout)?;
    s.channel.data(&data)
}

/// KS_PUT: submit an inquired keyblock to the configured keyservers.
fn cmd_ks_put(s: &mut Session, args: &str) -> Result<()> {
    let keyblock = s.channel.inquire("KEYBLOCK", None, MAX_KEYBLOCK_SIZE)?;
    if keyblock.is_empty() {
        return Err(Error::MissingCertificate("empty keyblock".into()).into());
    }

    // A keyblock must at least frame correctly and contain a key.
    let mut has_key = false;
    for packet in PacketParser::from_bytes(&keyblock) {
        if let palisade_openpgp::Packet::PublicKey(_) = packet? {
            has_key = true;
        }
    }
    if !has_key {
        return Err(Error::MissingCertificate(
            "keyblock contains no key".into()).into());
    }

    let info = s.channel.inquire("KEYBLOCK_INFO", None,
                                 MAX_KEYBLOCK_INFO_SIZE)?;
    let timeout = s.ks_timeout(args);
    s.ensure_default_keyserver()?;
    keyserver::put(s.backend.http, &s.ctrl.keyservers, &keyblock, &info,
                   timeout)
}

/// GETINFO: report runtime information.
fn cmd_getinfo(s: &mut Session, args: &str) -> Result<()> {
    let mut parts = args.split_whitespace();
    match parts.next() {
        Some("version") =>
            s.channel.data(env!("CARGO_PKG_VERSION").as_bytes()),
        Some("pid") =>
            s.channel.data(std::process::id().to_string().as_bytes()),
        Some("tor") => {
            if s.config.use_tor {
                Ok(())
            } else {
                Err(Error::NotSupported.into())
            }
        },
        Some("cmd_has_option") => {
            let command = parts.next().and_then(lookup_command)
                .ok_or_else(|| Error::Parameter(
                    "usage: cmd_has_option <cmd> <option>".into()))?;
            let option = parts.next().ok_or_else(|| Error::Parameter(
                "usage: cmd_has_option <cmd> <option>".into()))?;
            if command.options.iter().any(|o| o.trim_start_matches("--")
                                          == option.trim_start_matches("--"))
            {
                Ok(())
            } else {
                Err(Error::NotSupported.into())
            }
        },
        Some("socket_name") => Err(Error::NotSupported.into()),
        _ => Err(Error::Parameter("unknown value for WHAT".into()).into()),
    }
}

/// OPTION: update a session option.
fn cmd_option(s: &mut Session, args: &str) -> Result<()> {
    let (name, value) = match args.split_once(|c: char| c == '=' || c.is_whitespace()) {
        Some((name, value)) =>
            (name.trim(), value.trim_start_matches('=').trim()),
        None => (args.trim(), ""),
    };

    fn flag(value: &str) -> Result<bool> {
        if value.is_empty() {
            return Ok(true);
        }
        value.parse::<i64>()
            .map(|v| v != 0)
            .map_err(|_| Error::Parameter(
                format!("expected a numeric flag, got {:?}", value)).into())
    }

    match name {
        "force-crl-refresh" => {
            s.ctrl.force_crl_refresh = flag(value)?;
            Ok(())
        },
        "http-proxy" => {
            s.ctrl.http_proxy = match value {
                "" | "none" => None,
                proxy => Some(proxy.to_string()),
            };
            Ok(())
        },
        "http-crl" => {
            s.ctrl.http_no_crl = !flag(value)?;
            Ok(())
        },
        name => Err(Error::UnknownOption(name.to_string()).into()),
    }
}

/// RESET: drop per-command state, keep the keyserver list.
fn cmd_reset(s: &mut Session, _args: &str) -> Result<()> {
    s.ctrl.ocsp_certs.clear();
    Ok(())
}

/// NOP: do nothing, successfully.
fn cmd_nop(_s: &mut Session, _args: &str) -> Result<()> {
    Ok(())
}

/// HELP: list the commands as comment lines.
fn cmd_help(s: &mut Session, _args: &str) -> Result<()> {
    for command in COMMANDS {
        if command.help.is_empty() {
            s.channel.comment(command.name)?;
        } else {
            s.channel.comment(
                &format!("{} {}", command.name, command.help))?;
        }
    }
    Ok(())
}

/// BYE: close the connection.
fn cmd_bye(s: &mut Session, _args: &str) -> Result<()> {
    s.quit = true;
    Ok(())
}

/// KILLDIRMNGR: close the connection and ask the process to exit.
fn cmd_killdirmngr(s: &mut Session, _args: &str) -> Result<()> {
    s.ctrl.stopme = true;
    s.quit = true;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_helpers() {
        assert!(has_option("--url --single foo", "--single"));
        assert!(!has_option("--url foo", "--single"));
        assert_eq!(skip_options("--url --single foo bar"), "foo bar");
        assert_eq!(skip_options("foo --url"), "foo --url");
        assert_eq!(skip_options("--url"), "");
        assert_eq!(skip_options(""), "");
    }

    #[test]
    fn fingerprint_syntax() {
        assert!(parse_fpr("AABBCCDDEEFF00112233445566778899AABBCCDD").is_ok());
        assert!(parse_fpr("AABBCC").is_err());
        assert!(parse_fpr("ZZBBCCDDEEFF00112233445566778899AABBCCDD").is_err());
    }

    #[test]
    fn pem_parsing() {
        let pem = b"-----BEGIN CERTIFICATE-----\n\
                    MDAwMDAwMDA=\n\
                    -----END CERTIFICATE-----\n\
                    -----BEGIN CERTIFICATE-----\n\
                    MTExMTExMTE=\n\
                    -----END CERTIFICATE-----\n";
        let certs = parse_pem_certs(pem).unwrap();
        assert_eq!(certs.len(), 2);
        assert_eq!(certs[0].der(), b"00000000");
        assert_eq!(certs[1].der(), b"11111111");

        assert!(parse_pem_certs(
            b"-----BEGIN CERTIFICATE-----\nAAAA\n").is_err());
        assert_eq!(parse_pem_certs(b"no pem here").unwrap().len(), 0);
    }
}
