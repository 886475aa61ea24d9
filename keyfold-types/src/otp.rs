//! otpauth URL parsing.
//!
//! The QR capture flow hands the raw scanned payload to the orchestrator,
//! which parses it here. Only the subset of the otpauth scheme the editing
//! core needs is supported: the secret is mandatory, label and issuer are
//! carried along when present.

use crate::{Error, Result};

/// Parameters extracted from an `otpauth://` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpParams {
    /// The shared secret (base32, as carried in the URL).
    pub secret: String,
    /// The account label, e.g. `Example:alice@example.com`.
    pub label: Option<String>,
    /// The issuer query parameter, when present.
    pub issuer: Option<String>,
}

/// Parses an `otpauth://totp/...` (or `hotp`) URL.
///
/// Fails with [`Error::InvalidOtpUrl`] for any payload that is not an
/// otpauth URL or that lacks a secret — the QR flow treats that as an
/// invalid scan and re-offers capture.
pub fn parse_otp_url(raw: &str) -> Result<OtpParams> {
    let rest = raw
        .trim()
        .strip_prefix("otpauth://")
        .ok_or_else(|| Error::InvalidOtpUrl(format!("unexpected scheme in {raw:?}")))?;

    let (otp_type, rest) = rest
        .split_once('/')
        .ok_or_else(|| Error::InvalidOtpUrl("missing label segment".into()))?;
    if otp_type != "totp" && otp_type != "hotp" {
        return Err(Error::InvalidOtpUrl(format!("unknown type {otp_type:?}")));
    }

    let (label, query) = match rest.split_once('?') {
        Some((label, query)) => (label, query),
        None => (rest, ""),
    };

    let mut secret = None;
    let mut issuer = None;
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match key {
            "secret" => secret = Some(percent_decode(value, true)?),
            "issuer" => issuer = Some(percent_decode(value, true)?),
            _ => {}
        }
    }

    let secret = secret
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidOtpUrl("missing secret parameter".into()))?;

    let label = percent_decode(label, false)?;
    Ok(OtpParams {
        secret,
        label: (!label.is_empty()).then_some(label),
        issuer,
    })
}

/// Minimal percent-decoding, sufficient for otpauth labels and issuers.
/// Escapes decode to raw bytes and the result must be valid UTF-8, so
/// multibyte sequences like `%C3%A9` come out intact. Malformed escapes
/// pass through verbatim. `+` means space only in query values
/// (`plus_is_space`), never in the path-segment label.
fn percent_decode(s: &str, plus_is_space: bool) -> Result<String> {
    let mut out = Vec::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                if let Some(byte) = s
                    .get(i + 1..i + 3)
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                {
                    out.push(byte);
                    i += 3;
                    continue;
                }
                out.push(b'%');
            }
            b'+' if plus_is_space => out.push(b' '),
            byte => out.push(byte),
        }
        i += 1;
    }
    String::from_utf8(out).map_err(|_| Error::InvalidOtpUrl(format!("invalid UTF-8 in {s:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_totp_url() {
        let params = parse_otp_url(
            "otpauth://totp/Example:alice%40example.com?secret=JBSWY3DPEHPK3PXP&issuer=Example",
        )
        .unwrap();
        assert_eq!(params.secret, "JBSWY3DPEHPK3PXP");
        assert_eq!(params.label.as_deref(), Some("Example:alice@example.com"));
        assert_eq!(params.issuer.as_deref(), Some("Example"));
    }

    #[test]
    fn parses_minimal_url() {
        let params = parse_otp_url("otpauth://totp/?secret=ABC234").unwrap();
        assert_eq!(params.secret, "ABC234");
        assert_eq!(params.label, None);
    }

    #[test]
    fn decodes_multibyte_utf8_escapes() {
        let params = parse_otp_url("otpauth://totp/Jos%C3%A9?secret=ABC234").unwrap();
        assert_eq!(params.label.as_deref(), Some("José"));

        let params =
            parse_otp_url("otpauth://totp/acct?secret=ABC234&issuer=M%C3%BCller").unwrap();
        assert_eq!(params.issuer.as_deref(), Some("Müller"));
    }

    #[test]
    fn plus_is_literal_in_labels_but_space_in_query_values() {
        let params = parse_otp_url("otpauth://totp/a+b?secret=ABC234&issuer=Acme+Corp").unwrap();
        assert_eq!(params.label.as_deref(), Some("a+b"));
        assert_eq!(params.issuer.as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn rejects_escapes_that_decode_to_invalid_utf8() {
        assert!(parse_otp_url("otpauth://totp/bad%FFlabel?secret=ABC234").is_err());
    }

    #[test]
    fn malformed_escapes_pass_through_verbatim() {
        let params = parse_otp_url("otpauth://totp/50%25off?secret=ABC234").unwrap();
        assert_eq!(params.label.as_deref(), Some("50%off"));
        let params = parse_otp_url("otpauth://totp/50%2off?secret=ABC234").unwrap();
        assert_eq!(params.label.as_deref(), Some("50%2off"));
    }

    #[test]
    fn rejects_non_otpauth_payloads() {
        assert!(parse_otp_url("https://example.com").is_err());
        assert!(parse_otp_url("not a url at all").is_err());
        assert!(parse_otp_url("").is_err());
    }

    #[test]
    fn rejects_missing_or_empty_secret() {
        assert!(parse_otp_url("otpauth://totp/acct?issuer=Example").is_err());
        assert!(parse_otp_url("otpauth://totp/acct?secret=").is_err());
    }

    #[test]
    fn rejects_unknown_otp_type() {
        assert!(parse_otp_url("otpauth://motp/acct?secret=ABC").is_err());
    }
}
