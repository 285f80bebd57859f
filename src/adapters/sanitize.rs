//! Log sanitization for identifiers, secrets and clinical values.
//!
//! The pipeline never formats raw measurements into log messages, but
//! third-party errors and debug output can. Every formatted log line is passed
//! through [`sanitize_with_limit`] by [`SanitizingMakeWriter`] before it reaches
//! the sink, replacing:
//! - UUIDs and medical record numbers
//! - Email addresses and phone numbers
//! - Secrets in `key=value` form and long hex runs (signing keys, digests)
//! - Patient values keyed by a feature identifier or `RawInput` field name
//!   (`mwaist=92.5`, `waist_circumference: 92.5`, `hypertension: Yes`)
//!
//! Input is capped to bound the cost of sanitizing very large lines.

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

/// Default cap on bytes sanitized per call (16 KiB).
pub const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

struct Patterns {
    set: RegexSet,
    rules: Vec<(Regex, &'static str)>,
}

const RULES: &[(&str, &str)] = &[
    (
        concat!(
            r"\b(?:hibpe|dyslipe|srh|adlab_cADL|tyg_bmi|mwaist|bl_wbc|bl_pltPlatelets|Cr_CysC_Ratio",
            r"|hypertension|dyslipidemia|self_rated_health|adl_difficulties",
            r"|waist_circumference|white_cell_count|platelet_count|creatinine_cystatin_ratio)\b",
            r#""?\s*[:=]\s*(?:-?[0-9]+(?:\.[0-9]+)?|[A-Za-z]+(?:\([0-9]+\))?)"#,
        ),
        "[REDACTED-MEASUREMENT]",
    ),
    (
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        "[REDACTED-UUID]",
    ),
    (r"\bMRN[:\s]?\d{6,10}\b", "[REDACTED-MRN]"),
    (
        r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
        "[REDACTED-EMAIL]",
    ),
    (
        r"\b(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}\b",
        "[REDACTED-PHONE]",
    ),
    (
        r"(?i)\b(?:secret|password|private[_-]?key|seed|signing[_-]?key|token)\b\s*[:=]\s*[A-Za-z0-9+/]{16,}={0,2}",
        "[REDACTED-SECRET]",
    ),
    (r"\b[0-9a-fA-F]{32,}\b", "[REDACTED-KEY]"),
];

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        set: RegexSet::new(RULES.iter().map(|(p, _)| *p)).expect("Valid regex set"),
        rules: RULES
            .iter()
            .map(|(p, r)| (Regex::new(p).expect("Valid regex"), *r))
            .collect(),
    })
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Sanitize with the default size cap.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, DEFAULT_SANITIZE_MAX_BYTES)
}

/// Replace sensitive patterns in at most `max_bytes` of `input`.
///
/// Truncated output ends with ` [TRUNCATED]`.
#[must_use]
pub fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    // Only rules that matched the prefix are applied, in rule order.
    for idx in patterns.set.matches(prefix).into_iter() {
        let (regex, replacement) = &patterns.rules[idx];
        result = regex.replace_all(&result, *replacement).into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// A `tracing_subscriber` writer wrapper that sanitizes formatted log output
/// line by line before it is written to the underlying sink.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
    max_bytes: usize,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self::with_limit(inner, DEFAULT_SANITIZE_MAX_BYTES)
    }

    #[must_use]
    pub fn with_limit(inner: M, max_bytes: usize) -> Self {
        Self {
            inner,
            max_bytes: max_bytes.max(1),
        }
    }
}

pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
    max_bytes: usize,
}

impl<W> SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        self.inner
            .write_all(sanitize_with_limit(&text, self.max_bytes).as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W> std::io::Write for SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A formatter that never emits a newline must not buffer without bound.
        if self.buffer.len() > self.max_bytes.saturating_mul(2) {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter {
            inner: self.inner.make_writer(),
            buffer: Vec::new(),
            max_bytes: self.max_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sanitize_measurements() {
        let input = "submission mwaist=92.5 bl_wbc: 7.1 band=LOW";
        let sanitized = sanitize(input);
        assert!(!sanitized.contains("92.5"));
        assert!(!sanitized.contains("7.1"));
        assert!(sanitized.contains("band=LOW"));
    }

    #[test]
    fn test_field_name_alone_is_kept() {
        let input = "The value for 'mwaist' is 0. Please enter a valid measurement.";
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn test_sanitize_uuid_and_mrn() {
        let sanitized = sanitize("Patient 550e8400-e29b-41d4-a716-446655440000 MRN:12345678");
        assert!(sanitized.contains("[REDACTED-UUID]"));
        assert!(sanitized.contains("[REDACTED-MRN]"));
    }

    #[test]
    fn test_sanitize_email() {
        let sanitized = sanitize("Contact: patient@hospital.com");
        assert!(sanitized.contains("[REDACTED-EMAIL]"));
    }

    #[test]
    fn test_sanitize_key_material() {
        let digest = "sha256 0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
        assert!(sanitize(digest).contains("[REDACTED-KEY]"));

        let seed = "seed=QWxhZGRpbjpvcGVuIHNlc2FtZSB3aXRoIGxvbmc=";
        assert!(sanitize(seed).contains("[REDACTED-SECRET]"));
    }

    #[test]
    fn test_sanitize_debug_formatted_input() {
        let sanitized = sanitize(&format!("rejected {:?}", crate::domain::sample_input()));
        for value in ["8.5", "80.0", "6.0", "250.0", "1.1", "Excellent", "AdlDifficulties(0)"] {
            assert!(!sanitized.contains(value), "{value} leaked: {sanitized}");
        }
        assert!(!sanitized.contains("hypertension: No"));
        assert!(sanitized.contains("waist_circumference"));
        assert_eq!(sanitized.matches("[REDACTED-MEASUREMENT]").count(), 9);
    }

    #[test]
    fn test_sanitize_json_keys() {
        let sanitized = sanitize(r#"{"mwaist":92.5,"band":"HIGH"}"#);
        assert!(!sanitized.contains("92.5"));
        assert!(sanitized.contains("HIGH"));
    }

    #[test]
    fn test_truncates_large_inputs() {
        let sanitized = sanitize_with_limit("prefix ééé suffix", 9);
        assert!(sanitized.ends_with(" [TRUNCATED]"));
    }

    #[test]
    fn test_writer_sanitizes_each_line() {
        let mut sink = Vec::new();
        {
            let mut writer = SanitizingWriter {
                inner: &mut sink,
                buffer: Vec::new(),
                max_bytes: DEFAULT_SANITIZE_MAX_BYTES,
            };
            writer.write_all(b"first mwaist=80.0\nsecond ").expect("write");
            writer.write_all(b"bl_wbc=6.0\n").expect("write");
        }
        let out = String::from_utf8(sink).expect("utf8");
        assert_eq!(out.lines().count(), 2);
        assert!(!out.contains("80.0"));
        assert!(!out.contains("6.0"));
    }
}
