use std::fmt;
use std::io;
use std::sync::Arc;

use regex::{Captures, Regex};
use tracing_subscriber::fmt::MakeWriter;

/// Redacts credentials from formatted log output
#[derive(Clone)]
pub struct SecretScrubber {
    bearer_pattern: Regex,
    basic_pattern: Regex,
    field_pattern: Regex,
    private_key_pattern: Regex,
}

impl SecretScrubber {
    /// Compile the scrubbing patterns
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            // Authorization header values
            bearer_pattern: Regex::new(r"Bearer\s+[A-Za-z0-9\-_\.~+/=]+")?,
            basic_pattern: Regex::new(r"Basic\s+[A-Za-z0-9+/=]{8,}")?,
            // Secret-bearing fields in key=value and JSON form
            field_pattern: Regex::new(
                r#"(?i)(["']?(?:password|client_secret|private_key|access_token|secret)["']?\s*[:=]\s*)["']?[^"'\s,}]+["']?"#,
            )?,
            // PEM encoded keys, possibly spanning lines
            private_key_pattern: Regex::new(
                r"-----BEGIN [A-Z ]*PRIVATE KEY-----[\s\S]*?-----END [A-Z ]*PRIVATE KEY-----",
            )?,
        })
    }

    /// Scrub a message of sensitive data
    pub fn scrub_message(&self, message: &str) -> String {
        let scrubbed = self
            .private_key_pattern
            .replace_all(message, "[PRIVATE_KEY_REDACTED]");
        let scrubbed = self
            .bearer_pattern
            .replace_all(&scrubbed, "Bearer [TOKEN_REDACTED]");
        let scrubbed = self
            .basic_pattern
            .replace_all(&scrubbed, "Basic [CREDENTIALS_REDACTED]");
        self.field_pattern
            .replace_all(&scrubbed, |caps: &Captures| format!("{}[REDACTED]", &caps[1]))
            .into_owned()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}

/// [`MakeWriter`] that scrubs every formatted event before it is written
#[derive(Debug, Clone)]
pub struct ScrubbingMakeWriter<M> {
    inner: M,
    scrubber: Arc<SecretScrubber>,
}

impl<M> ScrubbingMakeWriter<M> {
    pub fn new(inner: M, scrubber: Arc<SecretScrubber>) -> Self {
        Self { inner, scrubber }
    }
}

impl<'a, M: MakeWriter<'a>> MakeWriter<'a> for ScrubbingMakeWriter<M> {
    type Writer = ScrubbingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        ScrubbingWriter {
            inner: self.inner.make_writer(),
            scrubber: Arc::clone(&self.scrubber),
        }
    }
}

/// Writer produced by [`ScrubbingMakeWriter`]
#[derive(Debug)]
pub struct ScrubbingWriter<W> {
    inner: W,
    scrubber: Arc<SecretScrubber>,
}

impl<W: io::Write> io::Write for ScrubbingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let scrubbed = self.scrubber.scrub_message(&text);
        self.inner.write_all(scrubbed.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
