//! Colored log output.
//!
//! Every service gets a stable ANSI color derived from its name, so
//! interleaved output from several services on one terminal can be told
//! apart at a glance. The color assignment is a pure function of the name;
//! the same service always logs in the same color.

use std::io::{self, Write};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const RESET: &str = "\x1b[0m";

/// Red, green, yellow, blue, magenta, cyan, gray, white.
const PALETTE: [&str; 8] = [
    "\x1b[31m", "\x1b[32m", "\x1b[33m", "\x1b[34m", "\x1b[35m", "\x1b[36m", "\x1b[37m", "\x1b[97m",
];

/// FNV-1a hash of `s`.
fn fnv1a(s: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for b in s.as_bytes() {
        hash ^= u32::from(*b);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// Stable palette color for a service name.
pub fn color_for(service: &str) -> &'static str {
    PALETTE[fnv1a(service) as usize % PALETTE.len()]
}

/// `MakeWriter` that brackets every record written to stderr in the
/// service's color.
#[derive(Clone)]
pub struct ColorWriter {
    color: &'static str,
}

impl ColorWriter {
    pub fn new(service: &str) -> Self {
        Self {
            color: color_for(service),
        }
    }
}

impl<'a> MakeWriter<'a> for ColorWriter {
    type Writer = ColorStderr;

    fn make_writer(&'a self) -> Self::Writer {
        ColorStderr { color: self.color }
    }
}

/// Stderr writer that wraps each write in an ANSI color code.
pub struct ColorStderr {
    color: &'static str,
}

impl Write for ColorStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut err = io::stderr().lock();
        err.write_all(self.color.as_bytes())?;
        err.write_all(buf)?;
        err.write_all(RESET.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().lock().flush()
    }
}

/// Install the process-wide subscriber, colored by `service`.
///
/// Call once at process start. Filtering follows `RUST_LOG`, defaulting to
/// `info`.
pub fn init(service: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(ColorWriter::new(service))
        .init();
}
