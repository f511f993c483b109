pub mod probe;
pub mod result;

pub mod prelude {
    pub use super::probe::HttpProbe;
    pub use super::report;
    pub use super::result::{HttpOutcome, ProbeResult};
}

use std::fmt::Write;

/// Renders an error and its whole source chain on a single line.
pub fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s
}
