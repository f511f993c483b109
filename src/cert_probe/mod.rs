pub mod probe;
pub mod result;

pub use probe::{CertificateError, CertificateProbe, insecure_diagnostic_connector};
pub use result::CertificateInfo;
