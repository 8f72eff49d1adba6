use thiserror::Error;

/// Errors raised at the jar's API boundary.
///
/// Malformed protocol input never lands here: unrecognized header lines,
/// lead segments without `name=value`, and unknown attributes are tolerated
/// at parse time. These variants mark caller mistakes, which must surface
/// immediately instead of disappearing into the lenient path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JarError {
    /// The supplied URL cannot name a host (`mailto:`, `data:`, ...), so
    /// there is nothing to match cookies against.
    #[error("URL '{url}' does not name a host")]
    UrlMissingHost { url: String },

    /// A directly-injected record is structurally unusable.
    #[error("cookie record rejected: {reason}")]
    InvalidRecord { reason: &'static str },
}
