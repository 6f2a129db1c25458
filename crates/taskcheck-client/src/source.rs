//! Import source URIs.
//!
//! The service pulls image data itself; the harness only checks that
//! `import_from` uses a scheme the service understands before submitting.

use std::fmt;

use taskcheck_common::error::{HarnessError, Result};

/// Location the service imports image data from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    /// Plain or TLS HTTP download (`http://`, `https://`).
    Http(String),
    /// Object in the service's swift store (`swift://container/object`).
    Swift {
        /// Container holding the object.
        container: String,
        /// Object name inside the container.
        object: String,
    },
}

impl fmt::Display for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(url) => write!(f, "{url}"),
            Self::Swift { container, object } => write!(f, "swift://{container}/{object}"),
        }
    }
}

/// Resolves an `import_from` URI into an `ImportSource`.
///
/// # Errors
///
/// Returns an error if the scheme is unsupported or the URI has no target.
pub fn resolve_source(uri: &str) -> Result<ImportSource> {
    if let Some(rest) = uri.strip_prefix("https://").or_else(|| uri.strip_prefix("http://")) {
        if rest.is_empty() {
            return Err(HarnessError::Config {
                message: format!("import source has no host: {uri}"),
            });
        }
        tracing::debug!(url = uri, "resolved http import source");
        Ok(ImportSource::Http(uri.to_string()))
    } else if let Some(rest) = uri.strip_prefix("swift://") {
        let Some((container, object)) = rest.split_once('/') else {
            return Err(HarnessError::Config {
                message: format!("swift import source needs container/object: {uri}"),
            });
        };
        if container.is_empty() || object.is_empty() {
            return Err(HarnessError::Config {
                message: format!("swift import source needs container/object: {uri}"),
            });
        }
        tracing::debug!(container, object, "resolved swift import source");
        Ok(ImportSource::Swift {
            container: container.to_string(),
            object: object.to_string(),
        })
    } else {
        Err(HarnessError::Config {
            message: format!("unsupported import source URI scheme: {uri}"),
        })
    }
}
