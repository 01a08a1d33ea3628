//! Picks the capability implementation for a backend once, at connect time.

use sqlpack_core::{Backend, BackendCapabilities, Result, ServerVersion, StandardCapabilities};

/// Capabilities for `backend` given the server's version banner.
pub fn capabilities(backend: Backend, banner: &str) -> Result<Box<dyn BackendCapabilities>> {
    match backend {
        Backend::MySql | Backend::MariaDb => mysql_capabilities(banner),
        Backend::Sqlite => Ok(Box::new(StandardCapabilities::sqlite(
            ServerVersion::parse(banner)?,
        ))),
        Backend::Postgres => Ok(Box::new(StandardCapabilities::postgres(
            ServerVersion::parse(banner)?,
        ))),
    }
}

/// Like [`capabilities`], starting from an adapter name such as `mysql2` or
/// `postgresql`.
pub fn capabilities_for_adapter(
    adapter: &str,
    banner: &str,
) -> Result<Box<dyn BackendCapabilities>> {
    capabilities(adapter.parse()?, banner)
}

#[cfg(feature = "mysql")]
fn mysql_capabilities(banner: &str) -> Result<Box<dyn BackendCapabilities>> {
    Ok(Box::new(sqlpack_mysql::MysqlCapabilities::detect(banner)?))
}

#[cfg(not(feature = "mysql"))]
fn mysql_capabilities(_banner: &str) -> Result<Box<dyn BackendCapabilities>> {
    Err(sqlpack_core::SqlPackError::UnsupportedBackend(
        "mysql support requires the `mysql` feature".into(),
    ))
}
