//! Backend capabilities, selected once per connection.

use core::fmt;
use core::str::FromStr;

use compact_str::CompactString;

use crate::error::{Result, SqlPackError};

/// Database families the batching layer knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Backend {
    MySql,
    MariaDb,
    Sqlite,
    Postgres,
}

impl Backend {
    pub const fn name(&self) -> &'static str {
        match self {
            Backend::MySql => "mysql",
            Backend::MariaDb => "mariadb",
            Backend::Sqlite => "sqlite",
            Backend::Postgres => "postgres",
        }
    }

    /// First server version accepting `INSERT ... RETURNING`, if any.
    pub const fn returning_since(&self) -> Option<ServerVersion> {
        match self {
            Backend::MySql => None,
            Backend::MariaDb => Some(ServerVersion::new(10, 5, 0)),
            Backend::Sqlite => Some(ServerVersion::new(3, 35, 0)),
            Backend::Postgres => Some(ServerVersion::new(8, 2, 0)),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses an adapter name as reported by connection configuration.
impl FromStr for Backend {
    type Err = SqlPackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mysql2" | "trilogy" => Ok(Backend::MySql),
            "mariadb" => Ok(Backend::MariaDb),
            "sqlite" | "sqlite3" => Ok(Backend::Sqlite),
            "postgres" | "postgresql" | "postgis" => Ok(Backend::Postgres),
            _ => Err(SqlPackError::UnsupportedBackend(s.to_owned())),
        }
    }
}

/// `major.minor.patch`, compared component by component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Reads the leading `major[.minor[.patch]]` of a version banner such as
    /// `8.0.34-0ubuntu0.22.04.1` or `15.4 (Debian 15.4-1.pgdg120+1)`.
    /// Missing components are zero.
    pub fn parse(banner: &str) -> Result<Self> {
        let trimmed = banner.trim();
        let end = trimmed
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(trimmed.len());
        let numeric = &trimmed[..end];

        let unrecognized =
            || SqlPackError::UnsupportedBackend(format!("unrecognized server version `{banner}`"));

        if numeric.is_empty() || numeric.starts_with('.') {
            return Err(unrecognized());
        }

        let mut parts = numeric.split('.').filter(|p| !p.is_empty());
        let mut next = || -> Result<u32> {
            parts
                .next()
                .map_or(Ok(0), |p| p.parse().map_err(|_| unrecognized()))
        };

        Ok(Self::new(next()?, next()?, next()?))
    }
}

impl FromStr for ServerVersion {
    type Err = SqlPackError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// What a connected server can do.
///
/// Drivers build this once when a connection is wrapped; callers never branch
/// on adapter names afterwards.
pub trait BackendCapabilities: fmt::Debug + Send + Sync {
    fn backend(&self) -> Backend;

    fn server_version(&self) -> ServerVersion;

    fn supports_returning(&self) -> bool {
        self.backend()
            .returning_since()
            .is_some_and(|since| self.server_version() >= since)
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Tokens placed between `INSERT` and `INTO`.
    fn insert_modifiers(&self, ignore: bool) -> &'static [&'static str] {
        let _ = ignore;
        &[]
    }

    /// Quoted, comma-separated column list for a `RETURNING` clause.
    fn returning_clause(&self, columns: &[CompactString]) -> String {
        columns
            .iter()
            .map(|c| self.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Capabilities for backends using standard double-quoted identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardCapabilities {
    backend: Backend,
    version: ServerVersion,
}

impl StandardCapabilities {
    pub const fn sqlite(version: ServerVersion) -> Self {
        Self {
            backend: Backend::Sqlite,
            version,
        }
    }

    pub const fn postgres(version: ServerVersion) -> Self {
        Self {
            backend: Backend::Postgres,
            version,
        }
    }
}

impl BackendCapabilities for StandardCapabilities {
    fn backend(&self) -> Backend {
        self.backend
    }

    fn server_version(&self) -> ServerVersion {
        self.version
    }

    fn insert_modifiers(&self, ignore: bool) -> &'static [&'static str] {
        match (self.backend, ignore) {
            (Backend::Sqlite, true) => &["OR IGNORE"],
            _ => &[],
        }
    }
}
