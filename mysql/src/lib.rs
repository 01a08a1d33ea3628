//! MySQL and MariaDB support for sqlpack.
//!
//! Both servers share a wire protocol and most SQL, but only MariaDB (from
//! 10.5.0) accepts `INSERT ... RETURNING`. The flavor is read from the version
//! banner once per connection, so callers never compare adapter names.

use sqlpack_core::{
    Backend, BackendCapabilities, Executor, RawStatementResult, Result, ServerVersion,
    SqlPackError, Value,
};

/// Reports the server version banner, e.g. `10.6.12-MariaDB-log`.
pub const VERSION_SQL: &str = "SELECT VERSION()";

/// Reports `max_allowed_packet` as a `Variable_name`/`Value` row.
pub const MAX_ALLOWED_PACKET_SQL: &str = "SHOW VARIABLES LIKE 'max_allowed_packet'";

/// MariaDB servers before 11 prefix the handshake banner with this so that
/// old clients accept them.
const MARIADB_REPLICATION_PREFIX: &str = "5.5.5-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MysqlFlavor {
    MySql,
    MariaDb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MysqlCapabilities {
    flavor: MysqlFlavor,
    version: ServerVersion,
}

impl MysqlCapabilities {
    pub const fn new(flavor: MysqlFlavor, version: ServerVersion) -> Self {
        Self { flavor, version }
    }

    /// Reads flavor and version from a version banner.
    pub fn detect(banner: &str) -> Result<Self> {
        let trimmed = banner.trim();
        if trimmed.to_ascii_lowercase().contains("mariadb") {
            let stripped = trimmed
                .strip_prefix(MARIADB_REPLICATION_PREFIX)
                .unwrap_or(trimmed);
            return Ok(Self::new(MysqlFlavor::MariaDb, ServerVersion::parse(stripped)?));
        }
        Ok(Self::new(MysqlFlavor::MySql, ServerVersion::parse(trimmed)?))
    }

    pub fn flavor(&self) -> MysqlFlavor {
        self.flavor
    }
}

impl BackendCapabilities for MysqlCapabilities {
    fn backend(&self) -> Backend {
        match self.flavor {
            MysqlFlavor::MySql => Backend::MySql,
            MysqlFlavor::MariaDb => Backend::MariaDb,
        }
    }

    fn server_version(&self) -> ServerVersion {
        self.version
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn insert_modifiers(&self, ignore: bool) -> &'static [&'static str] {
        if ignore { &["IGNORE"] } else { &[] }
    }
}

/// Extracts the packet size from the output of [`MAX_ALLOWED_PACKET_SQL`]
/// (or of `SELECT @@max_allowed_packet`).
pub fn parse_max_allowed_packet(result: &RawStatementResult) -> Result<usize> {
    let row = result.rows.first().ok_or_else(|| {
        SqlPackError::ExecutionError("server did not report max_allowed_packet".into())
    })?;

    let index = result
        .column_index("Value")
        .unwrap_or_else(|| row.len().saturating_sub(1));

    row.get(index)
        .and_then(Value::as_i64)
        .and_then(|bytes| usize::try_from(bytes).ok())
        .ok_or_else(|| {
            SqlPackError::ExecutionError(format!(
                "unreadable max_allowed_packet value: {}",
                row.get(index).unwrap_or(&Value::Null)
            ))
        })
}

/// Runs the size-limit probe through `executor`.
pub fn probe_max_allowed_packet<E: Executor>(executor: &mut E) -> Result<usize> {
    let result = executor.execute(MAX_ALLOWED_PACKET_SQL)?;
    parse_max_allowed_packet(&result)
}

/// Runs the capability probe through `executor`.
pub fn probe_capabilities<E: Executor>(executor: &mut E) -> Result<MysqlCapabilities> {
    let result = executor.execute(VERSION_SQL)?;
    let banner = result
        .rows
        .first()
        .and_then(|row| row.first())
        .and_then(Value::as_str)
        .ok_or_else(|| SqlPackError::UnsupportedBackend("server did not report a version".into()))?;
    MysqlCapabilities::detect(banner)
}
