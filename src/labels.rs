//! Wallet labels kept in a SQLite `accounts` table.

use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{LabelsConfig, LoaderConfig};
use crate::error::LabelsError;
use crate::{runtime, BatchFn, Scope};

/// Name tag and labels known for one wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountLabels {
    /// The address exactly as it was requested.
    pub address: String,
    pub name: Option<String>,
    pub labels: Vec<String>,
}

/// A label scope: one per page-data request.
pub type LabelScope = Scope<String, AccountLabels, LabelStore>;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    chain_id TEXT NOT NULL,
    address  TEXT NOT NULL,
    name_tag TEXT,
    label    TEXT
);
CREATE INDEX IF NOT EXISTS accounts_chain_address
    ON accounts (chain_id, address COLLATE NOCASE);
";

/// Addresses bound per query, below SQLite's historical limit of 999 bound
/// parameters. Larger batches are split across several queries.
pub(crate) const MAX_KEYS_PER_QUERY: usize = 900;

/// Handle on the labels database. Clones share one connection, and queries
/// made through [`BatchFn::load`] run on the runtime's blocking pool.
#[derive(Clone)]
pub struct LabelStore {
    conn: Arc<Mutex<Connection>>,
    chain_id: String,
}

impl LabelStore {
    pub fn open(config: &LabelsConfig) -> Result<Self, LabelsError> {
        let conn = Connection::open(&config.database_url)?;
        tracing::info!(database = %config.database_url, chain_id = %config.chain_id, "opened label store");
        Ok(Self::from_connection(conn, &config.chain_id))
    }

    pub fn open_in_memory(chain_id: &str) -> Result<Self, LabelsError> {
        Ok(Self::from_connection(Connection::open_in_memory()?, chain_id))
    }

    pub fn from_connection(conn: Connection, chain_id: &str) -> Self {
        LabelStore {
            conn: Arc::new(Mutex::new(conn)),
            chain_id: chain_id.to_string(),
        }
    }

    pub fn create_schema(&self) -> Result<(), LabelsError> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Adds one `(address, name_tag, label)` row for this store's chain.
    pub fn insert(
        &self,
        address: &str,
        name_tag: Option<&str>,
        label: Option<&str>,
    ) -> Result<(), LabelsError> {
        self.conn().execute(
            "INSERT INTO accounts (chain_id, address, name_tag, label) VALUES (?1, ?2, ?3, ?4)",
            params![self.chain_id, address, name_tag, label],
        )?;
        Ok(())
    }

    /// A fresh resolution scope fetching from this store.
    pub fn scope(&self, config: &LoaderConfig) -> LabelScope {
        Scope::with_config(self.clone(), config)
    }

    /// Looks up all `keys`, in one query per [`MAX_KEYS_PER_QUERY`] distinct
    /// addresses.
    ///
    /// The database compares addresses case-insensitively; each row is handed
    /// to every requested key that matches it ignoring ASCII case, under the
    /// key as requested. When an address has several name tags the named,
    /// alphabetically first one wins.
    #[tracing::instrument(skip_all, fields(keys = keys.len()))]
    fn query(&self, keys: &[String]) -> Result<HashMap<String, AccountLabels>, LabelsError> {
        let mut found = HashMap::new();
        if keys.is_empty() {
            return Ok(found);
        }

        let mut requested: HashMap<String, Vec<&String>> = HashMap::new();
        for key in keys {
            requested
                .entry(key.to_ascii_lowercase())
                .or_default()
                .push(key);
        }
        let addresses = requested.keys().collect::<Vec<_>>();

        let conn = self.conn();
        for chunk in addresses.chunks(MAX_KEYS_PER_QUERY) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT address, name_tag, GROUP_CONCAT(label) AS labels
                 FROM accounts
                 WHERE chain_id = ? AND address COLLATE NOCASE IN ({})
                 GROUP BY address, name_tag
                 ORDER BY address, name_tag IS NULL, name_tag",
                placeholders
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(
                params_from_iter(std::iter::once(&self.chain_id).chain(chunk.iter().copied())),
                |row| {
                    let address: String = row.get(0)?;
                    let name: Option<String> = row.get(1)?;
                    let labels: Option<String> = row.get(2)?;
                    Ok((address, name, labels))
                },
            )?;

            for row in rows {
                let (address, name, labels) = row?;
                let matching = match requested.get(&address.to_ascii_lowercase()) {
                    Some(matching) => matching,
                    None => continue,
                };
                for key in matching {
                    found
                        .entry((*key).clone())
                        .or_insert_with(|| AccountLabels {
                            address: (*key).clone(),
                            name: name.clone(),
                            labels: split_labels(labels.as_deref()),
                        });
                }
            }
        }
        tracing::debug!(found = found.len(), "label rows matched");
        Ok(found)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn split_labels(labels: Option<&str>) -> Vec<String> {
    labels
        .map(|l| {
            l.split(',')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl BatchFn<String, AccountLabels> for LabelStore {
    type Error = LabelsError;

    async fn load(&mut self, keys: &[String]) -> Result<HashMap<String, AccountLabels>, LabelsError> {
        let store = self.clone();
        let keys = keys.to_vec();
        runtime::spawn_blocking(move || store.query(&keys)).await
    }
}
