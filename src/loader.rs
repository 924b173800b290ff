//! Input table loading.
//!
//! Three comma-separated tables, each with a header row:
//!
//! | Table | Columns |
//! |---|---|
//! | costs | `user_id,cost` |
//! | haters | `user_id[,weight]` (weight defaults to 0) |
//! | friendships | `user,friend` |
//!
//! Blank lines are ignored. A friendship listed twice (in either
//! direction) is skipped with a warning; every other malformed row fails
//! the load.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::store::{GraphBuilder, GraphError, SocialGraph};
use crate::types::NodeId;

/// Input table kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    /// Influencer costs.
    Costs,
    /// Haters and their weights.
    Haters,
    /// Undirected friendships.
    Friendships,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Costs => write!(f, "costs"),
            Self::Haters => write!(f, "haters"),
            Self::Friendships => write!(f, "friendships"),
        }
    }
}

/// Error type for table loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Reading a table failed.
    #[error("Failed to read {table} table: {source}")]
    Io {
        /// Table being read.
        table: Table,
        /// File path, when loading from disk.
        path: Option<PathBuf>,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// A row could not be parsed.
    #[error("{table} table, line {line}: {message}")]
    Parse {
        /// Table containing the row.
        table: Table,
        /// 1-based line number (the header is line 1).
        line: usize,
        /// What was wrong.
        message: String,
    },
    /// The rows are individually valid but inconsistent as a graph.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Paths of the three input tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePaths {
    /// Costs table.
    pub costs: PathBuf,
    /// Haters table.
    pub haters: PathBuf,
    /// Friendships table.
    pub friendships: PathBuf,
}

impl TablePaths {
    /// Open and load all three tables.
    pub fn load(&self) -> Result<SocialGraph, LoadError> {
        let open = |table: Table, path: &Path| {
            File::open(path).map(BufReader::new).map_err(|source| LoadError::Io {
                table,
                path: Some(path.to_path_buf()),
                source,
            })
        };
        load_tables(
            open(Table::Costs, &self.costs)?,
            open(Table::Haters, &self.haters)?,
            open(Table::Friendships, &self.friendships)?,
        )
    }
}

/// Build a graph from the three tables.
///
/// Costs are loaded first, then haters, then friendships; a user listed
/// as both influencer and hater fails with
/// [`GraphError::InconsistentRole`]. Friendship endpoints not listed in
/// either role table become plain users.
pub fn load_tables<C, H, F>(costs: C, haters: H, friendships: F) -> Result<SocialGraph, LoadError>
where
    C: BufRead,
    H: BufRead,
    F: BufRead,
{
    let mut builder = GraphBuilder::new();

    for row in rows(Table::Costs, costs)? {
        let [id, cost] = row.fields::<2>()?;
        builder.add_influencer(row.node(id)?, row.number(cost)?)?;
    }

    for row in rows(Table::Haters, haters)? {
        let (id, weight) = match row.columns.as_slice() {
            [id] => (row.node(id)?, 0.0),
            [id, weight] => (row.node(id)?, row.number(weight)?),
            _ => return Err(row.error(format!("expected 1 or 2 columns, found {}", row.columns.len()))),
        };
        builder.add_hater(id, weight)?;
    }

    let mut skipped = 0usize;
    for row in rows(Table::Friendships, friendships)? {
        let [user, friend] = row.fields::<2>()?;
        let (user, friend) = (row.node(user)?, row.node(friend)?);
        if user == friend {
            return Err(row.error(format!("self-referential friendship for user {user}")));
        }
        if builder.contains_edge(user, friend) {
            tracing::warn!(
                line = row.line,
                user = %user,
                friend = %friend,
                "Skipping duplicate friendship"
            );
            skipped += 1;
            continue;
        }
        builder.add_edge(user, friend)?;
    }

    let graph = builder.build();
    tracing::info!(
        nodes = graph.all_nodes().count(),
        edges = graph.all_edges().len(),
        haters = graph.haters().len(),
        skipped_duplicates = skipped,
        "Loaded social graph"
    );
    Ok(graph)
}

struct Row {
    table: Table,
    line: usize,
    columns: Vec<String>,
}

impl Row {
    fn error(&self, message: String) -> LoadError {
        LoadError::Parse {
            table: self.table,
            line: self.line,
            message,
        }
    }

    fn fields<const N: usize>(&self) -> Result<[&str; N], LoadError> {
        if self.columns.len() != N {
            return Err(self.error(format!("expected {N} columns, found {}", self.columns.len())));
        }
        let mut fields = [""; N];
        for (slot, column) in fields.iter_mut().zip(&self.columns) {
            *slot = column.as_str();
        }
        Ok(fields)
    }

    fn node(&self, field: &str) -> Result<NodeId, LoadError> {
        field
            .parse::<NodeId>()
            .map_err(|e| self.error(format!("invalid user id {field:?}: {e}")))
    }

    fn number(&self, field: &str) -> Result<f64, LoadError> {
        field
            .parse::<f64>()
            .map_err(|e| self.error(format!("invalid number {field:?}: {e}")))
    }
}

/// Split a table into data rows, dropping the header and blank lines.
fn rows<R: BufRead>(table: Table, reader: R) -> Result<Vec<Row>, LoadError> {
    let mut rows = Vec::new();
    let mut header_seen = false;

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| LoadError::Io {
            table,
            path: None,
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !header_seen {
            header_seen = true;
            continue;
        }
        rows.push(Row {
            table,
            line: index + 1,
            columns: trimmed.split(',').map(|c| c.trim().to_string()).collect(),
        });
    }
    Ok(rows)
}
