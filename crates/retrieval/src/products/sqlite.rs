//! SQLite product store.

use super::{ProductRecord, ProductSession, ProductStore};
use crate::filters::{FieldMapping, FilterField, Predicate, PredicateKind};
use floorwise_core::{AppError, AppResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const PRODUCT_COLUMNS: &[&str] = &[
    "sku",
    "style_name",
    "collection_name",
    "marketing_color_name",
    "construction",
    "backing_description",
    "product_classification",
];

/// Product store over a `products` table.
///
/// Opening the store checks that every column the field mapping refers to
/// exists. Each session owns one read-only connection.
#[derive(Debug, Clone)]
pub struct SqliteProductStore {
    path: PathBuf,
}

impl SqliteProductStore {
    /// Open the store and validate the field mapping against the schema.
    ///
    /// # Errors
    /// `AppError::Store` if the database cannot be opened, `AppError::Config`
    /// if a mapped or required column is missing.
    pub fn open(path: impl Into<PathBuf>, mapping: &FieldMapping) -> AppResult<Self> {
        let path = path.into();
        let conn = open_read_only(&path)?;

        let existing = table_columns(&conn)?;
        if existing.is_empty() {
            return Err(AppError::Config(format!(
                "No products table in {:?}",
                path
            )));
        }

        let missing: Vec<&str> = PRODUCT_COLUMNS
            .iter()
            .copied()
            .chain(mapping.columns())
            .filter(|column| !existing.contains(*column))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "products table is missing columns: {}",
                missing.join(", ")
            )));
        }

        tracing::debug!(path = ?path, columns = existing.len(), "Opened product store");
        Ok(Self { path })
    }
}

impl ProductStore for SqliteProductStore {
    fn open_session(&self) -> AppResult<Box<dyn ProductSession>> {
        Ok(Box::new(SqliteSession {
            conn: open_read_only(&self.path)?,
        }))
    }
}

struct SqliteSession {
    conn: Connection,
}

impl ProductSession for SqliteSession {
    fn query(&mut self, predicates: &[Predicate], limit: usize) -> AppResult<Vec<ProductRecord>> {
        if predicates.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let (where_clause, mut values) = build_where(predicates);
        values.push(Value::Integer(limit as i64));

        let sql = format!(
            "SELECT {} FROM products WHERE {} ORDER BY sku ASC LIMIT ?",
            PRODUCT_COLUMNS.join(", "),
            where_clause
        );
        tracing::debug!(sql = %sql, "Querying products");

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| AppError::Store(format!("Failed to prepare product query: {}", e)))?;

        let rows = stmt
            .query_map(params_from_iter(values), |row| {
                Ok(ProductRecord {
                    sku: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    style_name: row.get(1)?,
                    collection_name: row.get(2)?,
                    marketing_color_name: row.get(3)?,
                    construction: row.get(4)?,
                    backing_description: row.get(5)?,
                    product_classification: row.get(6)?,
                })
            })
            .map_err(|e| AppError::Store(format!("Failed to query products: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Store(format!("Failed to read product row: {}", e)))
    }
}

fn build_where(predicates: &[Predicate]) -> (String, Vec<Value>) {
    let mut clauses = Vec::with_capacity(predicates.len());
    let mut values = Vec::new();

    for predicate in predicates {
        let column = predicate.column;
        match &predicate.kind {
            PredicateKind::Membership(items) if items.is_empty() => clauses.push("0".to_string()),
            PredicateKind::Membership(items) => {
                let placeholders = vec!["?"; items.len()].join(", ");
                clauses.push(format!("\"{}\" IN ({})", column, placeholders));
                values.extend(items.iter().cloned().map(Value::Text));
            }
            PredicateKind::Contains(text) => {
                clauses.push(format!("\"{}\" LIKE ? ESCAPE '\\'", column));
                values.push(Value::Text(format!("%{}%", escape_like(text))));
            }
        }
    }

    (clauses.join(" AND "), values)
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn open_read_only(path: &Path) -> AppResult<Connection> {
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| AppError::Store(format!("Failed to open product store {:?}: {}", path, e)))
}

fn table_columns(conn: &Connection) -> AppResult<HashSet<String>> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info('products')")
        .map_err(|e| AppError::Store(format!("Failed to inspect products table: {}", e)))?;

    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| AppError::Store(format!("Failed to inspect products table: {}", e)))?;

    names
        .collect::<Result<HashSet<_>, _>>()
        .map_err(|e| AppError::Store(format!("Failed to inspect products table: {}", e)))
}

/// Create a `products` table with a text column for every filter field.
/// Used by fixtures and local development databases.
pub fn init_schema(path: &Path) -> AppResult<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)
        .map_err(|e| AppError::Store(format!("Failed to create product store: {}", e)))?;

    let columns: Vec<String> = FilterField::ALL
        .iter()
        .map(|field| match field {
            FilterField::Sku => "\"sku\" TEXT PRIMARY KEY".to_string(),
            other => format!("\"{}\" TEXT", other.column()),
        })
        .collect();

    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS products ({});",
        columns.join(", ")
    ))
    .map_err(|e| AppError::Store(format!("Failed to create products table: {}", e)))?;

    Ok(conn)
}

/// Insert or replace one product row.
pub fn insert_product(conn: &Connection, record: &ProductRecord) -> AppResult<()> {
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO products ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            PRODUCT_COLUMNS.join(", ")
        ),
        rusqlite::params![
            record.sku,
            record.style_name,
            record.collection_name,
            record.marketing_color_name,
            record.construction,
            record.backing_description,
            record.product_classification,
        ],
    )
    .map_err(|e| AppError::Store(format!("Failed to insert product: {}", e)))?;
    Ok(())
}
