//! Local chunk index in SQLite, searched by brute-force cosine similarity.

use super::{Chunk, VectorSearch};
use crate::partition::DomainPartition;
use async_trait::async_trait;
use floorwise_core::{AppError, AppResult};
use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};

/// Chunk index file shared with the ingestion job.
///
/// Rows live in a single `chunks` table tagged with the partition's index
/// name. Each search opens its own read-only connection on a blocking thread.
#[derive(Debug, Clone)]
pub struct SqliteChunkIndex {
    path: PathBuf,
}

impl SqliteChunkIndex {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl VectorSearch for SqliteChunkIndex {
    fn backend_name(&self) -> &str {
        "sqlite"
    }

    async fn search(
        &self,
        partition: DomainPartition,
        vector: &[f32],
        k: usize,
    ) -> AppResult<Vec<Chunk>> {
        let path = self.path.clone();
        let vector = vector.to_vec();

        tokio::task::spawn_blocking(move || {
            let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)
                .map_err(|e| {
                    AppError::Search(format!("Failed to open chunk index {:?}: {}", path, e))
                })?;
            query_chunks(&conn, partition.index_name(), &vector, k)
        })
        .await
        .map_err(|e| AppError::Search(format!("Chunk search task failed: {}", e)))?
    }
}

/// Create the chunk table if needed.
pub fn init_index(path: &Path) -> AppResult<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)
        .map_err(|e| AppError::Search(format!("Failed to open chunk index: {}", e)))?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS chunks (
            id TEXT PRIMARY KEY,
            index_name TEXT NOT NULL,
            content TEXT NOT NULL,
            embedding BLOB NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_chunks_index_name ON chunks(index_name);
        "#,
    )
    .map_err(|e| AppError::Search(format!("Failed to create chunk table: {}", e)))?;

    Ok(conn)
}

/// Store one chunk with its embedding.
pub fn insert_chunk(
    conn: &Connection,
    index_name: &str,
    chunk: &Chunk,
    embedding: &[f32],
) -> AppResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO chunks (id, index_name, content, embedding) VALUES (?1, ?2, ?3, ?4)",
        params![chunk.id, index_name, chunk.text, embedding_to_bytes(embedding)],
    )
    .map_err(|e| AppError::Search(format!("Failed to insert chunk: {}", e)))?;
    Ok(())
}

fn query_chunks(
    conn: &Connection,
    index_name: &str,
    query: &[f32],
    k: usize,
) -> AppResult<Vec<Chunk>> {
    let mut stmt = conn
        .prepare("SELECT id, content, embedding FROM chunks WHERE index_name = ?1 ORDER BY id")
        .map_err(|e| AppError::Search(format!("Failed to prepare chunk query: {}", e)))?;

    let rows = stmt
        .query_map(params![index_name], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Vec<u8>>(2)?,
            ))
        })
        .map_err(|e| AppError::Search(format!("Failed to query chunks: {}", e)))?;

    let mut scored = Vec::new();
    for row in rows {
        let (id, text, bytes) =
            row.map_err(|e| AppError::Search(format!("Failed to read chunk row: {}", e)))?;
        let embedding = bytes_to_embedding(&bytes)?;
        scored.push((Chunk { id, text }, cosine_similarity(query, &embedding)));
    }

    // Stable sort keeps id order among ties.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);

    Ok(scored.into_iter().map(|(chunk, _)| chunk).collect())
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Search(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seeded_index(dir: &TempDir) -> SqliteChunkIndex {
        let path = dir.path().join("chunks.sqlite");
        let conn = init_index(&path).unwrap();

        insert_chunk(&conn, "soft-surface", &Chunk::new("c1", "Collection: Horizon"), &[1.0, 0.0, 0.0]).unwrap();
        insert_chunk(&conn, "soft-surface", &Chunk::new("c2", "Loop pile"), &[0.7, 0.7, 0.0]).unwrap();
        insert_chunk(&conn, "soft-surface", &Chunk::new("c3", "Unrelated"), &[0.0, 0.0, 1.0]).unwrap();
        insert_chunk(&conn, "hard-surface", &Chunk::new("h1", "Rigid core"), &[1.0, 0.0, 0.0]).unwrap();

        SqliteChunkIndex::new(path)
    }

    #[tokio::test]
    async fn test_search_ranks_by_similarity() {
        let dir = TempDir::new().unwrap();
        let index = seeded_index(&dir);

        let chunks = index
            .search(DomainPartition::SoftSurface, &[1.0, 0.1, 0.0], 10)
            .await
            .unwrap();

        let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
        // no threshold: the orthogonal chunk is still returned
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
    }

    #[tokio::test]
    async fn test_search_respects_k_and_partition() {
        let dir = TempDir::new().unwrap();
        let index = seeded_index(&dir);

        let chunks = index
            .search(DomainPartition::SoftSurface, &[1.0, 0.0, 0.0], 1)
            .await
            .unwrap();
        assert_eq!(chunks, vec![Chunk::new("c1", "Collection: Horizon")]);

        let hard = index
            .search(DomainPartition::HardSurface, &[1.0, 0.0, 0.0], 10)
            .await
            .unwrap();
        assert_eq!(hard.len(), 1);
        assert_eq!(hard[0].id, "h1");
    }

    #[tokio::test]
    async fn test_missing_index_is_search_error() {
        let dir = TempDir::new().unwrap();
        let index = SqliteChunkIndex::new(dir.path().join("absent.sqlite"));

        let result = index.search(DomainPartition::All, &[1.0], 5).await;
        assert!(matches!(result, Err(AppError::Search(_))));
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 0.001);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_embedding_bytes_round_trip() {
        let v = vec![0.25f32, -1.5, 3.0];
        assert_eq!(bytes_to_embedding(&embedding_to_bytes(&v)).unwrap(), v);
        assert!(bytes_to_embedding(&[0u8; 3]).is_err());
    }
}
