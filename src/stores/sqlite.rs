//! SQLite chunk store with vector search via `sqlite-vec`.
//!
//! Two tables share a rowid: `chunks` holds the text and metadata, the
//! `chunks_vec` vec0 virtual table holds the embedding. Similarity search is
//! a single `vec_distance_cosine` query joining the two.

use std::mem::transmute;
use std::os::raw::c_char;
use std::path::Path;
use std::sync::OnceLock;

use async_trait::async_trait;
use tokio_rusqlite::{Connection, ffi};

use super::{ChunkRecord, VectorBackend};
use crate::types::RagError;

#[derive(Clone)]
pub struct SqliteChunkStore {
    conn: Connection,
}

impl SqliteChunkStore {
    /// Opens (or creates) the index at `path` with the given embedding
    /// dimension, creating parent directories as needed.
    pub async fn open(path: impl AsRef<Path>, dim: usize) -> Result<Self, RagError> {
        register_sqlite_vec()?;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let conn = Connection::open(path.to_path_buf())
            .await
            .map_err(tokio_rusqlite::Error::from)?;

        // Fail fast if the extension did not load.
        conn.call(|conn| {
            match conn.query_row("select vec_version()", [], |row| row.get::<_, String>(0)) {
                Ok(_) => Ok(()),
                Err(err) => Err(err),
            }
        })
        .await?;

        conn.call(move |conn| {
            conn.execute(
                "CREATE TABLE IF NOT EXISTS chunks (
                    id TEXT PRIMARY KEY,
                    url TEXT,
                    chunk_index TEXT,
                    content TEXT
                )",
                [],
            )?;
            conn.execute(
                "CREATE INDEX IF NOT EXISTS idx_chunks_url ON chunks(url)",
                [],
            )?;
            conn.execute(
                &format!(
                    "CREATE VIRTUAL TABLE IF NOT EXISTS chunks_vec USING vec0(embedding float[{dim}])"
                ),
                [],
            )?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl VectorBackend for SqliteChunkStore {
    async fn insert_chunks(&self, chunks: Vec<ChunkRecord>) -> Result<(), RagError> {
        if chunks.is_empty() {
            return Ok(());
        }

        let mut rows = Vec::with_capacity(chunks.len());
        for record in chunks {
            let embedding = record.embedding.ok_or_else(|| {
                RagError::Storage(format!("chunk {} has no embedding", record.id))
            })?;
            let embedding_json = serde_json::to_string(&embedding)
                .map_err(|err| RagError::Storage(err.to_string()))?;
            rows.push((
                record.id,
                record.url,
                record.chunk_index.to_string(),
                record.content,
                embedding_json,
            ));
        }

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for (id, url, chunk_index, content, embedding_json) in &rows {
                    tx.execute(
                        "INSERT INTO chunks (id, url, chunk_index, content) VALUES (?1, ?2, ?3, ?4)",
                        [id, url, chunk_index, content],
                    )?;
                    // The vec row reuses the rowid of the chunk inserted just above.
                    tx.execute(
                        "INSERT INTO chunks_vec (rowid, embedding) VALUES (last_insert_rowid(), ?1)",
                        [embedding_json],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(RagError::from)
    }

    async fn search_similar(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<(ChunkRecord, f32)>, RagError> {
        let embedding_json = serde_json::to_string(query_embedding)
            .map_err(|err| RagError::Storage(err.to_string()))?;

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT c.id, c.url, c.chunk_index, c.content, \
                     vec_distance_cosine(v.embedding, vec_f32(?1)) AS distance \
                     FROM chunks c \
                     JOIN chunks_vec v ON v.rowid = c.rowid \
                     ORDER BY distance ASC \
                     LIMIT {top_k}"
                ))?;

                let rows = stmt.query_map([&embedding_json], |row| {
                    let record = ChunkRecord {
                        id: row.get(0)?,
                        url: row.get(1)?,
                        chunk_index: row.get::<_, String>(2)?.parse().unwrap_or(0),
                        content: row.get(3)?,
                        embedding: None,
                    };
                    let distance: f32 = row.get(4)?;
                    Ok((record, 1.0 - distance))
                })?;

                let mut results = Vec::new();
                for row in rows {
                    results.push(row?);
                }
                Ok(results)
            })
            .await
            .map_err(RagError::from)
    }

    async fn count(&self) -> Result<usize, RagError> {
        self.conn
            .call(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
            .map_err(RagError::from)
    }
}

fn register_sqlite_vec() -> Result<(), RagError> {
    static REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();

    let result = REGISTERED.get_or_init(|| unsafe {
        type SqliteExtensionInit = unsafe extern "C" fn(
            *mut ffi::sqlite3,
            *mut *mut c_char,
            *const ffi::sqlite3_api_routines,
        ) -> i32;

        let init: unsafe extern "C" fn() = sqlite_vec::sqlite3_vec_init;
        let init_fn: SqliteExtensionInit =
            transmute::<unsafe extern "C" fn(), SqliteExtensionInit>(init);
        let rc = ffi::sqlite3_auto_extension(Some(init_fn));
        if rc != ffi::SQLITE_OK {
            Err(format!("failed to register sqlite-vec extension (code {rc})"))
        } else {
            Ok(())
        }
    });

    result.clone().map_err(RagError::Storage)
}
