//! sqlite-vec backed segment store.
//!
//! One `segments` table holds the citation fields, the attributes as JSON,
//! and the embedding as a JSON float array that sqlite-vec's `vec_f32`
//! converts at query time. The extension is registered process-wide exactly
//! once before the first connection opens.

use std::mem::transmute;
use std::os::raw::c_char;
use std::path::Path;
use std::sync::Once;

use async_trait::async_trait;
use tokio_rusqlite::{Connection, ffi};
use tracing::debug;

use super::{SearchHit, SegmentStore, StoredSegment};
use crate::chunking::Segment;
use crate::types::HavrutaError;

#[derive(Clone)]
pub struct SqliteSegmentStore {
    conn: Connection,
    dimension: usize,
}

impl SqliteSegmentStore {
    /// Opens (and creates, if needed) the database at `path`, expecting all
    /// embeddings to have `dimension` components.
    pub async fn open(path: impl AsRef<Path>, dimension: usize) -> Result<Self, HavrutaError> {
        register_sqlite_vec()?;
        let conn = Connection::open(path)
            .await
            .map_err(|err| HavrutaError::Storage(err.to_string()))?;

        conn.call(|conn| {
            conn.query_row("select vec_version()", [], |row| row.get::<_, String>(0))
                .map_err(tokio_rusqlite::Error::Rusqlite)?;
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS segments (
                    id         TEXT PRIMARY KEY,
                    category   TEXT NOT NULL,
                    reference  TEXT NOT NULL,
                    content    TEXT NOT NULL,
                    attributes TEXT NOT NULL,
                    embedding  TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_segments_category ON segments(category);",
            )
            .map_err(tokio_rusqlite::Error::Rusqlite)?;
            Ok(())
        })
        .await
        .map_err(|err| HavrutaError::Storage(err.to_string()))?;

        Ok(Self { conn, dimension })
    }
}

#[async_trait]
impl SegmentStore for SqliteSegmentStore {
    async fn insert_segments(
        &self,
        segments: Vec<(Segment, Vec<f32>)>,
    ) -> Result<(), HavrutaError> {
        if segments.is_empty() {
            return Ok(());
        }
        for (_, embedding) in &segments {
            if embedding.len() != self.dimension {
                return Err(HavrutaError::DimensionMismatch {
                    got: embedding.len(),
                    expected: self.dimension,
                });
            }
        }

        let mut rows = Vec::with_capacity(segments.len());
        for (segment, embedding) in segments {
            let stored = StoredSegment::from(segment);
            let attributes = serde_json::to_string(&stored.attributes)
                .map_err(|err| HavrutaError::Storage(err.to_string()))?;
            let embedding = serde_json::to_string(&embedding)
                .map_err(|err| HavrutaError::Storage(err.to_string()))?;
            rows.push((
                stored.id,
                stored.category.as_str().to_string(),
                stored.reference,
                stored.content,
                attributes,
                embedding,
            ));
        }

        let inserted = rows.len();
        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(tokio_rusqlite::Error::Rusqlite)?;
                {
                    let mut stmt = tx
                        .prepare(
                            "INSERT OR REPLACE INTO segments
                             (id, category, reference, content, attributes, embedding)
                             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        )
                        .map_err(tokio_rusqlite::Error::Rusqlite)?;
                    for (id, category, reference, content, attributes, embedding) in rows {
                        stmt.execute([
                            &id, &category, &reference, &content, &attributes, &embedding,
                        ])
                        .map_err(tokio_rusqlite::Error::Rusqlite)?;
                    }
                }
                tx.commit().map_err(tokio_rusqlite::Error::Rusqlite)?;
                Ok(())
            })
            .await
            .map_err(|err| HavrutaError::Storage(err.to_string()))?;

        debug!(inserted, "persisted segments");
        Ok(())
    }

    async fn search_similar(
        &self,
        query: &[f32],
        top_k: usize,
        min_similarity: f32,
    ) -> Result<Vec<SearchHit>, HavrutaError> {
        if query.len() != self.dimension {
            return Err(HavrutaError::DimensionMismatch {
                got: query.len(),
                expected: self.dimension,
            });
        }
        let query_json = serde_json::to_string(query)
            .map_err(|err| HavrutaError::Storage(err.to_string()))?;
        let sql = format!(
            "SELECT id, category, reference, content, attributes,
                    1.0 - vec_distance_cosine(vec_f32(embedding), vec_f32(?1)) AS similarity
             FROM segments
             WHERE 1.0 - vec_distance_cosine(vec_f32(embedding), vec_f32(?1)) >= {min_similarity}
             ORDER BY similarity DESC
             LIMIT {top_k}"
        );

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(tokio_rusqlite::Error::Rusqlite)?;
                let rows = stmt
                    .query_map([&query_json], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, String>(4)?,
                            row.get::<_, f64>(5)?,
                        ))
                    })
                    .map_err(tokio_rusqlite::Error::Rusqlite)?;

                let mut hits = Vec::new();
                for row in rows {
                    let (id, category, reference, content, attributes, similarity) =
                        row.map_err(tokio_rusqlite::Error::Rusqlite)?;
                    let category = category
                        .parse()
                        .map_err(|err| tokio_rusqlite::Error::Other(Box::new(err)))?;
                    let attributes = serde_json::from_str(&attributes)
                        .map_err(|err| tokio_rusqlite::Error::Other(Box::new(err)))?;
                    hits.push(SearchHit {
                        segment: StoredSegment {
                            id,
                            category,
                            reference,
                            content,
                            attributes,
                        },
                        similarity: similarity as f32,
                    });
                }
                Ok(hits)
            })
            .await
            .map_err(|err| HavrutaError::Storage(err.to_string()))
    }

    async fn count(&self) -> Result<usize, HavrutaError> {
        self.conn
            .call(|conn| {
                conn.query_row("SELECT COUNT(*) FROM segments", [], |row| {
                    row.get::<_, i64>(0)
                })
                .map_err(tokio_rusqlite::Error::Rusqlite)
            })
            .await
            .map(|count| count as usize)
            .map_err(|err| HavrutaError::Storage(err.to_string()))
    }
}

fn register_sqlite_vec() -> Result<(), HavrutaError> {
    use std::sync::Mutex;

    static INIT: Once = Once::new();
    static INIT_RESULT: Mutex<Option<Result<(), String>>> = Mutex::new(None);

    INIT.call_once(|| {
        let result = unsafe {
            type SqliteExtensionInit = unsafe extern "C" fn(
                *mut ffi::sqlite3,
                *mut *const c_char,
                *const ffi::sqlite3_api_routines,
            ) -> i32;

            let init: unsafe extern "C" fn() = sqlite_vec::sqlite3_vec_init;
            let init_fn: SqliteExtensionInit =
                transmute::<unsafe extern "C" fn(), SqliteExtensionInit>(init);
            let rc = ffi::sqlite3_auto_extension(Some(init_fn));
            if rc != 0 {
                Err(format!(
                    "failed to register sqlite-vec extension (code {rc})"
                ))
            } else {
                Ok(())
            }
        };
        *INIT_RESULT.lock().expect("init result mutex poisoned") = Some(result);
    });

    INIT_RESULT
        .lock()
        .expect("init result mutex poisoned")
        .clone()
        .expect("init was called but result not set")
        .map_err(HavrutaError::Storage)
}
