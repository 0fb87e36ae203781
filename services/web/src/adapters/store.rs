//! services/web/src/adapters/store.rs
//!
//! The Postgres adapter: the concrete implementation of the `PuzzleStore`
//! port. Record structs mirror the table rows and are mapped to domain
//! types at the edge.

use async_trait::async_trait;
use reviewer_core::domain::{Puzzle, Review};
use reviewer_core::ports::{PortError, PortResult, PuzzleStore};
use sqlx::{FromRow, PgPool};

/// A database adapter that implements the `PuzzleStore` port.
#[derive(Clone)]
pub struct PgStoreAdapter {
    pool: PgPool,
}

impl PgStoreAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn storage_error(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// Record Structs
//=========================================================================================

#[derive(FromRow)]
struct PuzzleRecord {
    id: i64,
    fen: String,
    solution: Vec<String>,
    game_id: Option<String>,
}

impl PuzzleRecord {
    fn to_domain(self) -> Puzzle {
        Puzzle {
            id: self.id,
            fen: self.fen,
            solution: self.solution,
            game_id: self.game_id,
        }
    }
}

//=========================================================================================
// Port Implementation
//=========================================================================================

#[async_trait]
impl PuzzleStore for PgStoreAdapter {
    async fn get_by_id(&self, id: i64) -> PortResult<Option<Puzzle>> {
        let record = sqlx::query_as::<_, PuzzleRecord>(
            "SELECT id, fen, solution, game_id FROM puzzles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(record.map(PuzzleRecord::to_domain))
    }

    async fn next(&self) -> PortResult<Option<Puzzle>> {
        // Selection policy is private to this adapter: fewest reviews first,
        // ties broken by lowest id.
        let record = sqlx::query_as::<_, PuzzleRecord>(
            "SELECT p.id, p.fen, p.solution, p.game_id
             FROM puzzles p
             LEFT JOIN reviews r ON r.puzzle_id = p.id
             GROUP BY p.id
             ORDER BY COUNT(r.puzzle_id) ASC, p.id ASC
             LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(record.map(PuzzleRecord::to_domain))
    }

    async fn append_review(&self, puzzle_id: i64, review: &Review) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO reviews (puzzle_id, reviewed_by, reviewed_at, score, comment, rating)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(puzzle_id)
        .bind(&review.by)
        .bind(review.at)
        .bind(review.score)
        .bind(&review.comment)
        .bind(review.rating)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }
}
