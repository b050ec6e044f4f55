//! Database repository for member CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity.

use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{Member, MemberChanges, MemberCounts, NewMember};

const MEMBER_SELECT_SQL: &str = "SELECT id, name, email, bos, paid FROM members";

/// Predicates accepted by [`Repository::count_matching`].
#[derive(Debug, Clone, Copy)]
pub enum MemberFilter<'a> {
    Name(&'a str),
    Email(&'a str),
    Bos(&'a str),
    HasBos,
    Paid,
}

impl MemberFilter<'_> {
    fn clause(&self) -> &'static str {
        match self {
            MemberFilter::Name(_) => "name = ?",
            MemberFilter::Email(_) => "email = ?",
            MemberFilter::Bos(_) => "bos = ?",
            MemberFilter::HasBos => "bos IS NOT NULL",
            MemberFilter::Paid => "paid = 1",
        }
    }

    fn value(&self) -> Option<&str> {
        match self {
            MemberFilter::Name(v) | MemberFilter::Email(v) | MemberFilter::Bos(v) => Some(v),
            MemberFilter::HasBos | MemberFilter::Paid => None,
        }
    }
}

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all members in signup order.
    pub async fn list_members(&self) -> Result<Vec<Member>, AppError> {
        let rows = sqlx::query(&format!("{} ORDER BY id", MEMBER_SELECT_SQL))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(member_from_row).collect())
    }

    /// Get a member by ID.
    pub async fn get_member(&self, id: i64) -> Result<Option<Member>, AppError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", MEMBER_SELECT_SQL))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(member_from_row))
    }

    /// Count members matching `filter`, ignoring the member with id `excluding`.
    pub async fn count_matching(
        &self,
        filter: MemberFilter<'_>,
        excluding: Option<i64>,
    ) -> Result<i64, AppError> {
        let sql = format!(
            "SELECT COUNT(*) AS n FROM members WHERE {} AND (? IS NULL OR id != ?)",
            filter.clause()
        );
        let mut query = sqlx::query(&sql);
        if let Some(value) = filter.value() {
            query = query.bind(value);
        }
        let row = query
            .bind(excluding)
            .bind(excluding)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("n"))
    }

    /// Summary counts for the list view.
    pub async fn counts(&self) -> Result<MemberCounts, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM members")
            .fetch_one(&self.pool)
            .await?;

        Ok(MemberCounts {
            all: row.get("n"),
            bos: self.count_matching(MemberFilter::HasBos, None).await?,
            paid: self.count_matching(MemberFilter::Paid, None).await?,
        })
    }

    /// Every member's email address in signup order.
    pub async fn list_emails(&self) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query("SELECT email FROM members ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("email")).collect())
    }

    /// Insert a new member and return it with its assigned id.
    pub async fn insert_member(&self, member: &NewMember) -> Result<Member, AppError> {
        let bos = member.bos.as_deref().filter(|s| !s.is_empty());

        let result = sqlx::query("INSERT INTO members (name, email, bos, paid) VALUES (?, ?, ?, ?)")
            .bind(&member.name)
            .bind(&member.email)
            .bind(bos)
            .bind(member.paid)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        tracing::info!(member_id = id, "Member inserted");

        Ok(Member {
            id,
            name: member.name.clone(),
            email: member.email.clone(),
            bos: bos.map(str::to_string),
            paid: member.paid,
        })
    }

    /// Apply `changes` to the member with the given id.
    pub async fn update_member(
        &self,
        id: i64,
        changes: &MemberChanges,
    ) -> Result<Member, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!("{} WHERE id = ?", MEMBER_SELECT_SQL))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let mut member = row
            .as_ref()
            .map(member_from_row)
            .ok_or_else(|| AppError::member_not_found(id))?;

        member.apply(changes);
        write_member(&mut tx, &member).await?;

        tx.commit().await?;
        tracing::info!(member_id = id, "Member updated");

        Ok(member)
    }

    /// Delete a member, returning the removed record.
    pub async fn delete_member(&self, id: i64) -> Result<Member, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!("{} WHERE id = ?", MEMBER_SELECT_SQL))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let member = row
            .as_ref()
            .map(member_from_row)
            .ok_or_else(|| AppError::member_not_found(id))?;

        sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(member_id = id, "Member deleted");

        Ok(member)
    }

    /// Normalize every member in one transaction and return how many changed.
    ///
    /// A normalization that collides with another record's unique value aborts
    /// the whole batch with [`AppError::ConstraintViolation`].
    pub async fn normalize_all(&self) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query(&format!("{} ORDER BY id", MEMBER_SELECT_SQL))
            .fetch_all(&mut *tx)
            .await?;

        let mut changed = 0;
        for mut member in rows.iter().map(member_from_row) {
            let Some(changes) = member.normalization() else {
                continue;
            };
            member.apply(&changes);
            write_member(&mut tx, &member).await?;
            changed += 1;
        }

        tx.commit().await?;
        tracing::info!(changed, "Member table normalized");

        Ok(changed)
    }
}

async fn write_member(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    member: &Member,
) -> Result<(), AppError> {
    sqlx::query("UPDATE members SET name = ?, email = ?, bos = ?, paid = ? WHERE id = ?")
        .bind(&member.name)
        .bind(&member.email)
        .bind(&member.bos)
        .bind(member.paid)
        .bind(member.id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

fn member_from_row(row: &sqlx::sqlite::SqliteRow) -> Member {
    let paid: i64 = row.get("paid");
    Member {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        bos: row.get("bos"),
        paid: paid != 0,
    }
}
