//! Identity card record store
//!
//! Each call acquires one pooled connection and releases it on return.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use idrec_common::{Error, IdentityRecord, Result};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Saved record as returned by listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredIdentityRecord {
    pub guid: Uuid,
    #[serde(flatten)]
    pub record: IdentityRecord,
    pub created_at: DateTime<Utc>,
}

/// Insert one confirmed record, returning its new guid
pub async fn insert_identity_record(pool: &SqlitePool, record: &IdentityRecord) -> Result<Uuid> {
    let guid = Uuid::new_v4();
    // Fixed-width UTC timestamps keep ORDER BY created_at chronological
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

    let mut conn = pool.acquire().await?;
    sqlx::query(
        r#"
        INSERT INTO identity_cards (
            guid, issuing_country, authority, card_type, full_name, surname,
            sex, date_of_birth, age, nationality, id_number,
            issuing_date, expiry_date, signature_present, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(guid.to_string())
    .bind(&record.issuing_country)
    .bind(&record.authority)
    .bind(&record.card_type)
    .bind(&record.full_name)
    .bind(&record.surname)
    .bind(&record.sex)
    .bind(record.date_of_birth)
    .bind(record.age)
    .bind(&record.nationality)
    .bind(&record.id_number)
    .bind(record.issuing_date)
    .bind(record.expiry_date)
    .bind(record.signature_present)
    .bind(&created_at)
    .execute(&mut *conn)
    .await?;

    tracing::info!(
        guid = %guid,
        id_number = ?record.id_number,
        "Identity record saved"
    );

    Ok(guid)
}

/// All saved records, newest first
pub async fn list_identity_records(pool: &SqlitePool) -> Result<Vec<StoredIdentityRecord>> {
    let mut conn = pool.acquire().await?;
    let rows = sqlx::query(
        r#"
        SELECT guid, issuing_country, authority, card_type, full_name, surname,
               sex, date_of_birth, age, nationality, id_number,
               issuing_date, expiry_date, signature_present, created_at
        FROM identity_cards
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(stored_record_from_row).collect()
}

fn stored_record_from_row(row: &SqliteRow) -> Result<StoredIdentityRecord> {
    let guid_str: String = row.try_get("guid")?;
    let guid = Uuid::parse_str(&guid_str)
        .map_err(|e| Error::CorruptRecord(format!("Invalid guid '{}': {}", guid_str, e)))?;

    let created_at_str: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|e| Error::CorruptRecord(format!("Invalid created_at '{}': {}", created_at_str, e)))?
        .with_timezone(&Utc);

    Ok(StoredIdentityRecord {
        guid,
        record: IdentityRecord {
            issuing_country: row.try_get("issuing_country")?,
            authority: row.try_get("authority")?,
            card_type: row.try_get("card_type")?,
            full_name: row.try_get("full_name")?,
            surname: row.try_get("surname")?,
            sex: row.try_get("sex")?,
            date_of_birth: row.try_get::<Option<NaiveDate>, _>("date_of_birth")?,
            age: row.try_get("age")?,
            nationality: row.try_get("nationality")?,
            id_number: row.try_get("id_number")?,
            issuing_date: row.try_get::<Option<NaiveDate>, _>("issuing_date")?,
            expiry_date: row.try_get::<Option<NaiveDate>, _>("expiry_date")?,
            signature_present: row.try_get("signature_present")?,
        },
        created_at,
    })
}
