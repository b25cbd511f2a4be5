//! SurrealDB storage for name-frequency and migration tables.
//!
//! The generator is synchronous, so tables are read into a [`TableProvider`]
//! up front instead of being queried per record.

use crate::models::{FrequencyCsvRow, MigrationCsvRow, NameType};
use crate::provider::TableProvider;
use anyhow::Result;
use std::collections::BTreeMap;
use surrealdb::engine::local::{Db, Mem, RocksDb};
use surrealdb::Surreal;
use tracing::info;

pub type DbConn = Surreal<Db>;

/// Open the RocksDB-backed store at `path`.
pub async fn connect(path: &str) -> Result<DbConn> {
    let db = Surreal::new::<RocksDb>(path).await?;
    db.use_ns("ethnidata").use_db("names").await?;
    Ok(db)
}

/// Open a throwaway in-memory store.
pub async fn connect_memory() -> Result<DbConn> {
    let db = Surreal::new::<Mem>(()).await?;
    db.use_ns("ethnidata").use_db("names").await?;
    Ok(db)
}

pub async fn init_schema(db: &DbConn) -> Result<()> {
    db.query(
        r#"
        -- Aggregated name counts per country
        DEFINE TABLE name_freq SCHEMAFULL;
        DEFINE FIELD country ON name_freq TYPE string;
        DEFINE FIELD name ON name_freq TYPE string;
        DEFINE FIELD name_type ON name_freq TYPE string ASSERT $value IN ["first", "last"];
        DEFINE FIELD frequency ON name_freq TYPE int ASSERT $value >= 0;
        DEFINE INDEX idx_name_freq ON name_freq FIELDS country, name_type, name UNIQUE;

        -- Origin affinity per country of residence
        DEFINE TABLE migration SCHEMAFULL;
        DEFINE FIELD context_country ON migration TYPE string;
        DEFINE FIELD origin_country ON migration TYPE string;
        DEFINE FIELD weight ON migration TYPE float ASSERT $value >= 0;
        DEFINE INDEX idx_migration ON migration FIELDS context_country, origin_country UNIQUE;
        "#,
    )
    .await?
    .check()?;
    Ok(())
}

/// Store frequency rows. Duplicate keys within `rows` are summed; a count
/// already in the store for the same key is replaced.
pub async fn insert_frequencies(db: &DbConn, rows: &[FrequencyCsvRow]) -> Result<usize> {
    let mut merged: BTreeMap<(String, NameType, String), u64> = BTreeMap::new();
    for row in rows {
        let key = (
            row.country.clone(),
            NameType::from(row.name_type.as_str()),
            row.name.clone(),
        );
        *merged.entry(key).or_insert(0) += row.frequency;
    }

    let total = merged.len();
    for (i, ((country, name_type, name), frequency)) in merged.into_iter().enumerate() {
        db.query(
            r#"
            DELETE name_freq WHERE country = $country AND name_type = $name_type AND name = $name;
            CREATE name_freq SET country = $country, name = $name,
                name_type = $name_type, frequency = $frequency;
            "#,
        )
        .bind(("country", country))
        .bind(("name", name))
        .bind(("name_type", name_type.as_str().to_string()))
        .bind(("frequency", frequency as i64))
        .await?
        .check()?;

        if (i + 1) % 5000 == 0 {
            info!("Inserted {}/{} name rows...", i + 1, total);
        }
    }
    Ok(total)
}

/// Insert or replace migration weights.
pub async fn insert_migration_weights(db: &DbConn, rows: &[MigrationCsvRow]) -> Result<usize> {
    for row in rows {
        db.query(
            r#"
            DELETE migration WHERE context_country = $context AND origin_country = $origin;
            CREATE migration SET context_country = $context, origin_country = $origin,
                weight = $weight;
            "#,
        )
        .bind(("context", row.context_country.clone()))
        .bind(("origin", row.origin_country.clone()))
        .bind(("weight", row.weight))
        .await?
        .check()?;
    }
    Ok(rows.len())
}

/// Read every stored table into an in-memory provider.
pub async fn load_provider(db: &DbConn) -> Result<TableProvider> {
    let names: Vec<FrequencyCsvRow> = db
        .query("SELECT country, name, name_type, frequency FROM name_freq")
        .await?
        .take(0)?;
    let migration: Vec<MigrationCsvRow> = db
        .query("SELECT context_country, origin_country, weight FROM migration")
        .await?
        .take(0)?;

    let mut provider = TableProvider::new();
    for row in &names {
        provider.insert_name(
            &row.country,
            NameType::from(row.name_type.as_str()),
            &row.name,
            row.frequency,
        );
    }
    for row in &migration {
        provider.insert_migration(&row.context_country, &row.origin_country, row.weight);
    }

    info!(
        "Loaded {} name rows and {} migration weights from SurrealDB",
        names.len(),
        migration.len()
    );
    Ok(provider)
}
