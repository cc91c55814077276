//! Reads every source table into one [`BlendInputs`] snapshot.

use std::collections::HashMap;

use pkdscore_core::{BlendInputs, MarketValue, SourceValue};
use sqlx::PgPool;

use crate::{social, DbError};

#[derive(Debug, sqlx::FromRow)]
struct MarketScoreRow {
    section_code: String,
    section_name: String,
    safety_score: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct ScoreRow {
    code: String,
    value: f64,
}

/// Load the blend inputs: the latest report's sections, the GUS table, the
/// newest CEIDG score per section, both social platforms' sector means and
/// the `pkd` registry names.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any of the queries fails.
pub async fn load_blend_inputs(pool: &PgPool) -> Result<BlendInputs, DbError> {
    let market = sqlx::query_as::<_, MarketScoreRow>(
        "SELECT section_code, section_name, safety_score \
         FROM section \
         WHERE report_id = (SELECT id FROM report ORDER BY date DESC, id DESC LIMIT 1)",
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| MarketValue {
        code: row.section_code,
        name: row.section_name,
        safety_score: row.safety_score,
    })
    .collect();

    let gus = sqlx::query_as::<_, ScoreRow>(
        "SELECT pkd AS code, wskaznik::DOUBLE PRECISION AS value FROM gus",
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(to_source_value)
    .collect();

    let ceidg = sqlx::query_as::<_, ScoreRow>(
        "SELECT DISTINCT ON (pkd_id) pkd_id AS code, wskaznik::DOUBLE PRECISION AS value \
         FROM ceidg \
         ORDER BY pkd_id, utworzono DESC, id DESC",
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(to_source_value)
    .collect();

    let youtube = social::sector_sentiment_youtube(pool)
        .await?
        .into_iter()
        .map(|row| SourceValue::new(row.pkd, row.average))
        .collect();

    let wykop = social::sector_sentiment_wykop(pool)
        .await?
        .into_iter()
        .map(|row| SourceValue::new(row.pkd, row.average))
        .collect();

    let registry_names: HashMap<String, String> = crate::pkd::list_pkd(pool)
        .await?
        .into_iter()
        .map(|row| (row.pkd, row.nazwa))
        .collect();

    Ok(BlendInputs {
        market,
        gus,
        ceidg,
        youtube,
        wykop,
        registry_names,
    })
}

fn to_source_value(row: ScoreRow) -> SourceValue {
    SourceValue::new(row.code, row.value)
}
