use pkdscore_core::{blend, normalize_code, BlendedScore};

/// Print the blended score table, or one sector's row.
pub(crate) async fn run_scores(pool: &sqlx::PgPool, sector: Option<&str>) -> anyhow::Result<()> {
    let inputs = pkdscore_db::load_blend_inputs(pool).await?;
    let mut scores = blend(&inputs);

    if let Some(raw) = sector {
        let code = normalize_code(raw);
        scores.retain(|s| s.section_code == code);
        if scores.is_empty() {
            anyhow::bail!("no data for sector {code}");
        }
    }

    if scores.is_empty() {
        println!("no scores yet; collect at least one source first");
        return Ok(());
    }

    println!("code\tfinal\tmarket\tgus\tceidg\tsocial\tname");
    for score in &scores {
        println!("{}", format_row(score));
    }
    Ok(())
}

pub(crate) fn format_row(score: &BlendedScore) -> String {
    let opt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
    format!(
        "{}\t{:.2}\t{}\t{}\t{}\t{}\t{}",
        score.section_code,
        score.final_score,
        score
            .market_score
            .map_or_else(|| "-".to_string(), |v| v.to_string()),
        opt(score.gus_score),
        opt(score.ceidg_score),
        opt(score.social_score),
        score.section_name,
    )
}
