use anyhow::Context;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::degradation;
use crate::models::{ForecastPoint, Reading, UserProfile};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn upsert_user(
    pool: &PgPool,
    full_name: &str,
    email: &str,
    full_range: f64,
    model_year: i32,
) -> anyhow::Result<Uuid> {
    let row = sqlx::query(
        r#"
        INSERT INTO rangekeeper.users (id, full_name, email, full_range, model_year)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE
        SET full_name = EXCLUDED.full_name,
            full_range = EXCLUDED.full_range,
            model_year = EXCLUDED.model_year
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(full_name)
    .bind(email)
    .bind(full_range)
    .bind(model_year)
    .fetch_one(pool)
    .await?;

    Ok(row.get("id"))
}

pub async fn fetch_user(pool: &PgPool, email: &str) -> anyhow::Result<UserProfile> {
    let row = sqlx::query(
        "SELECT id, full_name, email, full_range, model_year FROM rangekeeper.users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    .with_context(|| format!("no profile registered for {email}"))?;

    Ok(UserProfile {
        id: row.get("id"),
        full_name: row.get("full_name"),
        email: row.get("email"),
        full_range: row.get("full_range"),
        model_year: row.get("model_year"),
    })
}

/// Insert one reading, deriving the stored analytics columns on the way in.
/// At most one reading per user per calendar day; returns false when the
/// day's slot is already taken.
pub async fn insert_reading(
    pool: &PgPool,
    user_id: Uuid,
    full_range: f64,
    recorded_at: DateTime<Utc>,
    current_range: f64,
    current_percent: f64,
) -> anyhow::Result<bool> {
    let derived = degradation::derive_reading(full_range, current_range, current_percent);

    let result = sqlx::query(
        r#"
        INSERT INTO rangekeeper.readings
        (id, user_id, recorded_at, reading_day, current_range, current_percent,
         full_range, current_full_range, lost_miles, battery_health)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (user_id, reading_day) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(recorded_at)
    .bind(recorded_at.date_naive())
    .bind(current_range)
    .bind(current_percent)
    .bind(full_range)
    .bind(derived.current_full_range)
    .bind(derived.lost_miles)
    .bind(derived.battery_health)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_reading(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM rangekeeper.readings WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_readings(
    pool: &PgPool,
    email: &str,
    since: Option<NaiveDate>,
) -> anyhow::Result<Vec<Reading>> {
    let mut query = String::from(
        "SELECT r.id, r.recorded_at, r.current_range, r.current_percent, r.full_range, \
         r.current_full_range, r.lost_miles, r.battery_health \
         FROM rangekeeper.readings r \
         JOIN rangekeeper.users u ON u.id = r.user_id \
         WHERE u.email = $1",
    );

    if since.is_some() {
        query.push_str(" AND r.reading_day >= $2");
    }
    query.push_str(" ORDER BY r.recorded_at");

    let mut rows = sqlx::query(&query).bind(email);
    if let Some(value) = since {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut readings = Vec::new();

    for row in records {
        readings.push(Reading {
            id: row.get("id"),
            recorded_at: row.get("recorded_at"),
            current_range: row.get("current_range"),
            current_percent: row.get("current_percent"),
            full_range: row.get("full_range"),
            current_full_range: row.get("current_full_range"),
            lost_miles: row.get("lost_miles"),
            battery_health: row.get("battery_health"),
        });
    }

    Ok(readings)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        full_name: String,
        email: String,
        full_range: f64,
        model_year: i32,
        recorded_at: NaiveDate,
        current_range: f64,
        current_percent: f64,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        crate::engine::validate_reading(row.full_range, row.current_percent)
            .with_context(|| format!("row {} failed validation", line + 1))?;

        let user_id = upsert_user(pool, &row.full_name, &row.email, row.full_range, row.model_year)
            .await?;

        let recorded_at = Utc
            .from_utc_datetime(&row.recorded_at.and_hms_opt(0, 0, 0).context("invalid time")?);

        if insert_reading(
            pool,
            user_id,
            row.full_range,
            recorded_at,
            row.current_range,
            row.current_percent,
        )
        .await?
        {
            inserted += 1;
        }
    }

    Ok(inserted)
}

/// Load a forecast payload produced by the prediction service. Points are
/// upserted on (user, date) so a refreshed forecast replaces the old one.
pub async fn import_forecast(
    pool: &PgPool,
    user_id: Uuid,
    json_path: &std::path::Path,
) -> anyhow::Result<usize> {
    let payload = std::fs::read_to_string(json_path)
        .with_context(|| format!("failed to read {}", json_path.display()))?;
    let points: Vec<ForecastPoint> =
        serde_json::from_str(&payload).context("forecast payload is not valid JSON")?;

    let mut stored = 0usize;
    for point in &points {
        sqlx::query(
            r#"
            INSERT INTO rangekeeper.predictions (id, user_id, predicted_for, predicted_range)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, predicted_for) DO UPDATE
            SET predicted_range = EXCLUDED.predicted_range
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(point.date)
        .bind(point.predicted_range)
        .execute(pool)
        .await?;
        stored += 1;
    }

    Ok(stored)
}

pub async fn fetch_forecast(pool: &PgPool, email: &str) -> anyhow::Result<Vec<ForecastPoint>> {
    let rows = sqlx::query(
        "SELECT p.predicted_for, p.predicted_range \
         FROM rangekeeper.predictions p \
         JOIN rangekeeper.users u ON u.id = p.user_id \
         WHERE u.email = $1 \
         ORDER BY p.predicted_for",
    )
    .bind(email)
    .fetch_all(pool)
    .await?;

    let mut points = Vec::new();
    for row in rows {
        points.push(ForecastPoint {
            date: row.get("predicted_for"),
            predicted_range: row.get("predicted_range"),
        });
    }

    Ok(points)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let user_id: Uuid = sqlx::query(
        r#"
        INSERT INTO rangekeeper.users (id, full_name, email, full_range, model_year)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE
        SET full_name = EXCLUDED.full_name,
            full_range = EXCLUDED.full_range,
            model_year = EXCLUDED.model_year
        RETURNING id
        "#,
    )
    .bind(Uuid::parse_str("7b0f2c41-5a8e-4f1d-9c6a-2d4e8b1f3a70")?)
    .bind("Dana Whitfield")
    .bind("dana.whitfield@rangekeeper.io")
    .bind(300.0)
    .bind(2021)
    .fetch_one(pool)
    .await?
    .get("id");

    let readings = vec![
        (NaiveDate::from_ymd_opt(2026, 6, 2).context("invalid date")?, 238.0, 82.0),
        (NaiveDate::from_ymd_opt(2026, 6, 9).context("invalid date")?, 221.0, 76.0),
        (NaiveDate::from_ymd_opt(2026, 6, 16).context("invalid date")?, 244.0, 85.0),
        (NaiveDate::from_ymd_opt(2026, 7, 1).context("invalid date")?, 229.0, 80.0),
        (NaiveDate::from_ymd_opt(2026, 7, 8).context("invalid date")?, 215.0, 75.0),
        (NaiveDate::from_ymd_opt(2026, 7, 15).context("invalid date")?, 233.0, 81.0),
    ];

    for (day, current_range, current_percent) in readings {
        let recorded_at =
            Utc.from_utc_datetime(&day.and_hms_opt(8, 0, 0).context("invalid time")?);
        insert_reading(pool, user_id, 300.0, recorded_at, current_range, current_percent)
            .await?;
    }

    let predictions = vec![
        (NaiveDate::from_ymd_opt(2026, 7, 16).context("invalid date")?, 286.4),
        (NaiveDate::from_ymd_opt(2026, 7, 17).context("invalid date")?, 286.1),
        (NaiveDate::from_ymd_opt(2026, 7, 18).context("invalid date")?, 285.9),
        (NaiveDate::from_ymd_opt(2026, 7, 19).context("invalid date")?, 285.8),
        (NaiveDate::from_ymd_opt(2026, 7, 20).context("invalid date")?, 285.5),
        (NaiveDate::from_ymd_opt(2026, 7, 21).context("invalid date")?, 285.3),
        (NaiveDate::from_ymd_opt(2026, 7, 22).context("invalid date")?, 285.2),
        (NaiveDate::from_ymd_opt(2026, 7, 23).context("invalid date")?, 284.9),
        (NaiveDate::from_ymd_opt(2026, 7, 24).context("invalid date")?, 284.7),
        (NaiveDate::from_ymd_opt(2026, 7, 25).context("invalid date")?, 284.4),
    ];

    for (day, predicted_range) in predictions {
        let predicted_for =
            Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).context("invalid time")?);
        sqlx::query(
            r#"
            INSERT INTO rangekeeper.predictions (id, user_id, predicted_for, predicted_range)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, predicted_for) DO UPDATE
            SET predicted_range = EXCLUDED.predicted_range
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(predicted_for)
        .bind(predicted_range)
        .execute(pool)
        .await?;
    }

    Ok(())
}
