use axum::{extract::State, Extension, Json};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::profile::{Profile, UpsertProfileRequest};
use crate::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Profile>> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
        .bind(auth_user.id)
        .fetch_optional(&state.db)
        .await?
        .unwrap_or_else(|| Profile::empty(auth_user.id));

    Ok(Json(profile))
}

/// Omitted fields keep their stored value; there is no way to clear one
/// other than sending an empty string.
pub async fn upsert_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpsertProfileRequest>,
) -> AppResult<Json<Profile>> {
    body.validate()?;

    let profile = sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profiles (user_id, avatar, why, height, weight, gender, age)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id) DO UPDATE SET
            avatar = COALESCE($2, profiles.avatar),
            why = COALESCE($3, profiles.why),
            height = COALESCE($4, profiles.height),
            weight = COALESCE($5, profiles.weight),
            gender = COALESCE($6, profiles.gender),
            age = COALESCE($7, profiles.age),
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(auth_user.id)
    .bind(&body.avatar)
    .bind(&body.why)
    .bind(&body.height)
    .bind(&body.weight)
    .bind(&body.gender)
    .bind(&body.age)
    .fetch_one(&state.db)
    .await?;

    tracing::debug!(user_id = %auth_user.id, "Profile saved");

    Ok(Json(profile))
}
