//! Profile singleton reads and upsert.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::profile::{Profile, ProfileFields};
use crate::schema::portfolio_profile;

/// Fetch the profile row, if one has been saved.
pub async fn get_profile(conn: &mut AsyncPgConnection) -> QueryResult<Option<Profile>> {
    portfolio_profile::table
        .select(Profile::as_select())
        .order(portfolio_profile::id.asc())
        .first(conn)
        .await
        .optional()
}

/// Update the existing profile or insert the first one.
///
/// `avatar` overwrites the stored image only when supplied. Callers wrap this
/// in a transaction so the existence check and the write see the same state.
pub async fn save_profile(
    conn: &mut AsyncPgConnection,
    fields: &ProfileFields,
    avatar: Option<&[u8]>,
) -> QueryResult<Profile> {
    let existing: Option<i32> = portfolio_profile::table
        .select(portfolio_profile::id)
        .order(portfolio_profile::id.asc())
        .first(conn)
        .await
        .optional()?;

    match existing {
        Some(id) => {
            let profile = diesel::update(portfolio_profile::table.find(id))
                .set(fields)
                .returning(Profile::as_returning())
                .get_result(conn)
                .await?;

            if let Some(bytes) = avatar {
                diesel::update(portfolio_profile::table.find(id))
                    .set(portfolio_profile::avatar_data.eq(bytes))
                    .execute(conn)
                    .await?;
            }

            tracing::info!(profile_id = id, avatar = avatar.is_some(), "Profile updated");
            Ok(profile)
        }
        None => {
            let profile = diesel::insert_into(portfolio_profile::table)
                .values((fields, portfolio_profile::avatar_data.eq(avatar)))
                .returning(Profile::as_returning())
                .get_result(conn)
                .await?;

            tracing::info!(profile_id = profile.id, "Profile created");
            Ok(profile)
        }
    }
}

/// Read the avatar blob. `None` when there is no profile or no stored image.
pub async fn get_profile_image(conn: &mut AsyncPgConnection) -> QueryResult<Option<Vec<u8>>> {
    let blob: Option<Option<Vec<u8>>> = portfolio_profile::table
        .select(portfolio_profile::avatar_data)
        .order(portfolio_profile::id.asc())
        .first(conn)
        .await
        .optional()?;
    Ok(blob.flatten())
}
