use axum::{
    extract::{Multipart, State},
    response::Redirect,
};
use tower_sessions::Session;
use tracing::{error, info, instrument};

use super::services::{remove_uploaded, upload_files};
use crate::{
    auth::gate::AuthUser,
    error::AppError,
    session::{self, SessionUser},
    state::AppState,
    users::UserImage,
};

/// POST /upload: store the picture and link it to the session user.
#[instrument(skip(state, session, mp))]
pub async fn upload_profile_pic(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
    mut mp: Multipart,
) -> Result<Redirect, AppError> {
    let files = upload_files(&mut mp, state.storage.as_ref()).await?;
    let Some((file, extra)) = files.split_first() else {
        return Err(AppError::BadRequest("no file in upload".into()));
    };
    // only the first file becomes the profile picture
    remove_uploaded(state.storage.as_ref(), extra).await;

    let image = UserImage::new(user.id, &file.file_name);
    let image_id = match state.repo.insert_user_image(&image).await {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, user_id = user.id, "insert user image failed");
            remove_uploaded(state.storage.as_ref(), &files).await;
            return Err(e.into());
        }
    };

    let refreshed = state.repo.get_user(user.id).await?;
    session::put_user(&session, &SessionUser::from(&refreshed)).await?;

    info!(user_id = user.id, image_id, file = %file.file_name, "profile picture uploaded");
    Ok(Redirect::to("/user/profile"))
}
