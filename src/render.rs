use std::path::Path;

use axum::response::Html;
use serde::Serialize;
use tera::{Context, Tera};
use tower_sessions::Session;
use tracing::debug;

use crate::{
    error::AppError,
    session::{self, SessionUser, ERROR_KEY, FLASH_KEY},
};

/// Values every page can use; `data` carries page-specific extras.
#[derive(Debug, Default, Serialize)]
pub struct TemplateData {
    pub ip: String,
    pub flash: String,
    pub error: String,
    pub user: Option<SessionUser>,
    pub data: serde_json::Map<String, serde_json::Value>,
}

pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Compile every `*.html` below `dir`.
    pub fn load(dir: &Path) -> Result<Self, AppError> {
        let glob = format!("{}/**/*.html", dir.display());
        let tera = Tera::new(&glob)?;
        debug!(dir = %dir.display(), count = tera.get_template_names().count(), "templates loaded");
        Ok(Self { tera })
    }

    pub fn render_with(&self, page: &str, data: &TemplateData) -> Result<Html<String>, AppError> {
        let ctx = Context::from_serialize(data)?;
        Ok(Html(self.tera.render(page, &ctx)?))
    }

    /// Fill in the per-request defaults (flash, error, user) from the session
    /// and render `page`.
    pub async fn render(
        &self,
        session: &Session,
        page: &str,
        mut data: TemplateData,
    ) -> Result<Html<String>, AppError> {
        data.flash = session::pop_string(session, FLASH_KEY).await?;
        data.error = session::pop_string(session, ERROR_KEY).await?;
        if data.user.is_none() {
            data.user = session::current_user(session).await?;
        }
        self.render_with(page, &data)
    }
}
