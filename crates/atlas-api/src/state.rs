use std::sync::Arc;

use crate::service::ExperienceService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub service: ExperienceService,
}
