use std::sync::Arc;

use db::DBService;
use services::services::directory::{
    ConsultantDirectory, ConsultantListing, DirectoryService, TalentDirectory, WorkerListing,
};
use utils::clock::Clock;

use crate::config::Config;

/// Shared handler state, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub consultants: Arc<ConsultantDirectory>,
    pub talent: Arc<TalentDirectory>,
}

impl AppState {
    pub fn new(db: DBService, config: &Config, clock: Arc<dyn Clock>) -> Self {
        let consultants = DirectoryService::new(
            ConsultantListing::new(db.pool.clone()),
            config.consultant_rotation,
            clock.clone(),
        );
        let talent = DirectoryService::new(
            WorkerListing::new(db.pool.clone()),
            config.talent_rotation,
            clock,
        );

        Self {
            db,
            consultants: Arc::new(consultants),
            talent: Arc::new(talent),
        }
    }
}
