pub mod auth;
pub mod chat;
pub mod error;
pub mod flash;
pub mod pages;
pub mod session;
pub mod students;
pub mod uploads;

use std::path::PathBuf;
use std::sync::Arc;

use registrar_db::Database;
use registrar_relay::rooms::RoomRegistry;

use crate::pages::Pages;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub registry: RoomRegistry,
    pub upload_dir: PathBuf,
    pub pages: Pages,
}
