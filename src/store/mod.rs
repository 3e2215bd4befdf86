//! Entity write paths.
//!
//! All entity mutations go through the [`EntityStore`] trait. Two
//! implementations exist and are selected once at startup: [`DirectStore`]
//! issues plain SQL statements; [`ProcedureStore`] delegates each mutation to
//! a named database routine and re-reads the row afterwards. Both must leave
//! the database in the same state and hand back the same row snapshots, so
//! callers never know which path executed.

pub mod direct;
pub mod procedure;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgConnection;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Access, Company, Project, ProjectType, Role, Site, User};

pub use direct::DirectStore;
pub use procedure::ProcedureStore;

/// Fields for a new site.
#[derive(Debug, Clone)]
pub struct NewSite {
    pub name: String,
    pub url: String,
    pub domain: String,
    pub ip: String,
}

/// Full replacement state for a site update.
#[derive(Debug, Clone)]
pub struct SiteChanges {
    pub name: String,
    pub url: String,
    pub domain: String,
    pub ip: String,
    pub is_active: bool,
}

/// Fields for a new project type.
#[derive(Debug, Clone)]
pub struct NewProjectType {
    pub type_name: String,
    pub description: String,
}

/// Full replacement state for a project type update.
#[derive(Debug, Clone)]
pub struct ProjectTypeChanges {
    pub type_name: String,
    pub description: String,
    pub is_active: bool,
}

/// Fields for a new access rule.
#[derive(Debug, Clone)]
pub struct NewAccess {
    pub web_access: bool,
    pub app_access: bool,
    pub role_id: i32,
}

/// Full replacement state for an access rule update.
#[derive(Debug, Clone)]
pub struct AccessChanges {
    pub web_access: bool,
    pub app_access: bool,
    pub role_id: i32,
    pub is_active: bool,
}

/// Fields for a new project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub project_type_id: i32,
    pub company_id: i32,
    pub site_id: i32,
    pub is_demo: bool,
    pub logo: Option<String>,
    pub device_id: String,
    pub app_version: String,
}

/// Full replacement state for a project update.
#[derive(Debug, Clone)]
pub struct ProjectChanges {
    pub name: String,
    pub description: String,
    pub project_type_id: i32,
    pub company_id: i32,
    pub site_id: i32,
    pub is_demo: bool,
    pub logo: Option<String>,
    pub device_id: String,
    pub app_version: String,
    pub is_active: bool,
}

/// Fields for a new user. `password_hash` is the bcrypt digest, never the
/// plaintext.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub password_hash: String,
    pub birthday: NaiveDate,
    pub city: String,
    pub email: String,
    pub prof_img: Option<String>,
    pub role_id: i32,
    pub company_id: Option<i32>,
}

/// Replacement state for a user update. `password_hash = None` keeps the
/// stored digest.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub username: String,
    pub password_hash: Option<String>,
    pub role_id: i32,
    pub email: String,
    pub is_active: bool,
    pub company_id: Option<i32>,
}

/// The write side of every entity, implemented by the direct and the
/// procedure path.
///
/// Each method runs on the caller's connection so that it participates in the
/// caller's transaction. Update and deactivate methods return the post-write
/// row for auditing; the procedure implementation obtains it by re-reading,
/// since it never sets the values itself.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn create_role(&self, conn: &mut PgConnection, name: &str, actor: i32) -> Result<Role>;
    async fn update_role(
        &self,
        conn: &mut PgConnection,
        id: i32,
        name: &str,
        is_active: bool,
        actor: i32,
    ) -> Result<Role>;
    async fn deactivate_role(&self, conn: &mut PgConnection, id: i32, actor: i32) -> Result<Role>;

    async fn create_company(
        &self,
        conn: &mut PgConnection,
        name: &str,
        actor: i32,
    ) -> Result<Company>;
    async fn update_company(
        &self,
        conn: &mut PgConnection,
        id: i32,
        name: &str,
        is_active: bool,
        actor: i32,
    ) -> Result<Company>;
    async fn deactivate_company(
        &self,
        conn: &mut PgConnection,
        id: i32,
        actor: i32,
    ) -> Result<Company>;

    async fn create_site(&self, conn: &mut PgConnection, site: &NewSite, actor: i32)
        -> Result<Site>;
    async fn update_site(
        &self,
        conn: &mut PgConnection,
        id: i32,
        changes: &SiteChanges,
        actor: i32,
    ) -> Result<Site>;
    async fn deactivate_site(&self, conn: &mut PgConnection, id: i32, actor: i32) -> Result<Site>;

    async fn create_project_type(
        &self,
        conn: &mut PgConnection,
        project_type: &NewProjectType,
        actor: i32,
    ) -> Result<ProjectType>;
    async fn update_project_type(
        &self,
        conn: &mut PgConnection,
        id: i32,
        changes: &ProjectTypeChanges,
        actor: i32,
    ) -> Result<ProjectType>;
    async fn deactivate_project_type(
        &self,
        conn: &mut PgConnection,
        id: i32,
        actor: i32,
    ) -> Result<ProjectType>;

    async fn create_access(
        &self,
        conn: &mut PgConnection,
        access: &NewAccess,
        actor: i32,
    ) -> Result<Access>;
    async fn update_access(
        &self,
        conn: &mut PgConnection,
        id: i32,
        changes: &AccessChanges,
        actor: i32,
    ) -> Result<Access>;
    async fn deactivate_access(
        &self,
        conn: &mut PgConnection,
        id: i32,
        actor: i32,
    ) -> Result<Access>;

    async fn create_project(
        &self,
        conn: &mut PgConnection,
        project: &NewProject,
        actor: i32,
    ) -> Result<Project>;
    async fn update_project(
        &self,
        conn: &mut PgConnection,
        id: i32,
        changes: &ProjectChanges,
        actor: i32,
    ) -> Result<Project>;
    async fn deactivate_project(
        &self,
        conn: &mut PgConnection,
        id: i32,
        actor: i32,
    ) -> Result<Project>;

    async fn create_user(&self, conn: &mut PgConnection, user: &NewUser) -> Result<User>;
    async fn update_user(
        &self,
        conn: &mut PgConnection,
        id: i32,
        changes: &UserChanges,
        actor: i32,
    ) -> Result<User>;
    async fn deactivate_user(&self, conn: &mut PgConnection, id: i32, actor: i32) -> Result<User>;
}

/// Select the write path once, from configuration.
pub fn from_config(use_stored_procedures: bool) -> Arc<dyn EntityStore> {
    if use_stored_procedures {
        Arc::new(ProcedureStore)
    } else {
        Arc::new(DirectStore)
    }
}
