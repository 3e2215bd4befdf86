//! Procedure write path: mutations delegated to named database routines.
//!
//! The routines (created by the migrations) perform the writes; this path
//! only invokes them and re-reads the affected row, because it never sets the
//! column values itself and the caller still needs the post-write snapshot
//! for auditing.

use async_trait::async_trait;
use sqlx::PgConnection;

use crate::error::{AppError, Result};
use crate::models::{Access, Company, Project, ProjectType, Role, Site, User};

use super::{
    AccessChanges, EntityStore, NewAccess, NewProject, NewProjectType, NewSite, NewUser,
    ProjectChanges, ProjectTypeChanges, SiteChanges, UserChanges,
};

pub struct ProcedureStore;

impl ProcedureStore {
    /// Re-read a row inserted in this session via its serial sequence.
    async fn fetch_last_inserted<T>(conn: &mut PgConnection, table: &str) -> Result<T>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let sql = format!(
            "SELECT * FROM {table} WHERE id = currval(pg_get_serial_sequence('{table}', 'id'))::int"
        );
        sqlx::query_as::<_, T>(&sql)
            .fetch_one(conn)
            .await
            .map_err(AppError::from)
    }

    async fn fetch_by_id<T>(conn: &mut PgConnection, table: &str, id: i32, missing: &str) -> Result<T>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {table} WHERE id = $1");
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::NotFound(missing.to_string()))
    }
}

#[async_trait]
impl EntityStore for ProcedureStore {
    async fn create_role(&self, conn: &mut PgConnection, name: &str, actor: i32) -> Result<Role> {
        sqlx::query("SELECT role_create($1, $2)")
            .bind(name)
            .bind(actor)
            .execute(&mut *conn)
            .await?;

        sqlx::query_as::<_, Role>("SELECT * FROM role WHERE name = $1")
            .bind(name)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::Internal("Role creation failed".into()))
    }

    async fn update_role(
        &self,
        conn: &mut PgConnection,
        id: i32,
        name: &str,
        is_active: bool,
        actor: i32,
    ) -> Result<Role> {
        sqlx::query("SELECT role_update($1, $2, $3, $4)")
            .bind(id)
            .bind(name)
            .bind(is_active)
            .bind(actor)
            .execute(&mut *conn)
            .await?;

        Self::fetch_by_id(conn, "role", id, "Role not found").await
    }

    async fn deactivate_role(&self, conn: &mut PgConnection, id: i32, actor: i32) -> Result<Role> {
        sqlx::query("SELECT role_deactivate($1, $2)")
            .bind(id)
            .bind(actor)
            .execute(&mut *conn)
            .await?;

        Self::fetch_by_id(conn, "role", id, "Role not found").await
    }

    async fn create_company(
        &self,
        conn: &mut PgConnection,
        name: &str,
        actor: i32,
    ) -> Result<Company> {
        sqlx::query("SELECT company_create($1, $2)")
            .bind(name)
            .bind(actor)
            .execute(&mut *conn)
            .await?;

        sqlx::query_as::<_, Company>("SELECT * FROM company WHERE name = $1")
            .bind(name)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::Internal("Company creation failed".into()))
    }

    async fn update_company(
        &self,
        conn: &mut PgConnection,
        id: i32,
        name: &str,
        is_active: bool,
        actor: i32,
    ) -> Result<Company> {
        sqlx::query("SELECT company_update($1, $2, $3, $4)")
            .bind(id)
            .bind(name)
            .bind(is_active)
            .bind(actor)
            .execute(&mut *conn)
            .await?;

        Self::fetch_by_id(conn, "company", id, "Company not found").await
    }

    async fn deactivate_company(
        &self,
        conn: &mut PgConnection,
        id: i32,
        actor: i32,
    ) -> Result<Company> {
        sqlx::query("SELECT company_deactivate($1, $2)")
            .bind(id)
            .bind(actor)
            .execute(&mut *conn)
            .await?;

        Self::fetch_by_id(conn, "company", id, "Company not found").await
    }

    async fn create_site(
        &self,
        conn: &mut PgConnection,
        site: &NewSite,
        actor: i32,
    ) -> Result<Site> {
        sqlx::query("SELECT site_create($1, $2, $3, $4, $5)")
            .bind(&site.name)
            .bind(&site.url)
            .bind(&site.domain)
            .bind(&site.ip)
            .bind(actor)
            .execute(&mut *conn)
            .await?;

        Self::fetch_last_inserted(conn, "site").await
    }

    async fn update_site(
        &self,
        conn: &mut PgConnection,
        id: i32,
        changes: &SiteChanges,
        actor: i32,
    ) -> Result<Site> {
        sqlx::query("SELECT site_update($1, $2, $3, $4, $5, $6, $7)")
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.url)
            .bind(&changes.domain)
            .bind(&changes.ip)
            .bind(changes.is_active)
            .bind(actor)
            .execute(&mut *conn)
            .await?;

        Self::fetch_by_id(conn, "site", id, "Site not found").await
    }

    async fn deactivate_site(&self, conn: &mut PgConnection, id: i32, actor: i32) -> Result<Site> {
        sqlx::query("SELECT site_deactivate($1, $2)")
            .bind(id)
            .bind(actor)
            .execute(&mut *conn)
            .await?;

        Self::fetch_by_id(conn, "site", id, "Site not found").await
    }

    async fn create_project_type(
        &self,
        conn: &mut PgConnection,
        project_type: &NewProjectType,
        actor: i32,
    ) -> Result<ProjectType> {
        sqlx::query("SELECT project_type_create($1, $2, $3)")
            .bind(&project_type.type_name)
            .bind(&project_type.description)
            .bind(actor)
            .execute(&mut *conn)
            .await?;

        Self::fetch_last_inserted(conn, "project_type").await
    }

    async fn update_project_type(
        &self,
        conn: &mut PgConnection,
        id: i32,
        changes: &ProjectTypeChanges,
        actor: i32,
    ) -> Result<ProjectType> {
        sqlx::query("SELECT project_type_update($1, $2, $3, $4, $5)")
            .bind(id)
            .bind(&changes.type_name)
            .bind(&changes.description)
            .bind(changes.is_active)
            .bind(actor)
            .execute(&mut *conn)
            .await?;

        Self::fetch_by_id(conn, "project_type", id, "Project type not found").await
    }

    async fn deactivate_project_type(
        &self,
        conn: &mut PgConnection,
        id: i32,
        actor: i32,
    ) -> Result<ProjectType> {
        sqlx::query("SELECT project_type_deactivate($1, $2)")
            .bind(id)
            .bind(actor)
            .execute(&mut *conn)
            .await?;

        Self::fetch_by_id(conn, "project_type", id, "Project type not found").await
    }

    async fn create_access(
        &self,
        conn: &mut PgConnection,
        access: &NewAccess,
        actor: i32,
    ) -> Result<Access> {
        sqlx::query("SELECT access_create($1, $2, $3, $4)")
            .bind(access.web_access)
            .bind(access.app_access)
            .bind(access.role_id)
            .bind(actor)
            .execute(&mut *conn)
            .await?;

        Self::fetch_last_inserted(conn, "access").await
    }

    async fn update_access(
        &self,
        conn: &mut PgConnection,
        id: i32,
        changes: &AccessChanges,
        actor: i32,
    ) -> Result<Access> {
        sqlx::query("SELECT access_update($1, $2, $3, $4, $5, $6)")
            .bind(id)
            .bind(changes.web_access)
            .bind(changes.app_access)
            .bind(changes.role_id)
            .bind(changes.is_active)
            .bind(actor)
            .execute(&mut *conn)
            .await?;

        Self::fetch_by_id(conn, "access", id, "Access not found").await
    }

    async fn deactivate_access(
        &self,
        conn: &mut PgConnection,
        id: i32,
        actor: i32,
    ) -> Result<Access> {
        sqlx::query("SELECT access_deactivate($1, $2)")
            .bind(id)
            .bind(actor)
            .execute(&mut *conn)
            .await?;

        Self::fetch_by_id(conn, "access", id, "Access not found").await
    }

    async fn create_project(
        &self,
        conn: &mut PgConnection,
        project: &NewProject,
        actor: i32,
    ) -> Result<Project> {
        sqlx::query("SELECT project_create($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)")
            .bind(&project.name)
            .bind(&project.description)
            .bind(project.project_type_id)
            .bind(project.company_id)
            .bind(project.site_id)
            .bind(project.is_demo)
            .bind(&project.logo)
            .bind(&project.device_id)
            .bind(&project.app_version)
            .bind(actor)
            .execute(&mut *conn)
            .await?;

        sqlx::query_as::<_, Project>(
            "SELECT * FROM project WHERE name = $1 AND project_type_id = $2 AND company_id = $3",
        )
        .bind(&project.name)
        .bind(project.project_type_id)
        .bind(project.company_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::Internal("Project creation failed".into()))
    }

    async fn update_project(
        &self,
        conn: &mut PgConnection,
        id: i32,
        changes: &ProjectChanges,
        actor: i32,
    ) -> Result<Project> {
        sqlx::query(
            "SELECT project_update($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.project_type_id)
        .bind(changes.company_id)
        .bind(changes.site_id)
        .bind(changes.is_demo)
        .bind(&changes.logo)
        .bind(&changes.device_id)
        .bind(&changes.app_version)
        .bind(changes.is_active)
        .bind(actor)
        .execute(&mut *conn)
        .await?;

        Self::fetch_by_id(conn, "project", id, "Project not found").await
    }

    async fn deactivate_project(
        &self,
        conn: &mut PgConnection,
        id: i32,
        actor: i32,
    ) -> Result<Project> {
        sqlx::query("SELECT project_deactivate($1, $2)")
            .bind(id)
            .bind(actor)
            .execute(&mut *conn)
            .await?;

        Self::fetch_by_id(conn, "project", id, "Project not found").await
    }

    async fn create_user(&self, conn: &mut PgConnection, user: &NewUser) -> Result<User> {
        sqlx::query("SELECT user_create($1, $2, $3, $4, $5, $6, $7, $8, $9)")
            .bind(&user.username)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(user.birthday)
            .bind(&user.city)
            .bind(&user.email)
            .bind(&user.prof_img)
            .bind(user.role_id)
            .bind(user.company_id)
            .execute(&mut *conn)
            .await?;

        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(&user.email)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::Internal("User creation failed".into()))
    }

    async fn update_user(
        &self,
        conn: &mut PgConnection,
        id: i32,
        changes: &UserChanges,
        actor: i32,
    ) -> Result<User> {
        sqlx::query("SELECT user_update($1, $2, $3, $4, $5, $6, $7, $8)")
            .bind(id)
            .bind(&changes.username)
            .bind(&changes.password_hash)
            .bind(changes.role_id)
            .bind(&changes.email)
            .bind(changes.is_active)
            .bind(changes.company_id)
            .bind(actor)
            .execute(&mut *conn)
            .await?;

        Self::fetch_by_id(conn, "users", id, "User not found").await
    }

    async fn deactivate_user(&self, conn: &mut PgConnection, id: i32, actor: i32) -> Result<User> {
        sqlx::query("SELECT user_deactivate($1, $2)")
            .bind(id)
            .bind(actor)
            .execute(&mut *conn)
            .await?;

        Self::fetch_by_id(conn, "users", id, "User not found").await
    }
}
