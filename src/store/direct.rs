//! Direct write path: in-process SQL statements.

use async_trait::async_trait;
use sqlx::PgConnection;

use crate::error::{AppError, Result};
use crate::models::{Access, Company, Project, ProjectType, Role, Site, User};

use super::{
    AccessChanges, EntityStore, NewAccess, NewProject, NewProjectType, NewSite, NewUser,
    ProjectChanges, ProjectTypeChanges, SiteChanges, UserChanges,
};

/// Map a unique-constraint violation to the legacy duplicate error; anything
/// else stays a database error.
fn map_unique(err: sqlx::Error, duplicate_message: &str) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return AppError::Duplicate(duplicate_message.to_string());
        }
    }
    err.into()
}

pub struct DirectStore;

#[async_trait]
impl EntityStore for DirectStore {
    async fn create_role(&self, conn: &mut PgConnection, name: &str, actor: i32) -> Result<Role> {
        sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO role (name, is_active, created_by, updated_by)
            VALUES ($1, TRUE, $2, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(actor)
        .fetch_one(conn)
        .await
        .map_err(|e| map_unique(e, "Role name already exists"))
    }

    async fn update_role(
        &self,
        conn: &mut PgConnection,
        id: i32,
        name: &str,
        is_active: bool,
        actor: i32,
    ) -> Result<Role> {
        sqlx::query_as::<_, Role>(
            r#"
            UPDATE role
            SET name = $2,
                is_active = $3,
                updated_by = $4,
                updated_at = NOW(),
                deleted_at = CASE WHEN $3 THEN NULL ELSE NOW() END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(is_active)
        .bind(actor)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Role not found".into()))
    }

    async fn deactivate_role(&self, conn: &mut PgConnection, id: i32, actor: i32) -> Result<Role> {
        sqlx::query_as::<_, Role>(
            r#"
            UPDATE role
            SET is_active = FALSE,
                updated_by = $2,
                updated_at = NOW(),
                deleted_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(actor)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Role not found".into()))
    }

    async fn create_company(
        &self,
        conn: &mut PgConnection,
        name: &str,
        actor: i32,
    ) -> Result<Company> {
        sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO company (name, is_active, created_by, updated_by)
            VALUES ($1, TRUE, $2, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(actor)
        .fetch_one(conn)
        .await
        .map_err(|e| map_unique(e, "Company name already exists"))
    }

    async fn update_company(
        &self,
        conn: &mut PgConnection,
        id: i32,
        name: &str,
        is_active: bool,
        actor: i32,
    ) -> Result<Company> {
        sqlx::query_as::<_, Company>(
            r#"
            UPDATE company
            SET name = $2,
                is_active = $3,
                updated_by = $4,
                updated_at = NOW(),
                deleted_at = CASE WHEN $3 THEN NULL ELSE NOW() END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(is_active)
        .bind(actor)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".into()))
    }

    async fn deactivate_company(
        &self,
        conn: &mut PgConnection,
        id: i32,
        actor: i32,
    ) -> Result<Company> {
        sqlx::query_as::<_, Company>(
            r#"
            UPDATE company
            SET is_active = FALSE,
                updated_by = $2,
                updated_at = NOW(),
                deleted_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(actor)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".into()))
    }

    async fn create_site(
        &self,
        conn: &mut PgConnection,
        site: &NewSite,
        actor: i32,
    ) -> Result<Site> {
        sqlx::query_as::<_, Site>(
            r#"
            INSERT INTO site (name, url, domain, ip, is_active, created_by, updated_by)
            VALUES ($1, $2, $3, $4, TRUE, $5, $5)
            RETURNING *
            "#,
        )
        .bind(&site.name)
        .bind(&site.url)
        .bind(&site.domain)
        .bind(&site.ip)
        .bind(actor)
        .fetch_one(conn)
        .await
        .map_err(AppError::from)
    }

    async fn update_site(
        &self,
        conn: &mut PgConnection,
        id: i32,
        changes: &SiteChanges,
        actor: i32,
    ) -> Result<Site> {
        sqlx::query_as::<_, Site>(
            r#"
            UPDATE site
            SET name = $2,
                url = $3,
                domain = $4,
                ip = $5,
                is_active = $6,
                updated_by = $7,
                updated_at = NOW(),
                deleted_at = CASE WHEN $6 THEN NULL ELSE NOW() END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.url)
        .bind(&changes.domain)
        .bind(&changes.ip)
        .bind(changes.is_active)
        .bind(actor)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Site not found".into()))
    }

    async fn deactivate_site(&self, conn: &mut PgConnection, id: i32, actor: i32) -> Result<Site> {
        sqlx::query_as::<_, Site>(
            r#"
            UPDATE site
            SET is_active = FALSE,
                updated_by = $2,
                updated_at = NOW(),
                deleted_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(actor)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Site not found".into()))
    }

    async fn create_project_type(
        &self,
        conn: &mut PgConnection,
        project_type: &NewProjectType,
        actor: i32,
    ) -> Result<ProjectType> {
        sqlx::query_as::<_, ProjectType>(
            r#"
            INSERT INTO project_type (type_name, description, is_active, created_by, updated_by)
            VALUES ($1, $2, TRUE, $3, $3)
            RETURNING *
            "#,
        )
        .bind(&project_type.type_name)
        .bind(&project_type.description)
        .bind(actor)
        .fetch_one(conn)
        .await
        .map_err(AppError::from)
    }

    async fn update_project_type(
        &self,
        conn: &mut PgConnection,
        id: i32,
        changes: &ProjectTypeChanges,
        actor: i32,
    ) -> Result<ProjectType> {
        sqlx::query_as::<_, ProjectType>(
            r#"
            UPDATE project_type
            SET type_name = $2,
                description = $3,
                is_active = $4,
                updated_by = $5,
                updated_at = NOW(),
                deleted_at = CASE WHEN $4 THEN NULL ELSE NOW() END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.type_name)
        .bind(&changes.description)
        .bind(changes.is_active)
        .bind(actor)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Project type not found".into()))
    }

    async fn deactivate_project_type(
        &self,
        conn: &mut PgConnection,
        id: i32,
        actor: i32,
    ) -> Result<ProjectType> {
        sqlx::query_as::<_, ProjectType>(
            r#"
            UPDATE project_type
            SET is_active = FALSE,
                updated_by = $2,
                updated_at = NOW(),
                deleted_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(actor)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Project type not found".into()))
    }

    async fn create_access(
        &self,
        conn: &mut PgConnection,
        access: &NewAccess,
        actor: i32,
    ) -> Result<Access> {
        sqlx::query_as::<_, Access>(
            r#"
            INSERT INTO access (web_access, app_access, role_id, is_active, created_by, updated_by)
            VALUES ($1, $2, $3, TRUE, $4, $4)
            RETURNING *
            "#,
        )
        .bind(access.web_access)
        .bind(access.app_access)
        .bind(access.role_id)
        .bind(actor)
        .fetch_one(conn)
        .await
        .map_err(AppError::from)
    }

    async fn update_access(
        &self,
        conn: &mut PgConnection,
        id: i32,
        changes: &AccessChanges,
        actor: i32,
    ) -> Result<Access> {
        sqlx::query_as::<_, Access>(
            r#"
            UPDATE access
            SET web_access = $2,
                app_access = $3,
                role_id = $4,
                is_active = $5,
                updated_by = $6,
                updated_at = NOW(),
                deleted_at = CASE WHEN $5 THEN NULL ELSE NOW() END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.web_access)
        .bind(changes.app_access)
        .bind(changes.role_id)
        .bind(changes.is_active)
        .bind(actor)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Access not found".into()))
    }

    async fn deactivate_access(
        &self,
        conn: &mut PgConnection,
        id: i32,
        actor: i32,
    ) -> Result<Access> {
        sqlx::query_as::<_, Access>(
            r#"
            UPDATE access
            SET is_active = FALSE,
                updated_by = $2,
                updated_at = NOW(),
                deleted_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(actor)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Access not found".into()))
    }

    async fn create_project(
        &self,
        conn: &mut PgConnection,
        project: &NewProject,
        actor: i32,
    ) -> Result<Project> {
        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO project (
                name, description, project_type_id, company_id, site_id,
                is_demo, logo, device_id, app_version, is_active, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, $10, $10)
            RETURNING *
            "#,
        )
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
        .fetch_one(conn)
        .await
        .map_err(|e| {
            map_unique(
                e,
                "Project already exists for this company and project type",
            )
        })
    }

    async fn update_project(
        &self,
        conn: &mut PgConnection,
        id: i32,
        changes: &ProjectChanges,
        actor: i32,
    ) -> Result<Project> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE project
            SET name = $2,
                description = $3,
                project_type_id = $4,
                company_id = $5,
                site_id = $6,
                is_demo = $7,
                logo = $8,
                device_id = $9,
                app_version = $10,
                is_active = $11,
                updated_by = $12,
                updated_at = NOW(),
                deleted_at = CASE WHEN $11 THEN NULL ELSE NOW() END
            WHERE id = $1
            RETURNING *
            "#,
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
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
    }

    async fn deactivate_project(
        &self,
        conn: &mut PgConnection,
        id: i32,
        actor: i32,
    ) -> Result<Project> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE project
            SET is_active = FALSE,
                updated_by = $2,
                updated_at = NOW(),
                deleted_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(actor)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
    }

    async fn create_user(&self, conn: &mut PgConnection, user: &NewUser) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                username, name, password, birthday, city, email, prof_img,
                role_id, company_id, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.birthday)
        .bind(&user.city)
        .bind(&user.email)
        .bind(&user.prof_img)
        .bind(user.role_id)
        .bind(user.company_id)
        .fetch_one(conn)
        .await
        .map_err(|e| map_unique(e, "Email already exists"))
    }

    async fn update_user(
        &self,
        conn: &mut PgConnection,
        id: i32,
        changes: &UserChanges,
        actor: i32,
    ) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2,
                password = COALESCE($3, password),
                role_id = $4,
                email = $5,
                is_active = $6,
                company_id = $7,
                updated_by = $8,
                updated_at = NOW(),
                deleted_at = CASE WHEN $6 THEN NULL ELSE NOW() END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.username)
        .bind(&changes.password_hash)
        .bind(changes.role_id)
        .bind(&changes.email)
        .bind(changes.is_active)
        .bind(changes.company_id)
        .bind(actor)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    async fn deactivate_user(&self, conn: &mut PgConnection, id: i32, actor: i32) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_active = FALSE,
                updated_by = $2,
                updated_at = NOW(),
                deleted_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(actor)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
    }
}
