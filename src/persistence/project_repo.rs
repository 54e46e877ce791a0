//! Project and label repository for `SQLite` persistence.
//!
//! Covers the minimal seeding and lookup surface the workflow needs;
//! full project/label CRUD administration lives elsewhere.

use sqlx::SqliteConnection;

use crate::models::label::Label;
use crate::models::project::Project;
use crate::{AppError, Result};

use super::parse_ts;

/// Repository for project and label rows.
pub struct ProjectRepo;

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: String,
    name: String,
    batch_size: i64,
    required_irr_voters: i64,
    current_training_set: i64,
    created_at: String,
}

impl ProjectRow {
    fn into_project(self) -> Result<Project> {
        let created_at = parse_ts(&self.created_at, "created_at")?;
        Ok(Project {
            id: self.id,
            name: self.name,
            batch_size: u32::try_from(self.batch_size)
                .map_err(|err| AppError::Db(format!("invalid batch_size: {err}")))?,
            required_irr_voters: u32::try_from(self.required_irr_voters)
                .map_err(|err| AppError::Db(format!("invalid required_irr_voters: {err}")))?,
            current_training_set: u32::try_from(self.current_training_set)
                .map_err(|err| AppError::Db(format!("invalid current_training_set: {err}")))?,
            created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LabelRow {
    id: String,
    project_id: String,
    name: String,
}

impl LabelRow {
    fn into_label(self) -> Label {
        Label {
            id: self.id,
            project_id: self.project_id,
            name: self.name,
        }
    }
}

impl ProjectRepo {
    /// Insert a new project record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    pub async fn create(conn: &mut SqliteConnection, project: &Project) -> Result<()> {
        sqlx::query(
            "INSERT INTO project (id, name, batch_size, required_irr_voters,
             current_training_set, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&project.id)
        .bind(&project.name)
        .bind(i64::from(project.batch_size))
        .bind(i64::from(project.required_irr_voters))
        .bind(i64::from(project.current_training_set))
        .bind(project.created_at.to_rfc3339())
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Retrieve a project by identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the project does not exist.
    pub async fn get(conn: &mut SqliteConnection, id: &str) -> Result<Project> {
        let row: Option<ProjectRow> = sqlx::query_as("SELECT * FROM project WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        row.map(ProjectRow::into_project)
            .transpose()?
            .ok_or_else(|| AppError::NotFound(format!("project {id} not found")))
    }

    /// Insert a new label record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    pub async fn create_label(conn: &mut SqliteConnection, label: &Label) -> Result<()> {
        sqlx::query("INSERT INTO label (id, project_id, name) VALUES (?1, ?2, ?3)")
            .bind(&label.id)
            .bind(&label.project_id)
            .bind(&label.name)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Retrieve a label by identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the label does not exist.
    pub async fn get_label(conn: &mut SqliteConnection, id: &str) -> Result<Label> {
        let row: Option<LabelRow> = sqlx::query_as("SELECT * FROM label WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        row.map(LabelRow::into_label)
            .ok_or_else(|| AppError::NotFound(format!("label {id} not found")))
    }

    /// All labels defined for a project, in name order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn labels_for_project(
        conn: &mut SqliteConnection,
        project_id: &str,
    ) -> Result<Vec<Label>> {
        let rows: Vec<LabelRow> =
            sqlx::query_as("SELECT * FROM label WHERE project_id = ?1 ORDER BY name ASC")
                .bind(project_id)
                .fetch_all(&mut *conn)
                .await?;
        Ok(rows.into_iter().map(LabelRow::into_label).collect())
    }
}
