//! Project CRUD.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::project::{Project, ProjectFields};
use crate::schema::portfolio_projects;

/// List every project, newest first. Ties on `created_at` fall back to id.
pub async fn list_projects(conn: &mut AsyncPgConnection) -> QueryResult<Vec<Project>> {
    portfolio_projects::table
        .select(Project::as_select())
        .order((
            portfolio_projects::created_at.desc(),
            portfolio_projects::id.desc(),
        ))
        .load(conn)
        .await
}

pub async fn get_project(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<Option<Project>> {
    portfolio_projects::table
        .find(id)
        .select(Project::as_select())
        .first(conn)
        .await
        .optional()
}

/// Insert a project. An empty title is rejected by the table's check constraint.
pub async fn add_project(
    conn: &mut AsyncPgConnection,
    fields: &ProjectFields,
) -> QueryResult<Project> {
    let project = diesel::insert_into(portfolio_projects::table)
        .values(fields)
        .returning(Project::as_returning())
        .get_result(conn)
        .await?;

    tracing::info!(project_id = project.id, title = %project.title, "Project created");
    Ok(project)
}

/// Replace every editable column. `None` when the id does not exist.
pub async fn update_project(
    conn: &mut AsyncPgConnection,
    id: i32,
    fields: &ProjectFields,
) -> QueryResult<Option<Project>> {
    let project = diesel::update(portfolio_projects::table.find(id))
        .set(fields)
        .returning(Project::as_returning())
        .get_result(conn)
        .await
        .optional()?;

    if project.is_some() {
        tracing::info!(project_id = id, "Project updated");
    }
    Ok(project)
}

/// Delete a project. Returns whether a row was removed.
pub async fn delete_project(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<bool> {
    let removed = diesel::delete(portfolio_projects::table.find(id))
        .execute(conn)
        .await?;

    tracing::info!(project_id = id, removed, "Project delete");
    Ok(removed > 0)
}
