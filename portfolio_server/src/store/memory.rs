//! In-memory [`PortfolioStore`] used by router and contract tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{PortfolioStore, StoreError};
use crate::models::profile::{Profile, ProfileFields};
use crate::models::project::{Project, ProjectFields};

#[derive(Default)]
struct State {
    profile: Option<(Profile, Option<Vec<u8>>)>,
    projects: Vec<Project>,
    next_project_id: i32,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the database were down.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn profile_rows(&self) -> usize {
        usize::from(self.lock().profile.is_some())
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Pool("memory store offline".into()))
        } else {
            Ok(())
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn profile_from(id: i32, fields: ProfileFields) -> Profile {
    Profile {
        id,
        name: Some(fields.name),
        role: Some(fields.role),
        bio: Some(fields.bio),
        avatar_url: Some(fields.avatar_url),
        github_link: Some(fields.github_link),
        linkedin_link: Some(fields.linkedin_link),
        resume_link: Some(fields.resume_link),
    }
}

#[async_trait]
impl PortfolioStore for MemoryStore {
    async fn get_profile(&self) -> Result<Option<Profile>, StoreError> {
        self.check()?;
        Ok(self.lock().profile.as_ref().map(|(p, _)| p.clone()))
    }

    async fn save_profile(
        &self,
        fields: ProfileFields,
        avatar: Option<Vec<u8>>,
    ) -> Result<Profile, StoreError> {
        self.check()?;
        let mut state = self.lock();
        let (profile, stored) = match state.profile.take() {
            Some((existing, stored)) => (profile_from(existing.id, fields), avatar.or(stored)),
            None => (profile_from(1, fields), avatar),
        };
        state.profile = Some((profile.clone(), stored));
        Ok(profile)
    }

    async fn get_profile_image(&self) -> Result<Option<Vec<u8>>, StoreError> {
        self.check()?;
        Ok(self.lock().profile.as_ref().and_then(|(_, data)| data.clone()))
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        self.check()?;
        let mut projects = self.lock().projects.clone();
        projects.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(projects)
    }

    async fn get_project(&self, id: i32) -> Result<Option<Project>, StoreError> {
        self.check()?;
        Ok(self.lock().projects.iter().find(|p| p.id == id).cloned())
    }

    async fn add_project(&self, fields: ProjectFields) -> Result<Project, StoreError> {
        self.check()?;
        if fields.title.trim().is_empty() {
            return Err(StoreError::Invalid("title must not be empty".into()));
        }
        let mut state = self.lock();
        state.next_project_id += 1;
        let project = Project {
            id: state.next_project_id,
            title: fields.title,
            description: fields.description,
            github_link: fields.github_link,
            project_link: fields.project_link,
            doc_link: fields.doc_link,
            created_at: Utc::now(),
        };
        state.projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        id: i32,
        fields: ProjectFields,
    ) -> Result<Option<Project>, StoreError> {
        self.check()?;
        if fields.title.trim().is_empty() {
            return Err(StoreError::Invalid("title must not be empty".into()));
        }
        let mut state = self.lock();
        let Some(project) = state.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        project.title = fields.title;
        project.description = fields.description;
        project.github_link = fields.github_link;
        project.project_link = fields.project_link;
        project.doc_link = fields.doc_link;
        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, id: i32) -> Result<bool, StoreError> {
        self.check()?;
        let mut state = self.lock();
        let before = state.projects.len();
        state.projects.retain(|p| p.id != id);
        Ok(state.projects.len() != before)
    }
}
