//! Driven port for cause reads.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::cause::{Cause, CauseStatus};
use crate::domain::slug::Slug;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by cause repository adapters.
    pub enum CausePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "cause repository connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } => "cause repository query failed: {message}",
    }
}

/// Port for reading fundraising causes.
#[async_trait]
pub trait CauseRepository: Send + Sync {
    /// Fetch a cause by its public slug.
    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Cause>, CausePersistenceError>;

    /// List publicly visible causes, active campaigns first, newest first.
    async fn list(&self, page: PageRequest) -> Result<Page<Cause>, CausePersistenceError>;
}

/// In-memory cause directory used without a database pool and in tests.
#[derive(Debug, Default)]
pub struct InMemoryCauseDirectory {
    causes: Mutex<Vec<Cause>>,
}

impl InMemoryCauseDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory pre-populated with the given causes.
    #[must_use]
    pub fn with_causes(causes: Vec<Cause>) -> Self {
        Self {
            causes: Mutex::new(causes),
        }
    }

    /// A minimal active cause for seeding demo and test directories.
    ///
    /// # Panics
    /// Panics if the fixture slug fails validation, which would be a bug in
    /// the fixture itself.
    #[must_use]
    pub fn sample_cause(slug: &str) -> Cause {
        let now = Utc::now();
        Cause {
            id: Uuid::new_v4(),
            slug: Slug::new(slug).expect("fixture slug is valid"),
            title: "Clean water for every village".to_owned(),
            summary: "Wells and filtration for drought-hit districts.".to_owned(),
            goal_minor: Some(10_000_000),
            raised_minor: 0,
            donors_count: 0,
            status: CauseStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl CauseRepository for InMemoryCauseDirectory {
    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Cause>, CausePersistenceError> {
        let causes = self
            .causes
            .lock()
            .map_err(|_| CausePersistenceError::query("cause directory lock poisoned"))?;
        Ok(causes.iter().find(|cause| &cause.slug == slug).cloned())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Cause>, CausePersistenceError> {
        let causes = self
            .causes
            .lock()
            .map_err(|_| CausePersistenceError::query("cause directory lock poisoned"))?;
        let mut visible: Vec<Cause> = causes
            .iter()
            .filter(|cause| cause.status != CauseStatus::Draft)
            .filter(|cause| cause.status != CauseStatus::Archived)
            .cloned()
            .collect();
        visible.sort_by(|a, b| {
            let a_active = a.status == CauseStatus::Active;
            let b_active = b.status == CauseStatus::Active;
            b_active
                .cmp(&a_active)
                .then(b.created_at.cmp(&a.created_at))
        });
        let total = visible.len() as u64;
        let items = visible
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(Page::new(page, items, total))
    }
}
