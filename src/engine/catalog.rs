// ==========================================
// Exam Timetabling Engine - Resource Catalog
// ==========================================
// Assembles the three bounded pools a run works with. The pool cap and
// the selectors come from the caller; the catalog itself decides
// nothing, it only fetches deterministically ordered pools.
// ==========================================

use crate::domain::exam::ExamEvent;
use crate::domain::resources::{Professor, Room};
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::RepositoryResult;
use std::sync::Arc;

/// The bounded pools feeding one generation run.
#[derive(Debug, Clone)]
pub struct ResourcePools {
    /// Candidate exam events, unscheduled first, at most `pool_cap`
    pub events: Vec<ExamEvent>,
    /// Available rooms, capacity-descending
    pub rooms: Vec<Room>,
    /// Available professors, id-ascending, dept-filtered when the run is
    pub professors: Vec<Professor>,
}

impl ResourcePools {
    pub fn is_deficient(&self) -> bool {
        self.events.is_empty() || self.rooms.is_empty() || self.professors.is_empty()
    }
}

// ==========================================
// ResourceCatalog
// ==========================================
pub struct ResourceCatalog {
    catalog_repo: Arc<CatalogRepository>,
}

impl ResourceCatalog {
    pub fn new(catalog_repo: Arc<CatalogRepository>) -> Self {
        Self { catalog_repo }
    }

    /// Fetch all three pools for a run. Department selectors narrow the
    /// event and professor pools; formation selectors narrow events only.
    pub fn assemble(
        &self,
        dept_ids: Option<&[i64]>,
        formation_ids: Option<&[i64]>,
        pool_cap: usize,
    ) -> RepositoryResult<ResourcePools> {
        let events = self
            .catalog_repo
            .find_exam_events(dept_ids, formation_ids, pool_cap)?;
        let rooms = self.catalog_repo.find_available_rooms(pool_cap)?;
        let professors = self
            .catalog_repo
            .find_available_professors(dept_ids, pool_cap)?;

        Ok(ResourcePools {
            events,
            rooms,
            professors,
        })
    }
}
