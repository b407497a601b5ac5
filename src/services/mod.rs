//! Business logic services

pub mod locations;
pub mod stats;
pub mod visitors;

use chrono::FixedOffset;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub locations: locations::LocationsService,
    pub visitors: visitors::VisitorsService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services over the given stores
    pub fn new(repository: Repository, offset: FixedOffset, public_base_url: String) -> Self {
        let locations = locations::LocationsService::new(repository.clone(), public_base_url);
        Self {
            visitors: visitors::VisitorsService::new(repository.clone(), locations.clone(), offset),
            stats: stats::StatsService::new(repository, locations.clone(), offset),
            locations,
        }
    }
}
