//! Locations service

use validator::Validate;

use crate::{
    engine::LocationDirectory,
    error::{AppError, AppResult},
    models::{
        location::{normalize_location_code, CreateLocation, Location, QrPayload, UpdateLocation},
        FormType,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LocationsService {
    repository: Repository,
    public_base_url: String,
}

impl LocationsService {
    pub fn new(repository: Repository, public_base_url: String) -> Self {
        Self {
            repository,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn list(&self, include_inactive: bool) -> AppResult<Vec<Location>> {
        self.repository.locations.list(include_inactive).await
    }

    /// Get a location by code, active or not
    pub async fn get(&self, code: &str) -> AppResult<Location> {
        let code = code.trim().to_uppercase();
        self.repository
            .locations
            .get(&code)
            .await?
            .ok_or_else(|| AppError::LocationNotFound(code.clone()))
    }

    /// Resolve a code that must accept new check-ins
    pub async fn get_active(&self, code: &str) -> AppResult<Location> {
        let code = normalize_location_code(code)?;
        let found = self.repository.locations.get(&code).await?;
        match found {
            Some(location) if location.is_active => Ok(location),
            _ => Err(AppError::LocationNotFound(code)),
        }
    }

    pub async fn create(&self, data: &CreateLocation) -> AppResult<Location> {
        data.validate()?;
        let code = normalize_location_code(&data.code)?;
        let location = self.repository.locations.insert(&code, data).await?;
        tracing::info!(code = %location.code, name = %location.name, "Location created");
        Ok(location)
    }

    pub async fn update(&self, code: &str, data: &UpdateLocation) -> AppResult<Location> {
        data.validate()?;
        let code = code.trim().to_uppercase();
        let location = self
            .repository
            .locations
            .update(&code, data)
            .await?
            .ok_or_else(|| AppError::LocationNotFound(code.clone()))?;
        tracing::info!(code = %location.code, active = location.is_active, "Location updated");
        Ok(location)
    }

    /// Soft delete: historical records stay aggregatable
    pub async fn delete(&self, code: &str) -> AppResult<()> {
        let code = code.trim().to_uppercase();
        if !self.repository.locations.deactivate(&code).await? {
            return Err(AppError::LocationNotFound(code));
        }
        tracing::info!(code = %code, "Location deactivated");
        Ok(())
    }

    /// Snapshot of every location, including inactive ones
    pub async fn directory(&self) -> AppResult<LocationDirectory> {
        let locations = self.repository.locations.list(true).await?;
        Ok(locations.iter().collect())
    }

    /// URL of the public check-in form for a location, to be rendered as a QR code
    pub async fn qr_payload(&self, code: &str, form_type: FormType) -> AppResult<QrPayload> {
        let location = self.get_active(code).await?;
        Ok(QrPayload {
            url: format!(
                "{}/visitor-form/{}/{}",
                self.public_base_url,
                location.code,
                form_type.as_str()
            ),
            location_code: location.code,
            location_name: location.name,
            form_type: form_type.as_str().to_string(),
        })
    }
}
