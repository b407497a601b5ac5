//! Visitor records service: listing, intake and edits

use chrono::{FixedOffset, Utc};
use uuid::Uuid;
use validator::Validate;

use super::locations::LocationsService;
use crate::{
    engine::{
        export,
        filter::{self, RecordFilter, RecordPage},
        LocationDirectory,
    },
    error::{AppError, AppResult},
    models::{
        location::normalize_location_code,
        visitor_record::{
            CreateVisitorRecord, NewVisitorRecord, QrCheckIn, QrCheckInResponse, RecordChanges,
            UpdateVisitorRecord, VisitorRecord,
        },
        FormType, Gender, RecordSource, VisitorType,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct VisitorsService {
    repository: Repository,
    locations: LocationsService,
    offset: FixedOffset,
}

/// Missing or blank category defaults to domestic at intake; anything else must be exact
fn intake_visitor_type(value: Option<&str>) -> AppResult<VisitorType> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(VisitorType::Domestic),
        Some(v) => v.parse(),
    }
}

fn validate_filter(filter: &RecordFilter) -> AppResult<()> {
    if let Some(vt) = filter.type_constraint() {
        vt.parse::<VisitorType>()?;
    }
    Ok(())
}

fn resolve_name(mut record: VisitorRecord, directory: &LocationDirectory) -> VisitorRecord {
    record.location_name = Some(directory.display_name(&record.location_code).to_string());
    record
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl VisitorsService {
    pub fn new(repository: Repository, locations: LocationsService, offset: FixedOffset) -> Self {
        Self {
            repository,
            locations,
            offset,
        }
    }

    /// Filtered, newest-first page of records
    pub async fn list(&self, filter: &RecordFilter) -> AppResult<RecordPage> {
        validate_filter(filter)?;
        let records = self.repository.records.list_all().await?;
        let directory = self.locations.directory().await?;

        let mut page = filter::apply(&records, filter, &self.offset);
        page.records = page
            .records
            .into_iter()
            .map(|r| resolve_name(r, &directory))
            .collect();
        Ok(page)
    }

    pub async fn get(&self, id: i64) -> AppResult<VisitorRecord> {
        let record = self
            .repository
            .records
            .get(id)
            .await?
            .ok_or(AppError::RecordNotFound(id))?;
        let directory = self.locations.directory().await?;
        Ok(resolve_name(record, &directory))
    }

    /// Manual entry by staff
    pub async fn create(&self, data: &CreateVisitorRecord) -> AppResult<VisitorRecord> {
        self.create_with_source(data, RecordSource::Manual).await
    }

    async fn create_with_source(
        &self,
        data: &CreateVisitorRecord,
        source: RecordSource,
    ) -> AppResult<VisitorRecord> {
        data.validate()?;
        let visitor_type = intake_visitor_type(data.visitor_type.as_deref())?;
        let location = self.locations.get_active(&data.location_code).await?;

        let new_record = NewVisitorRecord {
            record_uuid: Uuid::new_v4(),
            location_code: location.code.clone(),
            visitor_name: data.visitor_name.as_deref().unwrap_or("").trim().to_string(),
            male_count: data.male_count,
            female_count: data.female_count,
            visitor_type,
            check_in_time: Utc::now(),
            notes: non_empty(data.notes.as_deref()).map(str::to_string),
            source,
        };

        let mut record = self.repository.records.insert(&new_record).await?;
        record.location_name = Some(location.name);
        tracing::info!(
            id = record.id,
            location = %record.location_code,
            visitors = record.total_visitors(),
            source = source.as_str(),
            "Visitor record created"
        );
        Ok(record)
    }

    /// Public QR form submission
    pub async fn create_from_qr(&self, form: &QrCheckIn) -> AppResult<QrCheckInResponse> {
        form.validate()?;
        let input = qr_to_record(form)?;
        let record = self.create_with_source(&input, RecordSource::Qr).await?;
        Ok(QrCheckInResponse {
            id: record.id,
            location_code: record.location_code,
            form_type: form.form_type,
        })
    }

    pub async fn update(&self, id: i64, data: &UpdateVisitorRecord) -> AppResult<VisitorRecord> {
        data.validate()?;

        let location_code = match data.location_code.as_deref() {
            Some(code) => {
                let code = normalize_location_code(code)?;
                // Moving a record only needs the target to exist
                self.locations.get(&code).await?;
                Some(code)
            }
            None => None,
        };
        let visitor_type = match data.visitor_type.as_deref() {
            Some(v) => Some(v.trim().parse::<VisitorType>()?),
            None => None,
        };

        let changes = RecordChanges {
            location_code,
            visitor_name: data.visitor_name.as_ref().map(|n| n.trim().to_string()),
            male_count: data.male_count,
            female_count: data.female_count,
            visitor_type,
            // A blank value clears the notes
            notes: data
                .notes
                .as_deref()
                .map(|n| non_empty(Some(n)).map(str::to_string)),
        };

        let record = self
            .repository
            .records
            .update(id, &changes)
            .await?
            .ok_or(AppError::RecordNotFound(id))?;
        tracing::info!(id = record.id, "Visitor record updated");

        let directory = self.locations.directory().await?;
        Ok(resolve_name(record, &directory))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.repository.records.delete(id).await? {
            return Err(AppError::RecordNotFound(id));
        }
        tracing::info!(id, "Visitor record deleted");
        Ok(())
    }

    /// Number of stored records
    pub async fn count(&self) -> AppResult<i64> {
        self.repository.records.count().await
    }

    /// Every matching record as CSV, ignoring pagination
    pub async fn export_csv(&self, filter: &RecordFilter) -> AppResult<String> {
        validate_filter(filter)?;
        let records = self.repository.records.list_all().await?;
        let directory = self.locations.directory().await?;

        let matched: Vec<VisitorRecord> = filter::select(&records, filter, &self.offset)
            .into_iter()
            .cloned()
            .collect();
        let table = export::records_table(&matched, &directory, &self.offset)?;
        tracing::debug!(rows = table.rows.len(), "Exporting visitor records");
        export::to_csv(&table)
    }
}

/// Map a public form submission onto a regular intake request
fn qr_to_record(form: &QrCheckIn) -> AppResult<CreateVisitorRecord> {
    let mut male_count = form.male_count.unwrap_or(0);
    let mut female_count = form.female_count.unwrap_or(0);
    let mut notes = form.notes.clone().unwrap_or_default();

    let (visitor_name, visitor_type) = match form.form_type {
        FormType::Individual => {
            let name = non_empty(form.visitor_name.as_deref())
                .ok_or_else(|| AppError::Validation("visitor_name is required".to_string()))?;
            match form.gender {
                Some(Gender::Male) => (male_count, female_count) = (1, 0),
                Some(Gender::Female) => (male_count, female_count) = (0, 1),
                None => {
                    return Err(AppError::Validation(
                        "gender is required for individual check-in".to_string(),
                    ))
                }
            }
            if let Some(nik) = non_empty(form.identity_number.as_deref()) {
                notes.push_str(&format!(" NIK: {}", nik));
            }
            (name.to_string(), VisitorType::Domestic)
        }
        FormType::Group => {
            if i64::from(male_count) + i64::from(female_count) == 0 {
                return Err(AppError::Validation(
                    "group check-in needs at least one visitor".to_string(),
                ));
            }
            let name = non_empty(form.group_name.as_deref())
                .or_else(|| non_empty(form.visitor_name.as_deref()))
                .unwrap_or("");
            (name.to_string(), VisitorType::Domestic)
        }
        FormType::Foreign => {
            if let Some(passport) = non_empty(form.passport_number.as_deref()) {
                notes.push_str(&format!(" Passport: {}", passport));
            }
            let name = non_empty(form.visitor_name.as_deref()).unwrap_or("");
            (name.to_string(), VisitorType::International)
        }
    };

    Ok(CreateVisitorRecord {
        location_code: form.location_code.clone(),
        visitor_name: Some(visitor_name),
        male_count,
        female_count,
        visitor_type: Some(visitor_type.as_str().to_string()),
        notes: Some(notes.trim().to_string()),
    })
}
