//! Record filtering, ordering and pagination

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::VisitorRecord;

/// Page size used when the caller gives none
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Upper bound on a single page
pub const MAX_PAGE_SIZE: usize = 500;

/// Conjunctive record filter; absent fields impose no constraint
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, IntoParams, ToSchema)]
pub struct RecordFilter {
    /// Location code
    pub location_code: Option<String>,
    /// First local date included (YYYY-MM-DD)
    pub date_from: Option<NaiveDate>,
    /// Last local date included (YYYY-MM-DD)
    pub date_to: Option<NaiveDate>,
    /// `domestic`, `international`, or `all`
    pub visitor_type: Option<String>,
    /// 1-based page number
    pub page: Option<usize>,
    /// Records per page (default 10)
    pub page_size: Option<usize>,
}

impl RecordFilter {
    fn location_constraint(&self) -> Option<&str> {
        self.location_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Visitor type constraint, if any (`all` and empty mean none)
    pub fn type_constraint(&self) -> Option<&str> {
        self.visitor_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != "all")
    }

    /// Whether a record satisfies every supplied predicate
    pub fn matches(&self, record: &VisitorRecord, offset: &FixedOffset) -> bool {
        if let Some(code) = self.location_constraint() {
            if !record.location_code.eq_ignore_ascii_case(code) {
                return false;
            }
        }

        if self.date_from.is_some() || self.date_to.is_some() {
            let day = local_date(&record.check_in_time, offset);
            if self.date_from.map_or(false, |from| day < from) {
                return false;
            }
            if self.date_to.map_or(false, |to| day > to) {
                return false;
            }
        }

        if let Some(vt) = self.type_constraint() {
            if record.visitor_type != vt {
                return false;
            }
        }

        true
    }

    pub fn page(&self) -> usize {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    /// Matching records before pagination
    pub total: usize,
    pub pages: usize,
}

/// One page of filtered records
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecordPage {
    pub records: Vec<VisitorRecord>,
    pub pagination: Pagination,
}

/// Calendar date of a timestamp in the reporting timezone
pub fn local_date(ts: &DateTime<Utc>, offset: &FixedOffset) -> NaiveDate {
    ts.with_timezone(offset).date_naive()
}

/// All matching records, newest first (ties broken by id, highest first)
pub fn select<'a>(
    records: &'a [VisitorRecord],
    filter: &RecordFilter,
    offset: &FixedOffset,
) -> Vec<&'a VisitorRecord> {
    let mut matched: Vec<&VisitorRecord> = records
        .iter()
        .filter(|r| filter.matches(r, offset))
        .collect();
    matched.sort_by(|a, b| {
        b.check_in_time
            .cmp(&a.check_in_time)
            .then_with(|| b.id.cmp(&a.id))
    });
    matched
}

/// Filter, order and paginate a record snapshot
pub fn apply(records: &[VisitorRecord], filter: &RecordFilter, offset: &FixedOffset) -> RecordPage {
    let matched = select(records, filter, offset);
    let total = matched.len();
    let page = filter.page();
    let page_size = filter.page_size();

    let start = (page - 1).saturating_mul(page_size);
    let records = matched
        .into_iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();

    RecordPage {
        records,
        pagination: Pagination {
            page,
            page_size,
            total,
            pages: total.div_ceil(page_size),
        },
    }
}
