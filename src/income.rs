//! Income report: period resolution, channel filters and per-channel totals.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::booking::{Booking, BookingRecord, PaymentMethod, Platform};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeQuery {
    pub date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// `YYYY-MM`
    pub month: Option<String>,
    pub property_id: Option<i64>,
    pub platform: Option<String>,
}

/// Inclusive day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportPeriod {
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn month(value: &str) -> Result<Self, ApiError> {
        let invalid = || ApiError::bad_request(format!("Invalid month '{value}', expected YYYY-MM"));
        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(invalid)?;
        Ok(Self { start, end })
    }

    /// `month` wins over `from`/`to`, which win over `date`. `None` means
    /// no date restriction.
    pub fn resolve(query: &IncomeQuery) -> Result<Option<Self>, ApiError> {
        if let Some(month) = &query.month {
            return Self::month(month).map(Some);
        }
        match (query.from, query.to) {
            (Some(start), Some(end)) if start > end => {
                Err(ApiError::bad_request("'from' must not be after 'to'"))
            }
            (Some(start), Some(end)) => Ok(Some(Self { start, end })),
            (Some(_), None) | (None, Some(_)) => Err(ApiError::bad_request(
                "'from' and 'to' must be given together",
            )),
            (None, None) => Ok(query.date.map(Self::day)),
        }
    }
}

/// Channel selector. Direct bookings are split by how they were paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformFilter {
    Channel(Platform),
    DirectBank,
    DirectCash,
}

impl PlatformFilter {
    pub fn parse(value: &str) -> Result<Self, ApiError> {
        match value {
            "directBank" => Ok(PlatformFilter::DirectBank),
            "directCash" => Ok(PlatformFilter::DirectCash),
            other => Platform::from_name(other)
                .map(PlatformFilter::Channel)
                .ok_or_else(|| ApiError::bad_request(format!("Unknown platform '{other}'"))),
        }
    }

    pub fn platform(self) -> Platform {
        match self {
            PlatformFilter::Channel(p) => p,
            PlatformFilter::DirectBank | PlatformFilter::DirectCash => Platform::Direct,
        }
    }

    pub fn payment_method(self) -> Option<PaymentMethod> {
        match self {
            PlatformFilter::Channel(_) => None,
            PlatformFilter::DirectBank => Some(PaymentMethod::Bank),
            PlatformFilter::DirectCash => Some(PaymentMethod::Cash),
        }
    }
}

/// Everything the store needs to select income records.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncomeFilter {
    pub period: Option<ReportPeriod>,
    pub property_id: Option<i64>,
    pub platform: Option<PlatformFilter>,
}

impl IncomeFilter {
    pub fn from_query(query: &IncomeQuery) -> Result<Self, ApiError> {
        Ok(Self {
            period: ReportPeriod::resolve(query)?,
            property_id: query.property_id,
            platform: query.platform.as_deref().map(PlatformFilter::parse).transpose()?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeTotals {
    pub booking: f64,
    pub agoda: f64,
    pub airbnb: f64,
    pub expedia: f64,
    pub direct_bank: f64,
    pub direct_cash: f64,
    pub net_total: f64,
}

impl IncomeTotals {
    pub fn add(&mut self, b: &Booking) {
        let amount = b.amount;
        self.net_total += amount;
        match (b.platform, b.payment_method) {
            (Platform::BookingCom, _) => self.booking += amount,
            (Platform::Agoda, _) => self.agoda += amount,
            (Platform::Airbnb, _) => self.airbnb += amount,
            (Platform::Expedia, _) => self.expedia += amount,
            (Platform::Direct, PaymentMethod::Bank) => self.direct_bank += amount,
            (Platform::Direct, PaymentMethod::Cash) => self.direct_cash += amount,
            // only counted in the net total
            (Platform::Direct, PaymentMethod::Online) => {}
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IncomeReport {
    pub totals: IncomeTotals,
    pub records: Vec<BookingRecord>,
}

impl IncomeReport {
    pub fn new(records: Vec<BookingRecord>) -> Self {
        let mut totals = IncomeTotals::default();
        for r in &records {
            totals.add(&r.booking);
        }
        Self { totals, records }
    }
}
