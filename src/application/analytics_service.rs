use std::fmt::Display;

use chrono::{DateTime, TimeZone};

use crate::domain::analytics::{compute_stats, SalesStats, TimeRange, TimeWindow};
use crate::domain::errors::DomainError;
use crate::domain::ports::SaleRepository;
use crate::domain::report::{render_sales_csv, report_file_name};
use crate::domain::sale::SaleView;

#[derive(Debug, Clone)]
pub struct SalesReport {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Read side of the sales history, scoped to a reporting window.
pub struct AnalyticsService<R> {
    repo: R,
}

impl<R: SaleRepository> AnalyticsService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Sales in `window` as seen from `now`, newest first.
    pub fn sales<Tz: TimeZone>(
        &self,
        window: TimeWindow,
        now: &DateTime<Tz>,
    ) -> Result<(TimeRange, Vec<SaleView>), DomainError> {
        let range = window.resolve(now)?;
        let sales = self.repo.find_in_range(&range)?;
        log::debug!("{} sale(s) in window {window}", sales.len());
        Ok((range, sales))
    }

    pub fn stats<Tz: TimeZone>(
        &self,
        window: TimeWindow,
        now: &DateTime<Tz>,
    ) -> Result<SalesStats, DomainError> {
        let (_, sales) = self.sales(window, now)?;
        Ok(compute_stats(&sales))
    }

    pub fn export<Tz>(&self, window: TimeWindow, now: &DateTime<Tz>) -> Result<SalesReport, DomainError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let (range, sales) = self.sales(window, now)?;
        let tz = now.timezone();
        Ok(SalesReport {
            file_name: report_file_name(&range, &tz),
            content: render_sales_csv(&sales, &tz)?,
        })
    }
}
