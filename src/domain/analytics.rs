use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};

use super::errors::DomainError;
use super::sale::SaleView;

/// Bucket for sale items whose article has no category (or no longer exists).
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Named reporting windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    #[default]
    Today,
    Yesterday,
    Week,
    Month,
}

impl TimeWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeWindow::Today => "today",
            TimeWindow::Yesterday => "yesterday",
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
        }
    }

    /// Resolves the window to a half-open range of whole local days.
    ///
    /// `Today`, `Week` and `Month` run up to the end of the current local
    /// day; `Yesterday` covers exactly the previous calendar day.
    pub fn resolve<Tz: TimeZone>(self, now: &DateTime<Tz>) -> Result<TimeRange, DomainError> {
        let today = now.date_naive();
        let out_of_range = || DomainError::Internal(format!("date out of range for {self}"));
        let tomorrow = today.succ_opt().ok_or_else(out_of_range)?;

        let (from, to) = match self {
            TimeWindow::Today => (today, tomorrow),
            TimeWindow::Yesterday => (today.pred_opt().ok_or_else(out_of_range)?, today),
            TimeWindow::Week => (
                today.checked_sub_days(Days::new(7)).ok_or_else(out_of_range)?,
                tomorrow,
            ),
            TimeWindow::Month => (
                today.checked_sub_days(Days::new(30)).ok_or_else(out_of_range)?,
                tomorrow,
            ),
        };

        let tz = now.timezone();
        Ok(TimeRange {
            start: start_of_day(&tz, from)?,
            end: start_of_day(&tz, to)?,
        })
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(TimeWindow::Today),
            "yesterday" => Ok(TimeWindow::Yesterday),
            "week" => Ok(TimeWindow::Week),
            "month" => Ok(TimeWindow::Month),
            other => Err(DomainError::InvalidInput(format!(
                "unknown time window '{other}'"
            ))),
        }
    }
}

// Local midnight; if it falls into a DST gap, the first valid instant after it.
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Result<DateTime<Utc>, DomainError> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(midnight + TimeDelta::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| DomainError::Internal(format!("no local midnight on {date}")))
}

/// `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStat {
    pub name: String,
    pub count: usize,
    pub revenue: BigDecimal,
}

impl CategoryStat {
    /// Percentage of `total_revenue` this category accounts for, or `None`
    /// when there is no revenue to compare against.
    pub fn share_of(&self, total_revenue: &BigDecimal) -> Option<BigDecimal> {
        if total_revenue.is_zero() {
            return None;
        }
        Some(&self.revenue * BigDecimal::from(100) / total_revenue)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalesStats {
    pub total_sales: usize,
    pub total_revenue: BigDecimal,
    pub average_transaction: BigDecimal,
    pub category_stats: Vec<CategoryStat>,
}

/// Aggregates sales that are already restricted to the window of interest.
///
/// Category revenue sums `price_at_sale` per item, so a sale spanning
/// several categories contributes to each of them.
pub fn compute_stats(sales: &[SaleView]) -> SalesStats {
    let total_sales = sales.len();
    let total_revenue = sales
        .iter()
        .fold(BigDecimal::zero(), |sum, sale| sum + &sale.total);
    let average_transaction = if total_sales == 0 {
        BigDecimal::zero()
    } else {
        (&total_revenue / &BigDecimal::from(total_sales as u64)).round(2)
    };

    let mut by_category: BTreeMap<String, (usize, BigDecimal)> = BTreeMap::new();
    for item in sales.iter().flat_map(|sale| &sale.items) {
        let name = item
            .category_name
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        let entry = by_category
            .entry(name)
            .or_insert_with(|| (0, BigDecimal::zero()));
        entry.0 += 1;
        entry.1 += &item.price_at_sale;
    }

    let mut category_stats: Vec<CategoryStat> = by_category
        .into_iter()
        .map(|(name, (count, revenue))| CategoryStat {
            name,
            count,
            revenue,
        })
        .collect();
    category_stats.sort_by(|a, b| b.revenue.cmp(&a.revenue));

    SalesStats {
        total_sales,
        total_revenue,
        average_transaction,
        category_stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sale::SaleItemView;
    use chrono::{FixedOffset, NaiveDateTime};
    use uuid::Uuid;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn item(sale_id: Uuid, category: Option<&str>, price: &str) -> SaleItemView {
        SaleItemView {
            id: Uuid::new_v4(),
            sale_id,
            article_id: Some(Uuid::new_v4()),
            article_name: Some("Article".to_string()),
            category_name: category.map(str::to_string),
            quantity: 1,
            price_at_sale: dec(price),
        }
    }

    fn sale(items: &[(Option<&str>, &str)]) -> SaleView {
        let id = Uuid::new_v4();
        let items: Vec<SaleItemView> = items
            .iter()
            .map(|(category, price)| item(id, *category, price))
            .collect();
        let total = items
            .iter()
            .fold(BigDecimal::zero(), |sum, i| sum + &i.price_at_sale);
        SaleView {
            id,
            total: total.clone(),
            payment_received: total,
            change_given: BigDecimal::zero(),
            payment_method: "cash".to_string(),
            created_at: Utc::now(),
            items,
        }
    }

    fn local(offset_hours: i32, s: &str) -> DateTime<FixedOffset> {
        let tz = FixedOffset::east_opt(offset_hours * 3600).unwrap();
        let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
        tz.from_local_datetime(&naive).unwrap()
    }

    fn utc(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    #[test]
    fn empty_sales_give_zeroed_stats() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total_sales, 0);
        assert_eq!(stats.total_revenue, BigDecimal::zero());
        assert_eq!(stats.average_transaction, BigDecimal::zero());
        assert!(stats.category_stats.is_empty());
    }

    #[test]
    fn categories_sort_by_revenue_descending() {
        let sales = vec![
            sale(&[(Some("Mode"), "10.00"), (Some("Deko"), "20.00")]),
            sale(&[(Some("Deko"), "10.00")]),
        ];
        let stats = compute_stats(&sales);

        assert_eq!(stats.total_sales, 2);
        assert_eq!(stats.total_revenue, dec("40.00"));
        assert_eq!(stats.average_transaction, dec("20.00"));

        let names: Vec<&str> = stats.category_stats.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Deko", "Mode"]);
        let deko = &stats.category_stats[0];
        assert_eq!(deko.count, 2);
        assert_eq!(deko.revenue, dec("30.00"));
        assert_eq!(deko.share_of(&stats.total_revenue), Some(dec("75")));
    }

    #[test]
    fn items_without_category_land_in_uncategorized() {
        let stats = compute_stats(&[sale(&[(None, "4.00"), (Some("Mode"), "1.00")])]);
        assert_eq!(stats.category_stats[0].name, UNCATEGORIZED);
        assert_eq!(stats.category_stats[0].revenue, dec("4.00"));
    }

    #[test]
    fn share_of_zero_revenue_is_undefined() {
        let stat = CategoryStat {
            name: "Mode".to_string(),
            count: 1,
            revenue: BigDecimal::zero(),
        };
        assert_eq!(stat.share_of(&BigDecimal::zero()), None);
    }

    #[test]
    fn average_is_rounded_to_cents() {
        let sales = vec![
            sale(&[(None, "1.00")]),
            sale(&[(None, "1.00")]),
            sale(&[(None, "0.00")]),
        ];
        assert_eq!(compute_stats(&sales).average_transaction, dec("0.67"));
    }

    #[test]
    fn today_spans_the_local_calendar_day() {
        let now = local(2, "2024-06-15 14:30:00");
        let range = TimeWindow::Today.resolve(&now).unwrap();
        assert_eq!(range.start, utc("2024-06-14 22:00:00"));
        assert_eq!(range.end, utc("2024-06-15 22:00:00"));
    }

    #[test]
    fn yesterday_is_the_previous_full_day() {
        let now = local(0, "2024-06-15 00:10:00");
        let range = TimeWindow::Yesterday.resolve(&now).unwrap();
        assert_eq!(range.start, utc("2024-06-14 00:00:00"));
        assert_eq!(range.end, utc("2024-06-15 00:00:00"));
        assert!(range.contains(utc("2024-06-14 23:59:59")));
        assert!(!range.contains(utc("2024-06-15 00:00:00")));
    }

    #[test]
    fn week_and_month_trail_from_local_midnight() {
        let now = local(0, "2024-03-31 09:00:00");
        let week = TimeWindow::Week.resolve(&now).unwrap();
        assert_eq!(week.start, utc("2024-03-24 00:00:00"));
        let month = TimeWindow::Month.resolve(&now).unwrap();
        assert_eq!(month.start, utc("2024-03-01 00:00:00"));
        assert_eq!(month.end, utc("2024-04-01 00:00:00"));
    }

    #[test]
    fn window_parses_from_query_value() {
        assert_eq!("week".parse::<TimeWindow>().unwrap(), TimeWindow::Week);
        assert!("decade".parse::<TimeWindow>().is_err());
    }
}
