use std::fmt::Display;

use chrono::{TimeDelta, TimeZone};

use super::analytics::TimeRange;
use super::errors::DomainError;
use super::payment::format_amount;
use super::sale::SaleView;

const HEADERS: [&str; 5] = ["Date", "Time", "Article (Category)", "Amount", "Change"];
const BOM: &str = "\u{feff}";

/// Renders sales as a semicolon-separated UTF-8 report with a byte-order
/// mark, one row per sale, timestamps shown in `tz`.
pub fn render_sales_csv<Tz>(sales: &[SaleView], tz: &Tz) -> Result<Vec<u8>, DomainError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(BOM.as_bytes().to_vec());

    writer.write_record(HEADERS).map_err(csv_error)?;
    for sale in sales {
        let at = sale.created_at.with_timezone(tz);
        let articles = sale
            .items
            .iter()
            .map(|item| item.label())
            .collect::<Vec<_>>()
            .join(", ");
        writer
            .write_record([
                at.format("%d.%m.%Y").to_string(),
                at.format("%H:%M").to_string(),
                articles,
                format!("{} €", format_amount(&sale.total)),
                format!("{} €", format_amount(&sale.change_given)),
            ])
            .map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| DomainError::Internal(format!("failed to flush report: {e}")))
}

/// `sales_<first day>_<last day>.csv`, both days inclusive.
pub fn report_file_name<Tz>(range: &TimeRange, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let first = range.start.with_timezone(tz).format("%Y-%m-%d");
    let last = (range.end - TimeDelta::seconds(1))
        .with_timezone(tz)
        .format("%Y-%m-%d");
    format!("sales_{first}_{last}.csv")
}

fn csv_error(e: csv::Error) -> DomainError {
    DomainError::Internal(format!("failed to write report: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sale::SaleItemView;
    use bigdecimal::BigDecimal;
    use chrono::{NaiveDateTime, Utc};
    use std::str::FromStr;
    use uuid::Uuid;

    fn at(s: &str) -> chrono::DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    fn item(name: &str, category: Option<&str>) -> SaleItemView {
        SaleItemView {
            id: Uuid::new_v4(),
            sale_id: Uuid::nil(),
            article_id: Some(Uuid::new_v4()),
            article_name: Some(name.to_string()),
            category_name: category.map(str::to_string),
            quantity: 1,
            price_at_sale: BigDecimal::from(5),
        }
    }

    #[test]
    fn report_has_bom_header_and_one_row_per_sale() {
        let sale = SaleView {
            id: Uuid::new_v4(),
            total: BigDecimal::from_str("18.5").unwrap(),
            payment_received: BigDecimal::from(20),
            change_given: BigDecimal::from_str("1.5").unwrap(),
            payment_method: "cash".to_string(),
            created_at: at("2024-06-15 09:05:00"),
            items: vec![item("Scarf", Some("Mode")), item("Candle", None)],
        };

        let bytes = render_sales_csv(&[sale], &Utc).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with('\u{feff}'));
        let lines: Vec<&str> = text.trim_start_matches('\u{feff}').lines().collect();
        assert_eq!(lines[0], "Date;Time;Article (Category);Amount;Change");
        assert_eq!(lines[1], "15.06.2024;09:05;Scarf (Mode), Candle;18.50 €;1.50 €");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn file_name_uses_inclusive_days() {
        let range = TimeRange {
            start: at("2024-06-08 00:00:00"),
            end: at("2024-06-16 00:00:00"),
        };
        assert_eq!(
            report_file_name(&range, &Utc),
            "sales_2024-06-08_2024-06-15.csv"
        );
    }
}
