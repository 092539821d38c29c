//! CSV export of engine results.

use crate::types::{EngineResult, Ticker};
use chrono::NaiveDate;

/// Round to 3 decimal places. Adding 0.0 turns -0.0 into 0.0.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0 + 0.0
}

/// Quote a header cell if it contains a separator or a quote.
fn escape(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Render `result` as CSV with one column per entry in `tickers`, in that
/// order. A ticker absent from the result gets an empty column.
///
/// Lines are joined with `\n`, without a trailing newline.
pub fn to_csv(result: &EngineResult, tickers: &[Ticker]) -> String {
    let columns: Vec<Option<&[Option<f64>]>> = tickers
        .iter()
        .map(|t| result.get(t.as_str()).map(|s| s.values()))
        .collect();

    let mut lines = Vec::with_capacity(result.dates().len() + 1);

    let mut header = vec!["Date".to_string()];
    header.extend(tickers.iter().map(|t| escape(t.as_str())));
    lines.push(header.join(","));

    for (i, date) in result.dates().iter().enumerate() {
        let mut row = vec![date.format("%Y-%m-%d").to_string()];
        for column in &columns {
            let cell = column
                .and_then(|values| values.get(i).copied().flatten())
                .map(|v| format!("{:.3}", round3(v)))
                .unwrap_or_default();
            row.push(cell);
        }
        lines.push(row.join(","));
    }

    lines.join("\n")
}

/// CSV with every output series, in result order.
pub fn to_csv_all(result: &EngineResult) -> String {
    let tickers: Vec<Ticker> = result.tickers().cloned().collect();
    to_csv(result, &tickers)
}

/// Download filename for an export produced on `today`.
pub fn csv_filename(today: NaiveDate) -> String {
    format!("chart-data-{}.csv", today.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ZScoreSeries;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn t(s: &str) -> Ticker {
        Ticker::new(s).unwrap()
    }

    fn sample() -> EngineResult {
        EngineResult::new(
            vec![d(2), d(3), d(4)],
            vec![
                (t("AAPL"), ZScoreSeries::new(vec![Some(1.23456), None, Some(-0.5)])),
                (t("MSFT"), ZScoreSeries::new(vec![Some(0.0), Some(2.0), Some(-1.9996)])),
            ],
        )
    }

    #[test]
    fn test_to_csv_layout() {
        let csv = to_csv_all(&sample());
        let expected = "Date,AAPL,MSFT\n\
                        2024-01-02,1.235,0.000\n\
                        2024-01-03,,2.000\n\
                        2024-01-04,-0.500,-2.000";
        assert_eq!(csv, expected);
    }

    #[test]
    fn test_to_csv_no_trailing_newline() {
        assert!(!to_csv_all(&sample()).ends_with('\n'));
    }

    #[test]
    fn test_to_csv_column_selection() {
        let csv = to_csv(&sample(), &[t("MSFT"), t("NOPE")]);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "Date,MSFT,NOPE");
        assert_eq!(lines[1], "2024-01-02,0.000,");
    }

    #[test]
    fn test_to_csv_quotes_header() {
        let result = EngineResult::new(
            vec![d(2)],
            vec![(t("A,B"), ZScoreSeries::new(vec![Some(1.0)]))],
        );
        assert_eq!(to_csv_all(&result), "Date,\"A,B\"\n2024-01-02,1.000");
    }

    #[test]
    fn test_round3_negative_zero() {
        assert_eq!(format!("{:.3}", round3(-0.0001)), "0.000");
    }

    #[test]
    fn test_csv_filename() {
        assert_eq!(csv_filename(d(9)), "chart-data-2024-01-09.csv");
    }
}
