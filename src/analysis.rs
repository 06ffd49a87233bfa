//! Statistical analysis of historical daily weather records
//!
//! Aggregation is plain arithmetic over the typed records; the temperature
//! trend uses the closed-form ordinary-least-squares formula. No statistics
//! crate is involved.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::models::{
    DailyHistoricalRecord, ExtremesSummary, MonthlyClimatology, TrendLabel, TrendResult,
    YearlySummary,
};

/// Slope magnitude below which the trend counts as stable, in Celsius/year
const TREND_THRESHOLD: f64 = 0.005;

fn round_dp(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Aggregate daily records by calendar year.
///
/// Temperature fields are arithmetic means (2 decimals), precipitation and
/// snowfall are sums (1 decimal), snow depth is the yearly maximum
/// (1 decimal). `snow_days` counts days with any snowfall at all while
/// `rain_days` counts only days strictly above 1.0 mm; the asymmetry is
/// part of the contract. Output is sorted ascending by year; empty input
/// yields empty output.
#[must_use]
pub fn yearly_summary(records: &[DailyHistoricalRecord]) -> Vec<YearlySummary> {
    let mut by_year: BTreeMap<i32, Vec<&DailyHistoricalRecord>> = BTreeMap::new();
    for record in records {
        by_year.entry(record.date.year()).or_default().push(record);
    }

    let mut summaries = Vec::with_capacity(by_year.len());
    for (year, days) in by_year {
        let n = days.len() as f64;
        let mut hottest = days[0];
        let mut coldest = days[0];
        for day in &days[1..] {
            if day.temp_max > hottest.temp_max {
                hottest = day;
            }
            if day.temp_min < coldest.temp_min {
                coldest = day;
            }
        }

        summaries.push(YearlySummary {
            year,
            avg_temp_max: round_dp(days.iter().map(|d| d.temp_max).sum::<f64>() / n, 2),
            avg_temp_min: round_dp(days.iter().map(|d| d.temp_min).sum::<f64>() / n, 2),
            avg_temp_mean: round_dp(days.iter().map(|d| d.temp_mean).sum::<f64>() / n, 2),
            total_precipitation: round_dp(days.iter().map(|d| d.precipitation).sum(), 1),
            total_snowfall: round_dp(days.iter().map(|d| d.snowfall).sum(), 1),
            max_snow_depth: round_dp(
                days.iter().map(|d| d.snow_depth_max).fold(f64::MIN, f64::max),
                1,
            ),
            snow_days: days.iter().filter(|d| d.snowfall > 0.0).count() as u32,
            rain_days: days.iter().filter(|d| d.precipitation > 1.0).count() as u32,
            max_temp: hottest.temp_max,
            min_temp: coldest.temp_min,
            hottest_date: hottest.date,
            coldest_date: coldest.date,
        });
    }
    summaries
}

/// Average conditions per calendar month across all years.
///
/// Always returns exactly 12 entries; months with no matching records get
/// all-zero numeric fields rather than being omitted.
#[must_use]
pub fn monthly_climatology(records: &[DailyHistoricalRecord]) -> Vec<MonthlyClimatology> {
    let mut by_month: BTreeMap<u32, Vec<&DailyHistoricalRecord>> = BTreeMap::new();
    for record in records {
        by_month.entry(record.date.month()).or_default().push(record);
    }

    (1..=12)
        .map(|month| match by_month.get(&month) {
            Some(days) if !days.is_empty() => {
                let n = days.len() as f64;
                MonthlyClimatology {
                    month,
                    avg_temp_mean: round_dp(days.iter().map(|d| d.temp_mean).sum::<f64>() / n, 2),
                    avg_precipitation: round_dp(
                        days.iter().map(|d| d.precipitation).sum::<f64>() / n,
                        2,
                    ),
                    avg_snowfall: round_dp(days.iter().map(|d| d.snowfall).sum::<f64>() / n, 2),
                }
            }
            _ => MonthlyClimatology {
                month,
                avg_temp_mean: 0.0,
                avg_precipitation: 0.0,
                avg_snowfall: 0.0,
            },
        })
        .collect()
}

/// Linear regression of yearly mean temperature over years.
///
/// Closed form: slope = (n*sum(xy) - sum(x)*sum(y)) / (n*sum(x^2) - sum(x)^2).
/// Fewer than 2 years, or a degenerate denominator, yields the flat result.
/// The warming/cooling classification compares the raw slope (not the
/// rounded one) against +-0.005 degrees C/year.
#[must_use]
pub fn temperature_trend(yearly: &[YearlySummary]) -> TrendResult {
    if yearly.len() < 2 {
        return TrendResult::stable();
    }

    let n = yearly.len() as f64;
    let xs: Vec<f64> = yearly.iter().map(|y| f64::from(y.year)).collect();
    let ys: Vec<f64> = yearly.iter().map(|y| y.avg_temp_mean).collect();

    let sum_x: f64 = xs.iter().sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_xy: f64 = xs.iter().zip(&ys).map(|(x, y)| x * y).sum();
    let sum_x2: f64 = xs.iter().map(|x| x * x).sum();

    let denom = n * sum_x2 - sum_x * sum_x;
    if denom == 0.0 {
        return TrendResult::stable();
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;

    let y_mean = sum_y / n;
    let ss_tot: f64 = ys.iter().map(|y| (y - y_mean).powi(2)).sum();
    let ss_res: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
        .sum();
    let r_squared = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    };

    let label = if slope > TREND_THRESHOLD {
        TrendLabel::Warming
    } else if slope < -TREND_THRESHOLD {
        TrendLabel::Cooling
    } else {
        TrendLabel::Stable
    };

    TrendResult {
        slope: round_dp(slope, 4),
        slope_per_decade: round_dp(slope * 10.0, 2),
        r_squared: round_dp(r_squared, 4),
        label,
    }
}

/// Identify the extreme years from a yearly summary list.
///
/// Each metric gets an independent scan; ties resolve to the first maximal
/// or minimal year over the year-ascending input. Empty input yields `None`.
#[must_use]
pub fn find_extremes(yearly: &[YearlySummary]) -> Option<ExtremesSummary> {
    let first = yearly.first()?;

    let mut hottest = first;
    let mut coldest = first;
    let mut wettest = first;
    let mut driest = first;
    let mut snowiest = first;
    let mut least_snow = first;
    let mut most_days = first;
    for year in &yearly[1..] {
        if year.max_temp > hottest.max_temp {
            hottest = year;
        }
        if year.min_temp < coldest.min_temp {
            coldest = year;
        }
        if year.total_precipitation > wettest.total_precipitation {
            wettest = year;
        }
        if year.total_precipitation < driest.total_precipitation {
            driest = year;
        }
        if year.total_snowfall > snowiest.total_snowfall {
            snowiest = year;
        }
        if year.total_snowfall < least_snow.total_snowfall {
            least_snow = year;
        }
        if year.snow_days > most_days.snow_days {
            most_days = year;
        }
    }

    Some(ExtremesSummary {
        hottest_year: hottest.year,
        hottest_year_max_temp: hottest.max_temp,
        hottest_date: hottest.hottest_date,
        coldest_year: coldest.year,
        coldest_year_min_temp: coldest.min_temp,
        coldest_date: coldest.coldest_date,
        wettest_year: wettest.year,
        wettest_year_precip: wettest.total_precipitation,
        driest_year: driest.year,
        driest_year_precip: driest.total_precipitation,
        snowiest_year: snowiest.year,
        snowiest_year_snowfall: snowiest.total_snowfall,
        snowiest_year_snow_days: snowiest.snow_days,
        least_snow_year: least_snow.year,
        least_snow_year_snowfall: least_snow.total_snowfall,
        least_snow_year_snow_days: least_snow.snow_days,
        most_snow_days_year: most_days.year,
        most_snow_days_count: most_days.snow_days,
    })
}

/// Format a multi-line terminal summary of the historical analysis.
#[must_use]
pub fn terminal_summary(
    location_name: &str,
    yearly: &[YearlySummary],
    extremes: Option<&ExtremesSummary>,
    trend: &TrendResult,
) -> String {
    let (Some(first), Some(last), Some(ext)) = (yearly.first(), yearly.last(), extremes) else {
        return format!("\u{1f4cd} {location_name} \u{2014} No historical data available.");
    };

    let n_years = yearly.len();
    let overall_mean = round_dp(
        yearly.iter().map(|y| y.avg_temp_mean).sum::<f64>() / n_years as f64,
        1,
    );
    let overall_max = yearly.iter().map(|y| y.max_temp).fold(f64::MIN, f64::max);
    let overall_min = yearly.iter().map(|y| y.min_temp).fold(f64::MAX, f64::min);

    let sign = if trend.slope_per_decade >= 0.0 { "+" } else { "" };
    let per_decade = format!(
        "{sign}{}\u{b0}C per decade ({})",
        trend.slope_per_decade, trend.label
    );
    let sep = "\u{2500}".repeat(62);

    let fmt_date = |d: chrono::NaiveDate| format!("{} {}", d.day(), d.format("%b %Y"));

    let lines = [
        format!(
            "\u{1f4cd} {location_name} \u{2014} {n_years}-year Historical Analysis ({}\u{2013}{})",
            first.year, last.year
        ),
        sep.clone(),
        format!("\u{1f321}  Temperature trend:   {per_decade}"),
        format!(
            "\u{1f4ca}  Average annual temp: {overall_mean}\u{b0}C  (range: {overall_min}\u{b0}C to {overall_max}\u{b0}C)"
        ),
        String::new(),
        format!(
            "\u{1f327}  Wettest year:        {} ({} mm)",
            ext.wettest_year, ext.wettest_year_precip
        ),
        format!(
            "\u{2600}\u{fe0f}  Driest year:         {} ({} mm)",
            ext.driest_year, ext.driest_year_precip
        ),
        String::new(),
        format!(
            "\u{2744}\u{fe0f}  Snowiest year:       {} ({} cm total, {} snow days)",
            ext.snowiest_year, ext.snowiest_year_snowfall, ext.snowiest_year_snow_days
        ),
        format!(
            "\u{1f331}  Least snow:          {} ({} cm total, {} snow days)",
            ext.least_snow_year, ext.least_snow_year_snowfall, ext.least_snow_year_snow_days
        ),
        String::new(),
        format!(
            "\u{1f525}  Hottest recorded:    {}\u{b0}C on {}",
            ext.hottest_year_max_temp,
            fmt_date(ext.hottest_date)
        ),
        format!(
            "\u{1f976}  Coldest recorded:    {}\u{b0}C on {}",
            ext.coldest_year_min_temp,
            fmt_date(ext.coldest_date)
        ),
        sep,
    ];
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(
        year: i32,
        month: u32,
        dom: u32,
        temp_max: f64,
        temp_min: f64,
        temp_mean: f64,
        precipitation: f64,
        snowfall: f64,
        snow_depth_max: f64,
        wind_max: f64,
    ) -> DailyHistoricalRecord {
        DailyHistoricalRecord {
            date: NaiveDate::from_ymd_opt(year, month, dom).expect("valid date"),
            temp_max,
            temp_min,
            temp_mean,
            precipitation,
            snowfall,
            snow_depth_max,
            wind_max,
        }
    }

    fn sample_records() -> Vec<DailyHistoricalRecord> {
        vec![
            day(2020, 1, 15, 20.0, -5.0, 7.5, 5.0, 2.0, 10.0, 30.0),
            day(2020, 7, 15, 25.0, 0.0, 12.5, 2.0, 0.0, 5.0, 20.0),
            day(2021, 1, 15, 15.0, -15.0, 0.0, 0.5, 5.0, 20.0, 40.0),
            day(2021, 7, 15, 18.0, -2.0, 8.0, 0.3, 0.0, 0.0, 15.0),
            day(2022, 8, 15, 35.0, 5.0, 20.0, 10.0, 0.0, 0.0, 25.0),
            day(2022, 12, 15, 10.0, -3.0, 3.5, 8.0, 1.0, 3.0, 20.0),
        ]
    }

    fn yearly_with_means(pairs: &[(i32, f64)]) -> Vec<YearlySummary> {
        pairs
            .iter()
            .map(|&(year, mean)| YearlySummary {
                year,
                avg_temp_max: 0.0,
                avg_temp_min: 0.0,
                avg_temp_mean: mean,
                total_precipitation: 0.0,
                total_snowfall: 0.0,
                max_snow_depth: 0.0,
                snow_days: 0,
                rain_days: 0,
                max_temp: 0.0,
                min_temp: 0.0,
                hottest_date: NaiveDate::from_ymd_opt(year, 7, 1).expect("valid date"),
                coldest_date: NaiveDate::from_ymd_opt(year, 1, 1).expect("valid date"),
            })
            .collect()
    }

    #[test]
    fn test_yearly_groups_into_three_sorted_years() {
        let summaries = yearly_summary(&sample_records());
        let years: Vec<i32> = summaries.iter().map(|s| s.year).collect();
        assert_eq!(years, vec![2020, 2021, 2022]);
    }

    #[test]
    fn test_yearly_averages_and_extremes() {
        let summaries = yearly_summary(&sample_records());
        let y2020 = &summaries[0];
        let y2021 = &summaries[1];
        let y2022 = &summaries[2];

        assert_eq!(y2020.avg_temp_max, 22.5);
        assert_eq!(y2020.avg_temp_mean, 10.0);
        assert_eq!(y2021.max_snow_depth, 20.0);
        assert_eq!(y2022.max_temp, 35.0);
        assert_eq!(y2021.min_temp, -15.0);
        assert_eq!(
            y2022.hottest_date,
            NaiveDate::from_ymd_opt(2022, 8, 15).expect("valid date")
        );
        assert_eq!(
            y2021.coldest_date,
            NaiveDate::from_ymd_opt(2021, 1, 15).expect("valid date")
        );
    }

    #[test]
    fn test_yearly_snow_and_rain_day_counts() {
        let summaries = yearly_summary(&sample_records());
        let y2020 = &summaries[0];
        assert_eq!(y2020.snow_days, 1);
        assert_eq!(y2020.rain_days, 2);
    }

    #[test]
    fn test_rain_days_threshold_is_strict() {
        // 2021 has 0.5mm and 0.3mm: sums to 0.8mm but no day exceeds 1.0
        let summaries = yearly_summary(&sample_records());
        let y2021 = &summaries[1];
        assert_eq!(y2021.rain_days, 0);
        assert_eq!(y2021.total_precipitation, 0.8);
    }

    #[test]
    fn test_day_with_exactly_one_mm_is_not_a_rain_day() {
        let records = vec![day(2020, 3, 1, 10.0, 0.0, 5.0, 1.0, 0.0, 0.0, 10.0)];
        let summaries = yearly_summary(&records);
        assert_eq!(summaries[0].rain_days, 0);
    }

    #[test]
    fn test_yearly_empty_input_is_empty() {
        assert!(yearly_summary(&[]).is_empty());
    }

    #[test]
    fn test_climatology_always_has_twelve_months() {
        let climatology = monthly_climatology(&sample_records());
        assert_eq!(climatology.len(), 12);
        let months: Vec<u32> = climatology.iter().map(|c| c.month).collect();
        assert_eq!(months, (1..=12).collect::<Vec<u32>>());
    }

    #[test]
    fn test_climatology_empty_input_is_twelve_zero_months() {
        let climatology = monthly_climatology(&[]);
        assert_eq!(climatology.len(), 12);
        for month in &climatology {
            assert_eq!(month.avg_temp_mean, 0.0);
            assert_eq!(month.avg_precipitation, 0.0);
            assert_eq!(month.avg_snowfall, 0.0);
        }
    }

    #[test]
    fn test_climatology_averages_across_years() {
        // January appears in 2020 (mean 7.5) and 2021 (mean 0.0)
        let climatology = monthly_climatology(&sample_records());
        assert_eq!(climatology[0].avg_temp_mean, 3.75);
        assert_eq!(climatology[0].avg_snowfall, 3.5);
        // August has a single record
        assert_eq!(climatology[7].avg_precipitation, 10.0);
        // months with no records stay zero
        assert_eq!(climatology[3].avg_temp_mean, 0.0);
    }

    #[test]
    fn test_trend_steadily_increasing_is_warming() {
        let data = yearly_with_means(&[(2000, 10.0), (2001, 11.0), (2002, 12.0), (2003, 13.0)]);
        let trend = temperature_trend(&data);
        assert_eq!(trend.label, TrendLabel::Warming);
        assert!(trend.slope > 0.0);
    }

    #[test]
    fn test_trend_steadily_decreasing_is_cooling() {
        let data = yearly_with_means(&[(2000, 13.0), (2001, 12.0), (2002, 11.0), (2003, 10.0)]);
        let trend = temperature_trend(&data);
        assert_eq!(trend.label, TrendLabel::Cooling);
        assert!(trend.slope < 0.0);
    }

    #[test]
    fn test_trend_flat_data_is_stable() {
        let data = yearly_with_means(&[(2000, 5.0), (2001, 5.0), (2002, 5.0), (2003, 5.0)]);
        assert_eq!(temperature_trend(&data).label, TrendLabel::Stable);
    }

    #[test]
    fn test_trend_slope_per_decade_is_slope_times_ten() {
        let data = yearly_with_means(&[(2000, 10.0), (2001, 11.0), (2002, 12.0), (2003, 13.0)]);
        let trend = temperature_trend(&data);
        assert!((trend.slope_per_decade - trend.slope * 10.0).abs() < 0.01);
    }

    #[test]
    fn test_trend_perfect_linear_data_r_squared_near_one() {
        let pairs: Vec<(i32, f64)> = (0..10).map(|i| (2000 + i, 10.0 + f64::from(i) * 0.5)).collect();
        let trend = temperature_trend(&yearly_with_means(&pairs));
        assert!((trend.r_squared - 1.0).abs() < 0.001);
        assert_eq!(trend.slope, 0.5);
    }

    #[test]
    fn test_trend_fitted_line_predicts_known_points() {
        // y = 0.5x + c: the fit must reproduce the generator exactly
        let pairs: Vec<(i32, f64)> = (0..10).map(|i| (2000 + i, 10.0 + f64::from(i) * 0.5)).collect();
        let trend = temperature_trend(&yearly_with_means(&pairs));
        assert_eq!(trend.slope_per_decade, 5.0);
        assert_eq!(trend.label, TrendLabel::Warming);
    }

    #[test]
    fn test_trend_single_year_is_stable() {
        let data = yearly_with_means(&[(2020, 8.0)]);
        let trend = temperature_trend(&data);
        assert_eq!(trend, TrendResult::stable());
    }

    #[test]
    fn test_trend_empty_input_is_stable() {
        assert_eq!(temperature_trend(&[]), TrendResult::stable());
    }

    #[test]
    fn test_extremes_over_sample_records() {
        let yearly = yearly_summary(&sample_records());
        let extremes = find_extremes(&yearly).expect("non-empty input");

        assert_eq!(extremes.hottest_year, 2022);
        assert_eq!(extremes.hottest_year_max_temp, 35.0);
        assert_eq!(extremes.coldest_year, 2021);
        assert_eq!(extremes.coldest_year_min_temp, -15.0);
        assert_eq!(extremes.wettest_year, 2022);
        assert_eq!(extremes.wettest_year_precip, 18.0);
        assert_eq!(extremes.driest_year, 2021);
        assert_eq!(extremes.driest_year_precip, 0.8);
        assert_eq!(extremes.snowiest_year, 2021);
        assert_eq!(extremes.most_snow_days_year, 2020);
    }

    #[test]
    fn test_extremes_empty_input_is_none() {
        assert_eq!(find_extremes(&[]), None);
    }

    #[test]
    fn test_extremes_ties_resolve_to_first_year() {
        let mut a = yearly_with_means(&[(2000, 10.0), (2001, 10.0)]);
        a[0].max_temp = 30.0;
        a[1].max_temp = 30.0;
        let extremes = find_extremes(&a).expect("non-empty input");
        assert_eq!(extremes.hottest_year, 2000);
    }

    #[test]
    fn test_terminal_summary_contains_location_and_range() {
        let yearly = yearly_summary(&sample_records());
        let extremes = find_extremes(&yearly);
        let trend = temperature_trend(&yearly);
        let summary = terminal_summary("Soldeu, Andorra", &yearly, extremes.as_ref(), &trend);

        assert!(summary.contains("Soldeu, Andorra"));
        assert!(summary.contains("2020"));
        assert!(summary.contains("2022"));
        assert!(summary.contains("per decade"));
    }

    #[test]
    fn test_terminal_summary_empty_input_reports_no_data() {
        let summary = terminal_summary("Nowhere", &[], None, &TrendResult::stable());
        assert!(summary.contains("No historical data available"));
    }
}
