//! Trend assembly: historical and forecast segments for one country.
//!
//! The assembler is a pure function of its inputs. It never fails: an empty
//! or inverted window produces one empty segment per mode.

use std::ops::Range;

use chrono::NaiveDate;

use crate::domain::{
    DateBounds, LineStyle, SeriesTable, TrendCase, TrendChart, TrendPoint, TrendSegment,
};
use crate::trend::palette::mode_color;

/// Pick which tables serve a request.
///
/// Order matters: a date present in both ranges counts as historical.
pub fn select_case(
    historical: &SeriesTable,
    forecast: &SeriesTable,
    include_forecast: bool,
    start: NaiveDate,
    end: NaiveDate,
) -> TrendCase {
    if !include_forecast || historical.contains_date(end) {
        TrendCase::Historical
    } else if forecast.contains_date(start) {
        TrendCase::ForecastOnly
    } else {
        TrendCase::Spanning
    }
}

/// Assemble the chart series for `country` over `[start, end]`.
///
/// `country` is expected to be resolved already; an unknown country yields no
/// segments.
pub fn assemble(
    country: &str,
    historical: &SeriesTable,
    forecast: &SeriesTable,
    include_forecast: bool,
    start: NaiveDate,
    end: NaiveDate,
) -> TrendChart {
    let case = select_case(historical, forecast, include_forecast, start, end);
    let hist_window = historical.window(start, end);
    let fc_window = forecast.window(start, end);

    let mut segments = Vec::new();
    for (idx, mode) in mode_order(country, historical, forecast).into_iter().enumerate() {
        let color = mode_color(idx);
        match case {
            TrendCase::Historical => {
                if historical.series(country, mode).is_some() {
                    segments.push(TrendSegment {
                        mode: mode.to_string(),
                        style: LineStyle::Solid,
                        color,
                        show_legend: true,
                        points: clip(historical, country, mode, hist_window.clone()),
                    });
                }
            }
            TrendCase::ForecastOnly => {
                segments.push(TrendSegment {
                    mode: mode.to_string(),
                    style: LineStyle::Dashed,
                    color,
                    show_legend: true,
                    points: clip(forecast, country, mode, fc_window.clone()),
                });
            }
            TrendCase::Spanning => {
                segments.push(TrendSegment {
                    mode: mode.to_string(),
                    style: LineStyle::Solid,
                    color,
                    show_legend: true,
                    points: clip(historical, country, mode, hist_window.clone()),
                });
                segments.push(TrendSegment {
                    mode: mode.to_string(),
                    style: LineStyle::Dashed,
                    color,
                    show_legend: false,
                    points: clip(forecast, country, mode, fc_window.clone()),
                });
            }
        }
    }

    TrendChart {
        country: country.to_string(),
        case,
        start,
        end,
        segments,
    }
}

/// Selectable dates: from the first observed date to the last observed or
/// forecast date.
pub fn date_bounds(
    historical: &SeriesTable,
    forecast: &SeriesTable,
    include_forecast: bool,
) -> Option<DateBounds> {
    let min = historical.first_date()?;
    let hist_max = historical.last_date()?;
    let max = if include_forecast {
        forecast.last_date().map_or(hist_max, |f| f.max(hist_max))
    } else {
        hist_max
    };
    Some(DateBounds { min, max })
}

/// Mode positions for colour assignment: observed modes first, then any
/// forecast-only modes, so a mode keeps its colour across both tables.
fn mode_order<'a>(
    country: &str,
    historical: &'a SeriesTable,
    forecast: &'a SeriesTable,
) -> Vec<&'a str> {
    let mut modes = historical.modes(country);
    for mode in forecast.modes(country) {
        if !modes.contains(&mode) {
            modes.push(mode);
        }
    }
    modes
}

fn clip(table: &SeriesTable, country: &str, mode: &str, window: Range<usize>) -> Vec<TrendPoint> {
    let Some(values) = table.series(country, mode) else {
        return Vec::new();
    };
    let dates = table.dates();
    window
        .filter_map(|i| values[i].map(|value| TrendPoint { date: dates[i], value }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rgb;

    const MODES: [&str; 3] = ["driving", "transit", "walking"];

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn daily(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        from.iter_days().take_while(|x| *x <= to).collect()
    }

    /// History `[2020-01-14, 2021-02-02]`, forecast `[2021-02-03, 2021-03-05]`.
    fn tables() -> (SeriesTable, SeriesTable) {
        let mut hist = SeriesTable::new(daily(d(2020, 1, 14), d(2021, 2, 2))).unwrap();
        let mut fc = SeriesTable::new(daily(d(2021, 2, 3), d(2021, 3, 5))).unwrap();
        for (m, mode) in MODES.iter().enumerate() {
            let n = hist.dates().len();
            hist.insert_series("Chile", mode, (0..n).map(|i| Some(i as f64 + m as f64)).collect())
                .unwrap();
            let n = fc.dates().len();
            fc.insert_series("Chile", mode, (0..n).map(|i| Some(-(i as f64) - m as f64)).collect())
                .unwrap();
        }
        hist.insert_series("Chile", "cycling", vec![None; hist.dates().len()]).unwrap();
        hist.insert_series("Peru", "driving", vec![Some(1.0); hist.dates().len()]).unwrap();
        (hist, fc)
    }

    fn span(seg: &TrendSegment) -> Option<(NaiveDate, NaiveDate)> {
        Some((seg.points.first()?.date, seg.points.last()?.date))
    }

    #[test]
    fn forecast_off_draws_one_solid_series_per_mode() {
        let (h, f) = tables();
        let chart = assemble("Chile", &h, &f, false, d(2020, 2, 1), d(2020, 3, 1));
        assert_eq!(chart.case, TrendCase::Historical);
        assert_eq!(chart.segments.len(), 4);
        for seg in &chart.segments {
            assert_eq!(seg.style, LineStyle::Solid);
            assert!(seg.show_legend);
            if seg.mode != "cycling" {
                assert_eq!(span(seg), Some((d(2020, 2, 1), d(2020, 3, 1))));
                assert_eq!(seg.points.len(), 30);
            }
        }
    }

    #[test]
    fn forecast_off_never_invents_values_past_history() {
        let (h, f) = tables();
        let chart = assemble("Chile", &h, &f, false, d(2021, 1, 30), d(2021, 2, 20));
        let driving = &chart.segments[1];
        assert_eq!(driving.mode, "driving");
        assert_eq!(span(driving), Some((d(2021, 1, 30), d(2021, 2, 2))));
    }

    #[test]
    fn window_inside_forecast_draws_dashed_only() {
        let (h, f) = tables();
        let chart = assemble("Chile", &h, &f, true, d(2021, 2, 10), d(2021, 2, 20));
        assert_eq!(chart.case, TrendCase::ForecastOnly);
        assert_eq!(chart.segments.len(), 4);
        for seg in &chart.segments {
            assert_eq!(seg.style, LineStyle::Dashed);
            if seg.mode == "cycling" {
                assert!(seg.points.is_empty());
            } else {
                assert_eq!(span(seg), Some((d(2021, 2, 10), d(2021, 2, 20))));
            }
        }
    }

    #[test]
    fn forecast_only_keeps_one_series_per_mode_without_forecast_columns() {
        let (mut h, f) = tables();
        let n = h.dates().len();
        h.insert_series("Laos", "driving", vec![Some(1.0); n]).unwrap();
        h.insert_series("Laos", "walking", vec![Some(2.0); n]).unwrap();

        let chart = assemble("Laos", &h, &f, true, d(2021, 2, 3), d(2021, 2, 4));
        assert_eq!(chart.case, TrendCase::ForecastOnly);
        let shape: Vec<(&str, LineStyle, usize)> = chart
            .segments
            .iter()
            .map(|s| (s.mode.as_str(), s.style, s.points.len()))
            .collect();
        assert_eq!(
            shape,
            vec![("driving", LineStyle::Dashed, 0), ("walking", LineStyle::Dashed, 0)]
        );
        assert_eq!(chart.legend().len(), 2);
    }

    #[test]
    fn spanning_window_stitches_solid_and_dashed() {
        let (h, f) = tables();
        let chart = assemble("Chile", &h, &f, true, d(2021, 1, 25), d(2021, 2, 15));
        assert_eq!(chart.case, TrendCase::Spanning);

        for mode in MODES {
            let segs: Vec<&TrendSegment> =
                chart.segments.iter().filter(|s| s.mode == mode).collect();
            assert_eq!(segs.len(), 2, "{mode}");
            let (solid, dashed) = (segs[0], segs[1]);
            assert_eq!(solid.style, LineStyle::Solid);
            assert_eq!(dashed.style, LineStyle::Dashed);
            assert_eq!(span(solid), Some((d(2021, 1, 25), d(2021, 2, 2))));
            assert_eq!(span(dashed), Some((d(2021, 2, 3), d(2021, 2, 15))));
            assert_eq!(solid.color, dashed.color);
        }

        let legend = chart.legend();
        assert_eq!(legend.len(), 4);
        for mode in MODES {
            assert_eq!(legend.iter().filter(|(m, _)| *m == mode).count(), 1);
        }
    }

    #[test]
    fn end_on_last_historical_date_stays_historical() {
        let (h, f) = tables();
        let chart = assemble("Chile", &h, &f, true, d(2021, 1, 1), d(2021, 2, 2));
        assert_eq!(chart.case, TrendCase::Historical);
        assert!(chart.segments.iter().all(|s| s.style == LineStyle::Solid));
    }

    #[test]
    fn historical_membership_wins_on_overlap() {
        let (h, _) = tables();
        let mut f = SeriesTable::new(daily(d(2021, 2, 2), d(2021, 2, 5))).unwrap();
        f.insert_series("Chile", "driving", vec![Some(0.0); 4]).unwrap();
        assert_eq!(
            select_case(&h, &f, true, d(2021, 2, 2), d(2021, 2, 2)),
            TrendCase::Historical
        );
        assert_eq!(
            select_case(&h, &f, true, d(2021, 2, 2), d(2021, 2, 4)),
            TrendCase::ForecastOnly
        );
    }

    #[test]
    fn inverted_window_is_empty_in_every_case() {
        let (h, f) = tables();
        let windows = [
            (false, d(2020, 6, 1), d(2020, 5, 1)),
            (true, d(2020, 6, 1), d(2020, 5, 1)),
            (true, d(2021, 3, 1), d(2021, 2, 10)),
            (true, d(2021, 1, 25), d(2019, 1, 1)),
        ];
        for (include, start, end) in windows {
            let chart = assemble("Chile", &h, &f, include, start, end);
            assert!(!chart.segments.is_empty());
            assert_eq!(chart.point_count(), 0, "{include} {start} {end}");
        }
    }

    #[test]
    fn colours_follow_mode_position() {
        let (h, f) = tables();
        let chart = assemble("Chile", &h, &f, true, d(2021, 1, 25), d(2021, 2, 15));
        let colors: Vec<(&str, Rgb)> = chart.legend();
        assert_eq!(colors[0], ("cycling", mode_color(0)));
        assert_eq!(colors[1], ("driving", mode_color(1)));
        assert_eq!(colors[3], ("walking", mode_color(3)));

        // Forecast-only view keeps the observed positions.
        let fc_only = assemble("Chile", &h, &f, true, d(2021, 2, 10), d(2021, 2, 20));
        assert_eq!(fc_only.legend()[1], ("driving", mode_color(1)));

        // Fewer modes: positions restart for that country.
        let peru = assemble("Peru", &h, &f, false, d(2020, 2, 1), d(2020, 2, 2));
        assert_eq!(peru.legend(), vec![("driving", mode_color(0))]);
    }

    #[test]
    fn gap_between_ranges_is_absent() {
        let (h, _) = tables();
        let mut f = SeriesTable::new(daily(d(2021, 2, 10), d(2021, 2, 20))).unwrap();
        f.insert_series("Chile", "driving", vec![Some(0.0); 11]).unwrap();
        let chart = assemble("Chile", &h, &f, true, d(2021, 2, 1), d(2021, 2, 12));
        assert_eq!(chart.case, TrendCase::Spanning);
        let driving: Vec<&TrendSegment> =
            chart.segments.iter().filter(|s| s.mode == "driving").collect();
        assert_eq!(span(driving[0]), Some((d(2021, 2, 1), d(2021, 2, 2))));
        assert_eq!(span(driving[1]), Some((d(2021, 2, 10), d(2021, 2, 12))));
    }

    #[test]
    fn assemble_is_idempotent() {
        let (h, f) = tables();
        let a = assemble("Chile", &h, &f, true, d(2021, 1, 25), d(2021, 2, 15));
        let b = assemble("Chile", &h, &f, true, d(2021, 1, 25), d(2021, 2, 15));
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_country_has_no_segments() {
        let (h, f) = tables();
        let chart = assemble("Atlantis", &h, &f, true, d(2021, 1, 25), d(2021, 2, 15));
        assert!(chart.segments.is_empty());
    }

    #[test]
    fn bounds_extend_with_forecast() {
        let (h, f) = tables();
        assert_eq!(
            date_bounds(&h, &f, false),
            Some(DateBounds { min: d(2020, 1, 14), max: d(2021, 2, 2) })
        );
        assert_eq!(
            date_bounds(&h, &f, true),
            Some(DateBounds { min: d(2020, 1, 14), max: d(2021, 3, 5) })
        );
        let empty = SeriesTable::default();
        assert_eq!(date_bounds(&h, &empty, true).map(|b| b.max), Some(d(2021, 2, 2)));
        assert_eq!(date_bounds(&empty, &f, true), None);
    }
}
