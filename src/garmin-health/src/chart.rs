use std::path::{Path, PathBuf};

use anyhow::bail;
use chrono::{NaiveDate, TimeDelta};
use garmin_health_types::{DailyRecord, DateRange, PeriodError, SickPeriods};
use plotters::{
    coord::{Shift, types::IntoMonthly},
    prelude::*,
};

use crate::RecordSink;

const WIDTH_INCHES: u32 = 12;
const HEIGHT_INCHES: u32 = 15;
const DPI: u32 = 300;

/// Room below a panel for its x labels. Only the bottom panel carries the
/// rotated dates.
const DATE_LABEL_AREA: u32 = 220;
const BARE_AXIS_AREA: u32 = 20;

const SICK_SHADE: RGBColor = RGBColor(240, 128, 128);
const SICK_SHADE_ALPHA: f64 = 0.3;

struct Panel {
    title: &'static str,
    y_label: &'static str,
    color: RGBColor,
    value: fn(&DailyRecord) -> Option<f64>,
}

const PANELS: [Panel; 3] = [
    Panel {
        title: "Heart Rate Variability (HRV)",
        y_label: "HRV",
        color: BLUE,
        value: DailyRecord::hrv,
    },
    Panel {
        title: "Resting Heart Rate",
        y_label: "BPM",
        color: RGBColor(0, 128, 0),
        value: DailyRecord::resting_hr,
    },
    Panel {
        title: "Sleep Duration",
        y_label: "Hours",
        color: RGBColor(128, 0, 128),
        value: DailyRecord::sleep_duration,
    },
];

/// Three stacked time-series panels sharing the date axis, with every sick
/// period shaded.
pub struct ChartRenderer<'a> {
    periods: &'a SickPeriods,
    output: PathBuf,
}

impl<'a> ChartRenderer<'a> {
    pub fn new(periods: &'a SickPeriods, output: impl Into<PathBuf>) -> Self {
        Self {
            periods,
            output: output.into(),
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Reads the table at `data` back and writes the chart image.
    pub fn render(&self, data: &Path) -> anyhow::Result<PathBuf> {
        let records = RecordSink::read(data, self.periods)?;
        self.draw(&records)?;

        info!("visualization saved as {}", self.output.display());
        Ok(self.output.clone())
    }

    pub fn draw(&self, records: &[DailyRecord]) -> anyhow::Result<()> {
        let (Some(first), Some(last)) = (records.first(), records.last()) else {
            bail!("no rows to plot");
        };
        let span = self.plot_span(first.date(), last.date())?;

        let size = (WIDTH_INCHES * DPI, HEIGHT_INCHES * DPI);
        let root = BitMapBackend::new(&self.output, size).into_drawing_area();
        root.fill(&WHITE)?;

        let areas = root.split_evenly((PANELS.len(), 1));
        for (index, (area, panel)) in areas.iter().zip(&PANELS).enumerate() {
            let show_dates = index + 1 == PANELS.len();
            self.draw_panel(area, panel, records, span, show_dates)?;
        }

        root.present()?;
        Ok(())
    }

    fn draw_panel(
        &self,
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        panel: &Panel,
        records: &[DailyRecord],
        span: DateRange,
        show_dates: bool,
    ) -> anyhow::Result<()> {
        let points = records
            .iter()
            .filter_map(|r| (panel.value)(r).map(|v| (r.date(), v)))
            .collect::<Vec<_>>();
        let (y_min, y_max) = y_bounds(&points);

        let mut chart = ChartBuilder::on(area)
            .caption(panel.title, ("sans-serif", 56))
            .margin(40)
            .x_label_area_size(x_label_area(show_dates))
            .y_label_area_size(140)
            .build_cartesian_2d((span.start()..span.end_exclusive()).monthly(), y_min..y_max)?;

        let date_label = |date: &NaiveDate| date.format("%Y-%m-%d").to_string();
        let no_label = |_: &NaiveDate| String::new();

        let mut mesh = chart.configure_mesh();
        mesh.y_label_style(("sans-serif", 32))
            .y_desc(panel.y_label)
            .axis_desc_style(("sans-serif", 40));
        if show_dates {
            let rotated = ("sans-serif", 32)
                .into_font()
                .transform(FontTransform::Rotate90);
            mesh.x_label_formatter(&date_label).x_label_style(rotated);
        } else {
            mesh.x_label_formatter(&no_label);
        }
        mesh.draw()?;

        for (start, end) in self.shaded_spans(span) {
            chart.draw_series(std::iter::once(Rectangle::new(
                [(start, y_min), (end, y_max)],
                SICK_SHADE.mix(SICK_SHADE_ALPHA).filled(),
            )))?;
        }

        // A missing value breaks the line instead of being bridged.
        for run in records.split(|r| (panel.value)(r).is_none()) {
            if run.is_empty() {
                continue;
            }

            chart.draw_series(LineSeries::new(
                run.iter()
                    .filter_map(|r| (panel.value)(r).map(|v| (r.date(), v))),
                panel.color.stroke_width(3),
            ))?;
        }

        chart.draw_series(
            points
                .iter()
                .map(|&(date, v)| Circle::new((date, v), 6, panel.color.filled())),
        )?;

        Ok(())
    }

    /// Dates on the x axis: the rows plus every sick period, whether or not
    /// the period has rows.
    fn plot_span(&self, first: NaiveDate, last: NaiveDate) -> Result<DateRange, PeriodError> {
        let start = self.periods.iter().map(|p| p.start()).fold(first, Ord::min);
        let end = self.periods.iter().map(|p| p.end()).fold(last, Ord::max);
        DateRange::new(start, end)
    }

    /// Sick periods clipped to `span`, as half-open day spans.
    fn shaded_spans(&self, span: DateRange) -> Vec<(NaiveDate, NaiveDate)> {
        self.periods
            .iter()
            .filter_map(|period| {
                let start = period.start().max(span.start());
                let end = period.end().min(span.end());
                (start <= end).then(|| (start, end + TimeDelta::days(1)))
            })
            .collect()
    }
}

fn x_label_area(show_dates: bool) -> u32 {
    if show_dates {
        DATE_LABEL_AREA
    } else {
        BARE_AXIS_AREA
    }
}

fn y_bounds(points: &[(NaiveDate, f64)]) -> (f64, f64) {
    let mut values = points.iter().map(|&(_, v)| v);
    let Some(first) = values.next() else {
        return (0.0, 1.0);
    };

    let (min, max) = values.fold((first, first), |(min, max), v| (min.min(v), max.max(v)));
    let pad = if max > min { (max - min) * 0.05 } else { 1.0 };
    (min - pad, max + pad)
}
