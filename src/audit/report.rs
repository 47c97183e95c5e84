//! Report bundle handed to rendering collaborators.
//!
//! This is the presentation boundary: absent values become the literal
//! [`NOT_AVAILABLE`] here and nowhere else.

use std::fmt;

use serde::Serialize;

use super::kpi::KpiSet;
use super::recommend::Recommendation;
use super::types::{DailyRollup, HourlyBucket};

/// Placeholder for values that do not apply or could not be computed.
pub const NOT_AVAILABLE: &str = "N/D";
/// Site name used when none is given.
pub const DEFAULT_SITE_NAME: &str = "ENERGIA Analytics";
/// Period label used when none is given.
pub const DEFAULT_PERIOD: &str = "(según datos)";
/// Column headings of the KPI table.
pub const KPI_TABLE_HEADER: [&str; 2] = ["KPI", "Valor"];
/// Column headings of the recommendation table.
pub const RECOMMENDATION_TABLE_HEADER: [&str; 2] = ["Prioridad", "Medida"];
/// Heading of the recommendation section.
pub const RECOMMENDATION_TITLE: &str = "Recomendaciones automáticas";

/// KPI table labels, in output order.
pub const KPI_LABELS: [&str; 9] = [
    "Energía (kWh)",
    "Consumo base nocturno (kW)",
    "Pico horario (kW)",
    "Importación (kWh)",
    "Exportación/Excedentes (kWh)",
    "Autoconsumo (%)",
    "Coste estimado (€)",
    "EUI (kWh/m²)",
    "Ratio punta/valle",
];

/// Dashboard headline labels, in output order.
pub const HEADLINE_LABELS: [&str; 7] = [
    "Energía (kWh)",
    "Base nocturna (kW)",
    "Pico (kW)",
    "Coste (€)",
    "Importación (kWh)",
    "Excedentes (kWh)",
    "Autoconsumo (%)",
];

/// Site metadata printed in the report header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteInfo {
    /// Display name of the site.
    pub name: String,
    /// Conditioned floor area (m²), if known.
    pub area_m2: Option<f64>,
    /// Free-text reporting period.
    pub period: Option<String>,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: DEFAULT_SITE_NAME.to_string(),
            area_m2: None,
            period: None,
        }
    }
}

impl SiteInfo {
    /// Floor area if it is usable for EUI (positive and finite).
    pub fn usable_area(&self) -> Option<f64> {
        self.area_m2.filter(|a| a.is_finite() && *a > 0.0)
    }
}

/// One label/value row of the KPI or headline table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KpiRow {
    pub label: &'static str,
    pub value: String,
}

/// One rank/text row of the recommendation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationRow {
    pub rank: usize,
    pub text: String,
}

/// Series for the hourly-profile and daily-energy charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub hourly: Vec<HourlyBucket>,
    pub daily: Vec<DailyRollup>,
    /// Draw the PV line on the hourly chart.
    pub show_hourly_pv: bool,
    /// Draw the PV bars on the daily chart.
    pub show_daily_pv: bool,
}

/// Everything a chart library or document generator needs for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportData {
    pub title: String,
    pub period: String,
    pub area: String,
    pub has_data: bool,
    pub kpi_header: [&'static str; 2],
    pub kpi_table: Vec<KpiRow>,
    pub headline: Vec<KpiRow>,
    pub recommendation_header: [&'static str; 2],
    pub recommendations: Vec<RecommendationRow>,
    pub charts: Option<ChartData>,
}

/// Formats a rounded value the way the report prints numbers.
///
/// Integral values drop the fraction (`3`, not `3.0`).
pub fn format_value(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), format_value)
}

fn rows(labels: &[&'static str], values: Vec<String>) -> Vec<KpiRow> {
    labels
        .iter()
        .zip(values)
        .map(|(&label, value)| KpiRow { label, value })
        .collect()
}

/// Assembles the report bundle.
///
/// `kpis` is `None` for a run without data; every KPI cell then reads
/// [`NOT_AVAILABLE`] and no charts are attached.
pub fn build_report(
    site: &SiteInfo,
    kpis: Option<&KpiSet>,
    recommendations: &[Recommendation],
) -> ReportData {
    let name = if site.name.trim().is_empty() {
        DEFAULT_SITE_NAME
    } else {
        site.name.as_str()
    };
    let period = site
        .period
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(DEFAULT_PERIOD);

    let kpi_values: Vec<String> = match kpis {
        Some(k) => vec![
            format_value(k.energy_kwh),
            format_value(k.base_load_kw),
            format_value(k.peak_kw),
            format_value(k.import_kwh),
            format_value(k.export_kwh),
            format_optional(k.autoconsumo_pct),
            format_value(k.cost_eur),
            format_optional(k.eui),
            format_optional(k.ratio_peak_valley),
        ],
        None => vec![NOT_AVAILABLE.to_string(); KPI_LABELS.len()],
    };

    let headline_values: Vec<String> = match kpis {
        Some(k) => vec![
            format_value(k.energy_kwh),
            format_value(k.base_load_kw),
            format_value(k.peak_kw),
            format_value(k.cost_eur),
            format_value(k.import_kwh),
            format_value(k.export_kwh),
            format_optional(k.autoconsumo_pct),
        ],
        None => vec![NOT_AVAILABLE.to_string(); HEADLINE_LABELS.len()],
    };

    let charts = kpis.map(|k| ChartData {
        hourly: k.hourly_profile.clone(),
        daily: k.daily.clone(),
        show_hourly_pv: k.hourly_profile.iter().any(|b| b.pv > 0.0),
        show_daily_pv: k.daily.iter().any(|d| d.pv > 0.0),
    });

    ReportData {
        title: format!("Informe energético – {name}"),
        period: period.to_string(),
        area: format_optional(site.usable_area()),
        has_data: kpis.is_some(),
        kpi_header: KPI_TABLE_HEADER,
        kpi_table: rows(&KPI_LABELS, kpi_values),
        headline: rows(&HEADLINE_LABELS, headline_values),
        recommendation_header: RECOMMENDATION_TABLE_HEADER,
        recommendations: recommendations
            .iter()
            .map(|r| RecommendationRow {
                rank: r.priority,
                text: r.text.clone(),
            })
            .collect(),
        charts,
    }
}

/// File stem for an exported report, e.g. `informe_energetico_Casa_Sol`.
/// Every whitespace run, leading and trailing included, becomes one `_`.
pub fn report_file_stem(site_name: &str) -> String {
    if site_name.is_empty() {
        return "informe_energetico_ENERGIA".to_string();
    }
    let mut name = String::with_capacity(site_name.len());
    let mut in_run = false;
    for c in site_name.chars() {
        if c.is_whitespace() {
            if !in_run {
                name.push('_');
            }
            in_run = true;
        } else {
            name.push(c);
            in_run = false;
        }
    }
    format!("informe_energetico_{name}")
}

impl fmt::Display for ReportData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "Periodo: {}", self.period)?;
        writeln!(f, "Área (m²): {}", self.area)?;
        writeln!(f)?;
        writeln!(f, "{:<30} {}", self.kpi_header[0], self.kpi_header[1])?;
        for row in &self.kpi_table {
            writeln!(f, "{:<30} {}", row.label, row.value)?;
        }
        writeln!(f)?;
        writeln!(f, "{RECOMMENDATION_TITLE}")?;
        if self.recommendations.is_empty() {
            return write!(f, "(sin datos válidos: se necesita al menos datetime y load_kwh)");
        }
        writeln!(
            f,
            "{:<10} {}",
            self.recommendation_header[0], self.recommendation_header[1]
        )?;
        let last = self.recommendations.len() - 1;
        for (i, row) in self.recommendations.iter().enumerate() {
            write!(f, "{:<10} {}", row.rank, row.text)?;
            if i < last {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::recommend::recommend;
    use crate::reading::Reading;
    use chrono::NaiveDateTime;

    fn at(s: &str, load: f64) -> Reading {
        let ts = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").expect("valid test timestamp");
        Reading::new(ts, load)
    }

    #[test]
    fn no_data_renders_placeholders() {
        let report = build_report(&SiteInfo::default(), None, &[]);
        assert!(!report.has_data);
        assert_eq!(report.kpi_table.len(), KPI_LABELS.len());
        assert!(report.kpi_table.iter().all(|r| r.value == NOT_AVAILABLE));
        assert!(report.headline.iter().all(|r| r.value == NOT_AVAILABLE));
        assert!(report.charts.is_none());
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn labels_are_in_contract_order() {
        let report = build_report(&SiteInfo::default(), None, &[]);
        let labels: Vec<&str> = report.kpi_table.iter().map(|r| r.label).collect();
        assert_eq!(labels, KPI_LABELS.to_vec());
        assert_eq!(report.kpi_header, ["KPI", "Valor"]);
        assert_eq!(report.recommendation_header, ["Prioridad", "Medida"]);
    }

    #[test]
    fn values_and_placeholders_with_data() {
        let readings = [at("2024-03-02 00:00", 1.0), at("2024-03-02 12:00", 2.0)];
        let kpis = KpiSet::compute(&readings, None).expect("data present");
        let recs = recommend(&kpis);
        let report = build_report(&SiteInfo::default(), Some(&kpis), &recs);

        let value = |label: &str| {
            report
                .kpi_table
                .iter()
                .find(|r| r.label == label)
                .map(|r| r.value.clone())
        };
        assert_eq!(value("Energía (kWh)").as_deref(), Some("3"));
        assert_eq!(value("Importación (kWh)").as_deref(), Some("3"));
        assert_eq!(value("Autoconsumo (%)").as_deref(), Some(NOT_AVAILABLE));
        assert_eq!(value("EUI (kWh/m²)").as_deref(), Some(NOT_AVAILABLE));
        assert_eq!(value("Ratio punta/valle").as_deref(), Some(NOT_AVAILABLE));
        assert_eq!(report.recommendations[0].rank, 1);
        let charts = report.charts.expect("charts attached");
        assert!(!charts.show_hourly_pv);
        assert!(!charts.show_daily_pv);
    }

    #[test]
    fn header_fields() {
        let site = SiteInfo {
            name: "Casa Sol".to_string(),
            area_m2: Some(120.0),
            period: Some("marzo 2024".to_string()),
        };
        let report = build_report(&site, None, &[]);
        assert_eq!(report.title, "Informe energético – Casa Sol");
        assert_eq!(report.period, "marzo 2024");
        assert_eq!(report.area, "120");

        let blank = SiteInfo {
            name: "  ".to_string(),
            area_m2: Some(0.0),
            period: None,
        };
        let report = build_report(&blank, None, &[]);
        assert_eq!(report.title, "Informe energético – ENERGIA Analytics");
        assert_eq!(report.period, DEFAULT_PERIOD);
        assert_eq!(report.area, NOT_AVAILABLE);
    }

    #[test]
    fn rendered_text_contains_tables() {
        let readings = [at("2024-03-02 03:00", 0.9)];
        let kpis = KpiSet::compute(&readings, None).expect("data present");
        let recs = recommend(&kpis);
        let text = build_report(&SiteInfo::default(), Some(&kpis), &recs).to_string();
        assert!(text.starts_with("Informe energético – ENERGIA Analytics"));
        assert!(text.contains("Consumo base nocturno (kW)"));
        assert!(text.contains(RECOMMENDATION_TITLE));
        assert!(text.contains("Reducir consumo base nocturno"));
    }

    #[test]
    fn file_stem_collapses_whitespace() {
        assert_eq!(report_file_stem("Casa  Sol\tNorte"), "informe_energetico_Casa_Sol_Norte");
        assert_eq!(report_file_stem(""), "informe_energetico_ENERGIA");
    }

    #[test]
    fn file_stem_keeps_edge_whitespace_as_underscores() {
        assert_eq!(report_file_stem(" Casa  Sol "), "informe_energetico__Casa_Sol_");
        assert_eq!(report_file_stem("\t"), "informe_energetico__");
    }

    #[test]
    fn format_value_drops_integral_fraction() {
        assert_eq!(format_value(3.0), "3");
        assert_eq!(format_value(33.3), "33.3");
        assert_eq!(format_value(-0.0), "0");
    }
}
