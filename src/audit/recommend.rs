//! Rule-based recommendations derived from a KPI set.

use serde::Serialize;

use super::kpi::KpiSet;

/// Overnight base load above which standby consumption is flagged (kW).
pub const BASE_LOAD_LIMIT_KW: f64 = 0.3;
/// Peak/valley ratio above which load shifting is suggested.
pub const PEAK_VALLEY_LIMIT: f64 = 2.0;
/// Self-consumption share below which storage is suggested (%).
pub const SELF_CONSUMPTION_FLOOR_PCT: f64 = 60.0;
/// Exported energy above which surplus reuse is suggested (kWh).
pub const EXPORT_LIMIT_KWH: f64 = 1.0;

/// Emitted alone when no rule fires.
pub const FALLBACK_TEXT: &str = "Operación correcta. Mantener horarios y revisar trimestralmente.";

/// One recommendation, ranked by firing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    /// 1-based rank in firing order.
    pub priority: usize,
    /// Recommendation text.
    pub text: String,
}

/// A predicate over the KPI set paired with the message it emits.
struct Rule {
    applies: fn(&KpiSet) -> bool,
    text: &'static str,
}

/// Evaluated in order; every rule is independent of the others.
const RULES: &[Rule] = &[
    Rule {
        applies: |k| k.base_load_kw > BASE_LOAD_LIMIT_KW,
        text: "Reducir consumo base nocturno: programar apagados y temporizadores.",
    },
    Rule {
        applies: |k| k.ratio_peak_valley.is_some_and(|r| r > PEAK_VALLEY_LIMIT),
        text: "Desplazar cargas a horas valle para suavizar picos.",
    },
    Rule {
        applies: |k| {
            k.autoconsumo_pct
                .is_some_and(|p| p < SELF_CONSUMPTION_FLOOR_PCT)
        },
        text: "Bajo autoconsumo: valorar batería 3–7 kWh y reprogramar consumos.",
    },
    Rule {
        applies: |k| k.export_kwh > EXPORT_LIMIT_KWH,
        text: "Excedentes frecuentes: aprovechar para ACS programando resistencias o batería.",
    },
];

/// Produces the ranked recommendation list for a KPI set.
///
/// Never empty: when no rule fires the list holds only [`FALLBACK_TEXT`].
pub fn recommend(kpis: &KpiSet) -> Vec<Recommendation> {
    let mut texts: Vec<&str> = RULES
        .iter()
        .filter(|rule| (rule.applies)(kpis))
        .map(|rule| rule.text)
        .collect();
    if texts.is_empty() {
        texts.push(FALLBACK_TEXT);
    }

    texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| Recommendation {
            priority: i + 1,
            text: text.to_string(),
        })
        .collect()
}
