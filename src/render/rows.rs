use serde::Serialize;

use crate::inference::Prediction;

/// One line of the probability listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedRow {
    pub label: String,
    /// Two decimals with a percent sign, e.g. `"50.00%"`.
    pub percent: String,
    pub is_max: bool,
}

/// Formats a prediction in class order, flagging the maximum.
///
/// Exactly one row is flagged. On ties the first maximal class wins, so
/// `[0.5, 0.5, 0, ...]` highlights class 0. `labels`, when given, replace
/// the numeric class names.
pub fn render_prediction(prediction: &Prediction, labels: Option<&[String]>) -> Vec<RenderedRow> {
    let best = prediction.best().class;
    prediction
        .classes()
        .iter()
        .map(|c| RenderedRow {
            label: labels
                .and_then(|l| l.get(c.class))
                .cloned()
                .unwrap_or_else(|| c.class.to_string()),
            percent: format_percent(c.probability),
            is_max: c.class == best,
        })
        .collect()
}

pub fn format_percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// Plain-text listing; the maximum is wrapped in `*`.
pub fn to_text(rows: &[RenderedRow]) -> String {
    rows.iter()
        .map(|r| {
            let line = format!("{} : {}", r.label, r.percent);
            if r.is_max { format!("*{}*", line) } else { line }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// HTML listing; the maximum is wrapped in `<b>`.
pub fn to_html(rows: &[RenderedRow]) -> String {
    rows.iter()
        .map(|r| {
            let line = format!("{} : {}", html_escape(&r.label), r.percent);
            if r.is_max { format!("<b>{}</b>", line) } else { line }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
