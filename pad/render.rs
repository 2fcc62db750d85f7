//! Page and fragment rendering for the pad server.
//!
//! The page is a single HTML template (`pad/assets/pad.html`) with
//! placeholder tokens like `{{TOKEN}}`, loaded at compile time. Event
//! responses are small HTML fragments swapped into `#output`.

use ferrite_pad::render::{feature_map_png, html_escape, png_data_uri, to_html};
use ferrite_pad::{Frame, PadError, PadResult, Variant, GRID_SIZE};
use tracing::warn;

const TEMPLATE: &str = include_str!("assets/pad.html");

/// Placeholders the page cannot work without.
const REQUIRED: [(&str, &str); 3] = [
    ("{{INPUT_SECTION}}", "input grid"),
    ("{{RESULT_SECTION}}", "output element"),
    ("{{CLEAR_BUTTON}}", "clear button"),
];

/// Fails when the embedded template lacks a required element.
pub fn check_template() -> PadResult<()> {
    for (token, what) in REQUIRED {
        if !TEMPLATE.contains(token) {
            return Err(PadError::MissingAsset(what));
        }
    }
    Ok(())
}

pub struct PageParts<'a> {
    pub variant: Variant,
    pub canvas_size: Option<(u32, u32)>,
    pub brush_radius: f64,
    pub models: &'a [String],
    pub selected: &'a str,
    pub result_html: String,
}

pub fn render_page(parts: PageParts<'_>) -> String {
    let (width, height) = parts.canvas_size.unwrap_or((0, 0));
    let html = TEMPLATE
        .replace("{{VARIANT}}", &parts.variant.to_string())
        .replace("{{INPUT_SECTION}}", &input_section(parts.variant, width, height))
        .replace("{{CLEAR_BUTTON}}", r#"<button id="clear" type="button" class="btn">Clear</button>"#)
        .replace("{{MODEL_OPTIONS}}", &model_options(parts.models, parts.selected))
        .replace("{{RESULT_SECTION}}", &parts.result_html)
        .replace("{{BRUSH_RADIUS}}", &parts.brush_radius.to_string())
        .replace("{{GRID_SIZE}}", &GRID_SIZE.to_string());
    blank_remaining(html)
}

fn input_section(variant: Variant, width: u32, height: u32) -> String {
    match variant {
        Variant::Canvas => format!(
            r#"<canvas id="pad" width="{w}" height="{h}" class="pad-canvas"></canvas>"#,
            w = width,
            h = height
        ),
        Variant::Checkbox => {
            let boxes: String = (0..GRID_SIZE * GRID_SIZE)
                .map(|i| {
                    format!(
                        r#"<input type="checkbox" data-row="{}" data-col="{}">"#,
                        i / GRID_SIZE,
                        i % GRID_SIZE
                    )
                })
                .collect();
            format!(r#"<div class="grid">{}</div>"#, boxes)
        }
    }
}

fn model_options(models: &[String], selected: &str) -> String {
    if models.is_empty() {
        return r#"<option disabled>No models found</option>"#.into();
    }
    models.iter().map(|name| {
        let sel = if name == selected { " selected" } else { "" };
        format!("<option value=\"{}\"{}>{}</option>", html_escape(name), sel, html_escape(name))
    }).collect::<Vec<_>>().join("\n")
}

/// Probability listing plus any feature maps, as swapped into `#output`.
pub fn frame_fragment(frame: &Frame, feature_scale: u32) -> String {
    let mut html = format!(
        r#"<pre class="probs">{}</pre><div class="status">{} &middot; generation {}</div>"#,
        to_html(&frame.rows),
        html_escape(&frame.model),
        frame.generation
    );
    if !frame.features.is_empty() {
        html.push_str(&features_fragment(frame, feature_scale));
    }
    html
}

pub fn features_fragment(frame: &Frame, feature_scale: u32) -> String {
    let imgs: String = frame
        .features
        .iter()
        .enumerate()
        .filter_map(|(i, map)| match feature_map_png(map, feature_scale) {
            Ok(png) => Some(format!(
                r#"<img class="feature" alt="feature map {}" src="{}">"#,
                i,
                png_data_uri(&png)
            )),
            Err(e) => {
                warn!(map = i, error = %e, "feature map encoding failed");
                None
            }
        })
        .collect();
    format!(r#"<div class="features">{}</div>"#, imgs)
}

pub fn error_fragment(msg: &str) -> String {
    format!(r#"<div class="error-box">{}</div>"#, html_escape(msg))
}

/// Replaces any `{{UPPERCASE_TOKEN}}` that wasn't already substituted with an
/// empty string, so a missed token never reaches the browser.
fn blank_remaining(mut html: String) -> String {
    while let Some(start) = html.find("{{") {
        if let Some(end) = html[start..].find("}}") {
            let abs_end = start + end + 2;
            html.replace_range(start..abs_end, "");
        } else {
            break;
        }
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrite_pad::FeatureMap;

    #[test]
    fn test_template_has_required_elements() {
        assert!(check_template().is_ok());
    }

    #[test]
    fn test_blank_remaining() {
        assert_eq!(blank_remaining("a{{X}}b{{Y}}c".into()), "abc");
        assert_eq!(blank_remaining("a{{open".into()), "a{{open");
    }

    #[test]
    fn test_checkbox_page_has_784_boxes() {
        let page = render_page(PageParts {
            variant: Variant::Checkbox,
            canvas_size: None,
            brush_radius: 12.0,
            models: &["m".to_owned()],
            selected: "m",
            result_html: String::new(),
        });
        assert_eq!(page.matches(r#"type="checkbox""#).count(), GRID_SIZE * GRID_SIZE);
        assert!(!page.contains("{{"));
        assert!(page.contains(r#"<option value="m" selected>m</option>"#));
    }

    #[test]
    fn test_features_fragment_skips_malformed_maps() {
        let frame = Frame {
            rows: vec![],
            features: vec![
                FeatureMap { width: 2, height: 2, values: vec![0.0, 1.0, 2.0, 3.0] },
                FeatureMap { width: 26, height: 26, values: vec![1.0; 3] },
            ],
            model: "m".into(),
            generation: 0,
        };
        let html = features_fragment(&frame, 2);
        assert_eq!(html.matches("<img").count(), 1);
        assert!(html.contains("feature map 0"));
    }

    #[test]
    fn test_canvas_page() {
        let page = render_page(PageParts {
            variant: Variant::Canvas,
            canvas_size: Some((280, 280)),
            brush_radius: 12.0,
            models: &[],
            selected: "",
            result_html: "<pre>x</pre>".into(),
        });
        assert!(page.contains(r#"width="280""#));
        assert!(page.contains("No models found"));
        assert!(page.contains("<pre>x</pre>"));
    }
}
