use crate::render::{error_fragment, features_fragment};
use crate::routes::{html_response, json_response, HttpResponse};
use crate::state::SharedState;

/// `GET /grid` returns the current 28×28 grid as nested JSON arrays.
pub fn handle_grid(state: &SharedState) -> HttpResponse {
    let rows = state.session().grid().to_rows();
    json_response(serde_json::to_string(&rows).unwrap_or_else(|_| "[]".into()))
}

/// `GET /features` renders the active model's feature maps for the current grid.
pub fn handle_features(state: &SharedState) -> HttpResponse {
    let frame = state.session().refresh();
    match frame {
        Ok(frame) if frame.features.is_empty() => {
            html_response(r#"<div class="features">This model has no feature maps.</div>"#.into())
        }
        Ok(frame) => html_response(features_fragment(&frame, state.config.feature_scale)),
        Err(e)    => html_response(error_fragment(&e.to_string())),
    }
}
