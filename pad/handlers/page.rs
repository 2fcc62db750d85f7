use crate::render::{error_fragment, frame_fragment, render_page, PageParts};
use crate::routes::{html_response, HttpResponse};
use crate::state::SharedState;

/// `GET /` renders the pad with the current prediction already filled in.
pub fn handle_get(state: &SharedState) -> HttpResponse {
    let models = state.store.list();

    let mut session = state.session();
    let result_html = match session.refresh() {
        Ok(frame) => frame_fragment(&frame, state.config.feature_scale),
        Err(e)    => error_fragment(&e.to_string()),
    };
    let variant     = session.variant();
    let canvas_size = session.canvas_size();
    let selected    = session.model_name().to_owned();
    drop(session);

    html_response(render_page(PageParts {
        variant,
        canvas_size,
        brush_radius: state.config.brush_radius,
        models: &models,
        selected: &selected,
        result_html,
    }))
}
