use ferrite_pad::Network;
use tiny_http::Request;
use tracing::{info, warn};

use crate::render::{error_fragment, frame_fragment};
use crate::routes::{bad_request, html_response, json_response, no_content, HttpResponse};
use crate::state::SharedState;
use crate::util::form::Form;

/// `GET /models` lists the model stems in the model directory.
pub fn handle_list(state: &SharedState) -> HttpResponse {
    let models = state.store.list();
    json_response(serde_json::to_string(&models).unwrap_or_else(|_| "[]".into()))
}

/// `POST /model` with `name=...` switches the active model.
///
/// The name and file are checked before a new generation starts, so a bad
/// request never cancels a switch already in flight. The file is then parsed
/// without holding the session lock. If another switch started while this
/// one was loading, this result is dropped and the response is empty.
pub fn handle_switch(request: &mut Request, state: &SharedState) -> HttpResponse {
    let form = Form::from_request(request);
    let name = match form.get("name") {
        Some(n) if !n.is_empty() => n.to_owned(),
        _ => return bad_request("missing model name"),
    };

    let path = match state.store.locate(&name) {
        Ok(p)  => p,
        Err(e) => {
            warn!(model = %name, error = %e, "model switch refused");
            return html_response(error_fragment(&e.to_string()));
        }
    };

    let generation = state.session().begin_switch();
    info!(model = %name, generation = generation.0, "loading model");

    let network = match Network::load_json(&path) {
        Ok(n)  => n,
        Err(e) => {
            warn!(model = %name, error = %e, "model load failed");
            return html_response(error_fragment(&e.to_string()));
        }
    };

    let result = state.session().complete_switch(generation, name, Box::new(network));
    match result {
        Ok(Some(frame)) => html_response(frame_fragment(&frame, state.config.feature_scale)),
        Ok(None)        => no_content(),
        Err(e)          => html_response(error_fragment(&e.to_string())),
    }
}
