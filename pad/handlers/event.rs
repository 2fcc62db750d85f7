use ferrite_pad::{PadEvent, GRID_SIZE};
use tiny_http::Request;
use tracing::warn;

use crate::render::{error_fragment, frame_fragment};
use crate::routes::{bad_request, html_response, no_content, HttpResponse};
use crate::state::SharedState;
use crate::util::form::Form;

/// `POST /event` with `kind=down|move|up|leave|cell|clear`.
pub fn handle_event(request: &mut Request, state: &SharedState) -> HttpResponse {
    let form = Form::from_request(request);
    let side = (GRID_SIZE as u32 * state.config.canvas_scale.max(1)) as f64;
    let event = match parse_event(&form, side) {
        Ok(ev)   => ev,
        Err(msg) => return bad_request(&msg),
    };

    let result = state.session().handle(event);
    match result {
        Ok(Some(frame)) => html_response(frame_fragment(&frame, state.config.feature_scale)),
        Ok(None)        => no_content(),
        Err(e) => {
            warn!(?event, error = %e, "event rejected");
            html_response(error_fragment(&e.to_string()))
        }
    }
}

/// Pointer coordinates may stray up to one canvas side past any edge.
fn parse_event(form: &Form, side: f64) -> Result<PadEvent, String> {
    let near = |v: f64| (-side..=2.0 * side).contains(&v);
    let point = || -> Result<(f64, f64), String> {
        match (form.number::<f64>("x"), form.number::<f64>("y")) {
            (Some(x), Some(y)) if near(x) && near(y) => Ok((x, y)),
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => {
                Err(format!("point ({}, {}) is too far outside the canvas", x, y))
            }
            _ => Err("x and y must be numbers".into()),
        }
    };

    match form.get("kind").unwrap_or("") {
        "down" => {
            // Checkbox pads send a bare "down"; the position is unused there.
            let (x, y) = if form.get("x").is_none() && form.get("y").is_none() {
                (0.0, 0.0)
            } else {
                point()?
            };
            Ok(PadEvent::PointerDown { x, y })
        }
        "move" => {
            let (x, y) = point()?;
            Ok(PadEvent::PointerMove { x, y, radius: form.number::<f64>("radius") })
        }
        "up"    => Ok(PadEvent::PointerUp),
        "leave" => Ok(PadEvent::PointerLeave),
        "cell"  => match (form.number::<usize>("row"), form.number::<usize>("col")) {
            (Some(row), Some(col)) => Ok(PadEvent::CellOver { row, col }),
            _ => Err("row and col must be non-negative integers".into()),
        },
        "clear" => Ok(PadEvent::Clear),
        other   => Err(format!("unknown event kind '{}'", other)),
    }
}
