pub mod image;
pub mod rows;

pub use self::image::{feature_map_image, feature_map_png, png_data_uri};
pub use rows::{format_percent, html_escape, render_prediction, to_html, to_text, RenderedRow};
