pub mod gemini;

pub use gemini::{
    convert_body_parts_gemini, first_inline_image, list_models, response_to_text_data,
    send_generate_request,
};
