mod api;
pub mod models;
pub use api::{
    convert_body_parts_gemini, convert_messages_to_gemini_contents, first_inline_image,
    list_models, response_to_text_data, send_generate_request,
};
pub use models::{GeminiResponse, InlineImage, ModelInfo};
