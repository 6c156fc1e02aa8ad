pub mod canvas;
pub mod layout;
pub mod pdf_canvas;
