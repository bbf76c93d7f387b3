//! Token cursor: a pull reader and a compact writer for JSON text.

pub mod reader;
pub mod token;
pub mod writer;

pub use reader::{escape_pointer_segment, JsonReader};
pub use token::{Token, TokenKind};
pub use writer::JsonWriter;
