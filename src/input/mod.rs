mod handler;

pub use handler::{InputFrame, InputHandler, MAX_TEXT_LEN};
