mod cursor_key;
mod secret;

pub use cursor_key::CursorKey;
pub use secret::Secret;
