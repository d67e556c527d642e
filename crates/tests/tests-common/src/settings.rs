//! Request settings used across tests.

use restql_configuration::{AttributeHandling, RequestSettings};

pub const CURSOR_KEY: &str = "the tests do not keep secrets";

/// Every default: unbounded pages, plain cursors, `name:attr` operators.
pub fn default_settings() -> RequestSettings {
    RequestSettings::default()
}

/// Pages of `default_page_size` rows, at most `max_page_size`.
pub fn paged(default_page_size: u32, max_page_size: u32) -> RequestSettings {
    let mut settings = RequestSettings::default();
    settings.pagination.default_page_size = default_page_size;
    settings.pagination.max_page_size = max_page_size;
    settings
}

/// Like `paged`, with cursors encrypted under [`CURSOR_KEY`].
pub fn encrypted(default_page_size: u32, max_page_size: u32) -> RequestSettings {
    RequestSettings {
        cursor_key: Some(CURSOR_KEY.to_string()),
        ..paged(default_page_size, max_page_size)
    }
}

pub fn with_attribute_handling(attribute_handling: AttributeHandling) -> RequestSettings {
    let mut settings = RequestSettings::default();
    settings.search.attribute_handling = attribute_handling;
    settings
}
