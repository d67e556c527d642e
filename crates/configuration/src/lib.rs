pub mod configuration;
pub mod environment;
pub mod error;
pub mod settings;
pub mod to_runtime_configuration;
pub mod values;
pub mod version1;

pub use configuration::Configuration;
pub use settings::{
    AttributeHandling, HeaderNames, PaginationSettings, RequestSettings, SearchSettings,
    SortSettings,
};
pub use to_runtime_configuration::make_runtime_configuration;
pub use version1::{parse_configuration, write_parsed_configuration, ParsedConfiguration};
