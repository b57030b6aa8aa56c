pub mod configuration;
pub mod connection;
pub mod environment;
pub mod error;
pub mod to_runtime_configuration;
pub mod values;
pub mod version1;

pub use configuration::{configuration_jsonschema, Configuration};
pub use connection::create_pool;
pub use values::uri::ConnectionUri;
pub use version1::{parse_configuration, write_parsed_configuration, ParsedConfiguration};

pub use to_runtime_configuration::make_runtime_configuration;
