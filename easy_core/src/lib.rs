pub mod auth;
pub mod code;
pub mod global;
pub mod header_map;
pub mod http_version;
pub mod info;
pub mod info_value;
pub mod mime_part;
pub mod option_value;
pub mod options;
pub mod value_category;

pub use auth::Auth;
pub use code::Code;
pub use global::{GlobalInit, SslBackend, SslSet};
pub use header_map::HeaderMap;
pub use http_version::HttpVersion;
pub use info::{Info, ReturnCategory};
pub use info_value::{Certificate, InfoValue, Timing, Timings, TlsSession};
pub use mime_part::{MimeData, MimePart};
pub use option_value::{Observer, OptionValue};
pub use options::Opt;
pub use value_category::ValueCategory;
