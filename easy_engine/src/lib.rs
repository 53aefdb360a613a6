pub mod error;
pub use error::{EasyError, Result};

pub mod native;
pub use native::{NativeArg, NativeEngine};

pub mod registry;
pub use registry::{OptionDescriptor, OptionRegistry};

mod encoder;
pub mod bridge;
pub use bridge::{Fault, HeaderCollector};

mod decoder;
mod resources;

pub mod error_buffer;
pub use error_buffer::ErrorBuffer;

pub mod handle;
pub use handle::EasyHandle;

pub mod global;
pub use global::{global_cleanup, global_init, global_sslset, GlobalGuard, GLOBAL};

pub mod loader;
pub use loader::LibcurlEngine;

pub mod config;
pub use config::{open_engine, EngineConfig, Session};

pub mod scripted;
pub use scripted::{Script, ScriptedEngine};

pub use easy_core::{
    Auth, Code, GlobalInit, HeaderMap, HttpVersion, Info, InfoValue, MimePart, Opt, OptionValue,
    SslBackend, SslSet, Timings,
};
