use easy_core::Code;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EasyError {
    /// The loaded library has no option by this name.
    #[error("Option not found: {0}")]
    OptionNotFound(String),

    /// The native engine rejected a call; the status is passed through as-is.
    #[error("{call} failed with {code}: {message}")]
    NativeCallFailed {
        call: &'static str,
        code: Code,
        message: String,
    },

    /// A caller-side precondition failed before any native call was made.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A native call returned null where a resource was mandatory.
    #[error("Native call returned null: {0}")]
    NullNativeResult(&'static str),

    /// An observer stopped the transfer.
    #[error("Transfer aborted by callback ({code})")]
    CallbackAbort { code: Code },

    #[error("Handle already released")]
    Released,

    #[error("Library error: {0}")]
    Library(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EasyError {
    /// Native status carried by the error, if any.
    pub fn code(&self) -> Option<Code> {
        match self {
            EasyError::NativeCallFailed { code, .. } | EasyError::CallbackAbort { code } => {
                Some(*code)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EasyError>;
