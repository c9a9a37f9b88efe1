/*!
Error types for the SSDP engine.

Most faults the engine encounters (a malformed frame, a send failure, a
shutdown race on the companion socket) are not propagated to callers at all —
per the error handling design, they are logged and the engine keeps running.
The only error that can leave the public API is a fatal configuration error
at construction time.
*/
use thiserror::Error as ThisError;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, ThisError)]
pub enum Error {
    /// Construction-time configuration fault; the engine refuses to start.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A codec frame could not be parsed; callers that build frames directly
    /// (as opposed to the engine's own inbound pipeline, which logs and
    /// drops) may want to see this.
    #[error("malformed SSDP frame: {0}")]
    Parse(String),
    /// Transport I/O failure, retained for callers that talk to the
    /// transport directly (e.g. tests); the engine itself never lets this
    /// escape `send`.
    #[error("transport I/O error: {0}")]
    Io(String),
}

pub fn config_error<S: Into<String>>(message: S) -> Error {
    Error::Config(message.into())
}

pub fn parse_error<S: Into<String>>(message: S) -> Error {
    Error::Parse(message.into())
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
