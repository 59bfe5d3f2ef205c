use thiserror::Error;

/// Terminal or track dimensions that cannot host a playable corridor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum GeometryError {
    #[error("terminal is {width} columns wide, need at least {required}")]
    TooNarrow { width: i32, required: i32 },
    #[error("terminal is {rows} rows tall, need at least {required}")]
    TooShort { rows: i32, required: i32 },
    #[error("invalid track parameter: {0}")]
    InvalidParameter(&'static str),
}
