/// DecodeError is returned when a buffer fails verification while decoding.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown type tag {0:#04x}")]
    BadTag(u8),
    #[error("buffer is truncated")]
    Truncated,
    #[error("node offset {0} is out of bounds")]
    BadOffset(u32),
    #[error("string payload is not valid UTF-8")]
    BadUtf8,
    #[error("nesting depth exceeds the verifier limit")]
    TooDeep,
    #[error("unsupported schema version {0}")]
    BadVersion(u8),
}
