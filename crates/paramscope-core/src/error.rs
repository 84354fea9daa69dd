use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParamscopeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid image dimensions: {width}x{height}")]
    InvalidImage { width: u32, height: u32 },

    #[error("an annotation preview is already being drawn")]
    AlreadyDrawing,

    #[error("parameter `{name}`: {value} violates its constraint, coerced to {coerced}")]
    ConstraintViolation {
        name: String,
        value: f64,
        coerced: f64,
    },

    #[error("processing function failed: {0}")]
    Processing(String),

    #[error("{0} is unavailable")]
    ResourceUnavailable(String),

    #[error("image format error: {0}")]
    Image(#[from] image::ImageError),

    #[error("snapshot parse error: {0}")]
    SnapshotParse(#[from] toml::de::Error),

    #[error("snapshot encode error: {0}")]
    SnapshotEncode(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ParamscopeError>;
