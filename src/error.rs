use thiserror::Error;

/// Failure inside the detection model call.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct DetectError(#[from] anyhow::Error);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(#[source] Box<ureq::Transport>),

    #[error("response body exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("failed to read response body: {0}")]
    Body(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{0}")]
    Image(#[from] image::ImageError),

    #[error("image dimensions are zero")]
    ZeroDimensions,
}

/// Everything that can go wrong while counting people for one URL.
#[derive(Error, Debug)]
pub enum CountError {
    #[error("failed to fetch image: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to decode image: {0}")]
    Decode(#[from] DecodeError),

    #[error("detection failed: {0}")]
    Inference(#[from] DetectError),

    #[error("worker task failed: {0}")]
    Worker(String),
}

impl CountError {
    /// Stable name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CountError::Fetch(_) => "fetch",
            CountError::Decode(_) => "decode",
            CountError::Inference(_) => "inference",
            CountError::Worker(_) => "internal",
        }
    }
}

pub type CountResult<T> = Result<T, CountError>;
