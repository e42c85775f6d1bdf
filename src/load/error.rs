#[derive(Debug)]
pub enum Error {
    InComplete,
    BadVersion(u8),
    Other(crate::Error),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InComplete => "Not enough data is available to parse a load report".fmt(f),
            Error::BadVersion(version) => write!(f, "Unknown load report version: {}", version),
            Error::Other(err) => err.fmt(f),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Other(value.into())
    }
}
