#[derive(Debug)]
pub enum Error {
    /// An error originating from reading or writing a file
    Io(std::io::Error),
    /// An error originating from decoding or encoding CSV
    Csv(csv::Error),
    /// An error originating from the airport store rejecting a write
    Store(String),
    /// An error originating from fetching the dataset over the network
    Download(String),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Store(_) | Self::Download(_) => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => std::fmt::Display::fmt(&e, f),
            Self::Csv(e) => std::fmt::Display::fmt(&e, f),
            Self::Store(e) => write!(f, "store write failed: {e}"),
            Self::Download(e) => write!(f, "download failed: {e}"),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}
