use std::fmt;
use std::io;

#[derive(Debug)]
pub enum GameError {
    /// Intersection was requested between two bodies of the same kind.
    /// Only ship/asteroid pairs can be tested.
    UnsupportedIntersection {
        left: &'static str,
        right: &'static str,
    },
    Io(io::Error),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::UnsupportedIntersection { left, right } => write!(
                f,
                "intersection between {} and {} is not supported",
                left, right
            ),
            GameError::Io(e) => write!(f, "terminal I/O failed: {}", e),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::Io(e) => Some(e),
            GameError::UnsupportedIntersection { .. } => None,
        }
    }
}

impl From<io::Error> for GameError {
    fn from(e: io::Error) -> Self {
        GameError::Io(e)
    }
}

pub type GameResult<T> = Result<T, GameError>;
