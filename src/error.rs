use thiserror::Error;

/// A quadrilateral that cannot be mapped onto the canonical square.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("vertices {0} and {1} coincide")]
    DuplicateVertices(usize, usize),

    #[error("vertices {0}, {1} and {2} are collinear")]
    CollinearVertices(usize, usize, usize),

    #[error("perspective transform is ill-conditioned")]
    IllConditioned,
}

/// Failure to score a rectified region against the template library.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("template library is empty")]
    EmptyLibrary,

    #[error("region is {actual:?} but templates are {expected:?}")]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Why a single candidate was dropped from a frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CandidateError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Match(#[from] MatchError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LibraryError {
    #[error("no card templates were provided")]
    Empty,

    #[error("identity {0:?} appears more than once")]
    DuplicateIdentity(String),

    #[error("canonical size must be positive")]
    ZeroSize,
}
