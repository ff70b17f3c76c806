use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("state shape mismatch: expected {expected} {field} entries, got {actual}")]
    StateShape {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
    #[error("duplicate {kind} name `{name}`")]
    DuplicateName { kind: &'static str, name: String },
    #[error("joint range is empty: [{low}, {high}]")]
    EmptyRange { low: f64, high: f64 },
    #[error("joint axis must be non-zero")]
    ZeroAxis,
    #[error("timestep must be finite and positive, got {0}")]
    InvalidTimestep(f64),
    #[error("scene has no `{0}`")]
    MissingPart(&'static str),
}
