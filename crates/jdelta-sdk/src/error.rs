use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("diff error: {0}")]
    Diff(#[from] jdelta_diff::DiffError),

    #[error("patch error: {0}")]
    Patch(#[from] jdelta_patch::PatchError),

    #[error("path error: {0}")]
    Path(#[from] jdelta_path::PathError),

    #[error("invalid changeset: {0}")]
    Changeset(#[from] jdelta_types::TypeError),
}

pub type SdkResult<T> = Result<T, SdkError>;
