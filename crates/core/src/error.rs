use thiserror::Error;

use crate::model::{ItemError, ParseIdError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Item(#[from] ItemError),
    #[error(transparent)]
    ParseId(#[from] ParseIdError),
}
