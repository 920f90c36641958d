use super::{BindErrorKind, ParseErrorKind, RegistryErrorKind, ResolveErrorKind};

#[derive(thiserror::Error, Debug)]
pub enum ProcessErrorKind {
    #[error(transparent)]
    Registry(#[from] RegistryErrorKind),
    #[error(transparent)]
    Resolve(#[from] ResolveErrorKind),
    #[error(transparent)]
    Parse(#[from] ParseErrorKind),
    #[error(transparent)]
    Bind(#[from] BindErrorKind),
    #[error("Post processor {processor} failed: {source}")]
    Other {
        processor: &'static str,
        source: anyhow::Error,
    },
}
