use super::{BindErrorKind, InstantiateErrorKind, ParseErrorKind, ProcessErrorKind, RegistryErrorKind, ResolveErrorKind};

#[derive(thiserror::Error, Debug)]
pub enum BootstrapErrorKind {
    #[error(transparent)]
    Registry(#[from] RegistryErrorKind),
    #[error(transparent)]
    Parse(#[from] ParseErrorKind),
    #[error(transparent)]
    Resolve(#[from] ResolveErrorKind),
    #[error(transparent)]
    Instantiate(#[from] InstantiateErrorKind),
    #[error(transparent)]
    Process(#[from] ProcessErrorKind),
}

impl From<BindErrorKind> for BootstrapErrorKind {
    fn from(err: BindErrorKind) -> Self {
        Self::Process(ProcessErrorKind::Bind(err))
    }
}

impl BootstrapErrorKind {
    /// Errors raised by the resolution engine may be wrapped by a processor, this looks through the wrapping
    #[must_use]
    pub fn as_resolve(&self) -> Option<&ResolveErrorKind> {
        match self {
            Self::Resolve(err) | Self::Process(ProcessErrorKind::Resolve(err)) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_registry(&self) -> Option<&RegistryErrorKind> {
        match self {
            Self::Registry(err)
            | Self::Resolve(ResolveErrorKind::Registry(err))
            | Self::Process(ProcessErrorKind::Registry(err) | ProcessErrorKind::Resolve(ResolveErrorKind::Registry(err))) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_parse(&self) -> Option<&ParseErrorKind> {
        match self {
            Self::Parse(err) | Self::Process(ProcessErrorKind::Parse(err)) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bind(&self) -> Option<&BindErrorKind> {
        match self {
            Self::Process(ProcessErrorKind::Bind(err)) => Some(err),
            _ => None,
        }
    }
}
