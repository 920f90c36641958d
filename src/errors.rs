mod bind;
mod bootstrap;
mod instantiate;
mod parse;
mod process;
mod registry;
mod resolve;

pub use bind::BindErrorKind;
pub use bootstrap::BootstrapErrorKind;
pub use instantiate::InstantiateErrorKind;
pub use parse::ParseErrorKind;
pub use process::ProcessErrorKind;
pub use registry::RegistryErrorKind;
pub use resolve::ResolveErrorKind;
