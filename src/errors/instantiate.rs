use crate::any::{BeanName, TypeInfo};

#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error("Bean {name} has no parameterless constructor")]
    NoConstructor { name: BeanName },
    #[error("Bean {name} was replaced by an instance that can't be viewed as {expected}")]
    IncorrectType { name: BeanName, expected: TypeInfo },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
