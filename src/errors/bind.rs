use crate::any::{BeanName, TypeInfo};

#[derive(thiserror::Error, Debug)]
pub enum BindErrorKind {
    #[error("Property value for `{key}` is required by {bean}, but it's not found")]
    MissingRequiredProperty { bean: BeanName, key: &'static str },
    #[error("Property `{property}` in {bean} can't be bound, conversion to {type_info} isn't supported")]
    UnsupportedConversion {
        bean: BeanName,
        property: &'static str,
        type_info: TypeInfo,
    },
    #[error("Property value `{value}` for `{key}` can't be converted to {type_info}: {source}")]
    InvalidPropertyValue {
        key: &'static str,
        value: String,
        type_info: TypeInfo,
        source: anyhow::Error,
    },
}
