use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum ParseErrorKind {
    #[error("Type {type_info} of property `{property}` in {bean} is not supported for injection: {reason}")]
    UnsupportedType {
        bean: TypeInfo,
        property: &'static str,
        type_info: TypeInfo,
        reason: &'static str,
    },
    #[error("Property `{property}` in {bean} is not injectable: {reason}")]
    UnsupportedProperty {
        bean: TypeInfo,
        property: &'static str,
        reason: &'static str,
    },
}
