use std::{
    any::{Any, TypeId},
    collections::BTreeMap,
    fmt::{self, Debug, Formatter},
    marker::PhantomData,
    str::FromStr,
    sync::Arc,
};

use crate::any::TypeInfo;

/// Converts a property string to a typed value, returned boxed
pub trait Converter: Send + Sync {
    /// # Errors
    /// Returns an error if the value can't be converted
    fn convert(&self, value: &str) -> Result<Box<dyn Any>, anyhow::Error>;
}

impl<F, T> Converter for F
where
    F: Fn(&str) -> Result<T, anyhow::Error> + Send + Sync,
    T: 'static,
{
    #[inline]
    fn convert(&self, value: &str) -> Result<Box<dyn Any>, anyhow::Error> {
        self(value).map(|value| Box::new(value) as Box<dyn Any>)
    }
}

/// Converter for any type parsed with [`FromStr`]
pub struct FromStrConverter<T>(PhantomData<fn() -> T>);

impl<T> FromStrConverter<T> {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for FromStrConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Converter for FromStrConverter<T>
where
    T: FromStr + 'static,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    fn convert(&self, value: &str) -> Result<Box<dyn Any>, anyhow::Error> {
        let value = value.parse::<T>()?;
        Ok(Box::new(value))
    }
}

/// Converters keyed by the type they produce
#[derive(Clone)]
pub struct Converters {
    converters: BTreeMap<TypeId, (TypeInfo, Arc<dyn Converter>)>,
}

impl Default for Converters {
    fn default() -> Self {
        Self::new()
    }
}

impl Converters {
    /// Table with converters for `String`, `bool`, `char` and every integer and float primitive
    #[must_use]
    pub fn new() -> Self {
        Self::empty()
            .with::<String>(FromStrConverter::<String>::new())
            .with::<bool>(FromStrConverter::<bool>::new())
            .with::<char>(FromStrConverter::<char>::new())
            .with::<i8>(FromStrConverter::<i8>::new())
            .with::<i16>(FromStrConverter::<i16>::new())
            .with::<i32>(FromStrConverter::<i32>::new())
            .with::<i64>(FromStrConverter::<i64>::new())
            .with::<i128>(FromStrConverter::<i128>::new())
            .with::<isize>(FromStrConverter::<isize>::new())
            .with::<u8>(FromStrConverter::<u8>::new())
            .with::<u16>(FromStrConverter::<u16>::new())
            .with::<u32>(FromStrConverter::<u32>::new())
            .with::<u64>(FromStrConverter::<u64>::new())
            .with::<u128>(FromStrConverter::<u128>::new())
            .with::<usize>(FromStrConverter::<usize>::new())
            .with::<f32>(FromStrConverter::<f32>::new())
            .with::<f64>(FromStrConverter::<f64>::new())
    }

    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self { converters: BTreeMap::new() }
    }

    /// Sets the converter producing `T`, replacing the previous one
    #[inline]
    #[must_use]
    pub fn with<T: 'static>(mut self, converter: impl Converter + 'static) -> Self {
        self.insert::<T>(converter);
        self
    }

    #[inline]
    pub fn insert<T: 'static>(&mut self, converter: impl Converter + 'static) {
        self.converters.insert(TypeId::of::<T>(), (TypeInfo::of::<T>(), Arc::new(converter)));
    }

    #[inline]
    #[must_use]
    pub fn get(&self, type_id: TypeId) -> Option<&dyn Converter> {
        self.converters.get(&type_id).map(|(_, converter)| &**converter)
    }

    #[inline]
    #[must_use]
    pub fn supports(&self, type_id: TypeId) -> bool {
        self.converters.contains_key(&type_id)
    }
}

impl Debug for Converters {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.converters.values().map(|(type_info, _)| type_info.name)).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Converters;

    use std::any::TypeId;

    #[derive(Debug, PartialEq)]
    struct Port(u16);

    #[test]
    fn test_builtin() {
        let converters = Converters::new();

        let value = converters.get(TypeId::of::<u32>()).unwrap().convert("42").unwrap();
        assert_eq!(*value.downcast::<u32>().unwrap(), 42);

        let value = converters.get(TypeId::of::<f64>()).unwrap().convert("1.5").unwrap();
        assert_eq!(*value.downcast::<f64>().unwrap(), 1.5);

        let value = converters.get(TypeId::of::<String>()).unwrap().convert("text").unwrap();
        assert_eq!(*value.downcast::<String>().unwrap(), "text");

        assert!(converters.get(TypeId::of::<u8>()).unwrap().convert("300").is_err());
        assert!(converters.get(TypeId::of::<bool>()).unwrap().convert("yes").is_err());
        assert!(!converters.supports(TypeId::of::<Port>()));
    }

    #[test]
    fn test_custom() {
        let converters = Converters::new().with::<Port>(|value: &str| -> anyhow::Result<Port> {
            let port = value.trim_start_matches(':').parse()?;
            Ok(Port(port))
        });

        let value = converters.get(TypeId::of::<Port>()).unwrap().convert(":8080").unwrap();
        assert_eq!(*value.downcast::<Port>().unwrap(), Port(8080));
    }
}
