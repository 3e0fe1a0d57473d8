//! Ordered query parameters and query-string serialization.

use url::form_urlencoded;

/// A value that may appear in a query string.
///
/// Returning `None` drops the parameter. Strings that are empty are dropped
/// as well; numbers and booleans (including `0` and `false`) are always kept.
pub trait ParamValue {
    fn to_param(&self) -> Option<String>;
}

impl ParamValue for str {
    fn to_param(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl ParamValue for String {
    fn to_param(&self) -> Option<String> {
        self.as_str().to_param()
    }
}

impl ParamValue for bool {
    fn to_param(&self) -> Option<String> {
        Some(self.to_string())
    }
}

macro_rules! numeric_param {
    ($($t:ty),*) => {
        $(
            impl ParamValue for $t {
                fn to_param(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

numeric_param!(i32, i64, u32, u64, usize);

impl<T: ParamValue + ?Sized> ParamValue for &T {
    fn to_param(&self) -> Option<String> {
        (**self).to_param()
    }
}

impl<T: ParamValue> ParamValue for Option<T> {
    fn to_param(&self) -> Option<String> {
        self.as_ref().and_then(|v| v.to_param())
    }
}

/// Query parameters in insertion order.
///
/// Skipped values are remembered as absent so that the parameter set used for
/// a cache key matches the one sent on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(String, Option<String>)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter, builder style.
    pub fn with(mut self, key: &str, value: impl ParamValue) -> Self {
        self.push(key, value);
        self
    }

    /// Appends a parameter.
    pub fn push(&mut self, key: &str, value: impl ParamValue) {
        self.pairs.push((key.to_string(), value.to_param()));
    }

    /// Parameters that will actually be sent, in insertion order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
    }

    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }

    /// Serializes the present parameters as `a=1&b=2`, without a leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.present() {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}
