/// Constructor and emptiness check for `String` newtypes such as form
/// names and widget ids, which default to the empty string.
#[macro_export]
macro_rules! impl_string_newtype {
    ($name:ty) => {
        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn is_unset(&self) -> bool {
                self.0.trim().is_empty()
            }
        }
    };
}
