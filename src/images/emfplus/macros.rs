/// Declare a closed enumeration carried on the wire as an integer code.
///
/// Generates `from_raw` (lookup, `None` for undefined codes) and a crate
/// private `parse` that turns undefined codes into
/// [`Error::InvalidEnumValue`](crate::common::error::Error::InvalidEnumValue).
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ty {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
        #[repr($repr)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant = $value,
            )+
        }

        impl $name {
            /// Look up a wire code.
            pub const fn from_raw(value: $repr) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Wire code of this value.
            pub const fn raw(self) -> $repr {
                self as $repr
            }

            #[allow(dead_code)]
            pub(crate) fn parse(
                field: &'static str,
                value: $repr,
                offset: usize,
            ) -> $crate::common::error::Result<Self> {
                Self::from_raw(value).ok_or($crate::common::error::Error::InvalidEnumValue {
                    offset,
                    field,
                    value: value as u32,
                    record: None,
                })
            }
        }
    };
}
