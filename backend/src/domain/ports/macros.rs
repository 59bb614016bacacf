//! Helper macro for declaring driven-port error enums.
//!
//! Every variant carries named fields and gets a snake_case constructor whose
//! parameters accept anything convertible into the field type, so adapters
//! can write `ConsultationRepositoryError::query("boom")`.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),* $(,)? } => $message:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: $ty),* },
            )*
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = concat!("Build a `", stringify!($variant), "` error.")]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                        Self::$variant { $($field: $field.into()),* }
                    }
                }
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    define_port_error! {
        pub enum SamplePortError {
            Offline { message: String } => "offline: {message}",
            Clash { left: i64, right: i64 } => "clash between {left} and {right}",
            Stale { expected: u32, actual: u32 } => "expected {expected}, found {actual}",
        }
    }

    #[rstest]
    fn constructor_accepts_str_for_string_fields() {
        let err = SamplePortError::offline("pool drained");
        assert_eq!(err.to_string(), "offline: pool drained");
    }

    #[rstest]
    fn constructor_converts_each_field() {
        let err = SamplePortError::clash(3_i32, 4_i64);
        assert_eq!(err, SamplePortError::Clash { left: 3, right: 4 });
    }

    #[rstest]
    fn multi_word_variants_use_snake_case_constructors() {
        let err = SamplePortError::stale(2_u32, 5_u32);
        assert_eq!(err.to_string(), "expected 2, found 5");
    }
}
