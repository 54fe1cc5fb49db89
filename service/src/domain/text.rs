//! Macro for defining validated text newtypes.

/// Defines a [`String`] newtype accepting only values passing the `check`.
macro_rules! define_text {
    (
        #[doc = $doc:literal]
        pub struct $name:ident(check = $check:path);
    ) => {
        #[doc = $doc]
        #[derive(
            ::derive_more::AsRef,
            Clone,
            Debug,
            ::derive_more::Display,
            Eq,
            Hash,
            ::derive_more::Into,
            PartialEq,
        )]
        #[cfg_attr(
            feature = "postgres",
            derive(::postgres_types::FromSql, ::postgres_types::ToSql),
            postgres(transparent),
        )]
        #[as_ref(str, String)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!(
                "Creates a new [`", stringify!($name), "`] if the given ",
                "`value` is valid.",
            )]
            #[must_use]
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let value = value.into();
                $check(&value).then_some(Self(value))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s).ok_or(concat!("invalid `", stringify!($name), "`"))
            }
        }
    };
}

/// Checks whether the `value` is a short single-line label: non-empty, without
/// surrounding whitespace and at most 512 bytes long.
pub(crate) fn is_label(value: &str) -> bool {
    value.trim() == value && !value.is_empty() && value.len() <= 512
}

/// Checks whether the `value` is a free-form text of at most 4096 bytes.
pub(crate) fn is_free_text(value: &str) -> bool {
    value.len() <= 4096
}

/// Checks whether the `value` is a resource reference (a path or an URL):
/// non-empty, without whitespace and at most 2048 bytes long.
pub(crate) fn is_resource_ref(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 2048
        && !value.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod spec {
    use super::{is_free_text, is_label, is_resource_ref};

    #[test]
    fn label() {
        assert!(is_label("disponible"));
        assert!(is_label("en cours"));
        assert!(!is_label(""));
        assert!(!is_label(" disponible"));
        assert!(!is_label("disponible\n"));
        assert!(!is_label(&"a".repeat(513)));
    }

    #[test]
    fn free_text() {
        assert!(is_free_text(""));
        assert!(is_free_text("  Maïs séché, récolte 2024  "));
        assert!(!is_free_text(&"a".repeat(4097)));
    }

    #[test]
    fn resource_ref() {
        assert!(is_resource_ref("/static/mais.jpg"));
        assert!(!is_resource_ref(""));
        assert!(!is_resource_ref("mon image.jpg"));
    }
}
