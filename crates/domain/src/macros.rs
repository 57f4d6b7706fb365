//! Macro for implementing Display and FromStr for label enums
//!
//! Wire-level enums (message roles, failure reasons) are written and parsed
//! as lowercase labels. This macro provides both conversions from a single
//! mapping.
//!
//! # Example
//!
//! ```rust
//! use parley_domain::impl_domain_label_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Channel {
//!     Primary,
//!     Fallback,
//! }
//!
//! impl_domain_label_conversions!(Channel {
//!     Primary => "primary",
//!     Fallback => "fallback",
//! });
//!
//! assert_eq!(Channel::Fallback.to_string(), "fallback");
//! assert_eq!("PRIMARY".parse::<Channel>(), Ok(Channel::Primary));
//! ```

/// Implements Display and FromStr traits for label enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their lowercase labels
///
/// Parsing is case-insensitive; the error names the enum and the rejected
/// input.
#[macro_export]
macro_rules! impl_domain_label_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Lowercase wire label.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = ::std::string::String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => ::std::result::Result::Ok(Self::$variant),)+
                    _ => ::std::result::Result::Err(::std::format!(
                        "Invalid {}: {}",
                        stringify!($enum_name),
                        s
                    )),
                }
            }
        }
    };
}
