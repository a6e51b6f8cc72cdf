// Copyright 2024 The MQMaster Rust Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Defines a `#[repr(i32)]` code enum together with its integer conversions.
///
/// Unknown integers fall back to the variant named by `default`.
macro_rules! define_error_code {
    (
        $(#[$enum_meta:meta])*
        pub enum $enum_name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident = $value:expr
            ),* $(,)?
        },
        default = $default:ident
    ) => {
        $(#[$enum_meta])*
        #[repr(i32)]
        pub enum $enum_name {
            $(
                $(#[$variant_meta])*
                $variant = $value,
            )*
        }

        impl From<$enum_name> for i32 {
            #[inline]
            fn from(value: $enum_name) -> Self {
                value as i32
            }
        }

        impl From<i32> for $enum_name {
            #[inline]
            fn from(value: i32) -> Self {
                match value {
                    $($value => $enum_name::$variant,)*
                    _ => $enum_name::$default,
                }
            }
        }

        impl $enum_name {
            #[inline]
            pub const fn to_i32(self) -> i32 {
                self as i32
            }

            #[inline]
            pub const fn is_success(&self) -> bool {
                matches!(self, Self::Success)
            }
        }
    };
}

define_error_code! {
    /// Numeric result codes reported to administrative and consumer callers.
    #[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
    pub enum ErrorCode {
        Success = 200,
        BadRequest = 400,
        NotExist = 401,
        AlreadyExists = 402,
        Unchanged = 403,
        IllegalStatus = 404,
        IllegalValue = 405,
        /// The consumer group may not consume the requested topic.
        Forbidden = 450,
        /// The consumer group may consume the topic, but not with the requested filters.
        ContentForbidden = 455,
        InternalError = 500,
        Unavailable = 503,
    },
    default = InternalError
}

impl ErrorCode {
    /// Short description used when no detail is supplied.
    pub const fn description(&self) -> &'static str {
        match self {
            ErrorCode::Success => "Success",
            ErrorCode::BadRequest => "Bad request",
            ErrorCode::NotExist => "Record not exist",
            ErrorCode::AlreadyExists => "Record has existed",
            ErrorCode::Unchanged => "Record not changed",
            ErrorCode::IllegalStatus => "Illegal status",
            ErrorCode::IllegalValue => "Illegal value",
            ErrorCode::Forbidden => "Consume group forbidden",
            ErrorCode::ContentForbidden => "Consume content forbidden",
            ErrorCode::InternalError => "Internal error",
            ErrorCode::Unavailable => "Store unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip_through_i32() {
        for code in [
            ErrorCode::Success,
            ErrorCode::NotExist,
            ErrorCode::IllegalValue,
            ErrorCode::ContentForbidden,
            ErrorCode::Unavailable,
        ] {
            assert_eq!(ErrorCode::from(i32::from(code)), code);
        }
    }

    #[test]
    fn test_unknown_code_falls_back_to_internal_error() {
        assert_eq!(ErrorCode::from(12345), ErrorCode::InternalError);
        assert_eq!(ErrorCode::Forbidden.to_i32(), 450);
    }

    #[test]
    fn test_only_success_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unchanged.is_success());
    }
}
