//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::error::ValueObjectError;

/// Minimum number of characters in a username
pub const USERNAME_MIN_LEN: usize = 3;
/// Maximum number of characters in a username
pub const USERNAME_MAX_LEN: usize = 20;
/// Minimum number of characters in a room name
pub const ROOM_NAME_MIN_LEN: usize = 3;
/// Maximum number of characters in a room name
pub const ROOM_NAME_MAX_LEN: usize = 30;
/// Maximum number of characters in a text message
pub const MESSAGE_TEXT_MAX_LEN: usize = 150;
/// Maximum number of characters in an image or avatar URL
pub const URL_MAX_LEN: usize = 2048;

/// Defines a UUID-backed identifier value object.
macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse from the hyphenated string form.
            pub fn parse(value: &str) -> Result<Self, ValueObjectError> {
                Uuid::parse_str(value)
                    .map(Self)
                    .map_err(|_| ValueObjectError::IdInvalidFormat {
                        kind: stringify!($name),
                        value: value.to_string(),
                    })
            }

            /// Get the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }
    };
}

uuid_identifier!(
    /// Room identifier, stable for the lifetime of the room.
    RoomId
);
uuid_identifier!(
    /// User identifier, stable for the lifetime of a session.
    UserId
);
uuid_identifier!(
    /// Message identifier.
    MessageId
);
uuid_identifier!(
    /// Opaque handle of one live transport connection.
    ConnectionId
);

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == ' ' || c == '_' || c == '-'
}

/// Username value object.
///
/// Unique within a room among active users, not globally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Create a new Username.
    ///
    /// Surrounding whitespace is trimmed before validation.
    ///
    /// # Arguments
    ///
    /// * `name` - The username string
    ///
    /// # Returns
    ///
    /// A Result containing the Username or an error if validation fails
    pub fn new(name: String) -> Result<Self, ValueObjectError> {
        let name = name.trim().to_string();
        let len = name.chars().count();
        if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
            return Err(ValueObjectError::UsernameLength {
                min: USERNAME_MIN_LEN,
                max: USERNAME_MAX_LEN,
                actual: len,
            });
        }
        if !name.chars().all(is_name_char) {
            return Err(ValueObjectError::UsernameCharset);
        }
        Ok(Self(name))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Room name value object.
///
/// Human-chosen and unique across live rooms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomName(String);

impl RoomName {
    /// Create a new RoomName.
    ///
    /// Surrounding whitespace is trimmed before validation.
    pub fn new(name: String) -> Result<Self, ValueObjectError> {
        let name = name.trim().to_string();
        let len = name.chars().count();
        if !(ROOM_NAME_MIN_LEN..=ROOM_NAME_MAX_LEN).contains(&len) {
            return Err(ValueObjectError::RoomNameLength {
                min: ROOM_NAME_MIN_LEN,
                max: ROOM_NAME_MAX_LEN,
                actual: len,
            });
        }
        if !name.chars().all(is_name_char) {
            return Err(ValueObjectError::RoomNameCharset);
        }
        Ok(Self(name))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for RoomName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Text message body value object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageText(String);

impl MessageText {
    /// Create a new MessageText.
    ///
    /// Length is counted in characters. Whitespace-only text counts as empty.
    pub fn new(text: String) -> Result<Self, ValueObjectError> {
        if text.trim().is_empty() {
            return Err(ValueObjectError::MessageTextEmpty);
        }
        let len = text.chars().count();
        if len > MESSAGE_TEXT_MAX_LEN {
            return Err(ValueObjectError::MessageTextTooLong {
                max: MESSAGE_TEXT_MAX_LEN,
                actual: len,
            });
        }
        Ok(Self(text))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for MessageText {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// URL of an uploaded image or avatar.
///
/// Absolute `http(s)` URLs and server-relative paths are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl(String);

impl ImageUrl {
    /// Create a new ImageUrl.
    pub fn new(url: String) -> Result<Self, ValueObjectError> {
        let url = url.trim().to_string();
        if url.is_empty() {
            return Err(ValueObjectError::UrlEmpty);
        }
        let len = url.chars().count();
        if len > URL_MAX_LEN {
            return Err(ValueObjectError::UrlTooLong {
                max: URL_MAX_LEN,
                actual: len,
            });
        }
        let accepted = url.starts_with("http://")
            || url.starts_with("https://")
            || (url.starts_with('/') && !url.starts_with("//"));
        if !accepted {
            return Err(ValueObjectError::UrlInvalidScheme);
        }
        Ok(Self(url))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ImageUrl {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Timestamp value object.
///
/// Represents a Unix timestamp in milliseconds (JST).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a new Timestamp.
    ///
    /// # Arguments
    ///
    /// * `value` - Unix timestamp in milliseconds
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Current server time.
    pub fn now() -> Self {
        Self(hiroba_shared::time::get_jst_timestamp())
    }

    /// Get the inner i64 value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
