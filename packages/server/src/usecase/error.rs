//! UseCase 層のエラー定義
//!
//! Coordinator の全ての失敗はこの型で返され、UI 層で網羅的に変換されます。

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{BlobError, RepositoryError, ValueObjectError};

/// One violated field-level rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// Build a violation of `field` from a value object error.
    pub fn from_value_error(field: &str, error: &ValueObjectError) -> Self {
        Self::new(field, error.code(), error.to_string())
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// An active user already uses the name in the room
    DuplicateUsername,
    /// The connection already has a live session
    AlreadyJoined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    UserNotFound,
    MessageNotFound,
    RoomNotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Only the author may remove a message
    MessageIsNotRemoved,
    CantUploadImage(String),
    Storage(String),
}

/// Coordinator error taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("Validation failed: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    #[error("{}", conflict_message(.0))]
    Conflict(ConflictKind),

    #[error("{}", not_found_message(.0))]
    NotFound(NotFoundKind),

    #[error("{}", failure_message(.0))]
    Failure(FailureKind),
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn conflict_message(kind: &ConflictKind) -> &'static str {
    match kind {
        ConflictKind::DuplicateUsername => "Username is already taken in this room",
        ConflictKind::AlreadyJoined => "Connection has already joined a room",
    }
}

fn not_found_message(kind: &NotFoundKind) -> &'static str {
    match kind {
        NotFoundKind::UserNotFound => "User not found",
        NotFoundKind::MessageNotFound => "Message not found",
        NotFoundKind::RoomNotFound => "Room not found",
    }
}

fn failure_message(kind: &FailureKind) -> String {
    match kind {
        FailureKind::MessageIsNotRemoved => "Message can only be removed by its author".to_string(),
        FailureKind::CantUploadImage(reason) => format!("Can't upload image: {reason}"),
        FailureKind::Storage(reason) => format!("Storage failure: {reason}"),
    }
}

impl ChatError {
    /// Single-field validation error
    pub fn invalid(field: &str, error: &ValueObjectError) -> Self {
        ChatError::Validation(vec![FieldViolation::from_value_error(field, error)])
    }

    /// Broad category, stable across releases
    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::Validation(_) => "validation",
            ChatError::Conflict(_) => "conflict",
            ChatError::NotFound(_) => "not_found",
            ChatError::Failure(_) => "failure",
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ChatError::Validation(_) => "VALIDATION_ERROR",
            ChatError::Conflict(ConflictKind::DuplicateUsername) => "DUPLICATE_USERNAME",
            ChatError::Conflict(ConflictKind::AlreadyJoined) => "ALREADY_JOINED",
            ChatError::NotFound(NotFoundKind::UserNotFound) => "USER_NOT_FOUND",
            ChatError::NotFound(NotFoundKind::MessageNotFound) => "MESSAGE_NOT_FOUND",
            ChatError::NotFound(NotFoundKind::RoomNotFound) => "ROOM_NOT_FOUND",
            ChatError::Failure(FailureKind::MessageIsNotRemoved) => "MESSAGE_IS_NOT_REMOVED",
            ChatError::Failure(FailureKind::CantUploadImage(_)) => "CANT_UPLOAD_IMAGE",
            ChatError::Failure(FailureKind::Storage(_)) => "STORAGE_FAILURE",
        }
    }

    /// Field violations; empty for non-validation errors
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            ChatError::Validation(violations) => violations,
            _ => &[],
        }
    }
}

impl From<RepositoryError> for ChatError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::RoomNotFound(_) => ChatError::NotFound(NotFoundKind::RoomNotFound),
            RepositoryError::UserNotFound(_) => ChatError::NotFound(NotFoundKind::UserNotFound),
            RepositoryError::MessageNotFound(_) => {
                ChatError::NotFound(NotFoundKind::MessageNotFound)
            }
            RepositoryError::DuplicateUsername { .. } => {
                ChatError::Conflict(ConflictKind::DuplicateUsername)
            }
            RepositoryError::ConnectionInUse(_) => ChatError::Conflict(ConflictKind::AlreadyJoined),
            RepositoryError::Unavailable(reason) => {
                ChatError::Failure(FailureKind::Storage(reason))
            }
        }
    }
}

impl From<BlobError> for ChatError {
    fn from(error: BlobError) -> Self {
        ChatError::Failure(FailureKind::CantUploadImage(error.to_string()))
    }
}
