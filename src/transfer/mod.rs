//! Serializable transfer objects for crossing an API boundary.
//!
//! Entity transfer objects mirror the stored records field for field with
//! identifiers and enums flattened to strings. Request objects deserialize
//! inbound payloads and convert into the service request types.

mod dto;
mod error;
mod requests;

pub use dto::{ActivityDto, AttachmentDto, CommentDto, MemberDto, TaskDto, UserDto};
pub use error::TransferError;
pub use requests::{CreateTaskDto, RegisterUserDto, UpdateTaskDto, UpdateUserDto};

#[cfg(test)]
mod tests;
