//! Domain services orchestrating the unit of work.
//!
//! Each service validates referenced records before writing, appends one
//! activity per mutation, and reports failures as [`ServiceError`] values with
//! numeric codes. The task and user services wrap their results in a
//! [`ServiceResponse`] envelope.

mod activity;
mod attachment;
mod cascade;
mod comment;
mod error;
mod lookup;
mod member;
mod response;
mod task;
mod user;

pub use activity::ActivityService;
pub use attachment::AttachmentService;
pub use cascade::{CascadeError, CascadeReport, CascadeStep};
pub use comment::CommentService;
pub use error::{EntityKind, ErrorKind, ServiceError, ServiceResult};
pub use member::MemberService;
pub use response::ServiceResponse;
pub use task::{CreateTaskRequest, TaskService, TaskSettings};
pub use user::{RegisterUserRequest, UserDetails, UserService};

#[cfg(test)]
mod tests;
