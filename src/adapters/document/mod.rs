//! Repositories backed by any [`DocumentStore`](crate::ports::DocumentStore).

mod collections;
mod repository;

pub use collections::{
    DocumentActivityRepository, DocumentAttachmentRepository, DocumentCommentRepository,
    DocumentMemberRepository, DocumentTaskRepository, DocumentUserRepository,
};
pub use repository::DocumentRepository;
