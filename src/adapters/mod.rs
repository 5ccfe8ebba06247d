//! Adapter implementations of the persistence ports.

pub mod document;
pub mod memory;
mod transaction;
mod unit_of_work;

pub use transaction::TransactionSlot;
pub use unit_of_work::DocumentUnitOfWork;

#[cfg(test)]
mod tests;
