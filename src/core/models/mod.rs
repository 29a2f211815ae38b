pub mod category;
pub mod friend;
pub mod obligation;
pub mod scholarship;
pub mod settlement;
pub mod transaction;
pub mod user;
