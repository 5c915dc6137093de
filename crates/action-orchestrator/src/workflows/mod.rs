pub mod claims;
pub mod completion;
pub mod evidence;
pub mod notice;
pub mod orchestration;
pub mod storage;

pub use notice::{Notice, NoticeLevel};
pub use storage::RepositoryError;
