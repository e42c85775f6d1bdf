pub mod load;
pub mod util;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type LoadResult<T> = std::result::Result<T, Error>;
