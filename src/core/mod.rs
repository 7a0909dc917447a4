pub mod access;
pub mod approval;
pub mod db;
pub mod security;
pub mod session;
pub mod sqlx_utils;
pub mod test_utils;
pub mod utils;
