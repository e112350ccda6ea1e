pub mod access_log;
pub mod member;
pub mod scan;
