pub mod config;
pub mod db;
pub mod init;
pub mod report;
pub mod run;
