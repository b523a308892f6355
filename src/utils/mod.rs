pub mod db_utils;
pub mod files;
pub mod lenient;
pub mod usernames;
