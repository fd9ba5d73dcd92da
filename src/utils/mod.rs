pub mod db_utils;
pub mod token_store;
