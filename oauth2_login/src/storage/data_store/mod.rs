mod config;
mod types;

pub(crate) use config::{DB_TABLE_LOGIN_PROVIDERS, GENERIC_DATA_STORE};
