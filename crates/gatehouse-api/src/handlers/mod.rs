pub mod csrf;
pub mod health;
pub mod join;
pub mod upload_url;
