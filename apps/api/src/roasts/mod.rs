pub mod calendar;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod service;
pub mod storage;
pub mod validation;
