pub mod account;
pub mod app_config;
pub mod collect;
pub mod db;
pub mod email;
pub mod filesystem;
pub mod follow;
pub mod middleware;
pub mod notifications;
pub mod orm;
pub mod permission;
pub mod photo;
pub mod search;
pub mod session;
pub mod tag;
pub mod token;
pub mod web;
