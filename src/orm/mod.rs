pub mod collections;
pub mod comments;
pub mod follows;
pub mod notifications;
pub mod photo_tags;
pub mod photos;
pub mod roles;
pub mod tags;
pub mod users;
