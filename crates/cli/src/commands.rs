pub mod group;
pub mod list;
pub mod post;
pub mod vote;
