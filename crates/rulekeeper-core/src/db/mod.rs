pub(crate) mod converter;
pub mod entity;
pub mod schema;

pub use entity as rule;
pub use schema::init_schema;
