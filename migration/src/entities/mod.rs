pub mod alias;
pub mod click;

pub use alias::Entity as AliasEntity;
pub use click::Entity as ClickEntity;
