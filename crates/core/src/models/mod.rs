//! API wire models.
//!
//! These are the JSON shapes exchanged between the server and its clients.
//! Field names are camelCase on the wire (`displayName`, `plantId`,
//! `nextCursor`) with the exception of `photoURL`.

pub mod order;
pub mod plant;
pub mod stats;
pub mod user;

pub use order::{NewOrder, Order, OrderWithPlant, StatusUpdate};
pub use plant::{
    ContactInfo, InsertedId, NewPlant, Plant, PlantPage, PlantValidationError, StockUpdate,
};
pub use stats::AdminStats;
pub use user::{IdentityPayload, NewUser, RoleInfo, RoleUpdate, User};
