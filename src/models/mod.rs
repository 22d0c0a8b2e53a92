pub mod inventory;
pub mod trip;
pub mod user;

pub use inventory::{
    default_pallet_types, InventoryRecord, PalletCondition, PalletStatus, PalletType,
};
pub use trip::{active_trip_id, Trip, TripStatus};
pub use user::{default_users, UserCredentials, UserRole};
