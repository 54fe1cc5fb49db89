//! Domain definitions.

#[macro_use]
mod text;

pub mod crop_type;
pub mod listing;
pub mod parcel;
pub mod reference;
pub mod session;
pub mod user;

pub use self::{
    crop_type::CropType, listing::Listing, parcel::Parcel,
    reference::Reference, session::Session, user::User,
};
