//! [`Sale`] listing definitions.

use super::{Descriptor, Kind};

/// [`Listing`] of a crop offered for sale by its grower.
///
/// [`Listing`]: super::Listing
#[derive(Clone, Copy, Debug)]
pub struct Sale;

impl Descriptor for Sale {
    const KIND: Kind = Kind::Sale;
    const HAS_PARCEL: bool = true;

    type Attributes = Attributes;
    type Patch = Option<Photo>;

    fn apply(attributes: &mut Attributes, patch: Option<Photo>) {
        if let Some(photo) = patch {
            attributes.photo = Some(photo);
        }
    }
}

/// [`Sale`]-specific attributes.
#[derive(Clone, Debug, Default)]
pub struct Attributes {
    /// [`Photo`] of the crop on sale.
    pub photo: Option<Photo>,
}

define_text! {
    #[doc = "Reference (path or URL) to a photo of a crop on [`Sale`]."]
    pub struct Photo(check = crate::domain::text::is_resource_ref);
}
