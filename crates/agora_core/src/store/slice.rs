//! Slice values and typed projections.

use crate::model::community::Community;
use crate::model::content::{Comment, Post};
use crate::model::user::SessionUser;
use crate::model::vote::VoteBook;
use crate::store::registry::SliceName;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Identity of one slice in the state object.
///
/// `AdHoc` slices only exist under permissive key resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SliceId {
    Known(SliceName),
    AdHoc(String),
}

impl Display for SliceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(name) => f.write_str(name.as_str()),
            Self::AdHoc(name) => f.write_str(name),
        }
    }
}

/// Value held by one slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SliceValue {
    Communities(Vec<Community>),
    Posts(Vec<Post>),
    Comments(Vec<Comment>),
    CurrentUser(Option<SessionUser>),
    Votes(VoteBook),
    AdHoc(serde_json::Value),
}

impl SliceValue {
    /// Returns whether this value may be stored under `slice`.
    pub fn fits(&self, slice: &SliceId) -> bool {
        matches!(
            (self, slice),
            (Self::Communities(_), SliceId::Known(SliceName::Communities))
                | (Self::Posts(_), SliceId::Known(SliceName::Posts))
                | (Self::Comments(_), SliceId::Known(SliceName::Comments))
                | (Self::CurrentUser(_), SliceId::Known(SliceName::CurrentUser))
                | (Self::Votes(_), SliceId::Known(SliceName::Votes))
                | (Self::AdHoc(_), SliceId::AdHoc(_))
        )
    }
}

/// Rust types that can be read from and written to a slice.
pub trait SliceData: Clone + 'static {
    /// Borrows the typed value, or `None` when the variant differs.
    fn project(value: &SliceValue) -> Option<&Self>;
    fn into_slice(self) -> SliceValue;
}

macro_rules! slice_data {
    ($ty:ty, $variant:ident) => {
        impl SliceData for $ty {
            fn project(value: &SliceValue) -> Option<&Self> {
                match value {
                    SliceValue::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn into_slice(self) -> SliceValue {
                SliceValue::$variant(self)
            }
        }
    };
}

slice_data!(Vec<Community>, Communities);
slice_data!(Vec<Post>, Posts);
slice_data!(Vec<Comment>, Comments);
slice_data!(Option<SessionUser>, CurrentUser);
slice_data!(VoteBook, Votes);
slice_data!(serde_json::Value, AdHoc);

#[cfg(test)]
mod tests {
    use super::{SliceData, SliceId, SliceValue};
    use crate::model::content::Post;
    use crate::store::registry::SliceName;

    #[test]
    fn projection_rejects_other_variants() {
        let value = SliceValue::Posts(Vec::new());
        assert!(<Vec<Post>>::project(&value).is_some());
        assert!(<serde_json::Value>::project(&value).is_none());
    }

    #[test]
    fn fits_pairs_variants_with_slices() {
        let posts = SliceValue::Posts(Vec::new());
        assert!(posts.fits(&SliceId::Known(SliceName::Posts)));
        assert!(!posts.fits(&SliceId::Known(SliceName::Comments)));
        assert!(!posts.fits(&SliceId::AdHoc("posts".to_string())));
        assert!(SliceValue::AdHoc(serde_json::Value::Null).fits(&SliceId::AdHoc("x".to_string())));
    }
}
