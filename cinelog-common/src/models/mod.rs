//! Data model shared by the proxy and the client

pub mod candidate;
pub mod entry;
pub mod genres;
pub mod profile;

pub use candidate::{
    normalize_cover_url, CatalogCandidate, Cover, GameCandidate, InvolvedCompany, NamedRef,
    Platform, TitleCandidate,
};
pub use entry::{normalize_rating, Entry, ForeignId, MediaKind};
pub use profile::TasteProfile;
