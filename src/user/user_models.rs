use serde::Serialize;

/// A song the user liked, as shown in their liked-songs list.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LikedSongListing {
    pub song_id: i64,
    pub song_title: String,
}
