//! Content types and per-cycle cadence configuration

use chrono::NaiveDate;

/// Content types covered by the production cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Photo,
    ShortVideo,
    LongVideo,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [
        ContentType::Photo,
        ContentType::ShortVideo,
        ContentType::LongVideo,
    ];

    /// Logical Drive resource key holding prepared assets of this type
    pub fn folder_key(self) -> &'static str {
        match self {
            ContentType::Photo => "photos",
            ContentType::ShortVideo => "short_videos",
            ContentType::LongVideo => "long_videos",
        }
    }

    /// Property name carrying the per-cycle total on the cadence record
    pub fn target_property(self) -> &'static str {
        match self {
            ContentType::Photo => "Photo Posts",
            ContentType::ShortVideo => "Short Videos",
            ContentType::LongVideo => "Long Videos",
        }
    }

    /// MIME prefixes a ready asset of this type must match
    pub fn mime_prefixes(self) -> &'static [&'static str] {
        match self {
            ContentType::Photo => &["image/"],
            ContentType::ShortVideo | ContentType::LongVideo => &["video/"],
        }
    }

    /// Extensions (lowercase, with dot) a ready asset must carry
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ContentType::Photo => &[".jpg", ".jpeg", ".png"],
            ContentType::ShortVideo | ContentType::LongVideo => &[".mp4", ".mov"],
        }
    }

    /// Short label for identifiers and logs
    pub fn label(self) -> &'static str {
        match self {
            ContentType::Photo => "photos",
            ContentType::ShortVideo => "short videos",
            ContentType::LongVideo => "long videos",
        }
    }
}

/// Cadence configuration read from a client's cadence record.
/// Never stored locally; fetched fresh on every audit.
#[derive(Debug, Clone, PartialEq)]
pub struct CadenceConfig {
    /// First Monday of the client's first cycle
    pub cycle_start: NaiveDate,
    /// Per-type totals to deliver over one 4-week cycle
    pub photo_posts: u32,
    pub short_videos: u32,
    pub long_videos: u32,
}

impl CadenceConfig {
    pub fn target_for(&self, content_type: ContentType) -> u32 {
        match content_type {
            ContentType::Photo => self.photo_posts,
            ContentType::ShortVideo => self.short_videos,
            ContentType::LongVideo => self.long_videos,
        }
    }
}
