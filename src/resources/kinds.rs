//! Per-kind rule tables driving the generic resource handler.

/// How a kind treats the `approved` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    /// No moderation.
    None,
    /// Created unapproved; only `approve` flips it.
    AlwaysPending,
    /// Creator may set it; defaults to unapproved.
    CallerChoice,
}

impl Approval {
    pub fn is_moderated(self) -> bool {
        self != Approval::None
    }
}

/// A field restricted to a closed set of string values.
#[derive(Debug, Clone, Copy)]
pub struct FieldChoices {
    pub field: &'static str,
    pub allowed: &'static [&'static str],
}

#[derive(Debug)]
pub struct ResourceKind {
    /// Human name used in messages ("Project created successfully").
    pub label: &'static str,
    pub collection: &'static str,
    pub path: &'static str,
    pub required: &'static [&'static str],
    pub choices: &'static [FieldChoices],
    /// Keys that clients can never write.
    pub immutable: &'static [&'static str],
    /// Field stamped with the creation time.
    pub stamp: Option<&'static str>,
    pub approval: Approval,
    /// Sort field and whether it is descending.
    pub order: Option<(&'static str, bool)>,
    /// Singleton kinds only: what a read returns before the first save.
    pub defaults: &'static [(&'static str, &'static str)],
}

pub const APPROVED_FIELD: &str = "approved";
pub const CREATED_AT_FIELD: &str = "createdAt";

const LINKED_WORK: &[&str] = &["title", "description", "spotify_link", "youtube_link"];

pub const PROJECTS: ResourceKind = ResourceKind {
    label: "Project",
    collection: "projects",
    path: "/projects",
    required: LINKED_WORK,
    choices: &[],
    immutable: &[],
    stamp: None,
    approval: Approval::None,
    order: None,
    defaults: &[],
};

pub const PORTFOLIO: ResourceKind = ResourceKind {
    label: "Portfolio item",
    collection: "portfolio",
    path: "/portfolio",
    required: LINKED_WORK,
    choices: &[],
    immutable: &[],
    stamp: None,
    approval: Approval::None,
    order: None,
    defaults: &[],
};

pub const TESTIMONIALS: ResourceKind = ResourceKind {
    label: "Testimonial",
    collection: "testimonials",
    path: "/testimonials",
    required: &["name", "rating", "comment"],
    choices: &[],
    immutable: &[CREATED_AT_FIELD],
    stamp: Some(CREATED_AT_FIELD),
    approval: Approval::AlwaysPending,
    order: None,
    defaults: &[],
};

pub const SOCIAL_LINKS: ResourceKind = ResourceKind {
    label: "Social links",
    collection: "social_links",
    path: "/social-links",
    required: &[],
    choices: &[],
    immutable: &[],
    stamp: None,
    approval: Approval::None,
    order: None,
    defaults: &[],
};

pub const STUDIO_CONFIG: ResourceKind = ResourceKind {
    label: "Studio config",
    collection: "studio_config",
    path: "/studio-config",
    required: &[],
    choices: &[],
    immutable: &[],
    stamp: None,
    approval: Approval::None,
    order: None,
    defaults: &[("youtubeVideoId", "dQw4w9WgXcQ")],
};

pub const SPOTIFY_TRACKS: ResourceKind = ResourceKind {
    label: "Spotify track",
    collection: "spotify_tracks",
    path: "/spotify-tracks",
    required: &["title", "artist", "spotifyId"],
    choices: &[],
    immutable: &[],
    stamp: None,
    approval: Approval::None,
    order: None,
    defaults: &[],
};

pub const YOUTUBE_VIDEOS: ResourceKind = ResourceKind {
    label: "Video",
    collection: "youtube_videos",
    path: "/youtube-videos",
    required: &["title", "type", "youtubeId"],
    choices: &[FieldChoices {
        field: "type",
        allowed: &["video", "playlist"],
    }],
    immutable: &[],
    stamp: None,
    approval: Approval::None,
    order: None,
    defaults: &[],
};

pub const FILES: ResourceKind = ResourceKind {
    label: "File",
    collection: "files",
    path: "/files",
    required: &["title", "description", "file_type"],
    choices: &[],
    immutable: &["filename", "download_url", "upload_date"],
    stamp: Some("upload_date"),
    approval: Approval::None,
    order: None,
    defaults: &[],
};

pub const BLOG_POSTS: ResourceKind = ResourceKind {
    label: "Blog post",
    collection: "blog_posts",
    path: "/blog-posts",
    required: &["title", "content", "author"],
    choices: &[],
    immutable: &[CREATED_AT_FIELD],
    stamp: Some(CREATED_AT_FIELD),
    approval: Approval::CallerChoice,
    order: Some((CREATED_AT_FIELD, true)),
    defaults: &[],
};

/// Packs and acapellas hosted elsewhere; the admin pastes the download link.
pub const DOWNLOADABLE_ITEMS: ResourceKind = ResourceKind {
    label: "Downloadable item",
    collection: "downloadable_items",
    path: "/downloadable-items",
    required: &["title", "description", "type", "download_url"],
    choices: &[FieldChoices {
        field: "type",
        allowed: &["pack", "acapella", "outro"],
    }],
    immutable: &[CREATED_AT_FIELD],
    stamp: Some(CREATED_AT_FIELD),
    approval: Approval::None,
    order: Some((CREATED_AT_FIELD, true)),
    defaults: &[],
};

/// Every kind, for table-driven checks.
pub const ALL: [&ResourceKind; 10] = [
    &PROJECTS,
    &PORTFOLIO,
    &TESTIMONIALS,
    &SOCIAL_LINKS,
    &STUDIO_CONFIG,
    &SPOTIFY_TRACKS,
    &YOUTUBE_VIDEOS,
    &FILES,
    &BLOG_POSTS,
    &DOWNLOADABLE_ITEMS,
];

/// Type-level handle on a kind, so one generic axum handler serves them all.
pub trait Kind: Send + Sync + 'static {
    const RESOURCE: &'static ResourceKind;
}

macro_rules! kind_marker {
    ($($marker:ident => $table:ident),* $(,)?) => {
        $(
            pub struct $marker;

            impl Kind for $marker {
                const RESOURCE: &'static ResourceKind = &$table;
            }
        )*
    };
}

kind_marker! {
    Projects => PROJECTS,
    Portfolio => PORTFOLIO,
    Testimonials => TESTIMONIALS,
    SocialLinks => SOCIAL_LINKS,
    StudioConfig => STUDIO_CONFIG,
    SpotifyTracks => SPOTIFY_TRACKS,
    YoutubeVideos => YOUTUBE_VIDEOS,
    Files => FILES,
    BlogPosts => BLOG_POSTS,
    DownloadableItems => DOWNLOADABLE_ITEMS,
}
