//! Client-side view models built on the wire DTOs.

use cinevault_api_models::{Content, Episode};
use uuid::Uuid;

/// Entry in a content feed, tagged when the page is ingested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    /// Movie or series record.
    Content(Content),
    /// Single episode of a series.
    Episode(Episode),
}

impl Item {
    /// Identifier of the underlying record.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        match self {
            Self::Content(content) => content.id,
            Self::Episode(episode) => episode.id,
        }
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Content(content) => &content.title,
            Self::Episode(episode) => &episode.title,
        }
    }

    /// Thumbnail URL, when the record has one.
    #[must_use]
    pub fn thumbnail_url(&self) -> Option<&str> {
        match self {
            Self::Content(content) => content.thumbnail_url.as_deref(),
            Self::Episode(episode) => episode.thumbnail_url.as_deref(),
        }
    }

    /// Content record, if this is one.
    #[must_use]
    pub const fn as_content(&self) -> Option<&Content> {
        match self {
            Self::Content(content) => Some(content),
            Self::Episode(_) => None,
        }
    }

    /// Episode record, if this is one.
    #[must_use]
    pub const fn as_episode(&self) -> Option<&Episode> {
        match self {
            Self::Episode(episode) => Some(episode),
            Self::Content(_) => None,
        }
    }

    /// `S1 · E3` label for episodes.
    #[must_use]
    pub fn episode_label(&self) -> Option<String> {
        self.as_episode().map(|episode| {
            format!("S{} · E{}", episode.season_number, episode.episode_number)
        })
    }
}

impl From<Content> for Item {
    fn from(value: Content) -> Self {
        Self::Content(value)
    }
}

impl From<Episode> for Item {
    fn from(value: Episode) -> Self {
        Self::Episode(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{content_json, episode_json};

    #[test]
    fn accessors_follow_the_tag() -> Result<(), serde_json::Error> {
        let content: Content = serde_json::from_value(content_json("Dark"))?;
        let episode: Episode = serde_json::from_value(episode_json(content.id, 2, 5))?;

        let show = Item::from(content.clone());
        let part = Item::from(episode);

        assert_eq!(show.id(), content.id);
        assert_eq!(show.title(), "Dark");
        assert!(show.as_episode().is_none());
        assert_eq!(show.episode_label(), None);
        assert_eq!(part.episode_label().as_deref(), Some("S2 · E5"));
        assert_eq!(part.as_episode().map(|e| e.content_id), Some(content.id));
        Ok(())
    }
}
