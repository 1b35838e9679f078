//! Loaded-session types

use relato_common::Chapter;
use uuid::Uuid;

/// What a host asks the engine to play
///
/// Carries the full chapter list so next/prev navigation needs no further
/// catalog round trips.
#[derive(Debug, Clone)]
pub struct PlayerTrack {
    pub book_id: Uuid,
    pub book_title: String,
    pub cover_url: Option<String>,
    pub chapters: Vec<Chapter>,
    /// Index of the chapter to load
    pub index: usize,
}

/// The currently loaded book and chapter
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub book_id: Uuid,
    pub book_title: String,
    pub cover_url: Option<String>,
    pub chapters: Vec<Chapter>,
    pub active_index: usize,
}

impl PlaybackSession {
    /// The chapter currently loaded, if the index is valid
    pub fn active_chapter(&self) -> Option<&Chapter> {
        self.chapters.get(self.active_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_chapter_respects_index() {
        let chapters: Vec<Chapter> = (0..3)
            .map(|i| Chapter {
                id: Uuid::new_v4(),
                index_in_book: i,
                title: None,
                audio_url: Some(format!("/audio/{}.mp3", i)),
                voice: None,
                style: None,
            })
            .collect();

        let session = PlaybackSession {
            book_id: Uuid::new_v4(),
            book_title: "Book".to_string(),
            cover_url: None,
            chapters: chapters.clone(),
            active_index: 1,
        };
        assert_eq!(
            session.active_chapter().map(|c| c.id),
            Some(chapters[1].id)
        );

        let out_of_range = PlaybackSession {
            active_index: 9,
            ..session
        };
        assert!(out_of_range.active_chapter().is_none());
    }
}
