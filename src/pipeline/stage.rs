//! Pipeline stage registry.
//!
//! Six fixed stages, executed strictly in this order:
//!
//! ```text
//! text-processing → voice-synthesis → avatar-render
//!   → subtitle-generation → music-mix → final-render
//! ```
//!
//! The catalog is a `static` array shared by every job. Per-job progress is
//! tracked in [`StageRun`](crate::pipeline::StageRun)s, never here.

use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// StageId
// ---------------------------------------------------------------------------

/// Stable identity of a pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageId {
    TextProcessing,
    VoiceSynthesis,
    AvatarRender,
    SubtitleGeneration,
    MusicMix,
    FinalRender,
}

impl StageId {
    pub fn as_str(self) -> &'static str {
        match self {
            StageId::TextProcessing => "text-processing",
            StageId::VoiceSynthesis => "voice-synthesis",
            StageId::AvatarRender => "avatar-render",
            StageId::SubtitleGeneration => "subtitle-generation",
            StageId::MusicMix => "music-mix",
            StageId::FinalRender => "final-render",
        }
    }

    /// Look a stage up by its kebab-case id.
    pub fn parse(s: &str) -> Option<StageId> {
        STAGES.iter().map(|stage| stage.id).find(|id| id.as_str() == s)
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PipelineStage
// ---------------------------------------------------------------------------

/// One ordered phase of the generation pipeline.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct PipelineStage {
    pub id: StageId,
    pub display_name: &'static str,
    /// Zero-based position in [`all_stages`].
    pub position: usize,
}

static STAGES: [PipelineStage; 6] = [
    PipelineStage {
        id: StageId::TextProcessing,
        display_name: "Processing text",
        position: 0,
    },
    PipelineStage {
        id: StageId::VoiceSynthesis,
        display_name: "Generating natural voice",
        position: 1,
    },
    PipelineStage {
        id: StageId::AvatarRender,
        display_name: "Creating avatar",
        position: 2,
    },
    PipelineStage {
        id: StageId::SubtitleGeneration,
        display_name: "Generating subtitles",
        position: 3,
    },
    PipelineStage {
        id: StageId::MusicMix,
        display_name: "Adding music",
        position: 4,
    },
    PipelineStage {
        id: StageId::FinalRender,
        display_name: "Rendering video",
        position: 5,
    },
];

/// Every stage, in execution order.
pub fn all_stages() -> &'static [PipelineStage] {
    &STAGES
}

/// The catalog entry for `id`.
pub fn stage(id: StageId) -> &'static PipelineStage {
    let position = match id {
        StageId::TextProcessing => 0,
        StageId::VoiceSynthesis => 1,
        StageId::AvatarRender => 2,
        StageId::SubtitleGeneration => 3,
        StageId::MusicMix => 4,
        StageId::FinalRender => 5,
    };
    &STAGES[position]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_six_stages_in_order() {
        let ids: Vec<&str> = all_stages().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "text-processing",
                "voice-synthesis",
                "avatar-render",
                "subtitle-generation",
                "music-mix",
                "final-render",
            ]
        );
    }

    #[test]
    fn positions_match_indices() {
        for (index, stage) in all_stages().iter().enumerate() {
            assert_eq!(stage.position, index);
        }
    }

    #[test]
    fn lookup_by_id_returns_same_entry() {
        for entry in all_stages() {
            assert!(std::ptr::eq(stage(entry.id), entry));
        }
    }

    #[test]
    fn parse_accepts_kebab_ids_only() {
        assert_eq!(StageId::parse("music-mix"), Some(StageId::MusicMix));
        assert_eq!(StageId::parse("final-render"), Some(StageId::FinalRender));
        assert_eq!(StageId::parse("MusicMix"), None);
        assert_eq!(StageId::parse(""), None);
    }

    #[test]
    fn serialises_as_kebab_case() {
        assert_eq!(
            serde_json::to_string(&StageId::SubtitleGeneration).unwrap(),
            "\"subtitle-generation\""
        );
    }
}
