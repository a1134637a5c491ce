//! The closed CSL-style publication type vocabulary

use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every type a paper may take.
///
/// Conversion from a string only succeeds for members of the vocabulary;
/// there is no catch-all variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum PublicationType {
    Article,
    ArticleJournal,
    ArticleMagazine,
    ArticleNewspaper,
    Bill,
    Book,
    Broadcast,
    Chapter,
    Dataset,
    Entry,
    EntryDictionary,
    EntryEncyclopedia,
    Figure,
    Graphic,
    Interview,
    Journal,
    LegalCase,
    Legislation,
    Manuscript,
    Map,
    MotionPicture,
    MusicalScore,
    Pamphlet,
    PaperConference,
    Proceedings,
    Patent,
    PersonalCommunication,
    Post,
    PostWeblog,
    Report,
    Review,
    ReviewBook,
    Song,
    Speech,
    Thesis,
    Treaty,
    Webpage,
}

impl PublicationType {
    pub const ALL: [PublicationType; 37] = [
        Self::Article,
        Self::ArticleJournal,
        Self::ArticleMagazine,
        Self::ArticleNewspaper,
        Self::Bill,
        Self::Book,
        Self::Broadcast,
        Self::Chapter,
        Self::Dataset,
        Self::Entry,
        Self::EntryDictionary,
        Self::EntryEncyclopedia,
        Self::Figure,
        Self::Graphic,
        Self::Interview,
        Self::Journal,
        Self::LegalCase,
        Self::Legislation,
        Self::Manuscript,
        Self::Map,
        Self::MotionPicture,
        Self::MusicalScore,
        Self::Pamphlet,
        Self::PaperConference,
        Self::Proceedings,
        Self::Patent,
        Self::PersonalCommunication,
        Self::Post,
        Self::PostWeblog,
        Self::Report,
        Self::Review,
        Self::ReviewBook,
        Self::Song,
        Self::Speech,
        Self::Thesis,
        Self::Treaty,
        Self::Webpage,
    ];

    /// The CSL name of this type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::ArticleJournal => "article-journal",
            Self::ArticleMagazine => "article-magazine",
            Self::ArticleNewspaper => "article-newspaper",
            Self::Bill => "bill",
            Self::Book => "book",
            Self::Broadcast => "broadcast",
            Self::Chapter => "chapter",
            Self::Dataset => "dataset",
            Self::Entry => "entry",
            Self::EntryDictionary => "entry-dictionary",
            Self::EntryEncyclopedia => "entry-encyclopedia",
            Self::Figure => "figure",
            Self::Graphic => "graphic",
            Self::Interview => "interview",
            Self::Journal => "journal",
            Self::LegalCase => "legal_case",
            Self::Legislation => "legislation",
            Self::Manuscript => "manuscript",
            Self::Map => "map",
            Self::MotionPicture => "motion_picture",
            Self::MusicalScore => "musical_score",
            Self::Pamphlet => "pamphlet",
            Self::PaperConference => "paper-conference",
            Self::Proceedings => "proceedings",
            Self::Patent => "patent",
            Self::PersonalCommunication => "personal_communication",
            Self::Post => "post",
            Self::PostWeblog => "post-weblog",
            Self::Report => "report",
            Self::Review => "review",
            Self::ReviewBook => "review-book",
            Self::Song => "song",
            Self::Speech => "speech",
            Self::Thesis => "thesis",
            Self::Treaty => "treaty",
            Self::Webpage => "webpage",
        }
    }
}

impl fmt::Display for PublicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublicationType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::publication_type(s))
    }
}

impl From<PublicationType> for &'static str {
    fn from(value: PublicationType) -> Self {
        value.as_str()
    }
}

impl TryFrom<String> for PublicationType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
