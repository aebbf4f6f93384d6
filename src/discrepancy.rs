use serde::{Deserialize, Serialize};

/// Which broad class of anomaly a discrepancy kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscrepancyFamily {
    /// The element or value was not there at all.
    Missing,
    /// The element was there but its content could not be used.
    InvalidValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscrepancyType {
    MissingDocumentId,
    MissingTitle,
    MissingHeaders,
    MissingBody,
    MissingFooter,
    MissingCountry,
    MissingCreationDate,
    IncorrectCreationDate,
    InvalidSum,
}

impl DiscrepancyType {
    pub const ALL: [Self; 9] = [
        Self::MissingDocumentId,
        Self::MissingTitle,
        Self::MissingHeaders,
        Self::MissingBody,
        Self::MissingFooter,
        Self::MissingCountry,
        Self::MissingCreationDate,
        Self::IncorrectCreationDate,
        Self::InvalidSum,
    ];

    #[must_use]
    pub const fn family(self) -> DiscrepancyFamily {
        match self {
            Self::MissingDocumentId
            | Self::MissingTitle
            | Self::MissingHeaders
            | Self::MissingBody
            | Self::MissingFooter
            | Self::MissingCountry
            | Self::MissingCreationDate => DiscrepancyFamily::Missing,
            Self::IncorrectCreationDate | Self::InvalidSum => DiscrepancyFamily::InvalidValue,
        }
    }

    #[must_use]
    pub const fn is_missing(self) -> bool {
        matches!(self.family(), DiscrepancyFamily::Missing)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingDocumentId => "MISSING_DOCUMENT_ID",
            Self::MissingTitle => "MISSING_TITLE",
            Self::MissingHeaders => "MISSING_HEADERS",
            Self::MissingBody => "MISSING_BODY",
            Self::MissingFooter => "MISSING_FOOTER",
            Self::MissingCountry => "MISSING_COUNTRY",
            Self::MissingCreationDate => "MISSING_CREATION_DATE",
            Self::IncorrectCreationDate => "INCORRECT_CREATION_DATE",
            Self::InvalidSum => "INVALID_SUM",
        }
    }
}

/// One anomaly found while extracting a table document.
///
/// Extractors create these through the `with_*` builders; the pipeline fills
/// in `file_name` once the whole document has been processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub discrepancy_type: DiscrepancyType,
    pub file_name: Option<String>,
    pub raw_data: Option<String>,
    pub description: Option<String>,
    pub location: Option<u32>,
}

impl Discrepancy {
    #[must_use]
    pub fn new(discrepancy_type: DiscrepancyType) -> Self {
        Self {
            discrepancy_type,
            file_name: None,
            raw_data: None,
            description: None,
            location: None,
        }
    }

    #[must_use]
    pub fn with_raw_data(mut self, raw_data: impl Into<String>) -> Self {
        self.raw_data = Some(raw_data.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Option<u32>) -> Self {
        self.location = location;
        self
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}
